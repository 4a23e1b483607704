use std::sync::{Arc, RwLock};

use crate::{
    metadata::{typesystem::RuntimeTypeRc, value::Value},
    Error, Result,
};

/// Heap storage of a reference-type instance
struct ObjectData {
    ty: RuntimeTypeRc,
    slots: RwLock<Vec<Value>>,
}

/// A shared reference to an instance of a class.
///
/// Clones share the instance; equality is reference identity.
#[derive(Clone)]
pub struct ObjectRef(Arc<ObjectData>);

impl ObjectRef {
    /// Allocates a zero-initialized instance of `ty`, without running any constructor
    #[must_use]
    pub fn allocate(ty: &RuntimeTypeRc) -> Self {
        let slots = ty.instance_layout().iter().map(Value::default_for).collect();
        Self::from_slots(ty.clone(), slots)
    }

    /// Creates an instance from already initialized slots
    #[must_use]
    pub fn from_slots(ty: RuntimeTypeRc, slots: Vec<Value>) -> Self {
        ObjectRef(Arc::new(ObjectData {
            ty,
            slots: RwLock::new(slots),
        }))
    }

    /// The runtime type of the instance
    #[must_use]
    pub fn runtime_type(&self) -> &RuntimeTypeRc {
        &self.0.ty
    }

    /// Reads an instance slot
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] if the slot does not exist.
    pub fn load(&self, slot: usize) -> Result<Value> {
        read_lock!(self.0.slots)
            .get(slot)
            .cloned()
            .ok_or_else(|| missing_slot(&self.0.ty, slot))
    }

    /// Writes an instance slot
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] if the slot does not exist.
    pub fn store(&self, slot: usize, value: Value) -> Result<()> {
        let mut slots = write_lock!(self.0.slots);
        match slots.get_mut(slot) {
            Some(entry) => {
                *entry = value;
                Ok(())
            }
            None => Err(missing_slot(&self.0.ty, slot)),
        }
    }

    /// Copy of all instance slots
    #[must_use]
    pub fn snapshot(&self) -> Vec<Value> {
        read_lock!(self.0.slots).clone()
    }

    /// Returns true if both references point to the same instance
    #[must_use]
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Address of the instance, usable as identity key
    #[must_use]
    pub fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl std::fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{:#x}", self.0.ty.fullname(), self.addr())
    }
}

/// A boxed copy of a struct instance.
///
/// Cloning copies the slots; equality compares type and slots.
#[derive(Clone)]
pub struct StructValue {
    ty: RuntimeTypeRc,
    slots: Vec<Value>,
}

impl StructValue {
    /// Creates the zero-initialized instance of `ty`
    #[must_use]
    pub fn default_for(ty: &RuntimeTypeRc) -> Self {
        StructValue {
            ty: ty.clone(),
            slots: ty.instance_layout().iter().map(Value::default_for).collect(),
        }
    }

    /// Creates an instance from already initialized slots
    #[must_use]
    pub fn from_slots(ty: RuntimeTypeRc, slots: Vec<Value>) -> Self {
        StructValue { ty, slots }
    }

    /// The runtime type of the instance
    #[must_use]
    pub fn runtime_type(&self) -> &RuntimeTypeRc {
        &self.ty
    }

    /// Reads an instance slot
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] if the slot does not exist.
    pub fn load(&self, slot: usize) -> Result<Value> {
        self.slots
            .get(slot)
            .cloned()
            .ok_or_else(|| missing_slot(&self.ty, slot))
    }

    /// Writes an instance slot
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] if the slot does not exist.
    pub fn store(&mut self, slot: usize, value: Value) -> Result<()> {
        match self.slots.get_mut(slot) {
            Some(entry) => {
                *entry = value;
                Ok(())
            }
            None => Err(missing_slot(&self.ty, slot)),
        }
    }

    /// All instance slots
    #[must_use]
    pub fn slots(&self) -> &[Value] {
        &self.slots
    }
}

impl PartialEq for StructValue {
    fn eq(&self, other: &Self) -> bool {
        self.ty.token == other.ty.token && self.slots == other.slots
    }
}

impl std::fmt::Debug for StructValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ", self.ty.fullname())?;
        f.debug_list().entries(self.slots.iter()).finish()
    }
}

/// A value of an enumeration, stored as its raw integral representation
#[derive(Clone)]
pub struct EnumValue {
    ty: RuntimeTypeRc,
    raw: i64,
}

impl EnumValue {
    /// Creates an enum value from its raw representation
    #[must_use]
    pub fn new(ty: RuntimeTypeRc, raw: i64) -> Self {
        EnumValue { ty, raw }
    }

    /// The enumeration type
    #[must_use]
    pub fn runtime_type(&self) -> &RuntimeTypeRc {
        &self.ty
    }

    /// The raw integral value
    #[must_use]
    pub fn raw(&self) -> i64 {
        self.raw
    }

    /// Name of the enum member carrying this value, if any
    #[must_use]
    pub fn member_name(&self) -> Option<String> {
        self.ty
            .fields
            .iter()
            .find(|(_, field)| match &field.constant {
                Some(Value::Enum(constant)) => constant.raw == self.raw,
                _ => false,
            })
            .map(|(_, field)| field.name.clone())
    }
}

impl PartialEq for EnumValue {
    fn eq(&self, other: &Self) -> bool {
        self.ty.token == other.ty.token && self.raw == other.raw
    }
}

impl std::fmt::Debug for EnumValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.ty.fullname(), self.raw)
    }
}

fn missing_slot(ty: &RuntimeTypeRc, slot: usize) -> Error {
    malformed_error!("Slot {} does not exist on {}", slot, ty.fullname())
}
