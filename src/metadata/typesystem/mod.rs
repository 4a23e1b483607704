//! Runtime type system of the managed object model.
//!
//! This module provides the representation of the types that accessors are emitted for:
//! classes, structs, enums, interfaces, arrays, by-ref types, generic method parameters and
//! the built-in primitives. Types are created through a [`TypeBuilder`] and owned by a
//! [`TypeRegistry`], which hands out shared [`RuntimeTypeRc`] handles.
//!
//! # Key Components
//!
//! - [`RuntimeType`]: Core type representation with its member lists and static storage
//! - [`TypeRegistry`]: Central, thread-safe registry for all types
//! - [`TypeBuilder`]: Builder pattern for declaring types and their members
//! - [`PrimitiveKind`]: Built-in primitive value types (int32, double, ...)
//!
//! # Type System Features
//!
//! - **Inheritance**: Single base type plus implemented interfaces, with assignability checks
//! - **Value types**: Structs and enums, copied by value and mutated through holders
//! - **Slot layout**: Instance fields of a hierarchy are laid out base first, so a field keeps
//!   its slot in every derived type
//! - **Static storage**: Each type owns the values of its static fields
//!
//! # Examples
//!
//! ```rust
//! use dotreflect::metadata::typesystem::TypeRegistry;
//!
//! let registry = TypeRegistry::new();
//! let person = registry
//!     .class("Sample", "Person")
//!     .field("Age", registry.int32())
//!     .auto_property("Name", registry.string())
//!     .build()?;
//!
//! assert_eq!(person.fullname(), "Sample.Person");
//! assert_eq!(person.instance_slot_count(), 2);
//! assert!(registry.object().is_assignable_from(&person));
//! # Ok::<(), dotreflect::Error>(())
//! ```

mod base;
mod builder;
mod primitives;
mod registry;

use std::sync::{Arc, OnceLock, RwLock};

pub use base::{RuntimeTypeRef, TypeAttributes, TypeFlavor};
pub use builder::{backing_field_name, MethodBuilder, PropertyBuilder, TypeBuilder};
pub use primitives::{PrimitiveKind, OBJECT_TOKEN, STRING_TOKEN, VALUE_TYPE_TOKEN, VOID_TOKEN};
pub use registry::TypeRegistry;

use crate::{
    metadata::{
        members::{FieldList, FieldRc, MethodList, MethodRc, PropertyList, PropertyRc},
        token::Token,
        value::Value,
    },
    Result,
};

/// A vector that holds a list of `RuntimeType`
pub type RuntimeTypeList = Arc<boxcar::Vec<RuntimeTypeRc>>;
/// Reference to a `RuntimeType`
pub type RuntimeTypeRc = Arc<RuntimeType>;

/// Represents a type of the object model together with its declared members.
///
/// Member lists are append-only and filled by the [`TypeBuilder`] before the type is
/// published in its registry, so a type observed through the registry never changes shape.
pub struct RuntimeType {
    /// Token
    pub token: Token,
    /// Namespace (can be empty for constructed types)
    pub namespace: String,
    /// Name
    pub name: String,
    /// The `TypeFlavor`
    pub flavor: TypeFlavor,
    /// Flags (a bitmask of `TypeAttributes`)
    pub flags: u32,
    /// This types base aka 'extends'
    base: OnceLock<RuntimeTypeRc>,
    /// Element type of arrays and by-ref types
    element: OnceLock<RuntimeTypeRc>,
    /// All interfaces this type implements directly
    pub interfaces: RuntimeTypeList,
    /// All fields this type declares
    pub fields: FieldList,
    /// All properties (and indexers) this type declares
    pub properties: PropertyList,
    /// All methods this type declares, including property accessors
    pub methods: MethodList,
    /// All constructors this type declares
    pub constructors: MethodList,
    /// Values of the static fields, indexed by the field slot
    statics: RwLock<Vec<Value>>,
    /// Declared types of all instance slots of the hierarchy, base first
    layout: OnceLock<Vec<RuntimeTypeRc>>,
}

impl RuntimeType {
    /// Create a new instance of a `RuntimeType`
    pub fn new(token: Token, namespace: String, name: String, flavor: TypeFlavor, flags: u32) -> Self {
        RuntimeType {
            token,
            namespace,
            name,
            flavor,
            flags,
            base: OnceLock::new(),
            element: OnceLock::new(),
            interfaces: Arc::new(boxcar::Vec::new()),
            fields: Arc::new(boxcar::Vec::new()),
            properties: Arc::new(boxcar::Vec::new()),
            methods: Arc::new(boxcar::Vec::new()),
            constructors: Arc::new(boxcar::Vec::new()),
            statics: RwLock::new(Vec::new()),
            layout: OnceLock::new(),
        }
    }

    /// Returns the full name (Namespace.Name) of the entity
    pub fn fullname(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{0}.{1}", self.namespace, self.name)
        }
    }

    /// Access the base type of this type, if it exists
    pub fn base(&self) -> Option<RuntimeTypeRc> {
        self.base.get().cloned()
    }

    /// Sets the base type; only the first call has an effect
    pub(crate) fn set_base(&self, base: &RuntimeTypeRc) {
        self.base.set(base.clone()).ok();
    }

    /// The element type of an array or by-ref type
    pub fn element_type(&self) -> Option<RuntimeTypeRc> {
        self.element.get().cloned()
    }

    pub(crate) fn set_element_type(&self, element: RuntimeTypeRc) {
        self.element.set(element).ok();
    }

    /// Returns true for structs, enums and primitives
    pub fn is_value_type(&self) -> bool {
        self.flavor.is_value_type()
    }

    /// Returns true for types whose instances are shared references
    pub fn is_reference_type(&self) -> bool {
        self.flavor.is_reference_type()
    }

    /// Returns true for interfaces
    pub fn is_interface(&self) -> bool {
        self.flavor == TypeFlavor::Interface
    }

    /// Returns true for user declared structs
    pub fn is_struct(&self) -> bool {
        self.flavor == TypeFlavor::ValueType
    }

    /// Returns true for enumerations
    pub fn is_enum(&self) -> bool {
        matches!(self.flavor, TypeFlavor::Enum { .. })
    }

    /// Returns true for array types
    pub fn is_array(&self) -> bool {
        self.flavor == TypeFlavor::Array
    }

    /// Returns true for by-ref types
    pub fn is_by_ref(&self) -> bool {
        self.flavor == TypeFlavor::ByRef
    }

    /// Returns true for `System.Void`
    pub fn is_void(&self) -> bool {
        self.flavor == TypeFlavor::Void
    }

    /// Returns true if the type is marked abstract (interfaces always are)
    pub fn is_abstract(&self) -> bool {
        self.flags & TypeAttributes::ABSTRACT != 0 || self.is_interface()
    }

    /// Returns true if the type cannot be extended
    pub fn is_sealed(&self) -> bool {
        self.flags & TypeAttributes::SEALED != 0
    }

    /// Returns true if the type has public scope
    pub fn is_public(&self) -> bool {
        self.flags & TypeAttributes::VISIBILITY_MASK == TypeAttributes::PUBLIC
    }

    /// Returns true if `other` appears in the base chain of this type
    pub fn is_subclass_of(&self, other: &RuntimeType) -> bool {
        let mut current = self.base();
        while let Some(base) = current {
            if base.token == other.token {
                return true;
            }
            current = base.base();
        }
        false
    }

    /// Returns true if this type or one of its bases implements `interface`, directly or
    /// through an interface that extends it
    pub fn implements_interface(&self, interface: &RuntimeType) -> bool {
        for (_, iface) in self.interfaces.iter() {
            if iface.token == interface.token || iface.implements_interface(interface) {
                return true;
            }
        }

        match self.base() {
            Some(base) => base.implements_interface(interface),
            None => false,
        }
    }

    /// Returns true if a value of type `other` can be stored in a location of this type
    /// without conversion
    pub fn is_assignable_from(&self, other: &RuntimeType) -> bool {
        if self.token == other.token {
            return true;
        }

        match self.flavor {
            TypeFlavor::Object if self.token == VALUE_TYPE_TOKEN => other.is_value_type(),
            TypeFlavor::Object => !matches!(other.flavor, TypeFlavor::Void | TypeFlavor::ByRef),
            TypeFlavor::Interface => other.implements_interface(self),
            TypeFlavor::Class => other.is_subclass_of(self),
            TypeFlavor::Array => {
                if other.flavor != TypeFlavor::Array {
                    return false;
                }
                match (self.element_type(), other.element_type()) {
                    (Some(ours), Some(theirs)) => {
                        ours.token == theirs.token
                            || (theirs.is_reference_type() && ours.is_assignable_from(&theirs))
                    }
                    _ => false,
                }
            }
            TypeFlavor::GenericParameter { .. } => true,
            _ => false,
        }
    }

    /// Returns true if `value` can be stored in a location of this type as is
    pub fn accepts(&self, value: &Value) -> bool {
        if matches!(self.flavor, TypeFlavor::GenericParameter { .. }) {
            return true;
        }

        let boxing = self.token == OBJECT_TOKEN || self.token == VALUE_TYPE_TOKEN;
        match value {
            Value::Null => self.is_reference_type(),
            Value::Holder(_) => false,
            Value::String(_) => self.flavor == TypeFlavor::String || self.token == OBJECT_TOKEN,
            Value::Enum(inner) => boxing || self.token == inner.runtime_type().token,
            Value::Struct(inner) => {
                boxing
                    || self.token == inner.runtime_type().token
                    || (self.is_interface() && inner.runtime_type().implements_interface(self))
            }
            Value::Object(object) => self.is_assignable_from(object.runtime_type()),
            Value::Array(array) => self.is_assignable_from(array.runtime_type()),
            primitive => match PrimitiveKind::of(primitive) {
                Some(kind) => boxing || self.flavor == TypeFlavor::Primitive(kind),
                None => false,
            },
        }
    }

    /// Declared types of all instance slots of the hierarchy, base first
    pub fn instance_layout(&self) -> &[RuntimeTypeRc] {
        match self.layout.get() {
            Some(layout) => layout,
            None => &[],
        }
    }

    /// Number of instance slots an instance of this type carries
    pub fn instance_slot_count(&self) -> usize {
        self.instance_layout().len()
    }

    pub(crate) fn set_layout(&self, layout: Vec<RuntimeTypeRc>) {
        self.layout.set(layout).ok();
    }

    /// Reserves a static slot initialized with `value` and returns its index
    pub(crate) fn push_static(&self, value: Value) -> usize {
        let mut statics = write_lock!(self.statics);
        statics.push(value);
        statics.len() - 1
    }

    /// Reads a static slot
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the slot does not exist.
    pub fn load_static(&self, slot: usize) -> Result<Value> {
        read_lock!(self.statics)
            .get(slot)
            .cloned()
            .ok_or_else(|| malformed_error!("Static slot {} does not exist on {}", slot, self.fullname()))
    }

    /// Writes a static slot
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the slot does not exist.
    pub fn store_static(&self, slot: usize, value: Value) -> Result<()> {
        let mut statics = write_lock!(self.statics);
        match statics.get_mut(slot) {
            Some(entry) => {
                *entry = value;
                Ok(())
            }
            None => Err(malformed_error!(
                "Static slot {} does not exist on {}",
                slot,
                self.fullname()
            )),
        }
    }

    /// Finds a field declared on this type by exact name
    pub fn declared_field(&self, name: &str) -> Option<FieldRc> {
        self.fields
            .iter()
            .find(|(_, field)| field.name == name)
            .map(|(_, field)| field.clone())
    }

    /// Finds a property declared on this type by exact name
    pub fn declared_property(&self, name: &str) -> Option<PropertyRc> {
        self.properties
            .iter()
            .find(|(_, property)| property.name == name)
            .map(|(_, property)| property.clone())
    }

    /// All methods declared on this type with the given name
    pub fn declared_methods(&self, name: &str) -> Vec<MethodRc> {
        self.methods
            .iter()
            .filter(|(_, method)| method.name == name)
            .map(|(_, method)| method.clone())
            .collect()
    }

    /// Finds a field by exact name on this type or the nearest base declaring it
    pub fn find_field(&self, name: &str) -> Option<FieldRc> {
        if let Some(field) = self.declared_field(name) {
            return Some(field);
        }
        self.base().and_then(|base| base.find_field(name))
    }
}

impl std::fmt::Debug for RuntimeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeType")
            .field("token", &self.token)
            .field("fullname", &self.fullname())
            .field("flavor", &self.flavor)
            .finish()
    }
}

impl std::fmt::Display for RuntimeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.fullname())
    }
}
