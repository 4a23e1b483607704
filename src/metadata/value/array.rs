use std::sync::{Arc, RwLock};

use crate::{
    metadata::{typesystem::RuntimeTypeRc, value::Value},
    Error, Result,
};

struct ArrayData {
    ty: RuntimeTypeRc,
    elements: RwLock<Vec<Value>>,
}

/// A shared reference to a single dimension, zero based array.
///
/// The runtime type is the array type (see [`crate::metadata::typesystem::TypeRegistry::array_of`]),
/// not the element type. Clones share the array; equality is reference identity.
#[derive(Clone)]
pub struct ArrayRef(Arc<ArrayData>);

impl ArrayRef {
    /// Allocates an array of `length` default elements
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] if `array_type` is not an array type.
    pub fn allocate(array_type: &RuntimeTypeRc, length: usize) -> Result<Self> {
        let element = array_type
            .element_type()
            .filter(|_| array_type.is_array())
            .ok_or_else(|| malformed_error!("{} is not an array type", array_type.fullname()))?;
        let default = Value::default_for(&element);
        Ok(Self::from_elements(array_type.clone(), vec![default; length]))
    }

    /// Creates an array from existing elements; the elements are not checked
    #[must_use]
    pub fn from_elements(array_type: RuntimeTypeRc, elements: Vec<Value>) -> Self {
        ArrayRef(Arc::new(ArrayData {
            ty: array_type,
            elements: RwLock::new(elements),
        }))
    }

    /// The array type
    #[must_use]
    pub fn runtime_type(&self) -> &RuntimeTypeRc {
        &self.0.ty
    }

    /// Number of elements
    #[must_use]
    pub fn len(&self) -> usize {
        read_lock!(self.0.elements).len()
    }

    /// Returns true for an array without elements
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads an element
    ///
    /// # Errors
    /// Returns [`Error::IndexOutOfRange`] if `index` is outside the array.
    pub fn load(&self, index: usize) -> Result<Value> {
        let elements = read_lock!(self.0.elements);
        elements.get(index).cloned().ok_or(Error::IndexOutOfRange {
            index,
            length: elements.len(),
        })
    }

    /// Writes an element
    ///
    /// # Errors
    /// Returns [`Error::IndexOutOfRange`] if `index` is outside the array.
    pub fn store(&self, index: usize, value: Value) -> Result<()> {
        let mut elements = write_lock!(self.0.elements);
        let length = elements.len();
        match elements.get_mut(index) {
            Some(entry) => {
                *entry = value;
                Ok(())
            }
            None => Err(Error::IndexOutOfRange { index, length }),
        }
    }

    /// Copy of all elements
    #[must_use]
    pub fn snapshot(&self) -> Vec<Value> {
        read_lock!(self.0.elements).clone()
    }

    /// Returns true if both references point to the same array
    #[must_use]
    pub fn ptr_eq(&self, other: &ArrayRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Address of the array, usable as identity key
    #[must_use]
    pub fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }
}

impl PartialEq for ArrayRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl std::fmt::Debug for ArrayRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]@{:#x}", self.0.ty.fullname(), self.len(), self.addr())
    }
}
