use std::sync::{Arc, Weak};

use crate::{
    metadata::{
        token::Token,
        typesystem::{PrimitiveKind, RuntimeType, RuntimeTypeRc},
    },
    Error, Result,
};

/// Flags of a type, a bitmask built from the constants below
#[allow(non_snake_case)]
pub mod TypeAttributes {
    /// Use this mask to retrieve visibility information
    pub const VISIBILITY_MASK: u32 = 0x0000_0007;
    /// Class has no public scope
    pub const NOT_PUBLIC: u32 = 0x0000_0000;
    /// Class has public scope
    pub const PUBLIC: u32 = 0x0000_0001;
    /// Type is an interface
    pub const INTERFACE: u32 = 0x0000_0020;
    /// Class is abstract
    pub const ABSTRACT: u32 = 0x0000_0080;
    /// Class cannot be extended
    pub const SEALED: u32 = 0x0000_0100;
    /// Class name is special
    pub const SPECIAL_NAME: u32 = 0x0000_0400;
}

/// A smart reference to a `RuntimeType` that handles weak references to prevent circular
/// reference memory leaks between a type and its members
#[derive(Clone, Debug)]
pub struct RuntimeTypeRef {
    weak_ref: Weak<RuntimeType>,
}

impl RuntimeTypeRef {
    /// Create a new `RuntimeTypeRef` from a strong reference
    pub fn new(strong_ref: &RuntimeTypeRc) -> Self {
        Self {
            weak_ref: Arc::downgrade(strong_ref),
        }
    }

    /// Get a strong reference to the type, returning None if the type has been dropped
    #[must_use]
    pub fn upgrade(&self) -> Option<RuntimeTypeRc> {
        self.weak_ref.upgrade()
    }

    /// Get a strong reference to the type
    ///
    /// # Errors
    /// Returns [`Error::TypeMissing`] if the type has been dropped together with its registry.
    pub fn get(&self) -> Result<RuntimeTypeRc> {
        self.weak_ref.upgrade().ok_or(Error::TypeMissing)
    }

    /// Check if the referenced type is still alive
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.weak_ref.strong_count() > 0
    }

    /// Get the token of the referenced type (if still alive)
    #[must_use]
    pub fn token(&self) -> Option<Token> {
        self.upgrade().map(|t| t.token)
    }

    /// Returns true if both references point to the same type
    #[must_use]
    pub fn ptr_eq(&self, other: &RuntimeType) -> bool {
        std::ptr::eq(self.weak_ref.as_ptr(), other)
    }
}

impl From<RuntimeTypeRc> for RuntimeTypeRef {
    fn from(strong_ref: RuntimeTypeRc) -> Self {
        Self::new(&strong_ref)
    }
}

impl From<&RuntimeTypeRc> for RuntimeTypeRef {
    fn from(strong_ref: &RuntimeTypeRc) -> Self {
        Self::new(strong_ref)
    }
}

/// The kind of a `RuntimeType`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeFlavor {
    /// A built-in primitive value type
    Primitive(PrimitiveKind),
    /// `System.String`, an immutable reference type
    String,
    /// `System.Object`, the universal root; also used for `System.ValueType`
    Object,
    /// A reference type
    Class,
    /// A struct
    ValueType,
    /// An enumeration backed by an integral primitive
    Enum {
        /// The underlying storage kind
        underlying: PrimitiveKind,
    },
    /// An interface
    Interface,
    /// A single dimension, zero based array; the element type lives on the `RuntimeType`
    Array,
    /// A managed reference to the element type, used for by-ref parameters
    ByRef,
    /// A generic method parameter, substituted on instantiation
    GenericParameter {
        /// Position in the generic parameter list
        index: usize,
    },
    /// `System.Void`
    Void,
}

impl TypeFlavor {
    /// Returns true for the flavors whose instances are copied by value
    #[must_use]
    pub fn is_value_type(&self) -> bool {
        matches!(
            self,
            TypeFlavor::Primitive(_) | TypeFlavor::ValueType | TypeFlavor::Enum { .. }
        )
    }

    /// Returns true for the flavors whose instances are shared references (and may be `Null`)
    #[must_use]
    pub fn is_reference_type(&self) -> bool {
        matches!(
            self,
            TypeFlavor::String
                | TypeFlavor::Object
                | TypeFlavor::Class
                | TypeFlavor::Interface
                | TypeFlavor::Array
        )
    }

    /// Returns the primitive kind, for primitives and for the underlying type of enums
    #[must_use]
    pub fn to_primitive_kind(&self) -> Option<PrimitiveKind> {
        match self {
            TypeFlavor::Primitive(kind) | TypeFlavor::Enum { underlying: kind } => Some(*kind),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flavor_classification() {
        assert!(TypeFlavor::Primitive(PrimitiveKind::I4).is_value_type());
        assert!(TypeFlavor::ValueType.is_value_type());
        assert!(TypeFlavor::Enum {
            underlying: PrimitiveKind::I4
        }
        .is_value_type());
        assert!(TypeFlavor::Class.is_reference_type());
        assert!(TypeFlavor::Array.is_reference_type());
        assert!(!TypeFlavor::ByRef.is_reference_type());
        assert!(!TypeFlavor::Void.is_value_type());
        assert_eq!(
            TypeFlavor::Enum {
                underlying: PrimitiveKind::U1
            }
            .to_primitive_kind(),
            Some(PrimitiveKind::U1)
        );
    }
}
