use std::sync::Arc;

use crate::metadata::{
    members::{FieldRc, MethodRc, Param},
    token::Token,
    typesystem::{RuntimeTypeRc, RuntimeTypeRef},
};

/// A vector that holds a list of `Property`
pub type PropertyList = Arc<boxcar::Vec<PropertyRc>>;
/// Reference to a `Property`
pub type PropertyRc = Arc<Property>;

#[allow(non_snake_case)]
/// All possible flags for `PropertyAttributes`
pub mod PropertyAttributes {
    /// Property is special
    pub const SPECIAL_NAME: u32 = 0x0200;
    /// Runtime(metadata internal APIs) should check name encoding
    pub const RT_SPECIAL_NAME: u32 = 0x0400;
    /// Property has default
    pub const HAS_DEFAULT: u32 = 0x1000;
}

/// A property (or indexer) declared on a `RuntimeType`.
///
/// Storage, visibility and virtuality of a property are those of its accessor methods.
pub struct Property {
    /// Token
    pub token: Token,
    /// Name (`Item` for indexers)
    pub name: String,
    /// Flags (a bitmask of `PropertyAttributes`)
    pub flags: u32,
    /// Declared type of the property
    pub property_type: RuntimeTypeRc,
    /// The type declaring this property
    pub declaring_type: RuntimeTypeRef,
    /// The `get_` accessor
    pub getter: Option<MethodRc>,
    /// The `set_` accessor
    pub setter: Option<MethodRc>,
    /// Index parameters; empty for plain properties
    pub index_params: Vec<Param>,
    /// The compiler emitted field behind an auto-property
    pub backing_field: Option<FieldRc>,
}

impl Property {
    fn accessors(&self) -> impl Iterator<Item = &MethodRc> {
        self.getter.iter().chain(self.setter.iter())
    }

    /// Returns true if the property has a getter
    #[must_use]
    pub fn can_read(&self) -> bool {
        self.getter.is_some()
    }

    /// Returns true if the property has a setter
    #[must_use]
    pub fn can_write(&self) -> bool {
        self.setter.is_some()
    }

    /// Returns true for indexers
    #[must_use]
    pub fn is_indexer(&self) -> bool {
        !self.index_params.is_empty()
    }

    /// Returns true if the accessors are static
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.accessors().any(|method| method.is_static())
    }

    /// Returns true if any accessor is public
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.accessors().any(|method| method.is_public())
    }

    /// Returns true if the accessors are virtual
    #[must_use]
    pub fn is_virtual(&self) -> bool {
        self.accessors().any(|method| method.is_virtual())
    }

    /// Returns true if the accessors start a new slot instead of overriding
    #[must_use]
    pub fn is_new_slot(&self) -> bool {
        self.accessors().any(|method| method.is_new_slot())
    }

    /// The declaring type, if it is still alive
    #[must_use]
    pub fn declaring_type(&self) -> Option<RuntimeTypeRc> {
        self.declaring_type.upgrade()
    }
}

impl std::fmt::Debug for Property {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Property")
            .field("token", &self.token)
            .field("name", &self.name)
            .field("type", &self.property_type.fullname())
            .field("can_read", &self.can_read())
            .field("can_write", &self.can_write())
            .finish()
    }
}
