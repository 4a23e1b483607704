use std::sync::Arc;

use crate::metadata::{
    token::Token,
    typesystem::{RuntimeTypeRc, RuntimeTypeRef},
    value::Value,
};

/// A vector that holds a list of `Field`
pub type FieldList = Arc<boxcar::Vec<FieldRc>>;
/// Reference to a `Field`
pub type FieldRc = Arc<Field>;

#[allow(non_snake_case)]
/// All possible flags for `FieldAttributes`
pub mod FieldAttributes {
    /// These 3 bits contain one of the following values:
    pub const FIELD_ACCESS_MASK: u32 = 0x0007;
    /// Member not referenceable
    pub const COMPILER_CONTROLLED: u32 = 0x0000;
    /// Accessible only by the parent type
    pub const PRIVATE: u32 = 0x0001;
    /// Accessible by sub-types only in this Assembly
    pub const FAM_AND_ASSEM: u32 = 0x0002;
    /// Accessibly by anyone in the Assembly
    pub const ASSEMBLY: u32 = 0x0003;
    /// Accessible only by type and sub-types
    pub const FAMILY: u32 = 0x0004;
    /// Accessibly by sub-types anywhere, plus anyone in assembly
    pub const FAM_OR_ASSEM: u32 = 0x0005;
    /// Accessibly by anyone who has visibility to this scope field contract attributes
    pub const PUBLIC: u32 = 0x0006;
    /// Defined on type, else per instance
    pub const STATIC: u32 = 0x0010;
    /// Field can only be initialized, not written to after init
    pub const INIT_ONLY: u32 = 0x0020;
    /// Value is compile time constant
    pub const LITERAL: u32 = 0x0040;
    /// Field is special
    pub const SPECIAL_NAME: u32 = 0x0200;
    /// CLI provides 'special' behavior, depending upon the name of the field
    pub const RTSPECIAL_NAME: u32 = 0x0400;
    /// Field has default
    pub const HAS_DEFAULT: u32 = 0x8000;
    /// Field was emitted by the compiler, e.g. the backing field of an auto-property
    pub const COMPILER_GENERATED: u32 = 0x0001_0000;
}

/// A field declared on a `RuntimeType`
pub struct Field {
    /// Token
    pub token: Token,
    /// Name
    pub name: String,
    /// Flags (a bitmask of `FieldAttributes`)
    pub flags: u32,
    /// Declared type of the field
    pub field_type: RuntimeTypeRc,
    /// The type declaring this field
    pub declaring_type: RuntimeTypeRef,
    /// Instance slot, or static slot for static fields
    pub slot: usize,
    /// The constant of a literal field
    pub constant: Option<Value>,
}

impl Field {
    /// Returns true for static fields
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.flags & FieldAttributes::STATIC != 0
    }

    /// Returns true for public fields
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.flags & FieldAttributes::FIELD_ACCESS_MASK == FieldAttributes::PUBLIC
    }

    /// Returns true for compile time constants (which include enum members)
    #[must_use]
    pub fn is_literal(&self) -> bool {
        self.flags & FieldAttributes::LITERAL != 0
    }

    /// Returns true for readonly fields
    #[must_use]
    pub fn is_init_only(&self) -> bool {
        self.flags & FieldAttributes::INIT_ONLY != 0
    }

    /// Returns true for compiler emitted fields
    #[must_use]
    pub fn is_compiler_generated(&self) -> bool {
        self.flags & FieldAttributes::COMPILER_GENERATED != 0
    }

    /// The declaring type, if it is still alive
    #[must_use]
    pub fn declaring_type(&self) -> Option<RuntimeTypeRc> {
        self.declaring_type.upgrade()
    }
}

impl std::fmt::Debug for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("token", &self.token)
            .field("name", &self.name)
            .field("type", &self.field_type.fullname())
            .field("slot", &self.slot)
            .finish()
    }
}
