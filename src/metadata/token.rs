use std::fmt;
use std::hash::{Hash, Hasher};

/// Table identifiers stored in the high byte of a [`Token`].
///
/// The values follow the ECMA-335 table numbering for the tables that have a counterpart in
/// the object model; built-in types live in the reserved `0xF0` range.
#[allow(non_snake_case)]
pub mod TableId {
    /// Types registered through a `TypeBuilder`
    pub const TYPE_DEF: u8 = 0x02;
    /// Fields
    pub const FIELD: u8 = 0x04;
    /// Methods and constructors
    pub const METHOD_DEF: u8 = 0x06;
    /// Properties and indexers
    pub const PROPERTY: u8 = 0x17;
    /// Constructed types (arrays, by-ref types, generic parameters)
    pub const TYPE_SPEC: u8 = 0x1B;
    /// Instantiations of generic method definitions
    pub const METHOD_SPEC: u8 = 0x2B;
    /// Built-in types (primitives, `System.Object`, `System.String`)
    pub const BUILTIN: u8 = 0xF0;
}

/// A metadata token identifying one entry of the object model.
///
/// Tokens consist of a 32-bit value where:
/// - The high byte (bits 24-31) indicates the table type (see [`TableId`])
/// - The low 24 bits (bits 0-23) indicate the row index within that table
///
/// Tokens are allocated by a [`crate::metadata::typesystem::TypeRegistry`] and are unique
/// within it, which makes them the identity used by accessor cache keys.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Token(pub u32);

impl Token {
    /// Creates a new token from a raw 32-bit value
    #[must_use]
    pub fn new(value: u32) -> Self {
        Token(value)
    }

    /// Creates a token from a table id and a row
    #[must_use]
    pub fn from_parts(table: u8, row: u32) -> Self {
        Token((u32::from(table) << 24) | (row & 0x00FF_FFFF))
    }

    /// Returns the raw token value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Extracts the table type from the token (high byte)
    #[must_use]
    pub fn table(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Extracts the row index from the token (low 24 bits)
    #[must_use]
    pub fn row(&self) -> u32 {
        self.0 & 0x00FF_FFFF
    }

    /// Returns true if this is a null token (value 0)
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl From<u32> for Token {
    fn from(value: u32) -> Self {
        Token(value)
    }
}

impl From<Token> for u32 {
    fn from(token: Token) -> Self {
        token.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token(0x{:08x}, table: 0x{:02x}, row: {})",
            self.0,
            self.table(),
            self.row()
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}
