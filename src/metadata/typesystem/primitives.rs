use strum::{Display, EnumCount, EnumIter, IntoStaticStr};

use crate::metadata::{token::Token, value::Value};

/// Reserved token of `System.Void`
pub const VOID_TOKEN: Token = Token(0xF000_0001);
/// Reserved token of `System.Object`, the universal root
pub const OBJECT_TOKEN: Token = Token(0xF000_0010);
/// Reserved token of `System.String`
pub const STRING_TOKEN: Token = Token(0xF000_0011);
/// Reserved token of `System.ValueType`, the base of all structs and enums
pub const VALUE_TYPE_TOKEN: Token = Token(0xF000_0013);

/// Represents all primitive value types of the object model
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumCount, IntoStaticStr,
)]
pub enum PrimitiveKind {
    /// System.Boolean - true/false value
    Boolean,
    /// System.Char - Unicode character
    Char,
    /// System.SByte - signed 8-bit integer
    I1,
    /// System.Byte - unsigned 8-bit integer
    U1,
    /// System.Int16 - signed 16-bit integer
    I2,
    /// System.UInt16 - unsigned 16-bit integer
    U2,
    /// System.Int32 - signed 32-bit integer
    I4,
    /// System.UInt32 - unsigned 32-bit integer
    U4,
    /// System.Int64 - signed 64-bit integer
    I8,
    /// System.UInt64 - unsigned 64-bit integer
    U8,
    /// System.Single - 32-bit floating point
    R4,
    /// System.Double - 64-bit floating point
    R8,
}

impl PrimitiveKind {
    /// Get the reserved token for this primitive
    #[must_use]
    pub fn token(&self) -> Token {
        Token::new(match self {
            PrimitiveKind::Boolean => 0xF000_0002,
            PrimitiveKind::Char => 0xF000_0003,
            PrimitiveKind::I1 => 0xF000_0004,
            PrimitiveKind::U1 => 0xF000_0005,
            PrimitiveKind::I2 => 0xF000_0006,
            PrimitiveKind::U2 => 0xF000_0007,
            PrimitiveKind::I4 => 0xF000_0008,
            PrimitiveKind::U4 => 0xF000_0009,
            PrimitiveKind::I8 => 0xF000_000A,
            PrimitiveKind::U8 => 0xF000_000B,
            PrimitiveKind::R4 => 0xF000_000C,
            PrimitiveKind::R8 => 0xF000_000D,
        })
    }

    /// Position of this kind in the registry's primitive table
    #[must_use]
    pub fn index(&self) -> usize {
        (self.token().row() - 2) as usize
    }

    /// The runtime name of the primitive, without namespace
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "Boolean",
            PrimitiveKind::Char => "Char",
            PrimitiveKind::I1 => "SByte",
            PrimitiveKind::U1 => "Byte",
            PrimitiveKind::I2 => "Int16",
            PrimitiveKind::U2 => "UInt16",
            PrimitiveKind::I4 => "Int32",
            PrimitiveKind::U4 => "UInt32",
            PrimitiveKind::I8 => "Int64",
            PrimitiveKind::U8 => "UInt64",
            PrimitiveKind::R4 => "Single",
            PrimitiveKind::R8 => "Double",
        }
    }

    /// Returns true for the integral kinds, the only kinds an enum may use as underlying type
    #[must_use]
    pub fn is_integral(&self) -> bool {
        !matches!(
            self,
            PrimitiveKind::Boolean | PrimitiveKind::Char | PrimitiveKind::R4 | PrimitiveKind::R8
        )
    }

    /// The zero value of this kind
    #[must_use]
    pub fn default_value(&self) -> Value {
        match self {
            PrimitiveKind::Boolean => Value::Bool(false),
            PrimitiveKind::Char => Value::Char('\0'),
            PrimitiveKind::I1 => Value::I8(0),
            PrimitiveKind::U1 => Value::U8(0),
            PrimitiveKind::I2 => Value::I16(0),
            PrimitiveKind::U2 => Value::U16(0),
            PrimitiveKind::I4 => Value::I32(0),
            PrimitiveKind::U4 => Value::U32(0),
            PrimitiveKind::I8 => Value::I64(0),
            PrimitiveKind::U8 => Value::U64(0),
            PrimitiveKind::R4 => Value::F32(0.0),
            PrimitiveKind::R8 => Value::F64(0.0),
        }
    }

    /// Builds a value of this kind from the raw integral representation used by enums.
    ///
    /// Returns `None` for the non-integral kinds.
    #[must_use]
    pub fn from_raw(&self, raw: i64) -> Option<Value> {
        Some(match self {
            PrimitiveKind::I1 => Value::I8(raw as i8),
            PrimitiveKind::U1 => Value::U8(raw as u8),
            PrimitiveKind::I2 => Value::I16(raw as i16),
            PrimitiveKind::U2 => Value::U16(raw as u16),
            PrimitiveKind::I4 => Value::I32(raw as i32),
            PrimitiveKind::U4 => Value::U32(raw as u32),
            PrimitiveKind::I8 => Value::I64(raw),
            PrimitiveKind::U8 => Value::U64(raw as u64),
            _ => return None,
        })
    }

    /// Returns the primitive kind of a value, if it is a primitive
    #[must_use]
    pub fn of(value: &Value) -> Option<PrimitiveKind> {
        Some(match value {
            Value::Bool(_) => PrimitiveKind::Boolean,
            Value::Char(_) => PrimitiveKind::Char,
            Value::I8(_) => PrimitiveKind::I1,
            Value::U8(_) => PrimitiveKind::U1,
            Value::I16(_) => PrimitiveKind::I2,
            Value::U16(_) => PrimitiveKind::U2,
            Value::I32(_) => PrimitiveKind::I4,
            Value::U32(_) => PrimitiveKind::U4,
            Value::I64(_) => PrimitiveKind::I8,
            Value::U64(_) => PrimitiveKind::U8,
            Value::F32(_) => PrimitiveKind::R4,
            Value::F64(_) => PrimitiveKind::R8,
            _ => return None,
        })
    }
}
