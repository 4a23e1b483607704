//! Runtime values of the object model.
//!
//! [`Value`] is the universal channel through which accessors receive targets and arguments
//! and return results. Primitives, strings, enums and structs are values with value equality;
//! objects, arrays and holders are shared references compared by identity.
//!
//! # Examples
//!
//! ```rust
//! use dotreflect::metadata::value::{Value, ValueHolder};
//!
//! let age = Value::from(21);
//! assert_eq!(age.as_i32(), Some(21));
//!
//! let name = Value::from("John Doe");
//! assert_eq!(name.as_str(), Some("John Doe"));
//!
//! let holder = ValueHolder::new(age);
//! holder.set(35);
//! assert_eq!(holder.get(), Value::I32(35));
//! ```

mod array;
mod holder;
mod object;

use std::sync::Arc;

pub use array::ArrayRef;
pub use holder::ValueHolder;
pub use object::{EnumValue, ObjectRef, StructValue};

use crate::{
    metadata::typesystem::{PrimitiveKind, RuntimeTypeRc, TypeFlavor},
    Error, Result,
};

/// A dynamically typed runtime value
#[derive(Clone, Default, PartialEq)]
pub enum Value {
    /// The null reference
    #[default]
    Null,
    /// System.Boolean
    Bool(bool),
    /// System.Char
    Char(char),
    /// System.SByte
    I8(i8),
    /// System.Byte
    U8(u8),
    /// System.Int16
    I16(i16),
    /// System.UInt16
    U16(u16),
    /// System.Int32
    I32(i32),
    /// System.UInt32
    U32(u32),
    /// System.Int64
    I64(i64),
    /// System.UInt64
    U64(u64),
    /// System.Single
    F32(f32),
    /// System.Double
    F64(f64),
    /// System.String
    String(Arc<str>),
    /// A value of an enumeration
    Enum(EnumValue),
    /// A boxed copy of a struct
    Struct(StructValue),
    /// A shared reference to an instance of a class
    Object(ObjectRef),
    /// A shared reference to an array
    Array(ArrayRef),
    /// A shared cell around a struct, for in-place mutation
    Holder(ValueHolder),
}

impl Value {
    /// The zero value of `ty`: zero for primitives and enums, a zero-initialized struct for
    /// structs and `Null` for everything else
    #[must_use]
    pub fn default_for(ty: &RuntimeTypeRc) -> Value {
        match ty.flavor {
            TypeFlavor::Primitive(kind) => kind.default_value(),
            TypeFlavor::Enum { .. } => Value::Enum(EnumValue::new(ty.clone(), 0)),
            TypeFlavor::ValueType => Value::Struct(StructValue::default_for(ty)),
            _ => Value::Null,
        }
    }

    /// Narrows `self` to a value that can be stored in a location of type `ty`.
    ///
    /// Values already accepted by `ty` pass through unchanged. Holders are unwrapped, an enum
    /// and its underlying primitive are converted into each other, everything else fails.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if the value is not compatible with `ty`.
    pub fn coerce_to(self, ty: &RuntimeTypeRc) -> Result<Value> {
        if ty.accepts(&self) {
            return Ok(self);
        }

        match (ty.flavor, self) {
            (_, Value::Holder(holder)) => holder.get().coerce_to(ty),
            (TypeFlavor::ByRef, value) => match ty.element_type() {
                Some(element) => value.coerce_to(&element),
                None => Err(Error::invalid_argument(ty.fullname(), value.type_name())),
            },
            (TypeFlavor::Enum { underlying }, value)
                if PrimitiveKind::of(&value) == Some(underlying) =>
            {
                match value.as_i64() {
                    Some(raw) => Ok(Value::Enum(EnumValue::new(ty.clone(), raw))),
                    None => Err(Error::invalid_argument(ty.fullname(), value.type_name())),
                }
            }
            (TypeFlavor::Primitive(kind), Value::Enum(inner))
                if inner.runtime_type().flavor.to_primitive_kind() == Some(kind) =>
            {
                kind.from_raw(inner.raw())
                    .ok_or_else(|| Error::invalid_argument(ty.fullname(), kind.name()))
            }
            (_, value) => Err(Error::invalid_argument(ty.fullname(), value.type_name())),
        }
    }

    /// Human readable name of the runtime type of the value, used in error messages
    #[must_use]
    pub fn type_name(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::String(_) => "System.String".to_string(),
            Value::Enum(inner) => inner.runtime_type().fullname(),
            Value::Struct(inner) => inner.runtime_type().fullname(),
            Value::Object(inner) => inner.runtime_type().fullname(),
            Value::Array(inner) => inner.runtime_type().fullname(),
            Value::Holder(inner) => format!("ValueHolder<{}>", inner.get().type_name()),
            primitive => match PrimitiveKind::of(primitive) {
                Some(kind) => format!("System.{}", kind.name()),
                None => "unknown".to_string(),
            },
        }
    }

    /// The runtime type of reference and user declared values; `None` for null, primitives
    /// and strings, whose types live in the registry
    #[must_use]
    pub fn runtime_type(&self) -> Option<RuntimeTypeRc> {
        match self {
            Value::Enum(inner) => Some(inner.runtime_type().clone()),
            Value::Struct(inner) => Some(inner.runtime_type().clone()),
            Value::Object(inner) => Some(inner.runtime_type().clone()),
            Value::Array(inner) => Some(inner.runtime_type().clone()),
            Value::Holder(inner) => inner.get().runtime_type(),
            _ => None,
        }
    }

    /// Returns true for `Null`
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Extracts a boolean
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Extracts a char
    #[must_use]
    pub fn as_char(&self) -> Option<char> {
        match self {
            Value::Char(value) => Some(*value),
            _ => None,
        }
    }

    /// Extracts an `Int32`, or the raw value of an enum backed by one
    #[must_use]
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::I32(value) => Some(*value),
            Value::Enum(inner)
                if inner.runtime_type().flavor.to_primitive_kind() == Some(PrimitiveKind::I4) =>
            {
                i32::try_from(inner.raw()).ok()
            }
            _ => None,
        }
    }

    /// Extracts any integral value widened to 64 bits (enums yield their raw value)
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I8(value) => Some(i64::from(*value)),
            Value::U8(value) => Some(i64::from(*value)),
            Value::I16(value) => Some(i64::from(*value)),
            Value::U16(value) => Some(i64::from(*value)),
            Value::I32(value) => Some(i64::from(*value)),
            Value::U32(value) => Some(i64::from(*value)),
            Value::I64(value) => Some(*value),
            Value::U64(value) => Some(*value as i64),
            Value::Enum(inner) => Some(inner.raw()),
            _ => None,
        }
    }

    /// Extracts a floating point value
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F32(value) => Some(f64::from(*value)),
            Value::F64(value) => Some(*value),
            _ => None,
        }
    }

    /// Extracts a string slice
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    /// Extracts an object reference
    #[must_use]
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(value) => Some(value),
            _ => None,
        }
    }

    /// Extracts an array reference
    #[must_use]
    pub fn as_array(&self) -> Option<&ArrayRef> {
        match self {
            Value::Array(value) => Some(value),
            _ => None,
        }
    }

    /// Extracts a struct
    #[must_use]
    pub fn as_struct(&self) -> Option<&StructValue> {
        match self {
            Value::Struct(value) => Some(value),
            _ => None,
        }
    }

    /// Extracts an enum value
    #[must_use]
    pub fn as_enum(&self) -> Option<&EnumValue> {
        match self {
            Value::Enum(value) => Some(value),
            _ => None,
        }
    }

    /// Extracts a holder
    #[must_use]
    pub fn as_holder(&self) -> Option<&ValueHolder> {
        match self {
            Value::Holder(value) => Some(value),
            _ => None,
        }
    }

    /// Reads an instance slot of an object, a struct or a held struct
    ///
    /// # Errors
    /// Returns [`Error::NullTarget`] for `Null` and [`Error::InvalidArgument`] for values
    /// without instance slots.
    pub fn load_slot(&self, slot: usize) -> Result<Value> {
        match self {
            Value::Object(object) => object.load(slot),
            Value::Struct(inner) => inner.load(slot),
            Value::Holder(holder) => holder.with(|held| held.load_slot(slot)),
            Value::Null => Err(Error::NullTarget(format!("slot {slot}"))),
            other => Err(Error::invalid_argument("an instance with slots", other.type_name())),
        }
    }

    /// Writes an instance slot of an object or a held struct.
    ///
    /// Naked structs are copies, writing to them would be lost, so they are rejected.
    ///
    /// # Errors
    /// Returns [`Error::NullTarget`] for `Null` and [`Error::InvalidArgument`] for values
    /// that cannot be written in place.
    pub fn store_slot(&self, slot: usize, value: Value) -> Result<()> {
        match self {
            Value::Object(object) => object.store(slot, value),
            Value::Holder(holder) => holder.update(|held| match held {
                Value::Struct(inner) => inner.store(slot, value),
                Value::Object(object) => object.store(slot, value),
                other => Err(Error::invalid_argument("a struct", other.type_name())),
            }),
            Value::Struct(inner) => Err(Error::invalid_argument(
                format!("ValueHolder<{}>", inner.runtime_type().fullname()),
                self.type_name(),
            )),
            Value::Null => Err(Error::NullTarget(format!("slot {slot}"))),
            other => Err(Error::invalid_argument("an instance with slots", other.type_name())),
        }
    }

    /// Wraps a struct in a new [`ValueHolder`]; holders are returned as they are
    #[must_use]
    pub fn into_holder(self) -> Value {
        match self {
            Value::Holder(_) => self,
            value => Value::Holder(ValueHolder::new(value)),
        }
    }

    /// Unwraps a holder into a copy of its value; other values are returned as they are
    #[must_use]
    pub fn unwrap_holder(self) -> Value {
        match self {
            Value::Holder(holder) => holder.get(),
            value => value,
        }
    }
}

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(value) => write!(f, "{value}"),
            Value::Char(value) => write!(f, "{value:?}"),
            Value::I8(value) => write!(f, "{value}i8"),
            Value::U8(value) => write!(f, "{value}u8"),
            Value::I16(value) => write!(f, "{value}i16"),
            Value::U16(value) => write!(f, "{value}u16"),
            Value::I32(value) => write!(f, "{value}"),
            Value::U32(value) => write!(f, "{value}u32"),
            Value::I64(value) => write!(f, "{value}i64"),
            Value::U64(value) => write!(f, "{value}u64"),
            Value::F32(value) => write!(f, "{value}f32"),
            Value::F64(value) => write!(f, "{value}f64"),
            Value::String(value) => write!(f, "{value:?}"),
            Value::Enum(value) => value.fmt(f),
            Value::Struct(value) => value.fmt(f),
            Value::Object(value) => value.fmt(f),
            Value::Array(value) => value.fmt(f),
            Value::Holder(value) => value.fmt(f),
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value)
                }
            }
        )*
    };
}

value_from! {
    bool => Bool,
    char => Char,
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    EnumValue => Enum,
    StructValue => Struct,
    ObjectRef => Object,
    ArrayRef => Array,
    ValueHolder => Holder,
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(Arc::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(Arc::from(value))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
