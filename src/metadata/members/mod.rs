//! Members of runtime types: fields, properties, methods and constructors.
//!
//! Members are created by the [`crate::metadata::typesystem::TypeBuilder`] and stored in the
//! append-only lists of their declaring type. Each member keeps a weak reference to its
//! declaring type and strong references to the types it uses.
//!
//! [`MemberRef`] unifies the member kinds for the lookups that may return more than one kind,
//! e.g. a getter lookup that accepts both fields and properties.

mod field;
mod method;
mod property;

use strum::{Display, EnumIter};

pub use field::{Field, FieldAttributes, FieldList, FieldRc};
pub use method::{
    format_signature, make_generic, Invocation, Method, MethodAttributes, MethodBody, MethodList,
    MethodRc, CONSTRUCTOR_NAME,
};
pub use property::{Property, PropertyAttributes, PropertyList, PropertyRc};

use crate::metadata::{
    flags::MemberTypes,
    token::Token,
    typesystem::{RuntimeTypeRc, RuntimeTypeRef},
};

/// A named, typed parameter of a method, constructor or indexer
#[derive(Clone)]
pub struct Param {
    /// Name
    pub name: String,
    /// Declared type; a by-ref type for `ref` and `out` parameters
    pub param_type: RuntimeTypeRc,
}

impl Param {
    /// Create a new parameter
    pub fn new(name: impl Into<String>, param_type: &RuntimeTypeRc) -> Self {
        Param {
            name: name.into(),
            param_type: param_type.clone(),
        }
    }

    /// Returns true for by-ref parameters
    #[must_use]
    pub fn is_by_ref(&self) -> bool {
        self.param_type.is_by_ref()
    }

    /// The type values are narrowed to: the element type for by-ref parameters, the declared
    /// type otherwise
    #[must_use]
    pub fn value_type(&self) -> RuntimeTypeRc {
        if self.is_by_ref() {
            if let Some(element) = self.param_type.element_type() {
                return element;
            }
        }
        self.param_type.clone()
    }
}

impl std::fmt::Debug for Param {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.param_type.fullname())
    }
}

/// The kind of a member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum MemberKind {
    /// A field
    Field,
    /// A property or indexer
    Property,
    /// A method
    Method,
    /// A constructor
    Constructor,
}

impl MemberKind {
    /// The `MemberTypes` bit of this kind
    #[must_use]
    pub fn mask(&self) -> MemberTypes {
        match self {
            MemberKind::Field => MemberTypes::FIELD,
            MemberKind::Property => MemberTypes::PROPERTY,
            MemberKind::Method => MemberTypes::METHOD,
            MemberKind::Constructor => MemberTypes::CONSTRUCTOR,
        }
    }
}

/// A reference to any member of a type
#[derive(Clone, Debug)]
pub enum MemberRef {
    /// A field
    Field(FieldRc),
    /// A property or indexer
    Property(PropertyRc),
    /// A method
    Method(MethodRc),
    /// A constructor
    Constructor(MethodRc),
}

impl MemberRef {
    /// The kind of the member
    #[must_use]
    pub fn kind(&self) -> MemberKind {
        match self {
            MemberRef::Field(_) => MemberKind::Field,
            MemberRef::Property(_) => MemberKind::Property,
            MemberRef::Method(_) => MemberKind::Method,
            MemberRef::Constructor(_) => MemberKind::Constructor,
        }
    }

    /// Token of the member
    #[must_use]
    pub fn token(&self) -> Token {
        match self {
            MemberRef::Field(field) => field.token,
            MemberRef::Property(property) => property.token,
            MemberRef::Method(method) | MemberRef::Constructor(method) => method.token,
        }
    }

    /// Name of the member
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            MemberRef::Field(field) => &field.name,
            MemberRef::Property(property) => &property.name,
            MemberRef::Method(method) | MemberRef::Constructor(method) => &method.name,
        }
    }

    /// Returns true for static members
    #[must_use]
    pub fn is_static(&self) -> bool {
        match self {
            MemberRef::Field(field) => field.is_static(),
            MemberRef::Property(property) => property.is_static(),
            MemberRef::Method(method) | MemberRef::Constructor(method) => method.is_static(),
        }
    }

    /// Returns true for public members
    #[must_use]
    pub fn is_public(&self) -> bool {
        match self {
            MemberRef::Field(field) => field.is_public(),
            MemberRef::Property(property) => property.is_public(),
            MemberRef::Method(method) | MemberRef::Constructor(method) => method.is_public(),
        }
    }

    /// Weak reference to the declaring type
    #[must_use]
    pub fn declaring_type_ref(&self) -> &RuntimeTypeRef {
        match self {
            MemberRef::Field(field) => &field.declaring_type,
            MemberRef::Property(property) => &property.declaring_type,
            MemberRef::Method(method) | MemberRef::Constructor(method) => &method.declaring_type,
        }
    }

    /// The type a getter returns or a setter accepts: the field or property type, or the
    /// return type of a method
    #[must_use]
    pub fn value_type(&self) -> Option<RuntimeTypeRc> {
        match self {
            MemberRef::Field(field) => Some(field.field_type.clone()),
            MemberRef::Property(property) => Some(property.property_type.clone()),
            MemberRef::Method(method) | MemberRef::Constructor(method) => {
                method.return_type.clone()
            }
        }
    }

    /// Returns true if a getter can be emitted for this member
    #[must_use]
    pub fn can_read(&self) -> bool {
        match self {
            MemberRef::Field(_) => true,
            MemberRef::Property(property) => property.can_read() && !property.is_indexer(),
            _ => false,
        }
    }

    /// Returns true if a setter can be emitted for this member
    #[must_use]
    pub fn can_write(&self) -> bool {
        match self {
            MemberRef::Field(field) => !field.is_literal(),
            MemberRef::Property(property) => property.can_write() && !property.is_indexer(),
            _ => false,
        }
    }

    /// Returns the field, if this is one
    #[must_use]
    pub fn as_field(&self) -> Option<&FieldRc> {
        match self {
            MemberRef::Field(field) => Some(field),
            _ => None,
        }
    }

    /// Returns the property, if this is one
    #[must_use]
    pub fn as_property(&self) -> Option<&PropertyRc> {
        match self {
            MemberRef::Property(property) => Some(property),
            _ => None,
        }
    }

    /// Returns the method or constructor, if this is one
    #[must_use]
    pub fn as_method(&self) -> Option<&MethodRc> {
        match self {
            MemberRef::Method(method) | MemberRef::Constructor(method) => Some(method),
            _ => None,
        }
    }
}

impl PartialEq for MemberRef {
    fn eq(&self, other: &Self) -> bool {
        self.token() == other.token()
    }
}

impl Eq for MemberRef {}

impl From<FieldRc> for MemberRef {
    fn from(field: FieldRc) -> Self {
        MemberRef::Field(field)
    }
}

impl From<PropertyRc> for MemberRef {
    fn from(property: PropertyRc) -> Self {
        MemberRef::Property(property)
    }
}

impl From<MethodRc> for MemberRef {
    fn from(method: MethodRc) -> Self {
        if method.is_constructor() {
            MemberRef::Constructor(method)
        } else {
            MemberRef::Method(method)
        }
    }
}
