//! Immutable, value-comparable keys identifying what an accessor targets.
//!
//! Descriptors compare and hash on metadata tokens only, so two descriptors built from
//! separate lookups of the same member are equal and share one cache entry.

use std::hash::{Hash, Hasher};

use crate::{
    metadata::{
        members::{format_signature, MemberRef, MethodRc, CONSTRUCTOR_NAME},
        token::Token,
        typesystem::RuntimeTypeRc,
    },
    Result,
};

/// Identifies a single field or property accessed through a target type
#[derive(Clone, Debug)]
pub struct MemberDescriptor {
    /// The type the accessor is requested for; the member is declared on it or a base
    pub target_type: RuntimeTypeRc,
    /// The resolved member
    pub member: MemberRef,
}

impl MemberDescriptor {
    /// Create a descriptor for a field or property
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for methods and constructors.
    pub fn new(target_type: &RuntimeTypeRc, member: MemberRef) -> Result<Self> {
        if !matches!(member, MemberRef::Field(_) | MemberRef::Property(_)) {
            return Err(malformed_error!(
                "{} on {} is not a field or property",
                member.name(),
                target_type.fullname()
            ));
        }

        Ok(MemberDescriptor {
            target_type: target_type.clone(),
            member,
        })
    }

    /// Name of the member
    #[must_use]
    pub fn name(&self) -> &str {
        self.member.name()
    }

    /// Declared type of the member
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the member has no value type.
    pub fn value_type(&self) -> Result<RuntimeTypeRc> {
        self.member
            .value_type()
            .ok_or_else(|| malformed_error!("{} has no value type", self.name()))
    }

    /// Returns true for static members
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.member.is_static()
    }

    /// Returns true if a getter can be emitted
    #[must_use]
    pub fn can_read(&self) -> bool {
        self.member.can_read()
    }

    /// Returns true if a setter can be emitted
    #[must_use]
    pub fn can_write(&self) -> bool {
        self.member.can_write()
    }
}

impl PartialEq for MemberDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.target_type.token == other.target_type.token && self.member == other.member
    }
}

impl Eq for MemberDescriptor {}

impl Hash for MemberDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.target_type.token.hash(state);
        self.member.token().hash(state);
    }
}

/// Identifies a constructor or method target
#[derive(Clone, Debug)]
pub struct CallDescriptor {
    /// The type the call is made on
    pub target_type: RuntimeTypeRc,
    /// The resolved method; `None` for the implicit zero-initializing constructor
    pub method: Option<MethodRc>,
    /// Method name, `.ctor` for constructors
    pub name: String,
    /// Declared parameter types, in order
    pub param_types: Vec<RuntimeTypeRc>,
    /// Type arguments of a generic method instantiation
    pub generic_args: Vec<RuntimeTypeRc>,
    /// Returns true for static methods
    pub is_static: bool,
}

impl CallDescriptor {
    /// Describes a call of `method` through `target_type`
    #[must_use]
    pub fn method(target_type: &RuntimeTypeRc, method: &MethodRc) -> Self {
        CallDescriptor {
            target_type: target_type.clone(),
            method: Some(method.clone()),
            name: method.name.clone(),
            param_types: method.param_types(),
            generic_args: method.generic_args.clone(),
            is_static: method.is_static(),
        }
    }

    /// Describes a constructor of `target_type`; `None` selects the implicit parameterless
    /// constructor of value types and the uninitialized allocation of reference types
    #[must_use]
    pub fn constructor(target_type: &RuntimeTypeRc, ctor: Option<&MethodRc>) -> Self {
        CallDescriptor {
            target_type: target_type.clone(),
            method: ctor.cloned(),
            name: CONSTRUCTOR_NAME.to_string(),
            param_types: ctor.map(|ctor| ctor.param_types()).unwrap_or_default(),
            generic_args: Vec::new(),
            is_static: false,
        }
    }

    /// Returns true for constructors
    #[must_use]
    pub fn is_constructor(&self) -> bool {
        self.name == CONSTRUCTOR_NAME
    }

    /// Readable signature, e.g. `Greet(System.String)`
    #[must_use]
    pub fn signature(&self) -> String {
        format_signature(&self.name, &self.param_types)
    }
}

impl PartialEq for CallDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.target_type.token == other.target_type.token
            && self.method.as_ref().map(|method| method.token)
                == other.method.as_ref().map(|method| method.token)
            && self.name == other.name
            && self.is_static == other.is_static
            && tokens(&self.param_types) == tokens(&other.param_types)
            && tokens(&self.generic_args) == tokens(&other.generic_args)
    }
}

impl Eq for CallDescriptor {}

impl Hash for CallDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.target_type.token.hash(state);
        self.method.as_ref().map(|method| method.token).hash(state);
        self.name.hash(state);
        self.is_static.hash(state);
        tokens(&self.param_types).hash(state);
        tokens(&self.generic_args).hash(state);
    }
}

/// Identifies an ordered, fixed list of fields and properties on one type. Values are
/// applied positionally in this order.
#[derive(Clone, Debug)]
pub struct BatchDescriptor {
    /// The type the members are accessed through
    pub target_type: RuntimeTypeRc,
    /// The members, in application order
    pub members: Vec<MemberRef>,
}

impl BatchDescriptor {
    /// Create a batch descriptor
    #[must_use]
    pub fn new(target_type: &RuntimeTypeRc, members: Vec<MemberRef>) -> Self {
        BatchDescriptor {
            target_type: target_type.clone(),
            members,
        }
    }
}

impl PartialEq for BatchDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.target_type.token == other.target_type.token && self.members == other.members
    }
}

impl Eq for BatchDescriptor {}

impl Hash for BatchDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.target_type.token.hash(state);
        for member in &self.members {
            member.token().hash(state);
        }
    }
}

/// Pairs members of a source type with the members of a target type that receive their
/// values
#[derive(Clone, Debug)]
pub struct MapDescriptor {
    /// The type values are read from
    pub source_type: RuntimeTypeRc,
    /// The type values are written to
    pub target_type: RuntimeTypeRc,
    /// `(source member, target member)` pairs, in application order
    pub pairs: Vec<(MemberRef, MemberRef)>,
}

impl PartialEq for MapDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.source_type.token == other.source_type.token
            && self.target_type.token == other.target_type.token
            && self.pairs == other.pairs
    }
}

impl Eq for MapDescriptor {}

impl Hash for MapDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source_type.token.hash(state);
        self.target_type.token.hash(state);
        for (source, target) in &self.pairs {
            source.token().hash(state);
            target.token().hash(state);
        }
    }
}

/// Identifies element access on an array type
#[derive(Clone, Debug)]
pub struct ArrayDescriptor {
    /// The array type
    pub array_type: RuntimeTypeRc,
}

impl PartialEq for ArrayDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.array_type.token == other.array_type.token
    }
}

impl Eq for ArrayDescriptor {}

impl Hash for ArrayDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.array_type.token.hash(state);
    }
}

fn tokens(types: &[RuntimeTypeRc]) -> Vec<Token> {
    types.iter().map(|ty| ty.token).collect()
}

#[cfg(test)]
mod tests {
    use std::collections::hash_map::DefaultHasher;

    use super::*;
    use crate::{
        lookup,
        metadata::{flags::BindingFlags, typesystem::TypeRegistry},
        test::fixtures::Model,
    };

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_member_descriptor_equality() {
        let registry = TypeRegistry::new();
        let model = Model::new(&registry);

        let first = MemberDescriptor::new(
            &model.person,
            lookup::field(&model.person, "Age", BindingFlags::default()).unwrap().into(),
        )
        .unwrap();
        let second = MemberDescriptor::new(
            &model.person,
            lookup::field(&model.person, "Age", BindingFlags::default()).unwrap().into(),
        )
        .unwrap();
        assert_eq!(first, second);
        assert_eq!(hash_of(&first), hash_of(&second));

        let through_manager = MemberDescriptor::new(
            &model.manager,
            lookup::property(&model.manager, "Name", BindingFlags::default()).unwrap().into(),
        )
        .unwrap();
        let through_employee = MemberDescriptor::new(
            &model.employee,
            lookup::property(&model.employee, "Name", BindingFlags::default()).unwrap().into(),
        )
        .unwrap();
        assert_ne!(through_manager, through_employee);
    }

    #[test]
    fn test_member_descriptor_rejects_methods() {
        let registry = TypeRegistry::new();
        let model = Model::new(&registry);
        let describe = model.person.declared_methods("Describe").remove(0);

        assert!(MemberDescriptor::new(&model.person, describe.into()).is_err());
    }

    #[test]
    fn test_call_descriptor_equality() {
        let registry = TypeRegistry::new();
        let model = Model::new(&registry);
        let greet = lookup::method(
            &registry,
            &model.person,
            "Greet",
            &[],
            &[registry.string()],
            BindingFlags::default(),
        )
        .unwrap();

        let first = CallDescriptor::method(&model.person, &greet);
        let second = CallDescriptor::method(&model.person, &greet);
        assert_eq!(first, second);
        assert_eq!(hash_of(&first), hash_of(&second));
        assert_eq!(first.signature(), "Greet(System.String)");

        let implicit = CallDescriptor::constructor(&model.animal, None);
        assert!(implicit.is_constructor());
        assert!(implicit.param_types.is_empty());
        assert_ne!(implicit, CallDescriptor::constructor(&model.person, None));
    }
}
