//! Member locator: resolves a symbolic reference to exactly one member.
//!
//! A lookup names a type, a member name (or a parameter signature for constructors and
//! indexers) and a [`BindingFlags`] filter. The locator walks the hierarchy from the given
//! type towards the root and applies the same rules to every member kind:
//!
//! - **Fast path**: with an exact (or case-insensitive) name and none of the partial,
//!   exclusion or trim flags, each type's declared members are checked in turn and the
//!   nearest level with a match wins. Two matches on that level are an
//!   [`Error::AmbiguousMatch`].
//! - **Full scan**: otherwise all levels are collected, most derived first, and run through
//!   the filter pipeline: name filter, then exclude backing members, then exclude
//!   explicitly implemented members, then exclude hidden members.
//! - **Overloads**: methods, constructors and indexers bind their parameter lists against
//!   explicit types or runtime values, preferring exact bindings over compatible ones and the
//!   nearest declaring type over its bases.
//!
//! # Examples
//!
//! ```rust
//! use dotreflect::{
//!     lookup,
//!     metadata::{flags::BindingFlags, typesystem::TypeRegistry},
//! };
//!
//! let registry = TypeRegistry::new();
//! let base = registry
//!     .class("Sample", "Base")
//!     .field("Id", registry.int32())
//!     .build()?;
//! let derived = registry
//!     .class("Sample", "Derived")
//!     .base(&base)
//!     .field("Id", registry.string())
//!     .build()?;
//!
//! let field = lookup::field(&derived, "Id", BindingFlags::default())?;
//! assert_eq!(field.field_type.fullname(), "System.String");
//!
//! let all = lookup::fields(&derived, BindingFlags::default());
//! assert_eq!(all.len(), 2);
//! let visible = lookup::fields(
//!     &derived,
//!     BindingFlags::default() | BindingFlags::EXCLUDE_HIDDEN_MEMBERS,
//! );
//! assert_eq!(visible.len(), 1);
//! # Ok::<(), dotreflect::Error>(())
//! ```

mod filter;
mod overload;

pub use filter::{
    is_explicit_implementation, name_matches, trim_explicit_implementation, LookupMember,
};
pub use overload::{bind_types, bind_values, Binding};

use crate::{
    metadata::{
        flags::{BindingFlags, MemberTypes},
        members::{format_signature, make_generic, FieldRc, MemberRef, MethodRc, PropertyRc},
        typesystem::{RuntimeTypeRc, TypeRegistry},
        value::Value,
    },
    Error, Result,
};

/// Locates a single member of kind `T` by name.
///
/// Returns `Ok(None)` when nothing matches.
///
/// # Errors
/// Returns [`Error::AmbiguousMatch`] if the fast path finds more than one member on the
/// nearest matching level.
pub fn locate<T: LookupMember>(
    ty: &RuntimeTypeRc,
    name: &str,
    kinds: MemberTypes,
    flags: BindingFlags,
) -> Result<Option<T>> {
    if flags.requires_full_scan() {
        return Ok(filter::scan::<T>(ty, Some(name), kinds, flags)
            .into_iter()
            .next()
            .map(|(_, member)| member));
    }

    let candidates = filter::layers::<T>(ty, Some(name), kinds, flags);
    let Some(depth) = candidates.first().map(|(depth, _)| *depth) else {
        return Ok(None);
    };

    let mut nearest = candidates
        .into_iter()
        .take_while(|(candidate_depth, _)| *candidate_depth == depth)
        .map(|(_, member)| member);
    let found = nearest.next();
    if nearest.next().is_some() {
        return Err(Error::AmbiguousMatch {
            type_name: ty.fullname(),
            name: name.to_string(),
        });
    }
    Ok(found)
}

/// Locates a single member of any of the `kinds`
///
/// # Errors
/// Returns [`Error::MemberNotFound`] or [`Error::AmbiguousMatch`].
pub fn member(ty: &RuntimeTypeRc, name: &str, kinds: MemberTypes, flags: BindingFlags) -> Result<MemberRef> {
    locate::<MemberRef>(ty, name, kinds, flags)?.ok_or_else(|| Error::MemberNotFound {
        type_name: ty.fullname(),
        name: name.to_string(),
    })
}

/// Locates a field
///
/// # Errors
/// Returns [`Error::FieldNotFound`] or [`Error::AmbiguousMatch`].
pub fn field(ty: &RuntimeTypeRc, name: &str, flags: BindingFlags) -> Result<FieldRc> {
    locate::<FieldRc>(ty, name, MemberTypes::FIELD, flags)?.ok_or_else(|| Error::FieldNotFound {
        type_name: ty.fullname(),
        name: name.to_string(),
    })
}

/// Locates a property
///
/// # Errors
/// Returns [`Error::PropertyNotFound`] or [`Error::AmbiguousMatch`].
pub fn property(ty: &RuntimeTypeRc, name: &str, flags: BindingFlags) -> Result<PropertyRc> {
    locate::<PropertyRc>(ty, name, MemberTypes::PROPERTY, flags)?.ok_or_else(|| {
        Error::PropertyNotFound {
            type_name: ty.fullname(),
            name: name.to_string(),
        }
    })
}

/// All members of the `kinds` that pass the filter, most derived first
#[must_use]
pub fn members(ty: &RuntimeTypeRc, kinds: MemberTypes, flags: BindingFlags) -> Vec<MemberRef> {
    strip(filter::scan(ty, None, kinds, flags))
}

/// All members of the `kinds` whose name passes the name filter, most derived first
#[must_use]
pub fn members_named(ty: &RuntimeTypeRc, name: &str, kinds: MemberTypes, flags: BindingFlags) -> Vec<MemberRef> {
    strip(filter::scan(ty, Some(name), kinds, flags))
}

/// All fields that pass the filter, most derived first
#[must_use]
pub fn fields(ty: &RuntimeTypeRc, flags: BindingFlags) -> Vec<FieldRc> {
    strip(filter::scan(ty, None, MemberTypes::FIELD, flags))
}

/// All properties (including indexers) that pass the filter, most derived first
#[must_use]
pub fn properties(ty: &RuntimeTypeRc, flags: BindingFlags) -> Vec<PropertyRc> {
    strip(filter::scan(ty, None, MemberTypes::PROPERTY, flags))
}

/// All methods that pass the filter, most derived first
#[must_use]
pub fn methods(ty: &RuntimeTypeRc, flags: BindingFlags) -> Vec<MethodRc> {
    strip(filter::scan(ty, None, MemberTypes::METHOD, flags))
}

/// All constructors declared on `ty` that pass the filter
#[must_use]
pub fn constructors(ty: &RuntimeTypeRc, flags: BindingFlags) -> Vec<MethodRc> {
    strip(filter::scan(
        ty,
        None,
        MemberTypes::CONSTRUCTOR,
        flags | BindingFlags::DECLARED_ONLY,
    ))
}

fn strip<T>(candidates: Vec<(usize, T)>) -> Vec<T> {
    candidates.into_iter().map(|(_, member)| member).collect()
}

/// Locates a method by name and parameter types; an empty `param_types` selects the
/// parameterless overload.
///
/// With `generic_args`, only generic definitions of matching arity are considered and the
/// returned method is the instantiation.
///
/// # Errors
/// Returns [`Error::MethodNotFound`] or [`Error::AmbiguousMatch`].
pub fn method(
    registry: &TypeRegistry,
    ty: &RuntimeTypeRc,
    name: &str,
    generic_args: &[RuntimeTypeRc],
    param_types: &[RuntimeTypeRc],
    flags: BindingFlags,
) -> Result<MethodRc> {
    let mut candidates = Vec::new();
    for (depth, method) in filter::scan::<MethodRc>(ty, Some(name), MemberTypes::METHOD, flags) {
        if generic_args.is_empty() {
            if !method.is_generic_definition() {
                candidates.push((depth, method));
            }
        } else if method.is_generic_definition() && method.generic_params.len() == generic_args.len() {
            candidates.push((depth, make_generic(registry, &method, generic_args)?));
        }
    }

    overload::pick(
        candidates,
        |method| bind_types(&method.params, param_types, flags),
        || Error::AmbiguousMatch {
            type_name: ty.fullname(),
            name: name.to_string(),
        },
    )?
    .ok_or_else(|| Error::MethodNotFound {
        type_name: ty.fullname(),
        name: format_signature(name, param_types),
    })
}

/// Locates a method whose parameters accept the runtime `args`
///
/// # Errors
/// Returns [`Error::MethodNotFound`] or [`Error::AmbiguousMatch`].
pub fn method_for_args(ty: &RuntimeTypeRc, name: &str, args: &[Value], flags: BindingFlags) -> Result<MethodRc> {
    let candidates = filter::scan::<MethodRc>(ty, Some(name), MemberTypes::METHOD, flags)
        .into_iter()
        .filter(|(_, method)| !method.is_generic_definition())
        .collect();

    overload::pick(
        candidates,
        |method| bind_values(&method.params, args),
        || Error::AmbiguousMatch {
            type_name: ty.fullname(),
            name: name.to_string(),
        },
    )?
    .ok_or_else(|| Error::MethodNotFound {
        type_name: ty.fullname(),
        name: format_value_signature(name, args),
    })
}

/// Locates a constructor declared on `ty` by parameter types; an empty `param_types` selects
/// the parameterless constructor.
///
/// # Errors
/// Returns [`Error::ConstructorNotFound`] (also for abstract types and interfaces) or
/// [`Error::AmbiguousMatch`].
pub fn constructor(ty: &RuntimeTypeRc, param_types: &[RuntimeTypeRc], flags: BindingFlags) -> Result<MethodRc> {
    let not_found = || Error::ConstructorNotFound {
        type_name: ty.fullname(),
        signature: format_signature("", param_types),
    };
    if ty.is_abstract() {
        return Err(not_found());
    }

    let candidates = filter::scan::<MethodRc>(
        ty,
        None,
        MemberTypes::CONSTRUCTOR,
        flags | BindingFlags::DECLARED_ONLY,
    );
    overload::pick(
        candidates,
        |ctor| bind_types(&ctor.params, param_types, flags),
        || Error::AmbiguousMatch {
            type_name: ty.fullname(),
            name: format_signature(".ctor", param_types),
        },
    )?
    .ok_or_else(not_found)
}

/// Locates a constructor whose parameters accept the runtime `args`
///
/// # Errors
/// Returns [`Error::ConstructorNotFound`] or [`Error::AmbiguousMatch`].
pub fn constructor_for_args(ty: &RuntimeTypeRc, args: &[Value], flags: BindingFlags) -> Result<MethodRc> {
    let not_found = || Error::ConstructorNotFound {
        type_name: ty.fullname(),
        signature: format_value_signature("", args),
    };
    if ty.is_abstract() {
        return Err(not_found());
    }

    let candidates = filter::scan::<MethodRc>(
        ty,
        None,
        MemberTypes::CONSTRUCTOR,
        flags | BindingFlags::DECLARED_ONLY,
    );
    overload::pick(
        candidates,
        |ctor| bind_values(&ctor.params, args),
        || Error::AmbiguousMatch {
            type_name: ty.fullname(),
            name: format_value_signature(".ctor", args),
        },
    )?
    .ok_or_else(not_found)
}

/// Locates an indexer by its index parameter types
///
/// # Errors
/// Returns [`Error::PropertyNotFound`] or [`Error::AmbiguousMatch`].
pub fn indexer(ty: &RuntimeTypeRc, index_types: &[RuntimeTypeRc], flags: BindingFlags) -> Result<PropertyRc> {
    let candidates = filter::scan::<PropertyRc>(ty, None, MemberTypes::PROPERTY, flags)
        .into_iter()
        .filter(|(_, property)| property.is_indexer())
        .collect();

    overload::pick(
        candidates,
        |property| bind_types(&property.index_params, index_types, flags),
        || Error::AmbiguousMatch {
            type_name: ty.fullname(),
            name: format_signature("Item", index_types),
        },
    )?
    .ok_or_else(|| Error::PropertyNotFound {
        type_name: ty.fullname(),
        name: format_signature("Item", index_types),
    })
}

fn format_value_signature(name: &str, args: &[Value]) -> String {
    let args: Vec<String> = args.iter().map(Value::type_name).collect();
    format!("{}({})", name, args.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::fixtures::Model;

    #[test]
    fn test_locate_field_and_property() {
        let registry = TypeRegistry::new();
        let model = Model::new(&registry);
        let flags = BindingFlags::default();

        let age = member(&model.person, "Age", MemberTypes::DATA, flags).unwrap();
        assert!(matches!(age, MemberRef::Field(_)));
        let name = member(&model.person, "Name", MemberTypes::DATA, flags).unwrap();
        assert!(matches!(name, MemberRef::Property(_)));

        assert!(matches!(
            field(&model.person, "Height", flags),
            Err(Error::FieldNotFound { .. })
        ));
        assert!(matches!(
            member(&model.person, "Height", MemberTypes::DATA, flags),
            Err(Error::MemberNotFound { .. })
        ));
    }

    #[test]
    fn test_visibility_and_storage_filters() {
        let registry = TypeRegistry::new();
        let model = Model::new(&registry);

        assert!(field(&model.person, "secret", BindingFlags::INSTANCE_ANY_VISIBILITY).is_ok());
        assert!(field(&model.person, "secret", BindingFlags::INSTANCE_PUBLIC).is_err());
        assert!(field(&model.person, "Count", BindingFlags::INSTANCE_ANY_VISIBILITY).is_err());
        assert!(field(&model.person, "Count", BindingFlags::STATIC_ANY_VISIBILITY).is_ok());
    }

    #[test]
    fn test_inheritance_precedence() {
        let registry = TypeRegistry::new();
        let model = Model::new(&registry);
        let flags = BindingFlags::default();

        let level = field(&model.manager, "Level", flags).unwrap();
        assert_eq!(level.field_type.token, registry.string().token);

        let level = field(&model.employee, "Level", flags | BindingFlags::DECLARED_ONLY).unwrap();
        assert_eq!(level.field_type.token, registry.int32().token);

        assert!(field(&model.manager, "Name", flags).is_err());
        assert!(property(&model.manager, "Name", flags).is_ok());
        assert!(property(&model.manager, "Name", flags | BindingFlags::DECLARED_ONLY).is_err());

        let all = members_named(&model.manager, "Level", MemberTypes::FIELD, flags);
        assert_eq!(all.len(), 2);
        let visible = members_named(
            &model.manager,
            "Level",
            MemberTypes::FIELD,
            flags | BindingFlags::EXCLUDE_HIDDEN_MEMBERS,
        );
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].value_type().unwrap().token, registry.string().token);
    }

    #[test]
    fn test_exclude_backing_members() {
        let registry = TypeRegistry::new();
        let model = Model::new(&registry);
        let flags = BindingFlags::default();

        let all = fields(&model.person, flags);
        assert!(all.iter().any(|field| field.is_compiler_generated()));
        let plain = fields(&model.person, flags | BindingFlags::EXCLUDE_BACKING_MEMBERS);
        assert!(plain.iter().all(|field| !field.is_compiler_generated()));

        let titles = members_named(&model.manager, "Title", MemberTypes::PROPERTY, flags);
        assert_eq!(titles.len(), 2);
        let titles = members_named(
            &model.manager,
            "Title",
            MemberTypes::PROPERTY,
            flags | BindingFlags::EXCLUDE_BACKING_MEMBERS,
        );
        assert_eq!(titles.len(), 1);
    }

    #[test]
    fn test_explicit_implementations() {
        let registry = TypeRegistry::new();
        let model = Model::new(&registry);
        let flags = BindingFlags::default() | BindingFlags::TRIM_EXPLICITLY_IMPLEMENTED;

        let describes = members_named(&model.person, "Describe", MemberTypes::METHOD, flags);
        assert_eq!(describes.len(), 2);
        let describes = members_named(
            &model.person,
            "Describe",
            MemberTypes::METHOD,
            flags | BindingFlags::EXCLUDE_EXPLICITLY_IMPLEMENTED,
        );
        assert_eq!(describes.len(), 1);
        assert_eq!(describes[0].name(), "Describe");
    }

    #[test]
    fn test_partial_and_case_insensitive_names() {
        let registry = TypeRegistry::new();
        let model = Model::new(&registry);

        let found = field(
            &model.person,
            "age",
            BindingFlags::default() | BindingFlags::IGNORE_CASE,
        )
        .unwrap();
        assert_eq!(found.name, "Age");

        let found = members_named(
            &model.person,
            "ree",
            MemberTypes::METHOD,
            BindingFlags::default() | BindingFlags::PARTIAL_NAME_MATCH,
        );
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn test_method_overloads() {
        let registry = TypeRegistry::new();
        let model = Model::new(&registry);
        let flags = BindingFlags::default();

        let greet = method(&registry, &model.person, "Greet", &[], &[], flags).unwrap();
        assert!(greet.params.is_empty());

        let greet = method(&registry, &model.person, "Greet", &[], &[registry.string()], flags).unwrap();
        assert_eq!(greet.params[0].param_type.token, registry.string().token);

        let greet = method(&registry, &model.person, "Greet", &[], &[registry.int32()], flags).unwrap();
        assert_eq!(greet.params[0].param_type.token, registry.object().token);

        assert!(matches!(
            method(
                &registry,
                &model.person,
                "Greet",
                &[],
                &[registry.int32()],
                flags | BindingFlags::EXACT_BINDING
            ),
            Err(Error::MethodNotFound { .. })
        ));
        assert!(matches!(
            member(&model.person, "Greet", MemberTypes::METHOD, flags),
            Err(Error::AmbiguousMatch { .. })
        ));
    }

    #[test]
    fn test_virtual_methods_bind_nearest() {
        let registry = TypeRegistry::new();
        let model = Model::new(&registry);

        let describe = method(
            &registry,
            &model.manager,
            "Describe",
            &[],
            &[],
            BindingFlags::default(),
        )
        .unwrap();
        assert_eq!(describe.declaring_type().unwrap().token, model.manager.token);
    }

    #[test]
    fn test_generic_method() {
        let registry = TypeRegistry::new();
        let model = Model::new(&registry);
        let int32 = registry.int32();

        let echo = method(
            &registry,
            &model.person,
            "Echo",
            &[int32.clone()],
            &[int32.clone()],
            BindingFlags::default(),
        )
        .unwrap();
        assert_eq!(echo.generic_args.len(), 1);
        assert_eq!(echo.return_type.as_ref().unwrap().token, int32.token);

        let again = method(
            &registry,
            &model.person,
            "Echo",
            &[int32.clone()],
            &[int32.clone()],
            BindingFlags::default(),
        )
        .unwrap();
        assert!(std::sync::Arc::ptr_eq(&echo, &again));

        assert!(method(&registry, &model.person, "Echo", &[], &[int32], BindingFlags::default()).is_err());
    }

    #[test]
    fn test_by_ref_parameters() {
        let registry = TypeRegistry::new();
        let model = Model::new(&registry);
        let int32 = registry.int32();

        assert!(method(&registry, &model.person, "TryDouble", &[], &[int32.clone()], BindingFlags::default()).is_err());
        assert!(method(
            &registry,
            &model.person,
            "TryDouble",
            &[],
            &[registry.by_ref(&int32)],
            BindingFlags::default()
        )
        .is_ok());
        assert!(method(
            &registry,
            &model.person,
            "TryDouble",
            &[],
            &[int32],
            BindingFlags::default() | BindingFlags::IGNORE_PARAMETER_MODIFIERS
        )
        .is_ok());
    }

    #[test]
    fn test_constructors() {
        let registry = TypeRegistry::new();
        let model = Model::new(&registry);
        let flags = BindingFlags::default();

        let ctor = constructor(&model.person, &[registry.string(), registry.int32()], flags).unwrap();
        assert_eq!(ctor.params.len(), 2);
        assert!(constructor(&model.person, &[], flags).is_ok());
        assert!(matches!(
            constructor(&model.person, &[registry.int32()], flags),
            Err(Error::ConstructorNotFound { .. })
        ));
        assert!(matches!(
            constructor(&model.named, &[], flags),
            Err(Error::ConstructorNotFound { .. })
        ));
        assert!(constructor(&model.manager, &[], flags).is_ok());
        assert_eq!(constructors(&model.person, flags).len(), 2);
    }

    #[test]
    fn test_lookup_by_values() {
        let registry = TypeRegistry::new();
        let model = Model::new(&registry);
        let flags = BindingFlags::default();

        let ctor = constructor_for_args(&model.person, &[Value::from("John"), Value::I32(1)], flags).unwrap();
        assert_eq!(ctor.params.len(), 2);

        let greet = method_for_args(&model.person, "Greet", &[Value::from("Hi")], flags).unwrap();
        assert_eq!(greet.params[0].param_type.token, registry.string().token);

        let greet = method_for_args(&model.person, "Greet", &[Value::I32(4)], flags).unwrap();
        assert_eq!(greet.params[0].param_type.token, registry.object().token);
    }

    #[test]
    fn test_indexer() {
        let registry = TypeRegistry::new();
        let model = Model::new(&registry);

        let item = indexer(&model.bag, &[registry.int32()], BindingFlags::default()).unwrap();
        assert!(item.is_indexer());
        assert!(matches!(
            indexer(&model.bag, &[registry.string()], BindingFlags::default()),
            Err(Error::PropertyNotFound { .. })
        ));
    }
}
