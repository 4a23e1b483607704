//! Overload resolution over declared parameter lists.

use crate::{
    metadata::{
        flags::BindingFlags,
        members::Param,
        typesystem::{PrimitiveKind, RuntimeTypeRc, TypeFlavor},
        value::Value,
    },
    Result,
};

/// How well a parameter list binds to the supplied types or values
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Binding {
    /// Every parameter accepts its argument after widening, boxing or enum conversion
    Compatible,
    /// Every parameter has exactly the type of its argument
    Exact,
}

/// Binds `params` against explicit parameter types.
///
/// With [`BindingFlags::IGNORE_PARAMETER_MODIFIERS`] a by-ref parameter also binds to its
/// element type. With [`BindingFlags::EXACT_BINDING`] only exact bindings are reported.
#[must_use]
pub fn bind_types(params: &[Param], types: &[RuntimeTypeRc], flags: BindingFlags) -> Option<Binding> {
    if params.len() != types.len() {
        return None;
    }

    let ignore_modifiers = flags.contains(BindingFlags::IGNORE_PARAMETER_MODIFIERS);
    let mut binding = Binding::Exact;
    for (param, given) in params.iter().zip(types) {
        let declared = if ignore_modifiers && !given.is_by_ref() {
            param.value_type()
        } else {
            param.param_type.clone()
        };

        if declared.token == given.token {
            continue;
        }
        if declared.is_assignable_from(given) {
            binding = Binding::Compatible;
            continue;
        }
        return None;
    }

    if binding == Binding::Compatible && flags.contains(BindingFlags::EXACT_BINDING) {
        return None;
    }
    Some(binding)
}

/// Binds `params` against runtime argument values. `Null` binds to any reference typed
/// parameter, holders bind through their content and by-ref parameters through their
/// element type.
#[must_use]
pub fn bind_values(params: &[Param], args: &[Value]) -> Option<Binding> {
    if params.len() != args.len() {
        return None;
    }

    let mut binding = Binding::Exact;
    for (param, arg) in params.iter().zip(args) {
        let declared = param.value_type();
        if is_exact(&declared, arg) {
            continue;
        }
        if declared.accepts(arg) || arg.clone().coerce_to(&declared).is_ok() {
            binding = Binding::Compatible;
            continue;
        }
        return None;
    }
    Some(binding)
}

fn is_exact(declared: &RuntimeTypeRc, arg: &Value) -> bool {
    match arg {
        Value::Null => false,
        Value::String(_) => declared.flavor == TypeFlavor::String,
        other => match other.runtime_type() {
            Some(actual) => actual.token == declared.token,
            None => PrimitiveKind::of(other)
                .is_some_and(|kind| declared.flavor == TypeFlavor::Primitive(kind)),
        },
    }
}

/// Picks the single best candidate from depth tagged candidates (see
/// [`super::filter::layers`]).
///
/// An exact binding anywhere in the hierarchy beats a compatible one; the nearest layer
/// holding a binding of the best quality wins. Two bindings of that quality in the same
/// layer is an ambiguity, reported through `ambiguous`.
///
/// # Errors
/// Returns the error produced by `ambiguous`.
pub(crate) fn pick<T, B, E>(candidates: Vec<(usize, T)>, bind: B, ambiguous: E) -> Result<Option<T>>
where
    B: Fn(&T) -> Option<Binding>,
    E: Fn() -> crate::Error,
{
    let mut bound: Vec<(usize, Binding, T)> = candidates
        .into_iter()
        .filter_map(|(depth, candidate)| bind(&candidate).map(|binding| (depth, binding, candidate)))
        .collect();

    let Some(quality) = bound.iter().map(|(_, binding, _)| *binding).max() else {
        return Ok(None);
    };
    bound.retain(|(_, binding, _)| *binding == quality);

    let Some(nearest) = bound.iter().map(|(depth, _, _)| *depth).min() else {
        return Ok(None);
    };
    bound.retain(|(depth, _, _)| *depth == nearest);

    if bound.len() > 1 {
        return Err(ambiguous());
    }
    Ok(bound.pop().map(|(_, _, candidate)| candidate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::typesystem::TypeRegistry;

    #[test]
    fn test_bind_types() {
        let registry = TypeRegistry::new();
        let int32 = registry.int32();
        let object = registry.object();
        let params = vec![Param::new("value", &object)];

        assert_eq!(
            bind_types(&params, &[object.clone()], BindingFlags::default()),
            Some(Binding::Exact)
        );
        assert_eq!(
            bind_types(&params, &[int32.clone()], BindingFlags::default()),
            Some(Binding::Compatible)
        );
        assert_eq!(
            bind_types(&params, &[int32.clone()], BindingFlags::EXACT_BINDING),
            None
        );
        assert_eq!(bind_types(&params, &[], BindingFlags::default()), None);
    }

    #[test]
    fn test_bind_by_ref() {
        let registry = TypeRegistry::new();
        let int32 = registry.int32();
        let params = vec![Param::new("value", &registry.by_ref(&int32))];

        assert_eq!(
            bind_types(&params, &[registry.by_ref(&int32)], BindingFlags::default()),
            Some(Binding::Exact)
        );
        assert_eq!(bind_types(&params, &[int32.clone()], BindingFlags::default()), None);
        assert_eq!(
            bind_types(
                &params,
                &[int32],
                BindingFlags::IGNORE_PARAMETER_MODIFIERS
            ),
            Some(Binding::Exact)
        );
        assert_eq!(bind_values(&params, &[Value::I32(3)]), Some(Binding::Exact));
    }

    #[test]
    fn test_bind_values() {
        let registry = TypeRegistry::new();
        let params = vec![
            Param::new("name", &registry.string()),
            Param::new("age", &registry.int32()),
        ];

        assert_eq!(
            bind_values(&params, &[Value::from("John"), Value::I32(3)]),
            Some(Binding::Exact)
        );
        assert_eq!(
            bind_values(&params, &[Value::Null, Value::I32(3)]),
            Some(Binding::Compatible)
        );
        assert_eq!(bind_values(&params, &[Value::I32(3), Value::I32(3)]), None);
    }

    #[test]
    fn test_pick_prefers_nearest_layer() {
        let candidates = vec![(0, "derived"), (1, "base")];
        let picked = pick(candidates, |_| Some(Binding::Exact), || crate::Error::TypeMissing).unwrap();
        assert_eq!(picked, Some("derived"));

        let candidates = vec![(0, "a"), (0, "b")];
        assert!(pick(candidates, |_| Some(Binding::Compatible), || crate::Error::TypeMissing).is_err());

        let candidates = vec![(0, "compatible"), (0, "exact")];
        let picked = pick(
            candidates,
            |c| Some(if *c == "exact" { Binding::Exact } else { Binding::Compatible }),
            || crate::Error::TypeMissing,
        )
        .unwrap();
        assert_eq!(picked, Some("exact"));
    }

    #[test]
    fn test_pick_prefers_exact_over_nearer_compatible() {
        let quality = |c: &&str| Some(if c.ends_with("int") { Binding::Exact } else { Binding::Compatible });

        let candidates = vec![(0, "derived-object"), (1, "base-int")];
        assert_eq!(pick(candidates, quality, || crate::Error::TypeMissing).unwrap(), Some("base-int"));

        let candidates = vec![(0, "derived-object"), (1, "base-object")];
        assert_eq!(
            pick(candidates, quality, || crate::Error::TypeMissing).unwrap(),
            Some("derived-object")
        );

        // Equal quality in different layers is not ambiguous
        let candidates = vec![(0, "derived-object"), (1, "base-object"), (1, "base-long")];
        assert!(pick(candidates, quality, || crate::Error::TypeMissing).is_ok());

        let candidates = vec![(0, "derived-object"), (2, "a-int"), (2, "b-int")];
        assert!(pick(candidates, quality, || crate::Error::TypeMissing).is_err());

        let none: Vec<(usize, &str)> = vec![(0, "derived-object")];
        assert_eq!(pick(none, |_| None, || crate::Error::TypeMissing).unwrap(), None);
    }
}
