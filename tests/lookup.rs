//! Integration tests for member lookup through the reflector.
//!
//! Covers inheritance precedence, hiding, overload resolution and the binding flag presets of
//! [`ReflectorConfig`].

use dotreflect::{lookup, prelude::*, Result};

struct Hierarchy {
    reflector: Reflector,
    base: RuntimeTypeRc,
    derived: RuntimeTypeRc,
}

// public class Base { public int Code; private string hint; public virtual string Kind() => "base"; }
// public class Derived : Base { public new string Code; public override string Kind() => "derived";
//                               public string Show(int) / Show(string) / Show(object) }
fn hierarchy(config: ReflectorConfig) -> Result<Hierarchy> {
    let reflector = Reflector::with_config(config);
    let registry = reflector.registry();
    let string = registry.string();
    let int32 = registry.int32();
    let object = registry.object();

    let base = registry
        .class("Sample", "Base")
        .field("Code", int32.clone())
        .private_field("hint", string.clone())
        .default_constructor()
        .method("Kind", |m| m.returns(&string).virtual_method().body(|_| Ok("base".into())))
        .build()?;

    let derived = registry
        .class("Sample", "Derived")
        .base(&base)
        .field("Code", string.clone())
        .default_constructor()
        .method("Kind", |m| {
            m.returns(&string)
                .override_method()
                .body(|_| Ok("derived".into()))
        })
        .method("Show", |m| m.param("value", &int32).returns(&string).body(|_| Ok("int".into())))
        .method("Show", |m| m.param("value", &string).returns(&string).body(|_| Ok("string".into())))
        .method("Show", |m| m.param("value", &object).returns(&string).body(|_| Ok("object".into())))
        .build()?;

    Ok(Hierarchy { reflector, base, derived })
}

#[test]
fn test_default_lookup_returns_derived_declaration() -> Result<()> {
    let Hierarchy { reflector, derived, .. } = hierarchy(ReflectorConfig::default())?;
    let instance = derived.create_instance(&reflector, &[])?;

    reflector.setter(&derived, "Code")?.set(&instance, "D-1")?;
    assert_eq!(reflector.getter(&derived, "Code")?.get(&instance)?, Value::from("D-1"));
    Ok(())
}

#[test]
fn test_declared_only_on_base_returns_base_declaration() -> Result<()> {
    let Hierarchy {
        reflector,
        base,
        derived,
    } = hierarchy(ReflectorConfig::default())?;
    let instance = derived.create_instance(&reflector, &[])?;

    let flags = BindingFlags::INSTANCE_ANY_DECLARED_ONLY;
    let base_code = reflector.getter_with(&base, "Code", flags)?;
    reflector.setter_with(&base, "Code", flags)?.set(&instance, 7)?;

    // Both declarations live side by side on the derived instance
    assert_eq!(base_code.get(&instance)?, Value::I32(7));
    assert_eq!(reflector.getter(&derived, "Code")?.get(&instance)?, Value::Null);

    assert!(matches!(
        reflector.getter_with(&derived, "hint", flags),
        Err(Error::MemberNotFound { .. })
    ));
    assert!(reflector.getter(&derived, "hint").is_ok());
    Ok(())
}

#[test]
fn test_exclude_hidden_members() -> Result<()> {
    let Hierarchy { derived, .. } = hierarchy(ReflectorConfig::default())?;

    let all = lookup::members_named(&derived, "Code", MemberTypes::DATA, BindingFlags::INSTANCE_PUBLIC);
    assert_eq!(all.len(), 2);

    let flags = BindingFlags::INSTANCE_PUBLIC | BindingFlags::EXCLUDE_HIDDEN_MEMBERS;
    let visible = lookup::members_named(&derived, "Code", MemberTypes::DATA, flags);
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].declaring_type_ref().token(), Some(derived.token));

    let code = lookup::member(&derived, "Code", MemberTypes::DATA, flags)?;
    assert_eq!(code.value_type().map(|ty| ty.fullname()), Some("System.String".to_string()));
    Ok(())
}

#[test]
fn test_virtual_dispatch_through_base() -> Result<()> {
    let Hierarchy {
        reflector,
        base,
        derived,
    } = hierarchy(ReflectorConfig::default())?;

    let kind = reflector.method(&base, "Kind", &[])?;
    let as_base = base.create_instance(&reflector, &[])?;
    let as_derived = derived.create_instance(&reflector, &[])?;

    assert_eq!(kind.call(&as_base, &[])?, Value::from("base"));
    assert_eq!(kind.call(&as_derived, &[])?, Value::from("derived"));
    Ok(())
}

#[test]
fn test_overload_resolution() -> Result<()> {
    let Hierarchy { reflector, derived, .. } = hierarchy(ReflectorConfig::default())?;
    let registry = reflector.registry();
    let instance = derived.create_instance(&reflector, &[])?;

    let show = |types: &[RuntimeTypeRc]| -> Result<Value> {
        reflector.method(&derived, "Show", types)?.call(&instance, &[Value::Null])
    };
    assert_eq!(
        reflector.method(&derived, "Show", &[registry.int32()])?.call(&instance, &[1.into()])?,
        Value::from("int")
    );
    assert_eq!(show(&[registry.string()])?, Value::from("string"));
    assert_eq!(show(&[registry.object()])?, Value::from("object"));

    // Runtime values bind to the most specific overload
    assert_eq!(instance.call_method(&reflector, "Show", &[1.into()])?, Value::from("int"));
    assert_eq!(instance.call_method(&reflector, "Show", &["a".into()])?, Value::from("string"));
    assert_eq!(instance.call_method(&reflector, "Show", &[1.5f64.into()])?, Value::from("object"));

    assert!(matches!(
        reflector.method(&derived, "Show", &[registry.int32(), registry.int32()]),
        Err(Error::MethodNotFound { .. })
    ));
    Ok(())
}

#[test]
fn test_public_only_config() -> Result<()> {
    let Hierarchy { reflector, derived, .. } = hierarchy(ReflectorConfig::public_only())?;

    assert!(matches!(
        reflector.getter(&derived, "hint"),
        Err(Error::MemberNotFound { .. })
    ));
    assert!(reflector
        .getter_with(&derived, "hint", BindingFlags::INSTANCE_ANY_VISIBILITY)
        .is_ok());
    Ok(())
}

#[test]
fn test_strict_config_resolves_hidden_members() -> Result<()> {
    let Hierarchy { reflector, derived, .. } = hierarchy(ReflectorConfig::strict())?;
    let instance = derived.create_instance(&reflector, &[])?;

    reflector.setter(&derived, "Code")?.set(&instance, "strict")?;
    assert_eq!(reflector.getter(&derived, "Code")?.get(&instance)?, Value::from("strict"));
    Ok(())
}

#[test]
fn test_inherited_members_survive_dropped_reflector() -> Result<()> {
    let derived = {
        let Hierarchy { derived, .. } = hierarchy(ReflectorConfig::default())?;
        derived
    };

    let base = derived.base().expect("base type is kept alive by the derived type");
    assert_eq!(base.fullname(), "Sample.Base");

    let hint = lookup::field(&derived, "hint", BindingFlags::INSTANCE_ANY_VISIBILITY)?;
    assert_eq!(hint.declaring_type().map(|ty| ty.token), Some(base.token));

    let reflector = Reflector::new();
    let instance = reflector.default_constructor(&derived)?.invoke(&[])?;
    reflector
        .setter_with(&base, "Code", BindingFlags::INSTANCE_ANY_DECLARED_ONLY)?
        .set(&instance, 3)?;
    Ok(())
}

#[test]
fn test_exact_base_overload_beats_compatible_derived_overload() -> Result<()> {
    let reflector = Reflector::new();
    let registry = reflector.registry();
    let (int32, object, string) = (registry.int32(), registry.object(), registry.string());

    // public class Shape { public string Scale(int) => "shape-int"; }
    // public class Circle : Shape { public string Scale(object) => "circle-object"; }
    let shape = registry
        .class("Sample", "Shape")
        .default_constructor()
        .method("Scale", |m| m.param("by", &int32).returns(&string).body(|_| Ok("shape-int".into())))
        .build()?;
    let circle = registry
        .class("Sample", "Circle")
        .base(&shape)
        .default_constructor()
        .method("Scale", |m| m.param("by", &object).returns(&string).body(|_| Ok("circle-object".into())))
        .build()?;
    let instance = circle.create_instance(&reflector, &[])?;

    let by_int = reflector.method(&circle, "Scale", &[int32.clone()])?;
    assert_eq!(by_int.call(&instance, &[2.into()])?, Value::from("shape-int"));
    assert_eq!(instance.call_method(&reflector, "Scale", &[2.into()])?, Value::from("shape-int"));

    // Without an exact match the nearest compatible overload wins
    assert_eq!(
        instance.call_method(&reflector, "Scale", &["twice".into()])?,
        Value::from("circle-object")
    );
    Ok(())
}
