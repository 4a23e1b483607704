//! Integration tests for the accessor facade.
//!
//! These tests declare small object models through the public builder API and exercise the
//! reflector the way an application would: resolve an accessor once, then call it repeatedly.

use dotreflect::{prelude::*, Result};

struct Sample {
    reflector: Reflector,
    person: RuntimeTypeRc,
    animal: RuntimeTypeRc,
    color: RuntimeTypeRc,
    palette: RuntimeTypeRc,
}

fn sample() -> Result<Sample> {
    let reflector = Reflector::new();
    let registry = reflector.registry();
    let string = registry.string();
    let int32 = registry.int32();

    // public class Person {
    //     public int Age;
    //     public string Name { get; set; }
    //     public Person() {}
    //     public Person(string name, int age) { Name = name; Age = age; }
    //     public T Echo<T>(T value) => value;
    // }
    let person = registry
        .class("Sample", "Person")
        .field("Age", int32.clone())
        .auto_property("Name", string.clone())
        .default_constructor()
        .constructor(|c| {
            c.param("name", &string).param("age", &int32).body(|inv| {
                inv.set("Name", inv.arg(0)?.clone())?;
                inv.set("Age", inv.arg(1)?.clone())?;
                Ok(Value::Null)
            })
        })
        .method("Echo", |m| {
            let t = registry.generic_parameter(0);
            m.generic(&["T"]).param("value", &t).returns(&t).body(|inv| Ok(inv.arg(0)?.clone()))
        })
        .build()?;

    // public struct Animal { public int Age; public string Name { get; set; } ... }
    let animal = registry
        .structure("Sample", "Animal")
        .field("Age", int32.clone())
        .auto_property("Name", string.clone())
        .constructor(|c| {
            c.param("name", &string).param("age", &int32).body(|inv| {
                inv.set("Name", inv.arg(0)?.clone())?;
                inv.set("Age", inv.arg(1)?.clone())?;
                Ok(Value::Null)
            })
        })
        .build()?;

    let color = registry
        .enumeration("Sample", "Color", PrimitiveKind::I4)
        .enum_value("Red", 0)
        .enum_value("Green", 1)
        .build()?;

    let palette = registry
        .class("Sample", "Palette")
        .field("Primary", color.clone())
        .field("Slots", registry.array_of(&string))
        .default_constructor()
        .build()?;

    Ok(Sample {
        reflector,
        person,
        animal,
        color,
        palette,
    })
}

#[test]
fn test_person_scenario() -> Result<()> {
    let Sample { reflector, person, .. } = sample()?;
    let registry = reflector.registry();

    let ctor = reflector.constructor(&person, &[registry.string(), registry.int32()])?;
    let john = ctor.invoke(&["John Doe".into(), 21.into()])?;
    assert_eq!(reflector.getter(&person, "Name")?.get(&john)?, Value::from("John Doe"));
    assert_eq!(reflector.getter(&person, "Age")?.get(&john)?, Value::I32(21));

    let setter = reflector.setter(&person, "Age")?;
    setter.set(&john, 35)?;
    assert_eq!(reflector.getter(&person, "Age")?.get(&john)?, Value::I32(35));

    let batch = reflector.multi_setter(&person, &["Age", "Name"])?;
    batch.set(&john, &[40.into(), "Jane".into()])?;
    assert_eq!(reflector.getter(&person, "Age")?.get(&john)?, Value::I32(40));
    assert_eq!(reflector.getter(&person, "Name")?.get(&john)?, Value::from("Jane"));

    Ok(())
}

#[test]
fn test_animal_struct_scenario() -> Result<()> {
    let Sample { reflector, animal, .. } = sample()?;
    let registry = reflector.registry();

    let ctor = reflector.constructor(&animal, &[registry.string(), registry.int32()])?;
    let rex = ctor.invoke(&["Rex".into(), 3.into()])?;
    let holder = Value::Holder(ValueHolder::new(rex));

    reflector.setter(&animal, "Age")?.set(&holder, 8)?;
    assert_eq!(reflector.getter(&animal, "Age")?.get(&holder)?, Value::I32(8));

    let unwrapped = holder.unwrap_holder();
    assert!(unwrapped.as_struct().is_some());
    assert_eq!(reflector.getter(&animal, "Age")?.get(&unwrapped)?, Value::I32(8));
    assert_eq!(reflector.getter(&animal, "Name")?.get(&unwrapped)?, Value::from("Rex"));

    Ok(())
}

#[test]
fn test_naked_struct_cannot_be_written() -> Result<()> {
    let Sample { reflector, animal, .. } = sample()?;
    let naked = reflector.default_constructor(&animal)?.invoke(&[])?;

    let result = reflector.setter(&animal, "Age")?.set(&naked, 8);
    assert!(matches!(result, Err(Error::InvalidArgument { .. })));
    Ok(())
}

#[test]
fn test_round_trip_every_member() -> Result<()> {
    let Sample { reflector, person, .. } = sample()?;
    let instance = reflector.default_constructor(&person)?.invoke(&[])?;

    let int32 = reflector.registry().int32();
    for member in dotreflect::lookup::members(&person, MemberTypes::DATA, BindingFlags::INSTANCE_PUBLIC) {
        let value = if member.value_type().is_some_and(|ty| ty.token == int32.token) {
            Value::I32(7)
        } else {
            Value::from("seven")
        };
        reflector.setter_for(&person, &member)?.set(&instance, value.clone())?;
        assert_eq!(reflector.getter_for(&person, &member)?.get(&instance)?, value);
    }
    Ok(())
}

#[test]
fn test_enums_and_arrays() -> Result<()> {
    let Sample {
        reflector,
        color,
        palette,
        ..
    } = sample()?;
    let registry = reflector.registry();
    let instance = palette.create_instance(&reflector, &[])?;

    // The underlying primitive is accepted for an enum member
    instance.set_member(&reflector, "Primary", 1)?;
    let primary = instance.get_member(&reflector, "Primary")?;
    assert_eq!(primary.as_enum().and_then(|value| value.member_name()), Some("Green".to_string()));
    assert_eq!(primary.as_enum().map(|value| value.runtime_type().token), Some(color.token));

    let strings = registry.array_of(&registry.string());
    let slots = Value::Array(ArrayRef::allocate(&strings, 2)?);
    instance.set_member(&reflector, "Slots", slots.clone())?;

    let set = reflector.array_setter(&strings)?;
    let get = reflector.array_getter(&strings)?;
    set.set(&slots, 0, "red")?;
    assert_eq!(get.get(&slots, 0)?, Value::from("red"));
    assert_eq!(get.get(&slots, 1)?, Value::Null);
    assert!(matches!(get.get(&slots, 2), Err(Error::IndexOutOfRange { .. })));
    assert!(matches!(set.set(&slots, 1, 5), Err(Error::InvalidArgument { .. })));

    Ok(())
}

#[test]
fn test_generic_method() -> Result<()> {
    let Sample { reflector, person, .. } = sample()?;
    let registry = reflector.registry();
    let instance = reflector.default_constructor(&person)?.invoke(&[])?;

    let echo_int = reflector.generic_method(&person, "Echo", &[registry.int32()], &[registry.int32()])?;
    assert_eq!(echo_int.call(&instance, &[9.into()])?, Value::I32(9));
    assert!(matches!(
        echo_int.call(&instance, &["nine".into()]),
        Err(Error::InvalidArgument { .. })
    ));

    let echo_string = reflector.generic_method(&person, "Echo", &[registry.string()], &[registry.string()])?;
    assert!(!echo_string.ptr_eq(&echo_int));
    assert_eq!(echo_string.call(&instance, &["nine".into()])?, Value::from("nine"));

    let again = reflector.generic_method(&person, "Echo", &[registry.int32()], &[registry.int32()])?;
    assert!(again.ptr_eq(&echo_int));
    Ok(())
}

#[test]
fn test_batch_setter_unknown_name_fails() -> Result<()> {
    let Sample { reflector, person, .. } = sample()?;

    assert!(matches!(
        reflector.multi_setter(&person, &["Age", "Height", "Name"]),
        Err(Error::MemberNotFound { .. })
    ));

    let batch = reflector.multi_setter(&person, &["Age", "Name"])?;
    let instance = reflector.default_constructor(&person)?.invoke(&[])?;
    assert!(matches!(
        batch.set(&instance, &[1.into()]),
        Err(Error::ArgumentCount { expected: 2, actual: 1 })
    ));
    Ok(())
}

#[test]
fn test_cache_statistics() -> Result<()> {
    let Sample { reflector, person, .. } = sample()?;

    for _ in 0..3 {
        reflector.getter(&person, "Age")?;
    }
    let stats = reflector.cache().stats();
    assert_eq!(stats.get(AccessorKind::FieldGetter).entries, 1);
    assert_eq!(stats.get(AccessorKind::FieldGetter).misses, 1);
    assert_eq!(stats.get(AccessorKind::FieldGetter).hits, 2);
    assert_eq!(stats.get(AccessorKind::PropertyGetter).entries, 0);
    Ok(())
}
