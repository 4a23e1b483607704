//! # Cached Accessors on a Class
//!
//! **What this example teaches:**
//! - Declaring a class with fields, properties and constructors in a registry
//! - Resolving getters, setters and constructors once and reusing them
//! - Batch setters and mappers between two types
//! - Inspecting the accessor cache
//!
//! **When to use this pattern:**
//! - Hot paths that touch the same members of many instances
//! - Copying data between similarly shaped types

use dotreflect::prelude::*;

fn main() -> Result<()> {
    let reflector = Reflector::new();
    let registry = reflector.registry();
    let string = registry.string();
    let int32 = registry.int32();

    let person = registry
        .class("Demo", "Person")
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
        .build()?;

    let dto = registry
        .class("Demo", "PersonDto")
        .auto_property("Name", string.clone())
        .field("Age", int32.clone())
        .default_constructor()
        .build()?;

    // === Resolve once ===
    let create = reflector.constructor(&person, &[string.clone(), int32.clone()])?;
    let get_name = reflector.getter(&person, "Name")?;
    let get_age = reflector.getter(&person, "Age")?;
    let set_age = reflector.setter(&person, "Age")?;

    // === Call many times ===
    let people: Vec<Value> = (0..5i32)
        .map(|index| create.invoke(&[format!("Person {index}").into(), (20 + index).into()]))
        .collect::<Result<_>>()?;
    for instance in &people {
        let age = get_age.get(instance)?.as_i32().unwrap_or_default();
        set_age.set(instance, age + 1)?;
        println!("{:?} is now {:?}", get_name.get(instance)?, get_age.get(instance)?);
    }

    // === Batch writes and mapping ===
    let jane = reflector.default_constructor(&person)?.invoke(&[])?;
    reflector
        .multi_setter(&person, &["Age", "Name"])?
        .set(&jane, &[40.into(), "Jane".into()])?;

    let copy = reflector.default_constructor(&dto)?.invoke(&[])?;
    reflector.mapper(&person, &dto, &[])?.map(&jane, &copy)?;
    println!(
        "Mapped to {}: {:?}, {:?}",
        dto.fullname(),
        copy.get_member(&reflector, "Name")?,
        copy.get_member(&reflector, "Age")?
    );

    // === Cache statistics ===
    println!("\nAccessor cache:\n{}", reflector.cache().stats());

    Ok(())
}
