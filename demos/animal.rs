//! # Mutating Structs Through Value Holders
//!
//! **What this example teaches:**
//! - Constructing struct instances through a constructor invoker
//! - Why naked structs cannot be written, and how a `ValueHolder` fixes that
//! - Reading the mutated struct back out of the holder
//!
//! **When to use this pattern:**
//! - Setting members of value types through a uniform accessor

use dotreflect::prelude::*;

fn main() -> Result<()> {
    let reflector = Reflector::new();
    let registry = reflector.registry();
    let string = registry.string();
    let int32 = registry.int32();

    let animal = registry
        .structure("Demo", "Animal")
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

    let create = reflector.constructor(&animal, &[string.clone(), int32.clone()])?;
    let set_age = reflector.setter(&animal, "Age")?;
    let get_age = reflector.getter(&animal, "Age")?;

    let rex = create.invoke(&["Rex".into(), 3.into()])?;

    // A naked struct is a copy; writing to it would be lost
    match set_age.set(&rex, 8) {
        Ok(()) => println!("unexpected: naked struct accepted a write"),
        Err(error) => println!("Writing a naked struct fails: {error}"),
    }

    // Wrap it in a holder to mutate in place
    let holder = Value::Holder(ValueHolder::new(rex));
    set_age.set(&holder, 8)?;
    println!("Age through the holder: {:?}", get_age.get(&holder)?);

    let updated = holder.unwrap_holder();
    println!(
        "Unwrapped {:?}: name {:?}, age {:?}",
        updated,
        reflector.getter(&animal, "Name")?.get(&updated)?,
        get_age.get(&updated)?
    );

    Ok(())
}
