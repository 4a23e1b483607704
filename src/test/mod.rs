//! Shared fixtures for the unit tests.

pub mod fixtures {
    use crate::metadata::{
        typesystem::{PrimitiveKind, RuntimeTypeRc, TypeRegistry},
        value::Value,
    };

    /// A small object model covering the shapes the accessors have to deal with.
    ///
    /// - `Sample.INamed`: interface with an abstract `Describe()`
    /// - `Sample.Person`: class implementing `INamed`; constructors `()` and
    ///   `(string name, int age)`, public field `Age`, auto-property `Name`, overloaded
    ///   `Greet`, a by-ref `TryDouble(ref int)`, generic `Echo<T>(T)`, static members and an
    ///   explicitly implemented `Sample.INamed.Describe`
    /// - `Sample.Animal`: struct with constructor `(string name, int age)`, field `Age` and
    ///   auto-property `Name`
    /// - `Sample.Employee` / `Sample.Manager`: a hierarchy where `Manager` hides the field
    ///   `Level` with a different type and overrides `Describe` and `Title`
    /// - `Sample.Node`: fields `Value`, `Next` and `Other` for object graphs
    /// - `Sample.Color`: enum `Red = 0`, `Green = 1`, `Blue = 2`
    /// - `Sample.Bag`: three int fields exposed through an `int this[int]` indexer
    /// - `Sample.PersonDto`: mapping target with `Name`, `Age` and `Notes`
    pub struct Model {
        pub named: RuntimeTypeRc,
        pub person: RuntimeTypeRc,
        pub animal: RuntimeTypeRc,
        pub employee: RuntimeTypeRc,
        pub manager: RuntimeTypeRc,
        pub node: RuntimeTypeRc,
        pub color: RuntimeTypeRc,
        pub bag: RuntimeTypeRc,
        pub dto: RuntimeTypeRc,
    }

    impl Model {
        pub fn new(registry: &TypeRegistry) -> Self {
            let string = registry.string();
            let int32 = registry.int32();
            let object = registry.object();

            let named = registry
                .interface("Sample", "INamed")
                .method("Describe", |m| m.returns(&string).abstract_method())
                .build()
                .unwrap();

            let t = registry.generic_parameter(0);
            let int_ref = registry.by_ref(&int32);
            let person = registry
                .class("Sample", "Person")
                .implements(&named)
                .field("Age", int32.clone())
                .private_field("secret", string.clone())
                .auto_property("Name", string.clone())
                .static_field("Count", int32.clone())
                .static_property("Population", int32.clone())
                .constant("MaxAge", int32.clone(), 150)
                .default_constructor()
                .constructor(|c| {
                    c.param("name", &string).param("age", &int32).body(|inv| {
                        inv.set("Name", inv.arg(0)?.clone())?;
                        inv.set("Age", inv.arg(1)?.clone())?;
                        Ok(Value::Null)
                    })
                })
                .method("Describe", |m| {
                    m.returns(&string).virtual_method().body(|inv| {
                        let name = inv.get("Name")?;
                        let age = inv.get("Age")?;
                        Ok(format!(
                            "{} ({})",
                            name.as_str().unwrap_or_default(),
                            age.as_i32().unwrap_or_default()
                        )
                        .into())
                    })
                })
                .method("Sample.INamed.Describe", |m| {
                    m.returns(&string)
                        .private()
                        .body(|_| Ok("explicit".into()))
                })
                .method("Greet", |m| {
                    m.returns(&string).body(|inv| {
                        let name = inv.get("Name")?;
                        Ok(format!("Hello, {}", name.as_str().unwrap_or_default()).into())
                    })
                })
                .method("Greet", |m| {
                    m.param("greeting", &string).returns(&string).body(|inv| {
                        let name = inv.get("Name")?;
                        Ok(format!(
                            "{}, {}",
                            inv.arg(0)?.as_str().unwrap_or_default(),
                            name.as_str().unwrap_or_default()
                        )
                        .into())
                    })
                })
                .method("Greet", |m| {
                    m.param("anything", &object)
                        .returns(&string)
                        .body(|_| Ok("Hello, object".into()))
                })
                .method("TryDouble", |m| {
                    m.param("value", &int_ref)
                        .returns(&registry.boolean())
                        .body(|mut inv| {
                            let value = inv.arg(0)?.as_i32().unwrap_or_default();
                            inv.set_arg(0, value * 2)?;
                            Ok(true.into())
                        })
                })
                .method("Echo", |m| {
                    m.generic(&["T"])
                        .param("value", &t)
                        .returns(&t)
                        .body(|inv| Ok(inv.arg(0)?.clone()))
                })
                .method("Add", |m| {
                    m.static_method()
                        .param("a", &int32)
                        .param("b", &int32)
                        .returns(&int32)
                        .body(|inv| {
                            let a = inv.arg(0)?.as_i32().unwrap_or_default();
                            let b = inv.arg(1)?.as_i32().unwrap_or_default();
                            Ok((a + b).into())
                        })
                })
                .build()
                .unwrap();

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
                .build()
                .unwrap();

            let employee = registry
                .class("Sample", "Employee")
                .implements(&named)
                .field("Level", int32.clone())
                .auto_property("Name", string.clone())
                .auto_property_with("Title", string.clone(), |p| p.virtual_property())
                .default_constructor()
                .method("Describe", |m| {
                    m.returns(&string)
                        .virtual_method()
                        .body(|_| Ok("Employee".into()))
                })
                .build()
                .unwrap();
            let employees = registry.array_of(&employee);

            let manager = registry
                .class("Sample", "Manager")
                .base(&employee)
                .field("Level", string.clone())
                .field("Reports", employees)
                .auto_property_with("Title", string.clone(), |p| p.override_property())
                .default_constructor()
                .method("Describe", |m| {
                    m.returns(&string)
                        .override_method()
                        .body(|_| Ok("Manager".into()))
                })
                .build()
                .unwrap();

            let node = registry
                .class("Sample", "Node")
                .field("Value", int32.clone())
                .field("Next", object.clone())
                .field("Other", object.clone())
                .build()
                .unwrap();

            let color = registry
                .enumeration("Sample", "Color", PrimitiveKind::I4)
                .enum_value("Red", 0)
                .enum_value("Green", 1)
                .enum_value("Blue", 2)
                .build()
                .unwrap();

            let bag = registry
                .class("Sample", "Bag")
                .field("A", int32.clone())
                .field("B", int32.clone())
                .field("C", int32.clone())
                .default_constructor()
                .indexer(int32.clone(), |p| {
                    p.index("index", &int32)
                        .getter(|inv| {
                            let index = inv.arg(0)?.as_i32().unwrap_or_default();
                            inv.load(index as usize)
                        })
                        .setter(|inv| {
                            let index = inv.arg(0)?.as_i32().unwrap_or_default();
                            inv.store(index as usize, inv.arg(1)?.clone())?;
                            Ok(Value::Null)
                        })
                })
                .build()
                .unwrap();

            let dto = registry
                .class("Sample", "PersonDto")
                .auto_property("Name", string.clone())
                .field("Age", int32.clone())
                .field("Notes", string.clone())
                .default_constructor()
                .build()
                .unwrap();

            Model {
                named,
                person,
                animal,
                employee,
                manager,
                node,
                color,
                bag,
                dto,
            }
        }
    }
}
