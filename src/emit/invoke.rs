use crate::{
    emit::{
        accessors::{ConstructorInvoker, MethodInvoker},
        descriptor::CallDescriptor,
        ops::{narrow_target, run_body, Dispatch},
    },
    metadata::{
        typesystem::{RuntimeTypeRc, TypeFlavor},
        value::{ObjectRef, StructValue, Value, ValueHolder},
    },
    Error, Result,
};

/// Narrows `args` in place to the declared parameter types. By-ref parameters narrow to
/// their element type. On failure `args` is left untouched.
fn narrow_args(params: &[RuntimeTypeRc], args: &mut [Value]) -> Result<()> {
    if params.len() != args.len() {
        return Err(Error::ArgumentCount {
            expected: params.len(),
            actual: args.len(),
        });
    }

    let mut narrowed = Vec::with_capacity(args.len());
    for (arg, param) in args.iter().zip(params) {
        narrowed.push(arg.clone().coerce_to(param)?);
    }
    for (arg, value) in args.iter_mut().zip(narrowed) {
        *arg = value;
    }
    Ok(())
}

/// A fresh, zeroed instance for a constructor body to run against. Structs are placed in a
/// holder so the body can write their fields.
fn allocate(ty: &RuntimeTypeRc) -> Result<Value> {
    match ty.flavor {
        TypeFlavor::Class => Ok(Value::Object(ObjectRef::allocate(ty))),
        TypeFlavor::ValueType => Ok(Value::Holder(ValueHolder::new(Value::Struct(
            StructValue::default_for(ty),
        )))),
        _ => Err(malformed_error!("{} cannot be instantiated", ty.fullname())),
    }
}

/// Emits a constructor invoker.
///
/// With a resolved constructor the invoker allocates a zeroed instance, runs the constructor
/// body against it and returns it; structs are returned by value. Without one, value types
/// yield their zero value and classes are allocated without running any constructor if
/// `allow_uninitialized` is set.
///
/// # Errors
/// Returns [`Error::Malformed`] for abstract types, interfaces, non-constructor methods and
/// classes without a constructor when `allow_uninitialized` is off.
pub fn constructor(descriptor: &CallDescriptor, allow_uninitialized: bool) -> Result<ConstructorInvoker> {
    let ty = descriptor.target_type.clone();
    if ty.is_abstract() || ty.is_interface() {
        return Err(malformed_error!("{} is abstract", ty.fullname()));
    }

    match &descriptor.method {
        Some(ctor) => {
            if !ctor.is_constructor() || ctor.is_static() {
                return Err(malformed_error!("{} is not an instance constructor", ctor.signature()));
            }
            if ctor.declaring_type().map(|declaring| declaring.token) != Some(ty.token) {
                return Err(malformed_error!(
                    "{} is not declared on {}",
                    ctor.signature(),
                    ty.fullname()
                ));
            }

            let params: Vec<RuntimeTypeRc> = ctor.params.iter().map(|param| param.value_type()).collect();
            let ctor = ctor.clone();
            let has_default_constructor = params.is_empty();
            Ok(ConstructorInvoker::new(
                move |args| {
                    narrow_args(&params, args)?;
                    let instance = allocate(&ty)?;
                    run_body(&ctor, &instance, args)?;
                    Ok(instance.unwrap_holder())
                },
                has_default_constructor,
            ))
        }
        None if ty.is_value_type() => Ok(ConstructorInvoker::new(
            move |args| {
                narrow_args(&[], args)?;
                Ok(Value::default_for(&ty))
            },
            true,
        )),
        None if allow_uninitialized && ty.flavor == TypeFlavor::Class => Ok(ConstructorInvoker::new(
            move |args| {
                narrow_args(&[], args)?;
                Ok(Value::Object(ObjectRef::allocate(&ty)))
            },
            false,
        )),
        None => Err(malformed_error!(
            "{} has no parameterless constructor",
            ty.fullname()
        )),
    }
}

/// Emits a method invoker.
///
/// Instance calls are checked against the descriptor's target type and dispatched
/// virtually on the runtime type of the target, so a getter emitted for a base method runs
/// the derived override. Interface methods prefer an explicit implementation.
///
/// # Errors
/// Returns [`Error::Malformed`] for constructors and open generic method definitions.
pub fn method(descriptor: &CallDescriptor) -> Result<MethodInvoker> {
    let Some(method) = descriptor.method.clone() else {
        return Err(malformed_error!("{} has no method", descriptor.signature()));
    };
    if method.is_constructor() {
        return Err(malformed_error!(
            "{} is a constructor, emit a constructor invoker instead",
            method.signature()
        ));
    }
    if method.is_generic_definition() {
        return Err(malformed_error!(
            "{} needs type arguments before it can be invoked",
            method.signature()
        ));
    }

    let params: Vec<RuntimeTypeRc> = method.params.iter().map(|param| param.value_type()).collect();
    let dispatch = Dispatch::new(&method);
    if method.is_static() {
        return Ok(MethodInvoker::new(move |_, args| {
            narrow_args(&params, args)?;
            run_body(dispatch.method(), &Value::Null, args)
        }));
    }

    let target_type = descriptor.target_type.clone();
    Ok(MethodInvoker::new(move |target, args| {
        let runtime_type = narrow_target(&target_type, target, &dispatch.method().name)?;
        narrow_args(&params, args)?;
        let implementation = dispatch.resolve(Some(&runtime_type));
        run_body(&implementation, target, args)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        lookup,
        metadata::{flags::BindingFlags, typesystem::TypeRegistry},
        test::fixtures::Model,
    };

    #[test]
    fn test_constructor_with_arguments() {
        let registry = TypeRegistry::new();
        let model = Model::new(&registry);
        let ctor = lookup::constructor(
            &model.person,
            &[registry.string(), registry.int32()],
            BindingFlags::default(),
        )
        .unwrap();

        let invoker = constructor(&CallDescriptor::constructor(&model.person, Some(&ctor)), false).unwrap();
        assert!(!invoker.has_default_constructor());
        let person = invoker.invoke(&["Ada".into(), 36.into()]).unwrap();
        assert_eq!(person.as_object().unwrap().runtime_type().token, model.person.token);

        let age = lookup::field(&model.person, "Age", BindingFlags::default()).unwrap();
        assert_eq!(person.load_slot(age.slot).unwrap(), Value::I32(36));

        assert!(matches!(invoker.invoke(&["Ada".into()]), Err(Error::ArgumentCount { .. })));
        assert!(matches!(
            invoker.invoke(&[36.into(), "Ada".into()]),
            Err(Error::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_struct_constructor_returns_value() {
        let registry = TypeRegistry::new();
        let model = Model::new(&registry);
        let ctor = lookup::constructor(
            &model.animal,
            &[registry.string(), registry.int32()],
            BindingFlags::default(),
        )
        .unwrap();

        let animal = constructor(&CallDescriptor::constructor(&model.animal, Some(&ctor)), false)
            .unwrap()
            .invoke(&["Rex".into(), 4.into()])
            .unwrap();
        assert!(animal.as_struct().is_some());
        let age = lookup::field(&model.animal, "Age", BindingFlags::default()).unwrap();
        assert_eq!(animal.load_slot(age.slot).unwrap(), Value::I32(4));
    }

    #[test]
    fn test_implicit_constructors() {
        let registry = TypeRegistry::new();
        let model = Model::new(&registry);

        let animal = constructor(&CallDescriptor::constructor(&model.animal, None), false)
            .unwrap()
            .invoke(&[])
            .unwrap();
        assert_eq!(animal.runtime_type().unwrap().token, model.animal.token);

        assert!(constructor(&CallDescriptor::constructor(&model.node, None), false).is_err());
        let node = constructor(&CallDescriptor::constructor(&model.node, None), true).unwrap();
        assert!(!node.has_default_constructor());
        assert!(node.invoke(&[]).unwrap().as_object().is_some());

        assert!(constructor(&CallDescriptor::constructor(&model.named, None), true).is_err());
    }

    #[test]
    fn test_method_dispatch() {
        let registry = TypeRegistry::new();
        let model = Model::new(&registry);
        let describe = lookup::method(&registry, &model.employee, "Describe", &[], &[], BindingFlags::default()).unwrap();
        let invoker = method(&CallDescriptor::method(&model.employee, &describe)).unwrap();

        let manager = Value::Object(ObjectRef::allocate(&model.manager));
        assert_eq!(invoker.call(&manager, &[]).unwrap(), Value::from("Manager"));
        let employee = Value::Object(ObjectRef::allocate(&model.employee));
        assert_eq!(invoker.call(&employee, &[]).unwrap(), Value::from("Employee"));
        assert!(matches!(invoker.call(&Value::Null, &[]), Err(Error::NullTarget(_))));
    }

    #[test]
    fn test_rejected_target_leaves_arguments_untouched() {
        let registry = TypeRegistry::new();
        let model = Model::new(&registry);
        let try_double = lookup::method(
            &registry,
            &model.person,
            "TryDouble",
            &[],
            &[registry.by_ref(&registry.int32())],
            BindingFlags::default(),
        )
        .unwrap();
        let invoker = method(&CallDescriptor::method(&model.person, &try_double)).unwrap();

        let mut args = [Value::Holder(ValueHolder::new(Value::I32(21)))];
        assert!(matches!(invoker.invoke(&Value::Null, &mut args), Err(Error::NullTarget(_))));
        assert!(matches!(args[0], Value::Holder(_)));

        let node = Value::Object(ObjectRef::allocate(&model.node));
        assert!(invoker.invoke(&node, &mut args).is_err());
        assert!(matches!(args[0], Value::Holder(_)));
    }

    #[test]
    fn test_interface_method_prefers_explicit() {
        let registry = TypeRegistry::new();
        let model = Model::new(&registry);
        let describe = model.named.declared_methods("Describe").remove(0);
        let invoker = method(&CallDescriptor::method(&model.named, &describe)).unwrap();

        let person = Value::Object(ObjectRef::allocate(&model.person));
        assert_eq!(invoker.call(&person, &[]).unwrap(), Value::from("explicit"));
    }

    #[test]
    fn test_by_ref_write_back() {
        let registry = TypeRegistry::new();
        let model = Model::new(&registry);
        let try_double = lookup::method(
            &registry,
            &model.person,
            "TryDouble",
            &[],
            &[registry.by_ref(&registry.int32())],
            BindingFlags::default(),
        )
        .unwrap();
        let invoker = method(&CallDescriptor::method(&model.person, &try_double)).unwrap();

        let person = Value::Object(ObjectRef::allocate(&model.person));
        let mut args = [Value::I32(21)];
        assert_eq!(invoker.invoke(&person, &mut args).unwrap(), Value::Bool(true));
        assert_eq!(args[0], Value::I32(42));
    }

    #[test]
    fn test_static_and_generic_methods() {
        let registry = TypeRegistry::new();
        let model = Model::new(&registry);

        let add = lookup::method(
            &registry,
            &model.person,
            "Add",
            &[],
            &[registry.int32(), registry.int32()],
            BindingFlags::STATIC_PUBLIC,
        )
        .unwrap();
        let add = method(&CallDescriptor::method(&model.person, &add)).unwrap();
        assert_eq!(add.call(&Value::Null, &[2.into(), 3.into()]).unwrap(), Value::I32(5));

        let open = model.person.declared_methods("Echo").remove(0);
        assert!(matches!(
            method(&CallDescriptor::method(&model.person, &open)),
            Err(Error::Malformed { .. })
        ));

        let echo = lookup::method(
            &registry,
            &model.person,
            "Echo",
            &[registry.string()],
            &[registry.string()],
            BindingFlags::default(),
        )
        .unwrap();
        let echo = method(&CallDescriptor::method(&model.person, &echo)).unwrap();
        let person = Value::Object(ObjectRef::allocate(&model.person));
        assert_eq!(echo.call(&person, &["hi".into()]).unwrap(), Value::from("hi"));
    }
}
