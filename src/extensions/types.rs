use crate::{
    extensions::not_found_as_none,
    metadata::{typesystem::RuntimeTypeRc, value::Value},
    Reflector, Result,
};

/// One-shot construction and static member access on types
pub trait TypeExt {
    /// Creates an instance. Without arguments this behaves like
    /// [`Reflector::default_constructor`]; otherwise the constructor whose parameters accept
    /// `args` is used.
    ///
    /// # Errors
    /// Returns [`crate::Error::ConstructorNotFound`] if no constructor fits, or the error of
    /// the constructor body.
    fn create_instance(&self, reflector: &Reflector, args: &[Value]) -> Result<Value>;

    /// Like [`TypeExt::create_instance`], but `None` if no constructor fits
    ///
    /// # Errors
    /// Any error other than a failed lookup.
    fn try_create_instance(&self, reflector: &Reflector, args: &[Value]) -> Result<Option<Value>>;

    /// Reads the static field or property `name`
    ///
    /// # Errors
    /// Returns the lookup error if there is no such static member.
    fn get_static(&self, reflector: &Reflector, name: &str) -> Result<Value>;

    /// Writes the static field or property `name`
    ///
    /// # Errors
    /// Returns the lookup error if there is no such static member, or
    /// [`crate::Error::InvalidArgument`] if the value does not fit.
    fn set_static(&self, reflector: &Reflector, name: &str, value: impl Into<Value>) -> Result<()>;

    /// Calls the static method `name` whose parameters accept `args`
    ///
    /// # Errors
    /// Returns the lookup error if there is no such static method, or the error of its body.
    fn call_static(&self, reflector: &Reflector, name: &str, args: &[Value]) -> Result<Value>;
}

impl TypeExt for RuntimeTypeRc {
    fn create_instance(&self, reflector: &Reflector, args: &[Value]) -> Result<Value> {
        let constructor = if args.is_empty() {
            reflector.default_constructor(self)?
        } else {
            reflector.constructor_for_args(self, args)?
        };
        constructor.invoke(args)
    }

    fn try_create_instance(&self, reflector: &Reflector, args: &[Value]) -> Result<Option<Value>> {
        let constructor = if args.is_empty() {
            reflector.default_constructor(self)
        } else {
            reflector.constructor_for_args(self, args)
        };
        match not_found_as_none(constructor)? {
            Some(constructor) => constructor.invoke(args).map(Some),
            None => Ok(None),
        }
    }

    fn get_static(&self, reflector: &Reflector, name: &str) -> Result<Value> {
        reflector
            .getter_with(self, name, reflector.config().static_flags)?
            .get(&Value::Null)
    }

    fn set_static(&self, reflector: &Reflector, name: &str, value: impl Into<Value>) -> Result<()> {
        reflector
            .setter_with(self, name, reflector.config().static_flags)?
            .set(&Value::Null, value)
    }

    fn call_static(&self, reflector: &Reflector, name: &str, args: &[Value]) -> Result<Value> {
        reflector
            .method_for_args(self, name, args, reflector.config().static_flags)?
            .call(&Value::Null, args)
    }
}
