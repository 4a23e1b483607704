use crate::{
    extensions::{clone::deep_clone, not_found_as_none},
    metadata::value::{ArrayRef, Value},
    Reflector, Result,
};

/// One-shot member access on instances.
///
/// Each call resolves the runtime type of the receiver, fetches the cached accessor from the
/// [`Reflector`] and invokes it. Struct receivers must be wrapped in a
/// [`crate::metadata::value::ValueHolder`] for writes to be observable.
pub trait ObjectExt {
    /// Reads the field or property `name`
    ///
    /// # Errors
    /// Returns [`crate::Error::NullTarget`] for `Null`, the lookup error if there is no such
    /// member, or the error of the getter.
    fn get_member(&self, reflector: &Reflector, name: &str) -> Result<Value>;

    /// Writes the field or property `name`
    ///
    /// # Errors
    /// See [`ObjectExt::get_member`].
    fn set_member(&self, reflector: &Reflector, name: &str, value: impl Into<Value>) -> Result<()>;

    /// Reads the field `name`
    ///
    /// # Errors
    /// See [`ObjectExt::get_member`].
    fn get_field(&self, reflector: &Reflector, name: &str) -> Result<Value>;

    /// Writes the field `name`
    ///
    /// # Errors
    /// See [`ObjectExt::get_member`].
    fn set_field(&self, reflector: &Reflector, name: &str, value: impl Into<Value>) -> Result<()>;

    /// Reads the property `name`
    ///
    /// # Errors
    /// See [`ObjectExt::get_member`].
    fn get_property(&self, reflector: &Reflector, name: &str) -> Result<Value>;

    /// Writes the property `name`
    ///
    /// # Errors
    /// See [`ObjectExt::get_member`].
    fn set_property(&self, reflector: &Reflector, name: &str, value: impl Into<Value>) -> Result<()>;

    /// Calls the method `name` whose parameters accept `args`
    ///
    /// # Errors
    /// See [`ObjectExt::get_member`].
    fn call_method(&self, reflector: &Reflector, name: &str, args: &[Value]) -> Result<Value>;

    /// Calls the method `name` whose parameters accept `args`; by-ref parameters are written
    /// back into `args`
    ///
    /// # Errors
    /// See [`ObjectExt::get_member`].
    fn call_method_ref(&self, reflector: &Reflector, name: &str, args: &mut [Value]) -> Result<Value>;

    /// Reads element `index` of an array
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the receiver is not an array and
    /// [`crate::Error::IndexOutOfRange`] outside its bounds.
    fn get_element(&self, reflector: &Reflector, index: usize) -> Result<Value>;

    /// Writes element `index` of an array
    ///
    /// # Errors
    /// See [`ObjectExt::get_element`].
    fn set_element(&self, reflector: &Reflector, index: usize, value: impl Into<Value>) -> Result<()>;

    /// Like [`ObjectExt::get_member`], but `None` if there is no such member
    ///
    /// # Errors
    /// Any error other than a failed lookup.
    fn try_get_member(&self, reflector: &Reflector, name: &str) -> Result<Option<Value>>;

    /// Like [`ObjectExt::set_member`], but `false` if there is no such member
    ///
    /// # Errors
    /// Any error other than a failed lookup.
    fn try_set_member(&self, reflector: &Reflector, name: &str, value: impl Into<Value>) -> Result<bool>;

    /// Like [`ObjectExt::call_method`], but `None` if there is no matching method
    ///
    /// # Errors
    /// Any error other than a failed lookup.
    fn try_call_method(&self, reflector: &Reflector, name: &str, args: &[Value]) -> Result<Option<Value>>;

    /// Writes `values[i]` to the member `names[i]`
    ///
    /// # Errors
    /// See [`Reflector::multi_setter`] and [`crate::emit::MultiSetter::set`].
    fn set_members(&self, reflector: &Reflector, names: &[&str], values: &[Value]) -> Result<()>;

    /// Copies the members with a matching name and type into `target`, restricted to `names`
    /// unless it is empty
    ///
    /// # Errors
    /// See [`Reflector::mapper`] and [`crate::emit::ObjectMapper::map`].
    fn map_members(&self, reflector: &Reflector, target: &Value, names: &[&str]) -> Result<()>;

    /// Copies the receiver and everything reachable from it, see [`deep_clone`]
    ///
    /// # Errors
    /// See [`deep_clone`].
    fn deep_clone(&self) -> Result<Value>;

    /// Copies the receiver field by field; referenced objects are shared with the source.
    /// Arrays are copied element by element, other values are returned as they are.
    ///
    /// # Errors
    /// See [`Reflector::shallow_cloner`].
    fn shallow_clone(&self, reflector: &Reflector) -> Result<Value>;
}

impl ObjectExt for Value {
    fn get_member(&self, reflector: &Reflector, name: &str) -> Result<Value> {
        let ty = reflector.type_of(self)?;
        reflector.getter(&ty, name)?.get(self)
    }

    fn set_member(&self, reflector: &Reflector, name: &str, value: impl Into<Value>) -> Result<()> {
        let ty = reflector.type_of(self)?;
        reflector.setter(&ty, name)?.set(self, value)
    }

    fn get_field(&self, reflector: &Reflector, name: &str) -> Result<Value> {
        let ty = reflector.type_of(self)?;
        reflector.field_getter(&ty, name)?.get(self)
    }

    fn set_field(&self, reflector: &Reflector, name: &str, value: impl Into<Value>) -> Result<()> {
        let ty = reflector.type_of(self)?;
        reflector.field_setter(&ty, name)?.set(self, value)
    }

    fn get_property(&self, reflector: &Reflector, name: &str) -> Result<Value> {
        let ty = reflector.type_of(self)?;
        reflector.property_getter(&ty, name)?.get(self)
    }

    fn set_property(&self, reflector: &Reflector, name: &str, value: impl Into<Value>) -> Result<()> {
        let ty = reflector.type_of(self)?;
        reflector.property_setter(&ty, name)?.set(self, value)
    }

    fn call_method(&self, reflector: &Reflector, name: &str, args: &[Value]) -> Result<Value> {
        let ty = reflector.type_of(self)?;
        reflector
            .method_for_args(&ty, name, args, reflector.config().member_flags)?
            .call(self, args)
    }

    fn call_method_ref(&self, reflector: &Reflector, name: &str, args: &mut [Value]) -> Result<Value> {
        let ty = reflector.type_of(self)?;
        reflector
            .method_for_args(&ty, name, args, reflector.config().member_flags)?
            .invoke(self, args)
    }

    fn get_element(&self, reflector: &Reflector, index: usize) -> Result<Value> {
        let ty = reflector.type_of(self)?;
        reflector.array_getter(&ty)?.get(self, index)
    }

    fn set_element(&self, reflector: &Reflector, index: usize, value: impl Into<Value>) -> Result<()> {
        let ty = reflector.type_of(self)?;
        reflector.array_setter(&ty)?.set(self, index, value)
    }

    fn try_get_member(&self, reflector: &Reflector, name: &str) -> Result<Option<Value>> {
        let ty = reflector.type_of(self)?;
        match not_found_as_none(reflector.getter(&ty, name))? {
            Some(getter) => getter.get(self).map(Some),
            None => Ok(None),
        }
    }

    fn try_set_member(&self, reflector: &Reflector, name: &str, value: impl Into<Value>) -> Result<bool> {
        let ty = reflector.type_of(self)?;
        match not_found_as_none(reflector.setter(&ty, name))? {
            Some(setter) => setter.set(self, value).map(|()| true),
            None => Ok(false),
        }
    }

    fn try_call_method(&self, reflector: &Reflector, name: &str, args: &[Value]) -> Result<Option<Value>> {
        let ty = reflector.type_of(self)?;
        let method = reflector.method_for_args(&ty, name, args, reflector.config().member_flags);
        match not_found_as_none(method)? {
            Some(method) => method.call(self, args).map(Some),
            None => Ok(None),
        }
    }

    fn set_members(&self, reflector: &Reflector, names: &[&str], values: &[Value]) -> Result<()> {
        let ty = reflector.type_of(self)?;
        reflector.multi_setter(&ty, names)?.set(self, values)
    }

    fn map_members(&self, reflector: &Reflector, target: &Value, names: &[&str]) -> Result<()> {
        let source_type = reflector.type_of(self)?;
        let target_type = reflector.type_of(target)?;
        reflector.mapper(&source_type, &target_type, names)?.map(self, target)
    }

    fn deep_clone(&self) -> Result<Value> {
        deep_clone(self)
    }

    fn shallow_clone(&self, reflector: &Reflector) -> Result<Value> {
        match self {
            Value::Array(array) => Ok(Value::Array(ArrayRef::from_elements(
                array.runtime_type().clone(),
                array.snapshot(),
            ))),
            Value::Object(_) | Value::Struct(_) | Value::Holder(_) => {
                let ty = reflector.type_of(self)?;
                reflector.shallow_cloner(&ty)?.clone_value(self)
            }
            other => Ok(other.clone()),
        }
    }
}
