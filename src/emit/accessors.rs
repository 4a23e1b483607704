//! The accessor handles returned by the emitter.
//!
//! Every accessor is a cheap, cloneable handle around a reference-counted closure. Clones
//! share the closure, so [`MemberGetter::ptr_eq`] and friends tell whether two handles came
//! from the same emission.

use std::sync::Arc;

use crate::{metadata::value::Value, Result};

macro_rules! accessor_handle {
    ($(#[$meta:meta])* $name:ident, $body:ty) => {
        $(#[$meta])*
        #[derive(Clone)]
        pub struct $name {
            body: Arc<$body>,
        }

        impl $name {
            /// Returns true if both handles share the same emitted closure
            #[must_use]
            pub fn ptr_eq(&self, other: &Self) -> bool {
                Arc::ptr_eq(&self.body, &other.body)
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({:p})", stringify!($name), Arc::as_ptr(&self.body))
            }
        }
    };
}

type GetterBody = dyn Fn(&Value) -> Result<Value> + Send + Sync;
type SetterBody = dyn Fn(&Value, Value) -> Result<()> + Send + Sync;
type ConstructorBody = dyn Fn(&mut [Value]) -> Result<Value> + Send + Sync;
type MethodBody = dyn Fn(&Value, &mut [Value]) -> Result<Value> + Send + Sync;
type ElementGetterBody = dyn Fn(&Value, usize) -> Result<Value> + Send + Sync;
type ElementSetterBody = dyn Fn(&Value, usize, Value) -> Result<()> + Send + Sync;
type MultiSetterBody = dyn Fn(&Value, &[Value]) -> Result<()> + Send + Sync;
type MapperBody = dyn Fn(&Value, &Value) -> Result<()> + Send + Sync;
type ClonerBody = dyn Fn(&Value) -> Result<Value> + Send + Sync;

accessor_handle!(
    /// Reads a field or property
    MemberGetter,
    GetterBody
);

impl MemberGetter {
    pub(crate) fn new<F>(body: F) -> Self
    where
        F: Fn(&Value) -> Result<Value> + Send + Sync + 'static,
    {
        MemberGetter { body: Arc::new(body) }
    }

    /// Reads the member from `target`; static members ignore the target.
    ///
    /// # Errors
    /// Returns [`crate::Error::NullTarget`] or [`crate::Error::TypeMismatch`] for unusable
    /// targets, or any error raised by a property getter body.
    pub fn get(&self, target: &Value) -> Result<Value> {
        (self.body)(target)
    }
}

accessor_handle!(
    /// Writes a field or property
    MemberSetter,
    SetterBody
);

impl MemberSetter {
    pub(crate) fn new<F>(body: F) -> Self
    where
        F: Fn(&Value, Value) -> Result<()> + Send + Sync + 'static,
    {
        MemberSetter { body: Arc::new(body) }
    }

    /// Writes `value` to the member of `target`. Struct targets must be wrapped in a
    /// [`crate::metadata::value::ValueHolder`].
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] if the value does not fit the member or the
    /// target is a naked struct.
    pub fn set(&self, target: &Value, value: impl Into<Value>) -> Result<()> {
        (self.body)(target, value.into())
    }
}

/// Creates instances of a type
#[derive(Clone)]
pub struct ConstructorInvoker {
    body: Arc<ConstructorBody>,
    has_default_constructor: bool,
}

impl ConstructorInvoker {
    pub(crate) fn new<F>(body: F, has_default_constructor: bool) -> Self
    where
        F: Fn(&mut [Value]) -> Result<Value> + Send + Sync + 'static,
    {
        ConstructorInvoker {
            body: Arc::new(body),
            has_default_constructor,
        }
    }

    /// Creates an instance. Arguments are narrowed to the declared parameter types.
    ///
    /// # Errors
    /// Returns [`crate::Error::ArgumentCount`] or [`crate::Error::InvalidArgument`] for
    /// unusable arguments, or any error raised by the constructor body.
    pub fn invoke(&self, args: &[Value]) -> Result<Value> {
        let mut args = args.to_vec();
        (self.body)(&mut args)
    }

    /// Creates an instance; by-ref arguments written by the constructor are visible in
    /// `args` afterwards.
    ///
    /// # Errors
    /// See [`ConstructorInvoker::invoke`].
    pub fn invoke_ref(&self, args: &mut [Value]) -> Result<Value> {
        (self.body)(args)
    }

    /// Returns false if this invoker allocates without running a parameterless constructor
    #[must_use]
    pub fn has_default_constructor(&self) -> bool {
        self.has_default_constructor
    }

    /// Returns true if both handles share the same emitted closure
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.body, &other.body)
    }
}

impl std::fmt::Debug for ConstructorInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstructorInvoker")
            .field("body", &Arc::as_ptr(&self.body))
            .field("has_default_constructor", &self.has_default_constructor)
            .finish()
    }
}

accessor_handle!(
    /// Calls a method
    MethodInvoker,
    MethodBody
);

impl MethodInvoker {
    pub(crate) fn new<F>(body: F) -> Self
    where
        F: Fn(&Value, &mut [Value]) -> Result<Value> + Send + Sync + 'static,
    {
        MethodInvoker { body: Arc::new(body) }
    }

    /// Calls the method on `target` (ignored for static methods). Values written to by-ref
    /// parameters are stored back into `args`. Void methods return `Null`.
    ///
    /// # Errors
    /// Returns [`crate::Error::ArgumentCount`], [`crate::Error::InvalidArgument`],
    /// [`crate::Error::NullTarget`] or [`crate::Error::TypeMismatch`] for unusable input, or
    /// any error raised by the method body.
    pub fn invoke(&self, target: &Value, args: &mut [Value]) -> Result<Value> {
        (self.body)(target, args)
    }

    /// Calls the method with a copy of `args`, discarding by-ref write-back
    ///
    /// # Errors
    /// See [`MethodInvoker::invoke`].
    pub fn call(&self, target: &Value, args: &[Value]) -> Result<Value> {
        let mut args = args.to_vec();
        (self.body)(target, &mut args)
    }
}

accessor_handle!(
    /// Reads array elements
    ArrayElementGetter,
    ElementGetterBody
);

impl ArrayElementGetter {
    pub(crate) fn new<F>(body: F) -> Self
    where
        F: Fn(&Value, usize) -> Result<Value> + Send + Sync + 'static,
    {
        ArrayElementGetter { body: Arc::new(body) }
    }

    /// Reads the element at `index`
    ///
    /// # Errors
    /// Returns [`crate::Error::IndexOutOfRange`] outside the bounds and
    /// [`crate::Error::TypeMismatch`] for values that are not arrays of the emitted type.
    pub fn get(&self, array: &Value, index: usize) -> Result<Value> {
        (self.body)(array, index)
    }
}

accessor_handle!(
    /// Writes array elements
    ArrayElementSetter,
    ElementSetterBody
);

impl ArrayElementSetter {
    pub(crate) fn new<F>(body: F) -> Self
    where
        F: Fn(&Value, usize, Value) -> Result<()> + Send + Sync + 'static,
    {
        ArrayElementSetter { body: Arc::new(body) }
    }

    /// Writes the element at `index`, narrowing the value to the element type
    ///
    /// # Errors
    /// See [`ArrayElementGetter::get`]; also [`crate::Error::InvalidArgument`] for values
    /// that do not fit the element type.
    pub fn set(&self, array: &Value, index: usize, value: impl Into<Value>) -> Result<()> {
        (self.body)(array, index, value.into())
    }
}

/// Writes an ordered list of members in one call
#[derive(Clone)]
pub struct MultiSetter {
    body: Arc<MultiSetterBody>,
    applied: Arc<[bool]>,
}

impl MultiSetter {
    pub(crate) fn new<F>(body: F, applied: Vec<bool>) -> Self
    where
        F: Fn(&Value, &[Value]) -> Result<()> + Send + Sync + 'static,
    {
        MultiSetter {
            body: Arc::new(body),
            applied: applied.into(),
        }
    }

    /// Writes `values` positionally. Positions of members that cannot be written are
    /// skipped but still consume their value.
    ///
    /// # Errors
    /// Returns [`crate::Error::ArgumentCount`] if the number of values differs from the
    /// number of members, or the first error of an individual write.
    pub fn set(&self, target: &Value, values: &[Value]) -> Result<()> {
        (self.body)(target, values)
    }

    /// Number of values [`MultiSetter::set`] expects
    #[must_use]
    pub fn len(&self) -> usize {
        self.applied.len()
    }

    /// Returns true for a setter over no members
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.applied.is_empty()
    }

    /// Returns true if the value at `position` is written, false if it is skipped
    #[must_use]
    pub fn is_applied(&self, position: usize) -> bool {
        self.applied.get(position).copied().unwrap_or(false)
    }

    /// Positions whose values are skipped
    #[must_use]
    pub fn skipped(&self) -> Vec<usize> {
        self.applied
            .iter()
            .enumerate()
            .filter(|(_, applied)| !**applied)
            .map(|(position, _)| position)
            .collect()
    }

    /// Returns true if both handles share the same emitted closure
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.body, &other.body)
    }
}

impl std::fmt::Debug for MultiSetter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiSetter")
            .field("body", &Arc::as_ptr(&self.body))
            .field("applied", &self.applied)
            .finish()
    }
}

accessor_handle!(
    /// Copies member values from a source to a target instance
    ObjectMapper,
    MapperBody
);

impl ObjectMapper {
    pub(crate) fn new<F>(body: F) -> Self
    where
        F: Fn(&Value, &Value) -> Result<()> + Send + Sync + 'static,
    {
        ObjectMapper { body: Arc::new(body) }
    }

    /// Copies the paired members from `source` to `target`
    ///
    /// # Errors
    /// Returns the first error of an individual read or write.
    pub fn map(&self, source: &Value, target: &Value) -> Result<()> {
        (self.body)(source, target)
    }
}

accessor_handle!(
    /// Duplicates an instance field by field
    ShallowCloner,
    ClonerBody
);

impl ShallowCloner {
    pub(crate) fn new<F>(body: F) -> Self
    where
        F: Fn(&Value) -> Result<Value> + Send + Sync + 'static,
    {
        ShallowCloner { body: Arc::new(body) }
    }

    /// Returns a new instance with the same field values as `source`
    ///
    /// # Errors
    /// Returns [`crate::Error::TypeMismatch`] if `source` is not an instance of the emitted
    /// type.
    pub fn clone_value(&self, source: &Value) -> Result<Value> {
        (self.body)(source)
    }
}
