use std::sync::{Arc, RwLock};

use crate::metadata::value::Value;

/// A shared, lock-protected cell around a value-type instance.
///
/// Structs are copied whenever they are passed around, so a setter handed a naked struct could
/// only ever mutate its own copy. Wrapping the instance in a `ValueHolder` gives every accessor
/// the same mutable location; [`ValueHolder::get`] reads the mutated copy back.
///
/// Clones of a holder share the cell. Equality is reference identity.
#[derive(Clone)]
pub struct ValueHolder(Arc<RwLock<Value>>);

impl ValueHolder {
    /// Wraps `value` in a new holder
    pub fn new(value: impl Into<Value>) -> Self {
        ValueHolder(Arc::new(RwLock::new(value.into())))
    }

    /// Returns a copy of the held value
    #[must_use]
    pub fn get(&self) -> Value {
        read_lock!(self.0).clone()
    }

    /// Replaces the held value
    pub fn set(&self, value: impl Into<Value>) {
        *write_lock!(self.0) = value.into();
    }

    /// Runs `f` with shared access to the held value
    pub fn with<R>(&self, f: impl FnOnce(&Value) -> R) -> R {
        with_read!(self.0, f)
    }

    /// Runs `f` with exclusive access to the held value
    pub fn update<R>(&self, f: impl FnOnce(&mut Value) -> R) -> R {
        with_write!(self.0, f)
    }

    /// Returns true if both holders share the same cell
    #[must_use]
    pub fn ptr_eq(&self, other: &ValueHolder) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Address of the cell, usable as identity key
    #[must_use]
    pub fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }
}

impl PartialEq for ValueHolder {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl std::fmt::Debug for ValueHolder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ValueHolder({:?})", self.get())
    }
}
