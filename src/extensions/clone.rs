//! Deep copies of object graphs.
//!
//! Every distinct object, array and holder reachable from the root is copied exactly once.
//! References between them are rewired to the copies, so shared references stay shared and
//! cycles stay cycles, and the result holds no reference into the source graph. Strings are
//! immutable and shared as they are.
//!
//! Reference targets are copied through a worklist instead of recursion, so long chains do not
//! grow the stack. Only structs nested inside structs recurse, bounded by the nesting depth of
//! their declared types.

use std::collections::HashMap;

use log::trace;

use crate::{
    metadata::value::{ArrayRef, ObjectRef, StructValue, Value, ValueHolder},
    Result,
};

enum Pending {
    Object(ObjectRef, ObjectRef),
    Array(ArrayRef, ArrayRef),
    Holder(ValueHolder, ValueHolder),
}

#[derive(Default)]
struct GraphCopier {
    copies: HashMap<usize, Value>,
    pending: Vec<Pending>,
}

impl GraphCopier {
    /// Returns the copy of `value`, allocating an empty shell for references seen for the
    /// first time. Shells are filled by [`GraphCopier::drain`].
    fn copy(&mut self, value: &Value) -> Value {
        match value {
            Value::Object(source) => {
                if let Some(existing) = self.copies.get(&source.addr()) {
                    return existing.clone();
                }
                let slots = vec![Value::Null; source.runtime_type().instance_slot_count()];
                let shell = ObjectRef::from_slots(source.runtime_type().clone(), slots);
                self.copies.insert(source.addr(), Value::Object(shell.clone()));
                self.pending.push(Pending::Object(source.clone(), shell.clone()));
                Value::Object(shell)
            }
            Value::Array(source) => {
                if let Some(existing) = self.copies.get(&source.addr()) {
                    return existing.clone();
                }
                let shell = ArrayRef::from_elements(source.runtime_type().clone(), vec![Value::Null; source.len()]);
                self.copies.insert(source.addr(), Value::Array(shell.clone()));
                self.pending.push(Pending::Array(source.clone(), shell.clone()));
                Value::Array(shell)
            }
            Value::Holder(source) => {
                if let Some(existing) = self.copies.get(&source.addr()) {
                    return existing.clone();
                }
                let shell = ValueHolder::new(Value::Null);
                self.copies.insert(source.addr(), Value::Holder(shell.clone()));
                self.pending.push(Pending::Holder(source.clone(), shell.clone()));
                Value::Holder(shell)
            }
            Value::Struct(source) => {
                let slots = source.slots().iter().map(|slot| self.copy(slot)).collect();
                Value::Struct(StructValue::from_slots(source.runtime_type().clone(), slots))
            }
            other => other.clone(),
        }
    }

    fn drain(&mut self) -> Result<()> {
        while let Some(job) = self.pending.pop() {
            match job {
                Pending::Object(source, shell) => {
                    for (slot, value) in source.snapshot().iter().enumerate() {
                        let copy = self.copy(value);
                        shell.store(slot, copy)?;
                    }
                }
                Pending::Array(source, shell) => {
                    for (index, value) in source.snapshot().iter().enumerate() {
                        let copy = self.copy(value);
                        shell.store(index, copy)?;
                    }
                }
                Pending::Holder(source, shell) => {
                    let copy = self.copy(&source.get());
                    shell.set(copy);
                }
            }
        }
        Ok(())
    }
}

/// Copies `value` and everything reachable from it.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] if an object holds fewer slots than its type declares.
///
/// # Examples
///
/// ```rust
/// use dotreflect::{
///     extensions::deep_clone,
///     metadata::{typesystem::TypeRegistry, value::{ObjectRef, Value}},
/// };
///
/// let registry = TypeRegistry::new();
/// let node = registry
///     .class("Sample", "Node")
///     .field("Next", registry.object())
///     .build()?;
///
/// let first = ObjectRef::allocate(&node);
/// first.store(0, Value::Object(first.clone()))?;
///
/// let copy = deep_clone(&Value::Object(first.clone()))?;
/// let copy = copy.as_object().unwrap();
/// assert!(!copy.ptr_eq(&first));
/// assert_eq!(copy.load(0)?, Value::Object(copy.clone()));
/// # Ok::<(), dotreflect::Error>(())
/// ```
pub fn deep_clone(value: &Value) -> Result<Value> {
    let mut copier = GraphCopier::default();
    let root = copier.copy(value);
    copier.drain()?;
    trace!("Deep cloned {} ({} references)", value.type_name(), copier.copies.len());
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        metadata::typesystem::TypeRegistry,
        test::fixtures::Model,
    };

    fn node(model: &Model, value: i32) -> ObjectRef {
        let node = ObjectRef::allocate(&model.node);
        node.store(0, Value::I32(value)).unwrap();
        node
    }

    #[test]
    fn test_preserves_shared_references() {
        let registry = TypeRegistry::new();
        let model = Model::new(&registry);

        let shared = node(&model, 2);
        let root = node(&model, 1);
        root.store(1, Value::Object(shared.clone())).unwrap();
        root.store(2, Value::Object(shared.clone())).unwrap();

        let copy = deep_clone(&Value::Object(root.clone())).unwrap();
        let copy = copy.as_object().unwrap();
        let next = copy.load(1).unwrap();
        let other = copy.load(2).unwrap();

        assert!(!copy.ptr_eq(&root));
        assert_eq!(next, other);
        assert_ne!(next, Value::Object(shared.clone()));
        assert_eq!(next.as_object().unwrap().load(0).unwrap(), Value::I32(2));
    }

    #[test]
    fn test_preserves_cycles() {
        let registry = TypeRegistry::new();
        let model = Model::new(&registry);

        let first = node(&model, 1);
        let second = node(&model, 2);
        first.store(1, Value::Object(second.clone())).unwrap();
        second.store(1, Value::Object(first.clone())).unwrap();

        let copy = deep_clone(&Value::Object(first.clone())).unwrap();
        let copy_first = copy.as_object().unwrap();
        let copy_second = copy_first.load(1).unwrap();
        let back = copy_second.as_object().unwrap().load(1).unwrap();

        assert_eq!(back, copy);
        assert_ne!(copy_second, Value::Object(second));
        assert_eq!(copy_second.as_object().unwrap().load(0).unwrap(), Value::I32(2));
    }

    #[test]
    fn test_arrays_and_holders() {
        let registry = TypeRegistry::new();
        let model = Model::new(&registry);
        let nodes = registry.array_of(&model.node);

        let shared = node(&model, 7);
        let array = ArrayRef::from_elements(
            nodes,
            vec![Value::Object(shared.clone()), Value::Object(shared.clone()), Value::Null],
        );
        let copy = deep_clone(&Value::Array(array.clone())).unwrap();
        let copy = copy.as_array().unwrap();
        assert!(!copy.ptr_eq(&array));
        assert_eq!(copy.load(0).unwrap(), copy.load(1).unwrap());
        assert_ne!(copy.load(0).unwrap(), Value::Object(shared));
        assert_eq!(copy.load(2).unwrap(), Value::Null);

        let holder = ValueHolder::new(StructValue::default_for(&model.animal));
        let copy = deep_clone(&Value::Holder(holder.clone())).unwrap();
        let copy = copy.as_holder().unwrap();
        assert!(!copy.ptr_eq(&holder));
        assert_eq!(copy.get(), holder.get());
    }

    #[test]
    fn test_plain_values() {
        assert_eq!(deep_clone(&Value::I32(3)).unwrap(), Value::I32(3));
        assert_eq!(deep_clone(&Value::from("text")).unwrap(), Value::from("text"));
        assert_eq!(deep_clone(&Value::Null).unwrap(), Value::Null);
    }
}
