use log::warn;

use crate::{
    emit::{
        accessors::{ArrayElementGetter, ArrayElementSetter, MultiSetter, ObjectMapper, ShallowCloner},
        descriptor::{ArrayDescriptor, BatchDescriptor, MapDescriptor},
        ops::{narrow_target, require_writable, ReadOp, WriteOp},
    },
    metadata::{
        members::MemberRef,
        typesystem::{RuntimeTypeRc, TypeFlavor},
        value::{ArrayRef, ObjectRef, StructValue, Value, ValueHolder},
    },
    Error, Result,
};

fn narrow_array<'v>(array_type: &RuntimeTypeRc, target: &'v Value) -> Result<&'v ArrayRef> {
    match target {
        Value::Array(array) if array_type.is_assignable_from(array.runtime_type()) => Ok(array),
        Value::Null => Err(Error::NullTarget(array_type.fullname())),
        other => Err(Error::type_mismatch(array_type.fullname(), other.type_name())),
    }
}

fn element_type(descriptor: &ArrayDescriptor) -> Result<RuntimeTypeRc> {
    descriptor
        .array_type
        .element_type()
        .filter(|_| descriptor.array_type.is_array())
        .ok_or_else(|| malformed_error!("{} is not an array type", descriptor.array_type.fullname()))
}

/// Emits an element getter for arrays of the descriptor's type (or covariant arrays of a
/// derived element type).
///
/// # Errors
/// Returns [`Error::Malformed`] if the descriptor does not name an array type.
pub fn array_getter(descriptor: &ArrayDescriptor) -> Result<ArrayElementGetter> {
    element_type(descriptor)?;
    let array_type = descriptor.array_type.clone();
    Ok(ArrayElementGetter::new(move |target, index| {
        narrow_array(&array_type, target)?.load(index)
    }))
}

/// Emits an element setter. Values are narrowed to the element type of the actual array,
/// so a covariant array rejects elements of its base type.
///
/// # Errors
/// Returns [`Error::Malformed`] if the descriptor does not name an array type.
pub fn array_setter(descriptor: &ArrayDescriptor) -> Result<ArrayElementSetter> {
    let declared = element_type(descriptor)?;
    let array_type = descriptor.array_type.clone();
    Ok(ArrayElementSetter::new(move |target, index, value| {
        let array = narrow_array(&array_type, target)?;
        let mut value = value.coerce_to(&declared)?;
        if let Some(actual) = array.runtime_type().element_type() {
            if actual.token != declared.token {
                value = value.coerce_to(&actual)?;
            }
        }
        array.store(index, value)
    }))
}

/// Emits a setter writing the descriptor's members positionally.
///
/// Members that cannot be written (literal fields, read-only properties) keep their
/// position but their value is skipped; [`MultiSetter::skipped`] lists them.
///
/// # Errors
/// Returns [`Error::Malformed`] if a member is not a field or property.
pub fn multi_setter(descriptor: &BatchDescriptor) -> Result<MultiSetter> {
    let target_type = descriptor.target_type.clone();
    let mut ops = Vec::with_capacity(descriptor.members.len());
    for member in &descriptor.members {
        if !matches!(member, MemberRef::Field(_) | MemberRef::Property(_)) {
            return Err(malformed_error!(
                "{} on {} is not a field or property",
                member.name(),
                target_type.fullname()
            ));
        }

        if member.can_write() {
            ops.push(Some(WriteOp::compile(member)?));
        } else {
            warn!(
                "Skipping {} on {}: member cannot be written",
                member.name(),
                target_type.fullname()
            );
            ops.push(None);
        }
    }

    let applied = ops.iter().map(Option::is_some).collect();
    let uses_target = ops.iter().flatten().any(|op| !op.is_static());
    Ok(MultiSetter::new(
        move |target, values| {
            if values.len() != ops.len() {
                return Err(Error::ArgumentCount {
                    expected: ops.len(),
                    actual: values.len(),
                });
            }
            if uses_target {
                narrow_target(&target_type, target, "multi setter")?;
                require_writable(&target_type, target)?;
            }

            for (op, value) in ops.iter().zip(values) {
                if let Some(op) = op {
                    op.write(target, value.clone())?;
                }
            }
            Ok(())
        },
        applied,
    ))
}

/// Emits a mapper copying each paired source member to its target member.
///
/// # Errors
/// Returns [`Error::Malformed`] if a source member cannot be read or a target member
/// cannot be written.
pub fn mapper(descriptor: &MapDescriptor) -> Result<ObjectMapper> {
    let mut ops = Vec::with_capacity(descriptor.pairs.len());
    for (source, target) in &descriptor.pairs {
        if !source.can_read() {
            return Err(malformed_error!(
                "{} on {} cannot be read",
                source.name(),
                descriptor.source_type.fullname()
            ));
        }
        ops.push((ReadOp::compile(source)?, WriteOp::compile(target)?));
    }

    let source_type = descriptor.source_type.clone();
    let target_type = descriptor.target_type.clone();
    let reads_source = ops.iter().any(|(read, _)| !read.is_static());
    let writes_target = ops.iter().any(|(_, write)| !write.is_static());
    Ok(ObjectMapper::new(move |source, target| {
        if reads_source {
            narrow_target(&source_type, source, "mapper source")?;
        }
        if writes_target {
            narrow_target(&target_type, target, "mapper target")?;
            require_writable(&target_type, target)?;
        }

        for (read, write) in &ops {
            write.write(target, read.read(source)?)?;
        }
        Ok(())
    }))
}

/// Emits a cloner copying every instance field slot of the descriptor's members into a
/// freshly allocated instance. Field values are copied as they are, so nested objects
/// stay shared with the source.
///
/// A held struct is cloned into a new holder, a naked struct into a naked struct.
///
/// # Errors
/// Returns [`Error::Malformed`] for types that are neither classes nor structs.
pub fn shallow_cloner(descriptor: &BatchDescriptor) -> Result<ShallowCloner> {
    let ty = descriptor.target_type.clone();
    if !matches!(ty.flavor, TypeFlavor::Class | TypeFlavor::ValueType) || ty.is_abstract() {
        return Err(malformed_error!("{} cannot be cloned", ty.fullname()));
    }

    let slots: Vec<usize> = descriptor
        .members
        .iter()
        .filter_map(MemberRef::as_field)
        .filter(|field| !field.is_static())
        .map(|field| field.slot)
        .collect();

    Ok(ShallowCloner::new(move |source| {
        let runtime_type = narrow_target(&ty, source, "clone")?;
        if runtime_type.token != ty.token {
            return Err(Error::type_mismatch(ty.fullname(), runtime_type.fullname()));
        }

        let clone = match ty.flavor {
            TypeFlavor::ValueType => Value::Holder(ValueHolder::new(Value::Struct(StructValue::default_for(&ty)))),
            _ => Value::Object(ObjectRef::allocate(&ty)),
        };
        for slot in &slots {
            clone.store_slot(*slot, source.load_slot(*slot)?)?;
        }

        if matches!(source, Value::Struct(_)) {
            Ok(clone.unwrap_holder())
        } else {
            Ok(clone)
        }
    }))
}
