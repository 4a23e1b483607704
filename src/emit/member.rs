use crate::{
    emit::{
        accessors::{MemberGetter, MemberSetter},
        descriptor::MemberDescriptor,
        ops::{narrow_target, require_writable, ReadOp, WriteOp},
    },
    metadata::value::Value,
    Result,
};

/// Emits a getter for a field or property.
///
/// Literal fields (including enum members) return their captured constant, static members
/// ignore the target, instance members check that the target is an instance of the
/// descriptor's target type. Struct targets may be naked or held.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] for write-only properties and indexers.
pub fn getter(descriptor: &MemberDescriptor) -> Result<MemberGetter> {
    if !descriptor.can_read() {
        return Err(malformed_error!(
            "{} on {} cannot be read",
            descriptor.name(),
            descriptor.target_type.fullname()
        ));
    }

    let op = ReadOp::compile(&descriptor.member)?;
    if op.is_static() {
        return Ok(MemberGetter::new(move |_| op.read(&Value::Null)));
    }

    let target_type = descriptor.target_type.clone();
    let name = descriptor.name().to_string();
    Ok(MemberGetter::new(move |target| {
        narrow_target(&target_type, target, &name)?;
        op.read(target)
    }))
}

/// Emits a setter for a field or property.
///
/// Values are narrowed to the declared member type, so an enum and its underlying primitive
/// are interchangeable. Struct targets must be held in a
/// [`crate::metadata::value::ValueHolder`]; the write updates the held copy in place.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] for literal fields, read-only properties and
/// indexers.
pub fn setter(descriptor: &MemberDescriptor) -> Result<MemberSetter> {
    let op = WriteOp::compile(&descriptor.member)?;
    if op.is_static() {
        return Ok(MemberSetter::new(move |_, value| op.write(&Value::Null, value)));
    }

    let target_type = descriptor.target_type.clone();
    let name = descriptor.name().to_string();
    Ok(MemberSetter::new(move |target, value| {
        narrow_target(&target_type, target, &name)?;
        require_writable(&target_type, target)?;
        op.write(target, value)
    }))
}
