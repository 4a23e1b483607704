//! Compiled member operations shared by the getter, setter, batch, mapper and cloner
//! emitters.
//!
//! A located member is compiled once into a [`ReadOp`] or [`WriteOp`] that captures the
//! slot, storage owner or accessor method, so executing it performs no lookup.

use std::sync::Arc;

use dashmap::DashMap;

use crate::{
    metadata::{
        members::{Invocation, MemberRef, MethodRc},
        token::Token,
        typesystem::RuntimeTypeRc,
        value::{Value, ValueHolder},
    },
    Error, Result,
};

/// Checks that `target` is an instance of `declaring`.
///
/// Returns the runtime type of the target.
pub(crate) fn narrow_target(declaring: &RuntimeTypeRc, target: &Value, member: &str) -> Result<RuntimeTypeRc> {
    if target.is_null() {
        return Err(Error::NullTarget(member.to_string()));
    }

    match target.runtime_type() {
        Some(actual) if declaring.is_assignable_from(&actual) => Ok(actual),
        _ => Err(Error::type_mismatch(declaring.fullname(), target.type_name())),
    }
}

/// Rejects naked structs as write targets; the write would land in a copy
pub(crate) fn require_writable(declaring: &RuntimeTypeRc, target: &Value) -> Result<()> {
    if let Value::Struct(inner) = target {
        return Err(Error::invalid_argument(
            format!("ValueHolder<{}>", inner.runtime_type().fullname()),
            declaring.fullname(),
        ));
    }
    Ok(())
}

/// Resolves virtual calls against the runtime type of the target, remembering each
/// resolution per runtime type.
pub(crate) struct Dispatch {
    method: MethodRc,
    declaring: Option<RuntimeTypeRc>,
    resolved: DashMap<Token, MethodRc>,
}

impl Dispatch {
    pub(crate) fn new(method: &MethodRc) -> Arc<Self> {
        Arc::new(Dispatch {
            method: method.clone(),
            declaring: method.declaring_type(),
            resolved: DashMap::new(),
        })
    }

    /// The method declared at the call site
    pub(crate) fn method(&self) -> &MethodRc {
        &self.method
    }

    /// The implementation to run for a target of type `runtime_type`
    pub(crate) fn resolve(&self, runtime_type: Option<&RuntimeTypeRc>) -> MethodRc {
        let Some(runtime_type) = runtime_type else {
            return self.method.clone();
        };
        if !self.method.is_virtual() || self.method.is_static() {
            return self.method.clone();
        }
        if self
            .declaring
            .as_ref()
            .is_some_and(|declaring| declaring.token == runtime_type.token)
        {
            return self.method.clone();
        }
        if let Some(resolved) = self.resolved.get(&runtime_type.token) {
            return resolved.clone();
        }

        let resolved = self.find_override(runtime_type);
        self.resolved
            .entry(runtime_type.token)
            .or_insert(resolved)
            .clone()
    }

    fn find_override(&self, runtime_type: &RuntimeTypeRc) -> MethodRc {
        let interface = self.declaring.as_ref().filter(|declaring| declaring.is_interface());
        let qualified = interface.map(|iface| format!("{}.{}", iface.fullname(), self.method.name));

        let mut current = Some(runtime_type.clone());
        while let Some(level) = current {
            if self
                .declaring
                .as_ref()
                .is_some_and(|declaring| declaring.token == level.token)
            {
                break;
            }

            if let Some(qualified) = &qualified {
                if let Some(found) = level
                    .declared_methods(qualified)
                    .into_iter()
                    .find(|candidate| candidate.same_signature(&self.method))
                {
                    return found;
                }
            }

            let found = level.declared_methods(&self.method.name).into_iter().find(|candidate| {
                if interface.is_some() {
                    !candidate.is_static() && candidate.same_signature(&self.method)
                } else {
                    candidate.overrides(&self.method)
                }
            });
            if let Some(found) = found {
                return found;
            }

            current = level.base();
        }
        self.method.clone()
    }
}

/// Runs an accessor or method body.
///
/// A naked struct `this` is placed in a temporary holder so the body can use the same slot
/// operations as for held structs; writes to it are discarded with the copy.
pub(crate) fn run_body(method: &MethodRc, this: &Value, args: &mut [Value]) -> Result<Value> {
    let Some(body) = method.body.as_ref() else {
        return Err(Error::Body(format!(
            "{} is abstract and has no implementation",
            method.signature()
        )));
    };

    let temporary;
    let this = match this {
        Value::Struct(inner) => {
            temporary = Value::Holder(ValueHolder::new(Value::Struct(inner.clone())));
            &temporary
        }
        other => other,
    };

    let result = body(Invocation {
        this,
        args,
        generic_args: &method.generic_args,
    })?;
    if method.return_type.as_ref().map_or(true, |ty| ty.is_void()) {
        Ok(Value::Null)
    } else {
        Ok(result)
    }
}

/// A compiled read of a field or property
#[derive(Clone)]
pub(crate) enum ReadOp {
    /// A literal field
    Constant(Value),
    /// A static field
    Static { owner: RuntimeTypeRc, slot: usize },
    /// An instance field
    Slot { slot: usize },
    /// A property getter
    Call { dispatch: Arc<Dispatch>, is_static: bool },
}

impl ReadOp {
    /// Compiles a read of `member`
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] for members without a readable value.
    pub(crate) fn compile(member: &MemberRef) -> Result<Self> {
        match member {
            MemberRef::Field(field) => {
                if let Some(constant) = field.constant.as_ref().filter(|_| field.is_literal()) {
                    Ok(ReadOp::Constant(constant.clone()))
                } else if field.is_static() {
                    Ok(ReadOp::Static {
                        owner: field.declaring_type.get()?,
                        slot: field.slot,
                    })
                } else {
                    Ok(ReadOp::Slot { slot: field.slot })
                }
            }
            MemberRef::Property(property) => match (&property.getter, property.is_indexer()) {
                (Some(getter), false) => Ok(ReadOp::Call {
                    dispatch: Dispatch::new(getter),
                    is_static: property.is_static(),
                }),
                (_, true) => Err(malformed_error!(
                    "Indexer {} needs index arguments",
                    property.name
                )),
                (None, _) => Err(malformed_error!("Property {} has no getter", property.name)),
            },
            other => Err(malformed_error!("{} is not a field or property", other.name())),
        }
    }

    /// Returns true if the read does not use the target instance
    pub(crate) fn is_static(&self) -> bool {
        match self {
            ReadOp::Constant(_) | ReadOp::Static { .. } => true,
            ReadOp::Slot { .. } => false,
            ReadOp::Call { is_static, .. } => *is_static,
        }
    }

    /// Executes the read; the target must already be narrowed
    pub(crate) fn read(&self, target: &Value) -> Result<Value> {
        match self {
            ReadOp::Constant(value) => Ok(value.clone()),
            ReadOp::Static { owner, slot } => owner.load_static(*slot),
            ReadOp::Slot { slot } => target.load_slot(*slot),
            ReadOp::Call { dispatch, is_static } => {
                if *is_static {
                    run_body(dispatch.method(), &Value::Null, &mut [])
                } else {
                    let method = dispatch.resolve(target.runtime_type().as_ref());
                    run_body(&method, target, &mut [])
                }
            }
        }
    }
}

/// A compiled write of a field or property
#[derive(Clone)]
pub(crate) enum WriteOp {
    /// A static field
    Static {
        owner: RuntimeTypeRc,
        slot: usize,
        value_type: RuntimeTypeRc,
    },
    /// An instance field
    Slot { slot: usize, value_type: RuntimeTypeRc },
    /// A property setter
    Call {
        dispatch: Arc<Dispatch>,
        is_static: bool,
        value_type: RuntimeTypeRc,
    },
}

impl WriteOp {
    /// Compiles a write of `member`
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] for literal fields, read-only properties and indexers.
    pub(crate) fn compile(member: &MemberRef) -> Result<Self> {
        match member {
            MemberRef::Field(field) => {
                if field.is_literal() {
                    Err(malformed_error!("Literal field {} cannot be written", field.name))
                } else if field.is_static() {
                    Ok(WriteOp::Static {
                        owner: field.declaring_type.get()?,
                        slot: field.slot,
                        value_type: field.field_type.clone(),
                    })
                } else {
                    Ok(WriteOp::Slot {
                        slot: field.slot,
                        value_type: field.field_type.clone(),
                    })
                }
            }
            MemberRef::Property(property) => match (&property.setter, property.is_indexer()) {
                (Some(setter), false) => Ok(WriteOp::Call {
                    dispatch: Dispatch::new(setter),
                    is_static: property.is_static(),
                    value_type: property.property_type.clone(),
                }),
                (_, true) => Err(malformed_error!(
                    "Indexer {} needs index arguments",
                    property.name
                )),
                (None, _) => Err(malformed_error!(
                    "Property {} is read-only",
                    property.name
                )),
            },
            other => Err(malformed_error!("{} is not a field or property", other.name())),
        }
    }

    /// Returns true if the write does not use the target instance
    pub(crate) fn is_static(&self) -> bool {
        match self {
            WriteOp::Static { .. } => true,
            WriteOp::Slot { .. } => false,
            WriteOp::Call { is_static, .. } => *is_static,
        }
    }

    /// The declared type values are narrowed to
    pub(crate) fn value_type(&self) -> &RuntimeTypeRc {
        match self {
            WriteOp::Static { value_type, .. }
            | WriteOp::Slot { value_type, .. }
            | WriteOp::Call { value_type, .. } => value_type,
        }
    }

    /// Narrows `value` and executes the write; the target must already be narrowed
    pub(crate) fn write(&self, target: &Value, value: Value) -> Result<()> {
        let value = value.coerce_to(self.value_type())?;
        match self {
            WriteOp::Static { owner, slot, .. } => owner.store_static(*slot, value),
            WriteOp::Slot { slot, .. } => target.store_slot(*slot, value),
            WriteOp::Call {
                dispatch, is_static, ..
            } => {
                let mut args = [value];
                if *is_static {
                    run_body(dispatch.method(), &Value::Null, &mut args)?;
                } else {
                    let method = dispatch.resolve(target.runtime_type().as_ref());
                    run_body(&method, target, &mut args)?;
                }
                Ok(())
            }
        }
    }
}
