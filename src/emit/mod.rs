//! Accessor emitter: turns a resolved descriptor into a directly callable accessor.
//!
//! Emission happens once per descriptor. Everything that can be decided ahead of time (slot
//! indices, static storage owners, accessor bodies, parameter types, literal values) is
//! compiled into the returned closure, so invoking an accessor performs no name lookup.
//! Calls through base or interface methods are resolved against the runtime type of the
//! target through a small per-accessor dispatch cache.
//!
//! Emitters never consult the [`crate::cache::AccessorCache`]; the cache calls them.
//!
//! # Examples
//!
//! ```rust
//! use dotreflect::{
//!     emit::{self, MemberDescriptor},
//!     lookup,
//!     metadata::{
//!         flags::BindingFlags,
//!         typesystem::TypeRegistry,
//!         value::{ObjectRef, Value},
//!     },
//! };
//!
//! let registry = TypeRegistry::new();
//! let person = registry
//!     .class("Sample", "Person")
//!     .field("Age", registry.int32())
//!     .build()?;
//!
//! let age = lookup::field(&person, "Age", BindingFlags::default())?;
//! let descriptor = MemberDescriptor::new(&person, age.into())?;
//! let setter = emit::setter(&descriptor)?;
//! let getter = emit::getter(&descriptor)?;
//!
//! let instance = Value::Object(ObjectRef::allocate(&person));
//! setter.set(&instance, 35)?;
//! assert_eq!(getter.get(&instance)?, Value::I32(35));
//! # Ok::<(), dotreflect::Error>(())
//! ```

mod accessors;
mod batch;
mod descriptor;
mod invoke;
mod member;
pub(crate) mod ops;

pub use accessors::{
    ArrayElementGetter, ArrayElementSetter, ConstructorInvoker, MemberGetter, MemberSetter, MethodInvoker,
    MultiSetter, ObjectMapper, ShallowCloner,
};
pub use batch::{array_getter, array_setter, mapper, multi_setter, shallow_cloner};
pub use descriptor::{ArrayDescriptor, BatchDescriptor, CallDescriptor, MapDescriptor, MemberDescriptor};
pub use invoke::{constructor, method};
pub use member::{getter, setter};
