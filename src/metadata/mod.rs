//! The object model accessors are emitted for.
//!
//! This module contains the registry based "host runtime" of the library: metadata tokens,
//! binding filters, runtime types with their members, and the dynamically typed values that
//! flow through accessors.
//!
//! # Key Components
//!
//! - [`token`] - Metadata identities of types and members
//! - [`flags`] - [`flags::BindingFlags`] and [`flags::MemberTypes`] filters for member lookups
//! - [`typesystem`] - Types, the [`typesystem::TypeRegistry`] and the fluent
//!   [`typesystem::TypeBuilder`]
//! - [`members`] - Fields, properties, methods and constructors with their native bodies
//! - [`value`] - [`value::Value`], objects, arrays, structs and [`value::ValueHolder`] cells
//!
//! # Examples
//!
//! ```rust
//! use dotreflect::metadata::{typesystem::TypeRegistry, value::{ObjectRef, Value}};
//!
//! let registry = TypeRegistry::new();
//! let point = registry
//!     .class("Geometry", "Point")
//!     .field("X", registry.int32())
//!     .field("Y", registry.int32())
//!     .build()?;
//!
//! let instance = Value::Object(ObjectRef::allocate(&point));
//! assert_eq!(instance.load_slot(1)?, Value::I32(0));
//! # Ok::<(), dotreflect::Error>(())
//! ```

/// Binding filters and member kind masks
pub mod flags;
/// Fields, properties, methods and constructors
pub mod members;
/// Metadata tokens
pub mod token;
/// Runtime types and their registry
pub mod typesystem;
/// Runtime values
pub mod value;
