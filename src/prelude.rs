//! # dotreflect Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the dotreflect library. Import this module to get quick access to the reflector,
//! the object model and the accessor handles.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all dotreflect operations
pub use crate::Error;

/// The result type used throughout dotreflect
pub use crate::Result;

/// Defaults used by the name based reflector operations
pub use crate::ReflectorConfig;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// Facade creating cached accessors
pub use crate::Reflector;

/// One-shot operations on instances and types
pub use crate::extensions::{deep_clone, ObjectExt, TypeExt};

/// Column oriented reads over instance sequences
pub use crate::datareader::{DataReader, DataReaderFactory};

// ================================================================================================
// Object Model
// ================================================================================================

/// Binding filters and member kind masks
pub use crate::metadata::flags::{BindingFlags, MemberTypes};

/// Members of runtime types
pub use crate::metadata::members::{FieldRc, MemberRef, MethodRc, PropertyRc};

/// Runtime types and their registry
pub use crate::metadata::typesystem::{PrimitiveKind, RuntimeTypeRc, TypeFlavor, TypeRegistry};

/// Runtime values
pub use crate::metadata::value::{ArrayRef, ObjectRef, StructValue, Value, ValueHolder};

// ================================================================================================
// Accessors
// ================================================================================================

/// Accessor handles returned by the reflector
pub use crate::emit::{
    ArrayElementGetter, ArrayElementSetter, ConstructorInvoker, MemberGetter, MemberSetter, MethodInvoker,
    MultiSetter, ObjectMapper, ShallowCloner,
};

/// Cache partitions and statistics
pub use crate::cache::{AccessorKind, CacheStats};
