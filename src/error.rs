use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Every failure in `dotreflect` is deterministic and caused by caller input (a wrong name, a
/// wrong filter, a wrong argument), so errors are always propagated synchronously to the
/// immediate caller and never retried.
///
/// # Error Categories
///
/// ## Lookup Errors
/// - [`Error::FieldNotFound`], [`Error::PropertyNotFound`], [`Error::MemberNotFound`],
///   [`Error::MethodNotFound`], [`Error::ConstructorNotFound`], [`Error::TypeNotFound`] -
///   the locator found no match after applying the binding filter and inheritance rules
/// - [`Error::AmbiguousMatch`] - more than one member satisfied a lookup that must be unique
///
/// ## Invocation Errors
/// - [`Error::NullTarget`] - an instance accessor was invoked without a target
/// - [`Error::InvalidArgument`] - a value could not be narrowed to the expected type
/// - [`Error::TypeMismatch`] - the target of an accessor is not an instance of the declaring type
/// - [`Error::ArgumentCount`] - wrong number of arguments
/// - [`Error::IndexOutOfRange`] - array element access outside the array bounds
/// - [`Error::Body`] - a native member body reported a failure
///
/// ## Emission and Registry Errors
/// - [`Error::Malformed`] - the descriptor handed to the emitter is inconsistent
/// - [`Error::TypeInsert`] - a type with the same full name is already registered
/// - [`Error::TypeMissing`] - a weak type reference outlived its registry
/// - [`Error::RecursionLimit`] - a value graph nested deeper than allowed
///
/// # Examples
///
/// ```rust
/// use dotreflect::{Error, Reflector};
///
/// let reflector = Reflector::new();
/// let person = reflector
///     .registry()
///     .class("Sample", "Person")
///     .field("Age", reflector.registry().int32())
///     .build()?;
///
/// match reflector.getter(&person, "Height") {
///     Ok(_) => println!("found"),
///     Err(Error::MemberNotFound { type_name, name }) => {
///         println!("{type_name} has no member {name}");
///     }
///     Err(e) => println!("other error: {e}"),
/// }
/// # Ok::<(), dotreflect::Error>(())
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The descriptor handed to the emitter is inconsistent.
    ///
    /// Raised at emission time when, for example, a member does not belong to the declaring
    /// type of the descriptor, or a setter is requested for a literal field. The error
    /// includes the source location where the malformation was detected.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// No field with the given name exists on the type or its bases.
    #[error("Field '{name}' not found on type {type_name}")]
    FieldNotFound {
        /// Full name of the type that was searched
        type_name: String,
        /// The queried name
        name: String,
    },

    /// No property with the given name exists on the type or its bases.
    #[error("Property '{name}' not found on type {type_name}")]
    PropertyNotFound {
        /// Full name of the type that was searched
        type_name: String,
        /// The queried name
        name: String,
    },

    /// Neither a field nor a property with the given name exists.
    #[error("Member '{name}' not found on type {type_name}")]
    MemberNotFound {
        /// Full name of the type that was searched
        type_name: String,
        /// The queried name
        name: String,
    },

    /// No method with the given name and signature exists.
    #[error("Method '{name}' not found on type {type_name}")]
    MethodNotFound {
        /// Full name of the type that was searched
        type_name: String,
        /// The queried name, including the signature when one was supplied
        name: String,
    },

    /// No constructor with the given signature exists, or the type cannot be constructed at
    /// all (abstract types, interfaces).
    #[error("Constructor {signature} not found on type {type_name}")]
    ConstructorNotFound {
        /// Full name of the type that was searched
        type_name: String,
        /// The queried parameter list
        signature: String,
    },

    /// The registry holds no type with this full name.
    #[error("Type {0} not found in TypeRegistry")]
    TypeNotFound(String),

    /// More than one member satisfied a lookup that must be unique.
    ///
    /// This is a caller configuration problem; adding an exclusion filter such as
    /// `EXCLUDE_HIDDEN_MEMBERS` or explicit parameter types resolves it.
    #[error("Ambiguous match for '{name}' on type {type_name}")]
    AmbiguousMatch {
        /// Full name of the type that was searched
        type_name: String,
        /// The queried name
        name: String,
    },

    /// An instance accessor was invoked with a `Null` target.
    #[error("Instance member '{0}' requires a target")]
    NullTarget(String),

    /// A value could not be narrowed to the expected type.
    #[error("Invalid argument - expected {expected}, got {actual}")]
    InvalidArgument {
        /// The type the accessor expected
        expected: String,
        /// Description of the value that was supplied
        actual: String,
    },

    /// The target handed to an accessor is not an instance of the type the accessor was
    /// emitted for.
    #[error("Type mismatch - expected {expected}, got {actual}")]
    TypeMismatch {
        /// Full name of the type the accessor expects
        expected: String,
        /// Full name of the runtime type of the target
        actual: String,
    },

    /// The number of supplied arguments does not match the accessor.
    #[error("Expected {expected} arguments, got {actual}")]
    ArgumentCount {
        /// Number of arguments the accessor takes
        expected: usize,
        /// Number of arguments that were supplied
        actual: usize,
    },

    /// Array element access outside the array bounds.
    #[error("Index {index} is out of range for array of length {length}")]
    IndexOutOfRange {
        /// The requested index
        index: usize,
        /// The length of the array
        length: usize,
    },

    /// A native member body reported a failure.
    #[error("{0}")]
    Body(String),

    /// Failed to insert new type into `TypeRegistry`.
    ///
    /// The associated string is the full name that is already registered.
    #[error("Failed to insert new type into TypeRegistry - {0}")]
    TypeInsert(String),

    /// A weak type reference was upgraded after its registry was dropped.
    #[error("Referenced type is no longer alive")]
    TypeMissing,

    /// Recursion limit reached.
    ///
    /// The associated value shows the limit that was reached.
    #[error("Reach the maximum recursion level allowed - {0}")]
    RecursionLimit(usize),
}

impl Error {
    /// Returns `true` for the lookup failures that the `try_*` convenience operations turn
    /// into `None` or `false`.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::FieldNotFound { .. }
                | Error::PropertyNotFound { .. }
                | Error::MemberNotFound { .. }
                | Error::MethodNotFound { .. }
                | Error::ConstructorNotFound { .. }
                | Error::TypeNotFound(_)
        )
    }

    /// Shorthand for [`Error::TypeMismatch`].
    pub(crate) fn type_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Error::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Shorthand for [`Error::InvalidArgument`].
    pub(crate) fn invalid_argument(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Error::InvalidArgument {
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}
