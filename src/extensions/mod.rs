//! Convenience operations on values and types.
//!
//! [`ObjectExt`] and [`TypeExt`] resolve a member by name and invoke its cached accessor in a
//! single call. They trade the reuse of an accessor handle for brevity; hot loops should fetch
//! the accessor from the [`crate::Reflector`] once and call it directly.
//!
//! The `try_*` variants turn lookup failures ([`crate::Error::is_not_found`]) into `None` or
//! `false` and still report every other error.
//!
//! # Examples
//!
//! ```rust
//! use dotreflect::{extensions::{ObjectExt, TypeExt}, metadata::value::Value, Reflector};
//!
//! let reflector = Reflector::new();
//! let registry = reflector.registry();
//! let person = registry
//!     .class("Sample", "Person")
//!     .field("Age", registry.int32())
//!     .auto_property("Name", registry.string())
//!     .default_constructor()
//!     .build()?;
//!
//! let instance = person.create_instance(&reflector, &[])?;
//! instance.set_member(&reflector, "Name", "John Doe")?;
//! assert_eq!(instance.get_member(&reflector, "Name")?, Value::from("John Doe"));
//! assert_eq!(instance.try_get_member(&reflector, "Height")?, None);
//! # Ok::<(), dotreflect::Error>(())
//! ```

mod clone;
mod object;
mod types;

pub use clone::deep_clone;
pub use object::ObjectExt;
pub use types::TypeExt;

use crate::Result;

/// Maps lookup failures to `None`
fn not_found_as_none<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(error) if error.is_not_found() => Ok(None),
        Err(error) => Err(error),
    }
}
