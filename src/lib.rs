// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(clippy::too_many_arguments)]

//! # dotreflect
//!
//! Fast, cached member access for a registry based managed object model.
//!
//! Plain reflection resolves a member by name and walks the type hierarchy on every call.
//! `dotreflect` resolves a member once, compiles the access into a directly callable
//! accessor and caches it under a descriptor of what was resolved. Every later request for the
//! same member returns the same accessor, and calling it performs no lookup at all.
//!
//! ## Features
//!
//! - **Typed object model** - classes, structs, enums, interfaces, arrays and generic methods
//!   registered in a [`metadata::typesystem::TypeRegistry`]
//! - **Member locator** - name based lookup honoring static/instance, visibility, inheritance,
//!   hiding and overload resolution through [`metadata::flags::BindingFlags`]
//! - **Accessor emitter** - getters, setters, constructors, methods, indexers, array elements,
//!   batch setters, mappers and cloners as compiled closures
//! - **Concurrent cache** - one accessor per descriptor, emitted at most once, safe to warm up
//!   from many threads
//! - **Convenience layer** - one-shot extension traits, deep cloning and a sequential data
//!   reader
//!
//! ## Quick Start
//!
//! ```rust
//! use dotreflect::prelude::*;
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
//! // Resolve and compile once...
//! let create = reflector.default_constructor(&person)?;
//! let set_name = reflector.setter(&person, "Name")?;
//! let get_name = reflector.getter(&person, "Name")?;
//!
//! // ...call many times
//! let instance = create.invoke(&[])?;
//! set_name.set(&instance, "John Doe")?;
//! assert_eq!(get_name.get(&instance)?, Value::from("John Doe"));
//!
//! // Or resolve through the cache on every call
//! instance.set_member(&reflector, "Age", 35)?;
//! assert_eq!(instance.get_member(&reflector, "Age")?, Value::I32(35));
//! # Ok::<(), dotreflect::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`metadata`] - the object model: types, members, values and binding flags
//! - [`lookup`] - the member locator
//! - [`emit`] - descriptors, the accessor emitter and the accessor handles
//! - [`cache`] - the partitioned accessor cache
//! - [`Reflector`] - the facade tying locator, emitter and cache together
//! - [`extensions`] - one-shot operations on values and types, deep cloning
//! - [`datareader`] - forward only column reads over instance sequences
//!
//! ### Structs and value holders
//!
//! Structs are copied on every pass, so a setter handed a naked struct could only modify a
//! temporary. Wrap struct instances in a [`metadata::value::ValueHolder`] to mutate them in
//! place; every accessor reads through holders transparently.
//!
//! ## Logging
//!
//! `dotreflect` reports through the [`log`] facade and installs no logger: `debug` when an
//! accessor is emitted, `trace` on cache hits, `warn` when a batch setter or mapper skips a
//! member.
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, Error>`](Result). Failed lookups can be told apart with
//! [`Error::is_not_found`]:
//!
//! ```rust
//! use dotreflect::{Error, Reflector};
//!
//! let reflector = Reflector::new();
//! let registry = reflector.registry();
//! let person = registry.class("Sample", "Person").build()?;
//!
//! match reflector.getter(&person, "Height") {
//!     Ok(_) => println!("found"),
//!     Err(Error::AmbiguousMatch { name, .. }) => println!("{name} is ambiguous"),
//!     Err(error) if error.is_not_found() => println!("no such member"),
//!     Err(error) => println!("Error: {error}"),
//! }
//! # Ok::<(), dotreflect::Error>(())
//! ```

#[macro_use]
pub(crate) mod macros;

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use dotreflect::prelude::*;
///
/// let reflector = Reflector::new();
/// let point = reflector.registry().structure("Sample", "Point").build()?;
/// assert!(point.create_instance(&reflector, &[])?.as_struct().is_some());
/// # Ok::<(), dotreflect::Error>(())
/// ```
pub mod prelude;

/// The object model: types, members, values and binding filters
pub mod metadata;

/// Member locator resolving names to fields, properties, methods and constructors
pub mod lookup;

pub mod emit;

pub mod cache;

pub mod config;

mod reflect;

pub mod extensions;

pub mod datareader;

/// `dotreflect` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `dotreflect` Error type
///
/// The main error type for all operations in this crate, covering failed lookups, unusable
/// arguments at call time and inconsistent descriptors at emission time.
pub use error::Error;

/// Configuration of the name based [`Reflector`] operations
pub use config::ReflectorConfig;

/// Entry point for creating cached accessors
pub use reflect::Reflector;
