//! Defaults used by the name-only operations of [`crate::Reflector`].
//!
//! Every facade operation has a `*_with` form taking explicit [`BindingFlags`]; the plain
//! form uses the flags of the reflector's [`ReflectorConfig`].

use crate::metadata::flags::BindingFlags;

/// Configuration of a [`crate::Reflector`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReflectorConfig {
    /// Filter for member lookups by name (getters, setters, methods, indexers, batch
    /// setters)
    pub member_flags: BindingFlags,

    /// Filter for static member lookups through a type
    pub static_flags: BindingFlags,

    /// Filter for constructor lookups
    pub constructor_flags: BindingFlags,

    /// Filter selecting the members a mapper copies
    pub map_flags: BindingFlags,

    /// Let `default_constructor` allocate classes without a parameterless constructor
    /// without running any constructor body
    pub allow_uninitialized: bool,
}

impl Default for ReflectorConfig {
    fn default() -> Self {
        Self {
            member_flags: BindingFlags::STATIC_INSTANCE_ANY_VISIBILITY,
            static_flags: BindingFlags::STATIC_ANY_VISIBILITY,
            constructor_flags: BindingFlags::INSTANCE_ANY_VISIBILITY,
            map_flags: BindingFlags::INSTANCE_PUBLIC,
            allow_uninitialized: true,
        }
    }
}

impl ReflectorConfig {
    /// Only public members are visible to name-only lookups
    #[must_use]
    pub fn public_only() -> Self {
        Self {
            member_flags: BindingFlags::INSTANCE_PUBLIC | BindingFlags::STATIC,
            static_flags: BindingFlags::STATIC_PUBLIC,
            constructor_flags: BindingFlags::INSTANCE_PUBLIC,
            map_flags: BindingFlags::INSTANCE_PUBLIC,
            allow_uninitialized: true,
        }
    }

    /// Overloads bind only on exact parameter types, hidden base members are never
    /// selected, and classes are only created through a declared constructor
    #[must_use]
    pub fn strict() -> Self {
        let strict = BindingFlags::EXACT_BINDING | BindingFlags::EXCLUDE_HIDDEN_MEMBERS;
        Self {
            member_flags: BindingFlags::STATIC_INSTANCE_ANY_VISIBILITY | strict,
            static_flags: BindingFlags::STATIC_ANY_VISIBILITY | strict,
            constructor_flags: BindingFlags::INSTANCE_ANY_VISIBILITY | BindingFlags::EXACT_BINDING,
            map_flags: BindingFlags::INSTANCE_PUBLIC | BindingFlags::EXCLUDE_HIDDEN_MEMBERS,
            allow_uninitialized: false,
        }
    }
}
