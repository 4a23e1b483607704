//! Binding filters and member kind masks used by every lookup.
//!
//! [`BindingFlags`] is the single configuration value recognized throughout the crate. It
//! combines the classic static/instance and visibility switches with the extended matching
//! and exclusion rules of the member locator.
//!
//! # Examples
//!
//! ```rust
//! use dotreflect::metadata::flags::BindingFlags;
//!
//! let flags = BindingFlags::INSTANCE_ANY_VISIBILITY | BindingFlags::IGNORE_CASE;
//! assert!(flags.includes_instance());
//! assert!(!flags.includes_static());
//! assert!(flags.requires_full_scan() == false);
//!
//! let flags = flags | BindingFlags::EXCLUDE_HIDDEN_MEMBERS;
//! assert!(flags.requires_full_scan());
//! ```

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Filter controlling static/instance, visibility, inheritance and name matching
    pub struct BindingFlags: u32 {
        /// Compare names case-insensitively
        const IGNORE_CASE = 0x0000_0001;
        /// Only consider members declared on the queried type, never its bases
        const DECLARED_ONLY = 0x0000_0002;
        /// Include instance members
        const INSTANCE = 0x0000_0004;
        /// Include static members
        const STATIC = 0x0000_0008;
        /// Include public members
        const PUBLIC = 0x0000_0010;
        /// Include non-public (private, protected, internal) members
        const NON_PUBLIC = 0x0000_0020;
        /// Parameter types must match exactly instead of by assignment compatibility
        const EXACT_BINDING = 0x0001_0000;
        /// Match names by substring instead of by equality
        const PARTIAL_NAME_MATCH = 0x0100_0000;
        /// Exclude compiler-generated backing fields and base members overridden by a
        /// derived declaration
        const EXCLUDE_BACKING_MEMBERS = 0x0200_0000;
        /// Exclude members that explicitly implement an interface member (`Ns.IFace.Name`)
        const EXCLUDE_EXPLICITLY_IMPLEMENTED = 0x0400_0000;
        /// Exclude base members hidden by a derived declaration of the same name
        const EXCLUDE_HIDDEN_MEMBERS = 0x0800_0000;
        /// Match explicitly implemented members by their short name
        const TRIM_EXPLICITLY_IMPLEMENTED = 0x1000_0000;
        /// Let a by-ref parameter match a query for its element type
        const IGNORE_PARAMETER_MODIFIERS = 0x2000_0000;

        /// Public and non-public
        const ANY_VISIBILITY = Self::PUBLIC.bits() | Self::NON_PUBLIC.bits();
        /// Public instance members
        const INSTANCE_PUBLIC = Self::INSTANCE.bits() | Self::PUBLIC.bits();
        /// Public and non-public instance members
        const INSTANCE_ANY_VISIBILITY = Self::INSTANCE.bits() | Self::ANY_VISIBILITY.bits();
        /// Public static members
        const STATIC_PUBLIC = Self::STATIC.bits() | Self::PUBLIC.bits();
        /// Public and non-public static members
        const STATIC_ANY_VISIBILITY = Self::STATIC.bits() | Self::ANY_VISIBILITY.bits();
        /// Every member regardless of storage and visibility
        const STATIC_INSTANCE_ANY_VISIBILITY =
            Self::STATIC.bits() | Self::INSTANCE.bits() | Self::ANY_VISIBILITY.bits();
        /// Public and non-public instance members declared on the queried type only
        const INSTANCE_ANY_DECLARED_ONLY =
            Self::INSTANCE_ANY_VISIBILITY.bits() | Self::DECLARED_ONLY.bits();
        /// Instance members excluding the members a well-behaved caller never wants
        const INSTANCE_CRITERIA = Self::INSTANCE_ANY_VISIBILITY.bits()
            | Self::EXCLUDE_BACKING_MEMBERS.bits()
            | Self::EXCLUDE_EXPLICITLY_IMPLEMENTED.bits();
    }
}

impl Default for BindingFlags {
    fn default() -> Self {
        BindingFlags::INSTANCE_ANY_VISIBILITY
    }
}

impl BindingFlags {
    /// Whether instance members are included
    #[must_use]
    pub fn includes_instance(self) -> bool {
        self.contains(BindingFlags::INSTANCE)
    }

    /// Whether static members are included
    #[must_use]
    pub fn includes_static(self) -> bool {
        self.contains(BindingFlags::STATIC)
    }

    /// Whether public members are included
    #[must_use]
    pub fn includes_public(self) -> bool {
        self.contains(BindingFlags::PUBLIC)
    }

    /// Whether non-public members are included
    #[must_use]
    pub fn includes_non_public(self) -> bool {
        self.contains(BindingFlags::NON_PUBLIC)
    }

    /// Whether a lookup must enumerate all candidates and run the filter pipeline instead of
    /// the direct single-name walk
    #[must_use]
    pub fn requires_full_scan(self) -> bool {
        self.intersects(
            BindingFlags::PARTIAL_NAME_MATCH
                | BindingFlags::EXCLUDE_BACKING_MEMBERS
                | BindingFlags::EXCLUDE_EXPLICITLY_IMPLEMENTED
                | BindingFlags::EXCLUDE_HIDDEN_MEMBERS
                | BindingFlags::TRIM_EXPLICITLY_IMPLEMENTED,
        )
    }

    /// Checks a member's storage and visibility against this filter
    #[must_use]
    pub fn admits(self, is_static: bool, is_public: bool) -> bool {
        let storage = if is_static {
            self.includes_static()
        } else {
            self.includes_instance()
        };
        let visibility = if is_public {
            self.includes_public()
        } else {
            self.includes_non_public()
        };
        storage && visibility
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Mask selecting which kinds of members a lookup considers
    pub struct MemberTypes: u32 {
        /// Fields
        const FIELD = 0x01;
        /// Properties (including indexers)
        const PROPERTY = 0x02;
        /// Methods
        const METHOD = 0x04;
        /// Constructors
        const CONSTRUCTOR = 0x08;
        /// Fields and properties
        const DATA = Self::FIELD.bits() | Self::PROPERTY.bits();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert!(BindingFlags::INSTANCE_ANY_VISIBILITY.includes_instance());
        assert!(BindingFlags::INSTANCE_ANY_VISIBILITY.includes_public());
        assert!(BindingFlags::INSTANCE_ANY_VISIBILITY.includes_non_public());
        assert!(!BindingFlags::INSTANCE_ANY_VISIBILITY.includes_static());
        assert!(BindingFlags::STATIC_INSTANCE_ANY_VISIBILITY.includes_static());
        assert_eq!(BindingFlags::default(), BindingFlags::INSTANCE_ANY_VISIBILITY);
    }

    #[test]
    fn test_admits() {
        let flags = BindingFlags::INSTANCE_PUBLIC;
        assert!(flags.admits(false, true));
        assert!(!flags.admits(false, false));
        assert!(!flags.admits(true, true));

        let flags = BindingFlags::STATIC_ANY_VISIBILITY;
        assert!(flags.admits(true, false));
        assert!(!flags.admits(false, true));
    }

    #[test]
    fn test_full_scan() {
        assert!(!BindingFlags::INSTANCE_ANY_VISIBILITY.requires_full_scan());
        assert!(!(BindingFlags::INSTANCE_ANY_VISIBILITY | BindingFlags::IGNORE_CASE)
            .requires_full_scan());
        assert!(BindingFlags::INSTANCE_CRITERIA.requires_full_scan());
        assert!((BindingFlags::PUBLIC | BindingFlags::PARTIAL_NAME_MATCH).requires_full_scan());
    }
}
