//! The name filter and exclusion pipeline shared by all member kinds.

use crate::metadata::{
    flags::{BindingFlags, MemberTypes},
    members::{FieldRc, MemberRef, MethodRc, PropertyRc},
    typesystem::{RuntimeType, RuntimeTypeRc},
};

/// A member kind the locator can search for.
///
/// The locator runs one algorithm for every kind; implementors only describe how to list
/// the declared members of a type and how two members of the same name relate across the
/// hierarchy.
pub trait LookupMember: Clone {
    /// The members of this kind declared directly on `ty`, restricted to `kinds` where the
    /// implementor covers more than one kind
    fn declared_on(ty: &RuntimeType, kinds: MemberTypes) -> Vec<Self>;

    /// Name used for matching
    fn member_name(&self) -> &str;

    /// Returns true for static members
    fn is_static(&self) -> bool;

    /// Returns true for public members
    fn is_public(&self) -> bool;

    /// Returns true for compiler emitted storage such as auto-property backing fields
    fn is_compiler_generated(&self) -> bool {
        false
    }

    /// Returns true if `self`, declared on a more derived type, overrides `base`
    fn overrides(&self, _base: &Self) -> bool {
        false
    }

    /// Returns true if `self`, declared on a more derived type, hides `base`
    fn hides(&self, base: &Self) -> bool {
        self.member_name() == base.member_name()
    }
}

impl LookupMember for FieldRc {
    fn declared_on(ty: &RuntimeType, _kinds: MemberTypes) -> Vec<Self> {
        ty.fields.iter().map(|(_, field)| field.clone()).collect()
    }

    fn member_name(&self) -> &str {
        &self.name
    }

    fn is_static(&self) -> bool {
        self.as_ref().is_static()
    }

    fn is_public(&self) -> bool {
        self.as_ref().is_public()
    }

    fn is_compiler_generated(&self) -> bool {
        self.as_ref().is_compiler_generated()
    }
}

impl LookupMember for PropertyRc {
    fn declared_on(ty: &RuntimeType, _kinds: MemberTypes) -> Vec<Self> {
        ty.properties.iter().map(|(_, property)| property.clone()).collect()
    }

    fn member_name(&self) -> &str {
        &self.name
    }

    fn is_static(&self) -> bool {
        self.as_ref().is_static()
    }

    fn is_public(&self) -> bool {
        self.as_ref().is_public()
    }

    fn overrides(&self, base: &Self) -> bool {
        self.is_virtual() && !self.is_new_slot() && base.is_virtual() && self.name == base.name
    }
}

impl LookupMember for MethodRc {
    fn declared_on(ty: &RuntimeType, kinds: MemberTypes) -> Vec<Self> {
        let mut declared = Vec::new();
        if kinds.contains(MemberTypes::METHOD) {
            declared.extend(ty.methods.iter().map(|(_, method)| method.clone()));
        }
        if kinds.contains(MemberTypes::CONSTRUCTOR) {
            declared.extend(ty.constructors.iter().map(|(_, ctor)| ctor.clone()));
        }
        declared
    }

    fn member_name(&self) -> &str {
        &self.name
    }

    fn is_static(&self) -> bool {
        self.as_ref().is_static()
    }

    fn is_public(&self) -> bool {
        self.as_ref().is_public()
    }

    fn overrides(&self, base: &Self) -> bool {
        self.as_ref().overrides(base)
    }

    fn hides(&self, base: &Self) -> bool {
        self.name == base.name && self.same_signature(base)
    }
}

impl LookupMember for MemberRef {
    fn declared_on(ty: &RuntimeType, kinds: MemberTypes) -> Vec<Self> {
        let mut declared: Vec<MemberRef> = Vec::new();
        if kinds.contains(MemberTypes::FIELD) {
            declared.extend(FieldRc::declared_on(ty, kinds).into_iter().map(MemberRef::Field));
        }
        if kinds.contains(MemberTypes::PROPERTY) {
            declared.extend(
                PropertyRc::declared_on(ty, kinds)
                    .into_iter()
                    .map(MemberRef::Property),
            );
        }
        if kinds.contains(MemberTypes::METHOD) {
            declared.extend(
                MethodRc::declared_on(ty, MemberTypes::METHOD)
                    .into_iter()
                    .map(MemberRef::Method),
            );
        }
        if kinds.contains(MemberTypes::CONSTRUCTOR) {
            declared.extend(
                MethodRc::declared_on(ty, MemberTypes::CONSTRUCTOR)
                    .into_iter()
                    .map(MemberRef::Constructor),
            );
        }
        declared
    }

    fn member_name(&self) -> &str {
        self.name()
    }

    fn is_static(&self) -> bool {
        MemberRef::is_static(self)
    }

    fn is_public(&self) -> bool {
        MemberRef::is_public(self)
    }

    fn is_compiler_generated(&self) -> bool {
        match self {
            MemberRef::Field(field) => field.is_compiler_generated(),
            _ => false,
        }
    }

    fn overrides(&self, base: &Self) -> bool {
        match (self, base) {
            (MemberRef::Property(ours), MemberRef::Property(theirs)) => ours.overrides(theirs),
            (MemberRef::Method(ours), MemberRef::Method(theirs)) => {
                LookupMember::overrides(ours, theirs)
            }
            _ => false,
        }
    }

    fn hides(&self, base: &Self) -> bool {
        match (self, base) {
            (MemberRef::Method(ours), MemberRef::Method(theirs)) => ours.hides(theirs),
            _ => self.name() == base.name(),
        }
    }
}

/// Returns true for names qualified with an interface name, e.g. `Ns.IFace.Member`
#[must_use]
pub fn is_explicit_implementation(name: &str) -> bool {
    !name.starts_with('.') && name.contains('.')
}

/// Strips the interface qualifier of an explicitly implemented member name
#[must_use]
pub fn trim_explicit_implementation(name: &str) -> &str {
    if name.starts_with('.') {
        return name;
    }
    match name.rfind('.') {
        Some(position) => &name[position + 1..],
        None => name,
    }
}

/// Applies the name part of a binding filter
#[must_use]
pub fn name_matches(candidate: &str, name: &str, flags: BindingFlags) -> bool {
    let candidate = if flags.contains(BindingFlags::TRIM_EXPLICITLY_IMPLEMENTED) {
        trim_explicit_implementation(candidate)
    } else {
        candidate
    };

    let ignore_case = flags.contains(BindingFlags::IGNORE_CASE);
    if flags.contains(BindingFlags::PARTIAL_NAME_MATCH) {
        if ignore_case {
            candidate.to_lowercase().contains(&name.to_lowercase())
        } else {
            candidate.contains(name)
        }
    } else if ignore_case {
        candidate.to_lowercase() == name.to_lowercase()
    } else {
        candidate == name
    }
}

/// Candidates of one declared layer that pass storage, visibility and name rules
fn layer<T: LookupMember>(
    ty: &RuntimeType,
    name: Option<&str>,
    kinds: MemberTypes,
    flags: BindingFlags,
) -> Vec<T> {
    T::declared_on(ty, kinds)
        .into_iter()
        .filter(|member| flags.admits(member.is_static(), member.is_public()))
        .filter(|member| match name {
            Some(name) => name_matches(member.member_name(), name, flags),
            None => true,
        })
        .collect()
}

/// Walks the hierarchy one declared layer at a time, most derived first. Every candidate is
/// tagged with its depth (0 for `ty` itself).
pub(crate) fn layers<T: LookupMember>(
    ty: &RuntimeTypeRc,
    name: Option<&str>,
    kinds: MemberTypes,
    flags: BindingFlags,
) -> Vec<(usize, T)> {
    let mut found = Vec::new();
    let mut current = Some(ty.clone());
    let mut depth = 0;
    while let Some(level) = current {
        found.extend(
            layer::<T>(&level, name, kinds, flags)
                .into_iter()
                .map(|member| (depth, member)),
        );
        if flags.contains(BindingFlags::DECLARED_ONLY) {
            break;
        }
        current = level.base();
        depth += 1;
    }
    found
}

/// Runs the exclusion filters of the binding flags over the tagged candidates of
/// [`layers`], preserving the hierarchy order
pub(crate) fn exclude<T: LookupMember>(candidates: Vec<(usize, T)>, flags: BindingFlags) -> Vec<(usize, T)> {
    let mut survivors = candidates;

    if flags.contains(BindingFlags::EXCLUDE_BACKING_MEMBERS) {
        let snapshot = survivors.clone();
        survivors.retain(|(depth, member)| {
            !member.is_compiler_generated()
                && !snapshot
                    .iter()
                    .any(|(other_depth, other)| other_depth < depth && other.overrides(member))
        });
    }

    if flags.contains(BindingFlags::EXCLUDE_EXPLICITLY_IMPLEMENTED) {
        survivors.retain(|(_, member)| !is_explicit_implementation(member.member_name()));
    }

    if flags.contains(BindingFlags::EXCLUDE_HIDDEN_MEMBERS) {
        let snapshot = survivors.clone();
        survivors.retain(|(depth, member)| {
            !snapshot
                .iter()
                .any(|(other_depth, other)| other_depth < depth && other.hides(member))
        });
    }

    survivors
}

/// Full scan: layers then the exclusion pipeline
pub(crate) fn scan<T: LookupMember>(
    ty: &RuntimeTypeRc,
    name: Option<&str>,
    kinds: MemberTypes,
    flags: BindingFlags,
) -> Vec<(usize, T)> {
    exclude(layers(ty, name, kinds, flags), flags)
}
