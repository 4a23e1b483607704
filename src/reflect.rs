//! The public facade: locate, emit and cache in one call.
//!
//! A [`Reflector`] owns a [`TypeRegistry`], an [`AccessorCache`] and a [`ReflectorConfig`].
//! Type directed operations resolve a member by name through [`crate::lookup`], member
//! directed operations (`*_for`) take an already resolved member and skip the locator. Both
//! return the cached accessor for the resulting descriptor, emitting it on first use.
//!
//! # Examples
//!
//! ```rust
//! use dotreflect::{metadata::value::Value, Reflector};
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
//! let instance = reflector.default_constructor(&person)?.invoke(&[])?;
//! reflector.setter(&person, "Name")?.set(&instance, "John Doe")?;
//! reflector.setter(&person, "Age")?.set(&instance, 35)?;
//!
//! assert_eq!(reflector.getter(&person, "Name")?.get(&instance)?, Value::from("John Doe"));
//! assert_eq!(reflector.getter(&person, "Age")?.get(&instance)?, Value::I32(35));
//! # Ok::<(), dotreflect::Error>(())
//! ```

use std::{
    collections::HashSet,
    sync::{Arc, OnceLock},
};

use log::{debug, warn};
use rayon::prelude::*;

use crate::{
    cache::AccessorCache,
    config::ReflectorConfig,
    emit::{
        self, ArrayDescriptor, ArrayElementGetter, ArrayElementSetter, BatchDescriptor, CallDescriptor,
        ConstructorInvoker, MapDescriptor, MemberDescriptor, MemberGetter, MemberSetter, MethodInvoker, MultiSetter,
        ObjectMapper, ShallowCloner,
    },
    lookup,
    metadata::{
        flags::{BindingFlags, MemberTypes},
        members::{FieldRc, MemberRef, MethodRc, PropertyRc},
        typesystem::{RuntimeTypeRc, TypeFlavor, TypeRegistry},
        value::Value,
    },
    Error, Result,
};

static GLOBAL: OnceLock<Reflector> = OnceLock::new();

/// Entry point for creating cached accessors.
///
/// Cloning a `Reflector` is cheap; clones share the registry and the cache.
#[derive(Clone)]
pub struct Reflector {
    registry: Arc<TypeRegistry>,
    cache: Arc<AccessorCache>,
    config: ReflectorConfig,
}

impl Reflector {
    /// Create a reflector with a fresh registry and the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ReflectorConfig::default())
    }

    /// Create a reflector with a fresh registry
    #[must_use]
    pub fn with_config(config: ReflectorConfig) -> Self {
        Reflector {
            registry: Arc::new(TypeRegistry::new()),
            cache: Arc::new(AccessorCache::new()),
            config,
        }
    }

    /// Create a reflector over an existing registry, with its own cache
    #[must_use]
    pub fn with_registry(registry: Arc<TypeRegistry>, config: ReflectorConfig) -> Self {
        Reflector {
            registry,
            cache: Arc::new(AccessorCache::new()),
            config,
        }
    }

    /// The process-wide reflector, created with the default configuration on first use
    pub fn global() -> &'static Reflector {
        GLOBAL.get_or_init(Reflector::new)
    }

    /// The type registry
    #[must_use]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// The shared handle of the type registry
    #[must_use]
    pub fn shared_registry(&self) -> Arc<TypeRegistry> {
        self.registry.clone()
    }

    /// The accessor cache
    #[must_use]
    pub fn cache(&self) -> &AccessorCache {
        &self.cache
    }

    /// The configuration
    #[must_use]
    pub fn config(&self) -> &ReflectorConfig {
        &self.config
    }

    /// The runtime type of `value`, including primitives and strings
    ///
    /// # Errors
    /// Returns [`Error::NullTarget`] for `Null`.
    pub fn type_of(&self, value: &Value) -> Result<RuntimeTypeRc> {
        self.registry
            .type_of(value)
            .ok_or_else(|| Error::NullTarget("type_of".to_string()))
    }

    // Fields and properties

    /// Getter for the field or property `name` of `ty`
    ///
    /// # Errors
    /// Returns [`Error::MemberNotFound`] or [`Error::AmbiguousMatch`] from the lookup, or
    /// [`Error::Malformed`] for members that cannot be read.
    pub fn getter(&self, ty: &RuntimeTypeRc, name: &str) -> Result<MemberGetter> {
        self.getter_with(ty, name, self.config.member_flags)
    }

    /// Getter for the field or property `name` of `ty`, located with `flags`
    ///
    /// # Errors
    /// See [`Reflector::getter`].
    pub fn getter_with(&self, ty: &RuntimeTypeRc, name: &str, flags: BindingFlags) -> Result<MemberGetter> {
        let member = lookup::member(ty, name, MemberTypes::DATA, flags)?;
        self.getter_for(ty, &member)
    }

    /// Getter for the field `name` of `ty`
    ///
    /// # Errors
    /// Returns [`Error::FieldNotFound`] or [`Error::AmbiguousMatch`].
    pub fn field_getter(&self, ty: &RuntimeTypeRc, name: &str) -> Result<MemberGetter> {
        let field = lookup::field(ty, name, self.config.member_flags)?;
        self.field_getter_for(ty, &field)
    }

    /// Getter for the property `name` of `ty`
    ///
    /// # Errors
    /// Returns [`Error::PropertyNotFound`] or [`Error::AmbiguousMatch`], or
    /// [`Error::Malformed`] for write-only properties.
    pub fn property_getter(&self, ty: &RuntimeTypeRc, name: &str) -> Result<MemberGetter> {
        let property = lookup::property(ty, name, self.config.member_flags)?;
        self.property_getter_for(ty, &property)
    }

    /// Setter for the field or property `name` of `ty`
    ///
    /// # Errors
    /// Returns [`Error::MemberNotFound`] or [`Error::AmbiguousMatch`] from the lookup, or
    /// [`Error::Malformed`] for literal fields and read-only properties.
    pub fn setter(&self, ty: &RuntimeTypeRc, name: &str) -> Result<MemberSetter> {
        self.setter_with(ty, name, self.config.member_flags)
    }

    /// Setter for the field or property `name` of `ty`, located with `flags`
    ///
    /// # Errors
    /// See [`Reflector::setter`].
    pub fn setter_with(&self, ty: &RuntimeTypeRc, name: &str, flags: BindingFlags) -> Result<MemberSetter> {
        let member = lookup::member(ty, name, MemberTypes::DATA, flags)?;
        self.setter_for(ty, &member)
    }

    /// Setter for the field `name` of `ty`
    ///
    /// # Errors
    /// Returns [`Error::FieldNotFound`] or [`Error::AmbiguousMatch`], or
    /// [`Error::Malformed`] for literal fields.
    pub fn field_setter(&self, ty: &RuntimeTypeRc, name: &str) -> Result<MemberSetter> {
        let field = lookup::field(ty, name, self.config.member_flags)?;
        self.field_setter_for(ty, &field)
    }

    /// Setter for the property `name` of `ty`
    ///
    /// # Errors
    /// Returns [`Error::PropertyNotFound`] or [`Error::AmbiguousMatch`], or
    /// [`Error::Malformed`] for read-only properties.
    pub fn property_setter(&self, ty: &RuntimeTypeRc, name: &str) -> Result<MemberSetter> {
        let property = lookup::property(ty, name, self.config.member_flags)?;
        self.property_setter_for(ty, &property)
    }

    /// Getter for a resolved field or property accessed through `ty`
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] if the member is not a readable field or property of
    /// `ty` or one of its bases.
    pub fn getter_for(&self, ty: &RuntimeTypeRc, member: &MemberRef) -> Result<MemberGetter> {
        match member {
            MemberRef::Field(field) => self.field_getter_for(ty, field),
            MemberRef::Property(property) => self.property_getter_for(ty, property),
            other => Err(malformed_error!("{} is not a field or property", other.name())),
        }
    }

    /// Setter for a resolved field or property accessed through `ty`
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] if the member is not a writable field or property of
    /// `ty` or one of its bases.
    pub fn setter_for(&self, ty: &RuntimeTypeRc, member: &MemberRef) -> Result<MemberSetter> {
        match member {
            MemberRef::Field(field) => self.field_setter_for(ty, field),
            MemberRef::Property(property) => self.property_setter_for(ty, property),
            other => Err(malformed_error!("{} is not a field or property", other.name())),
        }
    }

    /// Getter for a resolved field
    ///
    /// # Errors
    /// See [`Reflector::getter_for`].
    pub fn field_getter_for(&self, ty: &RuntimeTypeRc, field: &FieldRc) -> Result<MemberGetter> {
        let descriptor = describe(ty, MemberRef::Field(field.clone()))?;
        self.cache.field_getters().get_or_create(&descriptor, emit::getter)
    }

    /// Setter for a resolved field
    ///
    /// # Errors
    /// See [`Reflector::setter_for`].
    pub fn field_setter_for(&self, ty: &RuntimeTypeRc, field: &FieldRc) -> Result<MemberSetter> {
        let descriptor = describe(ty, MemberRef::Field(field.clone()))?;
        self.cache.field_setters().get_or_create(&descriptor, emit::setter)
    }

    /// Getter for a resolved property
    ///
    /// # Errors
    /// See [`Reflector::getter_for`].
    pub fn property_getter_for(&self, ty: &RuntimeTypeRc, property: &PropertyRc) -> Result<MemberGetter> {
        let descriptor = describe(ty, MemberRef::Property(property.clone()))?;
        self.cache.property_getters().get_or_create(&descriptor, emit::getter)
    }

    /// Setter for a resolved property
    ///
    /// # Errors
    /// See [`Reflector::setter_for`].
    pub fn property_setter_for(&self, ty: &RuntimeTypeRc, property: &PropertyRc) -> Result<MemberSetter> {
        let descriptor = describe(ty, MemberRef::Property(property.clone()))?;
        self.cache.property_setters().get_or_create(&descriptor, emit::setter)
    }

    // Constructors and methods

    /// Invoker for the constructor of `ty` taking `param_types`
    ///
    /// # Errors
    /// Returns [`Error::ConstructorNotFound`] or [`Error::AmbiguousMatch`].
    pub fn constructor(&self, ty: &RuntimeTypeRc, param_types: &[RuntimeTypeRc]) -> Result<ConstructorInvoker> {
        self.constructor_with(ty, param_types, self.config.constructor_flags)
    }

    /// Invoker for the constructor of `ty` taking `param_types`, located with `flags`
    ///
    /// # Errors
    /// See [`Reflector::constructor`].
    pub fn constructor_with(
        &self,
        ty: &RuntimeTypeRc,
        param_types: &[RuntimeTypeRc],
        flags: BindingFlags,
    ) -> Result<ConstructorInvoker> {
        let ctor = lookup::constructor(ty, param_types, flags)?;
        self.constructor_for(ty, Some(&ctor))
    }

    /// Invoker for the constructor of `ty` whose parameters accept `args`
    ///
    /// # Errors
    /// See [`Reflector::constructor`].
    pub fn constructor_for_args(&self, ty: &RuntimeTypeRc, args: &[Value]) -> Result<ConstructorInvoker> {
        let ctor = lookup::constructor_for_args(ty, args, self.config.constructor_flags)?;
        self.constructor_for(ty, Some(&ctor))
    }

    /// Invoker creating `ty` without arguments.
    ///
    /// Uses the parameterless constructor when there is one. Otherwise value types yield
    /// their zero value, and classes are allocated without running a constructor if the
    /// configuration allows it; [`ConstructorInvoker::has_default_constructor`] then
    /// returns false.
    ///
    /// # Errors
    /// Returns [`Error::ConstructorNotFound`] if none of the above applies.
    pub fn default_constructor(&self, ty: &RuntimeTypeRc) -> Result<ConstructorInvoker> {
        match lookup::constructor(ty, &[], self.config.constructor_flags) {
            Ok(ctor) => self.constructor_for(ty, Some(&ctor)),
            Err(error) if error.is_not_found() => {
                let uninitialized =
                    self.config.allow_uninitialized && ty.flavor == TypeFlavor::Class && !ty.is_abstract();
                if ty.is_value_type() || uninitialized {
                    self.constructor_for(ty, None)
                } else {
                    Err(error)
                }
            }
            Err(error) => Err(error),
        }
    }

    /// Invoker for a resolved constructor of `ty`; `None` selects the zero value of value
    /// types or the uninitialized allocation of classes
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] if `ctor` is not a constructor of `ty`, or if `None`
    /// is passed for a class and uninitialized allocation is disabled.
    pub fn constructor_for(&self, ty: &RuntimeTypeRc, ctor: Option<&MethodRc>) -> Result<ConstructorInvoker> {
        let descriptor = CallDescriptor::constructor(ty, ctor);
        let allow_uninitialized = self.config.allow_uninitialized;
        self.cache
            .constructors()
            .get_or_create(&descriptor, |descriptor| emit::constructor(descriptor, allow_uninitialized))
    }

    /// Invoker for the method `name` of `ty` taking `param_types`
    ///
    /// # Errors
    /// Returns [`Error::MethodNotFound`] or [`Error::AmbiguousMatch`].
    pub fn method(&self, ty: &RuntimeTypeRc, name: &str, param_types: &[RuntimeTypeRc]) -> Result<MethodInvoker> {
        self.method_with(ty, name, param_types, self.config.member_flags)
    }

    /// Invoker for the method `name` of `ty` taking `param_types`, located with `flags`
    ///
    /// # Errors
    /// See [`Reflector::method`].
    pub fn method_with(
        &self,
        ty: &RuntimeTypeRc,
        name: &str,
        param_types: &[RuntimeTypeRc],
        flags: BindingFlags,
    ) -> Result<MethodInvoker> {
        let method = lookup::method(&self.registry, ty, name, &[], param_types, flags)?;
        self.method_for(ty, &method)
    }

    /// Invoker for the generic method `name` of `ty`, instantiated with `generic_args`
    ///
    /// # Errors
    /// See [`Reflector::method`].
    pub fn generic_method(
        &self,
        ty: &RuntimeTypeRc,
        name: &str,
        generic_args: &[RuntimeTypeRc],
        param_types: &[RuntimeTypeRc],
    ) -> Result<MethodInvoker> {
        self.generic_method_with(ty, name, generic_args, param_types, self.config.member_flags)
    }

    /// Invoker for the generic method `name` of `ty`, instantiated with `generic_args` and
    /// located with `flags`
    ///
    /// # Errors
    /// See [`Reflector::method`].
    pub fn generic_method_with(
        &self,
        ty: &RuntimeTypeRc,
        name: &str,
        generic_args: &[RuntimeTypeRc],
        param_types: &[RuntimeTypeRc],
        flags: BindingFlags,
    ) -> Result<MethodInvoker> {
        let method = lookup::method(&self.registry, ty, name, generic_args, param_types, flags)?;
        self.method_for(ty, &method)
    }

    /// Invoker for the method `name` of `ty` whose parameters accept `args`
    ///
    /// # Errors
    /// See [`Reflector::method`].
    pub fn method_for_args(&self, ty: &RuntimeTypeRc, name: &str, args: &[Value], flags: BindingFlags) -> Result<MethodInvoker> {
        let method = lookup::method_for_args(ty, name, args, flags)?;
        self.method_for(ty, &method)
    }

    /// Invoker for a resolved method called through `ty`
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] if the method is not declared on `ty` or one of its
    /// bases, is a constructor, or is an open generic definition.
    pub fn method_for(&self, ty: &RuntimeTypeRc, method: &MethodRc) -> Result<MethodInvoker> {
        check_declared(ty, &MemberRef::Method(method.clone()))?;
        let descriptor = CallDescriptor::method(ty, method);
        self.cache.methods().get_or_create(&descriptor, emit::method)
    }

    // Indexers and arrays

    /// Invoker reading the indexer of `ty` taking `index_types`; call it with the index
    /// values as arguments
    ///
    /// # Errors
    /// Returns [`Error::PropertyNotFound`] or [`Error::AmbiguousMatch`], or
    /// [`Error::Malformed`] for an indexer without getter.
    pub fn indexer_getter(&self, ty: &RuntimeTypeRc, index_types: &[RuntimeTypeRc]) -> Result<MethodInvoker> {
        let indexer = lookup::indexer(ty, index_types, self.config.member_flags)?;
        let getter = indexer
            .getter
            .as_ref()
            .ok_or_else(|| malformed_error!("Indexer of {} has no getter", ty.fullname()))?;
        let descriptor = CallDescriptor::method(ty, getter);
        self.cache.indexer_getters().get_or_create(&descriptor, emit::method)
    }

    /// Invoker writing the indexer of `ty` taking `index_types`; call it with the index
    /// values followed by the new value
    ///
    /// # Errors
    /// Returns [`Error::PropertyNotFound`] or [`Error::AmbiguousMatch`], or
    /// [`Error::Malformed`] for a read-only indexer.
    pub fn indexer_setter(&self, ty: &RuntimeTypeRc, index_types: &[RuntimeTypeRc]) -> Result<MethodInvoker> {
        let indexer = lookup::indexer(ty, index_types, self.config.member_flags)?;
        let setter = indexer
            .setter
            .as_ref()
            .ok_or_else(|| malformed_error!("Indexer of {} is read-only", ty.fullname()))?;
        let descriptor = CallDescriptor::method(ty, setter);
        self.cache.indexer_setters().get_or_create(&descriptor, emit::method)
    }

    /// Element getter for arrays of `array_type`
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] if `array_type` is not an array type.
    pub fn array_getter(&self, array_type: &RuntimeTypeRc) -> Result<ArrayElementGetter> {
        let descriptor = ArrayDescriptor {
            array_type: array_type.clone(),
        };
        self.cache.array_getters().get_or_create(&descriptor, emit::array_getter)
    }

    /// Element setter for arrays of `array_type`
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] if `array_type` is not an array type.
    pub fn array_setter(&self, array_type: &RuntimeTypeRc) -> Result<ArrayElementSetter> {
        let descriptor = ArrayDescriptor {
            array_type: array_type.clone(),
        };
        self.cache.array_setters().get_or_create(&descriptor, emit::array_setter)
    }

    // Batches, mappers and cloners

    /// Setter writing the members `names` of `ty` positionally
    ///
    /// # Errors
    /// Fails with the lookup error of the first name that cannot be resolved. Members that
    /// resolve but cannot be written are skipped, see [`MultiSetter::skipped`].
    pub fn multi_setter(&self, ty: &RuntimeTypeRc, names: &[&str]) -> Result<MultiSetter> {
        self.multi_setter_with(ty, names, self.config.member_flags)
    }

    /// Setter writing the members `names` of `ty` positionally, located with `flags`
    ///
    /// # Errors
    /// See [`Reflector::multi_setter`].
    pub fn multi_setter_with(&self, ty: &RuntimeTypeRc, names: &[&str], flags: BindingFlags) -> Result<MultiSetter> {
        let members = names
            .iter()
            .map(|name| lookup::member(ty, name, MemberTypes::DATA, flags))
            .collect::<Result<Vec<_>>>()?;
        self.multi_setter_for(ty, members)
    }

    /// Setter writing resolved members positionally
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] if a member is not a field or property of `ty` or one of
    /// its bases.
    pub fn multi_setter_for(&self, ty: &RuntimeTypeRc, members: Vec<MemberRef>) -> Result<MultiSetter> {
        for member in &members {
            check_declared(ty, member)?;
        }
        let descriptor = BatchDescriptor::new(ty, members);
        self.cache.multi_setters().get_or_create(&descriptor, emit::multi_setter)
    }

    /// Mapper copying members of `source` to the member of `target` with the same name and
    /// a compatible type.
    ///
    /// A non-empty `names` restricts the copied members to those matching one of the names;
    /// an empty list maps every member. Names without a counterpart on `target` are skipped.
    ///
    /// # Errors
    /// Returns [`Error::AmbiguousMatch`] if a target name is ambiguous.
    pub fn mapper(&self, source: &RuntimeTypeRc, target: &RuntimeTypeRc, names: &[&str]) -> Result<ObjectMapper> {
        self.mapper_with(source, target, names, self.config.map_flags)
    }

    /// Mapper pairing members by name, selected on both sides with `flags`. Name matching
    /// against `names` honors the case and partial-name flags.
    ///
    /// # Errors
    /// See [`Reflector::mapper`].
    pub fn mapper_with(
        &self,
        source: &RuntimeTypeRc,
        target: &RuntimeTypeRc,
        names: &[&str],
        flags: BindingFlags,
    ) -> Result<ObjectMapper> {
        let mut seen = HashSet::new();
        let mut pairs = Vec::new();
        for member in lookup::members(source, MemberTypes::DATA, flags) {
            if !names.is_empty() && !names.iter().any(|name| lookup::name_matches(member.name(), name, flags)) {
                continue;
            }
            if !member.can_read() || !seen.insert(member.name().to_string()) {
                continue;
            }

            let paired = match lookup::member(target, member.name(), MemberTypes::DATA, flags) {
                Ok(paired) => paired,
                Err(error) if error.is_not_found() => {
                    debug!("{} has no member {}, not mapped", target.fullname(), member.name());
                    continue;
                }
                Err(error) => return Err(error),
            };
            if !paired.can_write() || !compatible(&member, &paired) {
                warn!(
                    "Skipping {}: {}.{} cannot be stored in {}.{}",
                    member.name(),
                    source.fullname(),
                    member.name(),
                    target.fullname(),
                    paired.name()
                );
                continue;
            }
            pairs.push((member, paired));
        }

        self.mapper_for(source, target, pairs)
    }

    /// Mapper copying `source_names[i]` of `source` to `target_names[i]` of `target`
    ///
    /// # Errors
    /// Returns [`Error::ArgumentCount`] if the name lists differ in length, the lookup error
    /// of a name that cannot be resolved, or [`Error::Malformed`] for a pair whose types are
    /// incompatible.
    pub fn mapper_between(
        &self,
        source: &RuntimeTypeRc,
        target: &RuntimeTypeRc,
        source_names: &[&str],
        target_names: &[&str],
    ) -> Result<ObjectMapper> {
        if source_names.len() != target_names.len() {
            return Err(Error::ArgumentCount {
                expected: source_names.len(),
                actual: target_names.len(),
            });
        }

        let flags = self.config.map_flags;
        let mut pairs = Vec::with_capacity(source_names.len());
        for (source_name, target_name) in source_names.iter().zip(target_names) {
            let from = lookup::member(source, source_name, MemberTypes::DATA, flags)?;
            let to = lookup::member(target, target_name, MemberTypes::DATA, flags)?;
            if !compatible(&from, &to) {
                return Err(malformed_error!(
                    "{}.{} cannot be stored in {}.{}",
                    source.fullname(),
                    from.name(),
                    target.fullname(),
                    to.name()
                ));
            }
            pairs.push((from, to));
        }

        self.mapper_for(source, target, pairs)
    }

    fn mapper_for(
        &self,
        source: &RuntimeTypeRc,
        target: &RuntimeTypeRc,
        pairs: Vec<(MemberRef, MemberRef)>,
    ) -> Result<ObjectMapper> {
        let descriptor = MapDescriptor {
            source_type: source.clone(),
            target_type: target.clone(),
            pairs,
        };
        self.cache.mappers().get_or_create(&descriptor, emit::mapper)
    }

    /// Cloner copying every instance field of `ty`, including private and inherited ones
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] for types that are neither classes nor structs.
    pub fn shallow_cloner(&self, ty: &RuntimeTypeRc) -> Result<ShallowCloner> {
        let fields = lookup::fields(ty, BindingFlags::INSTANCE_ANY_VISIBILITY)
            .into_iter()
            .map(MemberRef::Field)
            .collect();
        let descriptor = BatchDescriptor::new(ty, fields);
        self.cache.cloners().get_or_create(&descriptor, emit::shallow_cloner)
    }

    /// Emits getters and setters for every field and property of `ty` ahead of use, in
    /// parallel. Returns the number of accessors now cached for `ty`.
    ///
    /// # Errors
    /// Returns the first emission error.
    pub fn prepare(&self, ty: &RuntimeTypeRc) -> Result<usize> {
        let members = lookup::members(ty, MemberTypes::DATA, self.config.member_flags);
        let prepared = members
            .par_iter()
            .map(|member| {
                let mut count = 0;
                if member.can_read() {
                    self.getter_for(ty, member)?;
                    count += 1;
                }
                if member.can_write() {
                    self.setter_for(ty, member)?;
                    count += 1;
                }
                Ok(count)
            })
            .collect::<Result<Vec<usize>>>()?;

        let total = prepared.iter().sum();
        debug!("Prepared {} accessors for {}", total, ty.fullname());
        Ok(total)
    }
}

impl Default for Reflector {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Reflector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reflector")
            .field("types", &self.registry.len())
            .field("accessors", &self.cache.len())
            .field("config", &self.config)
            .finish()
    }
}

/// Rejects members that are not reachable through `ty`
fn check_declared(ty: &RuntimeTypeRc, member: &MemberRef) -> Result<()> {
    let declaring = member.declaring_type_ref().get()?;
    if declaring.is_assignable_from(ty) {
        Ok(())
    } else {
        Err(malformed_error!(
            "{} is declared on {}, not on {} or its bases",
            member.name(),
            declaring.fullname(),
            ty.fullname()
        ))
    }
}

fn describe(ty: &RuntimeTypeRc, member: MemberRef) -> Result<MemberDescriptor> {
    check_declared(ty, &member)?;
    MemberDescriptor::new(ty, member)
}

/// Returns true if values of `source` can be stored in `target`; an enum and its
/// underlying primitive count as compatible
fn compatible(source: &MemberRef, target: &MemberRef) -> bool {
    let (Some(from), Some(to)) = (source.value_type(), target.value_type()) else {
        return false;
    };
    if to.is_assignable_from(&from) {
        return true;
    }

    (from.is_enum() || to.is_enum())
        && from.flavor.to_primitive_kind().is_some()
        && from.flavor.to_primitive_kind() == to.flavor.to_primitive_kind()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{metadata::value::ObjectRef, test::fixtures::Model};

    fn setup() -> (Reflector, Model) {
        let reflector = Reflector::new();
        let model = Model::new(reflector.registry());
        (reflector, model)
    }

    #[test]
    fn test_accessors_are_cached() {
        let (reflector, model) = setup();

        let first = reflector.getter(&model.person, "Age").unwrap();
        let second = reflector.field_getter(&model.person, "Age").unwrap();
        assert!(first.ptr_eq(&second));

        let property = reflector.property_getter(&model.person, "Name").unwrap();
        assert!(property.ptr_eq(&reflector.getter(&model.person, "Name").unwrap()));
        assert_eq!(reflector.cache().len(), 2);
    }

    #[test]
    fn test_member_not_found() {
        let (reflector, model) = setup();

        assert!(matches!(
            reflector.getter(&model.person, "Height"),
            Err(Error::MemberNotFound { .. })
        ));
        assert!(matches!(
            reflector.field_getter(&model.person, "Name"),
            Err(Error::FieldNotFound { .. })
        ));
        assert!(matches!(
            reflector.method(&model.person, "Fly", &[]),
            Err(Error::MethodNotFound { .. })
        ));
        assert!(reflector.cache().is_empty());
    }

    #[test]
    fn test_member_directed_rejects_foreign_members() {
        let (reflector, model) = setup();
        let age = lookup::field(&model.person, "Age", BindingFlags::default()).unwrap();

        assert!(matches!(
            reflector.field_getter_for(&model.dto, &age),
            Err(Error::Malformed { .. })
        ));
        assert!(reflector.field_getter_for(&model.person, &age).is_ok());
    }

    #[test]
    fn test_default_constructor_fallbacks() {
        let (reflector, model) = setup();

        assert!(reflector.default_constructor(&model.person).unwrap().has_default_constructor());
        let animal = reflector.default_constructor(&model.animal).unwrap().invoke(&[]).unwrap();
        assert!(animal.as_struct().is_some());

        let node = reflector.default_constructor(&model.node).unwrap();
        assert!(!node.has_default_constructor());

        let strict = Reflector::with_registry(reflector.shared_registry(), ReflectorConfig::strict());
        assert!(matches!(
            strict.default_constructor(&model.node),
            Err(Error::ConstructorNotFound { .. })
        ));
        assert!(matches!(
            reflector.default_constructor(&model.named),
            Err(Error::ConstructorNotFound { .. })
        ));
    }

    #[test]
    fn test_indexer() {
        let (reflector, model) = setup();
        let int32 = reflector.registry().int32();
        let bag = reflector.default_constructor(&model.bag).unwrap().invoke(&[]).unwrap();

        let set = reflector.indexer_setter(&model.bag, &[int32.clone()]).unwrap();
        let get = reflector.indexer_getter(&model.bag, &[int32]).unwrap();
        set.call(&bag, &[1.into(), 9.into()]).unwrap();
        assert_eq!(get.call(&bag, &[1.into()]).unwrap(), Value::I32(9));
        assert_eq!(reflector.getter(&model.bag, "B").unwrap().get(&bag).unwrap(), Value::I32(9));
    }

    #[test]
    fn test_generic_method_with_flags() {
        let reflector = Reflector::with_config(ReflectorConfig::public_only());
        let registry = reflector.registry();
        let t = registry.generic_parameter(0);
        let util = registry
            .class("Sample", "Util")
            .method("First", |m| {
                m.generic(&["T"])
                    .private()
                    .static_method()
                    .param("value", &t)
                    .returns(&t)
                    .body(|inv| Ok(inv.arg(0)?.clone()))
            })
            .build()
            .unwrap();
        let string = registry.string();

        assert!(matches!(
            reflector.generic_method(&util, "First", &[string.clone()], &[string.clone()]),
            Err(Error::MethodNotFound { .. })
        ));

        let first = reflector
            .generic_method_with(
                &util,
                "First",
                &[string.clone()],
                &[string.clone()],
                BindingFlags::STATIC_ANY_VISIBILITY,
            )
            .unwrap();
        assert_eq!(first.call(&Value::Null, &["x".into()]).unwrap(), Value::from("x"));
        assert!(reflector
            .generic_method_with(&util, "First", &[string.clone()], &[string], BindingFlags::INSTANCE_ANY_VISIBILITY)
            .is_err());
    }

    #[test]
    fn test_mapper_pairs_by_name() {
        let (reflector, model) = setup();
        let person = reflector
            .constructor(&model.person, &[reflector.registry().string(), reflector.registry().int32()])
            .unwrap()
            .invoke(&["Ada".into(), 36.into()])
            .unwrap();
        let dto = Value::Object(ObjectRef::allocate(&model.dto));

        reflector.mapper(&model.person, &model.dto, &[]).unwrap().map(&person, &dto).unwrap();
        assert_eq!(reflector.getter(&model.dto, "Name").unwrap().get(&dto).unwrap(), Value::from("Ada"));
        assert_eq!(reflector.getter(&model.dto, "Age").unwrap().get(&dto).unwrap(), Value::I32(36));
        assert_eq!(reflector.getter(&model.dto, "Notes").unwrap().get(&dto).unwrap(), Value::Null);
    }

    #[test]
    fn test_mapper_filtered_by_names() {
        let (reflector, model) = setup();
        let person = reflector
            .constructor(&model.person, &[reflector.registry().string(), reflector.registry().int32()])
            .unwrap()
            .invoke(&["Ada".into(), 36.into()])
            .unwrap();
        let dto = Value::Object(ObjectRef::allocate(&model.dto));

        // Names missing on either side are skipped, not reported
        let mapper = reflector
            .mapper(&model.person, &model.dto, &["Name", "Missing"])
            .unwrap();
        mapper.map(&person, &dto).unwrap();
        assert_eq!(reflector.getter(&model.dto, "Name").unwrap().get(&dto).unwrap(), Value::from("Ada"));
        assert_eq!(reflector.getter(&model.dto, "Age").unwrap().get(&dto).unwrap(), Value::I32(0));

        let all = reflector.mapper(&model.person, &model.dto, &[]).unwrap();
        assert!(!all.ptr_eq(&mapper));
        assert!(mapper.ptr_eq(&reflector.mapper(&model.person, &model.dto, &["Name"]).unwrap()));

        let flags = reflector.config().map_flags | BindingFlags::IGNORE_CASE;
        let dto = Value::Object(ObjectRef::allocate(&model.dto));
        reflector
            .mapper_with(&model.person, &model.dto, &["age"], flags)
            .unwrap()
            .map(&person, &dto)
            .unwrap();
        assert_eq!(reflector.getter(&model.dto, "Age").unwrap().get(&dto).unwrap(), Value::I32(36));
        assert_eq!(reflector.getter(&model.dto, "Name").unwrap().get(&dto).unwrap(), Value::Null);
    }

    #[test]
    fn test_mapper_between() {
        let (reflector, model) = setup();
        let person = Value::Object(ObjectRef::allocate(&model.person));
        reflector.setter(&model.person, "Name").unwrap().set(&person, "Ada").unwrap();
        let dto = Value::Object(ObjectRef::allocate(&model.dto));

        reflector
            .mapper_between(&model.person, &model.dto, &["Name"], &["Notes"])
            .unwrap()
            .map(&person, &dto)
            .unwrap();
        assert_eq!(reflector.getter(&model.dto, "Notes").unwrap().get(&dto).unwrap(), Value::from("Ada"));
        assert_eq!(reflector.getter(&model.dto, "Name").unwrap().get(&dto).unwrap(), Value::Null);

        assert!(matches!(
            reflector.mapper_between(&model.person, &model.dto, &["Name"], &[]),
            Err(Error::ArgumentCount { .. })
        ));
        assert!(matches!(
            reflector.mapper_between(&model.person, &model.dto, &["Age"], &["Notes"]),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn test_prepare_warms_the_cache() {
        let (reflector, model) = setup();

        let prepared = reflector.prepare(&model.animal).unwrap();
        assert_eq!(prepared, reflector.cache().len());
        let misses = reflector.cache().stats().misses();
        reflector.getter(&model.animal, "Age").unwrap();
        reflector.setter(&model.animal, "Name").unwrap();
        assert_eq!(reflector.cache().stats().misses(), misses);
    }

    #[test]
    fn test_global_is_shared() {
        assert!(std::ptr::eq(Reflector::global(), Reflector::global()));
    }
}
