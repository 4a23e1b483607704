//! Builder for runtime types and their members.
//!
//! This module provides the [`TypeBuilder`] struct, which offers a fluent API for declaring a
//! class, struct, interface or enumeration together with its fields, properties, indexers,
//! methods and constructors. Member bodies are native closures receiving an
//! [`Invocation`]. Calling [`TypeBuilder::build`] lays out the instance slots, creates the
//! members and publishes the type in its [`TypeRegistry`].
//!
//! # Example
//!
//! ```rust
//! use dotreflect::metadata::{typesystem::TypeRegistry, value::Value};
//!
//! let registry = TypeRegistry::new();
//! let string = registry.string();
//! let int32 = registry.int32();
//!
//! let person = registry
//!     .class("Sample", "Person")
//!     .field("Age", int32.clone())
//!     .auto_property("Name", string.clone())
//!     .constructor(|ctor| {
//!         ctor.param("name", &string)
//!             .param("age", &int32)
//!             .body(|inv| {
//!                 inv.set("Name", inv.arg(0)?.clone())?;
//!                 inv.set("Age", inv.arg(1)?.clone())?;
//!                 Ok(Value::Null)
//!             })
//!     })
//!     .method("Greet", |m| {
//!         m.returns(&string)
//!             .body(|inv| Ok(format!("Hello, {:?}", inv.get("Name")?).into()))
//!     })
//!     .build()?;
//!
//! assert_eq!(person.constructors.count(), 1);
//! assert!(person.declared_property("Name").unwrap().backing_field.is_some());
//! # Ok::<(), dotreflect::Error>(())
//! ```

use std::sync::Arc;

use crate::{
    metadata::{
        members::{
            Field, FieldAttributes, Invocation, Method, MethodAttributes, MethodBody, MethodRc,
            Param, Property, CONSTRUCTOR_NAME,
        },
        token::TableId,
        typesystem::{
            base::{TypeAttributes, TypeFlavor},
            RuntimeType, RuntimeTypeRc, RuntimeTypeRef, TypeRegistry,
        },
        value::{EnumValue, Value},
    },
    Result,
};

/// Name of the compiler emitted field behind the auto-property `property`
#[must_use]
pub fn backing_field_name(property: &str) -> String {
    format!("<{property}>k__BackingField")
}

/// Fluent declaration of a method or constructor
pub struct MethodBuilder {
    name: String,
    flags: u32,
    params: Vec<Param>,
    return_type: Option<RuntimeTypeRc>,
    generic_params: Vec<String>,
    body: Option<MethodBody>,
}

impl MethodBuilder {
    /// Start declaring a public instance method
    pub fn new(name: impl Into<String>) -> Self {
        MethodBuilder {
            name: name.into(),
            flags: MethodAttributes::PUBLIC | MethodAttributes::HIDE_BY_SIG,
            params: Vec::new(),
            return_type: None,
            generic_params: Vec::new(),
            body: None,
        }
    }

    /// Appends a parameter
    #[must_use]
    pub fn param(mut self, name: &str, ty: &RuntimeTypeRc) -> Self {
        self.params.push(Param::new(name, ty));
        self
    }

    /// Sets the return type; methods without one return void
    #[must_use]
    pub fn returns(mut self, ty: &RuntimeTypeRc) -> Self {
        self.return_type = Some(ty.clone());
        self
    }

    /// Makes this a generic method definition with the given parameter names; reference the
    /// parameters through [`TypeRegistry::generic_parameter`]
    #[must_use]
    pub fn generic(mut self, names: &[&str]) -> Self {
        self.generic_params = names.iter().map(|name| (*name).to_string()).collect();
        self
    }

    /// Replaces the visibility with private
    #[must_use]
    pub fn private(mut self) -> Self {
        self.flags = (self.flags & !MethodAttributes::MEMBER_ACCESS_MASK) | MethodAttributes::PRIVATE;
        self
    }

    /// Replaces the visibility with family (protected)
    #[must_use]
    pub fn family(mut self) -> Self {
        self.flags = (self.flags & !MethodAttributes::MEMBER_ACCESS_MASK) | MethodAttributes::FAMILY;
        self
    }

    /// Makes the method static
    #[must_use]
    pub fn static_method(mut self) -> Self {
        self.flags |= MethodAttributes::STATIC;
        self
    }

    /// Introduces a new virtual method
    #[must_use]
    pub fn virtual_method(mut self) -> Self {
        self.flags |= MethodAttributes::VIRTUAL | MethodAttributes::NEW_SLOT;
        self
    }

    /// Overrides a virtual method of a base type
    #[must_use]
    pub fn override_method(mut self) -> Self {
        self.flags |= MethodAttributes::VIRTUAL;
        self.flags &= !MethodAttributes::NEW_SLOT;
        self
    }

    /// Hides an inherited method with the same signature (`new` in C#)
    #[must_use]
    pub fn hides(mut self) -> Self {
        self.flags |= MethodAttributes::NEW_SLOT;
        self
    }

    /// Declares the method abstract; it has no body and must be overridden
    #[must_use]
    pub fn abstract_method(mut self) -> Self {
        self.flags |=
            MethodAttributes::ABSTRACT | MethodAttributes::VIRTUAL | MethodAttributes::NEW_SLOT;
        self
    }

    /// Sets raw `MethodAttributes` flags
    #[must_use]
    pub fn flags(mut self, flags: u32) -> Self {
        self.flags = flags;
        self
    }

    /// Sets the native implementation
    #[must_use]
    pub fn body<F>(mut self, body: F) -> Self
    where
        F: Fn(Invocation<'_>) -> Result<Value> + Send + Sync + 'static,
    {
        self.body = Some(Arc::new(body));
        self
    }

    fn build(self, registry: &TypeRegistry, declaring: &RuntimeTypeRef) -> Result<MethodRc> {
        if self.body.is_none() && self.flags & MethodAttributes::ABSTRACT == 0 {
            return Err(malformed_error!("Method {} has no body", self.name));
        }

        Ok(Arc::new(Method::new(
            registry.allocate_token(TableId::METHOD_DEF),
            self.name,
            self.flags,
            self.params,
            self.return_type,
            declaring.clone(),
            self.generic_params,
            self.body,
        )))
    }
}

/// Fluent declaration of a property or indexer with explicit accessor bodies
pub struct PropertyBuilder {
    name: String,
    property_type: RuntimeTypeRc,
    method_flags: u32,
    index_params: Vec<Param>,
    getter: Option<MethodBody>,
    setter: Option<MethodBody>,
}

impl PropertyBuilder {
    /// Start declaring a public instance property
    pub fn new(name: impl Into<String>, property_type: &RuntimeTypeRc) -> Self {
        PropertyBuilder {
            name: name.into(),
            property_type: property_type.clone(),
            method_flags: MethodAttributes::PUBLIC
                | MethodAttributes::HIDE_BY_SIG
                | MethodAttributes::SPECIAL_NAME,
            index_params: Vec::new(),
            getter: None,
            setter: None,
        }
    }

    /// Appends an index parameter, turning the property into an indexer
    #[must_use]
    pub fn index(mut self, name: &str, ty: &RuntimeTypeRc) -> Self {
        self.index_params.push(Param::new(name, ty));
        self
    }

    /// Sets the getter body; it receives the index arguments
    #[must_use]
    pub fn getter<F>(mut self, body: F) -> Self
    where
        F: Fn(Invocation<'_>) -> Result<Value> + Send + Sync + 'static,
    {
        self.getter = Some(Arc::new(body));
        self
    }

    /// Sets the setter body; it receives the index arguments followed by the value
    #[must_use]
    pub fn setter<F>(mut self, body: F) -> Self
    where
        F: Fn(Invocation<'_>) -> Result<Value> + Send + Sync + 'static,
    {
        self.setter = Some(Arc::new(body));
        self
    }

    /// Makes both accessors private
    #[must_use]
    pub fn private(mut self) -> Self {
        self.method_flags =
            (self.method_flags & !MethodAttributes::MEMBER_ACCESS_MASK) | MethodAttributes::PRIVATE;
        self
    }

    /// Makes the property static
    #[must_use]
    pub fn static_property(mut self) -> Self {
        self.method_flags |= MethodAttributes::STATIC;
        self
    }

    /// Introduces a new virtual property
    #[must_use]
    pub fn virtual_property(mut self) -> Self {
        self.method_flags |= MethodAttributes::VIRTUAL | MethodAttributes::NEW_SLOT;
        self
    }

    /// Overrides a virtual property of a base type
    #[must_use]
    pub fn override_property(mut self) -> Self {
        self.method_flags |= MethodAttributes::VIRTUAL;
        self.method_flags &= !MethodAttributes::NEW_SLOT;
        self
    }

    /// Hides an inherited property of the same name (`new` in C#)
    #[must_use]
    pub fn hides(mut self) -> Self {
        self.method_flags |= MethodAttributes::NEW_SLOT;
        self
    }

    fn accessor(
        &self,
        registry: &TypeRegistry,
        declaring: &RuntimeTypeRef,
        name: String,
        params: Vec<Param>,
        return_type: Option<RuntimeTypeRc>,
        body: MethodBody,
    ) -> MethodRc {
        Arc::new(Method::new(
            registry.allocate_token(TableId::METHOD_DEF),
            name,
            self.method_flags,
            params,
            return_type,
            declaring.clone(),
            Vec::new(),
            Some(body),
        ))
    }

    fn build(
        self,
        registry: &TypeRegistry,
        ty: &RuntimeType,
        declaring: &RuntimeTypeRef,
        backing_field: Option<Arc<Field>>,
    ) -> Result<()> {
        if self.getter.is_none() && self.setter.is_none() {
            return Err(malformed_error!("Property {} has no accessors", self.name));
        }

        let getter = self.getter.clone().map(|body| {
            self.accessor(
                registry,
                declaring,
                format!("get_{}", self.name),
                self.index_params.clone(),
                Some(self.property_type.clone()),
                body,
            )
        });
        let setter = self.setter.clone().map(|body| {
            let mut params = self.index_params.clone();
            params.push(Param::new("value", &self.property_type));
            self.accessor(
                registry,
                declaring,
                format!("set_{}", self.name),
                params,
                None,
                body,
            )
        });

        for method in getter.iter().chain(setter.iter()) {
            ty.methods.push(method.clone());
        }

        ty.properties.push(Arc::new(Property {
            token: registry.allocate_token(TableId::PROPERTY),
            name: self.name,
            flags: 0,
            property_type: self.property_type,
            declaring_type: declaring.clone(),
            getter,
            setter,
            index_params: self.index_params,
            backing_field,
        }));
        Ok(())
    }
}

enum MemberSpec {
    Field {
        name: String,
        field_type: RuntimeTypeRc,
        flags: u32,
        constant: Option<Value>,
    },
    EnumValue {
        name: String,
        raw: i64,
    },
    AutoProperty(PropertyBuilder),
    Property(PropertyBuilder),
    Method(MethodBuilder),
    Constructor(MethodBuilder),
}

/// Provides a fluent API for declaring types
pub struct TypeBuilder<'r> {
    registry: &'r TypeRegistry,
    namespace: String,
    name: String,
    flavor: TypeFlavor,
    flags: u32,
    base: Option<RuntimeTypeRc>,
    interfaces: Vec<RuntimeTypeRc>,
    members: Vec<MemberSpec>,
}

impl<'r> TypeBuilder<'r> {
    /// Create a new builder; prefer the entry points on [`TypeRegistry`]
    pub fn new(registry: &'r TypeRegistry, namespace: &str, name: &str, flavor: TypeFlavor) -> Self {
        let mut flags = TypeAttributes::PUBLIC;
        if flavor == TypeFlavor::Interface {
            flags |= TypeAttributes::INTERFACE | TypeAttributes::ABSTRACT;
        }
        if flavor.is_value_type() {
            flags |= TypeAttributes::SEALED;
        }

        TypeBuilder {
            registry,
            namespace: namespace.to_string(),
            name: name.to_string(),
            flavor,
            flags,
            base: None,
            interfaces: Vec::new(),
            members: Vec::new(),
        }
    }

    /// Sets the base type of a class
    #[must_use]
    pub fn base(mut self, base: &RuntimeTypeRc) -> Self {
        self.base = Some(base.clone());
        self
    }

    /// Adds an implemented interface
    #[must_use]
    pub fn implements(mut self, interface: &RuntimeTypeRc) -> Self {
        self.interfaces.push(interface.clone());
        self
    }

    /// Marks the type abstract
    #[must_use]
    pub fn abstract_type(mut self) -> Self {
        self.flags |= TypeAttributes::ABSTRACT;
        self
    }

    /// Marks the type sealed
    #[must_use]
    pub fn sealed(mut self) -> Self {
        self.flags |= TypeAttributes::SEALED;
        self
    }

    /// Removes public scope from the type
    #[must_use]
    pub fn non_public(mut self) -> Self {
        self.flags &= !TypeAttributes::VISIBILITY_MASK;
        self
    }

    /// Declares a field with raw `FieldAttributes` flags
    #[must_use]
    pub fn field_with(mut self, name: &str, field_type: RuntimeTypeRc, flags: u32) -> Self {
        self.members.push(MemberSpec::Field {
            name: name.to_string(),
            field_type,
            flags,
            constant: None,
        });
        self
    }

    /// Declares a public instance field
    #[must_use]
    pub fn field(self, name: &str, field_type: RuntimeTypeRc) -> Self {
        self.field_with(name, field_type, FieldAttributes::PUBLIC)
    }

    /// Declares a private instance field
    #[must_use]
    pub fn private_field(self, name: &str, field_type: RuntimeTypeRc) -> Self {
        self.field_with(name, field_type, FieldAttributes::PRIVATE)
    }

    /// Declares a public readonly instance field
    #[must_use]
    pub fn readonly_field(self, name: &str, field_type: RuntimeTypeRc) -> Self {
        self.field_with(name, field_type, FieldAttributes::PUBLIC | FieldAttributes::INIT_ONLY)
    }

    /// Declares a public static field
    #[must_use]
    pub fn static_field(self, name: &str, field_type: RuntimeTypeRc) -> Self {
        self.field_with(name, field_type, FieldAttributes::PUBLIC | FieldAttributes::STATIC)
    }

    /// Declares a public compile time constant
    #[must_use]
    pub fn constant(mut self, name: &str, field_type: RuntimeTypeRc, value: impl Into<Value>) -> Self {
        self.members.push(MemberSpec::Field {
            name: name.to_string(),
            field_type,
            flags: FieldAttributes::PUBLIC
                | FieldAttributes::STATIC
                | FieldAttributes::LITERAL
                | FieldAttributes::HAS_DEFAULT,
            constant: Some(value.into()),
        });
        self
    }

    /// Declares a member of an enumeration
    #[must_use]
    pub fn enum_value(mut self, name: &str, raw: i64) -> Self {
        self.members.push(MemberSpec::EnumValue {
            name: name.to_string(),
            raw,
        });
        self
    }

    /// Declares a public read/write auto-property backed by a compiler emitted field
    #[must_use]
    pub fn auto_property(self, name: &str, property_type: RuntimeTypeRc) -> Self {
        self.auto_property_with(name, property_type, |p| p)
    }

    /// Declares a public static read/write auto-property
    #[must_use]
    pub fn static_property(self, name: &str, property_type: RuntimeTypeRc) -> Self {
        self.auto_property_with(name, property_type, PropertyBuilder::static_property)
    }

    /// Declares an auto-property, letting `configure` adjust visibility and virtuality.
    /// Accessor bodies set by `configure` are replaced by the generated ones.
    #[must_use]
    pub fn auto_property_with<F>(mut self, name: &str, property_type: RuntimeTypeRc, configure: F) -> Self
    where
        F: FnOnce(PropertyBuilder) -> PropertyBuilder,
    {
        let property = configure(PropertyBuilder::new(name, &property_type));
        self.members.push(MemberSpec::AutoProperty(property));
        self
    }

    /// Declares a public read-only property computed by `getter`
    #[must_use]
    pub fn readonly_property<F>(self, name: &str, property_type: RuntimeTypeRc, getter: F) -> Self
    where
        F: Fn(Invocation<'_>) -> Result<Value> + Send + Sync + 'static,
    {
        self.property(name, property_type, |p| p.getter(getter))
    }

    /// Declares a property with explicit accessor bodies
    #[must_use]
    pub fn property<F>(mut self, name: &str, property_type: RuntimeTypeRc, configure: F) -> Self
    where
        F: FnOnce(PropertyBuilder) -> PropertyBuilder,
    {
        let property = configure(PropertyBuilder::new(name, &property_type));
        self.members.push(MemberSpec::Property(property));
        self
    }

    /// Declares an indexer (a property named `Item` with index parameters)
    #[must_use]
    pub fn indexer<F>(self, property_type: RuntimeTypeRc, configure: F) -> Self
    where
        F: FnOnce(PropertyBuilder) -> PropertyBuilder,
    {
        self.property("Item", property_type, configure)
    }

    /// Declares a method
    #[must_use]
    pub fn method<F>(mut self, name: &str, configure: F) -> Self
    where
        F: FnOnce(MethodBuilder) -> MethodBuilder,
    {
        self.members
            .push(MemberSpec::Method(configure(MethodBuilder::new(name))));
        self
    }

    /// Declares a constructor
    #[must_use]
    pub fn constructor<F>(mut self, configure: F) -> Self
    where
        F: FnOnce(MethodBuilder) -> MethodBuilder,
    {
        let builder = configure(MethodBuilder::new(CONSTRUCTOR_NAME));
        self.members.push(MemberSpec::Constructor(builder));
        self
    }

    /// Declares a public parameterless constructor that leaves all fields at their defaults
    #[must_use]
    pub fn default_constructor(self) -> Self {
        self.constructor(|ctor| ctor.body(|_| Ok(Value::Null)))
    }

    /// Lays out the type, creates its members and registers it.
    ///
    /// # Errors
    /// Returns [`crate::Error::TypeInsert`] if the full name is already taken, and
    /// [`crate::Error::Malformed`] for inconsistent declarations (a sealed or non-class base,
    /// instance fields on interfaces or enums, methods without body).
    pub fn build(self) -> Result<RuntimeTypeRc> {
        let fullname = if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        };
        if self.registry.get_by_fullname(&fullname).is_some() {
            return Err(crate::Error::TypeInsert(fullname));
        }

        let base = match (self.flavor, self.base) {
            (TypeFlavor::Interface, _) => None,
            (TypeFlavor::Class, Some(base)) => {
                if base.is_sealed() || !matches!(base.flavor, TypeFlavor::Class | TypeFlavor::Object) {
                    return Err(malformed_error!(
                        "{} cannot derive from {}",
                        fullname,
                        base.fullname()
                    ));
                }
                Some(base)
            }
            (TypeFlavor::Class, None) => Some(self.registry.object()),
            (_, Some(base)) => {
                return Err(malformed_error!(
                    "{} cannot declare the base type {}",
                    fullname,
                    base.fullname()
                ))
            }
            (_, None) => Some(self.registry.value_type()),
        };

        let ty = Arc::new(RuntimeType::new(
            self.registry.allocate_token(TableId::TYPE_DEF),
            self.namespace,
            self.name,
            self.flavor,
            self.flags,
        ));
        if let Some(base) = &base {
            ty.set_base(base);
        }
        for interface in &self.interfaces {
            if !interface.is_interface() {
                return Err(malformed_error!(
                    "{} is not an interface",
                    interface.fullname()
                ));
            }
            ty.interfaces.push(interface.clone());
        }

        let declaring = RuntimeTypeRef::new(&ty);
        let mut layout: Vec<RuntimeTypeRc> = base
            .as_ref()
            .map(|base| base.instance_layout().to_vec())
            .unwrap_or_default();
        let allows_instance_fields = matches!(self.flavor, TypeFlavor::Class | TypeFlavor::ValueType);

        let mut add_field = |name: String,
                             field_type: RuntimeTypeRc,
                             flags: u32,
                             constant: Option<Value>|
         -> Result<Arc<Field>> {
            let slot = if flags & FieldAttributes::STATIC != 0 {
                let initial = constant
                    .clone()
                    .unwrap_or_else(|| Value::default_for(&field_type));
                ty.push_static(initial)
            } else {
                if !allows_instance_fields {
                    return Err(malformed_error!(
                        "{} cannot declare the instance field {}",
                        ty.fullname(),
                        name
                    ));
                }
                layout.push(field_type.clone());
                layout.len() - 1
            };

            let field = Arc::new(Field {
                token: self.registry.allocate_token(TableId::FIELD),
                name,
                flags,
                field_type,
                declaring_type: declaring.clone(),
                slot,
                constant,
            });
            ty.fields.push(field.clone());
            Ok(field)
        };

        let mut deferred = Vec::new();
        for member in self.members {
            match member {
                MemberSpec::Field {
                    name,
                    field_type,
                    flags,
                    constant,
                } => {
                    add_field(name, field_type, flags, constant)?;
                }
                MemberSpec::EnumValue { name, raw } => {
                    add_field(
                        name,
                        ty.clone(),
                        FieldAttributes::PUBLIC
                            | FieldAttributes::STATIC
                            | FieldAttributes::LITERAL
                            | FieldAttributes::HAS_DEFAULT,
                        Some(Value::Enum(EnumValue::new(ty.clone(), raw))),
                    )?;
                }
                MemberSpec::AutoProperty(property) => {
                    let is_static = property.method_flags & MethodAttributes::STATIC != 0;
                    let mut flags = FieldAttributes::PRIVATE | FieldAttributes::COMPILER_GENERATED;
                    if is_static {
                        flags |= FieldAttributes::STATIC;
                    }
                    let field = add_field(
                        backing_field_name(&property.name),
                        property.property_type.clone(),
                        flags,
                        None,
                    )?;
                    deferred.push((property, Some(field)));
                }
                MemberSpec::Property(property) => deferred.push((property, None)),
                MemberSpec::Method(method) => {
                    ty.methods.push(method.build(self.registry, &declaring)?);
                }
                MemberSpec::Constructor(ctor) => {
                    let access = ctor.flags & MethodAttributes::MEMBER_ACCESS_MASK;
                    let ctor = ctor.flags(
                        access
                            | MethodAttributes::HIDE_BY_SIG
                            | MethodAttributes::SPECIAL_NAME
                            | MethodAttributes::RTSPECIAL_NAME,
                    );
                    ty.constructors.push(ctor.build(self.registry, &declaring)?);
                }
            }
        }

        for (property, backing_field) in deferred {
            let property = match &backing_field {
                Some(field) => auto_accessors(property, field, &declaring),
                None => property,
            };
            property.build(self.registry, &ty, &declaring, backing_field)?;
        }

        ty.set_layout(layout);
        self.registry.register(&ty)?;
        Ok(ty)
    }
}

/// Generates the accessor bodies of an auto-property over its backing field
fn auto_accessors(property: PropertyBuilder, field: &Arc<Field>, declaring: &RuntimeTypeRef) -> PropertyBuilder {
    let slot = field.slot;
    if field.is_static() {
        let getter_type = declaring.clone();
        let setter_type = declaring.clone();
        property
            .getter(move |_| getter_type.get()?.load_static(slot))
            .setter(move |inv| {
                let value = inv.arg(0)?.clone();
                setter_type.get()?.store_static(slot, value)?;
                Ok(Value::Null)
            })
    } else {
        property
            .getter(move |inv| inv.load(slot))
            .setter(move |inv| {
                let value = inv.arg(0)?.clone();
                inv.store(slot, value)?;
                Ok(Value::Null)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{metadata::members::MemberRef, Error};

    #[test]
    fn test_auto_property_layout() {
        let registry = TypeRegistry::new();
        let ty = registry
            .class("Sample", "Point")
            .field("X", registry.int32())
            .auto_property("Y", registry.int32())
            .static_field("Count", registry.int32())
            .build()
            .unwrap();

        assert_eq!(ty.instance_slot_count(), 2);
        let backing = ty.declared_field(&backing_field_name("Y")).unwrap();
        assert!(backing.is_compiler_generated());
        assert!(!backing.is_public());
        assert_eq!(backing.slot, 1);

        let property = ty.declared_property("Y").unwrap();
        assert!(property.can_read() && property.can_write());
        assert_eq!(property.getter.as_ref().unwrap().name, "get_Y");
        assert_eq!(ty.declared_methods("set_Y").len(), 1);

        let count = ty.declared_field("Count").unwrap();
        assert!(count.is_static());
        assert_eq!(ty.load_static(count.slot).unwrap(), Value::I32(0));
    }

    #[test]
    fn test_derived_layout_extends_base() {
        let registry = TypeRegistry::new();
        let base = registry
            .class("Sample", "Base")
            .field("A", registry.int32())
            .build()
            .unwrap();
        let derived = registry
            .class("Sample", "Derived")
            .base(&base)
            .field("B", registry.string())
            .build()
            .unwrap();

        assert_eq!(derived.instance_slot_count(), 2);
        assert_eq!(derived.declared_field("B").unwrap().slot, 1);
        assert!(derived.is_subclass_of(&base));
    }

    #[test]
    fn test_enum_members() {
        let registry = TypeRegistry::new();
        let color = registry
            .enumeration("Sample", "Shade", crate::metadata::typesystem::PrimitiveKind::I4)
            .enum_value("Light", 0)
            .enum_value("Dark", 1)
            .build()
            .unwrap();

        let dark = color.declared_field("Dark").unwrap();
        assert!(dark.is_literal() && dark.is_static());
        match &dark.constant {
            Some(Value::Enum(value)) => assert_eq!(value.raw(), 1),
            other => panic!("expected enum constant, got {other:?}"),
        }
        assert_eq!(color.base().unwrap().fullname(), "System.ValueType");
    }

    #[test]
    fn test_malformed_declarations() {
        let registry = TypeRegistry::new();
        let sealed = registry.class("Sample", "Sealed").sealed().build().unwrap();

        assert!(matches!(
            registry.class("Sample", "FromSealed").base(&sealed).build(),
            Err(Error::Malformed { .. })
        ));
        assert!(matches!(
            registry
                .interface("Sample", "IFields")
                .field("X", registry.int32())
                .build(),
            Err(Error::Malformed { .. })
        ));
        assert!(matches!(
            registry.class("Sample", "NoBody").method("Run", |m| m).build(),
            Err(Error::Malformed { .. })
        ));
        assert!(registry.get_by_fullname("Sample.NoBody").is_none());
    }

    #[test]
    fn test_constructors_are_separate() {
        let registry = TypeRegistry::new();
        let ty = registry
            .class("Sample", "Widget")
            .default_constructor()
            .build()
            .unwrap();

        assert_eq!(ty.constructors.count(), 1);
        assert_eq!(ty.methods.count(), 0);
        let ctor: MemberRef = ty.constructors.get(0).unwrap().clone().into();
        assert!(matches!(ctor, MemberRef::Constructor(_)));
    }
}
