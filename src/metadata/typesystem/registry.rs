//! Central, thread-safe registry of runtime types.
//!
//! The registry owns every [`RuntimeType`] of an object model. Built-in types (`System.Object`,
//! `System.ValueType`, `System.String`, `System.Void` and the primitives) are registered on
//! construction with reserved tokens in the `0xF000_00xx` range; user types receive tokens
//! from per-table counters when their [`TypeBuilder`] is built. Constructed types (arrays,
//! by-ref types, generic parameters) are created on demand and registered once.
//!
//! # Thread Safety
//!
//! Lookups and registrations may run concurrently from any number of threads:
//! - Primary storage is a lock-free skip list ordered by token
//! - Name and constructed-type indices are concurrent hash maps
//! - Token allocation uses atomic counters
//!
//! # Examples
//!
//! ```rust
//! use dotreflect::metadata::typesystem::TypeRegistry;
//!
//! let registry = TypeRegistry::new();
//!
//! let int32 = registry.get_by_fullname("System.Int32").unwrap();
//! assert_eq!(int32.token, registry.int32().token);
//!
//! let ints = registry.array_of(&int32);
//! assert_eq!(ints.fullname(), "System.Int32[]");
//! assert_eq!(registry.array_of(&int32).token, ints.token);
//! ```

use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};

use crossbeam_skiplist::SkipMap;
use dashmap::DashMap;
use strum::{EnumCount, IntoEnumIterator};

use crate::{
    metadata::{
        token::{TableId, Token},
        typesystem::{
            base::{TypeAttributes, TypeFlavor},
            builder::TypeBuilder,
            primitives::{OBJECT_TOKEN, STRING_TOKEN, VALUE_TYPE_TOKEN, VOID_TOKEN},
            PrimitiveKind, RuntimeType, RuntimeTypeRc,
        },
        value::Value,
    },
    Error, Result,
};

/// The built-in types every registry starts with
struct Builtins {
    void: RuntimeTypeRc,
    object: RuntimeTypeRc,
    value_type: RuntimeTypeRc,
    string: RuntimeTypeRc,
    primitives: Vec<RuntimeTypeRc>,
}

/// Central registry of all types of an object model
pub struct TypeRegistry {
    /// Primary type storage indexed by tokens - uses skip list for O(log n) operations
    types: SkipMap<Token, RuntimeTypeRc>,
    /// Atomic counters for the rows of each table
    next_type: AtomicU32,
    next_field: AtomicU32,
    next_method: AtomicU32,
    next_property: AtomicU32,
    next_type_spec: AtomicU32,
    next_method_spec: AtomicU32,
    /// Secondary index: types indexed by full name (namespace.name)
    types_by_fullname: DashMap<String, Token>,
    /// Secondary index: types indexed by simple name (may have duplicates)
    types_by_name: DashMap<String, Vec<Token>>,
    /// Constructed array types, by element token
    arrays: DashMap<Token, RuntimeTypeRc>,
    /// Constructed by-ref types, by element token
    by_refs: DashMap<Token, RuntimeTypeRc>,
    /// Generic method parameters, by position
    generic_params: DashMap<usize, RuntimeTypeRc>,
    builtins: Builtins,
}

impl TypeRegistry {
    /// Create a new type registry with the built-in types registered.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dotreflect::metadata::typesystem::TypeRegistry;
    ///
    /// let registry = TypeRegistry::new();
    /// assert!(registry.get_by_fullname("System.String").is_some());
    /// assert_eq!(registry.len(), 16);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        let builtin = |token: Token, name: &str, flavor: TypeFlavor| {
            Arc::new(RuntimeType::new(
                token,
                "System".to_string(),
                name.to_string(),
                flavor,
                TypeAttributes::PUBLIC | TypeAttributes::SEALED,
            ))
        };

        let object = Arc::new(RuntimeType::new(
            OBJECT_TOKEN,
            "System".to_string(),
            "Object".to_string(),
            TypeFlavor::Object,
            TypeAttributes::PUBLIC,
        ));
        let value_type = Arc::new(RuntimeType::new(
            VALUE_TYPE_TOKEN,
            "System".to_string(),
            "ValueType".to_string(),
            TypeFlavor::Object,
            TypeAttributes::PUBLIC | TypeAttributes::ABSTRACT,
        ));
        value_type.set_base(&object);

        let string = builtin(STRING_TOKEN, "String", TypeFlavor::String);
        string.set_base(&object);
        let void = builtin(VOID_TOKEN, "Void", TypeFlavor::Void);
        void.set_base(&value_type);

        let mut primitives = Vec::with_capacity(PrimitiveKind::COUNT);
        for kind in PrimitiveKind::iter() {
            let primitive = builtin(kind.token(), kind.name(), TypeFlavor::Primitive(kind));
            primitive.set_base(&value_type);
            primitives.push(primitive);
        }

        let registry = TypeRegistry {
            types: SkipMap::new(),
            next_type: AtomicU32::new(1),
            next_field: AtomicU32::new(1),
            next_method: AtomicU32::new(1),
            next_property: AtomicU32::new(1),
            next_type_spec: AtomicU32::new(1),
            next_method_spec: AtomicU32::new(1),
            types_by_fullname: DashMap::new(),
            types_by_name: DashMap::new(),
            arrays: DashMap::new(),
            by_refs: DashMap::new(),
            generic_params: DashMap::new(),
            builtins: Builtins {
                void,
                object,
                value_type,
                string,
                primitives,
            },
        };

        let builtins = [
            &registry.builtins.void,
            &registry.builtins.object,
            &registry.builtins.value_type,
            &registry.builtins.string,
        ];
        for ty in builtins.into_iter().chain(registry.builtins.primitives.iter()) {
            registry.insert(ty);
        }

        registry
    }

    /// Allocates the next token of `table`
    pub fn allocate_token(&self, table: u8) -> Token {
        let counter = match table {
            TableId::FIELD => &self.next_field,
            TableId::METHOD_DEF => &self.next_method,
            TableId::PROPERTY => &self.next_property,
            TableId::TYPE_SPEC => &self.next_type_spec,
            TableId::METHOD_SPEC => &self.next_method_spec,
            _ => &self.next_type,
        };
        let table = match table {
            TableId::FIELD
            | TableId::METHOD_DEF
            | TableId::PROPERTY
            | TableId::TYPE_SPEC
            | TableId::METHOD_SPEC => table,
            _ => TableId::TYPE_DEF,
        };
        Token::from_parts(table, counter.fetch_add(1, Ordering::Relaxed))
    }

    /// Indexes a type without checking for duplicate names
    fn insert(&self, ty: &RuntimeTypeRc) {
        self.types.insert(ty.token, ty.clone());
        self.types_by_fullname.insert(ty.fullname(), ty.token);
        self.types_by_name
            .entry(ty.name.clone())
            .or_default()
            .push(ty.token);
    }

    /// Publishes a freshly built type.
    ///
    /// # Errors
    /// Returns [`Error::TypeInsert`] if a type with the same full name is already registered.
    pub(crate) fn register(&self, ty: &RuntimeTypeRc) -> Result<()> {
        let fullname = ty.fullname();
        match self.types_by_fullname.entry(fullname.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => return Err(Error::TypeInsert(fullname)),
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                entry.insert(ty.token);
            }
        }

        self.types.insert(ty.token, ty.clone());
        self.types_by_name
            .entry(ty.name.clone())
            .or_default()
            .push(ty.token);

        log::debug!("registered type {} as {}", fullname, ty.token);
        Ok(())
    }

    /// Starts declaring a reference type
    pub fn class(&self, namespace: &str, name: &str) -> TypeBuilder<'_> {
        TypeBuilder::new(self, namespace, name, TypeFlavor::Class)
    }

    /// Starts declaring a struct
    pub fn structure(&self, namespace: &str, name: &str) -> TypeBuilder<'_> {
        TypeBuilder::new(self, namespace, name, TypeFlavor::ValueType)
    }

    /// Starts declaring an interface
    pub fn interface(&self, namespace: &str, name: &str) -> TypeBuilder<'_> {
        TypeBuilder::new(self, namespace, name, TypeFlavor::Interface)
    }

    /// Starts declaring an enumeration with the given underlying type
    pub fn enumeration(&self, namespace: &str, name: &str, underlying: PrimitiveKind) -> TypeBuilder<'_> {
        TypeBuilder::new(self, namespace, name, TypeFlavor::Enum { underlying })
    }

    /// `System.Object`
    #[must_use]
    pub fn object(&self) -> RuntimeTypeRc {
        self.builtins.object.clone()
    }

    /// `System.ValueType`
    #[must_use]
    pub fn value_type(&self) -> RuntimeTypeRc {
        self.builtins.value_type.clone()
    }

    /// `System.String`
    #[must_use]
    pub fn string(&self) -> RuntimeTypeRc {
        self.builtins.string.clone()
    }

    /// `System.Void`
    #[must_use]
    pub fn void(&self) -> RuntimeTypeRc {
        self.builtins.void.clone()
    }

    /// Get a primitive type by its kind
    #[must_use]
    pub fn get_primitive(&self, kind: PrimitiveKind) -> RuntimeTypeRc {
        self.builtins.primitives[kind.index()].clone()
    }

    /// `System.Boolean`
    #[must_use]
    pub fn boolean(&self) -> RuntimeTypeRc {
        self.get_primitive(PrimitiveKind::Boolean)
    }

    /// `System.Char`
    #[must_use]
    pub fn char(&self) -> RuntimeTypeRc {
        self.get_primitive(PrimitiveKind::Char)
    }

    /// `System.Byte`
    #[must_use]
    pub fn uint8(&self) -> RuntimeTypeRc {
        self.get_primitive(PrimitiveKind::U1)
    }

    /// `System.Int16`
    #[must_use]
    pub fn int16(&self) -> RuntimeTypeRc {
        self.get_primitive(PrimitiveKind::I2)
    }

    /// `System.Int32`
    #[must_use]
    pub fn int32(&self) -> RuntimeTypeRc {
        self.get_primitive(PrimitiveKind::I4)
    }

    /// `System.UInt32`
    #[must_use]
    pub fn uint32(&self) -> RuntimeTypeRc {
        self.get_primitive(PrimitiveKind::U4)
    }

    /// `System.Int64`
    #[must_use]
    pub fn int64(&self) -> RuntimeTypeRc {
        self.get_primitive(PrimitiveKind::I8)
    }

    /// `System.Single`
    #[must_use]
    pub fn float32(&self) -> RuntimeTypeRc {
        self.get_primitive(PrimitiveKind::R4)
    }

    /// `System.Double`
    #[must_use]
    pub fn float64(&self) -> RuntimeTypeRc {
        self.get_primitive(PrimitiveKind::R8)
    }

    /// Returns the single dimension array type with `element` as element type
    pub fn array_of(&self, element: &RuntimeTypeRc) -> RuntimeTypeRc {
        self.constructed(&self.arrays, element, TypeFlavor::Array, "[]")
    }

    /// Returns the by-ref type of `element`
    pub fn by_ref(&self, element: &RuntimeTypeRc) -> RuntimeTypeRc {
        self.constructed(&self.by_refs, element, TypeFlavor::ByRef, "&")
    }

    fn constructed(
        &self,
        index: &DashMap<Token, RuntimeTypeRc>,
        element: &RuntimeTypeRc,
        flavor: TypeFlavor,
        suffix: &str,
    ) -> RuntimeTypeRc {
        if let Some(existing) = index.get(&element.token) {
            return existing.clone();
        }

        let created = index
            .entry(element.token)
            .or_insert_with(|| {
                let ty = Arc::new(RuntimeType::new(
                    self.allocate_token(TableId::TYPE_SPEC),
                    element.namespace.clone(),
                    format!("{}{}", element.name, suffix),
                    flavor,
                    TypeAttributes::PUBLIC | TypeAttributes::SEALED,
                ));
                ty.set_element_type(element.clone());
                if flavor == TypeFlavor::Array {
                    ty.set_base(&self.builtins.object);
                }
                ty
            })
            .clone();

        self.types.get_or_insert(created.token, created.clone());
        created
    }

    /// Returns the generic method parameter at position `index`
    pub fn generic_parameter(&self, index: usize) -> RuntimeTypeRc {
        if let Some(existing) = self.generic_params.get(&index) {
            return existing.clone();
        }

        let created = self
            .generic_params
            .entry(index)
            .or_insert_with(|| {
                Arc::new(RuntimeType::new(
                    self.allocate_token(TableId::TYPE_SPEC),
                    String::new(),
                    format!("!!{index}"),
                    TypeFlavor::GenericParameter { index },
                    TypeAttributes::PUBLIC,
                ))
            })
            .clone();

        self.types.get_or_insert(created.token, created.clone());
        created
    }

    /// Look up a type by its token.
    pub fn get(&self, token: &Token) -> Option<RuntimeTypeRc> {
        self.types.get(token).map(|entry| entry.value().clone())
    }

    /// Look up a type by full name (`Namespace.Name`)
    pub fn get_by_fullname(&self, fullname: &str) -> Option<RuntimeTypeRc> {
        let token = *self.types_by_fullname.get(fullname)?;
        self.get(&token)
    }

    /// Look up a type by full name
    ///
    /// # Errors
    /// Returns [`Error::TypeNotFound`] if no such type is registered.
    pub fn resolve(&self, fullname: &str) -> Result<RuntimeTypeRc> {
        self.get_by_fullname(fullname)
            .ok_or_else(|| Error::TypeNotFound(fullname.to_string()))
    }

    /// All types with the given simple name, across namespaces
    pub fn get_by_name(&self, name: &str) -> Vec<RuntimeTypeRc> {
        match self.types_by_name.get(name) {
            Some(tokens) => tokens.iter().filter_map(|token| self.get(token)).collect(),
            None => Vec::new(),
        }
    }

    /// Runtime type of a value; `None` for `Null`
    pub fn type_of(&self, value: &Value) -> Option<RuntimeTypeRc> {
        match value {
            Value::Null => None,
            Value::String(_) => Some(self.string()),
            Value::Holder(holder) => self.type_of(&holder.get()),
            other => match PrimitiveKind::of(other) {
                Some(kind) => Some(self.get_primitive(kind)),
                None => other.runtime_type(),
            },
        }
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if no types are registered
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Iterator over all types, ordered by token
    pub fn iter(&self) -> crossbeam_skiplist::map::Iter<'_, Token, RuntimeTypeRc> {
        self.types.iter()
    }

    /// All types, ordered by token
    pub fn all_types(&self) -> Vec<RuntimeTypeRc> {
        self.types.iter().map(|entry| entry.value().clone()).collect()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
