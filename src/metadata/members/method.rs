use std::sync::Arc;

use dashmap::DashMap;

use crate::{
    metadata::{
        members::Param,
        token::{TableId, Token},
        typesystem::{RuntimeTypeRc, RuntimeTypeRef, TypeFlavor, TypeRegistry},
        value::Value,
    },
    Error, Result,
};

/// A vector that holds a list of `Method`
pub type MethodList = Arc<boxcar::Vec<MethodRc>>;
/// Reference to a `Method`
pub type MethodRc = Arc<Method>;

/// Native implementation of a method, constructor or property accessor
pub type MethodBody = Arc<dyn Fn(Invocation<'_>) -> Result<Value> + Send + Sync>;

/// Name shared by all constructors
pub const CONSTRUCTOR_NAME: &str = ".ctor";

#[allow(non_snake_case)]
/// All possible flags for `MethodAttributes`
pub mod MethodAttributes {
    /// Use this mask to retrieve accessibility information
    pub const MEMBER_ACCESS_MASK: u32 = 0x0007;
    /// Member not referenceable
    pub const COMPILER_CONTROLLED: u32 = 0x0000;
    /// Accessible only by the parent type
    pub const PRIVATE: u32 = 0x0001;
    /// Accessible by sub-types only in this Assembly
    pub const FAM_AND_ASSEM: u32 = 0x0002;
    /// Accessibly by anyone in the Assembly
    pub const ASSEM: u32 = 0x0003;
    /// Accessible only by type and sub-types
    pub const FAMILY: u32 = 0x0004;
    /// Accessibly by sub-types anywhere, plus anyone in assembly
    pub const FAM_OR_ASSEM: u32 = 0x0005;
    /// Accessibly by anyone who has visibility to this scope
    pub const PUBLIC: u32 = 0x0006;
    /// Defined on type, else per instance
    pub const STATIC: u32 = 0x0010;
    /// Method may not be overridden
    pub const FINAL: u32 = 0x0020;
    /// Method is virtual
    pub const VIRTUAL: u32 = 0x0040;
    /// Method hides by name+sig, else just by name
    pub const HIDE_BY_SIG: u32 = 0x0080;
    /// Method always gets a new slot in the vtable
    pub const NEW_SLOT: u32 = 0x0100;
    /// Method does not provide an implementation
    pub const ABSTRACT: u32 = 0x0400;
    /// Method is special
    pub const SPECIAL_NAME: u32 = 0x0800;
    /// CLI provides 'special' behavior, depending upon the name of the method
    pub const RTSPECIAL_NAME: u32 = 0x1000;
}

/// The call frame handed to a [`MethodBody`].
///
/// `this` is an object, a holder around a struct, or `Null` for static members. Arguments
/// are already narrowed to the declared parameter types; writes to by-ref arguments are
/// visible to the caller after the call returns.
pub struct Invocation<'a> {
    /// The target instance
    pub this: &'a Value,
    /// The arguments, in declaration order
    pub args: &'a mut [Value],
    /// Type arguments of a generic method instantiation
    pub generic_args: &'a [RuntimeTypeRc],
}

impl Invocation<'_> {
    /// Returns the argument at `index`
    ///
    /// # Errors
    /// Returns [`Error::ArgumentCount`] if there is no such argument.
    pub fn arg(&self, index: usize) -> Result<&Value> {
        self.args.get(index).ok_or(Error::ArgumentCount {
            expected: index + 1,
            actual: self.args.len(),
        })
    }

    /// Replaces the argument at `index`, used by by-ref parameters
    ///
    /// # Errors
    /// Returns [`Error::ArgumentCount`] if there is no such argument.
    pub fn set_arg(&mut self, index: usize, value: impl Into<Value>) -> Result<()> {
        let length = self.args.len();
        match self.args.get_mut(index) {
            Some(slot) => {
                *slot = value.into();
                Ok(())
            }
            None => Err(Error::ArgumentCount {
                expected: index + 1,
                actual: length,
            }),
        }
    }

    /// Reads an instance slot of `this`
    ///
    /// # Errors
    /// See [`Value::load_slot`].
    pub fn load(&self, slot: usize) -> Result<Value> {
        self.this.load_slot(slot)
    }

    /// Writes an instance slot of `this`
    ///
    /// # Errors
    /// See [`Value::store_slot`].
    pub fn store(&self, slot: usize, value: impl Into<Value>) -> Result<()> {
        self.this.store_slot(slot, value.into())
    }

    /// Reads a field of `this` by name, resolved on its runtime type. The name of an
    /// auto-property resolves to its backing field.
    ///
    /// # Errors
    /// Returns [`Error::FieldNotFound`] if the runtime type has no such field.
    pub fn get(&self, name: &str) -> Result<Value> {
        let (ty, field) = self.this_field(name)?;
        if field.is_static() {
            ty.load_static(field.slot)
        } else {
            self.this.load_slot(field.slot)
        }
    }

    /// Writes a field of `this` by name, narrowing the value to the field type
    ///
    /// # Errors
    /// Returns [`Error::FieldNotFound`] if the runtime type has no such field, or
    /// [`Error::InvalidArgument`] if the value does not fit the field.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        let (ty, field) = self.this_field(name)?;
        let value = value.into().coerce_to(&field.field_type)?;
        if field.is_static() {
            ty.store_static(field.slot, value)
        } else {
            self.this.store_slot(field.slot, value)
        }
    }

    fn this_field(&self, name: &str) -> Result<(RuntimeTypeRc, crate::metadata::members::FieldRc)> {
        let ty = self
            .this
            .runtime_type()
            .ok_or_else(|| Error::NullTarget(name.to_string()))?;
        let field = ty.find_field(name).or_else(|| {
            ty.find_field(&crate::metadata::typesystem::backing_field_name(name))
        });
        match field {
            Some(field) => {
                let declaring = field.declaring_type.get()?;
                Ok((declaring, field))
            }
            None => Err(Error::FieldNotFound {
                type_name: ty.fullname(),
                name: name.to_string(),
            }),
        }
    }
}

/// A method or constructor declared on a `RuntimeType`
pub struct Method {
    /// Token
    pub token: Token,
    /// Name (`.ctor` for constructors)
    pub name: String,
    /// Flags (a bitmask of `MethodAttributes`)
    pub flags: u32,
    /// Parameters in declaration order
    pub params: Vec<Param>,
    /// Return type, `None` for void
    pub return_type: Option<RuntimeTypeRc>,
    /// The type declaring this method
    pub declaring_type: RuntimeTypeRef,
    /// Names of the generic parameters of a generic method definition
    pub generic_params: Vec<String>,
    /// Type arguments of a generic method instantiation
    pub generic_args: Vec<RuntimeTypeRc>,
    /// The implementation; `None` for abstract methods
    pub body: Option<MethodBody>,
    /// Instantiations of this generic method definition, by type argument tokens
    instances: DashMap<Vec<Token>, MethodRc>,
}

impl Method {
    /// Create a new `Method`
    pub fn new(
        token: Token,
        name: String,
        flags: u32,
        params: Vec<Param>,
        return_type: Option<RuntimeTypeRc>,
        declaring_type: RuntimeTypeRef,
        generic_params: Vec<String>,
        body: Option<MethodBody>,
    ) -> Self {
        Method {
            token,
            name,
            flags,
            params,
            return_type,
            declaring_type,
            generic_params,
            generic_args: Vec::new(),
            body,
            instances: DashMap::new(),
        }
    }

    /// Returns true for static methods
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.flags & MethodAttributes::STATIC != 0
    }

    /// Returns true for public methods
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.flags & MethodAttributes::MEMBER_ACCESS_MASK == MethodAttributes::PUBLIC
    }

    /// Returns true for virtual methods
    #[must_use]
    pub fn is_virtual(&self) -> bool {
        self.flags & MethodAttributes::VIRTUAL != 0
    }

    /// Returns true for methods that start a new slot (`new` in C#) instead of overriding
    #[must_use]
    pub fn is_new_slot(&self) -> bool {
        self.flags & MethodAttributes::NEW_SLOT != 0
    }

    /// Returns true for sealed virtual methods
    #[must_use]
    pub fn is_final(&self) -> bool {
        self.flags & MethodAttributes::FINAL != 0
    }

    /// Returns true for abstract methods
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.flags & MethodAttributes::ABSTRACT != 0
    }

    /// Returns true for property accessors and other special methods
    #[must_use]
    pub fn is_special_name(&self) -> bool {
        self.flags & MethodAttributes::SPECIAL_NAME != 0
    }

    /// Returns true for constructors
    #[must_use]
    pub fn is_constructor(&self) -> bool {
        self.name == CONSTRUCTOR_NAME
    }

    /// Returns true for generic method definitions that still need type arguments
    #[must_use]
    pub fn is_generic_definition(&self) -> bool {
        !self.generic_params.is_empty() && self.generic_args.is_empty()
    }

    /// Returns true if this method overrides `base`: both virtual, same name and signature,
    /// and this method does not start a new slot
    #[must_use]
    pub fn overrides(&self, base: &Method) -> bool {
        self.is_virtual()
            && !self.is_new_slot()
            && base.is_virtual()
            && self.name == base.name
            && self.same_signature(base)
    }

    /// Returns true if both methods take the same parameter types
    #[must_use]
    pub fn same_signature(&self, other: &Method) -> bool {
        self.params.len() == other.params.len()
            && self
                .params
                .iter()
                .zip(other.params.iter())
                .all(|(ours, theirs)| ours.param_type.token == theirs.param_type.token)
    }

    /// The declared parameter types
    #[must_use]
    pub fn param_types(&self) -> Vec<RuntimeTypeRc> {
        self.params.iter().map(|param| param.param_type.clone()).collect()
    }

    /// The declaring type, if it is still alive
    #[must_use]
    pub fn declaring_type(&self) -> Option<RuntimeTypeRc> {
        self.declaring_type.upgrade()
    }

    /// Readable signature, e.g. `Greet(System.String)`
    #[must_use]
    pub fn signature(&self) -> String {
        format_signature(&self.name, &self.param_types())
    }
}

/// Formats a name and parameter list the way signatures appear in error messages
#[must_use]
pub fn format_signature(name: &str, params: &[RuntimeTypeRc]) -> String {
    let params: Vec<String> = params.iter().map(|param| param.fullname()).collect();
    format!("{}({})", name, params.join(", "))
}

/// Instantiates a generic method definition with `args`.
///
/// Generic parameters are substituted in the parameter and return types, including inside
/// array and by-ref types. Instantiations are cached on the definition, so equal type
/// arguments always yield the same `MethodRc`.
///
/// # Errors
/// Returns [`Error::Malformed`] if `method` is not a generic definition or the number of
/// type arguments does not match.
pub fn make_generic(
    registry: &TypeRegistry,
    method: &MethodRc,
    args: &[RuntimeTypeRc],
) -> Result<MethodRc> {
    if !method.is_generic_definition() {
        return Err(malformed_error!(
            "{} is not a generic method definition",
            method.signature()
        ));
    }
    if method.generic_params.len() != args.len() {
        return Err(malformed_error!(
            "{} takes {} type arguments, {} supplied",
            method.signature(),
            method.generic_params.len(),
            args.len()
        ));
    }

    let key: Vec<Token> = args.iter().map(|arg| arg.token).collect();
    if let Some(existing) = method.instances.get(&key) {
        return Ok(existing.clone());
    }

    let params = method
        .params
        .iter()
        .map(|param| Param {
            name: param.name.clone(),
            param_type: substitute(registry, &param.param_type, args),
        })
        .collect();
    let return_type = method
        .return_type
        .as_ref()
        .map(|ty| substitute(registry, ty, args));

    let mut instance = Method::new(
        registry.allocate_token(TableId::METHOD_SPEC),
        method.name.clone(),
        method.flags,
        params,
        return_type,
        method.declaring_type.clone(),
        method.generic_params.clone(),
        method.body.clone(),
    );
    instance.generic_args = args.to_vec();

    let instance = method
        .instances
        .entry(key)
        .or_insert_with(|| Arc::new(instance))
        .clone();
    Ok(instance)
}

fn substitute(registry: &TypeRegistry, ty: &RuntimeTypeRc, args: &[RuntimeTypeRc]) -> RuntimeTypeRc {
    match ty.flavor {
        TypeFlavor::GenericParameter { index } => match args.get(index) {
            Some(arg) => arg.clone(),
            None => ty.clone(),
        },
        TypeFlavor::Array => match ty.element_type() {
            Some(element) => registry.array_of(&substitute(registry, &element, args)),
            None => ty.clone(),
        },
        TypeFlavor::ByRef => match ty.element_type() {
            Some(element) => registry.by_ref(&substitute(registry, &element, args)),
            None => ty.clone(),
        },
        _ => ty.clone(),
    }
}

impl std::fmt::Debug for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Method")
            .field("token", &self.token)
            .field("signature", &self.signature())
            .field("flags", &format_args!("{:#06x}", self.flags))
            .finish()
    }
}
