//! The composition root of the bridge.

use super::adapter::ValueAdapter;
use super::capabilities::{CapabilityCache, capability_overloads};
use super::functions::{FunctionBinder, IntoNativeFunction, NativeFunction, ResultShape};
use super::vars::VariableStore;
use super::RegistrationError;
use crate::api::{
    Activation, BuiltinAdapter, BuiltinProvider, EnvOptions, FunctionDecl, TypeAdapter,
    TypeProvider, VariableDecl,
};
use crate::evaluator::EvalError;
use crate::reflect::{HostKind, HostType, Reflect, Typed};
use crate::types::Type;
use crate::values::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Configuration of a [`Registry`].
#[derive(Clone)]
pub struct RegistryOptions {
    pub library_name: String,
    /// Naming convention for struct fields. Empty uses field identifiers.
    pub tag_name: String,
    /// Fallback for names and types the registry doesn't know.
    pub provider: Option<Arc<dyn TypeProvider>>,
    /// Fallback for values the generic rules don't cover.
    pub adapter: Option<Arc<dyn TypeAdapter>>,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        RegistryOptions {
            library_name: "hostbind".to_string(),
            tag_name: String::new(),
            provider: None,
            adapter: None,
        }
    }
}

impl RegistryOptions {
    pub fn with_tag_name(mut self, tag_name: &str) -> Self {
        self.tag_name = tag_name.to_string();
        self
    }

    pub fn with_library_name(mut self, library_name: &str) -> Self {
        self.library_name = library_name.to_string();
        self
    }
}

/// Something [`Registry::register`] accepts: a host function or a value.
pub enum Registration {
    Function(NativeFunction),
    Value(Box<dyn Reflect>),
}

impl From<NativeFunction> for Registration {
    fn from(f: NativeFunction) -> Self {
        Registration::Function(f)
    }
}

impl<T: Reflect> From<T> for Registration {
    fn from(value: T) -> Self {
        Registration::Value(Box::new(value))
    }
}

/// Collects host values, functions and types for the engine.
///
/// Registration needs `&mut self`. Once done, wrap the registry in an `Arc`
/// and hand [`compile_options`](Registry::compile_options) to
/// [`Env::new`](crate::api::Env::new); the registry then serves as type
/// provider, type adapter and global activation.
///
/// # Example
///
/// ```
/// use hostbind_core::Native;
/// use hostbind_core::api::{Env, EmptyActivation};
/// use hostbind_core::bridge::{Registry, RegistryOptions};
/// use hostbind_core::syntax::Expr;
/// use hostbind_core::values::Value;
/// use std::sync::Arc;
///
/// #[derive(Clone, Native)]
/// pub struct Point {
///     #[native(json = "x")]
///     pub x: i64,
///     #[native(json = "y")]
///     pub y: i64,
/// }
///
/// let mut registry = Registry::new(RegistryOptions::default().with_tag_name("json"));
/// registry.register("p", Point { x: 2, y: 3 }).unwrap();
/// let registry = Arc::new(registry);
///
/// let env = Env::new(registry.compile_options());
/// let expr = Expr::add(Expr::ident("p").field("x"), Expr::ident("p").field("y"));
/// let result = env.compile(&expr).unwrap().eval(&EmptyActivation).unwrap();
/// assert_eq!(result, Value::Int(5));
/// ```
pub struct Registry {
    library_name: String,
    adapter: ValueAdapter,
    base_provider: Arc<dyn TypeProvider>,
    functions: FunctionBinder,
    capabilities: CapabilityCache,
    vars: VariableStore,
    /// Native struct types by qualified name.
    native_types: BTreeMap<String, HostType>,
    /// Every registered object type by name.
    object_types: BTreeMap<String, Type>,
}

static_assertions::assert_impl_all!(Registry: Send, Sync);

impl Registry {
    pub fn new(options: RegistryOptions) -> Self {
        let base_adapter: Arc<dyn TypeAdapter> = match options.adapter {
            Some(adapter) => adapter,
            None => Arc::new(BuiltinAdapter),
        };
        let base_provider: Arc<dyn TypeProvider> = match options.provider {
            Some(provider) => provider,
            None => Arc::new(BuiltinProvider),
        };
        Registry {
            library_name: options.library_name,
            adapter: ValueAdapter::new(&options.tag_name, base_adapter),
            base_provider,
            functions: FunctionBinder::new(),
            capabilities: CapabilityCache::new(),
            vars: VariableStore::new(),
            native_types: BTreeMap::new(),
            object_types: BTreeMap::new(),
        }
    }

    pub fn library_name(&self) -> &str {
        &self.library_name
    }

    pub fn adapter(&self) -> &ValueAdapter {
        &self.adapter
    }

    /// Registers a host function or value under `name`.
    ///
    /// Functions become global overloads. Values are adapted and stored with
    /// their type hint or their mapped type; a name already in use is
    /// silently kept.
    pub fn register(
        &mut self,
        name: &str,
        item: impl Into<Registration>,
    ) -> Result<(), RegistrationError> {
        match item.into() {
            Registration::Function(f) => self.bind(name, &f, false),
            Registration::Value(v) => self.register_value(name, v),
        }
    }

    fn register_value(&mut self, name: &str, value: Box<dyn Reflect>) -> Result<(), RegistrationError> {
        if self.vars.contains(name) {
            debug!(name, "Ignoring duplicate registration");
            return Ok(());
        }
        let host = value.reflect_type();
        let ty = match value.type_hint() {
            Some(ty) => ty,
            None => self.adapter.engine_type(&host)?,
        };
        let adapted = self.adapter.adapt_boxed(value);
        if let Some(err) = adapted.as_error() {
            return Err(RegistrationError::Adaptation(err.clone()));
        }
        self.register_reachable(&host);
        debug!(name, ty = %ty, "Registered value");
        self.vars.insert(name, ty, Some(adapted));
        Ok(())
    }

    /// Makes struct type `T` (possibly behind pointers) known to expressions.
    pub fn register_type<T: Typed>(&mut self) -> Result<(), RegistrationError> {
        let host = T::host_type();
        if !host.is_struct_like() {
            return Err(RegistrationError::NotAStruct(host.name().to_string()));
        }
        self.register_reachable(&host);
        Ok(())
    }

    /// Registers the type of an object value and wires the operators its
    /// capabilities support.
    pub fn register_object_type(&mut self, value: &Value) -> Result<(), RegistrationError> {
        let Some(obj) = value.as_object() else {
            return Err(RegistrationError::NotAnObject(value.ty().to_string()));
        };
        let ty = obj.object_type();
        let caps = self.capabilities.detect(obj);
        for (function, overload) in capability_overloads(&ty, caps) {
            self.functions.add_overload(function, overload);
        }
        if let Some(object) = ty.as_object() {
            debug!(ty = %ty, caps = ?caps, "Registered object type");
            self.object_types.insert(object.name.to_string(), ty.clone());
        }
        Ok(())
    }

    pub fn register_function<Args>(
        &mut self,
        name: &str,
        f: impl IntoNativeFunction<Args>,
    ) -> Result<(), RegistrationError> {
        self.bind(name, &f.into_native(), false)
    }

    /// Registers a member function; the receiver is the first parameter.
    pub fn register_method<Args>(
        &mut self,
        name: &str,
        f: impl IntoNativeFunction<Args>,
    ) -> Result<(), RegistrationError> {
        self.bind(name, &f.into_native(), true)
    }

    fn bind(&mut self, name: &str, f: &NativeFunction, member: bool) -> Result<(), RegistrationError> {
        self.functions.bind(name, f, member, &self.adapter)?;
        for param in f.params() {
            self.register_reachable(param);
        }
        if let ResultShape::Single(result) | ResultShape::Fallible(result) = f.result() {
            self.register_reachable(result);
        }
        Ok(())
    }

    /// Adapts every `T` with `convert` instead of the generic rules.
    ///
    /// `ty` is the engine type the conversion produces.
    pub fn register_conversion<T, F>(&mut self, ty: Type, convert: F) -> Result<(), RegistrationError>
    where
        T: Reflect + Typed,
        F: Fn(&T) -> Value + Send + Sync + 'static,
    {
        self.adapter.add_rule::<T, F>(ty, convert)
    }

    /// Declares `name` with the type of `T`. The value is supplied by the
    /// activation at evaluation time.
    pub fn register_variable<T: Typed>(&mut self, name: &str) -> Result<(), RegistrationError> {
        if self.vars.contains(name) {
            return Err(RegistrationError::DuplicateVariable(name.to_string()));
        }
        let host = T::host_type();
        let ty = self.adapter.engine_type(&host)?;
        self.register_reachable(&host);
        debug!(name, ty = %ty, "Declared variable");
        self.vars.insert(name, ty, None);
        Ok(())
    }

    /// Registers the struct types reachable from `host` through pointers,
    /// collections and fields.
    fn register_reachable(&mut self, host: &HostType) {
        let host = host.deref();
        if self.adapter.has_rule(host) {
            return;
        }
        match host.kind() {
            HostKind::List { elem, .. } => self.register_reachable(elem),
            HostKind::Map { key, value } => {
                self.register_reachable(key);
                self.register_reachable(value);
            }
            HostKind::Struct(_) => {
                let name = host.qualified_name();
                if self.native_types.contains_key(&name) {
                    return;
                }
                let Ok(ty) = self.adapter.engine_type(host) else {
                    return;
                };
                debug!(name = %name, "Registered struct type");
                self.native_types.insert(name.clone(), host.clone());
                self.object_types.insert(name, ty);
                for field in self.adapter.fields(host).values() {
                    self.register_reachable(&field.host);
                }
            }
            _ => {}
        }
    }

    /// Overloads registered under `name`.
    pub fn overloads(&self, name: &str) -> &[crate::api::OverloadDecl] {
        self.functions.overloads(name)
    }

    pub fn function_decls(&self) -> Vec<FunctionDecl> {
        self.functions.declarations()
    }

    pub fn variable_decls(&self) -> Vec<VariableDecl> {
        self.vars.declarations()
    }

    /// Registered object types, sorted by name.
    pub fn types(&self) -> Vec<Type> {
        self.object_types.values().cloned().collect()
    }

    /// Everything the engine needs to build an environment over this
    /// registry. Declarations are sorted by name.
    pub fn compile_options(self: &Arc<Self>) -> EnvOptions {
        EnvOptions {
            types: self.types(),
            functions: self.function_decls(),
            variables: self.variable_decls(),
            provider: Some(self.clone() as Arc<dyn TypeProvider>),
            adapter: Some(self.clone() as Arc<dyn TypeAdapter>),
            globals: Some(self.clone() as Arc<dyn Activation + Send + Sync>),
            ..Default::default()
        }
    }
}

impl TypeAdapter for Registry {
    fn native_to_value(&self, value: &dyn Reflect) -> Value {
        self.adapter.native_to_value(value)
    }
}

impl TypeProvider for Registry {
    fn find_ident(&self, name: &str) -> Option<Value> {
        match self.object_types.get(name) {
            Some(ty) => Some(Value::Type(ty.clone())),
            None => self.base_provider.find_ident(name),
        }
    }

    fn find_struct_type(&self, name: &str) -> Option<Type> {
        match self.object_types.get(name) {
            Some(ty) => Some(ty.clone()),
            None => self.base_provider.find_struct_type(name),
        }
    }

    fn find_field_type(&self, type_name: &str, field: &str) -> Option<Type> {
        match self.native_types.get(type_name) {
            Some(host) => self.adapter.field_type(host, field),
            None if self.object_types.contains_key(type_name) => None,
            None => self.base_provider.find_field_type(type_name, field),
        }
    }

    /// Builds a registered struct from its default, assigning each field.
    fn new_value(&self, type_name: &str, fields: &[(String, Value)]) -> Value {
        let Some(host) = self.native_types.get(type_name) else {
            return self.base_provider.new_value(type_name, fields);
        };
        let Some(construct) = host.as_struct().and_then(|info| info.construct) else {
            return Value::error(EvalError::UnsupportedType(format!(
                "type '{type_name}' cannot be constructed"
            )));
        };
        let field_map = self.adapter.fields(host);
        let mut object = construct();
        for (name, value) in fields {
            let Some(field) = field_map.get(name) else {
                return Value::error(EvalError::NoSuchField(name.clone()));
            };
            if let Err(e) = (field.info.set)(&mut *object, value) {
                return Value::error(e);
            }
        }
        self.adapter.adapt_boxed(object)
    }
}

impl Activation for Registry {
    fn resolve(&self, name: &str) -> Option<Value> {
        self.vars.resolve(name)
    }
}
