//! Core types for the plugin architecture.

use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use indexmap::IndexMap;

use crate::runner::ds::env_record::Scope;
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::execution_context::ExecutionBudget;
use crate::runner::ds::object::FunctionKind;
use crate::runner::ds::realm::CodeRealm;
use crate::runner::ds::value::JsValue;
use crate::runner::plugin::core_resolver::CorePluginResolver;
use crate::runner::plugin::registry::BuiltInRegistry;
use crate::runner::plugin::resolver::PluginResolver;
use crate::runner::plugin::super_global::SuperGlobalEnvironment;

/// Default ceiling on nested function calls.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 256;

/// Seed of the `Math.random` sequence; every context starts from it.
const RANDOM_SEED: u64 = 0x2545_F491_4F6C_DD1D;

/// Execution context shared by the interpreter and native functions.
///
/// It owns the global scope, the intrinsic prototypes, the super-global
/// resolvers and the execution budget.
pub struct EvalContext {
    pub realm: CodeRealm,
    pub global_this: JsValue,
    global_scope: Rc<Scope>,
    current_scope: Rc<Scope>,
    this_stack: Vec<JsValue>,
    super_global: SuperGlobalEnvironment,
    builtins: Rc<BuiltInRegistry>,
    method_cache: HashMap<(String, String), JsValue>,
    budget: ExecutionBudget,
    call_depth: usize,
    max_call_depth: usize,
    random_state: u64,
}

impl EvalContext {
    pub fn new() -> Self {
        let realm = CodeRealm::new();
        let global_this = realm.new_object_value();
        let global_scope = Scope::new_global();
        EvalContext {
            realm,
            global_this,
            current_scope: global_scope.clone(),
            global_scope,
            this_stack: Vec::new(),
            super_global: SuperGlobalEnvironment::new(),
            builtins: Rc::new(BuiltInRegistry::new()),
            method_cache: HashMap::new(),
            budget: ExecutionBudget::unlimited(),
            call_depth: 0,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            random_state: RANDOM_SEED,
        }
    }

    /// Makes the registry's objects available through the super-global scope.
    pub fn install_core_builtins(&mut self, registry: BuiltInRegistry) {
        let registry = Rc::new(registry);
        self.builtins = registry.clone();
        self.super_global
            .add_resolver(Rc::new(CorePluginResolver::new(registry)));
    }

    /// Registers a resolver queried after the ones already installed.
    pub fn add_resolver(&mut self, resolver: Rc<dyn PluginResolver>) {
        self.super_global.add_resolver(resolver);
    }

    pub fn builtins(&self) -> &Rc<BuiltInRegistry> {
        &self.builtins
    }

    // ===== Scopes =====

    pub fn global_scope(&self) -> &Rc<Scope> {
        &self.global_scope
    }

    pub fn current_scope(&self) -> &Rc<Scope> {
        &self.current_scope
    }

    /// Installs `scope` as the running scope and returns the previous one.
    pub fn replace_scope(&mut self, scope: Rc<Scope>) -> Rc<Scope> {
        std::mem::replace(&mut self.current_scope, scope)
    }

    pub fn push_block_scope(&mut self) {
        let block = Scope::new_block(self.current_scope.clone());
        self.current_scope = block;
    }

    pub fn pop_block_scope(&mut self) {
        if let Some(outer) = self.current_scope.outer().cloned() {
            self.current_scope = outer;
        }
    }

    pub fn this_value(&self) -> JsValue {
        self.this_stack
            .last()
            .cloned()
            .unwrap_or_else(|| self.global_this.clone())
    }

    pub fn push_this(&mut self, this: JsValue) {
        self.this_stack.push(this);
    }

    pub fn pop_this(&mut self) {
        self.this_stack.pop();
    }

    // ===== Bindings =====

    /// Looks a name up through the scope chain, then the super-global scope.
    pub fn get_binding(&mut self, name: &str) -> Result<JsValue, JErrorType> {
        if let Some(scope) = self.current_scope.resolve(name) {
            return Ok(scope.get_own_binding(name).unwrap_or(JsValue::Undefined));
        }
        match self.resolve_super_global(name) {
            Some(result) => result,
            None => Err(JErrorType::ReferenceError(format!("{} is not defined", name))),
        }
    }

    pub fn has_binding(&self, name: &str) -> bool {
        self.current_scope.resolve(name).is_some() || self.super_global.has_binding(name)
    }

    /// Assigns to an existing binding, or creates a global one.
    pub fn set_binding(&mut self, name: &str, value: JsValue) -> Result<(), JErrorType> {
        match self.current_scope.resolve(name) {
            Some(scope) => scope.set_own_binding(name, value).map(|_| ()),
            None => {
                self.global_scope.declare(name, value, true);
                Ok(())
            }
        }
    }

    /// Creates or replaces a mutable binding in the global scope.
    pub fn declare_global(&mut self, name: &str, value: JsValue) {
        self.global_scope.declare(name, value, true);
    }

    pub fn get_global(&self, name: &str) -> Option<JsValue> {
        self.global_scope.get_own_binding(name)
    }

    // ===== Super-global =====

    pub fn resolve_super_global(&mut self, name: &str) -> Option<Result<JsValue, JErrorType>> {
        if let Some(v) = self.super_global.get_cached(name) {
            return Some(Ok(v));
        }
        let (index, resolver) = self.super_global.find_resolver(name)?;
        let result = resolver.resolve(name, self);
        if let Ok(v) = &result {
            self.super_global.store(name, index, v.clone());
        }
        Some(result)
    }

    /// Makes the next read of `name` resolve a fresh value.
    pub fn forget_super_global(&mut self, name: &str) {
        self.super_global.forget(name);
    }

    /// The resolver that owns `name`, if any.
    pub fn super_global_resolver(&self, name: &str) -> Option<Rc<dyn PluginResolver>> {
        self.super_global.find_resolver(name).map(|(_, r)| r)
    }

    /// A function value for `object.method` when a resolver provides it.
    pub fn super_global_method(&mut self, object: &str, method: &str) -> Option<JsValue> {
        let cache_key = (object.to_string(), method.to_string());
        if let Some(f) = self.method_cache.get(&cache_key) {
            return Some(f.clone());
        }
        let resolver = self.super_global_resolver(object)?;
        if !resolver.has_method(object, method) {
            return None;
        }
        let f = self.realm.new_function(FunctionKind::SuperGlobal {
            object: Some(object.to_string()),
            name: method.to_string(),
        });
        self.method_cache.insert(cache_key, f.clone());
        Some(f)
    }

    /// A function value for a native prototype method of `class_name`.
    pub fn intrinsic_method(&mut self, class_name: &'static str, method: &str) -> Option<JsValue> {
        let cache_key = (format!("{}.prototype", class_name), method.to_string());
        if let Some(f) = self.method_cache.get(&cache_key) {
            return Some(f.clone());
        }
        self.builtins.get_prototype_method(class_name, method)?;
        let f = self.realm.new_function(FunctionKind::Intrinsic {
            class_name,
            method: method.to_string(),
        });
        self.method_cache.insert(cache_key, f.clone());
        Some(f)
    }

    // ===== Execution budget =====

    pub fn set_execution_limit(&mut self, limit: Option<Duration>) {
        self.budget.reset(limit);
    }

    pub fn set_max_call_depth(&mut self, depth: usize) {
        self.max_call_depth = depth;
    }

    pub fn tick(&mut self) -> Result<(), JErrorType> {
        self.budget.tick()
    }

    /// Accounts for entering a function call.
    pub fn enter_call(&mut self) -> Result<(), JErrorType> {
        self.budget.tick()?;
        if self.call_depth >= self.max_call_depth {
            return Err(JErrorType::RangeError(
                "Maximum call stack size exceeded".to_string(),
            ));
        }
        self.call_depth += 1;
        Ok(())
    }

    pub fn exit_call(&mut self) {
        self.call_depth = self.call_depth.saturating_sub(1);
    }

    /// Next value of a deterministic xorshift sequence in `[0, 1)`.
    pub fn next_random(&mut self) -> f64 {
        let mut x = self.random_state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.random_state = x;
        (x.wrapping_mul(0x2545_F491_4F6C_DD1D) >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Returns to the global scope after a script aborted mid-call.
    pub fn reset_execution_state(&mut self) {
        self.current_scope = self.global_scope.clone();
        self.this_stack.clear();
        self.call_depth = 0;
    }
}

impl Default for EvalContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Function signature for built-in methods.
/// Native functions receive the evaluation context, `this` value, and arguments.
pub type NativeFn = fn(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType>;

/// Built-in object definition.
/// Represents a JavaScript built-in object like Array, Object, String, etc.
pub struct BuiltInObject {
    /// Name of the object (e.g., "Array", "Object", "Math").
    pub name: String,

    /// Parent prototype name, if any (e.g., "Object" for most built-ins).
    pub prototype: Option<String>,

    /// Methods defined on the object itself, like `Object.keys`.
    pub methods: HashMap<String, NativeFn>,

    /// Methods seen by instances, like `Array.prototype.map`.
    pub prototype_methods: HashMap<String, NativeFn>,

    /// Static properties.
    pub properties: IndexMap<String, JsValue>,

    /// Constructor function, if this object is constructable.
    pub constructor: Option<NativeFn>,
}

impl BuiltInObject {
    /// Create a new built-in object with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        BuiltInObject {
            name: name.into(),
            prototype: Some("Object".to_string()),
            methods: HashMap::new(),
            prototype_methods: HashMap::new(),
            properties: IndexMap::new(),
            constructor: None,
        }
    }

    /// Set the prototype chain parent.
    pub fn with_prototype(mut self, prototype: impl Into<String>) -> Self {
        self.prototype = Some(prototype.into());
        self
    }

    /// Set no prototype (for objects like Object.prototype itself).
    pub fn with_no_prototype(mut self) -> Self {
        self.prototype = None;
        self
    }

    /// Add a static method.
    pub fn add_method(mut self, name: impl Into<String>, func: NativeFn) -> Self {
        self.methods.insert(name.into(), func);
        self
    }

    /// Add a method reachable from instances.
    pub fn add_prototype_method(mut self, name: impl Into<String>, func: NativeFn) -> Self {
        self.prototype_methods.insert(name.into(), func);
        self
    }

    /// Add a property.
    pub fn add_property(mut self, name: impl Into<String>, value: JsValue) -> Self {
        self.properties.insert(name.into(), value);
        self
    }

    /// Set the constructor function.
    pub fn with_constructor(mut self, constructor: NativeFn) -> Self {
        self.constructor = Some(constructor);
        self
    }
}
