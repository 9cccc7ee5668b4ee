//! Core plugin resolver: wraps the `BuiltInRegistry` as a `PluginResolver`.
//!
//! This makes all built-in objects (Math, JSON, String, etc.) available
//! through the super-global scope's lazy resolution mechanism.

use std::rc::Rc;

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::object::{FunctionKind, JsObject, ObjectKind, CLASS_OBJECT};
use crate::runner::ds::value::JsValue;
use crate::runner::plugin::registry::BuiltInRegistry;
use crate::runner::plugin::resolver::PluginResolver;
use crate::runner::plugin::types::EvalContext;

/// Wraps a `BuiltInRegistry` as a `PluginResolver`.
///
/// Constructors (`Array`, `Object`, `Error`, ...) materialize as function
/// objects whose `prototype` is the matching intrinsic prototype. Namespaces
/// without a constructor (`Math`, `JSON`, `console`) materialize as proxy
/// objects. In both cases static methods are dispatched back to the registry.
pub struct CorePluginResolver {
    registry: Rc<BuiltInRegistry>,
}

impl CorePluginResolver {
    pub fn new(registry: Rc<BuiltInRegistry>) -> Self {
        CorePluginResolver { registry }
    }

    pub fn registry(&self) -> &BuiltInRegistry {
        &self.registry
    }
}

impl PluginResolver for CorePluginResolver {
    fn has_binding(&self, name: &str) -> bool {
        self.registry.has_binding(name)
    }

    fn resolve(&self, name: &str, ctx: &mut EvalContext) -> Result<JsValue, JErrorType> {
        if let Some(value) = self.registry.get_constant(name) {
            return Ok(value.clone());
        }
        if self.registry.get_function(name).is_some() {
            return Ok(ctx.realm.new_function(FunctionKind::SuperGlobal {
                object: None,
                name: name.to_string(),
            }));
        }
        let builtin = self
            .registry
            .get_object(name)
            .ok_or_else(|| JErrorType::ReferenceError(format!("{} is not defined", name)))?;

        let value = if builtin.constructor.is_some() {
            let f = ctx.realm.new_function(FunctionKind::SuperGlobal {
                object: None,
                name: name.to_string(),
            });
            if let (JsValue::Object(o), Some(proto)) = (&f, ctx.realm.prototype_for(name)) {
                if let ObjectKind::Function(func) = &mut o.borrow_mut().kind {
                    func.prototype_property = Some(proto);
                }
            }
            f
        } else {
            let proxy = JsObject::new(
                ObjectKind::HostProxy(name.to_string()),
                Some(ctx.realm.object_prototype.clone()),
                CLASS_OBJECT,
            );
            JsValue::Object(proxy.into_ref())
        };

        if let JsValue::Object(o) = &value {
            let mut o = o.borrow_mut();
            for (prop_name, prop_value) in &builtin.properties {
                o.properties.insert(prop_name.clone(), prop_value.clone());
            }
        }
        Ok(value)
    }

    fn has_method(&self, object_name: &str, method_name: &str) -> bool {
        self.registry.has_method(object_name, method_name)
    }

    fn call_method(
        &self,
        object_name: &str,
        method_name: &str,
        ctx: &mut EvalContext,
        this: JsValue,
        args: Vec<JsValue>,
    ) -> Option<Result<JsValue, JErrorType>> {
        self.registry
            .get_method(object_name, method_name)
            .map(|builtin_fn| builtin_fn(ctx, this, args))
    }

    fn call_function(
        &self,
        name: &str,
        ctx: &mut EvalContext,
        this: JsValue,
        args: Vec<JsValue>,
    ) -> Option<Result<JsValue, JErrorType>> {
        if let Some(f) = self.registry.get_function(name) {
            return Some(f(ctx, this, args));
        }
        // `String(x)`, `Array(3)` and friends behave like their constructor.
        self.registry
            .get_constructor(name)
            .map(|ctor_fn| ctor_fn(ctx, JsValue::Undefined, args))
    }

    fn call_constructor(
        &self,
        object_name: &str,
        ctx: &mut EvalContext,
        args: Vec<JsValue>,
    ) -> Option<Result<JsValue, JErrorType>> {
        self.registry
            .get_constructor(object_name)
            .map(|ctor_fn| ctor_fn(ctx, JsValue::Undefined, args))
    }

    fn name(&self) -> &str {
        "core"
    }
}
