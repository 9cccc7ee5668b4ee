//! Built-in registry: the native objects, functions and constants of the
//! standard library.

use std::collections::HashMap;

use super::types::{BuiltInObject, NativeFn};
use crate::runner::ds::value::JsValue;
use crate::runner::std_lib::register_core_builtins;

/// Registry for built-in objects.
/// Manages all built-in objects, their static and prototype methods, and the
/// free-standing global functions and constants.
pub struct BuiltInRegistry {
    /// All registered built-in objects.
    objects: HashMap<String, BuiltInObject>,

    /// Global functions such as `parseInt`.
    functions: HashMap<String, NativeFn>,

    /// Global constants such as `NaN`.
    constants: HashMap<String, JsValue>,
}

impl BuiltInRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        BuiltInRegistry {
            objects: HashMap::new(),
            functions: HashMap::new(),
            constants: HashMap::new(),
        }
    }

    /// Create a registry with the core built-ins.
    pub fn with_core() -> Self {
        let mut registry = Self::new();
        register_core_builtins(&mut registry);
        registry
    }

    /// Register a built-in object (programmatic API).
    pub fn register_object(&mut self, obj: BuiltInObject) {
        self.objects.insert(obj.name.clone(), obj);
    }

    pub fn register_function(&mut self, name: impl Into<String>, func: NativeFn) {
        self.functions.insert(name.into(), func);
    }

    pub fn register_constant(&mut self, name: impl Into<String>, value: JsValue) {
        self.constants.insert(name.into(), value);
    }

    /// Get a registered object by name.
    pub fn get_object(&self, name: &str) -> Option<&BuiltInObject> {
        self.objects.get(name)
    }

    /// Get a mutable reference to a registered object.
    pub fn get_object_mut(&mut self, name: &str) -> Option<&mut BuiltInObject> {
        self.objects.get_mut(name)
    }

    /// Get a static method, like `Object.keys`.
    pub fn get_method(&self, object: &str, method: &str) -> Option<NativeFn> {
        self.objects
            .get(object)
            .and_then(|obj| obj.methods.get(method).copied())
    }

    /// Get an instance method of `class_name`, following the prototype
    /// parents (`TypeError` → `Error` → `Object`).
    pub fn get_prototype_method(&self, class_name: &str, method: &str) -> Option<NativeFn> {
        let mut current = Some(class_name);
        let mut hops = 0;
        while let Some(name) = current {
            let obj = self.objects.get(name)?;
            if let Some(f) = obj.prototype_methods.get(method) {
                return Some(*f);
            }
            current = obj.prototype.as_deref();
            hops += 1;
            if hops > 8 {
                break;
            }
        }
        None
    }

    /// Get a constructor function for an object.
    pub fn get_constructor(&self, object: &str) -> Option<NativeFn> {
        self.objects.get(object).and_then(|obj| obj.constructor)
    }

    pub fn get_function(&self, name: &str) -> Option<NativeFn> {
        self.functions.get(name).copied()
    }

    pub fn get_constant(&self, name: &str) -> Option<&JsValue> {
        self.constants.get(name)
    }

    /// Check if an object exists in the registry.
    pub fn has_object(&self, name: &str) -> bool {
        self.objects.contains_key(name)
    }

    /// Whether `name` is visible to scripts as a global binding.
    pub fn has_binding(&self, name: &str) -> bool {
        self.objects.contains_key(name)
            || self.functions.contains_key(name)
            || self.constants.contains_key(name)
    }

    /// Check if a static method exists on an object.
    pub fn has_method(&self, object: &str, method: &str) -> bool {
        self.get_method(object, method).is_some()
    }
}

impl Default for BuiltInRegistry {
    fn default() -> Self {
        Self::with_core()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ds::error::JErrorType;
    use crate::runner::plugin::types::EvalContext;

    fn answer(_ctx: &mut EvalContext, _this: JsValue, _args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
        Ok(JsValue::from_i64(42))
    }

    #[test]
    fn test_prototype_methods_inherit_through_parents() {
        let mut registry = BuiltInRegistry::new();
        registry.register_object(
            BuiltInObject::new("Object")
                .with_no_prototype()
                .add_prototype_method("answer", answer),
        );
        registry.register_object(BuiltInObject::new("Error"));
        registry.register_object(BuiltInObject::new("TypeError").with_prototype("Error"));
        assert!(registry.get_prototype_method("TypeError", "answer").is_some());
        assert!(registry.get_prototype_method("TypeError", "missing").is_none());
        assert!(registry.get_method("Object", "answer").is_none());
    }

    #[test]
    fn test_bindings_cover_functions_and_constants() {
        let mut registry = BuiltInRegistry::new();
        registry.register_function("answer", answer);
        registry.register_constant("NaN", JsValue::from_f64(f64::NAN));
        assert!(registry.has_binding("answer"));
        assert!(registry.has_binding("NaN"));
        assert!(!registry.has_binding("Math"));
    }

    #[test]
    fn test_core_registry_has_standard_objects() {
        let registry = BuiltInRegistry::with_core();
        for name in ["Object", "Array", "String", "Number", "Math", "JSON", "console", "RegExp"] {
            assert!(registry.has_object(name), "{} missing", name);
        }
        assert!(registry.get_function("parseInt").is_some());
        assert!(registry.get_prototype_method("Array", "map").is_some());
        assert!(registry.get_prototype_method("Array", "hasOwnProperty").is_some());
    }
}
