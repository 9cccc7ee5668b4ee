//! Super-global environment: the bottom of the scope chain.
//!
//! This environment sits below the global scope and lazily resolves
//! built-in and host-provided names on first access. Values are cached
//! after first resolution so each name is materialized at most once.
//!
//! ## How It Works
//!
//! ```text
//! Script: Math.abs(-5)
//!      ↓
//! 1. Check local scope → not found
//! 2. Check outer scopes → not found
//! 3. Check global scope → not found
//! 4. Check super-global → "Math" found!
//!      ↓
//! 5. Query resolvers: Does anyone provide "Math"?
//! 6. CorePluginResolver says "yes"
//! 7. Cache the result
//! 8. `abs` is read off the proxy and dispatched back to the resolver
//! ```
//!
//! A global binding of the same name always shadows the super-global one,
//! so scripts can replace a stubbed helper with their own definition.

use std::collections::HashMap;
use std::rc::Rc;

use crate::runner::ds::value::JsValue;
use crate::runner::plugin::resolver::PluginResolver;

pub struct SuperGlobalEnvironment {
    /// Registered plugin resolvers, queried in order.
    resolvers: Vec<Rc<dyn PluginResolver>>,
    /// Cache of already-resolved bindings (name → value).
    cache: HashMap<String, JsValue>,
    /// Cache of which resolver index owns which name.
    resolver_map: HashMap<String, usize>,
}

impl SuperGlobalEnvironment {
    pub fn new() -> Self {
        SuperGlobalEnvironment {
            resolvers: Vec::new(),
            cache: HashMap::new(),
            resolver_map: HashMap::new(),
        }
    }

    /// Register a plugin resolver. Resolvers are queried in registration order.
    pub fn add_resolver(&mut self, resolver: Rc<dyn PluginResolver>) {
        tracing::trace!(resolver = resolver.name(), "super-global resolver registered");
        self.resolvers.push(resolver);
    }

    /// Find which resolver (if any) provides the given name.
    pub fn find_resolver(&self, name: &str) -> Option<(usize, Rc<dyn PluginResolver>)> {
        if let Some(&idx) = self.resolver_map.get(name) {
            return Some((idx, self.resolvers[idx].clone()));
        }
        self.resolvers
            .iter()
            .enumerate()
            .find(|(_, r)| r.has_binding(name))
            .map(|(i, r)| (i, r.clone()))
    }

    /// Check if any resolver provides the given name.
    pub fn has_binding(&self, name: &str) -> bool {
        self.cache.contains_key(name) || self.find_resolver(name).is_some()
    }

    pub fn get_cached(&self, name: &str) -> Option<JsValue> {
        self.cache.get(name).cloned()
    }

    /// Remember the value resolved for `name` and the resolver that owns it.
    pub fn store(&mut self, name: &str, resolver_index: usize, value: JsValue) {
        self.cache.insert(name.to_string(), value);
        self.resolver_map.insert(name.to_string(), resolver_index);
    }

    /// Drops the cached value for `name`; the next read resolves it again.
    pub fn forget(&mut self, name: &str) {
        self.cache.remove(name);
        self.resolver_map.remove(name);
    }

    /// Get the registered resolvers (for inspection/testing).
    pub fn resolvers(&self) -> &[Rc<dyn PluginResolver>] {
        &self.resolvers
    }
}

impl Default for SuperGlobalEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ds::error::JErrorType;
    use crate::runner::plugin::types::EvalContext;

    struct Fixed(&'static str);

    impl PluginResolver for Fixed {
        fn has_binding(&self, name: &str) -> bool {
            name == "answer"
        }

        fn resolve(&self, _name: &str, _ctx: &mut EvalContext) -> Result<JsValue, JErrorType> {
            Ok(JsValue::from_i64(42))
        }

        fn call_method(
            &self,
            _object_name: &str,
            _method_name: &str,
            _ctx: &mut EvalContext,
            _this: JsValue,
            _args: Vec<JsValue>,
        ) -> Option<Result<JsValue, JErrorType>> {
            None
        }

        fn name(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn test_first_registered_resolver_wins() {
        let mut sg = SuperGlobalEnvironment::new();
        sg.add_resolver(Rc::new(Fixed("first")));
        sg.add_resolver(Rc::new(Fixed("second")));
        let (idx, resolver) = sg.find_resolver("answer").unwrap();
        assert_eq!(idx, 0);
        assert_eq!(resolver.name(), "first");
        assert!(sg.find_resolver("question").is_none());
    }

    #[test]
    fn test_store_caches_value() {
        let mut sg = SuperGlobalEnvironment::new();
        sg.add_resolver(Rc::new(Fixed("only")));
        assert!(sg.get_cached("answer").is_none());
        sg.store("answer", 0, JsValue::from_i64(42));
        assert_eq!(sg.get_cached("answer"), Some(JsValue::from_i64(42)));
        assert!(sg.has_binding("answer"));
    }

    #[test]
    fn test_forget_drops_cached_value() {
        let mut sg = SuperGlobalEnvironment::new();
        sg.add_resolver(Rc::new(Fixed("only")));
        sg.store("answer", 0, JsValue::from_i64(7));
        sg.forget("answer");
        assert!(sg.get_cached("answer").is_none());
        assert!(sg.has_binding("answer"));
    }
}
