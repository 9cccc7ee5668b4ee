//! Lexical scopes.
//!
//! A scope is a declarative environment record with a link to its outer
//! scope. Closures hold an `Rc` to the scope they were created in.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::value::JsValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Function,
    Block,
}

pub struct Binding {
    pub value: JsValue,
    pub mutable: bool,
}

pub struct Scope {
    kind: ScopeKind,
    bindings: RefCell<HashMap<String, Binding>>,
    outer: Option<Rc<Scope>>,
}

impl Scope {
    pub fn new_global() -> Rc<Scope> {
        Rc::new(Scope {
            kind: ScopeKind::Global,
            bindings: RefCell::new(HashMap::new()),
            outer: None,
        })
    }

    pub fn new_function(outer: Rc<Scope>) -> Rc<Scope> {
        Rc::new(Scope {
            kind: ScopeKind::Function,
            bindings: RefCell::new(HashMap::new()),
            outer: Some(outer),
        })
    }

    pub fn new_block(outer: Rc<Scope>) -> Rc<Scope> {
        Rc::new(Scope {
            kind: ScopeKind::Block,
            bindings: RefCell::new(HashMap::new()),
            outer: Some(outer),
        })
    }

    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    pub fn outer(&self) -> Option<&Rc<Scope>> {
        self.outer.as_ref()
    }

    pub fn has_own_binding(&self, name: &str) -> bool {
        self.bindings.borrow().contains_key(name)
    }

    /// Creates or replaces a binding in this scope.
    pub fn declare(&self, name: &str, value: JsValue, mutable: bool) {
        self.bindings
            .borrow_mut()
            .insert(name.to_string(), Binding { value, mutable });
    }

    /// Creates a `var` binding initialized to `undefined` unless one exists.
    pub fn declare_var(&self, name: &str) {
        let mut bindings = self.bindings.borrow_mut();
        if !bindings.contains_key(name) {
            bindings.insert(
                name.to_string(),
                Binding {
                    value: JsValue::Undefined,
                    mutable: true,
                },
            );
        }
    }

    pub fn get_own_binding(&self, name: &str) -> Option<JsValue> {
        self.bindings.borrow().get(name).map(|b| b.value.clone())
    }

    /// Updates an existing binding in this scope. Returns `Ok(false)` when
    /// the binding does not exist here.
    pub fn set_own_binding(&self, name: &str, value: JsValue) -> Result<bool, JErrorType> {
        match self.bindings.borrow_mut().get_mut(name) {
            Some(b) if !b.mutable => Err(JErrorType::TypeError(format!(
                "Assignment to constant variable '{}'",
                name
            ))),
            Some(b) => {
                b.value = value;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// The nearest scope (this one included) that holds the binding.
    pub fn resolve(self: &Rc<Self>, name: &str) -> Option<Rc<Scope>> {
        let mut current = Some(self.clone());
        while let Some(scope) = current {
            if scope.has_own_binding(name) {
                return Some(scope);
            }
            current = scope.outer.clone();
        }
        None
    }

    /// The nearest function or global scope, where `var` declarations live.
    pub fn variable_scope(self: &Rc<Self>) -> Rc<Scope> {
        let mut current = self.clone();
        while current.kind == ScopeKind::Block {
            match current.outer.clone() {
                Some(outer) => current = outer,
                None => break,
            }
        }
        current
    }

    pub fn binding_names(&self) -> Vec<String> {
        self.bindings.borrow().keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_walks_outward() {
        let global = Scope::new_global();
        global.declare("a", JsValue::from_i64(1), true);
        let f = Scope::new_function(global.clone());
        let block = Scope::new_block(f.clone());
        block.declare("b", JsValue::from_i64(2), true);
        assert!(Rc::ptr_eq(&block.resolve("a").unwrap(), &global));
        assert!(Rc::ptr_eq(&block.resolve("b").unwrap(), &block));
        assert!(block.resolve("c").is_none());
        assert!(Rc::ptr_eq(&block.variable_scope(), &f));
    }

    #[test]
    fn test_const_binding_rejects_assignment() {
        let global = Scope::new_global();
        global.declare("k", JsValue::from_i64(1), false);
        assert!(global.set_own_binding("k", JsValue::from_i64(2)).is_err());
        assert_eq!(global.set_own_binding("missing", JsValue::Null).ok(), Some(false));
    }

    #[test]
    fn test_declare_var_keeps_existing_value() {
        let global = Scope::new_global();
        global.declare("x", JsValue::from_i64(5), true);
        global.declare_var("x");
        assert_eq!(global.get_own_binding("x"), Some(JsValue::from_i64(5)));
    }
}
