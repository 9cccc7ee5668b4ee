//! Plugin resolver trait for lazy, dynamic resolution of super-global objects.
//!
//! Plugins implement `PluginResolver` to provide names (like `Math`, `desc`,
//! `tDoc`) that are available in the super-global scope. Values are resolved
//! lazily, only when script code actually references them.

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::value::JsValue;
use crate::runner::plugin::types::EvalContext;

/// A plugin resolver that can dynamically provide named objects and their methods.
///
/// Resolvers are queried in registration order when a name lookup reaches the
/// super-global scope. The first resolver that claims a name wins.
pub trait PluginResolver {
    /// Does this resolver provide a binding with the given name?
    ///
    /// This should be a cheap check (e.g. a `HashSet::contains`).
    /// It must NOT allocate or materialize the object.
    fn has_binding(&self, name: &str) -> bool;

    /// Materialize the value for the given name.
    ///
    /// Called only after `has_binding` returns `true`.
    /// The returned `JsValue` is cached in the super-global environment
    /// so this is called at most once per name per context.
    fn resolve(&self, name: &str, ctx: &mut EvalContext) -> Result<JsValue, JErrorType>;

    /// Does the object `object_name` expose `method_name`?
    ///
    /// Property reads on a resolved object fall back to this when the object
    /// has no own property of that name.
    fn has_method(&self, _object_name: &str, _method_name: &str) -> bool {
        false
    }

    /// Execute a method on an object this resolver provides.
    ///
    /// For example, if this resolver provides `"Math"`, then
    /// `call_method("Math", "abs", ctx, this, args)` should execute `Math.abs`.
    ///
    /// Returns `None` if the method is not found.
    fn call_method(
        &self,
        object_name: &str,
        method_name: &str,
        ctx: &mut EvalContext,
        this: JsValue,
        args: Vec<JsValue>,
    ) -> Option<Result<JsValue, JErrorType>>;

    /// Execute a plain call of a function-valued binding, like `parseInt(x)`.
    fn call_function(
        &self,
        _name: &str,
        _ctx: &mut EvalContext,
        _this: JsValue,
        _args: Vec<JsValue>,
    ) -> Option<Result<JsValue, JErrorType>> {
        None
    }

    /// Execute `new name(...)` for a binding this resolver provides.
    ///
    /// Returns `None` if this resolver doesn't provide a constructor for the name.
    fn call_constructor(
        &self,
        _object_name: &str,
        _ctx: &mut EvalContext,
        _args: Vec<JsValue>,
    ) -> Option<Result<JsValue, JErrorType>> {
        None
    }

    /// Human-readable name for this resolver (for debugging/logging).
    fn name(&self) -> &str;
}
