//! Plugin architecture and super-global scope.
//!
//! The **super-global scope** provides lazy, dynamic resolution of built-in
//! and host-provided names. It sits outside the normal scope chain:
//!
//! ```text
//! Variable Lookup Order:
//! 1. Local scope (function/block)
//! 2. Outer scopes (lexical chain)
//! 3. Global scope
//! 4. Super-global scope ← built-ins and host stubs live here
//! ```
//!
//! ### Key Components
//!
//! - **[`PluginResolver`]**: Trait for providing names and methods dynamically
//! - **[`SuperGlobalEnvironment`]**: Container holding resolvers with caching
//! - **[`CorePluginResolver`]**: Adapter wrapping [`BuiltInRegistry`] as a resolver
//! - **[`EvalContext`](types::EvalContext)**: Execution context with super-global integration
//!
//! ## Example: Custom Plugin
//!
//! ```
//! use std::rc::Rc;
//! use sheet_harvest::runner::plugin::resolver::PluginResolver;
//! use sheet_harvest::runner::plugin::types::EvalContext;
//! use sheet_harvest::runner::ds::value::JsValue;
//! use sheet_harvest::runner::ds::error::JErrorType;
//!
//! struct UtilsPlugin;
//!
//! impl PluginResolver for UtilsPlugin {
//!     fn has_binding(&self, name: &str) -> bool {
//!         name == "Utils"
//!     }
//!
//!     fn resolve(&self, _name: &str, ctx: &mut EvalContext) -> Result<JsValue, JErrorType> {
//!         Ok(ctx.realm.new_object_value())
//!     }
//!
//!     fn has_method(&self, object: &str, method: &str) -> bool {
//!         object == "Utils" && method == "double"
//!     }
//!
//!     fn call_method(&self, _obj: &str, _method: &str, _ctx: &mut EvalContext,
//!                    _this: JsValue, args: Vec<JsValue>) -> Option<Result<JsValue, JErrorType>> {
//!         let n = match args.first() {
//!             Some(JsValue::Number(n)) => n.as_f64(),
//!             _ => 0.0,
//!         };
//!         Some(Ok(JsValue::from_f64(n * 2.0)))
//!     }
//!
//!     fn name(&self) -> &str { "utils_plugin" }
//! }
//!
//! let mut ctx = EvalContext::new();
//! ctx.add_resolver(Rc::new(UtilsPlugin));
//! assert!(ctx.has_binding("Utils"));
//! ```

pub mod core_resolver;
pub mod registry;
pub mod resolver;
pub mod super_global;
pub mod types;

pub use core_resolver::CorePluginResolver;
pub use registry::BuiltInRegistry;
pub use resolver::PluginResolver;
pub use super_global::SuperGlobalEnvironment;
pub use types::{BuiltInObject, EvalContext, NativeFn};
