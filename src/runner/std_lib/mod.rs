//! Standard library built-in objects.
//!
//! The capability-limited set of built-ins scripts may reach: Object, Array,
//! String, Number, Boolean, Math, JSON, RegExp, the Error family, function
//! helpers, a handful of global functions, an inert console and a no-op timer.
//! Instance methods live on the registry as prototype methods and are found
//! by class name; static methods are dispatched through the owning namespace.

pub mod core;
pub mod console;
pub mod object;
pub mod array;
pub mod string;
pub mod number;
pub mod math;
pub mod json;
pub mod error;
pub mod regexp;
pub mod function;
pub mod global;
pub mod timer;

pub use core::register_core_builtins;

use crate::runner::ds::value::JsValue;

/// Argument `index`, or `undefined` when the caller passed fewer.
pub(crate) fn arg(args: &[JsValue], index: usize) -> JsValue {
    args.get(index).cloned().unwrap_or(JsValue::Undefined)
}

/// Resolves a relative index argument (negative counts from the end) into `0..=len`.
pub(crate) fn relative_index(value: &JsValue, len: usize, default: usize) -> usize {
    use crate::runner::ds::operations::type_conversion::to_integer;
    if matches!(value, JsValue::Undefined) {
        return default;
    }
    let n = to_integer(value);
    let len_f = len as f64;
    if n < 0.0 {
        (len_f + n).max(0.0) as usize
    } else {
        n.min(len_f) as usize
    }
}
