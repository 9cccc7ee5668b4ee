//! Timer functions.
//!
//! Scheduling is inert: callbacks are never invoked and every call returns
//! the same handle.

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::value::JsValue;
use crate::runner::plugin::registry::BuiltInRegistry;
use crate::runner::plugin::types::EvalContext;

const INERT_HANDLE: i64 = 0;

/// Register the timer functions with the registry.
pub fn register(registry: &mut BuiltInRegistry) {
    registry.register_function("setTimeout", timer_schedule);
    registry.register_function("setInterval", timer_schedule);
    registry.register_function("clearTimeout", timer_clear);
    registry.register_function("clearInterval", timer_clear);
}

/// setTimeout / setInterval
fn timer_schedule(
    _ctx: &mut EvalContext,
    _this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    tracing::trace!("timer request ignored");
    Ok(JsValue::from_i64(INERT_HANDLE))
}

/// clearTimeout / clearInterval
fn timer_clear(
    _ctx: &mut EvalContext,
    _this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(JsValue::Undefined)
}
