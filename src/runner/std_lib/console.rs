//! Console built-in object.
//!
//! Script output never reaches stdout; each call becomes a `tracing` event
//! under the `script` target.

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::operations::type_conversion::to_string;
use crate::runner::ds::value::JsValue;
use crate::runner::plugin::registry::BuiltInRegistry;
use crate::runner::plugin::types::{BuiltInObject, EvalContext};

/// Register the console object with the registry.
pub fn register(registry: &mut BuiltInRegistry) {
    let console = BuiltInObject::new("console")
        .with_no_prototype()
        .add_method("log", console_log)
        .add_method("info", console_log)
        .add_method("debug", console_log)
        .add_method("warn", console_warn)
        .add_method("error", console_warn);

    registry.register_object(console);
}

/// Format all arguments for console output.
fn format_args(args: &[JsValue]) -> String {
    args.iter()
        .map(to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// console.log - Log at debug level.
fn console_log(
    _ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    tracing::debug!(target: "script", "{}", format_args(&args));
    Ok(JsValue::Undefined)
}

/// console.warn - Log at warn level.
fn console_warn(
    _ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    tracing::warn!(target: "script", "{}", format_args(&args));
    Ok(JsValue::Undefined)
}
