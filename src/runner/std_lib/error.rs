//! Error built-in objects.
//!
//! Provides Error, TypeError, ReferenceError, SyntaxError, RangeError constructors.
//! All error objects share one prototype; the constructor name is kept in
//! the instance's `name` property.

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::operations::object::get_property;
use crate::runner::ds::operations::type_conversion::to_string;
use crate::runner::ds::value::JsValue;
use crate::runner::plugin::registry::BuiltInRegistry;
use crate::runner::plugin::types::{BuiltInObject, EvalContext};

/// Register all error types with the registry.
pub fn register(registry: &mut BuiltInRegistry) {
    // Base Error
    let error = BuiltInObject::new("Error")
        .with_constructor(error_constructor)
        .add_prototype_method("toString", error_to_string);
    registry.register_object(error);

    let type_error = BuiltInObject::new("TypeError")
        .with_prototype("Error")
        .with_constructor(type_error_constructor);
    registry.register_object(type_error);

    let reference_error = BuiltInObject::new("ReferenceError")
        .with_prototype("Error")
        .with_constructor(reference_error_constructor);
    registry.register_object(reference_error);

    let syntax_error = BuiltInObject::new("SyntaxError")
        .with_prototype("Error")
        .with_constructor(syntax_error_constructor);
    registry.register_object(syntax_error);

    let range_error = BuiltInObject::new("RangeError")
        .with_prototype("Error")
        .with_constructor(range_error_constructor);
    registry.register_object(range_error);
}

/// Get message from arguments.
fn get_message(args: &[JsValue]) -> String {
    match args.first() {
        None | Some(JsValue::Undefined) => String::new(),
        Some(v) => to_string(v),
    }
}

fn make_error(ctx: &EvalContext, name: &str, args: &[JsValue]) -> JsValue {
    ctx.realm.new_error(name, &get_message(args))
}

/// Error constructor.
fn error_constructor(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(make_error(ctx, "Error", &args))
}

/// TypeError constructor.
fn type_error_constructor(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(make_error(ctx, "TypeError", &args))
}

/// ReferenceError constructor.
fn reference_error_constructor(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(make_error(ctx, "ReferenceError", &args))
}

/// SyntaxError constructor.
fn syntax_error_constructor(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(make_error(ctx, "SyntaxError", &args))
}

/// RangeError constructor.
fn range_error_constructor(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(make_error(ctx, "RangeError", &args))
}

/// Error.prototype.toString
fn error_to_string(
    ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    if !matches!(this, JsValue::Object(_)) {
        return Err(JErrorType::TypeError(
            "Error.prototype.toString called on non-object".to_string(),
        ));
    }
    let name = match get_property(ctx, &this, "name")? {
        JsValue::Undefined => "Error".to_string(),
        other => to_string(&other),
    };
    let message = match get_property(ctx, &this, "message")? {
        JsValue::Undefined => String::new(),
        other => to_string(&other),
    };
    Ok(JsValue::String(match (name.is_empty(), message.is_empty()) {
        (_, true) => name,
        (true, false) => message,
        (false, false) => format!("{}: {}", name, message),
    }))
}
