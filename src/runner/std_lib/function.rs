//! Function built-in: `call`, `apply`, `bind` and `toString` on every function.
//!
//! Building functions from source text at runtime is refused.

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::object::{FunctionKind, ObjectKind};
use crate::runner::ds::value::JsValue;
use crate::runner::eval::call_function;
use crate::runner::plugin::registry::BuiltInRegistry;
use crate::runner::plugin::types::{BuiltInObject, EvalContext};

use super::arg;

/// Register the Function built-in with the registry.
pub fn register(registry: &mut BuiltInRegistry) {
    let function = BuiltInObject::new("Function")
        .with_constructor(function_constructor)
        .add_prototype_method("call", function_call)
        .add_prototype_method("apply", function_apply)
        .add_prototype_method("bind", function_bind)
        .add_prototype_method("toString", function_to_string);

    registry.register_object(function);
}

fn require_callable(this: &JsValue, method: &str) -> Result<(), JErrorType> {
    if this.is_callable() {
        Ok(())
    } else {
        Err(JErrorType::TypeError(format!(
            "Function.prototype.{} called on non-function",
            method
        )))
    }
}

/// Function constructor.
fn function_constructor(
    _ctx: &mut EvalContext,
    _this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Err(JErrorType::TypeError(
        "Code generation from strings is disallowed".to_string(),
    ))
}

/// Function.prototype.call
fn function_call(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    require_callable(&this, "call")?;
    let mut args = args.into_iter();
    let this_arg = args.next().unwrap_or(JsValue::Undefined);
    call_function(&this, this_arg, args.collect(), ctx)
}

/// Function.prototype.apply
fn function_apply(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    require_callable(&this, "apply")?;
    let this_arg = arg(&args, 0);
    let list = arg(&args, 1);
    let call_args = match &list {
        JsValue::Undefined | JsValue::Null => vec![],
        JsValue::Object(o) => match &o.borrow().kind {
            ObjectKind::Array(items) => items.clone(),
            _ => vec![],
        },
        _ => {
            return Err(JErrorType::TypeError(
                "CreateListFromArrayLike called on non-object".to_string(),
            ))
        }
    };
    call_function(&this, this_arg, call_args, ctx)
}

/// Function.prototype.bind
fn function_bind(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    require_callable(&this, "bind")?;
    let mut args = args.into_iter();
    let this_value = args.next().unwrap_or(JsValue::Undefined);
    Ok(ctx.realm.new_function(FunctionKind::Bound {
        target: this,
        this_value,
        args: args.collect(),
    }))
}

/// Function.prototype.toString
fn function_to_string(
    _ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    require_callable(&this, "toString")?;
    let source = match &this {
        JsValue::Object(o) => o.borrow().function_source(),
        _ => None,
    };
    Ok(JsValue::String(source.unwrap_or_default()))
}
