//! Function call execution.
//!
//! Every callable value is a function object; this module dispatches on the
//! kind of function it wraps.

use std::rc::Rc;

use crate::parser::ast::{FunctionBodyType, FunctionData};
use crate::runner::ds::env_record::Scope;
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::object::{FunctionKind, JsObject, JsObjectType, ObjectKind, CLASS_OBJECT};
use crate::runner::ds::operations::object::{ensure_function_prototype, get_property};
use crate::runner::ds::operations::type_conversion::to_string;
use crate::runner::ds::value::JsValue;
use crate::runner::plugin::types::{EvalContext, NativeFn};

use super::expression::evaluate_expression;
use super::statement::{execute_statements, hoist_declarations};
use super::types::{CompletionType, ValueResult};

enum Callee {
    Script {
        data: Rc<FunctionData>,
        scope: Rc<Scope>,
        captured_this: Option<JsValue>,
    },
    Native(NativeFn),
    Intrinsic(&'static str, String),
    SuperGlobal(Option<String>, String),
    Bound(JsValue, JsValue, Vec<JsValue>),
}

fn inspect_callee(func: &JsValue) -> Result<(JsObjectType, Callee), JErrorType> {
    let o = match func {
        JsValue::Object(o) => o.clone(),
        _ => {
            return Err(JErrorType::TypeError(format!(
                "{} is not a function",
                to_string(func)
            )))
        }
    };
    let callee = match &o.borrow().kind {
        ObjectKind::Function(f) => match &f.kind {
            FunctionKind::Script {
                data,
                scope,
                this_value,
            } => Callee::Script {
                data: data.clone(),
                scope: scope.clone(),
                captured_this: this_value.clone(),
            },
            FunctionKind::Native { func, .. } => Callee::Native(*func),
            FunctionKind::Intrinsic { class_name, method } => {
                Callee::Intrinsic(*class_name, method.clone())
            }
            FunctionKind::SuperGlobal { object, name } => {
                Callee::SuperGlobal(object.clone(), name.clone())
            }
            FunctionKind::Bound {
                target,
                this_value,
                args,
            } => Callee::Bound(target.clone(), this_value.clone(), args.clone()),
        },
        other => {
            let description = match other {
                ObjectKind::HostProxy(name) => name.clone(),
                _ => "object".to_string(),
            };
            return Err(JErrorType::TypeError(format!(
                "{} is not a function",
                description
            )));
        }
    };
    Ok((o, callee))
}

/// Creates a closure over the running scope.
pub fn create_function_object(data: &Rc<FunctionData>, ctx: &EvalContext) -> JsValue {
    let this_value = if data.is_arrow {
        Some(ctx.this_value())
    } else {
        None
    };
    ctx.realm.new_function(FunctionKind::Script {
        data: data.clone(),
        scope: ctx.current_scope().clone(),
        this_value,
    })
}

/// Call a function with the given arguments.
pub fn call_function(
    func: &JsValue,
    this_value: JsValue,
    args: Vec<JsValue>,
    ctx: &mut EvalContext,
) -> ValueResult {
    let (object, callee) = inspect_callee(func)?;
    ctx.enter_call()?;
    let result = match callee {
        Callee::Script {
            data,
            scope,
            captured_this,
        } => {
            let this_value = match captured_this {
                Some(captured) => captured,
                None if this_value.is_nullish() => ctx.global_this.clone(),
                None => this_value,
            };
            call_script_function(&object, &data, scope, this_value, args, ctx)
        }
        Callee::Native(f) => f(ctx, this_value, args),
        Callee::Intrinsic(class_name, method) => {
            match ctx.builtins().get_prototype_method(class_name, &method) {
                Some(f) => f(ctx, this_value, args),
                None => Err(JErrorType::TypeError(format!(
                    "{}.prototype.{} is not a function",
                    class_name, method
                ))),
            }
        }
        Callee::SuperGlobal(object_name, name) => {
            call_super_global(object_name.as_deref(), &name, this_value, args, ctx)
        }
        Callee::Bound(target, bound_this, mut bound_args) => {
            bound_args.extend(args);
            call_function(&target, bound_this, bound_args, ctx)
        }
    };
    ctx.exit_call();
    result
}

fn call_super_global(
    object_name: Option<&str>,
    name: &str,
    this_value: JsValue,
    args: Vec<JsValue>,
    ctx: &mut EvalContext,
) -> ValueResult {
    let owner = object_name.unwrap_or(name);
    let resolver = ctx
        .super_global_resolver(owner)
        .ok_or_else(|| JErrorType::ReferenceError(format!("{} is not defined", owner)))?;
    let outcome = match object_name {
        Some(object_name) => resolver.call_method(object_name, name, ctx, this_value, args),
        None => resolver.call_function(name, ctx, this_value, args),
    };
    outcome.unwrap_or_else(|| {
        Err(JErrorType::TypeError(match object_name {
            Some(o) => format!("{}.{} is not a function", o, name),
            None => format!("{} is not a function", name),
        }))
    })
}

fn call_script_function(
    function: &JsObjectType,
    data: &Rc<FunctionData>,
    closure_scope: Rc<Scope>,
    this_value: JsValue,
    args: Vec<JsValue>,
    ctx: &mut EvalContext,
) -> ValueResult {
    let fn_scope = Scope::new_function(closure_scope);
    if !data.is_arrow {
        if let Some(id) = &data.id {
            fn_scope.declare(&id.name, JsValue::Object(function.clone()), true);
        }
        if data.uses_arguments {
            fn_scope.declare("arguments", ctx.realm.new_array(args.clone()), true);
        }
    }
    let saved_scope = ctx.replace_scope(fn_scope.clone());
    ctx.push_this(this_value);
    let result = run_function_body(data, &fn_scope, args, ctx);
    ctx.pop_this();
    ctx.replace_scope(saved_scope);
    result
}

fn run_function_body(
    data: &FunctionData,
    fn_scope: &Rc<Scope>,
    args: Vec<JsValue>,
    ctx: &mut EvalContext,
) -> ValueResult {
    let mut args = args.into_iter();
    for param in &data.params {
        let value = if param.rest {
            ctx.realm.new_array(args.by_ref().collect())
        } else {
            let arg = args.next().unwrap_or(JsValue::Undefined);
            match (&arg, &param.default) {
                (JsValue::Undefined, Some(default)) => evaluate_expression(default, ctx)?,
                _ => arg,
            }
        };
        fn_scope.declare(&param.name, value, true);
    }
    hoist_declarations(&data.hoisted, fn_scope, ctx);

    match &data.body {
        FunctionBodyType::Block(statements) => {
            let completion = execute_statements(statements, ctx)?;
            Ok(match completion.completion_type {
                CompletionType::Return => completion.get_value(),
                _ => JsValue::Undefined,
            })
        }
        FunctionBodyType::Expression(expr) => evaluate_expression(expr, ctx),
    }
}

/// Evaluates `new func(...args)`.
pub fn construct(func: &JsValue, args: Vec<JsValue>, ctx: &mut EvalContext) -> ValueResult {
    let (object, callee) = inspect_callee(func)?;
    match callee {
        Callee::Script { ref data, .. } if !data.is_arrow => {
            let prototype = ensure_function_prototype(ctx, &object)
                .unwrap_or_else(|| ctx.realm.object_prototype.clone());
            let instance = JsValue::Object(
                JsObject::new(ObjectKind::Ordinary, Some(prototype), CLASS_OBJECT).into_ref(),
            );
            let result = call_function(func, instance.clone(), args, ctx)?;
            Ok(match result {
                JsValue::Object(_) => result,
                _ => instance,
            })
        }
        Callee::SuperGlobal(None, name) => {
            let resolver = ctx
                .super_global_resolver(&name)
                .ok_or_else(|| JErrorType::ReferenceError(format!("{} is not defined", name)))?;
            ctx.enter_call()?;
            let result = resolver.call_constructor(&name, ctx, args);
            ctx.exit_call();
            result.unwrap_or_else(|| {
                Err(JErrorType::TypeError(format!("{} is not a constructor", name)))
            })
        }
        Callee::Bound(target, _, mut bound_args) => {
            bound_args.extend(args);
            construct(&target, bound_args, ctx)
        }
        _ => Err(JErrorType::TypeError(format!(
            "{} is not a constructor",
            object.borrow().describe()
        ))),
    }
}

/// String conversion that honours a script-defined `toString` on plain objects.
pub fn to_string_with_ctx(value: &JsValue, ctx: &mut EvalContext) -> Result<String, JErrorType> {
    if let JsValue::Object(o) = value {
        let is_plain = matches!(o.borrow().kind, ObjectKind::Ordinary);
        if is_plain {
            let method = get_property(ctx, value, "toString")?;
            let is_script = match &method {
                JsValue::Object(m) => matches!(
                    &m.borrow().kind,
                    ObjectKind::Function(f) if matches!(f.kind, FunctionKind::Script { .. })
                ),
                _ => false,
            };
            if is_script {
                let result = call_function(&method, value.clone(), vec![], ctx)?;
                return Ok(to_string(&result));
            }
        }
    }
    Ok(to_string(value))
}
