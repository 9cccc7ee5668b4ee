use std::rc::Rc;

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::object::{
    array_index, FunctionKind, JsObject, JsObjectType, ObjectKind, CLASS_BOOLEAN, CLASS_NUMBER,
    CLASS_STRING,
};
use crate::runner::ds::operations::type_conversion::{get_type, to_string};
use crate::runner::ds::value::JsValue;
use crate::runner::plugin::types::EvalContext;

/// Name of the super-global object whose methods back this object, if any.
fn dispatch_name(o: &JsObject) -> Option<String> {
    match &o.kind {
        ObjectKind::HostProxy(name) => Some(name.clone()),
        ObjectKind::Function(f) => match &f.kind {
            FunctionKind::SuperGlobal { object: None, name } => Some(name.clone()),
            _ => None,
        },
        _ => None,
    }
}

fn is_constructible_script_function(o: &JsObject) -> bool {
    match &o.kind {
        ObjectKind::Function(f) => match &f.kind {
            FunctionKind::Script { data, .. } => !data.is_arrow && f.prototype_property.is_none(),
            _ => false,
        },
        _ => false,
    }
}

/// Creates `fn.prototype` on first access.
pub fn ensure_function_prototype(ctx: &EvalContext, function: &JsObjectType) -> Option<JsObjectType> {
    if is_constructible_script_function(&function.borrow()) {
        let prototype = ctx.realm.new_object();
        if let ObjectKind::Function(f) = &mut function.borrow_mut().kind {
            f.prototype_property = Some(prototype);
        }
    }
    match &function.borrow().kind {
        ObjectKind::Function(f) => f.prototype_property.clone(),
        _ => None,
    }
}

/// Walks the prototype chain, then falls back to the native methods of
/// `class_name`.
fn lookup_in_chain(
    ctx: &mut EvalContext,
    start: Option<JsObjectType>,
    key: &str,
    class_name: &'static str,
) -> JsValue {
    let mut current = start;
    while let Some(o) = current {
        let (value, next) = {
            let b = o.borrow();
            (b.get_own_property(key), b.prototype.clone())
        };
        if let Some(v) = value {
            return v;
        }
        current = next;
    }
    ctx.intrinsic_method(class_name, key)
        .unwrap_or(JsValue::Undefined)
}

/// Property read `base[key]`.
pub fn get_property(ctx: &mut EvalContext, base: &JsValue, key: &str) -> Result<JsValue, JErrorType> {
    match base {
        JsValue::Undefined | JsValue::Null => Err(JErrorType::TypeError(format!(
            "Cannot read properties of {} (reading '{}')",
            to_string(base),
            key
        ))),
        JsValue::String(s) => {
            if key == "length" {
                return Ok(JsValue::from_i64(s.chars().count() as i64));
            }
            if let Some(i) = array_index(key) {
                return Ok(s
                    .chars()
                    .nth(i)
                    .map(|c| JsValue::String(c.to_string()))
                    .unwrap_or(JsValue::Undefined));
            }
            let proto = ctx.realm.string_prototype.clone();
            Ok(lookup_in_chain(ctx, Some(proto), key, CLASS_STRING))
        }
        JsValue::Number(_) => {
            let proto = ctx.realm.number_prototype.clone();
            Ok(lookup_in_chain(ctx, Some(proto), key, CLASS_NUMBER))
        }
        JsValue::Boolean(_) => {
            let proto = ctx.realm.boolean_prototype.clone();
            Ok(lookup_in_chain(ctx, Some(proto), key, CLASS_BOOLEAN))
        }
        JsValue::Object(o) => {
            let (own, dispatch, class_name, proto) = {
                let b = o.borrow();
                (
                    b.get_own_property(key),
                    dispatch_name(&b),
                    b.class_name,
                    b.prototype.clone(),
                )
            };
            if let Some(v) = own {
                return Ok(v);
            }
            if let Some(name) = dispatch {
                if let Some(f) = ctx.super_global_method(&name, key) {
                    return Ok(f);
                }
            }
            if key == "prototype" {
                if let Some(p) = ensure_function_prototype(ctx, o) {
                    return Ok(JsValue::Object(p));
                }
            }
            Ok(lookup_in_chain(ctx, proto, key, class_name))
        }
    }
}

/// Property write `base[key] = value`. Writes to primitives are dropped.
pub fn set_property(base: &JsValue, key: &str, value: JsValue) -> Result<(), JErrorType> {
    match base {
        JsValue::Undefined | JsValue::Null => Err(JErrorType::TypeError(format!(
            "Cannot set properties of {} (setting '{}')",
            to_string(base),
            key
        ))),
        JsValue::Object(o) => {
            o.borrow_mut().set_own_property(key, value);
            Ok(())
        }
        _ => Ok(()),
    }
}

/// The `in` operator.
pub fn has_property(ctx: &mut EvalContext, base: &JsValue, key: &str) -> Result<bool, JErrorType> {
    let o = match base {
        JsValue::Object(o) => o.clone(),
        _ => {
            return Err(JErrorType::TypeError(format!(
                "Cannot use 'in' operator to search for '{}' in {}",
                key,
                to_string(base)
            )))
        }
    };
    let mut current = Some(o.clone());
    while let Some(obj) = current {
        let (found, next) = {
            let b = obj.borrow();
            (b.has_own_property(key), b.prototype.clone())
        };
        if found {
            return Ok(true);
        }
        current = next;
    }
    let (dispatch, class_name) = {
        let b = o.borrow();
        (dispatch_name(&b), b.class_name)
    };
    if let Some(name) = dispatch {
        if ctx.super_global_method(&name, key).is_some() {
            return Ok(true);
        }
    }
    Ok(ctx.intrinsic_method(class_name, key).is_some())
}

/// The `delete` operator on a property.
pub fn delete_property(base: &JsValue, key: &str) -> Result<bool, JErrorType> {
    match base {
        JsValue::Undefined | JsValue::Null => Err(JErrorType::TypeError(format!(
            "Cannot convert {} to object",
            to_string(base)
        ))),
        JsValue::Object(o) => Ok(o.borrow_mut().delete_own_property(key)),
        _ => Ok(true),
    }
}

/// Keys visited by `for (k in base)`: own keys first, then inherited ones
/// not shadowed by an earlier key.
pub fn for_in_keys(base: &JsValue) -> Vec<String> {
    match base {
        JsValue::String(s) => (0..s.chars().count()).map(|i| i.to_string()).collect(),
        JsValue::Object(o) => {
            let mut keys: Vec<String> = vec![];
            let mut current = Some(o.clone());
            while let Some(obj) = current {
                let (own, next) = {
                    let b = obj.borrow();
                    (b.own_keys(), b.prototype.clone())
                };
                for k in own {
                    if !keys.contains(&k) {
                        keys.push(k);
                    }
                }
                current = next;
            }
            keys
        }
        _ => vec![],
    }
}

/// Reads a method and checks that it can be called.
pub fn get_method(ctx: &mut EvalContext, base: &JsValue, key: &str) -> Result<JsValue, JErrorType> {
    let f = get_property(ctx, base, key)?;
    if f.is_callable() {
        Ok(f)
    } else {
        Err(JErrorType::TypeError(format!(
            "{}.{} is not a function",
            describe_receiver(base),
            key
        )))
    }
}

fn describe_receiver(v: &JsValue) -> String {
    match v {
        JsValue::Object(o) => o.borrow().describe(),
        JsValue::String(_) => "string".to_string(),
        _ => get_type(v).to_string(),
    }
}

/// The `instanceof` operator.
pub fn instance_of(ctx: &mut EvalContext, value: &JsValue, constructor: &JsValue) -> Result<bool, JErrorType> {
    if !constructor.is_callable() {
        return Err(JErrorType::TypeError(
            "Right-hand side of 'instanceof' is not callable".to_string(),
        ));
    }
    let target = match get_property(ctx, constructor, "prototype")? {
        JsValue::Object(p) => p,
        _ => return Ok(false),
    };
    let mut current = match value {
        JsValue::Object(o) => o.borrow().prototype.clone(),
        _ => return Ok(false),
    };
    while let Some(p) = current {
        if Rc::ptr_eq(&p, &target) {
            return Ok(true);
        }
        current = p.borrow().prototype.clone();
    }
    Ok(false)
}
