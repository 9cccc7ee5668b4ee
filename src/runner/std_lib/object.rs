//! Object built-in.
//!
//! Provides the Object constructor, its static helpers and the methods every
//! object inherits from `Object.prototype`.

use std::rc::Rc;

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::object::{JsObject, ObjectKind, CLASS_OBJECT};
use crate::runner::ds::operations::object::{get_property, set_property};
use crate::runner::ds::operations::type_conversion::to_property_key;
use crate::runner::ds::value::JsValue;
use crate::runner::eval::expression::copy_own_properties;
use crate::runner::plugin::registry::BuiltInRegistry;
use crate::runner::plugin::types::{BuiltInObject, EvalContext};

use super::arg;

/// Register the Object built-in with the registry.
pub fn register(registry: &mut BuiltInRegistry) {
    let object = BuiltInObject::new("Object")
        .with_no_prototype()
        .with_constructor(object_constructor)
        .add_method("keys", object_keys)
        .add_method("values", object_values)
        .add_method("entries", object_entries)
        .add_method("assign", object_assign)
        .add_method("create", object_create)
        .add_method("freeze", object_freeze)
        .add_method("seal", object_freeze)
        .add_method("isFrozen", object_is_frozen)
        .add_method("getPrototypeOf", object_get_prototype_of)
        .add_method("defineProperty", object_define_property)
        .add_method("fromEntries", object_from_entries)
        .add_method("getOwnPropertyNames", object_keys)
        .add_prototype_method("hasOwnProperty", object_has_own_property)
        .add_prototype_method("toString", object_to_string)
        .add_prototype_method("toLocaleString", object_to_string)
        .add_prototype_method("valueOf", object_value_of)
        .add_prototype_method("isPrototypeOf", object_is_prototype_of)
        .add_prototype_method("propertyIsEnumerable", object_property_is_enumerable);

    registry.register_object(object);
}

/// Own enumerable keys of any value; strings enumerate their indices.
pub(crate) fn own_keys_of(value: &JsValue) -> Vec<String> {
    match value {
        JsValue::Object(o) => o.borrow().own_keys(),
        JsValue::String(s) => (0..s.chars().count()).map(|i| i.to_string()).collect(),
        _ => vec![],
    }
}

fn require_object(value: &JsValue, method: &str) -> Result<(), JErrorType> {
    if value.is_nullish() {
        Err(JErrorType::TypeError(format!(
            "Object.{} called on null or undefined",
            method
        )))
    } else {
        Ok(())
    }
}

/// Object constructor. Primitives are returned as they are.
fn object_constructor(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    match args.into_iter().next() {
        None | Some(JsValue::Undefined) | Some(JsValue::Null) => Ok(ctx.realm.new_object_value()),
        Some(value) => Ok(value),
    }
}

/// Object.keys
fn object_keys(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let target = arg(&args, 0);
    require_object(&target, "keys")?;
    let keys = own_keys_of(&target)
        .into_iter()
        .map(JsValue::String)
        .collect();
    Ok(ctx.realm.new_array(keys))
}

/// Object.values
fn object_values(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let target = arg(&args, 0);
    require_object(&target, "values")?;
    let mut values = vec![];
    for key in own_keys_of(&target) {
        values.push(get_property(ctx, &target, &key)?);
    }
    Ok(ctx.realm.new_array(values))
}

/// Object.entries
fn object_entries(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let target = arg(&args, 0);
    require_object(&target, "entries")?;
    let mut entries = vec![];
    for key in own_keys_of(&target) {
        let value = get_property(ctx, &target, &key)?;
        entries.push(ctx.realm.new_array(vec![JsValue::String(key), value]));
    }
    Ok(ctx.realm.new_array(entries))
}

/// Object.assign
fn object_assign(
    _ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let target = arg(&args, 0);
    if !matches!(target, JsValue::Object(_)) {
        return Err(JErrorType::TypeError(
            "Cannot convert undefined or null to object".to_string(),
        ));
    }
    for source in args.iter().skip(1) {
        copy_own_properties(source, &target)?;
    }
    Ok(target)
}

/// Object.create
fn object_create(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let prototype = match arg(&args, 0) {
        JsValue::Object(p) => Some(p),
        JsValue::Null => None,
        other => {
            return Err(JErrorType::TypeError(format!(
                "Object prototype may only be an Object or null: {}",
                other
            )))
        }
    };
    let created = JsValue::Object(JsObject::new(ObjectKind::Ordinary, prototype, CLASS_OBJECT).into_ref());
    if let properties @ JsValue::Object(_) = arg(&args, 1) {
        for key in own_keys_of(&properties) {
            let descriptor = get_property(ctx, &properties, &key)?;
            let value = get_property(ctx, &descriptor, "value")?;
            set_property(&created, &key, value)?;
        }
    }
    Ok(created)
}

/// Object.freeze. Objects stay writable; the argument is returned as is.
fn object_freeze(
    _ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(arg(&args, 0))
}

/// Object.isFrozen
fn object_is_frozen(
    _ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(JsValue::Boolean(!matches!(arg(&args, 0), JsValue::Object(_))))
}

/// Object.getPrototypeOf
fn object_get_prototype_of(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let target = arg(&args, 0);
    require_object(&target, "getPrototypeOf")?;
    let prototype = match &target {
        JsValue::Object(o) => o.borrow().prototype.clone(),
        JsValue::String(_) => Some(ctx.realm.string_prototype.clone()),
        JsValue::Number(_) => Some(ctx.realm.number_prototype.clone()),
        JsValue::Boolean(_) => Some(ctx.realm.boolean_prototype.clone()),
        _ => None,
    };
    Ok(prototype.map(JsValue::Object).unwrap_or(JsValue::Null))
}

/// Object.defineProperty. Only data descriptors are honoured; an accessor
/// descriptor stores its getter's current result.
fn object_define_property(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let target = arg(&args, 0);
    if !matches!(target, JsValue::Object(_)) {
        return Err(JErrorType::TypeError(
            "Object.defineProperty called on non-object".to_string(),
        ));
    }
    let key = to_property_key(&arg(&args, 1));
    let descriptor = arg(&args, 2);
    if let JsValue::Object(_) = descriptor {
        let getter = get_property(ctx, &descriptor, "get")?;
        let value = if getter.is_callable() {
            crate::runner::eval::call_function(&getter, target.clone(), vec![], ctx)?
        } else {
            get_property(ctx, &descriptor, "value")?
        };
        set_property(&target, &key, value)?;
    }
    Ok(target)
}

/// Object.fromEntries
fn object_from_entries(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let entries = arg(&args, 0);
    let result = ctx.realm.new_object_value();
    let items = match &entries {
        JsValue::Object(o) => match &o.borrow().kind {
            ObjectKind::Array(items) => items.clone(),
            _ => vec![],
        },
        _ => {
            return Err(JErrorType::TypeError(format!(
                "{} is not iterable",
                entries
            )))
        }
    };
    for entry in items {
        let key = get_property(ctx, &entry, "0")?;
        let value = get_property(ctx, &entry, "1")?;
        set_property(&result, &to_property_key(&key), value)?;
    }
    Ok(result)
}

/// Object.prototype.hasOwnProperty
fn object_has_own_property(
    _ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let key = to_property_key(&arg(&args, 0));
    Ok(JsValue::Boolean(match &this {
        JsValue::Object(o) => o.borrow().has_own_property(&key),
        JsValue::String(s) => {
            key == "length"
                || crate::runner::ds::object::array_index(&key)
                    .map_or(false, |i| i < s.chars().count())
        }
        _ => false,
    }))
}

/// Object.prototype.toString
fn object_to_string(
    _ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let tag = match &this {
        JsValue::Undefined => "Undefined",
        JsValue::Null => "Null",
        JsValue::Boolean(_) => "Boolean",
        JsValue::Number(_) => "Number",
        JsValue::String(_) => "String",
        JsValue::Object(o) => match &o.borrow().kind {
            ObjectKind::Array(_) => "Array",
            ObjectKind::Function(_) => "Function",
            ObjectKind::RegExp(_) => "RegExp",
            ObjectKind::Error => "Error",
            _ => "Object",
        },
    };
    Ok(JsValue::String(format!("[object {}]", tag)))
}

/// Object.prototype.valueOf
fn object_value_of(
    _ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(this)
}

/// Object.prototype.isPrototypeOf
fn object_is_prototype_of(
    _ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let (JsValue::Object(prototype), JsValue::Object(value)) = (&this, arg(&args, 0)) else {
        return Ok(JsValue::Boolean(false));
    };
    let mut current = value.borrow().prototype.clone();
    while let Some(p) = current {
        if Rc::ptr_eq(&p, prototype) {
            return Ok(JsValue::Boolean(true));
        }
        current = p.borrow().prototype.clone();
    }
    Ok(JsValue::Boolean(false))
}

/// Object.prototype.propertyIsEnumerable
fn object_property_is_enumerable(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let key = to_property_key(&arg(&args, 0));
    if key == "length" {
        return Ok(JsValue::Boolean(false));
    }
    object_has_own_property(ctx, this, vec![JsValue::String(key)])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> EvalContext {
        let mut ctx = EvalContext::new();
        ctx.install_core_builtins(BuiltInRegistry::with_core());
        ctx
    }

    #[test]
    fn test_keys_follow_insertion_order() {
        let mut ctx = ctx();
        let obj = ctx.realm.new_object_value();
        set_property(&obj, "b", JsValue::from_i64(1)).unwrap();
        set_property(&obj, "a", JsValue::from_i64(2)).unwrap();
        let keys = object_keys(&mut ctx, JsValue::Undefined, vec![obj]).unwrap();
        assert_eq!(get_property(&mut ctx, &keys, "0").unwrap(), JsValue::from_str("b"));
        assert_eq!(get_property(&mut ctx, &keys, "1").unwrap(), JsValue::from_str("a"));
    }

    #[test]
    fn test_keys_of_null_throws() {
        let mut ctx = ctx();
        let result = object_keys(&mut ctx, JsValue::Undefined, vec![JsValue::Null]);
        assert!(matches!(result, Err(JErrorType::TypeError(_))));
    }

    #[test]
    fn test_create_with_null_prototype() {
        let mut ctx = ctx();
        let created = object_create(&mut ctx, JsValue::Undefined, vec![JsValue::Null]).unwrap();
        match created {
            JsValue::Object(o) => assert!(o.borrow().prototype.is_none()),
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_to_string_tags() {
        let mut ctx = ctx();
        let array = ctx.realm.new_array(vec![]);
        assert_eq!(
            object_to_string(&mut ctx, array, vec![]).unwrap(),
            JsValue::from_str("[object Array]")
        );
        assert_eq!(
            object_to_string(&mut ctx, JsValue::Null, vec![]).unwrap(),
            JsValue::from_str("[object Null]")
        );
    }
}
