//! JSON built-in object.
//!
//! `JSON.parse` and `JSON.stringify` go through `serde_json`; object key order
//! is preserved in both directions.

use std::rc::Rc;

use serde::Serialize;

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::object::{JsObjectType, ObjectKind};
use crate::runner::ds::operations::object::get_property;
use crate::runner::ds::operations::type_conversion::{to_integer, to_string};
use crate::runner::ds::value::{JsNumberType, JsValue};
use crate::runner::eval::call_function;
use crate::runner::plugin::registry::BuiltInRegistry;
use crate::runner::plugin::types::{BuiltInObject, EvalContext};

use super::arg;

/// Register the JSON object with the registry.
pub fn register(registry: &mut BuiltInRegistry) {
    let json = BuiltInObject::new("JSON")
        .with_no_prototype()
        .add_method("stringify", json_stringify)
        .add_method("parse", json_parse);

    registry.register_object(json);
}

/// Converts a parsed JSON document into script values.
pub fn json_to_value(ctx: &EvalContext, json: &serde_json::Value) -> JsValue {
    match json {
        serde_json::Value::Null => JsValue::Null,
        serde_json::Value::Bool(b) => JsValue::Boolean(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => JsValue::from_i64(i),
            None => JsValue::from_f64(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::String(s) => JsValue::String(s.clone()),
        serde_json::Value::Array(items) => {
            ctx.realm
                .new_array(items.iter().map(|item| json_to_value(ctx, item)).collect())
        }
        serde_json::Value::Object(map) => {
            let object = ctx.realm.new_object();
            {
                let mut o = object.borrow_mut();
                for (k, v) in map {
                    o.set_own_property(k, json_to_value(ctx, v));
                }
            }
            JsValue::Object(object)
        }
    }
}

fn number_to_json(n: &JsNumberType) -> serde_json::Value {
    match n {
        JsNumberType::Integer(i) => serde_json::Value::from(*i),
        JsNumberType::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        _ => serde_json::Value::Null,
    }
}

enum Replacer {
    None,
    Function(JsValue),
    Keys(Vec<String>),
}

struct Stringifier<'a> {
    ctx: &'a mut EvalContext,
    replacer: Replacer,
    stack: Vec<JsObjectType>,
}

impl<'a> Stringifier<'a> {
    /// `None` means the value is skipped (`undefined`, functions).
    fn convert(
        &mut self,
        holder: &JsValue,
        key: &str,
        value: JsValue,
    ) -> Result<Option<serde_json::Value>, JErrorType> {
        let mut value = value;
        if let JsValue::Object(_) = &value {
            let to_json = get_property(self.ctx, &value, "toJSON")?;
            if to_json.is_callable() {
                value = call_function(&to_json, value.clone(), vec![JsValue::from_str(key)], self.ctx)?;
            }
        }
        if let Replacer::Function(f) = &self.replacer {
            let f = f.clone();
            value = call_function(&f, holder.clone(), vec![JsValue::from_str(key), value], self.ctx)?;
        }
        Ok(match &value {
            JsValue::Undefined => None,
            JsValue::Null => Some(serde_json::Value::Null),
            JsValue::Boolean(b) => Some(serde_json::Value::Bool(*b)),
            JsValue::Number(n) => Some(number_to_json(n)),
            JsValue::String(s) => Some(serde_json::Value::String(s.clone())),
            JsValue::Object(o) => {
                if self.stack.iter().any(|seen| Rc::ptr_eq(seen, o)) {
                    return Err(JErrorType::TypeError(
                        "Converting circular structure to JSON".to_string(),
                    ));
                }
                let items = match &o.borrow().kind {
                    ObjectKind::Function(_) => return Ok(None),
                    ObjectKind::Array(items) => Some(items.clone()),
                    _ => None,
                };
                self.stack.push(o.clone());
                let result = match items {
                    Some(items) => self.convert_array(&value, items),
                    None => self.convert_object(&value, o),
                };
                self.stack.pop();
                Some(result?)
            }
        })
    }

    fn convert_array(
        &mut self,
        holder: &JsValue,
        items: Vec<JsValue>,
    ) -> Result<serde_json::Value, JErrorType> {
        let mut out = Vec::with_capacity(items.len());
        for (i, item) in items.into_iter().enumerate() {
            out.push(
                self.convert(holder, &i.to_string(), item)?
                    .unwrap_or(serde_json::Value::Null),
            );
        }
        Ok(serde_json::Value::Array(out))
    }

    fn convert_object(
        &mut self,
        holder: &JsValue,
        object: &JsObjectType,
    ) -> Result<serde_json::Value, JErrorType> {
        let keys = match &self.replacer {
            Replacer::Keys(keys) => keys
                .iter()
                .filter(|k| object.borrow().has_own_property(k))
                .cloned()
                .collect(),
            _ => object.borrow().own_keys(),
        };
        let mut map = serde_json::Map::new();
        for key in keys {
            let value = object
                .borrow()
                .get_own_property(&key)
                .unwrap_or(JsValue::Undefined);
            if let Some(v) = self.convert(holder, &key, value)? {
                map.insert(key, v);
            }
        }
        Ok(serde_json::Value::Object(map))
    }
}

fn indent_of(space: &JsValue) -> Option<String> {
    let indent = match space {
        JsValue::Number(_) => " ".repeat(to_integer(space).clamp(0.0, 10.0) as usize),
        JsValue::String(s) => s.chars().take(10).collect(),
        _ => return None,
    };
    if indent.is_empty() {
        None
    } else {
        Some(indent)
    }
}

fn write_json(value: &serde_json::Value, indent: Option<&str>) -> Result<String, JErrorType> {
    let to_error = |e: serde_json::Error| JErrorType::TypeError(e.to_string());
    match indent {
        None => serde_json::to_string(value).map_err(to_error),
        Some(indent) => {
            let mut buffer = Vec::new();
            let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
            let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
            value.serialize(&mut serializer).map_err(to_error)?;
            String::from_utf8(buffer).map_err(|e| JErrorType::TypeError(e.to_string()))
        }
    }
}

/// JSON.stringify
fn json_stringify(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let value = arg(&args, 0);
    let replacer_arg = arg(&args, 1);
    let replacer = if replacer_arg.is_callable() {
        Replacer::Function(replacer_arg)
    } else {
        let keys = match &replacer_arg {
            JsValue::Object(o) => match &o.borrow().kind {
                ObjectKind::Array(items) => Some(items.iter().map(to_string).collect()),
                _ => None,
            },
            _ => None,
        };
        keys.map(Replacer::Keys).unwrap_or(Replacer::None)
    };
    let indent = indent_of(&arg(&args, 2));
    let holder = ctx.realm.new_object_value();
    let mut stringifier = Stringifier {
        ctx,
        replacer,
        stack: vec![],
    };
    match stringifier.convert(&holder, "", value)? {
        Some(json) => Ok(JsValue::String(write_json(&json, indent.as_deref())?)),
        None => Ok(JsValue::Undefined),
    }
}

/// JSON.parse
fn json_parse(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let text = to_string(&arg(&args, 0));
    let parsed: serde_json::Value = serde_json::from_str(&text)
        .map_err(|e| JErrorType::SyntaxError(format!("JSON.parse: {}", e)))?;
    Ok(json_to_value(ctx, &parsed))
}
