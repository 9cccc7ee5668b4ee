use std::rc::Rc;

use crate::runner::ds::object::{JsObjectType, ObjectKind};
use crate::runner::ds::value::{JsNumberType, JsValue};

pub const TYPE_STR_UNDEFINED: &str = "undefined";
pub const TYPE_STR_NULL: &str = "null";
pub const TYPE_STR_BOOLEAN: &str = "boolean";
pub const TYPE_STR_STRING: &str = "string";
pub const TYPE_STR_NUMBER: &str = "number";
pub const TYPE_STR_OBJECT: &str = "object";
pub const TYPE_STR_FUNCTION: &str = "function";

/// The `typeof` string of a value.
pub fn get_type(a: &JsValue) -> &'static str {
    match a {
        JsValue::Undefined => TYPE_STR_UNDEFINED,
        JsValue::Null => TYPE_STR_OBJECT,
        JsValue::Boolean(_) => TYPE_STR_BOOLEAN,
        JsValue::String(_) => TYPE_STR_STRING,
        JsValue::Number(_) => TYPE_STR_NUMBER,
        JsValue::Object(o) => match o.borrow().kind {
            ObjectKind::Function(_) => TYPE_STR_FUNCTION,
            _ => TYPE_STR_OBJECT,
        },
    }
}

pub fn to_boolean(v: &JsValue) -> bool {
    match v {
        JsValue::Undefined | JsValue::Null => false,
        JsValue::Boolean(b) => *b,
        JsValue::String(s) => !s.is_empty(),
        JsValue::Number(n) => match n {
            JsNumberType::Integer(i) => *i != 0,
            JsNumberType::Float(f) => *f != 0.0,
            JsNumberType::NaN => false,
            JsNumberType::PositiveInfinity | JsNumberType::NegativeInfinity => true,
        },
        JsValue::Object(_) => true,
    }
}

pub fn to_number(v: &JsValue) -> f64 {
    match v {
        JsValue::Undefined => f64::NAN,
        JsValue::Null => 0.0,
        JsValue::Boolean(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        JsValue::String(s) => string_to_number(s),
        JsValue::Number(n) => n.as_f64(),
        JsValue::Object(o) => {
            let is_array = matches!(o.borrow().kind, ObjectKind::Array(_));
            if is_array {
                string_to_number(&to_string(v))
            } else {
                f64::NAN
            }
        }
    }
}

pub fn to_js_number(v: &JsValue) -> JsNumberType {
    match v {
        JsValue::Number(n) => n.clone(),
        _ => JsNumberType::from_f64(to_number(v)),
    }
}

/// Numeric value of a string per the StringToNumber grammar.
pub fn string_to_number(s: &str) -> f64 {
    let t = s.trim();
    if t.is_empty() {
        return 0.0;
    }
    if let Some(hex) = t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
        return i64::from_str_radix(hex, 16)
            .map(|i| i as f64)
            .unwrap_or(f64::NAN);
    }
    match t {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    let valid = t
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    if !valid {
        return f64::NAN;
    }
    t.parse::<f64>().unwrap_or(f64::NAN)
}

pub fn to_integer(v: &JsValue) -> f64 {
    let n = to_number(v);
    if n.is_nan() {
        0.0
    } else if n.is_infinite() {
        n
    } else {
        n.trunc()
    }
}

pub fn to_int32(v: &JsValue) -> i32 {
    let n = to_number(v);
    if !n.is_finite() {
        return 0;
    }
    (n.trunc() as i64 as u64 & 0xFFFF_FFFF) as u32 as i32
}

pub fn to_uint32(v: &JsValue) -> u32 {
    to_int32(v) as u32
}

pub fn number_to_string(n: &JsNumberType) -> String {
    match n {
        JsNumberType::Integer(i) => i.to_string(),
        JsNumberType::Float(f) => float_to_string(*f),
        JsNumberType::NaN => "NaN".to_string(),
        JsNumberType::PositiveInfinity => "Infinity".to_string(),
        JsNumberType::NegativeInfinity => "-Infinity".to_string(),
    }
}

fn float_to_string(f: f64) -> String {
    if f == 0.0 {
        return "0".to_string();
    }
    let magnitude = f.abs();
    if magnitude >= 1e21 || magnitude < 1e-6 {
        let s = format!("{:e}", f);
        match s.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{}e+{}", mantissa, exponent)
            }
            _ => s,
        }
    } else {
        format!("{}", f)
    }
}

/// ToString for values, without invoking script-defined `toString`.
pub fn to_string(v: &JsValue) -> String {
    let mut visiting = vec![];
    to_string_guarded(v, &mut visiting)
}

fn to_string_guarded(v: &JsValue, visiting: &mut Vec<JsObjectType>) -> String {
    match v {
        JsValue::Undefined => TYPE_STR_UNDEFINED.to_string(),
        JsValue::Null => TYPE_STR_NULL.to_string(),
        JsValue::Boolean(b) => b.to_string(),
        JsValue::String(s) => s.clone(),
        JsValue::Number(n) => number_to_string(n),
        JsValue::Object(o) => {
            if visiting.iter().any(|seen| Rc::ptr_eq(seen, o)) {
                return String::new();
            }
            let items = match &o.borrow().kind {
                ObjectKind::Array(items) => Some(items.clone()),
                _ => None,
            };
            if let Some(items) = items {
                visiting.push(o.clone());
                let parts: Vec<String> = items
                    .iter()
                    .map(|item| match item {
                        JsValue::Undefined | JsValue::Null => String::new(),
                        _ => to_string_guarded(item, visiting),
                    })
                    .collect();
                visiting.pop();
                return parts.join(",");
            }
            let o = o.borrow();
            match &o.kind {
                ObjectKind::Function(_) => o.function_source().unwrap_or_default(),
                ObjectKind::RegExp(r) => format!("/{}/{}", r.source, r.flags),
                ObjectKind::Error => crate::runner::ds::error::describe_thrown(v),
                _ => "[object Object]".to_string(),
            }
        }
    }
}

/// Converts a value used as a property key.
pub fn to_property_key(v: &JsValue) -> String {
    to_string(v)
}
