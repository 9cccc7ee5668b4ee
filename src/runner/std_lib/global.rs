//! Global functions and constants.

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::operations::type_conversion::{to_int32, to_number, to_string};
use crate::runner::ds::value::{JsNumberType, JsValue};
use crate::runner::plugin::registry::BuiltInRegistry;
use crate::runner::plugin::types::EvalContext;

use super::arg;

/// Register the global functions and constants with the registry.
pub fn register(registry: &mut BuiltInRegistry) {
    registry.register_function("parseInt", global_parse_int);
    registry.register_function("parseFloat", global_parse_float);
    registry.register_function("isNaN", global_is_nan);
    registry.register_function("isFinite", global_is_finite);
    registry.register_constant("NaN", JsValue::Number(JsNumberType::NaN));
    registry.register_constant("Infinity", JsValue::Number(JsNumberType::PositiveInfinity));
    registry.register_constant("undefined", JsValue::Undefined);
}

/// parseInt
pub(crate) fn global_parse_int(
    _ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let input = to_string(&arg(&args, 0));
    let mut s = input.trim_start();
    let negative = s.starts_with('-');
    if negative || s.starts_with('+') {
        s = &s[1..];
    }
    let mut radix = match arg(&args, 1) {
        JsValue::Undefined => 0,
        other => to_int32(&other),
    };
    if radix != 0 && !(2..=36).contains(&radix) {
        return Ok(JsValue::from_f64(f64::NAN));
    }
    if (radix == 0 || radix == 16) && (s.starts_with("0x") || s.starts_with("0X")) {
        s = &s[2..];
        radix = 16;
    }
    if radix == 0 {
        radix = 10;
    }
    let digits: String = s
        .chars()
        .take_while(|c| c.to_digit(radix as u32).is_some())
        .collect();
    if digits.is_empty() {
        return Ok(JsValue::from_f64(f64::NAN));
    }
    let mut value = 0.0_f64;
    for c in digits.chars() {
        value = value * radix as f64 + c.to_digit(radix as u32).unwrap_or(0) as f64;
    }
    Ok(JsValue::from_f64(if negative { -value } else { value }))
}

/// parseFloat
pub(crate) fn global_parse_float(
    _ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let input = to_string(&arg(&args, 0));
    let s = input.trim_start();
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'-') => (-1.0, &s[1..]),
        Some(b'+') => (1.0, &s[1..]),
        _ => (1.0, s),
    };
    if rest.starts_with("Infinity") {
        return Ok(JsValue::from_f64(sign * f64::INFINITY));
    }
    let bytes = rest.as_bytes();
    let mut end = 0;
    let mut seen_dot = false;
    let mut seen_digit = false;
    while end < bytes.len() {
        match bytes[end] {
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end += 1;
    }
    if !seen_digit {
        return Ok(JsValue::from_f64(f64::NAN));
    }
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > digits_start {
            end = exp_end;
        }
    }
    let value = rest[..end].parse::<f64>().unwrap_or(f64::NAN);
    Ok(JsValue::from_f64(sign * value))
}

/// isNaN
fn global_is_nan(
    _ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(JsValue::Boolean(to_number(&arg(&args, 0)).is_nan()))
}

/// isFinite
fn global_is_finite(
    _ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(JsValue::Boolean(to_number(&arg(&args, 0)).is_finite()))
}
