//! Number and Boolean built-ins.

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::operations::type_conversion::{number_to_string, to_boolean, to_integer, to_js_number, to_number};
use crate::runner::ds::value::{JsNumberType, JsValue};
use crate::runner::plugin::registry::BuiltInRegistry;
use crate::runner::plugin::types::{BuiltInObject, EvalContext};

use super::arg;
use super::global::{global_parse_float, global_parse_int};

/// Register the Number and Boolean built-ins with the registry.
pub fn register(registry: &mut BuiltInRegistry) {
    let number = BuiltInObject::new("Number")
        .with_constructor(number_constructor)
        .add_property("MAX_SAFE_INTEGER", JsValue::from_i64(9_007_199_254_740_991))
        .add_property("MIN_SAFE_INTEGER", JsValue::from_i64(-9_007_199_254_740_991))
        .add_property("MAX_VALUE", JsValue::from_f64(f64::MAX))
        .add_property("MIN_VALUE", JsValue::from_f64(5e-324))
        .add_property("EPSILON", JsValue::from_f64(f64::EPSILON))
        .add_property("POSITIVE_INFINITY", JsValue::Number(JsNumberType::PositiveInfinity))
        .add_property("NEGATIVE_INFINITY", JsValue::Number(JsNumberType::NegativeInfinity))
        .add_property("NaN", JsValue::Number(JsNumberType::NaN))
        .add_method("isInteger", number_is_integer)
        .add_method("isSafeInteger", number_is_integer)
        .add_method("isFinite", number_is_finite)
        .add_method("isNaN", number_is_nan)
        .add_method("parseFloat", global_parse_float)
        .add_method("parseInt", global_parse_int)
        .add_prototype_method("toFixed", number_to_fixed)
        .add_prototype_method("toPrecision", number_to_precision)
        .add_prototype_method("toString", number_to_string_method)
        .add_prototype_method("toLocaleString", number_to_string_method)
        .add_prototype_method("valueOf", number_value_of);

    let boolean = BuiltInObject::new("Boolean")
        .with_constructor(boolean_constructor)
        .add_prototype_method("toString", boolean_to_string)
        .add_prototype_method("valueOf", boolean_value_of);

    registry.register_object(number);
    registry.register_object(boolean);
}

fn this_number(this: &JsValue, method: &str) -> Result<f64, JErrorType> {
    match this {
        JsValue::Number(n) => Ok(n.as_f64()),
        _ => Err(JErrorType::TypeError(format!(
            "Number.prototype.{} requires that 'this' be a Number",
            method
        ))),
    }
}

/// Number constructor. Yields a primitive.
fn number_constructor(
    _ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(match args.first() {
        None => JsValue::from_i64(0),
        Some(v) => JsValue::Number(to_js_number(v)),
    })
}

/// Number.isInteger
fn number_is_integer(
    _ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(JsValue::Boolean(match arg(&args, 0) {
        JsValue::Number(n) => n.is_finite() && n.as_f64().fract() == 0.0,
        _ => false,
    }))
}

/// Number.isFinite
fn number_is_finite(
    _ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(JsValue::Boolean(matches!(arg(&args, 0), JsValue::Number(n) if n.is_finite())))
}

/// Number.isNaN
fn number_is_nan(
    _ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(JsValue::Boolean(matches!(
        arg(&args, 0),
        JsValue::Number(JsNumberType::NaN)
    )))
}

/// Number.prototype.toFixed
fn number_to_fixed(
    _ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let n = this_number(&this, "toFixed")?;
    let digits = to_integer(&arg(&args, 0));
    if !(0.0..=100.0).contains(&digits) {
        return Err(JErrorType::RangeError(
            "toFixed() digits argument must be between 0 and 100".to_string(),
        ));
    }
    if !n.is_finite() || n.abs() >= 1e21 {
        return Ok(JsValue::String(number_to_string(&JsNumberType::from_f64(n))));
    }
    Ok(JsValue::String(format!("{:.*}", digits as usize, n)))
}

/// Number.prototype.toPrecision
fn number_to_precision(
    _ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let n = this_number(&this, "toPrecision")?;
    if matches!(arg(&args, 0), JsValue::Undefined) || !n.is_finite() {
        return Ok(JsValue::String(number_to_string(&JsNumberType::from_f64(n))));
    }
    let precision = to_integer(&arg(&args, 0));
    if !(1.0..=100.0).contains(&precision) {
        return Err(JErrorType::RangeError(
            "toPrecision() argument must be between 1 and 100".to_string(),
        ));
    }
    let precision = precision as i32;
    let magnitude = if n == 0.0 { 0 } else { n.abs().log10().floor() as i32 };
    if magnitude < -6 || magnitude >= precision {
        return Ok(JsValue::String(format!("{:.*e}", (precision - 1) as usize, n)));
    }
    let decimals = (precision - 1 - magnitude).max(0) as usize;
    Ok(JsValue::String(format!("{:.*}", decimals, n)))
}

/// Number.prototype.toString
fn number_to_string_method(
    _ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let n = this_number(&this, "toString")?;
    let radix = match arg(&args, 0) {
        JsValue::Undefined => 10,
        other => to_integer(&other) as u32,
    };
    if !(2..=36).contains(&radix) {
        return Err(JErrorType::RangeError(
            "toString() radix must be between 2 and 36".to_string(),
        ));
    }
    if radix == 10 || !n.is_finite() || n.fract() != 0.0 {
        return Ok(JsValue::String(number_to_string(&JsNumberType::from_f64(n))));
    }
    let negative = n < 0.0;
    let mut value = n.abs() as u64;
    let mut digits = vec![];
    loop {
        let d = (value % radix as u64) as u32;
        digits.push(std::char::from_digit(d, radix).unwrap_or('0'));
        value /= radix as u64;
        if value == 0 {
            break;
        }
    }
    if negative {
        digits.push('-');
    }
    Ok(JsValue::String(digits.into_iter().rev().collect()))
}

/// Number.prototype.valueOf
fn number_value_of(
    _ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(JsValue::from_f64(this_number(&this, "valueOf")?))
}

/// Boolean constructor. Yields a primitive.
fn boolean_constructor(
    _ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(JsValue::Boolean(to_boolean(&arg(&args, 0))))
}

/// Boolean.prototype.toString
fn boolean_to_string(
    _ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    match this {
        JsValue::Boolean(b) => Ok(JsValue::String(b.to_string())),
        _ => Err(JErrorType::TypeError(
            "Boolean.prototype.toString requires that 'this' be a Boolean".to_string(),
        )),
    }
}

/// Boolean.prototype.valueOf
fn boolean_value_of(
    _ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    match this {
        JsValue::Boolean(_) => Ok(this),
        other => Ok(JsValue::Boolean(to_number(&other) != 0.0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(f: crate::runner::plugin::types::NativeFn, this: JsValue, args: Vec<JsValue>) -> JsValue {
        let mut ctx = EvalContext::new();
        f(&mut ctx, this, args).unwrap()
    }

    #[test]
    fn test_to_fixed() {
        let out = call(number_to_fixed, JsValue::from_f64(2.5), vec![JsValue::from_i64(2)]);
        assert_eq!(out, JsValue::from_str("2.50"));
    }

    #[test]
    fn test_to_string_radix() {
        let out = call(number_to_string_method, JsValue::from_i64(255), vec![JsValue::from_i64(16)]);
        assert_eq!(out, JsValue::from_str("ff"));
    }

    #[test]
    fn test_is_integer() {
        assert_eq!(
            call(number_is_integer, JsValue::Undefined, vec![JsValue::from_f64(3.0)]),
            JsValue::Boolean(true)
        );
        assert_eq!(
            call(number_is_integer, JsValue::Undefined, vec![JsValue::from_str("3")]),
            JsValue::Boolean(false)
        );
    }

    #[test]
    fn test_constructor_converts_strings() {
        let out = call(number_constructor, JsValue::Undefined, vec![JsValue::from_str(" 12 ")]);
        assert_eq!(out, JsValue::from_i64(12));
    }
}
