use std::rc::Rc;

use crate::runner::ds::operations::type_conversion::{to_number, to_string};
use crate::runner::ds::value::{JsNumberType, JsValue};

fn number_equals(a: &JsNumberType, b: &JsNumberType) -> bool {
    match (a, b) {
        (JsNumberType::Integer(x), JsNumberType::Integer(y)) => x == y,
        _ => a.as_f64() == b.as_f64(),
    }
}

/// The `===` comparison.
pub fn strict_equality(a: &JsValue, b: &JsValue) -> bool {
    match (a, b) {
        (JsValue::Undefined, JsValue::Undefined) | (JsValue::Null, JsValue::Null) => true,
        (JsValue::Boolean(x), JsValue::Boolean(y)) => x == y,
        (JsValue::String(x), JsValue::String(y)) => x == y,
        (JsValue::Number(x), JsValue::Number(y)) => number_equals(x, y),
        (JsValue::Object(x), JsValue::Object(y)) => Rc::ptr_eq(x, y),
        _ => false,
    }
}

/// The `==` comparison.
pub fn loose_equality(a: &JsValue, b: &JsValue) -> bool {
    match (a, b) {
        (JsValue::Undefined | JsValue::Null, JsValue::Undefined | JsValue::Null) => true,
        (JsValue::Undefined | JsValue::Null, _) | (_, JsValue::Undefined | JsValue::Null) => false,
        (JsValue::Object(_), JsValue::Object(_)) => strict_equality(a, b),
        (JsValue::Object(_), _) => loose_equality(&JsValue::String(to_string(a)), b),
        (_, JsValue::Object(_)) => loose_equality(a, &JsValue::String(to_string(b))),
        (JsValue::String(x), JsValue::String(y)) => x == y,
        (JsValue::Boolean(x), JsValue::Boolean(y)) => x == y,
        _ => to_number(a) == to_number(b),
    }
}

/// SameValueZero, as used by `includes`.
pub fn same_value_zero(a: &JsValue, b: &JsValue) -> bool {
    match (a, b) {
        (JsValue::Number(JsNumberType::NaN), JsValue::Number(JsNumberType::NaN)) => true,
        _ => strict_equality(a, b),
    }
}

/// The abstract relational comparison `a < b`; `None` when either side is NaN.
pub fn less_than(a: &JsValue, b: &JsValue) -> Option<bool> {
    if let (JsValue::String(x), JsValue::String(y)) = (a, b) {
        return Some(x < y);
    }
    let both_strings_after_conversion = matches!(
        (a, b),
        (JsValue::Object(_), JsValue::String(_))
            | (JsValue::String(_), JsValue::Object(_))
    );
    if both_strings_after_conversion {
        return Some(to_string(a) < to_string(b));
    }
    let x = to_number(a);
    let y = to_number(b);
    if x.is_nan() || y.is_nan() {
        None
    } else {
        Some(x < y)
    }
}
