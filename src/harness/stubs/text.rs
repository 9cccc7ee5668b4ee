//! Text helpers: the description joiner and the pass-through formatters.

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::object::ObjectKind;
use crate::runner::ds::operations::type_conversion::to_string;
use crate::runner::ds::value::JsValue;
use crate::runner::plugin::types::EvalContext;

use super::{StubState, StubTable};

/// Separator `desc` uses when none is given: a newline and a three-space indent.
pub const DEFAULT_DESC_SEPARATOR: &str = "\n   ";

pub fn register(table: &mut StubTable) {
    table
        .add_function("desc", desc)
        .add_function("toUni", to_uni)
        .add_function("formatDescriptionFull", format_description_full)
        .add_function("stringSource", string_source);
}

fn first_arg(args: Vec<JsValue>) -> JsValue {
    args.into_iter().next().unwrap_or(JsValue::Undefined)
}

/// `desc(lines, separator?)`
pub fn desc(
    _state: &StubState,
    _ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let separator = match args.get(1) {
        None | Some(JsValue::Undefined) | Some(JsValue::Null) => DEFAULT_DESC_SEPARATOR.to_string(),
        Some(sep) => to_string(sep),
    };
    let input = first_arg(args);
    let items = match &input {
        JsValue::Object(o) => match &o.borrow().kind {
            ObjectKind::Array(items) => Some(items.clone()),
            _ => None,
        },
        _ => None,
    };
    Ok(JsValue::String(match items {
        Some(items) => items
            .iter()
            .map(|item| match item {
                JsValue::Undefined | JsValue::Null => String::new(),
                other => to_string(other),
            })
            .collect::<Vec<_>>()
            .join(&separator),
        None => to_string(&input),
    }))
}

/// `toUni(text)`: underline-marker text, returned unchanged.
fn to_uni(
    _state: &StubState,
    _ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(first_arg(args))
}

/// `formatDescriptionFull(text)`: document text, returned unchanged.
fn format_description_full(
    _state: &StubState,
    _ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(first_arg(args))
}

/// `stringSource(text)`: source-category text, returned unchanged.
fn string_source(
    _state: &StubState,
    _ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(first_arg(args))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    use crate::harness::registry::RegistrySet;

    fn call_desc(ctx: &mut EvalContext, args: Vec<JsValue>) -> JsValue {
        let registries = Rc::new(RegistrySet::install(ctx));
        let state = StubState::new(registries);
        desc(&state, ctx, JsValue::Undefined, args).unwrap()
    }

    #[test]
    fn test_desc_joins_with_default_separator() {
        let mut ctx = EvalContext::new();
        let lines = ctx
            .realm
            .new_array(vec![JsValue::from_str("one"), JsValue::from_str("two")]);
        assert_eq!(call_desc(&mut ctx, vec![lines]), JsValue::from_str("one\n   two"));
    }

    #[test]
    fn test_desc_custom_separator_and_null_items() {
        let mut ctx = EvalContext::new();
        let lines = ctx
            .realm
            .new_array(vec![JsValue::from_str("a"), JsValue::Null, JsValue::from_str("b")]);
        assert_eq!(
            call_desc(&mut ctx, vec![lines, JsValue::from_str("|")]),
            JsValue::from_str("a||b")
        );
    }

    #[test]
    fn test_desc_coerces_non_sequences() {
        let mut ctx = EvalContext::new();
        assert_eq!(call_desc(&mut ctx, vec![JsValue::from_i64(7)]), JsValue::from_str("7"));
        assert_eq!(call_desc(&mut ctx, vec![]), JsValue::from_str("undefined"));
    }
}
