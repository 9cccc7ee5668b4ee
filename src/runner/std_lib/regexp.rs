//! RegExp built-in.
//!
//! Matching runs on `fancy_regex`; indices seen by scripts are character
//! offsets, converted to byte offsets at the engine boundary.

use std::rc::Rc;

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::object::{JsObjectType, ObjectKind};
use crate::runner::ds::operations::type_conversion::to_string;
use crate::runner::ds::value::JsValue;
use crate::runner::plugin::registry::BuiltInRegistry;
use crate::runner::plugin::types::{BuiltInObject, EvalContext};

use super::arg;

/// Register the RegExp built-in with the registry.
pub fn register(registry: &mut BuiltInRegistry) {
    let regexp = BuiltInObject::new("RegExp")
        .with_constructor(regexp_constructor)
        .add_prototype_method("test", regexp_test)
        .add_prototype_method("exec", regexp_exec)
        .add_prototype_method("toString", regexp_to_string);

    registry.register_object(regexp);
}

/// One successful match, in character offsets.
pub(crate) struct MatchInfo {
    pub start: usize,
    pub end: usize,
    /// Group 0 followed by every capture group; `None` for groups that did not take part.
    pub groups: Vec<Option<String>>,
}

pub(crate) fn char_to_byte(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map(|(b, _)| b)
        .unwrap_or(text.len())
}

pub(crate) fn byte_to_char(text: &str, byte_index: usize) -> usize {
    text[..byte_index].chars().count()
}

/// The compiled matcher of a RegExp value, with its global flag.
pub(crate) fn matcher_of(value: &JsValue) -> Option<(Option<Rc<fancy_regex::Regex>>, bool)> {
    match value {
        JsValue::Object(o) => match &o.borrow().kind {
            ObjectKind::RegExp(r) => Some((r.matcher.clone(), r.is_global())),
            _ => None,
        },
        _ => None,
    }
}

/// Finds the first match at or after character offset `from`.
///
/// A pattern that failed to compile never matches.
pub(crate) fn find_from(
    matcher: &Option<Rc<fancy_regex::Regex>>,
    text: &str,
    from: usize,
) -> Option<MatchInfo> {
    let regex = matcher.as_ref()?;
    let byte_from = char_to_byte(text, from);
    if byte_from > text.len() {
        return None;
    }
    let captures = match regex.captures_from_pos(text, byte_from) {
        Ok(Some(c)) => c,
        Ok(None) => return None,
        Err(e) => {
            tracing::debug!(error = %e, "regular expression match aborted");
            return None;
        }
    };
    let whole = captures.get(0)?;
    let groups = (0..captures.len())
        .map(|i| captures.get(i).map(|m| m.as_str().to_string()))
        .collect();
    Some(MatchInfo {
        start: byte_to_char(text, whole.start()),
        end: byte_to_char(text, whole.end()),
        groups,
    })
}

/// Every non-overlapping match, advancing past empty matches.
pub(crate) fn find_all(matcher: &Option<Rc<fancy_regex::Regex>>, text: &str) -> Vec<MatchInfo> {
    let total = text.chars().count();
    let mut matches = vec![];
    let mut from = 0;
    while from <= total {
        let Some(m) = find_from(matcher, text, from) else {
            break;
        };
        from = if m.end == m.start { m.end + 1 } else { m.end };
        matches.push(m);
    }
    matches
}

/// Builds the array `exec` and `match` return.
pub(crate) fn match_array(ctx: &EvalContext, info: &MatchInfo, input: &str) -> JsValue {
    let items = info
        .groups
        .iter()
        .map(|g| g.clone().map(JsValue::String).unwrap_or(JsValue::Undefined))
        .collect();
    let array = ctx.realm.new_array(items);
    if let JsValue::Object(o) = &array {
        let mut o = o.borrow_mut();
        o.set_own_property("index", JsValue::from_i64(info.start as i64));
        o.set_own_property("input", JsValue::from_str(input));
    }
    array
}

fn this_regexp(this: &JsValue, method: &str) -> Result<JsObjectType, JErrorType> {
    match this {
        JsValue::Object(o) if matches!(o.borrow().kind, ObjectKind::RegExp(_)) => Ok(o.clone()),
        _ => Err(JErrorType::TypeError(format!(
            "RegExp.prototype.{} called on incompatible receiver {}",
            method,
            to_string(this)
        ))),
    }
}

/// RegExp constructor.
fn regexp_constructor(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let pattern = arg(&args, 0);
    let flags = match arg(&args, 1) {
        JsValue::Undefined => None,
        other => Some(to_string(&other)),
    };
    let (source, existing_flags) = match &pattern {
        JsValue::Object(o) => match &o.borrow().kind {
            ObjectKind::RegExp(r) => (r.source.clone(), r.flags.clone()),
            _ => (to_string(&pattern), String::new()),
        },
        JsValue::Undefined => ("(?:)".to_string(), String::new()),
        _ => (to_string(&pattern), String::new()),
    };
    let flags = flags.unwrap_or(existing_flags);
    if let Some(bad) = flags.chars().find(|c| !"gimsuy".contains(*c)) {
        return Err(JErrorType::SyntaxError(format!(
            "Invalid regular expression flags '{}'",
            bad
        )));
    }
    Ok(ctx.realm.new_regexp(&source, &flags))
}

/// Runs one `exec` step, honouring and updating `lastIndex` for global patterns.
fn exec_step(regexp: &JsObjectType, input: &str) -> Option<MatchInfo> {
    let (matcher, global, last_index) = match &regexp.borrow().kind {
        ObjectKind::RegExp(r) => (r.matcher.clone(), r.is_global() || r.flags.contains('y'), r.last_index),
        _ => return None,
    };
    let from = if global { last_index } else { 0 };
    let found = if from > input.chars().count() {
        None
    } else {
        find_from(&matcher, input, from)
    };
    if global {
        if let ObjectKind::RegExp(r) = &mut regexp.borrow_mut().kind {
            r.last_index = match &found {
                Some(m) if m.end == m.start => m.end + 1,
                Some(m) => m.end,
                None => 0,
            };
        }
    }
    found
}

/// RegExp.prototype.test
fn regexp_test(
    _ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let regexp = this_regexp(&this, "test")?;
    let input = to_string(&arg(&args, 0));
    Ok(JsValue::Boolean(exec_step(&regexp, &input).is_some()))
}

/// RegExp.prototype.exec
fn regexp_exec(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let regexp = this_regexp(&this, "exec")?;
    let input = to_string(&arg(&args, 0));
    Ok(match exec_step(&regexp, &input) {
        Some(info) => match_array(ctx, &info, &input),
        None => JsValue::Null,
    })
}

/// RegExp.prototype.toString
fn regexp_to_string(
    _ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    this_regexp(&this, "toString")?;
    Ok(JsValue::String(to_string(&this)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_are_in_characters() {
        let ctx = EvalContext::new();
        let re = ctx.realm.new_regexp("b", "");
        let (matcher, _) = matcher_of(&re).unwrap();
        let m = find_from(&matcher, "äb", 0).unwrap();
        assert_eq!((m.start, m.end), (1, 2));
    }

    #[test]
    fn test_global_exec_advances_last_index() {
        let mut ctx = EvalContext::new();
        let re = ctx.realm.new_regexp("a", "g");
        let first = regexp_exec(&mut ctx, re.clone(), vec![JsValue::from_str("aXa")]).unwrap();
        assert!(matches!(first, JsValue::Object(_)));
        let second = regexp_exec(&mut ctx, re.clone(), vec![JsValue::from_str("aXa")]).unwrap();
        let index = second.as_object().unwrap().borrow().get_own_property("index");
        assert_eq!(index, Some(JsValue::from_i64(2)));
        let third = regexp_exec(&mut ctx, re, vec![JsValue::from_str("aXa")]).unwrap();
        assert_eq!(third, JsValue::Null);
    }

    #[test]
    fn test_lookahead_is_supported() {
        let ctx = EvalContext::new();
        let re = ctx.realm.new_regexp("\\d+(?= ft)", "");
        let (matcher, _) = matcher_of(&re).unwrap();
        let m = find_from(&matcher, "range 30 ft", 0).unwrap();
        assert_eq!(m.groups[0].as_deref(), Some("30"));
    }

    #[test]
    fn test_find_all_skips_empty_matches() {
        let ctx = EvalContext::new();
        let re = ctx.realm.new_regexp("x*", "g");
        let (matcher, _) = matcher_of(&re).unwrap();
        assert_eq!(find_all(&matcher, "ab").len(), 3);
    }
}
