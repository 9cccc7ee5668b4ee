//! String built-in.
//!
//! Strings are indexed by character. `split`, `replace`, `match` and
//! `search` accept either a string or a RegExp.

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::operations::type_conversion::{to_integer, to_number, to_string, to_uint32};
use crate::runner::ds::value::JsValue;
use crate::runner::eval::call_function;
use crate::runner::eval::function::to_string_with_ctx;
use crate::runner::plugin::registry::BuiltInRegistry;
use crate::runner::plugin::types::{BuiltInObject, EvalContext};

use super::regexp::{find_all, find_from, match_array, matcher_of, MatchInfo};
use super::{arg, relative_index};

/// Register the String built-in with the registry.
pub fn register(registry: &mut BuiltInRegistry) {
    let string = BuiltInObject::new("String")
        .with_constructor(string_constructor)
        .add_method("fromCharCode", string_from_char_code)
        .add_prototype_method("charAt", string_char_at)
        .add_prototype_method("charCodeAt", string_char_code_at)
        .add_prototype_method("codePointAt", string_char_code_at)
        .add_prototype_method("at", string_at)
        .add_prototype_method("indexOf", string_index_of)
        .add_prototype_method("lastIndexOf", string_last_index_of)
        .add_prototype_method("includes", string_includes)
        .add_prototype_method("startsWith", string_starts_with)
        .add_prototype_method("endsWith", string_ends_with)
        .add_prototype_method("slice", string_slice)
        .add_prototype_method("substring", string_substring)
        .add_prototype_method("substr", string_substr)
        .add_prototype_method("toUpperCase", string_to_upper_case)
        .add_prototype_method("toLowerCase", string_to_lower_case)
        .add_prototype_method("toLocaleUpperCase", string_to_upper_case)
        .add_prototype_method("toLocaleLowerCase", string_to_lower_case)
        .add_prototype_method("trim", string_trim)
        .add_prototype_method("trimStart", string_trim_start)
        .add_prototype_method("trimEnd", string_trim_end)
        .add_prototype_method("padStart", string_pad_start)
        .add_prototype_method("padEnd", string_pad_end)
        .add_prototype_method("repeat", string_repeat)
        .add_prototype_method("concat", string_concat)
        .add_prototype_method("split", string_split)
        .add_prototype_method("replace", string_replace)
        .add_prototype_method("replaceAll", string_replace_all)
        .add_prototype_method("match", string_match)
        .add_prototype_method("search", string_search)
        .add_prototype_method("localeCompare", string_locale_compare)
        .add_prototype_method("toString", string_to_string)
        .add_prototype_method("valueOf", string_to_string);

    registry.register_object(string);
}

fn this_string(this: &JsValue, method: &str) -> Result<String, JErrorType> {
    if this.is_nullish() {
        return Err(JErrorType::TypeError(format!(
            "String.prototype.{} called on null or undefined",
            method
        )));
    }
    Ok(to_string(this))
}

fn chars(s: &str) -> Vec<char> {
    s.chars().collect()
}

fn char_slice(s: &[char], start: usize, end: usize) -> String {
    if start >= end {
        String::new()
    } else {
        s[start..end.min(s.len())].iter().collect()
    }
}

/// Character offset of `needle` in `haystack` at or after `from`.
fn index_of_from(haystack: &[char], needle: &[char], from: usize) -> Option<usize> {
    if needle.is_empty() {
        return Some(from.min(haystack.len()));
    }
    if needle.len() > haystack.len() {
        return None;
    }
    (from..=haystack.len() - needle.len()).find(|&i| haystack[i..i + needle.len()] == *needle)
}

/// String constructor. Called with or without `new`, it yields a primitive.
fn string_constructor(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    match args.first() {
        None => Ok(JsValue::String(String::new())),
        Some(v) => Ok(JsValue::String(to_string_with_ctx(v, ctx)?)),
    }
}

/// String.fromCharCode
fn string_from_char_code(
    _ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let s = args
        .iter()
        .map(|v| char::from_u32(to_uint32(v) & 0xFFFF).unwrap_or('\u{FFFD}'))
        .collect();
    Ok(JsValue::String(s))
}

/// String.prototype.charAt
fn string_char_at(
    _ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let s = this_string(&this, "charAt")?;
    let index = to_integer(&arg(&args, 0));
    if index < 0.0 {
        return Ok(JsValue::String(String::new()));
    }
    Ok(JsValue::String(
        s.chars()
            .nth(index as usize)
            .map(|c| c.to_string())
            .unwrap_or_default(),
    ))
}

/// String.prototype.charCodeAt
fn string_char_code_at(
    _ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let s = this_string(&this, "charCodeAt")?;
    let index = to_integer(&arg(&args, 0));
    if index < 0.0 {
        return Ok(JsValue::from_f64(f64::NAN));
    }
    Ok(s.chars()
        .nth(index as usize)
        .map(|c| JsValue::from_i64(c as i64))
        .unwrap_or(JsValue::from_f64(f64::NAN)))
}

/// String.prototype.at
fn string_at(
    _ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let s = chars(&this_string(&this, "at")?);
    let index = to_integer(&arg(&args, 0));
    let index = if index < 0.0 { s.len() as f64 + index } else { index };
    if index < 0.0 || index >= s.len() as f64 {
        return Ok(JsValue::Undefined);
    }
    Ok(JsValue::String(s[index as usize].to_string()))
}

/// String.prototype.indexOf
fn string_index_of(
    _ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let s = chars(&this_string(&this, "indexOf")?);
    let needle = chars(&to_string(&arg(&args, 0)));
    let from = to_integer(&arg(&args, 1)).max(0.0) as usize;
    Ok(JsValue::from_i64(
        index_of_from(&s, &needle, from).map_or(-1, |i| i as i64),
    ))
}

/// String.prototype.lastIndexOf
fn string_last_index_of(
    _ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let s = chars(&this_string(&this, "lastIndexOf")?);
    let needle = chars(&to_string(&arg(&args, 0)));
    if needle.len() > s.len() {
        return Ok(JsValue::from_i64(-1));
    }
    let found = (0..=s.len() - needle.len())
        .rev()
        .find(|&i| s[i..i + needle.len()] == *needle);
    Ok(JsValue::from_i64(found.map_or(-1, |i| i as i64)))
}

/// String.prototype.includes
fn string_includes(
    _ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let s = chars(&this_string(&this, "includes")?);
    let needle = chars(&to_string(&arg(&args, 0)));
    let from = to_integer(&arg(&args, 1)).max(0.0) as usize;
    Ok(JsValue::Boolean(index_of_from(&s, &needle, from).is_some()))
}

/// String.prototype.startsWith
fn string_starts_with(
    _ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let s = chars(&this_string(&this, "startsWith")?);
    let needle = chars(&to_string(&arg(&args, 0)));
    let from = (to_integer(&arg(&args, 1)).max(0.0) as usize).min(s.len());
    Ok(JsValue::Boolean(s[from..].starts_with(&needle)))
}

/// String.prototype.endsWith
fn string_ends_with(
    _ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let s = chars(&this_string(&this, "endsWith")?);
    let needle = chars(&to_string(&arg(&args, 0)));
    let end = match arg(&args, 1) {
        JsValue::Undefined => s.len(),
        other => (to_integer(&other).max(0.0) as usize).min(s.len()),
    };
    Ok(JsValue::Boolean(s[..end].ends_with(&needle)))
}

/// String.prototype.slice
fn string_slice(
    _ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let s = chars(&this_string(&this, "slice")?);
    let start = relative_index(&arg(&args, 0), s.len(), 0);
    let end = relative_index(&arg(&args, 1), s.len(), s.len());
    Ok(JsValue::String(char_slice(&s, start, end)))
}

/// String.prototype.substring
fn string_substring(
    _ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let s = chars(&this_string(&this, "substring")?);
    let clamp = |v: &JsValue, default: usize| match v {
        JsValue::Undefined => default,
        other => {
            let n = to_integer(other);
            if n.is_nan() || n < 0.0 {
                0
            } else {
                (n as usize).min(s.len())
            }
        }
    };
    let a = clamp(&arg(&args, 0), 0);
    let b = clamp(&arg(&args, 1), s.len());
    Ok(JsValue::String(char_slice(&s, a.min(b), a.max(b))))
}

/// String.prototype.substr
fn string_substr(
    _ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let s = chars(&this_string(&this, "substr")?);
    let start = relative_index(&arg(&args, 0), s.len(), 0);
    let length = match arg(&args, 1) {
        JsValue::Undefined => s.len(),
        other => to_integer(&other).max(0.0) as usize,
    };
    Ok(JsValue::String(char_slice(&s, start, start.saturating_add(length))))
}

/// String.prototype.toUpperCase
fn string_to_upper_case(
    _ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(JsValue::String(this_string(&this, "toUpperCase")?.to_uppercase()))
}

/// String.prototype.toLowerCase
fn string_to_lower_case(
    _ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(JsValue::String(this_string(&this, "toLowerCase")?.to_lowercase()))
}

/// String.prototype.trim
fn string_trim(
    _ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(JsValue::String(this_string(&this, "trim")?.trim().to_string()))
}

/// String.prototype.trimStart
fn string_trim_start(
    _ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(JsValue::String(
        this_string(&this, "trimStart")?.trim_start().to_string(),
    ))
}

/// String.prototype.trimEnd
fn string_trim_end(
    _ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(JsValue::String(
        this_string(&this, "trimEnd")?.trim_end().to_string(),
    ))
}

fn padding(s: &str, args: &[JsValue]) -> Result<String, JErrorType> {
    let target = to_integer(&arg(args, 0)).max(0.0) as usize;
    JErrorType::check_string_length(target)?;
    let fill = match arg(args, 1) {
        JsValue::Undefined => " ".to_string(),
        other => to_string(&other),
    };
    let current = s.chars().count();
    if target <= current || fill.is_empty() {
        return Ok(String::new());
    }
    Ok(fill.chars().cycle().take(target - current).collect())
}

/// String.prototype.padStart
fn string_pad_start(
    _ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let s = this_string(&this, "padStart")?;
    Ok(JsValue::String(padding(&s, &args)? + &s))
}

/// String.prototype.padEnd
fn string_pad_end(
    _ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let s = this_string(&this, "padEnd")?;
    let pad = padding(&s, &args)?;
    Ok(JsValue::String(s + &pad))
}

/// String.prototype.repeat
fn string_repeat(
    _ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let s = this_string(&this, "repeat")?;
    let count = to_number(&arg(&args, 0));
    let count = if count.is_nan() { 0.0 } else { count.trunc() };
    if count < 0.0 || count.is_infinite() {
        return Err(JErrorType::RangeError(format!("Invalid count value: {}", count)));
    }
    JErrorType::check_string_length(s.len().saturating_mul(count.min(usize::MAX as f64) as usize))?;
    Ok(JsValue::String(s.repeat(count as usize)))
}

/// String.prototype.concat
fn string_concat(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let mut s = this_string(&this, "concat")?;
    for a in &args {
        let part = to_string_with_ctx(a, ctx)?;
        JErrorType::check_string_length(s.len() + part.len())?;
        s.push_str(&part);
    }
    Ok(JsValue::String(s))
}

/// String.prototype.split
fn string_split(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let s = this_string(&this, "split")?;
    let separator = arg(&args, 0);
    let limit = match arg(&args, 1) {
        JsValue::Undefined => usize::MAX,
        other => to_uint32(&other) as usize,
    };
    let mut parts: Vec<JsValue> = match matcher_of(&separator) {
        Some((matcher, _)) => split_by_regexp(&s, &matcher),
        None => match separator {
            JsValue::Undefined => vec![JsValue::String(s.clone())],
            sep => {
                let sep = to_string(&sep);
                if sep.is_empty() {
                    s.chars().map(|c| JsValue::String(c.to_string())).collect()
                } else {
                    s.split(sep.as_str()).map(JsValue::from_str).collect()
                }
            }
        },
    };
    parts.truncate(limit);
    Ok(ctx.realm.new_array(parts))
}

fn split_by_regexp(s: &str, matcher: &Option<std::rc::Rc<fancy_regex::Regex>>) -> Vec<JsValue> {
    let text = chars(s);
    if text.is_empty() {
        return match find_from(matcher, s, 0) {
            Some(_) => vec![],
            None => vec![JsValue::String(String::new())],
        };
    }
    let mut parts = vec![];
    let mut last = 0;
    for m in find_all(matcher, s) {
        if m.end == m.start && (m.start == 0 || m.start >= text.len()) {
            continue;
        }
        parts.push(JsValue::String(char_slice(&text, last, m.start)));
        parts.extend(
            m.groups
                .iter()
                .skip(1)
                .map(|g| g.clone().map(JsValue::String).unwrap_or(JsValue::Undefined)),
        );
        last = m.end;
    }
    parts.push(JsValue::String(char_slice(&text, last, text.len())));
    parts
}

/// Expands `$$`, `$&`, `` $` ``, `$'` and `$n` in a replacement template.
fn expand_template(template: &str, info: &MatchInfo, text: &[char]) -> String {
    let mut out = String::with_capacity(template.len());
    let tpl: Vec<char> = template.chars().collect();
    let group_count = info.groups.len().saturating_sub(1);
    let mut i = 0;
    while i < tpl.len() {
        let c = tpl[i];
        if c != '$' || i + 1 >= tpl.len() {
            out.push(c);
            i += 1;
            continue;
        }
        match tpl[i + 1] {
            '$' => {
                out.push('$');
                i += 2;
            }
            '&' => {
                out.push_str(info.groups[0].as_deref().unwrap_or(""));
                i += 2;
            }
            '`' => {
                out.push_str(&char_slice(text, 0, info.start));
                i += 2;
            }
            '\'' => {
                out.push_str(&char_slice(text, info.end, text.len()));
                i += 2;
            }
            d if d.is_ascii_digit() => {
                let one = d.to_digit(10).unwrap_or(0) as usize;
                let two = tpl
                    .get(i + 2)
                    .and_then(|c| c.to_digit(10))
                    .map(|d2| one * 10 + d2 as usize);
                match two {
                    Some(n) if n >= 1 && n <= group_count => {
                        out.push_str(info.groups[n].as_deref().unwrap_or(""));
                        i += 3;
                    }
                    _ if one >= 1 && one <= group_count => {
                        out.push_str(info.groups[one].as_deref().unwrap_or(""));
                        i += 2;
                    }
                    _ => {
                        out.push('$');
                        i += 1;
                    }
                }
            }
            _ => {
                out.push('$');
                i += 1;
            }
        }
    }
    out
}

fn replacement_for(
    ctx: &mut EvalContext,
    replacement: &JsValue,
    info: &MatchInfo,
    text: &[char],
    input: &str,
) -> Result<String, JErrorType> {
    if replacement.is_callable() {
        let mut call_args: Vec<JsValue> = info
            .groups
            .iter()
            .map(|g| g.clone().map(JsValue::String).unwrap_or(JsValue::Undefined))
            .collect();
        call_args.push(JsValue::from_i64(info.start as i64));
        call_args.push(JsValue::from_str(input));
        let result = call_function(replacement, JsValue::Undefined, call_args, ctx)?;
        return to_string_with_ctx(&result, ctx);
    }
    Ok(expand_template(&to_string(replacement), info, text))
}

fn replace_matches(
    ctx: &mut EvalContext,
    input: &str,
    matches: Vec<MatchInfo>,
    replacement: &JsValue,
) -> Result<JsValue, JErrorType> {
    let text = chars(input);
    let mut out = String::with_capacity(input.len());
    let mut last = 0;
    for info in matches {
        out.push_str(&char_slice(&text, last, info.start));
        out.push_str(&replacement_for(ctx, replacement, &info, &text, input)?);
        last = info.end;
    }
    out.push_str(&char_slice(&text, last, text.len()));
    Ok(JsValue::String(out))
}

fn literal_matches(text: &[char], needle: &str, all: bool) -> Vec<MatchInfo> {
    let needle_chars = chars(needle);
    let mut found = vec![];
    let mut from = 0;
    while let Some(start) = index_of_from(text, &needle_chars, from) {
        let end = start + needle_chars.len();
        found.push(MatchInfo {
            start,
            end,
            groups: vec![Some(needle.to_string())],
        });
        if !all {
            break;
        }
        from = if end == start { end + 1 } else { end };
        if from > text.len() {
            break;
        }
    }
    found
}

fn replace_impl(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
    method: &str,
    replace_all: bool,
) -> Result<JsValue, JErrorType> {
    let s = this_string(&this, method)?;
    let pattern = arg(&args, 0);
    let replacement = arg(&args, 1);
    let matches = match matcher_of(&pattern) {
        Some((matcher, global)) => {
            if replace_all && !global {
                return Err(JErrorType::TypeError(
                    "replaceAll must be called with a global RegExp".to_string(),
                ));
            }
            if global {
                find_all(&matcher, &s)
            } else {
                find_from(&matcher, &s, 0).into_iter().collect()
            }
        }
        None => literal_matches(&chars(&s), &to_string(&pattern), replace_all),
    };
    replace_matches(ctx, &s, matches, &replacement)
}

/// String.prototype.replace
fn string_replace(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    replace_impl(ctx, this, args, "replace", false)
}

/// String.prototype.replaceAll
fn string_replace_all(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    replace_impl(ctx, this, args, "replaceAll", true)
}

/// String.prototype.match
fn string_match(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let s = this_string(&this, "match")?;
    let pattern = arg(&args, 0);
    let (matcher, global) = match matcher_of(&pattern) {
        Some(m) => m,
        None => {
            let source = match &pattern {
                JsValue::Undefined => String::new(),
                other => to_string(other),
            };
            let re = ctx.realm.new_regexp(&source, "");
            matcher_of(&re).unwrap_or((None, false))
        }
    };
    if global {
        let all = find_all(&matcher, &s);
        if all.is_empty() {
            return Ok(JsValue::Null);
        }
        let items = all
            .into_iter()
            .map(|m| m.groups[0].clone().map(JsValue::String).unwrap_or(JsValue::Undefined))
            .collect();
        return Ok(ctx.realm.new_array(items));
    }
    Ok(match find_from(&matcher, &s, 0) {
        Some(info) => match_array(ctx, &info, &s),
        None => JsValue::Null,
    })
}

/// String.prototype.search
fn string_search(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let s = this_string(&this, "search")?;
    let pattern = arg(&args, 0);
    let matcher = match matcher_of(&pattern) {
        Some((m, _)) => m,
        None => {
            let re = ctx.realm.new_regexp(&to_string(&pattern), "");
            matcher_of(&re).and_then(|(m, _)| m)
        }
    };
    Ok(JsValue::from_i64(
        find_from(&matcher, &s, 0).map_or(-1, |m| m.start as i64),
    ))
}

/// String.prototype.localeCompare
fn string_locale_compare(
    _ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let s = this_string(&this, "localeCompare")?;
    let other = to_string(&arg(&args, 0));
    Ok(JsValue::from_i64(match s.cmp(&other) {
        std::cmp::Ordering::Less => -1,
        std::cmp::Ordering::Equal => 0,
        std::cmp::Ordering::Greater => 1,
    }))
}

/// String.prototype.toString
fn string_to_string(
    _ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    match this {
        JsValue::String(_) => Ok(this),
        other => Err(JErrorType::TypeError(format!(
            "String.prototype.toString requires that 'this' be a String, not {}",
            to_string(&other)
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> EvalContext {
        let mut ctx = EvalContext::new();
        ctx.install_core_builtins(BuiltInRegistry::with_core());
        ctx
    }

    fn s(v: &str) -> JsValue {
        JsValue::from_str(v)
    }

    #[test]
    fn test_replace_with_group_references() {
        let mut ctx = ctx();
        let re = ctx.realm.new_regexp("(\\w+) (\\w+)", "");
        let out = string_replace(&mut ctx, s("John Smith"), vec![re, s("$2, $1")]).unwrap();
        assert_eq!(out, s("Smith, John"));
    }

    #[test]
    fn test_replace_string_pattern_only_first() {
        let mut ctx = ctx();
        let out = string_replace(&mut ctx, s("a-b-c"), vec![s("-"), s("+")]).unwrap();
        assert_eq!(out, s("a+b-c"));
        let all = string_replace_all(&mut ctx, s("a-b-c"), vec![s("-"), s("+")]).unwrap();
        assert_eq!(all, s("a+b+c"));
    }

    #[test]
    fn test_split_by_regexp() {
        let mut ctx = ctx();
        let re = ctx.realm.new_regexp(",\\s*", "");
        let parts = string_split(&mut ctx, s("a, b,c"), vec![re]).unwrap();
        assert_eq!(to_string(&parts), "a,b,c");
    }

    #[test]
    fn test_split_empty_separator_gives_chars() {
        let mut ctx = ctx();
        let parts = string_split(&mut ctx, s("abc"), vec![s("")]).unwrap();
        assert_eq!(to_string(&parts), "a,b,c");
    }

    #[test]
    fn test_substring_swaps_arguments() {
        let mut ctx = ctx();
        let out = string_substring(&mut ctx, s("hello"), vec![JsValue::from_i64(4), JsValue::from_i64(1)]).unwrap();
        assert_eq!(out, s("ell"));
    }

    #[test]
    fn test_global_match_returns_all() {
        let mut ctx = ctx();
        let re = ctx.realm.new_regexp("\\d+", "g");
        let out = string_match(&mut ctx, s("1d6 + 2d8"), vec![re]).unwrap();
        assert_eq!(to_string(&out), "1,6,2,8");
    }

    #[test]
    fn test_pad_start() {
        let mut ctx = ctx();
        let out = string_pad_start(&mut ctx, s("7"), vec![JsValue::from_i64(3), s("0")]).unwrap();
        assert_eq!(out, s("007"));
    }

    #[test]
    fn test_oversized_strings_are_range_errors() {
        let mut ctx = ctx();
        let repeated = string_repeat(&mut ctx, s("ab"), vec![JsValue::from_f64(1e12)]);
        assert!(matches!(repeated, Err(JErrorType::RangeError(ref m)) if m == "Invalid string length"));
        let padded = string_pad_end(&mut ctx, s("x"), vec![JsValue::from_f64(1e15), s("-")]);
        assert!(matches!(padded, Err(JErrorType::RangeError(_))));
        assert_eq!(string_repeat(&mut ctx, s("ab"), vec![JsValue::from_i64(3)]).unwrap(), s("ababab"));
    }
}
