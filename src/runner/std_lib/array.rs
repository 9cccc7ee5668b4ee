//! Array built-in.
//!
//! Provides the Array constructor, `Array.isArray`/`from`/`of` and the
//! prototype methods content scripts use to build and walk lists.

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::object::{JsObjectType, ObjectKind};
use crate::runner::ds::operations::object::get_property;
use crate::runner::ds::operations::test_and_comparison::{same_value_zero, strict_equality};
use crate::runner::ds::operations::type_conversion::{to_boolean, to_integer, to_number, to_string};
use crate::runner::ds::value::JsValue;
use crate::runner::eval::call_function;
use crate::runner::eval::function::to_string_with_ctx;
use crate::runner::plugin::registry::BuiltInRegistry;
use crate::runner::plugin::types::{BuiltInObject, EvalContext};

use super::{arg, relative_index};

/// Register the Array built-in with the registry.
pub fn register(registry: &mut BuiltInRegistry) {
    let array = BuiltInObject::new("Array")
        .with_constructor(array_constructor)
        .add_method("isArray", array_is_array)
        .add_method("from", array_from)
        .add_method("of", array_of)
        .add_prototype_method("push", array_push)
        .add_prototype_method("pop", array_pop)
        .add_prototype_method("shift", array_shift)
        .add_prototype_method("unshift", array_unshift)
        .add_prototype_method("slice", array_slice)
        .add_prototype_method("splice", array_splice)
        .add_prototype_method("concat", array_concat)
        .add_prototype_method("join", array_join)
        .add_prototype_method("reverse", array_reverse)
        .add_prototype_method("indexOf", array_index_of)
        .add_prototype_method("lastIndexOf", array_last_index_of)
        .add_prototype_method("includes", array_includes)
        .add_prototype_method("find", array_find)
        .add_prototype_method("findIndex", array_find_index)
        .add_prototype_method("filter", array_filter)
        .add_prototype_method("map", array_map)
        .add_prototype_method("forEach", array_for_each)
        .add_prototype_method("reduce", array_reduce)
        .add_prototype_method("reduceRight", array_reduce_right)
        .add_prototype_method("some", array_some)
        .add_prototype_method("every", array_every)
        .add_prototype_method("sort", array_sort)
        .add_prototype_method("fill", array_fill)
        .add_prototype_method("flat", array_flat)
        .add_prototype_method("toString", array_to_string);

    registry.register_object(array);
}

fn this_array(this: &JsValue, method: &str) -> Result<JsObjectType, JErrorType> {
    match this {
        JsValue::Object(o) if matches!(o.borrow().kind, ObjectKind::Array(_)) => Ok(o.clone()),
        _ => Err(JErrorType::TypeError(format!(
            "Array.prototype.{} called on non-array",
            method
        ))),
    }
}

fn with_items<R>(array: &JsObjectType, f: impl FnOnce(&mut Vec<JsValue>) -> R) -> R {
    match &mut array.borrow_mut().kind {
        ObjectKind::Array(items) => f(items),
        _ => f(&mut vec![]),
    }
}

fn snapshot(array: &JsObjectType) -> Vec<JsValue> {
    with_items(array, |items| items.clone())
}

fn item_at(array: &JsObjectType, index: usize) -> Option<JsValue> {
    with_items(array, |items| items.get(index).cloned())
}

fn length(array: &JsObjectType) -> usize {
    with_items(array, |items| items.len())
}

fn callback_arg(args: &[JsValue], method: &str) -> Result<JsValue, JErrorType> {
    let callback = arg(args, 0);
    if callback.is_callable() {
        Ok(callback)
    } else {
        Err(JErrorType::TypeError(format!(
            "{} is not a function (in Array.prototype.{})",
            to_string(&callback),
            method
        )))
    }
}

/// Array constructor. A single numeric argument sets the length.
fn array_constructor(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    if let [JsValue::Number(n)] = args.as_slice() {
        let len = n.as_f64();
        if len < 0.0 || len.fract() != 0.0 || len > u32::MAX as f64 {
            return Err(JErrorType::RangeError("Invalid array length".to_string()));
        }
        JErrorType::check_array_length(len as usize)?;
        return Ok(ctx.realm.new_array(vec![JsValue::Undefined; len as usize]));
    }
    Ok(ctx.realm.new_array(args))
}

/// Array.isArray
fn array_is_array(
    _ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(JsValue::Boolean(arg(&args, 0).is_array()))
}

/// Array.from
fn array_from(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let source = arg(&args, 0);
    let items = match &source {
        JsValue::String(s) => s.chars().map(|c| JsValue::String(c.to_string())).collect(),
        JsValue::Object(o) => {
            let array_items = match &o.borrow().kind {
                ObjectKind::Array(items) => Some(items.clone()),
                _ => None,
            };
            match array_items {
                Some(items) => items,
                None => {
                    let len = to_integer(&get_property(ctx, &source, "length")?).max(0.0) as usize;
                    JErrorType::check_array_length(len)?;
                    let mut items = Vec::with_capacity(len);
                    for i in 0..len {
                        items.push(get_property(ctx, &source, &i.to_string())?);
                    }
                    items
                }
            }
        }
        JsValue::Undefined | JsValue::Null => {
            return Err(JErrorType::TypeError(format!(
                "{} is not iterable",
                to_string(&source)
            )))
        }
        _ => vec![],
    };
    let map_fn = arg(&args, 1);
    if map_fn.is_callable() {
        let mut mapped = Vec::with_capacity(items.len());
        for (i, item) in items.into_iter().enumerate() {
            mapped.push(call_function(
                &map_fn,
                JsValue::Undefined,
                vec![item, JsValue::from_i64(i as i64)],
                ctx,
            )?);
        }
        return Ok(ctx.realm.new_array(mapped));
    }
    Ok(ctx.realm.new_array(items))
}

/// Array.of
fn array_of(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(ctx.realm.new_array(args))
}

/// Array.prototype.push
fn array_push(
    _ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let array = this_array(&this, "push")?;
    let current = with_items(&array, |items| items.len());
    JErrorType::check_array_length(current + args.len())?;
    let len = with_items(&array, |items| {
        items.extend(args);
        items.len()
    });
    Ok(JsValue::from_i64(len as i64))
}

/// Array.prototype.pop
fn array_pop(
    _ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let array = this_array(&this, "pop")?;
    Ok(with_items(&array, |items| items.pop()).unwrap_or(JsValue::Undefined))
}

/// Array.prototype.shift
fn array_shift(
    _ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let array = this_array(&this, "shift")?;
    Ok(with_items(&array, |items| {
        if items.is_empty() {
            JsValue::Undefined
        } else {
            items.remove(0)
        }
    }))
}

/// Array.prototype.unshift
fn array_unshift(
    _ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let array = this_array(&this, "unshift")?;
    let len = with_items(&array, |items| {
        items.splice(0..0, args);
        items.len()
    });
    Ok(JsValue::from_i64(len as i64))
}

/// Array.prototype.slice
fn array_slice(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let array = this_array(&this, "slice")?;
    let items = snapshot(&array);
    let start = relative_index(&arg(&args, 0), items.len(), 0);
    let end = relative_index(&arg(&args, 1), items.len(), items.len());
    let sliced = if start < end {
        items[start..end].to_vec()
    } else {
        vec![]
    };
    Ok(ctx.realm.new_array(sliced))
}

/// Array.prototype.splice
fn array_splice(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let array = this_array(&this, "splice")?;
    let len = length(&array);
    let start = relative_index(&arg(&args, 0), len, 0);
    let delete_count = match args.len() {
        0 => 0,
        1 => len - start,
        _ => (to_integer(&args[1]).max(0.0) as usize).min(len - start),
    };
    let inserted: Vec<JsValue> = args.into_iter().skip(2).collect();
    let removed: Vec<JsValue> = with_items(&array, |items| {
        items.splice(start..start + delete_count, inserted).collect()
    });
    Ok(ctx.realm.new_array(removed))
}

/// Array.prototype.concat
fn array_concat(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let array = this_array(&this, "concat")?;
    let mut result = snapshot(&array);
    for value in args {
        match &value {
            JsValue::Object(o) if matches!(o.borrow().kind, ObjectKind::Array(_)) => {
                result.extend(snapshot(o));
            }
            _ => result.push(value),
        }
        JErrorType::check_array_length(result.len())?;
    }
    Ok(ctx.realm.new_array(result))
}

/// Array.prototype.join
fn array_join(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let array = this_array(&this, "join")?;
    let separator = match arg(&args, 0) {
        JsValue::Undefined => ",".to_string(),
        other => to_string(&other),
    };
    let mut parts = vec![];
    let mut total = 0usize;
    for item in snapshot(&array) {
        let part = match &item {
            JsValue::Undefined | JsValue::Null => String::new(),
            JsValue::Object(o) if std::rc::Rc::ptr_eq(o, &array) => String::new(),
            _ => to_string_with_ctx(&item, ctx)?,
        };
        total = total.saturating_add(part.len() + separator.len());
        JErrorType::check_string_length(total)?;
        parts.push(part);
    }
    Ok(JsValue::String(parts.join(&separator)))
}

/// Array.prototype.toString
fn array_to_string(
    ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    array_join(ctx, this, vec![])
}

/// Array.prototype.reverse
fn array_reverse(
    _ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let array = this_array(&this, "reverse")?;
    with_items(&array, |items| items.reverse());
    Ok(this)
}

/// Array.prototype.indexOf
fn array_index_of(
    _ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let array = this_array(&this, "indexOf")?;
    let items = snapshot(&array);
    let target = arg(&args, 0);
    let start = relative_index(&arg(&args, 1), items.len(), 0);
    let found = items
        .iter()
        .enumerate()
        .skip(start)
        .find(|(_, item)| strict_equality(item, &target))
        .map(|(i, _)| i as i64)
        .unwrap_or(-1);
    Ok(JsValue::from_i64(found))
}

/// Array.prototype.lastIndexOf
fn array_last_index_of(
    _ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let array = this_array(&this, "lastIndexOf")?;
    let items = snapshot(&array);
    let target = arg(&args, 0);
    let found = items
        .iter()
        .rposition(|item| strict_equality(item, &target))
        .map(|i| i as i64)
        .unwrap_or(-1);
    Ok(JsValue::from_i64(found))
}

/// Array.prototype.includes
fn array_includes(
    _ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let array = this_array(&this, "includes")?;
    let items = snapshot(&array);
    let target = arg(&args, 0);
    let start = relative_index(&arg(&args, 1), items.len(), 0);
    Ok(JsValue::Boolean(
        items.iter().skip(start).any(|item| same_value_zero(item, &target)),
    ))
}

/// Calls `callback(item, index, array)` for each index present when the
/// walk reaches it, stopping early when `visit` returns `false`.
fn for_each_item(
    ctx: &mut EvalContext,
    array: &JsObjectType,
    this: &JsValue,
    args: &[JsValue],
    method: &str,
    mut visit: impl FnMut(usize, JsValue, JsValue) -> bool,
) -> Result<(), JErrorType> {
    let callback = callback_arg(args, method)?;
    let this_arg = arg(args, 1);
    let len = length(array);
    for i in 0..len {
        let Some(item) = item_at(array, i) else {
            break;
        };
        let result = call_function(
            &callback,
            this_arg.clone(),
            vec![item.clone(), JsValue::from_i64(i as i64), this.clone()],
            ctx,
        )?;
        if !visit(i, item, result) {
            break;
        }
    }
    Ok(())
}

/// Array.prototype.find
fn array_find(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let array = this_array(&this, "find")?;
    let mut found = JsValue::Undefined;
    for_each_item(ctx, &array, &this, &args, "find", |_, item, result| {
        if to_boolean(&result) {
            found = item;
            return false;
        }
        true
    })?;
    Ok(found)
}

/// Array.prototype.findIndex
fn array_find_index(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let array = this_array(&this, "findIndex")?;
    let mut found = -1;
    for_each_item(ctx, &array, &this, &args, "findIndex", |i, _, result| {
        if to_boolean(&result) {
            found = i as i64;
            return false;
        }
        true
    })?;
    Ok(JsValue::from_i64(found))
}

/// Array.prototype.filter
fn array_filter(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let array = this_array(&this, "filter")?;
    let mut kept = vec![];
    for_each_item(ctx, &array, &this, &args, "filter", |_, item, result| {
        if to_boolean(&result) {
            kept.push(item);
        }
        true
    })?;
    Ok(ctx.realm.new_array(kept))
}

/// Array.prototype.map
fn array_map(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let array = this_array(&this, "map")?;
    let mut mapped = vec![];
    for_each_item(ctx, &array, &this, &args, "map", |_, _, result| {
        mapped.push(result);
        true
    })?;
    Ok(ctx.realm.new_array(mapped))
}

/// Array.prototype.forEach
fn array_for_each(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let array = this_array(&this, "forEach")?;
    for_each_item(ctx, &array, &this, &args, "forEach", |_, _, _| true)?;
    Ok(JsValue::Undefined)
}

/// Array.prototype.some
fn array_some(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let array = this_array(&this, "some")?;
    let mut any = false;
    for_each_item(ctx, &array, &this, &args, "some", |_, _, result| {
        any = to_boolean(&result);
        !any
    })?;
    Ok(JsValue::Boolean(any))
}

/// Array.prototype.every
fn array_every(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let array = this_array(&this, "every")?;
    let mut all = true;
    for_each_item(ctx, &array, &this, &args, "every", |_, _, result| {
        all = to_boolean(&result);
        all
    })?;
    Ok(JsValue::Boolean(all))
}

fn reduce_items(
    ctx: &mut EvalContext,
    this: &JsValue,
    args: &[JsValue],
    method: &str,
    reverse: bool,
) -> Result<JsValue, JErrorType> {
    let array = this_array(this, method)?;
    let callback = callback_arg(args, method)?;
    let len = length(&array);
    let mut order: Box<dyn Iterator<Item = usize>> = if reverse {
        Box::new((0..len).rev())
    } else {
        Box::new(0..len)
    };
    let mut accumulator = match args.get(1) {
        Some(initial) => initial.clone(),
        None => match order.next().and_then(|i| item_at(&array, i)) {
            Some(first) => first,
            None => {
                return Err(JErrorType::TypeError(
                    "Reduce of empty array with no initial value".to_string(),
                ))
            }
        },
    };
    for i in order {
        let Some(item) = item_at(&array, i) else {
            continue;
        };
        accumulator = call_function(
            &callback,
            JsValue::Undefined,
            vec![accumulator, item, JsValue::from_i64(i as i64), this.clone()],
            ctx,
        )?;
    }
    Ok(accumulator)
}

/// Array.prototype.reduce
fn array_reduce(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    reduce_items(ctx, &this, &args, "reduce", false)
}

/// Array.prototype.reduceRight
fn array_reduce_right(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    reduce_items(ctx, &this, &args, "reduceRight", true)
}

/// Array.prototype.sort. Stable; `undefined` entries sort last.
fn array_sort(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let array = this_array(&this, "sort")?;
    let comparator = arg(&args, 0);
    if !comparator.is_callable() && !matches!(comparator, JsValue::Undefined) {
        return Err(JErrorType::TypeError(
            "The comparison function must be either a function or undefined".to_string(),
        ));
    }
    let (defined, undefined): (Vec<JsValue>, Vec<JsValue>) = snapshot(&array)
        .into_iter()
        .partition(|v| !matches!(v, JsValue::Undefined));
    let mut in_order = |a: &JsValue, b: &JsValue| -> Result<bool, JErrorType> {
        if comparator.is_callable() {
            let result = call_function(&comparator, JsValue::Undefined, vec![a.clone(), b.clone()], ctx)?;
            let n = to_number(&result);
            Ok(n.is_nan() || n <= 0.0)
        } else {
            Ok(to_string(a) <= to_string(b))
        }
    };
    let mut sorted = merge_sort(defined, &mut in_order)?;
    sorted.extend(undefined);
    with_items(&array, |items| *items = sorted);
    Ok(this)
}

fn merge_sort(
    mut items: Vec<JsValue>,
    in_order: &mut impl FnMut(&JsValue, &JsValue) -> Result<bool, JErrorType>,
) -> Result<Vec<JsValue>, JErrorType> {
    if items.len() <= 1 {
        return Ok(items);
    }
    let right = items.split_off(items.len() / 2);
    let left = merge_sort(items, in_order)?;
    let right = merge_sort(right, in_order)?;
    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    loop {
        let take_left = match (left.peek(), right.peek()) {
            (Some(a), Some(b)) => in_order(a, b)?,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };
        let next = if take_left { left.next() } else { right.next() };
        merged.extend(next);
    }
    Ok(merged)
}

/// Array.prototype.fill
fn array_fill(
    _ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let array = this_array(&this, "fill")?;
    let len = length(&array);
    let value = arg(&args, 0);
    let start = relative_index(&arg(&args, 1), len, 0);
    let end = relative_index(&arg(&args, 2), len, len);
    with_items(&array, |items| {
        for slot in items.iter_mut().take(end).skip(start) {
            *slot = value.clone();
        }
    });
    Ok(this)
}

/// Array.prototype.flat
fn array_flat(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let array = this_array(&this, "flat")?;
    let depth = match arg(&args, 0) {
        JsValue::Undefined => 1,
        other => to_integer(&other).max(0.0) as usize,
    };
    fn flatten(items: Vec<JsValue>, depth: usize, out: &mut Vec<JsValue>) {
        for item in items {
            let nested = match &item {
                JsValue::Object(o) if depth > 0 => match &o.borrow().kind {
                    ObjectKind::Array(inner) => Some(inner.clone()),
                    _ => None,
                },
                _ => None,
            };
            match nested {
                Some(inner) => flatten(inner, depth - 1, out),
                None => out.push(item),
            }
        }
    }
    let mut out = vec![];
    flatten(snapshot(&array), depth, &mut out);
    Ok(ctx.realm.new_array(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> EvalContext {
        let mut ctx = EvalContext::new();
        ctx.install_core_builtins(BuiltInRegistry::with_core());
        ctx
    }

    fn numbers(ctx: &EvalContext, values: &[i64]) -> JsValue {
        ctx.realm
            .new_array(values.iter().map(|v| JsValue::from_i64(*v)).collect())
    }

    #[test]
    fn test_default_sort_is_lexicographic() {
        let mut ctx = ctx();
        let array = numbers(&ctx, &[10, 9, 1]);
        array_sort(&mut ctx, array.clone(), vec![]).unwrap();
        assert_eq!(to_string(&array), "1,10,9");
    }

    #[test]
    fn test_splice_removes_and_inserts() {
        let mut ctx = ctx();
        let array = numbers(&ctx, &[1, 2, 3, 4]);
        let removed = array_splice(
            &mut ctx,
            array.clone(),
            vec![JsValue::from_i64(1), JsValue::from_i64(2), JsValue::from_str("x")],
        )
        .unwrap();
        assert_eq!(to_string(&removed), "2,3");
        assert_eq!(to_string(&array), "1,x,4");
    }

    #[test]
    fn test_slice_with_negative_start() {
        let mut ctx = ctx();
        let array = numbers(&ctx, &[1, 2, 3]);
        let sliced = array_slice(&mut ctx, array, vec![JsValue::from_i64(-2)]).unwrap();
        assert_eq!(to_string(&sliced), "2,3");
    }

    #[test]
    fn test_reduce_empty_without_initial_throws() {
        let mut ctx = ctx();
        let array = numbers(&ctx, &[]);
        let callback = ctx.realm.new_function(crate::runner::ds::object::FunctionKind::Native {
            name: "f".to_string(),
            func: array_of,
        });
        let result = array_reduce(&mut ctx, array, vec![callback]);
        assert!(matches!(result, Err(JErrorType::TypeError(_))));
    }

    #[test]
    fn test_includes_finds_nan() {
        let mut ctx = ctx();
        let array = ctx.realm.new_array(vec![JsValue::from_f64(f64::NAN)]);
        let found = array_includes(&mut ctx, array.clone(), vec![JsValue::from_f64(f64::NAN)]).unwrap();
        assert_eq!(found, JsValue::Boolean(true));
        let index = array_index_of(&mut ctx, array, vec![JsValue::from_f64(f64::NAN)]).unwrap();
        assert_eq!(index, JsValue::from_i64(-1));
    }

    #[test]
    fn test_huge_array_length_is_a_range_error() {
        let mut ctx = ctx();
        let result = array_constructor(&mut ctx, JsValue::Undefined, vec![JsValue::from_f64(4e9)]);
        assert!(matches!(result, Err(JErrorType::RangeError(ref m)) if m == "Invalid array length"));
        let small = array_constructor(&mut ctx, JsValue::Undefined, vec![JsValue::from_i64(3)]).unwrap();
        assert_eq!(to_string(&small), ",,");
    }
}
