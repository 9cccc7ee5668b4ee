//! General-purpose helpers scripts lean on: cloning, deferred calls and
//! feature choices.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::harness::registry::RegistryKind;
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::object::{JsObject, JsObjectType, ObjectKind};
use crate::runner::ds::operations::type_conversion::to_string;
use crate::runner::ds::value::JsValue;
use crate::runner::eval::call_function;
use crate::runner::plugin::types::EvalContext;

use super::{StubState, StubTable};

/// Side list on a feature that collects attached choices.
pub const FEATURE_CHOICES_FIELD: &str = "featureChoices";
/// Feature key fighting styles attach to.
pub const FIGHTING_STYLE_FEATURE: &str = "fighting style";

pub fn register(table: &mut StubTable) {
    table
        .add_function("newObj", new_obj)
        .add_function("RunFunctionAtEnd", run_function_at_end)
        .add_function("AddFeatureChoice", add_feature_choice)
        .add_function("AddFightingStyle", add_fighting_style);
}

/// Structural copy of `value`.
///
/// Arrays and plain objects are copied; functions, regular expressions and
/// host objects are shared. An object reached twice maps to the same copy,
/// so cycles survive. The walk keeps its own work list, so nesting depth is
/// bounded only by memory.
pub fn deep_clone(ctx: &EvalContext, value: &JsValue) -> JsValue {
    let mut cloner = Cloner {
        ctx,
        copies: HashMap::new(),
        pending: vec![],
    };
    let root = cloner.map(value);
    while let Some((source, target)) = cloner.pending.pop() {
        cloner.fill(&source, &target);
    }
    root
}

struct Cloner<'a> {
    ctx: &'a EvalContext,
    /// Source object address to its copy.
    copies: HashMap<*const RefCell<JsObject>, JsObjectType>,
    /// Copies created but not yet filled in.
    pending: Vec<(JsObjectType, JsObjectType)>,
}

impl Cloner<'_> {
    /// The copy standing in for `value`, creating an empty one when first seen.
    fn map(&mut self, value: &JsValue) -> JsValue {
        let JsValue::Object(source) = value else {
            return value.clone();
        };
        if let Some(copy) = self.copies.get(&Rc::as_ptr(source)) {
            return JsValue::Object(copy.clone());
        }
        let target = match &source.borrow().kind {
            ObjectKind::Array(_) => match self.ctx.realm.new_array(vec![]) {
                JsValue::Object(o) => o,
                _ => return value.clone(),
            },
            ObjectKind::Ordinary | ObjectKind::Error => self.ctx.realm.new_object(),
            _ => return value.clone(),
        };
        self.copies.insert(Rc::as_ptr(source), target.clone());
        self.pending.push((source.clone(), target.clone()));
        JsValue::Object(target)
    }

    fn fill(&mut self, source: &JsObjectType, target: &JsObjectType) {
        let items = match &source.borrow().kind {
            ObjectKind::Array(items) => Some(items.clone()),
            _ => None,
        };
        if let Some(items) = items {
            let cloned: Vec<JsValue> = items.iter().map(|item| self.map(item)).collect();
            if let ObjectKind::Array(slots) = &mut target.borrow_mut().kind {
                *slots = cloned;
            }
        }
        let entries: Vec<(String, JsValue)> = source
            .borrow()
            .properties
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        for (key, item) in entries {
            let item = self.map(&item);
            target.borrow_mut().set_own_property(&key, item);
        }
    }
}

/// `newObj(obj)`
fn new_obj(
    _state: &StubState,
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(match args.first() {
        Some(value) => deep_clone(ctx, value),
        None => JsValue::Undefined,
    })
}

/// `RunFunctionAtEnd(callback)`: runs the callback now.
fn run_function_at_end(
    _state: &StubState,
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let Some(callback) = args.into_iter().next().filter(JsValue::is_callable) else {
        return Ok(JsValue::Undefined);
    };
    match call_function(&callback, JsValue::Undefined, vec![], ctx) {
        Ok(_) => {}
        Err(error) if error.is_catchable() => {
            tracing::warn!(%error, "deferred callback failed");
        }
        Err(error) => return Err(error),
    }
    Ok(JsValue::Undefined)
}

/// Appends a tagged copy of `payload` to `target.featureChoices`.
pub fn attach_choice(
    ctx: &EvalContext,
    target: &JsObjectType,
    flag: JsValue,
    name: JsValue,
    payload: &JsValue,
    category: JsValue,
) {
    let choice = match deep_clone(ctx, payload) {
        JsValue::Object(o) if !o.borrow().is_callable() => o,
        other => {
            let wrapper = ctx.realm.new_object();
            wrapper.borrow_mut().set_own_property("value", other);
            wrapper
        }
    };
    {
        let mut choice = choice.borrow_mut();
        choice.set_own_property("choiceName", name);
        choice.set_own_property("choiceFlag", flag);
        if !category.is_nullish() {
            choice.set_own_property("choiceCategory", category);
        }
    }

    let existing = target.borrow().get_own_property(FEATURE_CHOICES_FIELD);
    if let Some(JsValue::Object(list)) = &existing {
        if let ObjectKind::Array(items) = &mut list.borrow_mut().kind {
            items.push(JsValue::Object(choice));
            return;
        }
    }
    let list = ctx.realm.new_array(vec![JsValue::Object(choice)]);
    target
        .borrow_mut()
        .set_own_property(FEATURE_CHOICES_FIELD, list);
}

/// `AddFeatureChoice(target, flag, name, payload, category?)`
fn add_feature_choice(
    _state: &StubState,
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let mut args = args.into_iter();
    let Some(JsValue::Object(target)) = args.next() else {
        tracing::debug!("AddFeatureChoice without a target object");
        return Ok(JsValue::Undefined);
    };
    let flag = args.next().unwrap_or(JsValue::Undefined);
    let name = args.next().unwrap_or(JsValue::Undefined);
    let payload = args.next().unwrap_or(JsValue::Undefined);
    let category = args.next().unwrap_or(JsValue::Undefined);
    attach_choice(ctx, &target, flag, name, &payload, category);
    Ok(JsValue::Undefined)
}

fn class_keys(value: &JsValue) -> Vec<String> {
    match value {
        JsValue::Undefined | JsValue::Null => vec![],
        JsValue::Object(o) => match &o.borrow().kind {
            ObjectKind::Array(items) => items
                .iter()
                .filter(|item| !item.is_nullish())
                .map(to_string)
                .collect(),
            _ => vec![],
        },
        other => vec![to_string(other)],
    }
}

fn object_property(object: &JsObjectType, key: &str) -> Option<JsObjectType> {
    match object.borrow().get_own_property(key) {
        Some(JsValue::Object(o)) => Some(o),
        _ => None,
    }
}

/// `AddFightingStyle(classes, name, payload)`
fn add_fighting_style(
    state: &StubState,
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let mut args = args.into_iter();
    let classes = args.next().unwrap_or(JsValue::Undefined);
    let name = args.next().unwrap_or(JsValue::Undefined);
    let payload = args.next().unwrap_or(JsValue::Undefined);

    let class_list = state.registry(ctx, RegistryKind::Classes);
    for class_key in class_keys(&classes) {
        let feature = object_property(&class_list, &class_key)
            .and_then(|class| object_property(&class, "features"))
            .and_then(|features| object_property(&features, FIGHTING_STYLE_FEATURE));
        match feature {
            Some(feature) => attach_choice(
                ctx,
                &feature,
                JsValue::Boolean(false),
                name.clone(),
                &payload,
                JsValue::from_str(FIGHTING_STYLE_FEATURE),
            ),
            None => tracing::debug!(class = %class_key, "no fighting style feature to attach to"),
        }
    }
    Ok(JsValue::Undefined)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deep_clone_is_independent() {
        let ctx = EvalContext::new();
        let inner = ctx.realm.new_array(vec![JsValue::from_i64(1)]);
        let source = ctx.realm.new_object();
        source.borrow_mut().set_own_property("list", inner.clone());
        let copy = deep_clone(&ctx, &JsValue::Object(source.clone()));
        let copy = copy.as_object().unwrap().clone();
        assert!(!Rc::ptr_eq(&copy, &source));
        let copied_list = copy.borrow().get_own_property("list").unwrap();
        assert!(!Rc::ptr_eq(copied_list.as_object().unwrap(), inner.as_object().unwrap()));
        assert_eq!(to_string(&copied_list), "1");
    }

    #[test]
    fn test_deep_clone_keeps_cycles_and_shares_functions() {
        let ctx = EvalContext::new();
        let source = ctx.realm.new_object();
        let regexp = ctx.realm.new_regexp("a+", "g");
        {
            let mut s = source.borrow_mut();
            s.set_own_property("self", JsValue::Object(source.clone()));
            s.set_own_property("pattern", regexp.clone());
        }
        let copy = deep_clone(&ctx, &JsValue::Object(source));
        let copy = copy.as_object().unwrap().clone();
        let self_ref = copy.borrow().get_own_property("self").unwrap();
        assert!(Rc::ptr_eq(self_ref.as_object().unwrap(), &copy));
        let pattern = copy.borrow().get_own_property("pattern").unwrap();
        assert!(Rc::ptr_eq(pattern.as_object().unwrap(), regexp.as_object().unwrap()));
    }

    #[test]
    fn test_deep_clone_handles_very_deep_chains() {
        const DEPTH: usize = 500_000;
        let ctx = EvalContext::new();
        let mut chain = ctx.realm.new_object_value();
        for _ in 0..DEPTH {
            let link = ctx.realm.new_object();
            link.borrow_mut().set_own_property("c", chain);
            chain = JsValue::Object(link);
        }
        let copy = deep_clone(&ctx, &chain);

        let mut depth = 0;
        let mut cursor = copy.clone();
        loop {
            let next = cursor.as_object().and_then(|o| o.borrow().get_own_property("c"));
            match next {
                Some(next) => {
                    depth += 1;
                    cursor = next;
                }
                None => break,
            }
        }
        assert_eq!(depth, DEPTH);
        assert!(!Rc::ptr_eq(copy.as_object().unwrap(), chain.as_object().unwrap()));
    }

    #[test]
    fn test_attach_choice_appends_tagged_copy() {
        let ctx = EvalContext::new();
        let target = ctx.realm.new_object();
        let payload = ctx.realm.new_object_value();
        for name in ["first", "second"] {
            attach_choice(
                &ctx,
                &target,
                JsValue::Boolean(true),
                JsValue::from_str(name),
                &payload,
                JsValue::Undefined,
            );
        }
        let list = target.borrow().get_own_property(FEATURE_CHOICES_FIELD).unwrap();
        let items = match &list.as_object().unwrap().borrow().kind {
            ObjectKind::Array(items) => items.clone(),
            _ => panic!("expected array"),
        };
        assert_eq!(items.len(), 2);
        let second = items[1].as_object().unwrap().borrow();
        assert_eq!(second.get_own_property("choiceName"), Some(JsValue::from_str("second")));
        assert!(!second.has_own_property("choiceCategory"));
        assert!(payload.as_object().unwrap().borrow().properties.is_empty());
    }
}
