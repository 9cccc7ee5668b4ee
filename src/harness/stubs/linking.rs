//! Registration hooks that file a child entry under a parent entry.
//!
//! `AddSubClass`, `AddRacialVariant`, `AddBackgroundVariant` and
//! `AddInvocation` share one procedure and differ only in the registries,
//! the parent's link field and the key separator listed in [`LINKS`].

use crate::harness::registry::RegistryKind;
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::object::{JsObjectType, ObjectKind};
use crate::runner::ds::operations::test_and_comparison::strict_equality;
use crate::runner::ds::operations::type_conversion::to_string;
use crate::runner::ds::value::JsValue;
use crate::runner::plugin::types::EvalContext;

use super::{StubState, StubTable};

/// Parent key `AddWarlockInvocation` links under.
pub const WARLOCK_CLASS_KEY: &str = "warlock";

/// How one linking hook files its child.
#[derive(Debug, Clone, Copy)]
pub struct LinkSpec {
    pub function: &'static str,
    /// Registry the child is stored in.
    pub target: RegistryKind,
    /// Registry holding the parent entry.
    pub parent: RegistryKind,
    /// Property on the parent listing its children's keys.
    pub field: &'static str,
    pub separator: &'static str,
}

pub const SUBCLASS_LINK: LinkSpec = LinkSpec {
    function: "AddSubClass",
    target: RegistryKind::Subclasses,
    parent: RegistryKind::Classes,
    field: "subclasses",
    separator: "-",
};

pub const RACE_VARIANT_LINK: LinkSpec = LinkSpec {
    function: "AddRacialVariant",
    target: RegistryKind::RaceVariants,
    parent: RegistryKind::Races,
    field: "variants",
    separator: "-",
};

pub const BACKGROUND_VARIANT_LINK: LinkSpec = LinkSpec {
    function: "AddBackgroundVariant",
    target: RegistryKind::BackgroundVariants,
    parent: RegistryKind::Backgrounds,
    field: "variant",
    separator: "-",
};

pub const INVOCATION_LINK: LinkSpec = LinkSpec {
    function: "AddInvocation",
    target: RegistryKind::Invocations,
    parent: RegistryKind::Classes,
    field: "invocations",
    separator: "-",
};

pub const LINKS: [LinkSpec; 4] = [
    SUBCLASS_LINK,
    RACE_VARIANT_LINK,
    BACKGROUND_VARIANT_LINK,
    INVOCATION_LINK,
];

/// Property naming the parent key on a linked child.
pub const PARENT_TAG: &str = "_parent";
/// Property naming the child key segment on a linked child.
pub const CHILD_TAG: &str = "_child";

pub fn register(table: &mut StubTable) {
    table
        .add_function("AddSubClass", add_sub_class)
        .add_function("AddRacialVariant", add_racial_variant)
        .add_function("AddBackgroundVariant", add_background_variant)
        .add_function("AddInvocation", add_invocation)
        .add_function("AddWarlockInvocation", add_warlock_invocation)
        .add_function("AddAbility", add_ability);
}

fn key_arg(args: &[JsValue], index: usize) -> Option<String> {
    match args.get(index) {
        None | Some(JsValue::Undefined) | Some(JsValue::Null) => None,
        Some(v) => Some(to_string(v)),
    }
}

/// Files `child` under `parent_key` as described by `spec` and returns the
/// composed key.
pub fn link_child(
    state: &StubState,
    ctx: &EvalContext,
    spec: &LinkSpec,
    parent_key: &str,
    child_key: &str,
    child: JsValue,
) -> String {
    let full_key = format!("{}{}{}", parent_key, spec.separator, child_key);

    if let JsValue::Object(o) = &child {
        let mut o = o.borrow_mut();
        o.set_own_property(PARENT_TAG, JsValue::from_str(parent_key));
        o.set_own_property(CHILD_TAG, JsValue::from_str(child_key));
    }
    state
        .registry(ctx, spec.target)
        .borrow_mut()
        .set_own_property(&full_key, child);

    let parent_registry = state.registry(ctx, spec.parent);
    let parent = ensure_parent(ctx, &parent_registry, parent_key);
    append_link(ctx, &parent, spec.field, &full_key);
    tracing::trace!(hook = spec.function, key = %full_key, "linked entry");
    full_key
}

/// The parent entry, created as a placeholder when missing.
fn ensure_parent(ctx: &EvalContext, registry: &JsObjectType, parent_key: &str) -> JsObjectType {
    let existing = registry.borrow().get_own_property(parent_key);
    if let Some(JsValue::Object(parent)) = existing {
        return parent;
    }
    let placeholder = ctx.realm.new_object();
    {
        let mut p = placeholder.borrow_mut();
        p.set_own_property("name", JsValue::from_str(parent_key));
        p.set_own_property("_placeholder", JsValue::Boolean(true));
    }
    registry
        .borrow_mut()
        .set_own_property(parent_key, JsValue::Object(placeholder.clone()));
    placeholder
}

/// Adds `key` to the parent's link list unless already present.
///
/// A list shaped `[label, [keys...]]` gets the key appended to its inner list.
fn append_link(ctx: &EvalContext, parent: &JsObjectType, field: &str, key: &str) {
    let current = parent.borrow().get_own_property(field);
    let list = match current {
        Some(JsValue::Object(list)) if matches!(list.borrow().kind, ObjectKind::Array(_)) => {
            inner_list(&list).unwrap_or(list)
        }
        _ => {
            let fresh = ctx.realm.new_array(vec![]);
            parent.borrow_mut().set_own_property(field, fresh.clone());
            match fresh {
                JsValue::Object(o) => o,
                _ => return,
            }
        }
    };
    let key = JsValue::from_str(key);
    let mut list = list.borrow_mut();
    if let ObjectKind::Array(items) = &mut list.kind {
        if !items.iter().any(|item| strict_equality(item, &key)) {
            items.push(key);
        }
    }
}

fn inner_list(list: &JsObjectType) -> Option<JsObjectType> {
    match &list.borrow().kind {
        ObjectKind::Array(items) => match items.as_slice() {
            [JsValue::String(_), JsValue::Object(inner)]
                if matches!(inner.borrow().kind, ObjectKind::Array(_)) =>
            {
                Some(inner.clone())
            }
            _ => None,
        },
        _ => None,
    }
}

fn link_from_args(
    state: &StubState,
    ctx: &EvalContext,
    spec: &LinkSpec,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let (Some(parent_key), Some(child_key)) = (key_arg(&args, 0), key_arg(&args, 1)) else {
        tracing::debug!(hook = spec.function, "missing key; registration skipped");
        return Ok(JsValue::Undefined);
    };
    let child = args.into_iter().nth(2).unwrap_or(JsValue::Undefined);
    Ok(JsValue::String(link_child(
        state,
        ctx,
        spec,
        &parent_key,
        &child_key,
        child,
    )))
}

/// `AddSubClass(classKey, subclassKey, subclass)`
fn add_sub_class(
    state: &StubState,
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    link_from_args(state, ctx, &SUBCLASS_LINK, args)
}

/// `AddRacialVariant(raceKey, variantKey, variant)`
fn add_racial_variant(
    state: &StubState,
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    link_from_args(state, ctx, &RACE_VARIANT_LINK, args)
}

/// `AddBackgroundVariant(backgroundKey, variantKey, variant)`
fn add_background_variant(
    state: &StubState,
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    link_from_args(state, ctx, &BACKGROUND_VARIANT_LINK, args)
}

/// `AddInvocation(parentKey, invocationKey, invocation)`
fn add_invocation(
    state: &StubState,
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    link_from_args(state, ctx, &INVOCATION_LINK, args)
}

/// `AddWarlockInvocation(name, invocation)`
fn add_warlock_invocation(
    state: &StubState,
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let mut linked = vec![JsValue::from_str(WARLOCK_CLASS_KEY)];
    linked.extend(args);
    add_invocation(state, ctx, this, linked)
}

/// Lowercases a display name and collapses whitespace runs to `_`.
pub fn ability_key(display_name: &str) -> String {
    display_name
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// `AddAbility(displayName, ability)`
fn add_ability(
    state: &StubState,
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let Some(display_name) = key_arg(&args, 0) else {
        return Ok(JsValue::Undefined);
    };
    let key = ability_key(&display_name);
    let ability = args.into_iter().nth(1).unwrap_or(JsValue::Undefined);
    if let JsValue::Object(o) = &ability {
        let mut o = o.borrow_mut();
        o.set_own_property("key", JsValue::from_str(&key));
        o.set_own_property("displayName", JsValue::String(display_name));
    }
    state
        .registry(ctx, RegistryKind::Abilities)
        .borrow_mut()
        .set_own_property(&key, ability);
    Ok(JsValue::String(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    use crate::harness::registry::RegistrySet;

    fn setup() -> (EvalContext, StubState) {
        let mut ctx = EvalContext::new();
        let registries = Rc::new(RegistrySet::install(&mut ctx));
        (ctx, StubState::new(registries))
    }

    fn links(state: &StubState, ctx: &EvalContext, class_key: &str) -> Vec<JsValue> {
        let classes = state.registry(ctx, RegistryKind::Classes);
        let parent = classes.borrow().get_own_property(class_key).unwrap();
        let list = parent.as_object().unwrap().borrow().get_own_property("subclasses").unwrap();
        let items = match &list.as_object().unwrap().borrow().kind {
            ObjectKind::Array(items) => items.clone(),
            _ => panic!("expected array"),
        };
        items
    }

    #[test]
    fn test_linking_twice_is_idempotent() {
        let (ctx, state) = setup();
        for _ in 0..2 {
            let child = ctx.realm.new_object_value();
            link_child(&state, &ctx, &SUBCLASS_LINK, "fighter", "battlemaster", child);
        }
        assert_eq!(links(&state, &ctx, "fighter"), vec![JsValue::from_str("fighter-battlemaster")]);
        let subclasses = state.registry(&ctx, RegistryKind::Subclasses);
        assert!(subclasses.borrow().has_own_property("fighter-battlemaster"));
    }

    #[test]
    fn test_child_is_tagged_and_placeholder_created() {
        let (ctx, state) = setup();
        let child = ctx.realm.new_object_value();
        link_child(&state, &ctx, &SUBCLASS_LINK, "wizard", "evoker", child.clone());
        let child = child.as_object().unwrap().borrow();
        assert_eq!(child.get_own_property(PARENT_TAG), Some(JsValue::from_str("wizard")));
        assert_eq!(child.get_own_property(CHILD_TAG), Some(JsValue::from_str("evoker")));
        let classes = state.registry(&ctx, RegistryKind::Classes);
        let parent = classes.borrow().get_own_property("wizard").unwrap();
        assert_eq!(
            parent.as_object().unwrap().borrow().get_own_property("_placeholder"),
            Some(JsValue::Boolean(true))
        );
    }

    #[test]
    fn test_labelled_list_gets_inner_append() {
        let (ctx, state) = setup();
        let inner = ctx.realm.new_array(vec![]);
        let labelled = ctx.realm.new_array(vec![JsValue::from_str("Martial Archetype"), inner.clone()]);
        let parent = ctx.realm.new_object();
        parent.borrow_mut().set_own_property("subclasses", labelled);
        state
            .registry(&ctx, RegistryKind::Classes)
            .borrow_mut()
            .set_own_property("fighter", JsValue::Object(parent));
        link_child(&state, &ctx, &SUBCLASS_LINK, "fighter", "champion", ctx.realm.new_object_value());
        assert_eq!(
            to_string(&inner),
            "fighter-champion"
        );
    }

    #[test]
    fn test_ability_key() {
        assert_eq!(ability_key("Second  Wind"), "second_wind");
        assert_eq!(ability_key(" Action Surge "), "action_surge");
    }
}
