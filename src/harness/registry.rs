//! The fixed set of content registries a run collects.
//!
//! Each registry is a plain script object bound to a global name before the
//! first file runs. Scripts and stubs both write into it; at finalization
//! the live binding is read back.

use crate::runner::ds::object::{JsObjectType, ObjectKind};
use crate::runner::ds::value::JsValue;
use crate::runner::plugin::types::EvalContext;

/// One content category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistryKind {
    Sources,
    Classes,
    Subclasses,
    Races,
    RaceVariants,
    Backgrounds,
    BackgroundVariants,
    BackgroundFeatures,
    Feats,
    Spells,
    MagicItems,
    Weapons,
    Armour,
    Ammunition,
    Gear,
    Tools,
    Creatures,
    Companions,
    Invocations,
    Abilities,
}

impl RegistryKind {
    /// Every registry, in output order.
    pub const ALL: [RegistryKind; 20] = [
        RegistryKind::Sources,
        RegistryKind::Classes,
        RegistryKind::Subclasses,
        RegistryKind::Races,
        RegistryKind::RaceVariants,
        RegistryKind::Backgrounds,
        RegistryKind::BackgroundVariants,
        RegistryKind::BackgroundFeatures,
        RegistryKind::Feats,
        RegistryKind::Spells,
        RegistryKind::MagicItems,
        RegistryKind::Weapons,
        RegistryKind::Armour,
        RegistryKind::Ammunition,
        RegistryKind::Gear,
        RegistryKind::Tools,
        RegistryKind::Creatures,
        RegistryKind::Companions,
        RegistryKind::Invocations,
        RegistryKind::Abilities,
    ];

    /// Name of the global binding scripts write to.
    pub fn global_name(self) -> &'static str {
        match self {
            RegistryKind::Sources => "SourceList",
            RegistryKind::Classes => "ClassList",
            RegistryKind::Subclasses => "ClassSubList",
            RegistryKind::Races => "RaceList",
            RegistryKind::RaceVariants => "RaceSubList",
            RegistryKind::Backgrounds => "BackgroundList",
            RegistryKind::BackgroundVariants => "BackgroundSubList",
            RegistryKind::BackgroundFeatures => "BackgroundFeatureList",
            RegistryKind::Feats => "FeatsList",
            RegistryKind::Spells => "SpellsList",
            RegistryKind::MagicItems => "MagicItemsList",
            RegistryKind::Weapons => "WeaponsList",
            RegistryKind::Armour => "ArmourList",
            RegistryKind::Ammunition => "AmmoList",
            RegistryKind::Gear => "GearList",
            RegistryKind::Tools => "ToolsList",
            RegistryKind::Creatures => "CreatureList",
            RegistryKind::Companions => "CompanionList",
            RegistryKind::Invocations => "InvocationsList",
            RegistryKind::Abilities => "AbilitiesList",
        }
    }

    /// Name of the output document.
    pub fn document_name(self) -> &'static str {
        match self {
            RegistryKind::Sources => "sources",
            RegistryKind::Classes => "classes",
            RegistryKind::Subclasses => "subclasses",
            RegistryKind::Races => "races",
            RegistryKind::RaceVariants => "race_variants",
            RegistryKind::Backgrounds => "backgrounds",
            RegistryKind::BackgroundVariants => "background_variants",
            RegistryKind::BackgroundFeatures => "background_features",
            RegistryKind::Feats => "feats",
            RegistryKind::Spells => "spells",
            RegistryKind::MagicItems => "magic_items",
            RegistryKind::Weapons => "weapons",
            RegistryKind::Armour => "armour",
            RegistryKind::Ammunition => "ammunition",
            RegistryKind::Gear => "gear",
            RegistryKind::Tools => "tools",
            RegistryKind::Creatures => "creatures",
            RegistryKind::Companions => "companions",
            RegistryKind::Invocations => "invocations",
            RegistryKind::Abilities => "abilities",
        }
    }
}

/// The registry objects created for one run.
pub struct RegistrySet {
    /// Indexed by `RegistryKind as usize`.
    registries: [JsObjectType; 20],
}

impl RegistrySet {
    /// Creates every registry empty and binds it into the global scope.
    pub fn install(ctx: &mut EvalContext) -> RegistrySet {
        let registries = RegistryKind::ALL.map(|kind| {
            let object = ctx.realm.new_object();
            ctx.declare_global(kind.global_name(), JsValue::Object(object.clone()));
            object
        });
        RegistrySet { registries }
    }

    /// The object originally bound for `kind`.
    pub fn original(&self, kind: RegistryKind) -> JsObjectType {
        self.registries[kind as usize].clone()
    }

    /// The registry object scripts currently see for `kind`.
    ///
    /// A script may rebind the global name; a rebinding to a non-object (or
    /// to a function or array) is ignored in favour of the original object.
    pub fn live(&self, ctx: &EvalContext, kind: RegistryKind) -> JsObjectType {
        match ctx.get_global(kind.global_name()) {
            Some(JsValue::Object(o)) if is_plain_map(&o) => o,
            _ => self.original(kind),
        }
    }

    /// Reads every registry back, in output order.
    pub fn finalize(&self, ctx: &EvalContext) -> Vec<(RegistryKind, JsObjectType)> {
        RegistryKind::ALL
            .iter()
            .map(|&kind| (kind, self.live(ctx, kind)))
            .collect()
    }
}

fn is_plain_map(object: &JsObjectType) -> bool {
    matches!(
        object.borrow().kind,
        ObjectKind::Ordinary | ObjectKind::Error | ObjectKind::HostProxy(_)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::rc::Rc;

    #[test]
    fn test_names_are_unique() {
        let globals: HashSet<_> = RegistryKind::ALL.iter().map(|k| k.global_name()).collect();
        let documents: HashSet<_> = RegistryKind::ALL.iter().map(|k| k.document_name()).collect();
        assert_eq!(globals.len(), 20);
        assert_eq!(documents.len(), 20);
    }

    #[test]
    fn test_output_order_matches_discriminants() {
        for (i, kind) in RegistryKind::ALL.iter().enumerate() {
            assert_eq!(*kind as usize, i);
        }
    }

    #[test]
    fn test_rebinding_to_scalar_keeps_original() {
        let mut ctx = EvalContext::new();
        let set = RegistrySet::install(&mut ctx);
        ctx.declare_global("SpellsList", JsValue::from_i64(3));
        let live = set.live(&ctx, RegistryKind::Spells);
        assert!(Rc::ptr_eq(&live, &set.original(RegistryKind::Spells)));
    }

    #[test]
    fn test_rebinding_to_object_is_followed() {
        let mut ctx = EvalContext::new();
        let set = RegistrySet::install(&mut ctx);
        let replacement = ctx.realm.new_object();
        ctx.declare_global("FeatsList", JsValue::Object(replacement.clone()));
        let live = set.live(&ctx, RegistryKind::Feats);
        assert!(Rc::ptr_eq(&live, &replacement));
    }
}
