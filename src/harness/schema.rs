//! Field reference emitted verbatim in the manifest.

use serde_json::{json, Value};

lazy_static! {
    /// Fields consumers commonly read from each document. Entries may carry
    /// further fields; nothing here is validated.
    pub static ref FIELD_REFERENCE: Value = json!({
        "_common": {
            "_key": "registry key of the record",
            "_value": "present instead of the fields below when the entry is not an object",
            "name": "display name",
            "source": "list of [sourceKey, page] pairs",
            "description": "rules text",
            "featureChoices": "choices attached through AddFeatureChoice or AddFightingStyle"
        },
        "encodings": {
            "function": "{ \"_type\": \"function\", \"body\": source text }",
            "RegExp": "{ \"_type\": \"RegExp\", \"source\": pattern, \"flags\": flags }",
            "circular": "\"[Circular]\" marks a reference to an enclosing object",
            "nonFinite": "NaN and Infinity are written as null"
        },
        "sources": {
            "abbreviation": "short source code",
            "group": "source grouping",
            "url": "publisher link",
            "date": "publication date"
        },
        "classes": {
            "regExpSearch": "RegExp matching the class name",
            "subclasses": "[label, [subclass keys]]",
            "primaryAbility": "primary ability text",
            "prereqs": "multiclassing prerequisites",
            "die": "hit die size",
            "improvements": "ability score improvements per level",
            "saves": "saving throw proficiencies",
            "skillstxt": "skill proficiency text",
            "armor": "armour proficiencies",
            "weapons": "weapon proficiencies",
            "equipment": "starting equipment text",
            "attacks": "attacks per level",
            "spellcastingFactor": "caster progression",
            "features": "feature key to feature record"
        },
        "subclasses": {
            "_parent": "owning class key",
            "_child": "subclass key segment",
            "subname": "subclass display name",
            "features": "feature key to feature record"
        },
        "races": {
            "regExpSearch": "RegExp matching the race name",
            "plural": "plural name",
            "size": "size category",
            "speed": "movement speeds",
            "scores": "ability score bonuses",
            "variants": "variant keys",
            "features": "racial feature records"
        },
        "race_variants": {
            "_parent": "owning race key",
            "_child": "variant key segment"
        },
        "backgrounds": {
            "skills": "skill proficiencies",
            "gold": "starting gold",
            "equipleft": "equipment list",
            "feature": "background feature name",
            "variant": "variant keys"
        },
        "background_variants": {
            "_parent": "owning background key",
            "_child": "variant key segment"
        },
        "background_features": {
            "description": "feature text"
        },
        "feats": {
            "prerequisite": "prerequisite text",
            "prereqeval": "prerequisite check, stored and never evaluated"
        },
        "spells": {
            "classes": "classes with access",
            "level": "spell level, 0 for cantrips",
            "school": "school abbreviation",
            "time": "casting time",
            "range": "range",
            "components": "components",
            "duration": "duration"
        },
        "magic_items": {
            "type": "item category",
            "rarity": "rarity",
            "attunement": "whether attunement is required"
        },
        "weapons": {
            "type": "weapon category",
            "ability": "attack ability index",
            "damage": "[dice, die size, damage type]",
            "range": "range text",
            "weight": "weight in lb"
        },
        "armour": {
            "type": "armour category",
            "ac": "base armour class",
            "stealthdis": "stealth disadvantage",
            "weight": "weight in lb"
        },
        "ammunition": {
            "icon": "ammunition icon",
            "weight": "weight per unit"
        },
        "gear": {
            "infoname": "name with cost",
            "amount": "count",
            "weight": "weight in lb"
        },
        "tools": {
            "infoname": "name with cost",
            "weight": "weight in lb"
        },
        "creatures": {
            "size": "size category",
            "type": "creature type",
            "challengeRating": "challenge rating",
            "scores": "ability scores",
            "attacks": "attack records"
        },
        "companions": {
            "nameMenu": "menu label",
            "action": "companion actions"
        },
        "invocations": {
            "_parent": "owning class key",
            "_child": "invocation key segment",
            "prereqeval": "prerequisite check, stored and never evaluated"
        },
        "abilities": {
            "key": "normalized key",
            "displayName": "name as registered"
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::registry::RegistryKind;

    #[test]
    fn test_every_document_is_described() {
        for kind in RegistryKind::ALL {
            assert!(
                FIELD_REFERENCE.get(kind.document_name()).is_some(),
                "{} missing",
                kind.document_name()
            );
        }
    }
}
