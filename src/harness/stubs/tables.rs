//! Fixed reference tables scripts read while building their entries.

use crate::runner::ds::value::JsValue;
use crate::runner::plugin::types::EvalContext;

use super::StubTable;

lazy_static! {
    /// Character levels, 1 through 20.
    pub static ref LEVELS: Vec<i64> = (1..=20).collect();

    /// Spell slots per spell level (1-9) for a half caster, indexed by caster level 0-10.
    pub static ref HALF_CASTER_SPELL_TABLE: Vec<[i64; 9]> = vec![
        [0, 0, 0, 0, 0, 0, 0, 0, 0],
        [2, 0, 0, 0, 0, 0, 0, 0, 0],
        [3, 0, 0, 0, 0, 0, 0, 0, 0],
        [4, 2, 0, 0, 0, 0, 0, 0, 0],
        [4, 3, 0, 0, 0, 0, 0, 0, 0],
        [4, 3, 2, 0, 0, 0, 0, 0, 0],
        [4, 3, 3, 0, 0, 0, 0, 0, 0],
        [4, 3, 3, 1, 0, 0, 0, 0, 0],
        [4, 3, 3, 2, 0, 0, 0, 0, 0],
        [4, 3, 3, 3, 1, 0, 0, 0, 0],
        [4, 3, 3, 3, 2, 0, 0, 0, 0],
    ];

    /// Proficiency bonus for levels 1 through 20.
    pub static ref PROFICIENCY_BONUS_LIST: Vec<i64> =
        LEVELS.iter().map(|level| 2 + (level - 1) / 4).collect();
}

pub fn register(table: &mut StubTable) {
    table
        .add_value("levels", levels)
        .add_value("HalfCasterSpellTable", half_caster_spell_table)
        .add_value("ProficiencyBonusList", proficiency_bonus_list);
}

fn int_array(ctx: &EvalContext, values: &[i64]) -> JsValue {
    ctx.realm
        .new_array(values.iter().map(|v| JsValue::from_i64(*v)).collect())
}

fn levels(ctx: &EvalContext) -> JsValue {
    int_array(ctx, &LEVELS)
}

fn half_caster_spell_table(ctx: &EvalContext) -> JsValue {
    let rows = HALF_CASTER_SPELL_TABLE
        .iter()
        .map(|row| int_array(ctx, row))
        .collect();
    ctx.realm.new_array(rows)
}

fn proficiency_bonus_list(ctx: &EvalContext) -> JsValue {
    int_array(ctx, &PROFICIENCY_BONUS_LIST)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proficiency_bonus_steps() {
        assert_eq!(PROFICIENCY_BONUS_LIST.len(), 20);
        assert_eq!(PROFICIENCY_BONUS_LIST[0], 2);
        assert_eq!(PROFICIENCY_BONUS_LIST[3], 2);
        assert_eq!(PROFICIENCY_BONUS_LIST[4], 3);
        assert_eq!(PROFICIENCY_BONUS_LIST[16], 6);
        assert_eq!(PROFICIENCY_BONUS_LIST[19], 6);
    }

    #[test]
    fn test_half_caster_table_shape() {
        assert_eq!(HALF_CASTER_SPELL_TABLE.len(), 11);
        assert_eq!(HALF_CASTER_SPELL_TABLE[9], [4, 3, 3, 3, 1, 0, 0, 0, 0]);
    }

    #[test]
    fn test_levels_value() {
        let ctx = EvalContext::new();
        let value = levels(&ctx);
        assert_eq!(
            crate::runner::ds::operations::type_conversion::to_string(&value),
            "1,2,3,4,5,6,7,8,9,10,11,12,13,14,15,16,17,18,19,20"
        );
    }
}
