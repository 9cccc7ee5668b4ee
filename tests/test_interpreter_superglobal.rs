//! Super-global scope resolution through the interpreter: built-ins, custom
//! resolvers, shadowing and the host stub layer.

extern crate sheet_harvest;

use std::cell::Cell;
use std::rc::Rc;

use sheet_harvest::harness::{ExtractionContext, RegistryKind, SandboxOptions, ScriptSource};
use sheet_harvest::parser::JsParser;
use sheet_harvest::runner::ds::error::JErrorType;
use sheet_harvest::runner::ds::object::{FunctionKind, JsObject, ObjectKind, CLASS_OBJECT};
use sheet_harvest::runner::ds::operations::type_conversion::{to_number, to_string};
use sheet_harvest::runner::ds::value::{JsNumberType, JsValue};
use sheet_harvest::runner::eval::execute_program;
use sheet_harvest::runner::plugin::registry::BuiltInRegistry;
use sheet_harvest::runner::plugin::resolver::PluginResolver;
use sheet_harvest::runner::plugin::types::EvalContext;

/// Helper to run code with the interpreter
fn run_interpreter(code: &str, ctx: &mut EvalContext) -> Result<JsValue, JErrorType> {
    let program = JsParser::parse_to_ast_from_str(code)?;
    execute_program(&program, ctx)
}

fn core_ctx() -> EvalContext {
    let mut ctx = EvalContext::new();
    ctx.install_core_builtins(BuiltInRegistry::with_core());
    ctx
}

// ── Built-in resolution ──────────────────────────────────────────────

#[test]
fn test_interpreter_math_abs() {
    let mut ctx = core_ctx();
    let result = run_interpreter("Math.abs(-42)", &mut ctx).unwrap();
    assert_eq!(to_string(&result), "42");
    assert!(matches!(result, JsValue::Number(JsNumberType::Integer(42))));
}

#[test]
fn test_interpreter_builtin_in_expression() {
    let mut ctx = core_ctx();
    run_interpreter("var x = Math.abs(-10) + Math.abs(-5);", &mut ctx).unwrap();
    assert_eq!(to_string(&ctx.get_binding("x").unwrap()), "15");
}

#[test]
fn test_interpreter_local_shadows_builtin() {
    let mut ctx = core_ctx();
    let result = run_interpreter("var Math = 99; Math", &mut ctx).unwrap();
    assert_eq!(to_string(&result), "99");
}

#[test]
fn test_interpreter_constructors_without_new() {
    let mut ctx = core_ctx();
    let result = run_interpreter("String(5) + Number('2')", &mut ctx).unwrap();
    assert_eq!(to_string(&result), "52");
}

#[test]
fn test_unknown_name_is_reference_error() {
    let mut ctx = core_ctx();
    let result = run_interpreter("NoSuchThing.method()", &mut ctx);
    assert!(matches!(result, Err(JErrorType::ReferenceError(_))));
}

// ── Custom plugin tests ──────────────────────────────────────────────

/// Provides a `Dice` host object and a `double` function, counting how often
/// values are materialized.
struct DicePlugin {
    resolved: Rc<Cell<usize>>,
}

impl PluginResolver for DicePlugin {
    fn has_binding(&self, name: &str) -> bool {
        name == "Dice" || name == "double"
    }

    fn resolve(&self, name: &str, ctx: &mut EvalContext) -> Result<JsValue, JErrorType> {
        self.resolved.set(self.resolved.get() + 1);
        Ok(match name {
            "Dice" => JsValue::Object(
                JsObject::new(
                    ObjectKind::HostProxy("Dice".to_string()),
                    Some(ctx.realm.object_prototype.clone()),
                    CLASS_OBJECT,
                )
                .into_ref(),
            ),
            _ => ctx.realm.new_function(FunctionKind::SuperGlobal {
                object: None,
                name: name.to_string(),
            }),
        })
    }

    fn has_method(&self, object_name: &str, method_name: &str) -> bool {
        object_name == "Dice" && method_name == "average"
    }

    fn call_method(
        &self,
        object_name: &str,
        method_name: &str,
        _ctx: &mut EvalContext,
        _this: JsValue,
        args: Vec<JsValue>,
    ) -> Option<Result<JsValue, JErrorType>> {
        if object_name != "Dice" || method_name != "average" {
            return None;
        }
        let sides = args.first().map(to_number).unwrap_or(6.0);
        Some(Ok(JsValue::from_f64((sides + 1.0) / 2.0)))
    }

    fn call_function(
        &self,
        name: &str,
        _ctx: &mut EvalContext,
        _this: JsValue,
        args: Vec<JsValue>,
    ) -> Option<Result<JsValue, JErrorType>> {
        if name != "double" {
            return None;
        }
        let n = args.first().map(to_number).unwrap_or(0.0);
        Some(Ok(JsValue::from_f64(n * 2.0)))
    }

    fn name(&self) -> &str {
        "dice"
    }
}

fn dice_ctx() -> (EvalContext, Rc<Cell<usize>>) {
    let mut ctx = core_ctx();
    let resolved = Rc::new(Cell::new(0));
    ctx.add_resolver(Rc::new(DicePlugin {
        resolved: resolved.clone(),
    }));
    (ctx, resolved)
}

#[test]
fn test_custom_plugin_method_and_function() {
    let (mut ctx, _) = dice_ctx();
    let result = run_interpreter("Dice.average(8) + double(3)", &mut ctx).unwrap();
    assert_eq!(to_string(&result), "10.5");
}

#[test]
fn test_custom_plugin_values_are_cached() {
    let (mut ctx, resolved) = dice_ctx();
    run_interpreter("Dice.average(6); Dice.average(10); double(1); double(2);", &mut ctx).unwrap();
    assert_eq!(resolved.get(), 2);
}

#[test]
fn test_missing_method_on_host_object_is_type_error() {
    let (mut ctx, _) = dice_ctx();
    let result = run_interpreter("Dice.roll()", &mut ctx);
    assert!(matches!(result, Err(JErrorType::TypeError(_))));
}

#[test]
fn test_script_function_shadows_plugin_function() {
    let (mut ctx, resolved) = dice_ctx();
    let result = run_interpreter("function double(n) { return n + n + 1; } double(2)", &mut ctx).unwrap();
    assert_eq!(to_string(&result), "5");
    assert_eq!(resolved.get(), 0);
}

// ── Host stub layer ──────────────────────────────────────────────────

fn sandbox() -> ExtractionContext {
    ExtractionContext::new(SandboxOptions::default()).unwrap()
}

fn run_stub_script(context: &mut ExtractionContext, code: &str) {
    if let Err(e) = context.run_script(&ScriptSource::new("test.js", code)) {
        panic!("script failed: {}", e);
    }
}

fn registry_entry(context: &ExtractionContext, kind: RegistryKind, key: &str) -> Option<JsValue> {
    context.registry(kind).borrow().get_own_property(key)
}

fn property(value: &JsValue, key: &str) -> JsValue {
    value
        .as_object()
        .and_then(|o| o.borrow().get_own_property(key))
        .unwrap_or(JsValue::Undefined)
}

#[test]
fn test_stub_helpers_and_tables() {
    let mut context = sandbox();
    run_stub_script(
        &mut context,
        "SourceList.check = {
            text: desc(['a', 'b']),
            uni: toUni('Bold'),
            levels: levels.length,
            pb: ProficiencyBonusList[16],
            slots: HalfCasterSpellTable[5].join(''),
            version: sheetVersion > minVer && IsNotImport
        };",
    );
    let entry = registry_entry(&context, RegistryKind::Sources, "check").unwrap();
    assert_eq!(property(&entry, "text"), JsValue::from_str("a\n   b"));
    assert_eq!(property(&entry, "uni"), JsValue::from_str("Bold"));
    assert_eq!(to_string(&property(&entry, "levels")), "20");
    assert_eq!(to_string(&property(&entry, "pb")), "6");
    assert_eq!(property(&entry, "slots"), JsValue::from_str("432000000"));
    assert_eq!(property(&entry, "version"), JsValue::Boolean(true));
}

#[test]
fn test_form_hooks_are_inert() {
    let mut context = sandbox();
    run_stub_script(
        &mut context,
        "Hide('Attack.1'); Show('Attack.1'); AddTooltip('x', 'y');
         var field = tDoc.getField('Class and Levels');
         tDoc.resetForm(['everything']);
         app.alert('hello');
         event.target.display = 1;
         GearList.sample = {
             value: What('Str'),
             number: Value('Str Mod'),
             visible: isTemplVis('ASfront'),
             fieldValue: field.value,
             fieldName: field.name,
             eventValue: event.value
         };",
    );
    let entry = registry_entry(&context, RegistryKind::Gear, "sample").unwrap();
    assert_eq!(property(&entry, "value"), JsValue::from_str(""));
    assert_eq!(to_string(&property(&entry, "number")), "0");
    assert_eq!(property(&entry, "visible"), JsValue::Boolean(false));
    assert_eq!(property(&entry, "fieldValue"), JsValue::from_str(""));
    assert_eq!(property(&entry, "fieldName"), JsValue::from_str("Class and Levels"));
    assert_eq!(property(&entry, "eventValue"), JsValue::from_str(""));
}

#[test]
fn test_required_sheet_version_is_recorded() {
    let mut context = sandbox();
    run_stub_script(&mut context, "RequiredSheetVersion('13.1.0');");
    assert_eq!(
        context.stubs().state().requested_sheet_version(),
        Some("13.1.0".to_string())
    );
}

#[test]
fn test_run_function_at_end_swallows_errors() {
    let mut context = sandbox();
    run_stub_script(
        &mut context,
        "RunFunctionAtEnd(function () { SpellsList.early = { ran: true }; });
         RunFunctionAtEnd(function () { throw new Error('ignored'); });
         SpellsList.after = {};",
    );
    assert!(registry_entry(&context, RegistryKind::Spells, "early").is_some());
    assert!(registry_entry(&context, RegistryKind::Spells, "after").is_some());
}

#[test]
fn test_new_obj_clones() {
    let mut context = sandbox();
    run_stub_script(
        &mut context,
        "var base = { name: 'Base', tags: ['a'] };
         var copy = newObj(base);
         copy.tags.push('b');
         copy.name = 'Copy';
         FeatsList.base = base;
         FeatsList.copy = copy;",
    );
    let base = registry_entry(&context, RegistryKind::Feats, "base").unwrap();
    let copy = registry_entry(&context, RegistryKind::Feats, "copy").unwrap();
    assert_eq!(property(&base, "name"), JsValue::from_str("Base"));
    assert_eq!(to_string(&property(&base, "tags")), "a");
    assert_eq!(to_string(&property(&copy, "tags")), "a,b");
}

#[test]
fn test_linking_hooks() {
    let mut context = sandbox();
    run_stub_script(
        &mut context,
        "ClassList.fighter = { name: 'Fighter', subclasses: ['Martial Archetype', []] };
         var key = AddSubClass('fighter', 'champion', { subname: 'Champion' });
         AddSubClass('fighter', 'champion', { subname: 'Champion' });
         AddRacialVariant('elf', 'drow', { name: 'Drow' });
         AddBackgroundVariant('acolyte', 'cultist', { name: 'Cultist' });
         AddWarlockInvocation('Agonizing Blast', { name: 'Agonizing Blast' });
         var ability = AddAbility('Second  Wind', { text: 'heal' });
         SourceList.keys = { sub: key, ability: ability };",
    );
    let keys = registry_entry(&context, RegistryKind::Sources, "keys").unwrap();
    assert_eq!(property(&keys, "sub"), JsValue::from_str("fighter-champion"));
    assert_eq!(property(&keys, "ability"), JsValue::from_str("second_wind"));

    let fighter = registry_entry(&context, RegistryKind::Classes, "fighter").unwrap();
    assert_eq!(to_string(&property(&fighter, "subclasses")), "Martial Archetype,fighter-champion");

    let elf = registry_entry(&context, RegistryKind::Races, "elf").unwrap();
    assert_eq!(property(&elf, "_placeholder"), JsValue::Boolean(true));
    assert_eq!(to_string(&property(&elf, "variants")), "elf-drow");

    let acolyte = registry_entry(&context, RegistryKind::Backgrounds, "acolyte").unwrap();
    assert_eq!(to_string(&property(&acolyte, "variant")), "acolyte-cultist");

    let invocation =
        registry_entry(&context, RegistryKind::Invocations, "warlock-Agonizing Blast").unwrap();
    assert_eq!(property(&invocation, "_parent"), JsValue::from_str("warlock"));

    let ability = registry_entry(&context, RegistryKind::Abilities, "second_wind").unwrap();
    assert_eq!(property(&ability, "displayName"), JsValue::from_str("Second  Wind"));
}

#[test]
fn test_feature_choices() {
    let mut context = sandbox();
    run_stub_script(
        &mut context,
        "ClassList.paladin = { features: { 'fighting style': { name: 'Fighting Style' } } };
         AddFightingStyle(['paladin', 'ranger'], 'Blind Fighting', { name: 'Blind Fighting Style' });
         var feat = { name: 'Adept' };
         FeatsList.adept = feat;
         AddFeatureChoice(feat, false, 'Option A', { bonus: 1 }, 'extra');",
    );
    let paladin = registry_entry(&context, RegistryKind::Classes, "paladin").unwrap();
    let style = property(&property(&paladin, "features"), "fighting style");
    let choice = property(&property(&style, "featureChoices"), "0");
    assert_eq!(property(&choice, "choiceName"), JsValue::from_str("Blind Fighting"));
    assert_eq!(property(&choice, "name"), JsValue::from_str("Blind Fighting Style"));

    let feat = registry_entry(&context, RegistryKind::Feats, "adept").unwrap();
    let choice = property(&property(&feat, "featureChoices"), "0");
    assert_eq!(property(&choice, "choiceCategory"), JsValue::from_str("extra"));
    assert_eq!(to_string(&property(&choice, "bonus")), "1");
}

#[test]
fn test_stubs_never_throw_on_bad_input() {
    let mut context = sandbox();
    run_stub_script(
        &mut context,
        "AddSubClass(); AddAbility(null); newObj(); desc(); AddFeatureChoice(5);
         AddFightingStyle(null); RunFunctionAtEnd('not a function'); tDoc.getField();",
    );
}

#[test]
fn test_script_definitions_shadow_stubs() {
    let mut context = sandbox();
    run_stub_script(
        &mut context,
        "function desc(lines) { return 'custom'; }
         SpellsList.x = { d: desc(['a']) };",
    );
    let entry = registry_entry(&context, RegistryKind::Spells, "x").unwrap();
    assert_eq!(property(&entry, "d"), JsValue::from_str("custom"));
}
