//! End-to-end runs: content files in, documents and manifest out.

extern crate sheet_harvest;

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use sheet_harvest::config::HarnessConfig;
use sheet_harvest::harness::run::run_scripts;
use sheet_harvest::harness::{
    FileStatus, Harness, Manifest, RegistryKind, RunObserver, RunOutput, ScriptSource,
    SilentObserver,
};

fn script(label: &str, source: &str) -> ScriptSource {
    ScriptSource::new(label, source)
}

fn run(scripts: Vec<ScriptSource>) -> RunOutput {
    run_scripts(scripts, &mut SilentObserver).unwrap()
}

/// The record stored under `key` in `document`.
fn record<'a>(output: &'a RunOutput, document: &str, key: &str) -> &'a Value {
    output
        .document(document)
        .unwrap_or_else(|| panic!("no document {}", document))
        .iter()
        .find(|r| r["_key"] == key)
        .unwrap_or_else(|| panic!("no record {} in {}", key, document))
}

// ============================================================================
// Documents
// ============================================================================

#[test]
fn test_every_registry_has_a_document() {
    let output = run(vec![]);
    let names: Vec<&str> = output.documents.iter().map(|(name, _)| name.as_str()).collect();
    let expected: Vec<&str> = RegistryKind::ALL.iter().map(|k| k.document_name()).collect();
    assert_eq!(names, expected);
    assert_eq!(names.len(), 20);
    assert!(output.documents.iter().all(|(_, records)| records.is_empty()));
    assert_eq!(output.manifest.counts.len(), 20);
}

#[test]
fn test_records_carry_their_key_in_insertion_order() {
    let output = run(vec![script(
        "spells.js",
        "SpellsList['fire bolt'] = { name: 'Fire Bolt', level: 0 };
         SpellsList['magic missile'] = { name: 'Magic Missile', level: 1 };
         SpellsList['acid splash'] = { name: 'Acid Splash', level: 0 };",
    )]);
    let keys: Vec<&Value> = output.document("spells").unwrap().iter().map(|r| &r["_key"]).collect();
    assert_eq!(keys, vec!["fire bolt", "magic missile", "acid splash"]);
    assert_eq!(
        record(&output, "spells", "magic missile"),
        &json!({ "_key": "magic missile", "name": "Magic Missile", "level": 1 })
    );
    assert_eq!(output.manifest.counts["spells"], 3);
}

#[test]
fn test_value_encodings() {
    let output = run(vec![script(
        "items.js",
        "MagicItemsList.staff = {
            name: 'Staff',
            weight: 4.5,
            broken: NaN,
            reach: 1 / 0,
            unset: undefined,
            slots: [1, undefined, 3],
            pattern: /ab+c/gi,
            calc: function (v) { return v + 1; }
        };",
    )]);
    assert_eq!(
        record(&output, "magic_items", "staff"),
        &json!({
            "_key": "staff",
            "name": "Staff",
            "weight": 4.5,
            "broken": null,
            "reach": null,
            "slots": [1, null, 3],
            "pattern": { "_type": "RegExp", "source": "ab+c", "flags": "gi" },
            "calc": { "_type": "function", "body": "function (v) { return v + 1; }" }
        })
    );
}

#[test]
fn test_functions_are_never_called() {
    let output = run(vec![script(
        "feats.js",
        "FeatsList.alert = { name: 'Alert', prereqeval: function () { FeatsList.side = {}; return true; } };",
    )]);
    assert_eq!(output.document("feats").unwrap().len(), 1);
}

#[test]
fn test_cycles_and_shared_values() {
    let output = run(vec![script(
        "creatures.js",
        "var wolf = { name: 'Wolf' };
         wolf.self = wolf;
         CreatureList.wolf = wolf;
         CreatureList.pack = { registry: CreatureList };
         var bite = { damage: '2d4' };
         CreatureList.twins = { left: bite, right: bite };",
    )]);
    assert_eq!(
        record(&output, "creatures", "wolf"),
        &json!({ "_key": "wolf", "name": "Wolf", "self": "[Circular]" })
    );
    assert_eq!(record(&output, "creatures", "pack")["registry"], "[Circular]");
    assert_eq!(
        record(&output, "creatures", "twins"),
        &json!({ "_key": "twins", "left": { "damage": "2d4" }, "right": { "damage": "2d4" } })
    );
}

#[test]
fn test_non_mapping_entries_are_wrapped() {
    let output = run(vec![script(
        "sources.js",
        "SourceList.edition = 5; SourceList.tags = ['core', 'srd']; SourceList.nothing = null;",
    )]);
    assert_eq!(record(&output, "sources", "edition"), &json!({ "_key": "edition", "_value": 5 }));
    assert_eq!(
        record(&output, "sources", "tags"),
        &json!({ "_key": "tags", "_value": ["core", "srd"] })
    );
    assert_eq!(record(&output, "sources", "nothing"), &json!({ "_key": "nothing", "_value": null }));
}

#[test]
fn test_replaced_registry_is_exported() {
    let output = run(vec![script(
        "armour.js",
        "ArmourList = { leather: { name: 'Leather', ac: 11 } };",
    )]);
    assert_eq!(record(&output, "armour", "leather")["ac"], 11);
}

// ============================================================================
// Run order and failures
// ============================================================================

#[test]
fn test_base_file_runs_first() {
    let output = run(vec![
        script("classes.js", "ClassList.rogue = { name: 'Rogue', die: hitDie('rogue') };"),
        script("_functions.js", "function hitDie(key) { return key === 'rogue' ? 8 : 10; }"),
    ]);
    let labels: Vec<&str> = output.manifest.files.keys().map(String::as_str).collect();
    assert_eq!(labels, vec!["_functions.js", "classes.js"]);
    assert!(output.manifest.files.values().all(FileStatus::is_ok));
    assert_eq!(record(&output, "classes", "rogue")["die"], 8);
}

#[test]
fn test_failing_file_keeps_partial_writes_and_run_continues() {
    let output = run(vec![
        script("a.js", "WeaponsList.club = { name: 'Club' };"),
        script(
            "b.js",
            "WeaponsList.dagger = { name: 'Dagger' }; throw new Error('boom'); WeaponsList.never = {};",
        ),
        script("c.js", "WeaponsList.spear = { name: 'Spear' };"),
    ]);
    let manifest = &output.manifest;
    assert_eq!(manifest.files["a.js"], FileStatus::Ok);
    assert_eq!(manifest.files["b.js"], FileStatus::Failed("Error: boom".to_string()));
    assert_eq!(manifest.files["c.js"], FileStatus::Ok);
    assert_eq!(manifest.failed_files().collect::<Vec<_>>(), vec![("b.js", "Error: boom")]);

    let keys: Vec<&Value> = output.document("weapons").unwrap().iter().map(|r| &r["_key"]).collect();
    assert_eq!(keys, vec!["club", "dagger", "spear"]);
}

#[test]
fn test_syntax_error_fails_only_that_file() {
    let output = run(vec![
        script("broken.js", "GearList.rope = { name: 'Rope' "),
        script("fine.js", "GearList.torch = { name: 'Torch' };"),
    ]);
    match &output.manifest.files["broken.js"] {
        FileStatus::Failed(message) => assert!(message.starts_with("SyntaxError")),
        FileStatus::Ok => panic!("broken.js should fail"),
    }
    assert_eq!(output.document("gear").unwrap().len(), 1);
}

#[test]
fn test_runaway_file_is_interrupted() {
    let config = HarnessConfig {
        timeout_ms: 100,
        ..HarnessConfig::default()
    };
    let output = Harness::new(&config)
        .run(
            vec![
                script("spin.js", "ToolsList.lute = {}; try { while (true) {} } catch (e) {}"),
                script("after.js", "ToolsList.drum = {};"),
            ],
            &mut SilentObserver,
        )
        .unwrap();
    match &output.manifest.files["spin.js"] {
        FileStatus::Failed(message) => assert!(message.starts_with("Interrupted")),
        FileStatus::Ok => panic!("spin.js should time out"),
    }
    assert!(output.manifest.files["after.js"].is_ok());
    assert_eq!(output.manifest.counts["tools"], 2);
}

#[test]
fn test_resource_hungry_files_fail_alone() {
    let config = HarnessConfig {
        timeout_ms: 0,
        ..HarnessConfig::default()
    };
    let output = Harness::new(&config)
        .run(
            vec![
                script("sparse.js", "var a = []; a[4000000000] = 1; ToolsList.sparse = { n: a.length };"),
                script("huge.js", "ToolsList.huge = {}; var s = 'ab'.repeat(1e12);"),
                script(
                    "deep.js",
                    "var o = {}; for (var i = 0; i < 100000; i++) { o = { c: o }; } var copy = newObj(o);
                     ToolsList.deep = { same: copy === o, inner: typeof copy.c.c };",
                ),
                script("after.js", "ToolsList.after = {};"),
            ],
            &mut SilentObserver,
        )
        .unwrap();
    let files = &output.manifest.files;
    assert!(files["sparse.js"].is_ok());
    assert_eq!(
        files["huge.js"],
        FileStatus::Failed("RangeError: Invalid string length".to_string())
    );
    assert!(files["deep.js"].is_ok());
    assert!(files["after.js"].is_ok());
    assert_eq!(record(&output, "tools", "sparse")["n"], 0);
    assert_eq!(record(&output, "tools", "deep"), &json!({ "_key": "deep", "same": false, "inner": "object" }));
    assert_eq!(output.manifest.counts["tools"], 4);
}

#[test]
fn test_reference_tables_are_fresh_in_every_file() {
    let output = run(vec![
        script(
            "a.js",
            "levels.push(21); levels[0] = 99; HalfCasterSpellTable[1][0] = 7; ProficiencyBonusList.length = 0;
             GearList.a = { n: levels.length, first: levels[0], hc: HalfCasterSpellTable[1][0], pb: ProficiencyBonusList.length };",
        ),
        script(
            "b.js",
            "GearList.b = { n: levels.length, first: levels[0], hc: HalfCasterSpellTable[1][0], pb: ProficiencyBonusList.length };",
        ),
    ]);
    assert_eq!(
        record(&output, "gear", "a"),
        &json!({ "_key": "a", "n": 21, "first": 99, "hc": 7, "pb": 0 })
    );
    assert_eq!(
        record(&output, "gear", "b"),
        &json!({ "_key": "b", "n": 20, "first": 1, "hc": 2, "pb": 20 })
    );
}

#[test]
fn test_repeated_labels_keep_separate_entries() {
    let output = run(vec![
        script("classes.js", "throw new Error('a');"),
        script("classes.js", "GearList.ok = {};"),
    ]);
    let files = &output.manifest.files;
    assert_eq!(files.len(), 2);
    assert_eq!(files["classes.js"], FileStatus::Failed("Error: a".to_string()));
    assert_eq!(files["classes.js#2"], FileStatus::Ok);
}

#[test]
fn test_linking_across_files_is_idempotent() {
    let subclass = "AddSubClass('druid', 'circle of the land', { subname: 'Circle of the Land' });";
    let output = run(vec![
        script("classes.js", "ClassList.druid = { name: 'Druid', subclasses: ['Druid Circle', []] };"),
        script("one.js", subclass),
        script("two.js", subclass),
    ]);
    assert_eq!(
        record(&output, "classes", "druid")["subclasses"],
        json!(["Druid Circle", ["druid-circle of the land"]])
    );
    assert_eq!(
        record(&output, "subclasses", "druid-circle of the land"),
        &json!({
            "_key": "druid-circle of the land",
            "subname": "Circle of the Land",
            "_parent": "druid",
            "_child": "circle of the land"
        })
    );
}

#[test]
fn test_runs_are_deterministic() {
    let scripts = || {
        vec![script(
            "mixed.js",
            "var picks = [];
             for (var i = 0; i < 3; i++) picks.push(Math.floor(Math.random() * 100));
             CompanionList.familiar = { name: 'Familiar', picks: picks, when: typeof Date };
             RaceList.elf = { name: 'Elf', speed: 30 };",
        )]
    };
    let render = |output: &RunOutput| serde_json::to_string(&output.documents).unwrap();
    assert_eq!(render(&run(scripts())), render(&run(scripts())));
}

// ============================================================================
// Observer
// ============================================================================

#[derive(Default)]
struct Recorder {
    events: Vec<String>,
}

impl RunObserver for Recorder {
    fn file_started(&mut self, label: &str) {
        self.events.push(format!("start {}", label));
    }

    fn file_succeeded(&mut self, label: &str, _elapsed: Duration) {
        self.events.push(format!("ok {}", label));
    }

    fn file_failed(&mut self, label: &str, message: &str, _elapsed: Duration) {
        self.events.push(format!("fail {} ({})", label, message));
    }

    fn run_finished(&mut self, manifest: &Manifest) {
        self.events.push(format!("done {}", manifest.files.len()));
    }
}

#[test]
fn test_observer_sees_each_file() {
    let mut recorder = Recorder::default();
    run_scripts(
        vec![script("good.js", "var x = 1;"), script("bad.js", "missing();")],
        &mut recorder,
    )
    .unwrap();
    assert_eq!(
        recorder.events,
        vec![
            "start good.js",
            "ok good.js",
            "start bad.js",
            "fail bad.js (ReferenceError: missing is not defined)",
            "done 2",
        ]
    );
}
