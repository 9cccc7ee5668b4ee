//! Writing documents and the manifest to disk, and the directory-driven entry
//! point.

extern crate sheet_harvest;

use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tempfile::TempDir;

use sheet_harvest::config::HarnessConfig;
use sheet_harvest::harness::output::{write_documents, MANIFEST_FILE};
use sheet_harvest::harness::run::{run_configured, script_paths};
use sheet_harvest::harness::{Manifest, SilentObserver};

fn read_json(path: &Path) -> Value {
    let text = fs::read_to_string(path).unwrap();
    assert!(text.ends_with('\n'));
    serde_json::from_str(&text).unwrap()
}

fn write_script(dir: &Path, name: &str, source: &str) {
    fs::write(dir.join(name), source).unwrap();
}

fn config_for(source: &TempDir, out: &TempDir) -> HarnessConfig {
    HarnessConfig {
        source_dir: source.path().to_path_buf(),
        output_dir: out.path().join("docs"),
        ..HarnessConfig::default()
    }
}

#[test]
fn test_script_paths_lists_js_files_by_name() {
    let source = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write_script(source.path(), "spells.js", "");
    write_script(source.path(), "_functions.js", "");
    write_script(source.path(), "notes.txt", "");
    fs::create_dir(source.path().join("nested.js")).unwrap();

    let paths = script_paths(&config_for(&source, &out)).unwrap();
    let names: Vec<&str> = paths
        .iter()
        .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
        .collect();
    assert_eq!(names, vec!["_functions.js", "spells.js"]);
}

#[test]
fn test_explicit_file_list_keeps_its_order() {
    let source = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let config = HarnessConfig {
        files: vec!["b.js".to_string(), "a.js".to_string()],
        ..config_for(&source, &out)
    };
    let paths = script_paths(&config).unwrap();
    assert_eq!(paths, vec![source.path().join("b.js"), source.path().join("a.js")]);
}

#[test]
fn test_missing_source_dir_is_an_error() {
    let out = TempDir::new().unwrap();
    let config = HarnessConfig {
        source_dir: out.path().join("absent"),
        ..HarnessConfig::default()
    };
    assert!(script_paths(&config).is_err());
}

#[test]
fn test_run_and_write_documents() {
    let source = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write_script(
        source.path(),
        "_functions.js",
        "function armour(name, ac) { return { name: name, ac: ac }; }",
    );
    write_script(source.path(), "armour.js", "ArmourList.chain = armour('Chain Mail', 16);");
    write_script(source.path(), "broken.js", "throw new RangeError('out of range');");

    let config = config_for(&source, &out);
    let output = run_configured(&config, &mut SilentObserver).unwrap();
    let written = write_documents(&config.output_dir, &output.documents, &output.manifest).unwrap();

    assert_eq!(written.len(), 21);
    assert_eq!(written.last().unwrap(), &config.output_dir.join(MANIFEST_FILE));

    let armour = read_json(&config.output_dir.join("armour.json"));
    assert_eq!(armour, json!([{ "_key": "chain", "name": "Chain Mail", "ac": 16 }]));
    assert_eq!(read_json(&config.output_dir.join("spells.json")), json!([]));

    let manifest = read_json(&config.output_dir.join(MANIFEST_FILE));
    assert_eq!(
        manifest["files"],
        json!({
            "_functions.js": "ok",
            "armour.js": "ok",
            "broken.js": "RangeError: out of range"
        })
    );
    assert_eq!(manifest["counts"]["armour"], 1);
    assert_eq!(manifest["converterVersion"], "sheet-harvest/0.1");
    assert!(manifest["generatedAt"].is_string());
    assert!(manifest["schema"]["armour"].is_object());

    let parsed: Manifest = serde_json::from_value(manifest).unwrap();
    assert_eq!(parsed.files, output.manifest.files);
}
