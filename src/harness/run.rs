//! Runs an ordered set of content files and collects the documents.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde_json::Value;

use crate::config::HarnessConfig;
use crate::harness::context::{ExtractionContext, SandboxOptions, ScriptSource};
use crate::harness::error::{HarnessError, Result};
use crate::harness::manifest::{FileStatus, Manifest, ManifestBuilder};
use crate::harness::observer::RunObserver;
use crate::harness::serializer::GraphSerializer;

/// Everything one run produces.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Document name to records, in registry order.
    pub documents: Vec<(String, Vec<Value>)>,
    pub manifest: Manifest,
}

impl RunOutput {
    pub fn document(&self, name: &str) -> Option<&[Value]> {
        self.documents
            .iter()
            .find(|(doc, _)| doc == name)
            .map(|(_, records)| records.as_slice())
    }
}

#[derive(Debug, Clone)]
pub struct Harness {
    sandbox: SandboxOptions,
    serializer: GraphSerializer,
    base_file: Option<String>,
    converter_version: String,
}

impl Harness {
    pub fn new(config: &HarnessConfig) -> Self {
        Harness {
            sandbox: config.sandbox_options(),
            serializer: GraphSerializer::new(config.max_depth),
            base_file: config.base_file.clone(),
            converter_version: config.converter_version.clone(),
        }
    }

    /// Executes `scripts` in order against one fresh sandbox.
    ///
    /// A failing file is recorded and the run moves on. Only a broken
    /// sandbox is an error.
    pub fn run(
        &self,
        scripts: Vec<ScriptSource>,
        observer: &mut dyn RunObserver,
    ) -> Result<RunOutput> {
        let mut scripts = order_scripts(scripts, self.base_file.as_deref());
        unique_labels(&mut scripts);
        let mut context = ExtractionContext::new(self.sandbox)?;
        let mut manifest = ManifestBuilder::new(self.converter_version.clone());

        for script in &scripts {
            observer.file_started(&script.label);
            let started = Instant::now();
            let result = context.run_script(script);
            let elapsed = started.elapsed();
            match &result {
                Ok(()) => observer.file_succeeded(&script.label, elapsed),
                Err(message) => observer.file_failed(&script.label, message, elapsed),
            }
            manifest.record_file(script.label.clone(), FileStatus::from(result));
        }

        let mut documents = Vec::new();
        for (kind, registry) in context.finalize() {
            let records = self.serializer.registry_document(&registry);
            manifest.record_count(kind.document_name(), records.len());
            documents.push((kind.document_name().to_string(), records));
        }

        let manifest = manifest.build();
        observer.run_finished(&manifest);
        Ok(RunOutput {
            documents,
            manifest,
        })
    }
}

/// Moves the script labelled `base_file` to the front, keeping the order of
/// the rest.
pub fn order_scripts(mut scripts: Vec<ScriptSource>, base_file: Option<&str>) -> Vec<ScriptSource> {
    if let Some(base) = base_file {
        if let Some(index) = scripts.iter().position(|s| s.label == base) {
            let script = scripts.remove(index);
            scripts.insert(0, script);
        }
    }
    scripts
}

/// Renames repeated labels to `<label>#2`, `<label>#3`, ... so every file
/// keeps its own manifest entry.
pub fn unique_labels(scripts: &mut [ScriptSource]) {
    let mut used = HashSet::new();
    for script in scripts.iter_mut() {
        if used.contains(&script.label) {
            let mut n = 2;
            while used.contains(&format!("{}#{}", script.label, n)) {
                n += 1;
            }
            let label = format!("{}#{}", script.label, n);
            tracing::warn!(file = %script.label, renamed = %label, "duplicate file label");
            script.label = label;
        }
        used.insert(script.label.clone());
    }
}

/// The paths a configuration names, in run order.
///
/// With no explicit file list every `*.js` file in `source_dir` is taken,
/// sorted by name.
pub fn script_paths(config: &HarnessConfig) -> Result<Vec<PathBuf>> {
    if !config.files.is_empty() {
        return Ok(config
            .files
            .iter()
            .map(|file| config.source_dir.join(file))
            .collect());
    }
    let list_error = |source| HarnessError::ListScripts {
        path: config.source_dir.clone(),
        source,
    };
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(&config.source_dir).map_err(list_error)? {
        let path = entry.map_err(list_error)?.path();
        if is_script(&path) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn is_script(path: &Path) -> bool {
    path.is_file() && path.extension().is_some_and(|ext| ext == "js")
}

pub fn load_scripts(paths: &[PathBuf]) -> Result<Vec<ScriptSource>> {
    paths.iter().map(|path| ScriptSource::from_path(path)).collect()
}

/// Reads the configured files and runs them.
pub fn run_configured(config: &HarnessConfig, observer: &mut dyn RunObserver) -> Result<RunOutput> {
    let scripts = load_scripts(&script_paths(config)?)?;
    tracing::info!(files = scripts.len(), "starting run");
    Harness::new(config).run(scripts, observer)
}

/// Runs with default settings; mainly for tests and embedding.
pub fn run_scripts(scripts: Vec<ScriptSource>, observer: &mut dyn RunObserver) -> Result<RunOutput> {
    Harness::new(&HarnessConfig::default()).run(scripts, observer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(scripts: &[ScriptSource]) -> Vec<&str> {
        scripts.iter().map(|s| s.label.as_str()).collect()
    }

    #[test]
    fn test_base_file_moves_to_front() {
        let scripts = vec![
            ScriptSource::new("a.js", ""),
            ScriptSource::new("_functions.js", ""),
            ScriptSource::new("b.js", ""),
        ];
        let ordered = order_scripts(scripts, Some("_functions.js"));
        assert_eq!(labels(&ordered), vec!["_functions.js", "a.js", "b.js"]);
    }

    #[test]
    fn test_missing_base_file_keeps_order() {
        let scripts = vec![ScriptSource::new("b.js", ""), ScriptSource::new("a.js", "")];
        let ordered = order_scripts(scripts, Some("_functions.js"));
        assert_eq!(labels(&ordered), vec!["b.js", "a.js"]);
    }

    #[test]
    fn test_repeated_labels_get_suffixes() {
        let mut scripts = vec![
            ScriptSource::new("a.js", ""),
            ScriptSource::new("a.js", ""),
            ScriptSource::new("a.js#2", ""),
            ScriptSource::new("a.js", ""),
        ];
        unique_labels(&mut scripts);
        assert_eq!(labels(&scripts), vec!["a.js", "a.js#2", "a.js#2#2", "a.js#3"]);
    }
}
