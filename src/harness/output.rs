//! Writes a run's documents to disk.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use crate::harness::manifest::Manifest;

pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode {name}: {source}")]
    Encode {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Writes `<dir>/<name>.json` for every document and `<dir>/manifest.json`.
///
/// Documents are pretty-printed with a trailing newline. Returns the paths
/// written, manifest last.
pub fn write_documents(
    dir: &Path,
    documents: &[(String, Vec<Value>)],
    manifest: &Manifest,
) -> Result<Vec<PathBuf>, OutputError> {
    fs::create_dir_all(dir).map_err(|source| OutputError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::with_capacity(documents.len() + 1);
    for (name, records) in documents {
        let path = dir.join(format!("{}.json", name));
        write_json(&path, name, records)?;
        written.push(path);
    }
    let path = dir.join(MANIFEST_FILE);
    write_json(&path, MANIFEST_FILE, manifest)?;
    written.push(path);

    tracing::info!(dir = %dir.display(), files = written.len(), "documents written");
    Ok(written)
}

fn write_json<T: serde::Serialize + ?Sized>(
    path: &Path,
    name: &str,
    value: &T,
) -> Result<(), OutputError> {
    let mut text = serde_json::to_string_pretty(value).map_err(|source| OutputError::Encode {
        name: name.to_string(),
        source,
    })?;
    text.push('\n');
    fs::write(path, text).map_err(|source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    })
}
