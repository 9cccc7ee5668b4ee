//! The run summary written next to the documents.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::harness::schema::FIELD_REFERENCE;

/// Status text of a file that ran to completion.
pub const FILE_OK: &str = "ok";

/// Outcome of one content file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FileStatus {
    Ok,
    /// The message of the error that stopped the file.
    Failed(String),
}

impl FileStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, FileStatus::Ok)
    }
}

impl From<std::result::Result<(), String>> for FileStatus {
    fn from(result: std::result::Result<(), String>) -> Self {
        match result {
            Ok(()) => FileStatus::Ok,
            Err(message) => FileStatus::Failed(message),
        }
    }
}

impl From<String> for FileStatus {
    fn from(text: String) -> Self {
        if text == FILE_OK {
            FileStatus::Ok
        } else {
            FileStatus::Failed(text)
        }
    }
}

impl From<FileStatus> for String {
    fn from(status: FileStatus) -> Self {
        match status {
            FileStatus::Ok => FILE_OK.to_string(),
            FileStatus::Failed(message) => message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub generated_at: DateTime<Utc>,
    pub converter_version: String,
    /// File label to outcome, in run order.
    pub files: IndexMap<String, FileStatus>,
    /// Document name to record count, in document order.
    pub counts: IndexMap<String, usize>,
    pub schema: Value,
}

impl Manifest {
    pub fn failed_files(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files.iter().filter_map(|(label, status)| match status {
            FileStatus::Failed(message) => Some((label.as_str(), message.as_str())),
            FileStatus::Ok => None,
        })
    }
}

/// Collects a manifest while a run progresses.
#[derive(Debug, Clone)]
pub struct ManifestBuilder {
    converter_version: String,
    files: IndexMap<String, FileStatus>,
    counts: IndexMap<String, usize>,
}

impl ManifestBuilder {
    pub fn new(converter_version: impl Into<String>) -> Self {
        ManifestBuilder {
            converter_version: converter_version.into(),
            files: IndexMap::new(),
            counts: IndexMap::new(),
        }
    }

    pub fn record_file(&mut self, label: impl Into<String>, status: FileStatus) -> &mut Self {
        self.files.insert(label.into(), status);
        self
    }

    pub fn record_count(&mut self, document: impl Into<String>, count: usize) -> &mut Self {
        self.counts.insert(document.into(), count);
        self
    }

    pub fn build(self) -> Manifest {
        self.build_at(Utc::now())
    }

    pub fn build_at(self, generated_at: DateTime<Utc>) -> Manifest {
        Manifest {
            generated_at,
            converter_version: self.converter_version,
            files: self.files,
            counts: self.counts,
            schema: FIELD_REFERENCE.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_manifest_wire_format() {
        let mut builder = ManifestBuilder::new("sheet-harvest/test");
        builder
            .record_file("a.js", FileStatus::Ok)
            .record_file("b.js", FileStatus::Failed("TypeError: x is not a function".into()))
            .record_count("sources", 2);
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let manifest = builder.build_at(at);
        let value = serde_json::to_value(&manifest).unwrap();

        assert_eq!(value["generatedAt"], json!("2024-05-01T12:00:00Z"));
        assert_eq!(value["converterVersion"], json!("sheet-harvest/test"));
        assert_eq!(
            value["files"],
            json!({"a.js": "ok", "b.js": "TypeError: x is not a function"})
        );
        assert_eq!(value["counts"], json!({"sources": 2}));
        assert!(value["schema"].is_object());

        let back: Manifest = serde_json::from_value(value).unwrap();
        assert_eq!(back, manifest);
        assert_eq!(back.failed_files().count(), 1);
    }
}
