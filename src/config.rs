//! Run configuration.
//!
//! Loaded from TOML. Every field has a default, so an empty file (or no file
//! at all) is a valid configuration.
//!
//! ```toml
//! source_dir = "scripts"
//! files = ["_functions.js", "classes.js"]
//! base_file = "_functions.js"
//! output_dir = "out"
//! timeout_ms = 5000
//! max_depth = 40
//! max_call_depth = 256
//! converter_version = "sheet-harvest/0.1"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::harness::context::SandboxOptions;
use crate::harness::serializer::DEFAULT_MAX_DEPTH;

pub use crate::runner::plugin::types::DEFAULT_MAX_CALL_DEPTH;

pub const DEFAULT_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_BASE_FILE: &str = "_functions.js";
pub const DEFAULT_CONVERTER_VERSION: &str = "sheet-harvest/0.1";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    /// Directory the content files are read from.
    pub source_dir: PathBuf,
    /// File names under `source_dir`, in run order. Empty runs every `*.js`
    /// file in name order.
    pub files: Vec<String>,
    /// Label moved to the front of the run order.
    pub base_file: Option<String>,
    pub output_dir: PathBuf,
    /// Per-file execution budget; `0` disables it.
    pub timeout_ms: u64,
    pub max_depth: usize,
    pub max_call_depth: usize,
    pub converter_version: String,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        HarnessConfig {
            source_dir: PathBuf::from("scripts"),
            files: vec![],
            base_file: Some(DEFAULT_BASE_FILE.to_string()),
            output_dir: PathBuf::from("out"),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_depth: DEFAULT_MAX_DEPTH,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            converter_version: DEFAULT_CONVERTER_VERSION.to_string(),
        }
    }
}

impl HarnessConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: HarnessConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_call_depth == 0 {
            return Err(ConfigError::Invalid {
                field: "max_call_depth",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.converter_version.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "converter_version",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }

    pub fn sandbox_options(&self) -> SandboxOptions {
        SandboxOptions {
            timeout: self.timeout(),
            max_call_depth: self.max_call_depth,
        }
    }
}
