//! Errors raised by the harness itself.
//!
//! A failing content file is not one of these: its failure is recorded in
//! the manifest and the run carries on.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::harness::output::OutputError;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("output error: {0}")]
    Output(#[from] OutputError),

    #[error("failed to read script {path}: {source}")]
    ReadScript {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to list scripts in {path}: {source}")]
    ListScripts {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The host prelude did not run cleanly; the stub surface is incomplete.
    #[error("host prelude failed: {0}")]
    Prelude(String),
}

pub type Result<T> = std::result::Result<T, HarnessError>;
