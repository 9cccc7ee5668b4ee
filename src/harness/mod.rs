//! The extraction harness.
//!
//! A run executes content files in order inside one [`ExtractionContext`],
//! reads the registries back and serializes each into a document:
//!
//! ```text
//! ScriptSource* -> ExtractionContext -> RegistrySet -> GraphSerializer -> documents + Manifest
//! ```

pub mod context;
pub mod error;
pub mod manifest;
pub mod observer;
pub mod output;
pub mod registry;
pub mod run;
pub mod schema;
pub mod serializer;
pub mod stubs;

pub use context::{ExtractionContext, SandboxOptions, ScriptSource};
pub use error::HarnessError;
pub use manifest::{FileStatus, Manifest};
pub use observer::{RunObserver, SilentObserver, TracingObserver};
pub use registry::RegistryKind;
pub use run::{Harness, RunOutput};
