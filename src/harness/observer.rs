//! Progress reporting for a run.

use std::time::Duration;

use crate::harness::manifest::Manifest;

/// Receives progress events while a run executes its files.
///
/// Every method has an empty default, so an observer implements only what
/// it cares about.
pub trait RunObserver {
    fn file_started(&mut self, _label: &str) {}

    fn file_succeeded(&mut self, _label: &str, _elapsed: Duration) {}

    fn file_failed(&mut self, _label: &str, _message: &str, _elapsed: Duration) {}

    fn run_finished(&mut self, _manifest: &Manifest) {}
}

/// Ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentObserver;

impl RunObserver for SilentObserver {}

/// Emits each event as a `tracing` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl RunObserver for TracingObserver {
    fn file_started(&mut self, label: &str) {
        tracing::debug!(file = label, "executing");
    }

    fn file_succeeded(&mut self, label: &str, elapsed: Duration) {
        tracing::info!(file = label, elapsed_ms = elapsed.as_millis() as u64, "ok");
    }

    fn file_failed(&mut self, label: &str, message: &str, elapsed: Duration) {
        tracing::warn!(
            file = label,
            elapsed_ms = elapsed.as_millis() as u64,
            error = message,
            "failed"
        );
    }

    fn run_finished(&mut self, manifest: &Manifest) {
        let failed = manifest.failed_files().count();
        let records: usize = manifest.counts.values().sum();
        tracing::info!(
            files = manifest.files.len(),
            failed,
            records,
            "run finished"
        );
    }
}
