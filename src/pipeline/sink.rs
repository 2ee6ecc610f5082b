// src/pipeline/sink.rs

//! Cross-cutting sinks injected into every pipeline.
//!
//! [`ErrorSink`] is the system's sole in-pipeline recovery mechanism: all
//! stage failures funnel through it, become a visible notification, and the
//! enclosing process keeps running. Orchestration-level failures (unknown
//! task names, registry errors) deliberately do *not* pass through here.
//!
//! [`ChangeSink`] is the seam to the live-reload world: after a pipeline's
//! terminal writes it reports which files changed, and whatever sits behind
//! the trait (the dev server, nothing, a test double) decides what that
//! means.

use std::path::PathBuf;
use std::sync::Mutex;

use tracing::{debug, error};

use crate::errors::StageError;

/// Receives file-scoped pipeline failures.
///
/// Implementations must not fail themselves; this is the bottom of the
/// error funnel.
pub trait ErrorSink: Send + Sync {
    fn intercept(&self, err: &StageError);
}

/// Receives "these output files changed" notifications after a pipeline's
/// terminal writes.
pub trait ChangeSink: Send + Sync {
    fn files_changed(&self, paths: &[PathBuf]);
}

/// Default error sink: renders each failure as a console notification with
/// the failing stage's identity, in the spirit of a desktop notifier.
pub struct ConsoleNotifier {
    title: String,
}

impl ConsoleNotifier {
    pub fn new(log_prefix: impl Into<String>) -> Self {
        Self {
            title: log_prefix.into(),
        }
    }
}

impl ErrorSink for ConsoleNotifier {
    fn intercept(&self, err: &StageError) {
        error!(
            target: "assetforge::notify",
            stage = err.stage,
            path = %err.path.display(),
            "[{}] Error in {}: {}",
            self.title,
            err.stage,
            err.message
        );
    }
}

/// Error sink that records everything it sees. Used by tests to assert on
/// notification behaviour.
#[derive(Default)]
pub struct CollectingSink {
    errors: Mutex<Vec<StageError>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<StageError> {
        std::mem::take(&mut *self.errors.lock().unwrap())
    }

    pub fn len(&self) -> usize {
        self.errors.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ErrorSink for CollectingSink {
    fn intercept(&self, err: &StageError) {
        debug!(stage = err.stage, "collected stage error");
        self.errors.lock().unwrap().push(err.clone());
    }
}

/// Change sink that records notified paths. Used by tests.
#[derive(Default)]
pub struct CollectingChanges {
    changes: Mutex<Vec<Vec<PathBuf>>>,
}

impl CollectingChanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<Vec<PathBuf>> {
        std::mem::take(&mut *self.changes.lock().unwrap())
    }
}

impl ChangeSink for CollectingChanges {
    fn files_changed(&self, paths: &[PathBuf]) {
        self.changes.lock().unwrap().push(paths.to_vec());
    }
}
