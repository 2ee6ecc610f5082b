// src/errors.rs

//! Crate-wide error types.
//!
//! Three layers, matching how failures are allowed to travel:
//! - [`StageError`]: a single file failed inside a pipeline stage. These are
//!   routed to the error sink and never escape a pipeline run.
//! - [`TaskError`]: a task or sequence failed. Aborts the remainder of the
//!   enclosing sequence and propagates to whoever invoked the task.
//! - [`RegistryError`]: the task table itself is malformed (duplicate name,
//!   unknown reference, cycle). Always fatal at startup.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// A file-scoped failure inside a pipeline stage.
///
/// Carries the failing stage's identity and the source path so the sink can
/// render a useful notification.
#[derive(Debug, Clone, Error)]
#[error("{stage}: {message} ({})", path.display())]
pub struct StageError {
    /// Name of the stage that failed (e.g. `"scss"`, `"minify-js"`).
    pub stage: &'static str,
    /// Source path of the file being processed.
    pub path: PathBuf,
    /// Human-readable failure description.
    pub message: String,
}

impl StageError {
    pub fn new(stage: &'static str, path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self {
            stage,
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }
}

/// Failure of a task run or of a sequence step.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("unknown task '{0}'")]
    Unknown(String),

    // anyhow::Error is not itself a std Error, so the chain is folded into
    // the message instead of exposed through source().
    #[error("task '{task}' failed: {cause:#}")]
    ActionFailed { task: String, cause: anyhow::Error },

    /// A declared predecessor failed, so the task's own action never started.
    #[error("task '{task}' not run: predecessor '{predecessor}' failed")]
    PredecessorFailed {
        task: String,
        predecessor: String,
        #[source]
        source: Box<TaskError>,
    },

    /// A step of a named sequence failed; later steps were not started.
    #[error("sequence '{sequence}' aborted at step '{step}'")]
    SequenceAborted {
        sequence: String,
        step: String,
        #[source]
        source: Box<TaskError>,
    },
}

/// Problems building the task registry. Never recovered at runtime.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("task '{0}' is already registered")]
    Duplicate(String),

    #[error("task '{task}' references unknown task '{reference}'")]
    UnknownReference { task: String, reference: String },

    #[error("cycle detected in task graph involving '{0}'")]
    Cycle(String),
}
