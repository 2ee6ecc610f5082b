// src/pipeline/stage.rs

use crate::errors::StageError;
use crate::pipeline::record::FileRecord;

/// One transformation step in a pipeline.
///
/// The contract is a stream of file records in, a stream of file records
/// out: a stage receives one record and returns zero or more. Returning an
/// empty vector drops the file from the stream; returning extra records
/// adds sidecar outputs (a source map stage does this).
///
/// Stages are opaque to the orchestration core. A failing stage reports a
/// [`StageError`]; the enclosing pipeline routes it to the error sink and
/// continues with the next file, so one bad file never blocks its siblings.
pub trait Stage: Send + Sync {
    /// Stable identity used in notifications and logs.
    fn name(&self) -> &'static str;

    fn apply(&self, record: FileRecord) -> Result<Vec<FileRecord>, StageError>;
}
