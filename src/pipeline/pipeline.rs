// src/pipeline/pipeline.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info};

use crate::errors::StageError;
use crate::pipeline::record::FileRecord;
use crate::pipeline::sink::{ChangeSink, ErrorSink};
use crate::pipeline::sources::{glob_base, matched_files};
use crate::pipeline::stage::Stage;

/// A suffix of stages routed to its own destination directory.
pub struct Branch {
    stages: Vec<Box<dyn Stage>>,
    dest: PathBuf,
}

/// An ordered composition of stages applied to a glob-matched file set.
///
/// Every matched file is read into a [`FileRecord`], folded through the
/// shared stage prefix once, then duplicated into each [`Branch`]. This is
/// how one compile step feeds both the plain and the `.min` artifact
/// without running twice.
///
/// Stage, read and write failures are file-scoped: they go to the error
/// sink and processing continues. `run` returns `Err` only when the glob
/// itself cannot be used.
pub struct Pipeline {
    label: String,
    root: PathBuf,
    pattern: String,
    shared: Vec<Box<dyn Stage>>,
    branches: Vec<Branch>,
    errors: Arc<dyn ErrorSink>,
    changes: Option<Arc<dyn ChangeSink>>,
}

impl Pipeline {
    pub fn new(
        label: impl Into<String>,
        root: impl Into<PathBuf>,
        pattern: impl Into<String>,
        errors: Arc<dyn ErrorSink>,
    ) -> Self {
        Self {
            label: label.into(),
            root: root.into(),
            pattern: pattern.into(),
            shared: Vec::new(),
            branches: Vec::new(),
            errors,
            changes: None,
        }
    }

    /// Append a stage to the shared prefix (runs once per file, before any
    /// branching).
    pub fn stage(mut self, stage: impl Stage + 'static) -> Self {
        self.shared.push(Box::new(stage));
        self
    }

    /// Add a terminal branch: the given stages run on a copy of the shared
    /// stream, and surviving records are written under `dest`.
    pub fn branch(mut self, stages: Vec<Box<dyn Stage>>, dest: impl Into<PathBuf>) -> Self {
        self.branches.push(Branch {
            stages,
            dest: dest.into(),
        });
        self
    }

    /// Report written files to `sink` after the terminal writes.
    pub fn notify(mut self, sink: Arc<dyn ChangeSink>) -> Self {
        self.changes = Some(sink);
        self
    }

    /// Run the pipeline over the currently matching file set.
    ///
    /// Returns the destination paths written in this run.
    pub async fn run(&self) -> Result<Vec<PathBuf>> {
        let files = matched_files(&self.root, &self.pattern)?;
        debug!(
            pipeline = %self.label,
            pattern = %self.pattern,
            matched = files.len(),
            "pipeline matched source files"
        );

        let base = self.root.join(glob_base(&self.pattern));
        let mut written = Vec::new();

        for path in files {
            let contents = match tokio::fs::read(&path).await {
                Ok(contents) => contents,
                Err(err) => {
                    self.errors
                        .intercept(&StageError::new("read", &path, err.to_string()));
                    continue;
                }
            };

            let mut record = FileRecord::new(path.clone(), contents);
            if let Some(rel) = path.parent().and_then(|p| p.strip_prefix(&base).ok()) {
                record.set_rel_dir(rel);
            }

            let records = match apply_chain(&self.shared, vec![record]) {
                Ok(records) => records,
                Err(err) => {
                    self.errors.intercept(&err);
                    continue;
                }
            };

            for branch in &self.branches {
                let branch_records = match apply_chain(&branch.stages, records.clone()) {
                    Ok(recs) => recs,
                    Err(err) => {
                        // Branch-scoped: the other branch of this file still runs.
                        self.errors.intercept(&err);
                        continue;
                    }
                };

                for rec in branch_records {
                    let dest = self
                        .root
                        .join(&branch.dest)
                        .join(rec.rel_dir())
                        .join(rec.file_name());
                    match self.write_record(&rec, &dest).await {
                        Ok(()) => written.push(dest),
                        Err(err) => self.errors.intercept(&err),
                    }
                }
            }
        }

        if !written.is_empty() {
            info!(
                pipeline = %self.label,
                files = written.len(),
                "pipeline wrote output files"
            );
            if let Some(changes) = &self.changes {
                changes.files_changed(&written);
            }
        }

        Ok(written)
    }

    async fn write_record(&self, rec: &FileRecord, dest: &Path) -> Result<(), StageError> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| StageError::new("write", &rec.source, err.to_string()))?;
        }
        tokio::fs::write(dest, &rec.contents)
            .await
            .map_err(|err| StageError::new("write", &rec.source, err.to_string()))?;
        debug!(pipeline = %self.label, dest = %dest.display(), "wrote output file");
        Ok(())
    }
}

/// Fold a record set through a stage chain, fanning records out as stages
/// return them.
fn apply_chain(
    stages: &[Box<dyn Stage>],
    mut records: Vec<FileRecord>,
) -> Result<Vec<FileRecord>, StageError> {
    for stage in stages {
        let mut next = Vec::with_capacity(records.len());
        for rec in records {
            next.extend(stage.apply(rec)?);
        }
        records = next;
    }
    Ok(records)
}
