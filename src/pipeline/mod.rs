// src/pipeline/mod.rs

//! The streaming build pipeline.
//!
//! A [`Pipeline`] matches a set of source files from a glob, runs each file
//! through an ordered chain of [`Stage`]s, and writes the surviving records
//! under one or more destination directories. After a shared stage prefix
//! the record stream may branch, so an expensive compile runs once even
//! when both an unminified and a minified artifact are produced.
//!
//! Failures inside a stage are file-scoped: they are handed to the
//! [`ErrorSink`] and the pipeline moves on to the next file. A pipeline run
//! only returns an error for infrastructure problems such as an invalid
//! glob.

pub mod pipeline;
pub mod record;
pub mod sink;
pub mod sources;
pub mod stage;

pub use pipeline::{Branch, Pipeline};
pub use record::FileRecord;
pub use sink::{ChangeSink, CollectingChanges, CollectingSink, ConsoleNotifier, ErrorSink};
pub use sources::matched_files;
pub use stage::Stage;
