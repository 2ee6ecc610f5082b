// src/watch/mod.rs

//! File watching and change-to-task dispatch.
//!
//! This module is responsible for:
//! - Compiling per-category watch globs into bindings (`patterns.rs`).
//! - Wiring up a cross-platform filesystem watcher (`notify`) that turns
//!   matching change events into task triggers (`watcher.rs`).
//! - Running the dispatch loop that re-runs bound tasks (`dispatch.rs`).
//!
//! It does **not** know what the tasks do; it only turns filesystem
//! changes into task-level triggers.

pub mod dispatch;
pub mod patterns;
pub mod watcher;

pub use dispatch::{dispatch_loop, WatchEvent};
pub use patterns::{compile_bindings, CompiledBinding, WatchBinding};
pub use watcher::{spawn_watcher, WatcherHandle};
