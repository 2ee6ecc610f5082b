// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod logging;
pub mod pipeline;
pub mod server;
pub mod stages;
pub mod tasks;
pub mod watch;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::cli::CliArgs;
use crate::config::loader::{load_or_default, project_root};
use crate::pipeline::ConsoleNotifier;
use crate::server::ReloadHandle;
use crate::tasks::{register_all, BuildCx};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (or defaults when no config file exists)
/// - the error and reload sinks
/// - the task registry with the full task table
/// - running the requested task, raced against Ctrl-C
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let config = load_or_default(&config_path)?;
    let root = project_root(&config_path);

    let errors = Arc::new(ConsoleNotifier::new(config.server.log_prefix.clone()));
    let reload = ReloadHandle::new();

    let cx = Arc::new(BuildCx {
        root,
        config,
        errors,
        reload,
    });
    let registry = Arc::new(register_all(cx)?);

    if args.list {
        print_task_list(&registry);
        return Ok(());
    }

    info!(task = %args.task, "running task");

    // One-shot tasks finish on their own; `default`/`watch` only end when
    // the operator interrupts the process.
    tokio::select! {
        result = registry.run(&args.task) => result.map_err(Into::into),
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted; shutting down");
            Ok(())
        }
    }
}

fn print_task_list(registry: &tasks::TaskRegistry) {
    println!("available tasks:");
    for name in registry.task_names() {
        println!("  {name}");
    }
}
