// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `assetforge`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "assetforge",
    version,
    about = "Build, watch and serve front-end assets.",
    long_about = None
)]
pub struct CliArgs {
    /// Task to run: `build`, `prod`, `watch`, a single `*:build` step, or
    /// `default` (clean, build, serve, watch). See --list for the full
    /// table.
    #[arg(value_name = "TASK", default_value = "default")]
    pub task: String,

    /// Path to the config file (TOML). Its directory becomes the project
    /// root; a missing file means built-in defaults.
    #[arg(long, value_name = "PATH", default_value = "Assetforge.toml")]
    pub config: String,

    /// List registered tasks and exit.
    #[arg(long)]
    pub list: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `ASSETFORGE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
