// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::config::model::ConfigFile;
use crate::config::validate::validate_config;

/// Load a configuration file from a given path and return the raw
/// `ConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation (glob syntax, path roles, etc.). Use [`load_and_validate`] or
/// [`load_or_default`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading config file at {:?}", path))?;

    let config: ConfigFile = toml::from_str(&contents)
        .with_context(|| format!("parsing TOML config from {:?}", path))?;

    Ok(config)
}

/// Load a configuration file from path and run validation.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let config = load_from_path(&path)?;
    validate_config(&config)?;
    Ok(config)
}

/// Load the config file if it exists, otherwise fall back to the built-in
/// defaults. Either way the result is validated.
///
/// A missing file is not an error: the default path table covers the
/// standard project layout, so zero-config projects work out of the box.
/// A file that exists but fails to parse or validate is fatal.
pub fn load_or_default(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    if path.exists() {
        load_and_validate(path)
    } else {
        debug!(?path, "no config file found; using built-in defaults");
        let config = ConfigFile::default();
        validate_config(&config)?;
        Ok(config)
    }
}

/// Resolve the project root for a given config path: the directory
/// containing the config file, or `.` when it has no parent.
///
/// All source globs, destination directories and the served root are
/// interpreted relative to this directory.
pub fn project_root(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(p) if p.as_os_str().is_empty() => PathBuf::from("."),
        Some(p) => p.to_path_buf(),
        None => PathBuf::from("."),
    }
}
