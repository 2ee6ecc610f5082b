// src/config/mod.rs

//! Configuration loading and validation for assetforge.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk, falling back to built-in defaults when
//!   no file exists (`loader.rs`).
//! - Validate basic invariants like glob syntax and path roles
//!   (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_or_default};
pub use model::{AssetKind, CategoryPaths, ConfigFile, PathsSection, ServerSection};
pub use validate::validate_config;
