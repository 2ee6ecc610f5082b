// src/config/validate.rs

use anyhow::{anyhow, Context, Result};
use globset::{Glob, GlobSetBuilder};

use crate::config::model::{AssetKind, ConfigFile};

/// Run semantic validation against a loaded configuration.
///
/// This checks:
/// - every category has non-empty `src`, `dest` and `watch` roles
/// - all glob patterns compile
/// - a literal (meta-character-free) `src` is covered by the category's
///   `watch` pattern
/// - the clean root and server root are non-empty, and the port is non-zero
///
/// Any failure here is fatal at startup; the process must not continue with
/// a partial configuration.
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    validate_server(cfg)?;
    validate_clean_root(cfg)?;
    for kind in AssetKind::ALL {
        validate_category(cfg, kind)?;
    }
    Ok(())
}

fn validate_server(cfg: &ConfigFile) -> Result<()> {
    if cfg.server.root.trim().is_empty() {
        return Err(anyhow!("[server].root must not be empty"));
    }
    if cfg.server.host.trim().is_empty() {
        return Err(anyhow!("[server].host must not be empty"));
    }
    if cfg.server.port == 0 {
        return Err(anyhow!("[server].port must be non-zero"));
    }
    Ok(())
}

fn validate_clean_root(cfg: &ConfigFile) -> Result<()> {
    let clean = cfg.paths.clean.trim();
    if clean.is_empty() {
        return Err(anyhow!("[paths].clean must not be empty"));
    }
    // Refuse roots that would make `clean` delete the whole project or worse.
    if clean == "." || clean == ".." || clean == "/" {
        return Err(anyhow!("[paths].clean must name a dedicated output directory, got {:?}", clean));
    }
    Ok(())
}

fn validate_category(cfg: &ConfigFile, kind: AssetKind) -> Result<()> {
    let paths = cfg.paths.category(kind);
    let name = kind.name();

    for (role, value) in [("src", &paths.src), ("dest", &paths.dest), ("watch", &paths.watch)] {
        if value.trim().is_empty() {
            return Err(anyhow!("[paths.{name}].{role} must not be empty"));
        }
    }

    Glob::new(&paths.src)
        .with_context(|| format!("invalid src glob for category '{name}': {}", paths.src))?;
    let watch = Glob::new(&paths.watch)
        .with_context(|| format!("invalid watch glob for category '{name}': {}", paths.watch))?;

    // `watch` must be a superset of `src`. That is undecidable for two
    // arbitrary globs, but when `src` is a literal path we can check it
    // directly, which catches the common misconfiguration of pointing
    // `watch` at a different directory than the entry file.
    if !has_glob_meta(&paths.src) {
        let mut builder = GlobSetBuilder::new();
        builder.add(watch);
        let watch_set = builder.build()?;
        if !watch_set.is_match(&paths.src) {
            return Err(anyhow!(
                "[paths.{name}].watch ({}) does not cover the src file {}",
                paths.watch,
                paths.src
            ));
        }
    }

    Ok(())
}

fn has_glob_meta(pattern: &str) -> bool {
    pattern.contains(['*', '?', '[', '{'])
}
