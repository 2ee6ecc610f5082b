// src/pipeline/sources.rs

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::Glob;
use walkdir::WalkDir;

/// Expand a source glob into the concrete files under `root` that match it.
///
/// Patterns are matched against paths relative to `root`, with forward
/// slashes, so configs behave the same on every platform. The result is
/// sorted so repeated runs over an unchanged tree process files in the same
/// order and produce byte-identical output.
///
/// A missing directory simply yields no matches; an invalid pattern is an
/// error (configuration problem, not a per-file one).
pub fn matched_files(root: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let matcher = Glob::new(pattern)
        .with_context(|| format!("invalid glob pattern: {pattern}"))?
        .compile_matcher();

    let mut out = Vec::new();
    for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(rel) = relative_str(root, entry.path()) else {
            continue;
        };
        if matcher.is_match(&rel) {
            out.push(entry.into_path());
        }
    }

    out.sort();
    Ok(out)
}

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// Returns `None` if the path is not under `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    Some(rel.to_string_lossy().replace('\\', "/"))
}

/// The literal directory prefix of a glob: everything up to the first
/// component containing a wildcard, never including the final component.
///
/// Matched files keep their position relative to this base when written to
/// a destination (`src/img/**/*.*` with `src/img/icons/x.svg` preserves
/// the `icons/` level).
pub fn glob_base(pattern: &str) -> PathBuf {
    let parts: Vec<&str> = pattern.split('/').collect();
    let mut base = PathBuf::new();
    for part in &parts[..parts.len().saturating_sub(1)] {
        if part.contains(['*', '?', '[', '{']) {
            break;
        }
        base.push(part);
    }
    base
}
