// src/watch/patterns.rs

use std::fmt;

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::tasks::registry::TaskName;

/// An association between a watch glob and the task to invoke on any
/// matching change event.
///
/// The watch glob is deliberately broader than the bound task's source
/// glob: editing a partial that never produces output on its own must
/// still rebuild the entry files that include it.
#[derive(Debug, Clone)]
pub struct WatchBinding {
    pub task: TaskName,
    pub pattern: String,
}

impl WatchBinding {
    pub fn new(task: impl Into<TaskName>, pattern: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            pattern: pattern.into(),
        }
    }
}

/// A binding with its glob compiled, ready for the watcher's hot path.
#[derive(Clone)]
pub struct CompiledBinding {
    task: TaskName,
    set: GlobSet,
}

impl fmt::Debug for CompiledBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledBinding")
            .field("task", &self.task)
            .finish_non_exhaustive()
    }
}

impl CompiledBinding {
    pub fn task(&self) -> &str {
        &self.task
    }

    /// Returns true if this binding's task should re-run for the given
    /// path (relative to project root, forward slashes).
    pub fn matches(&self, rel_path: &str) -> bool {
        self.set.is_match(rel_path)
    }
}

/// Compile each binding's pattern. Invalid patterns are startup errors.
pub fn compile_bindings(bindings: &[WatchBinding]) -> Result<Vec<CompiledBinding>> {
    let mut compiled = Vec::with_capacity(bindings.len());

    for binding in bindings {
        let glob = Glob::new(&binding.pattern).with_context(|| {
            format!(
                "invalid watch pattern for task {}: {}",
                binding.task, binding.pattern
            )
        })?;

        let mut builder = GlobSetBuilder::new();
        builder.add(glob);
        let set = builder
            .build()
            .with_context(|| format!("building watch globset for task {}", binding.task))?;

        compiled.push(CompiledBinding {
            task: binding.task.clone(),
            set,
        });
    }

    Ok(compiled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partials_match_the_broader_watch_glob() {
        let bindings = compile_bindings(&[WatchBinding::new(
            "css:build",
            "src/style/**/*.scss",
        )])
        .unwrap();

        assert!(bindings[0].matches("src/style/_partial.scss"));
        assert!(bindings[0].matches("src/style/nested/_deep.scss"));
        assert!(!bindings[0].matches("src/js/app.js"));
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        assert!(compile_bindings(&[WatchBinding::new("x", "src/[")]).is_err());
    }
}
