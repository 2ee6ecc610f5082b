// src/stages/include.rs

use std::fs;
use std::path::Path;

use crate::errors::StageError;
use crate::pipeline::{FileRecord, Stage};

const STAGE: &str = "include";

/// Maximum include nesting before we assume a cycle.
const MAX_DEPTH: usize = 8;

/// Splices `//= path` include directives into the including file.
///
/// A directive must be the only thing on its line (leading whitespace
/// allowed); the path is resolved relative to the file containing the
/// directive, and included files may include further files. Used for HTML
/// partials and JS concatenation alike.
pub struct IncludeResolve;

impl Stage for IncludeResolve {
    fn name(&self) -> &'static str {
        STAGE
    }

    fn apply(&self, mut record: FileRecord) -> Result<Vec<FileRecord>, StageError> {
        let text = record
            .text()
            .map_err(|_| StageError::new(STAGE, &record.source, "file is not valid UTF-8"))?;

        let resolved = splice(&record.source, record.source_dir(), text, 0)?;
        record.set_text(resolved);
        Ok(vec![record])
    }
}

fn splice(origin: &Path, dir: &Path, text: &str, depth: usize) -> Result<String, StageError> {
    if depth > MAX_DEPTH {
        return Err(StageError::new(
            STAGE,
            origin,
            format!("include nesting deeper than {MAX_DEPTH} levels (cycle?)"),
        ));
    }

    let mut out = String::with_capacity(text.len());
    for line in text.lines() {
        let Some(rest) = line.trim_start().strip_prefix("//=") else {
            out.push_str(line);
            out.push('\n');
            continue;
        };

        let target = dir.join(rest.trim());
        let included = fs::read_to_string(&target).map_err(|err| {
            StageError::new(
                STAGE,
                origin,
                format!("reading include file {:?}: {err}", target),
            )
        })?;

        let target_dir = target.parent().unwrap_or(dir).to_path_buf();
        out.push_str(&splice(origin, &target_dir, &included, depth + 1)?);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn directive_is_replaced_by_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("footer.html"), "<footer>hi</footer>\n").unwrap();
        let index = dir.path().join("index.html");
        fs::write(&index, "<body>\n//= footer.html\n</body>\n").unwrap();

        let rec = FileRecord::new(&index, fs::read(&index).unwrap());
        let out = IncludeResolve.apply(rec).unwrap();
        let text = out[0].text().unwrap().to_string();
        assert!(text.contains("<footer>hi</footer>"));
        assert!(!text.contains("//="));
    }

    #[test]
    fn nested_includes_resolve_relative_to_the_including_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("parts")).unwrap();
        fs::write(dir.path().join("parts/inner.js"), "inner();\n").unwrap();
        fs::write(dir.path().join("parts/outer.js"), "//= inner.js\n").unwrap();
        let app = dir.path().join("app.js");
        fs::write(&app, "//= parts/outer.js\nmain();\n").unwrap();

        let rec = FileRecord::new(&app, fs::read(&app).unwrap());
        let out = IncludeResolve.apply(rec).unwrap();
        assert_eq!(out[0].text().unwrap(), "inner();\nmain();\n");
    }

    #[test]
    fn missing_include_is_a_stage_error() {
        let dir = tempfile::tempdir().unwrap();
        let app = dir.path().join("app.js");
        fs::write(&app, "//= nope.js\n").unwrap();

        let rec = FileRecord::new(&app, fs::read(&app).unwrap());
        let err = IncludeResolve.apply(rec).unwrap_err();
        assert_eq!(err.stage, "include");
    }

    #[test]
    fn include_cycle_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.js");
        fs::write(&a, "//= b.js\n").unwrap();
        fs::write(dir.path().join("b.js"), "//= a.js\n").unwrap();

        let rec = FileRecord::new(&a, fs::read(&a).unwrap());
        let err = IncludeResolve.apply(rec).unwrap_err();
        assert!(err.message.contains("nesting"));
    }
}
