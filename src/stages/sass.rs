// src/stages/sass.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::StageError;
use crate::pipeline::{FileRecord, Stage};

const STAGE: &str = "scss";

const MAX_DEPTH: usize = 8;

/// Compiles an SCSS entry file into CSS.
///
/// This handles the subset the pipeline itself depends on: recursive
/// `@import "name";` inlining with underscore-partial resolution, `//`
/// line-comment stripping, and brace balance checking. Anything else in
/// the file passes through unchanged. The output record's extension
/// becomes `css`.
pub struct ScssCompile;

impl Stage for ScssCompile {
    fn name(&self) -> &'static str {
        STAGE
    }

    fn apply(&self, mut record: FileRecord) -> Result<Vec<FileRecord>, StageError> {
        let text = record
            .text()
            .map_err(|_| StageError::new(STAGE, &record.source, "file is not valid UTF-8"))?;

        let compiled = expand(&record.source, record.source_dir(), text, 0)?;
        check_braces(&record.source, &compiled)?;

        record.set_text(compiled);
        record.set_ext("css");
        Ok(vec![record])
    }
}

fn expand(origin: &Path, dir: &Path, text: &str, depth: usize) -> Result<String, StageError> {
    if depth > MAX_DEPTH {
        return Err(StageError::new(
            STAGE,
            origin,
            format!("@import nesting deeper than {MAX_DEPTH} levels (cycle?)"),
        ));
    }

    let mut out = String::with_capacity(text.len());
    for line in text.lines() {
        let stripped = strip_line_comment(line);

        match import_target(&stripped) {
            Some(name) => {
                let target = find_partial(dir, &name).ok_or_else(|| {
                    StageError::new(
                        STAGE,
                        origin,
                        format!("cannot resolve @import {name:?} from {:?}", dir),
                    )
                })?;
                let imported = fs::read_to_string(&target).map_err(|err| {
                    StageError::new(STAGE, origin, format!("reading {:?}: {err}", target))
                })?;
                let target_dir = target.parent().unwrap_or(dir).to_path_buf();
                out.push_str(&expand(origin, &target_dir, &imported, depth + 1)?);
            }
            None => {
                if !stripped.trim().is_empty() || line.trim().is_empty() {
                    out.push_str(&stripped);
                    out.push('\n');
                }
            }
        }
    }

    Ok(out)
}

/// `@import "name";` (single quoted or double quoted) -> `name`.
fn import_target(line: &str) -> Option<String> {
    let rest = line.trim().strip_prefix("@import")?.trim();
    let rest = rest.strip_suffix(';').unwrap_or(rest).trim();
    let quote = rest.chars().next()?;
    if quote != '"' && quote != '\'' {
        return None;
    }
    let inner = &rest[1..];
    let end = inner.find(quote)?;
    Some(inner[..end].to_string())
}

/// Resolve an import name against a directory, trying the underscore
/// partial convention first: `foo` -> `_foo.scss`, then `foo.scss`.
fn find_partial(dir: &Path, name: &str) -> Option<PathBuf> {
    let with_ext = if name.ends_with(".scss") {
        name.to_string()
    } else {
        format!("{name}.scss")
    };

    let base = dir.join(&with_ext);
    let underscored = match base.file_name() {
        Some(file) => base.with_file_name(format!("_{}", file.to_string_lossy())),
        None => return None,
    };

    if underscored.is_file() {
        Some(underscored)
    } else if base.is_file() {
        Some(base)
    } else {
        None
    }
}

/// Drop a trailing `// ...` comment from a line, leaving `://` (URLs)
/// alone.
fn strip_line_comment(line: &str) -> String {
    let bytes = line.as_bytes();
    let mut i = 0;
    while i + 1 < bytes.len() {
        if bytes[i] == b'/' && bytes[i + 1] == b'/' && (i == 0 || bytes[i - 1] != b':') {
            return line[..i].trim_end().to_string();
        }
        i += 1;
    }
    line.to_string()
}

fn check_braces(origin: &Path, text: &str) -> Result<(), StageError> {
    let mut depth: i64 = 0;
    for (lineno, line) in text.lines().enumerate() {
        for ch in line.chars() {
            match ch {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth < 0 {
                        return Err(StageError::new(
                            STAGE,
                            origin,
                            format!("unexpected '}}' on line {}", lineno + 1),
                        ));
                    }
                }
                _ => {}
            }
        }
    }
    if depth > 0 {
        return Err(StageError::new(STAGE, origin, "unclosed '{' at end of file"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn compile(dir: &Path, entry: &str) -> Result<String, StageError> {
        let path = dir.join(entry);
        let rec = FileRecord::new(&path, fs::read(&path).unwrap());
        let out = ScssCompile.apply(rec)?;
        Ok(out[0].text().unwrap().to_string())
    }

    #[test]
    fn imports_inline_underscore_partials() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("_colors.scss"), ".red { color: red; }\n").unwrap();
        fs::write(
            dir.path().join("main.scss"),
            "@import \"colors\";\nbody { margin: 0; }\n",
        )
        .unwrap();

        let css = compile(dir.path(), "main.scss").unwrap();
        assert!(css.contains(".red { color: red; }"));
        assert!(css.contains("body { margin: 0; }"));
        assert!(!css.contains("@import"));
    }

    #[test]
    fn output_extension_becomes_css() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.scss");
        fs::write(&path, "body { margin: 0; }\n").unwrap();

        let rec = FileRecord::new(&path, fs::read(&path).unwrap());
        let out = ScssCompile.apply(rec).unwrap();
        assert_eq!(out[0].file_name(), "main.css");
    }

    #[test]
    fn line_comments_are_dropped_but_urls_survive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.scss");
        fs::write(
            &path,
            "// header comment\na { background: url(https://x/y.png); } // trailing\n",
        )
        .unwrap();

        let rec = FileRecord::new(&path, fs::read(&path).unwrap());
        let out = ScssCompile.apply(rec).unwrap();
        let css = out[0].text().unwrap();
        assert!(css.contains("https://x/y.png"));
        assert!(!css.contains("header comment"));
        assert!(!css.contains("trailing"));
    }

    #[test]
    fn missing_import_fails_the_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("main.scss"), "@import \"ghost\";\n").unwrap();

        let err = compile(dir.path(), "main.scss").unwrap_err();
        assert_eq!(err.stage, "scss");
        assert!(err.message.contains("ghost"));
    }

    #[test]
    fn unbalanced_braces_fail_the_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("main.scss"), "body { margin: 0;\n").unwrap();

        let err = compile(dir.path(), "main.scss").unwrap_err();
        assert!(err.message.contains("unclosed"));
    }
}
