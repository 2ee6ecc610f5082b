// src/pipeline/record.rs

use std::path::{Path, PathBuf};

/// One file flowing through a pipeline.
///
/// A record is created when a source glob match is read, mutated by each
/// stage in turn, and destroyed when the terminal write happens. It is
/// exclusively owned by the pipeline run processing it; `Clone` exists only
/// so a branch point can duplicate the stream without re-running the shared
/// stage prefix.
///
/// The destination file name is kept as a template
/// (`prefix ++ stem ++ suffix ++ "." ++ ext`) so a rename stage can insert
/// `.min` without losing the base name. Sidecar files such as source maps
/// set an explicit name instead.
#[derive(Debug, Clone)]
pub struct FileRecord {
    /// Path the record was read from.
    pub source: PathBuf,
    /// In-memory contents, possibly rewritten by stages.
    pub contents: Vec<u8>,

    stem: String,
    prefix: String,
    suffix: String,
    ext: String,
    explicit_name: Option<String>,
    rel_dir: PathBuf,
}

impl FileRecord {
    /// Build a record from a source path, deriving the name template from
    /// the path's file name.
    pub fn new(source: impl Into<PathBuf>, contents: Vec<u8>) -> Self {
        let source = source.into();
        let file_name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let (stem, ext) = match file_name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem.to_string(), ext.to_string()),
            _ => (file_name, String::new()),
        };

        Self {
            source,
            contents,
            stem,
            prefix: String::new(),
            suffix: String::new(),
            ext,
            explicit_name: None,
            rel_dir: PathBuf::new(),
        }
    }

    /// Create a sidecar record next to this one (e.g. `app.js.map`) with an
    /// explicit output name, keeping the same source path.
    pub fn sidecar(&self, name: impl Into<String>, contents: Vec<u8>) -> Self {
        let mut rec = self.clone();
        rec.contents = contents;
        rec.explicit_name = Some(name.into());
        rec
    }

    /// The output file name this record will be written as.
    pub fn file_name(&self) -> String {
        if let Some(name) = &self.explicit_name {
            return name.clone();
        }
        let mut name = format!("{}{}{}", self.prefix, self.stem, self.suffix);
        if !self.ext.is_empty() {
            name.push('.');
            name.push_str(&self.ext);
        }
        name
    }

    /// Directory below the destination root this record is written into;
    /// carries the source tree's structure below the glob base (so
    /// `src/img/icons/x.svg` lands in `build/img/icons/`).
    pub fn rel_dir(&self) -> &Path {
        &self.rel_dir
    }

    pub fn set_rel_dir(&mut self, rel_dir: impl Into<PathBuf>) {
        self.rel_dir = rel_dir.into();
    }

    pub fn ext(&self) -> &str {
        &self.ext
    }

    pub fn set_ext(&mut self, ext: impl Into<String>) {
        self.ext = ext.into();
    }

    pub fn set_prefix(&mut self, prefix: impl Into<String>) {
        self.prefix = prefix.into();
    }

    pub fn set_suffix(&mut self, suffix: impl Into<String>) {
        self.suffix = suffix.into();
    }

    /// Contents as UTF-8 text, for text-transforming stages.
    pub fn text(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.contents)
    }

    pub fn set_text(&mut self, text: String) {
        self.contents = text.into_bytes();
    }

    /// Directory of the source file; include directives resolve against it.
    pub fn source_dir(&self) -> &Path {
        self.source.parent().unwrap_or_else(|| Path::new("."))
    }
}
