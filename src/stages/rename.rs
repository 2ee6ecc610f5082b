// src/stages/rename.rs

use crate::errors::StageError;
use crate::pipeline::{FileRecord, Stage};

/// Rewrites the output name template: a prefix before the base name and/or
/// a suffix between the base name and the extension (`app.js` with suffix
/// `.min` becomes `app.min.js`).
pub struct Rename {
    prefix: String,
    suffix: String,
}

impl Rename {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    pub fn suffix(suffix: impl Into<String>) -> Self {
        Self::new("", suffix)
    }
}

impl Stage for Rename {
    fn name(&self) -> &'static str {
        "rename"
    }

    fn apply(&self, mut record: FileRecord) -> Result<Vec<FileRecord>, StageError> {
        if !self.prefix.is_empty() {
            record.set_prefix(self.prefix.clone());
        }
        if !self.suffix.is_empty() {
            record.set_suffix(self.suffix.clone());
        }
        Ok(vec![record])
    }
}
