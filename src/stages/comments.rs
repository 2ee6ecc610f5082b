// src/stages/comments.rs

use crate::errors::StageError;
use crate::pipeline::{FileRecord, Stage};

const STAGE: &str = "strip-comments";

/// Removes `/* ... */` block comments from CSS output.
pub struct StripComments;

impl Stage for StripComments {
    fn name(&self) -> &'static str {
        STAGE
    }

    fn apply(&self, mut record: FileRecord) -> Result<Vec<FileRecord>, StageError> {
        let text = record
            .text()
            .map_err(|_| StageError::new(STAGE, &record.source, "file is not valid UTF-8"))?;

        record.set_text(strip_block_comments(text));
        Ok(vec![record])
    }
}

/// Remove block comments. Comments do not nest; an unterminated comment
/// runs to end of input, matching what CSS parsers do.
pub(crate) fn strip_block_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => return out,
        }
    }
    out.push_str(rest);
    out
}
