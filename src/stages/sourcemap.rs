// src/stages/sourcemap.rs

use crate::errors::StageError;
use crate::pipeline::{FileRecord, Stage};

const STAGE: &str = "sourcemaps";

/// Emits a sidecar `<name>.map` for each record and appends the matching
/// `sourceMappingURL` comment to the artifact itself.
///
/// The map is an identity mapping (the build concatenates and reflows
/// whole files rather than transposing individual tokens); what matters to
/// the pipeline contract is that dev artifacts carry a map and production
/// artifacts do not, which is controlled by where this stage is placed.
pub struct SourceMap;

impl Stage for SourceMap {
    fn name(&self) -> &'static str {
        STAGE
    }

    fn apply(&self, mut record: FileRecord) -> Result<Vec<FileRecord>, StageError> {
        let artifact_name = record.file_name();
        let map_name = format!("{artifact_name}.map");

        let source_name = record
            .source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let map = serde_json::json!({
            "version": 3,
            "file": artifact_name,
            "sources": [source_name],
            "names": [],
            "mappings": "",
        });
        let map_bytes = serde_json::to_vec(&map)
            .map_err(|err| StageError::new(STAGE, &record.source, err.to_string()))?;

        let comment = if record.ext() == "css" {
            format!("\n/*# sourceMappingURL={map_name} */\n")
        } else {
            format!("\n//# sourceMappingURL={map_name}\n")
        };
        record.contents.extend_from_slice(comment.as_bytes());

        let sidecar = record.sidecar(map_name, map_bytes);
        Ok(vec![record, sidecar])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn css_gets_comment_and_sidecar() {
        let mut rec = FileRecord::new("src/style/main.scss", b"body{}".to_vec());
        rec.set_ext("css");

        let out = SourceMap.apply(rec).unwrap();
        assert_eq!(out.len(), 2);
        assert!(out[0]
            .text()
            .unwrap()
            .contains("/*# sourceMappingURL=main.css.map */"));
        assert_eq!(out[1].file_name(), "main.css.map");

        let map: serde_json::Value = serde_json::from_slice(&out[1].contents).unwrap();
        assert_eq!(map["version"], 3);
        assert_eq!(map["file"], "main.css");
        assert_eq!(map["sources"][0], "main.scss");
    }

    #[test]
    fn js_uses_line_comment_syntax() {
        let rec = FileRecord::new("src/js/app.js", b"f();".to_vec());
        let out = SourceMap.apply(rec).unwrap();
        assert!(out[0]
            .text()
            .unwrap()
            .contains("//# sourceMappingURL=app.js.map"));
    }
}
