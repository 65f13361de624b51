//! Document loader: file names in discovery order → [`ConfigDocument`]s.
//!
//! A document that cannot be read or parsed is logged and skipped; one bad
//! file never aborts the run.

use std::path::Path;

use serde_yaml_ng::Value;
use tracing::{error, info, instrument};

use folio_shared::{ConfigDocument, FolioError, Result};

/// A document that failed to load.
#[derive(Debug)]
pub struct LoadFailure {
    pub file_name: String,
    pub error: FolioError,
}

/// Everything the loader produced, in discovery order.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub documents: Vec<ConfigDocument>,
    pub failures: Vec<LoadFailure>,
}

/// Load each named document from `dir`, preserving order.
#[instrument(skip_all, fields(dir = %dir.display(), files = file_names.len()))]
pub fn load_documents(dir: &Path, file_names: &[String]) -> LoadOutcome {
    let mut outcome = LoadOutcome::default();

    for file_name in file_names {
        match load_document(dir, file_name) {
            Ok(doc) => {
                info!(file = %file_name, kind = %doc.kind, "loaded document");
                outcome.documents.push(doc);
            }
            Err(e) => {
                error!(file = %file_name, error = %e, "failed to load document, skipping");
                outcome.failures.push(LoadFailure {
                    file_name: file_name.clone(),
                    error: e,
                });
            }
        }
    }

    outcome
}

/// Read and parse one document. The root must be a mapping.
pub fn load_document(dir: &Path, file_name: &str) -> Result<ConfigDocument> {
    let path = dir.join(file_name);
    let content = std::fs::read_to_string(&path).map_err(|e| FolioError::io(&path, e))?;

    let value: Value = serde_yaml_ng::from_str(&content)
        .map_err(|e| FolioError::parse(format!("{file_name}: {e}")))?;

    match value {
        Value::Mapping(data) => Ok(ConfigDocument::new(file_name, data)),
        Value::Null => Err(FolioError::parse(format!("{file_name}: document is empty"))),
        _ => Err(FolioError::parse(format!(
            "{file_name}: document root is not a mapping"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_shared::SectionKind;
    use std::path::PathBuf;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("folio-loader-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn malformed_document_is_skipped() {
        let tmp = temp_dir();
        std::fs::write(tmp.join("intro.yaml"), "title: Jane\n").unwrap();
        std::fs::write(tmp.join("broken.yaml"), "title: [unclosed\n").unwrap();
        std::fs::write(tmp.join("project.yaml"), "items: []\n").unwrap();

        let names: Vec<String> = ["intro.yaml", "broken.yaml", "project.yaml"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let outcome = load_documents(&tmp, &names);

        assert_eq!(outcome.documents.len(), 2);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].file_name, "broken.yaml");
        assert!(matches!(outcome.failures[0].error, FolioError::Parse { .. }));
        assert_eq!(outcome.documents[0].kind, SectionKind::Intro);
        assert_eq!(outcome.documents[1].file_name, "project.yaml");

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_file_is_a_failure() {
        let tmp = temp_dir();
        let outcome = load_documents(&tmp, &["ghost.yaml".to_string()]);
        assert!(outcome.documents.is_empty());
        assert!(matches!(outcome.failures[0].error, FolioError::Io { .. }));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn non_mapping_roots_are_rejected() {
        let tmp = temp_dir();
        std::fs::write(tmp.join("empty.yaml"), "").unwrap();
        std::fs::write(tmp.join("list.yaml"), "- a\n- b\n").unwrap();

        assert!(load_document(&tmp, "empty.yaml").is_err());
        assert!(load_document(&tmp, "list.yaml").is_err());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn section_name_is_derived() {
        let tmp = temp_dir();
        std::fs::write(tmp.join("fun_facts.yaml"), "items: [Tea]\n").unwrap();

        let doc = load_document(&tmp, "fun_facts.yaml").unwrap();
        assert_eq!(doc.section_name, "Fun Facts");
        assert_eq!(doc.kind, SectionKind::Generic);

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
