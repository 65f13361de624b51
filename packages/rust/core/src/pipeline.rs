//! End-to-end `generate` pipeline: config dir → discovery → load → assemble → README.

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{Local, NaiveDate};
use tracing::{info, instrument};

use folio_discovery::DiscoveryOptions;
use folio_shared::{AppConfig, FolioError, Result};

use crate::assembler::{self, AssembleConfig, AssembledReadme};
use crate::loader::{self, LoadFailure};

/// Configuration for the `generate` pipeline.
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    /// Directory holding the section documents.
    pub config_dir: PathBuf,
    /// README path, overwritten on every run.
    pub output_file: PathBuf,
    /// Heading used when there is no intro document.
    pub fallback_title: String,
    /// Discovery options (order manifest name).
    pub discovery: DiscoveryOptions,
}

impl GenerateConfig {
    /// Build from the application config; CLI flags override afterwards.
    pub fn from_app(config: &AppConfig) -> Self {
        Self {
            config_dir: config.paths.config_dir.clone(),
            output_file: config.paths.output_file.clone(),
            fallback_title: config.profile.fallback_title.clone(),
            discovery: DiscoveryOptions::default(),
        }
    }
}

/// A rendered README that has not been written anywhere yet.
#[derive(Debug)]
pub struct RenderedReadme {
    pub readme: AssembledReadme,
    /// Number of documents that loaded (intro included).
    pub document_count: usize,
    pub failures: Vec<LoadFailure>,
}

/// Result of the `generate` pipeline.
#[derive(Debug)]
pub struct GenerateResult {
    pub output_file: PathBuf,
    pub line_count: usize,
    pub document_count: usize,
    /// Documents that were skipped.
    pub failures: Vec<LoadFailure>,
    pub elapsed: std::time::Duration,
}

/// Today's local date, as printed in the README footer.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Discover, load, and assemble without touching the output file.
///
/// Fails when discovery fails or when no document loads at all.
#[instrument(skip_all, fields(config_dir = %config.config_dir.display()))]
pub fn render_readme(config: &GenerateConfig, generated_on: NaiveDate) -> Result<RenderedReadme> {
    let files = folio_discovery::discover_with(&config.config_dir, &config.discovery)?;
    let outcome = loader::load_documents(&config.config_dir, &files);

    if outcome.documents.is_empty() {
        return Err(FolioError::validation(format!(
            "no documents loaded from {} ({} failed)",
            config.config_dir.display(),
            outcome.failures.len()
        )));
    }

    let readme = assembler::assemble(
        &outcome.documents,
        &AssembleConfig {
            fallback_title: config.fallback_title.clone(),
            generated_on,
        },
    );

    Ok(RenderedReadme {
        readme,
        document_count: outcome.documents.len(),
        failures: outcome.failures,
    })
}

/// Run the full pipeline and write the README.
#[instrument(skip_all, fields(output = %config.output_file.display()))]
pub fn generate_readme(config: &GenerateConfig, generated_on: NaiveDate) -> Result<GenerateResult> {
    let start = Instant::now();

    info!(config_dir = %config.config_dir.display(), "generating README");

    let rendered = render_readme(config, generated_on)?;
    write_readme(&config.output_file, &rendered.readme.content)?;

    let line_count = rendered.readme.line_count();
    info!(
        path = %config.output_file.display(),
        lines = line_count,
        documents = rendered.document_count,
        "README generated"
    );

    Ok(GenerateResult {
        output_file: config.output_file.clone(),
        line_count,
        document_count: rendered.document_count,
        failures: rendered.failures,
        elapsed: start.elapsed(),
    })
}

/// Overwrite `path` with `content`, creating missing parent directories.
pub fn write_readme(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| FolioError::io(parent, e))?;
    }
    std::fs::write(path, content).map_err(|e| FolioError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("folio-pipeline-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    fn config(tmp: &Path) -> GenerateConfig {
        GenerateConfig {
            config_dir: tmp.join("config"),
            output_file: tmp.join("out").join("README.md"),
            fallback_title: "Personal Portfolio".into(),
            discovery: DiscoveryOptions::default(),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn generates_full_readme() {
        let tmp = temp_dir();
        let dir = tmp.join("config");
        std::fs::create_dir_all(&dir).unwrap();

        write(&dir, "base.yaml", "- intro.yaml\n- project.yaml\n- tech_stack.yaml\n");
        write(&dir, "intro.yaml", "title: Jane Doe\ncontact:\n  email: jane@example.com\n");
        write(
            &dir,
            "project.yaml",
            "title: Projects\nitems:\n  - name: Folio\n    tag: Go, Rust\n    link: https://x\n    deployment: https://x\n",
        );
        write(&dir, "tech_stack.yaml", "title: \"🧰 Tech Stack\"\ncategories:\n  Languages: Rust\n");
        write(&dir, "broken.yaml", "items: [unclosed\n");

        let result = generate_readme(&config(&tmp), date()).unwrap();
        assert_eq!(result.document_count, 3);
        assert_eq!(result.failures.len(), 1);

        let content = std::fs::read_to_string(&result.output_file).unwrap();
        assert_eq!(result.line_count, content.split('\n').count());
        assert!(content.starts_with("# Jane Doe\n\n### Contact\n- **Email**: jane@example.com\n\n"));

        let tech = content.find("## 🧰 Tech Stack").unwrap();
        let projects = content.find("## Projects").unwrap();
        assert!(tech < projects);
        assert!(content.contains("- [🧰 Tech Stack](#-tech-stack)\n- [Projects](#projects)\n"));
        assert!(content.contains("`Go` `Rust`"));
        assert!(!content.contains("Live Demo"));
        assert!(content.ends_with("on 10/19/2026*\n"));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn regeneration_is_byte_identical() {
        let tmp = temp_dir();
        let dir = tmp.join("config");
        std::fs::create_dir_all(&dir).unwrap();
        write(&dir, "journey.yaml", "timeline:\n  - year: 2020\n    event: Started\n");
        write(&dir, "fun_facts.yaml", "items: [Tea, Chess]\n");

        let cfg = config(&tmp);
        generate_readme(&cfg, date()).unwrap();
        let first = std::fs::read(&cfg.output_file).unwrap();
        generate_readme(&cfg, date()).unwrap();
        let second = std::fs::read(&cfg.output_file).unwrap();
        assert_eq!(first, second);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn zero_documents_aborts_without_writing() {
        let tmp = temp_dir();
        let dir = tmp.join("config");
        std::fs::create_dir_all(&dir).unwrap();
        write(&dir, "broken.yaml", "- just\n- a list\n");

        let cfg = config(&tmp);
        let err = generate_readme(&cfg, date()).unwrap_err();
        assert!(matches!(err, FolioError::Validation { .. }));
        assert!(!cfg.output_file.exists());

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
