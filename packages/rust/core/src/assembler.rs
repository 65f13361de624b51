//! README assembler.
//!
//! Takes loaded documents in discovery order and produces the final text:
//!
//! ```text
//! # Title              (intro document, or fallback)
//! subtitle / quote / contact
//! ## Table of Contents
//! ## Section ...       (every other document, in order)
//! ---
//! *generated on ...*
//! ```

use chrono::NaiveDate;
use tracing::{debug, instrument, warn};

use folio_markdown::{render_header, render_section};
use folio_shared::{ConfigDocument, SectionKind};

use crate::toc;

/// Configuration for README assembly.
#[derive(Debug, Clone)]
pub struct AssembleConfig {
    /// Top-level heading used when no intro document is loaded.
    pub fallback_title: String,
    /// Date printed in the footer line.
    pub generated_on: NaiveDate,
}

/// Output from a successful assembly.
#[derive(Debug, Clone)]
pub struct AssembledReadme {
    pub content: String,
    /// Number of body sections (intro excluded).
    pub section_count: usize,
    pub has_intro: bool,
}

impl AssembledReadme {
    /// Line count as reported after writing (`"a\nb\n"` counts 3).
    pub fn line_count(&self) -> usize {
        self.content.split('\n').count()
    }
}

/// Assemble header, table of contents, body, and footer.
///
/// The first intro document feeds the header and is left out of the body.
/// Any later intro document is rendered as an ordinary section.
#[instrument(skip_all, fields(documents = documents.len()))]
pub fn assemble(documents: &[ConfigDocument], config: &AssembleConfig) -> AssembledReadme {
    let header_at = documents.iter().position(|d| d.kind == SectionKind::Intro);
    let intro = header_at.map(|i| &documents[i]);

    let body: Vec<&ConfigDocument> = documents
        .iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != header_at)
        .map(|(_, d)| d)
        .collect();

    for extra in body.iter().filter(|d| d.kind == SectionKind::Intro) {
        warn!(file = %extra.file_name, "more than one intro document, rendering it as a section");
    }

    let mut content = render_header(intro, &config.fallback_title);

    let entries = toc::build_toc(&body);
    content.push_str(&toc::render_toc(&entries));

    for doc in &body {
        content.push_str(&render_section(doc));
    }

    content.push_str(&render_footer(config.generated_on));

    debug!(
        sections = body.len(),
        has_intro = intro.is_some(),
        bytes = content.len(),
        "README assembled"
    );

    AssembledReadme {
        content,
        section_count: body.len(),
        has_intro: intro.is_some(),
    }
}

/// Rule plus the generation line, date as `M/D/YYYY`.
pub fn render_footer(date: NaiveDate) -> String {
    format!(
        "\n---\n\n*This README was automatically generated from YAML configuration files on {}*\n",
        date.format("%-m/%-d/%Y")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(file_name: &str, yaml: &str) -> ConfigDocument {
        ConfigDocument::new(file_name, serde_yaml_ng::from_str(yaml).unwrap())
    }

    fn config() -> AssembleConfig {
        AssembleConfig {
            fallback_title: "Personal Portfolio".into(),
            generated_on: NaiveDate::from_ymd_opt(2026, 3, 7).unwrap(),
        }
    }

    #[test]
    fn footer_uses_unpadded_date() {
        assert_eq!(
            render_footer(NaiveDate::from_ymd_opt(2026, 3, 7).unwrap()),
            "\n---\n\n*This README was automatically generated from YAML configuration files on 3/7/2026*\n"
        );
    }

    #[test]
    fn without_intro_uses_fallback_heading() {
        let docs = vec![doc("fun_facts.yaml", "items: [Tea]")];
        let readme = assemble(&docs, &config());

        assert!(!readme.has_intro);
        assert_eq!(readme.section_count, 1);
        assert_eq!(
            readme.content,
            "# Personal Portfolio\n\
             ## Table of Contents\n\n\
             - [Fun Facts](#fun-facts)\n\n\
             \n## Fun Facts\n\n- Tea\n\n\
             \n---\n\n*This README was automatically generated from YAML configuration files on 3/7/2026*\n"
        );
        assert!(!readme.content.contains("### Contact"));
    }

    #[test]
    fn intro_is_header_only() {
        let docs = vec![
            doc("journey.yaml", "title: My Journey"),
            doc("intro.yaml", "title: Jane Doe\nsubtitle: Builder"),
        ];
        let readme = assemble(&docs, &config());

        assert!(readme.has_intro);
        assert_eq!(readme.section_count, 1);
        assert!(readme.content.starts_with("# Jane Doe\n\n*Builder*\n\n## Table of Contents\n\n"));
        assert!(!readme.content.contains("## Jane Doe"));
        assert!(readme.content.contains("- [My Journey](#my-journey)\n"));
    }

    #[test]
    fn second_intro_becomes_a_section() {
        let docs = vec![
            doc("intro.yaml", "title: Jane Doe"),
            doc("intro.yml", "title: About Me\nsubtitle: Hello"),
        ];
        let readme = assemble(&docs, &config());

        assert!(readme.has_intro);
        assert_eq!(readme.section_count, 1);
        assert!(readme.content.starts_with("# Jane Doe\n"));
        assert!(readme.content.contains("\n## About Me\n\n*Hello*\n"));
        assert!(readme.content.contains("- [About Me](#about-me)\n"));
    }

    #[test]
    fn same_input_same_output() {
        let docs = vec![
            doc("intro.yaml", "title: Jane"),
            doc("project.yaml", "items:\n  - name: X\n    tag: Go, Rust\n"),
        ];
        assert_eq!(assemble(&docs, &config()).content, assemble(&docs, &config()).content);
    }

    #[test]
    fn line_count_splits_on_newline() {
        let readme = AssembledReadme {
            content: "a\nb\n".into(),
            section_count: 0,
            has_intro: false,
        };
        assert_eq!(readme.line_count(), 3);
    }
}
