//! Table of contents builder.
//!
//! One entry per body section, in render order, linking to an anchor derived
//! from the section's display title.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument};

use folio_shared::ConfigDocument;

static NON_ALNUM_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"));

/// One table-of-contents line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub title: String,
    pub anchor: String,
}

/// Build TOC entries for the given body sections.
#[instrument(skip_all, fields(section_count = sections.len()))]
pub fn build_toc(sections: &[&ConfigDocument]) -> Vec<TocEntry> {
    let entries: Vec<TocEntry> = sections
        .iter()
        .map(|doc| {
            let title = doc.display_title();
            TocEntry {
                anchor: anchor(&title),
                title,
            }
        })
        .collect();

    debug!(entries = entries.len(), "TOC built");

    entries
}

/// Render the TOC block, heading included.
pub fn render_toc(entries: &[TocEntry]) -> String {
    let mut md = String::from("## Table of Contents\n\n");
    for entry in entries {
        md.push_str(&format!("- [{}](#{})\n", entry.title, entry.anchor));
    }
    md.push('\n');
    md
}

/// Anchor slug for a title: lower-cased, every run of characters outside
/// `[a-z0-9]` collapsed to one hyphen. Leading and trailing hyphens are kept.
pub fn anchor(title: &str) -> String {
    NON_ALNUM_RUN
        .replace_all(&title.to_lowercase(), "-")
        .into_owned()
}
