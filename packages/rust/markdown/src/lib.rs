//! Markdown rendering for section documents.
//!
//! Every function here is pure: a document (or header material) goes in and
//! a Markdown fragment comes out. Absent fields are skipped, never rendered as
//! placeholders. Text is emitted verbatim; inline Markdown in values passes
//! through untouched.

mod blocks;
mod cards;
mod header;

use tracing::trace;

use folio_shared::{ConfigDocument, RecordExt};

pub use header::render_header;

/// Render one body section.
///
/// Blocks appear in a fixed order: heading, subtitle, quote, contact,
/// items, categories, timeline (with its footer).
pub fn render_section(doc: &ConfigDocument) -> String {
    let data = &doc.data;
    let mut md = format!("\n## {}\n\n", doc.display_title());

    md.push_str(&blocks::subtitle(data));
    md.push_str(&blocks::quote(data));
    md.push_str(&blocks::contact(data));

    if let Some(items) = data.sequence("items") {
        md.push_str(&cards::render_items(items, doc.kind));
    }

    if let Some(categories) = data.record("categories") {
        md.push_str(&blocks::categories(categories));
    }

    if let Some(events) = data.sequence("timeline") {
        let footer = data.text("footer");
        md.push_str(&blocks::timeline(events, footer.as_deref()));
    }

    trace!(file = %doc.file_name, kind = %doc.kind, bytes = md.len(), "rendered section");

    md
}
