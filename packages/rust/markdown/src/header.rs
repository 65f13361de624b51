//! README header built from the intro document.

use folio_shared::{ConfigDocument, RecordExt};

/// `# Title`, then subtitle, quote, and contact when an intro is present.
///
/// Without an intro only the title line is produced, using `fallback_title`.
/// The contact block here lists website first and also carries `address`.
pub fn render_header(intro: Option<&ConfigDocument>, fallback_title: &str) -> String {
    let title = intro
        .and_then(|doc| doc.data.text("title"))
        .unwrap_or_else(|| fallback_title.to_string());
    let mut md = format!("# {title}\n");

    let Some(intro) = intro else {
        return md;
    };
    let data = &intro.data;

    if let Some(subtitle) = data.text("subtitle") {
        md.push_str(&format!("\n*{subtitle}*\n"));
    }

    if let Some(quote) = data.text("quote") {
        md.push_str(&format!("\n> \"{quote}\"\n"));
        if let Some(author) = data.text("quote_author") {
            md.push_str(&format!("> — {author}\n"));
        }
    }

    let contact = data.record("contact");
    let website = data.text("website");
    let address = data.text("address");

    if data.field("contact").is_some() || website.is_some() || address.is_some() {
        md.push_str("\n### Contact\n");
        if let Some(website) = &website {
            md.push_str(&format!("- **Website**: [{website}]({website})\n"));
        }
        if let Some(email) = contact.and_then(|c| c.text("email")) {
            md.push_str(&format!("- **Email**: {email}\n"));
        }
        if let Some(linkedin) = contact.and_then(|c| c.text("linkedin")) {
            md.push_str(&format!("- **LinkedIn**: [Profile]({linkedin})\n"));
        }
        if let Some(address) = &address {
            md.push_str(&format!("- **Address**: {address}\n"));
        }
    }

    md.push('\n');
    md
}
