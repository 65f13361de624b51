//! Section-level blocks that sit outside `items`: subtitle, quote, contact,
//! categories, and timeline.

use serde_yaml_ng::Value;

use folio_shared::{Detail, Record, RecordExt, TimelineEvent, label_list, value_text};

use crate::cards::badges;

pub(crate) fn subtitle(data: &Record) -> String {
    data.text("subtitle")
        .map(|s| format!("*{s}*\n\n"))
        .unwrap_or_default()
}

/// Quote line plus an optional attribution line.
pub(crate) fn quote(data: &Record) -> String {
    let Some(q) = data.text("quote") else {
        return String::new();
    };

    let mut md = format!("> \"{q}\"\n");
    if let Some(author) = data.text("quote_author") {
        md.push_str(&format!("> — {author}\n\n"));
    }
    md
}

/// Contact sub-block, present whenever `contact` is. `website` is a sibling
/// of `contact`, not a child.
pub(crate) fn contact(data: &Record) -> String {
    if data.field("contact").is_none() {
        return String::new();
    }

    let mut md = String::from("### Contact\n");
    if let Some(c) = data.record("contact") {
        if let Some(email) = c.text("email") {
            md.push_str(&format!("- **Email**: {email}\n"));
        }
        if let Some(linkedin) = c.text("linkedin") {
            md.push_str(&format!("- **LinkedIn**: [Profile]({linkedin})\n"));
        }
    }
    if let Some(website) = data.text("website") {
        md.push_str(&format!("- **Website**: [{website}]({website})\n"));
    }
    md.push('\n');
    md
}

/// One `###` heading per category with its technologies as badges.
pub(crate) fn categories(categories: &Record) -> String {
    let mut md = String::new();

    for (name, technologies) in categories {
        let Some(name) = value_text(name) else {
            continue;
        };
        md.push_str(&format!("### {name}\n\n"));
        md.push_str(&badges(&label_list(technologies)));
        md.push_str("\n\n");
    }

    md
}

/// Timeline events in order, followed by the optional footer paragraph.
pub(crate) fn timeline(events: &[Value], footer: Option<&str>) -> String {
    let mut md = String::new();

    for event in events.iter().filter_map(Value::as_mapping) {
        md.push_str(&timeline_event(&TimelineEvent::from_record(event)));
    }

    if let Some(footer) = footer {
        md.push_str(&format!("\n{footer}\n\n"));
    }

    md
}

fn timeline_event(event: &TimelineEvent) -> String {
    let mut md = String::new();

    if let Some(year) = &event.year {
        md.push_str(&format!("### {year}\n\n"));
    }
    if let Some(text) = &event.event {
        md.push_str(&format!("{text}\n\n"));
    }

    if !event.details.is_empty() {
        for detail in &event.details {
            match detail {
                Detail::Line(line) => md.push_str(&format!("- {line}\n")),
                Detail::Group { label, lines } => {
                    md.push_str(&format!("- {label}\n"));
                    for line in lines {
                        md.push_str(&format!("  - {line}\n"));
                    }
                }
            }
        }
        md.push('\n');
    }

    md
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(yaml: &str) -> Record {
        serde_yaml_ng::from_str(yaml).expect("parse record")
    }

    #[test]
    fn quote_without_author_has_no_attribution() {
        assert_eq!(quote(&record("quote: Stay curious")), "> \"Stay curious\"\n");
        assert_eq!(
            quote(&record("quote: Stay curious\nquote_author: Me")),
            "> \"Stay curious\"\n> — Me\n\n"
        );
        assert_eq!(quote(&record("quote_author: Me")), "");
    }

    #[test]
    fn contact_reads_website_from_parent() {
        let md = contact(&record(
            "contact:\n  email: me@example.com\n  linkedin: https://linkedin.com/in/me\nwebsite: https://me.dev",
        ));
        assert_eq!(
            md,
            "### Contact\n\
             - **Email**: me@example.com\n\
             - **LinkedIn**: [Profile](https://linkedin.com/in/me)\n\
             - **Website**: [https://me.dev](https://me.dev)\n\n"
        );

        assert_eq!(contact(&record("website: https://me.dev")), "");
    }

    #[test]
    fn categories_render_badges() {
        let md = categories(&record("Languages: Go, Rust\nTools: [Docker, Git]"));
        assert_eq!(md, "### Languages\n\n`Go` `Rust`\n\n### Tools\n\n`Docker` `Git`\n\n");
    }

    #[test]
    fn timeline_with_footer() {
        let events: Vec<Value> = serde_yaml_ng::from_str(
            "- year: 2020\n  event: Started\n  details: [One, Two]\n- year: 2021\n  event: Continued\n",
        )
        .unwrap();
        let md = timeline(&events, Some("More to come."));
        assert_eq!(
            md,
            "### 2020\n\nStarted\n\n- One\n- Two\n\n### 2021\n\nContinued\n\n\nMore to come.\n\n"
        );
    }

    #[test]
    fn timeline_groups_nest() {
        let events: Vec<Value> =
            serde_yaml_ng::from_str("- year: 2022\n  details:\n    - Courses: [Compilers, OS]\n")
                .unwrap();
        assert_eq!(
            timeline(&events, None),
            "### 2022\n\n- Courses\n  - Compilers\n  - OS\n\n"
        );
    }
}
