//! Item cards: one renderer per item shape.
//!
//! Each card is a `&T -> String` function; the shape was decided once by
//! [`Item::classify`] from the owning document's kind.

use serde_yaml_ng::Value;

use folio_shared::{
    EducationItem, ExperienceItem, Item, ProjectItem, Record, SectionKind, section_name_from_stem,
    value_text,
};

/// Heading text for cards missing their identifying field.
const UNTITLED: &str = "Untitled";

/// Render an `items` sequence. Always ends with a blank line.
pub(crate) fn render_items(items: &[Value], kind: SectionKind) -> String {
    let mut md = String::new();

    for item in items.iter().filter_map(|v| Item::classify(v, kind)) {
        match item {
            Item::Text(text) => md.push_str(&format!("- {text}\n")),
            Item::List(lines) => md.push_str(&bullets(&lines)),
            Item::Project(p) => md.push_str(&project_card(&p)),
            Item::Experience(e) => md.push_str(&experience_card(&e)),
            Item::Education(e) => md.push_str(&education_card(&e)),
            Item::Generic(r) => md.push_str(&generic_card(&r)),
        }
    }

    md.push('\n');
    md
}

/// Inline-code badges joined by spaces: `` `Go` `Rust` ``.
pub(crate) fn badges(labels: &[String]) -> String {
    labels
        .iter()
        .map(|label| format!("`{label}`"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// One `- line` per entry.
fn bullets(lines: &[String]) -> String {
    lines.iter().map(|line| format!("- {line}\n")).collect()
}

// ---------------------------------------------------------------------------
// Cards
// ---------------------------------------------------------------------------

pub(crate) fn project_card(p: &ProjectItem) -> String {
    let mut md = format!("### {}\n\n", p.name.as_deref().unwrap_or(UNTITLED));

    if let Some(description) = &p.description {
        md.push_str(&format!("{description}\n\n"));
    }

    if !p.bullet_points.is_empty() {
        md.push_str(&bullets(&p.bullet_points));
        md.push('\n');
    }

    if !p.tags.is_empty() {
        md.push_str(&format!("**Technologies**: {}\n\n", badges(&p.tags)));
    }

    let mut links = Vec::new();
    if let Some(link) = &p.link {
        links.push(format!("[Repository]({link})"));
    }
    if let Some(deployment) = p.distinct_deployment() {
        links.push(format!("[Live Demo]({deployment})"));
    }
    if !links.is_empty() {
        md.push_str(&format!("**Links**: {}\n\n", links.join(" • ")));
    }

    md.push_str("---\n\n");
    md
}

pub(crate) fn experience_card(e: &ExperienceItem) -> String {
    let mut md = format!("### {}\n", e.company.as_deref().unwrap_or(UNTITLED));

    if let Some(duration) = &e.duration {
        md.push_str(&format!("*{duration}*\n"));
    }
    md.push('\n');

    if let Some(description) = &e.description {
        md.push_str(&format!("{description}\n\n"));
    }

    if !e.bullet_points.is_empty() {
        md.push_str(&bullets(&e.bullet_points));
        md.push('\n');
    }

    if !e.tags.is_empty() {
        md.push_str(&format!("**Technologies**: {}\n\n", badges(&e.tags)));
    }

    md.push_str("---\n\n");
    md
}

pub(crate) fn education_card(e: &EducationItem) -> String {
    let heading = match (&e.degree, &e.school) {
        (Some(degree), Some(school)) => format!("{degree}, **{school}**"),
        (Some(degree), None) => degree.clone(),
        (None, Some(school)) => format!("**{school}**"),
        (None, None) => UNTITLED.to_string(),
    };
    let mut md = format!("### {heading}\n");

    if let Some(duration) = &e.duration {
        md.push_str(&format!("*{duration}*\n"));
    }

    if let Some(description) = &e.description {
        md.push_str(&format!("\n{description}\n"));
    }

    md.push_str(&bullets(&e.bullet_points));

    if let Some(skills) = &e.skills {
        md.push_str(&format!("\n**Skills:** {skills}\n"));
    }

    md.push_str("\n---\n\n");
    md
}

/// Every key in document order: sequences as a labelled bullet list,
/// everything else as a bold `Label: value` line. Null values are skipped.
pub(crate) fn generic_card(r: &Record) -> String {
    let mut md = String::new();

    for (key, value) in r {
        let Some(key) = value_text(key) else {
            continue;
        };
        let label = section_name_from_stem(&key);

        match value {
            Value::Sequence(seq) => {
                md.push_str(&format!("**{label}**:\n"));
                let lines: Vec<String> = seq.iter().filter_map(value_text).collect();
                md.push_str(&bullets(&lines));
            }
            other => {
                if let Some(text) = value_text(other) {
                    md.push_str(&format!("**{label}**: {text}\n"));
                }
            }
        }
    }

    md.push('\n');
    md
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(yaml: &str) -> Record {
        serde_yaml_ng::from_str(yaml).expect("parse mapping")
    }

    #[test]
    fn project_card_full() {
        let p = ProjectItem::from_record(&mapping(
            r#"
name: Folio
description: Portfolio generator.
bullet_points:
  - Renders YAML
  - Ships a README
tag: "Go, Rust"
link: https://github.com/me/folio
deployment: https://folio.example.com
"#,
        ));

        let expected = "### Folio\n\n\
Portfolio generator.\n\n\
- Renders YAML\n\
- Ships a README\n\n\
**Technologies**: `Go` `Rust`\n\n\
**Links**: [Repository](https://github.com/me/folio) • [Live Demo](https://folio.example.com)\n\n\
---\n\n";
        assert_eq!(project_card(&p), expected);
    }

    #[test]
    fn project_card_identical_links_show_repository_only() {
        let p = ProjectItem::from_record(&mapping("name: X\nlink: https://x\ndeployment: https://x"));
        let md = project_card(&p);
        assert!(md.contains("**Links**: [Repository](https://x)\n"));
        assert!(!md.contains("Live Demo"));
    }

    #[test]
    fn project_card_without_name_or_links() {
        let p = ProjectItem::from_record(&mapping("description: Only text"));
        assert_eq!(project_card(&p), "### Untitled\n\nOnly text\n\n---\n\n");
    }

    #[test]
    fn experience_card_layout() {
        let e = ExperienceItem::from_record(&mapping(
            "company: Acme\nduration: 2022 - 2024\ndescription: Built things.\ntag: Rust, SQL",
        ));
        assert_eq!(
            experience_card(&e),
            "### Acme\n*2022 - 2024*\n\nBuilt things.\n\n**Technologies**: `Rust` `SQL`\n\n---\n\n"
        );
    }

    #[test]
    fn education_card_layout() {
        let e = EducationItem::from_record(&mapping(
            "degree: BSc Computer Science\nschool: Dalhousie University\nduration: 2019 - 2023\n\
             bullet_points: [Dean's list]\nskills: Algorithms, Databases",
        ));
        assert_eq!(
            education_card(&e),
            "### BSc Computer Science, **Dalhousie University**\n*2019 - 2023*\n\
             - Dean's list\n\n**Skills:** Algorithms, Databases\n\n---\n\n"
        );
    }

    #[test]
    fn generic_card_keeps_key_order() {
        let r = mapping("favorite_food: Ramen\nhobbies: [Climbing, Chess]\nyears: 3");
        assert_eq!(
            generic_card(&r),
            "**Favorite Food**: Ramen\n**Hobbies**:\n- Climbing\n- Chess\n**Years**: 3\n\n"
        );
    }

    #[test]
    fn generic_card_skips_null_values() {
        let r = mapping("favorite_food: ~\nsport: Climbing\nnickname:\n");
        assert_eq!(generic_card(&r), "**Sport**: Climbing\n\n");
    }

    #[test]
    fn items_dispatch_strings_and_records() {
        let items: Vec<Value> =
            serde_yaml_ng::from_str("- Learning **Rust**\n- name: Folio\n").unwrap();
        let md = render_items(&items, SectionKind::Project);
        assert!(md.starts_with("- Learning **Rust**\n### Folio\n\n"));
        assert!(md.ends_with("---\n\n\n"));
    }

    #[test]
    fn badges_join_with_spaces() {
        assert_eq!(badges(&["Go".into(), "Rust".into()]), "`Go` `Rust`");
        assert_eq!(badges(&[]), "");
    }
}
