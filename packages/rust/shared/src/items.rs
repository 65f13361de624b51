//! Typed views over loosely shaped `items` and `timeline` entries.
//!
//! Every field is optional; unknown keys are ignored. Views are built from a
//! [`Record`] and never fail.

use serde_yaml_ng::Value;

use crate::types::{Record, RecordExt, SectionKind, value_text};

/// One entry of an `items` sequence.
#[derive(Debug, Clone)]
pub enum Item {
    /// A plain line of text (numbers and booleans included).
    Text(String),
    /// A nested list, rendered one line per element.
    List(Vec<String>),
    Project(ProjectItem),
    Experience(ExperienceItem),
    Education(EducationItem),
    /// Any other record, rendered key by key in document order.
    Generic(Record),
}

impl Item {
    /// Classify a raw entry using the owning document's kind.
    pub fn classify(value: &Value, kind: SectionKind) -> Option<Self> {
        match value {
            Value::Mapping(map) => Some(match kind {
                SectionKind::Project => Self::Project(ProjectItem::from_record(map)),
                SectionKind::Experience => Self::Experience(ExperienceItem::from_record(map)),
                SectionKind::Education => Self::Education(EducationItem::from_record(map)),
                SectionKind::Intro | SectionKind::Generic => Self::Generic(map.clone()),
            }),
            Value::Sequence(seq) => Some(Self::List(seq.iter().filter_map(value_text).collect())),
            Value::Tagged(tagged) => Self::classify(&tagged.value, kind),
            other => value_text(other).map(Self::Text),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProjectItem {
    pub name: Option<String>,
    pub description: Option<String>,
    pub bullet_points: Vec<String>,
    /// Technology labels (`tag: "Go, Rust"`).
    pub tags: Vec<String>,
    /// Repository URL.
    pub link: Option<String>,
    /// Live deployment URL.
    pub deployment: Option<String>,
}

impl ProjectItem {
    pub fn from_record(r: &Record) -> Self {
        Self {
            name: r.text("name"),
            description: r.text("description"),
            bullet_points: r.text_list("bullet_points"),
            tags: r.labels("tag"),
            link: r.text("link"),
            deployment: r.text("deployment"),
        }
    }

    /// The deployment URL, unless it just repeats the repository link.
    pub fn distinct_deployment(&self) -> Option<&str> {
        match (&self.deployment, &self.link) {
            (Some(d), Some(l)) if d == l => None,
            (Some(d), _) => Some(d.as_str()),
            (None, _) => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExperienceItem {
    pub company: Option<String>,
    pub duration: Option<String>,
    pub description: Option<String>,
    pub bullet_points: Vec<String>,
    pub tags: Vec<String>,
}

impl ExperienceItem {
    pub fn from_record(r: &Record) -> Self {
        Self {
            company: r.text("company"),
            duration: r.text("duration"),
            description: r.text("description"),
            bullet_points: r.text_list("bullet_points"),
            tags: r.labels("tag"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EducationItem {
    pub degree: Option<String>,
    pub school: Option<String>,
    pub duration: Option<String>,
    pub description: Option<String>,
    pub bullet_points: Vec<String>,
    /// Kept as one inline string; a sequence is joined with `", "`.
    pub skills: Option<String>,
}

impl EducationItem {
    pub fn from_record(r: &Record) -> Self {
        let skills = match r.field("skills") {
            Some(Value::Sequence(_)) => Some(r.labels("skills").join(", ")),
            Some(other) => value_text(other),
            None => None,
        };

        Self {
            degree: r.text("degree"),
            school: r.text("school"),
            duration: r.text("duration"),
            description: r.text("description"),
            bullet_points: r.text_list("bullet_points"),
            skills,
        }
    }
}

/// One `timeline` entry.
#[derive(Debug, Clone, Default)]
pub struct TimelineEvent {
    pub year: Option<String>,
    pub event: Option<String>,
    pub details: Vec<Detail>,
}

/// A timeline detail line, or a nested group keyed by label.
#[derive(Debug, Clone)]
pub enum Detail {
    Line(String),
    Group { label: String, lines: Vec<String> },
}

impl TimelineEvent {
    pub fn from_record(r: &Record) -> Self {
        let details = r
            .sequence("details")
            .map(|seq| seq.iter().flat_map(Detail::from_value).collect())
            .unwrap_or_default();

        Self {
            year: r.text("year"),
            event: r.text("event"),
            details,
        }
    }
}

impl Detail {
    fn from_value(value: &Value) -> Vec<Self> {
        match value {
            Value::Mapping(map) => map
                .iter()
                .filter_map(|(k, v)| {
                    let label = value_text(k)?;
                    Some(match v {
                        Value::Sequence(seq) => Self::Group {
                            label,
                            lines: seq.iter().filter_map(value_text).collect(),
                        },
                        other => match value_text(other) {
                            Some(text) => Self::Line(format!("{label}: {text}")),
                            None => Self::Line(label),
                        },
                    })
                })
                .collect(),
            Value::Tagged(tagged) => Self::from_value(&tagged.value),
            other => value_text(other).map(Self::Line).into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(yaml: &str) -> Value {
        serde_yaml_ng::from_str(yaml).expect("parse value")
    }

    #[test]
    fn classify_uses_document_kind() {
        let v = value("name: Folio\ntag: Rust");
        assert!(matches!(Item::classify(&v, SectionKind::Project), Some(Item::Project(_))));
        assert!(matches!(Item::classify(&v, SectionKind::Generic), Some(Item::Generic(_))));
        assert!(matches!(
            Item::classify(&value("just text"), SectionKind::Project),
            Some(Item::Text(_))
        ));
        assert!(matches!(Item::classify(&value("42"), SectionKind::Generic), Some(Item::Text(t)) if t == "42"));
        assert!(Item::classify(&Value::Null, SectionKind::Generic).is_none());
    }

    #[test]
    fn identical_deployment_is_not_distinct() {
        let p = ProjectItem::from_record(
            value("link: https://x\ndeployment: https://x").as_mapping().unwrap(),
        );
        assert_eq!(p.distinct_deployment(), None);

        let p = ProjectItem::from_record(
            value("link: https://x\ndeployment: https://y").as_mapping().unwrap(),
        );
        assert_eq!(p.distinct_deployment(), Some("https://y"));

        let p = ProjectItem::from_record(value("deployment: https://y").as_mapping().unwrap());
        assert_eq!(p.distinct_deployment(), Some("https://y"));
    }

    #[test]
    fn education_skills_join_sequences() {
        let e = EducationItem::from_record(
            value("degree: BSc\nskills: [Algorithms, Databases]").as_mapping().unwrap(),
        );
        assert_eq!(e.skills.as_deref(), Some("Algorithms, Databases"));
        assert!(e.school.is_none());
    }

    #[test]
    fn timeline_details_keep_nested_groups() {
        let t = TimelineEvent::from_record(
            value(
                "year: '2021'\nevent: Moved\ndetails:\n  - First line\n  - Courses: [Compilers, OS]\n",
            )
            .as_mapping()
            .unwrap(),
        );
        assert_eq!(t.year.as_deref(), Some("2021"));
        assert_eq!(t.details.len(), 2);
        match &t.details[1] {
            Detail::Group { label, lines } => {
                assert_eq!(label, "Courses");
                assert_eq!(lines, &vec!["Compilers".to_string(), "OS".to_string()]);
            }
            other => panic!("expected group, got {other:?}"),
        }
    }
}
