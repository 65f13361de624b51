//! Core domain types for folio section documents.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_yaml_ng::{Mapping, Value};

/// Parsed root of one section document: string keys to loosely typed values.
pub type Record = Mapping;

// ---------------------------------------------------------------------------
// SectionKind
// ---------------------------------------------------------------------------

/// Rendering strategy for a document, inferred once at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// Header material (title, subtitle, quote, contact), never a body section.
    Intro,
    Project,
    Experience,
    Education,
    Generic,
}

impl SectionKind {
    /// Infer the kind from a file name such as `project.yaml`.
    pub fn infer(file_name: &str) -> Self {
        if file_stem(file_name) == "intro" {
            Self::Intro
        } else if file_name.contains("project") {
            Self::Project
        } else if file_name.contains("experience") {
            Self::Experience
        } else if file_name.contains("education") {
            Self::Education
        } else {
            Self::Generic
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Intro => "intro",
            Self::Project => "project",
            Self::Experience => "experience",
            Self::Education => "education",
            Self::Generic => "generic",
        }
    }
}

impl std::str::FromStr for SectionKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "intro" => Ok(Self::Intro),
            "project" => Ok(Self::Project),
            "experience" => Ok(Self::Experience),
            "education" => Ok(Self::Education),
            "generic" => Ok(Self::Generic),
            other => Err(format!("unknown section kind: {other}")),
        }
    }
}

impl std::fmt::Display for SectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ConfigDocument
// ---------------------------------------------------------------------------

/// One loaded section document. Immutable once built.
#[derive(Debug, Clone)]
pub struct ConfigDocument {
    /// File name relative to the config directory (e.g. `tech_stack.yaml`).
    pub file_name: String,
    /// Human-readable name derived from the file stem (`Tech Stack`).
    pub section_name: String,
    pub kind: SectionKind,
    pub data: Record,
}

impl ConfigDocument {
    /// Build a document, inferring its kind unless `data.kind` names one.
    pub fn new(file_name: impl Into<String>, data: Record) -> Self {
        let file_name = file_name.into();
        let kind = data
            .text("kind")
            .and_then(|k| k.parse().ok())
            .unwrap_or_else(|| SectionKind::infer(&file_name));

        Self {
            section_name: section_name_from_stem(file_stem(&file_name)),
            file_name,
            kind,
            data,
        }
    }

    /// `data.title` if present, else the derived section name.
    pub fn display_title(&self) -> String {
        self.data
            .text("title")
            .unwrap_or_else(|| self.section_name.clone())
    }
}

/// File name without its final extension.
pub fn file_stem(file_name: &str) -> &str {
    Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name)
}

/// `fun_facts` -> `Fun Facts`: underscores become spaces and the first
/// character of every ASCII word is upper-cased.
pub fn section_name_from_stem(stem: &str) -> String {
    let mut out = String::with_capacity(stem.len());
    let mut prev_word = false;

    for c in stem.chars() {
        let c = if c == '_' { ' ' } else { c };
        let is_word = c.is_ascii_alphanumeric();
        if is_word && !prev_word {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
        prev_word = is_word;
    }

    out
}

// ---------------------------------------------------------------------------
// Presence-checked accessors
// ---------------------------------------------------------------------------

/// Whether a value counts as present: not null, not `false`, not `""`, not `0`.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::Sequence(_) | Value::Mapping(_) => true,
        Value::Tagged(tagged) => is_present(&tagged.value),
    }
}

/// Inline text for a value. Scalars print as written; nested structures are
/// kept as compact JSON so nothing is dropped.
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Tagged(tagged) => value_text(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => Some(
            serde_json::to_string(value).unwrap_or_else(|_| {
                serde_yaml_ng::to_string(value)
                    .map(|s| s.trim().to_string())
                    .unwrap_or_default()
            }),
        ),
    }
}

/// A comma-separated label string (`"Go, Rust"`) or a sequence of labels.
pub fn label_list(value: &Value) -> Vec<String> {
    match value {
        Value::Sequence(seq) => seq
            .iter()
            .filter_map(value_text)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Value::Tagged(tagged) => label_list(&tagged.value),
        other => value_text(other)
            .map(|s| {
                s.split(", ")
                    .map(|part| part.trim().to_string())
                    .filter(|part| !part.is_empty())
                    .collect()
            })
            .unwrap_or_default(),
    }
}

/// Optional-returning field access on a [`Record`]. No accessor assumes a key exists.
pub trait RecordExt {
    /// The value under `key`, if present in the truthiness sense.
    fn field(&self, key: &str) -> Option<&Value>;

    /// The value under `key` as inline text.
    fn text(&self, key: &str) -> Option<String> {
        self.field(key).and_then(value_text)
    }

    /// The sequence under `key`; other shapes count as absent.
    fn sequence(&self, key: &str) -> Option<&[Value]> {
        match self.field(key)? {
            Value::Sequence(seq) => Some(seq.as_slice()),
            _ => None,
        }
    }

    /// The nested mapping under `key`; other shapes count as absent.
    fn record(&self, key: &str) -> Option<&Record> {
        match self.field(key)? {
            Value::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Sequence under `key` rendered as text lines.
    fn text_list(&self, key: &str) -> Vec<String> {
        self.sequence(key)
            .map(|seq| seq.iter().filter_map(value_text).collect())
            .unwrap_or_default()
    }

    /// Labels under `key`, split on `", "` when given as a string.
    fn labels(&self, key: &str) -> Vec<String> {
        self.field(key).map(label_list).unwrap_or_default()
    }
}

impl RecordExt for Record {
    fn field(&self, key: &str) -> Option<&Value> {
        self.get(key).filter(|v| is_present(v))
    }
}
