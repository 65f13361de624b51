//! Shared types, error model, and configuration for folio.
//!
//! This crate is the foundation depended on by all other folio crates.
//! It provides:
//! - [`FolioError`]: the unified error type
//! - Domain types ([`ConfigDocument`], [`SectionKind`], [`Record`] accessors,
//!   typed item views, [`LocationRecord`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod items;
pub mod location;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AlarmConfig, AppConfig, DeployConfig, GithubConfig, OpenAiConfig, PathsConfig, ProfileConfig,
    ServerConfig, config_dir, config_file_path, init_config, load_config, load_config_from,
    resolve_secret,
};
pub use error::{FolioError, Result};
pub use items::{Detail, EducationItem, ExperienceItem, Item, ProjectItem, TimelineEvent};
pub use location::{LocationFix, LocationRecord, filter_significant};
pub use types::{
    ConfigDocument, Record, RecordExt, SectionKind, file_stem, is_present, label_list,
    section_name_from_stem, value_text,
};
