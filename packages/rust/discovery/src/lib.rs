//! Section document discovery.
//!
//! Decides which YAML documents in the config directory are rendered, and in
//! what order. An order manifest (`base.yaml`, a YAML sequence of file names)
//! takes precedence; anything it does not list is appended alphabetically.
//! Without a manifest the whole directory is taken alphabetically.

use std::path::Path;

use serde_yaml_ng::Value;
use tracing::{debug, info, instrument, warn};

use folio_shared::{FolioError, Result, file_stem, value_text};

/// Default order manifest file name.
pub const MANIFEST_NAME: &str = "base.yaml";

/// Extensions recognized as section documents.
const EXTENSIONS: [&str; 2] = [".yaml", ".yml"];

/// Stem of the document that must precede the project document.
const TECH_STACK_STEM: &str = "tech_stack";

/// Stem of the project document.
const PROJECT_STEM: &str = "project";

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Configuration for discovery.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Name of the order manifest inside the config directory.
    pub manifest_name: String,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            manifest_name: MANIFEST_NAME.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Main entry point
// ---------------------------------------------------------------------------

/// Discover section documents in `dir` with default options.
pub fn discover(dir: &Path) -> Result<Vec<String>> {
    discover_with(dir, &DiscoveryOptions::default())
}

/// Discover section documents in `dir`, returning file names in processing order.
///
/// 1. Manifest order (minus itself and non-YAML names), then unlisted files
///    alphabetically; or, without a usable manifest, all files alphabetically
/// 2. If `tech_stack` comes after `project`, the two swap places
#[instrument(skip_all, fields(dir = %dir.display()))]
pub fn discover_with(dir: &Path, opts: &DiscoveryOptions) -> Result<Vec<String>> {
    let scanned = scan_directory(dir, &opts.manifest_name)?;

    let mut files = match read_manifest(dir, &opts.manifest_name) {
        Some(listed) => {
            let mut ordered: Vec<String> = Vec::with_capacity(listed.len() + scanned.len());
            for name in listed {
                if name != opts.manifest_name && is_document(&name) && !ordered.contains(&name) {
                    ordered.push(name);
                }
            }
            let declared = ordered.len();
            for name in scanned {
                if !ordered.contains(&name) {
                    ordered.push(name);
                }
            }
            debug!(declared, undeclared = ordered.len() - declared, "applied order manifest");
            ordered
        }
        None => scanned,
    };

    apply_priority_swap(&mut files);

    info!(count = files.len(), files = ?files, "discovered section documents");

    Ok(files)
}

/// Swap `tech_stack` and `project` when the tech stack comes later.
///
/// A single positional swap; no other document moves.
pub fn apply_priority_swap(files: &mut [String]) {
    let tech = files.iter().position(|f| file_stem(f) == TECH_STACK_STEM);
    let project = files.iter().position(|f| file_stem(f) == PROJECT_STEM);

    if let (Some(t), Some(p)) = (tech, project) {
        if t > p {
            debug!(tech_stack = t, project = p, "moving tech stack ahead of projects");
            files.swap(t, p);
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Whether a file name carries a recognized document extension.
fn is_document(name: &str) -> bool {
    EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

/// All documents in `dir` except the manifest, case-insensitive alphabetical.
fn scan_directory(dir: &Path, manifest_name: &str) -> Result<Vec<String>> {
    let entries = std::fs::read_dir(dir).map_err(|e| FolioError::io(dir, e))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| FolioError::io(dir, e))?;
        if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            warn!(path = %entry.path().display(), "skipping non UTF-8 file name");
            continue;
        };
        if is_document(&name) && name != manifest_name {
            names.push(name);
        }
    }

    names.sort_by(|a, b| {
        a.to_lowercase()
            .cmp(&b.to_lowercase())
            .then_with(|| a.cmp(b))
    });

    Ok(names)
}

/// Read the manifest's file list. `None` when absent or unusable.
fn read_manifest(dir: &Path, manifest_name: &str) -> Option<Vec<String>> {
    let path = dir.join(manifest_name);
    if !path.exists() {
        return None;
    }

    let content = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read order manifest, using alphabetical order");
            return None;
        }
    };

    match serde_yaml_ng::from_str::<Value>(&content) {
        Ok(Value::Sequence(seq)) => Some(seq.iter().filter_map(value_text).collect()),
        Ok(_) => {
            warn!(path = %path.display(), "order manifest is not a sequence, using alphabetical order");
            None
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "malformed order manifest, using alphabetical order");
            None
        }
    }
}
