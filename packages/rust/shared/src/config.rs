//! Application configuration for folio.
//!
//! User config lives at `~/.folio/folio.toml`.
//! CLI flags override config file values, which override defaults.
//! Secrets are never stored here, only the names of the env vars holding them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FolioError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "folio.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".folio";

// ---------------------------------------------------------------------------
// Config structs (matching folio.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Source and output locations for README generation.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Profile owner identity used in fallbacks and prompts.
    #[serde(default)]
    pub profile: ProfileConfig,

    /// Chat-completion API settings.
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Profile repository deploy settings.
    #[serde(default)]
    pub deploy: DeployConfig,

    /// Code-hosting API settings for project sync.
    #[serde(default)]
    pub github: GithubConfig,

    /// Alarm trigger endpoint.
    #[serde(default)]
    pub alarm: AlarmConfig,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
}

/// `[paths]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding the YAML section documents.
    #[serde(default = "default_config_dir")]
    pub config_dir: PathBuf,

    /// Where the generated README is written.
    #[serde(default = "default_output_file")]
    pub output_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            output_file: default_output_file(),
        }
    }
}

fn default_config_dir() -> PathBuf {
    PathBuf::from("./config")
}
fn default_output_file() -> PathBuf {
    PathBuf::from("./README.md")
}

/// `[profile]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Name the chat assistant speaks for.
    #[serde(default = "default_owner_name")]
    pub owner_name: String,

    /// Contact email used when `intro.contact.email` is absent.
    #[serde(default)]
    pub fallback_email: String,

    /// Top-level README heading when no intro document is loaded.
    #[serde(default = "default_fallback_title")]
    pub fallback_title: String,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            owner_name: default_owner_name(),
            fallback_email: String::new(),
            fallback_title: default_fallback_title(),
        }
    }
}

fn default_owner_name() -> String {
    "the portfolio owner".into()
}
fn default_fallback_title() -> String {
    "Personal Portfolio".into()
}

/// `[openai]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// Name of the env var holding the API key.
    #[serde(default = "default_openai_key_env")]
    pub api_key_env: String,

    /// API base, without the `/chat/completions` suffix.
    #[serde(default = "default_openai_base")]
    pub base_url: String,

    /// Model answering visitor questions.
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Model writing project descriptions during sync.
    #[serde(default = "default_enhance_model")]
    pub enhance_model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_openai_key_env(),
            base_url: default_openai_base(),
            chat_model: default_chat_model(),
            enhance_model: default_enhance_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_openai_key_env() -> String {
    "OPENAI_API_KEY".into()
}
fn default_openai_base() -> String {
    "https://api.openai.com/v1".into()
}
fn default_chat_model() -> String {
    "gpt-4o-mini".into()
}
fn default_enhance_model() -> String {
    "gpt-3.5-turbo".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    500
}

/// `[deploy]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployConfig {
    /// `owner/name` of the profile repository.
    #[serde(default)]
    pub profile_repo: String,

    /// Account whose profile page shows the README.
    #[serde(default)]
    pub github_username: String,

    /// Clone URL prefix; the repo URL is `{remote_base}/{profile_repo}.git`.
    #[serde(default = "default_remote_base")]
    pub remote_base: String,

    #[serde(default = "default_commit_message")]
    pub commit_message: String,

    #[serde(default = "default_branch")]
    pub branch: String,

    #[serde(default = "default_git_user_name")]
    pub git_user_name: String,

    #[serde(default = "default_git_user_email")]
    pub git_user_email: String,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            profile_repo: String::new(),
            github_username: String::new(),
            remote_base: default_remote_base(),
            commit_message: default_commit_message(),
            branch: default_branch(),
            git_user_name: default_git_user_name(),
            git_user_email: default_git_user_email(),
        }
    }
}

fn default_remote_base() -> String {
    "https://github.com".into()
}
fn default_commit_message() -> String {
    "Auto-update profile README from website".into()
}
fn default_branch() -> String {
    "main".into()
}
fn default_git_user_name() -> String {
    "GitHub Bot".into()
}
fn default_git_user_email() -> String {
    "noreply@github.com".into()
}

/// `[github]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    #[serde(default = "default_github_api")]
    pub api_base: String,

    /// Organisation or user whose repositories are synced.
    #[serde(default)]
    pub username: String,

    /// Name of the env var holding the API token.
    #[serde(default = "default_github_token_env")]
    pub token_env: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_base: default_github_api(),
            username: String::new(),
            token_env: default_github_token_env(),
        }
    }
}

fn default_github_api() -> String {
    "https://api.github.com".into()
}
fn default_github_token_env() -> String {
    "GITHUB_TOKEN".into()
}

/// `[alarm]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlarmConfig {
    /// Alarm trigger endpoint. Empty disables the alarm route.
    #[serde(default)]
    pub url: String,

    /// Name of the env var holding the pre-shared key.
    #[serde(default = "default_alarm_key_env")]
    pub api_key_env: String,
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key_env: default_alarm_key_env(),
        }
    }
}

fn default_alarm_key_env() -> String {
    "ALARM_API_KEY".into()
}

/// `[server]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    /// libSQL database file for the location store.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// How far back `/api/location/history` looks.
    #[serde(default = "default_history_window")]
    pub history_window_hours: i64,

    /// Minimum coordinate change (degrees) for a history entry to count.
    #[serde(default = "default_min_delta")]
    pub min_delta_degrees: f64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            db_path: default_db_path(),
            history_window_hours: default_history_window(),
            min_delta_degrees: default_min_delta(),
        }
    }
}

fn default_port() -> u16 {
    3000
}
fn default_db_path() -> PathBuf {
    PathBuf::from("./var/folio.db")
}
fn default_history_window() -> i64 {
    24
}
fn default_min_delta() -> f64 {
    // roughly 50 m
    0.0005
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.folio/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| FolioError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.folio/folio.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| FolioError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| FolioError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| FolioError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| FolioError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| FolioError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read a secret from the env var named by the config. Empty counts as unset.
pub fn resolve_secret(var_name: &str) -> Result<String> {
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(val),
        _ => Err(FolioError::config(format!(
            "secret not found. Set the {var_name} environment variable."
        ))),
    }
}
