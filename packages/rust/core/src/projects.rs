//! Project sync: public GitHub repositories → `project.yaml` items.
//!
//! Existing items are kept as written; repositories already listed (by name
//! or URL) are skipped. New ones get a description and bullet points from the
//! completion API, or a templated fallback when that fails.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Datelike, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_yaml_ng::{Mapping, Value};
use tracing::{debug, info, instrument, warn};

use folio_shared::{AppConfig, FolioError, Record, RecordExt, Result, resolve_secret};

use crate::chat::{ChatClient, ChatMessage};

/// Title written at the top of the regenerated project document.
pub const PROJECTS_TITLE: &str = "💼 Projects";

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";
const USER_AGENT: &str = concat!("folio/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Configuration for a project sync run.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// GitHub REST root (`https://api.github.com`).
    pub api_base: String,
    /// Organization or user whose repositories are listed.
    pub username: String,
    /// Token for the user endpoint; the org endpoint is anonymous.
    pub token: Option<String>,
    /// The `project.yaml` to merge into.
    pub project_file: PathBuf,
    /// Pause between enhancement calls.
    pub enhance_delay: Duration,
}

impl SyncConfig {
    pub fn from_app(config: &AppConfig) -> Result<Self> {
        if config.github.username.trim().is_empty() {
            return Err(FolioError::config(
                "github.username is not set (or pass --username)",
            ));
        }

        Ok(Self {
            api_base: config.github.api_base.clone(),
            username: config.github.username.clone(),
            token: resolve_secret(&config.github.token_env).ok(),
            project_file: config.paths.config_dir.join("project.yaml"),
            enhance_delay: Duration::from_secs(1),
        })
    }
}

/// Summary of a sync run.
#[derive(Debug, Clone)]
pub struct SyncResult {
    pub fetched: usize,
    pub existing: usize,
    pub added: Vec<String>,
    pub skipped: Vec<String>,
}

// ---------------------------------------------------------------------------
// GitHub
// ---------------------------------------------------------------------------

/// The repository fields the sync reads.
#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub html_url: String,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// List repositories, trying the organization endpoint first and falling
/// back to the user endpoint when the organization does not exist.
#[instrument(skip_all, fields(username = %config.username))]
pub async fn fetch_repositories(client: &Client, config: &SyncConfig) -> Result<Vec<Repository>> {
    let base = config.api_base.trim_end_matches('/');
    let org_url = format!(
        "{base}/orgs/{}/repos?per_page=100&sort=updated&type=public",
        config.username
    );

    let mut response = client
        .get(&org_url)
        .header("Accept", GITHUB_ACCEPT)
        .send()
        .await
        .map_err(|e| FolioError::Network(format!("{org_url}: {e}")))?;

    if response.status() == StatusCode::NOT_FOUND {
        let user_url = format!("{base}/users/{}/repos?per_page=100&sort=updated", config.username);
        debug!(%user_url, "organization not found, trying user endpoint");

        let mut request = client.get(&user_url).header("Accept", GITHUB_ACCEPT);
        if let Some(token) = &config.token {
            request = request.header("Authorization", format!("token {token}"));
        }
        response = request
            .send()
            .await
            .map_err(|e| FolioError::Network(format!("{user_url}: {e}")))?;
    }

    let status = response.status();
    if !status.is_success() {
        return Err(FolioError::Upstream(format!("GitHub API error: HTTP {status}")));
    }

    let repos: Vec<Repository> = response
        .json()
        .await
        .map_err(|e| FolioError::parse(format!("GitHub repository list: {e}")))?;

    info!(count = repos.len(), "fetched repositories");

    Ok(repos)
}

// ---------------------------------------------------------------------------
// Enhancement
// ---------------------------------------------------------------------------

/// Description and bullet points for one repository.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Enhancement {
    pub description: String,
    #[serde(default)]
    pub bullet_points: Vec<String>,
}

/// Templated description built from repository metadata alone.
pub fn fallback_enhancement(repo: &Repository) -> Enhancement {
    let mut bullet_points = Vec::new();
    if let Some(created) = repo.created_at {
        bullet_points.push(format!("Created {}", created.year()));
    }
    bullet_points.push(format!(
        "Language: {}",
        repo.language.as_deref().unwrap_or("Not specified")
    ));
    if !repo.topics.is_empty() {
        bullet_points.push(format!("Topics: {}", repo.topics.join(", ")));
    }

    Enhancement {
        description: repo
            .description
            .clone()
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| "No description available".to_string()),
        bullet_points,
    }
}

fn enhancement_prompt(repo: &Repository) -> String {
    let topics = if repo.topics.is_empty() {
        "None".to_string()
    } else {
        repo.topics.join(", ")
    };
    let created = repo
        .created_at
        .map(|c| c.year().to_string())
        .unwrap_or_else(|| "Unknown".to_string());

    format!(
        r#"Based on this GitHub repository information, create an enhanced description and 3-4 bullet points highlighting key features or technologies used:

Repository Name: {name}
Original Description: {description}
Language: {language}
Topics: {topics}
Created: {created}

Please respond in JSON format:
{{
  "description": "Enhanced description (1-2 sentences)",
  "bullet_points": ["Point 1", "Point 2", "Point 3"]
}}"#,
        name = repo.name,
        description = repo.description.as_deref().unwrap_or("No description"),
        language = repo.language.as_deref().unwrap_or("Not specified"),
    )
}

/// Parse a completion reply, tolerating a surrounding code fence.
fn parse_enhancement(reply: &str) -> Option<Enhancement> {
    let trimmed = reply.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);

    serde_json::from_str::<Enhancement>(body.trim())
        .ok()
        .filter(|e| !e.description.is_empty())
}

/// Ask the completion API for an enhancement; any failure degrades to
/// [`fallback_enhancement`].
pub async fn enhance_repository(chat: Option<&ChatClient>, repo: &Repository) -> Enhancement {
    let Some(chat) = chat else {
        return fallback_enhancement(repo);
    };

    match chat.send(&[ChatMessage::user(enhancement_prompt(repo))]).await {
        Ok(Some(reply)) => parse_enhancement(&reply).unwrap_or_else(|| {
            warn!(repo = %repo.name, "unparseable enhancement, using fallback");
            fallback_enhancement(repo)
        }),
        Ok(None) => fallback_enhancement(repo),
        Err(e) => {
            warn!(repo = %repo.name, error = %e, "enhancement failed, using fallback");
            fallback_enhancement(repo)
        }
    }
}

/// The `items` entry for a new repository.
pub fn project_item(repo: &Repository, enhancement: Enhancement) -> Record {
    let tag: Vec<&str> = repo
        .language
        .iter()
        .map(String::as_str)
        .chain(repo.topics.iter().map(String::as_str))
        .filter(|t| !t.is_empty())
        .collect();
    let deployment = repo
        .homepage
        .clone()
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| repo.html_url.clone());

    let mut item = Mapping::new();
    item.insert("name".into(), repo.name.clone().into());
    item.insert("description".into(), enhancement.description.into());
    item.insert(
        "bullet_points".into(),
        Value::Sequence(enhancement.bullet_points.into_iter().map(Value::from).collect()),
    );
    item.insert("link".into(), repo.html_url.clone().into());
    item.insert("deployment".into(), deployment.into());
    item.insert("tag".into(), tag.join(", ").into());
    item
}

// ---------------------------------------------------------------------------
// project.yaml
// ---------------------------------------------------------------------------

/// Current `items` of the project document.
///
/// A missing or blank file has no items. A file that cannot be read or parsed
/// is an error, so a sync never overwrites entries it could not see.
pub fn read_existing_items(path: &Path) -> Result<Vec<Value>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = std::fs::read_to_string(path).map_err(|e| FolioError::io(path, e))?;
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    let doc: Record = serde_yaml_ng::from_str(&content)
        .map_err(|e| FolioError::parse(format!("{}: {e}", path.display())))?;

    match doc.get("items") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Sequence(items)) => Ok(items.clone()),
        Some(_) => Err(FolioError::parse(format!(
            "{}: `items` is not a sequence",
            path.display()
        ))),
    }
}

/// Serialize the project document.
pub fn render_project_document(items: Vec<Value>) -> Result<String> {
    let mut doc = Mapping::new();
    doc.insert("title".into(), PROJECTS_TITLE.into());
    doc.insert("items".into(), Value::Sequence(items));
    serde_yaml_ng::to_string(&doc).map_err(|e| FolioError::parse(format!("project document: {e}")))
}

/// Fetch, filter, enhance, and merge; then rewrite the project document.
#[instrument(skip_all, fields(username = %config.username, file = %config.project_file.display()))]
pub async fn sync_projects(config: &SyncConfig, chat: Option<&ChatClient>) -> Result<SyncResult> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| FolioError::Network(format!("failed to build HTTP client: {e}")))?;

    let mut items = read_existing_items(&config.project_file)?;
    let existing = items.len();

    let repos = fetch_repositories(&client, config).await?;
    let fetched = repos.len();
    info!(existing, "found existing projects");

    let known: Vec<(Option<String>, Option<String>)> = items
        .iter()
        .filter_map(Value::as_mapping)
        .map(|m| (m.text("name"), m.text("link")))
        .collect();

    let mut added = Vec::new();
    let mut skipped = Vec::new();

    for repo in repos.iter().filter(|r| !r.fork && !r.private) {
        let listed = known.iter().any(|(name, link)| {
            name.as_deref() == Some(repo.name.as_str()) || link.as_deref() == Some(repo.html_url.as_str())
        });
        if listed {
            debug!(repo = %repo.name, "already listed, skipping");
            skipped.push(repo.name.clone());
            continue;
        }

        if !added.is_empty() && !config.enhance_delay.is_zero() {
            tokio::time::sleep(config.enhance_delay).await;
        }

        info!(repo = %repo.name, "enhancing repository");
        let enhancement = enhance_repository(chat, repo).await;
        items.push(Value::Mapping(project_item(repo, enhancement)));
        added.push(repo.name.clone());
    }

    let content = render_project_document(items)?;
    if let Some(parent) = config.project_file.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| FolioError::io(parent, e))?;
    }
    std::fs::write(&config.project_file, content)
        .map_err(|e| FolioError::io(&config.project_file, e))?;

    info!(added = added.len(), skipped = skipped.len(), "project document updated");

    Ok(SyncResult {
        fetched,
        existing,
        added,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::ChatConfig;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("folio-projects-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn repo(json: serde_json::Value) -> Repository {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn fallback_uses_metadata() {
        let r = repo(serde_json::json!({
            "name": "folio",
            "html_url": "https://github.com/jane/folio",
            "language": "Rust",
            "topics": ["cli", "yaml"],
            "created_at": "2024-05-01T00:00:00Z"
        }));
        let e = fallback_enhancement(&r);
        assert_eq!(e.description, "No description available");
        assert_eq!(e.bullet_points, vec!["Created 2024", "Language: Rust", "Topics: cli, yaml"]);
    }

    #[test]
    fn item_deployment_defaults_to_repository() {
        let r = repo(serde_json::json!({
            "name": "folio",
            "html_url": "https://github.com/jane/folio",
            "homepage": "",
            "language": "Rust",
            "topics": ["cli"]
        }));
        let item = project_item(&r, fallback_enhancement(&r));
        assert_eq!(item.text("deployment").as_deref(), Some("https://github.com/jane/folio"));
        assert_eq!(item.text("tag").as_deref(), Some("Rust, cli"));
    }

    #[test]
    fn fenced_replies_parse() {
        let e = parse_enhancement("```json\n{\"description\":\"A tool\",\"bullet_points\":[\"Fast\"]}\n```").unwrap();
        assert_eq!(e.description, "A tool");
        assert!(parse_enhancement("not json").is_none());
    }

    #[tokio::test]
    async fn sync_merges_new_repositories() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/orgs/jane/repos"))
            .respond_with(wiremock::ResponseTemplate::new(404))
            .mount(&server)
            .await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/users/jane/repos"))
            .and(wiremock::matchers::header("authorization", "token gh-token"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "name": "old", "html_url": "https://github.com/jane/old" },
                { "name": "forked", "html_url": "https://github.com/jane/forked", "fork": true },
                { "name": "fresh", "html_url": "https://github.com/jane/fresh",
                  "homepage": "https://fresh.dev", "language": "Go", "topics": ["web"] }
            ])))
            .mount(&server)
            .await;

        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/chat/completions"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{ "message": { "content":
                    "{\"description\":\"A fresh site\",\"bullet_points\":[\"Fast\",\"Small\"]}" } }]
            })))
            .mount(&server)
            .await;

        let tmp = temp_dir();
        let project_file = tmp.join("project.yaml");
        std::fs::write(
            &project_file,
            "title: Projects\nitems:\n  - name: old\n    description: Kept as is\n    extra: preserved\n",
        )
        .unwrap();

        let config = SyncConfig {
            api_base: server.uri(),
            username: "jane".into(),
            token: Some("gh-token".into()),
            project_file: project_file.clone(),
            enhance_delay: Duration::ZERO,
        };
        let chat = ChatClient::new(ChatConfig {
            base_url: server.uri(),
            api_key: "k".into(),
            model: "gpt-3.5-turbo".into(),
            temperature: 0.7,
            max_tokens: 300,
            timeout_secs: 5,
        })
        .unwrap();

        let result = sync_projects(&config, Some(&chat)).await.unwrap();
        assert_eq!(result.fetched, 3);
        assert_eq!(result.existing, 1);
        assert_eq!(result.added, vec!["fresh"]);
        assert_eq!(result.skipped, vec!["old"]);

        let doc: Record = serde_yaml_ng::from_str(&std::fs::read_to_string(&project_file).unwrap()).unwrap();
        assert_eq!(doc.text("title").as_deref(), Some(PROJECTS_TITLE));
        let items = doc.sequence("items").unwrap();
        assert_eq!(items.len(), 2);
        let old = items[0].as_mapping().unwrap();
        assert_eq!(old.text("extra").as_deref(), Some("preserved"));
        let fresh = items[1].as_mapping().unwrap();
        assert_eq!(fresh.text("description").as_deref(), Some("A fresh site"));
        assert_eq!(fresh.text("deployment").as_deref(), Some("https://fresh.dev"));
        assert_eq!(fresh.text("tag").as_deref(), Some("Go, web"));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_or_blank_project_file_has_no_items() {
        let tmp = temp_dir();
        let path = tmp.join("project.yaml");
        assert!(read_existing_items(&path).unwrap().is_empty());

        std::fs::write(&path, "\n").unwrap();
        assert!(read_existing_items(&path).unwrap().is_empty());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn unusable_project_file_is_an_error() {
        let tmp = temp_dir();
        let path = tmp.join("project.yaml");

        std::fs::write(&path, "- just\n- a list\n").unwrap();
        assert!(matches!(read_existing_items(&path), Err(FolioError::Parse { .. })));

        std::fs::write(&path, "title: Projects\nitems: not a list\n").unwrap();
        assert!(matches!(read_existing_items(&path), Err(FolioError::Parse { .. })));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[tokio::test]
    async fn malformed_project_file_is_left_untouched() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/orgs/jane/repos"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "name": "fresh", "html_url": "https://github.com/jane/fresh" }
            ])))
            .mount(&server)
            .await;

        let tmp = temp_dir();
        let project_file = tmp.join("project.yaml");
        let original = "title: Projects\nitems:\n  - name: handwritten\n    description: Mine\n  - name: [unclosed\n";
        std::fs::write(&project_file, original).unwrap();

        let config = SyncConfig {
            api_base: server.uri(),
            username: "jane".into(),
            token: None,
            project_file: project_file.clone(),
            enhance_delay: Duration::ZERO,
        };

        let err = sync_projects(&config, None).await.unwrap_err();
        assert!(matches!(err, FolioError::Parse { .. }));
        assert_eq!(std::fs::read_to_string(&project_file).unwrap(), original);

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
