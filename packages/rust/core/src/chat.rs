//! Chat assistant: profile context plus an OpenAI-compatible completion client.
//!
//! The whole profile (a fixed list of section documents) is serialized into
//! the system prompt; the visitor's conversation follows it unchanged.

use std::path::Path;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use tracing::{debug, info, instrument, warn};

use folio_shared::{AppConfig, FolioError, Result, resolve_secret};

/// Documents included in the profile, in prompt order.
pub const PROFILE_DOCUMENTS: [&str; 8] = [
    "intro",
    "current_work",
    "learning",
    "experience",
    "education",
    "tech_stack",
    "fun_facts",
    "journey",
];

/// Reply used when the upstream answers without usable content.
pub const NO_RESPONSE: &str = "Sorry, I could not generate a response.";

const DEFAULT_TIMEOUT_SECS: u64 = 60;

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One conversation turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// A visitor conversation must be non-empty and may only carry user and
/// assistant turns; the system turn is always ours.
pub fn validate_conversation(messages: &[ChatMessage]) -> Result<()> {
    if messages.is_empty() {
        return Err(FolioError::validation("messages array required"));
    }
    if messages.iter().any(|m| m.role == ChatRole::System) {
        return Err(FolioError::validation(
            "system messages are not accepted from clients",
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Profile context
// ---------------------------------------------------------------------------

/// Load the profile documents from `dir` as one JSON object keyed by stem.
///
/// Missing or malformed documents are skipped.
#[instrument(skip_all, fields(dir = %dir.display()))]
pub fn load_profile(dir: &Path) -> JsonValue {
    let mut profile = Map::new();

    for stem in PROFILE_DOCUMENTS {
        let path = dir.join(format!("{stem}.yaml"));
        if !path.exists() {
            debug!(document = stem, "profile document not present");
            continue;
        }

        let parsed = std::fs::read_to_string(&path)
            .map_err(|e| FolioError::io(&path, e))
            .and_then(|content| Ok(serde_yaml_ng::from_str::<serde_yaml_ng::Value>(&content)?))
            .and_then(|yaml| Ok(serde_json::to_value(yaml)?));

        match parsed {
            Ok(value) => {
                profile.insert(stem.to_string(), value);
            }
            Err(e) => warn!(document = stem, error = %e, "skipping profile document"),
        }
    }

    debug!(documents = profile.len(), "profile loaded");

    JsonValue::Object(profile)
}

/// System prompt describing the assistant's role, the profile, and the
/// contact address for recruiters.
pub fn build_system_prompt(profile: &JsonValue, owner: &str, fallback_email: &str) -> String {
    let email = profile
        .pointer("/intro/contact/email")
        .and_then(JsonValue::as_str)
        .filter(|e| !e.is_empty())
        .unwrap_or(fallback_email);

    let profile_json = serde_json::to_string_pretty(profile).unwrap_or_else(|_| "{}".to_string());

    let contact_line = if email.is_empty() {
        "- If recruiters ask about availability or contact, refer them to the contact details in the profile".to_string()
    } else {
        format!("- If recruiters ask about availability or contact, refer them to the email: {email}")
    };

    format!(
        "You are a helpful AI assistant representing {owner}'s professional portfolio website.
Your role is to answer questions about {owner}'s background, experience, skills, and projects.

Here is {owner}'s complete profile information:

{profile_json}

Guidelines:
- Be friendly, professional, and helpful
- Answer questions based on the profile information provided
- If asked about something not in the profile, politely say you don't have that information
- Keep responses concise and relevant
- You can elaborate on experiences, education, or projects when asked
{contact_line}"
    )
}

// ---------------------------------------------------------------------------
// Completion client
// ---------------------------------------------------------------------------

/// Settings for one completion client.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// API root, e.g. `https://api.openai.com/v1`.
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl ChatConfig {
    /// Settings for the visitor-facing assistant. Fails when the API key
    /// variable is unset.
    pub fn for_chat(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            base_url: config.openai.base_url.clone(),
            api_key: resolve_secret(&config.openai.api_key_env)?,
            model: config.openai.chat_model.clone(),
            temperature: config.openai.temperature,
            max_tokens: config.openai.max_tokens,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        })
    }

    /// Settings for repository description enhancement.
    pub fn for_enhancement(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            model: config.openai.enhance_model.clone(),
            max_tokens: 300,
            ..Self::for_chat(config)?
        })
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Thin client for `POST {base_url}/chat/completions`.
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: Client,
    config: ChatConfig,
}

impl ChatClient {
    pub fn new(config: ChatConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FolioError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Answer a visitor conversation under the given system prompt.
    ///
    /// A successful response without content yields [`NO_RESPONSE`].
    #[instrument(skip_all, fields(model = %self.config.model, turns = conversation.len()))]
    pub async fn complete(&self, system_prompt: &str, conversation: &[ChatMessage]) -> Result<String> {
        validate_conversation(conversation)?;

        let mut messages = Vec::with_capacity(conversation.len() + 1);
        messages.push(ChatMessage::system(system_prompt));
        messages.extend_from_slice(conversation);

        let reply = self.send(&messages).await?;
        Ok(reply.unwrap_or_else(|| NO_RESPONSE.to_string()))
    }

    /// Send raw messages; `Ok(None)` when the response carries no content.
    ///
    /// Transport failures are `Network`, non-2xx answers are `Upstream`.
    pub async fn send(&self, messages: &[ChatMessage]) -> Result<Option<String>> {
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        let body = CompletionRequest {
            model: &self.config.model,
            messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| FolioError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!(%status, "chat completion failed");
            return Err(FolioError::Upstream(format!(
                "chat completion returned HTTP {status}: {}",
                detail.chars().take(200).collect::<String>()
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| FolioError::Network(format!("{url}: failed to read body: {e}")))?;

        let content = match serde_json::from_str::<CompletionResponse>(&text) {
            Ok(parsed) => parsed
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message)
                .and_then(|m| m.content)
                .filter(|c| !c.is_empty()),
            Err(e) => {
                warn!(error = %e, "unparseable chat completion body");
                None
            }
        };

        info!(has_content = content.is_some(), "chat completion received");

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("folio-chat-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn config(base_url: &str) -> ChatConfig {
        ChatConfig {
            base_url: base_url.to_string(),
            api_key: "test-key".into(),
            model: "gpt-4o-mini".into(),
            temperature: 0.7,
            max_tokens: 500,
            timeout_secs: 5,
        }
    }

    #[test]
    fn profile_skips_missing_and_malformed() {
        let tmp = temp_dir();
        std::fs::write(tmp.join("intro.yaml"), "title: Jane\ncontact:\n  email: jane@example.com\n").unwrap();
        std::fs::write(tmp.join("learning.yaml"), "items: [unclosed\n").unwrap();
        std::fs::write(tmp.join("project.yaml"), "items: []\n").unwrap();

        let profile = load_profile(&tmp);
        let obj = profile.as_object().unwrap();
        assert_eq!(obj.len(), 1);
        assert_eq!(profile["intro"]["title"], "Jane");

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn prompt_prefers_intro_email() {
        let profile = serde_json::json!({ "intro": { "contact": { "email": "jane@example.com" } } });
        let prompt = build_system_prompt(&profile, "Jane", "fallback@example.com");
        assert!(prompt.starts_with("You are a helpful AI assistant representing Jane's"));
        assert!(prompt.contains("\"email\": \"jane@example.com\""));
        assert!(prompt.ends_with("refer them to the email: jane@example.com"));

        let prompt = build_system_prompt(&serde_json::json!({}), "Jane", "fallback@example.com");
        assert!(prompt.ends_with("refer them to the email: fallback@example.com"));
    }

    #[test]
    fn conversation_validation() {
        assert!(validate_conversation(&[]).is_err());
        assert!(validate_conversation(&[ChatMessage::system("x")]).is_err());
        assert!(validate_conversation(&[ChatMessage::user("hi")]).is_ok());

        let parsed: std::result::Result<ChatMessage, _> =
            serde_json::from_str(r#"{"role":"tool","content":"x"}"#);
        assert!(parsed.is_err());
    }

    #[tokio::test]
    async fn complete_prepends_system_prompt() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/chat/completions"))
            .and(wiremock::matchers::header("authorization", "Bearer test-key"))
            .and(wiremock::matchers::body_partial_json(serde_json::json!({
                "model": "gpt-4o-mini",
                "max_tokens": 500,
                "messages": [
                    { "role": "system", "content": "be nice" },
                    { "role": "user", "content": "hello" }
                ]
            })))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{ "message": { "role": "assistant", "content": "Hi there" } }]
            })))
            .mount(&server)
            .await;

        let client = ChatClient::new(config(&server.uri())).unwrap();
        let reply = client.complete("be nice", &[ChatMessage::user("hello")]).await.unwrap();
        assert_eq!(reply, "Hi there");
    }

    #[tokio::test]
    async fn empty_choices_fall_back() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .respond_with(
                wiremock::ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })),
            )
            .mount(&server)
            .await;

        let client = ChatClient::new(config(&server.uri())).unwrap();
        let reply = client.complete("sys", &[ChatMessage::user("hello")]).await.unwrap();
        assert_eq!(reply, NO_RESPONSE);
    }

    #[tokio::test]
    async fn non_success_is_upstream_error() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .respond_with(wiremock::ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let client = ChatClient::new(config(&server.uri())).unwrap();
        let err = client.complete("sys", &[ChatMessage::user("hello")]).await.unwrap_err();
        assert!(matches!(err, FolioError::Upstream(_)));
    }
}
