//! HTTP surface for folio: location reports, alarm trigger, and the chat
//! assistant.

mod error;
mod handlers;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    http::{Method, header},
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use folio_core::chat::{ChatClient, ChatConfig};
use folio_shared::{AppConfig, FolioError, Result, resolve_secret};
use folio_storage::LocationStore;

pub use error::AppError;

// ============================================================================
// Application State
// ============================================================================

/// Settings the handlers read; resolved once at startup.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    /// How far back `/api/location/history` looks.
    pub history_window: chrono::TimeDelta,
    /// Minimum coordinate change for a history entry to count.
    pub min_delta_degrees: f64,
    pub alarm_url: String,
    /// `None` when the key variable is unset; the alarm route then fails.
    pub alarm_api_key: Option<String>,
    /// Directory holding the profile documents for the chat assistant.
    pub config_dir: PathBuf,
    pub owner_name: String,
    pub fallback_email: String,
}

/// Longest accepted history window, ten years.
const MAX_HISTORY_WINDOW_HOURS: i64 = 24 * 365 * 10;

/// Validate `server.history_window_hours` and turn it into a duration.
fn history_window(hours: i64) -> Result<chrono::TimeDelta> {
    if !(1..=MAX_HISTORY_WINDOW_HOURS).contains(&hours) {
        return Err(FolioError::config(format!(
            "server.history_window_hours must be between 1 and {MAX_HISTORY_WINDOW_HOURS}, got {hours}"
        )));
    }
    chrono::TimeDelta::try_hours(hours).ok_or_else(|| {
        FolioError::config(format!("server.history_window_hours out of range: {hours}"))
    })
}

impl ServerSettings {
    pub fn from_app(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            history_window: history_window(config.server.history_window_hours)?,
            min_delta_degrees: config.server.min_delta_degrees,
            alarm_url: config.alarm.url.clone(),
            alarm_api_key: resolve_secret(&config.alarm.api_key_env).ok(),
            config_dir: config.paths.config_dir.clone(),
            owner_name: config.profile.owner_name.clone(),
            fallback_email: config.profile.fallback_email.clone(),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<LocationStore>,
    pub settings: Arc<ServerSettings>,
    /// `None` when no completion API key is configured.
    pub chat: Option<ChatClient>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(store: LocationStore, settings: ServerSettings, chat: Option<ChatClient>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| FolioError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            settings: Arc::new(settings),
            chat,
            http,
        })
    }

    /// Open the store and resolve secrets from the application config.
    pub async fn from_app(config: &AppConfig) -> Result<Self> {
        let settings = ServerSettings::from_app(config)?;
        let store = LocationStore::open(&config.server.db_path).await?;

        let chat = match ChatConfig::for_chat(config).and_then(ChatClient::new) {
            Ok(client) => Some(client),
            Err(e) => {
                warn!(error = %e, "chat assistant disabled");
                None
            }
        };

        Self::new(store, settings, chat)
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/api/health", get(handlers::health_check))
        .route(
            "/api/location",
            get(handlers::latest_location).post(handlers::receive_location),
        )
        .route("/api/location/history", get(handlers::location_history))
        .route("/api/alarm", post(handlers::trigger_alarm))
        .route("/api/chat", post(handlers::chat))
        // Middleware (applied in reverse order)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `0.0.0.0:{port}` and serve until the process stops.
pub async fn serve(state: AppState, port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| FolioError::Network(format!("cannot bind {addr}: {e}")))?;

    info!(%addr, "server listening");

    axum::serve(listener, create_router(state))
        .await
        .map_err(|e| FolioError::Network(format!("server error: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_history_window_is_a_day() {
        let settings = ServerSettings::from_app(&AppConfig::default()).unwrap();
        assert_eq!(settings.history_window, chrono::TimeDelta::hours(24));
    }

    #[test]
    fn out_of_range_history_window_is_rejected() {
        for hours in [0, -5, MAX_HISTORY_WINDOW_HOURS + 1, i64::MAX / 1000] {
            let mut config = AppConfig::default();
            config.server.history_window_hours = hours;
            assert!(
                matches!(ServerSettings::from_app(&config), Err(FolioError::Config { .. })),
                "{hours} should be rejected"
            );
        }
    }
}
