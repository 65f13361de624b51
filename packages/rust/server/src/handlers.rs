//! Endpoint handlers.

use axum::{
    Json,
    body::Bytes,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use folio_core::chat::{self, ChatMessage};
use folio_shared::{FolioError, LocationRecord, filter_significant};

use crate::{AppError, AppState};

pub(crate) async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

// ============================================================================
// Location
// ============================================================================

pub(crate) async fn latest_location(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let latest = state
        .store
        .latest()
        .await
        .map_err(|e| AppError::internal("Failed to fetch location", e))?;

    match latest {
        Some(record) => Ok(Json(serde_json::json!({ "success": true, "data": record }))),
        None => Err(AppError::NotFound("No location data found".into())),
    }
}

/// Store a report. The body is parsed by hand so malformed input gets a
/// JSON answer rather than the extractor's plain-text rejection.
pub(crate) async fn receive_location(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    debug!(bytes = body.len(), "location report received");

    let bad_request = |e: serde_json::Error| AppError::BadRequest {
        message: "Request received but could not parse".into(),
        error: e.to_string(),
    };

    let raw: Value = serde_json::from_slice(&body).map_err(bad_request)?;
    let record: LocationRecord = serde_json::from_value(raw.clone()).map_err(bad_request)?;

    let id = state
        .store
        .insert_location(&record)
        .await
        .map_err(|e| AppError::internal("Failed to store location data", e))?;

    info!(%id, device = ?record.device_id, "location stored");

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Location data received successfully",
        "receivedData": raw
    })))
}

pub(crate) async fn location_history(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let cutoff = chrono::Utc::now()
        .checked_sub_signed(state.settings.history_window)
        .ok_or_else(|| AppError::internal("Failed to fetch location history", "history window out of range"))?;
    let hours = state.settings.history_window.num_hours();

    let history = state
        .store
        .history_since(cutoff)
        .await
        .map_err(|e| AppError::internal("Failed to fetch location history", e))?;

    debug!(found = history.len(), "history in window");

    if history.is_empty() {
        return Err(AppError::NotFound(format!(
            "No location history found in the last {hours} hours"
        )));
    }

    let significant = filter_significant(history, state.settings.min_delta_degrees);
    if significant.is_empty() {
        return Err(AppError::NotFound(format!(
            "No significant location changes in the last {hours} hours"
        )));
    }

    Ok(Json(serde_json::json!({ "success": true, "data": significant })))
}

// ============================================================================
// Alarm
// ============================================================================

pub(crate) async fn trigger_alarm(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let failed = |error: String| AppError::Internal {
        message: "Failed to trigger alarm".into(),
        error,
    };

    let settings = &state.settings;
    let Some(api_key) = settings.alarm_api_key.as_deref() else {
        return Err(failed("alarm API key is not configured".into()));
    };
    if settings.alarm_url.is_empty() {
        return Err(failed("alarm URL is not configured".into()));
    }

    let response = state
        .http
        .post(&settings.alarm_url)
        .header("X-API-Key", api_key)
        .send()
        .await
        .map_err(|e| failed(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(failed(format!("Alarm API returned status {}", status.as_u16())));
    }

    let text = response.text().await.unwrap_or_default();
    let data = serde_json::from_str::<Value>(&text)
        .unwrap_or_else(|_| serde_json::json!({ "message": "Alarm triggered" }));

    warn!("emergency alarm triggered");

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Emergency alarm triggered successfully",
        "data": data
    })))
}

// ============================================================================
// Chat
// ============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct ChatRequest {
    messages: Vec<ChatMessage>,
}

fn chat_error(status: StatusCode, error: &str) -> Response {
    (status, Json(serde_json::json!({ "error": error }))).into_response()
}

pub(crate) async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let messages = match payload {
        Ok(Json(request)) if chat::validate_conversation(&request.messages).is_ok() => request.messages,
        _ => return chat_error(StatusCode::BAD_REQUEST, "Invalid request: messages array required"),
    };

    let Some(client) = state.chat.as_ref() else {
        return chat_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Chat assistant API key not configured",
        );
    };

    let profile = chat::load_profile(&state.settings.config_dir);
    let system_prompt = chat::build_system_prompt(
        &profile,
        &state.settings.owner_name,
        &state.settings.fallback_email,
    );

    match client.complete(&system_prompt, &messages).await {
        Ok(message) => Json(serde_json::json!({ "message": message })).into_response(),
        Err(FolioError::Validation { message }) => chat_error(StatusCode::BAD_REQUEST, &message),
        Err(e) => {
            warn!(error = %e, "chat completion failed");
            chat_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to get response from the assistant",
            )
        }
    }
}
