//! JSON error responses for the HTTP surface.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use folio_shared::FolioError;

/// Handler error rendered as `{ success: false, message, error? }`.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest { message: String, error: String },
    Internal { message: String, error: String },
}

impl AppError {
    pub fn internal(message: impl Into<String>, error: impl ToString) -> Self {
        Self::Internal {
            message: message.into(),
            error: error.to_string(),
        }
    }
}

impl From<FolioError> for AppError {
    fn from(e: FolioError) -> Self {
        if e.is_client_error() {
            Self::BadRequest {
                message: "Invalid request".into(),
                error: e.to_string(),
            }
        } else {
            Self::internal("Internal server error", e)
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                serde_json::json!({ "success": false, "message": message }),
            ),
            AppError::BadRequest { message, error } => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "success": false, "message": message, "error": error }),
            ),
            AppError::Internal { message, error } => {
                tracing::error!(%message, %error, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({ "success": false, "message": message, "error": error }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
