use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use gatepass_core::CoreError;
use gatepass_types::OwnerId;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("caller {subject} may not act as {claimed}")]
    Authorization { claimed: String, subject: OwnerId },

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("store error: {0}")]
    Store(#[from] gatepass_store::StoreError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Authentication(_) | Self::Authorization { .. } => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) | Self::Core(CoreError::InvalidOrder(_)) => StatusCode::BAD_REQUEST,
            Self::Core(CoreError::Storage(_)) | Self::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Core(_) | Self::Config(_) | Self::Io(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to return to the caller.
    fn public_message(&self) -> String {
        match self {
            Self::Authentication(_) => "Invalid token".into(),
            Self::Authorization { .. } => "Invalid token for this user".into(),
            Self::BadRequest(msg) => msg.clone(),
            Self::Core(CoreError::InvalidOrder(e)) => format!("invalid order: {e}"),
            Self::Core(CoreError::Storage(_)) | Self::Store(_) => "storage unavailable".into(),
            _ => "internal server error".into(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }
        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}

pub type ServerResult<T> = Result<T, ServerError>;
