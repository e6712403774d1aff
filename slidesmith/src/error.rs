use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SlidesmithError {
    #[error("Missing required fields")]
    MissingField,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Failed to parse outline: {0}")]
    OutlineParse(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl SlidesmithError {
    pub fn status(&self) -> StatusCode {
        match self {
            SlidesmithError::MissingField | SlidesmithError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            SlidesmithError::UnsupportedProvider(_)
            | SlidesmithError::Provider(_)
            | SlidesmithError::OutlineParse(_)
            | SlidesmithError::Render(_)
            | SlidesmithError::Io(_)
            | SlidesmithError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for SlidesmithError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, SlidesmithError>;
