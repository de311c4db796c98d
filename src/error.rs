use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Main application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Missing required parameters: {0}")]
    MissingParameters(String),

    #[error("Invalid input: {0}")]
    BadRequest(String),

    #[error("Invalid weights: {0}")]
    InvalidWeights(String),

    #[error("A voice with this name already exists: {0}")]
    DuplicateVoiceName(String),

    #[error("Text too large: {0}")]
    PayloadTooLarge(String),

    #[error("Voice not found: {0}")]
    VoiceNotFound(String),

    #[error("Voice artifact unavailable: {0}")]
    ArtifactUnavailable(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Audio generation failed: {0}")]
    SynthesisFailed(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error body: a short summary, a stable machine-readable code and optional details
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingParameters(_)
            | Self::BadRequest(_)
            | Self::InvalidWeights(_)
            | Self::DuplicateVoiceName(_) => StatusCode::BAD_REQUEST,
            Self::VoiceNotFound(_) | Self::ArtifactUnavailable(_) | Self::NotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Database(_) | Self::SynthesisFailed(_) | Self::Storage(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Database(_) => "DATABASE_FAILURE",
            Self::MissingParameters(_) => "MISSING_PARAMETERS",
            Self::BadRequest(_) => "INVALID_INPUT",
            Self::InvalidWeights(_) => "INVALID_WEIGHTS",
            Self::DuplicateVoiceName(_) => "DUPLICATE_VOICE_NAME",
            Self::PayloadTooLarge(_) => "TEXT_TOO_LONG",
            Self::VoiceNotFound(_) => "VOICE_NOT_FOUND",
            Self::ArtifactUnavailable(_) => "ARTIFACT_UNAVAILABLE",
            Self::NotFound(_) => "NOT_FOUND",
            Self::SynthesisFailed(_) => "SYNTHESIS_FAILED",
            Self::Storage(_) => "STORAGE_FAILURE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn summary(&self) -> &'static str {
        match self {
            Self::Database(_) => "Database error occurred",
            Self::MissingParameters(_) => "Missing required parameters",
            Self::BadRequest(_) => "Invalid input",
            Self::InvalidWeights(_) => "Invalid weights",
            Self::DuplicateVoiceName(_) => "A voice with this name already exists",
            Self::PayloadTooLarge(_) => "Text too large",
            Self::VoiceNotFound(_) => "Voice not found",
            Self::ArtifactUnavailable(_) => "Voice artifact unavailable",
            Self::NotFound(_) => "Resource not found",
            Self::SynthesisFailed(_) => "Failed to generate audio",
            Self::Storage(_) => "Failed to access storage",
            Self::Internal(_) => "An unexpected error occurred",
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        // Driver errors stay in the logs
        let details = match self {
            Self::Database(_) => None,
            Self::MissingParameters(msg)
            | Self::BadRequest(msg)
            | Self::InvalidWeights(msg)
            | Self::DuplicateVoiceName(msg)
            | Self::PayloadTooLarge(msg)
            | Self::VoiceNotFound(msg)
            | Self::ArtifactUnavailable(msg)
            | Self::NotFound(msg)
            | Self::SynthesisFailed(msg)
            | Self::Storage(msg)
            | Self::Internal(msg) => Some(msg.clone()).filter(|m| !m.is_empty()),
        };

        ErrorResponse {
            error: self.summary().to_string(),
            code: self.code().to_string(),
            details,
        }
    }
}

/// Implement IntoResponse for automatic conversion in handlers
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(
                error = %self,
                status = %status.as_u16(),
                "Request failed"
            );
        } else {
            tracing::warn!(
                error = %self,
                status = %status.as_u16(),
                "Request rejected"
            );
        }

        (status, Json(self.to_response())).into_response()
    }
}

/// Custom result type for the application
pub type AppResult<T> = Result<T, AppError>;
