use super::embedding::BlendError;
use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum VoiceServiceError {
    #[error("missing required parameters: {0}")]
    MissingParameters(String),
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("text too long: {0}")]
    TextTooLong(String),
    #[error("voice {0} not found")]
    VoiceNotFound(String),
    #[error("stored embedding for voice {voice} is unavailable: {reason}")]
    ArtifactUnavailable { voice: String, reason: String },
    #[error("invalid weights: {0}")]
    InvalidWeights(String),
    #[error("incompatible embeddings: {0}")]
    IncompatibleEmbeddings(String),
    #[error("voice name {0} already exists")]
    DuplicateVoiceName(String),
    #[error("custom voice not found")]
    NotFound,
    #[error("synthesis failed: {0}")]
    SynthesisFailed(String),
    #[error("storage failure: {0}")]
    StorageFailure(String),
    #[error("database failure: {0}")]
    DatabaseFailure(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<BlendError> for VoiceServiceError {
    fn from(err: BlendError) -> Self {
        match err {
            BlendError::InvalidWeights(msg) => VoiceServiceError::InvalidWeights(msg),
            other @ BlendError::IncompatibleShapes { .. } => {
                VoiceServiceError::IncompatibleEmbeddings(other.to_string())
            }
        }
    }
}

impl From<AppError> for VoiceServiceError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::DuplicateVoiceName(name) => VoiceServiceError::DuplicateVoiceName(name),
            AppError::Database(e) => VoiceServiceError::DatabaseFailure(e.to_string()),
            AppError::Storage(msg) => VoiceServiceError::StorageFailure(msg),
            AppError::NotFound(_) => VoiceServiceError::NotFound,
            _ => VoiceServiceError::DatabaseFailure(err.to_string()),
        }
    }
}

impl From<VoiceServiceError> for AppError {
    fn from(err: VoiceServiceError) -> Self {
        match err {
            VoiceServiceError::MissingParameters(msg) => AppError::MissingParameters(msg),
            VoiceServiceError::Invalid(msg) => AppError::BadRequest(msg),
            VoiceServiceError::TextTooLong(msg) => AppError::PayloadTooLarge(msg),
            VoiceServiceError::VoiceNotFound(voice) => {
                AppError::VoiceNotFound(format!("Voice {} not found", voice))
            }
            VoiceServiceError::ArtifactUnavailable { voice, reason } => {
                tracing::warn!(voice = %voice, reason = %reason, "Custom voice artifact unavailable");
                AppError::ArtifactUnavailable(format!(
                    "The stored embedding for voice {} might have been deleted from storage. \
                     Delete and recreate the custom voice.",
                    voice
                ))
            }
            VoiceServiceError::InvalidWeights(msg) => AppError::InvalidWeights(msg),
            VoiceServiceError::IncompatibleEmbeddings(msg) => AppError::Internal(msg),
            VoiceServiceError::DuplicateVoiceName(name) => AppError::DuplicateVoiceName(name),
            VoiceServiceError::NotFound => AppError::NotFound("Custom voice not found".to_string()),
            VoiceServiceError::SynthesisFailed(msg) => AppError::SynthesisFailed(msg),
            VoiceServiceError::StorageFailure(msg) => AppError::Storage(msg),
            VoiceServiceError::DatabaseFailure(msg) => AppError::Internal(msg),
            VoiceServiceError::Other(e) => AppError::Internal(e.to_string()),
        }
    }
}
