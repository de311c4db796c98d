use crate::domain::voice::VoiceServiceError;

/// Failures of the audio pipeline after a voice has been resolved
#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error("{0}")]
    Failed(String),
    #[error("wav encoding failed: {0}")]
    Encoding(String),
}

impl From<SynthesisError> for VoiceServiceError {
    fn from(err: SynthesisError) -> Self {
        match err {
            SynthesisError::Failed(msg) => VoiceServiceError::SynthesisFailed(msg),
            SynthesisError::Encoding(msg) => VoiceServiceError::Other(anyhow::anyhow!(msg)),
        }
    }
}
