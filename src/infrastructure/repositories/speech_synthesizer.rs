use crate::domain::voice::Embedding;
use async_trait::async_trait;
use futures_util::stream::BoxStream;

/// One chunk of generated speech, in generation order.
///
/// The model may yield chunks without audio (e.g. for punctuation-only
/// graphemes); those carry an empty `samples` vector.
#[derive(Debug, Clone, Default)]
pub struct AudioSegment {
    pub graphemes: String,
    pub phonemes: String,
    pub samples: Vec<f32>,
}

#[derive(Debug, thiserror::Error)]
pub enum SynthesizerError {
    #[error("speech model unreachable: {0}")]
    Unavailable(String),
    #[error("speech model rejected the request: {0}")]
    Rejected(String),
    #[error("invalid response from speech model: {0}")]
    InvalidResponse(String),
}

/// Finite stream of segments for a single generation call
pub type SegmentStream = BoxStream<'static, Result<AudioSegment, SynthesizerError>>;

/// Text-to-speech model conditioned on a voice embedding.
///
/// Implementations are shared by all requests and must be safe to call
/// concurrently.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Start generating speech for `text`.
    ///
    /// The returned stream is consumed once; restarting generation means
    /// calling `generate` again.
    async fn generate(
        &self,
        text: &str,
        voice: &Embedding,
        speed: f32,
    ) -> Result<SegmentStream, SynthesizerError>;

    /// Sample rate of the produced audio, in Hz
    fn sample_rate(&self) -> u32;

    async fn health_check(&self) -> bool;
}
