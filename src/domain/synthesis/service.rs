use super::audio::{collect_segments, encode_wav, to_data_uri};
use super::model::{
    AudioArtifact, AudioArtifactResponse, PreviewRequest, PreviewResponse, SynthesisResponse,
    SynthesizeRequest,
};
use crate::domain::voice::{BlendSpec, Embedding, VoiceResolver, VoiceServiceError};
use crate::infrastructure::repositories::{
    ArtifactCategory, ArtifactKey, ArtifactStore, AudioArtifactRepository, SpeechSynthesizer,
};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

pub const DEFAULT_SPEED: f32 = 1.0;
const MIN_SPEED: f32 = 0.25;
const MAX_SPEED: f32 = 4.0;
const AUDIO_HISTORY_LIMIT: i64 = 50;

pub struct SynthesisService {
    resolver: Arc<VoiceResolver>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    artifact_store: Arc<dyn ArtifactStore>,
    audio_repo: Arc<AudioArtifactRepository>,
    signed_url_expiry: Duration,
    max_text_chars: usize,
}

impl SynthesisService {
    pub fn new(
        resolver: Arc<VoiceResolver>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        artifact_store: Arc<dyn ArtifactStore>,
        audio_repo: Arc<AudioArtifactRepository>,
        signed_url_expiry: Duration,
        max_text_chars: usize,
    ) -> Self {
        Self {
            resolver,
            synthesizer,
            artifact_store,
            audio_repo,
            signed_url_expiry,
            max_text_chars,
        }
    }
}

#[async_trait]
pub trait SynthesisServiceApi: Send + Sync {
    /// Generate speech with a built-in or custom voice
    ///
    /// This operation:
    /// - Resolves the voice for the acting user
    /// - Runs the speech model and concatenates the produced segments
    /// - Stores the WAV file and records it in the audio history
    ///
    /// Returns a signed URL plus an inline copy of the audio
    async fn synthesize(
        &self,
        user_id: Uuid,
        request: SynthesizeRequest,
    ) -> Result<SynthesisResponse, VoiceServiceError>;

    /// Synthesize with an unsaved blend of two voices; nothing is persisted
    async fn preview(
        &self,
        user_id: Uuid,
        request: PreviewRequest,
    ) -> Result<PreviewResponse, VoiceServiceError>;

    /// Most recent audio of a user, newest first
    async fn list_audio(&self, user_id: Uuid) -> Result<Vec<AudioArtifactResponse>, VoiceServiceError>;
}

#[async_trait]
impl SynthesisServiceApi for SynthesisService {
    async fn synthesize(
        &self,
        user_id: Uuid,
        request: SynthesizeRequest,
    ) -> Result<SynthesisResponse, VoiceServiceError> {
        let voice_id = non_blank(request.voice_id).map(|v| v.trim().to_string());
        let (text, voice_id) = match (non_blank(request.text), voice_id) {
            (Some(text), Some(voice_id)) => (text, voice_id),
            (text, voice_id) => {
                let mut missing = Vec::new();
                if text.is_none() {
                    missing.push("text");
                }
                if voice_id.is_none() {
                    missing.push("voiceId");
                }
                return Err(VoiceServiceError::MissingParameters(format!(
                    "{} required",
                    missing.join(" and ")
                )));
            }
        };
        self.guard_text(&text)?;
        let speed = validate_speed(request.speed)?;

        tracing::info!(
            user_id = %user_id,
            voice = %voice_id,
            speed = speed,
            text_length = text.chars().count(),
            "Synthesis request"
        );

        let voice = self.resolver.resolve(user_id, &voice_id).await?;
        tracing::info!(voice = %voice.id, origin = %voice.origin, "Voice resolved");

        let wav = self.render(&text, &voice.embedding, speed).await?;
        let audio_data_inline = to_data_uri(&wav);

        let key = ArtifactKey::new(ArtifactCategory::Audio, user_id);
        let storage_path = key.to_string();
        self.artifact_store
            .put(&key, wav)
            .await
            .map_err(|e| VoiceServiceError::StorageFailure(e.to_string()))?;

        let audio_url = self
            .artifact_store
            .signed_url(&storage_path, self.signed_url_expiry)
            .await
            .map_err(|e| VoiceServiceError::StorageFailure(e.to_string()))?;

        let artifact = AudioArtifact {
            id: key.id,
            user_id,
            prompt: text,
            voice: voice_id,
            speed,
            storage_path,
            created_at: Utc::now(),
        };
        self.audio_repo.create(&artifact).await?;

        tracing::info!(
            user_id = %user_id,
            audio_id = %artifact.id,
            storage_path = %artifact.storage_path,
            "Audio stored"
        );

        Ok(SynthesisResponse {
            id: artifact.id,
            prompt: artifact.prompt,
            voice: artifact.voice,
            speed: artifact.speed,
            audio_url,
            audio_data_inline,
            timestamp: artifact.created_at,
            storage_path: artifact.storage_path,
            user_id,
        })
    }

    async fn preview(
        &self,
        user_id: Uuid,
        request: PreviewRequest,
    ) -> Result<PreviewResponse, VoiceServiceError> {
        let text = non_blank(request.text)
            .ok_or_else(|| VoiceServiceError::MissingParameters("text is required".to_string()))?;
        let spec = BlendSpec::from_parts(
            request.voice_id1,
            request.voice_id2,
            request.weight1,
            request.weight2,
        )?;
        self.guard_text(&text)?;
        let speed = validate_speed(request.speed)?;

        tracing::info!(
            user_id = %user_id,
            voice_id1 = %spec.voice_id1,
            voice_id2 = %spec.voice_id2,
            weight1 = spec.weight1,
            weight2 = spec.weight2,
            "Custom voice preview request"
        );

        let blended = self.resolver.resolve_blend(user_id, &spec).await?;
        let wav = self.render(&text, &blended, speed).await?;

        Ok(PreviewResponse {
            audio_data_inline: to_data_uri(&wav),
            timestamp: Utc::now(),
            voice_id1: spec.voice_id1,
            voice_id2: spec.voice_id2,
            weight1: spec.weight1,
            weight2: spec.weight2,
        })
    }

    async fn list_audio(&self, user_id: Uuid) -> Result<Vec<AudioArtifactResponse>, VoiceServiceError> {
        let artifacts = self
            .audio_repo
            .find_recent_by_user(user_id, AUDIO_HISTORY_LIMIT)
            .await?;

        let mut responses = Vec::with_capacity(artifacts.len());
        for artifact in artifacts {
            let audio_url = match self
                .artifact_store
                .signed_url(&artifact.storage_path, self.signed_url_expiry)
                .await
            {
                Ok(url) => Some(url),
                Err(e) => {
                    tracing::warn!(
                        storage_path = %artifact.storage_path,
                        error = %e,
                        "Failed to sign audio URL"
                    );
                    None
                }
            };
            responses.push(AudioArtifactResponse::from_artifact(artifact, audio_url));
        }

        Ok(responses)
    }
}

impl SynthesisService {
    fn guard_text(&self, text: &str) -> Result<(), VoiceServiceError> {
        let length = text.chars().count();
        if length > self.max_text_chars {
            return Err(VoiceServiceError::TextTooLong(format!(
                "text has {} characters, the limit is {}",
                length, self.max_text_chars
            )));
        }
        Ok(())
    }

    /// Run the model and encode its output as WAV
    async fn render(
        &self,
        text: &str,
        embedding: &Embedding,
        speed: f32,
    ) -> Result<Vec<u8>, VoiceServiceError> {
        let start_time = Instant::now();

        let segments = self
            .synthesizer
            .generate(text, embedding, speed)
            .await
            .map_err(|e| VoiceServiceError::SynthesisFailed(e.to_string()))?;
        let samples = collect_segments(segments).await?;
        let wav = encode_wav(&samples, self.synthesizer.sample_rate())?;

        tracing::info!(
            samples = samples.len(),
            wav_bytes = wav.len(),
            latency_ms = start_time.elapsed().as_millis(),
            "Audio rendered"
        );

        Ok(wav)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Speed multiplier, defaulting to 1.0
pub fn validate_speed(speed: Option<f32>) -> Result<f32, VoiceServiceError> {
    let speed = speed.unwrap_or(DEFAULT_SPEED);
    if !speed.is_finite() || !(MIN_SPEED..=MAX_SPEED).contains(&speed) {
        return Err(VoiceServiceError::Invalid(format!(
            "speed must be between {} and {}, got {}",
            MIN_SPEED, MAX_SPEED, speed
        )));
    }
    Ok(speed)
}
