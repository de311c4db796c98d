use super::error::VoiceServiceError;
use super::model::{BlendSpec, CreateCustomVoiceRequest, CustomVoice, CustomVoiceResponse};
use super::resolver::VoiceResolver;
use crate::infrastructure::repositories::{
    ArtifactCategory, ArtifactKey, ArtifactStore, CustomVoiceRepository,
};
use async_trait::async_trait;
use chrono::Utc;
use regex::Regex;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use uuid::Uuid;

const MAX_VOICE_NAME_LEN: usize = 64;

static VOICE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w][\w .\-]*$").expect("voice name regex is valid"));

pub struct CustomVoiceService {
    resolver: Arc<VoiceResolver>,
    custom_voice_repo: Arc<CustomVoiceRepository>,
    artifact_store: Arc<dyn ArtifactStore>,
    signed_url_expiry: Duration,
}

impl CustomVoiceService {
    pub fn new(
        resolver: Arc<VoiceResolver>,
        custom_voice_repo: Arc<CustomVoiceRepository>,
        artifact_store: Arc<dyn ArtifactStore>,
        signed_url_expiry: Duration,
    ) -> Self {
        Self {
            resolver,
            custom_voice_repo,
            artifact_store,
            signed_url_expiry,
        }
    }

    async fn sign(&self, storage_path: &str) -> Option<String> {
        match self
            .artifact_store
            .signed_url(storage_path, self.signed_url_expiry)
            .await
        {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!(
                    storage_path = %storage_path,
                    error = %e,
                    "Failed to sign custom voice URL"
                );
                None
            }
        }
    }
}

#[async_trait]
pub trait CustomVoiceServiceApi: Send + Sync {
    /// Blend two voices and save the result under a new name
    ///
    /// The name check runs inside the transaction and before the embedding
    /// artifact is written, so a duplicate leaves no trace in storage.
    async fn create(
        &self,
        user_id: Uuid,
        request: CreateCustomVoiceRequest,
    ) -> Result<CustomVoiceResponse, VoiceServiceError>;

    /// Custom voices of a user ordered by name, each with a fresh signed URL
    async fn list(&self, user_id: Uuid) -> Result<Vec<CustomVoiceResponse>, VoiceServiceError>;

    /// Delete an owned custom voice; the artifact removal is best-effort
    async fn delete(&self, user_id: Uuid, voice_id: Uuid) -> Result<(), VoiceServiceError>;
}

#[async_trait]
impl CustomVoiceServiceApi for CustomVoiceService {
    async fn create(
        &self,
        user_id: Uuid,
        request: CreateCustomVoiceRequest,
    ) -> Result<CustomVoiceResponse, VoiceServiceError> {
        let name = validate_voice_name(request.name.as_deref())?;
        let spec = BlendSpec::from_parts(
            request.voice_id1,
            request.voice_id2,
            request.weight1,
            request.weight2,
        )?;

        tracing::info!(
            user_id = %user_id,
            name = %name,
            voice_id1 = %spec.voice_id1,
            voice_id2 = %spec.voice_id2,
            "Creating custom voice"
        );

        let blended = self.resolver.resolve_blend(user_id, &spec).await?;
        let bytes = blended
            .to_npy_bytes()
            .map_err(|e| VoiceServiceError::Other(anyhow::anyhow!(e)))?;

        let mut tx = self.custom_voice_repo.begin().await?;

        if self.custom_voice_repo.name_exists(&mut tx, user_id, &name).await? {
            return Err(VoiceServiceError::DuplicateVoiceName(name));
        }

        let key = ArtifactKey::new(ArtifactCategory::Voices, user_id);
        let storage_path = key.to_string();
        self.artifact_store
            .put(&key, bytes)
            .await
            .map_err(|e| VoiceServiceError::StorageFailure(e.to_string()))?;

        let voice = CustomVoice {
            id: Uuid::new_v4(),
            user_id,
            voice_name: name,
            voice_id1: spec.voice_id1,
            voice_id2: spec.voice_id2,
            weight1: spec.weight1,
            weight2: spec.weight2,
            storage_path,
            created_at: Utc::now(),
        };

        let created = self.custom_voice_repo.create(&mut tx, &voice).await?;
        tx.commit()
            .await
            .map_err(|e| VoiceServiceError::DatabaseFailure(e.to_string()))?;

        tracing::info!(
            user_id = %user_id,
            voice_id = %created.id,
            name = %created.voice_name,
            storage_path = %created.storage_path,
            "Custom voice created"
        );

        let voice_url = self.sign(&created.storage_path).await;
        Ok(CustomVoiceResponse::from_voice(created, voice_url))
    }

    async fn list(&self, user_id: Uuid) -> Result<Vec<CustomVoiceResponse>, VoiceServiceError> {
        let voices = self.custom_voice_repo.find_by_user(user_id).await?;

        let mut responses = Vec::with_capacity(voices.len());
        for voice in voices {
            let voice_url = self.sign(&voice.storage_path).await;
            responses.push(CustomVoiceResponse::from_voice(voice, voice_url));
        }

        Ok(responses)
    }

    async fn delete(&self, user_id: Uuid, voice_id: Uuid) -> Result<(), VoiceServiceError> {
        let voice = self
            .custom_voice_repo
            .find_by_id(voice_id)
            .await?
            .filter(|v| v.user_id == user_id)
            .ok_or(VoiceServiceError::NotFound)?;

        if !self.custom_voice_repo.delete(voice.id).await? {
            return Err(VoiceServiceError::NotFound);
        }
        self.resolver.forget(&voice.storage_path).await;

        if let Err(e) = self.artifact_store.delete(&voice.storage_path).await {
            tracing::warn!(
                voice_id = %voice.id,
                storage_path = %voice.storage_path,
                error = %e,
                "Custom voice deleted but its artifact could not be removed"
            );
        }

        tracing::info!(user_id = %user_id, voice_id = %voice.id, "Custom voice deleted");
        Ok(())
    }
}

/// Trimmed voice name, or an error if it is absent or malformed
pub fn validate_voice_name(name: Option<&str>) -> Result<String, VoiceServiceError> {
    let name = name.map(str::trim).unwrap_or_default();

    if name.is_empty() {
        return Err(VoiceServiceError::MissingParameters(
            "name is required".to_string(),
        ));
    }
    if name.chars().count() > MAX_VOICE_NAME_LEN {
        return Err(VoiceServiceError::Invalid(format!(
            "name must be at most {} characters",
            MAX_VOICE_NAME_LEN
        )));
    }
    if !VOICE_NAME_RE.is_match(name) {
        return Err(VoiceServiceError::Invalid(
            "name may only contain letters, digits, spaces, '.', '_' and '-'".to_string(),
        ));
    }

    Ok(name.to_string())
}
