use super::catalog::BuiltInCatalog;
use super::embedding::{blend, validate_weights, Embedding};
use super::error::VoiceServiceError;
use super::model::{BlendSpec, ResolvedVoice, VoiceOrigin};
use crate::infrastructure::repositories::{ArtifactStore, CustomVoiceRepository};
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Maps a voice identifier to an embedding.
///
/// A user's custom voices shadow built-in voices of the same name.
pub struct VoiceResolver {
    catalog: Arc<BuiltInCatalog>,
    custom_voice_repo: Arc<CustomVoiceRepository>,
    artifact_store: Arc<dyn ArtifactStore>,
    cache: Option<Cache<String, Arc<Embedding>>>,
}

impl VoiceResolver {
    pub fn new(
        catalog: Arc<BuiltInCatalog>,
        custom_voice_repo: Arc<CustomVoiceRepository>,
        artifact_store: Arc<dyn ArtifactStore>,
        cache_enabled: bool,
    ) -> Self {
        // Keyed by object key. An object removed from storage behind the
        // service's back keeps resolving until its entry is evicted.
        let cache = if cache_enabled {
            Some(
                Cache::builder()
                    .max_capacity(64)
                    .time_to_idle(Duration::from_secs(30 * 60))
                    .build(),
            )
        } else {
            None
        };

        Self {
            catalog,
            custom_voice_repo,
            artifact_store,
            cache,
        }
    }

    pub async fn resolve(
        &self,
        user_id: Uuid,
        voice_id: &str,
    ) -> Result<ResolvedVoice, VoiceServiceError> {
        if let Some(custom) = self.custom_voice_repo.find_by_name(user_id, voice_id).await? {
            tracing::debug!(
                user_id = %user_id,
                voice = %voice_id,
                storage_path = %custom.storage_path,
                "Resolved custom voice"
            );
            let embedding = self.load_custom_embedding(voice_id, &custom.storage_path).await?;
            return Ok(ResolvedVoice {
                id: voice_id.to_string(),
                origin: VoiceOrigin::Custom,
                embedding,
            });
        }

        match self.catalog.get(voice_id) {
            Some(embedding) => Ok(ResolvedVoice {
                id: voice_id.to_string(),
                origin: VoiceOrigin::BuiltIn,
                embedding,
            }),
            None => Err(VoiceServiceError::VoiceNotFound(voice_id.to_string())),
        }
    }

    /// Resolve both sources of `spec` for `user_id` and blend them
    pub async fn resolve_blend(
        &self,
        user_id: Uuid,
        spec: &BlendSpec,
    ) -> Result<Embedding, VoiceServiceError> {
        // Weights first so bad input never touches storage
        validate_weights(spec.weight1, spec.weight2)?;

        let first = self.resolve(user_id, &spec.voice_id1).await?;
        let second = self.resolve(user_id, &spec.voice_id2).await?;

        tracing::debug!(
            voice_id1 = %first.id,
            origin1 = %first.origin,
            voice_id2 = %second.id,
            origin2 = %second.origin,
            weight1 = spec.weight1,
            weight2 = spec.weight2,
            "Blending voices"
        );

        Ok(blend(&first.embedding, &second.embedding, spec.weight1, spec.weight2)?)
    }

    /// Drop a cached embedding once its custom voice is deleted
    pub async fn forget(&self, storage_path: &str) {
        if let Some(cache) = &self.cache {
            cache.invalidate(storage_path).await;
        }
    }

    async fn load_custom_embedding(
        &self,
        voice_id: &str,
        storage_path: &str,
    ) -> Result<Arc<Embedding>, VoiceServiceError> {
        if let Some(cache) = &self.cache {
            if let Some(embedding) = cache.get(storage_path).await {
                tracing::debug!(storage_path = %storage_path, "Custom voice cache hit");
                return Ok(embedding);
            }
        }

        let unavailable = |reason: String| VoiceServiceError::ArtifactUnavailable {
            voice: voice_id.to_string(),
            reason,
        };

        if storage_path.is_empty() {
            return Err(unavailable("storage path is missing".to_string()));
        }

        let bytes = self
            .artifact_store
            .get(storage_path)
            .await
            .map_err(|e| unavailable(e.to_string()))?;
        let embedding = Arc::new(Embedding::from_npy_bytes(&bytes).map_err(|e| unavailable(e.to_string()))?);

        if let Some(cache) = &self.cache {
            cache.insert(storage_path.to_string(), embedding.clone()).await;
        }

        Ok(embedding)
    }
}
