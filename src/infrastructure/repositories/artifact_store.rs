use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactCategory {
    Audio,
    Voices,
}

impl ArtifactCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactCategory::Audio => "audio",
            ArtifactCategory::Voices => "voices",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ArtifactCategory::Audio => "wav",
            ArtifactCategory::Voices => "npy",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ArtifactCategory::Audio => "audio/wav",
            ArtifactCategory::Voices => "application/octet-stream",
        }
    }
}

/// Object key laid out as `{category}/{userId}/{uuid}.{ext}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactKey {
    pub category: ArtifactCategory,
    pub user_id: Uuid,
    pub id: Uuid,
}

impl ArtifactKey {
    pub fn new(category: ArtifactCategory, user_id: Uuid) -> Self {
        Self {
            category,
            user_id,
            id: Uuid::new_v4(),
        }
    }

    pub fn content_type(&self) -> &'static str {
        self.category.content_type()
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}.{}",
            self.category.as_str(),
            self.user_id,
            self.id,
            self.category.extension()
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("object {0} not found")]
    NotFound(String),
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Durable object storage for generated audio and voice embeddings.
///
/// Keys are never reused, so stored objects are effectively immutable.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Store `bytes` under `key`
    async fn put(&self, key: &ArtifactKey, bytes: Vec<u8>) -> Result<(), StorageError>;

    /// Fetch the object stored at `path`
    async fn get(&self, path: &str) -> Result<Vec<u8>, StorageError>;

    async fn delete(&self, path: &str) -> Result<(), StorageError>;

    /// Time-limited retrieval URL for `path`
    async fn signed_url(&self, path: &str, expires_in: Duration) -> Result<String, StorageError>;

    /// Cheap reachability probe for readiness checks
    async fn health_check(&self) -> bool;
}
