use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A generated audio file, persisted in `audio_artifacts`
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AudioArtifact {
    pub id: Uuid,
    pub user_id: Uuid,
    pub prompt: String,
    pub voice: String,
    pub speed: f32,
    pub storage_path: String,
    pub created_at: DateTime<Utc>,
}

/// Request for POST /voice/synthesize
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesizeRequest {
    pub text: Option<String>,
    pub voice_id: Option<String>,
    pub speed: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisResponse {
    pub id: Uuid,
    pub prompt: String,
    pub voice: String,
    pub speed: f32,
    pub audio_url: String,
    pub audio_data_inline: String,
    pub timestamp: DateTime<Utc>,
    pub storage_path: String,
    pub user_id: Uuid,
}

/// Request for POST /voice/custom/test
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRequest {
    pub text: Option<String>,
    pub voice_id1: Option<String>,
    pub voice_id2: Option<String>,
    pub weight1: Option<f64>,
    pub weight2: Option<f64>,
    pub speed: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResponse {
    pub audio_data_inline: String,
    pub timestamp: DateTime<Utc>,
    pub voice_id1: String,
    pub voice_id2: String,
    pub weight1: f64,
    pub weight2: f64,
}

/// Entry of GET /voice/audio
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioArtifactResponse {
    pub id: Uuid,
    pub prompt: String,
    pub voice: String,
    pub speed: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    pub storage_path: String,
    pub created_at: DateTime<Utc>,
}

impl AudioArtifactResponse {
    pub fn from_artifact(artifact: AudioArtifact, audio_url: Option<String>) -> Self {
        Self {
            id: artifact.id,
            prompt: artifact.prompt,
            voice: artifact.voice,
            speed: artifact.speed,
            audio_url,
            storage_path: artifact.storage_path,
            created_at: artifact.created_at,
        }
    }
}
