use super::embedding::Embedding;
use super::error::VoiceServiceError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

pub const DEFAULT_WEIGHT: f64 = 0.5;

/// A user-owned blend of two voices, persisted in `custom_voices`
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CustomVoice {
    pub id: Uuid,
    pub user_id: Uuid,
    pub voice_name: String,
    pub voice_id1: String,
    pub voice_id2: String,
    pub weight1: f64,
    pub weight2: f64,
    pub storage_path: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VoiceOrigin {
    BuiltIn,
    Custom,
}

impl fmt::Display for VoiceOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoiceOrigin::BuiltIn => write!(f, "built-in"),
            VoiceOrigin::Custom => write!(f, "custom"),
        }
    }
}

/// A voice identifier resolved to the embedding that conditions synthesis
#[derive(Debug, Clone)]
pub struct ResolvedVoice {
    pub id: String,
    pub origin: VoiceOrigin,
    pub embedding: Arc<Embedding>,
}

/// Request for POST /voice/custom
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomVoiceRequest {
    pub name: Option<String>,
    pub voice_id1: Option<String>,
    pub voice_id2: Option<String>,
    pub weight1: Option<f64>,
    pub weight2: Option<f64>,
}

/// Custom voice as returned to clients
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomVoiceResponse {
    pub id: Uuid,
    pub name: String,
    pub voice_id1: String,
    pub voice_id2: String,
    pub weight1: f64,
    pub weight2: f64,
    pub storage_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_url: Option<String>,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl CustomVoiceResponse {
    pub fn from_voice(voice: CustomVoice, voice_url: Option<String>) -> Self {
        Self {
            id: voice.id,
            name: voice.voice_name,
            voice_id1: voice.voice_id1,
            voice_id2: voice.voice_id2,
            weight1: voice.weight1,
            weight2: voice.weight2,
            storage_path: voice.storage_path,
            voice_url,
            user_id: voice.user_id,
            created_at: voice.created_at,
        }
    }
}

/// Two source voices and their weights, after defaults are applied
#[derive(Debug, Clone, PartialEq)]
pub struct BlendSpec {
    pub voice_id1: String,
    pub voice_id2: String,
    pub weight1: f64,
    pub weight2: f64,
}

impl BlendSpec {
    /// Build from optional request fields; omitted weights default to 0.5
    pub fn from_parts(
        voice_id1: Option<String>,
        voice_id2: Option<String>,
        weight1: Option<f64>,
        weight2: Option<f64>,
    ) -> Result<Self, VoiceServiceError> {
        let trimmed = |id: Option<String>| {
            id.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
        };
        let voice_id1 = trimmed(voice_id1);
        let voice_id2 = trimmed(voice_id2);

        match (voice_id1, voice_id2) {
            (Some(voice_id1), Some(voice_id2)) => Ok(Self {
                voice_id1,
                voice_id2,
                weight1: weight1.unwrap_or(DEFAULT_WEIGHT),
                weight2: weight2.unwrap_or(DEFAULT_WEIGHT),
            }),
            (None, None) => Err(VoiceServiceError::MissingParameters(
                "voiceId1 and voiceId2 are required".to_string(),
            )),
            (None, _) => Err(VoiceServiceError::MissingParameters(
                "voiceId1 is required".to_string(),
            )),
            (_, None) => Err(VoiceServiceError::MissingParameters(
                "voiceId2 is required".to_string(),
            )),
        }
    }
}
