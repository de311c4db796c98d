use axum::{extract::rejection::JsonRejection, extract::State, Extension, Json};
use std::sync::Arc;

use super::json_body;
use crate::{
    domain::{
        synthesis::{
            AudioArtifactResponse, SynthesisResponse, SynthesisService, SynthesisServiceApi,
            SynthesizeRequest,
        },
        voice::BuiltInCatalog,
    },
    error::{AppError, AppResult},
    infrastructure::auth::ActingUser,
};

pub struct VoiceController {
    synthesis_service: Arc<SynthesisService>,
    catalog: Arc<BuiltInCatalog>,
}

impl VoiceController {
    pub fn new(synthesis_service: Arc<SynthesisService>, catalog: Arc<BuiltInCatalog>) -> Self {
        Self {
            synthesis_service,
            catalog,
        }
    }

    /// POST /voice/synthesize - Generate speech with a built-in or custom voice
    pub async fn synthesize(
        State(controller): State<Arc<VoiceController>>,
        Extension(user): Extension<ActingUser>,
        body: Result<Json<SynthesizeRequest>, JsonRejection>,
    ) -> AppResult<Json<SynthesisResponse>> {
        let request = json_body(body)?;
        let response = controller
            .synthesis_service
            .synthesize(user.user_id, request)
            .await
            .map_err(AppError::from)?;
        Ok(Json(response))
    }

    /// GET /voice/catalog - Built-in voice identifiers
    pub async fn catalog(State(controller): State<Arc<VoiceController>>) -> Json<Vec<String>> {
        Json(controller.catalog.names().to_vec())
    }

    /// GET /voice/audio - Recent audio of the acting user
    pub async fn list_audio(
        State(controller): State<Arc<VoiceController>>,
        Extension(user): Extension<ActingUser>,
    ) -> AppResult<Json<Vec<AudioArtifactResponse>>> {
        let audio = controller
            .synthesis_service
            .list_audio(user.user_id)
            .await
            .map_err(AppError::from)?;
        Ok(Json(audio))
    }
}
