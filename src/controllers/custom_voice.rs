use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;
use uuid::Uuid;

use super::json_body;
use crate::{
    domain::{
        synthesis::{PreviewRequest, PreviewResponse, SynthesisService, SynthesisServiceApi},
        voice::{
            CreateCustomVoiceRequest, CustomVoiceResponse, CustomVoiceService,
            CustomVoiceServiceApi,
        },
    },
    error::{AppError, AppResult},
    infrastructure::auth::ActingUser,
};

pub struct CustomVoiceController {
    custom_voice_service: Arc<CustomVoiceService>,
    synthesis_service: Arc<SynthesisService>,
}

impl CustomVoiceController {
    pub fn new(
        custom_voice_service: Arc<CustomVoiceService>,
        synthesis_service: Arc<SynthesisService>,
    ) -> Self {
        Self {
            custom_voice_service,
            synthesis_service,
        }
    }

    /// POST /voice/custom - Blend two voices and save the result
    pub async fn create(
        State(controller): State<Arc<CustomVoiceController>>,
        Extension(user): Extension<ActingUser>,
        body: Result<Json<CreateCustomVoiceRequest>, JsonRejection>,
    ) -> AppResult<(StatusCode, Json<CustomVoiceResponse>)> {
        let request = json_body(body)?;
        let voice = controller
            .custom_voice_service
            .create(user.user_id, request)
            .await
            .map_err(AppError::from)?;
        Ok((StatusCode::CREATED, Json(voice)))
    }

    /// GET /voice/custom - List the acting user's custom voices
    pub async fn list(
        State(controller): State<Arc<CustomVoiceController>>,
        Extension(user): Extension<ActingUser>,
    ) -> AppResult<Json<Vec<CustomVoiceResponse>>> {
        let voices = controller
            .custom_voice_service
            .list(user.user_id)
            .await
            .map_err(AppError::from)?;
        Ok(Json(voices))
    }

    /// POST /voice/custom/test - Preview a blend without saving it
    pub async fn preview(
        State(controller): State<Arc<CustomVoiceController>>,
        Extension(user): Extension<ActingUser>,
        body: Result<Json<PreviewRequest>, JsonRejection>,
    ) -> AppResult<Json<PreviewResponse>> {
        let request = json_body(body)?;
        let preview = controller
            .synthesis_service
            .preview(user.user_id, request)
            .await
            .map_err(AppError::from)?;
        Ok(Json(preview))
    }

    /// DELETE /voice/custom/{id} - Delete an owned custom voice
    pub async fn delete(
        State(controller): State<Arc<CustomVoiceController>>,
        Extension(user): Extension<ActingUser>,
        path: Result<Path<Uuid>, PathRejection>,
    ) -> AppResult<StatusCode> {
        let Path(voice_id) =
            path.map_err(|_| AppError::BadRequest("voice id must be a UUID".to_string()))?;
        controller
            .custom_voice_service
            .delete(user.user_id, voice_id)
            .await
            .map_err(AppError::from)?;
        Ok(StatusCode::NO_CONTENT)
    }
}
