use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

use crate::infrastructure::db::{check_connection, DbPool};
use crate::infrastructure::repositories::{ArtifactStore, SpeechSynthesizer};

pub struct HealthController {
    pool: Arc<DbPool>,
    artifact_store: Arc<dyn ArtifactStore>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    builtin_voices: usize,
}

impl HealthController {
    pub fn new(
        pool: Arc<DbPool>,
        artifact_store: Arc<dyn ArtifactStore>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        builtin_voices: usize,
    ) -> Self {
        Self {
            pool,
            artifact_store,
            synthesizer,
            builtin_voices,
        }
    }

    /// GET /health/ready - Check database, storage and speech model
    pub async fn health_ready(State(controller): State<Arc<HealthController>>) -> impl IntoResponse {
        let (database, storage, synthesizer) = tokio::join!(
            check_connection(&controller.pool),
            controller.artifact_store.health_check(),
            controller.synthesizer.health_check(),
        );
        let database = database.unwrap_or(false);
        let ready = database && storage && synthesizer;

        let status = if ready {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        };

        (
            status,
            Json(json!({
                "status": if ready { "ready" } else { "not_ready" },
                "database": if database { "connected" } else { "disconnected" },
                "storage": if storage { "available" } else { "unavailable" },
                "synthesizer": if synthesizer { "available" } else { "unavailable" },
                "builtinVoices": controller.builtin_voices,
            })),
        )
    }
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
