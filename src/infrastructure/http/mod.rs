use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::controllers::{
    custom_voice::CustomVoiceController,
    health::{self, HealthController},
    voice::VoiceController,
};
use crate::infrastructure::auth::{acting_user_middleware, request_id_middleware};
use crate::infrastructure::config::Config;

/// Build the application router with all routes configured
pub fn build_router(
    health_controller: Arc<HealthController>,
    voice_controller: Arc<VoiceController>,
    custom_voice_controller: Arc<CustomVoiceController>,
) -> Router {
    // Voice routes acting on behalf of a user (need User-Id)
    let voice_routes = Router::new()
        .route("/voice/synthesize", post(VoiceController::synthesize))
        .route("/voice/audio", get(VoiceController::list_audio))
        .with_state(voice_controller.clone())
        .layer(middleware::from_fn(acting_user_middleware));

    let custom_voice_routes = Router::new()
        .route(
            "/voice/custom",
            get(CustomVoiceController::list).post(CustomVoiceController::create),
        )
        .route("/voice/custom/test", post(CustomVoiceController::preview))
        .route("/voice/custom/:id", delete(CustomVoiceController::delete))
        .with_state(custom_voice_controller)
        .layer(middleware::from_fn(acting_user_middleware));

    // Public routes
    let catalog_routes = Router::new()
        .route("/voice/catalog", get(VoiceController::catalog))
        .with_state(voice_controller);

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(HealthController::health_ready))
        .with_state(health_controller)
        .merge(catalog_routes)
        .merge(voice_routes)
        .merge(custom_voice_routes)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Start the HTTP server
pub async fn start_http_server(
    config: Arc<Config>,
    app: Router,
) -> Result<(), Box<dyn std::error::Error>> {
    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
