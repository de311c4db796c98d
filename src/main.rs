use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use voice_forge::controllers::{
    custom_voice::CustomVoiceController, health::HealthController, voice::VoiceController,
};
use voice_forge::domain::synthesis::SynthesisService;
use voice_forge::domain::voice::{BuiltInCatalog, CustomVoiceService, VoiceResolver};
use voice_forge::infrastructure::config::{Config, LogFormat};
use voice_forge::infrastructure::db::{check_connection, create_pool, run_migrations};
use voice_forge::infrastructure::http::{build_router, start_http_server};
use voice_forge::infrastructure::repositories::{
    ArtifactStore, AudioArtifactRepository, CustomVoiceRepository, HttpSpeechSynthesizer,
    S3ArtifactStore, SpeechSynthesizer,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        environment = ?config.environment,
        "Starting Voice Forge on {}:{}",
        config.host,
        config.port
    );

    // Create database connection pool
    let pool = create_pool(&config.database_url).await?;
    tracing::info!("Database connection pool created");

    check_connection(&pool).await?;
    tracing::info!("Database connection verified");

    if config.run_migrations {
        run_migrations(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    // Object storage
    tracing::info!(
        bucket = %config.s3_bucket,
        region = %config.s3_region,
        "Initializing S3 artifact store"
    );
    let s3_store = S3ArtifactStore::from_config(&config).await;
    if let Err(e) = s3_store.ensure_bucket().await {
        tracing::warn!(error = %e, "Could not prepare the storage bucket; continuing");
    }
    let artifact_store: Arc<dyn ArtifactStore> = Arc::new(s3_store);

    // Built-in voices are loaded once; changing them requires a restart
    let catalog = match &config.voices_bundle {
        Some(bundle) => {
            tracing::info!(bundle = %bundle.display(), "Loading built-in voices from bundle");
            BuiltInCatalog::load_from_bundle(bundle, &config.voice_names)?
        }
        None => {
            tracing::info!(dir = %config.voices_dir.display(), "Loading built-in voices from directory");
            BuiltInCatalog::load_from_dir(&config.voices_dir, &config.voice_names)
        }
    };
    if catalog.is_empty() {
        tracing::warn!("No built-in voices loaded; only custom voices will resolve");
    } else {
        tracing::info!(count = catalog.len(), "Built-in voices loaded");
    }
    let catalog = Arc::new(catalog);

    // Speech model
    let synthesizer: Arc<dyn SpeechSynthesizer> = Arc::new(HttpSpeechSynthesizer::new(
        config.synthesizer_url.clone(),
        config.sample_rate,
        config.synthesizer_timeout_secs.map(Duration::from_secs),
    )?);
    tracing::info!(url = %config.synthesizer_url, sample_rate = config.sample_rate, "Speech model client initialized");

    let pool = Arc::new(pool);
    let config = Arc::new(config);

    // === DEPENDENCY INJECTION SETUP ===
    // 1. Instantiate repositories (inject db pool)
    tracing::info!("Instantiating repositories...");
    let custom_voice_repo = Arc::new(CustomVoiceRepository::new(pool.clone()));
    let audio_repo = Arc::new(AudioArtifactRepository::new(pool.clone()));

    // 2. Instantiate services (inject repositories and clients)
    tracing::info!("Instantiating services...");
    let resolver = Arc::new(VoiceResolver::new(
        catalog.clone(),
        custom_voice_repo.clone(),
        artifact_store.clone(),
        config.voice_cache_enabled,
    ));
    let custom_voice_service = Arc::new(CustomVoiceService::new(
        resolver.clone(),
        custom_voice_repo,
        artifact_store.clone(),
        config.signed_url_expiry(),
    ));
    let synthesis_service = Arc::new(SynthesisService::new(
        resolver,
        synthesizer.clone(),
        artifact_store.clone(),
        audio_repo,
        config.signed_url_expiry(),
        config.max_text_chars,
    ));

    // 3. Instantiate controllers (inject services)
    tracing::info!("Instantiating controllers...");
    let health_controller = Arc::new(HealthController::new(
        pool.clone(),
        artifact_store,
        synthesizer,
        catalog.len(),
    ));
    let voice_controller = Arc::new(VoiceController::new(synthesis_service.clone(), catalog));
    let custom_voice_controller = Arc::new(CustomVoiceController::new(
        custom_voice_service,
        synthesis_service,
    ));

    // Start HTTP server with all routes
    let app = build_router(health_controller, voice_controller, custom_voice_controller);
    start_http_server(config, app).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "voice_forge=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "voice_forge=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
