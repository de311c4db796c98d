use serde::Deserialize;
use std::env;
use std::path::PathBuf;

/// Kokoro v1.0 voice pack shipped with the model
pub const DEFAULT_VOICE_NAMES: &[&str] = &[
    "af_heart", "af_alloy", "af_aoede", "af_bella", "af_jessica", "af_kore", "af_nicole",
    "af_nova", "af_river", "af_sarah", "af_sky", "am_adam", "am_echo", "am_eric",
    "am_fenrir", "am_liam", "am_michael", "am_onyx", "am_puck", "am_santa", "bf_alice",
    "bf_emma", "bf_isabella", "bf_lily", "bm_daniel", "bm_fable", "bm_george", "bm_lewis",
];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub log_format: LogFormat,
    pub run_migrations: bool,
    // Object storage
    pub s3_bucket: String,
    pub s3_endpoint: Option<String>,
    pub s3_region: String,
    pub s3_access_key: Option<String>,
    pub s3_secret_key: Option<String>,
    pub signed_url_expiry_days: u32,
    // Built-in voices
    pub voices_dir: PathBuf,
    pub voices_bundle: Option<PathBuf>,
    pub voice_names: Vec<String>,
    // Speech model
    pub synthesizer_url: String,
    pub synthesizer_timeout_secs: Option<u64>,
    pub sample_rate: u32,
    pub max_text_chars: usize,
    // Custom voice embedding cache
    pub voice_cache_enabled: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let config = Config {
            database_url: env::var("DATABASE_URL")?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()?,
            environment: match env::var("ENVIRONMENT").as_deref() {
                Ok("production") => Environment::Production,
                _ => Environment::Development,
            },
            log_format: match env::var("LOG_FORMAT").as_deref() {
                Ok("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
            run_migrations: parse_flag(env::var("RUN_MIGRATIONS").ok(), true),
            s3_bucket: env::var("S3_BUCKET").unwrap_or_else(|_| "fantasy-audio".to_string()),
            s3_endpoint: env::var("S3_ENDPOINT").ok().filter(|s| !s.is_empty()),
            s3_region: env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            s3_access_key: env::var("S3_ACCESS_KEY").ok(),
            s3_secret_key: env::var("S3_SECRET_KEY").ok(),
            signed_url_expiry_days: env::var("SIGNED_URL_EXPIRY_DAYS")
                .unwrap_or_else(|_| "7".to_string())
                .parse()?,
            voices_dir: PathBuf::from(
                env::var("VOICES_DIR").unwrap_or_else(|_| "voices".to_string()),
            ),
            voices_bundle: env::var("VOICES_BUNDLE").ok().map(PathBuf::from),
            voice_names: parse_voice_names(env::var("VOICE_NAMES").ok().as_deref()),
            synthesizer_url: env::var("SYNTHESIZER_URL")
                .unwrap_or_else(|_| "http://localhost:8880".to_string()),
            synthesizer_timeout_secs: env::var("SYNTHESIZER_TIMEOUT_SECS")
                .ok()
                .map(|s| s.parse())
                .transpose()?,
            sample_rate: env::var("SAMPLE_RATE")
                .unwrap_or_else(|_| "24000".to_string())
                .parse()?,
            max_text_chars: env::var("MAX_TEXT_CHARS")
                .unwrap_or_else(|_| "10000".to_string())
                .parse()?,
            voice_cache_enabled: parse_flag(env::var("VOICE_CACHE_ENABLED").ok(), false),
        };

        Ok(config)
    }

    pub fn signed_url_expiry(&self) -> std::time::Duration {
        std::time::Duration::from_secs(u64::from(self.signed_url_expiry_days) * 24 * 60 * 60)
    }
}

fn parse_flag(value: Option<String>, default: bool) -> bool {
    value
        .map(|s| matches!(s.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(default)
}

/// Comma-separated voice list, falling back to the bundled Kokoro voices
fn parse_voice_names(value: Option<&str>) -> Vec<String> {
    let names: Vec<String> = value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if names.is_empty() {
        DEFAULT_VOICE_NAMES.iter().map(|s| s.to_string()).collect()
    } else {
        names
    }
}
