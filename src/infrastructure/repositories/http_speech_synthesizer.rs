use super::speech_synthesizer::{AudioSegment, SegmentStream, SpeechSynthesizer, SynthesizerError};
use crate::domain::voice::Embedding;
use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Speech model served over HTTP.
///
/// Request: `POST {base_url}/v1/generate`
/// `{"text": "...", "speed": 1.0, "voice": {"shape": [510, 1, 256], "data": [...]}}`
///
/// Response: `{"sample_rate": 24000, "segments": [{"graphemes": "...", "phonemes": "...", "audio": [...] | null}]}`
pub struct HttpSpeechSynthesizer {
    client: Client,
    base_url: String,
    sample_rate: u32,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    text: &'a str,
    speed: f32,
    voice: VoicePayload<'a>,
}

#[derive(Debug, Serialize)]
struct VoicePayload<'a> {
    shape: &'a [usize],
    data: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    sample_rate: Option<u32>,
    #[serde(default)]
    segments: Vec<SegmentPayload>,
}

#[derive(Debug, Deserialize)]
struct SegmentPayload {
    #[serde(default)]
    graphemes: String,
    #[serde(default)]
    phonemes: String,
    audio: Option<Vec<f32>>,
}

impl HttpSpeechSynthesizer {
    /// `timeout` of `None` leaves requests unbounded
    pub fn new(
        base_url: impl Into<String>,
        sample_rate: u32,
        timeout: Option<Duration>,
    ) -> Result<Self, SynthesizerError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| SynthesizerError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            sample_rate,
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for HttpSpeechSynthesizer {
    async fn generate(
        &self,
        text: &str,
        voice: &Embedding,
        speed: f32,
    ) -> Result<SegmentStream, SynthesizerError> {
        let start_time = Instant::now();
        let url = format!("{}/v1/generate", self.base_url);

        tracing::info!(
            url = %url,
            text_length = text.len(),
            speed = speed,
            voice_shape = ?voice.shape(),
            "Calling speech model"
        );

        let body = GenerateRequest {
            text,
            speed,
            voice: VoicePayload {
                shape: voice.shape(),
                data: voice.to_vec(),
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, url = %url, "Speech model request failed");
                SynthesizerError::Unavailable(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, detail = %detail, "Speech model returned an error");
            return Err(SynthesizerError::Rejected(format!("{}: {}", status, detail)));
        }

        let payload: GenerateResponse = response
            .json()
            .await
            .map_err(|e| SynthesizerError::InvalidResponse(e.to_string()))?;

        if let Some(rate) = payload.sample_rate {
            if rate != self.sample_rate {
                return Err(SynthesizerError::InvalidResponse(format!(
                    "expected {} Hz audio, model produced {} Hz",
                    self.sample_rate, rate
                )));
            }
        }

        tracing::info!(
            provider = "http",
            latency_ms = start_time.elapsed().as_millis(),
            segment_count = payload.segments.len(),
            "Speech model responded"
        );

        let segments = payload.segments.into_iter().map(|segment| {
            Ok::<_, SynthesizerError>(AudioSegment {
                graphemes: segment.graphemes,
                phonemes: segment.phonemes,
                samples: segment.audio.unwrap_or_default(),
            })
        });

        Ok(stream::iter(segments).boxed())
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    async fn health_check(&self) -> bool {
        match self
            .client
            .get(format!("{}/health", self.base_url))
            .timeout(Duration::from_secs(2))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}
