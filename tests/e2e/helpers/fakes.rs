use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use voice_forge::domain::voice::Embedding;
use voice_forge::infrastructure::repositories::{
    ArtifactKey, ArtifactStore, AudioSegment, SegmentStream, SpeechSynthesizer, StorageError,
    SynthesizerError,
};

pub const SAMPLES_PER_WORD: usize = 240;

/// Artifact store backed by a map, counting reads and writes
#[derive(Default)]
pub struct InMemoryArtifactStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    puts: AtomicUsize,
    gets: AtomicUsize,
}

#[allow(dead_code)]
impl InMemoryArtifactStore {
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn get_count(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn object(&self, path: &str) -> Option<Vec<u8>> {
        self.objects.lock().get(path).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.lock().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Drop an object behind the service's back
    pub fn remove(&self, path: &str) -> bool {
        self.objects.lock().remove(path).is_some()
    }
}

#[async_trait]
impl ArtifactStore for InMemoryArtifactStore {
    async fn put(&self, key: &ArtifactKey, bytes: Vec<u8>) -> Result<(), StorageError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.objects.lock().insert(key.to_string(), bytes);
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.objects
            .lock()
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(path.to_string()))
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        self.objects.lock().remove(path);
        Ok(())
    }

    async fn signed_url(&self, path: &str, expires_in: Duration) -> Result<String, StorageError> {
        Ok(format!(
            "http://storage.test/fantasy-audio/{}?X-Amz-Expires={}",
            path,
            expires_in.as_secs()
        ))
    }

    async fn health_check(&self) -> bool {
        true
    }
}

/// Speech model stand-in.
///
/// Emits one segment per whitespace-separated word; words made only of
/// punctuation yield a segment without audio. Every embedding it is
/// conditioned on is recorded.
#[derive(Default)]
pub struct FakeSynthesizer {
    voices: Mutex<Vec<Embedding>>,
}

#[allow(dead_code)]
impl FakeSynthesizer {
    pub fn received_voices(&self) -> Vec<Embedding> {
        self.voices.lock().clone()
    }

    pub fn last_voice(&self) -> Option<Embedding> {
        self.voices.lock().last().cloned()
    }

    pub fn call_count(&self) -> usize {
        self.voices.lock().len()
    }
}

#[async_trait]
impl SpeechSynthesizer for FakeSynthesizer {
    async fn generate(
        &self,
        text: &str,
        voice: &Embedding,
        _speed: f32,
    ) -> Result<SegmentStream, SynthesizerError> {
        self.voices.lock().push(voice.clone());

        let segments: Vec<Result<AudioSegment, SynthesizerError>> = text
            .split_whitespace()
            .map(|word| {
                let samples = if word.chars().any(char::is_alphanumeric) {
                    vec![0.25; SAMPLES_PER_WORD]
                } else {
                    Vec::new()
                };
                Ok(AudioSegment {
                    graphemes: word.to_string(),
                    phonemes: String::new(),
                    samples,
                })
            })
            .collect();

        Ok(stream::iter(segments).boxed())
    }

    fn sample_rate(&self) -> u32 {
        24_000
    }

    async fn health_check(&self) -> bool {
        true
    }
}
