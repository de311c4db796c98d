pub mod artifact_store;
pub mod audio_artifact_repository;
pub mod custom_voice_repository;
pub mod http_speech_synthesizer;
pub mod s3_artifact_store;
pub mod speech_synthesizer;

pub use artifact_store::{ArtifactCategory, ArtifactKey, ArtifactStore, StorageError};
pub use audio_artifact_repository::AudioArtifactRepository;
pub use custom_voice_repository::CustomVoiceRepository;
pub use http_speech_synthesizer::HttpSpeechSynthesizer;
pub use s3_artifact_store::S3ArtifactStore;
pub use speech_synthesizer::{AudioSegment, SegmentStream, SpeechSynthesizer, SynthesizerError};
