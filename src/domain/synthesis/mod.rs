pub mod audio;
pub mod error;
pub mod model;
pub mod service;

pub use error::SynthesisError;
pub use model::{
    AudioArtifact, AudioArtifactResponse, PreviewRequest, PreviewResponse, SynthesisResponse,
    SynthesizeRequest,
};
pub use service::{SynthesisService, SynthesisServiceApi};
