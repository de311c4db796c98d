pub mod catalog;
pub mod embedding;
pub mod error;
pub mod model;
pub mod resolver;
pub mod service;

pub use catalog::BuiltInCatalog;
pub use embedding::{blend, validate_weights, BlendError, Embedding, EmbeddingError};
pub use error::VoiceServiceError;
pub use model::{
    BlendSpec, CreateCustomVoiceRequest, CustomVoice, CustomVoiceResponse, ResolvedVoice,
    VoiceOrigin,
};
pub use resolver::VoiceResolver;
pub use service::{CustomVoiceService, CustomVoiceServiceApi};
