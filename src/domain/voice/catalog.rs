use super::embedding::{Embedding, EmbeddingError};
use ndarray::ArrayD;
use ndarray_npy::NpzReader;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Built-in voices, loaded once at startup.
///
/// The catalog is never mutated after construction, so it is shared between
/// requests behind an `Arc` without locking. Picking up new voice files
/// requires a restart.
#[derive(Debug, Default)]
pub struct BuiltInCatalog {
    voices: HashMap<String, Arc<Embedding>>,
    names: Vec<String>,
}

impl BuiltInCatalog {
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, Embedding)>,
    {
        let mut catalog = Self::default();
        for (name, embedding) in entries {
            catalog.insert(name, embedding);
        }
        catalog
    }

    /// Load `{dir}/{name}.npy` for every configured voice name.
    ///
    /// Voices whose file is missing or unreadable are skipped with a warning
    /// so one bad file does not take the whole service down.
    pub fn load_from_dir(dir: &Path, names: &[String]) -> Self {
        let mut catalog = Self::default();

        for name in names {
            let path = dir.join(format!("{name}.npy"));
            let loaded = fs::read(&path)
                .map_err(|e| EmbeddingError::Decode(e.to_string()))
                .and_then(|bytes| Embedding::from_npy_bytes(&bytes));

            match loaded {
                Ok(embedding) => {
                    tracing::debug!(voice = %name, shape = ?embedding.shape(), "Loaded built-in voice");
                    catalog.insert(name.clone(), embedding);
                }
                Err(e) => {
                    tracing::warn!(
                        voice = %name,
                        path = %path.display(),
                        error = %e,
                        "Could not load voice tensor"
                    );
                }
            }
        }

        catalog
    }

    /// Load voices from a single `.npz` bundle (e.g. `voices-v1.0.bin`).
    pub fn load_from_bundle(path: &Path, names: &[String]) -> Result<Self, EmbeddingError> {
        let file = fs::File::open(path).map_err(|e| EmbeddingError::Decode(e.to_string()))?;
        let mut npz = NpzReader::new(file).map_err(|e| EmbeddingError::Decode(e.to_string()))?;

        let mut catalog = Self::default();
        for name in names {
            let npy_name = format!("{name}.npy");
            let loaded: Result<ArrayD<f32>, _> = npz.by_name(&npy_name);
            match loaded {
                Ok(values) => catalog.insert(name.clone(), Embedding::new(values)),
                Err(e) => {
                    tracing::warn!(voice = %name, error = %e, "Voice missing from bundle");
                }
            }
        }

        Ok(catalog)
    }

    fn insert(&mut self, name: String, embedding: Embedding) {
        if self
            .voices
            .insert(name.clone(), Arc::new(embedding))
            .is_none()
        {
            self.names.push(name);
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<Embedding>> {
        self.voices.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.voices.contains_key(name)
    }

    /// Voice identifiers in configuration order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }
}
