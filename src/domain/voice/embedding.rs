use ndarray::{ArrayD, IxDyn, Zip};
use ndarray_npy::{ReadNpyExt, WriteNpyExt};
use std::io::Cursor;

/// Style tensor conditioning the speech model's timbre.
///
/// Kokoro voice packs are `510 × 1 × 256`; the shape is carried along so a
/// blended voice can be stored and fed back to the model unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding(ArrayD<f32>);

#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("failed to encode embedding: {0}")]
    Encode(String),
    #[error("failed to decode embedding: {0}")]
    Decode(String),
    #[error("invalid embedding shape: {0}")]
    Shape(String),
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum BlendError {
    #[error("{0}")]
    InvalidWeights(String),
    #[error("embedding shapes differ: {left:?} vs {right:?}")]
    IncompatibleShapes { left: Vec<usize>, right: Vec<usize> },
}

impl Embedding {
    pub fn new(values: ArrayD<f32>) -> Self {
        Self(values)
    }

    pub fn from_vec(shape: &[usize], data: Vec<f32>) -> Result<Self, EmbeddingError> {
        ArrayD::from_shape_vec(IxDyn(shape), data)
            .map(Self)
            .map_err(|e| EmbeddingError::Shape(e.to_string()))
    }

    pub fn shape(&self) -> &[usize] {
        self.0.shape()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_array(&self) -> &ArrayD<f32> {
        &self.0
    }

    /// Values in logical (row-major) order
    pub fn to_vec(&self) -> Vec<f32> {
        self.0.iter().copied().collect()
    }

    /// Serialize as a NumPy `.npy` file
    pub fn to_npy_bytes(&self) -> Result<Vec<u8>, EmbeddingError> {
        let mut buffer = Vec::new();
        self.0
            .write_npy(&mut buffer)
            .map_err(|e| EmbeddingError::Encode(e.to_string()))?;
        Ok(buffer)
    }

    pub fn from_npy_bytes(bytes: &[u8]) -> Result<Self, EmbeddingError> {
        let values = ArrayD::<f32>::read_npy(Cursor::new(bytes))
            .map_err(|e| EmbeddingError::Decode(e.to_string()))?;
        if values.is_empty() {
            return Err(EmbeddingError::Shape("embedding has no values".to_string()));
        }
        Ok(Self(values))
    }
}

/// Validate a pair of blend weights.
///
/// Each weight must be finite and lie in `[0, 1]`, and at least one must be
/// positive so the normalization is defined. Checked at full request
/// precision so values just outside the range are not rounded into it.
pub fn validate_weights(weight1: f64, weight2: f64) -> Result<(), BlendError> {
    for weight in [weight1, weight2] {
        if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
            return Err(BlendError::InvalidWeights(format!(
                "weights must be between 0 and 1, got {}",
                weight
            )));
        }
    }
    if weight1 + weight2 <= 0.0 {
        return Err(BlendError::InvalidWeights(
            "at least one weight must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

/// Weighted average `(e1*w1 + e2*w2) / (w1 + w2)`.
///
/// Evaluated as `e1 + t*(e2 - e1)` with `t = w2 / (w1 + w2)`, which keeps the
/// result on the segment between the inputs and returns `e1` unchanged when
/// both inputs are equal.
pub fn blend(
    first: &Embedding,
    second: &Embedding,
    weight1: f64,
    weight2: f64,
) -> Result<Embedding, BlendError> {
    validate_weights(weight1, weight2)?;

    if first.shape() != second.shape() {
        return Err(BlendError::IncompatibleShapes {
            left: first.shape().to_vec(),
            right: second.shape().to_vec(),
        });
    }

    let t = (weight2 / (weight1 + weight2)) as f32;
    let blended = Zip::from(&first.0)
        .and(&second.0)
        .map_collect(|&a, &b| a + t * (b - a));

    Ok(Embedding(blended))
}
