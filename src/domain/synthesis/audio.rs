use super::error::SynthesisError;
use crate::infrastructure::repositories::SegmentStream;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures_util::StreamExt;
use std::io::Cursor;

/// Drain a segment stream, concatenating the audio of every non-empty segment
/// in generation order.
///
/// Fails when the model errors mid-stream or yields no audio at all.
pub async fn collect_segments(mut segments: SegmentStream) -> Result<Vec<f32>, SynthesisError> {
    let mut samples = Vec::new();
    let mut total = 0usize;
    let mut skipped = 0usize;

    while let Some(segment) = segments.next().await {
        let segment = segment.map_err(|e| SynthesisError::Failed(e.to_string()))?;
        total += 1;
        if segment.samples.is_empty() {
            skipped += 1;
            tracing::debug!(graphemes = %segment.graphemes, "Skipping segment without audio");
            continue;
        }
        samples.extend_from_slice(&segment.samples);
    }

    if samples.is_empty() {
        return Err(SynthesisError::Failed(format!(
            "model produced no audio ({} segments)",
            total
        )));
    }

    tracing::debug!(
        segments = total,
        skipped,
        samples = samples.len(),
        "Collected audio segments"
    );

    Ok(samples)
}

/// Encode mono f32 samples in `[-1, 1]` as a 16-bit PCM WAV file
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>, SynthesisError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)
            .map_err(|e| SynthesisError::Encoding(e.to_string()))?;
        for &sample in samples {
            // f32 [-1, 1] → i16
            let s = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
            writer
                .write_sample(s)
                .map_err(|e| SynthesisError::Encoding(e.to_string()))?;
        }
        writer
            .finalize()
            .map_err(|e| SynthesisError::Encoding(e.to_string()))?;
    }

    Ok(cursor.into_inner())
}

pub fn to_data_uri(wav: &[u8]) -> String {
    format!("data:audio/wav;base64,{}", STANDARD.encode(wav))
}
