//! Chunk decoding: base64 payload -> raw PCM bytes -> normalized floats.

use base64::{engine::general_purpose, Engine as _};

use crate::error::StreamError;

/// One opaque audio payload as handed over by the synthesis collaborator:
/// base64 text wrapping 16-bit signed little-endian mono PCM.
///
/// Chunks are immutable and their arrival order is significant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawChunk(String);

impl RawChunk {
    pub fn new(payload: impl Into<String>) -> Self {
        Self(payload.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Base64-encode raw PCM bytes into a chunk, the inverse of [`decode`].
    /// Mostly useful for hosts that already hold raw PCM (and for tests).
    pub fn from_pcm(pcm: &[u8]) -> Self {
        Self(general_purpose::STANDARD.encode(pcm))
    }
}

impl From<String> for RawChunk {
    fn from(payload: String) -> Self {
        Self(payload)
    }
}

impl From<&str> for RawChunk {
    fn from(payload: &str) -> Self {
        Self(payload.to_string())
    }
}

/// A decoded chunk: the raw little-endian PCM bytes (kept for container
/// assembly) and the same audio as normalized floats in [-1.0, 1.0]
/// (handed to the playback scheduler).
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedSamples {
    pcm: Vec<u8>,
    samples: Vec<f32>,
}

impl DecodedSamples {
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn pcm_bytes(&self) -> &[u8] {
        &self.pcm
    }

    /// Number of 16-bit samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn into_parts(self) -> (Vec<u8>, Vec<f32>) {
        (self.pcm, self.samples)
    }
}

/// Decode one chunk. Pure; safe to call concurrently on independent chunks.
///
/// Fails with [`StreamError::MalformedChunk`] if the payload is not valid
/// base64 or decodes to an odd number of bytes.
pub fn decode(chunk: &RawChunk) -> Result<DecodedSamples, StreamError> {
    let pcm = general_purpose::STANDARD
        .decode(chunk.as_str())
        .map_err(|e| StreamError::MalformedChunk(format!("payload is not valid base64: {e}")))?;

    if pcm.len() % 2 != 0 {
        return Err(StreamError::MalformedChunk(format!(
            "{} bytes is not a whole number of 16-bit samples",
            pcm.len()
        )));
    }

    let samples = pcm_to_f32(&pcm);
    Ok(DecodedSamples { pcm, samples })
}

/// Reinterpret little-endian signed 16-bit PCM as floats in [-1.0, 1.0].
pub fn pcm_to_f32(pcm: &[u8]) -> Vec<f32> {
    pcm.chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / 32768.0)
        .collect()
}
