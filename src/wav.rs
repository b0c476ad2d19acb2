//! RIFF/WAVE container assembly.

use std::io;
use std::path::Path;

use base64::{engine::general_purpose, Engine as _};

use crate::config::AudioFormat;
use crate::error::StreamError;

const HEADER_LEN: usize = 44;

/// A complete WAVE file: the fixed 44-byte header followed by raw
/// little-endian PCM. Produced once, at stream completion, and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioContainer {
    bytes: Vec<u8>,
    format: AudioFormat,
}

impl AudioContainer {
    /// The full file image, header included.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Byte length of the PCM data region (the header's data-size field).
    pub fn data_size(&self) -> u32 {
        (self.bytes.len() - HEADER_LEN) as u32
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    /// Playback duration of the contained audio, in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.data_size() as f64 / self.format.byte_rate() as f64
    }

    /// Write the file to disk.
    pub fn write_to(&self, path: impl AsRef<Path>) -> io::Result<()> {
        std::fs::write(path, &self.bytes)
    }

    /// Base64 of the full file, for hosts that ship audio over JSON.
    pub fn to_base64(&self) -> String {
        general_purpose::STANDARD.encode(&self.bytes)
    }
}

/// Wrap ordered raw PCM chunks in a single WAVE container.
///
/// Deterministic: the same chunk sequence and format always produce
/// byte-identical output. Fails with [`StreamError::EmptyStream`] when the
/// chunks hold no audio at all; no zero-length file is ever emitted.
pub fn mux(chunks: &[Vec<u8>], format: AudioFormat) -> Result<AudioContainer, StreamError> {
    let data_size: usize = chunks.iter().map(|c| c.len()).sum();
    if data_size == 0 {
        return Err(StreamError::EmptyStream);
    }

    let mut out = Vec::with_capacity(HEADER_LEN + data_size);

    // RIFF header
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_size as u32).to_le_bytes());
    out.extend_from_slice(b"WAVE");

    // fmt chunk
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes()); // fmt chunk size
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&format.channels.to_le_bytes());
    out.extend_from_slice(&format.sample_rate.to_le_bytes());
    out.extend_from_slice(&format.byte_rate().to_le_bytes());
    out.extend_from_slice(&format.block_align().to_le_bytes());
    out.extend_from_slice(&format.bits_per_sample.to_le_bytes());

    // data chunk
    out.extend_from_slice(b"data");
    out.extend_from_slice(&(data_size as u32).to_le_bytes());
    for chunk in chunks {
        out.extend_from_slice(chunk);
    }

    Ok(AudioContainer { bytes: out, format })
}

/// Clamp normalized f32 samples to 16-bit PCM and wrap them in a container.
///
/// Lets a host turn scheduler buffers (or any synthesized float audio) back
/// into the same file format the session exports.
pub fn encode_f32(samples: &[f32], format: AudioFormat) -> Result<AudioContainer, StreamError> {
    let mut pcm = Vec::with_capacity(samples.len() * 2);
    for &s in samples {
        let v = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        pcm.extend_from_slice(&v.to_le_bytes());
    }
    mux(&[pcm], format)
}
