// Audio format configuration shared by the decoder, scheduler and muxer.

use serde::{Deserialize, Serialize};

/// Sample rate the synthesis collaborator emits (16-bit mono PCM).
pub const DEFAULT_SAMPLE_RATE: u32 = 24_000;

/// PCM stream parameters for one session.
///
/// The collaborator's format is fixed (mono, 16-bit, 24 kHz), so
/// [`AudioFormat::default`] is what almost every caller wants; the fields
/// stay configurable for hosts that front a different synthesis service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioFormat {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            channels: 1,
            bits_per_sample: 16,
        }
    }
}

impl AudioFormat {
    /// Read overrides from `SAMPLE_RATE` / `CHANNELS` / `BITS_PER_SAMPLE`
    /// environment variables, falling back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let sample_rate = std::env::var("SAMPLE_RATE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.sample_rate);

        let channels = std::env::var("CHANNELS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.channels);

        let bits_per_sample = std::env::var("BITS_PER_SAMPLE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.bits_per_sample);

        Self {
            sample_rate,
            channels,
            bits_per_sample,
        }
    }

    /// Bytes per sample frame across all channels.
    pub fn block_align(&self) -> u16 {
        self.channels * (self.bits_per_sample / 8)
    }

    /// Bytes of PCM per second of audio.
    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * self.block_align() as u32
    }

    /// Playback duration in seconds of `sample_count` per-channel samples.
    pub fn duration_secs(&self, sample_count: usize) -> f64 {
        sample_count as f64 / self.sample_rate as f64
    }
}
