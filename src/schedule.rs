//! Gapless forward scheduling of decoded chunks onto an output device.

use tracing::debug;

use crate::device::AudioOut;
use crate::error::StreamError;

/// Start time and duration of one submitted buffer, in seconds on the
/// device clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledBuffer {
    pub start: f64,
    pub duration: f64,
}

impl ScheduledBuffer {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// Maintains the playback cursor for one session and submits each decoded
/// chunk with no gap and no overlap after the previous one.
///
/// The cursor is the earliest time the next buffer may start. It only ever
/// moves forward: clamped up to "now" when the consumer has fallen behind,
/// then advanced by each scheduled chunk's duration.
pub struct PlaybackScheduler<O> {
    device: O,
    sample_rate: u32,
    next_start: f64,
}

impl<O: AudioOut> PlaybackScheduler<O> {
    /// Takes exclusive ownership of the device; the cursor is seeded to the
    /// device clock's current time.
    pub fn new(device: O, sample_rate: u32) -> Self {
        let next_start = device.now();
        Self {
            device,
            sample_rate,
            next_start,
        }
    }

    /// Current cursor position, in seconds on the device clock.
    pub fn next_start(&self) -> f64 {
        self.next_start
    }

    /// Schedule one chunk of decoded samples. Returns `Ok(None)` for an
    /// empty chunk (nothing submitted, cursor unchanged).
    ///
    /// The cursor advances even when the device rejects the buffer, so a
    /// dropped buffer plays back as silence instead of shifting every later
    /// chunk earlier.
    pub fn schedule(&mut self, samples: Vec<f32>) -> Result<Option<ScheduledBuffer>, StreamError> {
        if samples.is_empty() {
            return Ok(None);
        }

        let now = self.device.now();
        if self.next_start < now {
            // Consumer stalled past the end of scheduled audio; resume
            // immediately rather than queueing a backlog of silence.
            self.next_start = now;
        }

        let scheduled = ScheduledBuffer {
            start: self.next_start,
            duration: samples.len() as f64 / self.sample_rate as f64,
        };
        self.next_start = scheduled.end();

        self.device.submit(samples, scheduled.start)?;
        debug!(
            start = scheduled.start,
            duration = scheduled.duration,
            "scheduled chunk"
        );
        Ok(Some(scheduled))
    }

    /// Halt all pending buffers on the device.
    pub fn stop(&mut self) {
        self.device.stop();
    }
}
