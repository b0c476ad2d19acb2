//! Output device seam.
//!
//! The scheduler talks to anything implementing [`AudioOut`]: a clock plus
//! buffer submission. The default build ships only the trait and a mock;
//! the `playback` feature adds a rodio-backed device.

use crate::error::StreamError;

/// Audio output device contract.
///
/// The clock is monotonic and always advances in real time. Submission
/// reports success or failure and nothing else.
pub trait AudioOut {
    /// Current device clock time, in seconds.
    fn now(&self) -> f64;

    /// Queue `samples` to begin playing at `start` seconds on the device
    /// clock. `start` is never in the past when called by the scheduler.
    fn submit(&mut self, samples: Vec<f32>, start: f64) -> Result<(), StreamError>;

    /// Halt all pending buffers. Called when a session is stopped or
    /// dropped so a following session never overlaps its audio.
    fn stop(&mut self);
}

pub mod mock {
    //! Scriptable device for tests and headless hosts: manual clock,
    //! recorded submissions.

    use std::sync::{Arc, Mutex};

    use super::AudioOut;
    use crate::error::StreamError;

    /// One recorded call to [`AudioOut::submit`].
    #[derive(Debug, Clone, PartialEq)]
    pub struct Submission {
        pub start: f64,
        pub samples: Vec<f32>,
    }

    #[derive(Debug, Default)]
    struct MockState {
        clock: f64,
        submissions: Vec<Submission>,
        fail_next: bool,
        stopped: bool,
    }

    /// Test double for [`AudioOut`]. Cloning yields a handle onto the same
    /// device, so a test can keep one handle while the session owns another.
    #[derive(Debug, Clone, Default)]
    pub struct MockOutput {
        inner: Arc<Mutex<MockState>>,
    }

    impl MockOutput {
        pub fn new() -> Self {
            Self::default()
        }

        /// Move the device clock forward.
        pub fn advance(&self, secs: f64) {
            self.inner.lock().unwrap().clock += secs;
        }

        /// Make the next `submit` call fail with a device error.
        pub fn fail_next_submit(&self) {
            self.inner.lock().unwrap().fail_next = true;
        }

        pub fn submissions(&self) -> Vec<Submission> {
            self.inner.lock().unwrap().submissions.clone()
        }

        pub fn stopped(&self) -> bool {
            self.inner.lock().unwrap().stopped
        }
    }

    impl AudioOut for MockOutput {
        fn now(&self) -> f64 {
            self.inner.lock().unwrap().clock
        }

        fn submit(&mut self, samples: Vec<f32>, start: f64) -> Result<(), StreamError> {
            let mut state = self.inner.lock().unwrap();
            if state.fail_next {
                state.fail_next = false;
                return Err(StreamError::PlaybackDevice(
                    "mock device rejected buffer".to_string(),
                ));
            }
            state.submissions.push(Submission { start, samples });
            Ok(())
        }

        fn stop(&mut self) {
            self.inner.lock().unwrap().stopped = true;
        }
    }
}

#[cfg(feature = "playback")]
pub mod rodio_out {
    //! Rodio-backed output device.

    use std::time::Instant;

    use rodio::buffer::SamplesBuffer;
    use rodio::{OutputStream, Sink};

    use super::AudioOut;
    use crate::config::AudioFormat;
    use crate::error::StreamError;

    /// Real output device. A rodio [`Sink`] plays queued buffers strictly
    /// back-to-back, which is exactly the gapless contract; the scheduler's
    /// start times therefore only matter for its own cursor bookkeeping.
    pub struct RodioOutput {
        // Keeps the OS audio stream alive for the sink's lifetime.
        _stream: OutputStream,
        sink: Sink,
        epoch: Instant,
        format: AudioFormat,
    }

    impl RodioOutput {
        pub fn new(format: AudioFormat) -> Result<Self, StreamError> {
            let (stream, handle) = OutputStream::try_default()
                .map_err(|e| StreamError::PlaybackDevice(format!("no output device: {e}")))?;
            let sink = Sink::try_new(&handle)
                .map_err(|e| StreamError::PlaybackDevice(format!("cannot open sink: {e}")))?;
            Ok(Self {
                _stream: stream,
                sink,
                epoch: Instant::now(),
                format,
            })
        }
    }

    impl AudioOut for RodioOutput {
        fn now(&self) -> f64 {
            self.epoch.elapsed().as_secs_f64()
        }

        fn submit(&mut self, samples: Vec<f32>, _start: f64) -> Result<(), StreamError> {
            self.sink.append(SamplesBuffer::new(
                self.format.channels,
                self.format.sample_rate,
                samples,
            ));
            Ok(())
        }

        fn stop(&mut self) {
            self.sink.stop();
        }
    }
}
