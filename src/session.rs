//! One generation session: pulls the collaborator's chunk sequence,
//! plays it as it arrives, and assembles the full container at the end.

use futures_core::Stream;
use futures_util::{pin_mut, StreamExt};
use tracing::{info, warn};

use crate::config::AudioFormat;
use crate::decode;
use crate::decode::RawChunk;
use crate::device::AudioOut;
use crate::error::StreamError;
use crate::schedule::PlaybackScheduler;
use crate::wav::{self, AudioContainer};

/// Lifecycle of a session. Sessions are single-use: once `Completed` or
/// `Failed`, no further chunks are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Streaming,
    Finalizing,
    Completed,
    Failed,
}

/// Totals observed while streaming.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SessionStats {
    /// Chunks pulled from the collaborator (empty ones included).
    pub chunks: usize,
    /// Raw PCM bytes accumulated for the container.
    pub pcm_bytes: usize,
    /// Seconds of audio handed to the scheduler.
    pub scheduled_secs: f64,
}

/// How a session that drained its stream ended up.
#[derive(Debug)]
pub enum SessionOutcome {
    /// The accumulation was muxed into a container.
    Completed {
        container: AudioContainer,
        stats: SessionStats,
    },
    /// The stream finished without producing any audio. No container is
    /// built for this case.
    Empty,
}

/// A failed session. Chunks accumulated before the error are still muxed,
/// so the caller can keep the partial result.
#[derive(Debug)]
pub struct SessionFailure {
    pub error: StreamError,
    pub partial: Option<AudioContainer>,
    pub stats: SessionStats,
}

impl std::fmt::Display for SessionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "session failed: {}", self.error)
    }
}

impl std::error::Error for SessionFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Orchestrates one request: owns the output device (via its scheduler),
/// the playback cursor and the append-only chunk accumulation.
///
/// The device is held exclusively for the session's lifetime; dropping the
/// session halts whatever is still scheduled, so starting a fresh session
/// on a new device handle can never overlap audio with an old one.
pub struct StreamSession<O: AudioOut> {
    format: AudioFormat,
    scheduler: PlaybackScheduler<O>,
    accumulated: Vec<Vec<u8>>,
    stats: SessionStats,
    state: SessionState,
}

impl<O: AudioOut> StreamSession<O> {
    /// Takes exclusive ownership of `device` for this session.
    pub fn new(device: O, format: AudioFormat) -> Self {
        Self {
            format,
            scheduler: PlaybackScheduler::new(device, format.sample_rate),
            accumulated: Vec::new(),
            stats: SessionStats::default(),
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Consume the collaborator's chunk sequence to completion.
    ///
    /// Each chunk is accumulated, decoded and scheduled in arrival order;
    /// the only suspension point is awaiting the next chunk. An upstream
    /// error or a malformed chunk ends streaming with a [`SessionFailure`]
    /// carrying the partial container; device trouble is logged and
    /// streaming continues.
    pub async fn run<S>(&mut self, source: S) -> Result<SessionOutcome, SessionFailure>
    where
        S: Stream<Item = anyhow::Result<RawChunk>>,
    {
        if self.state != SessionState::Idle {
            // Single-use: a finished session keeps its state and never
            // accepts further chunks.
            return Err(SessionFailure {
                error: StreamError::Upstream(anyhow::anyhow!(
                    "session is single-use; start a new session for a new generation"
                )),
                partial: None,
                stats: self.stats,
            });
        }
        self.state = SessionState::Streaming;
        info!(sample_rate = self.format.sample_rate, "session streaming");

        pin_mut!(source);
        while let Some(next) = source.next().await {
            let chunk = match next {
                Ok(chunk) => chunk,
                Err(e) => return Err(self.fail(StreamError::Upstream(e))),
            };
            if let Err(e) = self.ingest(chunk) {
                return Err(self.fail(e));
            }
        }

        self.finalize()
    }

    /// Accumulate, decode and schedule one chunk.
    fn ingest(&mut self, chunk: RawChunk) -> Result<(), StreamError> {
        let decoded = decode::decode(&chunk)?;
        let (pcm, samples) = decoded.into_parts();

        self.stats.chunks += 1;
        self.stats.pcm_bytes += pcm.len();
        self.accumulated.push(pcm);

        match self.scheduler.schedule(samples) {
            Ok(Some(buffer)) => self.stats.scheduled_secs += buffer.duration,
            Ok(None) => {}
            // A rejected buffer is not fatal; accumulation and later
            // chunks continue.
            Err(e) => warn!("{e}"),
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<SessionOutcome, SessionFailure> {
        self.state = SessionState::Finalizing;

        if self.stats.pcm_bytes == 0 {
            self.state = SessionState::Completed;
            info!("session completed without audio");
            return Ok(SessionOutcome::Empty);
        }

        match wav::mux(&self.accumulated, self.format) {
            Ok(container) => {
                self.state = SessionState::Completed;
                info!(
                    chunks = self.stats.chunks,
                    secs = container.duration_secs(),
                    "session completed"
                );
                Ok(SessionOutcome::Completed {
                    container,
                    stats: self.stats,
                })
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    fn fail(&mut self, error: StreamError) -> SessionFailure {
        self.state = SessionState::Failed;
        warn!("session failed: {error}");
        SessionFailure {
            error,
            partial: wav::mux(&self.accumulated, self.format).ok(),
            stats: self.stats,
        }
    }

    /// Halt all of this session's pending playback. Also runs on drop.
    pub fn stop(&mut self) {
        self.scheduler.stop();
    }
}

impl<O: AudioOut> Drop for StreamSession<O> {
    fn drop(&mut self) {
        self.scheduler.stop();
    }
}
