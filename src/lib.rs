//! Streaming text-to-speech audio pipeline.
//!
//! A remote synthesis collaborator yields an ordered sequence of base64
//! chunks of 16-bit mono PCM (24 kHz by default). [`StreamSession`] pulls
//! that sequence exactly once and, per chunk: appends the raw PCM to an
//! accumulation buffer, decodes it to normalized floats, and schedules it
//! gaplessly on an output device. When the stream drains, the accumulation
//! is wrapped in a RIFF/WAVE container for replay or download.
//!
//! The collaborator is consumed as a `Stream<Item = anyhow::Result<RawChunk>>`;
//! awaiting the next chunk is the session's only suspension point. The
//! output device sits behind the [`AudioOut`] trait — tests and headless
//! hosts use [`MockOutput`], and the `playback` feature adds a rodio-backed
//! device.
//!
//! ```no_run
//! use futures_util::stream;
//! use vocalize_core::{AudioFormat, MockOutput, RawChunk, SessionOutcome, StreamSession};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let chunks = stream::iter(vec![Ok(RawChunk::from_pcm(&[0u8; 4800]))]);
//! let mut session = StreamSession::new(MockOutput::new(), AudioFormat::default());
//! if let SessionOutcome::Completed { container, .. } = session.run(chunks).await? {
//!     container.write_to("speech.wav")?;
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod decode;
mod device;
mod error;
mod schedule;
mod session;
mod voices;
mod wav;

pub use crate::config::{AudioFormat, DEFAULT_SAMPLE_RATE};
pub use crate::decode::{decode, pcm_to_f32, DecodedSamples, RawChunk};
pub use crate::device::mock::{MockOutput, Submission};
pub use crate::device::AudioOut;
pub use crate::error::StreamError;
pub use crate::schedule::{PlaybackScheduler, ScheduledBuffer};
pub use crate::session::{
    SessionFailure, SessionOutcome, SessionState, SessionStats, StreamSession,
};
pub use crate::voices::{builtin_voices, Gender, Language, VoiceInfo};
pub use crate::wav::{encode_f32, mux, AudioContainer};

#[cfg(feature = "playback")]
pub use crate::device::rodio_out::RodioOutput;
