use thiserror::Error;

/// Errors produced by the streaming audio pipeline.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The chunk payload could not be base64-decoded, or its decoded byte
    /// length is odd (a partial 16-bit sample). A malformed chunk is assumed
    /// to mean the stream is desynchronized, so it ends the session's
    /// streaming phase.
    #[error("malformed chunk: {0}")]
    MalformedChunk(String),

    /// The output device is unavailable or rejected a scheduled buffer.
    /// Non-fatal: the session logs it and keeps streaming.
    #[error("playback device error: {0}")]
    PlaybackDevice(String),

    /// The stream finished without a single byte of audio accumulated.
    /// No container is produced in this case.
    #[error("no audio produced: the stream ended before any chunk arrived")]
    EmptyStream,

    /// Opaque failure from the upstream synthesis collaborator (network,
    /// auth, ...). Never retried here.
    #[error("upstream error: {0}")]
    Upstream(#[from] anyhow::Error),
}
