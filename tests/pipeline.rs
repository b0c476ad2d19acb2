//! End-to-end tests for the streaming pipeline: chunk source in,
//! scheduled buffers and a WAV container out.

use std::io::Cursor;

use async_stream::stream;
use futures_util::stream::iter;
use vocalize_core::{
    decode, AudioFormat, MockOutput, RawChunk, SessionOutcome, SessionState, StreamError,
    StreamSession,
};

fn init_logs() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();
}

/// Build a chunk holding `n` 16-bit samples of a simple ramp.
fn chunk_of(n: usize) -> RawChunk {
    let mut pcm = Vec::with_capacity(n * 2);
    for i in 0..n {
        pcm.extend_from_slice(&((i % 100) as i16 * 300).to_le_bytes());
    }
    RawChunk::from_pcm(&pcm)
}

fn ok_chunks(chunks: Vec<RawChunk>) -> impl futures_core::Stream<Item = anyhow::Result<RawChunk>> {
    iter(chunks.into_iter().map(Ok))
}

#[tokio::test]
async fn three_chunks_play_gapless_and_mux_to_one_container() {
    init_logs();
    // 0.1 s, 0.2 s and 0.15 s of audio at 24 kHz.
    let chunks = vec![chunk_of(2400), chunk_of(4800), chunk_of(3600)];
    let total_bytes: u32 = (2400 + 4800 + 3600) * 2;

    let device = MockOutput::new();
    let mut session = StreamSession::new(device.clone(), AudioFormat::default());
    let outcome = session.run(ok_chunks(chunks)).await.unwrap();

    let submissions = device.submissions();
    assert_eq!(submissions.len(), 3);
    let t0 = submissions[0].start;
    assert!((submissions[1].start - (t0 + 0.1)).abs() < 1e-9);
    assert!((submissions[2].start - (t0 + 0.3)).abs() < 1e-9);

    match outcome {
        SessionOutcome::Completed { container, stats } => {
            assert_eq!(container.data_size(), total_bytes);
            assert_eq!(stats.chunks, 3);
            assert_eq!(stats.pcm_bytes, total_bytes as usize);
            assert!((stats.scheduled_secs - 0.45).abs() < 1e-9);
        }
        other => panic!("expected Completed, got {other:?}"),
    }
    assert_eq!(session.state(), SessionState::Completed);
}

#[tokio::test]
async fn stalled_consumer_resumes_at_now() {
    let device = MockOutput::new();
    let dev = device.clone();
    let source = stream! {
        yield Ok::<_, anyhow::Error>(chunk_of(2400));
        // Simulate the network going quiet long past the scheduled end.
        dev.advance(3.0);
        yield Ok(chunk_of(2400));
    };

    let mut session = StreamSession::new(device.clone(), AudioFormat::default());
    session.run(source).await.unwrap();

    let submissions = device.submissions();
    assert_eq!(submissions.len(), 2);
    assert_eq!(submissions[0].start, 0.0);
    assert_eq!(submissions[1].start, 3.0);
}

#[tokio::test]
async fn empty_stream_yields_explicit_empty_outcome() {
    let device = MockOutput::new();
    let mut session = StreamSession::new(device.clone(), AudioFormat::default());
    let outcome = session.run(ok_chunks(Vec::new())).await.unwrap();

    assert!(matches!(outcome, SessionOutcome::Empty));
    assert_eq!(session.state(), SessionState::Completed);
    assert!(device.submissions().is_empty());
}

#[tokio::test]
async fn upstream_error_fails_session_with_partial_container() {
    let source = iter(vec![
        Ok(chunk_of(2400)),
        Ok(chunk_of(2400)),
        Err(anyhow::anyhow!("synthesis backend disconnected")),
    ]);

    let device = MockOutput::new();
    let mut session = StreamSession::new(device.clone(), AudioFormat::default());
    let failure = session.run(source).await.unwrap_err();

    assert!(matches!(failure.error, StreamError::Upstream(_)));
    assert_eq!(failure.stats.chunks, 2);
    let partial = failure.partial.expect("partial container retained");
    assert_eq!(partial.data_size(), 2 * 2400 * 2);
    assert_eq!(session.state(), SessionState::Failed);
    // Whatever was scheduled before the failure stays scheduled.
    assert_eq!(device.submissions().len(), 2);
}

#[tokio::test]
async fn malformed_chunk_ends_streaming_but_keeps_accumulation() {
    let odd = RawChunk::from_pcm(&[1u8, 2, 3]);
    let source = ok_chunks(vec![chunk_of(2400), odd, chunk_of(2400)]);

    let device = MockOutput::new();
    let mut session = StreamSession::new(device.clone(), AudioFormat::default());
    let failure = session.run(source).await.unwrap_err();

    assert!(matches!(failure.error, StreamError::MalformedChunk(_)));
    let partial = failure.partial.expect("partial container retained");
    assert_eq!(partial.data_size(), 2400 * 2);
    // The chunk after the malformed one was never pulled into playback.
    assert_eq!(device.submissions().len(), 1);
}

#[tokio::test]
async fn malformed_first_chunk_leaves_no_partial() {
    let source = ok_chunks(vec![RawChunk::new("!!not base64!!")]);
    let mut session = StreamSession::new(MockOutput::new(), AudioFormat::default());
    let failure = session.run(source).await.unwrap_err();
    assert!(failure.partial.is_none());
}

#[tokio::test]
async fn device_rejection_does_not_abort_the_session() {
    let device = MockOutput::new();
    device.fail_next_submit();

    let mut session = StreamSession::new(device.clone(), AudioFormat::default());
    let outcome = session
        .run(ok_chunks(vec![chunk_of(2400), chunk_of(2400)]))
        .await
        .unwrap();

    // First buffer was dropped by the device, second still played, and the
    // container holds both chunks regardless.
    assert_eq!(device.submissions().len(), 1);
    assert_eq!(device.submissions()[0].start, 0.1);
    match outcome {
        SessionOutcome::Completed { container, .. } => {
            assert_eq!(container.data_size(), 2 * 2400 * 2);
        }
        other => panic!("expected Completed, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_chunks_are_skipped_but_counted() {
    let source = ok_chunks(vec![RawChunk::new(""), chunk_of(2400), RawChunk::new("")]);
    let device = MockOutput::new();
    let mut session = StreamSession::new(device.clone(), AudioFormat::default());
    let outcome = session.run(source).await.unwrap();

    assert_eq!(device.submissions().len(), 1);
    match outcome {
        SessionOutcome::Completed { container, stats } => {
            assert_eq!(stats.chunks, 3);
            assert_eq!(container.data_size(), 2400 * 2);
        }
        other => panic!("expected Completed, got {other:?}"),
    }
}

#[tokio::test]
async fn only_empty_chunks_yield_empty_outcome() {
    let source = ok_chunks(vec![RawChunk::new(""), RawChunk::new("")]);
    let mut session = StreamSession::new(MockOutput::new(), AudioFormat::default());
    let outcome = session.run(source).await.unwrap();
    assert!(matches!(outcome, SessionOutcome::Empty));
}

#[tokio::test]
async fn session_is_single_use() {
    let mut session = StreamSession::new(MockOutput::new(), AudioFormat::default());
    session.run(ok_chunks(vec![chunk_of(240)])).await.unwrap();

    let failure = session.run(ok_chunks(vec![chunk_of(240)])).await.unwrap_err();
    assert!(matches!(failure.error, StreamError::Upstream(_)));
}

#[tokio::test]
async fn dropping_a_session_halts_its_playback() {
    let device = MockOutput::new();
    {
        let mut session = StreamSession::new(device.clone(), AudioFormat::default());
        session.run(ok_chunks(vec![chunk_of(24_000)])).await.unwrap();
        assert!(!device.stopped());
    }
    assert!(device.stopped());
}

#[tokio::test]
async fn produced_container_parses_as_wav() {
    let chunks = vec![chunk_of(2400), chunk_of(1200)];
    let mut session = StreamSession::new(MockOutput::new(), AudioFormat::default());
    let outcome = session.run(ok_chunks(chunks)).await.unwrap();

    let container = match outcome {
        SessionOutcome::Completed { container, .. } => container,
        other => panic!("expected Completed, got {other:?}"),
    };

    let reader = hound::WavReader::new(Cursor::new(container.into_bytes())).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, 24_000);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(spec.sample_format, hound::SampleFormat::Int);
    assert_eq!(reader.len(), 3600);
}

#[tokio::test]
async fn container_samples_match_scheduled_audio() {
    // The bytes in the container and the floats handed to the device must
    // describe the same audio.
    let chunk = chunk_of(2400);
    let decoded = decode(&chunk).unwrap();

    let device = MockOutput::new();
    let mut session = StreamSession::new(device.clone(), AudioFormat::default());
    let outcome = session.run(ok_chunks(vec![chunk])).await.unwrap();

    assert_eq!(device.submissions()[0].samples, decoded.samples());
    match outcome {
        SessionOutcome::Completed { container, .. } => {
            assert_eq!(&container.as_bytes()[44..], decoded.pcm_bytes());
        }
        other => panic!("expected Completed, got {other:?}"),
    }
}
