use super::clock::PlayClock;
use super::*;
use crate::error::PlaybackError;
use std::path::Path;
use std::time::{Duration, Instant};

#[test]
fn clock_accumulates_across_pauses() {
    let t0 = Instant::now();
    let mut clock = PlayClock::default();
    assert_eq!(clock.elapsed_at(t0), Duration::ZERO);

    clock.start_at(t0);
    assert_eq!(clock.elapsed_at(t0 + Duration::from_secs(2)), Duration::from_secs(2));
    clock.pause_at(t0 + Duration::from_secs(3));
    assert_eq!(clock.elapsed_at(t0 + Duration::from_secs(10)), Duration::from_secs(3));

    clock.start_at(t0 + Duration::from_secs(10));
    assert_eq!(clock.elapsed_at(t0 + Duration::from_secs(12)), Duration::from_secs(5));
}

#[test]
fn clock_reset_keeps_running_state() {
    let t0 = Instant::now();
    let mut clock = PlayClock::default();
    clock.start_at(t0);
    clock.reset_to(Duration::from_secs(30), t0 + Duration::from_secs(1));
    assert_eq!(clock.elapsed_at(t0 + Duration::from_secs(3)), Duration::from_secs(32));

    clock.pause_at(t0 + Duration::from_secs(3));
    clock.reset_to(Duration::ZERO, t0 + Duration::from_secs(4));
    assert_eq!(clock.elapsed_at(t0 + Duration::from_secs(9)), Duration::ZERO);
}

#[test]
fn null_backend_rejects_playback() {
    let mut b = NullBackend::new("no device in test");
    assert!(matches!(
        b.load_and_play(Path::new("a.mp3")),
        Err(PlaybackError::NoDevice(_))
    ));
    assert_eq!(b.position(), Duration::ZERO);
    assert!(b.resume().is_err());
    assert!(!b.take_finished());
    assert_eq!(b.duration(), None);
}

#[test]
fn probe_reports_open_and_decode_failures() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        RodioProbe.probe(&dir.path().join("missing.mp3")),
        Err(PlaybackError::Open { .. })
    ));

    let junk = dir.path().join("junk.mp3");
    std::fs::write(&junk, b"definitely not audio").unwrap();
    assert!(matches!(
        RodioProbe.probe(&junk),
        Err(PlaybackError::Decode { .. })
    ));
}
