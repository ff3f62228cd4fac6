//! Recording to disk and replaying from disk through the scheduler.

use std::fs;
use std::time::Duration;

use kestrel_core::{Encode, TickId};
use kestrel_engine::{DesyncPolicy, EngineConfig, ManualClock, ReplayStatus, Scheduler};
use kestrel_replay::{
    frames_path, read_snapshot, DifferenceReader, DifferenceStreamHeader, ReplayError,
};
use kestrel_test_utils::{AddStep, CounterFrame, CounterInput};

type Sched = Scheduler<CounterFrame, CounterInput, ManualClock>;
type Header = DifferenceStreamHeader<CounterFrame, CounterInput>;

const TICK: Duration = Duration::from_millis(4);

fn sched() -> Sched {
    let config = EngineConfig {
        worker_count: Some(0),
        desync_policy: DesyncPolicy::Report,
        ..EngineConfig::default()
    };
    Scheduler::with_clock(
        CounterFrame::at(0),
        vec![Box::new(AddStep)],
        &config,
        ManualClock::new(),
    )
    .unwrap()
}

fn record(path: &std::path::Path) -> CounterFrame {
    let mut s = sched();
    s.start_recording();
    for step in [1, 1, 1, 4, 4, 2, 2, 2, 2, 9] {
        s.advance(TICK, &CounterInput::new(step));
    }
    assert!(s.save_recording(path).unwrap());
    assert!(!s.is_recording());
    *s.current()
}

#[test]
fn saved_recording_replays_in_sync() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.replay");
    let end = record(&path);
    assert!(frames_path(&path).exists());

    let mut replay = sched();
    // Unrelated state first: attaching resets to the recording's start.
    replay.advance(TICK * 3, &CounterInput::new(50));
    assert!(replay.load_replay(&path));
    assert_eq!(replay.current().tick, TickId(0));

    let report = replay.advance(TICK * 10, &CounterInput::new(77));
    assert_eq!(report.replay, ReplayStatus::Playing);
    assert_eq!(*replay.current(), end);

    let report = replay.advance(TICK, &CounterInput::new(77));
    assert_eq!(report.replay, ReplayStatus::Finished { desync: None });
    assert!(replay.last_desync().is_none());
}

#[test]
fn truncated_frames_file_is_not_attached() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.replay");
    record(&path);

    let frames = frames_path(&path);
    let bytes = fs::read(&frames).unwrap();
    fs::write(&frames, &bytes[..bytes.len() - 1]).unwrap();

    let mut s = sched();
    s.advance(TICK * 2, &CounterInput::new(3));
    assert!(!s.load_replay(&path));
    assert!(!s.is_replaying());
    assert_eq!(s.current().total, 6, "simulation untouched");
}

#[test]
fn missing_files_are_not_attached() {
    let dir = tempfile::tempdir().unwrap();
    let mut s = sched();
    assert!(!s.load_replay(&dir.path().join("nope.replay")));
    assert!(!s.load_state(&dir.path().join("nope.sav")));
}

#[test]
fn save_recording_without_recording_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.replay");
    let mut s = sched();
    assert!(!s.save_recording(&path).unwrap());
    assert!(!path.exists());
}

/// Rewrite the leading version field as if another build had saved the file.
fn stamp_foreign_version(path: &std::path::Path) -> u64 {
    let foreign = Header::VERSION ^ 0x5a5a;
    let mut bytes = fs::read(path).unwrap();
    bytes[..8].copy_from_slice(&(foreign as i64).to_bytes());
    fs::write(path, bytes).unwrap();
    foreign
}

#[test]
fn replay_from_another_layout_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("old.replay");
    record(&path);
    let foreign = stamp_foreign_version(&path);

    match DifferenceReader::<CounterFrame, CounterInput>::open(&path) {
        Err(ReplayError::VersionMismatch { found, expected }) => {
            assert_eq!(found, foreign);
            assert_eq!(expected, Header::VERSION);
        }
        Err(other) => panic!("expected version mismatch, got {other}"),
        Ok(_) => panic!("stale replay was accepted"),
    }

    let mut s = sched();
    s.advance(TICK * 2, &CounterInput::new(3));
    let before = *s.current();
    assert!(!s.load_replay(&path));
    assert!(!s.is_replaying());
    assert_eq!(*s.current(), before);
}

#[test]
fn snapshot_from_another_layout_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("old.sav");
    let mut saver = sched();
    saver.advance(TICK * 5, &CounterInput::new(2));
    saver.save_state(&path).unwrap();
    let foreign = stamp_foreign_version(&path);

    let err = read_snapshot::<CounterFrame, CounterInput>(&path).unwrap_err();
    assert!(
        matches!(err, ReplayError::VersionMismatch { found, .. } if found == foreign),
        "{err}"
    );

    let mut s = sched();
    s.advance(TICK, &CounterInput::new(8));
    let before = *s.current();
    assert!(!s.load_state(&path));
    assert_eq!(*s.current(), before);
    assert_eq!(s.current().tick, TickId(1));
}
