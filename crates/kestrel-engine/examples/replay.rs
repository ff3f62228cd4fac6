//! Kestrel Replay: recording a session and reproducing it bit for bit.
//!
//! Demonstrates:
//!   1. Recording live input with the scheduler's difference writer
//!   2. Saving the recording to a primary file plus its `.frames` sibling
//!   3. Replaying the files into a fresh scheduler, ignoring live input
//!   4. Checking the replay's end state against the saved one
//!   5. Saving and restoring a single state
//!
//! Run with:
//!   cargo run --example replay

use std::time::Duration;

use glam::Vec2;
use kestrel_engine::{DesyncPolicy, EngineConfig, ManualClock, ReplayStatus, Scheduler};
use kestrel_replay::{frame_hash, DifferenceReader};
use kestrel_systems::{reference_pipeline, Frame, FrameInput, FIRE_BLASTER, FIRE_MISSILE};

const FRAMES: u64 = 600;
const FRAME: Duration = Duration::from_millis(16);

fn scheduler(config: &EngineConfig) -> Scheduler<Frame, FrameInput, ManualClock> {
    Scheduler::with_clock(
        Frame::new(2024),
        reference_pipeline(),
        config,
        ManualClock::new(),
    )
    .unwrap()
}

/// Pilot input for display frame `n`: sweep left and right, fire in bursts.
fn pilot(n: u64) -> FrameInput {
    let x = if (n / 90) % 2 == 0 { 1.0 } else { -1.0 };
    let mut fire = 0;
    if n % 40 < 10 {
        fire |= FIRE_BLASTER;
    }
    if n % 150 == 0 {
        fire |= FIRE_MISSILE;
    }
    FrameInput::thrust(Vec2::new(x, 0.3)).with_fire(fire)
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    println!("=== Kestrel Replay Demo ===\n");

    let dir = std::env::temp_dir().join("kestrel-replay-demo");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("session.replay");

    let config = EngineConfig {
        desync_policy: DesyncPolicy::Report,
        ..EngineConfig::default()
    };

    // --- Phase 1: Record ---
    println!("--- Phase 1: Record ---");
    let mut live = scheduler(&config);
    live.start_recording();
    for n in 0..FRAMES {
        live.advance(FRAME, &pilot(n));
    }
    let end_hash = frame_hash(live.current());
    println!(
        "recorded {} ticks, score {}, end hash {end_hash:#018x}",
        live.current().tick,
        live.current().score
    );
    live.save_recording(&path).unwrap();

    // --- Phase 2: Inspect ---
    println!("\n--- Phase 2: Inspect ---");
    let reader = DifferenceReader::<Frame, FrameInput>::open(&path).unwrap();
    println!(
        "{} input changes logged, start tick {}, end tick {}",
        reader.difference_count(),
        reader.saved_start().map(|f| f.tick.0).unwrap_or_default(),
        reader.saved_end().map(|f| f.tick.0).unwrap_or_default(),
    );

    // --- Phase 3: Replay ---
    println!("\n--- Phase 3: Replay ---");
    let mut replay = scheduler(&config);
    replay.attach_replay(reader);
    let mut frames = 0;
    loop {
        frames += 1;
        let report = replay.advance(FRAME, &FrameInput::default());
        match report.replay {
            ReplayStatus::Playing => continue,
            ReplayStatus::Finished { desync: None } => {
                println!("replay matched after {frames} frames");
                break;
            }
            ReplayStatus::Finished {
                desync: Some(report),
            } => {
                println!("{report}");
                break;
            }
            ReplayStatus::Inactive => {
                println!("replay did not load");
                break;
            }
        }
    }

    // --- Phase 4: Save state ---
    println!("\n--- Phase 4: Save state ---");
    let state = dir.join("checkpoint.state");
    live.save_state(&state).unwrap();
    let mut restored = scheduler(&config);
    assert!(restored.load_state(&state));
    println!(
        "restored tick {} with hash {:#018x}",
        restored.current().tick,
        frame_hash(restored.current())
    );
}
