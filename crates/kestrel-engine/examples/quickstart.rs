//! Kestrel Quickstart: the reference shooter on a fixed-timestep scheduler.
//!
//! Demonstrates:
//!   1. Building an EngineConfig and a Scheduler around the reference pipeline
//!   2. Feeding uneven wall-clock frame deltas and reading the tick count
//!   3. Render interpolation between ticks
//!   4. Changing the time ratio
//!
//! Run with:
//!   cargo run --example quickstart

use std::time::Duration;

use glam::Vec2;
use kestrel_engine::{EngineConfig, Scheduler, TimeRatio};
use kestrel_systems::{reference_pipeline, Frame, FrameInput, FIRE_BLASTER};

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("=== Kestrel Quickstart ===\n");

    let config = EngineConfig::default();
    println!(
        "tick rate {} Hz (dt = {} s), workers = {}",
        config.tick_rate_hz,
        config.dt(),
        config.resolved_worker_count()
    );

    let mut scheduler: Scheduler<Frame, FrameInput> =
        Scheduler::new(Frame::new(42), reference_pipeline(), &config).unwrap();

    // Uneven display frames, roughly 60 Hz with jitter.
    let frames = [16, 17, 15, 33, 16, 8, 16, 17];
    let input = FrameInput::thrust(Vec2::new(1.0, 0.25)).with_fire(FIRE_BLASTER);

    println!("\n--- Real time ---");
    for ms in frames.iter().cycle().take(120) {
        let report = scheduler.advance(Duration::from_millis(*ms), &input);
        if scheduler.current().tick.0 % 50 < report.ticks_run as u64 {
            let render = scheduler.render_frame();
            println!(
                "tick {:>4}  ran {:>2}  alpha {:.2}  player ({:6.2}, {:6.2})  bolts {:>3}",
                scheduler.current().tick,
                report.ticks_run,
                report.alpha,
                render.player.position.x,
                render.player.position.y,
                scheduler.current().blasters.len(),
            );
        }
    }

    println!("\n--- Half speed ---");
    scheduler
        .set_time_ratio(TimeRatio::new(1, 2))
        .unwrap();
    let before = scheduler.current().tick;
    for _ in 0..60 {
        scheduler.advance(Duration::from_millis(16), &input);
    }
    println!(
        "60 frames of 16 ms ran {} ticks at ratio {}",
        scheduler.current().tick.0 - before.0,
        scheduler.time_ratio()
    );

    println!(
        "\nscore {}  enemies {}  particles {}",
        scheduler.current().score,
        scheduler.current().spaceships.len(),
        scheduler.current().particles.len()
    );
}
