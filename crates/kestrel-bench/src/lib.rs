//! Benchmark profiles for the Kestrel simulation core.
//!
//! - [`crowded_frame`]: a frame with a full enemy pool, for steering cost
//! - [`scripted_input`]: a deterministic input stream that fires and turns
//! - [`reference_engine`]: the reference pipeline on a given worker count

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use glam::Vec2;
use kestrel_engine::{ConfigError, EngineConfig, TickEngine};
use kestrel_systems::frame::MAX_SPACESHIPS;
use kestrel_systems::spawner::SPACESHIP_HEALTH;
use kestrel_systems::{
    reference_pipeline, Frame, FrameInput, Spaceship, FIRE_BLASTER, FIRE_MISSILE,
};

/// A frame whose enemy pool is full, ships laid out on a loose grid around
/// the player so separation forces are non-trivial.
pub fn crowded_frame(seed: u64) -> Frame {
    let mut frame = Frame::new(seed);
    for i in 0..MAX_SPACESHIPS {
        let (row, col) = ((i / 8) as f32, (i % 8) as f32);
        frame.spaceships.push(Spaceship {
            position: Vec2::new(col * 3.0 - 12.0, row * 3.0 + 15.0),
            health: SPACESHIP_HEALTH,
            fire_cooldown: 1.0 + (i % 5) as f32 * 0.2,
            ..Spaceship::default()
        });
    }
    frame
}

/// Input for tick `t`: slow circles with intermittent fire.
pub fn scripted_input(t: u64) -> FrameInput {
    let angle = t as f32 * 0.01;
    let mut fire = 0;
    if t % 60 < 20 {
        fire |= FIRE_BLASTER;
    }
    if t % 500 == 0 {
        fire |= FIRE_MISSILE;
    }
    FrameInput::thrust(Vec2::from_angle(angle)).with_fire(fire)
}

/// Tick engine on the reference pipeline.
pub fn reference_engine(
    initial: Frame,
    workers: usize,
) -> Result<TickEngine<Frame, FrameInput>, ConfigError> {
    let config = EngineConfig {
        worker_count: Some(workers),
        bucket_hint: 8,
        ..EngineConfig::default()
    };
    TickEngine::new(initial, reference_pipeline(), &config)
}
