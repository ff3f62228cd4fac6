//! Reference game world for the Kestrel simulation core.
//!
//! A small top-down space shooter that exercises every part of the core:
//! dense swap-remove pools, sparse handle pools with keep-alive, a spawn
//! queue, fork-join passes, per-tick seeded randomness, and record/replay
//! through [`Frame`] and [`FrameInput`].
//!
//! # Pipeline order (each tick)
//!
//! 1. [`CameraSystem`]: Global. Visible rectangle around the player.
//! 2. [`PlayerSystem`]: Interpolate (thrust/drag), PostRender (fire).
//! 3. [`MissileSystem`]: Interpolate, PostRender (homing, bucketed), Collide, Destroy.
//! 4. [`BlasterSystem`]: Interpolate, Collide, Destroy.
//! 5. [`SpaceshipSystem`]: Interpolate, PostRender (steering, bucketed), Collide, Destroy.
//! 6. [`Effects`]: Interpolate (debris), Destroy (lights, debris, sounds).
//! 7. [`Spawner`]: Spawn. Commits the queue.
//!
//! Projectiles resolve damage before [`SpaceshipSystem`] checks for kills,
//! so a ship destroyed this tick explodes this tick.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod blasters;
pub mod camera;
pub mod effects;
pub mod frame;
pub mod missiles;
pub mod player;
pub mod rng;
pub mod spaceships;
pub mod spawner;

use kestrel_system::System;

pub use blasters::BlasterSystem;
pub use camera::CameraSystem;
pub use effects::{keep_alive, Effects};
pub use frame::{
    Blaster, Camera, Frame, FrameInput, Lifetime, Light, Missile, Owner, Particle, Ship, Sound,
    SoundKind, Spaceship, SpawnKind, SpawnRequest, FIRE_BLASTER, FIRE_MISSILE,
};
pub use missiles::MissileSystem;
pub use player::PlayerSystem;
pub use spaceships::SpaceshipSystem;
pub use spawner::{enqueue, Spawner};

/// The full system list in execution order.
pub fn reference_pipeline() -> Vec<Box<dyn System<Frame, FrameInput>>> {
    vec![
        Box::new(CameraSystem),
        Box::new(PlayerSystem),
        Box::new(MissileSystem),
        Box::new(BlasterSystem),
        Box::new(SpaceshipSystem),
        Box::new(Effects),
        Box::new(Spawner),
    ]
}
