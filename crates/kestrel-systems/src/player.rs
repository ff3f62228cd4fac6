//! The player ship: thrust, drag and weapons.
//!
//! # Acceleration model
//!
//! With unit thrust direction `u` (input clamped to length 1), acceleration
//! `a` and linear drag `k`, each step of `dt` seconds does
//!
//! ```text
//! v += (u * a - k * v) * dt
//! p += v * dt
//! ```
//!
//! From rest under constant thrust this converges to
//! `x(t) = a/k * t - a/k^2 * (1 - e^(-k t))` as `dt -> 0`.

use kestrel_system::{StepContext, System};

use crate::frame::{
    Frame, FrameInput, Owner, SpawnKind, SpawnRequest, FIRE_BLASTER, FIRE_MISSILE,
};
use crate::spawner::enqueue;

/// Thrust acceleration in m/s².
pub const ACCEL: f32 = 40.0;
/// Linear drag coefficient in 1/s.
pub const DRAG: f32 = 2.0;
/// Seconds between blaster shots.
pub const BLASTER_INTERVAL: f32 = 0.1;
/// Seconds between missile launches.
pub const MISSILE_INTERVAL: f32 = 0.5;
/// Blaster muzzle speed relative to the ship, m/s.
pub const BLASTER_SPEED: f32 = 60.0;
/// Missile launch speed relative to the ship, m/s.
pub const MISSILE_LAUNCH_SPEED: f32 = 10.0;

/// Moves the player and fires its weapons.
#[derive(Debug, Default)]
pub struct PlayerSystem;

impl System<Frame, FrameInput> for PlayerSystem {
    fn name(&self) -> &str {
        "player"
    }

    fn interpolate(&self, ctx: &mut StepContext<'_, Frame, FrameInput>) {
        let dt = ctx.dt;
        let thrust = ctx.input.movement.clamp_length_max(1.0);
        let ship = &mut ctx.next.player;
        ship.velocity += (thrust * ACCEL - ship.velocity * DRAG) * dt;
        ship.position += ship.velocity * dt;
        if thrust != glam::Vec2::ZERO {
            ship.heading = thrust.normalize();
        }
    }

    fn post_render(&self, ctx: &mut StepContext<'_, Frame, FrameInput>) {
        let dt = ctx.dt;
        let next = &mut *ctx.next;
        let ship = &mut next.player;
        ship.blaster_cooldown = (ship.blaster_cooldown - dt).max(0.0);
        ship.missile_cooldown = (ship.missile_cooldown - dt).max(0.0);

        let ship = next.player;
        if ctx.input.fires(FIRE_BLASTER) && ship.blaster_cooldown <= 0.0 {
            next.player.blaster_cooldown = BLASTER_INTERVAL;
            enqueue(
                &mut next.spawns,
                SpawnRequest {
                    kind: SpawnKind::Blaster,
                    position: ship.position,
                    velocity: ship.velocity + ship.heading * BLASTER_SPEED,
                    owner: Owner::Player,
                },
            );
        }
        if ctx.input.fires(FIRE_MISSILE) && ship.missile_cooldown <= 0.0 {
            next.player.missile_cooldown = MISSILE_INTERVAL;
            enqueue(
                &mut next.spawns,
                SpawnRequest {
                    kind: SpawnKind::Missile,
                    position: ship.position,
                    velocity: ship.velocity + ship.heading * MISSILE_LAUNCH_SPEED,
                    owner: Owner::Player,
                },
            );
        }
    }
}

/// Closed-form displacement after `t` seconds of unit thrust from rest.
pub fn displacement_from_rest(t: f32) -> f32 {
    ACCEL / DRAG * t - ACCEL / (DRAG * DRAG) * (1.0 - (-DRAG * t).exp())
}
