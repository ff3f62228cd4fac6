//! Lights, debris and sounds: the sparse, handle-addressed pools.
//!
//! Lights are owned by other entities and survive only while their owner
//! re-adds them every tick. Debris expires on a timer. Sounds live for a
//! fixed number of ticks so the audio manager sees each one at least once.

use glam::Vec2;
use kestrel_arena::{Handle, ObjectPool};
use kestrel_core::TickId;
use kestrel_system::{StepContext, System};

use crate::frame::{Frame, FrameInput, Lifetime, Light};

/// Ticks a sound stays in the pool.
pub const SOUND_TICKS: u64 = 25;

/// Add or refresh a sparse entity and stamp its keep-alive tick.
///
/// Anything not refreshed during a full tick is freed by [`Effects`] in
/// that tick's Destroy phase.
pub fn keep_alive<I: Copy + Default, const N: usize>(
    pool: &mut ObjectPool<I, N, Lifetime>,
    handle: &mut Handle<I>,
    info: I,
    tick: TickId,
) {
    let fresh = handle.is_none();
    pool.add(handle, info);
    if let Some(life) = pool.object_mut(*handle) {
        if fresh {
            life.spawned = tick;
        }
        life.kept_alive = tick;
    }
}

/// Exhaust light for a missile at `position`.
pub fn missile_light(position: Vec2) -> Light {
    Light {
        position,
        radius: 3.0,
        intensity: 0.8,
    }
}

/// Debris motion and expiry of every sparse effect.
#[derive(Debug, Default)]
pub struct Effects;

impl System<Frame, FrameInput> for Effects {
    fn name(&self) -> &str {
        "effects"
    }

    fn interpolate(&self, ctx: &mut StepContext<'_, Frame, FrameInput>) {
        let dt = ctx.dt;
        let particles = &mut ctx.next.particles;
        for index in 0..particles.high_water() {
            if let Some(p) = particles.info_mut(index) {
                p.position += p.velocity * dt;
                p.ttl -= dt;
            }
        }
    }

    fn destroy(&self, ctx: &mut StepContext<'_, Frame, FrameInput>) {
        let tick = ctx.tick;
        let next = &mut *ctx.next;
        next.lights.retain(|_, life| life.kept_alive == tick);
        next.particles.retain(|p, _| p.ttl > 0.0);
        next.sounds
            .retain(|_, life| tick.0.saturating_sub(life.spawned.0) < SOUND_TICKS);
    }
}
