//! Spawn-queue commit.
//!
//! Systems never push into an entity pool mid-tick. They queue a
//! [`SpawnRequest`] instead, and [`Spawner`] commits the whole queue in
//! the Spawn phase, after every position is final and every collision has
//! been resolved. Dense-pool indices therefore only change in Spawn
//! (append) and Destroy (swap-remove).

use glam::Vec2;
use kestrel_arena::Handle;
use kestrel_core::TickId;
use kestrel_system::{StepContext, System};
use rand::Rng;
use tracing::trace;

use crate::effects::{keep_alive, missile_light};
use crate::frame::{
    Blaster, Frame, FrameInput, Lifetime, Missile, Owner, Particle, Sound, SoundKind, Spaceship,
    SpawnKind, SpawnQueue, SpawnRequest,
};
use crate::rng::{tick_rng, unit_vector, SALT_DEBRIS};

/// Hit points of a freshly spawned enemy.
pub const SPACESHIP_HEALTH: f32 = 30.0;
/// Debris pieces per explosion.
pub const DEBRIS_PER_EXPLOSION: usize = 12;
/// Debris speed range in m/s.
const DEBRIS_SPEED: std::ops::Range<f32> = 4.0..14.0;
/// Debris lifetime range in seconds.
const DEBRIS_TTL: std::ops::Range<f32> = 0.4..1.2;

/// Queue a spawn for this tick's Spawn phase.
///
/// The queue is sized for the worst case of one tick; overflowing it traps
/// in debug builds and drops the request in release.
pub fn enqueue(spawns: &mut SpawnQueue, request: SpawnRequest) {
    spawns.push(request);
}

/// Commits queued spawns in queue order, then empties the queue.
#[derive(Debug, Default)]
pub struct Spawner;

impl System<Frame, FrameInput> for Spawner {
    fn name(&self) -> &str {
        "spawner"
    }

    fn spawn(&self, ctx: &mut StepContext<'_, Frame, FrameInput>) {
        let next = &mut *ctx.next;
        if next.spawns.is_empty() {
            return;
        }
        let mut debris_rng = tick_rng(next.seed, ctx.tick, SALT_DEBRIS);
        let queued = next.spawns.len();
        for i in 0..queued {
            let Some(&request) = next.spawns.get(i) else {
                break;
            };
            commit(next, &request, ctx.tick, &mut debris_rng);
        }
        next.spawns.clear();
        trace!(tick = %ctx.tick, queued, "spawn queue committed");
    }
}

fn commit(next: &mut Frame, request: &SpawnRequest, tick: TickId, rng: &mut impl Rng) {
    let visible = next.camera.contains(request.position);
    match request.kind {
        SpawnKind::Blaster => {
            next.blasters.push(Blaster {
                position: request.position,
                velocity: request.velocity,
                owner: request.owner,
                ..Blaster::default()
            });
            if visible {
                emit_sound(next, request.position, SoundKind::Blaster, 0.6, tick);
            }
        }
        SpawnKind::Missile => {
            let mut missile = Missile {
                position: request.position,
                velocity: request.velocity,
                ..Missile::default()
            };
            keep_alive(
                &mut next.lights,
                &mut missile.light,
                missile_light(missile.position),
                tick,
            );
            next.missiles.push(missile);
            if visible {
                emit_sound(next, request.position, SoundKind::Missile, 0.8, tick);
            }
        }
        SpawnKind::Spaceship => {
            next.spaceships.push(Spaceship {
                position: request.position,
                velocity: request.velocity,
                health: SPACESHIP_HEALTH,
                ..Spaceship::default()
            });
        }
        SpawnKind::Explosion => {
            // Debris is drawn even when culled so the stream stays in step.
            for _ in 0..DEBRIS_PER_EXPLOSION {
                let velocity = request.velocity
                    + unit_vector(rng) * rng.random_range(DEBRIS_SPEED);
                let ttl = rng.random_range(DEBRIS_TTL);
                if visible {
                    let mut handle = Handle::NONE;
                    let particle = Particle {
                        position: request.position,
                        velocity,
                        ttl,
                    };
                    if next.particles.try_add(&mut handle, particle).is_ok() {
                        stamp(next.particles.object_mut(handle), tick);
                    }
                }
            }
            if visible {
                emit_sound(next, request.position, SoundKind::Explosion, 1.0, tick);
            }
        }
    }
}

/// Sounds are cosmetic: a full pool drops the new one quietly.
fn emit_sound(next: &mut Frame, position: Vec2, kind: SoundKind, volume: f32, tick: TickId) {
    let mut handle = Handle::NONE;
    let sound = Sound {
        position,
        kind,
        volume,
    };
    match next.sounds.try_add(&mut handle, sound) {
        Ok(()) => stamp(next.sounds.object_mut(handle), tick),
        Err(e) => trace!(%tick, ?kind, error = %e, "sound dropped"),
    }
}

fn stamp(life: Option<&mut Lifetime>, tick: TickId) {
    if let Some(life) = life {
        *life = Lifetime {
            spawned: tick,
            kept_alive: tick,
        };
    }
}

/// Request for an enemy blaster bolt fired from `from` towards `target`.
pub fn enemy_shot(from: Vec2, target: Vec2, speed: f32) -> SpawnRequest {
    SpawnRequest {
        kind: SpawnKind::Blaster,
        position: from,
        velocity: (target - from).normalize_or_zero() * speed,
        owner: Owner::Enemy,
    }
}
