//! Homing missiles.
//!
//! Each missile carries a sparse [`Handle`](kestrel_arena::Handle) to its
//! exhaust light and re-adds the light every tick it lives. Target
//! selection reads enemy positions and writes only the missile's own
//! velocity, so it runs bucketed on the fork-join pool.

use glam::Vec2;
use kestrel_system::{StepContext, System};

use crate::effects::{keep_alive, missile_light};
use crate::frame::{Frame, FrameInput, Owner, SpawnKind, SpawnRequest};
use crate::spawner::enqueue;

/// Seconds of fuel.
pub const MISSILE_LIFETIME: f32 = 4.0;
/// Cruise speed in m/s.
pub const MISSILE_SPEED: f32 = 35.0;
/// How quickly velocity turns towards the target, 1/s.
pub const TURN_RATE: f32 = 4.0;
/// Damage on impact.
pub const MISSILE_DAMAGE: f32 = 40.0;
/// Impact radius.
pub const MISSILE_RADIUS: f32 = 1.5;

/// Moves, steers and detonates missiles.
#[derive(Debug, Default)]
pub struct MissileSystem;

impl System<Frame, FrameInput> for MissileSystem {
    fn name(&self) -> &str {
        "missiles"
    }

    fn interpolate(&self, ctx: &mut StepContext<'_, Frame, FrameInput>) {
        let dt = ctx.dt;
        let tick = ctx.tick;
        let next = &mut *ctx.next;
        for missile in next.missiles.as_mut_slice() {
            missile.position += missile.velocity * dt;
            missile.age += dt;
            keep_alive(
                &mut next.lights,
                &mut missile.light,
                missile_light(missile.position),
                tick,
            );
        }
    }

    fn post_render(&self, ctx: &mut StepContext<'_, Frame, FrameInput>) {
        let dt = ctx.dt;
        let hint = ctx.bucket_hint;
        let next = &mut *ctx.next;
        let ships = next.spaceships.as_slice();
        ctx.workers
            .for_each_mut(next.missiles.as_mut_slice(), hint, |_, missile| {
                let Some(target) = nearest(ships.iter().map(|s| s.position), missile.position)
                else {
                    return;
                };
                let desired = (target - missile.position).normalize_or_zero() * MISSILE_SPEED;
                missile.velocity += (desired - missile.velocity) * (TURN_RATE * dt).min(1.0);
            });
    }

    fn collide(&self, ctx: &mut StepContext<'_, Frame, FrameInput>) {
        let next = &mut *ctx.next;
        let r2 = MISSILE_RADIUS * MISSILE_RADIUS;
        for missile in next.missiles.as_mut_slice() {
            if missile.hit {
                continue;
            }
            let target = next
                .spaceships
                .as_mut_slice()
                .iter_mut()
                .find(|s| s.health > 0.0 && s.position.distance_squared(missile.position) <= r2);
            if let Some(ship) = target {
                ship.health = (ship.health - MISSILE_DAMAGE).max(0.0);
                missile.hit = true;
                enqueue(
                    &mut next.spawns,
                    SpawnRequest {
                        kind: SpawnKind::Explosion,
                        position: missile.position,
                        velocity: Vec2::ZERO,
                        owner: Owner::Player,
                    },
                );
            }
        }
    }

    fn destroy(&self, ctx: &mut StepContext<'_, Frame, FrameInput>) {
        ctx.next
            .missiles
            .retain(|m| !m.hit && m.age < MISSILE_LIFETIME);
    }
}

/// Closest point to `from`; the first one wins ties.
fn nearest(points: impl Iterator<Item = Vec2>, from: Vec2) -> Option<Vec2> {
    let mut best: Option<(f32, Vec2)> = None;
    for p in points {
        let d = p.distance_squared(from);
        if best.is_none_or(|(bd, _)| d < bd) {
            best = Some((d, p));
        }
    }
    best.map(|(_, p)| p)
}
