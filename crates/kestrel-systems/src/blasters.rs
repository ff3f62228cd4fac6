//! Blaster bolts: straight-line projectiles in a dense pool.

use kestrel_system::{StepContext, System};

use crate::frame::{Frame, FrameInput, Owner};

/// Seconds a bolt flies before it fizzles.
pub const BLASTER_LIFETIME: f32 = 1.5;
/// Damage per hit.
pub const BLASTER_DAMAGE: f32 = 10.0;
/// Hit radius around the target's centre.
pub const HIT_RADIUS: f32 = 1.0;

/// Moves bolts, resolves their hits and removes spent ones.
#[derive(Debug, Default)]
pub struct BlasterSystem;

impl System<Frame, FrameInput> for BlasterSystem {
    fn name(&self) -> &str {
        "blasters"
    }

    fn interpolate(&self, ctx: &mut StepContext<'_, Frame, FrameInput>) {
        let dt = ctx.dt;
        for bolt in ctx.next.blasters.as_mut_slice() {
            bolt.position += bolt.velocity * dt;
            bolt.age += dt;
        }
    }

    fn collide(&self, ctx: &mut StepContext<'_, Frame, FrameInput>) {
        let next = &mut *ctx.next;
        let r2 = HIT_RADIUS * HIT_RADIUS;
        for bolt in next.blasters.as_mut_slice() {
            if bolt.hit {
                continue;
            }
            match bolt.owner {
                Owner::Player => {
                    let target = next
                        .spaceships
                        .as_mut_slice()
                        .iter_mut()
                        .find(|s| s.health > 0.0 && s.position.distance_squared(bolt.position) <= r2);
                    if let Some(ship) = target {
                        ship.health = (ship.health - BLASTER_DAMAGE).max(0.0);
                        bolt.hit = true;
                    }
                }
                Owner::Enemy => {
                    let player = &mut next.player;
                    if player.position.distance_squared(bolt.position) <= r2 {
                        player.health = (player.health - BLASTER_DAMAGE).max(0.0);
                        bolt.hit = true;
                    }
                }
            }
        }
    }

    fn destroy(&self, ctx: &mut StepContext<'_, Frame, FrameInput>) {
        ctx.next
            .blasters
            .retain(|b| !b.hit && b.age < BLASTER_LIFETIME);
    }
}
