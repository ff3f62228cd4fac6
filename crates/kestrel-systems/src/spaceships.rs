//! Enemy spaceships: waves, flocking, return fire.
//!
//! Steering is the expensive pass. Every ship sums a seek force towards
//! the player and a separation push from every other ship, an O(n²) loop
//! that runs bucketed on the fork-join pool. Each bucket writes only its
//! own ships' `steer` and cooldown; the shared position table is read-only.
//!
//! Deciding who fires is also bucketed, but the buckets only return ship
//! indices. Cooldown resets, RNG draws and queueing happen afterwards on
//! the calling thread, in index order.

use glam::Vec2;
use kestrel_system::{StepContext, System};
use rand::Rng;
use tracing::debug;

use crate::frame::{
    Frame, FrameInput, Owner, SpawnKind, SpawnRequest, MAX_SPACESHIPS,
};
use crate::rng::{tick_rng, unit_vector, SALT_ENEMY_FIRE, SALT_WAVES};
use crate::spawner::{enemy_shot, enqueue};

/// Top speed in m/s.
pub const MAX_SPEED: f32 = 12.0;
/// Steering acceleration cap in m/s².
pub const MAX_STEER: f32 = 30.0;
/// Preferred distance from the player.
pub const STANDOFF: f32 = 10.0;
/// Ships closer than this push each other apart.
pub const SEPARATION_RADIUS: f32 = 4.0;
/// Separation push strength.
pub const SEPARATION: f32 = 40.0;
/// Proportional gain from velocity error to steering.
const STEER_GAIN: f32 = 3.0;
/// Ships only fire at a player within this range.
pub const FIRE_RANGE: f32 = 25.0;
/// Minimum seconds between shots from one ship.
pub const FIRE_INTERVAL: f32 = 1.2;
/// Random extra delay added to each reload.
pub const FIRE_JITTER: f32 = 0.6;
/// Enemy bolt speed.
pub const ENEMY_BLASTER_SPEED: f32 = 30.0;
/// Ticks between waves.
pub const WAVE_TICKS: u64 = 500;
/// Ships per wave, fewer if the pool is nearly full.
pub const WAVE_SIZE: usize = 6;
/// Waves appear on a ring this far from the player.
pub const WAVE_RADIUS: f32 = 30.0;

/// Enemy ship behaviour.
#[derive(Debug, Default)]
pub struct SpaceshipSystem;

impl System<Frame, FrameInput> for SpaceshipSystem {
    fn name(&self) -> &str {
        "spaceships"
    }

    fn interpolate(&self, ctx: &mut StepContext<'_, Frame, FrameInput>) {
        let dt = ctx.dt;
        for ship in ctx.next.spaceships.as_mut_slice() {
            ship.velocity = (ship.velocity + ship.steer * dt).clamp_length_max(MAX_SPEED);
            ship.position += ship.velocity * dt;
        }
    }

    fn post_render(&self, ctx: &mut StepContext<'_, Frame, FrameInput>) {
        let dt = ctx.dt;
        let hint = ctx.bucket_hint;
        let tick = ctx.tick;
        let next = &mut *ctx.next;
        let player = next.player.position;
        let positions: Vec<Vec2> = next.spaceships.iter().map(|s| s.position).collect();

        ctx.workers
            .for_each_mut(next.spaceships.as_mut_slice(), hint, |i, ship| {
                ship.steer = steering(i, ship.position, ship.velocity, player, &positions);
                ship.fire_cooldown = (ship.fire_cooldown - dt).max(0.0);
            });

        let ships = next.spaceships.as_slice();
        let shooters = ctx.workers.map_buckets(ships.len(), hint, |range| {
            range
                .filter(|&i| {
                    let s = &ships[i];
                    s.fire_cooldown <= 0.0 && s.position.distance(player) <= FIRE_RANGE
                })
                .collect::<Vec<_>>()
        });

        let mut rng = tick_rng(next.seed, tick, SALT_ENEMY_FIRE);
        for i in shooters.into_iter().flatten() {
            let Some(ship) = next.spaceships.get_mut(i) else {
                continue;
            };
            ship.fire_cooldown = FIRE_INTERVAL + rng.random_range(0.0..FIRE_JITTER);
            let shot = enemy_shot(ship.position, player, ENEMY_BLASTER_SPEED);
            enqueue(&mut next.spawns, shot);
        }

        if tick.0 > 0 && tick.0 % WAVE_TICKS == 0 {
            let count = WAVE_SIZE.min(MAX_SPACESHIPS - next.spaceships.len());
            let mut rng = tick_rng(next.seed, tick, SALT_WAVES);
            for _ in 0..count {
                enqueue(
                    &mut next.spawns,
                    SpawnRequest {
                        kind: SpawnKind::Spaceship,
                        position: player + unit_vector(&mut rng) * WAVE_RADIUS,
                        velocity: Vec2::ZERO,
                        owner: Owner::Enemy,
                    },
                );
            }
            debug!(%tick, count, "enemy wave queued");
        }
    }

    fn collide(&self, ctx: &mut StepContext<'_, Frame, FrameInput>) {
        let next = &mut *ctx.next;
        for ship in next.spaceships.iter() {
            if ship.health <= 0.0 {
                next.score += 1;
                enqueue(
                    &mut next.spawns,
                    SpawnRequest {
                        kind: SpawnKind::Explosion,
                        position: ship.position,
                        velocity: ship.velocity,
                        owner: Owner::Enemy,
                    },
                );
            }
        }
    }

    fn destroy(&self, ctx: &mut StepContext<'_, Frame, FrameInput>) {
        ctx.next.spaceships.retain(|s| s.health > 0.0);
    }
}

/// Steering for ship `index`: seek to the standoff ring, plus separation.
///
/// Neighbours are summed in index order so the result does not depend on
/// which bucket the ship landed in.
fn steering(index: usize, position: Vec2, velocity: Vec2, player: Vec2, all: &[Vec2]) -> Vec2 {
    let offset = player - position;
    let dir = offset.normalize_or_zero();
    let desired = if offset.length() > STANDOFF {
        dir * MAX_SPEED
    } else {
        -dir * (MAX_SPEED * 0.5)
    };
    let mut steer = (desired - velocity) * STEER_GAIN;

    let r2 = SEPARATION_RADIUS * SEPARATION_RADIUS;
    for (j, other) in all.iter().enumerate() {
        if j == index {
            continue;
        }
        let away = position - *other;
        let d2 = away.length_squared();
        if d2 > 0.0 && d2 < r2 {
            steer += away / d2 * SEPARATION;
        }
    }
    steer.clamp_length_max(MAX_STEER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Spaceship;
    use kestrel_core::TickId;
    use kestrel_system::{ForkJoin, TickKind};
    use proptest::prelude::*;

    fn run(
        frame: &mut Frame,
        workers: &ForkJoin,
        phase: fn(&mut StepContext<'_, Frame, FrameInput>),
    ) {
        let previous = frame.clone();
        let input = FrameInput::default();
        let tick = frame.tick;
        let mut ctx =
            StepContext::new(frame, &previous, &input, 0.004, TickKind::Full, tick, workers)
                .with_bucket_hint(2);
        phase(&mut ctx);
    }

    fn ship_at(x: f32, y: f32) -> Spaceship {
        Spaceship {
            position: Vec2::new(x, y),
            health: 30.0,
            fire_cooldown: 1.0,
            ..Spaceship::default()
        }
    }

    #[test]
    fn far_ships_seek_the_player() {
        let s = steering(0, Vec2::new(50.0, 0.0), Vec2::ZERO, Vec2::ZERO, &[Vec2::new(50.0, 0.0)]);
        assert!(s.x < 0.0);
        assert!(s.length() <= MAX_STEER + 1e-4);
    }

    #[test]
    fn close_neighbours_push_apart() {
        let all = [Vec2::new(20.0, 0.0), Vec2::new(20.0, 1.0)];
        let lone = steering(0, all[0], Vec2::ZERO, Vec2::ZERO, &all[..1]);
        let crowded = steering(0, all[0], Vec2::ZERO, Vec2::ZERO, &all);
        assert!(crowded.y < lone.y);
    }

    #[test]
    fn waves_arrive_on_schedule() {
        let mut frame = Frame::new(5);
        frame.tick = TickId(WAVE_TICKS - 1);
        run(&mut frame, &ForkJoin::sequential(), |c| SpaceshipSystem.post_render(c));
        assert!(frame.spawns.is_empty());

        frame.tick = TickId(WAVE_TICKS);
        run(&mut frame, &ForkJoin::sequential(), |c| SpaceshipSystem.post_render(c));
        assert_eq!(frame.spawns.len(), WAVE_SIZE);
        for req in frame.spawns.iter() {
            assert_eq!(req.kind, SpawnKind::Spaceship);
            assert!((req.position.length() - WAVE_RADIUS).abs() < 1e-3);
        }
    }

    #[test]
    fn ships_in_range_fire_and_reload() {
        let mut frame = Frame::new(5);
        frame.tick = TickId(1);
        let mut near = ship_at(10.0, 0.0);
        near.fire_cooldown = 0.0;
        let mut far = ship_at(100.0, 0.0);
        far.fire_cooldown = 0.0;
        frame.spaceships.push(near);
        frame.spaceships.push(far);
        run(&mut frame, &ForkJoin::sequential(), |c| SpaceshipSystem.post_render(c));

        assert_eq!(frame.spawns.len(), 1);
        let shot = frame.spawns.get(0).unwrap();
        assert_eq!(shot.owner, Owner::Enemy);
        assert!(shot.velocity.x < 0.0);
        let reload = frame.spaceships.get(0).unwrap().fire_cooldown;
        assert!((FIRE_INTERVAL..=FIRE_INTERVAL + FIRE_JITTER).contains(&reload));
        assert_eq!(frame.spaceships.get(1).unwrap().fire_cooldown, 0.0);
    }

    #[test]
    fn dead_ships_score_explode_and_leave() {
        let mut frame = Frame::new(5);
        frame.spaceships.push(ship_at(1.0, 0.0));
        frame.spaceships.push(Spaceship {
            health: 0.0,
            ..ship_at(2.0, 0.0)
        });
        frame.spaceships.push(ship_at(3.0, 0.0));
        run(&mut frame, &ForkJoin::sequential(), |c| SpaceshipSystem.collide(c));
        assert_eq!(frame.score, 1);
        assert_eq!(frame.spawns.get(0).unwrap().position, Vec2::new(2.0, 0.0));

        run(&mut frame, &ForkJoin::sequential(), |c| SpaceshipSystem.destroy(c));
        let xs: Vec<f32> = frame.spaceships.iter().map(|s| s.position.x).collect();
        assert_eq!(xs, vec![1.0, 3.0], "last ship swapped into the hole");
    }

    proptest! {
        #[test]
        fn post_render_is_independent_of_worker_count(
            coords in prop::collection::vec((-40.0f32..40.0, -40.0f32..40.0, 0.0f32..1.5), 0..40),
            tick in 1u64..2000,
        ) {
            let mut base = Frame::new(11);
            base.tick = TickId(tick);
            for &(x, y, cooldown) in &coords {
                base.spaceships.push(Spaceship {
                    fire_cooldown: cooldown,
                    ..ship_at(x, y)
                });
            }
            let mut seq = base.clone();
            run(&mut seq, &ForkJoin::sequential(), |c| SpaceshipSystem.post_render(c));
            let mut par = base.clone();
            run(&mut par, &ForkJoin::new(3).unwrap(), |c| SpaceshipSystem.post_render(c));
            prop_assert!(seq == par);
        }
    }
}
