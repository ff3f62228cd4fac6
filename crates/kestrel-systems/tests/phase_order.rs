//! A ship killed in Collide while another spawns in the same tick.
//!
//! Spawn appends to the dense spaceship pool and Destroy then swap-removes
//! the dead ship, moving the newcomer into its index. Because Collide has
//! already finished with every index by then, nothing reads a slot whose
//! occupant changed under it.

use glam::Vec2;
use kestrel_engine::{EngineConfig, TickEngine};
use kestrel_systems::spawner::{DEBRIS_PER_EXPLOSION, SPACESHIP_HEALTH};
use kestrel_systems::{
    enqueue, reference_pipeline, Blaster, Frame, FrameInput, Owner, Spaceship, SpawnKind,
    SpawnRequest,
};

fn engine(initial: Frame) -> TickEngine<Frame, FrameInput> {
    let config = EngineConfig {
        worker_count: Some(0),
        ..EngineConfig::default()
    };
    TickEngine::new(initial, reference_pipeline(), &config).unwrap()
}

#[test]
fn spawn_and_kill_in_one_tick() {
    let mut frame = Frame::new(9);
    frame.spaceships.push(Spaceship {
        position: Vec2::new(5.0, 0.0),
        health: 10.0,
        fire_cooldown: 5.0,
        ..Spaceship::default()
    });
    frame.blasters.push(Blaster {
        position: Vec2::new(5.0, 0.0),
        velocity: Vec2::new(1.0, 0.0),
        owner: Owner::Player,
        ..Blaster::default()
    });
    let newcomer = Vec2::new(-8.0, 3.0);
    enqueue(
        &mut frame.spawns,
        SpawnRequest {
            kind: SpawnKind::Spaceship,
            position: newcomer,
            ..SpawnRequest::default()
        },
    );

    let mut engine = engine(frame);
    engine.execute_tick(&FrameInput::default());
    let after = engine.current();

    assert_eq!(after.score, 1);
    assert_eq!(after.spaceships.len(), 1);
    let survivor = after.spaceships.get(0).unwrap();
    assert_eq!(survivor.position, newcomer, "newcomer moved into the hole");
    assert_eq!(survivor.health, SPACESHIP_HEALTH);
    assert_eq!(survivor.steer, Vec2::ZERO, "spawned after steering ran");
    assert!(after.blasters.is_empty());
    assert!(after.spawns.is_empty());
    assert_eq!(after.particles.len(), DEBRIS_PER_EXPLOSION);

    // The previous frame still holds the pre-tick layout.
    assert_eq!(engine.previous().spaceships.get(0).unwrap().health, 10.0);
}

#[test]
fn destroyed_missile_releases_its_light_next_tick() {
    let mut frame = Frame::new(9);
    frame.spaceships.push(Spaceship {
        position: Vec2::new(40.0, 0.0),
        health: 100.0,
        fire_cooldown: 5.0,
        ..Spaceship::default()
    });
    enqueue(
        &mut frame.spawns,
        SpawnRequest {
            kind: SpawnKind::Missile,
            position: Vec2::new(38.0, 0.0),
            velocity: Vec2::new(20.0, 0.0),
            ..SpawnRequest::default()
        },
    );
    let mut engine = engine(frame);

    engine.execute_tick(&FrameInput::default());
    assert_eq!(engine.current().missiles.len(), 1);
    assert_eq!(engine.current().lights.len(), 1);

    let mut ticks = 0;
    while !engine.current().missiles.is_empty() {
        engine.execute_tick(&FrameInput::default());
        ticks += 1;
        assert!(ticks < 100, "missile never hit");
    }
    assert_eq!(engine.current().lights.len(), 1, "kept for the tick it died in");
    engine.execute_tick(&FrameInput::default());
    assert!(engine.current().lights.is_empty());
}
