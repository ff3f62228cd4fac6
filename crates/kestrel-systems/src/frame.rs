//! World snapshot and per-tick input for the reference game.
//!
//! [`Frame`] is a flat aggregate of fixed-capacity pools and scalars. It
//! has no heap allocation, clones as a plain copy, and goes through the
//! fixed-layout codec field by field, so its version changes whenever any
//! member's layout does.

use std::io::{Read, Write};

use glam::Vec2;
use kestrel_arena::{DensePool, Handle, ObjectPool};
use kestrel_core::{
    fold_version, version_of, CodecError, Decode, Encode, SimFrame, SimInput, TickId, Versioned,
};

/// Implements `Versioned`, `Encode` and `Decode` for a plain record by
/// walking its fields in declaration order.
macro_rules! plain_record {
    ($ty:ty, revision = $rev:expr, { $($field:ident: $fty:ty),* $(,)? }) => {
        impl Versioned for $ty {
            const VERSION: u64 = fold_version(&[$rev, $(version_of::<$fty>()),*]);
        }

        impl Encode for $ty {
            const ENCODED_LEN: usize = 0 $(+ <$fty as Encode>::ENCODED_LEN)*;

            fn encode(&self, w: &mut dyn Write) -> Result<(), CodecError> {
                $(self.$field.encode(w)?;)*
                Ok(())
            }
        }

        impl Decode for $ty {
            fn decode(r: &mut dyn Read) -> Result<Self, CodecError> {
                Ok(Self {
                    $($field: <$fty as Decode>::decode(r)?,)*
                })
            }
        }
    };
}

/// Implements the codec traits for a fieldless `u8` enum.
macro_rules! byte_enum {
    ($ty:ident, revision = $rev:expr, { $($variant:ident = $value:expr),* $(,)? }) => {
        impl Versioned for $ty {
            const VERSION: u64 = fold_version(&[$rev, $($value),*]);
        }

        impl Encode for $ty {
            const ENCODED_LEN: usize = 1;

            fn encode(&self, w: &mut dyn Write) -> Result<(), CodecError> {
                (*self as u8).encode(w)
            }
        }

        impl Decode for $ty {
            fn decode(r: &mut dyn Read) -> Result<Self, CodecError> {
                match u8::decode(r)? {
                    $($value => Ok($ty::$variant),)*
                    other => Err(CodecError::Malformed {
                        detail: format!(concat!("invalid ", stringify!($ty), " byte {}"), other),
                    }),
                }
            }
        }
    };
}

// ── Capacities ─────────────────────────────────────────────────────

/// Blaster bolts in flight.
pub const MAX_BLASTERS: usize = 256;
/// Missiles in flight.
pub const MAX_MISSILES: usize = 64;
/// Enemy ships alive.
pub const MAX_SPACESHIPS: usize = 64;
/// Dynamic lights.
pub const MAX_LIGHTS: usize = 128;
/// Explosion debris particles.
pub const MAX_PARTICLES: usize = 512;
/// One-shot sounds waiting to be played.
pub const MAX_SOUNDS: usize = 32;
/// Spawn requests queued in one tick.
pub const MAX_SPAWNS: usize = 256;

/// Bumped by hand whenever a record's meaning changes without its layout
/// changing.
const LAYOUT_REVISION: u64 = 1;

// ── Input ──────────────────────────────────────────────────────────

/// Fire-button bit: blaster.
pub const FIRE_BLASTER: u8 = 1 << 0;
/// Fire-button bit: homing missile.
pub const FIRE_MISSILE: u8 = 1 << 1;

/// External stimulus for one tick.
///
/// Equality is by bit pattern, like [`Frame`], so a recorded stream logs
/// `-0.0` after `0.0` and a repeated NaN only once.
#[derive(Clone, Copy, Debug)]
pub struct FrameInput {
    /// Thrust direction. Longer than 1 is clamped to unit length.
    pub movement: Vec2,
    /// Held fire buttons, a mask of [`FIRE_BLASTER`] and [`FIRE_MISSILE`].
    pub fire: u8,
    /// Lower-left corner of the visible rectangle, relative to the player.
    pub view_min: Vec2,
    /// Upper-right corner of the visible rectangle, relative to the player.
    pub view_max: Vec2,
}

impl FrameInput {
    /// Visible half-extent used when the host has not reported one.
    pub const DEFAULT_VIEW: Vec2 = Vec2::new(32.0, 18.0);

    /// Neutral input with the given thrust.
    pub fn thrust(movement: Vec2) -> Self {
        Self {
            movement,
            ..Self::default()
        }
    }

    /// Set the fire mask.
    pub fn with_fire(mut self, fire: u8) -> Self {
        self.fire = fire;
        self
    }

    /// Whether every bit in `button` is held.
    pub fn fires(&self, button: u8) -> bool {
        self.fire & button == button
    }
}

impl PartialEq for FrameInput {
    fn eq(&self, other: &Self) -> bool {
        let bits = |v: Vec2| [v.x.to_bits(), v.y.to_bits()];
        self.fire == other.fire
            && bits(self.movement) == bits(other.movement)
            && bits(self.view_min) == bits(other.view_min)
            && bits(self.view_max) == bits(other.view_max)
    }
}

impl Eq for FrameInput {}

impl Default for FrameInput {
    fn default() -> Self {
        Self {
            movement: Vec2::ZERO,
            fire: 0,
            view_min: -Self::DEFAULT_VIEW,
            view_max: Self::DEFAULT_VIEW,
        }
    }
}

plain_record!(FrameInput, revision = LAYOUT_REVISION, {
    movement: Vec2,
    fire: u8,
    view_min: Vec2,
    view_max: Vec2,
});

impl SimInput for FrameInput {}

// ── Entity records ─────────────────────────────────────────────────

/// Who fired a projectile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum Owner {
    /// The player ship.
    #[default]
    Player = 0,
    /// An enemy spaceship.
    Enemy = 1,
}

byte_enum!(Owner, revision = LAYOUT_REVISION, { Player = 0, Enemy = 1 });

/// The player-controlled ship.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Ship {
    /// World position.
    pub position: Vec2,
    /// World velocity.
    pub velocity: Vec2,
    /// Unit facing, updated whenever thrust is applied.
    pub heading: Vec2,
    /// Hit points. Clamped at zero; the ship keeps flying.
    pub health: f32,
    /// Seconds until the blaster can fire again.
    pub blaster_cooldown: f32,
    /// Seconds until a missile can launch again.
    pub missile_cooldown: f32,
}

plain_record!(Ship, revision = LAYOUT_REVISION, {
    position: Vec2,
    velocity: Vec2,
    heading: Vec2,
    health: f32,
    blaster_cooldown: f32,
    missile_cooldown: f32,
});

/// Visible world rectangle, computed in the Global phase.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Camera {
    /// Lower-left corner.
    pub min: Vec2,
    /// Upper-right corner.
    pub max: Vec2,
}

impl Camera {
    /// Whether `point` lies inside the rectangle (edges included).
    pub fn contains(&self, point: Vec2) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}

plain_record!(Camera, revision = LAYOUT_REVISION, {
    min: Vec2,
    max: Vec2,
});

/// A blaster bolt. Dense pool: its index changes when others are destroyed.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Blaster {
    /// World position.
    pub position: Vec2,
    /// World velocity.
    pub velocity: Vec2,
    /// Seconds since it was fired.
    pub age: f32,
    /// Who fired it.
    pub owner: Owner,
    /// Set in Collide when it struck something; removed in Destroy.
    pub hit: bool,
}

plain_record!(Blaster, revision = LAYOUT_REVISION, {
    position: Vec2,
    velocity: Vec2,
    age: f32,
    owner: Owner,
    hit: bool,
});

/// A homing missile.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Missile {
    /// World position.
    pub position: Vec2,
    /// World velocity.
    pub velocity: Vec2,
    /// Seconds since launch.
    pub age: f32,
    /// Set in Collide when it struck a spaceship.
    pub hit: bool,
    /// Exhaust light, kept alive by re-adding it every tick.
    pub light: Handle<Light>,
}

plain_record!(Missile, revision = LAYOUT_REVISION, {
    position: Vec2,
    velocity: Vec2,
    age: f32,
    hit: bool,
    light: Handle<Light>,
});

/// An enemy ship.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Spaceship {
    /// World position.
    pub position: Vec2,
    /// World velocity.
    pub velocity: Vec2,
    /// Steering acceleration chosen in PostRender, applied next tick.
    pub steer: Vec2,
    /// Hit points. Destroyed once this reaches zero.
    pub health: f32,
    /// Seconds until it may fire again.
    pub fire_cooldown: f32,
}

plain_record!(Spaceship, revision = LAYOUT_REVISION, {
    position: Vec2,
    velocity: Vec2,
    steer: Vec2,
    health: f32,
    fire_cooldown: f32,
});

/// A point light for the renderer.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Light {
    /// World position.
    pub position: Vec2,
    /// Falloff radius.
    pub radius: f32,
    /// Brightness.
    pub intensity: f32,
}

plain_record!(Light, revision = LAYOUT_REVISION, {
    position: Vec2,
    radius: f32,
    intensity: f32,
});

/// A piece of explosion debris.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Particle {
    /// World position.
    pub position: Vec2,
    /// World velocity.
    pub velocity: Vec2,
    /// Seconds left to live.
    pub ttl: f32,
}

plain_record!(Particle, revision = LAYOUT_REVISION, {
    position: Vec2,
    velocity: Vec2,
    ttl: f32,
});

/// What a sound is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum SoundKind {
    /// Blaster shot.
    #[default]
    Blaster = 0,
    /// Missile launch.
    Missile = 1,
    /// Ship explosion.
    Explosion = 2,
}

byte_enum!(SoundKind, revision = LAYOUT_REVISION, {
    Blaster = 0,
    Missile = 1,
    Explosion = 2,
});

/// A one-shot sound for the audio manager.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Sound {
    /// Where it was emitted.
    pub position: Vec2,
    /// Which sample to play.
    pub kind: SoundKind,
    /// Linear gain.
    pub volume: f32,
}

plain_record!(Sound, revision = LAYOUT_REVISION, {
    position: Vec2,
    kind: SoundKind,
    volume: f32,
});

/// Bookkeeping record for sparse effect pools.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Lifetime {
    /// Tick the slot was allocated.
    pub spawned: TickId,
    /// Last tick its owner re-added it.
    pub kept_alive: TickId,
}

plain_record!(Lifetime, revision = LAYOUT_REVISION, {
    spawned: TickId,
    kept_alive: TickId,
});

/// What a spawn request creates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum SpawnKind {
    /// A blaster bolt.
    #[default]
    Blaster = 0,
    /// A homing missile.
    Missile = 1,
    /// An enemy ship.
    Spaceship = 2,
    /// Debris, a sound and nothing else.
    Explosion = 3,
}

byte_enum!(SpawnKind, revision = LAYOUT_REVISION, {
    Blaster = 0,
    Missile = 1,
    Spaceship = 2,
    Explosion = 3,
});

/// An entity queued during a tick, committed in the Spawn phase.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SpawnRequest {
    /// What to create.
    pub kind: SpawnKind,
    /// Where.
    pub position: Vec2,
    /// Initial velocity.
    pub velocity: Vec2,
    /// Who created it.
    pub owner: Owner,
}

plain_record!(SpawnRequest, revision = LAYOUT_REVISION, {
    kind: SpawnKind,
    position: Vec2,
    velocity: Vec2,
    owner: Owner,
});

// ── Frame ──────────────────────────────────────────────────────────

/// Dense blaster pool.
pub type Blasters = DensePool<Blaster, MAX_BLASTERS>;
/// Dense missile pool.
pub type Missiles = DensePool<Missile, MAX_MISSILES>;
/// Dense enemy pool.
pub type Spaceships = DensePool<Spaceship, MAX_SPACESHIPS>;
/// Sparse light pool.
pub type Lights = ObjectPool<Light, MAX_LIGHTS, Lifetime>;
/// Sparse particle pool.
pub type Particles = ObjectPool<Particle, MAX_PARTICLES, Lifetime>;
/// Sparse sound pool.
pub type Sounds = ObjectPool<Sound, MAX_SOUNDS, Lifetime>;
/// Spawn queue, drained every Spawn phase.
pub type SpawnQueue = DensePool<SpawnRequest, MAX_SPAWNS>;

/// The complete world state at one tick.
///
/// The renderer and audio manager get `&Frame` and walk the pools with the
/// same index protocol the systems use.
#[derive(Clone, Debug)]
pub struct Frame {
    /// Tick this frame represents.
    pub tick: TickId,
    /// Session seed. Per-tick RNGs are derived from it.
    pub seed: u64,
    /// Enemy ships destroyed.
    pub score: u32,
    /// The player.
    pub player: Ship,
    /// Visible rectangle.
    pub camera: Camera,
    /// Blaster bolts.
    pub blasters: Blasters,
    /// Missiles.
    pub missiles: Missiles,
    /// Enemy ships.
    pub spaceships: Spaceships,
    /// Lights.
    pub lights: Lights,
    /// Debris.
    pub particles: Particles,
    /// Pending sounds.
    pub sounds: Sounds,
    /// Entities queued this tick.
    pub spawns: SpawnQueue,
}

/// Player hit points at the start of a session.
pub const PLAYER_HEALTH: f32 = 100.0;

impl Frame {
    /// A fresh session: the player at rest at the origin facing +x.
    pub fn new(seed: u64) -> Self {
        Self {
            tick: TickId(0),
            seed,
            score: 0,
            player: Ship {
                heading: Vec2::X,
                health: PLAYER_HEALTH,
                ..Ship::default()
            },
            camera: Camera {
                min: -FrameInput::DEFAULT_VIEW,
                max: FrameInput::DEFAULT_VIEW,
            },
            blasters: Blasters::new(),
            missiles: Missiles::new(),
            spaceships: Spaceships::new(),
            lights: Lights::new(),
            particles: Particles::new(),
            sounds: Sounds::new(),
            spawns: SpawnQueue::new(),
        }
    }
}

plain_record!(Frame, revision = LAYOUT_REVISION, {
    tick: TickId,
    seed: u64,
    score: u32,
    player: Ship,
    camera: Camera,
    blasters: Blasters,
    missiles: Missiles,
    spaceships: Spaceships,
    lights: Lights,
    particles: Particles,
    sounds: Sounds,
    spawns: SpawnQueue,
});

impl SimFrame for Frame {
    fn tick(&self) -> TickId {
        self.tick
    }

    fn set_tick(&mut self, tick: TickId) {
        self.tick = tick;
    }
}

impl PartialEq for Frame {
    fn eq(&self, other: &Self) -> bool {
        self.bit_eq(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kestrel_replay::DifferenceWriter;

    #[test]
    fn frame_round_trips_through_codec() {
        let mut frame = Frame::new(7);
        frame.tick = TickId(12);
        frame.blasters.push(Blaster {
            position: Vec2::new(1.0, 2.0),
            velocity: Vec2::new(30.0, 0.0),
            owner: Owner::Enemy,
            ..Blaster::default()
        });
        let mut light = Handle::NONE;
        frame.lights.add(
            &mut light,
            Light {
                radius: 4.0,
                ..Light::default()
            },
        );
        frame.missiles.push(Missile {
            light,
            ..Missile::default()
        });

        let bytes = frame.to_bytes();
        assert_eq!(bytes.len(), Frame::ENCODED_LEN);
        let back = Frame::decode(&mut bytes.as_slice()).unwrap();
        assert_eq!(back, frame);
        assert_eq!(back.missiles.get(0).unwrap().light, light);
    }

    #[test]
    fn equality_is_bitwise() {
        let mut a = Frame::new(1);
        let mut b = Frame::new(1);
        a.player.velocity.x = 0.0;
        b.player.velocity.x = -0.0;
        assert_ne!(a, b, "0.0 and -0.0 differ bitwise");
        b.player.velocity.x = 0.0;
        assert_eq!(a, b);
    }

    #[test]
    fn unknown_enum_byte_is_malformed() {
        let err = Owner::decode(&mut [9u8].as_slice()).unwrap_err();
        assert!(matches!(err, CodecError::Malformed { .. }));
    }

    #[test]
    fn record_versions_differ() {
        assert_ne!(Blaster::VERSION, Missile::VERSION);
        assert_ne!(Frame::VERSION, FrameInput::VERSION);
    }

    #[test]
    fn input_default_has_a_view() {
        let input = FrameInput::default();
        assert!(input.view_max.x > input.view_min.x);
        assert!(!input.fires(FIRE_BLASTER));
        assert!(input.with_fire(FIRE_BLASTER | FIRE_MISSILE).fires(FIRE_MISSILE));
    }

    #[test]
    fn input_equality_is_bitwise() {
        let zero = FrameInput::thrust(Vec2::new(0.0, 1.0));
        let negative_zero = FrameInput::thrust(Vec2::new(-0.0, 1.0));
        assert_ne!(zero, negative_zero);

        let nan = FrameInput::thrust(Vec2::new(f32::NAN, 0.0));
        assert_eq!(nan, nan);
    }

    #[test]
    fn recorded_stream_sees_sign_of_zero() {
        let mut writer = DifferenceWriter::new(Frame::new(0), FrameInput::default());
        writer.update(TickId(0), &FrameInput::thrust(Vec2::new(-0.0, 0.0)));
        writer.update(TickId(1), &FrameInput::thrust(Vec2::new(-0.0, 0.0)));
        assert_eq!(writer.difference_count(), 1);
        let nan = FrameInput::thrust(Vec2::new(f32::NAN, 0.0));
        writer.update(TickId(2), &nan);
        writer.update(TickId(3), &nan);
        assert_eq!(writer.difference_count(), 2);
    }

    #[test]
    fn camera_contains_edges() {
        let cam = Camera {
            min: Vec2::new(-1.0, -1.0),
            max: Vec2::new(1.0, 1.0),
        };
        assert!(cam.contains(Vec2::new(1.0, -1.0)));
        assert!(!cam.contains(Vec2::new(1.01, 0.0)));
    }
}
