//! Per-tick deterministic randomness.
//!
//! No RNG state lives in the frame. Each system that needs randomness
//! derives a fresh ChaCha8 stream from `seed ^ tick ^ salt`, so the draw
//! sequence depends only on the frame and which system is asking. Draws
//! must happen on the calling thread in a fixed order; parallel buckets
//! never draw.

use kestrel_core::TickId;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Salt for enemy wave placement.
pub const SALT_WAVES: u64 = 0x5741_5645;
/// Salt for enemy fire jitter.
pub const SALT_ENEMY_FIRE: u64 = 0x4649_5245;
/// Salt for explosion debris.
pub const SALT_DEBRIS: u64 = 0x4445_4252;

/// RNG for one system in one tick.
pub fn tick_rng(seed: u64, tick: TickId, salt: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed ^ tick.0 ^ salt)
}

/// Uniform unit vector.
pub fn unit_vector(rng: &mut impl Rng) -> glam::Vec2 {
    let angle = rng.random_range(0.0..std::f32::consts::TAU);
    glam::Vec2::from_angle(angle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_inputs_same_stream() {
        let a: u64 = tick_rng(1, TickId(5), SALT_WAVES).random();
        let b: u64 = tick_rng(1, TickId(5), SALT_WAVES).random();
        assert_eq!(a, b);
    }

    #[test]
    fn salt_separates_streams() {
        let a: u64 = tick_rng(1, TickId(5), SALT_WAVES).random();
        let b: u64 = tick_rng(1, TickId(5), SALT_DEBRIS).random();
        assert_ne!(a, b);
    }

    #[test]
    fn unit_vectors_are_unit() {
        let mut rng = tick_rng(3, TickId(0), SALT_DEBRIS);
        for _ in 0..32 {
            let v = unit_vector(&mut rng);
            assert!((v.length() - 1.0).abs() < 1e-5);
        }
    }
}
