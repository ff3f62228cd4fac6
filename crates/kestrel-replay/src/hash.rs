//! Hashing for frame comparison.
//!
//! Uses FNV-1a over a frame's fixed-layout encoding. Not cryptographically
//! secure; used to label desyncs in logs and to compare frames cheaply.

use kestrel_core::Encode;

/// FNV-1a offset basis for 64-bit.
const FNV_OFFSET: u64 = 0xcbf29ce484222325;
/// FNV-1a prime for 64-bit.
const FNV_PRIME: u64 = 0x00000100000001B3;

/// Feed a byte slice into an FNV-1a hash state.
#[inline]
fn fnv1a(mut hash: u64, bytes: &[u8]) -> u64 {
    for &b in bytes {
        hash = (hash ^ b as u64).wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Hash raw bytes with FNV-1a.
pub fn bytes_hash(bytes: &[u8]) -> u64 {
    fnv1a(FNV_OFFSET, bytes)
}

/// Hash a frame's encoding. Bit-equal frames hash equal.
pub fn frame_hash<F: Encode>(frame: &F) -> u64 {
    bytes_hash(&frame.to_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_hashes_to_offset() {
        assert_eq!(bytes_hash(&[]), FNV_OFFSET);
    }

    #[test]
    fn known_vector() {
        // FNV-1a 64 of "a".
        assert_eq!(bytes_hash(b"a"), 0xaf63dc4c8601ec8c);
    }

    #[test]
    fn frame_hash_sees_float_bits() {
        assert_ne!(frame_hash(&0.0f32), frame_hash(&-0.0f32));
        assert_eq!(frame_hash(&[1.5f32, 2.0]), frame_hash(&[1.5f32, 2.0]));
    }
}
