//! Compile-time layout versioning.
//!
//! Every type that ends up inside a save file implements [`Versioned`].
//! Composite types fold the versions and `size_of` of their members into
//! their own constant with [`fold_version`], so changing any member's
//! layout changes the version of every aggregate that contains it. Save
//! files carry the folded version in their first field and are rejected
//! on mismatch.

/// FNV-1a offset basis for 64-bit.
const FNV_OFFSET: u64 = 0xcbf29ce484222325;
/// FNV-1a prime for 64-bit.
const FNV_PRIME: u64 = 0x00000100000001B3;

/// A type whose persisted layout is identified by a compile-time constant.
pub trait Versioned {
    /// Layout version. Must change whenever the encoded layout changes.
    const VERSION: u64;
}

/// Fold a list of version components into one version with FNV-1a.
///
/// Order matters: `[a, b]` and `[b, a]` produce different versions.
pub const fn fold_version(parts: &[u64]) -> u64 {
    let mut hash = FNV_OFFSET;
    let mut i = 0;
    while i < parts.len() {
        let bytes = parts[i].to_le_bytes();
        let mut j = 0;
        while j < bytes.len() {
            hash = (hash ^ bytes[j] as u64).wrapping_mul(FNV_PRIME);
            j += 1;
        }
        i += 1;
    }
    hash
}

/// Version component for a member: its own version plus its in-memory size.
pub const fn version_of<T: Versioned>() -> u64 {
    fold_version(&[T::VERSION, std::mem::size_of::<T>() as u64])
}

macro_rules! primitive_version {
    ($($ty:ty => $tag:expr),* $(,)?) => {
        $(
            impl Versioned for $ty {
                const VERSION: u64 = fold_version(&[$tag, std::mem::size_of::<$ty>() as u64]);
            }
        )*
    };
}

primitive_version! {
    () => 0,
    bool => 1,
    u8 => 2,
    u16 => 3,
    u32 => 4,
    u64 => 5,
    i32 => 6,
    i64 => 7,
    f32 => 8,
    f64 => 9,
    glam::Vec2 => 10,
    crate::id::TickId => 11,
}

impl<T: Versioned, const N: usize> Versioned for [T; N] {
    const VERSION: u64 = fold_version(&[T::VERSION, N as u64]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_is_order_sensitive() {
        assert_ne!(fold_version(&[1, 2]), fold_version(&[2, 1]));
    }

    #[test]
    fn fold_of_empty_is_offset_basis() {
        assert_eq!(fold_version(&[]), FNV_OFFSET);
    }

    #[test]
    fn primitive_versions_are_distinct() {
        let versions = [
            <u32 as Versioned>::VERSION,
            <i32 as Versioned>::VERSION,
            <f32 as Versioned>::VERSION,
            <u64 as Versioned>::VERSION,
            <f64 as Versioned>::VERSION,
        ];
        for (i, a) in versions.iter().enumerate() {
            for b in &versions[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn array_version_depends_on_length() {
        assert_ne!(<[f32; 4] as Versioned>::VERSION, <[f32; 5] as Versioned>::VERSION);
    }

    #[test]
    fn version_is_usable_in_const_context() {
        const V: u64 = version_of::<[u8; 3]>();
        assert_eq!(V, version_of::<[u8; 3]>());
    }
}
