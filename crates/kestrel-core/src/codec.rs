//! Fixed-layout binary encode/decode.
//!
//! All integers and floats are little-endian, floats are written by bit
//! pattern, and every implementor has a constant encoded length. There are
//! no length prefixes, no alignment padding and no self-describing schema:
//! a record is exactly `ENCODED_LEN` bytes. This is what makes the save
//! file's side array a flat block whose size can be checked up front, and
//! what gives [`bit_eq`] its meaning.

use std::io::{Read, Write};

use glam::Vec2;

use crate::error::CodecError;
use crate::id::TickId;

/// A value with a fixed-size binary encoding.
pub trait Encode {
    /// Exact number of bytes written by [`Encode::encode`].
    const ENCODED_LEN: usize;

    /// Write the value in its fixed layout.
    fn encode(&self, w: &mut dyn Write) -> Result<(), CodecError>;

    /// Encode into a freshly allocated buffer.
    fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Self::ENCODED_LEN);
        self.encode(&mut buf)
            .expect("writing into a Vec<u8> cannot fail");
        buf
    }
}

/// A value that can be reconstructed from its fixed-size encoding.
pub trait Decode: Sized {
    /// Read exactly `ENCODED_LEN` bytes and rebuild the value.
    fn decode(r: &mut dyn Read) -> Result<Self, CodecError>;
}

/// Bit-exact equality: two values are equal iff their encodings are equal.
///
/// Unlike `f32`'s `PartialEq`, this treats `NaN` payloads as comparable and
/// distinguishes `0.0` from `-0.0`, which is what determinism checks need.
pub fn bit_eq<T: Encode>(a: &T, b: &T) -> bool {
    a.to_bytes() == b.to_bytes()
}

macro_rules! le_codec {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Encode for $ty {
                const ENCODED_LEN: usize = std::mem::size_of::<$ty>();

                fn encode(&self, w: &mut dyn Write) -> Result<(), CodecError> {
                    w.write_all(&self.to_le_bytes())?;
                    Ok(())
                }
            }

            impl Decode for $ty {
                fn decode(r: &mut dyn Read) -> Result<Self, CodecError> {
                    let mut buf = [0u8; std::mem::size_of::<$ty>()];
                    r.read_exact(&mut buf)?;
                    Ok(<$ty>::from_le_bytes(buf))
                }
            }
        )*
    };
}

le_codec!(u8, u16, u32, u64, i32, i64, f32, f64);

impl Encode for () {
    const ENCODED_LEN: usize = 0;

    fn encode(&self, _w: &mut dyn Write) -> Result<(), CodecError> {
        Ok(())
    }
}

impl Decode for () {
    fn decode(_r: &mut dyn Read) -> Result<Self, CodecError> {
        Ok(())
    }
}

impl Encode for bool {
    const ENCODED_LEN: usize = 1;

    fn encode(&self, w: &mut dyn Write) -> Result<(), CodecError> {
        (*self as u8).encode(w)
    }
}

impl Decode for bool {
    fn decode(r: &mut dyn Read) -> Result<Self, CodecError> {
        match u8::decode(r)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(CodecError::Malformed {
                detail: format!("invalid bool byte {other}"),
            }),
        }
    }
}

impl Encode for TickId {
    const ENCODED_LEN: usize = 8;

    fn encode(&self, w: &mut dyn Write) -> Result<(), CodecError> {
        self.0.encode(w)
    }
}

impl Decode for TickId {
    fn decode(r: &mut dyn Read) -> Result<Self, CodecError> {
        Ok(TickId(u64::decode(r)?))
    }
}

impl Encode for Vec2 {
    const ENCODED_LEN: usize = 8;

    fn encode(&self, w: &mut dyn Write) -> Result<(), CodecError> {
        self.x.encode(w)?;
        self.y.encode(w)
    }
}

impl Decode for Vec2 {
    fn decode(r: &mut dyn Read) -> Result<Self, CodecError> {
        let x = f32::decode(r)?;
        let y = f32::decode(r)?;
        Ok(Vec2::new(x, y))
    }
}

impl<T: Encode, const N: usize> Encode for [T; N] {
    const ENCODED_LEN: usize = T::ENCODED_LEN * N;

    fn encode(&self, w: &mut dyn Write) -> Result<(), CodecError> {
        for item in self {
            item.encode(w)?;
        }
        Ok(())
    }
}

impl<T: Decode + Default + Copy, const N: usize> Decode for [T; N] {
    fn decode(r: &mut dyn Read) -> Result<Self, CodecError> {
        let mut out = [T::default(); N];
        for slot in &mut out {
            *slot = T::decode(r)?;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip<T: Encode + Decode>(v: &T) -> T {
        let bytes = v.to_bytes();
        assert_eq!(bytes.len(), T::ENCODED_LEN);
        T::decode(&mut bytes.as_slice()).unwrap()
    }

    #[test]
    fn integers_are_little_endian() {
        assert_eq!(0x0102_0304u32.to_bytes(), vec![4, 3, 2, 1]);
    }

    #[test]
    fn floats_round_trip_by_bits() {
        let nan = f32::from_bits(0x7fc0_1234);
        assert_eq!(round_trip(&nan).to_bits(), nan.to_bits());
        assert_eq!(round_trip(&-0.0f32).to_bits(), (-0.0f32).to_bits());
    }

    #[test]
    fn bit_eq_distinguishes_signed_zero() {
        assert!(0.0f32 == -0.0f32);
        assert!(!bit_eq(&0.0f32, &-0.0f32));
    }

    #[test]
    fn bit_eq_is_reflexive_for_nan() {
        let nan = f32::NAN;
        assert!(bit_eq(&nan, &nan));
    }

    #[test]
    fn invalid_bool_is_malformed() {
        let err = bool::decode(&mut [2u8].as_slice()).unwrap_err();
        assert!(matches!(err, CodecError::Malformed { .. }));
    }

    #[test]
    fn short_read_is_io_error() {
        let err = u64::decode(&mut [1u8, 2, 3].as_slice()).unwrap_err();
        assert!(matches!(err, CodecError::Io(_)));
    }

    #[test]
    fn arrays_and_vectors_round_trip() {
        let v = [Vec2::new(1.5, -2.0), Vec2::ZERO, Vec2::new(0.25, 8.0)];
        assert_eq!(<[Vec2; 3]>::ENCODED_LEN, 24);
        assert_eq!(round_trip(&v), v);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn u64_round_trip(v in any::<u64>()) {
                prop_assert_eq!(round_trip(&v), v);
            }

            #[test]
            fn f64_bits_round_trip(bits in any::<u64>()) {
                let v = f64::from_bits(bits);
                prop_assert_eq!(round_trip(&v).to_bits(), bits);
            }
        }
    }
}
