//! Scalar conversion library.
//!
//! Pure, per-channel conversions between the six element encodings at any
//! storage width. The formulas follow the GLSL `packUnorm`/`unpackUnorm`
//! conventions:
//!
//! - norm -> float divides by the source type's maximum, and clamps signed
//!   results to `>= -1` because `MIN` has one more step than `MAX`.
//! - float -> norm clamps to `[0, 1]` or `[-1, 1]`, scales by the
//!   destination maximum, and truncates.
//! - norm -> norm keeps "1.0" at "1.0": narrowing shifts, widening to an
//!   exactly doubled unsigned width duplicates the bit pattern
//!   (`0xAB -> 0xABAB`), every other widening round-trips through `f64`.
//! - sRGB uses a plain 2.2 gamma, decoded as `v^2.2` and encoded as
//!   `v^(1/2.2)`. This is deliberately the reverse of a literal
//!   "decode with `1/2.2`" reading: stored values are gamma-encoded.
//!
//! Intermediate values are always carried in `f64`.
//!
//! # Storage traits
//!
//! The functions are generic over [`Integer`] (every integer storage type),
//! [`Unsigned`] (the storage types usable for sRGB) and [`Float`]
//! (`Half`, `f32`, `f64`).
//!
//! ```rust
//! use that_core::scalar::{norm_to_float, norm_to_norm};
//!
//! let f: f32 = norm_to_float(255u8);
//! assert_eq!(f, 1.0);
//!
//! let wide: u16 = norm_to_norm(0x10u8);
//! assert_eq!(wide, 0x1010);
//! ```

use crate::half::Half;
use bytemuck::Pod;
use std::cmp::Ordering;
use std::fmt;

/// Decoding exponent of the sRGB approximation.
pub const SRGB_GAMMA: f64 = 2.2;

/// A channel storage type.
pub trait Scalar: Pod + Default + PartialEq + fmt::Debug + Send + Sync + 'static {}

/// Integer channel storage: `u8..u64`, `i8..i64`.
pub trait Integer: Scalar {
    /// Width in bits.
    const BITS: u32;
    /// Whether the type is signed.
    const SIGNED: bool;

    /// `MAX` as `f64`.
    fn max_f64() -> f64;
    /// Value as `f64`.
    fn to_f64(self) -> f64;
    /// Truncating, saturating conversion from `f64` (NaN becomes 0).
    fn from_f64(v: f64) -> Self;
    /// Value as `i128`.
    fn to_i128(self) -> i128;
    /// Wrapping conversion from `i128`.
    fn from_i128(v: i128) -> Self;
    /// Raw two's complement bit pattern, zero-extended to 64 bits.
    fn to_bits(self) -> u64;
    /// Value from the low `BITS` bits of `bits`.
    fn from_bits(bits: u64) -> Self;

    /// Whether the value is below zero.
    #[inline]
    fn is_negative(self) -> bool {
        self.to_i128() < 0
    }
}

/// Unsigned integer storage, the only valid sRGB storage.
pub trait Unsigned: Integer {}

/// Floating point storage: [`Half`], `f32`, `f64`.
pub trait Float: Scalar {
    /// Value as `f64`.
    fn to_f64(self) -> f64;
    /// Rounded conversion from `f64`.
    fn from_f64(v: f64) -> Self;
}

macro_rules! impl_integer {
    ($($t:ty => $bits:ty, $signed:expr);* $(;)?) => {$(
        impl Scalar for $t {}

        impl Integer for $t {
            const BITS: u32 = <$t>::BITS;
            const SIGNED: bool = $signed;

            #[inline]
            fn max_f64() -> f64 {
                <$t>::MAX as f64
            }
            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }
            #[inline]
            fn from_f64(v: f64) -> Self {
                v as $t
            }
            #[inline]
            fn to_i128(self) -> i128 {
                self as i128
            }
            #[inline]
            fn from_i128(v: i128) -> Self {
                v as $t
            }
            #[inline]
            fn to_bits(self) -> u64 {
                self as $bits as u64
            }
            #[inline]
            fn from_bits(bits: u64) -> Self {
                bits as $bits as $t
            }
        }
    )*};
}

impl_integer! {
    u8 => u8, false;
    u16 => u16, false;
    u32 => u32, false;
    u64 => u64, false;
    i8 => u8, true;
    i16 => u16, true;
    i32 => u32, true;
    i64 => u64, true;
}

impl Unsigned for u8 {}
impl Unsigned for u16 {}
impl Unsigned for u32 {}
impl Unsigned for u64 {}

impl Scalar for Half {}
impl Scalar for f32 {}
impl Scalar for f64 {}

impl Float for Half {
    #[inline]
    fn to_f64(self) -> f64 {
        f64::from(self.to_f32())
    }
    #[inline]
    fn from_f64(v: f64) -> Self {
        Half::from_f32(v as f32)
    }
}

impl Float for f32 {
    #[inline]
    fn to_f64(self) -> f64 {
        f64::from(self)
    }
    #[inline]
    fn from_f64(v: f64) -> Self {
        v as f32
    }
}

impl Float for f64 {
    #[inline]
    fn to_f64(self) -> f64 {
        self
    }
    #[inline]
    fn from_f64(v: f64) -> Self {
        v
    }
}

// ============================================================================
// Float <-> float, int <-> float, int <-> int
// ============================================================================

/// Converts between float widths.
#[inline]
pub fn float_to_float<D: Float, S: Float>(f: S) -> D {
    D::from_f64(f.to_f64())
}

/// Plain numeric cast from an integer.
#[inline]
pub fn int_to_float<D: Float, S: Integer>(n: S) -> D {
    D::from_f64(n.to_f64())
}

/// Plain numeric cast to an integer. Saturates out of range, NaN gives 0.
#[inline]
pub fn float_to_int<D: Integer, S: Float>(f: S) -> D {
    D::from_f64(f.to_f64())
}

/// Bit-level cast between integers: truncates, sign- or zero-extends.
#[inline]
pub fn int_to_int<D: Integer, S: Integer>(n: S) -> D {
    D::from_i128(n.to_i128())
}

// ============================================================================
// Normalized
// ============================================================================

/// Maps a normalized integer to `[0, 1]` or `[-1, 1]`.
#[inline]
pub fn norm_to_float<D: Float, S: Integer>(n: S) -> D {
    D::from_f64(norm_to_f64(n))
}

/// Maps a float in `[0, 1]` or `[-1, 1]` to a normalized integer.
///
/// Out of range inputs are clamped. The scaled value is truncated.
#[inline]
pub fn float_to_norm<D: Integer, S: Float>(f: S) -> D {
    f64_to_norm(f.to_f64())
}

#[inline]
fn norm_to_f64<S: Integer>(n: S) -> f64 {
    let v = n.to_f64() / S::max_f64();
    if S::SIGNED { v.max(-1.0) } else { v }
}

#[inline]
fn f64_to_norm<D: Integer>(v: f64) -> D {
    let clamped = if D::SIGNED {
        v.clamp(-1.0, 1.0)
    } else {
        v.clamp(0.0, 1.0)
    };
    D::from_f64(clamped * D::max_f64())
}

/// Converts between normalized integer types so that 0 and 1.0 are kept.
///
/// # Example
///
/// ```rust
/// use that_core::scalar::norm_to_norm;
///
/// assert_eq!(norm_to_norm::<u16, u8>(0xFF), 0xFFFF);
/// assert_eq!(norm_to_norm::<i8, u8>(255), 127);
/// assert_eq!(norm_to_norm::<u8, i8>(127), 255);
/// assert_eq!(norm_to_norm::<u8, i8>(-5), 0);
/// ```
pub fn norm_to_norm<D: Integer, S: Integer>(n: S) -> D {
    match S::BITS.cmp(&D::BITS) {
        Ordering::Equal => match (S::SIGNED, D::SIGNED) {
            (false, true) => D::from_bits(n.to_bits() >> 1),
            (true, false) => {
                if n.is_negative() {
                    return D::from_bits(0);
                }
                let widened = n.to_bits() << 1;
                // upper half gets +1 so that MAX maps to MAX
                let top = 1u64 << (D::BITS - 1);
                D::from_bits(if widened & top != 0 { widened + 1 } else { widened })
            }
            _ => D::from_bits(n.to_bits()),
        },
        Ordering::Greater => {
            let diff = S::BITS - D::BITS;
            match (S::SIGNED, D::SIGNED) {
                (false, true) => D::from_bits(n.to_bits() >> (diff + 1)),
                (true, false) => {
                    if n.is_negative() {
                        D::from_bits(0)
                    } else {
                        D::from_bits(n.to_bits() >> (diff - 1))
                    }
                }
                _ => D::from_bits(n.to_bits() >> diff),
            }
        }
        Ordering::Less => {
            if !S::SIGNED && !D::SIGNED && D::BITS == 2 * S::BITS {
                let bits = n.to_bits();
                D::from_bits((bits << S::BITS) | bits)
            } else {
                f64_to_norm(norm_to_f64(n))
            }
        }
    }
}

// ============================================================================
// sRGB
// ============================================================================

/// Decodes a gamma-encoded value to linear float.
#[inline]
pub fn srgb_to_float<D: Float, S: Unsigned>(s: S) -> D {
    D::from_f64(srgb_to_f64(s))
}

/// Encodes a linear float. Inputs are clamped to `[0, 1]`.
#[inline]
pub fn float_to_srgb<D: Unsigned, S: Float>(f: S) -> D {
    f64_to_srgb(f.to_f64())
}

/// Decodes sRGB into a normalized integer.
#[inline]
pub fn srgb_to_norm<D: Integer, S: Unsigned>(s: S) -> D {
    f64_to_norm(srgb_to_f64(s))
}

/// Encodes a normalized integer as sRGB.
#[inline]
pub fn norm_to_srgb<D: Unsigned, S: Integer>(n: S) -> D {
    f64_to_srgb(norm_to_f64(n))
}

/// Re-quantizes sRGB to another width. Same width is a copy.
#[inline]
pub fn srgb_to_srgb<D: Unsigned, S: Unsigned>(s: S) -> D {
    if S::BITS == D::BITS {
        D::from_bits(s.to_bits())
    } else {
        f64_to_srgb(srgb_to_f64(s))
    }
}

#[inline]
fn srgb_to_f64<S: Unsigned>(s: S) -> f64 {
    norm_to_f64(s).powf(SRGB_GAMMA)
}

#[inline]
fn f64_to_srgb<D: Unsigned>(v: f64) -> D {
    f64_to_norm(v.clamp(0.0, 1.0).powf(1.0 / SRGB_GAMMA))
}
