//! 16-bit half-precision storage type.
//!
//! [`Half`] stores 1 sign bit, 5 exponent bits (bias 15) and 10 mantissa
//! bits. It is a storage format only: values are widened to `f32` for any
//! arithmetic and narrowed back when written into a pixel buffer.
//!
//! The conversions are explicit shift/mask operations over the bit layout
//! constants below, so the exact rounding behavior is visible:
//!
//! - f32 -> half rounds to nearest by looking at the highest discarded
//!   mantissa bit (ties round away from zero). A carry may ripple into the
//!   exponent, which correctly rounds up to the next binade or to infinity.
//! - Exponents above the half range become infinity. Exponents below it
//!   produce half denormals, or signed zero past the denormal range.
//! - half -> f32 is exact. Denormals are renormalized.
//!
//! # Interop
//!
//! [`Half`] converts bit-for-bit to and from [`::half::f16`].
//!
//! ```rust
//! use that_core::Half;
//!
//! let h = Half::from_f32(0.5);
//! assert_eq!(h.to_bits(), 0x3800);
//! assert_eq!(h.to_f32(), 0.5);
//! ```

use bytemuck::{Pod, Zeroable};
use std::fmt;

/// Bit layout of an IEEE-754 binary32 value.
pub mod f32_layout {
    /// Sign bit offset.
    pub const SIGN_SHIFT: u32 = 31;
    /// Exponent field offset.
    pub const EXP_SHIFT: u32 = 23;
    /// Exponent field mask (after shifting).
    pub const EXP_MASK: u32 = 0xFF;
    /// Mantissa field mask.
    pub const MANT_MASK: u32 = 0x7F_FFFF;
    /// Implicit leading mantissa bit.
    pub const MANT_IMPLICIT: u32 = 0x80_0000;
    /// Exponent bias.
    pub const BIAS: i32 = 127;
}

/// Bit layout of an IEEE-754 binary16 value.
pub mod f16_layout {
    /// Sign bit offset.
    pub const SIGN_SHIFT: u32 = 15;
    /// Exponent field offset.
    pub const EXP_SHIFT: u32 = 10;
    /// Exponent field mask (after shifting).
    pub const EXP_MASK: u16 = 0x1F;
    /// Mantissa field mask.
    pub const MANT_MASK: u16 = 0x3FF;
    /// Implicit leading mantissa bit.
    pub const MANT_IMPLICIT: u16 = 0x400;
    /// Exponent bias.
    pub const BIAS: i32 = 15;
}

/// Mantissa bits dropped when narrowing binary32 to binary16.
const MANT_DROP: u32 = 13;

/// Half-precision float used as pixel storage.
///
/// Equality and hashing compare bit patterns, so `+0 != -0` and a NaN equals
/// itself.
#[repr(transparent)]
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Half(u16);

impl Half {
    /// Positive zero.
    pub const ZERO: Half = Half(0x0000);
    /// One.
    pub const ONE: Half = Half(0x3C00);
    /// Largest finite value (65504).
    pub const MAX: Half = Half(0x7BFF);
    /// Positive infinity.
    pub const INFINITY: Half = Half(0x7C00);
    /// Negative infinity.
    pub const NEG_INFINITY: Half = Half(0xFC00);

    /// Creates a half from its raw bit pattern.
    #[inline]
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// Returns the raw bit pattern.
    #[inline]
    pub const fn to_bits(self) -> u16 {
        self.0
    }

    /// Narrows an `f32` to half precision.
    pub fn from_f32(value: f32) -> Self {
        use f32_layout as s;

        let bits = value.to_bits();
        let sign = ((bits >> s::SIGN_SHIFT) as u16) << f16_layout::SIGN_SHIFT;
        let exp = ((bits >> s::EXP_SHIFT) & s::EXP_MASK) as i32;
        let mant = bits & s::MANT_MASK;

        if exp == s::EXP_MASK as i32 {
            // Infinity keeps an empty mantissa, NaN keeps a quiet bit.
            let payload = if mant != 0 {
                ((mant >> MANT_DROP) as u16) | 0x200
            } else {
                0
            };
            return Self(sign | Self::INFINITY.0 | payload);
        }

        let rebiased = exp - s::BIAS + f16_layout::BIAS;

        if rebiased >= f16_layout::EXP_MASK as i32 {
            return Self(sign | Self::INFINITY.0);
        }

        if rebiased <= 0 {
            if exp == 0 || rebiased < -10 {
                return Self(sign);
            }
            let full = mant | s::MANT_IMPLICIT;
            let shift = (14 - rebiased) as u32;
            let mut denormal = (full >> shift) as u16;
            if (full >> (shift - 1)) & 1 != 0 {
                denormal += 1;
            }
            return Self(sign | denormal);
        }

        let exp = (rebiased as u16) << f16_layout::EXP_SHIFT;
        let mut half = sign | exp | (mant >> MANT_DROP) as u16;
        if mant & (1 << (MANT_DROP - 1)) != 0 {
            half += 1;
        }
        Self(half)
    }

    /// Widens to `f32`. Exact for every half value.
    pub fn to_f32(self) -> f32 {
        use f16_layout as h;

        let sign = u32::from(self.0 >> h::SIGN_SHIFT) << f32_layout::SIGN_SHIFT;
        let exp = (self.0 >> h::EXP_SHIFT) & h::EXP_MASK;
        let mut mant = u32::from(self.0 & h::MANT_MASK);

        let bits = if exp == 0 {
            if mant == 0 {
                sign
            } else {
                let mut e: i32 = 1;
                while mant & u32::from(h::MANT_IMPLICIT) == 0 {
                    mant <<= 1;
                    e -= 1;
                }
                mant &= u32::from(h::MANT_MASK);
                let exp32 = (e - h::BIAS + f32_layout::BIAS) as u32;
                sign | (exp32 << f32_layout::EXP_SHIFT) | (mant << MANT_DROP)
            }
        } else if exp == h::EXP_MASK {
            sign | (f32_layout::EXP_MASK << f32_layout::EXP_SHIFT) | (mant << MANT_DROP)
        } else {
            let exp32 = (i32::from(exp) - h::BIAS + f32_layout::BIAS) as u32;
            sign | (exp32 << f32_layout::EXP_SHIFT) | (mant << MANT_DROP)
        };
        f32::from_bits(bits)
    }

    /// Returns `true` for NaN patterns.
    #[inline]
    pub fn is_nan(self) -> bool {
        self.0 & 0x7C00 == 0x7C00 && self.0 & f16_layout::MANT_MASK != 0
    }

    /// Returns `true` for positive or negative infinity.
    #[inline]
    pub fn is_infinite(self) -> bool {
        self.0 & 0x7FFF == 0x7C00
    }

    /// Returns `true` for values that are neither NaN nor infinite.
    #[inline]
    pub fn is_finite(self) -> bool {
        self.0 & 0x7C00 != 0x7C00
    }
}

impl fmt::Debug for Half {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Half({} / {:#06x})", self.to_f32(), self.0)
    }
}

impl fmt::Display for Half {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_f32(), f)
    }
}

impl From<f32> for Half {
    #[inline]
    fn from(value: f32) -> Self {
        Self::from_f32(value)
    }
}

impl From<Half> for f32 {
    #[inline]
    fn from(value: Half) -> Self {
        value.to_f32()
    }
}

impl From<::half::f16> for Half {
    #[inline]
    fn from(value: ::half::f16) -> Self {
        Self(value.to_bits())
    }
}

impl From<Half> for ::half::f16 {
    #[inline]
    fn from(value: Half) -> Self {
        ::half::f16::from_bits(value.0)
    }
}
