//! Pixel format descriptors.
//!
//! A pixel format is the triple ([`ElementType`], element size in bytes,
//! channel count). The pair (element type, element size) names the scalar
//! storage type of every channel:
//!
//! | element type          | 1 byte | 2 bytes  | 4 bytes | 8 bytes |
//! |-----------------------|--------|----------|---------|---------|
//! | `UNORM`, `UINT`, `sRGB` | `u8`   | `u16`    | `u32`   | `u64`   |
//! | `SNORM`, `SINT`       | `i8`   | `i16`    | `i32`   | `i64`   |
//! | `FLOAT`               | -      | [`Half`] | `f32`   | `f64`   |
//!
//! # Usage
//!
//! ```rust
//! use that_core::format::{ElementType, FormatInfo};
//!
//! let rgb8 = FormatInfo::new(ElementType::Unorm, 1, 3);
//! assert_eq!(rgb8.pixel_size(), 3);
//! assert_eq!(rgb8.to_string(), "Format(UNORM_1 x 3)");
//!
//! let parsed: FormatInfo = "float16x4".parse().unwrap();
//! assert_eq!(parsed, FormatInfo::new(ElementType::Float, 2, 4));
//! ```
//!
//! Typed code can let the compiler build the descriptor:
//!
//! ```rust
//! use that_core::format::{ElementType, FormatInfo};
//!
//! let f = FormatInfo::deduce::<[f32; 4]>();
//! assert_eq!(f, FormatInfo::new(ElementType::Float, 4, 4));
//! ```
//!
//! [`Half`]: crate::half::Half

use crate::error::{Error, Result};
use crate::half::Half;
use bytemuck::Pod;
use std::fmt;
use std::str::FromStr;

/// Numeric encoding of one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ElementType {
    /// Unsigned normalized, `[0, 1]`.
    #[default]
    Unorm,
    /// Signed normalized, `[-1, 1]`.
    Snorm,
    /// Unsigned integer.
    Uint,
    /// Signed integer.
    Sint,
    /// Gamma-encoded unsigned normalized.
    Srgb,
    /// IEEE floating point.
    Float,
}

impl ElementType {
    /// All element types, in declaration order.
    pub const ALL: [ElementType; 6] = [
        Self::Unorm,
        Self::Snorm,
        Self::Uint,
        Self::Sint,
        Self::Srgb,
        Self::Float,
    ];

    /// Canonical upper-case name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Unorm => "UNORM",
            Self::Snorm => "SNORM",
            Self::Uint => "UINT",
            Self::Sint => "SINT",
            Self::Srgb => "sRGB",
            Self::Float => "FLOAT",
        }
    }

    /// `UINT` or `SINT`.
    #[inline]
    pub const fn is_int(self) -> bool {
        matches!(self, Self::Uint | Self::Sint)
    }

    /// `UNORM` or `SNORM`.
    #[inline]
    pub const fn is_norm(self) -> bool {
        matches!(self, Self::Unorm | Self::Snorm)
    }

    /// `sRGB`.
    #[inline]
    pub const fn is_srgb(self) -> bool {
        matches!(self, Self::Srgb)
    }

    /// `FLOAT`.
    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float)
    }

    /// Any integer-backed encoding: int, norm or sRGB.
    #[inline]
    pub const fn is_int_like(self) -> bool {
        !self.is_float()
    }

    /// Whether the storage type is signed.
    #[inline]
    pub const fn is_signed(self) -> bool {
        matches!(self, Self::Snorm | Self::Sint | Self::Float)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ElementType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|ty| ty.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::ParseFormat(s.to_string()))
    }
}

/// Describes the encoding of one pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FormatInfo {
    /// Encoding of every channel.
    pub ty: ElementType,
    /// Bytes per channel: 1, 2, 4 or 8.
    pub elem_size: u8,
    /// Number of channels, at least 1.
    pub channels: u8,
}

impl Default for FormatInfo {
    fn default() -> Self {
        Self::new(ElementType::Unorm, 1, 4)
    }
}

impl FormatInfo {
    /// Creates a format descriptor. Use [`validate`](Self::validate) to
    /// check it.
    #[inline]
    pub const fn new(ty: ElementType, elem_size: u8, channels: u8) -> Self {
        Self {
            ty,
            elem_size,
            channels,
        }
    }

    /// Bytes per pixel.
    #[inline]
    pub const fn pixel_size(&self) -> usize {
        self.elem_size as usize * self.channels as usize
    }

    /// Element size in bits.
    #[inline]
    pub const fn bits(&self) -> u32 {
        self.elem_size as u32 * 8
    }

    /// Same channel count with a different encoding.
    #[inline]
    pub const fn with_element(self, ty: ElementType, elem_size: u8) -> Self {
        Self {
            ty,
            elem_size,
            ..self
        }
    }

    /// Whether a storage type exists for this element type and size.
    #[inline]
    pub const fn has_storage(&self) -> bool {
        match self.elem_size {
            1 => !self.ty.is_float(),
            2 | 4 | 8 => true,
            _ => false,
        }
    }

    /// Checks the structural invariants of the descriptor.
    ///
    /// `FLOAT` at 1 byte passes here; it is rejected later, when a
    /// conversion kernel is requested for it.
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.elem_size, 1 | 2 | 4 | 8) {
            return Err(Error::invalid_format(*self, "element size must be 1, 2, 4 or 8 bytes"));
        }
        if self.channels == 0 {
            return Err(Error::invalid_format(*self, "channel count must be at least 1"));
        }
        Ok(())
    }

    /// Derives the descriptor of a scalar or fixed-size array type.
    #[inline]
    pub const fn deduce<T: PixelType>() -> Self {
        T::FORMAT
    }

    /// Short lower-case form accepted by [`FromStr`], e.g. `unorm8x3`.
    pub fn short_name(&self) -> String {
        format!("{}{}x{}", self.ty.name().to_ascii_lowercase(), self.bits(), self.channels)
    }
}

impl fmt::Display for FormatInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Format({}_{} x {})", self.ty, self.elem_size, self.channels)
    }
}

impl FromStr for FormatInfo {
    type Err = Error;

    /// Parses `<type><bits>[x<channels>]`, e.g. `srgb8x4` or `float32`.
    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        let bad = || Error::ParseFormat(s.to_string());

        let ty = ElementType::ALL
            .into_iter()
            .find(|ty| lower.starts_with(&ty.name().to_ascii_lowercase()))
            .ok_or_else(bad)?;
        let rest = &lower[ty.name().len()..];

        let (bits, channels) = match rest.split_once('x') {
            Some((bits, channels)) => (bits, channels),
            None => (rest, "1"),
        };
        let bits: u32 = bits.parse().map_err(|_| bad())?;
        let channels: u8 = channels.parse().map_err(|_| bad())?;
        if bits % 8 != 0 {
            return Err(bad());
        }

        let elem_size = u8::try_from(bits / 8).map_err(|_| bad())?;
        let format = Self::new(ty, elem_size, channels);
        format.validate()?;
        Ok(format)
    }
}

/// Types whose memory layout is a pixel of a known format.
///
/// Implemented for the scalar storage types and for `[T; N]` of them.
pub trait PixelType: Pod {
    /// The format of one value of this type.
    const FORMAT: FormatInfo;
}

macro_rules! impl_pixel_type {
    ($($t:ty => $ty:ident),* $(,)?) => {$(
        impl PixelType for $t {
            const FORMAT: FormatInfo =
                FormatInfo::new(ElementType::$ty, size_of::<$t>() as u8, 1);
        }
    )*};
}

impl_pixel_type! {
    u8 => Uint, u16 => Uint, u32 => Uint, u64 => Uint,
    i8 => Sint, i16 => Sint, i32 => Sint, i64 => Sint,
    Half => Float, f32 => Float, f64 => Float,
}

impl<T: PixelType, const N: usize> PixelType for [T; N] {
    const FORMAT: FormatInfo = FormatInfo::new(
        T::FORMAT.ty,
        T::FORMAT.elem_size,
        (T::FORMAT.channels as usize * N) as u8,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_size() {
        assert_eq!(FormatInfo::new(ElementType::Unorm, 1, 3).pixel_size(), 3);
        assert_eq!(FormatInfo::new(ElementType::Float, 8, 4).pixel_size(), 32);
        assert_eq!(FormatInfo::new(ElementType::Float, 2, 1).bits(), 16);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            FormatInfo::new(ElementType::Srgb, 1, 4).to_string(),
            "Format(sRGB_1 x 4)"
        );
        assert_eq!(ElementType::Snorm.to_string(), "SNORM");
    }

    #[test]
    fn test_parse() {
        let f: FormatInfo = "unorm8x3".parse().unwrap();
        assert_eq!(f, FormatInfo::new(ElementType::Unorm, 1, 3));
        let f: FormatInfo = "SINT32".parse().unwrap();
        assert_eq!(f, FormatInfo::new(ElementType::Sint, 4, 1));
        let f: FormatInfo = "srgb8x4".parse().unwrap();
        assert_eq!(f.short_name(), "srgb8x4");

        assert!("unorm12x3".parse::<FormatInfo>().is_err());
        assert!("unorm24x3".parse::<FormatInfo>().is_err());
        assert!("rgb8".parse::<FormatInfo>().is_err());
        assert!("float32x0".parse::<FormatInfo>().is_err());
        assert!("float".parse::<FormatInfo>().is_err());
    }

    #[test]
    fn test_element_type_parse() {
        assert_eq!("srgb".parse::<ElementType>().unwrap(), ElementType::Srgb);
        assert_eq!("Float".parse::<ElementType>().unwrap(), ElementType::Float);
        assert!("half".parse::<ElementType>().is_err());
    }

    #[test]
    fn test_validate() {
        assert!(FormatInfo::new(ElementType::Uint, 3, 1).validate().is_err());
        assert!(FormatInfo::new(ElementType::Uint, 1, 0).validate().is_err());
        assert!(FormatInfo::new(ElementType::Float, 1, 1).validate().is_ok());
        assert!(!FormatInfo::new(ElementType::Float, 1, 1).has_storage());
        assert!(FormatInfo::new(ElementType::Float, 2, 1).has_storage());
    }

    #[test]
    fn test_deduce() {
        assert_eq!(FormatInfo::deduce::<u8>(), FormatInfo::new(ElementType::Uint, 1, 1));
        assert_eq!(FormatInfo::deduce::<i16>(), FormatInfo::new(ElementType::Sint, 2, 1));
        assert_eq!(FormatInfo::deduce::<Half>(), FormatInfo::new(ElementType::Float, 2, 1));
        assert_eq!(FormatInfo::deduce::<[f64; 3]>(), FormatInfo::new(ElementType::Float, 8, 3));
        assert_eq!(FormatInfo::deduce::<[u16; 4]>().pixel_size(), 8);
    }

    #[test]
    fn test_families() {
        assert!(ElementType::Srgb.is_int_like());
        assert!(ElementType::Snorm.is_norm());
        assert!(ElementType::Sint.is_signed());
        assert!(!ElementType::Uint.is_signed());
        assert!(!ElementType::Float.is_int_like());
    }
}
