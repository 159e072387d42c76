//! Channel and pixel dispatch.
//!
//! A conversion between two formats is resolved once into a [`PixelKernel`],
//! a monomorphized function that reads `S` scalars and writes `D` scalars
//! for one pixel. The hot loop in [`crate::processor`] then calls a single
//! function pointer per pixel.
//!
//! The encoding pair picks the channel operation:
//!
//! | src \ dst | int       | norm        | sRGB        | float          |
//! |-----------|-----------|-------------|-------------|----------------|
//! | int       | cast      | cast        | cast        | int to float   |
//! | norm      | cast      | norm->norm  | norm->sRGB  | norm->float    |
//! | sRGB      | cast      | sRGB->norm  | sRGB->sRGB  | sRGB->float    |
//! | float     | float->int| float->norm | float->sRGB | float->float   |
//!
//! Scalars are read and written unaligned in native byte order.

use crate::error::{Error, Result};
use crate::format::{ElementType, FormatInfo};
use crate::half::Half;
use crate::scalar::{self, Float, Integer, Scalar, Unsigned};

/// Converts the first `channels` channels of one pixel.
pub type PixelKernel = fn(src: &[u8], dst: &mut [u8], channels: usize);

/// A per-channel conversion from `S` to `D`.
pub trait ChannelOp<S, D> {
    /// Converts one channel value.
    fn apply(s: S) -> D;
}

macro_rules! channel_ops {
    ($($(#[$doc:meta])* $name:ident<$S:ident: $SB:ident, $D:ident: $DB:ident> => $f:path;)*) => {$(
        $(#[$doc])*
        #[derive(Debug, Clone, Copy)]
        pub struct $name;

        impl<$S: $SB, $D: $DB> ChannelOp<$S, $D> for $name {
            #[inline(always)]
            fn apply(s: $S) -> $D {
                $f(s)
            }
        }
    )*};
}

channel_ops! {
    /// Integer reinterpretation cast.
    IntCast<S: Integer, D: Integer> => scalar::int_to_int;
    /// Numeric integer to float cast.
    IntToFloat<S: Integer, D: Float> => scalar::int_to_float;
    /// Numeric float to integer cast.
    FloatToInt<S: Float, D: Integer> => scalar::float_to_int;
    /// Normalized integer to float.
    NormToFloat<S: Integer, D: Float> => scalar::norm_to_float;
    /// Float to normalized integer.
    FloatToNorm<S: Float, D: Integer> => scalar::float_to_norm;
    /// Normalized integer re-quantization.
    NormToNorm<S: Integer, D: Integer> => scalar::norm_to_norm;
    /// Normalized integer to sRGB.
    NormToSrgb<S: Integer, D: Unsigned> => scalar::norm_to_srgb;
    /// sRGB to normalized integer.
    SrgbToNorm<S: Unsigned, D: Integer> => scalar::srgb_to_norm;
    /// sRGB re-quantization.
    SrgbToSrgb<S: Unsigned, D: Unsigned> => scalar::srgb_to_srgb;
    /// sRGB decode.
    SrgbToFloat<S: Unsigned, D: Float> => scalar::srgb_to_float;
    /// sRGB encode.
    FloatToSrgb<S: Float, D: Unsigned> => scalar::float_to_srgb;
    /// Float width change.
    FloatToFloat<S: Float, D: Float> => scalar::float_to_float;
}

fn convert_channels<S: Scalar, D: Scalar, Op: ChannelOp<S, D>>(
    src: &[u8],
    dst: &mut [u8],
    channels: usize,
) {
    let src = src.chunks_exact(size_of::<S>());
    let dst = dst.chunks_exact_mut(size_of::<D>());
    for (s, d) in src.zip(dst).take(channels) {
        let value: S = bytemuck::pod_read_unaligned(s);
        d.copy_from_slice(bytemuck::bytes_of(&Op::apply(value)));
    }
}

// ============================================================================
// Kernel table
// ============================================================================

macro_rules! unsigned_dst {
    ($S:ty, $op:ty, $size:expr) => {
        match $size {
            1 => Some(convert_channels::<$S, u8, $op> as PixelKernel),
            2 => Some(convert_channels::<$S, u16, $op> as PixelKernel),
            4 => Some(convert_channels::<$S, u32, $op> as PixelKernel),
            8 => Some(convert_channels::<$S, u64, $op> as PixelKernel),
            _ => None,
        }
    };
}

macro_rules! signed_dst {
    ($S:ty, $op:ty, $size:expr) => {
        match $size {
            1 => Some(convert_channels::<$S, i8, $op> as PixelKernel),
            2 => Some(convert_channels::<$S, i16, $op> as PixelKernel),
            4 => Some(convert_channels::<$S, i32, $op> as PixelKernel),
            8 => Some(convert_channels::<$S, i64, $op> as PixelKernel),
            _ => None,
        }
    };
}

macro_rules! float_dst {
    ($S:ty, $op:ty, $size:expr) => {
        match $size {
            2 => Some(convert_channels::<$S, Half, $op> as PixelKernel),
            4 => Some(convert_channels::<$S, f32, $op> as PixelKernel),
            8 => Some(convert_channels::<$S, f64, $op> as PixelKernel),
            _ => None,
        }
    };
}

macro_rules! unsigned_src {
    ($select:ident, $size:expr, $dst:expr) => {
        match $size {
            1 => $select::<u8>($dst),
            2 => $select::<u16>($dst),
            4 => $select::<u32>($dst),
            8 => $select::<u64>($dst),
            _ => None,
        }
    };
}

macro_rules! signed_src {
    ($select:ident, $size:expr, $dst:expr) => {
        match $size {
            1 => $select::<i8>($dst),
            2 => $select::<i16>($dst),
            4 => $select::<i32>($dst),
            8 => $select::<i64>($dst),
            _ => None,
        }
    };
}

fn from_int<S: Integer>(dst: FormatInfo) -> Option<PixelKernel> {
    match dst.ty {
        ElementType::Unorm | ElementType::Uint | ElementType::Srgb => {
            unsigned_dst!(S, IntCast, dst.elem_size)
        }
        ElementType::Snorm | ElementType::Sint => signed_dst!(S, IntCast, dst.elem_size),
        ElementType::Float => float_dst!(S, IntToFloat, dst.elem_size),
    }
}

fn from_norm<S: Integer>(dst: FormatInfo) -> Option<PixelKernel> {
    match dst.ty {
        ElementType::Uint => unsigned_dst!(S, IntCast, dst.elem_size),
        ElementType::Sint => signed_dst!(S, IntCast, dst.elem_size),
        ElementType::Unorm => unsigned_dst!(S, NormToNorm, dst.elem_size),
        ElementType::Snorm => signed_dst!(S, NormToNorm, dst.elem_size),
        ElementType::Srgb => unsigned_dst!(S, NormToSrgb, dst.elem_size),
        ElementType::Float => float_dst!(S, NormToFloat, dst.elem_size),
    }
}

fn from_srgb<S: Unsigned>(dst: FormatInfo) -> Option<PixelKernel> {
    match dst.ty {
        ElementType::Uint => unsigned_dst!(S, IntCast, dst.elem_size),
        ElementType::Sint => signed_dst!(S, IntCast, dst.elem_size),
        ElementType::Unorm => unsigned_dst!(S, SrgbToNorm, dst.elem_size),
        ElementType::Snorm => signed_dst!(S, SrgbToNorm, dst.elem_size),
        ElementType::Srgb => unsigned_dst!(S, SrgbToSrgb, dst.elem_size),
        ElementType::Float => float_dst!(S, SrgbToFloat, dst.elem_size),
    }
}

fn from_float<S: Float>(dst: FormatInfo) -> Option<PixelKernel> {
    match dst.ty {
        ElementType::Uint => unsigned_dst!(S, FloatToInt, dst.elem_size),
        ElementType::Sint => signed_dst!(S, FloatToInt, dst.elem_size),
        ElementType::Unorm => unsigned_dst!(S, FloatToNorm, dst.elem_size),
        ElementType::Snorm => signed_dst!(S, FloatToNorm, dst.elem_size),
        ElementType::Srgb => unsigned_dst!(S, FloatToSrgb, dst.elem_size),
        ElementType::Float => float_dst!(S, FloatToFloat, dst.elem_size),
    }
}

/// Looks up the kernel for a pair of formats. Channel counts are ignored.
///
/// Returns `None` when either side has no storage type (e.g. `FLOAT` at
/// 1 byte).
pub fn select_kernel(src: FormatInfo, dst: FormatInfo) -> Option<PixelKernel> {
    match src.ty {
        ElementType::Uint => unsigned_src!(from_int, src.elem_size, dst),
        ElementType::Sint => signed_src!(from_int, src.elem_size, dst),
        ElementType::Unorm => unsigned_src!(from_norm, src.elem_size, dst),
        ElementType::Snorm => signed_src!(from_norm, src.elem_size, dst),
        ElementType::Srgb => unsigned_src!(from_srgb, src.elem_size, dst),
        ElementType::Float => match src.elem_size {
            2 => from_float::<Half>(dst),
            4 => from_float::<f32>(dst),
            8 => from_float::<f64>(dst),
            _ => None,
        },
    }
}

// ============================================================================
// Pixel converter
// ============================================================================

/// A resolved per-pixel conversion between two formats.
///
/// Converts `min(src.channels, dst.channels)` channels and zero-fills any
/// extra destination channels.
///
/// # Example
///
/// ```rust
/// use that_core::dispatch::PixelConverter;
/// use that_core::format::{ElementType, FormatInfo};
///
/// let conv = PixelConverter::new(
///     FormatInfo::new(ElementType::Unorm, 1, 1),
///     FormatInfo::new(ElementType::Float, 4, 2),
/// ).unwrap();
///
/// let mut out = [0xFFu8; 8];
/// conv.convert(&[255], &mut out);
/// assert_eq!(bytemuck::cast::<[u8; 8], [f32; 2]>(out), [1.0, 0.0]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PixelConverter {
    kernel: PixelKernel,
    src: FormatInfo,
    dst: FormatInfo,
}

impl PixelConverter {
    /// Resolves the kernel for `src -> dst`.
    pub fn new(src: FormatInfo, dst: FormatInfo) -> Result<Self> {
        let kernel = select_kernel(src, dst).ok_or_else(|| Error::cannot_convert(src, dst))?;
        Ok(Self { kernel, src, dst })
    }

    /// Source format.
    #[inline]
    pub fn src_format(&self) -> FormatInfo {
        self.src
    }

    /// Destination format.
    #[inline]
    pub fn dst_format(&self) -> FormatInfo {
        self.dst
    }

    /// Converts one pixel. `src` and `dst` must hold at least one pixel of
    /// their format.
    #[inline]
    pub fn convert(&self, src: &[u8], dst: &mut [u8]) {
        let shared = self.src.channels.min(self.dst.channels) as usize;
        (self.kernel)(src, dst, shared);
        let written = shared * self.dst.elem_size as usize;
        dst[written..self.dst.pixel_size()].fill(0);
    }
}

/// Copies one pixel byte-wise, truncating or zero-filling to `dst.len()`.
#[inline]
pub fn copy_pixel(src: &[u8], dst: &mut [u8]) {
    let n = src.len().min(dst.len());
    dst[..n].copy_from_slice(&src[..n]);
    dst[n..].fill(0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ElementType::{Snorm, Srgb, Uint, Unorm};

    fn converter(src: (ElementType, u8, u8), dst: (ElementType, u8, u8)) -> PixelConverter {
        let (src_ty, src_size, src_channels) = src;
        let (dst_ty, dst_size, dst_channels) = dst;
        PixelConverter::new(
            FormatInfo::new(src_ty, src_size, src_channels),
            FormatInfo::new(dst_ty, dst_size, dst_channels),
        )
        .unwrap()
    }

    fn all_formats() -> Vec<FormatInfo> {
        let mut out = Vec::new();
        for ty in ElementType::ALL {
            for size in [1u8, 2, 4, 8] {
                out.push(FormatInfo::new(ty, size, 1));
            }
        }
        out
    }

    #[test]
    fn test_kernel_table_coverage() {
        let formats = all_formats();
        let mut found = 0;
        for src in &formats {
            for dst in &formats {
                let kernel = select_kernel(*src, *dst);
                let expected = src.has_storage() && dst.has_storage();
                assert_eq!(kernel.is_some(), expected, "{src} -> {dst}");
                found += kernel.is_some() as usize;
            }
        }
        assert_eq!(found, 23 * 23);
    }

    #[test]
    fn test_float8_rejected() {
        let err = PixelConverter::new(
            FormatInfo::new(Unorm, 1, 3),
            FormatInfo::new(ElementType::Float, 1, 3),
        )
        .unwrap_err();
        assert!(err.is_cannot_convert());
    }

    #[test]
    fn test_widen_channels_zero_fill() {
        let conv = converter((Unorm, 1, 3), (Unorm, 2, 4));
        let mut out = [0xAAu8; 8];
        conv.convert(&[0xFF, 0x10, 0x00], &mut out);
        let out: [u16; 4] = bytemuck::cast(out);
        assert_eq!(out, [0xFFFF, 0x1010, 0, 0]);
    }

    #[test]
    fn test_narrow_channels_drop() {
        let conv = converter((ElementType::Float, 4, 4), (Unorm, 1, 2));
        let src: [u8; 16] = bytemuck::cast([1.0f32, 0.5, 0.25, 1.0]);
        let mut out = [0u8; 2];
        conv.convert(&src, &mut out);
        assert_eq!(out, [255, 127]);
    }

    #[test]
    fn test_family_selection() {
        // norm -> uint is a plain cast
        let conv = converter((Unorm, 1, 1), (Uint, 2, 1));
        let mut out = [0u8; 2];
        conv.convert(&[200], &mut out);
        assert_eq!(u16::from_ne_bytes(out), 200);

        // uint -> float is numeric
        let conv = converter((Uint, 1, 1), (ElementType::Float, 4, 1));
        let mut out = [0u8; 4];
        conv.convert(&[200], &mut out);
        assert_eq!(f32::from_ne_bytes(out), 200.0);

        // float -> sRGB encodes
        let conv = converter((ElementType::Float, 2, 1), (Srgb, 1, 1));
        let mut out = [0u8; 1];
        conv.convert(&Half::ONE.to_bits().to_ne_bytes(), &mut out);
        assert_eq!(out, [255]);

        // sRGB -> snorm decodes
        let conv = converter((Srgb, 1, 1), (Snorm, 2, 1));
        let mut out = [0u8; 2];
        conv.convert(&[255], &mut out);
        assert_eq!(i16::from_ne_bytes(out), i16::MAX);
    }

    #[test]
    fn test_unaligned_access() {
        let conv = converter((ElementType::Float, 4, 1), (ElementType::Float, 8, 1));
        let mut src = [0u8; 5];
        src[1..].copy_from_slice(&0.75f32.to_ne_bytes());
        let mut dst = [0u8; 9];
        conv.convert(&src[1..], &mut dst[1..]);
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&dst[1..]);
        assert_eq!(f64::from_ne_bytes(bytes), 0.75);
    }

    #[test]
    fn test_copy_pixel() {
        let mut out = [9u8; 4];
        copy_pixel(&[1, 2, 3], &mut out);
        assert_eq!(out, [1, 2, 3, 0]);
        let mut out = [9u8; 2];
        copy_pixel(&[1, 2, 3], &mut out);
        assert_eq!(out, [1, 2]);
    }
}
