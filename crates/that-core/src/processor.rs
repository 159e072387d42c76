//! Whole-buffer format and layout conversion.
//!
//! [`convert_format`] converts `width * height` pixels from one
//! [`FormatInfo`] and major order to another. Source and destination are
//! either two buffers or one shared buffer ([`Buffers::Aliased`]); the
//! shared case is handled without corrupting pixels that have not been read
//! yet.
//!
//! # Classification
//!
//! [`ConversionKind`] picks the work done per pixel:
//!
//! - `Identity`: formats are equal. Nothing, or a byte copy.
//! - `Reinterpret`: same element size with int-like <-> int, or only the
//!   channel count differs. A byte copy with zero-fill.
//! - `Numeric`: anything else, through [`PixelConverter`].
//!
//! With equal pixel sizes and equal major order, `Identity` and
//! `Reinterpret` become one `memcpy` (or nothing, in place).
//!
//! # Major order changes in place
//!
//! - square images with equal pixel sizes swap mirrored pixel pairs through a
//!   one-pixel scratch slot
//! - anything else copies the source aside first
//!
//! # Example
//!
//! ```rust
//! use that_core::format::{ElementType, FormatInfo};
//! use that_core::processor::{convert_format, Buffers, ConvertParams};
//!
//! let src = [0u8, 128, 255];
//! let mut dst = [0u8; 3];
//! let params = ConvertParams::new(
//!     3,
//!     1,
//!     FormatInfo::new(ElementType::Unorm, 1, 1),
//!     FormatInfo::new(ElementType::Snorm, 1, 1),
//! );
//! convert_format(Buffers::Distinct { src: &src, dst: &mut dst }, &params).unwrap();
//! assert_eq!(dst.map(|b| b as i8), [0, 64, 127]);
//! ```

use crate::dispatch::{copy_pixel, PixelConverter};
use crate::error::{Error, Result};
use crate::format::FormatInfo;
use tracing::{debug, trace};

/// Linear pixel index of `(x, y)` in an image of `width x height`.
///
/// Row-major: `y * width + x`. Column-major: `x * height + y`.
#[inline]
pub fn linear_index(row_major: bool, x: usize, y: usize, width: usize, height: usize) -> usize {
    if row_major {
        y * width + x
    } else {
        x * height + y
    }
}

/// Dimensions, formats and layouts of one conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertParams {
    /// Image width in pixels.
    pub width: usize,
    /// Image height in pixels.
    pub height: usize,
    /// Source pixel format.
    pub src_format: FormatInfo,
    /// Source layout.
    pub src_row_major: bool,
    /// Destination pixel format.
    pub dst_format: FormatInfo,
    /// Destination layout.
    pub dst_row_major: bool,
}

impl ConvertParams {
    /// Row-major to row-major conversion.
    pub fn new(
        width: usize,
        height: usize,
        src_format: FormatInfo,
        dst_format: FormatInfo,
    ) -> Self {
        Self {
            width,
            height,
            src_format,
            src_row_major: true,
            dst_format,
            dst_row_major: true,
        }
    }

    /// Sets both layouts.
    pub fn with_layout(mut self, src_row_major: bool, dst_row_major: bool) -> Self {
        self.src_row_major = src_row_major;
        self.dst_row_major = dst_row_major;
        self
    }

    /// Number of pixels, saturating at `usize::MAX`.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width.saturating_mul(self.height)
    }

    /// Bytes the source occupies.
    #[inline]
    pub fn src_byte_size(&self) -> usize {
        self.pixel_count().saturating_mul(self.src_format.pixel_size())
    }

    /// Bytes the destination occupies.
    #[inline]
    pub fn dst_byte_size(&self) -> usize {
        self.pixel_count().saturating_mul(self.dst_format.pixel_size())
    }
}

/// Source and destination memory of a conversion.
#[derive(Debug)]
pub enum Buffers<'a> {
    /// Two separate buffers.
    Distinct {
        /// Source pixels.
        src: &'a [u8],
        /// Destination pixels.
        dst: &'a mut [u8],
    },
    /// One buffer, read as the source and overwritten with the result.
    ///
    /// Must be large enough for the bigger of the two images.
    Aliased(&'a mut [u8]),
}

/// How the pixels of a conversion are transformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversionKind {
    /// Same format on both sides.
    Identity,
    /// Bytes are copied as they are. Extra channels are dropped or zeroed.
    Reinterpret,
    /// Channels go through a conversion kernel.
    Numeric,
}

/// Classifies a conversion between two formats.
pub fn classify(src: FormatInfo, dst: FormatInfo) -> ConversionKind {
    if src == dst {
        ConversionKind::Identity
    } else if requires_conversion(src, dst) {
        ConversionKind::Numeric
    } else {
        ConversionKind::Reinterpret
    }
}

fn requires_conversion(src: FormatInfo, dst: FormatInfo) -> bool {
    if src.elem_size != dst.elem_size {
        return true;
    }
    if src.ty == dst.ty {
        return false;
    }
    // equal width integer reinterpretation
    let (s, d) = (src.ty, dst.ty);
    !((s.is_int_like() && d.is_int()) || (s.is_int() && d.is_int_like()))
}

/// Converts the pixels described by `params`.
///
/// All preconditions are checked before anything is written: on error the
/// destination is untouched.
///
/// # Errors
///
/// - [`Error::InvalidFormat`] if either format is malformed
/// - [`Error::CannotConvertFormat`] if no kernel exists for the pair
/// - [`Error::InvalidBufferSize`] if a buffer is too small
pub fn convert_format(buffers: Buffers<'_>, params: &ConvertParams) -> Result<()> {
    trace!(
        width = params.width,
        height = params.height,
        src = %params.src_format,
        dst = %params.dst_format,
        "processor::convert_format"
    );

    params.src_format.validate()?;
    params.dst_format.validate()?;

    let kind = classify(params.src_format, params.dst_format);
    let converter = match kind {
        ConversionKind::Numeric => Some(PixelConverter::new(params.src_format, params.dst_format)?),
        _ => None,
    };
    check_buffers(&buffers, params)?;

    let same_layout = params.src_row_major == params.dst_row_major;
    let same_size = params.src_format.pixel_size() == params.dst_format.pixel_size();
    debug!(
        kind = ?kind,
        aliased = matches!(buffers, Buffers::Aliased(_)),
        same_layout,
        "Converting pixels"
    );

    match converter {
        Some(conv) => {
            convert_pixels(buffers, params, |s, d| conv.convert(s, d));
        }
        None if same_layout && same_size => {
            if let Buffers::Distinct { src, dst } = buffers {
                let n = params.src_byte_size();
                dst[..n].copy_from_slice(&src[..n]);
            }
        }
        None => {
            convert_pixels(buffers, params, copy_pixel);
        }
    }
    Ok(())
}

/// Converts `src` into the separate buffer `dst`.
#[inline]
pub fn convert_buffer(src: &[u8], dst: &mut [u8], params: &ConvertParams) -> Result<()> {
    convert_format(Buffers::Distinct { src, dst }, params)
}

/// Converts `buffer` in place. It must be large enough for both images.
#[inline]
pub fn convert_in_place(buffer: &mut [u8], params: &ConvertParams) -> Result<()> {
    convert_format(Buffers::Aliased(buffer), params)
}

fn check_buffers(buffers: &Buffers<'_>, params: &ConvertParams) -> Result<()> {
    let pixels = params
        .width
        .checked_mul(params.height)
        .ok_or_else(|| Error::invalid_buffer_size(usize::MAX, 0))?;
    let required = |format: FormatInfo| {
        pixels
            .checked_mul(format.pixel_size())
            .ok_or_else(|| Error::invalid_buffer_size(usize::MAX, 0))
    };
    let src_len = required(params.src_format)?;
    let dst_len = required(params.dst_format)?;

    let check = |expected: usize, actual: usize| {
        if actual < expected {
            Err(Error::invalid_buffer_size(expected, actual))
        } else {
            Ok(())
        }
    };
    match buffers {
        Buffers::Distinct { src, dst } => {
            check(src_len, src.len())?;
            check(dst_len, dst.len())
        }
        Buffers::Aliased(buf) => check(src_len.max(dst_len), buf.len()),
    }
}

// ============================================================================
// Pixel walkers
// ============================================================================

fn convert_pixels<F>(buffers: Buffers<'_>, params: &ConvertParams, f: F)
where
    F: Fn(&[u8], &mut [u8]),
{
    let sp = params.src_format.pixel_size();
    let dp = params.dst_format.pixel_size();
    let same_layout = params.src_row_major == params.dst_row_major;

    match buffers {
        Buffers::Distinct { src, dst } => {
            if same_layout {
                let pixels = src.chunks_exact(sp).zip(dst.chunks_exact_mut(dp));
                for (s, d) in pixels.take(params.pixel_count()) {
                    f(s, d);
                }
            } else {
                transpose_into(src, dst, params, &f);
            }
        }
        Buffers::Aliased(buf) => {
            if same_layout {
                convert_linear_in_place(buf, params.pixel_count(), sp, dp, &f);
            } else if params.width == params.height && sp == dp {
                transpose_square_in_place(buf, params, &f);
            } else {
                let src = buf[..params.src_byte_size()].to_vec();
                transpose_into(&src, buf, params, &f);
            }
        }
    }
}

fn transpose_into<F>(src: &[u8], dst: &mut [u8], params: &ConvertParams, f: &F)
where
    F: Fn(&[u8], &mut [u8]),
{
    let (w, h) = (params.width, params.height);
    let sp = params.src_format.pixel_size();
    let dp = params.dst_format.pixel_size();
    for y in 0..h {
        for x in 0..w {
            let si = linear_index(params.src_row_major, x, y, w, h) * sp;
            let di = linear_index(params.dst_row_major, x, y, w, h) * dp;
            f(&src[si..si + sp], &mut dst[di..di + dp]);
        }
    }
}

/// Same layout, shared buffer. Walks forward when pixels shrink and
/// backward when they grow, so a write never lands on an unread pixel.
fn convert_linear_in_place<F>(buf: &mut [u8], pixels: usize, sp: usize, dp: usize, f: &F)
where
    F: Fn(&[u8], &mut [u8]),
{
    let mut scratch = vec![0u8; sp];
    let mut step = |i: usize| {
        scratch.copy_from_slice(&buf[i * sp..(i + 1) * sp]);
        f(&scratch, &mut buf[i * dp..(i + 1) * dp]);
    };
    if dp <= sp {
        (0..pixels).for_each(&mut step);
    } else {
        (0..pixels).rev().for_each(&mut step);
    }
}

/// Square image, equal pixel sizes, layout flips. Every off-diagonal pixel
/// trades places with its mirror: read one aside, convert the mirror into
/// its slot, convert the saved pixel into the mirror's slot.
fn transpose_square_in_place<F>(buf: &mut [u8], params: &ConvertParams, f: &F)
where
    F: Fn(&[u8], &mut [u8]),
{
    let n = params.width;
    let ps = params.src_format.pixel_size();
    let mut scratch = vec![0u8; ps];

    for y in 0..n {
        for x in 0..y {
            // (x, y) lives at `a` and belongs at `b`; its mirror the other way round
            let a = linear_index(params.src_row_major, x, y, n, n);
            let b = linear_index(params.dst_row_major, x, y, n, n);
            scratch.copy_from_slice(&buf[a * ps..(a + 1) * ps]);
            let (mirror, slot) = split_pixels(buf, b, a, ps);
            f(mirror, slot);
            f(&scratch, &mut buf[b * ps..(b + 1) * ps]);
        }
        let d = linear_index(params.src_row_major, y, y, n, n);
        scratch.copy_from_slice(&buf[d * ps..(d + 1) * ps]);
        f(&scratch, &mut buf[d * ps..(d + 1) * ps]);
    }
}

/// Borrows pixel `read` shared and pixel `write` mutably from one buffer.
fn split_pixels(buf: &mut [u8], read: usize, write: usize, ps: usize) -> (&[u8], &mut [u8]) {
    debug_assert_ne!(read, write);
    if read < write {
        let (lo, hi) = buf.split_at_mut(write * ps);
        (&lo[read * ps..(read + 1) * ps], &mut hi[..ps])
    } else {
        let (lo, hi) = buf.split_at_mut(read * ps);
        (&hi[..ps], &mut lo[write * ps..(write + 1) * ps])
    }
}
