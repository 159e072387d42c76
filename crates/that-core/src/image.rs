//! Owned pixel buffers.
//!
//! - [`FormatlessImage`] - dimensions plus raw bytes; the caller tracks the
//!   pixel format
//! - [`FormatedImage`] - a [`FormatlessImage`] tagged with a [`FormatInfo`]
//!   and a major order
//!
//! Both keep `buffer.len() == width * height * pixel_size`.
//! A product that overflows `usize` is an `InvalidValue` error (the plain
//! `new` constructors panic instead).
//!
//! # Reformatting
//!
//! [`FormatedImage::re_format`] picks its strategy from the pixel sizes:
//!
//! - growing pixels: convert into a new buffer and swap it in on success
//! - shrinking or equal pixels: convert in place and truncate
//!
//! Either way a failed conversion leaves the image exactly as it was.
//!
//! # Example
//!
//! ```rust
//! use that_core::format::{ElementType, FormatInfo};
//! use that_core::image::FormatedImage;
//!
//! let mut img = FormatedImage::from_pixels(2, 1, &[[255u8, 0, 0], [0, 255, 0]]).unwrap();
//! img.set_format(FormatInfo::new(ElementType::Unorm, 1, 3), true).unwrap();
//!
//! img.re_format(FormatInfo::new(ElementType::Float, 4, 3), true).unwrap();
//! assert_eq!(img.pixel::<[f32; 3]>(0, 0), [1.0, 0.0, 0.0]);
//! ```

use crate::error::{Error, Result};
use crate::format::{FormatInfo, PixelType};
use crate::processor::{convert_buffer, convert_in_place, linear_index, ConvertParams};
use bytemuck::Pod;
use tracing::trace;

// ============================================================================
// FormatlessImage
// ============================================================================

/// `width * height * pixel_size`, or `InvalidValue` if it overflows.
fn buffer_len(width: usize, height: usize, pixel_size: usize) -> Result<usize> {
    width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(pixel_size))
        .ok_or_else(|| Error::invalid_buffer_size(usize::MAX, 0))
}

/// Dimensions and bytes without format semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatlessImage {
    width: usize,
    height: usize,
    buffer: Vec<u8>,
}

impl FormatlessImage {
    /// Allocates a zeroed image with `pixel_size` bytes per pixel.
    ///
    /// # Panics
    ///
    /// Panics if the byte size overflows `usize`. See [`try_new`](Self::try_new).
    pub fn new(width: usize, height: usize, pixel_size: usize) -> Self {
        match Self::try_new(width, height, pixel_size) {
            Ok(image) => image,
            Err(e) => panic!("FormatlessImage {width}x{height}x{pixel_size}: {e}"),
        }
    }

    /// Allocates a zeroed image, failing with `InvalidValue` if the byte
    /// size overflows `usize`.
    pub fn try_new(width: usize, height: usize, pixel_size: usize) -> Result<Self> {
        Ok(Self {
            width,
            height,
            buffer: vec![0; buffer_len(width, height, pixel_size)?],
        })
    }

    /// Wraps existing bytes. `data` must hold exactly
    /// `width * height * pixel_size` bytes.
    pub fn from_raw(width: usize, height: usize, pixel_size: usize, data: Vec<u8>) -> Result<Self> {
        let expected = buffer_len(width, height, pixel_size)
            .map_err(|_| Error::invalid_buffer_size(usize::MAX, data.len()))?;
        if data.len() != expected {
            return Err(Error::invalid_buffer_size(expected, data.len()));
        }
        Ok(Self {
            width,
            height,
            buffer: data,
        })
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// `width * height`.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Buffer length in bytes.
    #[inline]
    pub fn byte_size(&self) -> usize {
        self.buffer.len()
    }

    /// Whether the image holds no pixels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Raw bytes.
    #[inline]
    pub fn raw_data(&self) -> &[u8] {
        &self.buffer
    }

    /// Mutable raw bytes.
    #[inline]
    pub fn raw_data_mut(&mut self) -> &mut [u8] {
        &mut self.buffer
    }

    /// Consumes the image and returns its bytes.
    #[inline]
    pub fn into_raw(self) -> Vec<u8> {
        self.buffer
    }

    /// Changes dimensions and element size. Contents are unspecified
    /// afterwards unless the byte size is unchanged.
    ///
    /// On overflow the image is left as it was.
    pub fn resize(&mut self, width: usize, height: usize, pixel_size: usize) -> Result<()> {
        let len = buffer_len(width, height, pixel_size)?;
        self.width = width;
        self.height = height;
        self.buffer.resize(len, 0);
        Ok(())
    }

    /// Converts the buffer from `src_format` to `dst_format`.
    ///
    /// The buffer must currently hold `width * height` pixels of
    /// `src_format`. On error the image is unchanged.
    pub fn convert_format(
        &mut self,
        src_format: FormatInfo,
        src_row_major: bool,
        dst_format: FormatInfo,
        dst_row_major: bool,
    ) -> Result<()> {
        trace!(
            width = self.width,
            height = self.height,
            src = %src_format,
            dst = %dst_format,
            "FormatlessImage::convert_format"
        );

        let params = ConvertParams::new(self.width, self.height, src_format, dst_format)
            .with_layout(src_row_major, dst_row_major);
        src_format.validate()?;
        if params.src_byte_size() != self.buffer.len() {
            return Err(Error::invalid_buffer_size(params.src_byte_size(), self.buffer.len()));
        }

        if dst_format.pixel_size() > src_format.pixel_size() {
            let len = buffer_len(self.width, self.height, dst_format.pixel_size())?;
            let mut grown = vec![0u8; len];
            convert_buffer(&self.buffer, &mut grown, &params)?;
            self.buffer = grown;
        } else {
            convert_in_place(&mut self.buffer, &params)?;
            self.buffer.truncate(params.dst_byte_size());
        }
        Ok(())
    }
}

// ============================================================================
// FormatedImage
// ============================================================================

/// An image that knows its pixel format and major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatedImage {
    image: FormatlessImage,
    format: FormatInfo,
    row_major: bool,
}

impl Default for FormatedImage {
    fn default() -> Self {
        Self::new(0, 0, FormatInfo::default(), true)
    }
}

impl FormatedImage {
    /// Allocates a zeroed image.
    ///
    /// # Panics
    ///
    /// Panics if the byte size overflows `usize`. See [`try_new`](Self::try_new).
    pub fn new(width: usize, height: usize, format: FormatInfo, row_major: bool) -> Self {
        Self {
            image: FormatlessImage::new(width, height, format.pixel_size()),
            format,
            row_major,
        }
    }

    /// Allocates a zeroed image, failing with `InvalidValue` if the byte
    /// size overflows `usize`.
    pub fn try_new(
        width: usize,
        height: usize,
        format: FormatInfo,
        row_major: bool,
    ) -> Result<Self> {
        Ok(Self {
            image: FormatlessImage::try_new(width, height, format.pixel_size())?,
            format,
            row_major,
        })
    }

    /// Wraps raw bytes of the given format and layout.
    pub fn from_raw(
        width: usize,
        height: usize,
        format: FormatInfo,
        row_major: bool,
        data: Vec<u8>,
    ) -> Result<Self> {
        format.validate()?;
        Ok(Self {
            image: FormatlessImage::from_raw(width, height, format.pixel_size(), data)?,
            format,
            row_major,
        })
    }

    /// Builds a row-major image from typed pixels; the format is deduced
    /// from `T`.
    pub fn from_pixels<T: PixelType>(width: usize, height: usize, pixels: &[T]) -> Result<Self> {
        let bytes = bytemuck::cast_slice::<T, u8>(pixels).to_vec();
        Self::from_raw(width, height, T::FORMAT, true, bytes)
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> usize {
        self.image.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> usize {
        self.image.height
    }

    /// Pixel format.
    #[inline]
    pub fn format(&self) -> FormatInfo {
        self.format
    }

    /// Whether pixels are stored row by row.
    #[inline]
    pub fn row_major(&self) -> bool {
        self.row_major
    }

    /// Bytes per pixel.
    #[inline]
    pub fn pixel_size(&self) -> usize {
        self.format.pixel_size()
    }

    /// Length of the major axis: width when row-major, else height.
    #[inline]
    pub fn major_size(&self) -> usize {
        if self.row_major { self.width() } else { self.height() }
    }

    /// Length of the minor axis.
    #[inline]
    pub fn minor_size(&self) -> usize {
        if self.row_major { self.height() } else { self.width() }
    }

    /// Buffer length in bytes.
    #[inline]
    pub fn byte_size(&self) -> usize {
        self.image.byte_size()
    }

    /// Raw bytes.
    #[inline]
    pub fn raw_data(&self) -> &[u8] {
        self.image.raw_data()
    }

    /// Mutable raw bytes.
    #[inline]
    pub fn raw_data_mut(&mut self) -> &mut [u8] {
        self.image.raw_data_mut()
    }

    /// The untyped image.
    #[inline]
    pub fn as_formatless(&self) -> &FormatlessImage {
        &self.image
    }

    /// Drops the format information.
    #[inline]
    pub fn into_formatless(self) -> FormatlessImage {
        self.image
    }

    /// Linear index of `(x, y)` for the current layout.
    #[inline]
    pub fn pixel_linear_index(&self, x: usize, y: usize) -> usize {
        linear_index(self.row_major, x, y, self.width(), self.height())
    }

    /// Bytes of the pixel at linear index `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn pixel_bytes_at(&self, index: usize) -> &[u8] {
        let ps = self.pixel_size();
        &self.image.buffer[index * ps..(index + 1) * ps]
    }

    /// Mutable bytes of the pixel at linear index `index`.
    #[inline]
    pub fn pixel_bytes_at_mut(&mut self, index: usize) -> &mut [u8] {
        let ps = self.pixel_size();
        &mut self.image.buffer[index * ps..(index + 1) * ps]
    }

    /// Bytes of the pixel at `(x, y)`.
    #[inline]
    pub fn pixel_bytes(&self, x: usize, y: usize) -> &[u8] {
        debug_assert!(x < self.width() && y < self.height());
        self.pixel_bytes_at(self.pixel_linear_index(x, y))
    }

    /// Mutable bytes of the pixel at `(x, y)`.
    #[inline]
    pub fn pixel_bytes_mut(&mut self, x: usize, y: usize) -> &mut [u8] {
        debug_assert!(x < self.width() && y < self.height());
        let index = self.pixel_linear_index(x, y);
        self.pixel_bytes_at_mut(index)
    }

    /// Reads the pixel at `(x, y)` as `T`.
    ///
    /// # Panics
    ///
    /// Panics if `size_of::<T>()` differs from the pixel size or the
    /// coordinates are out of bounds.
    pub fn pixel<T: Pod>(&self, x: usize, y: usize) -> T {
        assert_eq!(size_of::<T>(), self.pixel_size(), "pixel type size mismatch");
        bytemuck::pod_read_unaligned(self.pixel_bytes(x, y))
    }

    /// Reads the pixel at `(x, y)`, or `None` if out of bounds or `T` has
    /// the wrong size.
    pub fn get_pixel<T: Pod>(&self, x: usize, y: usize) -> Option<T> {
        if x >= self.width() || y >= self.height() || size_of::<T>() != self.pixel_size() {
            return None;
        }
        Some(bytemuck::pod_read_unaligned(self.pixel_bytes(x, y)))
    }

    /// Writes the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Same as [`pixel`](Self::pixel).
    pub fn set_pixel<T: Pod>(&mut self, x: usize, y: usize, value: T) {
        assert_eq!(size_of::<T>(), self.pixel_size(), "pixel type size mismatch");
        self.pixel_bytes_mut(x, y).copy_from_slice(bytemuck::bytes_of(&value));
    }

    /// Reinterprets the buffer as another format and layout.
    ///
    /// The buffer is resized to match. Contents are unspecified if the
    /// pixel size changes. On error the image is unchanged.
    pub fn set_format(&mut self, format: FormatInfo, row_major: bool) -> Result<()> {
        let (w, h) = (self.width(), self.height());
        self.image.resize(w, h, format.pixel_size())?;
        self.format = format;
        self.row_major = row_major;
        Ok(())
    }

    /// Changes the layout flag without moving pixels.
    #[inline]
    pub fn set_major(&mut self, row_major: bool) {
        self.row_major = row_major;
    }

    /// Converts the pixels to another format and layout.
    ///
    /// On error the image is unchanged.
    pub fn re_format(&mut self, format: FormatInfo, row_major: bool) -> Result<()> {
        self.image
            .convert_format(self.format, self.row_major, format, row_major)?;
        self.format = format;
        self.row_major = row_major;
        Ok(())
    }

    /// Fills `self` with the pixels of `src`, converted into `self`'s
    /// format and layout. Dimensions must match.
    pub fn copy_reformat(&mut self, src: &FormatedImage) -> Result<()> {
        if src.width() != self.width() || src.height() != self.height() {
            return Err(Error::dimension_mismatch(
                (self.width(), self.height()),
                (src.width(), src.height()),
            ));
        }
        let params = ConvertParams::new(self.width(), self.height(), src.format, self.format)
            .with_layout(src.row_major, self.row_major);
        convert_buffer(src.raw_data(), &mut self.image.buffer, &params)
    }

    /// Returns a converted copy.
    pub fn converted(&self, format: FormatInfo, row_major: bool) -> Result<Self> {
        format.validate()?;
        let mut out = Self::try_new(self.width(), self.height(), format, row_major)?;
        out.copy_reformat(self)?;
        Ok(out)
    }
}
