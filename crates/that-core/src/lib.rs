//! # that-core
//!
//! Pixel format conversion engine.
//!
//! Converts untyped pixel buffers between element encodings (integer,
//! normalized, sRGB, float), element widths (8/16/32/64 bit), channel
//! counts and row/column-major layouts, including in place.
//!
//! - [`Half`] - 16-bit float storage type
//! - [`ElementType`], [`FormatInfo`] - pixel format descriptors
//! - [`scalar`] - per-channel conversion formulas
//! - [`dispatch`] - per-pixel kernel selection
//! - [`processor`] - whole-buffer conversion and aliasing-safe transposes
//! - [`FormatlessImage`], [`FormatedImage`] - owned pixel buffers
//!
//! ## Crate Structure
//!
//! ```text
//! that-core (this crate)
//!    ^
//!    |
//!    +-- that-io (byte stores, writer negotiation)
//!    +-- that-cli (raw buffer conversion tool)
//!    +-- that-bench
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` - serialization for [`ElementType`] and [`FormatInfo`]

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod dispatch;
pub mod error;
pub mod format;
pub mod half;
pub mod image;
pub mod processor;
pub mod scalar;

// Re-exports for convenience
pub use error::{Error, ErrorKind, Result};
pub use format::{ElementType, FormatInfo, PixelType};
pub use half::Half;
pub use image::{FormatedImage, FormatlessImage};
pub use processor::{convert_format, Buffers, ConversionKind, ConvertParams};

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```
/// use that_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::dispatch::PixelConverter;
    pub use crate::error::{Error, ErrorKind, Result};
    pub use crate::format::{ElementType, FormatInfo, PixelType};
    pub use crate::half::Half;
    pub use crate::image::{FormatedImage, FormatlessImage};
    pub use crate::processor::{
        classify, convert_buffer, convert_format, convert_in_place, Buffers, ConversionKind,
        ConvertParams,
    };
}
