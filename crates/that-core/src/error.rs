//! Error types for that-core operations.
//!
//! Every conversion entry point reports failure through [`Result`] instead of
//! panicking. Failures are checked before the first byte of a destination
//! buffer is written, so a returned error always leaves the target untouched.
//!
//! # Error kinds
//!
//! Concrete variants are grouped into three [`ErrorKind`]s:
//!
//! - [`ErrorKind::InvalidValue`] - malformed sizes, buffers or formats
//! - [`ErrorKind::CannotConvertFormat`] - no conversion kernel for a pair
//! - [`ErrorKind::NotImplemented`] - an explicitly unsupported combination
//!
//! # Usage
//!
//! ```rust
//! use that_core::{Error, ErrorKind, Result};
//!
//! fn check(len: usize, expected: usize) -> Result<()> {
//!     if len < expected {
//!         return Err(Error::invalid_buffer_size(expected, len));
//!     }
//!     Ok(())
//! }
//!
//! let err = check(3, 12).unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::InvalidValue);
//! ```
//!
//! # Dependencies
//!
//! - [`thiserror`] - derive for [`std::error::Error`] and [`std::fmt::Display`]
//!
//! # Used By
//!
//! - [`crate::processor`] - buffer validation and kernel selection
//! - [`crate::image`] - reformat/copy operations
//! - `that-io` - wrapped inside its own error type

use crate::format::FormatInfo;
use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A size, buffer or format precondition does not hold.
    InvalidValue,
    /// No conversion path exists between two formats.
    CannotConvertFormat,
    /// The combination is known but deliberately unsupported.
    NotImplemented,
}

/// Errors produced by format conversion and image operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A buffer is shorter (or, for owned images, not exactly as long) as
    /// `width * height * pixel_size`.
    #[error("invalid buffer size: expected {expected} bytes, got {actual}")]
    InvalidBufferSize {
        /// Required number of bytes
        expected: usize,
        /// Actual number of bytes
        actual: usize,
    },

    /// A [`FormatInfo`] violates its invariants.
    #[error("invalid format {format}: {reason}")]
    InvalidFormat {
        /// The offending format
        format: FormatInfo,
        /// Why it was rejected
        reason: String,
    },

    /// Two images must share dimensions for the operation.
    #[error("dimension mismatch: {a_width}x{a_height} vs {b_width}x{b_height}")]
    DimensionMismatch {
        /// First image width
        a_width: usize,
        /// First image height
        a_height: usize,
        /// Second image width
        b_width: usize,
        /// Second image height
        b_height: usize,
    },

    /// The dispatch table has no kernel for this pair of formats.
    ///
    /// Returned for `FLOAT` at 1 byte, which has no storage type.
    #[error("cannot convert {src} to {dst}")]
    CannotConvertFormat {
        /// Source format
        src: FormatInfo,
        /// Destination format
        dst: FormatInfo,
    },

    /// A textual format description could not be parsed.
    #[error("cannot parse format '{0}' (expected e.g. unorm8x3, float16x4)")]
    ParseFormat(String),

    /// Explicitly unsupported operation.
    #[error("not implemented: {0}")]
    NotImplemented(String),
}

impl Error {
    /// Creates an [`Error::InvalidBufferSize`] error.
    #[inline]
    pub fn invalid_buffer_size(expected: usize, actual: usize) -> Self {
        Self::InvalidBufferSize { expected, actual }
    }

    /// Creates an [`Error::InvalidFormat`] error.
    #[inline]
    pub fn invalid_format(format: FormatInfo, reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            format,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::DimensionMismatch`] error.
    #[inline]
    pub fn dimension_mismatch(a: (usize, usize), b: (usize, usize)) -> Self {
        Self::DimensionMismatch {
            a_width: a.0,
            a_height: a.1,
            b_width: b.0,
            b_height: b.1,
        }
    }

    /// Creates an [`Error::CannotConvertFormat`] error.
    #[inline]
    pub fn cannot_convert(src: FormatInfo, dst: FormatInfo) -> Self {
        Self::CannotConvertFormat { src, dst }
    }

    /// Creates an [`Error::NotImplemented`] error.
    #[inline]
    pub fn not_implemented(what: impl Into<String>) -> Self {
        Self::NotImplemented(what.into())
    }

    /// Returns the coarse kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidBufferSize { .. }
            | Self::InvalidFormat { .. }
            | Self::DimensionMismatch { .. }
            | Self::ParseFormat(_) => ErrorKind::InvalidValue,
            Self::CannotConvertFormat { .. } => ErrorKind::CannotConvertFormat,
            Self::NotImplemented(_) => ErrorKind::NotImplemented,
        }
    }

    /// Returns `true` if this is an [`ErrorKind::InvalidValue`] error.
    #[inline]
    pub fn is_invalid_value(&self) -> bool {
        self.kind() == ErrorKind::InvalidValue
    }

    /// Returns `true` if no conversion path exists.
    #[inline]
    pub fn is_cannot_convert(&self) -> bool {
        matches!(self, Self::CannotConvertFormat { .. })
    }

    /// Returns `true` if the operation is not implemented.
    #[inline]
    pub fn is_not_implemented(&self) -> bool {
        matches!(self, Self::NotImplemented(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::ElementType;

    #[test]
    fn test_invalid_buffer_size() {
        let err = Error::invalid_buffer_size(48, 12);
        let msg = err.to_string();
        assert!(msg.contains("48"));
        assert!(msg.contains("12"));
        assert!(err.is_invalid_value());
    }

    #[test]
    fn test_cannot_convert_display() {
        let src = FormatInfo::new(ElementType::Unorm, 1, 3);
        let dst = FormatInfo::new(ElementType::Float, 1, 3);
        let err = Error::cannot_convert(src, dst);
        assert_eq!(err.kind(), ErrorKind::CannotConvertFormat);
        assert!(err.to_string().contains("FLOAT_1 x 3"));
    }

    #[test]
    fn test_dimension_mismatch() {
        let err = Error::dimension_mismatch((4, 4), (2, 8));
        assert!(err.to_string().contains("4x4"));
        assert!(err.to_string().contains("2x8"));
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn test_not_implemented() {
        let err = Error::not_implemented("column-major netpbm");
        assert!(err.is_not_implemented());
        assert!(!err.is_cannot_convert());
    }
}
