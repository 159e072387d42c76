//! Error types for I/O operations.
//!
//! [`IoError`] wraps both filesystem failures and conversion failures from
//! `that-core`, and classifies them with the same [`ErrorKind`]s.

use std::io;
use std::path::PathBuf;
use that_core::ErrorKind;
use thiserror::Error;

/// I/O operation error.
#[derive(Debug, Error)]
pub enum IoError {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Pixel conversion failed.
    #[error(transparent)]
    Core(#[from] that_core::Error),

    /// No file was stored under the path.
    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Unsupported file format or extension.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The encoder family exists but this combination is unsupported.
    #[error("not implemented: {0}")]
    NotImplemented(String),
}

impl IoError {
    /// Coarse kind, for errors that map onto the conversion taxonomy.
    ///
    /// Filesystem failures have no kind and return `None`.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Core(e) => Some(e.kind()),
            Self::NotImplemented(_) => Some(ErrorKind::NotImplemented),
            Self::UnsupportedFormat(_) => Some(ErrorKind::InvalidValue),
            Self::Io(_) | Self::NotFound(_) => None,
        }
    }

    /// Returns `true` for [`IoError::NotImplemented`] and wrapped
    /// not-implemented conversion errors.
    #[inline]
    pub fn is_not_implemented(&self) -> bool {
        self.kind() == Some(ErrorKind::NotImplemented)
    }
}

/// Result type for I/O operations.
pub type IoResult<T> = Result<T, IoError>;
