//! Encoder families and the encoder seam.
//!
//! Bitstream encoding (PNG, JPEG, HDR, ...) lives outside this workspace.
//! An [`ImageEncoder`] receives an image that has already been converted to
//! a format its family accepts (see [`crate::plan`]) and returns the encoded
//! bytes. [`RawEncoder`] is the one built-in implementation: it emits the
//! pixel buffer unchanged.

use crate::error::{IoError, IoResult};
use std::fmt;
use std::path::Path;
use that_core::FormatedImage;

/// Writer family, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoder {
    /// NetPBM (`pbm`, `pgm`, `ppm`, `pam`, `pnm`).
    Netpbm,
    /// PNG.
    Png,
    /// Windows bitmap.
    Bmp,
    /// Targa.
    Tga,
    /// JPEG (`jpg`, `jpeg`).
    Jpeg,
    /// Radiance HDR.
    Hdr,
    /// OpenEXR.
    Exr,
    /// Headerless pixel dump (`raw`, `bin`).
    Raw,
}

impl Encoder {
    /// Maps a file extension (without the dot, any case).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pbm" | "pgm" | "ppm" | "pam" | "pnm" => Some(Self::Netpbm),
            "png" => Some(Self::Png),
            "bmp" => Some(Self::Bmp),
            "tga" => Some(Self::Tga),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "hdr" => Some(Self::Hdr),
            "exr" => Some(Self::Exr),
            "raw" | "bin" => Some(Self::Raw),
            _ => None,
        }
    }

    /// Detects the family from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Canonical extension.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Netpbm => "pnm",
            Self::Png => "png",
            Self::Bmp => "bmp",
            Self::Tga => "tga",
            Self::Jpeg => "jpg",
            Self::Hdr => "hdr",
            Self::Exr => "exr",
            Self::Raw => "raw",
        }
    }
}

impl fmt::Display for Encoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Knobs passed through to encoders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// Lossy quality, 1-100. `None` lets the encoder decide.
    pub quality: Option<u8>,
    /// Create missing parent directories.
    pub create_dirs: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            quality: None,
            create_dirs: true,
        }
    }
}

/// Turns a prepared image into encoded bytes.
pub trait ImageEncoder {
    /// Encodes `image` for `encoder`. The image is already in a format and
    /// layout accepted by that family.
    fn encode(
        &self,
        encoder: Encoder,
        image: &FormatedImage,
        options: &WriteOptions,
    ) -> IoResult<Vec<u8>>;
}

/// Writes the pixel buffer verbatim, without a header.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawEncoder;

impl ImageEncoder for RawEncoder {
    fn encode(
        &self,
        encoder: Encoder,
        image: &FormatedImage,
        _options: &WriteOptions,
    ) -> IoResult<Vec<u8>> {
        match encoder {
            Encoder::Raw => Ok(image.raw_data().to_vec()),
            other => Err(IoError::UnsupportedFormat(format!(
                "raw encoder cannot produce .{other} files"
            ))),
        }
    }
}
