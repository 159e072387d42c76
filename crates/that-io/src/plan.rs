//! Writer format negotiation.
//!
//! Each encoder family only stores a subset of pixel formats. [`plan_write`]
//! picks the family from the path, then decides which format and layout the
//! image has to be converted to before it reaches the encoder:
//!
//! | Family | Layout | Format |
//! |--------|--------|--------|
//! | PNG, BMP, TGA, JPEG | row-major | 1-byte UNORM/sRGB/UINT kept, else 1-byte UNORM |
//! | HDR | row-major | 4-byte FLOAT |
//! | NetPBM | row-major only | 1-byte UNORM/UINT, 1 or 3 channels only |
//! | EXR | - | not implemented |
//! | Raw | as-is | as-is |
//!
//! A path without an extension gets `.png` for integer-like formats and
//! `.hdr` for floats.

use crate::encoder::Encoder;
use crate::error::{IoError, IoResult};
use std::path::{Path, PathBuf};
use that_core::{ElementType, FormatInfo};
use tracing::debug;

/// Outcome of format negotiation for one write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WritePlan {
    /// Final output path, with an extension appended if it had none.
    pub path: PathBuf,
    /// Encoder family.
    pub encoder: Encoder,
    /// Format handed to the encoder.
    pub format: FormatInfo,
    /// Layout handed to the encoder.
    pub row_major: bool,
}

impl WritePlan {
    /// Whether an image in `format`/`row_major` must be converted first.
    #[inline]
    pub fn needs_conversion(&self, format: FormatInfo, row_major: bool) -> bool {
        self.format != format || self.row_major != row_major
    }
}

/// Negotiates the output format for an image in `format`/`row_major`
/// written to `path`.
///
/// # Errors
///
/// - [`IoError::UnsupportedFormat`] for unknown extensions
/// - [`IoError::NotImplemented`] for EXR and for NetPBM inputs it cannot hold
/// - a wrapped core error if `format` itself is invalid
pub fn plan_write(
    format: FormatInfo,
    row_major: bool,
    path: impl AsRef<Path>,
) -> IoResult<WritePlan> {
    let path = path.as_ref();
    format.validate()?;

    let (path, encoder) = match path.extension() {
        Some(ext) => {
            let ext = ext.to_string_lossy();
            let encoder = Encoder::from_extension(&ext)
                .ok_or_else(|| IoError::UnsupportedFormat(format!("unknown extension '.{ext}'")))?;
            (path.to_path_buf(), encoder)
        }
        None => {
            let encoder = if format.ty.is_float() { Encoder::Hdr } else { Encoder::Png };
            (path.with_extension(encoder.extension()), encoder)
        }
    };

    let (format, row_major) = negotiate(encoder, format, row_major)?;
    debug!(path = %path.display(), %encoder, %format, row_major, "plan_write");

    Ok(WritePlan {
        path,
        encoder,
        format,
        row_major,
    })
}

fn negotiate(
    encoder: Encoder,
    format: FormatInfo,
    row_major: bool,
) -> IoResult<(FormatInfo, bool)> {
    match encoder {
        Encoder::Png | Encoder::Bmp | Encoder::Tga | Encoder::Jpeg => {
            let keep = format.elem_size == 1
                && matches!(format.ty, ElementType::Unorm | ElementType::Srgb | ElementType::Uint);
            let format = if keep {
                format
            } else {
                format.with_element(ElementType::Unorm, 1)
            };
            Ok((format, true))
        }
        Encoder::Hdr => Ok((format.with_element(ElementType::Float, 4), true)),
        Encoder::Netpbm => {
            let storable = row_major
                && format.elem_size == 1
                && matches!(format.ty, ElementType::Unorm | ElementType::Uint)
                && matches!(format.channels, 1 | 3);
            if storable {
                Ok((format, true))
            } else {
                Err(IoError::NotImplemented(format!(
                    "netpbm output of {format} ({})",
                    if row_major { "row-major" } else { "column-major" }
                )))
            }
        }
        Encoder::Exr => Err(IoError::NotImplemented("exr output".into())),
        Encoder::Raw => Ok((format, row_major)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(ty: ElementType, size: u8, channels: u8) -> FormatInfo {
        FormatInfo::new(ty, size, channels)
    }

    #[test]
    fn test_ldr_keeps_byte_formats() {
        for ty in [ElementType::Unorm, ElementType::Srgb, ElementType::Uint] {
            let plan = plan_write(fmt(ty, 1, 4), false, "out.tga").unwrap();
            assert_eq!(plan.format, fmt(ty, 1, 4));
            assert!(plan.row_major);
            assert!(plan.needs_conversion(fmt(ty, 1, 4), false));
            assert!(!plan.needs_conversion(fmt(ty, 1, 4), true));
        }
    }

    #[test]
    fn test_ldr_narrows_everything_else() {
        let plan = plan_write(fmt(ElementType::Snorm, 1, 3), true, "a.jpg").unwrap();
        assert_eq!(plan.format, fmt(ElementType::Unorm, 1, 3));
        let plan = plan_write(fmt(ElementType::Float, 8, 2), true, "a.bmp").unwrap();
        assert_eq!(plan.format, fmt(ElementType::Unorm, 1, 2));
    }

    #[test]
    fn test_missing_extension() {
        let plan = plan_write(fmt(ElementType::Uint, 2, 3), true, "dir/frame").unwrap();
        assert_eq!(plan.encoder, Encoder::Png);
        assert_eq!(plan.path, PathBuf::from("dir/frame.png"));
        assert_eq!(plan.format, fmt(ElementType::Unorm, 1, 3));

        let plan = plan_write(fmt(ElementType::Float, 2, 3), false, "frame").unwrap();
        assert_eq!(plan.encoder, Encoder::Hdr);
        assert_eq!(plan.path, PathBuf::from("frame.hdr"));
        assert_eq!(plan.format, fmt(ElementType::Float, 4, 3));
        assert!(plan.row_major);
    }

    #[test]
    fn test_netpbm_rules() {
        assert!(plan_write(fmt(ElementType::Unorm, 1, 3), true, "a.ppm").is_ok());
        assert!(plan_write(fmt(ElementType::Uint, 1, 1), true, "a.PGM").is_ok());
        for (format, row_major) in [
            (fmt(ElementType::Unorm, 1, 3), false),
            (fmt(ElementType::Unorm, 1, 4), true),
            (fmt(ElementType::Unorm, 2, 1), true),
            (fmt(ElementType::Srgb, 1, 3), true),
        ] {
            let err = plan_write(format, row_major, "a.pnm").unwrap_err();
            assert!(err.is_not_implemented(), "{format}");
        }
    }

    #[test]
    fn test_exr_and_unknown() {
        let err = plan_write(fmt(ElementType::Float, 4, 4), true, "a.exr").unwrap_err();
        assert!(err.is_not_implemented());
        let err = plan_write(fmt(ElementType::Float, 4, 4), true, "a.tiff").unwrap_err();
        assert!(matches!(err, IoError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_raw_is_passthrough() {
        let format = fmt(ElementType::Sint, 8, 5);
        let plan = plan_write(format, false, "dump.bin").unwrap();
        assert_eq!((plan.format, plan.row_major), (format, false));
        assert!(!plan.needs_conversion(format, false));
    }

    #[test]
    fn test_invalid_format_rejected() {
        let err = plan_write(fmt(ElementType::Unorm, 3, 1), true, "a.raw").unwrap_err();
        assert!(matches!(err, IoError::Core(_)));
    }
}
