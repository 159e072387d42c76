//! # that-io
//!
//! Moves [`FormatedImage`]s in and out of byte stores.
//!
//! Pixel bitstream codecs are not part of this workspace. What lives here is
//! the plumbing around them:
//!
//! - [`ByteStore`] - where bytes go ([`LocalStore`], [`MemoryStore`])
//! - [`ImageEncoder`] - how pixels become bytes ([`RawEncoder`] built in)
//! - [`plan_write`] - which format and layout an encoder family accepts
//! - [`write_image`] / [`read_raw`] - the high-level entry points
//!
//! # Quick Start
//!
//! ```rust
//! use that_core::{ElementType, FormatInfo, FormatedImage};
//! use that_io::{read_raw, write_image, MemoryStore, RawEncoder, WriteOptions};
//!
//! let store = MemoryStore::new();
//! let format = FormatInfo::new(ElementType::Unorm, 1, 3);
//! let image = FormatedImage::new(4, 2, format, true);
//!
//! let plan = write_image(&store, &RawEncoder, &image, "frame.raw", &WriteOptions::default())?;
//! let back = read_raw(&store, &plan.path, 4, 2, format, true)?;
//! assert_eq!(back, image);
//! # Ok::<(), that_io::IoError>(())
//! ```
//!
//! # Dependencies
//!
//! - `that-core` - images and conversion
//! - `thiserror` - [`IoError`]
//! - `tracing` - debug/trace spans around writes

#![warn(missing_docs)]

pub mod encoder;
pub mod error;
pub mod plan;
pub mod store;

pub use encoder::{Encoder, ImageEncoder, RawEncoder, WriteOptions};
pub use error::{IoError, IoResult};
pub use plan::{plan_write, WritePlan};
pub use store::{ByteStore, LocalStore, MemoryStore};

use std::borrow::Cow;
use std::path::Path;
use that_core::{FormatInfo, FormatedImage};
use tracing::{debug, trace};

/// Writes `image` to `path` in `store`.
///
/// The output format is negotiated with [`plan_write`]. When the encoder
/// family needs another format or layout, a converted copy is encoded; the
/// caller's image is never modified.
///
/// Returns the plan that was executed, including the final path.
pub fn write_image(
    store: &dyn ByteStore,
    encoder: &dyn ImageEncoder,
    image: &FormatedImage,
    path: impl AsRef<Path>,
    options: &WriteOptions,
) -> IoResult<WritePlan> {
    let plan = plan_write(image.format(), image.row_major(), path)?;

    let prepared = if plan.needs_conversion(image.format(), image.row_major()) {
        debug!(
            from = %image.format(),
            to = %plan.format,
            row_major = plan.row_major,
            "write_image: converting"
        );
        Cow::Owned(image.converted(plan.format, plan.row_major)?)
    } else {
        Cow::Borrowed(image)
    };

    let bytes = encoder.encode(plan.encoder, &prepared, options)?;
    if options.create_dirs {
        store.prepare_parent(&plan.path)?;
    }
    trace!(path = %plan.path.display(), bytes = bytes.len(), "write_image");
    store.write_bytes(&plan.path, &bytes)?;
    Ok(plan)
}

/// Reads a headerless pixel buffer from `store`.
///
/// The stored byte count must be exactly `width * height * pixel_size`.
pub fn read_raw(
    store: &dyn ByteStore,
    path: impl AsRef<Path>,
    width: usize,
    height: usize,
    format: FormatInfo,
    row_major: bool,
) -> IoResult<FormatedImage> {
    let path = path.as_ref();
    let bytes = store.read_bytes(path)?;
    trace!(path = %path.display(), bytes = bytes.len(), "read_raw");
    Ok(FormatedImage::from_raw(width, height, format, row_major, bytes)?)
}
