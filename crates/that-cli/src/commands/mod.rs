//! CLI command implementations

pub mod convert;
pub mod info;
pub mod plan;

use anyhow::{bail, Context, Result};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use that_core::{FormatInfo, FormatedImage};
use that_io::{LocalStore, RawEncoder, WriteOptions, WritePlan};

/// Reads a raw buffer of known dimensions and format.
pub fn load_raw(
    path: &Path,
    width: usize,
    height: usize,
    format: FormatInfo,
    row_major: bool,
) -> Result<FormatedImage> {
    that_io::read_raw(&LocalStore::new(), path, width, height, format, row_major)
        .with_context(|| format!("Failed to load: {}", path.display()))
}

/// Writes the image buffer verbatim. A path without an extension gets `.raw`.
pub fn save_raw(path: &Path, image: &FormatedImage) -> Result<WritePlan> {
    let path = raw_path(path);
    let options = WriteOptions::default();
    that_io::write_image(&LocalStore::new(), &RawEncoder, image, &path, &options)
        .with_context(|| format!("Failed to save: {}", path.display()))
}

fn raw_path(path: &Path) -> Cow<'_, Path> {
    if path.extension().is_some() {
        Cow::Borrowed(path)
    } else {
        Cow::Owned(path.with_extension("raw"))
    }
}

/// Expands glob patterns. Patterns that match nothing are an error.
pub fn expand_inputs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let matched: Vec<PathBuf> = glob::glob(pattern)
            .with_context(|| format!("Invalid pattern: {pattern}"))?
            .filter_map(|r| r.ok())
            .collect();
        if matched.is_empty() {
            bail!("No files match pattern: {}", pattern);
        }
        files.extend(matched);
    }
    files.sort();
    files.dedup();
    Ok(files)
}

/// Human name for a layout flag.
pub fn layout_name(row_major: bool) -> &'static str {
    if row_major { "row-major" } else { "column-major" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_expand_inputs() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.raw", "a.raw", "c.bin"] {
            fs::write(dir.path().join(name), [0u8]).unwrap();
        }
        let pattern = dir.path().join("*.raw").to_string_lossy().into_owned();
        let files = expand_inputs(&[pattern.clone(), pattern]).unwrap();
        let names: Vec<&str> = files.iter().filter_map(|p| p.file_name()?.to_str()).collect();
        assert_eq!(names, ["a.raw", "b.raw"]);

        let missing = dir.path().join("*.png").to_string_lossy().into_owned();
        assert!(expand_inputs(&[missing]).is_err());
    }

    #[test]
    fn test_raw_helpers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/x.raw");
        let format: FormatInfo = "uint8x2".parse().unwrap();
        let image = FormatedImage::from_raw(2, 1, format, true, vec![1, 2, 3, 4]).unwrap();
        save_raw(&path, &image).unwrap();
        assert_eq!(load_raw(&path, 2, 1, format, true).unwrap(), image);
        assert!(load_raw(&path, 3, 1, format, true).is_err());
    }

    #[test]
    fn test_save_raw_defaults_extension() {
        let dir = tempfile::tempdir().unwrap();
        let format: FormatInfo = "unorm16".parse().unwrap();
        let image = FormatedImage::from_raw(1, 1, format, true, vec![7, 9]).unwrap();

        let plan = save_raw(&dir.path().join("out"), &image).unwrap();
        assert_eq!(plan.path, dir.path().join("out.raw"));
        assert_eq!(fs::read(&plan.path).unwrap(), vec![7, 9]);
        assert!(!dir.path().join("out").exists());

        // an explicit extension still picks the family
        assert!(save_raw(&dir.path().join("out.png"), &image).is_err());
    }
}
