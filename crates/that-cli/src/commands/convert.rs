//! Raw buffer conversion command.
//!
//! Every input is read as `--from`, converted in memory to `--to`, and
//! written verbatim. Several inputs are processed in parallel.

use crate::ConvertArgs;
use anyhow::{bail, Result};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use that_core::FormatInfo;
use tracing::{debug, info, trace};

/// Source/target description shared by every file of one run.
#[derive(Debug, Clone, Copy)]
struct Job {
    width: usize,
    height: usize,
    from: FormatInfo,
    from_row_major: bool,
    to: FormatInfo,
    to_row_major: bool,
}

pub fn run(args: ConvertArgs, verbose: u8) -> Result<()> {
    trace!(inputs = args.inputs.len(), from = %args.from, to = %args.to, "convert::run");

    let files = super::expand_inputs(&args.inputs)?;
    let job = Job {
        width: args.width,
        height: args.height,
        from: args.from,
        from_row_major: !args.from_col_major,
        to: args.to,
        to_row_major: !args.to_col_major,
    };

    let targets: Vec<(PathBuf, PathBuf)> = match (&args.output, &args.out_dir) {
        (Some(output), None) => {
            if files.len() != 1 {
                bail!("--output takes a single input, got {}; use --out-dir", files.len());
            }
            vec![(files[0].clone(), output.clone())]
        }
        (None, Some(dir)) => files
            .iter()
            .map(|input| {
                let name = input
                    .file_name()
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("output.raw"));
                (input.clone(), dir.join(name))
            })
            .collect(),
        _ => bail!("Specify either --output or --out-dir"),
    };

    info!(files = targets.len(), from = %job.from, to = %job.to, "Starting conversion");
    if verbose > 0 {
        println!(
            "Converting {} file(s): {} ({}) -> {} ({})",
            targets.len(),
            job.from.short_name(),
            super::layout_name(job.from_row_major),
            job.to.short_name(),
            super::layout_name(job.to_row_major),
        );
    }

    // Process files in parallel
    let results: Vec<Result<()>> = targets
        .par_iter()
        .map(|(input, output)| convert_file(input, output, job, verbose))
        .collect();

    // Report results
    let mut success = 0;
    let mut failed = 0;
    for r in results {
        match r {
            Ok(()) => success += 1,
            Err(e) => {
                failed += 1;
                eprintln!("Error: {e:#}");
            }
        }
    }

    info!(success, failed, "Conversion complete");
    if targets.len() > 1 || verbose > 0 {
        println!("Processed: {success} success, {failed} failed");
    }

    if failed > 0 {
        bail!("{} files failed", failed);
    }
    Ok(())
}

fn convert_file(input: &Path, output: &Path, job: Job, verbose: u8) -> Result<()> {
    let mut image = super::load_raw(input, job.width, job.height, job.from, job.from_row_major)?;
    image.re_format(job.to, job.to_row_major)?;
    let plan = super::save_raw(output, &image)?;

    debug!(input = %input.display(), output = %plan.path.display(), "converted");
    if verbose > 0 {
        println!("  {} -> {}", input.display(), plan.path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn args(inputs: Vec<String>, output: Option<PathBuf>, out_dir: Option<PathBuf>) -> ConvertArgs {
        ConvertArgs {
            inputs,
            width: 2,
            height: 1,
            from: "unorm8x2".parse().unwrap(),
            from_col_major: false,
            to: "unorm16x2".parse().unwrap(),
            to_col_major: false,
            output,
            out_dir,
        }
    }

    #[test]
    fn test_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.raw");
        let output = dir.path().join("out.raw");
        fs::write(&input, [0xFF, 0x00, 0x01, 0x80]).unwrap();

        let input_arg = input.to_string_lossy().into_owned();
        run(args(vec![input_arg], Some(output.clone()), None), 0).unwrap();

        let bytes = fs::read(&output).unwrap();
        let values: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|c| u16::from_ne_bytes([c[0], c[1]]))
            .collect();
        assert_eq!(values, vec![0xFFFF, 0x0000, 0x0101, 0x8080]);
    }

    #[test]
    fn test_output_without_extension_is_raw() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.raw");
        fs::write(&input, [0xFF, 0x00, 0x01, 0x80]).unwrap();

        let input_arg = input.to_string_lossy().into_owned();
        run(args(vec![input_arg], Some(dir.path().join("out")), None), 0).unwrap();
        assert_eq!(fs::read(dir.path().join("out.raw")).unwrap().len(), 8);
    }

    #[test]
    fn test_out_dir_and_failures() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.raw"), [1, 2, 3, 4]).unwrap();
        fs::write(dir.path().join("b.raw"), [1, 2, 3]).unwrap();
        let out = dir.path().join("conv");
        let pattern = dir.path().join("*.raw").to_string_lossy().into_owned();

        // b.raw is one byte short
        assert!(run(args(vec![pattern], None, Some(out.clone())), 0).is_err());
        assert_eq!(fs::read(out.join("a.raw")).unwrap().len(), 8);
        assert!(!out.join("b.raw").exists());
    }

    #[test]
    fn test_output_needs_single_input() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.raw"), [0; 4]).unwrap();
        fs::write(dir.path().join("b.raw"), [0; 4]).unwrap();
        let pattern = dir.path().join("*.raw").to_string_lossy().into_owned();
        let err = run(args(vec![pattern], Some(dir.path().join("o.raw")), None), 0).unwrap_err();
        assert!(err.to_string().contains("--out-dir"));
    }
}
