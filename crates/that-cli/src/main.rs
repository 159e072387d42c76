//! that - raw pixel buffer conversion CLI
//!
//! Converts headerless pixel dumps between formats and layouts, and shows
//! how formats are described and negotiated for writing.

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use that_core::FormatInfo;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "that")]
#[command(author, version, about = "Raw pixel buffer conversion")]
#[command(long_about = "
Converts raw pixel buffers between element types, widths, channel counts
and row/column-major layouts.

Formats are written <type><bits>[x<channels>], with type one of
unorm, snorm, uint, sint, srgb, float. Examples: unorm8x4, float32x3, srgb16.

Examples:
  that convert in.raw -W 640 -H 480 --from unorm8x3 --to float32x3 -o out.raw
  that convert 'frames/*.raw' -W 64 -H 64 --from uint16 --to unorm8 --out-dir conv/
  that convert in.raw -W 4 -H 4 --from srgb8x4 --to srgb8x4 --to-col-major -o t.raw
  that info unorm8x4 float16x3
  that plan uint16x3 out.png
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (repeat for more)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Number of threads (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert raw pixel buffers
    #[command(visible_alias = "c")]
    Convert(ConvertArgs),

    /// Describe pixel formats
    #[command(visible_alias = "i")]
    Info(InfoArgs),

    /// Show how a write to PATH would be negotiated
    Plan(PlanArgs),
}

#[derive(Args)]
struct ConvertArgs {
    /// Input files or glob patterns
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Image width in pixels
    #[arg(short = 'W', long)]
    width: usize,

    /// Image height in pixels
    #[arg(short = 'H', long)]
    height: usize,

    /// Source format
    #[arg(long)]
    from: FormatInfo,

    /// Source buffer is column-major
    #[arg(long)]
    from_col_major: bool,

    /// Target format
    #[arg(long)]
    to: FormatInfo,

    /// Write column-major output
    #[arg(long)]
    to_col_major: bool,

    /// Output file (single input only); `.raw` is added if it has no extension
    #[arg(short, long, conflicts_with = "out_dir")]
    output: Option<PathBuf>,

    /// Output directory; files keep their names
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

#[derive(Args)]
struct InfoArgs {
    /// Formats to describe
    #[arg(required = true)]
    formats: Vec<FormatInfo>,
}

#[derive(Args)]
struct PlanArgs {
    /// Format of the image being written
    format: FormatInfo,

    /// Output path
    path: PathBuf,

    /// Image is column-major
    #[arg(long)]
    col_major: bool,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Configure thread pool
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    match cli.command {
        Commands::Convert(args) => commands::convert::run(args, cli.verbose),
        Commands::Info(args) => commands::info::run(args, cli.verbose),
        Commands::Plan(args) => commands::plan::run(args, cli.verbose),
    }
}
