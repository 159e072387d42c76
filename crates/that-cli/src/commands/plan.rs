//! Write negotiation preview.

use crate::PlanArgs;
use anyhow::{Context, Result};
use tracing::trace;

/// Prints the plan [`that_io::plan_write`] produces for the arguments.
pub fn run(args: PlanArgs, verbose: u8) -> Result<()> {
    let row_major = !args.col_major;
    trace!(format = %args.format, path = %args.path.display(), "plan::run");

    let plan = that_io::plan_write(args.format, row_major, &args.path).with_context(|| {
        format!("Cannot write {} to {}", args.format.short_name(), args.path.display())
    })?;

    println!("{}", plan.path.display());
    println!("  Encoder:    {}", plan.encoder);
    println!("  Format:     {}", plan.format.short_name());
    println!("  Layout:     {}", super::layout_name(plan.row_major));
    let convert = plan.needs_conversion(args.format, row_major);
    println!("  Convert:    {}", if convert { "yes" } else { "no" });
    if verbose > 0 && convert {
        println!(
            "  From:       {} ({})",
            args.format.short_name(),
            super::layout_name(row_major)
        );
    }
    Ok(())
}
