//! Format description command.

use crate::InfoArgs;
use anyhow::Result;
use that_core::ElementType;
use tracing::trace;

/// Prints each parsed format with its sizes and family.
pub fn run(args: InfoArgs, verbose: u8) -> Result<()> {
    for format in &args.formats {
        trace!(%format, "info::run");
        println!("{}", format.short_name());
        println!("  Format:     {format}");
        println!("  Element:    {} ({} bytes)", format.ty, format.elem_size);
        println!("  Channels:   {}", format.channels);
        println!("  Pixel size: {} bytes", format.pixel_size());
        println!("  Family:     {}", family(format.ty));
        if verbose > 0 {
            println!("  Bits:       {}", format.bits());
            println!("  Signed:     {}", format.ty.is_signed());
        }
        if args.formats.len() > 1 {
            println!();
        }
    }
    Ok(())
}

fn family(ty: ElementType) -> &'static str {
    match ty {
        ElementType::Uint | ElementType::Sint => "integer",
        ElementType::Unorm | ElementType::Snorm => "normalized integer",
        ElementType::Srgb => "sRGB-encoded integer",
        ElementType::Float => "floating point",
    }
}
