use std::error::Error;
use std::path::PathBuf;

use hexcode::HexBuilder;
use tracing_subscriber::EnvFilter;

// Usage: generate [payload] [output.png]
// Writes the PNG, an SVG next to it and the payload as `.txt`, the layout the decoding bench reads
fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut args = std::env::args().skip(1);
    let payload = args.next().unwrap_or_else(|| "Hello, World!".to_string());
    let out = PathBuf::from(args.next().unwrap_or_else(|| "hexcode.png".to_string()));

    let code = HexBuilder::new(payload.as_bytes()).build()?;

    code.to_image(2.0).save(&out)?;
    std::fs::write(out.with_extension("svg"), code.to_svg(1.0)?)?;
    std::fs::write(out.with_extension("txt"), &payload)?;

    println!("Hexagonal code saved to: {}", out.display());
    println!("Rings: {}, masks: {:?}", code.ring_count(), code.masks());
    Ok(())
}
