use std::error::Error;

use hexcode::HexReader;
use tracing_subscriber::EnvFilter;

// Usage: read [image]
fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "hexcode.png".to_string());
    let img = image::open(&path)?;

    let mut reader = HexReader::new();
    let detection = reader.detect(&img)?;
    println!("Found {} rings centered at {:?}", detection.ring_count(), detection.center);

    let payload = reader.read(&img)?;
    println!("Successfully decoded hexagonal code from: {path}");
    println!("Decoded payload: {}", String::from_utf8_lossy(&payload));
    Ok(())
}
