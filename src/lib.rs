//! # hexcode
//!
//! A Rust library for generating and reading hexagonal codes: a 2D visual data format that
//! stores a byte payload as dash patterns along concentric rounded-hexagon rings. The payload is
//! protected with Reed-Solomon error correction and a CRC-32 checksum, and the glyph is read
//! back from photographs despite rotation, scale and perspective skew.
//!
//! ## Features
//!
//! - **Code Generation**: Lay out 1 to 256 byte payloads on as few rings as needed
//! - **Code Reading**: Locate, orient and sample codes from grayscale or color images
//! - **Reed-Solomon Error Correction**: Configurable parity share, all spare ring capacity is used
//! - **Vector Output**: Ring paths made of lines and arcs, an SVG writer and a rasterizer
//!
//! ## Quick Start
//!
//! ### Generating a Code
//!
//! ```rust
//! use hexcode::HexBuilder;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Only the payload is required, 50% extra parity and masking are the defaults
//! let code = HexBuilder::new(b"Hello, World!").build()?;
//!
//! let img = code.to_image(1.0); // 1 pixel per format unit
//! let svg = code.to_svg(1.0)?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Full Configuration
//!
//! ```rust
//! use hexcode::HexBuilder;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let code = HexBuilder::new(b"Hello, World!")
//!     .error_correction_factor(1.5) // Parity of at least 150% of the payload, within 0.1..=2.0
//!     .masking(false)               // Masking evens out dashes and gaps, on by default
//!     .build()?;
//!
//! for ring in code.paths()? {
//!     for piece in ring.iter().filter(|p| p.set) {
//!         // Stroke `piece.segment`, a line or an arc
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Reading a Code
//!
//! ```rust,no_run
//! use hexcode::HexReader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let img = image::open("hexcode.png")?;
//!
//! // A reader keeps its buffers between frames
//! let mut reader = HexReader::new();
//! let payload = reader.read(&img)?;
//! println!("Decoded {} bytes", payload.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Format
//!
//! Each ring is a flat-topped hexagon with rounded corners, cut open at its lower right corner.
//! The cut hosts the orientation bar, a stroke pointing from the center toward that corner.
//! The slots right after and right before the cut form the finder patterns that reveal the ring
//! count. All other slots carry one bit each, set slots are drawn and unset ones are left blank.
//!
//! The bitstream is `[header][payload][parity]`, with the header holding the format version,
//! payload length, parity length, checksum and one mask id per ring, followed by its own parity.

pub mod builder;
pub(crate) mod common;
pub mod reader;

pub use builder::{HexBuilder, HexCode, PathSegment};
pub use common::{
    bit_array::BitArray,
    checksum::{Checksum, Crc32},
    ec::{ErrorCorrection, ReedSolomon},
    error::{ErrorKind, HexError, HexResult},
    geometry::{Arc, Line, Point, Segment},
    header::Header,
    mask::MaskPattern,
    metadata::{HexVersion, Specification, V0},
    ring::{FinderPattern, HexagonRing, RingParams, SlotAnchor},
    transform::PerspectiveTransform,
};
pub use reader::{Detection, HexReader, Luminance};
