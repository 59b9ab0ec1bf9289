pub mod bit_array;
pub mod checksum;
pub mod ec;
pub mod error;
pub mod format;
pub mod geometry;
pub mod header;
pub mod mask;
pub mod metadata;
pub mod ring;
pub mod transform;

pub use bit_array::*;
pub use checksum::*;
pub use ec::{ErrorCorrection, ReedSolomon};
pub use error::*;
pub use geometry::*;
pub use header::*;
pub use mask::*;
pub use metadata::*;
pub use ring::*;
pub use transform::*;
