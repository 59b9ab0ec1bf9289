mod binarize;
mod bounding_rect;
mod hexagon;
mod rings;
mod utils;

use image::GrayImage;
use tracing::{debug, info};

use crate::common::{
    bit_array::BitArray,
    checksum::{Checksum, Crc32},
    ec::{ErrorCorrection, ReedSolomon},
    error::HexResult,
    format,
    geometry::Point,
    metadata::HexVersion,
    ring::HexagonRing,
    transform::PerspectiveTransform,
};

use binarize::BinaryImage;
pub use binarize::Luminance;
use utils::geometry::Pixel;

// Detection
//------------------------------------------------------------------------------

/// Geometry recovered from one image, before the bitstream is parsed.
#[derive(Debug, Clone)]
pub struct Detection {
    /// Outer corners of the outermost ring in image space, starting at the seam corner
    pub corners: [Point; 6],
    pub center: Point,
    /// Maps format units onto image pixels
    pub transform: PerspectiveTransform,
    /// Rings holding views into `bits`
    pub rings: Vec<HexagonRing>,
    /// Sampled data slots of all rings
    pub bits: BitArray,
}

impl Detection {
    pub fn ring_count(&self) -> usize {
        self.rings.len()
    }
}

// Reader
//------------------------------------------------------------------------------

/// Reads hexagonal codes from images. Scratch buffers are kept between calls, so one reader
/// serves a stream of frames cheaply.
#[derive(Debug, Clone)]
pub struct HexReader {
    img: BinaryImage,
    candidates: Vec<Pixel>,
    hull: Vec<Pixel>,
    try_inverted: bool,
}

impl Default for HexReader {
    fn default() -> Self {
        Self::new()
    }
}

impl HexReader {
    pub fn new() -> Self {
        Self {
            img: BinaryImage::default(),
            candidates: Vec::new(),
            hull: Vec::new(),
            try_inverted: true,
        }
    }

    /// Whether a failed read is retried on the luminance negative, for light codes on dark
    /// ground. On by default.
    pub fn try_inverted(&mut self, try_inverted: bool) -> &mut Self {
        self.try_inverted = try_inverted;
        self
    }

    pub fn read<I: Luminance>(&mut self, img: &I) -> HexResult<Vec<u8>> {
        self.read_with(img, &ReedSolomon, &Crc32)
    }

    /// Reads with custom error correction and checksum. Both must match the ones the code was
    /// built with.
    pub fn read_with<I: Luminance>(
        &mut self,
        img: &I,
        ec: &impl ErrorCorrection,
        checksum: &impl Checksum,
    ) -> HexResult<Vec<u8>> {
        info!("Reading hexagonal code...");
        let luma = img.luminance();

        let res = self.read_luma(&luma, ec, checksum);
        match res {
            Err(e) if self.try_inverted => {
                debug!("Read failed with {e:?}, retrying on inverted image");
                // Reports the failure on the original image
                self.read_luma(&binarize::invert(&luma), ec, checksum).map_err(|_| e)
            }
            res => res,
        }
    }

    /// Locates the code and samples its slots without parsing the bitstream.
    pub fn detect<I: Luminance>(&mut self, img: &I) -> HexResult<Detection> {
        let luma = img.luminance();
        self.detect_luma(&luma)
    }

    fn read_luma(
        &mut self,
        luma: &GrayImage,
        ec: &impl ErrorCorrection,
        checksum: &impl Checksum,
    ) -> HexResult<Vec<u8>> {
        let detection = self.detect_luma(luma)?;

        info!("Decoding {} rings...", detection.ring_count());
        format::decode(&detection.rings, &detection.bits, ec, checksum)
    }

    fn detect_luma(&mut self, luma: &GrayImage) -> HexResult<Detection> {
        let spec = HexVersion::CURRENT.spec();

        debug!("Binarizing {}x{} image...", luma.width(), luma.height());
        self.img.binarize(luma);

        debug!("Locating bounding rect...");
        let rect = bounding_rect::locate_rect(&self.img)?;

        debug!("Locating bounding hexagon...");
        let mut hex =
            hexagon::locate_hexagon(&self.img, &rect, &mut self.candidates, &mut self.hull)?;

        debug!("Locating orientation finder...");
        rings::locate_orientation(&self.img, &mut hex)?;

        debug!("Counting rings...");
        let preliminary = rings::preliminary_transform(spec, &hex)?;
        let ring_count = rings::count_rings(&self.img, spec, &hex, &preliminary)?;
        let transform = rings::refine(spec, &preliminary, ring_count);

        debug!("Sampling {ring_count} rings...");
        let mut rings = spec.rings(ring_count)?;
        let bits = rings::sample(&self.img, &mut rings, &transform)?;

        info!("Detected code with {ring_count} rings");
        Ok(Detection { corners: hex.corners, center: hex.center, transform, rings, bits })
    }
}
