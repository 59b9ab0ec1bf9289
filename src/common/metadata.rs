use std::f64::consts::PI;

use super::{
    error::{HexError, HexResult},
    geometry::{Line, Point},
    ring::{FinderPattern, HexagonRing, RingParams},
};

// Version
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum HexVersion {
    V0,
}

impl HexVersion {
    pub const CURRENT: HexVersion = HexVersion::V0;

    pub fn from_id(id: u32) -> HexResult<Self> {
        match id {
            0 => Ok(Self::V0),
            _ => Err(HexError::UnsupportedVersion),
        }
    }

    pub fn id(self) -> u32 {
        match self {
            Self::V0 => 0,
        }
    }

    pub fn spec(self) -> &'static Specification {
        match self {
            Self::V0 => &V0,
        }
    }
}

// Specification
//------------------------------------------------------------------------------

/// Field widths and ring geometry of one format version. Lengths are in format units, the
/// innermost ring is centered at the origin.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Specification {
    pub version_bits: usize,
    pub payload_len_bits: usize,
    pub ecc_len_bits: usize,
    pub checksum_bits: usize,
    pub mask_bits: usize,

    pub max_payload_len: usize,
    pub min_ecc_factor: f64,
    pub max_ecc_factor: f64,
    pub default_ecc_factor: f64,

    pub innermost_radius: f64,
    pub border_radius: f64,
    pub ring_distance: f64,
    pub line_width: f64,
    pub slot_length: f64,
    pub slot_distance: f64,
    pub start_end_offset: f64,
    pub finder_len: usize,
}

pub const V0: Specification = Specification {
    version_bits: 4,
    payload_len_bits: 8,
    ecc_len_bits: 16,
    checksum_bits: 32,
    mask_bits: 2,

    max_payload_len: 256,
    min_ecc_factor: 0.1,
    max_ecc_factor: 2.0,
    default_ecc_factor: 0.5,

    innermost_radius: 150.0,
    border_radius: 50.0,
    ring_distance: 50.0,
    line_width: 10.0,
    slot_length: 10.0,
    slot_distance: 0.0,
    start_end_offset: 20.0,
    finder_len: 3,
};

impl Specification {
    /// Apothem of ring `index`.
    pub fn ring_radius(&self, index: usize) -> f64 {
        self.innermost_radius + index as f64 * self.ring_distance
    }

    pub fn ring_params(&self, index: usize) -> RingParams {
        RingParams {
            inner_radius: self.ring_radius(index),
            border_radius: self.border_radius,
            start_end_offset: self.start_end_offset,
            slot_distance: self.slot_distance,
            slot_length: self.slot_length,
        }
    }

    /// Ring `index` without bits. The clockwise finder of the innermost ring is left unset so
    /// that ring counting sees one mark less on that side.
    pub fn ring(&self, index: usize) -> HexResult<HexagonRing> {
        let ccw = FinderPattern { len: self.finder_len, set: true };
        let cw = FinderPattern { len: self.finder_len, set: index != 0 };
        HexagonRing::new(self.ring_params(index), ccw, cw)
    }

    pub fn rings(&self, count: usize) -> HexResult<Vec<HexagonRing>> {
        (0..count).map(|i| self.ring(i)).collect()
    }

    pub fn header_data_len(&self, ring_count: usize) -> usize {
        self.version_bits
            + self.payload_len_bits
            + self.ecc_len_bits
            + self.checksum_bits
            + self.mask_bits * ring_count
    }

    /// Header length including its parity, which is as long as the header data.
    pub fn header_len(&self, ring_count: usize) -> usize {
        2 * self.header_data_len(ring_count)
    }

    /// Distance from a virtual corner to the center of its rounding arc.
    pub fn corner_arc_offset(&self) -> f64 {
        self.border_radius / (PI / 6.0).cos()
    }

    /// Center line of the orientation finder: a bar on the seam diagonal from one ring distance
    /// inside the innermost ring out to the rounded corner radius of the outermost ring.
    pub fn orientation_finder(&self, ring_count: usize) -> Line {
        let cos30 = (PI / 6.0).cos();
        let dir = seam_direction();
        let inner = (self.innermost_radius - self.ring_distance) / cos30;
        let outer_corner = self.ring_radius(ring_count.max(1) - 1) / cos30;
        let outer = outer_corner - (self.corner_arc_offset() - self.border_radius);
        Line::new(dir * inner, dir * outer)
    }

    /// Circumradius of the outermost stroke's outer edge, i.e. the extent of the drawn glyph.
    pub fn extent(&self, ring_count: usize) -> f64 {
        let apothem = self.ring_radius(ring_count.max(1) - 1) + self.line_width / 2.0;
        apothem * 2.0 / 3f64.sqrt()
    }
}

/// Unit vector from the center toward the seam corner.
pub fn seam_direction() -> Point {
    HexagonRing::virtual_corners(1.0)[0].normalize()
}
