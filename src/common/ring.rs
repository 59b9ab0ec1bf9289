use std::f64::consts::PI;

use super::{
    bit_array::BitArray,
    error::{HexError, HexResult},
    geometry::{Arc, Line, Point, Segment, EPSILON},
};

// Ring parameters
//------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingParams {
    /// Apothem of the hexagon, measured to the stroke center
    pub inner_radius: f64,
    pub border_radius: f64,
    pub start_end_offset: f64,
    pub slot_distance: f64,
    pub slot_length: f64,
}

/// Reserved slots at one end of the seam.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinderPattern {
    pub len: usize,
    pub set: bool,
}

/// Where on a slot a location is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotAnchor {
    Start,
    Center,
    End,
}

// Hexagon ring
//------------------------------------------------------------------------------

/// One rounded, flat-topped hexagon centered at the origin.
///
/// The perimeter starts right after the seam corner at the lower right, runs counter-clockwise
/// through 6 trimmed sides and the 5 rounded corners between them, and ends before the seam again.
/// It is tiled by equally long slots. The first `finder_ccw.len` and last `finder_cw.len` slots
/// are finder patterns, every other slot carries one data bit.
#[derive(Debug, Clone)]
pub struct HexagonRing {
    params: RingParams,
    outer_radius: f64,
    segments: Vec<Segment>,
    length: f64,
    slot_count: usize,
    slot_length: f64,
    finder_ccw: FinderPattern,
    finder_cw: FinderPattern,
    bits: Option<BitArray>,
}

impl HexagonRing {
    pub fn new(
        params: RingParams,
        finder_ccw: FinderPattern,
        finder_cw: FinderPattern,
    ) -> HexResult<Self> {
        let RingParams { inner_radius, border_radius, start_end_offset, slot_distance, slot_length } =
            params;
        let valid = inner_radius > 0.0
            && border_radius >= 0.0
            && start_end_offset >= 0.0
            && slot_distance >= 0.0
            && slot_length > 0.0
            && [inner_radius, border_radius, start_end_offset, slot_distance, slot_length]
                .iter()
                .all(|v| v.is_finite());
        if !valid {
            return Err(HexError::InvalidRingGeometry);
        }

        let outer_radius = inner_radius * 2.0 / 3f64.sqrt();
        let side_offset = (PI / 6.0).tan() * border_radius;
        let corner_arc_offset = border_radius / (PI / 6.0).cos();

        // Side length equals the circumradius
        if 2.0 * side_offset >= outer_radius || side_offset + start_end_offset >= outer_radius {
            return Err(HexError::InvalidRingGeometry);
        }

        let corners = Self::virtual_corners(inner_radius);
        let mut sides = Vec::with_capacity(6);
        for i in 0..6 {
            let side = Line::new(corners[i], corners[(i + 1) % 6]);
            let (start, end) = match i {
                0 => (start_end_offset, side_offset),
                5 => (side_offset, start_end_offset),
                _ => (side_offset, side_offset),
            };
            sides.push(side.sub_line(start, end)?);
        }

        let origin = Point::new(0.0, 0.0);
        let mut segments = Vec::with_capacity(11);
        for i in 0..6 {
            segments.push(Segment::Line(sides[i]));
            if i == 5 {
                break;
            }
            let corner = corners[i + 1];
            let center = Line::new(origin, corner).position_to_point(-corner_arc_offset)?;
            let arc = Arc::from_points(center, border_radius, sides[i].end(), sides[i + 1].start());
            segments.push(Segment::Arc(arc));
        }

        let length: f64 = segments.iter().map(|s| s.length()).sum();
        let slot_count = ((length + slot_distance) / (slot_length + slot_distance)).floor() as usize;
        if slot_count <= finder_ccw.len + finder_cw.len {
            return Err(HexError::InvalidRingGeometry);
        }
        let slot_length = (length - (slot_count - 1) as f64 * slot_distance) / slot_count as f64;

        Ok(Self {
            params,
            outer_radius,
            segments,
            length,
            slot_count,
            slot_length,
            finder_ccw,
            finder_cw,
            bits: None,
        })
    }

    /// Unrounded corners of a hexagon with the given apothem, starting at the seam corner and
    /// going counter-clockwise.
    pub fn virtual_corners(inner_radius: f64) -> [Point; 6] {
        let r = inner_radius;
        let s = r * 2.0 / 3f64.sqrt();
        [
            Point::new(s / 2.0, r),
            Point::new(s, 0.0),
            Point::new(s / 2.0, -r),
            Point::new(-s / 2.0, -r),
            Point::new(-s, 0.0),
            Point::new(-s / 2.0, r),
        ]
    }

    pub fn params(&self) -> &RingParams {
        &self.params
    }

    pub fn inner_radius(&self) -> f64 {
        self.params.inner_radius
    }

    pub fn outer_radius(&self) -> f64 {
        self.outer_radius
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    /// Slot length after stretching the slots to tile the perimeter exactly.
    pub fn slot_length(&self) -> f64 {
        self.slot_length
    }

    pub fn slot_distance(&self) -> f64 {
        self.params.slot_distance
    }

    pub fn finder_ccw(&self) -> FinderPattern {
        self.finder_ccw
    }

    pub fn finder_cw(&self) -> FinderPattern {
        self.finder_cw
    }

    pub fn bit_count(&self) -> usize {
        self.slot_count - self.finder_ccw.len - self.finder_cw.len
    }

    pub fn bits(&self) -> Option<&BitArray> {
        self.bits.as_ref()
    }

    /// Attaches the ring's share of the bitstream. The view keeps aliasing its parent.
    pub fn assign_bits(&mut self, bits: BitArray) -> HexResult<()> {
        if bits.len() != self.bit_count() {
            return Err(HexError::BufferSizeMismatch);
        }
        self.bits = Some(bits);
        Ok(())
    }

    pub fn is_finder_slot(&self, index: usize) -> bool {
        index < self.finder_ccw.len || index >= self.slot_count - self.finder_cw.len
    }

    /// Slot index of data bit `bit`.
    pub fn data_slot(&self, bit: usize) -> usize {
        bit + self.finder_ccw.len
    }

    pub fn is_slot_set(&self, index: usize) -> HexResult<bool> {
        if index >= self.slot_count {
            return Err(HexError::IndexOutOfRange);
        }
        if index < self.finder_ccw.len {
            return Ok(self.finder_ccw.set);
        }
        if index >= self.slot_count - self.finder_cw.len {
            return Ok(self.finder_cw.set);
        }
        self.bits.as_ref().ok_or(HexError::BitsNotAssigned)?.get(index - self.finder_ccw.len)
    }

    /// Arclength at which slot `index` starts.
    pub fn slot_start(&self, index: usize) -> f64 {
        index as f64 * (self.slot_length + self.params.slot_distance)
    }

    pub fn slot_location(&self, index: usize, anchor: SlotAnchor) -> HexResult<Point> {
        if index >= self.slot_count {
            return Err(HexError::IndexOutOfRange);
        }
        let offset = match anchor {
            SlotAnchor::Start => 0.0,
            SlotAnchor::Center => self.slot_length / 2.0,
            SlotAnchor::End => self.slot_length,
        };
        self.position_to_point(self.slot_start(index) + offset)
    }

    /// Point at arclength `position` along the whole perimeter.
    pub fn position_to_point(&self, position: f64) -> HexResult<Point> {
        let mut pos = position;
        for seg in self.segments.iter() {
            if pos - EPSILON <= seg.length() {
                return seg.position_to_point(pos.clamp(0.0, seg.length()));
            }
            pos -= seg.length();
        }
        Err(HexError::PositionOutOfRange)
    }

    /// Slot covering perimeter arclength `position`, `None` inside the gaps between slots.
    pub fn slot_at(&self, position: f64) -> Option<usize> {
        if position < -EPSILON || position > self.length + EPSILON {
            return None;
        }
        let pitch = self.slot_length + self.params.slot_distance;
        let index = ((position.max(0.0)) / pitch).floor() as usize;
        let index = index.min(self.slot_count - 1);
        if position - self.slot_start(index) <= self.slot_length + EPSILON {
            Some(index)
        } else {
            None
        }
    }

    /// First and last slot reaching onto each of the 6 sides, starting with the side after the
    /// seam.
    pub fn side_slots(&self) -> [(usize, usize); 6] {
        let pitch = self.slot_length + self.params.slot_distance;
        let last = self.slot_count - 1;
        let index = |pos: f64| ((pos.max(0.0) / pitch).floor() as usize).min(last);

        let mut sides = [(0, 0); 6];
        let mut start = 0.0;
        for (i, seg) in self.segments.iter().enumerate() {
            let end = start + seg.length();
            if i % 2 == 0 {
                sides[i / 2] = (index(start), index(end - EPSILON));
            }
            start = end;
        }
        sides
    }

    /// Distance of `p` to the stroke center line and the perimeter arclength of its projection.
    pub fn project(&self, p: &Point) -> Option<(f64, f64)> {
        let mut start = 0.0;
        let mut best: Option<(f64, f64)> = None;
        for seg in self.segments.iter() {
            if let Some((dist, along)) = seg.project(p) {
                if best.map_or(true, |(d, _)| dist < d) {
                    best = Some((dist, start + along));
                }
            }
            start += seg.length();
        }
        best
    }
}
