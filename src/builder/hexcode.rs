use image::{GrayImage, Luma};

use crate::common::{
    bit_array::BitArray,
    error::HexResult,
    format::Layout,
    geometry::{Line, Point, Segment, EPSILON},
    header::Header,
    mask::MaskPattern,
    metadata::{HexVersion, Specification},
    ring::HexagonRing,
};

/// Quiet zone around the glyph, relative to its circumradius.
const QUIET_ZONE: f64 = 0.3;

// Path segment
//------------------------------------------------------------------------------

/// A stretch of ring perimeter covering equally valued slots, within one perimeter segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathSegment {
    pub segment: Segment,
    pub set: bool,
}

// Hexagonal code
//------------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct HexCode {
    version: HexVersion,
    payload: Vec<u8>,
    header: Header,
    rings: Vec<HexagonRing>,
    bits: BitArray,
}

impl HexCode {
    pub(crate) fn new(payload: Vec<u8>, layout: Layout) -> Self {
        let Layout { header, rings, bits } = layout;
        Self { version: header.version, payload, header, rings, bits }
    }

    pub fn version(&self) -> HexVersion {
        self.version
    }

    pub fn spec(&self) -> &'static Specification {
        self.version.spec()
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn masks(&self) -> &[MaskPattern] {
        &self.header.masks
    }

    pub fn rings(&self) -> &[HexagonRing] {
        &self.rings
    }

    pub fn ring_count(&self) -> usize {
        self.rings.len()
    }

    /// Full bitstream: header, payload and parity, masked.
    pub fn bits(&self) -> &BitArray {
        &self.bits
    }

    pub fn orientation_finder(&self) -> Line {
        self.spec().orientation_finder(self.ring_count())
    }

    /// Half the side of the rendered square, quiet zone included, in format units.
    pub fn half_size(&self) -> f64 {
        self.spec().extent(self.ring_count()) * (1.0 + QUIET_ZONE)
    }
}

// Paths
//------------------------------------------------------------------------------

impl HexCode {
    /// Perimeter pieces of every ring, innermost first. Adjacent equal slots merge when slots
    /// have no gap between them, and pieces split where lines and arcs meet.
    pub fn paths(&self) -> HexResult<Vec<Vec<PathSegment>>> {
        self.rings.iter().map(ring_paths).collect()
    }
}

fn ring_paths(ring: &HexagonRing) -> HexResult<Vec<PathSegment>> {
    let merge = ring.slot_distance() == 0.0;
    let mut runs: Vec<(f64, f64, bool)> = Vec::new();
    for i in 0..ring.slot_count() {
        let set = ring.is_slot_set(i)?;
        let start = ring.slot_start(i);
        let end = start + ring.slot_length();
        match runs.last_mut() {
            Some(last) if merge && last.2 == set => last.1 = end,
            _ => runs.push((start, end, set)),
        }
    }

    let mut paths = Vec::new();
    let mut seg_start = 0.0;
    for seg in ring.segments() {
        let seg_end = seg_start + seg.length();
        for &(from, to, set) in runs.iter() {
            let (a, b) = (from.max(seg_start), to.min(seg_end));
            if b - a > EPSILON {
                let segment = seg.sub_segment(a - seg_start, b - seg_start)?;
                paths.push(PathSegment { segment, set });
            }
        }
        seg_start = seg_end;
    }
    Ok(paths)
}

// Render
//------------------------------------------------------------------------------

impl HexCode {
    /// Rasterizes the code with `scale` pixels per format unit, black strokes with butt caps on
    /// white, centered in a square with a quiet zone.
    pub fn to_image(&self, scale: f64) -> GrayImage {
        let half = self.half_size();
        let size = (2.0 * half * scale).ceil() as u32;
        GrayImage::from_fn(size, size, |x, y| {
            let p = Point::new((x as f64 + 0.5) / scale - half, (y as f64 + 0.5) / scale - half);
            if self.is_dark(&p) {
                Luma([0])
            } else {
                Luma([255])
            }
        })
    }

    /// Whether format point `p` lies on a drawn stroke.
    pub fn is_dark(&self, p: &Point) -> bool {
        let spec = self.spec();
        let hw = spec.line_width / 2.0;

        let bar = Segment::Line(self.orientation_finder());
        if bar.project(p).is_some_and(|(dist, _)| dist <= hw) {
            return true;
        }

        // Hexagonal distance from the center, strokes of ring i stay within
        // [r_i - hw - corner inset, r_i + hw]
        let (c30, s30) = ((std::f64::consts::PI / 6.0).cos(), 0.5);
        let hex_radius =
            p.y.abs().max((p.x * c30 + p.y * s30).abs()).max((p.x * c30 - p.y * s30).abs());
        let inset = (spec.corner_arc_offset() - spec.border_radius) * c30;
        let lo = ((hex_radius - hw - spec.innermost_radius) / spec.ring_distance).ceil();
        let hi = ((hex_radius + hw + inset - spec.innermost_radius) / spec.ring_distance).floor();
        if hi < 0.0 {
            return false;
        }

        let lo = lo.max(0.0) as usize;
        let hi = (hi as usize).min(self.rings.len().saturating_sub(1));
        (lo..=hi).any(|i| {
            let ring = &self.rings[i];
            match ring.project(p) {
                Some((dist, along)) if dist <= hw => ring
                    .slot_at(along)
                    .is_some_and(|slot| ring.is_slot_set(slot).unwrap_or(false)),
                _ => false,
            }
        })
    }

    /// SVG document with `scale` pixels per format unit.
    pub fn to_svg(&self, scale: f64) -> HexResult<String> {
        let half = self.half_size();
        let size = 2.0 * half * scale;
        let width = self.spec().line_width * scale;
        let map = |p: Point| Point::new((p.x + half) * scale, (p.y + half) * scale);

        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{size:.0}" height="{size:.0}" viewBox="0 0 {size:.3} {size:.3}">"#
        );
        svg.push_str("\n<rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n");
        svg.push_str(&format!(
            r#"<g fill="none" stroke="black" stroke-width="{width:.3}" stroke-linecap="butt">"#
        ));

        let mut d = String::new();
        for path in self.paths()?.iter().flatten().filter(|p| p.set) {
            let start = map(path.segment.start());
            let end = map(path.segment.end());
            d.push_str(&format!("M{:.3} {:.3}", start.x, start.y));
            match path.segment {
                Segment::Line(_) => d.push_str(&format!("L{:.3} {:.3}", end.x, end.y)),
                Segment::Arc(arc) => {
                    // Counter-clockwise on screen is the negative sweep direction in SVG
                    let r = arc.radius() * scale;
                    let large = u8::from(arc.angle() > std::f64::consts::PI);
                    d.push_str(&format!("A{r:.3} {r:.3} 0 {large} 0 {:.3} {:.3}", end.x, end.y));
                }
            }
        }
        svg.push_str(&format!("\n<path d=\"{d}\"/>"));

        let bar = self.orientation_finder();
        let (s, e) = (map(bar.start()), map(bar.end()));
        svg.push_str(&format!("\n<path d=\"M{:.3} {:.3}L{:.3} {:.3}\"/>", s.x, s.y, e.x, e.y));
        svg.push_str("\n</g>\n</svg>\n");
        Ok(svg)
    }
}
