use std::f64::consts::PI;

use tracing::{debug, warn};

use super::{
    binarize::BinaryImage,
    hexagon::BoundingHexagon,
    utils::{
        black_runs,
        geometry::{trace_line, Pixel},
        longest_run,
    },
};
use crate::common::{
    bit_array::BitArray,
    error::{HexError, HexResult},
    geometry::Point,
    metadata::Specification,
    ring::{HexagonRing, SlotAnchor},
    transform::PerspectiveTransform,
};

// Orientation
//------------------------------------------------------------------------------

// Share of the corner to center distance searched for the orientation bar
const ORIENTATION_REACH: f64 = 0.25;
// The bar's run must beat the second longest run by this factor
const ORIENTATION_RATIO: f64 = 1.5;

/// Finds the corner carrying the orientation bar and makes it corner 0.
pub fn locate_orientation(img: &BinaryImage, hex: &mut BoundingHexagon) -> HexResult<()> {
    let mut runs = [0usize; 6];
    for (run, corner) in runs.iter_mut().zip(hex.corners.iter()) {
        let end = *corner + (hex.center - *corner) * ORIENTATION_REACH;
        *run = longest_run(img, &trace_line(&Pixel::round(corner), &Pixel::round(&end)));
    }

    let mut order = [0, 1, 2, 3, 4, 5];
    order.sort_by(|&a, &b| runs[b].cmp(&runs[a]));
    let (best, second) = (runs[order[0]], runs[order[1]]);
    debug!("Orientation runs {runs:?}");

    if best == 0 || (best as f64) < ORIENTATION_RATIO * second as f64 {
        return Err(HexError::OrientationNotFound);
    }
    hex.rotate(order[0]);
    Ok(())
}

// Preliminary transform
//------------------------------------------------------------------------------

/// Maps the innermost ring's virtual corners 0, 2, 3 and 5 onto the matching detected corners.
/// The outermost ring's outer edge thus lands on the innermost ring's center line, scaled down
/// by an unknown factor that depends on the ring count.
pub fn preliminary_transform(
    spec: &Specification,
    hex: &BoundingHexagon,
) -> HexResult<PerspectiveTransform> {
    let v = HexagonRing::virtual_corners(spec.innermost_radius);
    let c = hex.corners;
    PerspectiveTransform::from_corresponding_points(
        &[v[0], v[2], v[3], v[5]],
        &[c[0], c[2], c[3], c[5]],
    )
}

/// Scales ring geometry in format units so that the outermost stroke's outer edge meets the
/// detected hexagon.
pub fn refine(
    spec: &Specification,
    preliminary: &PerspectiveTransform,
    ring_count: usize,
) -> PerspectiveTransform {
    let outer_edge = spec.ring_radius(ring_count.max(1) - 1) + spec.line_width / 2.0;
    PerspectiveTransform::from_scaling_factor(spec.innermost_radius / outer_edge)
        .multiply(preliminary)
}

// Ring count
//------------------------------------------------------------------------------

// Pixels swept inward from the edge, relative to the edge length
const FINDER_SEARCH_DEPTH: f64 = 0.01;
const MIN_FINDER_SEARCH_DEPTH: i32 = 2;
// A clockwise start farther out than this, relative to the counter-clockwise one, is no finder
const MISSING_CW_RATIO: f64 = 1.5;
// Largest relative deviation of a mark spacing from the first spacing
const MARK_SPACING_TOLERANCE: f64 = 0.2;

// Distance along a side from the outer edge's virtual corner to the end of the stroke
fn finder_edge_offset(spec: &Specification) -> f64 {
    spec.start_end_offset + spec.line_width / 2.0 * (PI / 6.0).tan()
}

/// Walks the detected edge from corner 0 toward corner `to` and returns the first pixel with
/// black just inside the edge, which is where the outermost finder pattern begins.
fn finder_start(img: &BinaryImage, hex: &BoundingHexagon, to: usize) -> Option<Pixel> {
    let (from, to) = (hex.corners[0], hex.corners[to]);
    let len = from.distance(&to);
    if len < 1.0 {
        return None;
    }
    let depth = MIN_FINDER_SEARCH_DEPTH.max((len * FINDER_SEARCH_DEPTH).round() as i32);

    let dir = (to - from) * (1.0 / len);
    let mut normal = Point::new(-dir.y, dir.x);
    if normal.dot(&(hex.center - from)) < 0.0 {
        normal = normal * -1.0;
    }

    trace_line(&Pixel::round(&from), &Pixel::round(&to)).into_iter().find(|p| {
        (0..=depth).any(|d| img.is_black(&Pixel::round(&(Point::from(*p) + normal * d as f64))))
    })
}

// Counts finder marks on a line parallel to the corner 0 diagonal, running inward through the
// middle of the finder patterns next to the edge toward `edge_to`
fn count_marks(
    img: &BinaryImage,
    spec: &Specification,
    transform: &PerspectiveTransform,
    inverse: &PerspectiveTransform,
    scale: f64,
    edge_to: Point,
) -> HexResult<usize> {
    let v0 = HexagonRing::virtual_corners(spec.innermost_radius)[0];
    let edge = (edge_to - v0).normalize();
    let offset = spec.start_end_offset
        + spec.finder_len as f64 * spec.slot_length / 2.0
        + spec.line_width / 2.0 * (PI / 6.0).tan();
    let start = v0 + edge * (scale * offset);
    let end = start - v0;

    let from = Pixel::round(&transform.transform(&start)?);
    let to = Pixel::round(&transform.transform(&end)?);
    let line = trace_line(&from, &to);

    let mut centers = Vec::new();
    for (s, e) in black_runs(img, &line) {
        let mid = inverse.transform(&Point::from(line[(s + e) / 2]))?;
        centers.push(mid.distance(&start));
    }

    let mut count = centers.len().min(1);
    let mut first = None;
    for w in centers.windows(2) {
        let spacing = w[1] - w[0];
        match first {
            None => first = Some(spacing),
            Some(f) if (spacing - f).abs() > MARK_SPACING_TOLERANCE * f => break,
            Some(_) => {}
        }
        count += 1;
    }
    Ok(count)
}

/// Number of rings, read off the finder patterns next to the seam.
///
/// The clockwise finder of the innermost ring is blank, so the clockwise side shows one mark
/// less than there are rings.
pub fn count_rings(
    img: &BinaryImage,
    spec: &Specification,
    hex: &BoundingHexagon,
    preliminary: &PerspectiveTransform,
) -> HexResult<usize> {
    let inverse = preliminary.invert();
    let v = HexagonRing::virtual_corners(spec.innermost_radius);

    let ccw_start = finder_start(img, hex, 1).ok_or(HexError::FinderPatternNotFound)?;
    let ccw_dist = inverse.transform(&Point::from(ccw_start))?.distance(&v[0]);
    if ccw_dist < f64::EPSILON {
        return Err(HexError::FinderPatternNotFound);
    }

    let cw_dist = match finder_start(img, hex, 5) {
        Some(p) => Some(inverse.transform(&Point::from(p))?.distance(&v[0])),
        None => None,
    };
    debug!("Finder starts at {ccw_dist:.2} (ccw) and {cw_dist:?} (cw)");
    if cw_dist.map_or(true, |d| d > MISSING_CW_RATIO * ccw_dist) {
        return Ok(1);
    }

    let scale = ccw_dist / finder_edge_offset(spec);
    let ccw = count_marks(img, spec, preliminary, &inverse, scale, v[1])?;
    let cw = count_marks(img, spec, preliminary, &inverse, scale, v[5])?;
    if ccw != cw + 1 {
        warn!("Finder mark counts disagree: {ccw} counter-clockwise, {cw} clockwise");
    }
    Ok(ccw.min(cw) + 1)
}

// Sampling
//------------------------------------------------------------------------------

fn is_dark_around(img: &BinaryImage, p: &Pixel) -> bool {
    (-1..=1).any(|dy| (-1..=1).any(|dx| img.is_black(&p.offset(dx, dy))))
}

/// Samples every slot of `rings` through `transform`. Data slots fill the returned bitstream,
/// which is sliced across the rings as views in ring order.
pub fn sample(
    img: &BinaryImage,
    rings: &mut [HexagonRing],
    transform: &PerspectiveTransform,
) -> HexResult<BitArray> {
    let capacity = rings.iter().map(|r| r.bit_count()).sum();
    let mut bits = BitArray::new(capacity);

    let mut offset = 0;
    let mut mismatches = 0;
    for ring in rings.iter_mut() {
        for slot in 0..ring.slot_count() {
            let center = ring.slot_location(slot, SlotAnchor::Center)?;
            let set = is_dark_around(img, &Pixel::round(&transform.transform(&center)?));
            if ring.is_finder_slot(slot) {
                if set != ring.is_slot_set(slot)? {
                    mismatches += 1;
                }
            } else {
                bits.set_value(offset + slot - ring.finder_ccw().len, set)?;
            }
        }
        ring.assign_bits(bits.view(offset, ring.bit_count())?)?;
        offset += ring.bit_count();
    }

    if mismatches > 0 {
        warn!("{mismatches} finder slots differ from the expected pattern");
    }
    Ok(bits)
}
