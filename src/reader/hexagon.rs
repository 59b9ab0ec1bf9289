use tracing::debug;

use super::{binarize::BinaryImage, bounding_rect::Rect, utils::geometry::Pixel};
use crate::common::{
    error::{HexError, HexResult},
    geometry::{Line, Point},
};

// Convex hull
//------------------------------------------------------------------------------

/// Collects the topmost and bottommost black pixel of every column in `rect`. Top pixels are
/// pushed right to left, followed by the bottom pixels left to right, so the outline runs
/// counter-clockwise as seen on screen.
pub fn hull_candidates(img: &BinaryImage, rect: &Rect, out: &mut Vec<Pixel>) {
    out.clear();
    let mut bottoms = Vec::with_capacity(rect.width().max(0) as usize);

    for x in (rect.left..=rect.right).rev() {
        let Some(top) = (rect.top..=rect.bottom).find(|&y| img.is_black(&Pixel::new(x, y))) else {
            continue;
        };
        let bottom = (top..=rect.bottom).rev().find(|&y| img.is_black(&Pixel::new(x, y)));
        out.push(Pixel::new(x, top));
        bottoms.push(Pixel::new(x, bottom.unwrap_or(top)));
    }

    out.extend(bottoms.into_iter().rev());
}

// z component of BA x BC
fn cross(a: &Pixel, b: &Pixel, c: &Pixel) -> i64 {
    let (bax, bay) = ((a.x - b.x) as i64, (a.y - b.y) as i64);
    let (bcx, bcy) = ((c.x - b.x) as i64, (c.y - b.y) as i64);
    bax * bcy - bay * bcx
}

/// Convex hull of an outline traced by [`hull_candidates`], in one stack pass.
pub fn convex_hull(candidates: &[Pixel], hull: &mut Vec<Pixel>) -> HexResult<()> {
    hull.clear();
    for p in candidates {
        while hull.len() > 1 && cross(&hull[hull.len() - 2], &hull[hull.len() - 1], p) <= 0 {
            hull.pop();
        }
        hull.push(*p);
    }

    if hull.len() > 1 && hull.first() == hull.last() {
        hull.pop();
    }
    if hull.len() < 3 {
        return Err(HexError::ConvexHullNotFound);
    }
    Ok(())
}

// Longest sides
//------------------------------------------------------------------------------

// Hull vertices turning by less than this are merged into one side
const MAX_COLLINEAR_SIN: f64 = 0.015_707_317_311_820_675; // sin(0.005π)

fn normalized_cross(a: &Pixel, b: &Pixel, c: &Pixel) -> f64 {
    let ba = Point::from(*a) - Point::from(*b);
    let bc = Point::from(*c) - Point::from(*b);
    let den = ba.norm() * bc.norm();
    if den == 0.0 {
        return 0.0;
    }
    ba.cross(&bc) / den
}

/// Merges near collinear hull edges into sides and returns the `N` longest in hull order.
pub fn longest_sides<const N: usize>(hull: &[Pixel]) -> HexResult<[Line; N]> {
    let n = hull.len();
    if n < 3 {
        return Err(HexError::LongestSidesNotFound);
    }
    let at = |i: usize| &hull[i % n];

    // Start on a genuine corner so no side is split across the wrap around
    let start = (1..=n)
        .find(|&i| normalized_cross(at(i - 1), at(i), at(i + 1)) >= MAX_COLLINEAR_SIN)
        .ok_or(HexError::LongestSidesNotFound)?
        % n;

    // (length, start index, end index), end unwrapped past n so that sorting by start restores
    // hull order
    let mut sides: Vec<(f64, usize, usize)> = Vec::with_capacity(N + 1);
    let mut side_start = start;
    let mut prev = start;
    let mut idx = (start + 1) % n;
    for _ in 0..n {
        let next = (idx + 1) % n;
        if normalized_cross(&hull[prev], &hull[idx], &hull[next]) >= MAX_COLLINEAR_SIN {
            let len = Point::from(hull[side_start]).distance(&Point::from(hull[idx]));
            let end = if idx >= side_start { idx } else { idx + n };

            let pos = sides.iter().position(|s| s.0 < len).unwrap_or(sides.len());
            sides.insert(pos, (len, side_start, end));
            sides.truncate(N);

            side_start = idx;
        }
        prev = idx;
        idx = next;
    }

    if sides.len() < N {
        return Err(HexError::LongestSidesNotFound);
    }
    sides.sort_by_key(|s| s.1);

    let mut res = [Line::new(Point::default(), Point::default()); N];
    for (line, &(_, s, e)) in res.iter_mut().zip(sides.iter()) {
        *line = Line::new(Point::from(hull[s]), Point::from(hull[e % n]));
    }
    Ok(res)
}

// Bounding hexagon
//------------------------------------------------------------------------------

// Largest deviation of a side from the average side length
const SIDE_TOLERANCE: f64 = 0.25;

/// Outer corners of the outermost ring in image space, counter-clockwise as seen on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingHexagon {
    pub corners: [Point; 6],
    pub center: Point,
}

impl BoundingHexagon {
    /// Builds the hexagon whose corner `i` joins `sides[i]` and `sides[i + 1]`.
    pub fn from_sides(sides: &[Line; 6]) -> HexResult<Self> {
        let mut corners = [Point::default(); 6];
        for (i, c) in corners.iter_mut().enumerate() {
            *c = sides[i].intersection(&sides[(i + 1) % 6]).ok_or(HexError::ParallelLines)?;
        }

        let lens: Vec<f64> = (0..6).map(|i| corners[i].distance(&corners[(i + 1) % 6])).collect();
        let avg = lens.iter().sum::<f64>() / 6.0;
        if lens.iter().any(|l| (l - avg).abs() > avg * SIDE_TOLERANCE) {
            debug!("Irregular hexagon, side lengths {lens:?}");
            return Err(HexError::IrregularHexagon);
        }

        // Mean of the crossings of the three pairs of long diagonals
        let mut center = Point::default();
        for i in 0..3 {
            let d1 = Line::new(corners[i], corners[i + 3]);
            let d2 = Line::new(corners[i + 1], corners[(i + 4) % 6]);
            center = center + d1.intersection(&d2).ok_or(HexError::ParallelLines)? * (1.0 / 3.0);
        }

        Ok(Self { corners, center })
    }

    /// Rotates the corner list so that corner `index` comes first.
    pub fn rotate(&mut self, index: usize) {
        self.corners.rotate_left(index % 6);
    }

    pub fn side_length(&self, index: usize) -> f64 {
        self.corners[index % 6].distance(&self.corners[(index + 1) % 6])
    }
}

/// Runs candidate collection, hull and side fitting on the area inside `rect`.
pub fn locate_hexagon(
    img: &BinaryImage,
    rect: &Rect,
    candidates: &mut Vec<Pixel>,
    hull: &mut Vec<Pixel>,
) -> HexResult<BoundingHexagon> {
    hull_candidates(img, rect, candidates);
    convex_hull(candidates, hull)?;
    let sides = longest_sides::<6>(hull)?;
    let hex = BoundingHexagon::from_sides(&sides)?;
    debug!("Bounding hexagon {:?}, center {:?}", hex.corners, hex.center);
    Ok(hex)
}

#[cfg(test)]
mod hexagon_tests {
    use std::f64::consts::PI;

    use geo::{Area, ConvexHull, MultiPoint};
    use image::{GrayImage, Luma};
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::{
        convex_hull, hull_candidates, locate_hexagon, longest_sides, BoundingHexagon,
        MAX_COLLINEAR_SIN,
    };
    use crate::{
        common::{
            error::HexError,
            geometry::{Line, Point},
        },
        reader::{binarize::BinaryImage, bounding_rect::locate_rect, utils::geometry::Pixel},
    };

    // Corners of a flat topped hexagon, counter-clockwise on screen from the lower right
    fn hexagon_corners(center: Point, radius: f64, rotation: f64) -> [Point; 6] {
        let mut res = [Point::default(); 6];
        for (i, c) in res.iter_mut().enumerate() {
            let a = rotation - PI / 3.0 + i as f64 * PI / 3.0;
            *c = Point::new(center.x + radius * a.cos(), center.y - radius * a.sin());
        }
        res
    }

    fn inside(p: &Point, corners: &[Point; 6]) -> bool {
        (0..6).all(|i| {
            let (a, b) = (corners[i], corners[(i + 1) % 6]);
            (b - a).cross(&(*p - a)) <= 0.0
        })
    }

    // Filled hexagon whose corners are jittered by up to `jitter` pixels
    fn jittered_hexagon(seed: u64, jitter: f64) -> ([Point; 6], BinaryImage) {
        let mut rng = StdRng::seed_from_u64(seed);
        let rotation = rng.random_range(0.0..PI / 3.0);
        let mut corners = hexagon_corners(Point::new(150.0, 140.0), 90.0, rotation);
        for c in corners.iter_mut() {
            *c = *c + Point::new(rng.random_range(-jitter..jitter), rng.random_range(-jitter..jitter));
        }
        let img = GrayImage::from_fn(300, 280, |x, y| {
            if inside(&Point::new(x as f64, y as f64), &corners) {
                Luma([20])
            } else {
                Luma([235])
            }
        });
        (corners, BinaryImage::prepare(&img))
    }

    #[test]
    fn test_max_collinear_sin() {
        assert!((MAX_COLLINEAR_SIN - (0.005 * PI).sin()).abs() < 1e-15);
    }

    #[test]
    fn test_convex_hull_square() {
        let pts = [(4, 0), (2, 1), (0, 0), (0, 3), (1, 4), (2, 4), (4, 4), (4, 0)];
        let pts = pts.iter().map(|&(x, y)| Pixel::new(x, y)).collect::<Vec<_>>();
        let mut hull = Vec::new();
        convex_hull(&pts, &mut hull).unwrap();
        let expected = [(4, 0), (0, 0), (0, 3), (1, 4), (4, 4)];
        assert_eq!(hull, expected.iter().map(|&(x, y)| Pixel::new(x, y)).collect::<Vec<_>>());
    }

    #[test]
    fn test_convex_hull_degenerate() {
        let pts = [Pixel::new(3, 3), Pixel::new(2, 3), Pixel::new(3, 3)];
        let mut hull = Vec::new();
        assert_eq!(convex_hull(&pts, &mut hull), Err(HexError::ConvexHullNotFound));
    }

    #[test]
    fn test_convex_hull_matches_geo() {
        for seed in 0..5 {
            let (_, img) = jittered_hexagon(seed, 3.0);
            let rect = locate_rect(&img).unwrap();
            let mut candidates = Vec::new();
            let mut hull = Vec::new();
            hull_candidates(&img, &rect, &mut candidates);
            convex_hull(&candidates, &mut hull).unwrap();

            let area = |pts: &[Pixel]| {
                let n = pts.len();
                (0..n)
                    .map(|i| {
                        let (a, b) = (pts[i], pts[(i + 1) % n]);
                        (a.x as f64) * (b.y as f64) - (b.x as f64) * (a.y as f64)
                    })
                    .sum::<f64>()
                    .abs()
                    / 2.0
            };
            let mp: MultiPoint<f64> =
                candidates.iter().map(|p| (p.x as f64, p.y as f64)).collect::<Vec<_>>().into();
            let expected = mp.convex_hull().unsigned_area();
            assert!((area(&hull) - expected).abs() < 1e-6, "Hull area differs for seed {seed}");
        }
    }

    #[test]
    fn test_longest_sides_of_octagon() {
        // Square with clipped corners: 4 long sides and 4 short ones
        let pts = [(10, 0), (0, 0), (-2, 2), (-2, 12), (0, 14), (10, 14), (12, 12), (12, 2)];
        let hull = pts.iter().map(|&(x, y)| Pixel::new(x, y)).collect::<Vec<_>>();
        let sides = longest_sides::<4>(&hull).unwrap();
        let lens = sides.iter().map(|s| s.length()).collect::<Vec<_>>();
        assert_eq!(lens, vec![10.0, 10.0, 10.0, 10.0]);
        assert_eq!(sides[0].start(), Point::new(10.0, 0.0));
        assert_eq!(longest_sides::<6>(&hull[..5]), Err(HexError::LongestSidesNotFound));
    }

    #[test]
    fn test_locate_jittered_hexagon() {
        for seed in 0..8 {
            let (corners, img) = jittered_hexagon(seed, 2.0);
            let rect = locate_rect(&img).unwrap();
            let hex = locate_hexagon(&img, &rect, &mut Vec::new(), &mut Vec::new()).unwrap();

            // Same cyclic order, shifted by an unknown amount
            let shift = (0..6).min_by(|&a, &b| {
                let da = hex.corners[a].distance(&corners[0]);
                let db = hex.corners[b].distance(&corners[0]);
                da.total_cmp(&db)
            });
            let shift = shift.unwrap();
            for (i, c) in corners.iter().enumerate() {
                let found = hex.corners[(i + shift) % 6];
                assert!(found.distance(c) < 3.0, "Corner {i} off: {found:?} vs {c:?}");
            }

            let avg = (0..6).map(|i| hex.side_length(i)).sum::<f64>() / 6.0;
            assert!((0..6).all(|i| (hex.side_length(i) - avg).abs() <= avg * 0.25));
            assert!(hex.center.distance(&Point::new(150.0, 140.0)) < 3.0);
        }
    }

    #[test]
    fn test_irregular_hexagon() {
        let c = [(0.0, 0.0), (10.0, 0.0), (20.0, 10.0), (20.0, 60.0), (10.0, 70.0), (0.0, 70.0)];
        let sides: [Line; 6] = std::array::from_fn(|i| {
            let (a, b) = (c[i], c[(i + 1) % 6]);
            Line::new(Point::new(a.0, a.1), Point::new(b.0, b.1))
        });
        assert_eq!(BoundingHexagon::from_sides(&sides), Err(HexError::IrregularHexagon));
    }

    #[test]
    fn test_parallel_sides() {
        let l = Line::new(Point::new(0.0, 0.0), Point::new(1.0, 0.0));
        let sides = [l; 6];
        assert_eq!(BoundingHexagon::from_sides(&sides), Err(HexError::ParallelLines));
    }

    #[test]
    fn test_rotate() {
        let mut hex = BoundingHexagon {
            corners: std::array::from_fn(|i| Point::new(i as f64, 0.0)),
            center: Point::default(),
        };
        hex.rotate(4);
        assert_eq!(hex.corners[0], Point::new(4.0, 0.0));
        assert_eq!(hex.corners[2], Point::new(0.0, 0.0));
    }
}
