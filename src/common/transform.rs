use std::ops::{Index, IndexMut};

use super::{
    error::{HexError, HexResult},
    geometry::Point,
};

// Perspective transform
//------------------------------------------------------------------------------

/// Homogeneous 3x3 matrix stored row major as `[a11, a12, a13, a21, a22, a23, a31, a32, a33]`.
///
/// Points are row vectors multiplied from the left, `[x', y', w] = [x, y, 1] · M`, following the
/// unit square construction in Wolberg's "Digital Image Warping".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveTransform(pub [f64; 9]);

impl Index<usize> for PerspectiveTransform {
    type Output = f64;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl IndexMut<usize> for PerspectiveTransform {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.0[index]
    }
}

impl Default for PerspectiveTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl PerspectiveTransform {
    pub const fn identity() -> Self {
        Self([1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0])
    }

    pub const fn from_scaling_factor(s: f64) -> Self {
        Self([s, 0.0, 0.0, 0.0, s, 0.0, 0.0, 0.0, 1.0])
    }

    /// Transform mapping each `src[i]` onto `dst[i]`. The points of each quad must be in cyclic
    /// order.
    pub fn from_corresponding_points(src: &[Point; 4], dst: &[Point; 4]) -> HexResult<Self> {
        let from_src = Self::from_base_to_points(src)?.invert();
        let to_dst = Self::from_base_to_points(dst)?;
        Ok(from_src.multiply(&to_dst))
    }

    // Maps the unit square (0,0), (1,0), (1,1), (0,1) onto the quad
    fn from_base_to_points(p: &[Point; 4]) -> HexResult<Self> {
        let dx3 = p[0].x - p[1].x + p[2].x - p[3].x;
        let dy3 = p[0].y - p[1].y + p[2].y - p[3].y;

        // Parallelogram, affine mapping
        if dx3.abs() < f64::EPSILON && dy3.abs() < f64::EPSILON {
            let m = Self([
                p[1].x - p[0].x,
                p[1].y - p[0].y,
                0.0,
                p[3].x - p[0].x,
                p[3].y - p[0].y,
                0.0,
                p[0].x,
                p[0].y,
                1.0,
            ]);
            if m.determinant().abs() < f64::EPSILON {
                return Err(HexError::SingularMatrix);
            }
            return Ok(m);
        }

        let dx1 = p[1].x - p[2].x;
        let dx2 = p[3].x - p[2].x;
        let dy1 = p[1].y - p[2].y;
        let dy2 = p[3].y - p[2].y;
        let den = dx1 * dy2 - dx2 * dy1;
        if den.abs() < f64::EPSILON {
            return Err(HexError::SingularMatrix);
        }

        let a13 = (dx3 * dy2 - dx2 * dy3) / den;
        let a23 = (dx1 * dy3 - dx3 * dy1) / den;
        Ok(Self([
            p[1].x - p[0].x + a13 * p[1].x,
            p[1].y - p[0].y + a13 * p[1].y,
            a13,
            p[3].x - p[0].x + a23 * p[3].x,
            p[3].y - p[0].y + a23 * p[3].y,
            a23,
            p[0].x,
            p[0].y,
            1.0,
        ]))
    }

    pub fn transform(&self, p: &Point) -> HexResult<Point> {
        let w = self[2] * p.x + self[5] * p.y + self[8];
        if w.abs() < f64::EPSILON {
            return Err(HexError::PointAtInfinity);
        }
        let x = (self[0] * p.x + self[3] * p.y + self[6]) / w;
        let y = (self[1] * p.x + self[4] * p.y + self[7]) / w;
        Ok(Point::new(x, y))
    }

    /// Adjugate of the matrix. Homogeneous coordinates ignore the determinant scale, so this acts
    /// as the inverse transform.
    pub fn invert(&self) -> Self {
        let [a11, a12, a13, a21, a22, a23, a31, a32, a33] = self.0;
        Self([
            a22 * a33 - a23 * a32,
            a13 * a32 - a12 * a33,
            a12 * a23 - a13 * a22,
            a23 * a31 - a21 * a33,
            a11 * a33 - a13 * a31,
            a13 * a21 - a11 * a23,
            a21 * a32 - a22 * a31,
            a12 * a31 - a11 * a32,
            a11 * a22 - a12 * a21,
        ])
    }

    /// Matrix product `self · other`: applies `self` first, then `other`.
    pub fn multiply(&self, other: &Self) -> Self {
        let mut res = [0.0; 9];
        for r in 0..3 {
            for c in 0..3 {
                res[r * 3 + c] = (0..3).map(|k| self[r * 3 + k] * other[k * 3 + c]).sum();
            }
        }
        Self(res)
    }

    pub fn determinant(&self) -> f64 {
        let [a11, a12, a13, a21, a22, a23, a31, a32, a33] = self.0;
        a11 * (a22 * a33 - a23 * a32) - a12 * (a21 * a33 - a23 * a31)
            + a13 * (a21 * a32 - a22 * a31)
    }
}

#[cfg(test)]
mod transform_tests {
    use test_case::test_case;

    use super::PerspectiveTransform;
    use crate::common::{error::HexError, geometry::Point};

    fn assert_close(a: Point, b: Point, tol: f64) {
        assert!(a.distance(&b) < tol, "Points differ: {a:?} {b:?}");
    }

    fn unit_square() -> [Point; 4] {
        [Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(1.0, 1.0), Point::new(0.0, 1.0)]
    }

    #[test_case([(10.0, 20.0), (110.0, 25.0), (120.0, 130.0), (5.0, 118.0)]; "perspective")]
    #[test_case([(10.0, 20.0), (110.0, 20.0), (110.0, 120.0), (10.0, 120.0)]; "square")]
    #[test_case([(0.0, 0.0), (50.0, 10.0), (70.0, 60.0), (20.0, 50.0)]; "parallelogram")]
    fn test_from_base(quad: [(f64, f64); 4]) {
        let dst = quad.map(|(x, y)| Point::new(x, y));
        let m = PerspectiveTransform::from_corresponding_points(&unit_square(), &dst).unwrap();
        for (s, d) in unit_square().iter().zip(dst.iter()) {
            assert_close(m.transform(s).unwrap(), *d, 1e-9);
        }
    }

    #[test]
    fn test_roundtrip_with_inverse() {
        let src = [
            Point::new(86.6, 150.0),
            Point::new(86.6, -150.0),
            Point::new(-86.6, -150.0),
            Point::new(-86.6, 150.0),
        ];
        let dst = [
            Point::new(410.0, 530.0),
            Point::new(395.0, 170.0),
            Point::new(190.0, 160.0),
            Point::new(200.0, 520.0),
        ];
        let m = PerspectiveTransform::from_corresponding_points(&src, &dst).unwrap();
        let inv = m.invert();
        let identity = m.multiply(&inv);
        for (s, d) in src.iter().zip(dst.iter()) {
            assert_close(m.transform(s).unwrap(), *d, 1e-6);
            assert_close(inv.transform(d).unwrap(), *s, 1e-6);
            assert_close(identity.transform(s).unwrap(), *s, 1e-6);
        }
    }

    #[test]
    fn test_multiply_order() {
        let scale = PerspectiveTransform::from_scaling_factor(2.0);
        let mut shift = PerspectiveTransform::identity();
        shift[6] = 5.0;
        shift[7] = -1.0;
        let p = Point::new(1.0, 1.0);
        // Scale first, then shift
        assert_close(scale.multiply(&shift).transform(&p).unwrap(), Point::new(7.0, 1.0), 1e-12);
        // Shift first, then scale
        assert_close(shift.multiply(&scale).transform(&p).unwrap(), Point::new(12.0, 0.0), 1e-12);
    }

    #[test_case(2.0, (3.0, -4.0), (6.0, -8.0))]
    #[test_case(0.5, (10.0, 2.0), (5.0, 1.0))]
    fn test_scaling(s: f64, p: (f64, f64), expected: (f64, f64)) {
        let m = PerspectiveTransform::from_scaling_factor(s);
        let res = m.transform(&Point::new(p.0, p.1)).unwrap();
        assert_close(res, Point::new(expected.0, expected.1), 1e-12);
    }

    #[test]
    fn test_degenerate_quad() {
        let line = [Point::new(0.0, 0.0), Point::new(1.0, 1.0), Point::new(2.0, 2.0), Point::new(3.0, 3.0)];
        assert_eq!(
            PerspectiveTransform::from_corresponding_points(&unit_square(), &line),
            Err(HexError::SingularMatrix)
        );
    }
}
