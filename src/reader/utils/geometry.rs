use std::marker::PhantomData;

use crate::common::geometry::Point;

// Pixel
//------------------------------------------------------------------------------

/// Integer image coordinate.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub struct Pixel {
    pub x: i32,
    pub y: i32,
}

impl Pixel {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Nearest pixel to `p`.
    pub fn round(p: &Point) -> Self {
        let x = p.x.round().clamp(i32::MIN as f64, i32::MAX as f64) as i32;
        let y = p.y.round().clamp(i32::MIN as f64, i32::MAX as f64) as i32;
        Self { x, y }
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self { x: self.x.saturating_add(dx), y: self.y.saturating_add(dy) }
    }
}

impl From<Pixel> for Point {
    fn from(p: Pixel) -> Self {
        Point::new(p.x as f64, p.y as f64)
    }
}

// Slope
//------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub struct Slope {
    pub dx: i32,
    pub dy: i32,
}

// Bresenham line scan algorithm
//------------------------------------------------------------------------------

pub trait Axis {}

/// Lines whose x delta dominates.
pub struct X;
impl Axis for X {}

/// Lines whose y delta dominates.
pub struct Y;
impl Axis for Y {}

/// Pixels from `from` to `to`, both ends included. Stepping happens along the major axis `A`.
#[derive(Debug, Clone)]
pub struct BresenhamLine<A: Axis> {
    cur: Pixel,
    m: Slope,
    inc: (i32, i32), // (xi, yi) unit increment
    err: i32,
    remaining: u32,
    phantom: PhantomData<A>,
}

impl<A: Axis> BresenhamLine<A> {
    pub fn new(from: &Pixel, to: &Pixel) -> Self {
        let cur = *from;

        // Computing slope
        let dx = (to.x - from.x).abs();
        let dy = (to.y - from.y).abs();
        let m = Slope { dx: 2 * dx, dy: 2 * dy };

        // Computing increment
        let xi = if to.x > from.x { 1 } else { -1 };
        let yi = if to.y > from.y { 1 } else { -1 };
        let inc = (xi, yi);

        // Computing error
        let err = if dy < dx { 2 * dy - dx } else { 2 * dx - dy };

        let remaining = dx.max(dy) as u32 + 1;

        Self { cur, m, inc, err, remaining, phantom: PhantomData }
    }
}

impl Iterator for BresenhamLine<X> {
    type Item = Pixel;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let res = Some(self.cur);

        if self.err > 0 {
            self.cur.y += self.inc.1;
            self.err -= self.m.dx;
        }
        self.err += self.m.dy;
        self.cur.x += self.inc.0;

        res
    }
}

impl Iterator for BresenhamLine<Y> {
    type Item = Pixel;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let res = Some(self.cur);

        if self.err > 0 {
            self.cur.x += self.inc.0;
            self.err -= self.m.dy;
        }
        self.err += self.m.dx;
        self.cur.y += self.inc.1;

        res
    }
}

/// Collects the pixels of the line between `from` and `to`, picking the major axis.
pub fn trace_line(from: &Pixel, to: &Pixel) -> Vec<Pixel> {
    let dx = (to.x - from.x).abs();
    let dy = (to.y - from.y).abs();
    if dx >= dy {
        BresenhamLine::<X>::new(from, to).collect()
    } else {
        BresenhamLine::<Y>::new(from, to).collect()
    }
}
