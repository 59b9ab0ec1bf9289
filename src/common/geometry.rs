use std::{
    f64::consts::PI,
    ops::{Add, Mul, Sub},
};

use super::error::{HexError, HexResult};

/// Slack for floating point accumulation when positions are compared against lengths.
pub const EPSILON: f64 = 1e-10;

// Point
//------------------------------------------------------------------------------

/// Point in a plane whose vertical axis grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        (*other - *self).norm()
    }

    pub fn norm(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn dot(&self, other: &Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn cross(&self, other: &Point) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn normalize(&self) -> Point {
        let n = self.norm();
        Point::new(self.x / n, self.y / n)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

// Resolves a signed arclength against a segment of given length. Negative positions count back
// from the end.
fn resolve_position(position: f64, length: f64) -> HexResult<f64> {
    if !position.is_finite() || position.abs() - EPSILON > length {
        return Err(HexError::PositionOutOfRange);
    }
    Ok(if position < 0.0 { position + length } else { position })
}

// Line
//------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    start: Point,
    end: Point,
    length: f64,
}

impl Line {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end, length: start.distance(&end) }
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn end(&self) -> Point {
        self.end
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    /// Point at signed arclength `position`; negative values are measured from the end.
    pub fn position_to_point(&self, position: f64) -> HexResult<Point> {
        let position = resolve_position(position, self.length)?;
        if self.length == 0.0 {
            return Ok(self.start);
        }
        let t = position / self.length;
        Ok(self.start + (self.end - self.start) * t)
    }

    /// Trims `start_offset` from the start and `end_offset` from the end.
    pub fn sub_line(&self, start_offset: f64, end_offset: f64) -> HexResult<Line> {
        Ok(Line::new(self.position_to_point(start_offset)?, self.position_to_point(-end_offset)?))
    }

    /// Intersection of the infinite lines through both segments, `None` if they are parallel.
    pub fn intersection(&self, other: &Line) -> Option<Point> {
        let d1 = self.start - self.end;
        let d2 = other.start - other.end;
        let den = d1.cross(&d2);
        if den.abs() < EPSILON {
            return None;
        }
        let f1 = self.start.cross(&self.end);
        let f2 = other.start.cross(&other.end);
        Some(Point::new((f1 * d2.x - f2 * d1.x) / den, (f1 * d2.y - f2 * d1.y) / den))
    }
}

// Arc
//------------------------------------------------------------------------------

/// Circular arc. Angles grow counter-clockwise as seen on screen, i.e. with the y axis pointing
/// down a positive angle moves upward from the positive x axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arc {
    center: Point,
    radius: f64,
    start_angle: f64,
    angle: f64,
    length: f64,
}

impl Arc {
    pub fn new(center: Point, radius: f64, start_angle: f64, angle: f64) -> Self {
        Self { center, radius, start_angle, angle, length: angle * radius }
    }

    /// Arc running counter-clockwise from `start` to `end`, both on the circle.
    pub fn from_points(center: Point, radius: f64, start: Point, end: Point) -> Self {
        let start_angle = absolute_angle(&center, &start);
        let mut angle = absolute_angle(&center, &end) - start_angle;
        if angle < 0.0 {
            angle += 2.0 * PI;
        }
        if angle >= 2.0 * PI {
            angle -= 2.0 * PI;
        }
        Self::new(center, radius, start_angle, angle)
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn start_angle(&self) -> f64 {
        self.start_angle
    }

    /// Angular span in radians.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn start(&self) -> Point {
        self.angle_to_point(0.0)
    }

    pub fn end(&self) -> Point {
        self.angle_to_point(self.angle)
    }

    /// Angle of `point` relative to the start angle, normalized into `[0, 2π)`.
    pub fn point_to_angle(&self, point: &Point) -> f64 {
        let mut angle = absolute_angle(&self.center, point) - self.start_angle;
        while angle < 0.0 {
            angle += 2.0 * PI;
        }
        while angle >= 2.0 * PI {
            angle -= 2.0 * PI;
        }
        angle
    }

    /// Point at `angle` radians past the start angle.
    pub fn angle_to_point(&self, angle: f64) -> Point {
        let a = self.start_angle + angle;
        Point::new(self.center.x + self.radius * a.cos(), self.center.y - self.radius * a.sin())
    }

    pub fn position_to_point(&self, position: f64) -> HexResult<Point> {
        let position = resolve_position(position, self.length)?;
        Ok(self.angle_to_point(position / self.radius))
    }

    /// Arc covering arclength `[from, to]` of this arc.
    pub fn sub_arc(&self, from: f64, to: f64) -> HexResult<Arc> {
        let from = resolve_position(from, self.length)?;
        let to = resolve_position(to, self.length)?;
        Ok(Arc::new(
            self.center,
            self.radius,
            self.start_angle + from / self.radius,
            (to - from) / self.radius,
        ))
    }
}

fn absolute_angle(center: &Point, point: &Point) -> f64 {
    // The y axis points down, so it is flipped to keep angles counter-clockwise
    (-(point.y - center.y)).atan2(point.x - center.x)
}

// Segment
//------------------------------------------------------------------------------

/// A piece of a ring perimeter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    Line(Line),
    Arc(Arc),
}

impl Segment {
    pub fn length(&self) -> f64 {
        match self {
            Segment::Line(l) => l.length(),
            Segment::Arc(a) => a.length(),
        }
    }

    pub fn position_to_point(&self, position: f64) -> HexResult<Point> {
        match self {
            Segment::Line(l) => l.position_to_point(position),
            Segment::Arc(a) => a.position_to_point(position),
        }
    }

    pub fn start(&self) -> Point {
        match self {
            Segment::Line(l) => l.start(),
            Segment::Arc(a) => a.start(),
        }
    }

    pub fn end(&self) -> Point {
        match self {
            Segment::Line(l) => l.end(),
            Segment::Arc(a) => a.end(),
        }
    }

    /// Piece of this segment between arclengths `from` and `to`.
    pub fn sub_segment(&self, from: f64, to: f64) -> HexResult<Segment> {
        match self {
            Segment::Line(l) => {
                Ok(Segment::Line(Line::new(l.position_to_point(from)?, l.position_to_point(to)?)))
            }
            Segment::Arc(a) => Ok(Segment::Arc(a.sub_arc(from, to)?)),
        }
    }

    /// Distance of `p` to the stroke center and arclength of its projection, if `p` projects
    /// onto the segment without passing its ends.
    pub fn project(&self, p: &Point) -> Option<(f64, f64)> {
        match self {
            Segment::Line(l) => {
                if l.length() == 0.0 {
                    return None;
                }
                let dir = (l.end() - l.start()) * (1.0 / l.length());
                let rel = *p - l.start();
                let along = rel.dot(&dir);
                if !(0.0..=l.length()).contains(&along) {
                    return None;
                }
                Some((rel.cross(&dir).abs(), along))
            }
            Segment::Arc(a) => {
                let angle = a.point_to_angle(p);
                if angle > a.angle() {
                    return None;
                }
                let dist = (p.distance(&a.center()) - a.radius()).abs();
                Some((dist, angle * a.radius()))
            }
        }
    }
}
