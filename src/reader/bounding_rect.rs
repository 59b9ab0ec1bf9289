use tracing::debug;

use super::{binarize::BinaryImage, utils::geometry::Pixel};
use crate::common::error::{HexError, HexResult};

// Bounding rect
//------------------------------------------------------------------------------

/// Axis aligned pixel rectangle, all bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn width(&self) -> i32 {
        self.right - self.left + 1
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top + 1
    }
}

// Ring count the quiet zone width is estimated for
const ASSUMED_RING_COUNT: f64 = 3.0;
const MIN_QUIET_LINES: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Top,
    Right,
    Bottom,
}

const SIDES: [Side; 4] = [Side::Left, Side::Top, Side::Right, Side::Bottom];

impl Side {
    fn step(self) -> i32 {
        match self {
            Side::Left | Side::Top => -1,
            Side::Right | Side::Bottom => 1,
        }
    }
}

/// Grows a rectangle from the image center until it is surrounded by a quiet zone.
///
/// The first pass pushes every side out onto the first scanline holding black. The second pass
/// pushes them further until a run of blank scanlines is seen. Sides take turns until none of them
/// moves, and a moving side makes its neighbours check again since their scanlines got longer.
pub fn locate_rect(img: &BinaryImage) -> HexResult<Rect> {
    let (w, h) = (img.w as i32, img.h as i32);
    if w < 3 || h < 3 {
        return Err(HexError::BoundingRectNotFound);
    }

    let mut rect = Rect {
        left: (w as f64 * 0.4).floor() as i32,
        top: (h as f64 * 0.4).floor() as i32,
        right: ((w as f64 * 0.6).ceil() as i32).min(w - 1),
        bottom: ((h as f64 * 0.6).ceil() as i32).min(h - 1),
    };

    extend(img, &mut rect, 1, true)?;

    let quiet = (w.min(h) as f64 * 0.4 / 2.0 / ASSUMED_RING_COUNT).max(MIN_QUIET_LINES).round();
    extend(img, &mut rect, quiet as usize, false)?;

    let res = Rect {
        left: rect.left + 1,
        top: rect.top + 1,
        right: rect.right - 1,
        bottom: rect.bottom - 1,
    };
    if res.width() < 1 || res.height() < 1 {
        return Err(HexError::BoundingRectNotFound);
    }

    debug!("Bounding rect {res:?}");
    Ok(res)
}

// Moves each side outward until `required` consecutive scanlines are white (or black when
// `invert` is set), then settles on the first line of that run
fn extend(img: &BinaryImage, rect: &mut Rect, required: usize, invert: bool) -> HexResult<()> {
    let (w, h) = (img.w as i32, img.h as i32);
    let mut pending = [true; 4];
    let mut i = 0;

    while pending.iter().any(|&p| p) {
        if pending[i] {
            let side = SIDES[i];
            let step = side.step();
            let border = match side {
                Side::Left | Side::Top => 0,
                Side::Right => w - 1,
                Side::Bottom => h - 1,
            };
            let init = position(rect, side);
            let mut pos = init;

            let mut subsequent = 0;
            while subsequent < required {
                if pos == border {
                    return Err(HexError::BoundingRectNotFound);
                }
                if is_white_line(img, rect, side, pos) ^ invert {
                    subsequent += 1;
                } else {
                    subsequent = 0;
                }
                pos += step;
            }
            pos -= required as i32 * step;
            set_position(rect, side, pos);

            if pos != init {
                pending[(i + 1) % 4] = true;
                pending[(i + 3) % 4] = true;
            }
            pending[i] = false;
        }
        i = (i + 1) % 4;
    }
    Ok(())
}

fn position(rect: &Rect, side: Side) -> i32 {
    match side {
        Side::Left => rect.left,
        Side::Top => rect.top,
        Side::Right => rect.right,
        Side::Bottom => rect.bottom,
    }
}

fn set_position(rect: &mut Rect, side: Side, pos: i32) {
    match side {
        Side::Left => rect.left = pos,
        Side::Top => rect.top = pos,
        Side::Right => rect.right = pos,
        Side::Bottom => rect.bottom = pos,
    }
}

// Scanline at `pos` for the given side, spanning the rect's current extent
fn is_white_line(img: &BinaryImage, rect: &Rect, side: Side, pos: i32) -> bool {
    match side {
        Side::Top | Side::Bottom => {
            (rect.left..=rect.right).all(|x| !img.is_black(&Pixel::new(x, pos)))
        }
        Side::Left | Side::Right => {
            (rect.top..=rect.bottom).all(|y| !img.is_black(&Pixel::new(pos, y)))
        }
    }
}
