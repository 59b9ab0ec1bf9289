use std::borrow::Cow;

use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};

use super::utils::geometry::Pixel;

// Color
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum Color {
    Black,
    #[default]
    White,
}

// Luminance conversion for the supported input images
//------------------------------------------------------------------------------

pub trait Luminance {
    fn luminance(&self) -> Cow<'_, GrayImage>;
}

#[inline]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((77 * r as u32 + 150 * g as u32 + 29 * b as u32 + 128) >> 8) as u8
}

impl Luminance for GrayImage {
    fn luminance(&self) -> Cow<'_, GrayImage> {
        Cow::Borrowed(self)
    }
}

impl Luminance for RgbImage {
    fn luminance(&self) -> Cow<'_, GrayImage> {
        let (w, h) = self.dimensions();
        Cow::Owned(GrayImage::from_fn(w, h, |x, y| {
            let Rgb([r, g, b]) = *self.get_pixel(x, y);
            Luma([luma(r, g, b)])
        }))
    }
}

impl Luminance for RgbaImage {
    fn luminance(&self) -> Cow<'_, GrayImage> {
        let (w, h) = self.dimensions();
        Cow::Owned(GrayImage::from_fn(w, h, |x, y| {
            let Rgba([r, g, b, _]) = *self.get_pixel(x, y);
            Luma([luma(r, g, b)])
        }))
    }
}

impl Luminance for DynamicImage {
    fn luminance(&self) -> Cow<'_, GrayImage> {
        match self {
            DynamicImage::ImageLuma8(img) => Cow::Borrowed(img),
            DynamicImage::ImageRgb8(img) => img.luminance(),
            img => Cow::Owned(img.to_rgba8().luminance().into_owned()),
        }
    }
}

/// Luminance negative, for light codes printed on dark ground.
pub fn invert(img: &GrayImage) -> GrayImage {
    let mut res = img.clone();
    res.pixels_mut().for_each(|p| p.0[0] = 255 - p.0[0]);
    res
}

// Binarizer
// Steps:
// 1. Divides image into tiles of 8x8 pixels. Partial tiles on the right and bottom edges are
//    shifted inward so that they still span 8 pixels, which means a few pixels are measured twice
// 2. Finds min and max luma of each tile. Tiles with some contrast take the midpoint as threshold.
//    Flat tiles take half their min at the top/left border, otherwise the average threshold of
//    the left, top and top-left tiles if it lies above the tile's min
// 3. Tiles at least 2 tiles away from every border take the average threshold of the 5x5 tiles
//    around them. The average reads the thresholds from step 2 only
// 4. Pixels above their tile's threshold are white, all others black
//------------------------------------------------------------------------------

const TILE_SIZE: u32 = 8;
const MIN_DYNAMIC_RANGE: u8 = 6;

/// Black and white image with the tile thresholds it was derived from. The buffers are kept
/// between calls so that a reader can reuse them frame after frame.
#[derive(Debug, Clone, Default)]
pub struct BinaryImage {
    buffer: Vec<Color>,
    raw: Vec<u8>,
    thresholds: Vec<u8>,
    tiles_w: u32,
    tiles_h: u32,
    pub w: u32,
    pub h: u32,
}

impl BinaryImage {
    pub fn prepare(img: &GrayImage) -> Self {
        let mut res = Self::default();
        res.binarize(img);
        res
    }

    /// Rebinarizes into the existing buffers.
    pub fn binarize(&mut self, img: &GrayImage) {
        let (w, h) = img.dimensions();
        self.w = w;
        self.h = h;
        self.tiles_w = w.div_ceil(TILE_SIZE);
        self.tiles_h = h.div_ceil(TILE_SIZE);

        self.calculate_raw_thresholds(img);
        self.smooth_thresholds();

        self.buffer.clear();
        self.buffer.reserve((w * h) as usize);
        for y in 0..h {
            let ty = (y / TILE_SIZE).min(self.tiles_h.saturating_sub(1));
            for x in 0..w {
                let tx = (x / TILE_SIZE).min(self.tiles_w.saturating_sub(1));
                let thresh = self.thresholds[(ty * self.tiles_w + tx) as usize];
                let color = if img.get_pixel(x, y)[0] > thresh { Color::White } else { Color::Black };
                self.buffer.push(color);
            }
        }
    }

    fn calculate_raw_thresholds(&mut self, img: &GrayImage) {
        let (w, h) = img.dimensions();
        let tw = self.tiles_w as usize;
        self.raw.clear();
        self.raw.resize(tw * self.tiles_h as usize, 0);

        for ty in 0..self.tiles_h {
            let y0 = tile_origin(ty, h);
            let y1 = (y0 + TILE_SIZE).min(h);
            for tx in 0..self.tiles_w {
                let x0 = tile_origin(tx, w);
                let x1 = (x0 + TILE_SIZE).min(w);

                let (mut mn, mut mx) = (u8::MAX, u8::MIN);
                for y in y0..y1 {
                    for x in x0..x1 {
                        let p = img.get_pixel(x, y)[0];
                        mn = mn.min(p);
                        mx = mx.max(p);
                    }
                }

                let (tx, ty) = (tx as usize, ty as usize);
                let thresh = if mx - mn >= MIN_DYNAMIC_RANGE {
                    ((mn as u16 + mx as u16) / 2) as u8
                } else if tx == 0 || ty == 0 {
                    mn / 2
                } else {
                    let left = self.raw[ty * tw + tx - 1] as u16;
                    let top = self.raw[(ty - 1) * tw + tx] as u16;
                    let top_left = self.raw[(ty - 1) * tw + tx - 1] as u16;
                    let avg = ((left + top + top_left) / 3) as u8;
                    if avg > mn {
                        avg
                    } else {
                        mn / 2
                    }
                };
                self.raw[ty * tw + tx] = thresh;
            }
        }
    }

    fn smooth_thresholds(&mut self) {
        let (tw, th) = (self.tiles_w as usize, self.tiles_h as usize);
        self.thresholds.clear();
        self.thresholds.extend_from_slice(&self.raw);

        for ty in 2..th.saturating_sub(2) {
            for tx in 2..tw.saturating_sub(2) {
                let mut sum = 0usize;
                for ny in ty - 2..=ty + 2 {
                    let ni = ny * tw + tx;
                    sum += self.raw[ni - 2..=ni + 2].iter().map(|&t| t as usize).sum::<usize>();
                }
                self.thresholds[ty * tw + tx] = (sum / 25) as u8;
            }
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.w, self.h)
    }

    /// Threshold applied to the pixels of tile (`tx`, `ty`).
    pub fn threshold(&self, tx: u32, ty: u32) -> Option<u8> {
        if tx >= self.tiles_w || ty >= self.tiles_h {
            return None;
        }
        Some(self.thresholds[(ty * self.tiles_w + tx) as usize])
    }

    pub fn get(&self, x: i32, y: i32) -> Option<Color> {
        let idx = self.coord_to_index(x, y)?;
        Some(self.buffer[idx])
    }

    pub fn get_at_pixel(&self, p: &Pixel) -> Option<Color> {
        self.get(p.x, p.y)
    }

    /// Pixels outside the image count as white.
    pub fn is_black(&self, p: &Pixel) -> bool {
        self.get_at_pixel(p) == Some(Color::Black)
    }

    fn coord_to_index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.w || y as u32 >= self.h {
            return None;
        }
        Some(y as usize * self.w as usize + x as usize)
    }

    #[cfg(test)]
    pub fn to_image(&self) -> GrayImage {
        GrayImage::from_fn(self.w, self.h, |x, y| match self.buffer[(y * self.w + x) as usize] {
            Color::Black => Luma([0]),
            Color::White => Luma([255]),
        })
    }
}

// First pixel of tile `t` along an axis of `size` pixels
fn tile_origin(t: u32, size: u32) -> u32 {
    let origin = t * TILE_SIZE;
    if origin + TILE_SIZE > size {
        size.saturating_sub(TILE_SIZE)
    } else {
        origin
    }
}
