use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::path::Path;

use image::{GrayImage, Luma};
use imageproc::geometric_transformations::{rotate_about_center, warp, Interpolation, Projection};

pub fn is_image_file(entry: &walkdir::DirEntry) -> bool {
    entry.file_type().is_file()
        && entry
            .path()
            .extension()
            .map(|e| matches!(e.to_str(), Some("png" | "jpg" | "jpeg" | "bmp")))
            .unwrap_or(false)
}

pub fn get_parent(path: &Path) -> String {
    path.parent().and_then(|p| p.file_name()).and_then(|s| s.to_str()).unwrap().to_string()
}

// Expected payload is stored verbatim next to the image, one trailing newline is ignored
pub fn parse_expected_payload(path: &Path) -> Vec<u8> {
    let mut payload = std::fs::read(path).unwrap();
    if payload.last() == Some(&b'\n') {
        payload.pop();
    }
    payload
}

pub fn median(runtimes: &mut [u128]) -> u128 {
    if runtimes.is_empty() {
        return 0;
    }
    runtimes.sort_unstable();
    let mid = runtimes.len() / 2;
    if runtimes.len() % 2 == 1 {
        runtimes[mid]
    } else {
        (runtimes[mid - 1] + runtimes[mid]) / 2
    }
}

// Distortions
//------------------------------------------------------------------------------

// Pads the image so rotations and warps keep the glyph and its quiet zone inside
pub fn pad(img: &GrayImage, margin: u32) -> GrayImage {
    let (w, h) = img.dimensions();
    let mut res = GrayImage::from_pixel(w + 2 * margin, h + 2 * margin, Luma([255]));
    image::imageops::replace(&mut res, img, margin as i64, margin as i64);
    res
}

pub fn rotate(img: &GrayImage, degrees: f32) -> GrayImage {
    let margin = img.width().max(img.height()) / 4;
    let padded = pad(img, margin);
    rotate_about_center(&padded, degrees.to_radians(), Interpolation::Bilinear, Luma([255]))
}

// Pulls the top edge inward by `amount` of the width, as seen when tilting the code away
pub fn tilt(img: &GrayImage, amount: f32) -> GrayImage {
    let margin = img.width().max(img.height()) / 8;
    let padded = pad(img, margin);
    let (w, h) = (padded.width() as f32, padded.height() as f32);
    let inset = w * amount;
    let from = [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)];
    let to = [(inset, 0.0), (w - inset, 0.0), (w, h), (0.0, h)];
    let projection = Projection::from_control_points(from, to).unwrap();
    warp(&padded, &projection, Interpolation::Bilinear, Luma([255]))
}

// Darkens the image towards its right edge by up to `depth` levels
pub fn shade(img: &GrayImage, depth: u8) -> GrayImage {
    let w = img.width() as f32;
    let mut res = img.clone();
    for (x, _, p) in res.enumerate_pixels_mut() {
        let offset = (depth as f32 * x as f32 / w) as u8;
        p.0[0] = p.0[0].saturating_sub(offset);
    }
    res
}

pub fn print_table<N>(result: &HashMap<String, HashMap<String, N>>, rows: &[&str], columns: &[&str])
where
    N: Display + Debug + Default,
{
    let cell_w = 15;
    let df = N::default();
    let divider = "-".repeat(columns.len() * (cell_w + 2) + 1);

    println!("{divider}");
    let mut header = String::from("| ");
    for c in columns {
        header.push_str(&format!("{c:<cell_w$}| "));
    }
    println!("{header}");
    println!("{divider}");

    for hr in rows {
        let r = result.get(&hr.to_string()).unwrap();
        let mut row = format!("| {hr:<cell_w$}| ");

        for c in columns.iter().skip(1) {
            let cell = r.get(&c.to_string()).unwrap_or(&df);
            row.push_str(&format!("{:<cell_w$.2}| ", cell));
        }

        println!("{row}");
    }

    println!("{divider}");
}

#[allow(dead_code)]
fn main() {}
