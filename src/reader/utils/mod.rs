use geometry::Pixel;

use super::binarize::BinaryImage;

pub mod geometry;

// Runs of black pixels along a traced line. Used to find the orientation bar, which is the
// longest run from a corner, and the finder marks, which are evenly spaced runs.
//------------------------------------------------------------------------------

/// Inclusive index ranges of the black runs in `line`.
pub fn black_runs(img: &BinaryImage, line: &[Pixel]) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut cur: Option<(usize, usize)> = None;
    for (i, p) in line.iter().enumerate() {
        if img.is_black(p) {
            let start = cur.map_or(i, |(s, _)| s);
            cur = Some((start, i));
        } else if let Some(run) = cur.take() {
            runs.push(run);
        }
    }
    runs.extend(cur);
    runs
}

/// Length of the longest black run in `line`.
pub fn longest_run(img: &BinaryImage, line: &[Pixel]) -> usize {
    black_runs(img, line).iter().map(|&(s, e)| e - s + 1).max().unwrap_or(0)
}
