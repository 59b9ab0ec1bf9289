use std::ops::{Deref, Range};

use super::{
    bit_array::BitArray,
    error::{HexError, HexResult},
};

// Mask pattern
//------------------------------------------------------------------------------

const PATTERNS: [&[bool]; 4] = [
    &[false],
    &[true, false],
    &[true, true, false, false],
    &[true, false, false],
];

/// Periodic bit pattern XORed onto a ring's data to break up long dashes and gaps. Pattern 0
/// leaves the bits untouched.
#[derive(Debug, PartialEq, Eq, Copy, Clone, PartialOrd, Ord, Default)]
pub struct MaskPattern(u8);

impl MaskPattern {
    pub const COUNT: u8 = PATTERNS.len() as u8;

    pub fn new(pattern: u8) -> HexResult<Self> {
        if pattern >= Self::COUNT {
            return Err(HexError::ValueOutOfRange);
        }
        Ok(Self(pattern))
    }

    pub fn pattern(self) -> &'static [bool] {
        PATTERNS[self.0 as usize]
    }

    /// Whether the bit at ring-local index `index` is flipped.
    pub fn is_masked(self, index: usize) -> bool {
        let pattern = self.pattern();
        pattern[index % pattern.len()]
    }

    /// Flips the bits of `ring` (a global bit range) that lie at or after `skip_before`. Pattern
    /// phase follows the ring-local index, so masking twice restores the bits.
    pub fn apply(self, bits: &mut BitArray, ring: Range<usize>, skip_before: usize) -> HexResult<()> {
        for i in ring.start.max(skip_before)..ring.end {
            if self.is_masked(i - ring.start) {
                bits.toggle(i)?;
            }
        }
        Ok(())
    }
}

impl Deref for MaskPattern {
    type Target = u8;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Mask yielding the fewest transitions between neighbouring maskable bits of `ring`. Ties go to
/// the lower pattern id.
pub fn find_best_mask(
    bits: &BitArray,
    ring: Range<usize>,
    skip_before: usize,
) -> HexResult<MaskPattern> {
    Ok(rank_masks(bits, ring, skip_before)?[0])
}

/// All masks ordered by the transitions they leave in `ring`, fewest first.
pub fn rank_masks(
    bits: &BitArray,
    ring: Range<usize>,
    skip_before: usize,
) -> HexResult<Vec<MaskPattern>> {
    let start = ring.start.max(skip_before);
    let mut masks = (0..MaskPattern::COUNT).map(MaskPattern).collect::<Vec<_>>();
    if start >= ring.end {
        return Ok(masks);
    }

    let raw = (start..ring.end).map(|i| bits.get(i)).collect::<HexResult<Vec<_>>>()?;
    masks.sort_by_cached_key(|&m| {
        let masked =
            raw.iter().enumerate().map(|(k, &b)| b ^ m.is_masked(start - ring.start + k));
        count_transitions(masked)
    });
    Ok(masks)
}

fn count_transitions(bits: impl Iterator<Item = bool>) -> usize {
    let mut count = 0;
    let mut last = None;
    for b in bits {
        if last.is_some_and(|l| l != b) {
            count += 1;
        }
        last = Some(b);
    }
    count
}
