use std::ops::Range;

use tracing::{debug, info};

use super::{
    bit_array::BitArray,
    checksum::Checksum,
    ec::ErrorCorrection,
    error::{HexError, HexResult},
    header::Header,
    mask::{find_best_mask, rank_masks, MaskPattern},
    metadata::{HexVersion, Specification},
    ring::HexagonRing,
};

// Encoded layout
//------------------------------------------------------------------------------

/// Rings of a freshly encoded code. Each ring holds a view into `bits`.
#[derive(Debug, Clone)]
pub struct Layout {
    pub header: Header,
    pub rings: Vec<HexagonRing>,
    pub bits: BitArray,
}

pub fn validate(payload: &[u8], ecc_factor: f64, spec: &Specification) -> HexResult<()> {
    if payload.is_empty() {
        return Err(HexError::EmptyData);
    }
    if payload.len() > spec.max_payload_len {
        return Err(HexError::DataTooLong);
    }
    if !ecc_factor.is_finite() || !(spec.min_ecc_factor..=spec.max_ecc_factor).contains(&ecc_factor)
    {
        return Err(HexError::InvalidErrorCorrectionFactor);
    }
    Ok(())
}

/// Smallest ring set whose capacity fits the header sized for it, the payload and the minimum
/// parity.
pub fn fit_rings(payload_len: usize, ecc_factor: f64, spec: &Specification) -> HexResult<Vec<HexagonRing>> {
    let payload_bits = payload_len * 8;
    let min_ecc = (payload_bits as f64 * ecc_factor).ceil() as usize;

    let mut rings = Vec::new();
    let mut capacity = 0;
    loop {
        let ring = spec.ring(rings.len())?;
        capacity += ring.bit_count();
        rings.push(ring);
        if capacity >= spec.header_len(rings.len()) + payload_bits + min_ecc {
            return Ok(rings);
        }
    }
}

// Global bit ranges of every ring
fn ring_ranges(rings: &[HexagonRing]) -> Vec<Range<usize>> {
    let mut start = 0;
    rings
        .iter()
        .map(|r| {
            let range = start..start + r.bit_count();
            start = range.end;
            range
        })
        .collect()
}

// Encoder
//------------------------------------------------------------------------------

pub fn encode(
    payload: &[u8],
    ecc_factor: f64,
    masking: bool,
    ec: &impl ErrorCorrection,
    checksum: &impl Checksum,
) -> HexResult<Layout> {
    let version = HexVersion::CURRENT;
    let spec = version.spec();
    validate(payload, ecc_factor, spec)?;

    let mut rings = fit_rings(payload.len(), ecc_factor, spec)?;
    let capacity: usize = rings.iter().map(|r| r.bit_count()).sum();
    let header_len = spec.header_len(rings.len());
    let payload_bits = payload.len() * 8;
    let ecc_len = capacity - header_len - payload_bits;
    info!("Encoding {} bytes into {} rings, {ecc_len} parity bits", payload.len(), rings.len());

    let mut bits = BitArray::new(capacity);
    let body = ec.encode(&BitArray::from_bytes(payload), ecc_len)?;
    bits.copy_from(header_len, &body, 0, body.len())?;

    let ranges = ring_ranges(&rings);
    let mut masks = Vec::with_capacity(rings.len());
    for (i, range) in ranges.iter().enumerate() {
        let mask = if !masking {
            MaskPattern::default()
        } else if i + 1 == rings.len() {
            outer_ring_mask(&rings[i], &bits, range, header_len)?
        } else {
            find_best_mask(&bits, range.clone(), header_len)?
        };
        mask.apply(&mut bits, range.clone(), header_len)?;
        masks.push(mask);
    }
    debug!("Ring masks: {:?}", masks.iter().map(|m| **m).collect::<Vec<_>>());

    let header = Header {
        version,
        payload_len: payload.len(),
        ecc_len,
        checksum: checksum.checksum(payload),
        masks,
    };
    header.write(&mut bits, ec)?;

    for (ring, range) in rings.iter_mut().zip(ranges) {
        ring.assign_bits(bits.view(range.start, range.len())?)?;
    }

    Ok(Layout { header, rings, bits })
}

/// Best ranked mask that leaves ink near both ends of every side of the outermost ring. The
/// reader fits the bounding hexagon to that ink, so a blank side cannot be located.
fn outer_ring_mask(
    ring: &HexagonRing,
    bits: &BitArray,
    range: &Range<usize>,
    header_len: usize,
) -> HexResult<MaskPattern> {
    let ranked = rank_masks(bits, range.clone(), header_len)?;
    for &mask in ranked.iter() {
        if marks_corners(ring, bits, range, header_len, mask)? {
            return Ok(mask);
        }
    }
    debug!("No mask marks every corner of the outer ring");
    Ok(ranked[0])
}

fn marks_corners(
    ring: &HexagonRing,
    bits: &BitArray,
    range: &Range<usize>,
    header_len: usize,
    mask: MaskPattern,
) -> HexResult<bool> {
    let is_set = |slot: usize| -> HexResult<bool> {
        if slot < ring.finder_ccw().len {
            return Ok(ring.finder_ccw().set);
        }
        if slot >= ring.slot_count() - ring.finder_cw().len {
            return Ok(ring.finder_cw().set);
        }
        let local = slot - ring.finder_ccw().len;
        let global = range.start + local;
        // Header bits are only known after the masks, they count as ink
        if global < header_len {
            return Ok(true);
        }
        Ok(bits.get(global)? ^ mask.is_masked(local))
    };
    let any_set = |slots: Range<usize>| -> HexResult<bool> {
        for slot in slots {
            if is_set(slot)? {
                return Ok(true);
            }
        }
        Ok(false)
    };

    for (first, last) in ring.side_slots() {
        let reach = ((last - first + 1) / 4).max(1);
        if !any_set(first..first + reach)? || !any_set(last + 1 - reach..last + 1)? {
            return Ok(false);
        }
    }
    Ok(true)
}

// Decoder
//------------------------------------------------------------------------------

/// Recovers the payload from the global bitstream `bits` sliced across `rings`. `bits` is left
/// untouched.
pub fn decode(
    rings: &[HexagonRing],
    bits: &BitArray,
    ec: &impl ErrorCorrection,
    checksum: &impl Checksum,
) -> HexResult<Vec<u8>> {
    let spec = HexVersion::CURRENT.spec();
    let capacity: usize = rings.iter().map(|r| r.bit_count()).sum();
    if rings.is_empty() || bits.len() != capacity {
        return Err(HexError::LengthMismatch);
    }

    let header = Header::read(bits, rings.len(), spec, ec)?;
    let header_len = spec.header_len(rings.len());
    let payload_bits = header.payload_len * 8;
    if header_len + payload_bits + header.ecc_len != capacity {
        return Err(HexError::LengthMismatch);
    }

    let mut unmasked = bits.to_owned_copy();
    for (range, mask) in ring_ranges(rings).into_iter().zip(header.masks.iter()) {
        mask.apply(&mut unmasked, range, header_len)?;
    }

    let body = unmasked.view(header_len, payload_bits + header.ecc_len)?;
    let payload = ec.decode(&body, payload_bits, header.ecc_len)?.to_bytes();
    if !checksum.verify(&payload, header.checksum) {
        return Err(HexError::ChecksumMismatch);
    }

    info!("Decoded {} bytes from {} rings", payload.len(), rings.len());
    Ok(payload)
}
