mod block;
mod galois;

pub(crate) use block::*;

use super::{
    bit_array::BitArray,
    error::{HexError, HexResult},
};

// Error correction contract
//------------------------------------------------------------------------------

/// Systematic forward error correction over bit strings.
pub trait ErrorCorrection {
    /// Returns `data` followed by `parity_len` parity bits.
    fn encode(&self, data: &BitArray, parity_len: usize) -> HexResult<BitArray>;

    /// Returns the corrected first `data_len` bits of `received`.
    fn decode(&self, received: &BitArray, data_len: usize, parity_len: usize)
        -> HexResult<BitArray>;
}

// Reed-Solomon over GF(256)
//------------------------------------------------------------------------------

/// Byte oriented Reed-Solomon code. Data bits are zero padded to whole bytes, `parity_len / 8`
/// parity bytes are produced and any leftover parity bits stay zero. Codewords longer than one
/// block are split into near equal blocks whose parity bytes are interleaved.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReedSolomon;

impl ReedSolomon {
    /// Number of byte errors each block can correct, for the given lengths in bits.
    pub fn capacity(data_len: usize, parity_len: usize) -> Vec<usize> {
        block_layout(data_len.div_ceil(8), parity_len / 8).iter().map(|&(_, e)| e / 2).collect()
    }
}

impl ErrorCorrection for ReedSolomon {
    fn encode(&self, data: &BitArray, parity_len: usize) -> HexResult<BitArray> {
        let mut res = BitArray::new(data.len() + parity_len);
        res.copy_from(0, data, 0, data.len())?;

        let ecc_bytes = parity_len / 8;
        if ecc_bytes == 0 {
            return Ok(res);
        }

        let bytes = data.to_bytes();
        let layout = block_layout(bytes.len(), ecc_bytes);
        let data_blocks = blockify(&bytes, &layout);
        let ecc_blocks = data_blocks
            .iter()
            .zip(layout.iter())
            .map(|(b, &(_, e))| ecc_per_block(b, e))
            .collect::<Vec<_>>();

        let parity = interleave(&ecc_blocks);
        debug_assert!(parity.len() == ecc_bytes, "Parity length mismatch");
        for (i, &p) in parity.iter().enumerate() {
            res.write_uint(data.len() + i * 8, p as u32, 8)?;
        }
        Ok(res)
    }

    fn decode(
        &self,
        received: &BitArray,
        data_len: usize,
        parity_len: usize,
    ) -> HexResult<BitArray> {
        if received.len() != data_len + parity_len {
            return Err(HexError::LengthMismatch);
        }

        let ecc_bytes = parity_len / 8;
        if ecc_bytes == 0 {
            return received.copy_range(0, data_len);
        }

        let bytes = received.view(0, data_len)?.to_bytes();
        let parity = received.view(data_len, ecc_bytes * 8)?.to_bytes();
        let layout = block_layout(bytes.len(), ecc_bytes);
        let ecc_blocks = deinterleave(&parity, &layout);

        let mut corrected = Vec::with_capacity(bytes.len());
        for (data, ecc) in blockify(&bytes, &layout).into_iter().zip(ecc_blocks) {
            let mut encoded = data.to_vec();
            encoded.extend_from_slice(&ecc);
            let mut blk = Block::with_encoded(&encoded, data.len());
            corrected.extend_from_slice(blk.rectify()?);
        }

        BitArray::with_buffer(corrected, 0, data_len)
    }
}

// (data bytes, ecc bytes) per block. Blocks never exceed MAX_BLOCK_SIZE and later blocks carry
// the remainders.
fn block_layout(data_len: usize, ecc_len: usize) -> Vec<(usize, usize)> {
    let total = data_len + ecc_len;
    let mut count = total.div_ceil(MAX_BLOCK_SIZE).max(1);
    while data_len.div_ceil(count) + ecc_len.div_ceil(count) > MAX_BLOCK_SIZE {
        count += 1;
    }

    (0..count)
        .map(|i| {
            let d = data_len / count + usize::from(i >= count - data_len % count);
            let e = ecc_len / count + usize::from(i >= count - ecc_len % count);
            (d, e)
        })
        .collect()
}

fn blockify<'a>(data: &'a [u8], layout: &[(usize, usize)]) -> Vec<&'a [u8]> {
    let mut start = 0;
    layout
        .iter()
        .map(|&(d, _)| {
            let block = &data[start..start + d];
            start += d;
            block
        })
        .collect()
}

fn interleave<T: Copy, V: AsRef<[T]>>(blocks: &[V]) -> Vec<T> {
    let max_len = blocks.iter().map(|b| b.as_ref().len()).max().unwrap_or(0);
    let mut res = Vec::with_capacity(blocks.iter().map(|b| b.as_ref().len()).sum());
    for i in 0..max_len {
        for b in blocks {
            if let Some(&v) = b.as_ref().get(i) {
                res.push(v);
            }
        }
    }
    res
}

fn deinterleave(data: &[u8], layout: &[(usize, usize)]) -> Vec<Vec<u8>> {
    let mut blocks: Vec<Vec<u8>> = layout.iter().map(|&(_, e)| Vec::with_capacity(e)).collect();
    let max_len = layout.iter().map(|&(_, e)| e).max().unwrap_or(0);
    let mut it = data.iter();
    for i in 0..max_len {
        for (b, &(_, e)) in blocks.iter_mut().zip(layout.iter()) {
            if i < e {
                if let Some(&v) = it.next() {
                    b.push(v);
                }
            }
        }
    }
    blocks
}
