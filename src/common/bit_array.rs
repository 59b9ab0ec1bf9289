use std::{cell::RefCell, fmt, rc::Rc};

use super::error::{HexError, HexResult};

// Bit array
//------------------------------------------------------------------------------

/// Bit addressable view over a shared byte buffer.
///
/// Bits are packed most significant bit first, so bit 0 of a byte is its MSB. Views created with
/// [`BitArray::view`] alias the parent's storage: writing through one is visible through every
/// other view of the same bytes. Use [`BitArray::to_owned_copy`] to detach.
#[derive(Clone)]
pub struct BitArray {
    buffer: Rc<RefCell<Vec<u8>>>,
    // Bit offset into buffer
    offset: usize,
    // Bit length
    len: usize,
}

impl BitArray {
    /// Zero filled array of `len` bits.
    pub fn new(len: usize) -> Self {
        Self { buffer: Rc::new(RefCell::new(vec![0; len.div_ceil(8)])), offset: 0, len }
    }

    /// Takes ownership of `buffer` and exposes `len` bits starting at bit `offset`.
    pub fn with_buffer(buffer: Vec<u8>, offset: usize, len: usize) -> HexResult<Self> {
        if offset + len > buffer.len() * 8 {
            return Err(HexError::BufferSizeMismatch);
        }
        Ok(Self { buffer: Rc::new(RefCell::new(buffer)), offset, len })
    }

    /// Copies all bits of `bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self { buffer: Rc::new(RefCell::new(bytes.to_vec())), offset: 0, len: bytes.len() * 8 }
    }

    /// Builds an array from 0/1 values, any non-zero value is a set bit.
    pub fn from_bits(bits: &[u8]) -> Self {
        let res = Self::new(bits.len());
        {
            let mut buf = res.buffer.borrow_mut();
            for (i, &b) in bits.iter().enumerate() {
                if b != 0 {
                    buf[i >> 3] |= 0x80 >> (i & 7);
                }
            }
        }
        res
    }

    /// Aliasing sub-view of `len` bits starting at bit `start` of this view.
    pub fn view(&self, start: usize, len: usize) -> HexResult<Self> {
        if start + len > self.len {
            return Err(HexError::IndexOutOfRange);
        }
        Ok(Self { buffer: Rc::clone(&self.buffer), offset: self.offset + start, len })
    }

    /// Sub-range of this view backed by its own buffer.
    pub fn copy_range(&self, start: usize, len: usize) -> HexResult<Self> {
        self.view(start, len).map(|v| v.to_owned_copy())
    }

    /// Materializes the bits of this view into a freshly allocated buffer.
    pub fn to_owned_copy(&self) -> Self {
        let res = Self::new(self.len);
        {
            let src = self.buffer.borrow();
            let mut dst = res.buffer.borrow_mut();
            for i in 0..self.len {
                if read_bit(&src, self.offset + i) {
                    dst[i >> 3] |= 0x80 >> (i & 7);
                }
            }
        }
        res
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True when both views share the same backing buffer.
    pub fn shares_buffer(&self, other: &BitArray) -> bool {
        Rc::ptr_eq(&self.buffer, &other.buffer)
    }

    fn check_index(&self, index: usize) -> HexResult<usize> {
        if index >= self.len {
            return Err(HexError::IndexOutOfRange);
        }
        Ok(self.offset + index)
    }

    pub fn get(&self, index: usize) -> HexResult<bool> {
        let pos = self.check_index(index)?;
        Ok(read_bit(&self.buffer.borrow(), pos))
    }

    pub fn set_value(&mut self, index: usize, value: bool) -> HexResult<()> {
        let pos = self.check_index(index)?;
        write_bit(&mut self.buffer.borrow_mut(), pos, value);
        Ok(())
    }

    pub fn set(&mut self, index: usize) -> HexResult<()> {
        self.set_value(index, true)
    }

    pub fn unset(&mut self, index: usize) -> HexResult<()> {
        self.set_value(index, false)
    }

    pub fn toggle(&mut self, index: usize) -> HexResult<()> {
        let pos = self.check_index(index)?;
        self.buffer.borrow_mut()[pos >> 3] ^= 0x80 >> (pos & 7);
        Ok(())
    }

    /// Copies `len` bits from `src[src_start..]` into `self[dst_start..]`. Source and destination
    /// may alias the same bytes.
    pub fn copy_from(
        &mut self,
        dst_start: usize,
        src: &BitArray,
        src_start: usize,
        len: usize,
    ) -> HexResult<()> {
        if src_start + len > src.len || dst_start + len > self.len {
            return Err(HexError::IndexOutOfRange);
        }

        // Read first, so overlapping views never observe partially written bits
        let bits: Vec<bool> = {
            let buf = src.buffer.borrow();
            (0..len).map(|i| read_bit(&buf, src.offset + src_start + i)).collect()
        };

        let mut buf = self.buffer.borrow_mut();
        for (i, b) in bits.into_iter().enumerate() {
            write_bit(&mut buf, self.offset + dst_start + i, b);
        }
        Ok(())
    }

    /// Writes the `bit_width` least significant bits of `value`, MSB first, starting at `index`.
    pub fn write_uint(&mut self, index: usize, value: u32, bit_width: usize) -> HexResult<()> {
        if !(1..=32).contains(&bit_width) {
            return Err(HexError::InvalidBitWidth);
        }
        if bit_width < 32 && value >> bit_width != 0 {
            return Err(HexError::ValueOutOfRange);
        }
        if index + bit_width > self.len {
            return Err(HexError::IndexOutOfRange);
        }

        let mut buf = self.buffer.borrow_mut();
        for i in 0..bit_width {
            let bit = (value >> (bit_width - 1 - i)) & 1 == 1;
            write_bit(&mut buf, self.offset + index + i, bit);
        }
        Ok(())
    }

    /// Reads `bit_width` bits starting at `index` as an MSB first unsigned integer.
    pub fn read_uint(&self, index: usize, bit_width: usize) -> HexResult<u32> {
        if !(1..=32).contains(&bit_width) {
            return Err(HexError::InvalidBitWidth);
        }
        if index + bit_width > self.len {
            return Err(HexError::IndexOutOfRange);
        }

        let buf = self.buffer.borrow();
        let value = (0..bit_width)
            .fold(0u32, |acc, i| (acc << 1) | read_bit(&buf, self.offset + index + i) as u32);
        Ok(value)
    }

    /// One byte per bit, 0 or 1.
    pub fn to_bits(&self) -> Vec<u8> {
        let buf = self.buffer.borrow();
        (0..self.len).map(|i| read_bit(&buf, self.offset + i) as u8).collect()
    }

    /// Packs the view into bytes, MSB first. The last byte is zero padded.
    pub fn to_bytes(&self) -> Vec<u8> {
        let buf = self.buffer.borrow();
        let mut res = vec![0u8; self.len.div_ceil(8)];
        for i in 0..self.len {
            if read_bit(&buf, self.offset + i) {
                res[i >> 3] |= 0x80 >> (i & 7);
            }
        }
        res
    }

    pub fn count_ones(&self) -> usize {
        let buf = self.buffer.borrow();
        (0..self.len).filter(|&i| read_bit(&buf, self.offset + i)).count()
    }
}

#[inline]
fn read_bit(buf: &[u8], pos: usize) -> bool {
    buf[pos >> 3] & (0x80 >> (pos & 7)) != 0
}

#[inline]
fn write_bit(buf: &mut [u8], pos: usize, value: bool) {
    let mask = 0x80 >> (pos & 7);
    if value {
        buf[pos >> 3] |= mask;
    } else {
        buf[pos >> 3] &= !mask;
    }
}

impl PartialEq for BitArray {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.to_bits() == other.to_bits()
    }
}

impl Eq for BitArray {}

impl fmt::Debug for BitArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bits: String = self.to_bits().iter().map(|&b| if b == 1 { '1' } else { '0' }).collect();
        write!(f, "BitArray[{}]({bits})", self.len)
    }
}
