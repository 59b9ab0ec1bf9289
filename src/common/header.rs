use tracing::debug;

use super::{
    bit_array::BitArray,
    ec::ErrorCorrection,
    error::{HexError, HexResult},
    mask::MaskPattern,
    metadata::{HexVersion, Specification},
};

// Header
//------------------------------------------------------------------------------

/// Self-describing prefix of the bitstream:
/// `[version][payload len - 1][ecc len][checksum][mask per ring][parity]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub version: HexVersion,
    /// Payload length in bytes
    pub payload_len: usize,
    /// Payload parity length in bits
    pub ecc_len: usize,
    pub checksum: u32,
    pub masks: Vec<MaskPattern>,
}

impl Header {
    pub fn ring_count(&self) -> usize {
        self.masks.len()
    }

    /// Writes the header and its parity into the first `header_len` bits of `out`.
    pub fn write(&self, out: &mut BitArray, ec: &impl ErrorCorrection) -> HexResult<()> {
        let spec = self.version.spec();
        let data_len = spec.header_data_len(self.ring_count());
        if self.payload_len == 0 || self.payload_len > spec.max_payload_len {
            return Err(HexError::ValueOutOfRange);
        }

        let mut data = BitArray::new(data_len);
        let mut idx = 0;
        let mut push = |value: u32, width: usize| -> HexResult<()> {
            data.write_uint(idx, value, width)?;
            idx += width;
            Ok(())
        };
        push(self.version.id(), spec.version_bits)?;
        push(self.payload_len as u32 - 1, spec.payload_len_bits)?;
        push(self.ecc_len as u32, spec.ecc_len_bits)?;
        push(self.checksum, spec.checksum_bits)?;
        for m in self.masks.iter() {
            push(**m as u32, spec.mask_bits)?;
        }

        let encoded = ec.encode(&data, data_len)?;
        out.copy_from(0, &encoded, 0, encoded.len())
    }

    /// Parses the header at the start of `bits`, laid out for `ring_count` rings.
    pub fn read(
        bits: &BitArray,
        ring_count: usize,
        spec: &Specification,
        ec: &impl ErrorCorrection,
    ) -> HexResult<Self> {
        let data_len = spec.header_data_len(ring_count);
        if bits.len() < 2 * data_len {
            return Err(HexError::LengthMismatch);
        }

        let received = bits.view(0, 2 * data_len)?;
        let data = ec.decode(&received, data_len, data_len)?;

        let mut idx = 0;
        let mut next = |width: usize| -> HexResult<u32> {
            let v = data.read_uint(idx, width)?;
            idx += width;
            Ok(v)
        };
        let version = HexVersion::from_id(next(spec.version_bits)?)?;
        let payload_len = next(spec.payload_len_bits)? as usize + 1;
        let ecc_len = next(spec.ecc_len_bits)? as usize;
        let checksum = next(spec.checksum_bits)?;
        let masks = (0..ring_count)
            .map(|_| MaskPattern::new(next(spec.mask_bits)? as u8))
            .collect::<HexResult<Vec<_>>>()?;

        debug!("Header: version {version:?}, payload {payload_len} bytes, ecc {ecc_len} bits");
        Ok(Self { version, payload_len, ecc_len, checksum, masks })
    }
}
