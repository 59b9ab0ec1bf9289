mod hexcode;

pub use hexcode::{HexCode, PathSegment};

use tracing::info;

use crate::common::{
    checksum::{Checksum, Crc32},
    ec::{ErrorCorrection, ReedSolomon},
    error::HexResult,
    format::encode,
    metadata::HexVersion,
};

pub struct HexBuilder<'a> {
    data: &'a [u8],
    ecc_factor: f64,
    masking: bool,
}

impl<'a> HexBuilder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        let ecc_factor = HexVersion::CURRENT.spec().default_ecc_factor;
        Self { data, ecc_factor, masking: true }
    }

    pub fn data(&mut self, data: &'a [u8]) -> &mut Self {
        self.data = data;
        self
    }

    /// Minimum parity as a fraction of the payload size. Unused ring capacity is filled with
    /// parity as well.
    pub fn error_correction_factor(&mut self, factor: f64) -> &mut Self {
        self.ecc_factor = factor;
        self
    }

    pub fn masking(&mut self, masking: bool) -> &mut Self {
        self.masking = masking;
        self
    }

    pub fn metadata(&self) -> String {
        format!(
            "{{ Payload: {} bytes, Ecc factor: {}, Masking: {} }}",
            self.data.len(),
            self.ecc_factor,
            self.masking
        )
    }
}

impl HexBuilder<'_> {
    pub fn build(&self) -> HexResult<HexCode> {
        self.build_with(&ReedSolomon, &Crc32)
    }

    /// Builds with custom error correction and checksum collaborators. Readers must use the same.
    pub fn build_with(
        &self,
        ec: &impl ErrorCorrection,
        checksum: &impl Checksum,
    ) -> HexResult<HexCode> {
        info!("Generating hexagonal code {}", self.metadata());
        let layout = encode(self.data, self.ecc_factor, self.masking, ec, checksum)?;
        let code = HexCode::new(self.data.to_vec(), layout);
        info!("Hexagonal code generated with {} rings", code.ring_count());
        Ok(code)
    }
}

#[cfg(test)]
mod builder_tests {
    use super::HexBuilder;
    use crate::common::error::HexError;

    #[test]
    fn test_metadata() {
        let mut builder = HexBuilder::new(b"Hello");
        builder.error_correction_factor(1.0).masking(false);
        assert_eq!(builder.metadata(), "{ Payload: 5 bytes, Ecc factor: 1, Masking: false }");
    }

    #[test]
    fn test_build() {
        let code = HexBuilder::new(&[0u8; 8]).build().unwrap();
        assert_eq!(code.ring_count(), 3);
        assert_eq!(code.payload(), &[0u8; 8]);
    }

    #[test]
    fn test_build_rejects_invalid_input() {
        assert_eq!(HexBuilder::new(b"").build().unwrap_err(), HexError::EmptyData);
        let err = HexBuilder::new(b"x").error_correction_factor(3.0).build().unwrap_err();
        assert_eq!(err, HexError::InvalidErrorCorrectionFactor);
    }
}
