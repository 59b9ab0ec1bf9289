//! Payload integrity checks.

use crc32fast::Hasher;

pub trait Checksum {
    fn checksum(&self, bytes: &[u8]) -> u32;

    fn verify(&self, bytes: &[u8], expected: u32) -> bool {
        self.checksum(bytes) == expected
    }
}

/// CRC-32 (IEEE) checksum.
#[derive(Debug, Clone, Copy, Default)]
pub struct Crc32;

impl Checksum for Crc32 {
    fn checksum(&self, bytes: &[u8]) -> u32 {
        let mut hasher = Hasher::new();
        hasher.update(bytes);
        hasher.finalize()
    }
}
