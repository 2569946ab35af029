//! CRC-16 used by the firmware to protect the user settings blocks.
//!
//! Bit-reflected, polynomial `0xA001` (CRC-16/IBM reversed). The firmware seeds it with
//! `0xFFFF`, which makes it equivalent to CRC-16/MODBUS.

use ::crc::{CRC_16_MODBUS, Crc, Digest};

/// Seed the firmware uses for user settings checksums.
pub const USER_SETTINGS_SEED: u16 = 0xFFFF;

const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_MODBUS);

/// Running checksum state. Feeding several slices through [`Checksum::update`] yields the same
/// result as one call over their concatenation, so discontiguous regions can be covered.
pub struct Checksum {
    digest: Digest<'static, u16>,
}
impl Checksum {
    /// Start from `seed`, given as the register value (not reflected).
    pub fn new(seed: u16) -> Self {
        // The crate reflects the initial value of reflected algorithms.
        Self {
            digest: CRC16.digest_with_initial(seed.reverse_bits()),
        }
    }

    pub fn update(&mut self, data: &[u8]) {
        self.digest.update(data);
    }

    pub fn finish(self) -> u16 {
        self.digest.finalize()
    }
}

/// Compute the checksum of `data` starting from `seed`. Returns `seed` for empty input.
pub fn checksum(seed: u16, data: &[u8]) -> u16 {
    let mut state = Checksum::new(seed);
    state.update(data);
    state.finish()
}
