//! User settings record, stored twice at the end of the flash image.

use core::ops::Range;

use crate::crc::{self, USER_SETTINGS_SEED};

/// Size of one user settings record.
pub const SIZE: usize = 0x100;

/// Number of copies of the record at the end of the image.
pub const SLOTS: usize = 2;

/// Bytes covered by the record's checksum.
pub const CHECKSUM_RANGE: Range<usize> = 0x00..0x70;

/// Settings format version written by factory firmware.
pub const VERSION: u16 = 5;

/// Nickname of the factory profile.
pub const DEFAULT_NICKNAME: &str = "Dust";

/// Maximum nickname length, in UTF-16 code units.
pub const NICKNAME_LEN: usize = 10;

/// In-flash layout of a user settings record. All multi-byte fields are little-endian byte
/// arrays, so a `&UserSettings` can be written out directly with [`bytemuck::bytes_of`].
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct UserSettings {
    version: [u8; 2],
    /// 1 in the record that is currently in use, 0 in the other.
    active_slot: u8,
    birth_month: u8,
    birth_day: u8,
    _reserved0: u8,
    /// UTF-16LE, zero padded.
    nickname: [u8; NICKNAME_LEN * 2],
    _reserved1: [u8; 0x56],
    _reserved2: [u8; 2],
    checksum: [u8; 2],
    _reserved3: [u8; 0x8c],
}
const _: () = const { assert!(size_of::<UserSettings>() == SIZE) };

impl UserSettings {
    /// Factory-default record for `slot`, with its checksum already sealed. Slot 0 is the active
    /// one.
    pub fn new(slot: usize) -> Self {
        let mut this: Self = bytemuck::Zeroable::zeroed();
        this.version = VERSION.to_le_bytes();
        this.active_slot = u8::from(slot == 0);
        this.birth_month = 1;
        this.birth_day = 1;
        this.set_nickname(DEFAULT_NICKNAME);
        this.seal();
        this
    }

    /// View an in-flash record. Returns `None` unless `bytes` is exactly [`SIZE`] long.
    pub fn from_bytes(bytes: &[u8]) -> Option<&Self> {
        bytemuck::try_from_bytes(bytes).ok()
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }

    pub fn is_active(&self) -> bool {
        self.active_slot != 0
    }

    /// Store `name` as UTF-16LE, truncated to [`NICKNAME_LEN`] code units. Does not reseal.
    fn set_nickname(&mut self, name: &str) {
        self.nickname = [0; NICKNAME_LEN * 2];
        for (unit, out) in name
            .encode_utf16()
            .zip(self.nickname.chunks_exact_mut(2))
        {
            out.copy_from_slice(&unit.to_le_bytes());
        }
    }

    /// Checksum of the covered bytes as they currently are.
    pub fn checksum(&self) -> u16 {
        crc::checksum(USER_SETTINGS_SEED, &self.as_bytes()[CHECKSUM_RANGE])
    }

    /// Checksum as stored in the record.
    pub fn stored_checksum(&self) -> u16 {
        u16::from_le_bytes(self.checksum)
    }

    /// Recompute the checksum and store it.
    pub fn seal(&mut self) {
        self.checksum = self.checksum().to_le_bytes();
    }
}
