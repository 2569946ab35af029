//! Firmware image layout and synthesis.
//!
//! Header fields written by [`synthesize`] (all other header bytes are zero):
//!
//! | Offset      | Contents                                                        |
//! |-------------|-----------------------------------------------------------------|
//! | `0x04..08`  | `00 DB 1F 0F`                                                   |
//! | `0x08..0C`  | vendor tag `MAC\x68`                                            |
//! | `0x14..16`  | `(size >> 17) << 12`, u16                                       |
//! | `0x18..1D`  | `00 00 01 01 06`                                                |
//! | `0x1D`      | hardware id of the model                                        |
//! | `0x1E..20`  | `FF FF`                                                         |
//! | `0x20..2A`  | `(size - 0x200) >> 3`, `0x0B51`, `0x0DB3`, `0x4F5D`, `0xFFFF`   |
//!
//! The final `0x200` bytes hold two [`UserSettings`] records.

use alloc::vec;
use alloc::vec::Vec;
use core::ops::Range;

use crate::cursor::Cursor;
use crate::error::FirmwareError;
use crate::model::Model;
use crate::user_settings::{self, UserSettings};

pub const VENDOR_TAG_OFFSET: usize = 0x08;
pub const VENDOR_TAG: [u8; 4] = [b'M', b'A', b'C', 0x68];
pub const HARDWARE_ID_OFFSET: usize = 0x1D;

/// Words at `0x22..0x2A`, following the user settings word offset.
const HEADER_TRAILER: [u16; 4] = [0x0B51, 0x0DB3, 0x4F5D, 0xFFFF];

/// A complete firmware image for one model. Only constructed fully populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirmwareImage {
    model: Model,
    bytes: Vec<u8>,
}

impl FirmwareImage {
    pub fn model(&self) -> Model {
        self.model
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// The user settings record in `slot`, or `None` if `slot` is out of range.
    pub fn user_settings(&self, slot: usize) -> Option<&UserSettings> {
        if slot >= user_settings::SLOTS {
            return None;
        }
        UserSettings::from_bytes(&self.bytes[user_settings_range(self.bytes.len(), slot)])
    }
}

impl AsRef<[u8]> for FirmwareImage {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// Location of user settings record `slot` in an image of `image_size` bytes.
pub fn user_settings_range(image_size: usize, slot: usize) -> Range<usize> {
    let start = image_size - user_settings::SLOTS * user_settings::SIZE + slot * user_settings::SIZE;
    start..start + user_settings::SIZE
}

/// Build the factory-default image for `model`.
pub fn synthesize(model: Model) -> FirmwareImage {
    let info = model.info();
    let len = info.image_size;
    let mut bytes = vec![0u8; len];

    let mut cursor = Cursor::new(&mut bytes);
    cursor
        .seek(0x04)
        .write_bytes(&[0x00, 0xDB, 0x1F, 0x0F])
        .write_bytes(&VENDOR_TAG);
    cursor.seek(0x14).write_u16_le(((len >> 17) << 12) as u16);
    cursor
        .seek(0x18)
        .write_bytes(&[0x00, 0x00, 0x01, 0x01, 0x06])
        .write_u8(info.hardware_id)
        .write_bytes(&[0xFF, 0xFF]);
    debug_assert_eq!(cursor.position(), 0x20);
    // Offset of the user settings area, in units of 8 bytes.
    cursor.write_u16_le(((len - user_settings::SLOTS * user_settings::SIZE) >> 3) as u16);
    for word in HEADER_TRAILER {
        cursor.write_u16_le(word);
    }

    for slot in 0..user_settings::SLOTS {
        let settings = UserSettings::new(slot);
        cursor
            .seek(user_settings_range(len, slot).start)
            .write_bytes(settings.as_bytes());
    }

    FirmwareImage { model, bytes }
}

/// Check an image produced by [`synthesize`]: its size matches `model`, the vendor tag is
/// present, and both user settings checksums hold.
pub fn verify(model: Model, bytes: &[u8]) -> Result<(), FirmwareError> {
    let expected = model.image_size();
    if bytes.len() != expected {
        return Err(FirmwareError::SizeMismatch {
            model,
            expected,
            actual: bytes.len(),
        });
    }

    let mut found = [0u8; 4];
    found.copy_from_slice(&bytes[VENDOR_TAG_OFFSET..VENDOR_TAG_OFFSET + 4]);
    if found != VENDOR_TAG {
        return Err(FirmwareError::VendorTagMismatch { found });
    }

    for slot in 0..user_settings::SLOTS {
        // The length check above guarantees every range is exactly one record.
        let settings: &UserSettings =
            bytemuck::from_bytes(&bytes[user_settings_range(expected, slot)]);
        let (stored, computed) = (settings.stored_checksum(), settings.checksum());
        if stored != computed {
            return Err(FirmwareError::ChecksumMismatch {
                slot,
                stored,
                computed,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crc::checksum;

    fn le_u16(bytes: &[u8], offset: usize) -> u16 {
        u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
    }

    #[test]
    fn image_sizes() {
        for model in Model::ALL {
            let image = synthesize(model);
            assert_eq!(image.len(), model.image_size(), "{model}");
            assert_eq!(image.model(), model);
        }
        assert_eq!(synthesize(Model::Ds).len(), 0x40000);
        assert_eq!(synthesize(Model::Dsi).len(), 0x20000);
        assert_eq!(synthesize(Model::IqueLite).len(), 0x80000);
    }

    #[test]
    fn fixed_header_fields() {
        for model in Model::ALL {
            let image = synthesize(model);
            let bytes = image.as_bytes();
            assert_eq!(&bytes[0x00..0x04], &[0, 0, 0, 0]);
            assert_eq!(&bytes[0x04..0x08], &[0x00, 0xDB, 0x1F, 0x0F]);
            assert_eq!(&bytes[0x08..0x0C], b"MAC\x68");
            assert_eq!(&bytes[0x18..0x1D], &[0x00, 0x00, 0x01, 0x01, 0x06]);
            assert_eq!(bytes[HARDWARE_ID_OFFSET], model.hardware_id(), "{model}");
            assert_eq!(&bytes[0x1E..0x20], &[0xFF, 0xFF]);
            assert_eq!(le_u16(bytes, 0x22), 0x0B51);
            assert_eq!(le_u16(bytes, 0x24), 0x0DB3);
            assert_eq!(le_u16(bytes, 0x26), 0x4F5D);
            assert_eq!(le_u16(bytes, 0x28), 0xFFFF);
            assert!(bytes[0x2A..model.image_size() - 0x200].iter().all(|&b| b == 0));
        }
    }

    #[test]
    fn size_dependent_header_fields() {
        let ds = synthesize(Model::Ds);
        assert_eq!(&ds.as_bytes()[0x20..0x22], &[0xC0, 0x7F]);
        assert_eq!(&ds.as_bytes()[0x14..0x16], &[0x00, 0x20]);

        let dsi = synthesize(Model::Dsi);
        assert_eq!(dsi.as_bytes()[0x1D], 0x63);
        assert_eq!(le_u16(dsi.as_bytes(), 0x14), 0x1000);
        assert_eq!(le_u16(dsi.as_bytes(), 0x20), 0x3FC0);

        let ique = synthesize(Model::Ique);
        assert_eq!(le_u16(ique.as_bytes(), 0x14), 0x4000);
        assert_eq!(le_u16(ique.as_bytes(), 0x20), 0xFFC0);
    }

    #[test]
    fn user_settings_blocks() {
        for model in Model::ALL {
            let image = synthesize(model);
            let bytes = image.as_bytes();
            let len = model.image_size();
            let block0 = &bytes[len - 0x200..len - 0x100];
            let block1 = &bytes[len - 0x100..];

            assert_eq!(block0[0x02], 1);
            assert_eq!(block1[0x02], 0);
            for block in [block0, block1] {
                assert_eq!(block[0x00], 5);
                assert_eq!(block[0x03], 1);
                assert_eq!(block[0x04], 1);
                assert_eq!(
                    &block[0x06..0x0E],
                    &[0x44, 0x00, 0x75, 0x00, 0x73, 0x00, 0x74, 0x00]
                );
                assert_eq!(checksum(0xFFFF, &block[0x00..0x70]), le_u16(block, 0x72));
            }

            assert!(image.user_settings(0).is_some_and(UserSettings::is_active));
            assert!(image.user_settings(1).is_some_and(|s| !s.is_active()));
            assert!(image.user_settings(2).is_none());
        }
    }

    #[test]
    fn verify_accepts_synthesized_images() {
        for model in Model::ALL {
            assert_eq!(verify(model, synthesize(model).as_bytes()), Ok(()));
        }
    }

    #[test]
    fn verify_rejects_truncated_image() {
        let bytes = synthesize(Model::Ds).into_bytes();
        assert_eq!(
            verify(Model::Ds, &bytes[..bytes.len() - 1]),
            Err(FirmwareError::SizeMismatch {
                model: Model::Ds,
                expected: 0x40000,
                actual: 0x3FFFF,
            })
        );
    }

    #[test]
    fn verify_checks_active_slot() {
        let mut bytes = synthesize(Model::Ique).into_bytes();
        let len = bytes.len();
        bytes[len - 0x200 + 0x06] = b'R';
        assert!(matches!(
            verify(Model::Ique, &bytes),
            Err(FirmwareError::ChecksumMismatch { slot: 0, .. })
        ));
    }

    #[test]
    fn verify_reports_corruption() {
        let mut bytes = synthesize(Model::Lite).into_bytes();
        assert_eq!(
            verify(Model::Dsi, &bytes),
            Err(FirmwareError::SizeMismatch {
                model: Model::Dsi,
                expected: 0x20000,
                actual: 0x40000,
            })
        );

        let len = bytes.len();
        bytes[len - 0x100 + 0x10] ^= 0xFF;
        assert!(matches!(
            verify(Model::Lite, &bytes),
            Err(FirmwareError::ChecksumMismatch { slot: 1, .. })
        ));

        bytes[0x0A] = b'X';
        assert_eq!(
            verify(Model::Lite, &bytes),
            Err(FirmwareError::VendorTagMismatch {
                found: [b'M', b'A', b'X', 0x68]
            })
        );
    }
}
