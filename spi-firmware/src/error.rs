use alloc::string::String;
use thiserror::Error;

use crate::model::Model;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FirmwareError {
    #[error("unknown console model id {0}")]
    UnknownModel(u8),
    #[error("unknown console model `{0}`")]
    UnknownModelName(String),
    #[error("image for {model} must be {expected:#x} bytes, got {actual:#x}")]
    SizeMismatch {
        model: Model,
        expected: usize,
        actual: usize,
    },
    #[error("vendor tag mismatch: found {found:02x?}")]
    VendorTagMismatch { found: [u8; 4] },
    #[error("user settings slot {slot}: stored checksum {stored:#06x}, computed {computed:#06x}")]
    ChecksumMismatch {
        slot: usize,
        stored: u16,
        computed: u16,
    },
}
