//! Synthesizer for factory-default SPI flash firmware images of the DS console family.
//!
//! The image contents are a hardware contract: every offset and constant written by
//! [`synthesize`] is what downstream consumers (hardware and emulators) expect to find in the
//! flash chip. See [`image`] for the byte layout.

#![no_std]

extern crate alloc;

pub mod crc;
pub mod cursor;
pub mod error;
pub mod image;
pub mod model;
pub mod user_settings;

pub use self::crc::checksum;
pub use error::FirmwareError;
pub use image::{FirmwareImage, synthesize, verify};
pub use model::Model;
