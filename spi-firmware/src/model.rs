//! Registry of supported console models and the per-model constants written into the image.

use core::fmt;
use core::str::FromStr;

use alloc::string::ToString;

use crate::error::FirmwareError;

/// Console hardware variant. The discriminant is the model's numeric id.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum Model {
    Ds = 0,
    Lite = 1,
    Dsi = 2,
    Ique = 3,
    IqueLite = 4,
}

/// Per-model constants. Everything that varies by model is derived from this one table.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ModelInfo {
    /// Canonical lowercase name, as accepted by [`Model::from_str`].
    pub name: &'static str,
    /// Size of the flash chip, and therefore of the image.
    pub image_size: usize,
    /// Byte at header offset `0x1D` identifying the console type.
    pub hardware_id: u8,
}

impl Model {
    pub const ALL: [Model; 5] = [
        Model::Ds,
        Model::Lite,
        Model::Dsi,
        Model::Ique,
        Model::IqueLite,
    ];

    pub const fn info(self) -> ModelInfo {
        match self {
            Model::Ds => ModelInfo {
                name: "ds",
                image_size: 0x4_0000,
                hardware_id: 0xFF,
            },
            Model::Lite => ModelInfo {
                name: "lite",
                image_size: 0x4_0000,
                hardware_id: 0x20,
            },
            Model::Dsi => ModelInfo {
                name: "dsi",
                image_size: 0x2_0000,
                hardware_id: 0x63,
            },
            Model::Ique => ModelInfo {
                name: "ique",
                image_size: 0x8_0000,
                hardware_id: 0x57,
            },
            Model::IqueLite => ModelInfo {
                name: "ique-lite",
                image_size: 0x8_0000,
                hardware_id: 0x43,
            },
        }
    }

    pub const fn id(self) -> u8 {
        self as u8
    }

    pub const fn name(self) -> &'static str {
        self.info().name
    }

    pub const fn image_size(self) -> usize {
        self.info().image_size
    }

    pub const fn hardware_id(self) -> u8 {
        self.info().hardware_id
    }
}

impl TryFrom<u8> for Model {
    type Error = FirmwareError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Model::ALL
            .into_iter()
            .find(|model| model.id() == id)
            .ok_or(FirmwareError::UnknownModel(id))
    }
}

impl FromStr for Model {
    type Err = FirmwareError;

    /// Accepts a canonical name (case-insensitive) or a numeric id, decimal or `0x` hex.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(model) = Model::ALL
            .into_iter()
            .find(|model| model.name().eq_ignore_ascii_case(s))
        {
            return Ok(model);
        }
        let id = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex) => u8::from_str_radix(hex, 16),
            None => s.parse::<u8>(),
        };
        match id {
            Ok(id) => Model::try_from(id),
            Err(_) => Err(FirmwareError::UnknownModelName(s.to_string())),
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
