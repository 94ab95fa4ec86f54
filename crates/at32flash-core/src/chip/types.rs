//! Chip descriptor type definitions

use core::fmt;

/// Layout of the EFC register block
///
/// The two layouts differ in where the controller lives on the bus; the
/// register offsets inside the block are the same for both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterFamily {
    /// Controller at 0x40022000 (AT32F403/413/415/421/425, L021, WB415)
    LegacyFlashReg,
    /// Controller at 0x40023C00 (AT32F423/435/437)
    HighDensityFlashReg,
}

impl RegisterFamily {
    /// Absolute base address of the first region's register block
    pub const fn base(self) -> u32 {
        match self {
            RegisterFamily::LegacyFlashReg => 0x4002_2000,
            RegisterFamily::HighDensityFlashReg => 0x4002_3C00,
        }
    }
}

/// An MCU series sharing one controller layout and option-byte location
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct McuFamily {
    /// Series name, e.g. "AT32F403A"
    pub name: &'static str,
    /// Controller register layout
    pub register_family: RegisterFamily,
    /// Base address of the option-byte (USD) area
    pub option_byte_base: u32,
}

impl McuFamily {
    /// Base address of the controller register block for region 0
    pub const fn flash_reg(&self) -> u32 {
        self.register_family.base()
    }
}

/// A known AT32 part
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipDescriptor {
    /// Value read from the product-id register
    pub product_id: u32,
    /// Main flash size in KiB
    pub flash_size_kb: u32,
    /// Sector (erase unit) size in bytes
    pub sector_size: u32,
    /// Series this part belongs to
    pub family: &'static McuFamily,
    /// Package/density suffix appended to the series name
    pub suffix: &'static str,
}

impl ChipDescriptor {
    /// Series name
    pub fn name(&self) -> &'static str {
        self.family.name
    }

    /// Main flash size in bytes
    pub const fn total_size(&self) -> u32 {
        self.flash_size_kb * 1024
    }

    /// Controller register layout
    pub const fn register_family(&self) -> RegisterFamily {
        self.family.register_family
    }

    /// Base address of the option-byte area
    pub const fn option_byte_base(&self) -> u32 {
        self.family.option_byte_base
    }
}

impl fmt::Display for ChipDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.family.name, self.suffix)
    }
}
