//! User system data (option bytes)
//!
//! The option-byte area holds the flash access protection byte, the system
//! setting byte, two user data bytes and the 32-bit erase/program protection
//! bitmap. Each byte is stored in the low half of a half-word with its
//! complement in the high half, so the area reads back as four words with
//! the payload in bits 7:0 and 23:16.
//!
//! The area can only be rewritten as a whole: erase it, then program all
//! eight half-words again. A protection bit of 0 means the block is
//! protected.

use log::{debug, error, info};

use crate::block_write;
use crate::efc::{Ctrl, Efc};
use crate::error::Result;
use crate::target::Target;

pub use crate::efc::regs::FAP_DISABLED;

/// Number of half-words programmed into the option-byte area
pub const IMAGE_HALFWORDS: usize = 8;

/// Cached option-byte contents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionBytes {
    /// Flash access protection byte
    pub fap: u8,
    /// System setting byte
    pub ssb: u8,
    /// User data
    pub data: u16,
    /// Erase/program protection bitmap, bit clear = protected
    pub protection: u32,
}

impl Default for OptionBytes {
    fn default() -> Self {
        Self {
            fap: FAP_DISABLED,
            ssb: 0xFF,
            data: 0xFFFF,
            protection: 0xFFFF_FFFF,
        }
    }
}

fn unpack(word: u32) -> u32 {
    ((word >> 8) & 0xFF00) | (word & 0xFF)
}

impl OptionBytes {
    /// Decode the four words read from the option-byte area
    pub fn from_words(words: [u32; 4]) -> Self {
        Self {
            fap: (words[0] & 0xFF) as u8,
            ssb: ((words[0] >> 16) & 0xFF) as u8,
            data: unpack(words[1]) as u16,
            protection: unpack(words[2]) | (unpack(words[3]) << 16),
        }
    }

    /// Half-words to program, in address order
    pub fn image(&self) -> [u16; IMAGE_HALFWORDS] {
        let p = self.protection;
        [
            self.fap as u16,
            self.ssb as u16,
            self.data & 0xFF,
            self.data >> 8,
            (p & 0xFF) as u16,
            ((p >> 8) & 0xFF) as u16,
            ((p >> 16) & 0xFF) as u16,
            ((p >> 24) & 0xFF) as u16,
        ]
    }

    /// Image as little-endian bytes
    pub fn image_bytes(&self) -> [u8; IMAGE_HALFWORDS * 2] {
        let mut bytes = [0u8; IMAGE_HALFWORDS * 2];
        for (chunk, half) in bytes.chunks_exact_mut(2).zip(self.image()) {
            chunk.copy_from_slice(&half.to_le_bytes());
        }
        bytes
    }

    /// Mark protection blocks `first..=last` as protected or unprotected
    pub fn set_protection(&mut self, protect: bool, first: u32, last: u32) {
        for block in first..=last {
            if protect {
                self.protection &= !(1 << block);
            } else {
                self.protection |= 1 << block;
            }
        }
    }

    /// Whether a protection block is protected
    pub fn is_protected(&self, block: u32) -> bool {
        self.protection & (1 << block) == 0
    }

    /// Read the option bytes at `base`
    pub fn read<T: Target + ?Sized>(target: &mut T, base: u32) -> Result<Self> {
        let mut words = [0u32; 4];
        for (i, word) in words.iter_mut().enumerate() {
            *word = target.read_u32(base + 4 * i as u32)?;
        }
        let bytes = Self::from_words(words);
        debug!(
            "option bytes: fap 0x{:02X} ssb 0x{:02X} data 0x{:04X} protection 0x{:08X}",
            bytes.fap, bytes.ssb, bytes.data, bytes.protection
        );
        Ok(bytes)
    }
}

/// Option-byte area of one chip
#[derive(Debug, Clone, Copy)]
pub struct OptionByteArea {
    efc: Efc,
    base: u32,
}

impl OptionByteArea {
    /// Area at `base`, controlled through the main flash controller `efc`
    pub const fn new(efc: Efc, base: u32) -> Self {
        Self { efc, base }
    }

    /// Read the current contents
    pub fn read<T: Target + ?Sized>(&self, target: &mut T) -> Result<OptionBytes> {
        OptionBytes::read(target, self.base)
    }

    /// Erase the whole area
    pub fn erase<T: Target + ?Sized>(&self, target: &mut T) -> Result<()> {
        info!("erasing option bytes at 0x{:08X}", self.base);
        self.efc.erase_usd(target)
    }

    /// Program `bytes` into an erased area
    pub fn write<T: Target + ?Sized>(&self, target: &mut T, bytes: &OptionBytes) -> Result<()> {
        info!("programming option bytes at 0x{:08X}", self.base);
        let image = bytes.image_bytes();
        self.efc.with_usd_unlocked(target, |t| {
            self.efc.set_ctrl(t, Ctrl::USDPRGM | Ctrl::USDULKS)?;
            block_write::program(t, &self.efc, &image, self.base).map_err(|e| {
                error!("{}: failed to program option bytes: {}", self.efc.chip(), e);
                e
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip::resolve;
    use crate::efc::regs::{EFC_CTRL, EFC_USD_UNLOCK, KEY1};
    use crate::target::mock::MockTarget;

    const USD: u32 = 0x1FFF_F800;

    #[test]
    fn test_decode_words() {
        // payload in bits 7:0 and 23:16, complements elsewhere
        let bytes = OptionBytes::from_words([0x00FF_5AA5, 0x0034_CB12, 0x00F0_0F0F, 0x0001_FE7F]);
        assert_eq!(bytes.fap, 0xA5);
        assert_eq!(bytes.ssb, 0xFF);
        assert_eq!(bytes.data, 0x3412);
        assert_eq!(bytes.protection, 0x017F_F00F);
    }

    #[test]
    fn test_image_layout() {
        let bytes = OptionBytes {
            fap: 0xA5,
            ssb: 0x07,
            data: 0x3412,
            protection: 0x8877_6655,
        };
        assert_eq!(
            bytes.image(),
            [0xA5, 0x07, 0x12, 0x34, 0x55, 0x66, 0x77, 0x88]
        );
        assert_eq!(&bytes.image_bytes()[..4], &[0xA5, 0x00, 0x07, 0x00]);
    }

    #[test]
    fn test_protect_clears_only_target_bit() {
        let mut bytes = OptionBytes {
            fap: 0xA5,
            ssb: 0xFF,
            data: 0xFFFF,
            protection: 0xF0F0_FFFF,
        };
        bytes.set_protection(true, 0, 0);
        assert_eq!(bytes.protection, 0xF0F0_FFFE);
        assert!(bytes.is_protected(0));
        assert!(!bytes.is_protected(1));

        bytes.set_protection(false, 0, 31);
        assert_eq!(bytes.protection, 0xFFFF_FFFF);
    }

    #[test]
    fn test_erase_sequence() {
        let mut target = MockTarget::new();
        let chip = resolve(0x7005_0242).unwrap();
        let area = OptionByteArea::new(Efc::new(0x4002_2000, chip), USD);
        area.erase(&mut target).unwrap();

        assert_eq!(target.writes_to(0x4002_2000 + EFC_USD_UNLOCK)[0], KEY1);
        assert_eq!(
            target.writes_to(0x4002_2000 + EFC_CTRL),
            [0x220, 0x260, Ctrl::OPLK.bits()]
        );
    }

    #[test]
    fn test_write_falls_back_to_halfwords() {
        let mut target = MockTarget::new();
        target.ram_free = 0;
        let chip = resolve(0x7005_0242).unwrap();
        let area = OptionByteArea::new(Efc::new(0x4002_2000, chip), USD);
        let bytes = OptionBytes {
            fap: 0xA5,
            ssb: 0xFF,
            data: 0xFFFF,
            protection: 0xFFFF_FFFE,
        };
        area.write(&mut target, &bytes).unwrap();

        let writes = target.halfword_writes();
        assert_eq!(writes.len(), IMAGE_HALFWORDS);
        assert_eq!(writes[0], (USD, 0xA5));
        assert_eq!(writes[4], (USD + 8, 0xFE));
        assert_eq!(
            target.writes_to(0x4002_2000 + EFC_CTRL),
            [(Ctrl::USDPRGM | Ctrl::USDULKS).bits(), Ctrl::OPLK.bits()]
        );
    }
}
