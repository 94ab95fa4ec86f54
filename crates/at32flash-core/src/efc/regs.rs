//! AT32 Embedded Flash Controller register definitions
//!
//! Offsets are relative to a region's register block. Region 0 sits at the
//! family's controller base, region 1 at +0x40 and the SPIM controller at
//! +0x80. All three blocks share this layout.

use bitflags::bitflags;

// ============================================================================
// Register offsets
// ============================================================================

/// Flash unlock register
pub const EFC_UNLOCK: u32 = 0x04;
/// User system data unlock register
pub const EFC_USD_UNLOCK: u32 = 0x08;
/// Status register
pub const EFC_STS: u32 = 0x0C;
/// Control register
pub const EFC_CTRL: u32 = 0x10;
/// Address register
pub const EFC_ADDR: u32 = 0x14;
/// User system data register
pub const EFC_USD: u32 = 0x1C;
/// Erase/program protection status register
pub const EFC_EPPS: u32 = 0x20;

// ============================================================================
// Unlock keys
// ============================================================================

/// First unlock key
pub const KEY1: u32 = 0x4567_0123;
/// Second unlock key
pub const KEY2: u32 = 0xCDEF_89AB;

// ============================================================================
// Poll budgets, in 1 ms steps
// ============================================================================

/// Single half-word program
pub const WRITE_TIMEOUT: u32 = 100;
/// Sector erase and option-byte erase
pub const SECTOR_ERASE_TIMEOUT: u32 = 1000;
/// Whole-region erase
pub const MASS_ERASE_TIMEOUT: u32 = 120_000;

/// EFC_USD bit set while flash access protection is active
pub const USD_FAP: u32 = 1;

/// Value of the access-protection byte that disables read protection
pub const FAP_DISABLED: u8 = 0xA5;

bitflags! {
    /// EFC_CTRL bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Ctrl: u32 {
        /// Flash program
        const FPRGM   = 1 << 0;
        /// Sector erase
        const SECERS  = 1 << 1;
        /// Bank erase
        const BANKERS = 1 << 2;
        /// User system data program
        const USDPRGM = 1 << 4;
        /// User system data erase
        const USDERS  = 1 << 5;
        /// Erase start
        const ERSTR   = 1 << 6;
        /// Operation lock
        const OPLK    = 1 << 7;
        /// User system data unlock success
        const USDULKS = 1 << 9;
    }
}

bitflags! {
    /// EFC_STS bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Status: u32 {
        /// Operation busy
        const OBF     = 1 << 0;
        /// Programming error
        const PRGMERR = 1 << 2;
        /// Erase/program protection error
        const EPPERR  = 1 << 4;
        /// Operation done
        const ODF     = 1 << 5;

        /// Bits that signal a failed operation
        const ERRORS = Self::PRGMERR.bits() | Self::EPPERR.bits();
    }
}
