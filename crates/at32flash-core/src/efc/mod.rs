//! Embedded Flash Controller access
//!
//! [`Efc`] is the register view of one region's controller. It turns a
//! register offset into an absolute bus address and issues the access
//! through the debug target. The unlock/operate/poll/relock sequences built
//! on top of it live in [`sequence`].

pub mod regs;
pub mod sequence;

pub use regs::{Ctrl, Status};

use log::trace;

use crate::chip::ChipDescriptor;
use crate::error::Result;
use crate::geometry::Region;
use crate::target::Target;

/// Controller registers of one flash region
#[derive(Debug, Clone, Copy)]
pub struct Efc {
    register_base: u32,
    chip: &'static ChipDescriptor,
}

impl Efc {
    /// Controller at an explicit register base
    pub const fn new(register_base: u32, chip: &'static ChipDescriptor) -> Self {
        Self {
            register_base,
            chip,
        }
    }

    /// Controller owning `region`
    pub const fn for_region(region: &Region, chip: &'static ChipDescriptor) -> Self {
        Self::new(region.register_base, chip)
    }

    /// Base address of the register block
    pub const fn register_base(&self) -> u32 {
        self.register_base
    }

    /// Chip the controller belongs to
    pub const fn chip(&self) -> &'static ChipDescriptor {
        self.chip
    }

    /// Absolute address of a register
    pub const fn reg(&self, offset: u32) -> u32 {
        self.register_base + offset
    }

    /// Read a controller register
    pub fn read_reg<T: Target + ?Sized>(&self, target: &mut T, offset: u32) -> Result<u32> {
        let value = target.read_u32(self.reg(offset))?;
        trace!("EFC read  0x{:08X} = 0x{:08X}", self.reg(offset), value);
        Ok(value)
    }

    /// Write a controller register
    pub fn write_reg<T: Target + ?Sized>(
        &self,
        target: &mut T,
        offset: u32,
        value: u32,
    ) -> Result<()> {
        trace!("EFC write 0x{:08X} = 0x{:08X}", self.reg(offset), value);
        target.write_u32(self.reg(offset), value)
    }

    /// Read EFC_STS
    pub fn status<T: Target + ?Sized>(&self, target: &mut T) -> Result<Status> {
        self.read_reg(target, regs::EFC_STS)
            .map(Status::from_bits_retain)
    }

    /// Write-1-to-clear bits in EFC_STS
    pub fn clear_status<T: Target + ?Sized>(&self, target: &mut T, bits: Status) -> Result<()> {
        self.write_reg(target, regs::EFC_STS, bits.bits())
    }

    /// Write EFC_CTRL
    pub fn set_ctrl<T: Target + ?Sized>(&self, target: &mut T, ctrl: Ctrl) -> Result<()> {
        self.write_reg(target, regs::EFC_CTRL, ctrl.bits())
    }

    /// Read the erase/program protection bitmap (1 = unprotected)
    pub fn protection_status<T: Target + ?Sized>(&self, target: &mut T) -> Result<u32> {
        self.read_reg(target, regs::EFC_EPPS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip::resolve;
    use crate::target::mock::{Access, MockTarget};

    #[test]
    fn test_register_addresses() {
        let chip = resolve(0x7005_0346).unwrap();
        let efc = Efc::new(0x4002_2040, chip);
        assert_eq!(efc.reg(regs::EFC_CTRL), 0x4002_2050);
        assert_eq!(efc.reg(regs::EFC_STS), 0x4002_204C);

        let mut target = MockTarget::new();
        efc.set_ctrl(&mut target, Ctrl::FPRGM).unwrap();
        assert_eq!(target.log, [Access::Write32(0x4002_2050, 1)]);
    }

    #[test]
    fn test_status_keeps_unknown_bits() {
        let chip = resolve(0x7005_0346).unwrap();
        let efc = Efc::new(0x4002_2000, chip);
        let mut target = MockTarget::new();
        target.set_word(0x4002_200C, 0x0000_0120);
        let status = efc.status(&mut target).unwrap();
        assert!(status.contains(Status::ODF));
        assert_eq!(status.bits(), 0x120);
    }
}
