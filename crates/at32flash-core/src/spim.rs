//! SPIM peripheral setup
//!
//! Before the external SPI memory window can be erased or programmed, the
//! GPIO clocks must run, the interface pins must be switched to their
//! alternate function and the SPIF remap must be enabled.

use log::{debug, info};

use crate::chip::{ChipDescriptor, AT32F403};
use crate::config::SpimConfig;
use crate::error::Result;
use crate::target::Target;

/// CRM APB2 peripheral clock enable register
pub const CRM_APB2EN: u32 = 0x4002_1018;
/// GPIOA configuration register high (PA8..PA15)
pub const GPIOA_CFGHR: u32 = 0x4001_0804;
/// GPIOB configuration register low (PB0..PB7)
pub const GPIOB_CFGLR: u32 = 0x4001_0C00;
/// GPIOB configuration register high (PB8..PB15)
pub const GPIOB_CFGHR: u32 = 0x4001_0C04;
/// IOMUX remap register 1, AT32F403 only
pub const IOMUX_REMAP: u32 = 0x4001_001C;
/// IOMUX remap register 7
pub const IOMUX_REMAP7: u32 = 0x4001_0030;
/// SPIM flash type select register
pub const FLASH_SELECT: u32 = 0x4002_2088;

/// IOMUX, GPIOA and GPIOB clocks
const APB2_GPIO_CLOCKS: u32 = 0xD;

fn modify<T: Target + ?Sized>(target: &mut T, address: u32, clear: u32, set: u32) -> Result<()> {
    let value = (target.read_u32(address)? & !clear) | set;
    debug!("SPIM setup 0x{:08X} = 0x{:08X}", address, value);
    target.write_u32(address, value)
}

/// Route the SPIM interface to its pins and select the memory type
pub fn enable<T: Target + ?Sized>(
    target: &mut T,
    chip: &ChipDescriptor,
    spim: &SpimConfig,
) -> Result<()> {
    target.write_u32(CRM_APB2EN, APB2_GPIO_CLOCKS)?;

    // PA8
    modify(target, GPIOA_CFGHR, 0x0000_000F, 0x0000_0009)?;
    // PB1, PB6, PB7
    modify(target, GPIOB_CFGLR, 0xFF00_00F0, 0x9900_0090)?;

    if spim.io_mux != 0 {
        // PB10, PB11
        modify(target, GPIOB_CFGHR, 0x0000_FF00, 0x0000_9900)?;
    } else {
        // PA11, PA12
        modify(target, GPIOA_CFGHR, 0x000F_F000, 0x0009_9000)?;
    }

    if core::ptr::eq(chip.family, &AT32F403) {
        target.write_u32(IOMUX_REMAP, 1 << 21)?;
    } else {
        target.write_u32(IOMUX_REMAP7, 0x0000_0009)?;
    }

    target.write_u32(FLASH_SELECT, spim.flash_type)?;

    info!(
        "{} spim flash size: 0x{:x}, sector size: 0x{:x}",
        chip,
        spim.size,
        crate::geometry::SPIM_SECTOR_SIZE
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip::resolve;
    use crate::target::mock::{Access, MockTarget};

    fn spim(io_mux: u32) -> SpimConfig {
        SpimConfig {
            io_mux,
            flash_type: 2,
            size: 0x40_0000,
        }
    }

    #[test]
    fn test_default_pin_routing() {
        let mut target = MockTarget::new();
        target.set_word(GPIOA_CFGHR, 0x4444_4444);
        target.set_word(GPIOB_CFGLR, 0x4444_4444);
        // AT32F403A
        let chip = resolve(0x7005_0242).unwrap();
        enable(&mut target, chip, &spim(0)).unwrap();

        assert_eq!(target.writes_to(CRM_APB2EN), [0xD]);
        // PA8 then PA11/PA12 on the same register
        assert_eq!(target.writes_to(GPIOA_CFGHR), [0x4444_4449, 0x4449_9449]);
        assert_eq!(target.writes_to(GPIOB_CFGLR), [0x9944_4494]);
        assert!(target.writes_to(GPIOB_CFGHR).is_empty());
        assert_eq!(target.writes_to(IOMUX_REMAP7), [9]);
        assert_eq!(
            target.log.last(),
            Some(&Access::Write32(FLASH_SELECT, 2))
        );
    }

    #[test]
    fn test_alternate_pins_and_f403_remap() {
        let mut target = MockTarget::new();
        target.set_word(GPIOB_CFGHR, 0x4444_4444);
        // AT32F403 CBT6
        let chip = resolve(0x7003_01CF).unwrap();
        enable(&mut target, chip, &spim(1)).unwrap();

        assert_eq!(target.writes_to(GPIOB_CFGHR), [0x4444_9944]);
        assert_eq!(target.writes_to(GPIOA_CFGHR).len(), 1);
        assert_eq!(target.writes_to(IOMUX_REMAP), [1 << 21]);
        assert!(target.writes_to(IOMUX_REMAP7).is_empty());
    }
}
