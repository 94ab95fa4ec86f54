//! Bank geometry resolver
//!
//! Turns a chip descriptor and bank base address into the region split,
//! sector table shape and write-protection block partition of a bank.

use heapless::Vec;

use crate::chip::ChipDescriptor;
use crate::config::SpimConfig;
use crate::error::{Error, Result};

/// Base address of the main flash window
pub const MAIN_FLASH_BASE: u32 = 0x0800_0000;
/// Base address of the external SPI memory (SPIM) window
pub const SPIM_FLASH_BASE: u32 = 0x0840_0000;

/// Register block stride between region 0 and region 1
pub const REGION1_REG_OFFSET: u32 = 0x40;
/// Register block offset of the SPIM controller
pub const SPIM_REG_OFFSET: u32 = 0x80;
/// Sector size of SPIM memory
pub const SPIM_SECTOR_SIZE: u32 = 4096;

/// Maximum number of write-protection blocks (one EPPS bit each)
pub const MAX_PROTECTION_BLOCKS: usize = 32;
/// Sectors covered by one protection block
pub const SECTORS_PER_PROTECTION_BLOCK: u32 = 2;

const SMALL_REGION_LIMIT: u32 = 512 * 1024;
const LARGE_REGION_LIMIT: u32 = 2 * 1024 * 1024;

/// An independently controlled slice of the bank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Region {
    /// Absolute address of this region's EFC register block
    pub register_base: u32,
    /// Offset of the region from the bank base
    pub base_offset: u32,
    /// Region size in bytes, 0 if absent
    pub size: u32,
    /// Number of sectors in the region
    pub sector_count: u32,
}

impl Region {
    /// Whether the region exists on this device
    pub const fn is_present(&self) -> bool {
        self.size != 0
    }

    /// Offset one past the end of the region
    pub const fn end_offset(&self) -> u32 {
        self.base_offset + self.size
    }
}

/// Which address window a bank maps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankKind {
    /// On-chip main flash
    Main,
    /// External memory behind the SPIM interface
    Spim,
}

impl BankKind {
    /// Classify a bank base address
    pub fn from_base(base: u32) -> Result<Self> {
        match base {
            MAIN_FLASH_BASE => Ok(BankKind::Main),
            SPIM_FLASH_BASE => Ok(BankKind::Spim),
            other => Err(Error::InvalidBankAddress(other)),
        }
    }
}

/// Layout of a probed bank
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankGeometry {
    /// Bank size in bytes
    pub total_size: u32,
    /// Sector size in bytes
    pub sector_size: u32,
    /// Sector count across all regions
    pub sector_count: u32,
    /// Regions in ascending offset order; region 1 may be absent
    pub regions: [Region; 2],
    /// Protection block sizes in bytes, in ascending offset order
    pub protection_blocks: Vec<u32, MAX_PROTECTION_BLOCKS>,
}

impl BankGeometry {
    /// Regions that exist on the device
    pub fn present_regions(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter().filter(|r| r.is_present())
    }
}

/// Compute the geometry of a bank
///
/// Main-flash banks are sized from the catalog entry. SPIM banks take their
/// size from `spim` and always use 4 KiB sectors with the SPIM register
/// block.
pub fn compute_geometry(
    chip: &ChipDescriptor,
    bank_base: u32,
    spim: Option<&SpimConfig>,
) -> Result<BankGeometry> {
    let flash_reg = chip.family.flash_reg();

    let (sector_size, regions) = match BankKind::from_base(bank_base)? {
        BankKind::Main => {
            let total = chip.total_size();
            let limit = if chip.flash_size_kb > 1024 {
                LARGE_REGION_LIMIT
            } else {
                SMALL_REGION_LIMIT
            };
            let first = total.min(limit);
            let regions = [
                Region {
                    register_base: flash_reg,
                    base_offset: 0,
                    size: first,
                    sector_count: 0,
                },
                Region {
                    register_base: flash_reg + REGION1_REG_OFFSET,
                    base_offset: first,
                    size: total - first,
                    sector_count: 0,
                },
            ];
            (chip.sector_size, regions)
        }
        BankKind::Spim => {
            let spim = spim.ok_or(Error::Syntax("SPIM bank needs io_mux, type and size"))?;
            let regions = [
                Region {
                    register_base: flash_reg + SPIM_REG_OFFSET,
                    base_offset: 0,
                    size: spim.size,
                    sector_count: 0,
                },
                Region {
                    register_base: flash_reg + SPIM_REG_OFFSET,
                    base_offset: spim.size,
                    size: 0,
                    sector_count: 0,
                },
            ];
            (SPIM_SECTOR_SIZE, regions)
        }
    };

    build(sector_size, regions)
}

fn build(sector_size: u32, mut regions: [Region; 2]) -> Result<BankGeometry> {
    let total_size: u32 = regions.iter().map(|r| r.size).sum();
    if total_size == 0 || sector_size == 0 {
        return Err(Error::InvalidGeometry {
            size: total_size,
            sector_size,
        });
    }

    for region in regions.iter_mut() {
        if region.size % sector_size != 0 {
            return Err(Error::InvalidGeometry {
                size: region.size,
                sector_size,
            });
        }
        region.sector_count = region.size / sector_size;
    }
    let sector_count = regions.iter().map(|r| r.sector_count).sum();

    let protection_blocks = protection_blocks(sector_count, sector_size);

    Ok(BankGeometry {
        total_size,
        sector_size,
        sector_count,
        regions,
        protection_blocks,
    })
}

/// Partition sectors into write-protection blocks
///
/// Pairs of sectors share one block. When there are more pairs than EPPS
/// bits, the last block takes every remaining sector.
fn protection_blocks(sector_count: u32, sector_size: u32) -> Vec<u32, MAX_PROTECTION_BLOCKS> {
    let count = sector_count
        .div_ceil(SECTORS_PER_PROTECTION_BLOCK)
        .min(MAX_PROTECTION_BLOCKS as u32);

    (0..count)
        .map(|i| {
            let sectors = if i + 1 == count {
                sector_count - i * SECTORS_PER_PROTECTION_BLOCK
            } else {
                SECTORS_PER_PROTECTION_BLOCK
            };
            sectors * sector_size
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip::resolve;

    fn check_sums(geometry: &BankGeometry) {
        let regions: u32 = geometry.regions.iter().map(|r| r.size).sum();
        let blocks: u32 = geometry.protection_blocks.iter().sum();
        assert_eq!(regions, geometry.total_size);
        assert_eq!(blocks, geometry.total_size);
    }

    #[test]
    fn test_sums_hold_for_every_chip() {
        for chip in crate::chip::KNOWN_CHIPS {
            let geometry = compute_geometry(chip, MAIN_FLASH_BASE, None).unwrap();
            check_sums(&geometry);
            assert_eq!(
                geometry.sector_count * geometry.sector_size,
                geometry.total_size
            );
            assert!(geometry.protection_blocks.len() <= MAX_PROTECTION_BLOCKS);
        }
    }

    #[test]
    fn test_1024k_splits_into_two_regions() {
        // AT32F403A CGT7
        let chip = resolve(0x7005_0346).unwrap();
        let geometry = compute_geometry(chip, MAIN_FLASH_BASE, None).unwrap();
        assert_eq!(geometry.regions[0].size, 512 * 1024);
        assert_eq!(geometry.regions[1].size, 512 * 1024);
        assert_eq!(geometry.regions[0].register_base, 0x4002_2000);
        assert_eq!(geometry.regions[1].register_base, 0x4002_2040);
        assert_eq!(geometry.regions[1].base_offset, 512 * 1024);
        assert_eq!(geometry.sector_count, 512);
        check_sums(&geometry);
    }

    #[test]
    fn test_256k_is_single_region() {
        // AT32F403A CCT7
        let chip = resolve(0x7005_0242).unwrap();
        let geometry = compute_geometry(chip, MAIN_FLASH_BASE, None).unwrap();
        assert_eq!(geometry.regions[0].size, 256 * 1024);
        assert_eq!(geometry.regions[1].size, 0);
        assert!(!geometry.regions[1].is_present());
        assert_eq!(geometry.present_regions().count(), 1);
        assert_eq!(geometry.sector_count, 128);
        // 128 sectors, 31 pairs then one block with the remaining 66
        assert_eq!(geometry.protection_blocks.len(), 32);
        assert_eq!(geometry.protection_blocks[0], 4096);
        assert_eq!(geometry.protection_blocks[31], 66 * 2048);
    }

    #[test]
    fn test_large_device_uses_2m_threshold() {
        // AT32F435 CMT7, 4032 KiB
        let chip = resolve(0x7008_4549).unwrap();
        let geometry = compute_geometry(chip, MAIN_FLASH_BASE, None).unwrap();
        assert_eq!(geometry.regions[0].size, 2 * 1024 * 1024);
        assert_eq!(geometry.regions[1].size, (4032 - 2048) * 1024);
        assert_eq!(geometry.regions[1].register_base, 0x4002_3C40);
        check_sums(&geometry);
    }

    #[test]
    fn test_small_device_blocks_are_pairs() {
        // AT32F421 C4T7, 16 sectors of 1 KiB
        let chip = resolve(0x5001_000C).unwrap();
        let geometry = compute_geometry(chip, MAIN_FLASH_BASE, None).unwrap();
        assert_eq!(geometry.protection_blocks.len(), 8);
        assert!(geometry.protection_blocks.iter().all(|&b| b == 2048));
    }

    #[test]
    fn test_block_partition_remainders() {
        assert_eq!(protection_blocks(3, 1024).as_slice(), &[2048, 1024]);

        let blocks = protection_blocks(100, 1024);
        assert_eq!(blocks.len(), MAX_PROTECTION_BLOCKS);
        assert_eq!(blocks[30], 2048);
        assert_eq!(blocks[31], (100 - 62) * 1024);
        assert_eq!(blocks.iter().sum::<u32>(), 100 * 1024);
    }

    #[test]
    fn test_spim_geometry() {
        let chip = resolve(0x7005_0242).unwrap();
        let spim = SpimConfig {
            io_mux: 0,
            flash_type: 1,
            size: 0x10_0000,
        };
        let geometry = compute_geometry(chip, SPIM_FLASH_BASE, Some(&spim)).unwrap();
        assert_eq!(geometry.sector_size, 4096);
        assert_eq!(geometry.sector_count, 256);
        assert_eq!(geometry.regions[0].register_base, 0x4002_2080);
        assert_eq!(geometry.present_regions().count(), 1);
        check_sums(&geometry);
    }

    #[test]
    fn test_spim_size_must_be_whole_sectors() {
        let chip = resolve(0x7005_0242).unwrap();
        let spim = SpimConfig {
            io_mux: 0,
            flash_type: 1,
            size: 0x1800,
        };
        assert_eq!(
            compute_geometry(chip, SPIM_FLASH_BASE, Some(&spim)),
            Err(Error::InvalidGeometry {
                size: 0x1800,
                sector_size: 4096
            })
        );
        assert!(matches!(
            compute_geometry(chip, SPIM_FLASH_BASE, None),
            Err(Error::Syntax(_))
        ));
    }

    #[test]
    fn test_rejects_unknown_window() {
        let chip = resolve(0x7005_0242).unwrap();
        assert_eq!(
            compute_geometry(chip, 0x0810_0000, None),
            Err(Error::InvalidBankAddress(0x0810_0000))
        );
    }
}
