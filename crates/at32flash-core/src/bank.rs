//! Flash bank operations
//!
//! [`FlashBank`] owns everything the driver learns about one bank: the
//! resolved chip, the geometry computed at probe time, the sector and
//! protection-block tables and the cached option bytes. Every operation takes
//! the debug target explicitly.

use alloc::borrow::Cow;
use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use log::{error, info, warn};

use crate::block_write;
use crate::chip::{self, ChipDescriptor, PRODUCT_ID_ADDR};
use crate::config::BankConfig;
use crate::efc::{Ctrl, Efc};
use crate::error::{Error, Result};
use crate::geometry::{compute_geometry, BankGeometry, BankKind, Region};
use crate::spim;
use crate::target::Target;
use crate::usd::{OptionByteArea, OptionBytes, FAP_DISABLED};

/// Value of erased flash
pub const ERASED_VALUE: u8 = 0xFF;

/// One erase unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sector {
    /// Offset from the bank base
    pub offset: u32,
    /// Size in bytes
    pub size: u32,
    /// Erase state, `None` until known
    pub is_erased: Option<bool>,
}

/// One write-protection block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtectionBlock {
    /// Offset from the bank base
    pub offset: u32,
    /// Size in bytes
    pub size: u32,
    /// Protection state, `None` until checked
    pub is_protected: Option<bool>,
}

/// A flash bank on an AT32 target
#[derive(Debug, Clone)]
pub struct FlashBank {
    config: BankConfig,
    product_id: u32,
    chip: Option<&'static ChipDescriptor>,
    geometry: Option<BankGeometry>,
    sectors: Vec<Sector>,
    protection_blocks: Vec<ProtectionBlock>,
    option_bytes: OptionBytes,
}

impl FlashBank {
    /// Create an unprobed bank
    pub fn new(config: BankConfig) -> Self {
        Self {
            config,
            product_id: 0,
            chip: None,
            geometry: None,
            sectors: Vec::new(),
            protection_blocks: Vec::new(),
            option_bytes: OptionBytes::default(),
        }
    }

    /// Bank parameters
    pub fn config(&self) -> &BankConfig {
        &self.config
    }

    /// Bank base address
    pub fn base(&self) -> u32 {
        self.config.base
    }

    /// Whether geometry is known
    pub fn is_probed(&self) -> bool {
        self.geometry.is_some()
    }

    /// Product id read at the last probe
    pub fn product_id(&self) -> u32 {
        self.product_id
    }

    /// Resolved chip, once probed
    pub fn chip(&self) -> Option<&'static ChipDescriptor> {
        self.chip
    }

    /// Geometry, once probed
    pub fn geometry(&self) -> Option<&BankGeometry> {
        self.geometry.as_ref()
    }

    /// Bank size in bytes, 0 before probe
    pub fn size(&self) -> u32 {
        self.geometry.as_ref().map_or(0, |g| g.total_size)
    }

    /// Sector table
    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    /// Protection block table
    pub fn protection_blocks(&self) -> &[ProtectionBlock] {
        &self.protection_blocks
    }

    /// Option bytes as last read or written
    pub fn option_bytes(&self) -> &OptionBytes {
        &self.option_bytes
    }

    fn probed(&self) -> Result<(&'static ChipDescriptor, &BankGeometry)> {
        match (self.chip, self.geometry.as_ref()) {
            (Some(chip), Some(geometry)) => Ok((chip, geometry)),
            _ => {
                error!("flash bank 0x{:08X} not probed", self.base());
                Err(Error::NotProbed)
            }
        }
    }

    fn require_halted<T: Target + ?Sized>(target: &mut T) -> Result<()> {
        if target.is_halted() {
            Ok(())
        } else {
            error!("Target not halted");
            Err(Error::TargetNotHalted)
        }
    }

    /// Controller of main-flash region 0, which also owns the option bytes
    fn main_efc(chip: &'static ChipDescriptor) -> Efc {
        Efc::new(chip.family.flash_reg(), chip)
    }

    fn option_byte_area(chip: &'static ChipDescriptor) -> OptionByteArea {
        OptionByteArea::new(Self::main_efc(chip), chip.option_byte_base())
    }

    fn require_main_flash(&self, chip: &'static ChipDescriptor) -> Result<()> {
        match BankKind::from_base(self.config.base)? {
            BankKind::Main => Ok(()),
            BankKind::Spim => {
                error!("{}: SPIM memory has no write protection blocks", chip);
                Err(Error::Unsupported("write protection of SPIM memory"))
            }
        }
    }

    // ========================================================================
    // Probe
    // ========================================================================

    /// Identify the chip and rebuild the bank geometry
    pub fn probe<T: Target + ?Sized>(&mut self, target: &mut T) -> Result<()> {
        let product_id = target.read_u32(PRODUCT_ID_ADDR)?;
        let chip = chip::resolve(product_id).ok_or_else(|| {
            error!("unknown AT32 product id 0x{:08X}", product_id);
            Error::UnknownProductId(product_id)
        })?;

        let kind = BankKind::from_base(self.config.base).map_err(|e| {
            error!("Invalid flash bank address: 0x{:08X}", self.config.base);
            e
        })?;

        if kind == BankKind::Spim {
            let spim = self
                .config
                .spim
                .ok_or(Error::Syntax("SPIM bank needs io_mux, type and size"))?;
            spim::enable(target, chip, &spim)?;
        }

        let geometry = compute_geometry(chip, self.config.base, self.config.spim.as_ref())
            .map_err(|e| {
                error!("{}: {}", chip, e);
                e
            })?;

        if self.config.size != 0 && self.config.size != geometry.total_size {
            warn!(
                "{}: ignoring declared bank size 0x{:x}, probed size is 0x{:x}",
                chip, self.config.size, geometry.total_size
            );
        }

        if kind == BankKind::Main {
            info!(
                "{}: main flash size: {}kB, sector size: {}",
                chip,
                geometry.total_size >> 10,
                geometry.sector_size
            );
        }
        for (i, region) in geometry.present_regions().enumerate() {
            info!(" ... sub-bank[{}] size: {}kB", i, region.size >> 10);
        }

        self.sectors = (0..geometry.sector_count)
            .map(|i| Sector {
                offset: i * geometry.sector_size,
                size: geometry.sector_size,
                is_erased: None,
            })
            .collect();

        let mut offset = 0;
        self.protection_blocks = geometry
            .protection_blocks
            .iter()
            .map(|&size| {
                let block = ProtectionBlock {
                    offset,
                    size,
                    is_protected: None,
                };
                offset += size;
                block
            })
            .collect();

        self.product_id = product_id;
        self.chip = Some(chip);
        self.geometry = Some(geometry);
        Ok(())
    }

    /// Probe unless already probed
    pub fn auto_probe<T: Target + ?Sized>(&mut self, target: &mut T) -> Result<()> {
        if self.is_probed() {
            return Ok(());
        }
        self.probe(target)
    }

    // ========================================================================
    // Erase
    // ========================================================================

    /// Erase sectors `first..=last`
    ///
    /// The whole bank is erased with one mass erase per region. Otherwise the
    /// range is split across regions; a region covered completely is mass
    /// erased, the rest sector by sector.
    pub fn erase<T: Target + ?Sized>(&mut self, target: &mut T, first: u32, last: u32) -> Result<()> {
        info!("Erase first sector = {}, last sector = {}", first, last);
        Self::require_halted(target)?;
        let (chip, geometry) = self.probed()?;

        if first > last || last >= geometry.sector_count {
            error!("{}: invalid sector range {}..={}", chip, first, last);
            return Err(Error::InvalidSectorRange { first, last });
        }

        if first == 0 && last == geometry.sector_count - 1 {
            return self.mass_erase(target);
        }

        let regions = geometry.regions;
        let mut region_first = 0;
        for region in regions.iter().filter(|r| r.is_present()) {
            let region_last = region_first + region.sector_count - 1;
            if first <= region_last && last >= region_first {
                let lo = first.max(region_first) - region_first;
                let hi = last.min(region_last) - region_first;
                self.erase_region_sectors(target, chip, region, region_first, lo, hi)?;
            }
            region_first += region.sector_count;
        }

        Ok(())
    }

    fn erase_region_sectors<T: Target + ?Sized>(
        &mut self,
        target: &mut T,
        chip: &'static ChipDescriptor,
        region: &Region,
        index_base: u32,
        first: u32,
        last: u32,
    ) -> Result<()> {
        if first == 0 && last == region.sector_count - 1 {
            return self.erase_whole_region(target, chip, region, index_base);
        }

        let efc = Efc::for_region(region, chip);
        let region_address = self.config.base + region.base_offset;
        let sector_size = region.size / region.sector_count;
        let sectors = &mut self.sectors[index_base as usize..];

        efc.with_unlocked(target, |t| {
            for i in first..=last {
                efc.erase_sector(t, region_address + i * sector_size)?;
                sectors[i as usize].is_erased = Some(true);
            }
            Ok(())
        })
        .map_err(|e| {
            error!(
                "{}: failed to erase sectors {}..={} at 0x{:08X}: {}",
                chip,
                index_base + first,
                index_base + last,
                region_address,
                e
            );
            e
        })
    }

    fn erase_whole_region<T: Target + ?Sized>(
        &mut self,
        target: &mut T,
        chip: &'static ChipDescriptor,
        region: &Region,
        index_base: u32,
    ) -> Result<()> {
        Efc::for_region(region, chip)
            .erase_region(target)
            .map_err(|e| {
                error!(
                    "{}: failed to erase region at 0x{:08X}: {}",
                    chip,
                    self.config.base + region.base_offset,
                    e
                );
                e
            })?;
        self.mark_erased(index_base..index_base + region.sector_count);
        Ok(())
    }

    fn mark_erased(&mut self, range: core::ops::Range<u32>) {
        for sector in &mut self.sectors[range.start as usize..range.end as usize] {
            sector.is_erased = Some(true);
        }
    }

    /// Erase every region of the bank
    pub fn mass_erase<T: Target + ?Sized>(&mut self, target: &mut T) -> Result<()> {
        info!("flash bank 0x{:08X} mass erase", self.base());
        Self::require_halted(target)?;
        let (chip, geometry) = self.probed()?;

        let regions = geometry.regions;
        let mut index_base = 0;
        for region in regions.iter().filter(|r| r.is_present()) {
            self.erase_whole_region(target, chip, region, index_base)?;
            index_base += region.sector_count;
        }

        Ok(())
    }

    // ========================================================================
    // Write / read
    // ========================================================================

    /// Program `data` at `offset` from the bank base
    ///
    /// The offset must be half-word aligned. An odd-length buffer is padded
    /// with one 0xFF byte; `data` itself is left untouched.
    pub fn write<T: Target + ?Sized>(&mut self, target: &mut T, data: &[u8], offset: u32) -> Result<()> {
        Self::require_halted(target)?;
        let (chip, geometry) = self.probed()?;

        if offset % 2 != 0 {
            error!(
                "{}: offset 0x{:x} breaks required 2-byte alignment",
                chip, offset
            );
            return Err(Error::UnalignedOffset { offset });
        }

        let buffer: Cow<'_, [u8]> = if data.len() % 2 != 0 {
            let mut padded = Vec::with_capacity(data.len() + 1);
            padded.extend_from_slice(data);
            padded.push(ERASED_VALUE);
            Cow::Owned(padded)
        } else {
            Cow::Borrowed(data)
        };

        let len = buffer.len() as u32;
        if offset > geometry.total_size || len > geometry.total_size - offset {
            error!(
                "{}: write of {} bytes at 0x{:x} exceeds bank size 0x{:x}",
                chip, len, offset, geometry.total_size
            );
            return Err(Error::OutOfBounds { offset, len });
        }

        let regions = geometry.regions;
        let sector_size = geometry.sector_size;
        let mut offset = offset;
        let mut remaining: &[u8] = &buffer;

        for region in regions.iter().filter(|r| r.is_present()) {
            if remaining.is_empty() {
                break;
            }
            if offset >= region.end_offset() {
                continue;
            }

            let room = (region.end_offset() - offset) as usize;
            let (chunk, rest) = remaining.split_at(remaining.len().min(room));

            Self::write_region(target, chip, region, chunk, self.config.base + offset)?;

            let first = offset / sector_size;
            let last = (offset + chunk.len() as u32 - 1) / sector_size;
            for sector in &mut self.sectors[first as usize..=last as usize] {
                sector.is_erased = Some(false);
            }

            offset += chunk.len() as u32;
            remaining = rest;
        }

        Ok(())
    }

    fn write_region<T: Target + ?Sized>(
        target: &mut T,
        chip: &'static ChipDescriptor,
        region: &Region,
        data: &[u8],
        address: u32,
    ) -> Result<()> {
        let efc = Efc::for_region(region, chip);
        efc.with_unlocked(target, |t| {
            efc.set_ctrl(t, Ctrl::FPRGM)?;
            block_write::program(t, &efc, data, address)
        })
        .map_err(|e| {
            error!(
                "{}: failed to write {} bytes at 0x{:08X}: {}",
                chip,
                data.len(),
                address,
                e
            );
            e
        })
    }

    /// Read `buf.len()` bytes starting at `offset`
    pub fn read<T: Target + ?Sized>(&self, target: &mut T, offset: u32, buf: &mut [u8]) -> Result<()> {
        let (chip, geometry) = self.probed()?;
        let len = buf.len() as u32;
        if offset > geometry.total_size || len > geometry.total_size - offset {
            error!(
                "{}: read of {} bytes at 0x{:x} exceeds bank size 0x{:x}",
                chip, len, offset, geometry.total_size
            );
            return Err(Error::OutOfBounds { offset, len });
        }
        target.read_buffer(self.config.base + offset, buf)
    }

    /// Blank check every sector
    ///
    /// Updates each sector's erase state and returns the number of erased
    /// sectors.
    pub fn erase_check<T: Target + ?Sized>(&mut self, target: &mut T) -> Result<u32> {
        Self::require_halted(target)?;
        let (_, geometry) = self.probed()?;

        let mut buf = vec![0u8; geometry.sector_size as usize];
        let mut erased = 0;
        for sector in self.sectors.iter_mut() {
            target.read_buffer(self.config.base + sector.offset, &mut buf)?;
            let blank = buf.iter().all(|&b| b == ERASED_VALUE);
            sector.is_erased = Some(blank);
            erased += u32::from(blank);
        }

        Ok(erased)
    }

    // ========================================================================
    // Protection
    // ========================================================================

    /// Set or clear write protection of blocks `first..=last`
    ///
    /// Rewrites the whole option-byte area. All other option-byte fields are
    /// read back first and programmed again unchanged.
    pub fn protect<T: Target + ?Sized>(
        &mut self,
        target: &mut T,
        enable: bool,
        first: u32,
        last: u32,
    ) -> Result<()> {
        Self::require_halted(target)?;
        let (chip, _) = self.probed()?;
        self.require_main_flash(chip)?;

        if first > last || last as usize >= self.protection_blocks.len() {
            error!("{}: invalid protection block range {}..={}", chip, first, last);
            return Err(Error::InvalidBlockRange { first, last });
        }

        let area = Self::option_byte_area(chip);
        let mut option_bytes = area.read(target)?;
        self.option_bytes = option_bytes;

        area.erase(target).map_err(|e| {
            error!("{} failed to erase options", chip);
            e
        })?;

        option_bytes.set_protection(enable, first, last);
        area.write(target, &option_bytes)?;
        self.option_bytes = option_bytes;

        for block in &mut self.protection_blocks[first as usize..=last as usize] {
            block.is_protected = Some(enable);
        }
        Ok(())
    }

    /// Refresh protection flags from EFC_EPPS
    ///
    /// Only main-flash banks carry protection blocks.
    pub fn protect_check<T: Target + ?Sized>(&mut self, target: &mut T) -> Result<()> {
        let (chip, _) = self.probed()?;
        self.require_main_flash(chip)?;
        let protection = Self::main_efc(chip).protection_status(target)?;

        for (i, block) in self.protection_blocks.iter_mut().enumerate() {
            block.is_protected = Some(protection & (1 << i) == 0);
        }
        Ok(())
    }

    /// Read the option bytes into the cache
    pub fn read_option_bytes<T: Target + ?Sized>(&mut self, target: &mut T) -> Result<OptionBytes> {
        let (chip, _) = self.probed()?;
        self.option_bytes = Self::option_byte_area(chip).read(target)?;
        Ok(self.option_bytes)
    }

    /// Turn off flash access protection
    ///
    /// Erases the option-byte area and reprograms it with the access
    /// protection byte set to 0xA5. Other fields keep their values.
    pub fn disable_access_protection<T: Target + ?Sized>(&mut self, target: &mut T) -> Result<()> {
        Self::require_halted(target)?;
        let (chip, _) = self.probed()?;

        let area = Self::option_byte_area(chip);
        let mut option_bytes = area.read(target)?;
        self.option_bytes = option_bytes;

        area.erase(target).map_err(|e| {
            error!("{} failed to erase usd", chip);
            e
        })?;

        option_bytes.fap = FAP_DISABLED;
        area.write(target, &option_bytes).map_err(|e| {
            error!("{} failed to write usd", chip);
            e
        })?;
        self.option_bytes = option_bytes;

        info!("AT32x disable access protection complete");
        Ok(())
    }

    // ========================================================================
    // Info
    // ========================================================================

    /// Human readable description of the probed bank
    pub fn info(&self) -> Result<String> {
        let (chip, geometry) = self.probed()?;

        let mut out = format!(
            "{} (product id 0x{:08X}) at 0x{:08X}: {} KiB, {} sectors of {} bytes, {} protection blocks",
            chip,
            self.product_id,
            self.base(),
            geometry.total_size >> 10,
            geometry.sector_count,
            geometry.sector_size,
            geometry.protection_blocks.len(),
        );
        for (i, region) in geometry.present_regions().enumerate() {
            out.push_str(&format!(
                "\n  region {}: 0x{:08X}-0x{:08X} ({} KiB), EFC at 0x{:08X}",
                i,
                self.base() + region.base_offset,
                self.base() + region.end_offset() - 1,
                region.size >> 10,
                region.register_base,
            ));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::efc::regs::{EFC_CTRL, EFC_STS};
    use crate::efc::Status;
    use crate::target::mock::MockTarget;

    const CCT7: u32 = 0x7005_0242;

    fn probed(pid: u32) -> (FlashBank, MockTarget) {
        let mut target = MockTarget::new();
        target.set_word(PRODUCT_ID_ADDR, pid);
        let mut bank = FlashBank::new(BankConfig::main(0x0800_0000));
        bank.probe(&mut target).unwrap();
        target.log.clear();
        (bank, target)
    }

    #[test]
    fn test_probe_builds_tables() {
        let (bank, _) = probed(CCT7);
        assert_eq!(bank.sectors().len(), 128);
        assert_eq!(bank.sectors()[1].offset, 2048);
        assert_eq!(bank.protection_blocks().len(), 32);
        assert_eq!(bank.protection_blocks()[31].offset, 31 * 4096);
        let covered: u32 = bank.protection_blocks().iter().map(|b| b.size).sum();
        assert_eq!(covered, bank.size());
    }

    #[test]
    fn test_probe_unknown_id() {
        let mut target = MockTarget::new();
        target.set_word(PRODUCT_ID_ADDR, 0x1234_5678);
        let mut bank = FlashBank::new(BankConfig::main(0x0800_0000));
        assert_eq!(bank.probe(&mut target), Err(Error::UnknownProductId(0x1234_5678)));
        assert!(!bank.is_probed());
    }

    #[test]
    fn test_auto_probe_is_idempotent() {
        let (mut bank, mut target) = probed(CCT7);
        bank.auto_probe(&mut target).unwrap();
        assert!(target.log.is_empty());
    }

    #[test]
    fn test_operations_need_probe() {
        let mut target = MockTarget::new();
        let mut bank = FlashBank::new(BankConfig::main(0x0800_0000));
        assert_eq!(bank.erase(&mut target, 0, 0), Err(Error::NotProbed));
        assert_eq!(bank.info(), Err(Error::NotProbed));
    }

    #[test]
    fn test_whole_bank_erase_is_one_mass_erase() {
        let (mut bank, mut target) = probed(CCT7);
        bank.erase(&mut target, 0, 127).unwrap();
        assert_eq!(
            target.writes_to(0x4002_2000 + EFC_CTRL),
            [
                Ctrl::BANKERS.bits(),
                (Ctrl::BANKERS | Ctrl::ERSTR).bits(),
                Ctrl::OPLK.bits(),
            ]
        );
        assert!(bank.sectors().iter().all(|s| s.is_erased == Some(true)));
    }

    #[test]
    fn test_partial_erase_unlocks_once() {
        let (mut bank, mut target) = probed(CCT7);
        bank.erase(&mut target, 2, 4).unwrap();

        let ctrl = target.writes_to(0x4002_2000 + EFC_CTRL);
        assert_eq!(ctrl.len(), 7);
        assert_eq!(ctrl.iter().filter(|&&v| v == Ctrl::OPLK.bits()).count(), 1);
        assert_eq!(
            target.writes_to(0x4002_2014),
            [0x0800_1000, 0x0800_1800, 0x0800_2000]
        );
        assert_eq!(bank.sectors()[2].is_erased, Some(true));
        assert_eq!(bank.sectors()[5].is_erased, None);
    }

    #[test]
    fn test_erase_rejects_bad_range() {
        let (mut bank, mut target) = probed(CCT7);
        assert_eq!(
            bank.erase(&mut target, 5, 4),
            Err(Error::InvalidSectorRange { first: 5, last: 4 })
        );
        assert_eq!(
            bank.erase(&mut target, 0, 128),
            Err(Error::InvalidSectorRange { first: 0, last: 128 })
        );
        assert!(target.log.is_empty());
    }

    #[test]
    fn test_operations_need_halted_target() {
        let (mut bank, mut target) = probed(CCT7);
        target.halted = false;
        assert_eq!(bank.erase(&mut target, 0, 1), Err(Error::TargetNotHalted));
        assert_eq!(bank.write(&mut target, &[0; 2], 0), Err(Error::TargetNotHalted));
        assert_eq!(bank.protect(&mut target, true, 0, 0), Err(Error::TargetNotHalted));
        assert_eq!(bank.mass_erase(&mut target), Err(Error::TargetNotHalted));
        assert!(target.log.is_empty());
    }

    #[test]
    fn test_unaligned_write() {
        let (mut bank, mut target) = probed(CCT7);
        assert_eq!(
            bank.write(&mut target, &[0; 4], 3),
            Err(Error::UnalignedOffset { offset: 3 })
        );
        assert!(target.log.is_empty());
    }

    #[test]
    fn test_write_out_of_bounds() {
        let (mut bank, mut target) = probed(CCT7);
        assert_eq!(
            bank.write(&mut target, &[0; 4], 256 * 1024 - 2),
            Err(Error::OutOfBounds {
                offset: 256 * 1024 - 2,
                len: 4
            })
        );
    }

    #[test]
    fn test_sector_erase_timeout_relocks() {
        let (mut bank, mut target) = probed(CCT7);
        target.set_word(0x4002_2000 + EFC_STS, Status::OBF.bits());
        assert_eq!(bank.erase(&mut target, 1, 3), Err(Error::Timeout));
        let ctrl = target.writes_to(0x4002_2000 + EFC_CTRL);
        assert_eq!(ctrl.last(), Some(&Ctrl::OPLK.bits()));
        assert_eq!(ctrl.iter().filter(|&&v| v == Ctrl::OPLK.bits()).count(), 1);
        assert_eq!(bank.sectors()[1].is_erased, None);
    }

    #[test]
    fn test_mass_erase_keeps_flags_of_erased_regions() {
        let (mut bank, mut target) = probed(0x7005_0346);
        target.fail_writes_to(0x4002_2040 + EFC_CTRL);

        assert!(matches!(bank.mass_erase(&mut target), Err(Error::Target(_))));
        assert_eq!(
            target.writes_to(0x4002_2000 + EFC_CTRL),
            [0x04, 0x44, Ctrl::OPLK.bits()]
        );
        assert!(bank.sectors()[..256].iter().all(|s| s.is_erased == Some(true)));
        assert!(bank.sectors()[256..].iter().all(|s| s.is_erased.is_none()));
    }

    #[test]
    fn test_read_out_of_bounds() {
        let (bank, mut target) = probed(CCT7);
        let mut buf = [0u8; 8];
        assert_eq!(
            bank.read(&mut target, 256 * 1024 - 4, &mut buf),
            Err(Error::OutOfBounds {
                offset: 256 * 1024 - 4,
                len: 8
            })
        );
        assert!(target.log.is_empty());
    }

    #[test]
    fn test_protect_stops_when_option_erase_fails() {
        let (mut bank, mut target) = probed(CCT7);
        let usd = bank.chip().unwrap().option_byte_base();
        target.set_word(usd, 0x00FF_5AA5);
        for i in 1..4 {
            target.set_word(usd + 4 * i, 0x00FF_00FF);
        }
        target.set_word(0x4002_2000 + EFC_STS, Status::OBF.bits());

        assert_eq!(bank.protect(&mut target, true, 0, 0), Err(Error::Timeout));

        let ctrl = target.writes_to(0x4002_2000 + EFC_CTRL);
        assert!(ctrl.iter().all(|&v| v & Ctrl::USDPRGM.bits() == 0));
        assert_eq!(ctrl.last(), Some(&Ctrl::OPLK.bits()));
        assert!(target.halfword_writes().is_empty());
        assert!(target.runs.is_empty());
        assert_eq!(bank.option_bytes().protection, 0xFFFF_FFFF);
        assert_eq!(bank.protection_blocks()[0].is_protected, None);
    }

    #[test]
    fn test_protect_check_inverts_bits() {
        let (mut bank, mut target) = probed(CCT7);
        target.set_word(0x4002_2020, 0xFFFF_FFFA);
        bank.protect_check(&mut target).unwrap();
        let flags: Vec<_> = bank.protection_blocks()[..4]
            .iter()
            .map(|b| b.is_protected)
            .collect();
        assert_eq!(flags, [Some(true), Some(false), Some(true), Some(false)]);
    }

    #[test]
    fn test_info() {
        let (bank, _) = probed(0x7005_0346);
        let info = bank.info().unwrap();
        assert!(info.starts_with("AT32F403ACGT7 (product id 0x70050346)"));
        assert!(info.contains("region 1: 0x08080000-0x080FFFFF (512 KiB), EFC at 0x40022040"));
    }
}
