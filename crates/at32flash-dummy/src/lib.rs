//! at32flash-dummy - Emulated AT32F4xx debug target
//!
//! This crate provides an in-memory model of an AT32 part as seen through a
//! debug probe: main flash, the option-byte area, the external SPIM window,
//! the EFC register blocks with their unlock handshakes, scratch RAM for
//! working areas and the resident copy routine. It's useful for testing
//! and development without real hardware.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod config;
mod controller;

use alloc::vec;
use alloc::vec::Vec;

use at32flash_core::block_write::FLASH_WRITE_CODE;
use at32flash_core::chip::{self, ChipDescriptor, RegisterFamily, PRODUCT_ID_ADDR};
use at32flash_core::efc::regs::{
    EFC_ADDR, EFC_CTRL, EFC_EPPS, EFC_STS, EFC_UNLOCK, EFC_USD, EFC_USD_UNLOCK, FAP_DISABLED,
    USD_FAP,
};
use at32flash_core::efc::Status;
use at32flash_core::error::{Error, Result, TargetError};
use at32flash_core::geometry::{MAIN_FLASH_BASE, SPIM_FLASH_BASE};
use at32flash_core::target::{AlgorithmResult, AlgorithmRun, Target, WorkingArea};
use at32flash_core::usd::OptionBytes;
use log::debug;

pub use config::*;
use controller::{Controller, Operation};

/// Base of the emulated SRAM used for working areas
pub const RAM_BASE: u32 = 0x2000_0000;

const USD_HALFWORDS: usize = 8;
const ERRORS: u32 = Status::PRGMERR.bits() | Status::EPPERR.bits();

/// Operation counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DummyStats {
    /// Sector erases started
    pub sector_erases: u32,
    /// Region erases started
    pub bank_erases: u32,
    /// Option-byte erases started
    pub usd_erases: u32,
    /// Half-words written by the host with `write_u16`
    pub direct_writes: u32,
    /// Half-words written by the resident routine
    pub routine_writes: u32,
    /// Completed resident routine runs
    pub routine_runs: u32,
}

/// Fault injection switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DummyFaults {
    /// The busy flag never clears
    pub stuck_busy: bool,
    /// Status bits raised by every flash operation
    pub status_errors: u32,
}

/// Emulated AT32 target
pub struct DummyTarget {
    config: DummyConfig,
    chip: Option<&'static ChipDescriptor>,
    /// Size of main-flash region 0
    region0_size: u32,
    flash: Vec<u8>,
    spim: Vec<u8>,
    usd: [u16; USD_HALFWORDS],
    usd_base: u32,
    controllers: [Controller; 3],
    ram: Vec<u8>,
    areas: Vec<WorkingArea>,
    mmio: Vec<(u32, u32)>,
    bus_writes: Vec<(u32, u32)>,
    halted: bool,
    faults: DummyFaults,
    stats: DummyStats,
}

impl DummyTarget {
    /// Create a target with the given configuration
    ///
    /// Flash starts erased. The option bytes start erased too, except for the
    /// access protection byte which is 0xA5 (unprotected).
    pub fn new(config: DummyConfig) -> Self {
        let chip = chip::resolve(config.product_id);
        let total = chip.map_or(0, |c| c.total_size());
        let limit = match chip {
            Some(c) if c.flash_size_kb > 1024 => 2 * 1024 * 1024,
            _ => 512 * 1024,
        };
        let flash_reg = chip.map_or(RegisterFamily::LegacyFlashReg.base(), |c| c.family.flash_reg());
        let usd_base = chip.map_or(0x1FFF_F800, |c| c.option_byte_base());

        let mut target = Self {
            chip,
            region0_size: total.min(limit),
            flash: vec![0xFF; total as usize],
            spim: vec![0xFF; config.spim_size as usize],
            usd: [0xFFFF; USD_HALFWORDS],
            usd_base,
            controllers: [
                Controller::new(flash_reg),
                Controller::new(flash_reg + 0x40),
                Controller::new(flash_reg + 0x80),
            ],
            ram: vec![0; config.working_area_size as usize],
            areas: Vec::new(),
            mmio: Vec::new(),
            bus_writes: Vec::new(),
            halted: true,
            faults: DummyFaults::default(),
            stats: DummyStats::default(),
            config,
        };
        target.usd[0] = pack_usd(FAP_DISABLED);
        target
    }

    /// Create a target with the default configuration
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// Emulator configuration
    pub fn config(&self) -> &DummyConfig {
        &self.config
    }

    /// Chip the product id resolves to
    pub fn chip(&self) -> Option<&'static ChipDescriptor> {
        self.chip
    }

    /// Main flash contents
    pub fn flash(&self) -> &[u8] {
        &self.flash
    }

    /// Mutable main flash contents
    pub fn flash_mut(&mut self) -> &mut [u8] {
        &mut self.flash
    }

    /// SPIM memory contents
    pub fn spim(&self) -> &[u8] {
        &self.spim
    }

    /// Decoded option bytes
    pub fn option_bytes(&self) -> OptionBytes {
        let mut words = [0u32; 4];
        for (i, word) in words.iter_mut().enumerate() {
            *word = self.usd_word(i);
        }
        OptionBytes::from_words(words)
    }

    /// Replace the option bytes as if programmed earlier
    pub fn set_option_bytes(&mut self, bytes: &OptionBytes) {
        for (raw, half) in self.usd.iter_mut().zip(bytes.image()) {
            *raw = pack_usd(half as u8);
        }
    }

    /// Whether a controller block is locked (0/1 main regions, 2 SPIM)
    pub fn is_locked(&self, index: usize) -> bool {
        !self.controllers[index].is_unlocked()
    }

    /// Every 32-bit register write, in order
    pub fn bus_writes(&self) -> &[(u32, u32)] {
        &self.bus_writes
    }

    /// Values written to one register
    pub fn writes_to(&self, address: u32) -> Vec<u32> {
        self.bus_writes
            .iter()
            .filter(|(a, _)| *a == address)
            .map(|&(_, v)| v)
            .collect()
    }

    /// Forget recorded bus writes and counters
    pub fn clear_log(&mut self) {
        self.bus_writes.clear();
        self.stats = DummyStats::default();
    }

    /// Operation counters
    pub fn stats(&self) -> DummyStats {
        self.stats
    }

    /// Working areas currently allocated
    pub fn live_areas(&self) -> &[WorkingArea] {
        &self.areas
    }

    /// Halt or resume the emulated core
    pub fn set_halted(&mut self, halted: bool) {
        self.halted = halted;
    }

    /// Fault injection switches
    pub fn faults_mut(&mut self) -> &mut DummyFaults {
        &mut self.faults
    }

    /// Register base of controller `index`
    pub fn controller_base(&self, index: usize) -> u32 {
        self.controllers[index].base
    }

    // ------------------------------------------------------------------------
    // Address decoding
    // ------------------------------------------------------------------------

    fn main_offset(&self, address: u32) -> Option<usize> {
        let offset = address.checked_sub(MAIN_FLASH_BASE)? as usize;
        (offset < self.flash.len()).then_some(offset)
    }

    fn spim_offset(&self, address: u32) -> Option<usize> {
        let offset = address.checked_sub(SPIM_FLASH_BASE)? as usize;
        (offset < self.spim.len()).then_some(offset)
    }

    fn usd_index(&self, address: u32) -> Option<usize> {
        let offset = address.checked_sub(self.usd_base)? as usize;
        (offset < USD_HALFWORDS * 2).then_some(offset / 2)
    }

    fn ram_offset(&self, address: u32, len: usize) -> Option<usize> {
        let offset = address.checked_sub(RAM_BASE)? as usize;
        (offset + len <= self.ram.len()).then_some(offset)
    }

    fn controller_at(&self, address: u32) -> Option<usize> {
        self.controllers.iter().position(|c| c.contains(address))
    }

    fn main_controller(&self, offset: usize) -> usize {
        if (offset as u32) < self.region0_size {
            0
        } else {
            1
        }
    }

    fn usd_word(&self, index: usize) -> u32 {
        self.usd[2 * index] as u32 | (self.usd[2 * index + 1] as u32) << 16
    }

    fn sector_size(&self) -> u32 {
        self.chip.map_or(2048, |c| c.sector_size)
    }

    fn protection_bits(&self) -> u32 {
        self.option_bytes().protection
    }

    fn is_protected(&self, offset: usize) -> bool {
        let block = (offset as u32 / (2 * self.sector_size())).min(31);
        self.protection_bits() & (1 << block) == 0
    }

    fn range_protected(&self, range: core::ops::Range<usize>) -> bool {
        let step = self.sector_size() as usize;
        range.step_by(step).any(|offset| self.is_protected(offset))
    }

    fn read_byte(&self, address: u32) -> Option<u8> {
        if let Some(offset) = self.main_offset(address) {
            return Some(self.flash[offset]);
        }
        if let Some(offset) = self.spim_offset(address) {
            return Some(self.spim[offset]);
        }
        if let Some(index) = self.usd_index(address) {
            return Some(self.usd[index].to_le_bytes()[(address & 1) as usize]);
        }
        self.ram_offset(address, 1).map(|offset| self.ram[offset])
    }

    // ------------------------------------------------------------------------
    // Flash operations
    // ------------------------------------------------------------------------

    fn run_operation(&mut self, index: usize, op: Operation) {
        let mut errors = self.faults.status_errors;

        match op {
            Operation::SectorErase(address) => {
                self.stats.sector_erases += 1;
                let sector = self.sector_size() as usize;
                if index == 2 {
                    if let Some(offset) = self.spim_offset(address) {
                        let start = offset - offset % 4096;
                        let end = (start + 4096).min(self.spim.len());
                        self.spim[start..end].fill(0xFF);
                    }
                } else if let Some(offset) = self.main_offset(address) {
                    let start = offset - offset % sector;
                    if self.main_controller(start) != index {
                        debug!("sector erase at 0x{:08X} outside controller region", address);
                    } else if self.is_protected(start) {
                        errors |= Status::EPPERR.bits();
                    } else {
                        self.flash[start..start + sector].fill(0xFF);
                    }
                }
            }
            Operation::BankErase => {
                self.stats.bank_erases += 1;
                if index == 2 {
                    self.spim.fill(0xFF);
                } else {
                    let range = if index == 0 {
                        0..self.region0_size as usize
                    } else {
                        self.region0_size as usize..self.flash.len()
                    };
                    if self.range_protected(range.clone()) {
                        errors |= Status::EPPERR.bits();
                    } else {
                        self.flash[range].fill(0xFF);
                    }
                }
            }
            Operation::UsdErase => {
                self.stats.usd_erases += 1;
                self.usd = [0xFFFF; USD_HALFWORDS];
            }
        }

        let busy = self.config.busy_polls;
        self.controllers[index].finish(errors, busy);
    }

    /// Program one half-word, returning the controller that owns it
    fn program(&mut self, address: u32, value: u16) -> Result<usize> {
        let mut errors = self.faults.status_errors;

        let index = if let Some(offset) = self.main_offset(address) {
            let index = self.main_controller(offset);
            let current = u16::from_le_bytes([self.flash[offset], self.flash[offset + 1]]);
            if !self.controllers[index].can_program() {
                errors |= Status::PRGMERR.bits();
            } else if self.is_protected(offset) {
                errors |= Status::EPPERR.bits();
            } else if current != 0xFFFF {
                errors |= Status::PRGMERR.bits();
            } else {
                self.flash[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
            }
            index
        } else if let Some(offset) = self.spim_offset(address) {
            if !self.controllers[2].can_program() {
                errors |= Status::PRGMERR.bits();
            } else {
                // NOR semantics: bits only go from 1 to 0
                self.spim[offset] &= value as u8;
                self.spim[offset + 1] &= (value >> 8) as u8;
            }
            2
        } else if let Some(slot) = self.usd_index(address) {
            if !self.controllers[0].can_program_usd() || self.usd[slot] != 0xFFFF {
                errors |= Status::PRGMERR.bits();
            } else {
                self.usd[slot] = pack_usd(value as u8);
            }
            0
        } else {
            return Err(TargetError::Write { address }.into());
        };

        let busy = self.config.busy_polls;
        self.controllers[index].finish(errors, busy);
        Ok(index)
    }

    fn read_register(&mut self, index: usize, offset: u32) -> u32 {
        let stuck = self.faults.stuck_busy;
        match offset {
            EFC_STS => self.controllers[index].read_status(stuck),
            EFC_CTRL => self.controllers[index].ctrl,
            EFC_ADDR => self.controllers[index].addr,
            EFC_EPPS => self.protection_bits(),
            EFC_USD => {
                let fap = self.option_bytes().fap;
                u32::from(fap != FAP_DISABLED) << USD_FAP
            }
            _ => 0,
        }
    }

    fn write_register(&mut self, index: usize, offset: u32, value: u32) {
        match offset {
            EFC_UNLOCK => self.controllers[index].write_unlock(value),
            // the SPIM block has its flash type select here
            EFC_USD_UNLOCK if index == 2 => {}
            EFC_USD_UNLOCK => self.controllers[index].write_usd_unlock(value),
            EFC_STS => self.controllers[index].clear_status(value),
            EFC_ADDR => self.controllers[index].addr = value,
            EFC_CTRL => {
                if let Some(op) = self.controllers[index].write_ctrl(value) {
                    self.run_operation(index, op);
                }
            }
            _ => {}
        }
    }
}

/// Store a byte with its complement as the option-byte hardware does
fn pack_usd(value: u8) -> u16 {
    u16::from(value) | u16::from(!value) << 8
}

impl Default for DummyTarget {
    fn default() -> Self {
        Self::new_default()
    }
}

impl Target for DummyTarget {
    fn is_halted(&mut self) -> bool {
        self.halted
    }

    fn read_u32(&mut self, address: u32) -> Result<u32> {
        if address == PRODUCT_ID_ADDR {
            return Ok(self.config.product_id);
        }
        if let Some(index) = self.controller_at(address) {
            let base = self.controllers[index].base;
            return Ok(self.read_register(index, address - base));
        }
        if let Some(slot) = self.usd_index(address) {
            return Ok(self.usd_word(slot / 2));
        }
        if self.main_offset(address).is_some()
            || self.spim_offset(address).is_some()
            || self.ram_offset(address, 4).is_some()
        {
            let mut word = [0u8; 4];
            self.read_buffer(address, &mut word)?;
            return Ok(u32::from_le_bytes(word));
        }
        Ok(self
            .mmio
            .iter()
            .rev()
            .find(|(a, _)| *a == address)
            .map_or(0, |&(_, v)| v))
    }

    fn write_u32(&mut self, address: u32, value: u32) -> Result<()> {
        self.bus_writes.push((address, value));

        if let Some(index) = self.controller_at(address) {
            let base = self.controllers[index].base;
            self.write_register(index, address - base, value);
            return Ok(());
        }
        if let Some(offset) = self.ram_offset(address, 4) {
            self.ram[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
            return Ok(());
        }
        if self.main_offset(address).is_some() || self.usd_index(address).is_some() {
            return Err(TargetError::Write { address }.into());
        }
        self.mmio.push((address, value));
        Ok(())
    }

    fn write_u16(&mut self, address: u32, value: u16) -> Result<()> {
        self.program(address, value)?;
        self.stats.direct_writes += 1;
        Ok(())
    }

    fn read_buffer(&mut self, address: u32, buf: &mut [u8]) -> Result<()> {
        for (i, byte) in buf.iter_mut().enumerate() {
            let addr = address + i as u32;
            *byte = self
                .read_byte(addr)
                .ok_or(Error::Target(TargetError::Read { address: addr }))?;
        }
        Ok(())
    }

    fn write_buffer(&mut self, address: u32, data: &[u8]) -> Result<()> {
        let offset = self
            .ram_offset(address, data.len())
            .ok_or(Error::Target(TargetError::Write { address }))?;
        self.ram[offset..offset + data.len()].copy_from_slice(data);
        Ok(())
    }

    fn alloc_working_area(&mut self, size: u32) -> Result<WorkingArea> {
        let size = (size + 3) & !3;
        let mut address = RAM_BASE;
        let mut sorted = self.areas.clone();
        sorted.sort_by_key(|a| a.address);
        for area in &sorted {
            if area.address >= address + size {
                break;
            }
            address = area.end();
        }
        if address + size > RAM_BASE + self.ram.len() as u32 {
            debug!("no {} byte working area left", size);
            return Err(Error::ResourceUnavailable);
        }
        let area = WorkingArea { address, size };
        self.areas.push(area);
        Ok(area)
    }

    fn free_working_area(&mut self, area: WorkingArea) {
        self.areas.retain(|a| a.address != area.address);
    }

    fn run_flash_async_algorithm(&mut self, run: &AlgorithmRun<'_>) -> Result<AlgorithmResult> {
        let code = run.code;
        let uploaded = self
            .ram_offset(code.address, FLASH_WRITE_CODE.len())
            .map(|o| self.ram[o..o + FLASH_WRITE_CODE.len()] == FLASH_WRITE_CODE)
            .unwrap_or(false);
        if !uploaded || !self.areas.contains(&run.fifo) {
            return Err(TargetError::Algorithm.into());
        }

        let [reg_base, count, fifo_start, fifo_end, dest] = run.registers;
        if fifo_start != run.fifo.address || fifo_end != run.fifo.end() {
            return Err(TargetError::Algorithm.into());
        }
        let index = self
            .controllers
            .iter()
            .position(|c| c.base == reg_base)
            .ok_or(TargetError::Algorithm)?;

        for i in 0..count {
            if self.faults.stuck_busy {
                return Err(TargetError::Algorithm.into());
            }
            let at = 2 * i as usize;
            let value = u16::from_le_bytes([run.data[at], run.data[at + 1]]);
            let address = dest + 2 * i;
            let owner = self.program(address, value)?;
            self.stats.routine_writes += 1;
            if owner != index {
                debug!(
                    "routine polls controller {} but 0x{:08X} belongs to controller {}",
                    index, address, owner
                );
            }

            let controller = &mut self.controllers[owner];
            controller.settle();
            if controller.sts & ERRORS != 0 {
                return Ok(AlgorithmResult::FlashOperationFailed {
                    status: controller.sts,
                    address,
                });
            }
        }

        self.stats.routine_runs += 1;
        Ok(AlgorithmResult::Completed)
    }

    fn delay_ms(&mut self, _ms: u32) {
        // No delay needed for in-memory operations
    }
}
