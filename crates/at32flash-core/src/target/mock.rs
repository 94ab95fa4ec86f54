//! Recording target for unit tests

use alloc::collections::{BTreeMap, BTreeSet, VecDeque};
use alloc::vec::Vec;

use super::{AlgorithmResult, AlgorithmRun, Target, WorkingArea};
use crate::error::{Error, Result, TargetError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Access {
    Read32(u32),
    Write32(u32, u32),
    Write16(u32, u16),
    WriteBuffer(u32, usize),
}

/// Register bus double
///
/// Reads return scripted values first, then the last value written or set
/// with `set_word`, then zero.
pub(crate) struct MockTarget {
    pub halted: bool,
    pub log: Vec<Access>,
    pub delays: u32,
    pub ram_free: u32,
    pub live_areas: Vec<WorkingArea>,
    pub algorithm_result: AlgorithmResult,
    pub runs: Vec<[u32; 5]>,
    words: BTreeMap<u32, u32>,
    scripted: BTreeMap<u32, VecDeque<u32>>,
    failing_writes: BTreeSet<u32>,
    next_area: u32,
}

impl MockTarget {
    pub fn new() -> Self {
        Self {
            halted: true,
            log: Vec::new(),
            delays: 0,
            ram_free: 0x8000,
            live_areas: Vec::new(),
            algorithm_result: AlgorithmResult::Completed,
            runs: Vec::new(),
            words: BTreeMap::new(),
            scripted: BTreeMap::new(),
            failing_writes: BTreeSet::new(),
            next_area: 0x2000_0000,
        }
    }

    pub fn set_word(&mut self, address: u32, value: u32) {
        self.words.insert(address, value);
    }

    pub fn script_reads(&mut self, address: u32, values: &[u32]) {
        self.scripted
            .entry(address)
            .or_default()
            .extend(values.iter().copied());
    }

    pub fn fail_writes_to(&mut self, address: u32) {
        self.failing_writes.insert(address);
    }

    pub fn writes_to(&self, address: u32) -> Vec<u32> {
        self.log
            .iter()
            .filter_map(|a| match *a {
                Access::Write32(addr, value) if addr == address => Some(value),
                _ => None,
            })
            .collect()
    }

    pub fn halfword_writes(&self) -> Vec<(u32, u16)> {
        self.log
            .iter()
            .filter_map(|a| match *a {
                Access::Write16(addr, value) => Some((addr, value)),
                _ => None,
            })
            .collect()
    }

    fn check_write(&self, address: u32) -> Result<()> {
        if self.failing_writes.contains(&address) {
            Err(TargetError::Write { address }.into())
        } else {
            Ok(())
        }
    }
}

impl Target for MockTarget {
    fn is_halted(&mut self) -> bool {
        self.halted
    }

    fn read_u32(&mut self, address: u32) -> Result<u32> {
        self.log.push(Access::Read32(address));
        if let Some(value) = self.scripted.get_mut(&address).and_then(|q| q.pop_front()) {
            return Ok(value);
        }
        Ok(self.words.get(&address).copied().unwrap_or(0))
    }

    fn write_u32(&mut self, address: u32, value: u32) -> Result<()> {
        self.log.push(Access::Write32(address, value));
        self.check_write(address)?;
        self.words.insert(address, value);
        Ok(())
    }

    fn write_u16(&mut self, address: u32, value: u16) -> Result<()> {
        self.log.push(Access::Write16(address, value));
        self.check_write(address)
    }

    fn read_buffer(&mut self, address: u32, buf: &mut [u8]) -> Result<()> {
        for (i, chunk) in buf.chunks_mut(4).enumerate() {
            let word = self.read_u32(address + 4 * i as u32)?.to_le_bytes();
            chunk.copy_from_slice(&word[..chunk.len()]);
        }
        Ok(())
    }

    fn write_buffer(&mut self, address: u32, data: &[u8]) -> Result<()> {
        self.log.push(Access::WriteBuffer(address, data.len()));
        self.check_write(address)
    }

    fn alloc_working_area(&mut self, size: u32) -> Result<WorkingArea> {
        if size > self.ram_free {
            return Err(Error::ResourceUnavailable);
        }
        self.ram_free -= size;
        let area = WorkingArea {
            address: self.next_area,
            size,
        };
        self.next_area += size;
        self.live_areas.push(area);
        Ok(area)
    }

    fn free_working_area(&mut self, area: WorkingArea) {
        if let Some(pos) = self.live_areas.iter().position(|a| *a == area) {
            self.live_areas.remove(pos);
            self.ram_free += area.size;
        }
    }

    fn run_flash_async_algorithm(&mut self, run: &AlgorithmRun<'_>) -> Result<AlgorithmResult> {
        self.runs.push(run.registers);
        Ok(self.algorithm_result)
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delays += ms;
    }
}
