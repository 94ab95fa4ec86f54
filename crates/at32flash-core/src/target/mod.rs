//! Debug target access trait
//!
//! The driver never talks to a probe directly. Everything it needs from the
//! debug connection - memory-mapped register access, bulk memory transfer,
//! scratch RAM on the target and execution of the resident copy routine -
//! goes through [`Target`].

#[cfg(test)]
pub(crate) mod mock;

use crate::error::Result;

/// A block of scratch RAM on the target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkingArea {
    /// Start address in target memory
    pub address: u32,
    /// Size in bytes
    pub size: u32,
}

impl WorkingArea {
    /// Address one past the end of the area
    pub const fn end(&self) -> u32 {
        self.address + self.size
    }
}

/// Parameters for one run of the resident flash routine
///
/// The host streams `data` into the FIFO at `fifo` while the routine drains
/// it. The FIFO starts with a write pointer word and a read pointer word,
/// followed by the data ring.
#[derive(Debug, Clone, Copy)]
pub struct AlgorithmRun<'a> {
    /// Area holding the routine; execution starts at its first byte
    pub code: WorkingArea,
    /// Area used as the FIFO
    pub fifo: WorkingArea,
    /// Data to feed through the FIFO
    pub data: &'a [u8],
    /// Size of one unit in bytes
    pub unit_size: u32,
    /// Number of units in `data`
    pub unit_count: u32,
    /// Initial core registers r0..r4
    pub registers: [u32; 5],
}

/// Outcome of a resident routine run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlgorithmResult {
    /// All units were written
    Completed,
    /// The routine stopped on a flash error
    FlashOperationFailed {
        /// Status word the routine returned in r0
        status: u32,
        /// Destination address held in r4 when it stopped
        address: u32,
    },
}

/// Debug connection to a halted AT32 core
///
/// Failed accesses should be reported as [`crate::Error::Target`]. A failed
/// working-area allocation must be reported as
/// [`crate::Error::ResourceUnavailable`] so the driver can fall back to
/// direct writes.
pub trait Target {
    /// Whether the core is halted
    fn is_halted(&mut self) -> bool;

    /// Read a 32-bit word
    fn read_u32(&mut self, address: u32) -> Result<u32>;

    /// Write a 32-bit word
    fn write_u32(&mut self, address: u32, value: u32) -> Result<()>;

    /// Write a 16-bit half-word
    fn write_u16(&mut self, address: u32, value: u16) -> Result<()>;

    /// Read a block of target memory
    fn read_buffer(&mut self, address: u32, buf: &mut [u8]) -> Result<()>;

    /// Write a block of target memory
    fn write_buffer(&mut self, address: u32, data: &[u8]) -> Result<()>;

    /// Reserve `size` bytes of scratch RAM
    fn alloc_working_area(&mut self, size: u32) -> Result<WorkingArea>;

    /// Release an area obtained from [`Target::alloc_working_area`]
    fn free_working_area(&mut self, area: WorkingArea);

    /// Run the resident routine and stream its data through the FIFO
    fn run_flash_async_algorithm(&mut self, run: &AlgorithmRun<'_>) -> Result<AlgorithmResult>;

    /// Sleep between status polls
    fn delay_ms(&mut self, ms: u32);
}
