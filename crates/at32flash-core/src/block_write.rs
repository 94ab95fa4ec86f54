//! Block write through a target-resident copy routine
//!
//! The host uploads a small Thumb routine to target RAM, allocates a FIFO
//! next to it and streams the data through. The routine copies half-words
//! from the FIFO into flash and polls EFC_STS after each one. When target
//! RAM is too tight for the routine and a useful FIFO, writes fall back to
//! one half-word access plus one status poll per unit.

use log::{debug, error, warn};

use crate::efc::{Efc, Status};
use crate::error::{Error, Result};
use crate::target::{AlgorithmResult, AlgorithmRun, Target, WorkingArea};

/// Resident half-word copy loop
///
/// Registers on entry: r0 = EFC register base, r1 = half-word count,
/// r2 = FIFO start, r3 = FIFO end, r4 = destination address. On exit r0
/// holds the last EFC_STS value and the core halts on `bkpt`.
#[rustfmt::skip]
pub const FLASH_WRITE_CODE: [u8; 60] = [
    0x16, 0x68, 0x00, 0x2e, 0x18, 0xd0, 0x55, 0x68, 0xb5, 0x42, 0xf9, 0xd0, 0x2e, 0x88, 0x26, 0x80,
    0x02, 0x35, 0x02, 0x34, 0xc6, 0x68, 0x01, 0x27, 0x3e, 0x42, 0xfd, 0xd1, 0x14, 0x27, 0x3e, 0x42,
    0x08, 0xd1, 0x9d, 0x42, 0x01, 0xd3, 0x15, 0x46, 0x08, 0x35, 0x55, 0x60, 0x01, 0x39, 0x00, 0x29,
    0x02, 0xd0, 0xe5, 0xe7, 0x00, 0x20, 0x50, 0x60, 0x30, 0x46, 0x00, 0xbe,
];

/// First FIFO size requested
pub const FIFO_SIZE: u32 = 16384;
/// FIFO sizes at or below this are not worth using
pub const MIN_FIFO_SIZE: u32 = 256;

/// Bytes per programming unit
pub const UNIT_SIZE: u32 = 2;

/// Run `f` with a working area of `size` bytes, freeing it afterwards
fn with_working_area<T, R, F>(target: &mut T, size: u32, f: F) -> Result<R>
where
    T: Target + ?Sized,
    F: FnOnce(&mut T, WorkingArea) -> Result<R>,
{
    let area = match target.alloc_working_area(size) {
        Ok(area) => area,
        Err(_) => {
            warn!("no working area available, can't do block memory writes");
            return Err(Error::ResourceUnavailable);
        }
    };
    let result = f(target, area);
    target.free_working_area(area);
    result
}

/// Allocate the largest FIFO the target can spare
fn alloc_fifo<T: Target + ?Sized>(target: &mut T) -> Result<WorkingArea> {
    let mut size = FIFO_SIZE;
    loop {
        if let Ok(area) = target.alloc_working_area(size) {
            debug!("FIFO of {} bytes at 0x{:08X}", area.size, area.address);
            return Ok(area);
        }
        size = (size / 2) & !3;
        if size <= MIN_FIFO_SIZE {
            warn!("no large enough working area available, can't do block memory writes");
            return Err(Error::ResourceUnavailable);
        }
    }
}

/// Program `data` at `address` with the resident routine
///
/// `data` must hold a whole number of half-words and the controller must be
/// unlocked with the matching program bit set. Returns
/// [`Error::ResourceUnavailable`] when the routine or its FIFO do not fit in
/// target RAM; nothing has been written in that case.
pub fn block_write<T: Target + ?Sized>(
    target: &mut T,
    efc: &Efc,
    data: &[u8],
    address: u32,
) -> Result<()> {
    with_working_area(target, FLASH_WRITE_CODE.len() as u32, |t, code| {
        t.write_buffer(code.address, &FLASH_WRITE_CODE)?;

        let fifo = alloc_fifo(t)?;
        let result = run_write_routine(t, efc, code, fifo, data, address);
        t.free_working_area(fifo);
        result
    })
}

fn run_write_routine<T: Target + ?Sized>(
    target: &mut T,
    efc: &Efc,
    code: WorkingArea,
    fifo: WorkingArea,
    data: &[u8],
    address: u32,
) -> Result<()> {
    let unit_count = data.len() as u32 / UNIT_SIZE;
    let run = AlgorithmRun {
        code,
        fifo,
        data,
        unit_size: UNIT_SIZE,
        unit_count,
        registers: [
            efc.register_base(),
            unit_count,
            fifo.address,
            fifo.end(),
            address,
        ],
    };

    debug!(
        "block write of {} half-words to 0x{:08X}",
        unit_count, address
    );

    match target.run_flash_async_algorithm(&run)? {
        AlgorithmResult::Completed => Ok(()),
        AlgorithmResult::FlashOperationFailed { status, address } => {
            error!(
                "{}: flash write failed at address 0x{:08X}",
                efc.chip(),
                address
            );

            let flags = Status::from_bits_retain(status);
            if flags.contains(Status::PRGMERR) {
                error!("flash memory not erased before writing");
                clear_quietly(target, efc, Status::PRGMERR);
            }
            if flags.contains(Status::EPPERR) {
                error!("flash memory write protected");
                clear_quietly(target, efc, Status::EPPERR);
            }

            Err(Error::FlashOperationFailed { address, status })
        }
    }
}

fn clear_quietly<T: Target + ?Sized>(target: &mut T, efc: &Efc, bits: Status) {
    if let Err(e) = efc.clear_status(target, bits) {
        error!("failed to clear flash status: {}", e);
    }
}

/// Program `data` one half-word at a time
pub fn write_halfwords<T: Target + ?Sized>(
    target: &mut T,
    efc: &Efc,
    data: &[u8],
    address: u32,
) -> Result<()> {
    for (i, unit) in data.chunks_exact(UNIT_SIZE as usize).enumerate() {
        let value = u16::from_le_bytes([unit[0], unit[1]]);
        efc.program_halfword(target, address + i as u32 * UNIT_SIZE, value)?;
    }
    Ok(())
}

/// Program `data`, preferring the block path
pub fn program<T: Target + ?Sized>(
    target: &mut T,
    efc: &Efc,
    data: &[u8],
    address: u32,
) -> Result<()> {
    match block_write(target, efc, data, address) {
        Err(Error::ResourceUnavailable) => {
            warn!("couldn't use block writes, falling back to single memory accesses");
            write_halfwords(target, efc, data, address)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip::resolve;
    use crate::efc::regs::EFC_STS;
    use crate::target::mock::MockTarget;

    const BASE: u32 = 0x4002_2000;

    fn efc() -> Efc {
        Efc::new(BASE, resolve(0x7005_0242).unwrap())
    }

    #[test]
    fn test_routine_register_arguments() {
        let mut target = MockTarget::new();
        let data = [0u8; 32];
        block_write(&mut target, &efc(), &data, 0x0800_0400).unwrap();

        assert_eq!(target.runs.len(), 1);
        let fifo_start = 0x2000_0000 + FLASH_WRITE_CODE.len() as u32;
        assert_eq!(
            target.runs[0],
            [BASE, 16, fifo_start, fifo_start + FIFO_SIZE, 0x0800_0400]
        );
        assert!(target.live_areas.is_empty());
    }

    #[test]
    fn test_fifo_shrinks_to_fit() {
        let mut target = MockTarget::new();
        target.ram_free = FLASH_WRITE_CODE.len() as u32 + 5000;
        block_write(&mut target, &efc(), &[0xAA; 8], 0x0800_0000).unwrap();
        let [_, _, start, end, _] = target.runs[0];
        assert_eq!(end - start, 4096);
        assert!(target.live_areas.is_empty());
    }

    #[test]
    fn test_no_fifo_is_resource_unavailable() {
        let mut target = MockTarget::new();
        target.ram_free = FLASH_WRITE_CODE.len() as u32 + 200;
        let result = block_write(&mut target, &efc(), &[0xAA; 8], 0x0800_0000);
        assert_eq!(result, Err(Error::ResourceUnavailable));
        assert!(target.runs.is_empty());
        assert!(target.live_areas.is_empty());
    }

    #[test]
    fn test_fallback_writes_each_halfword() {
        let mut target = MockTarget::new();
        target.ram_free = 0;
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06];
        program(&mut target, &efc(), &data, 0x0800_1000).unwrap();
        assert_eq!(
            target.halfword_writes(),
            [
                (0x0800_1000, 0x0201),
                (0x0800_1002, 0x0403),
                (0x0800_1004, 0x0605),
            ]
        );
    }

    #[test]
    fn test_routine_failure_clears_status() {
        let mut target = MockTarget::new();
        target.algorithm_result = AlgorithmResult::FlashOperationFailed {
            status: Status::PRGMERR.bits(),
            address: 0x0800_0010,
        };
        let result = program(&mut target, &efc(), &[0; 64], 0x0800_0000);
        assert_eq!(
            result,
            Err(Error::FlashOperationFailed {
                address: 0x0800_0010,
                status: Status::PRGMERR.bits(),
            })
        );
        assert_eq!(target.writes_to(BASE + EFC_STS), [Status::PRGMERR.bits()]);
        // no fallback after a flash error
        assert!(target.halfword_writes().is_empty());
        assert!(target.live_areas.is_empty());
    }

    #[test]
    fn test_upload_failure_frees_code_area() {
        let mut target = MockTarget::new();
        target.fail_writes_to(0x2000_0000);
        let result = block_write(&mut target, &efc(), &[0; 4], 0x0800_0000);
        assert!(matches!(result, Err(Error::Target(_))));
        assert!(target.live_areas.is_empty());
    }
}
