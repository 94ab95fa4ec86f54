//! Write command implementation

use at32flash_core::bank::FlashBank;
use at32flash_core::target::Target;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

use super::read::read_with_progress;

/// Run the write command
pub fn run_write(
    target: &mut dyn Target,
    bank: &mut FlashBank,
    input: &Path,
    offset: u32,
    erase: bool,
    verify: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = std::fs::read(input)?;
    if data.is_empty() {
        return Err(format!("{:?} is empty", input).into());
    }

    bank.auto_probe(target)?;

    let size = bank.size();
    if offset as usize + data.len() > size as usize {
        return Err(format!(
            "File size ({} bytes) at offset 0x{:X} exceeds bank size ({} bytes)",
            data.len(),
            offset,
            size
        )
        .into());
    }

    if erase {
        let (first, last) = covered_sectors(bank, offset, data.len() as u32)?;
        let pb = spinner(format!("Erasing sectors {}..={}...", first, last))?;
        bank.erase(target, first, last)?;
        pb.finish_with_message(format!("Erased sectors {}..={}", first, last));
    }

    let pb = spinner(format!("Writing {} bytes at 0x{:08X}...", data.len(), bank.base() + offset))?;
    bank.write(target, &data, offset)?;
    pb.finish_with_message(format!("Wrote {} bytes", data.len()));

    if verify {
        let readback = read_with_progress(target, bank, offset, data.len())?;
        if let Some(pos) = data.iter().zip(&readback).position(|(a, b)| a != b) {
            return Err(format!(
                "Verification failed at offset 0x{:X}: expected 0x{:02X}, found 0x{:02X}",
                offset as usize + pos,
                data[pos],
                readback[pos]
            )
            .into());
        }
        println!("Verified {} bytes", data.len());
    }

    Ok(())
}

/// Sector range touched by `len` bytes at `offset`
fn covered_sectors(
    bank: &FlashBank,
    offset: u32,
    len: u32,
) -> Result<(u32, u32), Box<dyn std::error::Error>> {
    let end = offset + len - 1;
    let index = |addr: u32| {
        bank.sectors()
            .iter()
            .position(|s| addr >= s.offset && addr < s.offset + s.size)
            .map(|i| i as u32)
    };
    match (index(offset), index(end)) {
        (Some(first), Some(last)) => Ok((first, last)),
        _ => Err(format!("Range 0x{:X}..=0x{:X} is outside the bank", offset, end).into()),
    }
}

fn spinner(message: String) -> Result<ProgressBar, Box<dyn std::error::Error>> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}
