//! Read command implementation

use at32flash_core::bank::FlashBank;
use at32flash_core::target::Target;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Default chunk size for reading (4 KiB)
const READ_CHUNK_SIZE: usize = 4096;

/// Run the read command
pub fn run_read(
    target: &mut dyn Target,
    bank: &mut FlashBank,
    output: &Path,
    offset: u32,
    length: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    bank.auto_probe(target)?;

    let size = bank.size();
    if offset > size {
        return Err(format!("Offset 0x{:X} is beyond the bank size 0x{:X}", offset, size).into());
    }
    let length = length.unwrap_or(size - offset);

    let data = read_with_progress(target, bank, offset, length as usize)?;

    let mut file = File::create(output)?;
    file.write_all(&data)?;

    println!("Wrote {} bytes to {:?}", data.len(), output);
    Ok(())
}

/// Read a range of the bank with a progress bar
pub fn read_with_progress(
    target: &mut dyn Target,
    bank: &FlashBank,
    offset: u32,
    length: usize,
) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let mut data = vec![0u8; length];

    let pb = ProgressBar::new(length as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})")?
            .progress_chars("#>-"),
    );

    let mut done = 0usize;
    for chunk in data.chunks_mut(READ_CHUNK_SIZE) {
        bank.read(target, offset + done as u32, chunk)?;
        done += chunk.len();
        pb.set_position(done as u64);
    }

    pb.finish_with_message("Read complete");
    Ok(data)
}
