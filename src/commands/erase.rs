//! Erase command implementations

use at32flash_core::bank::FlashBank;
use at32flash_core::target::Target;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Run the erase command
pub fn run_erase(
    target: &mut dyn Target,
    bank: &mut FlashBank,
    first: Option<u32>,
    last: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    bank.auto_probe(target)?;

    let count = bank.sectors().len() as u32;
    let first = first.unwrap_or(0);
    let last = last.unwrap_or(count.saturating_sub(1));

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(format!(
        "Erasing sectors {}..={} (this may take a while)...",
        first, last
    ));
    pb.enable_steady_tick(Duration::from_millis(100));

    bank.erase(target, first, last)?;

    pb.finish_with_message(format!("Erased sectors {}..={}", first, last));
    Ok(())
}

/// Run the mass-erase command
pub fn run_mass_erase(
    target: &mut dyn Target,
    bank: &mut FlashBank,
) -> Result<(), Box<dyn std::error::Error>> {
    bank.auto_probe(target)?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(format!(
        "Mass erasing {} bytes (this may take a while)...",
        bank.size()
    ));
    pb.enable_steady_tick(Duration::from_millis(100));

    bank.mass_erase(target)?;

    pb.finish_with_message("Mass erase complete");
    Ok(())
}

/// Run the blank-check command
pub fn run_blank_check(
    target: &mut dyn Target,
    bank: &mut FlashBank,
) -> Result<(), Box<dyn std::error::Error>> {
    bank.auto_probe(target)?;

    let erased = bank.erase_check(target)?;
    let total = bank.sectors().len();

    let dirty: Vec<String> = bank
        .sectors()
        .iter()
        .enumerate()
        .filter(|(_, s)| s.is_erased == Some(false))
        .map(|(i, s)| format!("{} (0x{:08X})", i, bank.base() + s.offset))
        .collect();

    println!("{} of {} sectors erased", erased, total);
    if !dirty.is_empty() {
        println!("Programmed sectors:");
        for sector in &dirty {
            println!("  {}", sector);
        }
    }
    Ok(())
}
