//! Write protection and option-byte command implementations

use at32flash_core::bank::FlashBank;
use at32flash_core::target::Target;
use std::error::Error;

/// Set or clear protection of blocks `first..=last`
pub fn run_protect(
    target: &mut dyn Target,
    bank: &mut FlashBank,
    enable: bool,
    first: u32,
    last: u32,
) -> Result<(), Box<dyn Error>> {
    bank.auto_probe(target)?;
    bank.protect(target, enable, first, last)
        .map_err(|e| format!("Failed to update protection: {}", e))?;

    println!(
        "Blocks {}..={} {}",
        first,
        last,
        if enable { "protected" } else { "unprotected" }
    );
    println!("Reset the part for the new option bytes to take effect");
    Ok(())
}

/// Show the protection state of every block
pub fn run_protect_check(target: &mut dyn Target, bank: &mut FlashBank) -> Result<(), Box<dyn Error>> {
    bank.auto_probe(target)?;
    bank.protect_check(target)?;

    println!("{:>5}  {:<23}  State", "Block", "Range");
    for (i, block) in bank.protection_blocks().iter().enumerate() {
        let start = bank.base() + block.offset;
        let state = match block.is_protected {
            Some(true) => "protected",
            Some(false) => "unprotected",
            None => "unknown",
        };
        println!(
            "{:>5}  0x{:08X}-0x{:08X}  {}",
            i,
            start,
            start + block.size - 1,
            state
        );
    }
    Ok(())
}

/// Clear flash access protection
pub fn run_disable_access_protection(
    target: &mut dyn Target,
    bank: &mut FlashBank,
) -> Result<(), Box<dyn Error>> {
    bank.auto_probe(target)?;
    bank.disable_access_protection(target)
        .map_err(|e| format!("Failed to disable access protection: {}", e))?;

    println!("Access protection disabled");
    println!("Reset the part for the new option bytes to take effect");
    Ok(())
}
