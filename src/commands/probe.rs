//! Probe and info command implementations

use at32flash_core::bank::FlashBank;
use at32flash_core::target::Target;

use super::format_size;

/// Identify the attached part and print the bank layout
pub fn run_probe(
    target: &mut dyn Target,
    bank: &mut FlashBank,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = bank.probe(target) {
        eprintln!("Probe failed: {}", e);
        return Err(Box::new(e));
    }

    let (Some(chip), Some(geometry)) = (bank.chip(), bank.geometry()) else {
        return Err("probe returned without a layout".into());
    };

    println!("Found AT32 part:");
    println!("  Name:       {}", chip);
    println!("  Product ID: 0x{:08X}", bank.product_id());
    println!(
        "  Bank:       0x{:08X}, {} ({} bytes)",
        bank.base(),
        format_size(geometry.total_size),
        geometry.total_size
    );
    println!(
        "  Sectors:    {} x {}",
        geometry.sector_count,
        format_size(geometry.sector_size)
    );
    println!("  Protection: {} blocks", geometry.protection_blocks.len());
    Ok(())
}

/// Print the full bank description
pub fn run_info(
    target: &mut dyn Target,
    bank: &mut FlashBank,
) -> Result<(), Box<dyn std::error::Error>> {
    bank.auto_probe(target)?;
    println!("{}", bank.info()?);

    let option_bytes = bank.read_option_bytes(target)?;
    println!();
    println!("Option bytes:");
    println!(
        "  Access protection: 0x{:02X} ({})",
        option_bytes.fap,
        if option_bytes.fap == at32flash_core::usd::FAP_DISABLED {
            "disabled"
        } else {
            "enabled"
        }
    );
    println!("  System setting:    0x{:02X}", option_bytes.ssb);
    println!("  User data:         0x{:04X}", option_bytes.data);
    println!("  Protection bitmap: 0x{:08X}", option_bytes.protection);
    Ok(())
}
