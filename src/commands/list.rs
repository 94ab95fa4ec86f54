//! List commands implementation

use at32flash_core::chip;

use super::format_size;

/// List all supported parts
pub fn list_chips(family_filter: Option<&str>) {
    println!("Supported AT32 parts:");
    println!();
    println!(
        "{:<18} {:>12} {:>10} {:>8} {:>12}",
        "Name", "Product ID", "Flash", "Sector", "EFC"
    );
    println!("{}", "-".repeat(64));

    let mut count = 0;
    for chip in chip::known_chips() {
        if let Some(family) = family_filter {
            if !chip.name().eq_ignore_ascii_case(family) {
                continue;
            }
        }

        println!(
            "{:<18} {:>12} {:>10} {:>8} {:>12}",
            chip.to_string(),
            format!("0x{:08X}", chip.product_id),
            format_size(chip.total_size()),
            format_size(chip.sector_size),
            format!("0x{:08X}", chip.family.flash_reg()),
        );
        count += 1;
    }

    println!();
    println!("{} entries", count);
}
