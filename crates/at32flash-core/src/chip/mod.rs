//! AT32 chip catalog
//!
//! Maps the value of the product-id register to a [`ChipDescriptor`]
//! describing flash size, sector size and controller layout.

mod catalog;
mod types;

pub use catalog::*;
pub use types::*;

/// Address of the product-id register (DEBUG_SER_ID)
pub const PRODUCT_ID_ADDR: u32 = 0xE004_2000;

/// Look up a product id, first match in table order
pub fn resolve(product_id: u32) -> Option<&'static ChipDescriptor> {
    KNOWN_CHIPS.iter().find(|c| c.product_id == product_id)
}

/// Iterate over all catalog entries
pub fn known_chips() -> impl Iterator<Item = &'static ChipDescriptor> {
    KNOWN_CHIPS.iter()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_round_trip() {
        for chip in KNOWN_CHIPS {
            let found = resolve(chip.product_id).unwrap();
            assert_eq!(found.product_id, chip.product_id);
        }
    }

    #[test]
    fn test_duplicate_ids_resolve_to_first_entry() {
        // 0x70050243 is listed for both AT32F403A CCU7 and AT32F403 CCT6
        let chip = resolve(0x7005_0243).unwrap();
        assert_eq!(chip.name(), "AT32F403A");
        assert_eq!(chip.suffix, "CCU7");

        // 0x700301CF is listed for AT32F403 CBT6 and AT32F415 RBW
        let chip = resolve(0x7003_01CF).unwrap();
        assert_eq!(chip.name(), "AT32F403");
        assert_eq!(chip.suffix, "CBT6");
        assert_eq!(chip.sector_size, 1024);

        // 0x700301C5 is AT32F413 KBU7-4 before AT32F415 CBT7
        let chip = resolve(0x7003_01C5).unwrap();
        assert_eq!(chip.name(), "AT32F413");
    }

    #[test]
    fn test_unknown_id() {
        assert!(resolve(0).is_none());
        assert!(resolve(0xDEAD_BEEF).is_none());
    }

    #[test]
    fn test_family_layout() {
        let f435 = resolve(0x7008_4549).unwrap();
        assert_eq!(f435.to_string(), "AT32F435CMT7");
        assert_eq!(f435.flash_size_kb, 4032);
        assert_eq!(f435.family.flash_reg(), 0x4002_3C00);
        assert_eq!(f435.option_byte_base(), 0x1FFF_C000);

        // AT32F423 uses the high-density controller but the legacy USD address
        let f423 = resolve(0x700A_3240).unwrap();
        assert_eq!(f423.register_family(), RegisterFamily::HighDensityFlashReg);
        assert_eq!(f423.option_byte_base(), 0x1FFF_F800);

        let l021 = resolve(0x1001_2006).unwrap();
        assert_eq!(l021.family.flash_reg(), 0x4002_2000);
        assert_eq!(l021.total_size(), 16 * 1024);
    }

    #[test]
    fn test_sector_sizes_are_supported() {
        for chip in KNOWN_CHIPS {
            assert!(matches!(chip.sector_size, 1024 | 2048 | 4096));
            assert_eq!(chip.total_size() % chip.sector_size, 0, "{}", chip);
        }
    }
}
