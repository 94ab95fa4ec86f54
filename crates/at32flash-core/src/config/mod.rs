//! Flash bank configuration
//!
//! A bank is described positionally:
//!
//! ```text
//! <base> <size> <chip_width> <bus_width> <target> [<io_mux> <type> <size>]
//! ```
//!
//! The two width fields are accepted for compatibility and must parse as
//! numbers, but the driver ignores them. Banks at the SPIM window
//! (0x08400000) need the three trailing SPIM parameters.

#[cfg(feature = "std")]
pub mod toml;

use alloc::string::{String, ToString};

use log::info;

use crate::error::{Error, Result};
use crate::geometry::SPIM_FLASH_BASE;

/// External SPI memory parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpimConfig {
    /// Pin set selector: nonzero routes the interface to PB10/PB11
    pub io_mux: u32,
    /// Memory type code written to the SPIM type-select register
    pub flash_type: u32,
    /// Size of the external memory in bytes
    pub size: u32,
}

/// Parameters of one flash bank
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankConfig {
    /// Bank base address
    pub base: u32,
    /// Declared size, informational only
    ///
    /// Probe always sizes the bank from the chip catalog or the SPIM
    /// parameters. A nonzero value that disagrees is reported and ignored.
    pub size: u32,
    /// Target selector
    pub target: String,
    /// SPIM parameters, present for banks at the SPIM window
    pub spim: Option<SpimConfig>,
}

impl BankConfig {
    /// Main flash bank at `base`
    pub fn main(base: u32) -> Self {
        Self {
            base,
            size: 0,
            target: "0".to_string(),
            spim: None,
        }
    }

    /// Parse positional bank parameters
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Result<Self> {
        if args.len() < 5 {
            return Err(Error::Syntax("expected <base> <size> 0 0 <target>"));
        }

        let base = parse_number(args[0].as_ref())?;
        let size = parse_number(args[1].as_ref())?;
        parse_number(args[2].as_ref())?;
        parse_number(args[3].as_ref())?;
        let target = args[4].as_ref().to_string();

        let spim = if base == SPIM_FLASH_BASE {
            if args.len() < 8 {
                return Err(Error::Syntax(
                    "SPIM bank expects <io_mux> <type> <size> after the target",
                ));
            }
            let spim = SpimConfig {
                io_mux: parse_number(args[5].as_ref())?,
                flash_type: parse_number(args[6].as_ref())?,
                size: parse_number(args[7].as_ref())?,
            };
            info!(
                "spim flash io_mux: 0x{:x}, type: 0x{:x}, size: 0x{:x}",
                spim.io_mux, spim.flash_type, spim.size
            );
            Some(spim)
        } else {
            None
        };

        Ok(Self {
            base,
            size,
            target,
            spim,
        })
    }
}

/// Parse a number that can be hex (0x...) or decimal
pub fn parse_number(s: &str) -> Result<u32> {
    let s = s.trim();
    let parsed = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16)
    } else {
        s.parse()
    };
    parsed.map_err(|_| Error::Syntax("invalid number"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_main_bank() {
        let config = BankConfig::from_args(&["0x08000000", "0", "0", "0", "at32.cpu"]).unwrap();
        assert_eq!(config.base, 0x0800_0000);
        assert_eq!(config.size, 0);
        assert_eq!(config.target, "at32.cpu");
    }

    #[test]
    fn test_spim_bank() {
        let config = BankConfig::from_args(&[
            "0x08400000",
            "0x100000",
            "0",
            "0",
            "0",
            "1",
            "0x2",
            "1048576",
        ])
        .unwrap();
        assert_eq!(
            config.spim,
            Some(SpimConfig {
                io_mux: 1,
                flash_type: 2,
                size: 0x10_0000,
            })
        );
    }

    #[test]
    fn test_missing_arguments() {
        assert!(matches!(
            BankConfig::from_args(&["0x08000000", "0", "0", "0"]),
            Err(Error::Syntax(_))
        ));
        assert!(matches!(
            BankConfig::from_args(&["0x08400000", "0", "0", "0", "0", "1"]),
            Err(Error::Syntax(_))
        ));
    }

    #[test]
    fn test_bad_numbers() {
        assert!(parse_number("0xZZ").is_err());
        assert!(parse_number("-1").is_err());
        assert_eq!(parse_number(" 0X1F ").unwrap(), 31);
        assert!(BankConfig::from_args(&["flash", "0", "0", "0", "0"]).is_err());
    }
}
