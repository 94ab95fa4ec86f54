//! TOML bank file parsing
//!
//! Lists the banks of a board so they do not have to be repeated on the
//! command line:
//!
//! ```toml
//! [[bank]]
//! base = 0x08000000
//!
//! [[bank]]
//! base = 0x08400000
//! size = "0x100000"
//! target = "at32.cpu"
//!
//! [bank.spim]
//! io_mux = 0
//! type = 1
//! size = 0x100000
//! ```

use std::fs;
use std::path::Path;
use std::string::String;
use std::vec::Vec;

use super::{parse_number, BankConfig, SpimConfig};
use crate::geometry::SPIM_FLASH_BASE;

/// Error type for bank file loading
#[derive(Debug, thiserror::Error)]
pub enum BankFileError {
    /// The file could not be read
    #[error("failed to read bank file: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid TOML or has the wrong shape
    #[error("failed to parse bank file: {0}")]
    Parse(#[from] ::toml::de::Error),
    /// A bank entry is inconsistent
    #[error("bank {index}: {reason}")]
    Invalid {
        /// Position of the entry in the file
        index: usize,
        /// What is wrong with it
        reason: &'static str,
    },
}

#[derive(Debug, serde::Deserialize)]
struct TomlBankFile {
    #[serde(default)]
    bank: Vec<TomlBank>,
}

#[derive(Debug, serde::Deserialize)]
struct TomlBank {
    #[serde(deserialize_with = "deserialize_hex_u32")]
    base: u32,
    #[serde(default, deserialize_with = "deserialize_hex_u32")]
    size: u32,
    #[serde(default = "default_target")]
    target: String,
    spim: Option<TomlSpim>,
}

#[derive(Debug, serde::Deserialize)]
struct TomlSpim {
    #[serde(default, deserialize_with = "deserialize_hex_u32")]
    io_mux: u32,
    #[serde(rename = "type", deserialize_with = "deserialize_hex_u32")]
    flash_type: u32,
    #[serde(deserialize_with = "deserialize_hex_u32")]
    size: u32,
}

fn default_target() -> String {
    String::from("0")
}

/// Deserialize a u32 that can be hex (0x...) or decimal
fn deserialize_hex_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum HexOrInt {
        Int(u32),
        Str(String),
    }

    match HexOrInt::deserialize(deserializer)? {
        HexOrInt::Int(n) => Ok(n),
        HexOrInt::Str(s) => parse_number(&s).map_err(serde::de::Error::custom),
    }
}

impl BankConfig {
    /// Load all banks from a TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Vec<Self>, BankFileError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse all banks from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Vec<Self>, BankFileError> {
        let file: TomlBankFile = ::toml::from_str(content)?;

        file.bank
            .into_iter()
            .enumerate()
            .map(|(index, bank)| {
                let spim = bank.spim.map(|s| SpimConfig {
                    io_mux: s.io_mux,
                    flash_type: s.flash_type,
                    size: s.size,
                });
                match (bank.base == SPIM_FLASH_BASE, spim.is_some()) {
                    (true, false) => Err(BankFileError::Invalid {
                        index,
                        reason: "SPIM bank needs a [bank.spim] table",
                    }),
                    (false, true) => Err(BankFileError::Invalid {
                        index,
                        reason: "[bank.spim] is only valid at 0x08400000",
                    }),
                    _ => Ok(BankConfig {
                        base: bank.base,
                        size: bank.size,
                        target: bank.target,
                        spim,
                    }),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bank_file() {
        let banks = BankConfig::from_toml_str(
            r#"
            [[bank]]
            base = 0x08000000

            [[bank]]
            base = "0x08400000"
            target = "at32.cpu"

            [bank.spim]
            io_mux = 1
            type = 1
            size = "0x400000"
            "#,
        )
        .unwrap();

        assert_eq!(banks.len(), 2);
        assert_eq!(banks[0], BankConfig::main(0x0800_0000));
        assert_eq!(banks[1].target, "at32.cpu");
        assert_eq!(
            banks[1].spim,
            Some(SpimConfig {
                io_mux: 1,
                flash_type: 1,
                size: 0x40_0000,
            })
        );
    }

    #[test]
    fn test_spim_table_required() {
        let err = BankConfig::from_toml_str("[[bank]]\nbase = 0x08400000\n").unwrap_err();
        assert!(matches!(err, BankFileError::Invalid { index: 0, .. }));
    }

    #[test]
    fn test_bad_number() {
        let err = BankConfig::from_toml_str("[[bank]]\nbase = \"0xnope\"\n").unwrap_err();
        assert!(matches!(err, BankFileError::Parse(_)));
    }
}
