//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parse a string as a hex or decimal u32
fn parse_hex_u32(s: &str) -> Result<u32, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u32>().map_err(|e| format!("Invalid number: {}", e))
    }
}

#[derive(Parser)]
#[command(name = "at32flash")]
#[command(author, version, about = "AT32F4xx embedded flash programmer", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Debug target, optionally with parameters (name[:key=value,...])
    #[arg(short, long, global = true, default_value = "dummy")]
    pub target: String,

    #[command(flatten)]
    pub bank: BankArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Bank selection shared by all commands
#[derive(clap::Args, Debug, Clone, Default)]
pub struct BankArgs {
    /// Bank parameters: "<base> <size> 0 0 <target> [<io_mux> <type> <size>]"
    #[arg(long, global = true, conflicts_with = "config")]
    pub bank: Option<String>,

    /// Bank file (TOML format)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Bank to use from the bank file
    #[arg(long, global = true, default_value_t = 0)]
    pub index: usize,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List supported AT32 parts
    ListChips {
        /// Filter by family name (e.g. AT32F435)
        #[arg(long)]
        family: Option<String>,
    },

    /// List supported debug targets
    ListTargets,

    /// Identify the part and compute the bank layout
    Probe,

    /// Show bank information
    Info,

    /// Read flash contents to file
    Read {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Offset from the bank base
        #[arg(long, value_parser = parse_hex_u32, default_value = "0")]
        offset: u32,

        /// Number of bytes to read (defaults to the rest of the bank)
        #[arg(long, value_parser = parse_hex_u32)]
        length: Option<u32>,
    },

    /// Write file to flash
    Write {
        /// Input file path
        #[arg(short, long)]
        input: PathBuf,

        /// Offset from the bank base (must be half-word aligned)
        #[arg(long, value_parser = parse_hex_u32, default_value = "0")]
        offset: u32,

        /// Erase the covered sectors first
        #[arg(long)]
        erase: bool,

        /// Read back and compare after writing
        #[arg(long)]
        verify: bool,
    },

    /// Erase a range of sectors (the whole bank by default)
    Erase {
        /// First sector
        #[arg(long)]
        first: Option<u32>,

        /// Last sector (inclusive)
        #[arg(long)]
        last: Option<u32>,
    },

    /// Erase every region of the bank
    MassErase,

    /// Set or clear write protection of a range of protection blocks
    Protect {
        /// First protection block
        first: u32,

        /// Last protection block (inclusive)
        last: u32,

        /// Clear protection instead of setting it
        #[arg(long)]
        off: bool,
    },

    /// Show the write protection state of every block
    ProtectCheck,

    /// Check which sectors are erased
    BlankCheck,

    /// Turn off flash access (read) protection
    DisableAccessProtection,
}
