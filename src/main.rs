//! at32flash - AT32F4xx embedded flash programmer
//!
//! Programs the on-chip flash, the SPIM-mapped external flash and the option
//! bytes of Artery AT32F4xx parts through a debug target.
//!
//! # Architecture
//!
//! The driver lives in `at32flash-core` and talks to the part only through
//! the `Target` trait. This binary selects a target backend, builds the
//! bank description from the command line or a bank file and dispatches the
//! subcommand to the matching `FlashBank` operation.

mod cli;
mod commands;
mod targets;

use at32flash_core::bank::FlashBank;
use at32flash_core::config::BankConfig;
use at32flash_core::geometry::MAIN_FLASH_BASE;
use clap::Parser;
use cli::{BankArgs, Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    match &cli.command {
        Commands::ListChips { family } => {
            commands::list_chips(family.as_deref());
            return Ok(());
        }
        Commands::ListTargets => {
            targets::list_targets();
            return Ok(());
        }
        _ => {}
    }

    let mut target = targets::open_target(&cli.target)?;
    let target = target.as_mut();
    let mut bank = FlashBank::new(load_bank_config(&cli.bank)?);

    match cli.command {
        Commands::ListChips { .. } | Commands::ListTargets => Ok(()),
        Commands::Probe => commands::probe::run_probe(target, &mut bank),
        Commands::Info => commands::probe::run_info(target, &mut bank),
        Commands::Read {
            output,
            offset,
            length,
        } => commands::read::run_read(target, &mut bank, &output, offset, length),
        Commands::Write {
            input,
            offset,
            erase,
            verify,
        } => commands::write::run_write(target, &mut bank, &input, offset, erase, verify),
        Commands::Erase { first, last } => {
            commands::erase::run_erase(target, &mut bank, first, last)
        }
        Commands::MassErase => commands::erase::run_mass_erase(target, &mut bank),
        Commands::BlankCheck => commands::erase::run_blank_check(target, &mut bank),
        Commands::Protect { first, last, off } => {
            commands::protect::run_protect(target, &mut bank, !off, first, last)
        }
        Commands::ProtectCheck => commands::protect::run_protect_check(target, &mut bank),
        Commands::DisableAccessProtection => {
            commands::protect::run_disable_access_protection(target, &mut bank)
        }
    }
}

/// Build the bank description from `--bank`, `--config` or the default
fn load_bank_config(args: &BankArgs) -> Result<BankConfig, Box<dyn std::error::Error>> {
    if let Some(params) = &args.bank {
        let fields: Vec<&str> = params.split_whitespace().collect();
        return Ok(BankConfig::from_args(&fields)?);
    }

    if let Some(path) = &args.config {
        let mut banks = BankConfig::from_toml_file(path)?;
        log::info!("Loaded {} bank(s) from {:?}", banks.len(), path);
        if args.index >= banks.len() {
            return Err(format!(
                "Bank index {} out of range, {:?} lists {} bank(s)",
                args.index,
                path,
                banks.len()
            )
            .into());
        }
        return Ok(banks.swap_remove(args.index));
    }

    Ok(BankConfig::main(MAIN_FLASH_BASE))
}
