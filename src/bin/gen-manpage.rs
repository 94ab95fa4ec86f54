//! Man page generator for at32flash
//!
//! Renders `at32flash.1` plus one `at32flash-<command>.1` page per
//! subcommand.
//!
//! Usage: cargo run --bin gen-manpage -- [output-dir]

use clap::CommandFactory;
use std::fs;
use std::path::{Path, PathBuf};

#[path = "../cli.rs"]
mod cli;

fn render(cmd: clap::Command, path: &Path) -> std::io::Result<()> {
    let mut buffer = Vec::new();
    clap_mangen::Man::new(cmd).render(&mut buffer)?;
    fs::write(path, buffer)
}

fn main() -> std::io::Result<()> {
    let output_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("man"));

    fs::create_dir_all(&output_dir)?;

    let cmd = cli::Cli::command();
    let main_page = output_dir.join("at32flash.1");
    render(cmd.clone(), &main_page)?;
    println!("Man page generated at: {}", main_page.display());

    for sub in cmd.get_subcommands() {
        let path = output_dir.join(format!("at32flash-{}.1", sub.get_name()));
        render(sub.clone(), &path)?;
        println!("  {}", path.display());
    }

    println!("\nTo view the man page:");
    println!("  man -l {}", main_page.display());

    Ok(())
}
