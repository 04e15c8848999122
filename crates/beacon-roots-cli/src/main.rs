use crate::cli::{
    Args,
    Command,
};
use anyhow::Result;
use clap::Parser;
use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so stdout carries only results.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(args.log_level.into())
                .from_env_lossy(),
        )
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .init();

    let output = match &args.command {
        Command::Run { path, pretty } => {
            let input = commands::read_text(path.as_deref())?;
            commands::run(&input, *pretty)?
        }
        Command::Invariants { path } => commands::invariants(&commands::read_bytes(path)?)?,
        Command::Differential { path } => commands::differential(&commands::read_bytes(path)?)?,
        Command::Decode { path, storage } => {
            commands::decode(&commands::read_bytes(path)?, *storage)?
        }
    };

    println!("{output}");
    Ok(())
}
