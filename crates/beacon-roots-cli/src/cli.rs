//! Command-line configuration for the beacon roots harness.

use clap::{
    Parser,
    Subcommand,
};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "beacon-roots", author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Log level
    #[arg(long, global = true, env = "BEACON_ROOTS_LOG_LEVEL", default_value = "info")]
    pub log_level: LevelFilter,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a JSON test vector, or an array of vectors against shared storage.
    Run {
        /// Input file. Reads stdin when omitted.
        path: Option<PathBuf>,

        /// Indent the JSON output.
        #[arg(long)]
        pretty: bool,
    },
    /// Replay a binary fuzz corpus file and check every call.
    Invariants {
        path: PathBuf,
    },
    /// Replay a binary fuzz corpus file, storage sections included, against the contract
    /// bytecode on revm and compare every call.
    Differential {
        path: PathBuf,
    },
    /// Decode a binary fuzz corpus file into JSON test vectors.
    Decode {
        path: PathBuf,

        /// Records carry a storage section before the timestamp.
        #[arg(long)]
        storage: bool,
    },
}
