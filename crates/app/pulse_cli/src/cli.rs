use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pulse_core::config::DEFAULT_BCRYPT_COST;

#[derive(Parser, Debug)]
#[command(name = "pulse", version, about = "Skills Pulse operator tools")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a bcrypt hash for a credential seed file.
    HashPassword {
        /// Password to hash; read from stdin when omitted.
        password: Option<String>,

        /// bcrypt cost factor.
        #[arg(long, default_value_t = DEFAULT_BCRYPT_COST, value_parser = clap::value_parser!(u32).range(4..=31))]
        cost: u32,
    },

    /// Validate a YAML credential seed file.
    CheckSeed {
        /// Path to the seed file.
        file: PathBuf,
    },

    /// Print the version.
    Version,
}
