use clap::{Parser, Subcommand};

/// Runtime CLI for the claim keeper.
#[derive(Parser, Debug)]
#[command(name = "claim-keeper")]
#[command(version = "0.1.0")]
#[command(
    about = "Claims game rewards on a fixed per-token schedule",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config directory (default.toml and $CLAIM_ENV.toml)
    #[arg(short, long, default_value = "config")]
    pub config: String,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Run the claim schedulers (default)
    Run {
        /// Run the startup pass only: claim every due token once, then exit
        #[arg(long)]
        once: bool,
    },

    /// Show per-token claim status from the claim log
    Status {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Validate the signing key and print the derived address
    CheckKey,
}

impl Cli {
    /// Subcommand to run, defaulting to `run`
    pub fn command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or(Commands::Run { once: false })
    }
}
