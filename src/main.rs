mod main_modes;
mod main_runtime;

use clap::Parser;
use claim_keeper::cli::{Cli, Commands};
use claim_keeper::config::AppConfig;
use claim_keeper::error::Result;
use tracing::error;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    match cli.command() {
        Commands::Run { once } => {
            let config = AppConfig::load_from(&cli.config)?;
            main_runtime::init_logging(&config.logging);
            if let Err(e) = main_modes::run_keeper(&config, once).await {
                error!("Keeper stopped: {}", e);
                return Err(e);
            }
        }
        Commands::Status { json } => {
            main_runtime::init_logging_simple();
            let config = AppConfig::load_from(&cli.config)?;
            main_modes::run_status(&config, json)?;
        }
        Commands::CheckKey => {
            main_runtime::init_logging_simple();
            main_modes::run_check_key()?;
        }
    }

    Ok(())
}
