use claim_keeper::adapters::GameContractClient;
use claim_keeper::cli::{build_status, print_status, OutputMode};
use claim_keeper::clock::{Clock, SystemClock};
use claim_keeper::config::AppConfig;
use claim_keeper::coordinator::ClaimCoordinator;
use claim_keeper::error::Result;
use claim_keeper::persistence::HistoryLedger;
use claim_keeper::signing::wallet::key_format_hints;
use claim_keeper::signing::Wallet;
use claim_keeper::strategy::ClaimExecutor;
use std::sync::Arc;
use tokio::signal;
use tracing::info;

fn join_ids(ids: &[u64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub async fn run_keeper(config: &AppConfig, once: bool) -> Result<()> {
    config.validate(true)?;

    let token_ids = config.schedule.token_ids();
    let schedule = config.schedule.to_schedule();

    info!("Token IDs to process: {}", join_ids(&token_ids));
    info!(
        "Claim interval: {} minutes ({} hours), retry delay: {} minutes",
        config.schedule.interval_secs / 60,
        config.schedule.interval_secs as f64 / 3600.0,
        config.schedule.retry_delay_secs / 60
    );
    match schedule.claim_timeout {
        Some(limit) => info!("Claim call timeout: {}s", limit.as_secs()),
        None => info!("Claim call timeout disabled"),
    }

    info!("Initializing provider and wallet...");
    let wallet = Wallet::from_env()?;
    let contract_address = config.chain.contract_address.as_deref().unwrap_or_default();
    let client = GameContractClient::new(
        &config.chain.rpc_url,
        contract_address,
        &wallet,
        config.chain.confirmations,
    )?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let ledger = Arc::new(HistoryLedger::open(&config.ledger.path, clock.clone()));
    info!("Claim log: {}", ledger.path().display());

    let executor = Arc::new(ClaimExecutor::new(
        Arc::new(client),
        ledger,
        schedule.claim_timeout,
    ));
    let coordinator = ClaimCoordinator::new(token_ids, schedule, executor, clock)?;

    if once {
        info!("One-shot mode: claiming due tokens once...");
        coordinator.run_startup_pass().await;
        return Ok(());
    }

    let handle = coordinator.start().await;
    info!(
        "{} scheduler(s) running (Ctrl+C to stop)",
        handle.running()
    );

    tokio::select! {
        result = handle.wait() => result,
        _ = signal::ctrl_c() => {
            info!("Received Ctrl+C, stopping...");
            Ok(())
        }
    }
}

pub fn run_status(config: &AppConfig, json: bool) -> Result<()> {
    config.validate(false)?;

    let clock = Arc::new(SystemClock);
    let now = clock.now();
    let ledger = HistoryLedger::open(&config.ledger.path, clock);
    let rows = build_status(
        &ledger,
        &config.schedule.token_ids(),
        config.schedule.to_schedule().interval,
        now,
    );
    print_status(&rows, OutputMode::from_json_flag(json))
}

pub fn run_check_key() -> Result<()> {
    match Wallet::from_env() {
        Ok(wallet) => {
            println!("✅ Private key format is valid");
            println!("🔑 Derived wallet address: {}", wallet.address());
            Ok(())
        }
        Err(e) => {
            println!("❌ {}", e);
            println!("\nPossible causes:");
            for (i, hint) in key_format_hints().iter().enumerate() {
                println!("{}. {}", i + 1, hint);
            }
            println!("\nExpected format:");
            println!("PRIVATE_KEY=0x0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef");
            Err(e)
        }
    }
}
