pub mod adapters;
pub mod cli;
pub mod clock;
pub mod config;
pub mod coordinator;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod signing;
pub mod strategy;

pub use adapters::{GameContractClient, LedgerClient};
pub use clock::{Clock, SystemClock};
pub use config::AppConfig;
pub use coordinator::{ClaimCoordinator, CoordinatorHandle, StartupDecision};
pub use domain::{ClaimOutcome, ClaimRecord, TokenId, TransactionReference};
pub use error::{ClaimError, KeeperError, Result};
pub use persistence::HistoryLedger;
pub use signing::Wallet;
pub use strategy::{ClaimExecutor, ClaimScheduleConfig, SchedulePhase, TokenScheduler, Wake};
