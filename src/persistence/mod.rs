//! Persistence layer for claim history and restart recovery
//!
//! - Line codec for the append-only claim log
//! - History ledger used to rebuild each token's schedule

pub mod claim_line;
pub mod claim_log;

pub use claim_line::{format_line, parse_line};
pub use claim_log::HistoryLedger;
