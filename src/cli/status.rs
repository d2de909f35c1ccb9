//! `claim-keeper status` - per-token schedule derived from the claim log.
//!
//! Supports two modes: human-readable tables (default) and JSON (--json).

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use tabled::{Table, Tabled};

use crate::domain::TokenId;
use crate::error::Result;
use crate::persistence::HistoryLedger;
use crate::strategy::{next_due, wait_duration};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Output mode for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Table,
    Json,
}

impl OutputMode {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputMode::Json
        } else {
            OutputMode::Table
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct StatusRow {
    #[tabled(rename = "Token")]
    pub token_id: TokenId,
    #[tabled(rename = "Last success (UTC)")]
    pub last_success: String,
    #[tabled(rename = "Next due (UTC)")]
    pub next_due: String,
    #[tabled(rename = "Wait")]
    pub wait: String,
    #[tabled(rename = "Last failure")]
    pub last_failure: String,
    #[tabled(rename = "Attempts")]
    pub attempts: usize,
}

fn format_wait(wait: Duration) -> String {
    if wait.is_zero() {
        return "due now".to_string();
    }
    let minutes = wait.as_secs() / 60;
    format!("{}h {:02}m", minutes / 60, minutes % 60)
}

/// Build one row per token from the ledger
pub fn build_status(
    ledger: &HistoryLedger,
    token_ids: &[TokenId],
    interval: Duration,
    now: DateTime<Utc>,
) -> Vec<StatusRow> {
    let records = ledger.records();

    token_ids
        .iter()
        .map(|&token_id| {
            let mine: Vec<_> = records.iter().filter(|r| r.token_id == token_id).collect();
            let last_success = mine.iter().rev().find(|r| r.is_success()).map(|r| r.timestamp);
            let last_failure = mine.iter().rev().find(|r| !r.is_success());
            let due = next_due(last_success, interval);

            StatusRow {
                token_id,
                last_success: last_success
                    .map(|t| t.format(TIME_FORMAT).to_string())
                    .unwrap_or_else(|| "never".to_string()),
                next_due: due
                    .map(|t| t.format(TIME_FORMAT).to_string())
                    .unwrap_or_else(|| "now".to_string()),
                wait: format_wait(due.map(|t| wait_duration(t, now)).unwrap_or_default()),
                last_failure: last_failure
                    .map(|r| format!("{} {}", r.timestamp.format(TIME_FORMAT), r.detail))
                    .unwrap_or_else(|| "-".to_string()),
                attempts: mine.len(),
            }
        })
        .collect()
}

/// Print status rows in the chosen mode.
pub fn print_status(rows: &[StatusRow], mode: OutputMode) -> Result<()> {
    match mode {
        OutputMode::Table => {
            if rows.is_empty() {
                println!("(no tokens configured)");
            } else {
                println!("{}", Table::new(rows));
            }
        }
        OutputMode::Json => {
            println!("{}", serde_json::to_string_pretty(rows)?);
        }
    }
    Ok(())
}
