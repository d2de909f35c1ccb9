//! Line codec for the claim log.
//!
//! One record per line:
//!
//! ```text
//! 2024-01-01T00:00:00.000Z - Claim executed for TokenID: 7 - TX: 0xdef
//! 2024-01-01T08:00:01.250Z - Claim failed: nonce too low for TokenID: 7 - TX: unknown
//! ```

use chrono::{DateTime, SecondsFormat, Utc};

use crate::domain::{ClaimOutcome, ClaimRecord, TokenId};

pub const SUCCESS_MESSAGE: &str = "Claim executed";
pub const FAILURE_PREFIX: &str = "Claim failed: ";
pub const UNKNOWN_TX: &str = "unknown";

const FIELD_SEPARATOR: &str = " - ";
const TOKEN_MARKER: &str = " for TokenID: ";
const TX_MARKER: &str = " - TX: ";

/// Render a record as a single log line, including the trailing newline
pub fn format_line(record: &ClaimRecord) -> String {
    let timestamp = record
        .timestamp
        .to_rfc3339_opts(SecondsFormat::Millis, true);
    let (message, tx) = match record.outcome {
        ClaimOutcome::Success => (SUCCESS_MESSAGE.to_string(), single_line(&record.detail)),
        ClaimOutcome::Failure => (
            format!("{}{}", FAILURE_PREFIX, single_line(&record.detail)),
            UNKNOWN_TX.to_string(),
        ),
    };
    let tx = if tx.is_empty() { UNKNOWN_TX.to_string() } else { tx };

    format!(
        "{}{}{}{}{}{}{}\n",
        timestamp, FIELD_SEPARATOR, message, TOKEN_MARKER, record.token_id, TX_MARKER, tx
    )
}

/// Parse one log line. Returns `None` for anything that is not a record.
///
/// Only the exact success message counts as a success; any other message is a
/// failure whose detail is the message with the failure prefix removed.
pub fn parse_line(line: &str) -> Option<ClaimRecord> {
    let line = line.trim_end_matches(['\r', '\n']);
    let (timestamp, rest) = line.split_once(FIELD_SEPARATOR)?;
    let timestamp = DateTime::parse_from_rfc3339(timestamp.trim())
        .ok()?
        .with_timezone(&Utc);

    let (rest, tx) = rest.rsplit_once(TX_MARKER)?;
    let (message, token_id) = rest.rsplit_once(TOKEN_MARKER)?;
    let token_id: TokenId = token_id.trim().parse().ok()?;

    let record = if message == SUCCESS_MESSAGE {
        ClaimRecord {
            timestamp,
            token_id,
            outcome: ClaimOutcome::Success,
            detail: tx.trim().to_string(),
        }
    } else {
        ClaimRecord {
            timestamp,
            token_id,
            outcome: ClaimOutcome::Failure,
            detail: message
                .strip_prefix(FAILURE_PREFIX)
                .unwrap_or(message)
                .to_string(),
        }
    };
    Some(record)
}

fn single_line(text: &str) -> String {
    text.trim()
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect()
}
