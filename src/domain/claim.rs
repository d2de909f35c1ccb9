use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric key of an independently scheduled claim target (the game token id)
pub type TokenId = u64;

/// Outcome of a single claim attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimOutcome {
    Success,
    Failure,
}

impl ClaimOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimOutcome::Success => "success",
            ClaimOutcome::Failure => "failure",
        }
    }
}

impl fmt::Display for ClaimOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Opaque transaction reference returned by the chain after confirmation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionReference(String);

impl TransactionReference {
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One immutable entry of the claim history ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRecord {
    pub timestamp: DateTime<Utc>,
    pub token_id: TokenId,
    pub outcome: ClaimOutcome,
    /// Transaction hash on success, error message on failure
    pub detail: String,
}

impl ClaimRecord {
    pub fn is_success(&self) -> bool {
        self.outcome == ClaimOutcome::Success
    }
}

/// Parse a comma separated token id list.
///
/// Invalid entries are dropped, duplicates keep their first position.
pub fn parse_token_ids(raw: &str) -> Vec<TokenId> {
    let mut ids: Vec<TokenId> = Vec::new();
    for part in raw.split(',') {
        let Ok(id) = part.trim().parse::<TokenId>() else {
            continue;
        };
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}
