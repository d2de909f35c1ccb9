use thiserror::Error;

use crate::domain::TokenId;

/// Main error type for the claim keeper
#[derive(Error, Debug)]
pub enum KeeperError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration source error: {0}")]
    ConfigSource(#[from] config::ConfigError),

    // Claim errors (recoverable, per attempt)
    #[error("Claim error: {0}")]
    Claim(#[from] ClaimError),

    // Ledger storage errors (logged, never fatal to scheduling)
    #[error("Ledger write error: {0}")]
    LedgerWrite(String),

    // Crypto/signing errors
    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("Address parsing error: {0}")]
    AddressParsing(String),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Scheduler task failed: {0}")]
    Task(String),
}

/// Result type alias for KeeperError
pub type Result<T> = std::result::Result<T, KeeperError>;

/// Failure of a single claim attempt.
///
/// Always turned into a Failure ledger record and a retry; never propagated
/// out of a scheduler loop.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClaimError {
    #[error("Claim tx submission failed: {0}")]
    Submission(String),

    #[error("Tx confirmation failed: {0}")]
    Confirmation(String),

    #[error("Claim tx {tx_hash} reverted for token {token_id}")]
    Reverted { token_id: TokenId, tx_hash: String },

    #[error("Claim call timed out after {elapsed_secs}s")]
    Timeout { elapsed_secs: u64 },
}
