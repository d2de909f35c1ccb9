use async_trait::async_trait;

use crate::domain::{TokenId, TransactionReference};
use crate::error::ClaimError;

/// Capability to submit one claim for one token and wait for its receipt.
///
/// Implementations must not retry; the scheduler owns the retry policy.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerClient: Send + Sync {
    async fn submit_claim(&self, token_id: TokenId) -> Result<TransactionReference, ClaimError>;
}
