//! Claim executor
//!
//! Wraps one call of the ledger client for one token and records the outcome.

use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use crate::adapters::LedgerClient;
use crate::domain::{ClaimOutcome, TokenId, TransactionReference};
use crate::error::ClaimError;
use crate::persistence::HistoryLedger;

/// Executes single claim attempts. Never retries.
pub struct ClaimExecutor {
    client: Arc<dyn LedgerClient>,
    ledger: Arc<HistoryLedger>,
    call_timeout: Option<Duration>,
}

impl ClaimExecutor {
    pub fn new(
        client: Arc<dyn LedgerClient>,
        ledger: Arc<HistoryLedger>,
        call_timeout: Option<Duration>,
    ) -> Self {
        Self {
            client,
            ledger,
            call_timeout,
        }
    }

    pub fn ledger(&self) -> &Arc<HistoryLedger> {
        &self.ledger
    }

    /// Run one claim for `token_id`.
    ///
    /// Exactly one ledger record is written before this returns, whatever the outcome.
    pub async fn execute(&self, token_id: TokenId) -> Result<TransactionReference, ClaimError> {
        info!("[TokenID: {}] Starting claim...", token_id);

        let call = self.client.submit_claim(token_id);
        let result = match self.call_timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => Err(ClaimError::Timeout {
                    elapsed_secs: limit.as_secs(),
                }),
            },
            None => call.await,
        };

        match &result {
            Ok(tx) => {
                info!("[TokenID: {}] Claim succeeded, tx: {}", token_id, tx);
                self.record(token_id, ClaimOutcome::Success, tx.to_string())
                    .await;
            }
            Err(e) => {
                error!("[TokenID: {}] Claim failed: {}", token_id, e);
                self.record(token_id, ClaimOutcome::Failure, e.to_string())
                    .await;
            }
        }

        result
    }

    async fn record(&self, token_id: TokenId, outcome: ClaimOutcome, detail: String) {
        let ledger = self.ledger.clone();
        let write =
            tokio::task::spawn_blocking(move || ledger.append(token_id, outcome, &detail)).await;
        if let Err(e) = write {
            error!("[TokenID: {}] Claim log write task failed: {}", token_id, e);
        }
    }
}
