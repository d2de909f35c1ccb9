#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use claim_keeper::{
    ClaimError, ClaimExecutor, ClaimScheduleConfig, Clock, HistoryLedger, LedgerClient, TokenId,
    TransactionReference,
};
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// Wall clock driven by tokio's (pausable) clock, anchored at `base`
pub struct TokioClock {
    base: DateTime<Utc>,
    start: tokio::time::Instant,
}

impl TokioClock {
    pub fn new(base: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self {
            base,
            start: tokio::time::Instant::now(),
        })
    }
}

impl Clock for TokioClock {
    fn now(&self) -> DateTime<Utc> {
        self.base + chrono::Duration::from_std(self.start.elapsed()).unwrap()
    }
}

/// Client that records every call and fails for selected tokens
pub struct ScriptedClient {
    clock: Arc<TokioClock>,
    failing: HashSet<TokenId>,
    latency: Duration,
    calls: Mutex<Vec<(TokenId, DateTime<Utc>)>>,
}

impl ScriptedClient {
    pub fn new(clock: Arc<TokioClock>) -> Self {
        Self {
            clock,
            failing: HashSet::new(),
            latency: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(mut self, token_id: TokenId) -> Self {
        self.failing.insert(token_id);
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn calls(&self) -> Vec<(TokenId, DateTime<Utc>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, token_id: TokenId) -> Vec<DateTime<Utc>> {
        self.calls()
            .into_iter()
            .filter(|(id, _)| *id == token_id)
            .map(|(_, at)| at)
            .collect()
    }
}

#[async_trait]
impl LedgerClient for ScriptedClient {
    async fn submit_claim(&self, token_id: TokenId) -> Result<TransactionReference, ClaimError> {
        self.calls.lock().unwrap().push((token_id, self.clock.now()));
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.failing.contains(&token_id) {
            Err(ClaimError::Submission("execution reverted".into()))
        } else {
            Ok(TransactionReference::new("0xabc"))
        }
    }
}

pub fn schedule(interval_secs: u64) -> ClaimScheduleConfig {
    ClaimScheduleConfig {
        interval: Duration::from_secs(interval_secs),
        retry_delay: Duration::from_secs(3_600),
        claim_timeout: None,
    }
}

pub fn executor(
    client: Arc<ScriptedClient>,
    log: &Path,
    clock: Arc<TokioClock>,
) -> (Arc<ClaimExecutor>, Arc<HistoryLedger>) {
    let ledger = Arc::new(HistoryLedger::open(log, clock));
    let executor = Arc::new(ClaimExecutor::new(client, ledger.clone(), None));
    (executor, ledger)
}

/// Assert two instants are within one second of each other
pub fn assert_close(actual: DateTime<Utc>, expected: DateTime<Utc>) {
    let drift = (actual - expected).num_milliseconds().abs();
    assert!(
        drift <= 1_000,
        "expected {expected}, got {actual} ({drift}ms apart)"
    );
}
