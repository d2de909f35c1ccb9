//! Coordinator - one scheduler per configured token
//!
//! Startup is sequential in declared order: each token is evaluated against the
//! ledger and, when due, claimed before the next token is looked at. Each
//! scheduler becomes its own task as soon as its startup step is done, so a
//! token waiting for its due time never waits on a later token's claim.

use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::clock::Clock;
use crate::domain::TokenId;
use crate::error::{KeeperError, Result};
use crate::strategy::{ClaimExecutor, ClaimScheduleConfig, TokenScheduler, Wake};

/// Startup evaluation for one token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartupDecision {
    pub token_id: TokenId,
    pub wake: Wake,
}

/// Owns the scheduler tasks after startup
pub struct CoordinatorHandle {
    tasks: JoinSet<TokenId>,
    decisions: Vec<StartupDecision>,
}

impl CoordinatorHandle {
    /// Startup decisions in declared order
    pub fn decisions(&self) -> &[StartupDecision] {
        &self.decisions
    }

    /// Number of scheduler tasks still running
    pub fn running(&self) -> usize {
        self.tasks.len()
    }

    /// Wait on the scheduler tasks. They do not finish in normal operation.
    pub async fn wait(mut self) -> Result<()> {
        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok(token_id) => warn!("[TokenID: {}] Scheduler exited", token_id),
                Err(e) if e.is_panic() => error!("Scheduler task panicked: {}", e),
                Err(e) => warn!("Scheduler task ended: {}", e),
            }
        }
        Err(KeeperError::Task("all schedulers stopped".into()))
    }

    /// Abort every scheduler task
    pub async fn shutdown(mut self) {
        self.tasks.shutdown().await;
        info!("All schedulers stopped");
    }
}

/// Creates and starts exactly one scheduler per token id
pub struct ClaimCoordinator {
    token_ids: Vec<TokenId>,
    config: ClaimScheduleConfig,
    executor: Arc<ClaimExecutor>,
    clock: Arc<dyn Clock>,
}

impl ClaimCoordinator {
    pub fn new(
        token_ids: Vec<TokenId>,
        config: ClaimScheduleConfig,
        executor: Arc<ClaimExecutor>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let mut distinct: Vec<TokenId> = Vec::with_capacity(token_ids.len());
        for id in token_ids {
            if !distinct.contains(&id) {
                distinct.push(id);
            }
        }
        if distinct.is_empty() {
            return Err(KeeperError::Config("no token ids to schedule".into()));
        }

        Ok(Self {
            token_ids: distinct,
            config,
            executor,
            clock,
        })
    }

    pub fn token_ids(&self) -> &[TokenId] {
        &self.token_ids
    }

    /// Evaluate every token in order, awaiting immediate claims one at a time.
    ///
    /// `ready` receives each scheduler as soon as its startup step is done, so a
    /// token waiting for its due time is handed off before later tokens claim.
    async fn startup<F>(&self, mut ready: F)
    where
        F: FnMut(TokenScheduler, StartupDecision),
    {
        info!("=== Startup - checking {} token(s) ===", self.token_ids.len());

        for &token_id in &self.token_ids {
            info!("--- Checking TokenID: {} ---", token_id);
            let mut scheduler = TokenScheduler::new(
                token_id,
                self.config,
                self.executor.clone(),
                self.clock.clone(),
            );

            let wake = scheduler.evaluate();
            if wake.is_immediate() {
                scheduler.execute_once().await;
            }
            ready(scheduler, StartupDecision { token_id, wake });
        }

        info!("=== Startup checks complete ===");
    }

    /// Startup pass only; nothing keeps running afterwards
    pub async fn run_startup_pass(&self) -> Vec<(TokenScheduler, StartupDecision)> {
        let mut evaluated = Vec::with_capacity(self.token_ids.len());
        self.startup(|scheduler, decision| evaluated.push((scheduler, decision)))
            .await;
        evaluated
    }

    /// Run the startup pass, spawning each scheduler as an independent task the
    /// moment its own startup step completes
    pub async fn start(self) -> CoordinatorHandle {
        let mut tasks = JoinSet::new();
        let mut decisions = Vec::with_capacity(self.token_ids.len());

        self.startup(|scheduler, decision| {
            let token_id = scheduler.token_id();
            tasks.spawn(async move {
                scheduler.run().await;
                token_id
            });
            decisions.push(decision);
        })
        .await;

        CoordinatorHandle { tasks, decisions }
    }

    /// Start and run until every scheduler task has ended
    pub async fn run(self) -> Result<()> {
        self.start().await.wait().await
    }
}
