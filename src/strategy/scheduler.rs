//! Per-token scheduler
//!
//! One instance per token id. It owns its schedule state and runs as an explicit
//! loop: sleep until the pending wake-up, execute, compute the next wake-up.

use chrono::{DateTime, Local, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::executor::ClaimExecutor;
use super::schedule::{
    initial_wake, next_due, wait_duration, wake_after_attempt, ClaimScheduleConfig, SchedulePhase,
    ScheduleState, Wake,
};
use crate::clock::Clock;
use crate::domain::TokenId;

pub(crate) fn local_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// Schedule state machine for a single token
pub struct TokenScheduler {
    state: ScheduleState,
    config: ClaimScheduleConfig,
    executor: Arc<ClaimExecutor>,
    clock: Arc<dyn Clock>,
}

impl TokenScheduler {
    pub fn new(
        token_id: TokenId,
        config: ClaimScheduleConfig,
        executor: Arc<ClaimExecutor>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            state: ScheduleState::new(token_id),
            config,
            executor,
            clock,
        }
    }

    pub fn token_id(&self) -> TokenId {
        self.state.token_id
    }

    pub fn state(&self) -> &ScheduleState {
        &self.state
    }

    fn transition(&mut self, target: SchedulePhase) {
        if !self.state.phase.can_transition_to(target) {
            warn!(
                "[TokenID: {}] Unexpected phase change {} -> {}",
                self.state.token_id, self.state.phase, target
            );
        }
        debug!(
            "[TokenID: {}] {} -> {}",
            self.state.token_id, self.state.phase, target
        );
        self.state.phase = target;
    }

    /// Startup decision from the ledger: execute now, or wait for the due time
    pub fn evaluate(&mut self) -> Wake {
        let token_id = self.state.token_id;
        let now = self.clock.now();
        let last_success = self.executor.ledger().last_success(token_id);
        self.state.last_success = last_success;

        if let (Some(last), Some(due)) = (last_success, next_due(last_success, self.config.interval)) {
            info!(
                "[TokenID: {}] Last claim: {} UTC ({} local)",
                token_id,
                last.format("%Y-%m-%d %H:%M:%S"),
                local_time(last)
            );
            info!(
                "[TokenID: {}] Next claim due: {} UTC ({} local)",
                token_id,
                due.format("%Y-%m-%d %H:%M:%S"),
                local_time(due)
            );
        }

        let wake = initial_wake(last_success, self.config.interval, now);
        match wake {
            Wake::Immediate => {
                if last_success.is_some() {
                    info!("[TokenID: {}] Past scheduled time, claiming now", token_id);
                } else {
                    info!("[TokenID: {}] No previous successful claim, claiming now", token_id);
                }
                self.state.next_wake = None;
            }
            Wake::At(due) => {
                let wait = wait_duration(due, now);
                info!(
                    "[TokenID: {}] Next claim in {} minutes (~{:.1} hours)",
                    token_id,
                    (wait.as_secs_f64() / 60.0).round(),
                    wait.as_secs_f64() / 3600.0
                );
                self.reschedule(due);
            }
        }
        wake
    }

    /// Replace the pending wake-up
    pub fn reschedule(&mut self, at: DateTime<Utc>) {
        self.state.next_wake = Some(at);
    }

    /// Run one claim attempt and schedule the next wake-up. Returns that wake-up time.
    pub async fn execute_once(&mut self) -> DateTime<Utc> {
        let token_id = self.state.token_id;
        self.transition(SchedulePhase::Executing);
        self.state.next_wake = None;

        let result = self.executor.execute(token_id).await;
        let now = self.clock.now();
        let succeeded = result.is_ok();
        let next = wake_after_attempt(succeeded, now, &self.config);

        if succeeded {
            self.state.last_success = Some(now);
            self.transition(SchedulePhase::Idle);
            info!(
                "[TokenID: {}] Claim done. Next claim at {} UTC ({} local)",
                token_id,
                next.format("%Y-%m-%d %H:%M:%S"),
                local_time(next)
            );
        } else {
            self.transition(SchedulePhase::CoolingDown);
            info!(
                "[TokenID: {}] Claim failed, retrying in {} minutes at {} UTC",
                token_id,
                self.config.retry_delay.as_secs() / 60,
                next.format("%Y-%m-%d %H:%M:%S")
            );
        }

        self.reschedule(next);
        next
    }

    /// Sleep until `deadline` on this scheduler's clock
    pub async fn sleep_until(&self, deadline: DateTime<Utc>) {
        loop {
            let wait = wait_duration(deadline, self.clock.now());
            if wait.is_zero() {
                return;
            }
            tokio::time::sleep(wait).await;
        }
    }

    /// Run forever: wait for the pending wake-up, execute, repeat
    pub async fn run(mut self) {
        loop {
            if let Some(deadline) = self.state.next_wake {
                self.sleep_until(deadline).await;
            }
            self.execute_once().await;
        }
    }
}
