//! Schedule maths and per-token state
//!
//! Everything here is a pure function of the last outcome and the current time,
//! so the timing rules can be tested without timers.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::domain::TokenId;

/// Default minimum interval between successful claims (8 hours)
pub const DEFAULT_INTERVAL_SECS: u64 = 28_800;
/// Default backoff after a failed attempt (1 hour)
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 3_600;
/// Default ceiling on a single claim call
pub const DEFAULT_CLAIM_TIMEOUT_SECS: u64 = 300;

/// Timing configuration shared by all token schedulers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimScheduleConfig {
    /// Minimum time between successful claims for one token
    pub interval: Duration,
    /// Fixed delay before retrying after a failure
    pub retry_delay: Duration,
    /// Upper bound on one claim call (`None` waits forever)
    pub claim_timeout: Option<Duration>,
}

impl Default for ClaimScheduleConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            retry_delay: Duration::from_secs(DEFAULT_RETRY_DELAY_SECS),
            claim_timeout: Some(Duration::from_secs(DEFAULT_CLAIM_TIMEOUT_SECS)),
        }
    }
}

/// Scheduler phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchedulePhase {
    /// Waiting for the next due time
    Idle,
    /// Claim in flight
    Executing,
    /// Waiting out the retry delay after a failure
    CoolingDown,
}

impl SchedulePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchedulePhase::Idle => "IDLE",
            SchedulePhase::Executing => "EXECUTING",
            SchedulePhase::CoolingDown => "COOLING_DOWN",
        }
    }

    /// Check if this phase can transition to another phase
    pub fn can_transition_to(&self, target: SchedulePhase) -> bool {
        use SchedulePhase::*;

        matches!(
            (self, target),
            (Idle, Executing) | (Executing, Idle) | (Executing, CoolingDown) | (CoolingDown, Executing)
        )
    }
}

impl fmt::Display for SchedulePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// When a scheduler should next execute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    Immediate,
    At(DateTime<Utc>),
}

impl Wake {
    pub fn is_immediate(&self) -> bool {
        matches!(self, Wake::Immediate)
    }
}

/// In-memory schedule for one token, rebuilt from the ledger on startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleState {
    pub token_id: TokenId,
    pub last_success: Option<DateTime<Utc>>,
    pub phase: SchedulePhase,
    /// Pending wake-up; `None` while executing
    pub next_wake: Option<DateTime<Utc>>,
}

impl ScheduleState {
    pub fn new(token_id: TokenId) -> Self {
        Self {
            token_id,
            last_success: None,
            phase: SchedulePhase::Idle,
            next_wake: None,
        }
    }
}

pub(crate) fn to_chrono(duration: Duration) -> ChronoDuration {
    ChronoDuration::from_std(duration).unwrap_or(ChronoDuration::MAX)
}

/// Earliest time the next claim is allowed, `None` when never claimed
pub fn next_due(last_success: Option<DateTime<Utc>>, interval: Duration) -> Option<DateTime<Utc>> {
    last_success.map(|last| {
        last.checked_add_signed(to_chrono(interval))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    })
}

/// Startup decision: execute now if never claimed or already due
pub fn initial_wake(
    last_success: Option<DateTime<Utc>>,
    interval: Duration,
    now: DateTime<Utc>,
) -> Wake {
    match next_due(last_success, interval) {
        Some(due) if due > now => Wake::At(due),
        _ => Wake::Immediate,
    }
}

/// Time left until `deadline`; zero when the deadline has passed
pub fn wait_duration(deadline: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    (deadline - now).to_std().unwrap_or(Duration::ZERO)
}

/// Wake-up time after an attempt that finished at `now`
pub fn wake_after_attempt(succeeded: bool, now: DateTime<Utc>, config: &ClaimScheduleConfig) -> DateTime<Utc> {
    let delay = if succeeded {
        config.interval
    } else {
        config.retry_delay
    };
    now.checked_add_signed(to_chrono(delay))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
