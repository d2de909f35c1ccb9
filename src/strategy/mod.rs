//! Claim strategy
//!
//! - `schedule` - pure timing rules and per-token state
//! - `executor` - one claim attempt, one ledger record
//! - `scheduler` - per-token state machine loop

pub mod executor;
pub mod schedule;
pub mod scheduler;

pub use executor::ClaimExecutor;
pub use schedule::{
    initial_wake, next_due, wait_duration, wake_after_attempt, ClaimScheduleConfig, SchedulePhase,
    ScheduleState, Wake,
};
pub use scheduler::TokenScheduler;
