//! Claim coordinator
//!
//! Builds one scheduler per configured token, runs the ordered startup pass and
//! hands the schedulers to independent tasks.

pub mod coordinator;

pub use coordinator::{ClaimCoordinator, CoordinatorHandle, StartupDecision};
