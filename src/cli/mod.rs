//! Claim keeper CLI
//!
//! Commands:
//! - `claim-keeper run` - Run the per-token claim schedulers
//! - `claim-keeper status` - Show the schedule derived from the claim log
//! - `claim-keeper check-key` - Validate the signing key

pub mod runtime;
pub mod status;

pub use runtime::{Cli, Commands};
pub use status::{build_status, print_status, OutputMode, StatusRow};
