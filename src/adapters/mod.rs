pub mod game_contract;
pub mod traits;

pub use game_contract::{GameContractClient, DEFAULT_RPC_URL};
pub use traits::LedgerClient;
#[cfg(test)]
pub use traits::MockLedgerClient;
