//! Claim client for the game contract
//!
//! Sends `claim(tokenId)` from the keeper wallet and waits for the receipt.

use alloy::network::{EthereumWallet, ReceiptResponse};
use alloy::primitives::{Address, U256};
use alloy::providers::ProviderBuilder;
use alloy::sol;
use alloy::transports::http::reqwest::Url;
use async_trait::async_trait;
use tracing::info;

use super::traits::LedgerClient;
use crate::domain::{TokenId, TransactionReference};
use crate::error::{ClaimError, KeeperError, Result};
use crate::signing::Wallet;

pub const DEFAULT_RPC_URL: &str = "https://rpc.berachain.com";

// Generate contract bindings for the reward game
sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IRewardGame {
        /// Claim accrued rewards for a token
        function claim(uint256 tokenId) external;
    }
}

/// alloy-backed client for the game contract's `claim` function
pub struct GameContractClient {
    rpc_url: Url,
    contract: Address,
    wallet: EthereumWallet,
    confirmations: u64,
}

impl GameContractClient {
    pub fn new(
        rpc_url: &str,
        contract_address: &str,
        wallet: &Wallet,
        confirmations: u64,
    ) -> Result<Self> {
        let rpc_url: Url = rpc_url
            .trim()
            .parse()
            .map_err(|e| KeeperError::AddressParsing(format!("Invalid RPC URL: {}", e)))?;
        let contract: Address = contract_address.trim().parse().map_err(|e| {
            KeeperError::AddressParsing(format!("Invalid game contract address: {}", e))
        })?;

        info!("Wallet address: {}", wallet.address());
        info!("Game contract address: {}", contract);

        Ok(Self {
            rpc_url,
            contract,
            wallet: wallet.ethereum_wallet(),
            confirmations: confirmations.max(1),
        })
    }

    pub fn contract(&self) -> Address {
        self.contract
    }
}

#[async_trait]
impl LedgerClient for GameContractClient {
    async fn submit_claim(
        &self,
        token_id: TokenId,
    ) -> std::result::Result<TransactionReference, ClaimError> {
        let provider = ProviderBuilder::new()
            .wallet(self.wallet.clone())
            .connect_http(self.rpc_url.clone());
        let contract = IRewardGame::new(self.contract, provider);

        let pending = contract
            .claim(U256::from(token_id))
            .send()
            .await
            .map_err(|e| ClaimError::Submission(e.to_string()))?;

        let tx_hash = *pending.tx_hash();
        info!("[TokenID: {}] Transaction submitted, hash: {:?}", token_id, tx_hash);

        let receipt = pending
            .with_required_confirmations(self.confirmations)
            .get_receipt()
            .await
            .map_err(|e| ClaimError::Confirmation(e.to_string()))?;

        if !receipt.status() {
            return Err(ClaimError::Reverted {
                token_id,
                tx_hash: format!("{:?}", receipt.transaction_hash),
            });
        }

        info!(
            "[TokenID: {}] Transaction confirmed in block {:?}",
            token_id, receipt.block_number
        );

        Ok(TransactionReference::new(format!(
            "{:?}",
            receipt.transaction_hash
        )))
    }
}
