use crate::error::{KeeperError, Result};
use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use tracing::info;
use zeroize::Zeroize;

/// Environment variables consulted for the signing key, in order
pub const PRIVATE_KEY_ENV_VARS: [&str; 2] = ["CLAIM_PRIVATE_KEY", "PRIVATE_KEY"];

/// Wallet for signing claim transactions
///
/// # Security
/// The raw key string is only used during construction and zeroized afterwards.
/// The wallet never hands the key back out.
#[derive(Clone)]
pub struct Wallet {
    signer: PrivateKeySigner,
}

impl Wallet {
    /// Create a wallet from a private key hex string
    ///
    /// Surrounding whitespace, quotes and a `0x` prefix are tolerated.
    pub fn from_private_key(private_key: &str) -> Result<Self> {
        let mut secure_key = private_key
            .trim()
            .trim_matches(|c: char| c == '"' || c == '\'')
            .trim()
            .trim_start_matches("0x")
            .trim_start_matches("0X")
            .to_string();

        let parsed = secure_key.parse::<PrivateKeySigner>();
        secure_key.zeroize();

        let signer =
            parsed.map_err(|e| KeeperError::Wallet(format!("Invalid private key: {}", e)))?;

        info!("Wallet initialized: {} (private key zeroized from memory)", signer.address());

        Ok(Self { signer })
    }

    /// Create a wallet from `CLAIM_PRIVATE_KEY` or `PRIVATE_KEY`
    pub fn from_env() -> Result<Self> {
        let mut private_key = PRIVATE_KEY_ENV_VARS
            .iter()
            .find_map(|name| std::env::var(name).ok().filter(|v| !v.trim().is_empty()))
            .ok_or_else(|| {
                KeeperError::Wallet(
                    "CLAIM_PRIVATE_KEY or PRIVATE_KEY environment variable not set".to_string(),
                )
            })?;

        let result = Self::from_private_key(&private_key);
        private_key.zeroize();

        result
    }

    /// Get the wallet address
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Signer wrapped for alloy providers
    pub fn ethereum_wallet(&self) -> EthereumWallet {
        EthereumWallet::from(self.signer.clone())
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address())
            .finish()
    }
}

/// Common causes of a rejected key, printed by `check-key`
pub fn key_format_hints() -> &'static [&'static str] {
    &[
        "Wrong length (64 hex characters, 66 with the 0x prefix)",
        "Non-hex characters in the key",
        "Extra quotes or spaces around the value in .env",
    ]
}
