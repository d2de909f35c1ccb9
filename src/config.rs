use config::{Config, Environment, File, Map};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::adapters::DEFAULT_RPC_URL;
use crate::domain::{parse_token_ids, TokenId};
use crate::error::{KeeperError, Result};
use crate::strategy::schedule::{
    ClaimScheduleConfig, DEFAULT_CLAIM_TIMEOUT_SECS, DEFAULT_INTERVAL_SECS,
    DEFAULT_RETRY_DELAY_SECS,
};

/// Plain environment variables accepted as overrides, mapped to config keys
const PLAIN_ENV_OVERRIDES: [(&str, &str); 4] = [
    ("RPC_URL", "chain.rpc_url"),
    ("GAME_CONTRACT_ADDRESS", "chain.contract_address"),
    ("TOKEN_IDS", "schedule.token_ids"),
    ("CHECK_INTERVAL", "schedule.interval_secs"),
];

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub chain: ChainConfig,
    pub schedule: ScheduleConfig,
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    /// JSON-RPC endpoint
    pub rpc_url: String,
    /// Game contract exposing `claim(uint256)`
    #[serde(default)]
    pub contract_address: Option<String>,
    /// Confirmations to wait for before a claim counts as done
    #[serde(default = "default_confirmations")]
    pub confirmations: u64,
}

fn default_confirmations() -> u64 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    /// Comma separated token ids, e.g. "1,2,3"
    #[serde(default)]
    pub token_ids: String,
    /// Minimum seconds between successful claims per token
    pub interval_secs: u64,
    /// Seconds to wait before retrying a failed claim
    pub retry_delay_secs: u64,
    /// Ceiling on one claim call in seconds (0 disables)
    pub claim_timeout_secs: u64,
}

impl ScheduleConfig {
    /// Distinct valid token ids in declared order
    pub fn token_ids(&self) -> Vec<TokenId> {
        parse_token_ids(&self.token_ids)
    }

    pub fn to_schedule(&self) -> ClaimScheduleConfig {
        ClaimScheduleConfig {
            interval: Duration::from_secs(self.interval_secs),
            retry_delay: Duration::from_secs(self.retry_delay_secs),
            claim_timeout: (self.claim_timeout_secs > 0)
                .then(|| Duration::from_secs(self.claim_timeout_secs)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Append-only claim log
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        Self::load_with_env(config_dir, std::env::vars().collect())
    }

    /// Load configuration from a directory with an explicit set of environment variables
    pub fn load_with_env<P: AsRef<Path>>(config_dir: P, env: Map<String, String>) -> Result<Self> {
        let config_dir = config_dir.as_ref();
        let env_file = env
            .get("CLAIM_ENV")
            .cloned()
            .unwrap_or_else(|| "development".to_string());

        let mut builder = Config::builder()
            // Start with default values
            .set_default("chain.rpc_url", DEFAULT_RPC_URL)?
            .set_default("chain.confirmations", 1)?
            .set_default("schedule.token_ids", "")?
            .set_default("schedule.interval_secs", DEFAULT_INTERVAL_SECS)?
            .set_default("schedule.retry_delay_secs", DEFAULT_RETRY_DELAY_SECS)?
            .set_default("schedule.claim_timeout_secs", DEFAULT_CLAIM_TIMEOUT_SECS)?
            .set_default("ledger.path", "claim_log.txt")?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(File::from(config_dir.join(env_file)).required(false))
            // Override with environment variables (CLAIM__SCHEDULE__TOKEN_IDS, etc.)
            .add_source(
                Environment::with_prefix("CLAIM")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .source(Some(env.clone())),
            );

        // Plain variables from .env files win over everything else
        for (var, key) in PLAIN_ENV_OVERRIDES {
            let value = env.get(var).filter(|v| !v.trim().is_empty()).cloned();
            builder = builder.set_override_option(key, value)?;
        }

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Validate configuration values. `live` also requires chain settings.
    pub fn validate(&self, live: bool) -> Result<()> {
        let mut errors = Vec::new();

        if self.schedule.token_ids().is_empty() {
            errors.push(
                "TOKEN_IDS is empty or invalid; provide a comma separated list of numbers"
                    .to_string(),
            );
        }

        if self.schedule.interval_secs == 0 {
            errors.push("interval_secs must be positive".to_string());
        }

        if live {
            let missing_contract = self
                .chain
                .contract_address
                .as_deref()
                .map(|a| a.trim().is_empty())
                .unwrap_or(true);
            if missing_contract {
                errors.push("GAME_CONTRACT_ADDRESS is not set".to_string());
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(KeeperError::Config(errors.join("; ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(token_ids: &str) -> AppConfig {
        AppConfig {
            chain: ChainConfig {
                rpc_url: DEFAULT_RPC_URL.to_string(),
                contract_address: Some("0x0000000000000000000000000000000000000001".into()),
                confirmations: 1,
            },
            schedule: ScheduleConfig {
                token_ids: token_ids.to_string(),
                interval_secs: DEFAULT_INTERVAL_SECS,
                retry_delay_secs: DEFAULT_RETRY_DELAY_SECS,
                claim_timeout_secs: 0,
            },
            ledger: LedgerConfig {
                path: "claim_log.txt".into(),
            },
            logging: LoggingConfig::default(),
        }
    }

    #[test]
    fn test_validate_rejects_empty_token_list() {
        let err = sample("abc, ,").validate(false).unwrap_err();
        assert!(matches!(err, KeeperError::Config(_)));
        assert!(sample("1,2").validate(true).is_ok());
    }

    #[test]
    fn test_validate_live_requires_contract() {
        let mut config = sample("1");
        config.chain.contract_address = None;
        assert!(config.validate(false).is_ok());
        assert!(config.validate(true).is_err());
    }

    #[test]
    fn test_zero_timeout_disables_call_timeout() {
        let schedule = sample("1").schedule.to_schedule();
        assert_eq!(schedule.interval, Duration::from_secs(28_800));
        assert_eq!(schedule.retry_delay, Duration::from_secs(3_600));
        assert!(schedule.claim_timeout.is_none());
    }

    fn write_default_toml(dir: &tempfile::TempDir) {
        std::fs::write(
            dir.path().join("default.toml"),
            r#"
[chain]
contract_address = "0x0000000000000000000000000000000000000002"

[schedule]
token_ids = "4,5,4"
interval_secs = 600

[ledger]
path = "/tmp/claims.txt"
"#,
        )
        .unwrap();
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        write_default_toml(&dir);

        let config = AppConfig::load_with_env(dir.path(), Map::new()).unwrap();
        assert_eq!(config.schedule.token_ids(), vec![4, 5]);
        assert_eq!(config.schedule.interval_secs, 600);
        assert_eq!(config.schedule.retry_delay_secs, DEFAULT_RETRY_DELAY_SECS);
        assert_eq!(config.ledger.path, "/tmp/claims.txt");
        assert_eq!(config.chain.rpc_url, DEFAULT_RPC_URL);
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        write_default_toml(&dir);

        let mut env = Map::new();
        env.insert("TOKEN_IDS".to_string(), "9, 8".to_string());
        env.insert("CHECK_INTERVAL".to_string(), "120".to_string());
        env.insert("CLAIM__SCHEDULE__RETRY_DELAY_SECS".to_string(), "60".to_string());
        env.insert("RPC_URL".to_string(), "  ".to_string());

        let config = AppConfig::load_with_env(dir.path(), env).unwrap();
        assert_eq!(config.schedule.token_ids(), vec![9, 8]);
        assert_eq!(config.schedule.interval_secs, 120);
        assert_eq!(config.schedule.retry_delay_secs, 60);
        // Blank values fall through to lower layers
        assert_eq!(config.chain.rpc_url, DEFAULT_RPC_URL);
    }
}
