//! Notifier configuration

use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Default bound on blocks connected per tick.
pub const DEFAULT_MAX_CATCHUP_BLOCKS: u64 = 100;

/// Chain the node runs on. Only regtest records notified sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
    Regtest,
}

impl FromStr for Network {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "main" | "mainnet" => Ok(Network::Mainnet),
            "test" | "testnet" => Ok(Network::Testnet),
            "regtest" => Ok(Network::Regtest),
            other => Err(ConfigError::UnknownNetwork(other.to_string())),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Unknown network: {0}")]
    UnknownNetwork(String),

    #[error("Tick interval must be non-zero")]
    ZeroTickInterval,

    #[error("Catch-up bound must be at least one block")]
    ZeroCatchupBound,
}

/// Tip notifier configuration
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    /// Cadence; each sleep ends on the next wall-clock multiple of this.
    pub tick_interval: Duration,
    /// Poll period while waiting for the genesis block.
    pub genesis_poll_interval: Duration,
    /// Most blocks connected in one tick.
    pub max_catchup_blocks: u64,
    /// Persist notified sequence numbers after each tick (deterministic mode).
    pub record_sequences: bool,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            genesis_poll_interval: Duration::from_millis(50),
            max_catchup_blocks: DEFAULT_MAX_CATCHUP_BLOCKS,
            record_sequences: false,
        }
    }
}

impl NotifierConfig {
    /// Defaults for `network`.
    pub fn for_network(network: Network) -> Self {
        Self {
            record_sequences: network == Network::Regtest,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval.is_zero() {
            return Err(ConfigError::ZeroTickInterval);
        }
        if self.max_catchup_blocks == 0 {
            return Err(ConfigError::ZeroCatchupBound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = NotifierConfig::default();
        assert_eq!(config.tick_interval, Duration::from_secs(1));
        assert_eq!(config.max_catchup_blocks, 100);
        assert!(!config.record_sequences);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_only_regtest_records_sequences() {
        assert!(NotifierConfig::for_network(Network::Regtest).record_sequences);
        assert!(!NotifierConfig::for_network(Network::Testnet).record_sequences);
        assert!(!NotifierConfig::for_network(Network::Mainnet).record_sequences);
    }

    #[test]
    fn test_network_parse() {
        assert_eq!("regtest".parse::<Network>().unwrap(), Network::Regtest);
        assert_eq!("MAIN".parse::<Network>().unwrap(), Network::Mainnet);
        assert!(matches!(
            "signet".parse::<Network>(),
            Err(ConfigError::UnknownNetwork(_))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let mut config = NotifierConfig::default();
        config.tick_interval = Duration::ZERO;
        assert_eq!(config.validate(), Err(ConfigError::ZeroTickInterval));

        let mut config = NotifierConfig::default();
        config.max_catchup_blocks = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroCatchupBound));
    }
}
