//! # Node Configuration
//!
//! Runtime parameters, loaded from environment variables on top of
//! defaults. Malformed values are logged and ignored.
//!
//! | Variable | Field |
//! |----------|-------|
//! | `NODE_NETWORK` | `network` (`main`, `test`, `regtest`) |
//! | `NODE_NOTIFY_MAX_BLOCKS` | `notifier.max_catchup_blocks` |
//! | `NODE_NOTIFY_TICK_MS` | `notifier.tick_interval` |
//! | `NODE_TEST_SAFE_MODE` | `test_safe_mode` |
//! | `RUST_LOG` | `log_filter` |

use std::time::Duration;
use tip_notifier::{ConfigError, Network, NotifierConfig};
use tracing::warn;

/// Complete node configuration.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Chain the node runs on.
    pub network: Network,
    /// Tip notifier parameters.
    pub notifier: NotifierConfig,
    /// `tracing` filter directive.
    pub log_filter: String,
    /// Surface the test-safe-mode warning.
    pub test_safe_mode: bool,
    /// Build is not a release; shows the pre-release notice.
    pub pre_release: bool,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self::for_network(Network::Mainnet)
    }
}

impl NodeConfig {
    pub fn for_network(network: Network) -> Self {
        Self {
            network,
            notifier: NotifierConfig::for_network(network),
            log_filter: "info".to_string(),
            test_safe_mode: false,
            pre_release: cfg!(debug_assertions),
        }
    }

    /// Build from `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let network = match lookup("NODE_NETWORK") {
            Some(value) => value.parse().unwrap_or_else(|e: ConfigError| {
                warn!("[node] Ignoring NODE_NETWORK: {}", e);
                Network::default()
            }),
            None => Network::default(),
        };
        let mut config = Self::for_network(network);

        if let Some(value) = lookup("NODE_NOTIFY_MAX_BLOCKS") {
            match value.parse::<u64>() {
                Ok(max) if max > 0 => config.notifier.max_catchup_blocks = max,
                _ => warn!("[node] Ignoring NODE_NOTIFY_MAX_BLOCKS={}", value),
            }
        }

        if let Some(value) = lookup("NODE_NOTIFY_TICK_MS") {
            match value.parse::<u64>() {
                Ok(ms) if ms > 0 => config.notifier.tick_interval = Duration::from_millis(ms),
                _ => warn!("[node] Ignoring NODE_NOTIFY_TICK_MS={}", value),
            }
        }

        if let Some(value) = lookup("NODE_TEST_SAFE_MODE") {
            match parse_flag(&value) {
                Some(flag) => config.test_safe_mode = flag,
                None => warn!("[node] Ignoring NODE_TEST_SAFE_MODE={}", value),
            }
        }

        if let Some(filter) = lookup("RUST_LOG") {
            config.log_filter = filter;
        }

        config
    }

    /// Build from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.notifier.validate()
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
