//! Service configuration.
//!
//! Read from environment variables at startup:
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `OFFLINE_QUEUE_STATE_DIR` | `./state` | Snapshot and command log directory |
//! | `OFFLINE_QUEUE_LISTEN_ADDR` | `0.0.0.0:3000` | HTTP listen address |
//! | `OFFLINE_QUEUE_KEEP_UNSCOPED` | `false` | Keep entries without an appointment id when pruning |
//! | `OFFLINE_QUEUE_COMPACT_AFTER` | `1000` | Logged commands between compactions |

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use crate::state::{QueueConfig, StaleEntryPolicy};
use crate::store::DEFAULT_COMPACT_AFTER;

pub const ENV_STATE_DIR: &str = "OFFLINE_QUEUE_STATE_DIR";
pub const ENV_LISTEN_ADDR: &str = "OFFLINE_QUEUE_LISTEN_ADDR";
pub const ENV_KEEP_UNSCOPED: &str = "OFFLINE_QUEUE_KEEP_UNSCOPED";
pub const ENV_COMPACT_AFTER: &str = "OFFLINE_QUEUE_COMPACT_AFTER";

const DEFAULT_STATE_DIR: &str = "./state";
const DEFAULT_LISTEN_ADDR: ([u8; 4], u16) = ([0, 0, 0, 0], 3000);

/// An environment variable held a value that could not be used.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid value for {var}: {value:?} ({reason})")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
    pub reason: &'static str,
}

/// Everything the binary needs to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub state_dir: PathBuf,
    pub listen_addr: SocketAddr,
    pub queue: QueueConfig,
    pub compact_after: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceConfig {
    /// Creates a `ServiceConfig` with default values.
    pub fn new() -> Self {
        ServiceConfig {
            state_dir: PathBuf::from(DEFAULT_STATE_DIR),
            listen_addr: SocketAddr::from(DEFAULT_LISTEN_ADDR),
            queue: QueueConfig::default(),
            compact_after: DEFAULT_COMPACT_AFTER,
        }
    }

    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, falling back to defaults for
    /// unset variables.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::new();

        if let Some(dir) = lookup(ENV_STATE_DIR) {
            config.state_dir = PathBuf::from(dir);
        }

        if let Some(addr) = lookup(ENV_LISTEN_ADDR) {
            config.listen_addr = addr.parse().map_err(|_| ConfigError {
                var: ENV_LISTEN_ADDR,
                value: addr.clone(),
                reason: "expected host:port",
            })?;
        }

        if let Some(flag) = lookup(ENV_KEEP_UNSCOPED) {
            let keep = parse_bool(&flag).ok_or_else(|| ConfigError {
                var: ENV_KEEP_UNSCOPED,
                value: flag.clone(),
                reason: "expected true or false",
            })?;
            let policy = if keep {
                StaleEntryPolicy::KeepUnscoped
            } else {
                StaleEntryPolicy::DropUnscoped
            };
            config.queue = config.queue.with_stale_policy(policy);
        }

        if let Some(count) = lookup(ENV_COMPACT_AFTER) {
            config.compact_after = count
                .parse::<u64>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| ConfigError {
                    var: ENV_COMPACT_AFTER,
                    value: count.clone(),
                    reason: "expected a positive integer",
                })?;
        }

        Ok(config)
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_set() {
        let config = ServiceConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, ServiceConfig::new());
        assert_eq!(config.queue.stale_policy, StaleEntryPolicy::DropUnscoped);
        assert_eq!(config.listen_addr.port(), 3000);
    }

    #[test]
    fn reads_all_variables() {
        let config = ServiceConfig::from_lookup(lookup_from(&[
            (ENV_STATE_DIR, "/var/lib/offline-queue"),
            (ENV_LISTEN_ADDR, "127.0.0.1:8080"),
            (ENV_KEEP_UNSCOPED, "TRUE"),
            (ENV_COMPACT_AFTER, "50"),
        ]))
        .unwrap();

        assert_eq!(config.state_dir, PathBuf::from("/var/lib/offline-queue"));
        assert_eq!(config.listen_addr, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.queue.stale_policy, StaleEntryPolicy::KeepUnscoped);
        assert_eq!(config.compact_after, 50);
    }

    #[test]
    fn invalid_listen_addr_is_rejected() {
        let err = ServiceConfig::from_lookup(lookup_from(&[(ENV_LISTEN_ADDR, "nowhere")])).unwrap_err();
        assert_eq!(err.var, ENV_LISTEN_ADDR);
    }

    #[test]
    fn invalid_flag_is_rejected() {
        let err = ServiceConfig::from_lookup(lookup_from(&[(ENV_KEEP_UNSCOPED, "maybe")])).unwrap_err();
        assert_eq!(err.var, ENV_KEEP_UNSCOPED);
        assert!(err.to_string().contains("maybe"));
    }

    #[test]
    fn zero_compaction_threshold_is_rejected() {
        assert!(ServiceConfig::from_lookup(lookup_from(&[(ENV_COMPACT_AFTER, "0")])).is_err());
        assert!(ServiceConfig::from_lookup(lookup_from(&[(ENV_COMPACT_AFTER, "-3")])).is_err());
    }
}
