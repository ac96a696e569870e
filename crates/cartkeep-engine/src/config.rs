//! # Engine Configuration
//!
//! Settings read once when the engine is constructed.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`CARTKEEP_*`)
//! 2. Defaults (this file)
//!
//! Configuration is read-only after construction.

use serde::{Deserialize, Serialize};
use tracing::warn;

use cartkeep_core::{DecrementPolicy, DEFAULT_STORAGE_KEY};

/// Environment variable overriding the storage key.
pub const STORAGE_KEY_ENV: &str = "CARTKEEP_STORAGE_KEY";

/// Environment variable selecting the decrement policy
/// (`clamp` | `remove` | `allow-negative`).
pub const DECREMENT_POLICY_ENV: &str = "CARTKEEP_DECREMENT_POLICY";

/// Cart engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartConfig {
    /// Key the cart blob is stored under.
    pub storage_key: String,

    /// What decrementing towards zero does.
    pub decrement_policy: DecrementPolicy,

    /// Buffered persistence warnings per subscriber before the oldest are
    /// dropped.
    pub warning_capacity: usize,
}

impl Default for CartConfig {
    /// ## Default Values
    /// - Key: `@GoMarketplace:products`
    /// - Decrement: clamp at zero, line kept
    /// - Warning buffer: 32
    fn default() -> Self {
        CartConfig {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            decrement_policy: DecrementPolicy::default(),
            warning_capacity: 32,
        }
    }
}

impl CartConfig {
    /// Creates a configuration from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `CARTKEEP_STORAGE_KEY`: Override the storage key
    /// - `CARTKEEP_DECREMENT_POLICY`: `clamp`, `remove` or `allow-negative`
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a configuration from an arbitrary variable source.
    ///
    /// Unparseable values are logged and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = CartConfig::default();

        if let Some(key) = lookup(STORAGE_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            config.storage_key = key;
        }

        if let Some(raw) = lookup(DECREMENT_POLICY_ENV) {
            match raw.parse::<DecrementPolicy>() {
                Ok(policy) => config.decrement_policy = policy,
                Err(reason) => warn!(%reason, "Ignoring {}", DECREMENT_POLICY_ENV),
            }
        }

        config
    }

    /// Sets the storage key.
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Sets the decrement policy.
    pub fn with_decrement_policy(mut self, policy: DecrementPolicy) -> Self {
        self.decrement_policy = policy;
        self
    }

    /// Sets the warning buffer size (minimum 1).
    pub fn with_warning_capacity(mut self, capacity: usize) -> Self {
        self.warning_capacity = capacity;
        self
    }
}
