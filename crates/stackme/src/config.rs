/// Construction-time configuration for a history stack.
use serde::{Deserialize, Serialize};

use crate::policy::Policy;

/// Number of snapshots retained when no valid capacity is given.
pub const DEFAULT_CAPACITY: usize = 20;

/// Environment variable overriding the default capacity.
pub const CAPACITY_ENV: &str = "STACKME_CAPACITY";

/// Environment variable overriding the default push policy.
pub const POLICY_ENV: &str = "STACKME_POLICY";

/// Capacity and push policy for a `HistoryStack`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackConfig {
    /// Maximum number of snapshots retained. Must be at least 1.
    pub capacity: usize,
    /// How `push` treats the forward branch.
    pub policy: Policy,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            policy: Policy::default(),
        }
    }
}

impl StackConfig {
    /// Builds a config from the process environment.
    ///
    /// Resolution order for each field:
    /// 1. `STACKME_CAPACITY` / `STACKME_POLICY`, if set and valid
    /// 2. the built-in default
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(raw) = std::env::var(CAPACITY_ENV) {
            match raw.trim().parse::<usize>() {
                Ok(capacity) if capacity > 0 => config.capacity = capacity,
                _ => tracing::warn!("Ignoring invalid {CAPACITY_ENV}={raw:?}"),
            }
        }

        if let Ok(raw) = std::env::var(POLICY_ENV) {
            match raw.trim().parse::<Policy>() {
                Ok(policy) => config.policy = policy,
                Err(e) => tracing::warn!("Ignoring {POLICY_ENV}: {e}"),
            }
        }

        config
    }

    /// Resets out-of-domain values to their defaults.
    pub fn sanitize(&mut self) {
        if self.capacity == 0 {
            tracing::warn!("Capacity 0 is invalid, using {DEFAULT_CAPACITY}");
            self.capacity = DEFAULT_CAPACITY;
        }
    }
}
