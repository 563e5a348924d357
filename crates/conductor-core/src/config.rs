//! Configuration types for capacities, retries, and timeouts.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::task::AgentRole;

/// Per-role concurrency capacity table.
///
/// Read-only after plan construction; every capacity is a positive
/// integer concurrency limit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapacityTable {
    capacities: HashMap<AgentRole, usize>,
}

impl CapacityTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            capacities: HashMap::new(),
        }
    }

    /// Sets the capacity for a role.
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn with_capacity(mut self, role: AgentRole, capacity: usize) -> Self {
        assert!(capacity > 0, "Role capacity must be positive");
        self.capacities.insert(role, capacity);
        self
    }

    /// Gets the configured capacity for a role, if any.
    pub fn get(&self, role: AgentRole) -> Option<usize> {
        self.capacities.get(&role).copied()
    }

    /// The largest configured capacity across all roles.
    pub fn max_capacity(&self) -> usize {
        self.capacities.values().copied().max().unwrap_or(0)
    }

    /// Iterates over configured roles and capacities.
    pub fn iter(&self) -> impl Iterator<Item = (AgentRole, usize)> + '_ {
        self.capacities
            .iter()
            .map(|(role, capacity)| (*role, *capacity))
    }
}

impl Default for CapacityTable {
    /// One sequential setup worker, three parallel feature workers, two
    /// verification workers, one deployment worker.
    fn default() -> Self {
        Self::new()
            .with_capacity(AgentRole::Setup, 1)
            .with_capacity(AgentRole::FeatureBuild, 3)
            .with_capacity(AgentRole::Verification, 2)
            .with_capacity(AgentRole::Deployment, 1)
    }
}

/// Bounded retry policy with exponential backoff.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum retry attempts after the first failure.
    pub max_retries: u32,
    /// Backoff before the first retry, in milliseconds.
    pub backoff_base_ms: u64,
    /// Multiplier applied to the backoff on each subsequent retry.
    pub backoff_multiplier: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff_base_ms: 500,
            backoff_multiplier: 2,
        }
    }
}

impl RetryConfig {
    /// Backoff delay before the given retry attempt (1-based), in
    /// milliseconds.
    pub fn backoff_ms(&self, attempt: u32) -> u64 {
        let factor = u64::from(self.backoff_multiplier).pow(attempt.saturating_sub(1));
        self.backoff_base_ms.saturating_mul(factor)
    }
}

/// Complete orchestrator configuration.
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Per-role concurrency capacities.
    pub capacities: CapacityTable,
    /// Retry policy for failed task attempts.
    pub retry: RetryConfig,
    /// Per-attempt task timeout in milliseconds. Zero disables the
    /// timeout.
    pub task_timeout_ms: u64,
}

impl OrchestratorConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Writes configuration to a TOML file.
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|error| crate::error::OrchestratorError::Validation(error.to_string()))?;
        fs::write(path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Test code is allowed to use unwrap")]
mod tests {
    use super::*;

    #[test]
    fn backoff_grows_exponentially() {
        let retry = RetryConfig {
            max_retries: 3,
            backoff_base_ms: 100,
            backoff_multiplier: 2,
        };
        assert_eq!(retry.backoff_ms(1), 100);
        assert_eq!(retry.backoff_ms(2), 200);
        assert_eq!(retry.backoff_ms(3), 400);
    }

    #[test]
    fn default_table_covers_all_roles() {
        let table = CapacityTable::default();
        for role in AgentRole::ALL {
            assert!(table.get(role).is_some(), "missing capacity for {role}");
        }
        assert_eq!(table.max_capacity(), 3);
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = OrchestratorConfig {
            task_timeout_ms: 30_000,
            ..OrchestratorConfig::default()
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conductor.toml");
        config.save(&path).unwrap();

        let loaded = OrchestratorConfig::load(&path).unwrap();
        assert_eq!(loaded.task_timeout_ms, 30_000);
        assert_eq!(
            loaded.capacities.get(AgentRole::FeatureBuild),
            config.capacities.get(AgentRole::FeatureBuild)
        );
    }
}
