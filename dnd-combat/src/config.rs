//! Table rules and host settings.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

/// Optional and house rules the table has switched on or off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatRules {
    /// Optional flanking rule: advantage on melee attacks with an ally opposite.
    pub flanking: bool,
    /// A natural 1 on the attack roll always misses.
    pub natural_one_misses: bool,
    /// A natural 20 on the attack roll always hits, as a critical.
    pub natural_twenty_hits: bool,
}

impl Default for CombatRules {
    fn default() -> Self {
        Self {
            flanking: false,
            natural_one_misses: true,
            natural_twenty_hits: true,
        }
    }
}

/// Configuration for a combat host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub rules: CombatRules,
    /// Pending action requests before submitters wait.
    pub queue_capacity: usize,
    /// Events an observer may fall behind before it starts missing them.
    pub event_capacity: usize,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            rules: CombatRules::default(),
            queue_capacity: 64,
            event_capacity: 256,
        }
    }
}

impl HostConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn the optional flanking rule on or off.
    pub fn with_flanking(mut self, enabled: bool) -> Self {
        self.rules.flanking = enabled;
        self
    }

    pub fn with_rules(mut self, rules: CombatRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a config file. Missing fields take their defaults.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).await?;
        Self::from_json(&json)
    }

    pub async fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HostConfig::default();
        assert!(!config.rules.flanking);
        assert!(config.rules.natural_one_misses);
        assert!(config.rules.natural_twenty_hits);
        assert_eq!(config.queue_capacity, 64);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = HostConfig::from_json(r#"{ "rules": { "flanking": true } }"#).unwrap();
        assert!(config.rules.flanking);
        assert!(config.rules.natural_twenty_hits);
        assert_eq!(config.event_capacity, 256);
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(
            HostConfig::from_json("{ nope"),
            Err(ConfigError::Serialization(_))
        ));
    }

    #[test]
    fn test_builder_clamps_capacity() {
        let config = HostConfig::new()
            .with_flanking(true)
            .with_queue_capacity(0)
            .with_event_capacity(8);
        assert!(config.rules.flanking);
        assert_eq!(config.queue_capacity, 1);
        assert_eq!(config.event_capacity, 8);
    }
}
