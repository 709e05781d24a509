//! Store configuration.
//!
//! Stored as a JSON file. Every field has a default, so a partial file (or no
//! file at all) yields a usable config.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::fs;

/// Upper bound on `retention_days` (about ten years)
pub const MAX_RETENTION_DAYS: i64 = 3650;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    /// Recipient whose notifications are loaded on initialization
    pub recipient_id: String,
    pub initial_page_size: u32,
    pub max_page_size: u32,
    /// Artificial latency applied by the mock backend
    pub mock_latency_ms: u64,
    /// Read notifications older than this are removed by `cleanup_read`
    pub retention_days: i64,
    pub event_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            recipient_id: "mock-user-id".to_string(),
            initial_page_size: 50,
            max_page_size: 100,
            mock_latency_ms: 200,
            retention_days: 30,
            event_capacity: 64,
        }
    }
}

impl StoreConfig {
    pub fn for_recipient(recipient_id: impl Into<String>) -> Self {
        Self {
            recipient_id: recipient_id.into(),
            ..Self::default()
        }
    }

    pub fn mock_latency(&self) -> Duration {
        Duration::from_millis(self.mock_latency_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.recipient_id.trim().is_empty() {
            anyhow::bail!("recipient_id must not be empty");
        }
        if self.initial_page_size == 0 || self.max_page_size == 0 {
            anyhow::bail!("page sizes must be at least 1");
        }
        if self.initial_page_size > self.max_page_size {
            anyhow::bail!(
                "initial_page_size ({}) exceeds max_page_size ({})",
                self.initial_page_size,
                self.max_page_size
            );
        }
        if !(1..=MAX_RETENTION_DAYS).contains(&self.retention_days) {
            anyhow::bail!(
                "retention_days must be between 1 and {}, got {}",
                MAX_RETENTION_DAYS,
                self.retention_days
            );
        }
        if self.event_capacity == 0 {
            anyhow::bail!("event_capacity must be at least 1");
        }
        Ok(())
    }

    /// Load and validate config from a JSON file
    pub async fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read store config {:?}", path))?;

        let config: StoreConfig =
            serde_json::from_str(&contents).context("Failed to parse store config JSON")?;
        config.validate().context("Invalid store config")?;

        log::debug!("Loaded store config from {:?}", path);
        Ok(config)
    }

    /// Load config from `path`, falling back to defaults when the file is missing
    pub async fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("No store config at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        Self::load(path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = StoreConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.mock_latency(), Duration::from_millis(200));
    }

    #[test]
    fn validate_rejects_bad_sizes() {
        let mut config = StoreConfig::for_recipient("u1");
        config.initial_page_size = 500;
        assert!(config.validate().is_err());

        let mut config = StoreConfig::for_recipient(" ");
        config.max_page_size = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_bounds_retention_days() {
        for days in [i64::MAX, MAX_RETENTION_DAYS + 1, 0, -1, i64::MIN] {
            let mut config = StoreConfig::for_recipient("u1");
            config.retention_days = days;
            assert!(config.validate().is_err(), "retention_days = {}", days);
        }

        let mut config = StoreConfig::for_recipient("u1");
        config.retention_days = MAX_RETENTION_DAYS;
        assert!(config.validate().is_ok());
    }

    #[tokio::test]
    async fn load_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notifications.json");
        std::fs::write(&path, r#"{ "recipient_id": "shopper-42", "mock_latency_ms": 0 }"#)
            .unwrap();

        let config = StoreConfig::load(&path).await.unwrap();
        assert_eq!(config.recipient_id, "shopper-42");
        assert_eq!(config.mock_latency_ms, 0);
        assert_eq!(config.max_page_size, 100);
    }

    #[tokio::test]
    async fn load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notifications.json");
        std::fs::write(&path, r#"{ "max_page_size": 0 }"#).unwrap();
        assert!(StoreConfig::load(&path).await.is_err());

        std::fs::write(&path, "not json").unwrap();
        assert!(StoreConfig::load(&path).await.is_err());
    }

    #[tokio::test]
    async fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::load_or_default(&dir.path().join("absent.json"))
            .await
            .unwrap();
        assert_eq!(config, StoreConfig::default());
    }
}
