use serde::Deserialize;

/// Per-queue configuration, deserializable from TOML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct QueueConfig {
    /// Queue name, used as the label on log events and metrics.
    pub name: String,
    /// Default lease duration granted by `claim` (ms).
    pub visibility_ms: u64,
    /// Default delay applied by `enqueue` before a message becomes visible (ms).
    pub delay_ms: u64,
    /// Claim budget before a message is handed to the dead-letter queue.
    /// Only consulted when a dead-letter target is attached.
    pub max_retries: u32,
}

impl QueueConfig {
    /// Default visibility window: 30 seconds.
    pub const DEFAULT_VISIBILITY_MS: u64 = 30_000;
    /// Default claim budget before dead-lettering.
    pub const DEFAULT_MAX_RETRIES: u32 = 5;

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visibility_ms: Self::DEFAULT_VISIBILITY_MS,
            delay_ms: 0,
            max_retries: Self::DEFAULT_MAX_RETRIES,
        }
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self::new("default")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = QueueConfig::default();
        assert_eq!(config.name, "default");
        assert_eq!(config.visibility_ms, 30_000);
        assert_eq!(config.delay_ms, 0);
        assert_eq!(config.max_retries, 5);
    }

    #[test]
    fn toml_parsing_with_overrides() {
        let toml_str = r#"
            name = "orders"
            visibility_ms = 5000
            delay_ms = 250
            max_retries = 2
        "#;
        let config: QueueConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.name, "orders");
        assert_eq!(config.visibility_ms, 5_000);
        assert_eq!(config.delay_ms, 250);
        assert_eq!(config.max_retries, 2);
    }

    #[test]
    fn toml_parsing_empty_uses_defaults() {
        let config: QueueConfig = toml::from_str("").unwrap();
        assert_eq!(config, QueueConfig::default());
    }

    #[test]
    fn toml_parsing_partial_config() {
        let config: QueueConfig = toml::from_str(r#"name = "emails""#).unwrap();
        assert_eq!(config.name, "emails");
        // Remaining defaults preserved
        assert_eq!(config.visibility_ms, QueueConfig::DEFAULT_VISIBILITY_MS);
        assert_eq!(config.max_retries, QueueConfig::DEFAULT_MAX_RETRIES);
    }
}
