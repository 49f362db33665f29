//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Client-registry lookup configuration.
    pub registry: RegistryConfig,
    /// Event channel configuration.
    #[serde(default)]
    pub channel: ChannelConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Client-registry lookup configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    /// Base URL of the client-registry service.
    pub base_url: String,
    /// Per-request timeout for lookups, in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Time-to-live for cached client display names, in seconds.
    #[serde(default = "default_name_cache_ttl_secs")]
    pub name_cache_ttl_secs: u64,
    /// Maximum number of cached client display names.
    #[serde(default = "default_name_cache_capacity")]
    pub name_cache_capacity: u64,
}

fn default_request_timeout_ms() -> u64 {
    3000
}

fn default_name_cache_ttl_secs() -> u64 {
    300 // 5 minutes
}

fn default_name_cache_capacity() -> u64 {
    10_000
}

/// Event channel configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelConfig {
    /// Topic carrying client lifecycle events.
    #[serde(default = "default_topic")]
    pub topic: String,
    /// Consumer group for the account-sync worker.
    #[serde(default = "default_consumer_group")]
    pub consumer_group: String,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            topic: default_topic(),
            consumer_group: default_consumer_group(),
        }
    }
}

fn default_topic() -> String {
    // Shared contract with the client-registry service; renaming it here
    // would silently detach the consumer from the producer.
    "clientes-eventos".to_string()
}

fn default_consumer_group() -> String {
    "ledgra-accounts".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("LEDGRA").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
