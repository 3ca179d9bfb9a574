//! Bridge configuration.
//!
//! Configuration can be built in code or loaded from TOML:
//!
//! ```
//! use horizon_axbridge_core::BridgeConfig;
//! use std::time::Duration;
//!
//! let config = BridgeConfig::from_toml_str(r#"
//! handoff_timeout_ms = 250
//! queue_capacity = 64
//! context_thread_name = "toolkit"
//! "#).unwrap();
//!
//! assert_eq!(config.handoff_timeout, Duration::from_millis(250));
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Default bound on a single hand-off to the toolkit context.
pub const DEFAULT_HANDOFF_TIMEOUT: Duration = Duration::from_millis(500);

/// Default capacity of the toolkit context's task queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Default name of the toolkit context thread.
pub const DEFAULT_CONTEXT_THREAD_NAME: &str = "axbridge-toolkit";

/// Configuration shared by the toolkit context and the adapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// How long a query may wait for the toolkit context before reporting
    /// the node as unavailable.
    pub handoff_timeout: Duration,
    /// Capacity of the toolkit context's task queue.
    pub queue_capacity: usize,
    /// Name for the toolkit context thread.
    pub context_thread_name: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            handoff_timeout: DEFAULT_HANDOFF_TIMEOUT,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            context_thread_name: DEFAULT_CONTEXT_THREAD_NAME.to_string(),
        }
    }
}

/// On-disk shape of [`BridgeConfig`]. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    handoff_timeout_ms: Option<u64>,
    queue_capacity: Option<usize>,
    context_thread_name: Option<String>,
}

impl BridgeConfig {
    /// Start a builder from the defaults.
    pub fn builder() -> BridgeConfigBuilder {
        BridgeConfigBuilder::default()
    }

    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(source)?;
        let defaults = Self::default();
        let config = Self {
            handoff_timeout: raw
                .handoff_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.handoff_timeout),
            queue_capacity: raw.queue_capacity.unwrap_or(defaults.queue_capacity),
            context_thread_name: raw
                .context_thread_name
                .unwrap_or(defaults.context_thread_name),
        };
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Reject values the bridge cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.handoff_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                field: "handoff_timeout",
                message: "must be greater than zero".to_string(),
            });
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "queue_capacity",
                message: "must be greater than zero".to_string(),
            });
        }
        if self.context_thread_name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "context_thread_name",
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Builder for [`BridgeConfig`].
#[derive(Debug, Default)]
pub struct BridgeConfigBuilder {
    config: BridgeConfig,
}

impl BridgeConfigBuilder {
    /// Set the hand-off timeout.
    pub fn handoff_timeout(mut self, timeout: Duration) -> Self {
        self.config.handoff_timeout = timeout;
        self
    }

    /// Set the toolkit queue capacity.
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    /// Set the toolkit context thread name.
    pub fn context_thread_name(mut self, name: impl Into<String>) -> Self {
        self.config.context_thread_name = name.into();
        self
    }

    /// Validate and return the configuration.
    pub fn build(self) -> Result<BridgeConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
