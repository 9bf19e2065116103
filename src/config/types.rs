//! Configuration types.

use crate::dispatcher::DEFAULT_TIMEOUT_MS;
use crate::error::BridgeError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default number of background request workers.
pub const DEFAULT_WORKER_THREADS: usize = 8;

/// Root configuration structure for the plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Timeout for requests that do not pass one, in milliseconds.
    pub default_timeout_ms: u64,

    /// Number of background request workers. Requests beyond this many
    /// wait for a free worker.
    pub worker_threads: usize,

    /// `User-Agent` header sent with every request.
    pub user_agent: String,

    /// File logging configuration.
    pub logging: LoggingConfig,
}

impl BridgeConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default request timeout.
    #[must_use]
    pub fn with_default_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.default_timeout_ms = timeout_ms;
        self
    }

    /// Sets the number of worker threads.
    #[must_use]
    pub fn with_worker_threads(mut self, workers: usize) -> Self {
        self.worker_threads = workers;
        self
    }

    /// Sets the `User-Agent` header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets the logging configuration.
    #[must_use]
    pub fn with_logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }

    /// Disables file logging.
    #[must_use]
    pub fn without_logging(mut self) -> Self {
        self.logging = LoggingConfig::disabled();
        self
    }

    /// The default timeout as a [`Duration`].
    #[must_use]
    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    /// Checks values serde cannot reject on its own.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::Configuration` naming the first invalid field.
    pub fn validate(&self) -> Result<(), BridgeError> {
        if self.default_timeout_ms == 0 {
            return Err(BridgeError::configuration(
                "default_timeout_ms",
                "must be greater than 0",
            ));
        }
        if self.worker_threads == 0 {
            return Err(BridgeError::configuration(
                "worker_threads",
                "must be greater than 0",
            ));
        }
        if self.user_agent.trim().is_empty() {
            return Err(BridgeError::configuration("user_agent", "cannot be empty"));
        }
        if self.logging.enabled && self.logging.app_name.trim().is_empty() {
            return Err(BridgeError::configuration(
                "logging.app_name",
                "cannot be empty when logging is enabled",
            ));
        }
        Ok(())
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: DEFAULT_TIMEOUT_MS,
            worker_threads: DEFAULT_WORKER_THREADS,
            user_agent: concat!("script-http/", env!("CARGO_PKG_VERSION")).to_string(),
            logging: LoggingConfig::default(),
        }
    }
}
