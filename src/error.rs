//! Plugin-level error types.
//!
//! These errors surface to the host adapter while the plugin is being set
//! up. Nothing after setup reports errors to scripts: request failures
//! become `OnRequestFail` callbacks and accessor failures become defaults.
//!
//! No external error crates (anyhow, thiserror, eyre) are used.

use std::fmt;

/// Errors raised while configuring or starting the plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeError {
    /// The specific error that occurred
    pub kind: BridgeErrorKind,
}

/// Specific bridge error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeErrorKind {
    /// Configuration error
    Configuration {
        /// The configuration field that was invalid
        field: String,
        /// Why it was invalid
        reason: String,
    },
    /// The HTTP client could not be built
    TransportInit {
        /// Error from the HTTP client
        reason: String,
    },
    /// A background worker thread could not be started
    WorkerSpawn {
        /// Error from the operating system
        reason: String,
    },
}

impl BridgeError {
    /// Creates a new BridgeError with the given kind.
    #[must_use]
    pub fn new(kind: BridgeErrorKind) -> Self {
        Self { kind }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn configuration(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(BridgeErrorKind::Configuration {
            field: field.into(),
            reason: reason.into(),
        })
    }

    /// Creates a transport initialization error.
    #[must_use]
    pub fn transport_init(reason: impl Into<String>) -> Self {
        Self::new(BridgeErrorKind::TransportInit {
            reason: reason.into(),
        })
    }

    /// Creates a worker spawn error.
    #[must_use]
    pub fn worker_spawn(reason: impl Into<String>) -> Self {
        Self::new(BridgeErrorKind::WorkerSpawn {
            reason: reason.into(),
        })
    }

    /// Returns true if this error indicates a configuration problem.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self.kind, BridgeErrorKind::Configuration { .. })
    }
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            BridgeErrorKind::Configuration { field, reason } => {
                write!(f, "configuration error for '{}': {}", field, reason)
            }
            BridgeErrorKind::TransportInit { reason } => {
                write!(f, "failed to initialize HTTP client: {}", reason)
            }
            BridgeErrorKind::WorkerSpawn { reason } => {
                write!(
                    f,
                    "failed to spawn request worker: {}; try lowering worker_threads",
                    reason
                )
            }
        }
    }
}

impl std::error::Error for BridgeError {}
