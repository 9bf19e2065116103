//! File logging for the plugin.
//!
//! The host process owns stdout, so plugin diagnostics go to a log file.
//! By default the file lives under the XDG data directory
//! (`~/.local/share/script-http/logs/script-http.log`).
//! `SCRIPT_HTTP_LOG` overrides the configured level with an `EnvFilter`
//! directive string.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` override.
pub const LOG_FILTER_ENV: &str = "SCRIPT_HTTP_LOG";

/// Configuration for plugin file logging.
///
/// # Example
///
/// ```rust
/// use script_http::logging::{LogLevel, LogRotation, LoggingConfig};
///
/// let config = LoggingConfig::new()
///     .with_app_name("my-mod-http")
///     .with_level(LogLevel::Debug)
///     .with_rotation(LogRotation::Daily);
/// assert_eq!(config.app_name, "my-mod-http");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Whether file logging is enabled.
    pub enabled: bool,
    /// Base name of the log file (`{app_name}.log`).
    pub app_name: String,
    /// Custom log directory. If None, uses XDG data dir + "script-http/logs".
    pub log_dir: Option<PathBuf>,
    /// Log level filter.
    pub level: LogLevel,
    /// How the log file rolls over.
    pub rotation: LogRotation,
}

impl LoggingConfig {
    /// Creates a new LoggingConfig with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a disabled logging configuration.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Sets the log file base name.
    #[must_use]
    pub fn with_app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = name.into();
        self
    }

    /// Sets a custom log directory.
    #[must_use]
    pub fn with_log_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(path.into());
        self
    }

    /// Sets the log level filter.
    #[must_use]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Sets the rotation policy.
    #[must_use]
    pub fn with_rotation(mut self, rotation: LogRotation) -> Self {
        self.rotation = rotation;
        self
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            app_name: "script-http".to_string(),
            log_dir: None,
            level: LogLevel::default(),
            rotation: LogRotation::default(),
        }
    }
}

/// Log level filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Every request step, including dropped results.
    Trace,
    /// Request issue/completion.
    Debug,
    /// Lifecycle events. Default.
    #[default]
    Info,
    /// Transport failures.
    Warn,
    /// Errors only.
    Error,
}

impl LogLevel {
    /// Converts to tracing_subscriber LevelFilter.
    #[must_use]
    pub fn to_filter(self) -> tracing_subscriber::filter::LevelFilter {
        use tracing_subscriber::filter::LevelFilter;
        match self {
            Self::Trace => LevelFilter::TRACE,
            Self::Debug => LevelFilter::DEBUG,
            Self::Info => LevelFilter::INFO,
            Self::Warn => LevelFilter::WARN,
            Self::Error => LevelFilter::ERROR,
        }
    }
}

/// Log file rollover policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    /// One file, appended across sessions.
    #[default]
    Never,
    /// A new file per day, suffixed with the date.
    Daily,
}

/// Flush guard for the non-blocking writer. Held for the life of the host
/// process; the subscriber cannot be uninstalled anyway.
static WRITER_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Errors that can occur during logging initialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingError {
    /// The specific error that occurred.
    pub kind: LoggingErrorKind,
}

/// Specific logging error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoggingErrorKind {
    /// Failed to determine XDG data directory.
    NoDataDir,
    /// Failed to create log directory.
    CreateDirFailed {
        /// The path that could not be created.
        path: PathBuf,
        /// The reason for failure.
        reason: String,
    },
    /// Subscriber initialization failed.
    SubscriberInitFailed {
        /// The reason for failure.
        reason: String,
    },
}

impl LoggingError {
    /// Creates a new LoggingError with the given kind.
    #[must_use]
    pub fn new(kind: LoggingErrorKind) -> Self {
        Self { kind }
    }

    /// Creates an error for missing XDG data directory.
    #[must_use]
    pub fn no_data_dir() -> Self {
        Self::new(LoggingErrorKind::NoDataDir)
    }

    /// Creates an error for failed directory creation.
    #[must_use]
    pub fn create_dir_failed(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::new(LoggingErrorKind::CreateDirFailed {
            path,
            reason: reason.into(),
        })
    }

    /// Creates an error for subscriber initialization failure.
    #[must_use]
    pub fn subscriber_init_failed(reason: impl Into<String>) -> Self {
        Self::new(LoggingErrorKind::SubscriberInitFailed {
            reason: reason.into(),
        })
    }
}

impl fmt::Display for LoggingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            LoggingErrorKind::NoDataDir => {
                write!(
                    f,
                    "no local data directory for plugin logs; set logging.log_dir"
                )
            }
            LoggingErrorKind::CreateDirFailed { path, reason } => {
                write!(f, "cannot create log directory '{}': {}", path.display(), reason)
            }
            LoggingErrorKind::SubscriberInitFailed { reason } => {
                write!(
                    f,
                    "host process already has a tracing subscriber ({}); \
                     plugin logs go to it instead",
                    reason
                )
            }
        }
    }
}

impl std::error::Error for LoggingError {}

/// Returns the directory log files are written to.
///
/// # Errors
///
/// Returns `LoggingErrorKind::NoDataDir` if no custom directory is set and
/// the XDG data directory cannot be determined.
pub fn log_dir(config: &LoggingConfig) -> Result<PathBuf, LoggingError> {
    if let Some(ref custom_dir) = config.log_dir {
        return Ok(custom_dir.clone());
    }

    dirs::data_local_dir()
        .map(|dir| dir.join("script-http").join("logs"))
        .ok_or_else(LoggingError::no_data_dir)
}

fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(config.level.to_filter().into())
        .with_env_var(LOG_FILTER_ENV)
        .from_env_lossy()
}

/// Installs the file logging subscriber.
///
/// Returns `Ok(true)` if logging was initialized by this call, `Ok(false)`
/// if it is disabled in `config` or was already initialized.
///
/// # Errors
///
/// Returns a [`LoggingError`] if the directory cannot be created or another
/// global subscriber is already installed.
pub fn init_file_logging(config: &LoggingConfig) -> Result<bool, LoggingError> {
    if !config.enabled || WRITER_GUARD.get().is_some() {
        return Ok(false);
    }

    let dir = log_dir(config)?;
    std::fs::create_dir_all(&dir)
        .map_err(|e| LoggingError::create_dir_failed(dir.clone(), e.to_string()))?;

    let file_name = format!("{}.log", config.app_name);
    let file_appender = match config.rotation {
        LogRotation::Never => tracing_appender::rolling::never(&dir, file_name),
        LogRotation::Daily => tracing_appender::rolling::daily(&dir, file_name),
    };
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_thread_names(true),
        )
        .with(env_filter(config))
        .try_init()
        .map_err(|e| LoggingError::subscriber_init_failed(e.to_string()))?;

    // A concurrent initializer cannot get here: try_init above would have failed.
    let _ = WRITER_GUARD.set(guard);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_fills_defaults() {
        let config: LoggingConfig = serde_json::from_str(r#"{"level":"debug"}"#).unwrap();
        assert!(config.enabled);
        assert_eq!(config.app_name, "script-http");
        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.rotation, LogRotation::Never);
    }

    #[test]
    fn unknown_level_is_rejected() {
        assert!(serde_json::from_str::<LogLevel>("\"verbose\"").is_err());
    }

    #[test]
    fn log_dir_prefers_configured_directory() {
        let config = LoggingConfig::default().with_log_dir("/custom/logs");
        assert_eq!(log_dir(&config).unwrap(), PathBuf::from("/custom/logs"));
    }

    #[test]
    fn default_log_dir_is_under_local_data() {
        if let Ok(resolved) = log_dir(&LoggingConfig::default()) {
            assert!(resolved.ends_with("script-http/logs"));
        }
    }

    #[test]
    fn disabled_logging_is_a_no_op() {
        assert_eq!(init_file_logging(&LoggingConfig::disabled()), Ok(false));
    }

    #[test]
    fn unwritable_log_dir_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"").unwrap();

        let config = LoggingConfig::new().with_log_dir(blocker.join("logs"));
        let error = init_file_logging(&config).unwrap_err();
        assert!(matches!(error.kind, LoggingErrorKind::CreateDirFailed { .. }));
        assert!(error.to_string().contains("not-a-dir"));
    }
}
