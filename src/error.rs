//! Startup error taxonomy
//!
//! Everything in here is fatal: the binary logs the error and exits non-zero.
//! Per-probe failures never surface as these types, they are recorded as
//! metrics instead.

use std::fmt;

/// Result type alias for startup operations
pub type StartupResult<T> = Result<T, StartupError>;

/// Invalid or missing configuration input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required key has no value
    Missing(&'static str),

    /// A key has a value that cannot be used
    Invalid { key: &'static str, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing required configuration `{key}`"),
            ConfigError::Invalid { key, reason } => {
                write!(f, "invalid value for `{key}`: {reason}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors that prevent the monitor from starting
#[derive(Debug)]
pub enum StartupError {
    /// Configuration could not be loaded
    Config(ConfigError),

    /// Neither the metadata service nor the local interface yielded a label
    Identity(String),

    /// A metric series could not be created or registered
    MetricsRegistration(prometheus::Error),

    /// The scrape server could not bind its listener
    Bind(std::io::Error),
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartupError::Config(err) => write!(f, "configuration error: {err}"),
            StartupError::Identity(msg) => {
                write!(f, "could not determine monitor identity: {msg}")
            }
            StartupError::MetricsRegistration(err) => {
                write!(f, "failed to register metric series: {err}")
            }
            StartupError::Bind(err) => write!(f, "failed to bind scrape server: {err}"),
        }
    }
}

impl std::error::Error for StartupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StartupError::Config(err) => Some(err),
            StartupError::MetricsRegistration(err) => Some(err),
            StartupError::Bind(err) => Some(err),
            StartupError::Identity(_) => None,
        }
    }
}

impl From<ConfigError> for StartupError {
    fn from(err: ConfigError) -> Self {
        StartupError::Config(err)
    }
}

impl From<prometheus::Error> for StartupError {
    fn from(err: prometheus::Error) -> Self {
        StartupError::MetricsRegistration(err)
    }
}
