//! Tracing subscriber initialization
//!
//! The engine logs through the `tracing` macros; hosts that already run a
//! subscriber need nothing from here. Embedders without one call
//! [`init_logging`] once at startup.

use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Global flag indicating whether logging has been initialized
static LOGGING_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Default filter when neither config nor `RUST_LOG` provides one.
const DEFAULT_FILTER: &str = "info";

/// Errors that can occur during logging initialization
#[derive(Debug, Error)]
pub enum LoggingError {
    /// Logging already initialized
    #[error("Logging has already been initialized")]
    AlreadyInitialized,

    /// The configured filter string is not a valid directive set
    #[error("Invalid filter directives: {0}")]
    InvalidFilter(String),

    /// The subscriber could not be installed
    #[error("Failed to initialize logging: {0}")]
    InitializationFailed(String),
}

/// Result type for logging operations
pub type LoggingResult<T> = Result<T, LoggingError>;

/// Configuration for logging initialization
#[derive(Debug, Clone, Default)]
pub struct LoggingConfig {
    /// Explicit filter directives; falls back to `RUST_LOG`, then `info`
    pub filter: Option<String>,
}

impl LoggingConfig {
    /// Creates a configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets explicit filter directives (e.g. `gerritpoll_core=debug`)
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }
}

/// Initializes the global tracing subscriber, writing to stderr.
///
/// # Errors
///
/// Returns [`LoggingError::AlreadyInitialized`] on a second call,
/// [`LoggingError::InvalidFilter`] for bad directives, and
/// [`LoggingError::InitializationFailed`] when another subscriber is
/// already installed globally.
pub fn init_logging(config: &LoggingConfig) -> LoggingResult<()> {
    if LOGGING_INITIALIZED.load(Ordering::SeqCst) {
        return Err(LoggingError::AlreadyInitialized);
    }

    let filter = match &config.filter {
        Some(directives) => EnvFilter::try_new(directives)
            .map_err(|e| LoggingError::InvalidFilter(e.to_string()))?,
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| LoggingError::InitializationFailed(e.to_string()))?;

    LOGGING_INITIALIZED.store(true, Ordering::SeqCst);
    Ok(())
}

/// Whether [`init_logging`] has completed successfully
#[must_use]
pub fn is_logging_initialized() -> bool {
    LOGGING_INITIALIZED.load(Ordering::SeqCst)
}
