//! Error types for the theme handler.
//!
//! [`ThemeError`] covers everything the build side can fail on. Runtime
//! operations ([`resolve`](crate::resolve), [`ThemeSwitcher::set_theme`](crate::ThemeSwitcher::set_theme))
//! never return it; they log and fall back to the default theme instead.

use std::io;

/// Errors raised while loading configuration or rendering head markup.
#[derive(Debug, thiserror::Error)]
pub enum ThemeError {
    /// Invalid or missing build configuration. Aborts the build.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A theme key that is not part of the registry.
    #[error("Not valid themeName: {0}")]
    InvalidThemeKey(String),

    /// Persisted storage could not be read or written.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Bootstrap script substitution failed.
    #[error("bootstrap script error: {0}")]
    Template(#[from] minijinja::Error),

    /// A configured files glob could not be compiled.
    #[error("invalid files glob: {0}")]
    Glob(#[from] globset::Error),

    /// Configuration or persisted state could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// Reading a configuration file failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ThemeError {
    /// Create a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

impl From<serde_json::Error> for ThemeError {
    fn from(err: serde_json::Error) -> Self {
        ThemeError::Parse(err.to_string())
    }
}

impl From<serde_yaml::Error> for ThemeError {
    fn from(err: serde_yaml::Error) -> Self {
        ThemeError::Parse(err.to_string())
    }
}

/// Failures of the persisted theme storage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// Storage is disabled or not present in this context.
    #[error("storage unavailable")]
    Unavailable,

    /// Reading a value failed.
    #[error("failed to read '{key}': {reason}")]
    Read { key: String, reason: String },

    /// Writing a value failed.
    #[error("failed to write '{key}': {reason}")]
    Write { key: String, reason: String },

    /// The storage refused the value because it is full.
    #[error("storage quota exceeded while writing '{0}'")]
    QuotaExceeded(String),
}
