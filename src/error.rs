//! Error types for DFC-VTable
//!
//! Centralized error handling using snafu for ergonomic error definitions.

use snafu::Snafu;

use crate::state::ErrorKind;

/// Main error type for the engine and its providers
#[derive(Debug, Snafu)]
pub enum Error {
    /// Invalid input or configuration
    #[snafu(display("Invalid config: {message}"))]
    InvalidConfig { message: String },

    /// The remote source could not serve the request (network, auth, ...)
    #[snafu(display("Provider unavailable: {message}"))]
    ProviderUnavailable { message: String },

    /// A provider call exceeded its deadline
    #[snafu(display("Timeout: {message}"))]
    Timeout { message: String },

    /// The operation was superseded or the session was torn down
    #[snafu(display("Operation cancelled"))]
    Cancelled,

    /// The predicate has no server-side representation
    #[snafu(display("Search not supported by provider: {message}"))]
    SearchTranslationUnsupported { message: String },

    /// No tokio runtime available to drive background work
    #[snafu(display("Runtime error: {message}"))]
    Runtime { message: String },

    /// IO error (config files)
    #[snafu(display("IO error: {source}"))]
    Io { source: std::io::Error },

    /// JSON serialization/deserialization error
    #[snafu(display("JSON error: {source}"))]
    Json { source: serde_json::Error },

    /// TOML deserialization error
    #[snafu(display("TOML parse error: {source}"))]
    TomlDe { source: toml::de::Error },

    /// TOML serialization error
    #[snafu(display("TOML serialize error: {source}"))]
    TomlSe { source: toml::ser::Error },
}

impl Error {
    /// Shorthand for a provider failure
    pub fn unavailable(message: impl Into<String>) -> Self {
        Error::ProviderUnavailable {
            message: message.into(),
        }
    }

    /// Shorthand for an untranslatable search predicate
    pub fn unsupported(message: impl Into<String>) -> Self {
        Error::SearchTranslationUnsupported {
            message: message.into(),
        }
    }

    /// Whether this error only means "stop quietly"
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    /// Map to the user-facing taxonomy. Cancellation is never surfaced.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Error::Cancelled => None,
            Error::ProviderUnavailable { .. } | Error::Timeout { .. } => {
                Some(ErrorKind::ProviderUnavailable)
            }
            Error::SearchTranslationUnsupported { .. } => {
                Some(ErrorKind::SearchTranslationUnsupported)
            }
            _ => Some(ErrorKind::Internal),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io { source }
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Error::Json { source }
    }
}

impl From<toml::de::Error> for Error {
    fn from(source: toml::de::Error) -> Self {
        Error::TomlDe { source }
    }
}

impl From<toml::ser::Error> for Error {
    fn from(source: toml::ser::Error) -> Self {
        Error::TomlSe { source }
    }
}

/// Result type alias for convenience
pub type Result<T, E = Error> = std::result::Result<T, E>;
