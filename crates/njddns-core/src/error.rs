//! Error types for the Njalla DDNS updater
//!
//! This module defines all error types used throughout the workspace.

use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS updater
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors (fatal at startup)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Local I/O errors (e.g. reading the token file)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport-level failure: connection, timeout, or unexpected HTTP status
    #[error("Network error: {0}")]
    Network(String),

    /// Two IP sources returned different addresses
    #[error(
        "IP sources disagree: {first_source} reported {first_ip}, {second_source} reported {second_ip}"
    )]
    InconsistentSources {
        /// Name of the first source
        first_source: String,
        /// Address reported by the first source
        first_ip: String,
        /// Name of the disagreeing source
        second_source: String,
        /// Address reported by the disagreeing source
        second_ip: String,
    },

    /// A response body was not valid JSON or lacked expected fields
    #[error("Decode error: {0}")]
    Decode(String),

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limiting errors
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Application-level failure reported by the provider
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create an inconsistent-sources error
    pub fn inconsistent_sources(
        first_source: impl Into<String>,
        first_ip: impl Into<String>,
        second_source: impl Into<String>,
        second_ip: impl Into<String>,
    ) -> Self {
        Self::InconsistentSources {
            first_source: first_source.into(),
            first_ip: first_ip.into(),
            second_source: second_source.into(),
            second_ip: second_ip.into(),
        }
    }

    /// Whether this error only affects the current cycle
    ///
    /// Configuration and local I/O errors are fatal at startup; everything
    /// else is logged and retried on the next tick.
    pub fn is_transient(&self) -> bool {
        !matches!(self, Self::Config(_) | Self::Io(_))
    }
}
