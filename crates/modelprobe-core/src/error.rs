//! Error types for modelprobe.
//!
//! Classified endpoint failures (401, 429, cold starts, timeouts...) are not
//! errors: they become a [`ProbeStatus`](crate::types::ProbeStatus). The types
//! here cover configuration problems and faults outside the prober's
//! competence, such as a DNS failure or a reset connection.

use thiserror::Error;

/// Top-level error type for modelprobe operations.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The request never produced an HTTP response
    #[error("Transport fault probing {provider}/{model}: {message}")]
    Transport {
        provider: String,
        model: String,
        message: String,
        /// Time spent before the fault
        latency_ms: u64,
        /// Requests sent, including the faulting one
        attempts: usize,
    },

    /// A catalog lookup returned a non-success status
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Test image could not be encoded
    #[error("Image error: {0}")]
    Image(String),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// A provider credential reference could not be resolved
    #[error("{provider} API key not set. Set {variable} env var.")]
    MissingCredential { provider: String, variable: String },
}

/// Convenience type alias for modelprobe results.
pub type Result<T> = std::result::Result<T, ProbeError>;
