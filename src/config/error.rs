//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Port value is outside valid range (1-65535).
    #[error("invalid {name} '{value}': must be between 1 and 65535")]
    InvalidPort { name: &'static str, value: String },

    /// Port string could not be parsed as a number.
    #[error("failed to parse {name} '{value}': {source}")]
    PortParseError {
        name: &'static str,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// Bind address string could not be parsed.
    #[error("failed to parse bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },

    /// Numeric setting could not be parsed.
    #[error("failed to parse {name} '{value}': {source}")]
    InvalidNumber {
        name: &'static str,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// Timeout or deadline set to zero.
    #[error("{name} must be greater than zero")]
    ZeroDuration { name: &'static str },

    /// Scoring endpoint is not an http(s) URL.
    #[error("invalid scoring url '{value}': {reason}")]
    InvalidUrl { value: String, reason: String },

    /// Redis host cannot form a `redis://` URL.
    #[error("invalid redis host '{host}': {reason}")]
    InvalidRedisHost { host: String, reason: String },

    /// Specified path does not exist on the filesystem.
    #[error("path does not exist: {path}")]
    PathNotFound { path: PathBuf },

    /// Path exists but is not a file (when a file was expected).
    #[error("path is not a file: {path}")]
    NotAFile { path: PathBuf },
}
