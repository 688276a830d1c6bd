//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors that can occur while decoding a capture into stack traces
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("JSON deserialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid capture format: {0}")]
    InvalidFormat(String),

    #[error("Invalid sample count on line {line}: {value}")]
    InvalidCount { line: usize, value: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors that can occur while loading a classifier policy
#[derive(Error, Debug)]
pub enum PolicyError {
    #[error("Policy TOML parse error: {0}")]
    ParseFailed(#[from] toml::de::Error),

    #[error("Policy TOML serialization failed: {0}")]
    SerializeFailed(#[from] toml::ser::Error),

    #[error("Invalid policy: {0}")]
    Invalid(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Internal contract violations detected in the aggregation tree
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("Children of '{path}' account for {children} samples but the node only has {count}")]
    InvariantViolation {
        path: String,
        count: u64,
        children: u64,
    },
}

/// Errors that can occur while writing the report
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write report: {0}")]
    WriteFailed(#[from] std::io::Error),
}
