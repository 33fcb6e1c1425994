// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for logger construction, log calls and sinks.
//!
//! Classification of log arguments never fails. The only failures a log call can
//! report come from a caller-supplied `$rewriter`, which are surfaced rather than
//! swallowed.

use thiserror::Error;

/// Error returned by a `$rewriter` function.
pub type RewriteError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Rejected logger construction. No partial logger is produced.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("You should initialize the log module first.")]
    NotInitialized,
    #[error("Missing parameter `filename` for creating new logger.")]
    MissingFilename,
    #[error("`{0}` is not a reserved meta property and cannot be aliased")]
    UnknownReservedKey(String),
}

/// Failure of a single log call.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("meta rewriter failed: {0}")]
    Rewrite(#[source] RewriteError),
}

/// Failure reported by a sink passthrough.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SinkError {
    #[error("sink does not support {0}")]
    Unsupported(&'static str),
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown log level `{0}`")]
pub struct ParseLevelError(pub String);
