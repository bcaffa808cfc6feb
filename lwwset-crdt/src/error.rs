//! Error types for the element set.

use crate::Bias;
use thiserror::Error;

/// Result type for element set operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while operating on an element set.
#[derive(Debug, Error)]
pub enum Error {
    /// An operation was compared against, or filed into, the log of the
    /// other bias. Always a caller bug.
    #[error("invalid bias: expected {expected}, found {found}")]
    InvalidBias { expected: Bias, found: Bias },

    /// A log entry is filed under a key other than its operation's key.
    #[error("{log} log entry is filed under a different key than its operation")]
    KeyMismatch { log: Bias },

    /// The replica's clock cannot issue another timestamp.
    #[error("clock error: {0}")]
    Clock(#[from] lwwset_types::Error),

    /// Configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}
