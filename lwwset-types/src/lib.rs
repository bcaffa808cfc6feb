//! Core type definitions for the LWW element set.
//!
//! This crate defines the primitive types shared by every replica:
//! - Replica identifiers (UUID v7)
//! - Scalar logical timestamps
//! - A Lamport clock for stamping local operations
//!
//! The set itself and its merge rules live in `lwwset-crdt`.

mod clock;
mod ids;
mod timestamp;

pub use clock::LamportClock;
pub use ids::ReplicaId;
pub use timestamp::Timestamp;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("logical clock exhausted")]
    ClockExhausted,
}
