//! Timestamped add and remove operations.

use lwwset_types::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which log an operation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Bias {
    Adds,
    Removals,
}

impl fmt::Display for Bias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Adds => f.write_str("ADDS"),
            Self::Removals => f.write_str("REMOVALS"),
        }
    }
}

/// A single add or remove of `key`, stamped with the time it was issued.
///
/// Operations are immutable once built. The bias is fixed at construction
/// and decides which log of an [`LWWElementSet`](crate::LWWElementSet) the
/// operation may be recorded in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Operation<K> {
    pub(crate) key: K,
    pub(crate) timestamp: Timestamp,
    pub(crate) bias: Bias,
}

impl<K> Operation<K> {
    /// Builds an operation with an explicit bias.
    #[must_use]
    pub fn new(key: K, timestamp: impl Into<Timestamp>, bias: Bias) -> Self {
        Self {
            key,
            timestamp: timestamp.into(),
            bias,
        }
    }

    /// Builds an add of `key`.
    #[must_use]
    pub fn add(key: K, timestamp: impl Into<Timestamp>) -> Self {
        Self::new(key, timestamp, Bias::Adds)
    }

    /// Builds a remove of `key`.
    #[must_use]
    pub fn remove(key: K, timestamp: impl Into<Timestamp>) -> Self {
        Self::new(key, timestamp, Bias::Removals)
    }

    #[must_use]
    pub fn key(&self) -> &K {
        &self.key
    }

    #[must_use]
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    #[must_use]
    pub fn bias(&self) -> Bias {
        self.bias
    }

    /// Consumes the operation, returning its key.
    #[must_use]
    pub fn into_key(self) -> K {
        self.key
    }

    pub(crate) fn expect_bias(&self, expected: Bias) -> crate::Result<()> {
        if self.bias == expected {
            Ok(())
        } else {
            Err(crate::Error::InvalidBias {
                expected,
                found: self.bias,
            })
        }
    }
}
