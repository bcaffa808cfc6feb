//! Scalar logical timestamps.
//!
//! Every operation on the set carries one of these. They are totally
//! ordered and compared numerically; two replicas may well produce the
//! same value, so equality is an expected case rather than an anomaly.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A totally ordered clock value.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The smallest timestamp. A fresh clock starts here.
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw clock value.
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Returns the immediately following timestamp, or `None` at `u64::MAX`.
    #[must_use]
    pub const fn checked_next(&self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }
}

impl From<u64> for Timestamp {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Timestamp> for u64 {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Timestamp {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|e| crate::Error::InvalidTimestamp(format!("{s:?}: {e}")))
    }
}
