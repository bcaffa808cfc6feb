//! Lamport clock for stamping local operations.
//!
//! A replica ticks its clock for every local add or remove and observes
//! every timestamp it receives, so a local operation issued after a merge
//! always carries a timestamp larger than anything the replica has seen.

use crate::{Error, Result, Timestamp};
use serde::{Deserialize, Serialize};

/// A scalar logical clock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LamportClock {
    current: Timestamp,
}

impl LamportClock {
    /// Creates a clock at [`Timestamp::ZERO`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a clock that resumes from `ts`.
    #[must_use]
    pub const fn starting_at(ts: Timestamp) -> Self {
        Self { current: ts }
    }

    /// Returns the last timestamp issued or observed.
    #[must_use]
    pub const fn current(&self) -> Timestamp {
        self.current
    }

    /// Advances the clock and returns the new timestamp.
    ///
    /// Every timestamp returned is strictly greater than the last one. Once
    /// the clock has reached `u64::MAX` it fails with
    /// [`Error::ClockExhausted`] and stays put.
    pub fn tick(&mut self) -> Result<Timestamp> {
        self.current = self.current.checked_next().ok_or(Error::ClockExhausted)?;
        Ok(self.current)
    }

    /// Folds a received timestamp into the clock.
    ///
    /// The clock never moves backwards.
    pub fn observe(&mut self, ts: Timestamp) {
        if ts > self.current {
            self.current = ts;
        }
    }
}
