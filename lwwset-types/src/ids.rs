//! Replica identifiers.
//!
//! A replica id names one copy of the set for logging and bookkeeping. It
//! never takes part in conflict resolution: two replicas issuing operations
//! at the same timestamp are settled by the set's tie-break policy, not by
//! comparing ids.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identity of one replica.
///
/// Fresh ids are UUID v7, so replicas created later sort later. Simulations
/// and tests that need reproducible ids use [`ReplicaId::from_seed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReplicaId(Uuid);

impl ReplicaId {
    /// Mints an id for a newly created replica.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Builds a deterministic id from a small seed.
    ///
    /// Distinct seeds give distinct ids, and ids order by seed.
    #[must_use]
    pub const fn from_seed(seed: u64) -> Self {
        Self(Uuid::from_u64_pair(0, seed))
    }

    /// Wraps an id received from elsewhere (e.g. a peer's handshake).
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// Returns the last eight hex digits, enough to tell replicas apart in
    /// log lines.
    #[must_use]
    pub fn short(&self) -> String {
        let simple = self.0.simple().to_string();
        simple[simple.len() - 8..].to_owned()
    }

    /// Parses the hyphenated form produced by `Display`.
    pub fn parse(s: &str) -> crate::Result<Self> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for ReplicaId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ReplicaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for ReplicaId {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
