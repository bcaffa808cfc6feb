//! Conflict policy for an element set.
//!
//! Every replica that exchanges state must run with the same policy.
//! Replicas with different policies still merge, but are no longer
//! guaranteed to agree on membership.

use crate::Result;
use serde::{Deserialize, Serialize};

/// How two operations of the same bias with equal timestamps are resolved.
///
/// Within one log an exact tie is between operations with the same key,
/// timestamp and bias, so either choice converges. The setting only
/// decides whether a tie counts as a replacement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// The entry already in the log stays.
    #[default]
    KeepExisting,
    /// The incoming entry replaces the one in the log.
    PreferIncoming,
}

impl TieBreak {
    pub(crate) fn prefers_incoming(self) -> bool {
        matches!(self, Self::PreferIncoming)
    }
}

/// Which side wins when a key's latest add and latest remove carry the
/// same timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresenceBias {
    /// The key is present.
    Adds,
    /// The key is absent.
    #[default]
    Removals,
}

/// Policy for an [`LWWElementSet`](crate::LWWElementSet).
///
/// Unknown fields are rejected so a misspelt setting cannot silently fall
/// back to a default that differs from other replicas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ElementSetConfig {
    /// Tie-break between same-bias operations during merge.
    pub tie_break: TieBreak,
    /// Tie-break between a key's latest add and latest remove.
    pub presence: PresenceBias,
}

impl ElementSetConfig {
    /// Parses a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
