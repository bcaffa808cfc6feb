//! Last-Writer-Wins Element Set (LWW-Element-Set).
//!
//! A CRDT set built from two logs of timestamped operations: an add-log and
//! a remove-log, each holding at most one operation per key. A key is in the
//! set when its latest add is newer than its latest remove.
//!
//! Removes are only recorded against keys that are currently present. A
//! removed key keeps its remove-log entry forever; a later add brings it
//! back.
//!
//! Use cases:
//! - Membership lists replicated between devices
//! - Flags or labels toggled independently on several replicas

use crate::{Bias, ElementSetConfig, Error, Operation, PresenceBias, Result, TieBreak};
use lwwset_types::Timestamp;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;
use tracing::{debug, trace, warn};

type Log<K> = HashMap<K, Operation<K>>;

/// A Last-Writer-Wins Element Set.
///
/// Each replica owns its own instance. Replicas exchange state by calling
/// [`merge`](Self::merge) with each other's sets, in any order and as often
/// as they like.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(
    try_from = "RawElementSet<K>",
    bound(deserialize = "K: Deserialize<'de> + Eq + Hash + Clone")
)]
pub struct LWWElementSet<K>
where
    K: Eq + Hash + Clone,
{
    /// Latest accepted add per key.
    add_log: Log<K>,
    /// Latest accepted remove per key (tombstones).
    remove_log: Log<K>,
    config: ElementSetConfig,
}

/// Unvalidated wire form; checked before it becomes a set.
#[derive(Deserialize)]
#[serde(bound(deserialize = "K: Deserialize<'de> + Eq + Hash + Clone"))]
struct RawElementSet<K>
where
    K: Eq + Hash + Clone,
{
    add_log: Log<K>,
    remove_log: Log<K>,
    #[serde(default)]
    config: ElementSetConfig,
}

impl<K> TryFrom<RawElementSet<K>> for LWWElementSet<K>
where
    K: Eq + Hash + Clone,
{
    type Error = Error;

    fn try_from(raw: RawElementSet<K>) -> Result<Self> {
        validate_log(&raw.add_log, Bias::Adds)?;
        validate_log(&raw.remove_log, Bias::Removals)?;
        Ok(Self {
            add_log: raw.add_log,
            remove_log: raw.remove_log,
            config: raw.config,
        })
    }
}

impl<K> Default for LWWElementSet<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> LWWElementSet<K>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty set with the default policy.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ElementSetConfig::default())
    }

    /// Creates an empty set with an explicit policy.
    #[must_use]
    pub fn with_config(config: ElementSetConfig) -> Self {
        Self {
            add_log: HashMap::new(),
            remove_log: HashMap::new(),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ElementSetConfig {
        &self.config
    }

    /// Records an add, replacing any earlier add of the same key.
    ///
    /// The replacement is unconditional: a local add always wins locally,
    /// whatever its timestamp. Concurrent adds from other replicas are
    /// reconciled by [`merge`](Self::merge).
    ///
    /// Fails with [`Error::InvalidBias`] if `op` is not an add.
    pub fn add(&mut self, op: Operation<K>) -> Result<()> {
        op.expect_bias(Bias::Adds)?;
        self.add_log.insert(op.key.clone(), op);
        Ok(())
    }

    /// Records a remove if the key is currently present.
    ///
    /// A remove of an absent key is dropped without touching the set; this
    /// is normal and not reported as a failure. Returns whether the remove
    /// was recorded.
    ///
    /// Fails with [`Error::InvalidBias`] if `op` is not a remove.
    pub fn remove(&mut self, op: Operation<K>) -> Result<bool> {
        op.expect_bias(Bias::Removals)?;
        if !self.contains(&op.key) {
            trace!(timestamp = %op.timestamp, "ignoring remove of absent key");
            return Ok(false);
        }
        self.remove_log.insert(op.key.clone(), op);
        Ok(true)
    }

    /// Returns true if the key is in the set.
    ///
    /// A key is present when it has an add and either no remove or a remove
    /// with a strictly smaller timestamp. With
    /// [`presence`](ElementSetConfig::presence) set to
    /// [`PresenceBias::Adds`] an exact tie also counts as present.
    #[must_use]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(added) = self.add_log.get(key) else {
            return false;
        };
        match self.remove_log.get(key) {
            None => true,
            Some(removed) => match added.timestamp.cmp(&removed.timestamp) {
                Ordering::Greater => true,
                Ordering::Less => false,
                Ordering::Equal => self.config.presence == PresenceBias::Adds,
            },
        }
    }

    /// Returns true if every key in this set's logs also appears in the
    /// matching log of `other`.
    ///
    /// This compares key sets only, not timestamps or membership. It is a
    /// cheap containment check, not the CRDT partial order.
    #[must_use]
    pub fn is_subset_of(&self, other: &Self) -> bool {
        self.add_log.keys().all(|key| other.add_log.contains_key(key))
            && self
                .remove_log
                .keys()
                .all(|key| other.remove_log.contains_key(key))
    }

    /// Returns true if `candidate` should replace `current` in their log.
    ///
    /// The later timestamp wins; an exact tie is settled by the configured
    /// [`TieBreak`]. Comparing an add against a remove is a caller bug and
    /// fails with [`Error::InvalidBias`].
    pub fn dominates(&self, current: &Operation<K>, candidate: &Operation<K>) -> Result<bool> {
        dominates_with(self.config.tie_break, current, candidate)
    }

    /// Merges another replica's state into this one.
    ///
    /// For every key in each of `other`'s logs, the incoming operation is
    /// taken if this set has no entry for the key or if it dominates the
    /// local entry.
    ///
    /// Both sets hold only correctly biased logs: local mutation checks bias
    /// and deserialized state is validated before it becomes a set, so the
    /// comparisons here never cross logs.
    pub fn merge(&mut self, other: &Self) -> Result<()> {
        if self.config != other.config {
            warn!(
                local = ?self.config,
                remote = ?other.config,
                "merging element sets with different policies"
            );
        }

        let tie_break = self.config.tie_break;
        let adds = merge_log(&mut self.add_log, &other.add_log, tie_break)?;
        let removals = merge_log(&mut self.remove_log, &other.remove_log, tie_break)?;
        debug!(adds, removals, "merged element set");
        Ok(())
    }

    /// Creates a new set that is the merge of this and another.
    pub fn merged(&self, other: &Self) -> Result<Self> {
        let mut result = self.clone();
        result.merge(other)?;
        Ok(result)
    }

    /// Merges a single operation received from another replica.
    ///
    /// Unlike [`add`](Self::add) and [`remove`](Self::remove), this applies
    /// the same dominance rule as [`merge`](Self::merge): the operation lands
    /// in the log matching its bias only if the log has no newer entry.
    /// Returns whether the log changed.
    pub fn merge_operation(&mut self, op: Operation<K>) -> Result<bool> {
        let tie_break = self.config.tie_break;
        let log = match op.bias {
            Bias::Adds => &mut self.add_log,
            Bias::Removals => &mut self.remove_log,
        };
        let accept = match log.get(&op.key) {
            None => true,
            Some(current) => dominates_with(tie_break, current, &op)?,
        };
        if accept {
            log.insert(op.key.clone(), op);
        }
        Ok(accept)
    }

    /// Returns the number of keys currently in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Returns an iterator over the keys currently in the set.
    pub fn iter(&self) -> impl Iterator<Item = &K> {
        self.add_log.keys().filter(|key| self.contains(*key))
    }

    /// Returns the latest add recorded for `key`.
    #[must_use]
    pub fn get_add<Q>(&self, key: &Q) -> Option<&Operation<K>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.add_log.get(key)
    }

    /// Returns the latest remove recorded for `key`.
    #[must_use]
    pub fn get_remove<Q>(&self, key: &Q) -> Option<&Operation<K>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove_log.get(key)
    }

    /// Returns the add-log (for replication/debugging).
    #[must_use]
    pub fn add_log(&self) -> &HashMap<K, Operation<K>> {
        &self.add_log
    }

    /// Returns the remove-log (for replication/debugging).
    #[must_use]
    pub fn remove_log(&self) -> &HashMap<K, Operation<K>> {
        &self.remove_log
    }

    /// Returns the largest timestamp in either log.
    #[must_use]
    pub fn max_timestamp(&self) -> Option<Timestamp> {
        self.add_log
            .values()
            .chain(self.remove_log.values())
            .map(|op| op.timestamp)
            .max()
    }
}

fn dominates_with<K>(
    tie_break: TieBreak,
    current: &Operation<K>,
    candidate: &Operation<K>,
) -> Result<bool> {
    candidate.expect_bias(current.bias)?;
    Ok(match candidate.timestamp.cmp(&current.timestamp) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => tie_break.prefers_incoming(),
    })
}

/// Folds `incoming` into `log`, returning how many entries were replaced.
fn merge_log<K>(log: &mut Log<K>, incoming: &Log<K>, tie_break: TieBreak) -> Result<usize>
where
    K: Eq + Hash + Clone,
{
    let mut replaced = 0;
    for (key, candidate) in incoming {
        let accept = match log.get(key) {
            None => true,
            Some(current) => dominates_with(tie_break, current, candidate)?,
        };
        if accept {
            log.insert(key.clone(), candidate.clone());
            replaced += 1;
        }
    }
    Ok(replaced)
}

fn validate_log<K>(log: &Log<K>, bias: Bias) -> Result<()>
where
    K: Eq + Hash,
{
    for (key, op) in log {
        op.expect_bias(bias)?;
        if *key != op.key {
            return Err(Error::KeyMismatch { log: bias });
        }
    }
    Ok(())
}

impl<K> PartialEq for LWWElementSet<K>
where
    K: Eq + Hash + Clone,
{
    fn eq(&self, other: &Self) -> bool {
        // Two sets are equal if their logs are; the policy is not state
        self.add_log == other.add_log && self.remove_log == other.remove_log
    }
}

impl<K> Eq for LWWElementSet<K> where K: Eq + Hash + Clone {}

impl<K> FromIterator<K> for LWWElementSet<K>
where
    K: Eq + Hash + Clone,
{
    /// Adds each key at successive timestamps starting from 1.
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut set = Self::new();
        for (n, key) in (1u64..).zip(iter) {
            set.add_log.insert(key.clone(), Operation::add(key, n));
        }
        set
    }
}
