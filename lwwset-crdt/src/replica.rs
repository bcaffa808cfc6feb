//! A single replica of an element set.
//!
//! Pairs an [`LWWElementSet`] with the replica's identity and a Lamport
//! clock, so local operations are stamped automatically and always sort
//! after everything the replica has already seen.
//!
//! A replica is not internally synchronized. To share one across threads,
//! wrap it in a mutex.

use crate::{Bias, ElementSetConfig, LWWElementSet, Operation, Result};
use lwwset_types::{LamportClock, ReplicaId};
use std::borrow::Borrow;
use std::hash::Hash;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Replica<K>
where
    K: Eq + Hash + Clone,
{
    id: ReplicaId,
    clock: LamportClock,
    set: LWWElementSet<K>,
}

impl<K> Replica<K>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty replica with the default policy.
    #[must_use]
    pub fn new(id: ReplicaId) -> Self {
        Self::with_config(id, ElementSetConfig::default())
    }

    #[must_use]
    pub fn with_config(id: ReplicaId, config: ElementSetConfig) -> Self {
        Self {
            id,
            clock: LamportClock::new(),
            set: LWWElementSet::with_config(config),
        }
    }

    #[must_use]
    pub fn id(&self) -> ReplicaId {
        self.id
    }

    #[must_use]
    pub fn clock(&self) -> LamportClock {
        self.clock
    }

    /// Returns the replica's state, e.g. to ship to another replica.
    #[must_use]
    pub fn set(&self) -> &LWWElementSet<K> {
        &self.set
    }

    #[must_use]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.set.contains(key)
    }

    /// Adds `key` at the next local timestamp and returns the operation.
    ///
    /// Fails with [`Error::Clock`](crate::Error::Clock) once the clock is
    /// exhausted; the set is left untouched.
    pub fn insert(&mut self, key: K) -> Result<Operation<K>> {
        let op = Operation::add(key, self.clock.tick()?);
        self.set.add(op.clone())?;
        debug!(replica = %self.id.short(), timestamp = %op.timestamp(), "added key");
        Ok(op)
    }

    /// Removes `key` at the next local timestamp.
    ///
    /// Returns `None` without advancing the clock if the key is not present.
    pub fn delete<Q>(&mut self, key: &Q) -> Result<Option<Operation<K>>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if !self.set.contains(key) {
            return Ok(None);
        }
        let Some(added) = self.set.get_add(key) else {
            return Ok(None);
        };
        let key = added.key().clone();
        let op = Operation::remove(key, self.clock.tick()?);
        self.set.remove(op.clone())?;
        debug!(replica = %self.id.short(), timestamp = %op.timestamp(), "removed key");
        Ok(Some(op))
    }

    /// Applies an operation received from another replica.
    ///
    /// The operation is merged under the dominance rule and its timestamp
    /// is folded into the local clock. Returns whether the state changed.
    pub fn apply(&mut self, op: Operation<K>) -> Result<bool> {
        let (ts, bias) = (op.timestamp(), op.bias());
        let changed = self.set.merge_operation(op)?;
        self.clock.observe(ts);
        if changed {
            let log = match bias {
                Bias::Adds => "add",
                Bias::Removals => "remove",
            };
            debug!(replica = %self.id.short(), timestamp = %ts, log, "applied remote operation");
        }
        Ok(changed)
    }

    /// Merges another replica's state and advances the clock past it.
    pub fn sync_from(&mut self, other: &LWWElementSet<K>) -> Result<()> {
        self.set.merge(other)?;
        if let Some(ts) = other.max_timestamp() {
            self.clock.observe(ts);
        }
        Ok(())
    }
}
