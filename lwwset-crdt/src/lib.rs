//! Last-Writer-Wins element set.
//!
//! This crate provides a state-based CRDT for a set of keys:
//!
//! - [`LWWElementSet<K>`] - add-log and remove-log of timestamped operations,
//!   membership derived by comparing the latest add and remove per key
//! - [`Operation<K>`] - an immutable, biased, timestamped add or remove
//! - [`Replica<K>`] - a set owned by one replica, with a clock for local ops
//! - [`ElementSetConfig`] - tie-break policy shared by every replica
//!
//! Merging satisfies the usual CRDT laws:
//! - **Commutative**: merge(a, b) == merge(b, a)
//! - **Associative**: merge(merge(a, b), c) == merge(a, merge(b, c))
//! - **Idempotent**: merge(a, a) == a
//!
//! Replicas converge as long as they all run with the same configuration.

mod config;
mod element_set;
mod error;
mod operation;
mod replica;

pub use config::{ElementSetConfig, PresenceBias, TieBreak};
pub use element_set::LWWElementSet;
pub use error::{Error, Result};
pub use operation::{Bias, Operation};
pub use replica::Replica;
