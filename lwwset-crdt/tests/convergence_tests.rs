//! N-replica convergence scenarios.
//!
//! 1. Gossip between random-ish pairs rather than a full mesh
//! 2. Chain convergence (A→B→C)
//! 3. Add/remove churn on a shared key
//! 4. Replicas shared across threads behind a mutex

use lwwset_crdt::{LWWElementSet, Replica};
use lwwset_types::ReplicaId;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::thread;
use tracing_subscriber::EnvFilter;

/// Routes merge logging to the test harness; `RUST_LOG=debug` shows it.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Deterministic replica IDs for reproducibility.
fn replica_id(n: u8) -> ReplicaId {
    ReplicaId::from_seed(u64::from(n))
}

fn members(set: &LWWElementSet<String>) -> HashSet<String> {
    set.iter().cloned().collect()
}

fn assert_all_converged(replicas: &[Replica<String>]) {
    let reference = members(replicas[0].set());
    for (i, r) in replicas.iter().enumerate().skip(1) {
        assert_eq!(members(r.set()), reference, "replica {i} diverged");
        assert_eq!(r.set(), replicas[0].set(), "replica {i} logs diverged");
    }
}

fn full_sync(replicas: &mut [Replica<String>]) {
    let snapshots: Vec<_> = replicas.iter().map(|r| r.set().clone()).collect();
    for r in replicas.iter_mut() {
        for s in &snapshots {
            r.sync_from(s).unwrap();
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// 1. GOSSIP
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn gossip_convergence_10_replicas() {
    init_tracing();
    let n = 10;
    let mut replicas: Vec<Replica<String>> = (0..n).map(|i| Replica::new(replica_id(i))).collect();

    for (i, r) in replicas.iter_mut().enumerate() {
        r.insert(format!("own_{i}")).unwrap();
        r.insert("shared".into()).unwrap();
    }
    // Every third replica drops the shared key before hearing from anyone
    for i in (0..n as usize).step_by(3) {
        replicas[i].delete("shared").unwrap();
    }

    // Peer i pulls from peer (i + round) % n
    for round in 1..n as usize {
        let snapshots: Vec<_> = replicas.iter().map(|r| r.set().clone()).collect();
        for i in 0..n as usize {
            let partner = (i + round) % n as usize;
            replicas[i].sync_from(&snapshots[partner]).unwrap();
        }
    }

    assert_all_converged(&replicas);
    let set = members(replicas[0].set());
    for i in 0..n {
        assert!(set.contains(&format!("own_{i}")));
    }
    // All adds and removes of "shared" happened at timestamps 2 and 3; the
    // removes are newest
    assert!(!set.contains("shared"));
}

// ═══════════════════════════════════════════════════════════════════════════
// 2. CHAIN
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn chain_convergence_is_transitive() {
    let mut a = Replica::<String>::new(replica_id(1));
    let mut b = Replica::<String>::new(replica_id(2));
    let mut c = Replica::<String>::new(replica_id(3));

    a.insert("from_a".into()).unwrap();
    b.insert("from_b".into()).unwrap();
    c.insert("from_c".into()).unwrap();

    // A → B → C, then C → B → A
    b.sync_from(a.set()).unwrap();
    c.sync_from(b.set()).unwrap();
    b.sync_from(c.set()).unwrap();
    a.sync_from(b.set()).unwrap();

    let replicas = [a, b, c];
    assert_all_converged(&replicas);
    assert_eq!(replicas[0].set().len(), 3);
}

// ═══════════════════════════════════════════════════════════════════════════
// 3. CHURN
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn churn_on_shared_key_converges() {
    init_tracing();
    let mut replicas: Vec<Replica<String>> = (0..4).map(|i| Replica::new(replica_id(i))).collect();

    for cycle in 0..250 {
        let i = cycle % 4;
        let r = &mut replicas[i];
        if r.contains("hot") {
            r.delete("hot").unwrap();
        } else {
            r.insert("hot".into()).unwrap();
        }
        if cycle % 7 == 0 {
            let snapshot = replicas[i].set().clone();
            replicas[(i + 1) % 4].sync_from(&snapshot).unwrap();
        }
    }

    full_sync(&mut replicas);
    assert_all_converged(&replicas);

    // One entry per log no matter how many cycles ran
    let set = replicas[0].set();
    assert_eq!(set.add_log().len(), 1);
    assert!(set.remove_log().len() <= 1);
}

#[test]
fn tombstones_are_retained_after_convergence() {
    let mut replicas: Vec<Replica<String>> = (0..3).map(|i| Replica::new(replica_id(i))).collect();
    for k in 0..50 {
        replicas[k % 3].insert(format!("item_{k}")).unwrap();
    }
    full_sync(&mut replicas);
    for k in (0..50).step_by(2) {
        replicas[0].delete(&format!("item_{k}")).unwrap();
    }
    full_sync(&mut replicas);

    assert_all_converged(&replicas);
    assert_eq!(replicas[1].set().len(), 25);
    assert_eq!(replicas[1].set().remove_log().len(), 25);
}

// ═══════════════════════════════════════════════════════════════════════════
// 4. THREADS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn mutex_guarded_replicas_converge_across_threads() {
    let replicas: Vec<Arc<Mutex<Replica<String>>>> = (0..4)
        .map(|i| Arc::new(Mutex::new(Replica::new(replica_id(i)))))
        .collect();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let replicas = replicas.clone();
            thread::spawn(move || {
                for k in 0..25 {
                    let key = format!("t{i}_{k}");
                    replicas[i].lock().unwrap().insert(key.clone()).unwrap();
                    if k % 5 == 0 {
                        replicas[i].lock().unwrap().delete(&key).unwrap();
                    }
                    // Pull from a neighbour; never hold two locks at once
                    let neighbour = (i + 1 + k) % 4;
                    if neighbour != i {
                        let snapshot = replicas[neighbour].lock().unwrap().set().clone();
                        replicas[i].lock().unwrap().sync_from(&snapshot).unwrap();
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let mut finished: Vec<Replica<String>> = replicas
        .iter()
        .map(|r| r.lock().unwrap().clone())
        .collect();
    full_sync(&mut finished);
    assert_all_converged(&finished);
    // 4 threads x 25 keys, every fifth one removed
    assert_eq!(finished[0].set().len(), 80);
}
