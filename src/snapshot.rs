//! Triple-buffered snapshot hand-off between the tick thread and a reader.
//!
//! Three slots, three roles. The writer owns one slot (`write`), the reader
//! owns one (`read`), and the third (`ready`) holds the newest published
//! state behind a small mutex. `publish` and `acquire` each swap a `Box`
//! with the ready slot under that lock: a role change is a pointer swap,
//! the lock is never held across snapshot-sized work, and no slot is ever
//! reachable from two roles at once. The reader may miss intermediate
//! snapshots; it can never observe a torn one.

use crate::particle::Particle;
use std::mem;
use std::sync::{Arc, Mutex};

/// One complete, internally consistent simulation state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    /// Live particles in engine order (survivors first, then the particles
    /// admitted from the injection queue that tick).
    pub particles: Vec<Particle>,
    /// Simulation time at which this state was produced.
    pub time: f64,
    /// Completed engine steps when this state was produced. Strictly
    /// increases across successful acquires.
    pub tick: u64,
}

impl Snapshot {
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

struct ReadySlot {
    snapshot: Box<Snapshot>,
    /// Set by publish, cleared by acquire. Distinguishes "newest state not
    /// yet claimed" from "reader already has this one".
    fresh: bool,
}

/// Writer half. Held by the simulation side; not cloneable, so the single
/// writer role is enforced at the type level.
pub struct SnapshotWriter {
    ready: Arc<Mutex<ReadySlot>>,
    write: Box<Snapshot>,
}

/// Reader half. Held by the consumer side.
pub struct SnapshotReader {
    ready: Arc<Mutex<ReadySlot>>,
    read: Box<Snapshot>,
    acquired_any: bool,
}

/// Creates the three slots and hands one end to each side.
pub fn channel() -> (SnapshotWriter, SnapshotReader) {
    let ready = Arc::new(Mutex::new(ReadySlot {
        snapshot: Box::default(),
        fresh: false,
    }));
    let writer = SnapshotWriter {
        ready: Arc::clone(&ready),
        write: Box::default(),
    };
    let reader = SnapshotReader {
        ready,
        read: Box::default(),
        acquired_any: false,
    };
    (writer, reader)
}

impl SnapshotWriter {
    /// The slot currently labeled `write`. Always available; mutate freely
    /// until `publish`.
    pub fn begin_write(&mut self) -> &mut Snapshot {
        &mut self.write
    }

    /// Swap the finished snapshot into the ready slot. The previous ready
    /// slot comes back as the next write target, allocation intact, which
    /// is what keeps per-tick publishing allocation-free in steady state.
    pub fn publish(&mut self) {
        let mut ready = self.ready.lock().unwrap();
        mem::swap(&mut self.write, &mut ready.snapshot);
        ready.fresh = true;
    }
}

impl SnapshotReader {
    /// Claim the newest published snapshot if there is one the reader has
    /// not seen yet. Returns false (leaving the current read slot alone)
    /// when nothing new has been published, including before the very first
    /// publish.
    pub fn acquire(&mut self) -> bool {
        let mut ready = self.ready.lock().unwrap();
        if ready.fresh {
            mem::swap(&mut self.read, &mut ready.snapshot);
            ready.fresh = false;
            self.acquired_any = true;
            true
        } else {
            false
        }
    }

    /// The slot currently labeled `read`. Valid until the next `acquire`.
    /// Holds the empty default snapshot until the first successful acquire.
    pub fn current_read(&self) -> &Snapshot {
        &self.read
    }

    /// The last acquired snapshot, or None if nothing was ever acquired.
    pub fn latest(&self) -> Option<&Snapshot> {
        self.acquired_any.then_some(&*self.read)
    }

    /// `acquire` and `current_read` in one call: Some only when a fresh
    /// snapshot was claimed just now.
    pub fn try_latest(&mut self) -> Option<&Snapshot> {
        if self.acquire() { Some(&*self.read) } else { None }
    }
}
