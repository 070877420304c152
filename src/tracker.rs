//! Round state tracker: process-wide memory of settled terminal actions.
//!
//! Written only after a confirmed transaction, read before every dispatch.
//! Best-effort dedup: the map lives in-process, so a restart forgets it;
//! the underlying chain actions are idempotent or rejected when already
//! satisfied, which keeps that acceptable.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::types::{ActionKind, UnixSecs};

/// One settled terminal action for a round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettledAction {
    pub kind: ActionKind,
    pub tx_hash: String,
    pub settled_at: UnixSecs,
}

/// Concurrent map (round, action-kind) -> settled action.
///
/// Entry access is serialized per key by the map's shard locks, so two
/// dispatch paths can never record the same key concurrently.
#[derive(Default)]
pub struct RoundStateTracker {
    settled: DashMap<(u64, ActionKind), SettledAction>,
}

impl RoundStateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a terminal action of this kind already settled for `round`.
    pub fn is_settled(&self, round: u64, kind: ActionKind) -> bool {
        self.settled.contains_key(&(round, kind))
    }

    /// Record a confirmed action. Write-once: returns false and leaves the
    /// existing entry untouched if the key was already settled.
    pub fn record(&self, round: u64, kind: ActionKind, tx_hash: String, now: UnixSecs) -> bool {
        match self.settled.entry((round, kind)) {
            Entry::Occupied(_) => false,
            Entry::Vacant(vacant) => {
                vacant.insert(SettledAction {
                    kind,
                    tx_hash,
                    settled_at: now,
                });
                true
            }
        }
    }

    pub fn get(&self, round: u64, kind: ActionKind) -> Option<SettledAction> {
        self.settled.get(&(round, kind)).map(|e| e.value().clone())
    }

    pub fn len(&self) -> usize {
        self.settled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settled.is_empty()
    }
}
