//! Round snapshot store: raw per-round facts for one reconciliation cycle.
//!
//! Rebuilt from scratch every cycle; nothing here survives across cycles.
//! All deduplication and canonical-record selection rules live in this
//! module so the classifier never depends on indexer iteration order.

use std::collections::{BTreeMap, HashMap};

use alloy_primitives::Address;
use anyhow::Result;
use tracing::{debug, warn};

use crate::error::ReconcileError;
use crate::traits::EventIndexer;
use crate::types::{
    CommitRecord, FulfillmentAttempt, RecoverySubmission, RoundRequest, UnixSecs,
};

/// Everything observed about one open round.
#[derive(Debug, Clone)]
pub struct RoundFacts {
    pub round: u64,
    pub request: RoundRequest,
    pub commits: Vec<CommitRecord>,
    pub recoveries: Vec<RecoverySubmission>,
    pub fulfillments: Vec<FulfillmentAttempt>,
}

impl RoundFacts {
    /// Canonical recovery submission: greatest block timestamp, and on a
    /// timestamp tie the later-observed submission wins.
    pub fn canonical_recovery(&self) -> Option<&RecoverySubmission> {
        let mut best: Option<&RecoverySubmission> = None;
        for sub in &self.recoveries {
            match best {
                Some(b) if sub.block_timestamp < b.block_timestamp => {}
                _ => best = Some(sub),
            }
        }
        best
    }

    /// Start of the commit phase: the earliest observed commit timestamp.
    pub fn earliest_commit_ts(&self) -> Option<UnixSecs> {
        self.commits.iter().map(|c| c.block_timestamp).min()
    }

    /// First successful fulfillment attempt, in observed order.
    pub fn fulfilling_submitter(&self) -> Option<Address> {
        self.fulfillments
            .iter()
            .find(|f| f.success)
            .map(|f| f.submitter)
    }

    pub fn has_committed(&self, who: Address) -> bool {
        self.commits.iter().any(|c| c.committer == who)
    }
}

/// Fetch and normalize the full set of open rounds.
///
/// A failure to list rounds aborts the cycle; a failure to fetch one
/// round's events drops only that round, which is retried next cycle.
pub async fn build_snapshot<I: EventIndexer + ?Sized>(
    indexer: &I,
) -> Result<BTreeMap<u64, RoundFacts>> {
    let requests = indexer
        .fetch_requested_rounds()
        .await
        .map_err(|e| ReconcileError::Transient(format!("round listing failed: {e:#}")))?;

    let mut facts = BTreeMap::new();
    for (round, request) in dedup_requests(requests) {
        if request.is_fulfill_executed {
            continue;
        }

        let commits = match indexer.fetch_commits(&request.round).await {
            Ok(c) => c,
            Err(e) => {
                warn!(round, "Skipping round, commit fetch failed: {e:#}");
                continue;
            }
        };
        let recoveries = match indexer.fetch_recovery_submissions(&request.round).await {
            Ok(r) => r,
            Err(e) => {
                warn!(round, "Skipping round, recovery fetch failed: {e:#}");
                continue;
            }
        };
        let fulfillments = match indexer.fetch_fulfillment_attempts(&request.round).await {
            Ok(f) => f,
            Err(e) => {
                warn!(round, "Skipping round, fulfillment fetch failed: {e:#}");
                continue;
            }
        };

        facts.insert(
            round,
            RoundFacts {
                round,
                request,
                commits,
                recoveries,
                fulfillments,
            },
        );
    }

    debug!("Snapshot holds {} open rounds", facts.len());
    Ok(facts)
}

/// Deduplicate request events per round: the greatest block timestamp
/// wins, and on a tie the later-observed event wins. Rounds that fail to
/// parse as integers are dropped here.
fn dedup_requests(requests: Vec<RoundRequest>) -> Vec<(u64, RoundRequest)> {
    let mut latest: HashMap<u64, RoundRequest> = HashMap::new();
    for request in requests {
        let round: u64 = match request.round.parse() {
            Ok(r) => r,
            Err(_) => {
                warn!(round = %request.round, "Skipping unparseable round number");
                continue;
            }
        };
        match latest.get(&round) {
            Some(existing) if request.block_timestamp < existing.block_timestamp => {}
            _ => {
                latest.insert(round, request);
            }
        }
    }
    let mut out: Vec<(u64, RoundRequest)> = latest.into_iter().collect();
    out.sort_by_key(|(round, _)| *round);
    out
}
