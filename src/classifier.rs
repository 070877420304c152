//! Round classifier: pure bucketing of open rounds.
//!
//! Classification walks rounds in ascending order and applies a fixed
//! priority: finalization first, then committable, mine-to-lead,
//! re-requestable, fulfillable. The branch order is load-bearing; every
//! operator must classify identically or duplicate corrective actions
//! follow.

use std::collections::BTreeMap;
use std::collections::HashMap;

use alloy_primitives::Address;
use tracing::debug;

use crate::error::ReconcileError;
use crate::snapshot::RoundFacts;
use crate::types::{RecoveryResult, RoundResults, UnixSecs};

/// Inputs that parameterize classification besides the snapshot itself.
#[derive(Debug, Clone, Copy)]
pub struct ClassifierParams {
    pub operator: Address,
    pub commit_phase_secs: u64,
    pub dispute_phase_secs: u64,
}

/// Classify every open round into exactly one bucket.
///
/// The recovery and dispute buckets (`recoverable`, `recover_disputeable`,
/// `leadership_disputeable`) are intentionally never populated here: no
/// classification rule for them exists yet. The dispatcher already
/// consumes them, so a future population pass needs no dispatcher change.
pub fn classify(
    facts: &BTreeMap<u64, RoundFacts>,
    params: &ClassifierParams,
    now: UnixSecs,
) -> RoundResults {
    let mut results = RoundResults::default();

    for (&round, fact) in facts {
        // A round with no observed commits has no commit phase end yet;
        // nothing can be decided about it this cycle.
        let commit_phase_end = match fact.earliest_commit_ts() {
            Some(ts) => ts + params.commit_phase_secs,
            None => {
                debug!(round, "No commits observed yet, leaving round unclassified");
                continue;
            }
        };

        // Finalization takes precedence over every actionable bucket.
        if let Some(canonical) = fact.canonical_recovery() {
            let recover_end = canonical.block_timestamp + params.dispute_phase_secs;
            if recover_end <= now {
                results.complete.push(round);
                results.recovery_data.push(RecoveryResult {
                    round,
                    request_block_time: fact.request.block_timestamp,
                    commit_phase_end_time: commit_phase_end,
                    recover_phase_end_time: recover_end,
                    is_recovered: canonical.is_recovered,
                    is_fulfill_executed: fact.request.is_fulfill_executed,
                    omega_recov: canonical.omega,
                    proof: canonical.proof.clone(),
                });
                continue;
            }
        }

        // First match wins; the branches are not independent.
        if fact.request.valid_commit_count > 0 && !fact.has_committed(params.operator) {
            results.committable.push(round);
        } else if fact.request.leader == params.operator {
            results.mine_to_lead.push(round);
        } else if commit_phase_end > now {
            results.re_requestable.push(round);
        } else {
            results.fulfillable.push(round);
        }
    }

    results
}

/// Contract check: no round may appear in two mutually exclusive buckets.
///
/// A violation means classifier logic has diverged across operators and
/// is surfaced as a hard error rather than logged away.
pub fn verify_disjoint(results: &RoundResults) -> Result<(), ReconcileError> {
    let buckets: [(&str, &[u64]); 8] = [
        ("recoverable", &results.recoverable),
        ("committable", &results.committable),
        ("mine-to-lead", &results.mine_to_lead),
        ("re-requestable", &results.re_requestable),
        ("fulfillable", &results.fulfillable),
        ("recover-disputeable", &results.recover_disputeable),
        ("leadership-disputeable", &results.leadership_disputeable),
        ("complete", &results.complete),
    ];

    let mut seen: HashMap<u64, &str> = HashMap::new();
    for (name, rounds) in buckets {
        for &round in rounds {
            if let Some(previous) = seen.insert(round, name) {
                return Err(ReconcileError::Invariant(format!(
                    "round {round} classified as both {previous} and {name}"
                )));
            }
        }
    }
    Ok(())
}
