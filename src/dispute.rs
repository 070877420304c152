//! Dispute evaluator: recompute what should have happened on-chain and
//! compare against what actually did.

use std::collections::BTreeMap;

use alloy_primitives::Address;
use tracing::{debug, warn};

use crate::snapshot::RoundFacts;
use crate::traits::LeaderElector;
use crate::types::{RoundResults, VrfProof};

/// A round whose recovered value contradicts the recomputed one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoverDispute {
    pub round: u64,
    /// Proof parameters forwarded verbatim to `disputeRecover`.
    pub proof: VrfProof,
}

/// At most one recover-dispute candidate per flagged round.
///
/// Every observed submission is compared against the expected revealed
/// value; the first mismatch arms the per-round single-shot flag and all
/// further mismatches for that round are ignored this cycle.
pub fn evaluate_recover_disputes(
    results: &RoundResults,
    facts: &BTreeMap<u64, RoundFacts>,
) -> Vec<RecoverDispute> {
    let mut candidates = Vec::new();

    for &round in &results.recover_disputeable {
        let Some(expected) = results.recovery_for(round) else {
            warn!(round, "No recovery data for disputeable round");
            continue;
        };
        let Some(fact) = facts.get(&round) else {
            warn!(round, "Disputeable round missing from snapshot");
            continue;
        };

        let mut dispute_armed = false;
        for submission in &fact.recoveries {
            if submission.omega != expected.omega_recov && !dispute_armed {
                debug!(
                    round,
                    submitted = %submission.omega,
                    expected = %expected.omega_recov,
                    "Recovered value mismatch"
                );
                candidates.push(RecoverDispute {
                    round,
                    proof: expected.proof.clone(),
                });
                dispute_armed = true;
            }
        }

        if !dispute_armed {
            debug!(round, "No dispute warranted, all submissions match");
        }
    }

    candidates
}

/// Leadership-dispute candidates: rounds where the recorded submitter is
/// not the recomputed leader, and this operator *is* that leader.
///
/// Raising a leadership dispute is the exclusive right of the recomputed
/// leader; any other operator observing the same mismatch stays silent.
pub fn evaluate_leadership_disputes<E: LeaderElector + ?Sized>(
    results: &RoundResults,
    facts: &BTreeMap<u64, RoundFacts>,
    elector: &E,
    operator: Address,
) -> Vec<u64> {
    let mut candidates = Vec::new();

    for &round in &results.leadership_disputeable {
        let Some(expected) = results.recovery_for(round) else {
            warn!(round, "No recovery data for leadership-disputeable round");
            continue;
        };
        let Some(submitter) = facts
            .get(&round)
            .and_then(|f| f.canonical_recovery())
            .map(|r| r.submitter)
        else {
            warn!(round, "No recovery submission to dispute leadership of");
            continue;
        };

        let leader = elector.elect_leader(round, expected.omega_recov);
        if submitter != leader && operator == leader {
            debug!(round, %submitter, %leader, "Leadership mismatch, operator holds dispute right");
            candidates.push(round);
        }
    }

    candidates
}
