//! Dispute evaluation and dispatch, wired together the way the cycle
//! wires them: evaluator output feeds the dispatcher's dispute buckets.

use std::collections::BTreeMap;
use std::time::Duration;

use alloy_primitives::{Address, U256};
use roundkeeper::dispatcher::Dispatcher;
use roundkeeper::dispute::{evaluate_leadership_disputes, evaluate_recover_disputes};
use roundkeeper::elector::ModuloElector;
use roundkeeper::snapshot::RoundFacts;
use roundkeeper::traits::LeaderElector;
use roundkeeper::types::{
    RecoveryResult, RecoverySubmission, RoundRequest, RoundResults, VrfProof,
};
use roundkeeper::{MockElector, MockTransactor, RoundStateTracker};

fn addr(n: u8) -> Address {
    Address::repeat_byte(n)
}

fn submission(submitter: Address, omega: u64, ts: u64) -> RecoverySubmission {
    RecoverySubmission {
        submitter,
        omega: U256::from(omega),
        is_recovered: true,
        block_timestamp: ts,
        proof: VrfProof::default(),
    }
}

fn fact(round: u64, recoveries: Vec<RecoverySubmission>) -> RoundFacts {
    RoundFacts {
        round,
        request: RoundRequest {
            round: round.to_string(),
            block_timestamp: 0,
            leader: addr(9),
            valid_commit_count: 0,
            is_fulfill_executed: false,
        },
        commits: Vec::new(),
        recoveries,
        fulfillments: Vec::new(),
    }
}

fn recovery_result(round: u64, omega_recov: u64) -> RecoveryResult {
    RecoveryResult {
        round,
        request_block_time: 0,
        commit_phase_end_time: 0,
        recover_phase_end_time: 0,
        is_recovered: true,
        is_fulfill_executed: false,
        omega_recov: U256::from(omega_recov),
        proof: VrfProof::default(),
    }
}

#[tokio::test]
async fn mismatched_recovery_yields_exactly_one_dispute_transaction() {
    let operator = addr(1);

    // Round 3: submitted omega 0xAA, recomputed omega 0xBB, twice over.
    let mut results = RoundResults::default();
    results.recover_disputeable.push(3);
    results.recovery_data.push(recovery_result(3, 0xBB));
    let facts: BTreeMap<u64, RoundFacts> = [(
        3,
        fact(
            3,
            vec![submission(addr(5), 0xAA, 10), submission(addr(6), 0xAC, 20)],
        ),
    )]
    .into_iter()
    .collect();

    let candidates = evaluate_recover_disputes(&results, &facts);
    assert_eq!(candidates.len(), 1);

    let transactor = MockTransactor::new();
    let elector = MockElector::new(operator);
    let tracker = RoundStateTracker::new();
    let dispatcher = Dispatcher::new(&transactor, &elector, &tracker, operator, Duration::ZERO);

    dispatcher.dispatch(&results, &candidates, &[], 100).await;
    assert_eq!(transactor.submitted_for("disputeRecover").len(), 1);

    // A second pass over the same evidence stays silent.
    dispatcher.dispatch(&results, &candidates, &[], 200).await;
    assert_eq!(transactor.submitted_for("disputeRecover").len(), 1);
}

#[tokio::test]
async fn only_the_recomputed_leader_disputes_leadership() {
    let operators = vec![addr(1), addr(2), addr(3)];
    let elector = ModuloElector::new(operators.clone());

    let round = 8u64;
    let omega = 77u64;
    let leader = elector.elect_leader(round, U256::from(omega));
    let wrong_submitter = *operators.iter().find(|a| **a != leader).unwrap();

    let mut results = RoundResults::default();
    results.leadership_disputeable.push(round);
    results.recovery_data.push(recovery_result(round, omega));
    let facts: BTreeMap<u64, RoundFacts> =
        [(round, fact(round, vec![submission(wrong_submitter, omega, 10)]))]
            .into_iter()
            .collect();

    for candidate_operator in operators {
        let candidates =
            evaluate_leadership_disputes(&results, &facts, &elector, candidate_operator);
        if candidate_operator == leader {
            assert_eq!(candidates, vec![round]);
        } else {
            assert!(
                candidates.is_empty(),
                "operator {candidate_operator} must not hold the dispute right"
            );
        }
    }
}
