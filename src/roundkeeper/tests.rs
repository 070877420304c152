//! Unit tests for the reconciliation cycle, driven entirely by mocks.

use alloy_primitives::{Address, U256};

use super::core::RoundKeeper;
use super::cycle::now_secs;
use crate::config::BaseConfig;
use crate::elector::{ElectorVariant, MockElector};
use crate::error::ReconcileError;
use crate::indexer::{IndexerVariant, MockIndexer};
use crate::transactor::{MockTransactor, TransactorVariant};
use crate::types::{ActionKind, CommitRecord, RecoverySubmission, RoundRequest, VrfProof};

fn addr(n: u8) -> Address {
    Address::repeat_byte(n)
}

fn operator() -> Address {
    addr(1)
}

fn test_config() -> BaseConfig {
    BaseConfig {
        operator_address: operator(),
        recover_pace_ms: 0,
        ..BaseConfig::default()
    }
}

fn request(round: &str, ts: u64, leader: Address, commits: u64) -> RoundRequest {
    RoundRequest {
        round: round.to_string(),
        block_timestamp: ts,
        leader,
        valid_commit_count: commits,
        is_fulfill_executed: false,
    }
}

fn commit(committer: Address, ts: u64) -> CommitRecord {
    CommitRecord {
        committer,
        block_timestamp: ts,
    }
}

fn keeper_with(indexer: MockIndexer) -> RoundKeeper {
    RoundKeeper::new(
        IndexerVariant::Mock(indexer),
        TransactorVariant::Mock(MockTransactor::new()),
        ElectorVariant::Mock(MockElector::new(operator())),
        test_config(),
    )
}

fn mock_transactor(keeper: &RoundKeeper) -> &MockTransactor {
    match &keeper.transactor {
        TransactorVariant::Mock(mock) => mock,
        _ => panic!("test keeper must use the mock transactor"),
    }
}

#[tokio::test]
async fn committable_round_gets_committed_and_settled() {
    let now = now_secs();
    let indexer = MockIndexer::new()
        .with_request(request("42", now - 60, addr(2), 2))
        .with_commits("42", vec![commit(addr(2), now - 30), commit(addr(3), now - 20)]);

    let keeper = keeper_with(indexer);
    let report = keeper.run_cycle().await.unwrap();

    assert_eq!(report.open_rounds, 1);
    assert_eq!(report.dispatch.submitted, 1);
    let submitted = mock_transactor(&keeper).submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].method(), "commit");
    assert!(keeper.tracker.is_settled(42, ActionKind::Committed));
}

#[tokio::test]
async fn second_cycle_does_not_repeat_a_settled_action() {
    let now = now_secs();
    let indexer = MockIndexer::new()
        .with_request(request("42", now - 60, addr(2), 2))
        .with_commits("42", vec![commit(addr(2), now - 30)]);

    let keeper = keeper_with(indexer);
    keeper.run_cycle().await.unwrap();
    let report = keeper.run_cycle().await.unwrap();

    assert_eq!(report.dispatch.submitted, 0);
    assert_eq!(report.dispatch.skipped_settled, 1);
    assert_eq!(mock_transactor(&keeper).submitted().len(), 1);
}

#[tokio::test]
async fn finalized_round_yields_no_action() {
    let now = now_secs();
    let config = test_config();
    let recovery_ts = now - config.dispute_phase_secs - 100;
    let indexer = MockIndexer::new()
        .with_request(request("7", now - 10_000, addr(2), 1))
        .with_commits("7", vec![commit(addr(2), now - 10_000)])
        .with_recoveries(
            "7",
            vec![RecoverySubmission {
                submitter: addr(2),
                omega: U256::from(0xAAu64),
                is_recovered: true,
                block_timestamp: recovery_ts,
                proof: VrfProof::default(),
            }],
        );

    let keeper = keeper_with(indexer);
    let report = keeper.run_cycle().await.unwrap();

    assert_eq!(report.completed_rounds, 1);
    assert_eq!(report.dispatch.submitted, 0);
    assert!(mock_transactor(&keeper).submitted().is_empty());
}

#[tokio::test]
async fn unregistered_operator_deposits_before_anything_else() {
    let keeper = keeper_with(MockIndexer::new());
    mock_transactor(&keeper).set_operator_registered(false);

    keeper.run_cycle().await.unwrap();

    let submitted = mock_transactor(&keeper).submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].method(), "operatorDeposit");
}

#[tokio::test]
async fn round_listing_failure_aborts_the_cycle() {
    let indexer = MockIndexer {
        fail_round_listing: true,
        ..MockIndexer::new()
    };
    let keeper = keeper_with(indexer);
    let err = keeper.run_cycle().await.unwrap_err();
    let reconcile = err.downcast_ref::<ReconcileError>().unwrap();
    assert!(matches!(reconcile, ReconcileError::Transient(_)));
}

#[tokio::test]
async fn concurrent_cycle_is_refused() {
    let keeper = keeper_with(MockIndexer::new());
    let _held = keeper.cycle_gate.clone().try_acquire_owned().unwrap();

    let err = keeper.run_cycle().await.unwrap_err();
    let reconcile = err.downcast_ref::<ReconcileError>().unwrap();
    assert!(matches!(reconcile, ReconcileError::CycleBusy));
}

#[tokio::test]
async fn malformed_round_number_is_skipped_not_fatal() {
    let now = now_secs();
    let indexer = MockIndexer::new()
        .with_request(request("not-a-number", now - 60, addr(2), 1))
        .with_request(request("42", now - 60, addr(2), 2))
        .with_commits("42", vec![commit(addr(2), now - 30)]);

    let keeper = keeper_with(indexer);
    let report = keeper.run_cycle().await.unwrap();

    assert_eq!(report.open_rounds, 1);
    assert_eq!(report.dispatch.submitted, 1);
}
