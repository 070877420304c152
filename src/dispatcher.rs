//! Action dispatcher: turns classified rounds into at most one confirmed
//! transaction per (round, action-kind).
//!
//! Bucket order is fixed: recoverable, committable, fulfillable,
//! re-requestable, recover disputes, leadership disputes. Within a bucket
//! rounds arrive ascending from the classifier and are dispatched in that
//! order.

use std::collections::HashSet;
use std::time::Duration;

use alloy_primitives::{Address, U256};
use tracing::{debug, info, warn};

use crate::dispute::RecoverDispute;
use crate::tracker::RoundStateTracker;
use crate::traits::{ChainTransactor, LeaderElector};
use crate::types::{ActionKind, ContractCall, RoundResults, TxOutcome, UnixSecs};

/// Counters for one dispatch pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Transactions confirmed and recorded this pass.
    pub submitted: u32,
    /// Rounds skipped because the tracker already held the action.
    pub skipped_settled: u32,
    /// Broadcast failures, reverts and transient errors; retried next cycle.
    pub failed: u32,
}

enum DispatchOutcome {
    Submitted,
    Skipped,
    Failed,
}

pub struct Dispatcher<'a, T: ChainTransactor + ?Sized, E: LeaderElector + ?Sized> {
    transactor: &'a T,
    elector: &'a E,
    tracker: &'a RoundStateTracker,
    operator: Address,
    recover_pace: Duration,
}

impl<'a, T: ChainTransactor + ?Sized, E: LeaderElector + ?Sized> Dispatcher<'a, T, E> {
    pub fn new(
        transactor: &'a T,
        elector: &'a E,
        tracker: &'a RoundStateTracker,
        operator: Address,
        recover_pace: Duration,
    ) -> Self {
        Self {
            transactor,
            elector,
            tracker,
            operator,
            recover_pace,
        }
    }

    /// Run one full dispatch pass over the classified rounds.
    pub async fn dispatch(
        &self,
        results: &RoundResults,
        recover_disputes: &[RecoverDispute],
        leadership_disputes: &[u64],
        now: UnixSecs,
    ) -> DispatchSummary {
        let mut summary = DispatchSummary::default();
        // Per-cycle dedup, independent of the cross-cycle tracker.
        let mut processed: HashSet<(u64, ActionKind)> = HashSet::new();

        self.dispatch_recoverable(results, now, &mut processed, &mut summary)
            .await;

        for &round in &results.committable {
            let call = ContractCall::Commit {
                round: U256::from(round),
            };
            self.dispatch_one(round, ActionKind::Committed, call, now, &mut processed, &mut summary)
                .await;
        }

        for &round in &results.fulfillable {
            let call = ContractCall::FulfillRandomness {
                round: U256::from(round),
            };
            self.dispatch_one(round, ActionKind::Fulfilled, call, now, &mut processed, &mut summary)
                .await;
        }

        for &round in &results.re_requestable {
            let call = ContractCall::ReRequestRandomWord {
                round: U256::from(round),
            };
            self.dispatch_one(round, ActionKind::ReRequested, call, now, &mut processed, &mut summary)
                .await;
        }

        for dispute in recover_disputes {
            let call = ContractCall::DisputeRecover {
                round: U256::from(dispute.round),
                v: dispute.proof.v.clone(),
                x: dispute.proof.x,
                y: dispute.proof.y,
            };
            self.dispatch_one(
                dispute.round,
                ActionKind::RecoverDisputed,
                call,
                now,
                &mut processed,
                &mut summary,
            )
            .await;
        }

        for &round in leadership_disputes {
            let call = ContractCall::DisputeLeadership {
                round: U256::from(round),
            };
            self.dispatch_one(
                round,
                ActionKind::LeadershipDisputed,
                call,
                now,
                &mut processed,
                &mut summary,
            )
            .await;
        }

        summary
    }

    /// Recovery submissions: only the recomputed leader submits, and
    /// consecutive submissions are paced to keep at most one in-flight
    /// transaction per operator key.
    async fn dispatch_recoverable(
        &self,
        results: &RoundResults,
        now: UnixSecs,
        processed: &mut HashSet<(u64, ActionKind)>,
        summary: &mut DispatchSummary,
    ) {
        let mut first = true;
        for &round in &results.recoverable {
            let Some(recovery) = results.recovery_for(round) else {
                warn!(round, "Recoverable round has no recovery data");
                continue;
            };

            let leader = self.elector.elect_leader(round, recovery.omega_recov);
            if leader != self.operator {
                debug!(round, %leader, "Not the leader for this recovery, skipping");
                continue;
            }

            if !first {
                tokio::time::sleep(self.recover_pace).await;
            }
            first = false;

            let call = ContractCall::Recover {
                round: U256::from(round),
                y: recovery.proof.y,
            };
            self.dispatch_one(round, ActionKind::Recovered, call, now, processed, summary)
                .await;
        }
    }

    async fn dispatch_one(
        &self,
        round: u64,
        kind: ActionKind,
        call: ContractCall,
        now: UnixSecs,
        processed: &mut HashSet<(u64, ActionKind)>,
        summary: &mut DispatchSummary,
    ) {
        if !processed.insert((round, kind)) {
            debug!(round, action = kind.as_str(), "Already handled this cycle");
            return;
        }

        match self.try_dispatch(round, kind, &call, now).await {
            DispatchOutcome::Submitted => summary.submitted += 1,
            DispatchOutcome::Skipped => summary.skipped_settled += 1,
            DispatchOutcome::Failed => summary.failed += 1,
        }
    }

    async fn try_dispatch(
        &self,
        round: u64,
        kind: ActionKind,
        call: &ContractCall,
        now: UnixSecs,
    ) -> DispatchOutcome {
        if self.tracker.is_settled(round, kind) {
            debug!(round, action = kind.as_str(), "Settled in a previous cycle, skipping");
            return DispatchOutcome::Skipped;
        }

        let handle = match self.transactor.submit(call).await {
            Ok(handle) => handle,
            Err(e) => {
                warn!(round, method = call.method(), "Broadcast failed: {e:#}");
                return DispatchOutcome::Failed;
            }
        };

        match self.transactor.await_confirmation(&handle).await {
            Ok(TxOutcome::Confirmed) => {
                self.tracker.record(round, kind, handle.hash.clone(), now);
                info!(round, action = kind.as_str(), hash = %handle.hash, "Action settled");
                DispatchOutcome::Submitted
            }
            Ok(TxOutcome::Reverted) => {
                warn!(round, method = call.method(), hash = %handle.hash, "Transaction reverted");
                DispatchOutcome::Failed
            }
            Err(e) => {
                warn!(round, method = call.method(), "Receipt wait failed: {e:#}");
                DispatchOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elector::MockElector;
    use crate::transactor::MockTransactor;
    use crate::types::{RecoveryResult, VrfProof};

    fn addr(n: u8) -> Address {
        Address::repeat_byte(n)
    }

    fn recovery_result(round: u64, omega: u64, y: u64) -> RecoveryResult {
        RecoveryResult {
            round,
            request_block_time: 0,
            commit_phase_end_time: 0,
            recover_phase_end_time: 0,
            is_recovered: true,
            is_fulfill_executed: false,
            omega_recov: U256::from(omega),
            proof: VrfProof {
                v: Vec::new(),
                x: U256::ZERO,
                y: U256::from(y),
            },
        }
    }

    fn full_results(operator_leads: u64) -> (RoundResults, Vec<RecoverDispute>, Vec<u64>) {
        let mut results = RoundResults::default();
        results.recoverable.push(operator_leads);
        results.recovery_data.push(recovery_result(operator_leads, 7, 99));
        results.committable.push(2);
        results.fulfillable.push(3);
        results.re_requestable.push(4);
        let recover_disputes = vec![RecoverDispute {
            round: 5,
            proof: VrfProof::default(),
        }];
        let leadership_disputes = vec![6];
        (results, recover_disputes, leadership_disputes)
    }

    #[tokio::test]
    async fn buckets_dispatch_in_fixed_order() {
        let operator = addr(1);
        let transactor = MockTransactor::new();
        let elector = MockElector::new(operator);
        let tracker = RoundStateTracker::new();
        let dispatcher =
            Dispatcher::new(&transactor, &elector, &tracker, operator, Duration::ZERO);

        let (results, recover_disputes, leadership_disputes) = full_results(1);
        let summary = dispatcher
            .dispatch(&results, &recover_disputes, &leadership_disputes, 100)
            .await;

        assert_eq!(summary.submitted, 6);
        let methods: Vec<&str> = transactor.submitted().iter().map(|c| c.method()).collect();
        assert_eq!(
            methods,
            vec![
                "recover",
                "commit",
                "fulfillRandomness",
                "reRequestRandomWordAtRound",
                "disputeRecover",
                "disputeLeadershipAtRound",
            ]
        );
    }

    #[tokio::test]
    async fn second_pass_over_unchanged_snapshot_submits_nothing() {
        let operator = addr(1);
        let transactor = MockTransactor::new();
        let elector = MockElector::new(operator);
        let tracker = RoundStateTracker::new();
        let dispatcher =
            Dispatcher::new(&transactor, &elector, &tracker, operator, Duration::ZERO);

        let (results, recover_disputes, leadership_disputes) = full_results(1);
        let first = dispatcher
            .dispatch(&results, &recover_disputes, &leadership_disputes, 100)
            .await;
        let second = dispatcher
            .dispatch(&results, &recover_disputes, &leadership_disputes, 200)
            .await;

        assert_eq!(first.submitted, 6);
        assert_eq!(second.submitted, 0);
        assert_eq!(second.skipped_settled, 6);
        assert_eq!(transactor.submitted().len(), 6);
    }

    #[tokio::test]
    async fn duplicate_rounds_in_a_bucket_dispatch_once() {
        let operator = addr(1);
        let transactor = MockTransactor::new();
        let elector = MockElector::new(operator);
        let tracker = RoundStateTracker::new();
        let dispatcher =
            Dispatcher::new(&transactor, &elector, &tracker, operator, Duration::ZERO);

        let mut results = RoundResults::default();
        results.committable = vec![8, 8, 8];
        let summary = dispatcher.dispatch(&results, &[], &[], 100).await;

        assert_eq!(summary.submitted, 1);
        assert_eq!(transactor.submitted_for("commit").len(), 1);
    }

    #[tokio::test]
    async fn revert_leaves_round_eligible_for_retry() {
        let operator = addr(1);
        let transactor = MockTransactor::new();
        transactor.revert_method("commit");
        let elector = MockElector::new(operator);
        let tracker = RoundStateTracker::new();
        let dispatcher =
            Dispatcher::new(&transactor, &elector, &tracker, operator, Duration::ZERO);

        let mut results = RoundResults::default();
        results.committable = vec![9];
        let summary = dispatcher.dispatch(&results, &[], &[], 100).await;

        assert_eq!(summary.failed, 1);
        assert!(!tracker.is_settled(9, ActionKind::Committed));

        // Next cycle the round is retried because nothing was recorded.
        let summary = dispatcher.dispatch(&results, &[], &[], 200).await;
        assert_eq!(summary.failed, 1);
        assert_eq!(transactor.submitted_for("commit").len(), 2);
    }

    #[tokio::test]
    async fn broadcast_failure_does_not_settle() {
        let operator = addr(1);
        let transactor = MockTransactor::new();
        transactor.fail_method("fulfillRandomness");
        let elector = MockElector::new(operator);
        let tracker = RoundStateTracker::new();
        let dispatcher =
            Dispatcher::new(&transactor, &elector, &tracker, operator, Duration::ZERO);

        let mut results = RoundResults::default();
        results.fulfillable = vec![12];
        let summary = dispatcher.dispatch(&results, &[], &[], 100).await;

        assert_eq!(summary.failed, 1);
        assert!(!tracker.is_settled(12, ActionKind::Fulfilled));
        assert!(transactor.submitted().is_empty());
    }

    #[tokio::test]
    async fn recovery_is_skipped_when_operator_is_not_leader() {
        let operator = addr(1);
        let transactor = MockTransactor::new();
        // Someone else is elected for every round.
        let elector = MockElector::new(addr(2));
        let tracker = RoundStateTracker::new();
        let dispatcher =
            Dispatcher::new(&transactor, &elector, &tracker, operator, Duration::ZERO);

        let mut results = RoundResults::default();
        results.recoverable = vec![1];
        results.recovery_data.push(recovery_result(1, 7, 99));
        let summary = dispatcher.dispatch(&results, &[], &[], 100).await;

        assert_eq!(summary.submitted, 0);
        assert!(transactor.submitted().is_empty());
    }

    #[tokio::test]
    async fn recovery_forwards_the_canonical_proof_value() {
        let operator = addr(1);
        let transactor = MockTransactor::new();
        let elector = MockElector::new(operator);
        let tracker = RoundStateTracker::new();
        let dispatcher =
            Dispatcher::new(&transactor, &elector, &tracker, operator, Duration::ZERO);

        let mut results = RoundResults::default();
        results.recoverable = vec![1];
        results.recovery_data.push(recovery_result(1, 7, 99));
        dispatcher.dispatch(&results, &[], &[], 100).await;

        let submitted = transactor.submitted();
        assert_eq!(
            submitted[0],
            ContractCall::Recover {
                round: U256::from(1u64),
                y: U256::from(99u64),
            }
        );
    }
}
