//! The reconciliation cycle and the polling loop around it.
//!
//! One cycle runs sequentially: snapshot, classify, evaluate disputes,
//! dispatch. Cycles never overlap for the same operator; a tick that
//! arrives while a cycle is in flight is skipped.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use tokio::sync::watch;
use tracing::{error, info, span, warn, Level};

use super::core::RoundKeeper;
use crate::classifier::{classify, verify_disjoint, ClassifierParams};
use crate::dispatcher::{DispatchSummary, Dispatcher};
use crate::dispute::{evaluate_leadership_disputes, evaluate_recover_disputes};
use crate::error::ReconcileError;
use crate::snapshot::build_snapshot;
use crate::traits::ChainTransactor;
use crate::types::{ContractCall, TxOutcome, UnixSecs};

/// Current unix time in seconds.
pub fn now_secs() -> UnixSecs {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before unix epoch")
        .as_secs()
}

/// What one reconciliation cycle saw and did.
#[derive(Debug, Clone, Copy, Default)]
pub struct CycleReport {
    /// Open rounds in the snapshot.
    pub open_rounds: usize,
    /// Rounds that landed in a bucket (including `complete`).
    pub classified_rounds: usize,
    /// Rounds finalized this cycle.
    pub completed_rounds: usize,
    pub dispatch: DispatchSummary,
}

impl RoundKeeper {
    /// Run one reconciliation cycle.
    ///
    /// Returns `ReconcileError::CycleBusy` if another cycle is in flight.
    /// A failure to list rounds or an invariant violation aborts the
    /// cycle; per-round failures are logged and retried next cycle.
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        let _permit = self
            .cycle_gate
            .try_acquire()
            .map_err(|_| ReconcileError::CycleBusy)?;

        let span = span!(Level::INFO, "reconcile_cycle");
        let _enter = span.enter();

        self.ensure_operator_registered().await?;

        let facts = build_snapshot(&self.indexer).await?;
        let now = now_secs();

        let params = ClassifierParams {
            operator: self.config.operator_address,
            commit_phase_secs: self.config.commit_phase_secs,
            dispute_phase_secs: self.config.dispute_phase_secs,
        };
        let results = classify(&facts, &params, now);
        verify_disjoint(&results)?;

        let recover_disputes = evaluate_recover_disputes(&results, &facts);
        let leadership_disputes = evaluate_leadership_disputes(
            &results,
            &facts,
            &self.elector,
            self.config.operator_address,
        );

        let dispatcher = Dispatcher::new(
            &self.transactor,
            &self.elector,
            &self.tracker,
            self.config.operator_address,
            Duration::from_millis(self.config.recover_pace_ms),
        );
        let dispatch = dispatcher
            .dispatch(&results, &recover_disputes, &leadership_disputes, now)
            .await;

        let report = CycleReport {
            open_rounds: facts.len(),
            classified_rounds: results.total_rounds(),
            completed_rounds: results.complete.len(),
            dispatch,
        };
        info!(
            open = report.open_rounds,
            classified = report.classified_rounds,
            completed = report.completed_rounds,
            submitted = report.dispatch.submitted,
            skipped = report.dispatch.skipped_settled,
            failed = report.dispatch.failed,
            "Cycle finished"
        );
        Ok(report)
    }

    /// Deposit as an operator when not yet registered. Nothing else can
    /// succeed unregistered, so a failure here aborts the cycle.
    async fn ensure_operator_registered(&self) -> Result<()> {
        let operator = self.config.operator_address;
        let registered = self
            .transactor
            .is_operator(operator)
            .await
            .context("operator registration check failed")?;
        if registered {
            return Ok(());
        }

        info!(%operator, "Not registered as operator, submitting deposit");
        let handle = self
            .transactor
            .submit(&ContractCall::OperatorDeposit)
            .await
            .context("operator deposit broadcast failed")?;
        match self
            .transactor
            .await_confirmation(&handle)
            .await
            .context("operator deposit confirmation failed")?
        {
            TxOutcome::Confirmed => {
                info!(hash = %handle.hash, "Operator deposit confirmed");
                Ok(())
            }
            TxOutcome::Reverted => Err(ReconcileError::Reverted(handle.hash).into()),
        }
    }

    /// Polling loop: run a cycle every `poll_interval_secs` until the
    /// shutdown signal flips. An in-flight cycle finishes before exit.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        info!(
            interval_secs = self.config.poll_interval_secs,
            "Starting reconciliation loop"
        );
        let mut ticker =
            tokio::time::interval(Duration::from_secs(self.config.poll_interval_secs));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.run_cycle().await {
                        Ok(_) => {}
                        Err(e) if e.downcast_ref::<ReconcileError>()
                            .is_some_and(|r| matches!(r, ReconcileError::CycleBusy)) => {
                            warn!("Previous cycle still in flight, skipping tick");
                        }
                        Err(e) => {
                            error!("Cycle failed: {e:#}");
                        }
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("Shutdown signal received, stopping reconciliation loop");
                        return Ok(());
                    }
                }
            }
        }
    }
}
