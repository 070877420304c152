//! Core RoundKeeper struct and initialization - no business logic.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::Semaphore;
use tracing::info;

use crate::config::BaseConfig;
use crate::elector::{ElectorVariant, ModuloElector};
use crate::indexer::{GraphQlIndexer, IndexerVariant};
use crate::tracker::RoundStateTracker;
use crate::transactor::{SidecarTransactor, TransactorVariant};

/// The reconciliation engine: observes indexed event history and drives
/// the corrective actions this operator owes at the current time.
pub struct RoundKeeper {
    /// Event history read API.
    pub indexer: IndexerVariant,

    /// Outbound transaction path.
    pub transactor: TransactorVariant,

    /// Deterministic leader election.
    pub elector: ElectorVariant,

    /// Cross-cycle memory of settled terminal actions.
    pub tracker: Arc<RoundStateTracker>,

    /// Global/base configuration.
    pub config: BaseConfig,

    /// Single-flight guard: at most one cycle in flight per operator.
    pub cycle_gate: Arc<Semaphore>,
}

impl RoundKeeper {
    /// Create a new RoundKeeper from explicit collaborators.
    pub fn new(
        indexer: IndexerVariant,
        transactor: TransactorVariant,
        elector: ElectorVariant,
        config: BaseConfig,
    ) -> Self {
        Self {
            indexer,
            transactor,
            elector,
            tracker: Arc::new(RoundStateTracker::new()),
            config,
            cycle_gate: Arc::new(Semaphore::new(1)),
        }
    }

    /// Initialize with the production backends named in the configuration.
    pub fn initialize(config: BaseConfig) -> Result<Self> {
        let request_timeout = Duration::from_secs(config.request_timeout_secs);

        let indexer = IndexerVariant::GraphQl(GraphQlIndexer::new(
            config.indexer_url.clone(),
            request_timeout,
        )?);
        let transactor = TransactorVariant::Sidecar(SidecarTransactor::new(
            config.transactor_url.clone(),
            request_timeout,
        )?);
        let elector = ElectorVariant::Modulo(ModuloElector::new(config.operators.clone()));

        info!(
            operator = %config.operator_address,
            indexer = %config.indexer_url,
            "RoundKeeper initialized"
        );
        Ok(Self::new(indexer, transactor, elector, config))
    }
}
