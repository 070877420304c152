// Library exports for testing and external use

pub mod classifier;
pub mod config;
pub mod dispatcher;
pub mod dispute;
pub mod elector;
pub mod error;
pub mod indexer;
pub mod roundkeeper;
pub mod snapshot;
pub mod telemetry;
pub mod tracker;
pub mod traits;
pub mod transactor;
pub mod types;

// Re-export commonly used types and traits
pub use config::BaseConfig;
pub use error::ReconcileError;
pub use roundkeeper::{now_secs, CycleReport, RoundKeeper};
pub use tracker::RoundStateTracker;
pub use traits::{ChainTransactor, EventIndexer, LeaderElector};
pub use types::{
    ActionKind, CommitRecord, ContractCall, FulfillmentAttempt, RecoveryResult,
    RecoverySubmission, RoundRequest, RoundResults, TxHandle, TxOutcome, VrfProof,
};

// Re-export variant enums for convenience
pub use elector::{ElectorVariant, MockElector};
pub use indexer::{IndexerVariant, MockIndexer};
pub use transactor::{MockTransactor, TransactorVariant};
