use thiserror::Error;

/// Error taxonomy for one reconciliation cycle.
///
/// Per-round failures (`Transient`, `Data`, `Reverted`) are logged and the
/// round is retried on the next cycle. `Invariant` signals classifier
/// divergence and is surfaced to the caller instead of being swallowed.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("transient i/o failure: {0}")]
    Transient(String),

    #[error("malformed round data: {0}")]
    Data(String),

    #[error("transaction {0} reverted on-chain")]
    Reverted(String),

    #[error("classification invariant violated: {0}")]
    Invariant(String),

    #[error("a reconciliation cycle is already in flight")]
    CycleBusy,
}
