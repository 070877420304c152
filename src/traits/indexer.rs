use anyhow::Result;
use async_trait::async_trait;

use crate::types::{CommitRecord, FulfillmentAttempt, RecoverySubmission, RoundRequest};

/// Read API over historical contract events (e.g. a subgraph).
///
/// Implementations may return duplicated or out-of-order records; the
/// snapshot store owns deduplication and canonical-record selection.
#[async_trait]
pub trait EventIndexer: Send + Sync {
    /// Human-readable backend name for logging.
    fn name(&self) -> &'static str;

    /// All observed request events, across rounds, newest last or not.
    async fn fetch_requested_rounds(&self) -> Result<Vec<RoundRequest>>;

    /// Commit events for one round.
    async fn fetch_commits(&self, round: &str) -> Result<Vec<CommitRecord>>;

    /// Recovery submissions for one round.
    async fn fetch_recovery_submissions(&self, round: &str) -> Result<Vec<RecoverySubmission>>;

    /// Fulfillment attempts for one round.
    async fn fetch_fulfillment_attempts(&self, round: &str) -> Result<Vec<FulfillmentAttempt>>;
}
