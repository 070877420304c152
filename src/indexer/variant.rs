use anyhow::Result;
use async_trait::async_trait;

use super::{GraphQlIndexer, MockIndexer};
use crate::traits::EventIndexer;
use crate::types::{CommitRecord, FulfillmentAttempt, RecoverySubmission, RoundRequest};

/// Enum over all indexer backends.
pub enum IndexerVariant {
    GraphQl(GraphQlIndexer),
    Mock(MockIndexer),
}

#[async_trait]
impl EventIndexer for IndexerVariant {
    fn name(&self) -> &'static str {
        match self {
            IndexerVariant::GraphQl(inner) => inner.name(),
            IndexerVariant::Mock(inner) => inner.name(),
        }
    }

    async fn fetch_requested_rounds(&self) -> Result<Vec<RoundRequest>> {
        match self {
            IndexerVariant::GraphQl(inner) => inner.fetch_requested_rounds().await,
            IndexerVariant::Mock(inner) => inner.fetch_requested_rounds().await,
        }
    }

    async fn fetch_commits(&self, round: &str) -> Result<Vec<CommitRecord>> {
        match self {
            IndexerVariant::GraphQl(inner) => inner.fetch_commits(round).await,
            IndexerVariant::Mock(inner) => inner.fetch_commits(round).await,
        }
    }

    async fn fetch_recovery_submissions(&self, round: &str) -> Result<Vec<RecoverySubmission>> {
        match self {
            IndexerVariant::GraphQl(inner) => inner.fetch_recovery_submissions(round).await,
            IndexerVariant::Mock(inner) => inner.fetch_recovery_submissions(round).await,
        }
    }

    async fn fetch_fulfillment_attempts(&self, round: &str) -> Result<Vec<FulfillmentAttempt>> {
        match self {
            IndexerVariant::GraphQl(inner) => inner.fetch_fulfillment_attempts(round).await,
            IndexerVariant::Mock(inner) => inner.fetch_fulfillment_attempts(round).await,
        }
    }
}
