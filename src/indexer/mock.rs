use std::collections::HashMap;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::traits::EventIndexer;
use crate::types::{CommitRecord, FulfillmentAttempt, RecoverySubmission, RoundRequest};

/// Mock indexer backed by in-memory fixtures, for tests.
#[derive(Default)]
pub struct MockIndexer {
    pub requests: Vec<RoundRequest>,
    pub commits: HashMap<String, Vec<CommitRecord>>,
    pub recoveries: HashMap<String, Vec<RecoverySubmission>>,
    pub fulfillments: HashMap<String, Vec<FulfillmentAttempt>>,
    /// When set, the round listing fails, simulating an unreachable indexer.
    pub fail_round_listing: bool,
}

impl MockIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_request(mut self, request: RoundRequest) -> Self {
        self.requests.push(request);
        self
    }

    pub fn with_commits(mut self, round: &str, commits: Vec<CommitRecord>) -> Self {
        self.commits.insert(round.to_string(), commits);
        self
    }

    pub fn with_recoveries(mut self, round: &str, recoveries: Vec<RecoverySubmission>) -> Self {
        self.recoveries.insert(round.to_string(), recoveries);
        self
    }

    pub fn with_fulfillments(mut self, round: &str, attempts: Vec<FulfillmentAttempt>) -> Self {
        self.fulfillments.insert(round.to_string(), attempts);
        self
    }
}

#[async_trait]
impl EventIndexer for MockIndexer {
    fn name(&self) -> &'static str {
        "mock-indexer"
    }

    async fn fetch_requested_rounds(&self) -> Result<Vec<RoundRequest>> {
        if self.fail_round_listing {
            return Err(anyhow!("indexer unreachable"));
        }
        Ok(self.requests.clone())
    }

    async fn fetch_commits(&self, round: &str) -> Result<Vec<CommitRecord>> {
        Ok(self.commits.get(round).cloned().unwrap_or_default())
    }

    async fn fetch_recovery_submissions(&self, round: &str) -> Result<Vec<RecoverySubmission>> {
        Ok(self.recoveries.get(round).cloned().unwrap_or_default())
    }

    async fn fetch_fulfillment_attempts(&self, round: &str) -> Result<Vec<FulfillmentAttempt>> {
        Ok(self.fulfillments.get(round).cloned().unwrap_or_default())
    }
}
