use std::time::Duration;

use alloy_primitives::{Address, U256};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::error::ReconcileError;
use crate::traits::EventIndexer;
use crate::types::{CommitRecord, FulfillmentAttempt, RecoverySubmission, RoundRequest, VrfProof};

const REQUESTED_ROUNDS_QUERY: &str = r#"
query {
  randomWordsRequesteds(orderBy: blockTimestamp, orderDirection: desc) {
    round
    blockTimestamp
    roundInfo { leader validCommitCount isFulfillExecuted }
  }
}"#;

const COMMITS_QUERY: &str = r#"
query ($round: String!) {
  commitCs(where: { round: $round }) {
    msgSender
    blockTimestamp
  }
}"#;

const RECOVERED_QUERY: &str = r#"
query ($round: String!) {
  recovereds(where: { round: $round }) {
    msgSender
    omega
    isRecovered
    blockTimestamp
    v
    x
    y
  }
}"#;

const FULFILLS_QUERY: &str = r#"
query ($round: String!) {
  fulfillRandomnesses(where: { round: $round }) {
    msgSender
    success
    blockTimestamp
  }
}"#;

/// Indexer backend speaking GraphQL over HTTP to a subgraph.
pub struct GraphQlIndexer {
    endpoint: String,
    client: reqwest::Client,
}

impl GraphQlIndexer {
    pub fn new(endpoint: String, request_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .context("failed to build indexer http client")?;
        Ok(Self { endpoint, client })
    }

    async fn run_query<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T> {
        #[derive(Deserialize)]
        struct Envelope<T> {
            data: Option<T>,
            errors: Option<Vec<GraphQlError>>,
        }

        #[derive(Deserialize)]
        struct GraphQlError {
            message: String,
        }

        let resp = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .context("indexer request failed")?
            .error_for_status()
            .context("indexer returned error status")?;

        let envelope: Envelope<T> = resp.json().await.context("malformed indexer response")?;

        if let Some(errors) = envelope.errors {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            return Err(anyhow!("graphql errors: {}", messages.join("; ")));
        }

        envelope
            .data
            .ok_or_else(|| anyhow!("graphql response missing data"))
    }
}

#[async_trait]
impl EventIndexer for GraphQlIndexer {
    fn name(&self) -> &'static str {
        "graphql"
    }

    async fn fetch_requested_rounds(&self) -> Result<Vec<RoundRequest>> {
        #[derive(Deserialize)]
        struct Data {
            #[serde(rename = "randomWordsRequesteds")]
            requested: Vec<WireRequest>,
        }

        let data: Data = self.run_query(REQUESTED_ROUNDS_QUERY, json!({})).await?;
        Ok(data
            .requested
            .into_iter()
            .filter_map(|w| match w.into_request() {
                Ok(req) => Some(req),
                Err(e) => {
                    warn!("Dropping malformed request event: {e}");
                    None
                }
            })
            .collect())
    }

    async fn fetch_commits(&self, round: &str) -> Result<Vec<CommitRecord>> {
        #[derive(Deserialize)]
        struct Data {
            #[serde(rename = "commitCs")]
            commits: Vec<WireCommit>,
        }

        let data: Data = self
            .run_query(COMMITS_QUERY, json!({ "round": round }))
            .await?;
        Ok(data
            .commits
            .into_iter()
            .filter_map(|w| match w.into_commit() {
                Ok(c) => Some(c),
                Err(e) => {
                    warn!(round, "Dropping malformed commit event: {e}");
                    None
                }
            })
            .collect())
    }

    async fn fetch_recovery_submissions(&self, round: &str) -> Result<Vec<RecoverySubmission>> {
        #[derive(Deserialize)]
        struct Data {
            #[serde(rename = "recovereds")]
            recovered: Vec<WireRecovered>,
        }

        let data: Data = self
            .run_query(RECOVERED_QUERY, json!({ "round": round }))
            .await?;
        Ok(data
            .recovered
            .into_iter()
            .filter_map(|w| match w.into_submission() {
                Ok(s) => Some(s),
                Err(e) => {
                    warn!(round, "Dropping malformed recovery event: {e}");
                    None
                }
            })
            .collect())
    }

    async fn fetch_fulfillment_attempts(&self, round: &str) -> Result<Vec<FulfillmentAttempt>> {
        #[derive(Deserialize)]
        struct Data {
            #[serde(rename = "fulfillRandomnesses")]
            fulfills: Vec<WireFulfill>,
        }

        let data: Data = self
            .run_query(FULFILLS_QUERY, json!({ "round": round }))
            .await?;
        Ok(data
            .fulfills
            .into_iter()
            .filter_map(|w| match w.into_attempt() {
                Ok(f) => Some(f),
                Err(e) => {
                    warn!(round, "Dropping malformed fulfillment event: {e}");
                    None
                }
            })
            .collect())
    }
}

// Subgraph entities carry numerics as strings; parse at the edge so the
// rest of the engine only ever sees typed values.

#[derive(Deserialize)]
struct WireRequest {
    round: String,
    #[serde(rename = "blockTimestamp")]
    block_timestamp: String,
    #[serde(rename = "roundInfo")]
    round_info: WireRoundInfo,
}

#[derive(Deserialize)]
struct WireRoundInfo {
    leader: String,
    #[serde(rename = "validCommitCount")]
    valid_commit_count: String,
    #[serde(rename = "isFulfillExecuted")]
    is_fulfill_executed: bool,
}

impl WireRequest {
    fn into_request(self) -> Result<RoundRequest, ReconcileError> {
        let valid_commit_count = self.round_info.valid_commit_count.parse().map_err(|_| {
            ReconcileError::Data(format!(
                "bad validCommitCount: {:?}",
                self.round_info.valid_commit_count
            ))
        })?;
        Ok(RoundRequest {
            block_timestamp: parse_secs(&self.block_timestamp)?,
            leader: parse_address(&self.round_info.leader)?,
            valid_commit_count,
            is_fulfill_executed: self.round_info.is_fulfill_executed,
            round: self.round,
        })
    }
}

#[derive(Deserialize)]
struct WireCommit {
    #[serde(rename = "msgSender")]
    msg_sender: String,
    #[serde(rename = "blockTimestamp")]
    block_timestamp: String,
}

impl WireCommit {
    fn into_commit(self) -> Result<CommitRecord, ReconcileError> {
        Ok(CommitRecord {
            committer: parse_address(&self.msg_sender)?,
            block_timestamp: parse_secs(&self.block_timestamp)?,
        })
    }
}

#[derive(Deserialize)]
struct WireRecovered {
    #[serde(rename = "msgSender")]
    msg_sender: String,
    omega: String,
    #[serde(rename = "isRecovered")]
    is_recovered: bool,
    #[serde(rename = "blockTimestamp")]
    block_timestamp: String,
    #[serde(default)]
    v: Vec<String>,
    #[serde(default)]
    x: String,
    #[serde(default)]
    y: String,
}

impl WireRecovered {
    fn into_submission(self) -> Result<RecoverySubmission, ReconcileError> {
        let v = self
            .v
            .iter()
            .map(|s| parse_u256(s))
            .collect::<Result<Vec<U256>, ReconcileError>>()?;
        Ok(RecoverySubmission {
            submitter: parse_address(&self.msg_sender)?,
            omega: parse_u256(&self.omega)?,
            is_recovered: self.is_recovered,
            block_timestamp: parse_secs(&self.block_timestamp)?,
            proof: VrfProof {
                v,
                x: parse_proof_component(&self.x)?,
                y: parse_proof_component(&self.y)?,
            },
        })
    }
}

#[derive(Deserialize)]
struct WireFulfill {
    #[serde(rename = "msgSender")]
    msg_sender: String,
    success: bool,
    #[serde(rename = "blockTimestamp")]
    block_timestamp: String,
}

impl WireFulfill {
    fn into_attempt(self) -> Result<FulfillmentAttempt, ReconcileError> {
        Ok(FulfillmentAttempt {
            submitter: parse_address(&self.msg_sender)?,
            success: self.success,
            block_timestamp: parse_secs(&self.block_timestamp)?,
        })
    }
}

fn parse_secs(raw: &str) -> Result<u64, ReconcileError> {
    raw.parse::<u64>()
        .map_err(|_| ReconcileError::Data(format!("bad block timestamp: {raw:?}")))
}

fn parse_address(raw: &str) -> Result<Address, ReconcileError> {
    raw.parse::<Address>()
        .map_err(|_| ReconcileError::Data(format!("bad address: {raw:?}")))
}

/// Accepts both 0x-hex and decimal encodings, which subgraphs mix freely.
fn parse_u256(raw: &str) -> Result<U256, ReconcileError> {
    let parsed = if let Some(hex) = raw.strip_prefix("0x") {
        U256::from_str_radix(hex, 16)
    } else {
        U256::from_str_radix(raw, 10)
    };
    parsed.map_err(|_| ReconcileError::Data(format!("bad uint256: {raw:?}")))
}

/// Zero stands in only for a genuinely absent proof component. A malformed
/// non-empty value rejects the whole event; a recover or dispute call must
/// never carry a zeroed-out parameter in place of a bad one.
fn parse_proof_component(raw: &str) -> Result<U256, ReconcileError> {
    if raw.is_empty() {
        Ok(U256::ZERO)
    } else {
        parse_u256(raw)
    }
}
