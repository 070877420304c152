use std::time::Duration;

use alloy_primitives::Address;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::traits::ChainTransactor;
use crate::types::{ContractCall, TxHandle, TxOutcome};

const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Upper bound on waiting for a receipt; a transaction still pending after
/// this is treated as a transient failure and retried next cycle.
const RECEIPT_DEADLINE: Duration = Duration::from_secs(300);

/// Transactor backed by a signing sidecar over HTTP.
///
/// The sidecar owns the operator key and everything that goes with it:
/// ABI encoding, nonce assignment, gas pricing, signing, broadcast and
/// receipt tracking. This client only names the call and its arguments.
pub struct SidecarTransactor {
    base_url: String,
    client: reqwest::Client,
}

impl SidecarTransactor {
    pub fn new(base_url: String, request_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .context("failed to build transactor http client")?;
        Ok(Self { base_url, client })
    }
}

#[async_trait]
impl ChainTransactor for SidecarTransactor {
    fn name(&self) -> &'static str {
        "sidecar"
    }

    async fn submit(&self, call: &ContractCall) -> Result<TxHandle> {
        #[derive(Deserialize)]
        struct SubmitResponse {
            hash: String,
        }

        let url = format!("{}/transactions", self.base_url);
        let resp: SubmitResponse = self
            .client
            .post(&url)
            .json(&json!({ "method": call.method(), "call": call }))
            .send()
            .await
            .context("transactor submit failed")?
            .error_for_status()
            .context("transactor rejected submission")?
            .json()
            .await
            .context("malformed transactor response")?;

        info!(method = call.method(), hash = %resp.hash, "Transaction broadcast");
        Ok(TxHandle { hash: resp.hash })
    }

    async fn await_confirmation(&self, handle: &TxHandle) -> Result<TxOutcome> {
        #[derive(Deserialize)]
        struct ReceiptResponse {
            status: String,
        }

        let url = format!("{}/transactions/{}", self.base_url, handle.hash);
        let deadline = tokio::time::Instant::now() + RECEIPT_DEADLINE;
        loop {
            if tokio::time::Instant::now() >= deadline {
                return Err(anyhow!("transaction {} still pending at deadline", handle.hash));
            }
            let resp: ReceiptResponse = self
                .client
                .get(&url)
                .send()
                .await
                .context("receipt lookup failed")?
                .error_for_status()
                .context("receipt lookup rejected")?
                .json()
                .await
                .context("malformed receipt response")?;

            match resp.status.as_str() {
                "confirmed" => return Ok(TxOutcome::Confirmed),
                "reverted" => return Ok(TxOutcome::Reverted),
                "pending" => {
                    debug!(hash = %handle.hash, "Transaction still pending");
                    tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
                }
                other => return Err(anyhow!("unknown receipt status: {other}")),
            }
        }
    }

    async fn is_operator(&self, operator: Address) -> Result<bool> {
        #[derive(Deserialize)]
        struct CallResponse {
            result: bool,
        }

        let url = format!("{}/calls/isOperator", self.base_url);
        let resp: CallResponse = self
            .client
            .post(&url)
            .json(&json!({ "address": operator }))
            .send()
            .await
            .context("isOperator call failed")?
            .error_for_status()
            .context("isOperator call rejected")?
            .json()
            .await
            .context("malformed isOperator response")?;

        Ok(resp.result)
    }
}
