use alloy_primitives::Address;
use anyhow::Result;
use async_trait::async_trait;

use crate::types::{ContractCall, TxHandle, TxOutcome};

/// Where corrective transactions are encoded, signed and broadcast.
///
/// Nonce assignment, gas pricing and revert detection live behind this
/// seam; the engine only cares about confirmed/reverted/error.
#[async_trait]
pub trait ChainTransactor: Send + Sync {
    /// Backend name for logging and metrics.
    fn name(&self) -> &'static str;

    /// Broadcast a contract call, returning a handle to await on.
    async fn submit(&self, call: &ContractCall) -> Result<TxHandle>;

    /// Wait for the receipt of a previously submitted transaction.
    async fn await_confirmation(&self, handle: &TxHandle) -> Result<TxOutcome>;

    /// Whether the given address is registered as an operator on-chain.
    async fn is_operator(&self, operator: Address) -> Result<bool>;
}
