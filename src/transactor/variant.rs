use alloy_primitives::Address;
use anyhow::Result;
use async_trait::async_trait;

use super::{MockTransactor, SidecarTransactor};
use crate::traits::ChainTransactor;
use crate::types::{ContractCall, TxHandle, TxOutcome};

/// Enum over all transactor backends.
pub enum TransactorVariant {
    Sidecar(SidecarTransactor),
    Mock(MockTransactor),
}

#[async_trait]
impl ChainTransactor for TransactorVariant {
    fn name(&self) -> &'static str {
        match self {
            TransactorVariant::Sidecar(inner) => inner.name(),
            TransactorVariant::Mock(inner) => inner.name(),
        }
    }

    async fn submit(&self, call: &ContractCall) -> Result<TxHandle> {
        match self {
            TransactorVariant::Sidecar(inner) => inner.submit(call).await,
            TransactorVariant::Mock(inner) => inner.submit(call).await,
        }
    }

    async fn await_confirmation(&self, handle: &TxHandle) -> Result<TxOutcome> {
        match self {
            TransactorVariant::Sidecar(inner) => inner.await_confirmation(handle).await,
            TransactorVariant::Mock(inner) => inner.await_confirmation(handle).await,
        }
    }

    async fn is_operator(&self, operator: Address) -> Result<bool> {
        match self {
            TransactorVariant::Sidecar(inner) => inner.is_operator(operator).await,
            TransactorVariant::Mock(inner) => inner.is_operator(operator).await,
        }
    }
}
