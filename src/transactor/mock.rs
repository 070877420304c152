use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use alloy_primitives::Address;
use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::traits::ChainTransactor;
use crate::types::{ContractCall, TxHandle, TxOutcome};

/// Mock transactor recording every submission, with scriptable outcomes.
pub struct MockTransactor {
    submitted: Mutex<Vec<ContractCall>>,
    reverting_methods: Mutex<HashSet<&'static str>>,
    failing_methods: Mutex<HashSet<&'static str>>,
    operator_registered: AtomicBool,
    next_hash: AtomicU64,
}

impl Default for MockTransactor {
    fn default() -> Self {
        Self {
            submitted: Mutex::new(Vec::new()),
            reverting_methods: Mutex::new(HashSet::new()),
            failing_methods: Mutex::new(HashSet::new()),
            operator_registered: AtomicBool::new(true),
            next_hash: AtomicU64::new(1),
        }
    }
}

impl MockTransactor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every submission of `method` will confirm but revert on-chain.
    pub fn revert_method(&self, method: &'static str) {
        self.reverting_methods.lock().unwrap().insert(method);
    }

    /// Every submission of `method` will fail at broadcast.
    pub fn fail_method(&self, method: &'static str) {
        self.failing_methods.lock().unwrap().insert(method);
    }

    pub fn set_operator_registered(&self, registered: bool) {
        self.operator_registered.store(registered, Ordering::SeqCst);
    }

    /// All calls submitted so far, in submission order.
    pub fn submitted(&self) -> Vec<ContractCall> {
        self.submitted.lock().unwrap().clone()
    }

    /// Submissions of one method, in submission order.
    pub fn submitted_for(&self, method: &str) -> Vec<ContractCall> {
        self.submitted()
            .into_iter()
            .filter(|c| c.method() == method)
            .collect()
    }
}

#[async_trait]
impl ChainTransactor for MockTransactor {
    fn name(&self) -> &'static str {
        "mock-transactor"
    }

    async fn submit(&self, call: &ContractCall) -> Result<TxHandle> {
        if self.failing_methods.lock().unwrap().contains(call.method()) {
            return Err(anyhow!("scripted broadcast failure for {}", call.method()));
        }

        self.submitted.lock().unwrap().push(call.clone());
        let n = self.next_hash.fetch_add(1, Ordering::SeqCst);

        let reverts = self.reverting_methods.lock().unwrap().contains(call.method());
        let prefix = if reverts { "reverted" } else { "confirmed" };
        Ok(TxHandle {
            hash: format!("0x{prefix}{n:08x}"),
        })
    }

    async fn await_confirmation(&self, handle: &TxHandle) -> Result<TxOutcome> {
        if handle.hash.starts_with("0xreverted") {
            Ok(TxOutcome::Reverted)
        } else {
            Ok(TxOutcome::Confirmed)
        }
    }

    async fn is_operator(&self, _operator: Address) -> Result<bool> {
        Ok(self.operator_registered.load(Ordering::SeqCst))
    }
}
