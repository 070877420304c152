use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Unix timestamp in seconds, the only time representation used internally.
pub type UnixSecs = u64;

/// One `RandomWordsRequested` event as observed by the indexer.
///
/// The round number travels as a decimal string on the wire; it is parsed
/// once, during snapshot construction, and unparseable rounds are skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundRequest {
    pub round: String,
    pub block_timestamp: UnixSecs,
    /// Leader-of-record at the time of the event.
    pub leader: Address,
    pub valid_commit_count: u64,
    pub is_fulfill_executed: bool,
}

/// One commit event for a round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitRecord {
    pub committer: Address,
    pub block_timestamp: UnixSecs,
}

/// VRF proof parameters carried opaquely for recover/dispute calls.
///
/// The agent never verifies these; it only forwards them to the contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VrfProof {
    pub v: Vec<U256>,
    pub x: U256,
    pub y: U256,
}

/// One recovery submission observed for a round. A round may have many;
/// the canonical one is selected by max block timestamp (see snapshot).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoverySubmission {
    pub submitter: Address,
    /// The revealed random value claimed by the submitter.
    pub omega: U256,
    pub is_recovered: bool,
    pub block_timestamp: UnixSecs,
    pub proof: VrfProof,
}

/// One fulfillment transaction observed for a round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FulfillmentAttempt {
    pub submitter: Address,
    pub success: bool,
    pub block_timestamp: UnixSecs,
}

/// Snapshot of a finalized round emitted alongside the `complete` bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryResult {
    pub round: u64,
    pub request_block_time: UnixSecs,
    pub commit_phase_end_time: UnixSecs,
    pub recover_phase_end_time: UnixSecs,
    pub is_recovered: bool,
    pub is_fulfill_executed: bool,
    /// Revealed value from the canonical recovery submission.
    pub omega_recov: U256,
    pub proof: VrfProof,
}

/// Per-cycle classification output. Every open round lands in exactly one
/// actionable bucket, or in `complete` which short-circuits the rest.
#[derive(Debug, Clone, Default)]
pub struct RoundResults {
    pub recoverable: Vec<u64>,
    pub committable: Vec<u64>,
    pub mine_to_lead: Vec<u64>,
    pub re_requestable: Vec<u64>,
    pub fulfillable: Vec<u64>,
    pub recover_disputeable: Vec<u64>,
    pub leadership_disputeable: Vec<u64>,
    pub complete: Vec<u64>,
    pub recovery_data: Vec<RecoveryResult>,
}

impl RoundResults {
    /// Recovery snapshot for a given round, if the round finalized.
    pub fn recovery_for(&self, round: u64) -> Option<&RecoveryResult> {
        self.recovery_data.iter().find(|r| r.round == round)
    }

    /// Total rounds across actionable buckets plus `complete`.
    pub fn total_rounds(&self) -> usize {
        self.recoverable.len()
            + self.committable.len()
            + self.mine_to_lead.len()
            + self.re_requestable.len()
            + self.fulfillable.len()
            + self.recover_disputeable.len()
            + self.leadership_disputeable.len()
            + self.complete.len()
    }
}

/// Terminal action recorded for a round once a transaction confirms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    Committed,
    Recovered,
    Fulfilled,
    ReRequested,
    RecoverDisputed,
    LeadershipDisputed,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Committed => "committed",
            ActionKind::Recovered => "recovered",
            ActionKind::Fulfilled => "fulfilled",
            ActionKind::ReRequested => "re-requested",
            ActionKind::RecoverDisputed => "recover-disputed",
            ActionKind::LeadershipDisputed => "leadership-disputed",
        }
    }
}

/// A contract invocation handed to the chain transactor. Encoding, nonce
/// management, gas pricing and signing happen behind the transactor seam.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractCall {
    Commit { round: U256 },
    Recover { round: U256, y: U256 },
    FulfillRandomness { round: U256 },
    ReRequestRandomWord { round: U256 },
    DisputeRecover { round: U256, v: Vec<U256>, x: U256, y: U256 },
    DisputeLeadership { round: U256 },
    OperatorDeposit,
}

impl ContractCall {
    /// On-chain method name for this call.
    pub fn method(&self) -> &'static str {
        match self {
            ContractCall::Commit { .. } => "commit",
            ContractCall::Recover { .. } => "recover",
            ContractCall::FulfillRandomness { .. } => "fulfillRandomness",
            ContractCall::ReRequestRandomWord { .. } => "reRequestRandomWordAtRound",
            ContractCall::DisputeRecover { .. } => "disputeRecover",
            ContractCall::DisputeLeadership { .. } => "disputeLeadershipAtRound",
            ContractCall::OperatorDeposit => "operatorDeposit",
        }
    }
}

/// Opaque handle for a broadcast transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxHandle {
    pub hash: String,
}

/// Outcome of waiting for a transaction receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxOutcome {
    Confirmed,
    Reverted,
}
