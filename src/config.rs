use alloy_primitives::Address;
use clap::Parser;
use serde::{Deserialize, Serialize};

/// Base configuration for the agent, parseable from CLI arguments.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "roundkeeper", about = "Operator agent for a commit-reveal randomness protocol")]
pub struct BaseConfig {
    /// GraphQL endpoint of the event indexer.
    #[arg(long, default_value = "http://localhost:8000/subgraphs/drb")]
    pub indexer_url: String,

    /// HTTP endpoint of the signing/transaction sidecar.
    #[arg(long, default_value = "http://localhost:9545")]
    pub transactor_url: String,

    /// Address this operator signs with.
    #[arg(long)]
    pub operator_address: Address,

    /// Known operator set, used by the modulo leader elector.
    #[arg(long, value_delimiter = ',')]
    pub operators: Vec<Address>,

    /// Commit phase duration in seconds (added to the earliest commit
    /// timestamp to derive the commit phase end).
    #[arg(long, default_value_t = 120)]
    pub commit_phase_secs: u64,

    /// Dispute window in seconds (added to the canonical recovery
    /// timestamp to derive the recover phase end).
    #[arg(long, default_value_t = 180)]
    pub dispute_phase_secs: u64,

    /// Interval between reconciliation cycles.
    #[arg(long, default_value_t = 10)]
    pub poll_interval_secs: u64,

    /// Delay between consecutive recovery transactions, to keep at most
    /// one in-flight transaction per operator key.
    #[arg(long, default_value_t = 3000)]
    pub recover_pace_ms: u64,

    /// Deadline for a single indexer or transactor request.
    #[arg(long, default_value_t = 30)]
    pub request_timeout_secs: u64,
}

impl Default for BaseConfig {
    fn default() -> Self {
        BaseConfig {
            indexer_url: "http://localhost:8000/subgraphs/drb".to_string(),
            transactor_url: "http://localhost:9545".to_string(),
            operator_address: Address::ZERO,
            operators: Vec::new(),
            commit_phase_secs: 120,
            dispute_phase_secs: 180,
            poll_interval_secs: 10,
            recover_pace_ms: 3000,
            request_timeout_secs: 30,
        }
    }
}
