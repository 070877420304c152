use std::collections::HashMap;

use alloy_primitives::{Address, U256};

use crate::traits::LeaderElector;

/// Mock elector with per-round overrides and a fallback leader.
pub struct MockElector {
    default_leader: Address,
    per_round: HashMap<u64, Address>,
}

impl MockElector {
    pub fn new(default_leader: Address) -> Self {
        Self {
            default_leader,
            per_round: HashMap::new(),
        }
    }

    pub fn with_leader(mut self, round: u64, leader: Address) -> Self {
        self.per_round.insert(round, leader);
        self
    }
}

impl LeaderElector for MockElector {
    fn name(&self) -> &'static str {
        "mock-elector"
    }

    fn elect_leader(&self, round: u64, _omega: U256) -> Address {
        self.per_round
            .get(&round)
            .copied()
            .unwrap_or(self.default_leader)
    }
}
