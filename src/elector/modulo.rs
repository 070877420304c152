use alloy_primitives::{Address, U256};

use crate::traits::LeaderElector;

/// Elects `operators[(omega + round) mod n]` over a sorted operator set.
///
/// Sorting makes the election independent of configuration order, so every
/// operator configured with the same set elects the same leader.
pub struct ModuloElector {
    operators: Vec<Address>,
}

impl ModuloElector {
    pub fn new(mut operators: Vec<Address>) -> Self {
        operators.sort();
        operators.dedup();
        Self { operators }
    }
}

impl LeaderElector for ModuloElector {
    fn name(&self) -> &'static str {
        "modulo"
    }

    fn elect_leader(&self, round: u64, omega: U256) -> Address {
        if self.operators.is_empty() {
            return Address::ZERO;
        }
        let n = U256::from(self.operators.len());
        let index = (omega.wrapping_add(U256::from(round)) % n).to::<u64>() as usize;
        self.operators[index]
    }
}
