use alloy_primitives::{Address, U256};

use super::{MockElector, ModuloElector};
use crate::traits::LeaderElector;

/// Enum over all elector backends.
pub enum ElectorVariant {
    Modulo(ModuloElector),
    Mock(MockElector),
}

impl LeaderElector for ElectorVariant {
    fn name(&self) -> &'static str {
        match self {
            ElectorVariant::Modulo(inner) => inner.name(),
            ElectorVariant::Mock(inner) => inner.name(),
        }
    }

    fn elect_leader(&self, round: u64, omega: U256) -> Address {
        match self {
            ElectorVariant::Modulo(inner) => inner.elect_leader(round, omega),
            ElectorVariant::Mock(inner) => inner.elect_leader(round, omega),
        }
    }
}
