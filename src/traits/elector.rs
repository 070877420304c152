use alloy_primitives::{Address, U256};

/// Deterministic off-chain leader election.
///
/// Must be pure: every operator observing the same `(round, omega)` pair
/// elects the same leader, with no coordination.
pub trait LeaderElector: Send + Sync {
    /// Elector name for logging.
    fn name(&self) -> &'static str;

    /// Leader responsible for fulfilling `round` given its revealed value.
    fn elect_leader(&self, round: u64, omega: U256) -> Address;
}
