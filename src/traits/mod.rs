//! Trait seams for the reconciliation engine's external collaborators.

pub mod elector;
pub mod indexer;
pub mod transactor;

pub use elector::LeaderElector;
pub use indexer::EventIndexer;
pub use transactor::ChainTransactor;
