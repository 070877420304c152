//! Event indexer backends.

pub mod graphql;
pub mod mock;
pub mod variant;

pub use graphql::GraphQlIndexer;
pub use mock::MockIndexer;
pub use variant::IndexerVariant;
