//! Chain transactor backends.

pub mod mock;
pub mod sidecar;
pub mod variant;

pub use mock::MockTransactor;
pub use sidecar::SidecarTransactor;
pub use variant::TransactorVariant;
