//! Leader elector backends.

pub mod mock;
pub mod modulo;
pub mod variant;

pub use mock::MockElector;
pub use modulo::ModuloElector;
pub use variant::ElectorVariant;
