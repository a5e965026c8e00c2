//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod promotion_sweep;
pub mod release_store;
pub mod test_dependencies;
pub mod traits;

pub use deps::ServerDeps;
pub use promotion_sweep::{PromotionSignal, PromotionSweep, PromotionSweepConfig};
pub use release_store::PostgresReleaseStore;
pub use test_dependencies::{InMemoryReleaseStore, Interleaved, TestDependencies};
pub use traits::*;
