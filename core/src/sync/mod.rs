// mercado/src/sync/mod.rs

//! The per-context sync coordinator that storefront and admin views talk to.

pub mod builder;
pub mod coordinator;
pub mod phase;

pub use builder::SyncCoordinatorBuilder;
pub use coordinator::{MutationOutcome, SyncCoordinator};
pub use phase::SyncPhase;
