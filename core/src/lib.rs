// src/lib.rs

//! Mercado: product synchronization and stock consistency for a multi-window storefront.
//!
//! Every open window (an execution context) holds its own copy of the product list.
//! The crate keeps those copies consistent with:
//!  - A persistent snapshot store with a short-lived read cache.
//!  - A change propagator that fans "products updated" out to sibling contexts over
//!    two best-effort transports.
//!  - A per-context sync coordinator that serializes admin mutations, persists them,
//!    applies remote updates and polls as a safety net.
//!  - Pure catalog logic: stock-driven visibility, stock status and browsing queries.
//!
//! The buyer-side order handoff (cart, delivery zones, messaging deep link) lives in
//! [`order`].

pub mod auth;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod error;
pub mod model;
pub mod notify;
pub mod order;
pub mod propagation;
pub mod store;
pub mod sync;

// --- Re-exports for the Public API ---

pub use crate::auth::{AdminSession, AuthorizationGate, OpenGate};
pub use crate::catalog::{stock_status, CatalogCommand, CommandEffect};
pub use crate::clock::{Clock, ManualClock, SystemClock};
pub use crate::config::{HandoffConfig, SyncConfig};
pub use crate::error::{MercadoError, MercadoResult};
pub use crate::model::{Contact, Product, ProductDraft, ProductId, ProductPatch, StockSeverity, StockStatus};
pub use crate::notify::{Notice, NoticeLevel, Notifier, TracingNotifier};
pub use crate::propagation::{ChangePropagator, ContextId, Origin, OriginPropagator, Subscription};
pub use crate::store::{CatalogStore, FileStorage, KeyValueStorage, LocalProductStore, MemoryStorage, SyncStatus};
pub use crate::sync::{MutationOutcome, SyncCoordinator, SyncCoordinatorBuilder, SyncPhase};
