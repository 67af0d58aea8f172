// mercado/src/propagation/mod.rs

//! Fan-out of "products updated" notifications between the execution contexts of
//! one origin.
//!
//! Two transports are used, both best effort: a typed broadcast channel and a
//! storage-change event. Neither delivers to the context that posted, so a writer
//! always updates its own in-memory state directly.

pub mod listeners;
pub mod origin;
pub mod origin_propagator;

use crate::model::Product;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use listeners::{ListenerId, ListenerRegistry};
pub use origin::{ContextId, Origin};
pub use origin_propagator::OriginPropagator;

/// Payload of the typed broadcast channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChannelMessage {
  ProductsUpdated { products: Vec<Product>, timestamp: i64 },
}

/// A change to a storage key, as seen by the other contexts of the origin.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageEvent {
  pub key: String,
  pub new_value: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
  BroadcastChannel,
  StorageEvent,
}

/// A product list received from another context.
#[derive(Debug, Clone, PartialEq)]
pub struct PropagatedUpdate {
  pub products: Vec<Product>,
  pub timestamp: Option<i64>,
  pub via: Transport,
}

pub type UpdateCallback = Arc<dyn Fn(PropagatedUpdate) + Send + Sync>;

pub trait ChangePropagator: Send + Sync {
  /// Fire-and-forget. Failures are logged, never returned.
  fn publish(&self, products: &[Product], timestamp: i64);

  /// Registers `callback` on every transport. Dropping or unsubscribing the
  /// returned handle unregisters from all of them.
  fn subscribe(&self, callback: UpdateCallback) -> Subscription;
}

/// Handle for a live subscription.
#[must_use = "dropping a Subscription unsubscribes immediately"]
#[derive(Default)]
pub struct Subscription {
  releases: Vec<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
  pub fn new() -> Self {
    Self::default()
  }

  /// Adds an action run once on unsubscribe.
  pub fn on_unsubscribe(mut self, release: impl FnOnce() + Send + 'static) -> Self {
    self.releases.push(Box::new(release));
    self
  }

  pub fn unsubscribe(mut self) {
    self.release();
  }

  fn release(&mut self) {
    for release in self.releases.drain(..) {
      release();
    }
  }
}

impl Drop for Subscription {
  fn drop(&mut self) {
    self.release();
  }
}

impl std::fmt::Debug for Subscription {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Subscription").field("transports", &self.releases.len()).finish()
  }
}
