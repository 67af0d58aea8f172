// mercado/src/propagation/origin.rs

//! One same-origin environment: shared storage plus the notification transports
//! its contexts use to talk to each other.

use crate::propagation::listeners::ListenerRegistry;
use crate::propagation::{ChannelMessage, StorageEvent};
use crate::store::{KeyValueStorage, MemoryStorage};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Identity of one execution context (a tab).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(Uuid);

impl ContextId {
  pub fn new() -> Self {
    ContextId(Uuid::new_v4())
  }
}

impl Default for ContextId {
  fn default() -> Self {
    Self::new()
  }
}

impl fmt::Display for ContextId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    // The first group is enough to tell contexts apart in logs.
    let full = self.0.to_string();
    f.write_str(&full[..8])
  }
}

pub struct Origin {
  storage: Arc<dyn KeyValueStorage>,
  // None emulates an environment without the typed broadcast primitive.
  channels: Option<Mutex<HashMap<String, Arc<ListenerRegistry<ChannelMessage>>>>>,
  storage_events: ListenerRegistry<StorageEvent>,
}

impl Origin {
  pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
    Self {
      storage,
      channels: Some(Mutex::new(HashMap::new())),
      storage_events: ListenerRegistry::new(),
    }
  }

  pub fn in_memory() -> Self {
    Self::new(Arc::new(MemoryStorage::new()))
  }

  /// An origin whose contexts can only rely on storage events.
  pub fn without_broadcast_channel(storage: Arc<dyn KeyValueStorage>) -> Self {
    Self {
      storage,
      channels: None,
      storage_events: ListenerRegistry::new(),
    }
  }

  pub fn storage(&self) -> Arc<dyn KeyValueStorage> {
    Arc::clone(&self.storage)
  }

  pub fn supports_broadcast_channel(&self) -> bool {
    self.channels.is_some()
  }

  /// Opens (or joins) the named broadcast channel. `None` when unsupported.
  pub fn open_channel(&self, name: &str) -> Option<Arc<ListenerRegistry<ChannelMessage>>> {
    let channels = self.channels.as_ref()?;
    let mut guard = channels.lock();
    Some(Arc::clone(guard.entry(name.to_string()).or_default()))
  }

  pub fn storage_events(&self) -> &ListenerRegistry<StorageEvent> {
    &self.storage_events
  }
}

impl fmt::Debug for Origin {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Origin")
      .field("broadcast_channel", &self.supports_broadcast_channel())
      .field("storage_listeners", &self.storage_events.listener_count())
      .finish()
  }
}
