// mercado/src/propagation/listeners.rs

//! A registry of message listeners, each owned by one execution context.

use crate::propagation::origin::ContextId;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{event, Level};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub type Listener<M> = Arc<dyn Fn(&M) + Send + Sync>;

/// Listeners keyed by id. `post` delivers to every listener whose owner is not
/// the sender, at most once, synchronously on the posting task.
pub struct ListenerRegistry<M> {
  listeners: Mutex<HashMap<ListenerId, (ContextId, Listener<M>)>>,
  next_id: AtomicU64,
}

impl<M> ListenerRegistry<M> {
  pub fn new() -> Self {
    Self {
      listeners: Mutex::new(HashMap::new()),
      next_id: AtomicU64::new(1),
    }
  }

  pub fn add_listener(&self, owner: ContextId, listener: Listener<M>) -> ListenerId {
    let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
    self.listeners.lock().insert(id, (owner, listener));
    event!(Level::TRACE, listener = id.0, %owner, "Listener registered.");
    id
  }

  /// Returns false if the listener was already gone.
  pub fn remove_listener(&self, id: ListenerId) -> bool {
    self.listeners.lock().remove(&id).is_some()
  }

  pub fn listener_count(&self) -> usize {
    self.listeners.lock().len()
  }

  /// Returns how many listeners received the message.
  pub fn post(&self, sender: ContextId, message: &M) -> usize {
    // Snapshot under the lock, deliver without it: listeners may post or unsubscribe.
    let targets: Vec<Listener<M>> = {
      let guard = self.listeners.lock();
      guard
        .values()
        .filter(|(owner, _)| *owner != sender)
        .map(|(_, listener)| Arc::clone(listener))
        .collect()
    };

    let mut delivered = 0;
    for listener in targets {
      match catch_unwind(AssertUnwindSafe(|| listener(message))) {
        Ok(()) => delivered += 1,
        Err(_) => event!(Level::ERROR, %sender, "Listener panicked while handling a message."),
      }
    }
    delivered
  }
}

impl<M> Default for ListenerRegistry<M> {
  fn default() -> Self {
    Self::new()
  }
}
