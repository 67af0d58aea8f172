// mercado/src/sync/phase.rs

//! Lifecycle of one coordinator.

use std::fmt;

/// `Uninitialized -> Loading -> Ready <-> Syncing`, and `Closed` after teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncPhase {
  Uninitialized,
  Loading,
  /// In-memory list is usable; no mutation in flight.
  Ready,
  /// A mutation or forced sync is persisting and propagating.
  Syncing,
  Closed,
}

impl SyncPhase {
  /// Whether commands may be issued in this phase.
  pub fn accepts_commands(self) -> bool {
    matches!(self, SyncPhase::Ready | SyncPhase::Syncing)
  }
}

impl fmt::Display for SyncPhase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      SyncPhase::Uninitialized => "uninitialized",
      SyncPhase::Loading => "loading",
      SyncPhase::Ready => "ready",
      SyncPhase::Syncing => "syncing",
      SyncPhase::Closed => "closed",
    };
    f.write_str(name)
  }
}
