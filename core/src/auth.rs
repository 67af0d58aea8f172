// mercado/src/auth.rs

//! The admin capability gate consumed by the sync coordinator.

use crate::clock::Clock;
use crate::store::KeyValueStorage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{event, Level};

/// Answers one question: is the caller an authorized admin?
pub trait AuthorizationGate: Send + Sync {
  fn is_authorized(&self) -> bool;
}

/// Authorizes every caller.
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenGate;

impl AuthorizationGate for OpenGate {
  fn is_authorized(&self) -> bool {
    true
  }
}

pub const SESSION_KEY: &str = "admin_session";
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Serialize, Deserialize)]
struct SessionMarker {
  timestamp: i64,
  authenticated: bool,
}

/// Fixed shared secret plus a time-boxed session marker kept in origin storage,
/// so every context of the origin sees the same login.
pub struct AdminSession {
  storage: Arc<dyn KeyValueStorage>,
  clock: Arc<dyn Clock>,
  secret: String,
  ttl: Duration,
}

impl AdminSession {
  pub fn new(storage: Arc<dyn KeyValueStorage>, clock: Arc<dyn Clock>, secret: impl Into<String>) -> Self {
    Self {
      storage,
      clock,
      secret: secret.into(),
      ttl: DEFAULT_SESSION_TTL,
    }
  }

  pub fn with_ttl(mut self, ttl: Duration) -> Self {
    self.ttl = ttl;
    self
  }

  pub fn login(&self, password: &str) -> bool {
    if password != self.secret {
      event!(Level::WARN, "Admin login rejected.");
      return false;
    }
    let marker = SessionMarker {
      timestamp: self.clock.now_millis(),
      authenticated: true,
    };
    let stored = serde_json::to_string(&marker)
      .map_err(crate::error::MercadoError::from)
      .and_then(|raw| self.storage.set_item(SESSION_KEY, &raw));
    match stored {
      Ok(()) => {
        event!(Level::INFO, "Admin session started.");
        true
      }
      Err(e) => {
        event!(Level::ERROR, error = %e, "Could not persist admin session.");
        false
      }
    }
  }

  pub fn logout(&self) {
    self.clear();
    event!(Level::INFO, "Admin session ended.");
  }

  /// True while a valid, unexpired marker exists. Expired or unreadable markers
  /// are removed.
  pub fn check_session(&self) -> bool {
    let raw = match self.storage.get_item(SESSION_KEY) {
      Ok(Some(raw)) => raw,
      Ok(None) => return false,
      Err(e) => {
        event!(Level::WARN, error = %e, "Could not read admin session.");
        return false;
      }
    };
    match serde_json::from_str::<SessionMarker>(&raw) {
      Ok(marker) if marker.authenticated => {
        let age = self.clock.now_millis() - marker.timestamp;
        if age < self.ttl.as_millis() as i64 {
          true
        } else {
          event!(Level::INFO, age_ms = age, "Admin session expired.");
          self.clear();
          false
        }
      }
      _ => {
        self.clear();
        false
      }
    }
  }

  fn clear(&self) {
    if let Err(e) = self.storage.remove_item(SESSION_KEY) {
      event!(Level::WARN, error = %e, "Could not remove admin session.");
    }
  }
}

impl AuthorizationGate for AdminSession {
  fn is_authorized(&self) -> bool {
    self.check_session()
  }
}
