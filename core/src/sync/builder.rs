// mercado/src/sync/builder.rs

use crate::auth::{AuthorizationGate, OpenGate};
use crate::clock::{Clock, SystemClock};
use crate::config::SyncConfig;
use crate::error::{MercadoError, MercadoResult};
use crate::notify::{Notifier, TracingNotifier};
use crate::propagation::{ChangePropagator, ContextId, Origin, OriginPropagator};
use crate::store::{CatalogStore, LocalProductStore};
use crate::sync::coordinator::{Parts, SyncCoordinator};
use std::sync::Arc;

/// Assembles a [`SyncCoordinator`].
///
/// Either supply a store and a propagator directly, or an [`Origin`] from which
/// both are derived for a fresh context. When both an origin and a propagator are
/// given, the store is built over the origin's storage with that propagator.
pub struct SyncCoordinatorBuilder {
  context: Option<ContextId>,
  origin: Option<Arc<Origin>>,
  store: Option<Arc<dyn CatalogStore>>,
  propagator: Option<Arc<dyn ChangePropagator>>,
  notifier: Arc<dyn Notifier>,
  gate: Arc<dyn AuthorizationGate>,
  clock: Arc<dyn Clock>,
  config: Arc<SyncConfig>,
}

impl Default for SyncCoordinatorBuilder {
  fn default() -> Self {
    Self::new()
  }
}

impl SyncCoordinatorBuilder {
  pub fn new() -> Self {
    Self {
      context: None,
      origin: None,
      store: None,
      propagator: None,
      notifier: Arc::new(TracingNotifier),
      gate: Arc::new(OpenGate),
      clock: Arc::new(SystemClock),
      config: Arc::new(SyncConfig::default()),
    }
  }

  pub fn context(mut self, context: ContextId) -> Self {
    self.context = Some(context);
    self
  }

  pub fn origin(mut self, origin: Arc<Origin>) -> Self {
    self.origin = Some(origin);
    self
  }

  pub fn store(mut self, store: Arc<dyn CatalogStore>) -> Self {
    self.store = Some(store);
    self
  }

  pub fn propagator(mut self, propagator: Arc<dyn ChangePropagator>) -> Self {
    self.propagator = Some(propagator);
    self
  }

  pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
    self.notifier = notifier;
    self
  }

  pub fn gate(mut self, gate: Arc<dyn AuthorizationGate>) -> Self {
    self.gate = gate;
    self
  }

  pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
    self.clock = clock;
    self
  }

  pub fn config(mut self, config: SyncConfig) -> Self {
    self.config = Arc::new(config);
    self
  }

  pub fn shared_config(mut self, config: Arc<SyncConfig>) -> Self {
    self.config = config;
    self
  }

  pub fn build(self) -> MercadoResult<SyncCoordinator> {
    let context = self.context.unwrap_or_default();

    let propagator: Arc<dyn ChangePropagator> = match (self.propagator, &self.origin) {
      (Some(propagator), _) => propagator,
      (None, Some(origin)) => Arc::new(OriginPropagator::new(origin.clone(), context, &self.config)),
      (None, None) => {
        return Err(MercadoError::Configuration(
          "a propagator or an origin is required".to_string(),
        ))
      }
    };

    let store: Arc<dyn CatalogStore> = match (self.store, &self.origin) {
      (Some(store), _) => store,
      (None, Some(origin)) => Arc::new(LocalProductStore::new(
        origin.storage(),
        propagator.clone(),
        self.clock.clone(),
        self.config.clone(),
      )),
      (None, None) => {
        return Err(MercadoError::Configuration(
          "a store or an origin is required".to_string(),
        ))
      }
    };

    Ok(SyncCoordinator::from_parts(Parts {
      context,
      store,
      propagator,
      notifier: self.notifier,
      gate: self.gate,
      clock: self.clock,
      config: self.config,
    }))
  }
}
