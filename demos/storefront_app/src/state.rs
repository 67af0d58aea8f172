// storefront_app/src/state.rs
use crate::config::AppConfig;
use crate::errors::Result as AppResult;
use mercado::{AdminSession, AuthorizationGate, FileStorage, Origin, SyncCoordinator, SystemClock};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub origin: Arc<Origin>,
  pub admin_session: Arc<AdminSession>,
  pub config: Arc<AppConfig>, // Share loaded config
}

impl AppState {
  pub fn new(config: Arc<AppConfig>) -> AppResult<Self> {
    let storage = Arc::new(FileStorage::open(&config.data_dir)?);
    let origin = Arc::new(Origin::new(storage.clone()));
    let admin_session = Arc::new(AdminSession::new(
      storage,
      Arc::new(SystemClock),
      config.admin_password.clone(),
    ));
    Ok(Self {
      origin,
      admin_session,
      config,
    })
  }

  /// Opens a new execution context on the shared origin. Storefront contexts pass
  /// `None` and only read; admin contexts pass the session gate.
  pub fn open_context(&self, gate: Option<Arc<dyn AuthorizationGate>>) -> AppResult<SyncCoordinator> {
    let mut builder = SyncCoordinator::builder()
      .origin(self.origin.clone())
      .config(self.config.sync_config());
    if let Some(gate) = gate {
      builder = builder.gate(gate);
    }
    Ok(builder.build()?)
  }
}
