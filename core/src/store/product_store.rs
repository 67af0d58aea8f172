// mercado/src/store/product_store.rs

//! Durable read/write of the catalog snapshot with a short-lived read cache.
//!
//! `save` is the only path that writes `lastUpdated`. The cache is trusted while
//! the shared last-sync marker is younger than the freshness window; nothing
//! invalidates it explicitly.

use crate::clock::Clock;
use crate::config::SyncConfig;
use crate::error::{MercadoError, MercadoResult};
use crate::model::{CatalogSnapshot, DecodedSnapshot, Product};
use crate::propagation::ChangePropagator;
use crate::store::storage::KeyValueStorage;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tracing::{event, instrument, Level};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
  pub is_online: bool,
  pub last_sync: i64,
}

/// Snapshot persistence as seen by the sync coordinator. Implementations recover
/// from their own failures: callers only get booleans and data back, except from
/// `read_snapshot`, which reports why nothing usable was found.
#[async_trait]
pub trait CatalogStore: Send + Sync {
  /// Persists `products`, refreshes the cache and propagates. False on failure.
  async fn save(&self, products: &[Product]) -> bool;

  /// Cached list if fresh, else the persisted one. Empty when there is nothing
  /// usable.
  async fn load(&self) -> Vec<Product>;

  /// Same lookup as `load`, but a storage or decode failure is returned instead
  /// of reading as an empty catalog.
  async fn try_load(&self) -> MercadoResult<Vec<Product>>;

  /// Re-reads persisted storage ignoring the cache and re-propagates the result.
  async fn force_sync(&self) -> bool;

  /// Reads persisted storage ignoring the cache. `Ok(None)` when no snapshot
  /// exists.
  async fn read_snapshot(&self) -> MercadoResult<Option<Vec<Product>>>;

  /// Replaces the read cache with a list received from another context.
  fn prime_cache(&self, products: &[Product], timestamp: Option<i64>);

  fn sync_status(&self) -> SyncStatus;
}

#[derive(Default)]
struct StoreCache {
  products: Option<Vec<Product>>,
  last_sync: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotRef<'a> {
  products: &'a [Product],
  last_updated: i64,
  version: u32,
}

/// `CatalogStore` over a [`KeyValueStorage`].
pub struct LocalProductStore {
  storage: Arc<dyn KeyValueStorage>,
  propagator: Arc<dyn ChangePropagator>,
  clock: Arc<dyn Clock>,
  config: Arc<SyncConfig>,
  cache: Mutex<StoreCache>,
}

impl LocalProductStore {
  pub fn new(
    storage: Arc<dyn KeyValueStorage>,
    propagator: Arc<dyn ChangePropagator>,
    clock: Arc<dyn Clock>,
    config: Arc<SyncConfig>,
  ) -> Self {
    Self {
      storage,
      propagator,
      clock,
      config,
      cache: Mutex::new(StoreCache::default()),
    }
  }

  fn write_snapshot(&self, products: &[Product], timestamp: i64) -> MercadoResult<()> {
    let raw = serde_json::to_string(&SnapshotRef {
      products,
      last_updated: timestamp,
      version: self.config.snapshot_version,
    })?;
    self.storage.set_item(&self.config.storage_key, &raw)?;
    self.storage.set_item(&self.config.sync_key, &timestamp.to_string())?;
    Ok(())
  }

  fn read_persisted(&self) -> MercadoResult<Option<DecodedSnapshot>> {
    let key = &self.config.storage_key;
    let Some(raw) = self.storage.get_item(key)? else {
      return Ok(None);
    };
    CatalogSnapshot::decode(&raw)
      .map(Some)
      .map_err(|source| MercadoError::CorruptSnapshot {
        key: key.clone(),
        source,
      })
  }

  fn fresh_cache(&self) -> Option<Vec<Product>> {
    let marker = match self.storage.get_item(&self.config.sync_key) {
      Ok(Some(raw)) => raw.trim().parse::<i64>().ok()?,
      Ok(None) => return None,
      Err(e) => {
        event!(Level::WARN, error = %e, "Could not read sync marker; bypassing cache.");
        return None;
      }
    };
    let age = self.clock.now_millis() - marker;
    if age >= self.config.freshness_window.as_millis() as i64 {
      return None;
    }
    self.cache.lock().products.clone()
  }

  fn remember(&self, products: &[Product], last_sync: i64) {
    let mut cache = self.cache.lock();
    cache.products = Some(products.to_vec());
    cache.last_sync = last_sync;
  }
}

#[async_trait]
impl CatalogStore for LocalProductStore {
  #[instrument(name = "LocalProductStore::save", skip_all, fields(products = products.len()))]
  async fn save(&self, products: &[Product]) -> bool {
    let timestamp = self.clock.now_millis();
    if let Err(e) = self.write_snapshot(products, timestamp) {
      event!(Level::ERROR, error = %e, "Failed to save products.");
      return false;
    }
    self.remember(products, timestamp);
    self.propagator.publish(products, timestamp);

    if !self.config.simulated_latency.is_zero() {
      tokio::time::sleep(self.config.simulated_latency).await;
    }
    event!(Level::DEBUG, timestamp, "Products saved.");
    true
  }

  #[instrument(name = "LocalProductStore::load", skip_all)]
  async fn load(&self) -> Vec<Product> {
    match self.try_load().await {
      Ok(products) => products,
      Err(e) => {
        event!(Level::ERROR, error = %e, "Failed to load products.");
        Vec::new()
      }
    }
  }

  async fn try_load(&self) -> MercadoResult<Vec<Product>> {
    if let Some(cached) = self.fresh_cache() {
      event!(Level::TRACE, products = cached.len(), "Serving products from fresh cache.");
      return Ok(cached);
    }
    let Some(decoded) = self.read_persisted()? else {
      return Ok(Vec::new());
    };
    let last_sync = decoded.last_updated.unwrap_or_else(|| self.clock.now_millis());
    self.remember(&decoded.products, last_sync);
    Ok(decoded.products)
  }

  #[instrument(name = "LocalProductStore::force_sync", skip_all)]
  async fn force_sync(&self) -> bool {
    match self.read_persisted() {
      Ok(decoded) => {
        let now = self.clock.now_millis();
        let (products, last_sync) = match decoded {
          Some(d) => {
            let last_sync = d.last_updated.unwrap_or(now);
            (d.products, last_sync)
          }
          None => (Vec::new(), now),
        };
        self.remember(&products, last_sync);
        self.propagator.publish(&products, now);
        event!(Level::INFO, products = products.len(), "Force sync re-broadcast products.");
        true
      }
      Err(e) => {
        event!(Level::ERROR, error = %e, "Force sync failed.");
        false
      }
    }
  }

  async fn read_snapshot(&self) -> MercadoResult<Option<Vec<Product>>> {
    let decoded = self.read_persisted()?;
    Ok(decoded.map(|d| {
      let last_sync = d.last_updated.unwrap_or_else(|| self.clock.now_millis());
      self.remember(&d.products, last_sync);
      d.products
    }))
  }

  fn prime_cache(&self, products: &[Product], timestamp: Option<i64>) {
    let last_sync = timestamp.unwrap_or_else(|| self.clock.now_millis());
    self.remember(products, last_sync);
  }

  fn sync_status(&self) -> SyncStatus {
    SyncStatus {
      is_online: true,
      last_sync: self.cache.lock().last_sync,
    }
  }
}
