// mercado/src/sync/coordinator.rs

//! Owns the authoritative in-memory product list of one execution context and
//! keeps it in step with the snapshot store and the other contexts of the origin.
//!
//! Every mutation takes the in-flight token (a fair, FIFO async mutex), so calls
//! from the same context are applied and persisted one after another. Local
//! mutations update the in-memory list before persisting; remote updates and
//! polling replace the whole list.
//!
//! IMPORTANT: `state` is a blocking lock. Its guards are always dropped before
//! any `.await`.

use crate::auth::AuthorizationGate;
use crate::catalog::{self, reducer, CatalogCommand, CommandEffect};
use crate::clock::Clock;
use crate::config::SyncConfig;
use crate::error::{MercadoError, MercadoResult};
use crate::model::{Product, ProductDraft, ProductId, ProductPatch, StockStatus};
use crate::notify::{Notice, Notifier};
use crate::propagation::{ChangePropagator, ContextId, PropagatedUpdate, Subscription};
use crate::store::{CatalogStore, SyncStatus};
use crate::sync::builder::SyncCoordinatorBuilder;
use crate::sync::phase::SyncPhase;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{event, instrument, Level};

/// Result of a persisted mutation. `persisted == false` means the change only
/// lives in this context's memory.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationOutcome {
  pub effect: CommandEffect,
  pub persisted: bool,
}

#[derive(Debug)]
struct CatalogState {
  phase: SyncPhase,
  products: Vec<Product>,
  degraded: bool,
  // Set when a mutation could not be written; the list then differs from storage
  // until the next successful save.
  unsaved: bool,
  // Bumped by every local-only stock edit; `saved_generation` catches up on save.
  edit_generation: u64,
  saved_generation: u64,
}

impl CatalogState {
  fn has_pending_edits(&self) -> bool {
    self.edit_generation > self.saved_generation
  }

  fn holds_local_work(&self) -> bool {
    self.unsaved || self.has_pending_edits()
  }
}

#[derive(Default)]
struct Resources {
  subscription: Option<Subscription>,
  poller: Option<JoinHandle<()>>,
}

pub(crate) struct Parts {
  pub(crate) context: ContextId,
  pub(crate) store: Arc<dyn CatalogStore>,
  pub(crate) propagator: Arc<dyn ChangePropagator>,
  pub(crate) notifier: Arc<dyn Notifier>,
  pub(crate) gate: Arc<dyn AuthorizationGate>,
  pub(crate) clock: Arc<dyn Clock>,
  pub(crate) config: Arc<SyncConfig>,
}

struct Inner {
  context: ContextId,
  store: Arc<dyn CatalogStore>,
  propagator: Arc<dyn ChangePropagator>,
  notifier: Arc<dyn Notifier>,
  gate: Arc<dyn AuthorizationGate>,
  clock: Arc<dyn Clock>,
  config: Arc<SyncConfig>,
  state: RwLock<CatalogState>,
  syncing: AtomicBool,
  in_flight: tokio::sync::Mutex<()>,
  resources: Mutex<Resources>,
}

/// Sets the syncing flag for the lifetime of one operation and always clears it.
struct SyncingGuard<'a> {
  inner: &'a Inner,
}

impl<'a> SyncingGuard<'a> {
  fn enter(inner: &'a Inner) -> Self {
    inner.syncing.store(true, Ordering::SeqCst);
    {
      let mut state = inner.state.write();
      if state.phase == SyncPhase::Ready {
        state.phase = SyncPhase::Syncing;
      }
    }
    Self { inner }
  }
}

impl Drop for SyncingGuard<'_> {
  fn drop(&mut self) {
    {
      let mut state = self.inner.state.write();
      if state.phase == SyncPhase::Syncing {
        state.phase = SyncPhase::Ready;
      }
    }
    self.inner.syncing.store(false, Ordering::SeqCst);
  }
}

pub struct SyncCoordinator {
  inner: Arc<Inner>,
}

impl SyncCoordinator {
  pub fn builder() -> SyncCoordinatorBuilder {
    SyncCoordinatorBuilder::new()
  }

  pub(crate) fn from_parts(parts: Parts) -> Self {
    let inner = Inner {
      context: parts.context,
      store: parts.store,
      propagator: parts.propagator,
      notifier: parts.notifier,
      gate: parts.gate,
      clock: parts.clock,
      config: parts.config,
      state: RwLock::new(CatalogState {
        phase: SyncPhase::Uninitialized,
        products: Vec::new(),
        degraded: false,
        unsaved: false,
        edit_generation: 0,
        saved_generation: 0,
      }),
      syncing: AtomicBool::new(false),
      in_flight: tokio::sync::Mutex::new(()),
      resources: Mutex::new(Resources::default()),
    };
    Self { inner: Arc::new(inner) }
  }

  // --- Reads ---

  pub fn context_id(&self) -> ContextId {
    self.inner.context
  }

  pub fn phase(&self) -> SyncPhase {
    self.inner.state.read().phase
  }

  /// True while a mutation or forced sync is in flight. Views disable their
  /// controls on it.
  pub fn is_syncing(&self) -> bool {
    self.inner.syncing.load(Ordering::SeqCst)
  }

  /// True when the last attempt to reach storage failed and the list may only
  /// exist in memory. Cleared by the next successful save, sync or poll read.
  pub fn is_degraded(&self) -> bool {
    self.inner.state.read().degraded
  }

  pub fn has_pending_stock_changes(&self) -> bool {
    self.inner.state.read().has_pending_edits()
  }

  pub fn products(&self) -> Vec<Product> {
    self.inner.state.read().products.clone()
  }

  /// Derived on every call; never stored.
  pub fn visible_products(&self) -> Vec<Product> {
    catalog::visible_products(&self.inner.state.read().products)
  }

  pub fn product(&self, id: &ProductId) -> Option<Product> {
    self.inner.state.read().products.iter().find(|p| p.id == *id).cloned()
  }

  pub fn sync_status(&self) -> SyncStatus {
    self.inner.store.sync_status()
  }

  pub fn stock_status(stock: u32) -> StockStatus {
    catalog::stock_status(stock)
  }

  // --- Lifecycle ---

  /// Loads the persisted catalog, or seeds and persists the default one when
  /// none exists, then subscribes to remote updates and starts polling.
  ///
  /// Never fails because of storage: an unreadable store leaves the coordinator
  /// ready and degraded, holding the default catalog in memory only.
  #[instrument(name = "SyncCoordinator::init", skip_all, fields(context = %self.inner.context))]
  pub async fn init(&self) -> MercadoResult<()> {
    let inner = &self.inner;
    {
      let mut state = inner.state.write();
      if state.phase != SyncPhase::Uninitialized {
        return Err(MercadoError::InvalidPhase {
          operation: "init".to_string(),
          phase: state.phase.to_string(),
        });
      }
      state.phase = SyncPhase::Loading;
    }

    let (products, degraded) = match inner.store.read_snapshot().await {
      Ok(Some(products)) => {
        event!(Level::INFO, products = products.len(), "Loaded saved catalog.");
        (products, false)
      }
      Ok(None) => {
        event!(Level::INFO, "No saved catalog; seeding the default one.");
        inner.seed_and_persist().await
      }
      Err(e @ MercadoError::CorruptSnapshot { .. }) => {
        event!(Level::WARN, error = %e, "Saved catalog is corrupt; seeding the default one.");
        inner.seed_and_persist().await
      }
      Err(e) => {
        event!(Level::ERROR, error = %e, "Catalog could not be loaded; continuing with the default catalog in memory.");
        inner.notifier.notify(Notice::warning(
          "Working offline",
          "The saved catalog could not be loaded. Showing the default catalog; changes may stay local.",
        ));
        (inner.seed_catalog(), true)
      }
    };

    {
      let mut state = inner.state.write();
      state.products = products;
      state.degraded = degraded;
      state.phase = SyncPhase::Ready;
    }
    self.attach_resources();
    Ok(())
  }

  fn attach_resources(&self) {
    let weak = Arc::downgrade(&self.inner);
    let subscription = self.inner.propagator.subscribe(Arc::new(move |update: PropagatedUpdate| {
      if let Some(inner) = weak.upgrade() {
        inner.apply_remote(update);
      }
    }));

    let period = self.inner.config.poll_interval;
    let poller = if period.is_zero() {
      event!(Level::DEBUG, "Poll interval is zero; polling disabled.");
      None
    } else {
      match tokio::runtime::Handle::try_current() {
        Ok(handle) => Some(handle.spawn(poll_loop(Arc::downgrade(&self.inner), period))),
        Err(_) => {
          event!(Level::WARN, "No async runtime available; polling disabled.");
          None
        }
      }
    };

    let mut resources = self.inner.resources.lock();
    resources.subscription = Some(subscription);
    resources.poller = poller;
  }

  /// Unsubscribes and stops polling. Safe to call more than once; also run on drop.
  pub fn teardown(&self) {
    let (subscription, poller) = {
      let mut resources = self.inner.resources.lock();
      (resources.subscription.take(), resources.poller.take())
    };
    if let Some(subscription) = subscription {
      subscription.unsubscribe();
    }
    if let Some(poller) = poller {
      poller.abort();
    }
    let mut state = self.inner.state.write();
    if state.phase != SyncPhase::Closed {
      state.phase = SyncPhase::Closed;
      event!(Level::DEBUG, context = %self.inner.context, "Coordinator torn down.");
    }
  }

  /// One poll cycle: loads through the store and replaces the in-memory list.
  /// Returns whether the list changed. Skipped while a mutation is in flight,
  /// local stock edits are pending or a mutation is still unsaved. A failed read
  /// keeps the current list and marks the coordinator degraded.
  pub async fn refresh(&self) -> bool {
    self.inner.refresh().await
  }

  // --- Mutators ---

  pub async fn add_product(&self, draft: ProductDraft) -> MercadoResult<MutationOutcome> {
    self.inner.execute(CatalogCommand::AddProduct(draft)).await
  }

  /// Merges `patch` into the product. A stock change re-derives visibility.
  pub async fn update_product(&self, id: &ProductId, patch: ProductPatch) -> MercadoResult<MutationOutcome> {
    self
      .inner
      .execute(CatalogCommand::UpdateFields { id: id.clone(), patch })
      .await
  }

  pub async fn update_product_images(&self, id: &ProductId, images: Vec<String>) -> MercadoResult<MutationOutcome> {
    self
      .inner
      .execute(CatalogCommand::SetImages { id: id.clone(), images })
      .await
  }

  pub async fn remove_product(&self, id: &ProductId) -> MercadoResult<MutationOutcome> {
    self.inner.execute(CatalogCommand::Remove { id: id.clone() }).await
  }

  /// Rejected with `OutOfStock` for zero-stock products.
  pub async fn toggle_product_visibility(&self, id: &ProductId) -> MercadoResult<MutationOutcome> {
    self
      .inner
      .execute(CatalogCommand::ToggleVisibility { id: id.clone() })
      .await
  }

  /// Local-only stock edit; persisted by the next `save_stock_changes` (or any
  /// other persisted mutation).
  pub fn update_stock(&self, id: &ProductId, stock: u32) -> MercadoResult<()> {
    let inner = &self.inner;
    let command = CatalogCommand::SetStock { id: id.clone(), stock };
    let kind = command.kind();
    inner.authorize(kind)?;
    inner.ensure_accepts(kind)?;
    let now = inner.clock.now_millis();
    let result = {
      let mut state = inner.state.write();
      let result = reducer::apply(&mut state.products, command, now);
      if result.is_ok() {
        state.edit_generation += 1;
      }
      result
    };
    match result {
      Ok(_) => {
        event!(Level::DEBUG, product = %id, stock, "Stock edited locally.");
        Ok(())
      }
      Err(e) => Err(inner.reject(kind, e)),
    }
  }

  /// Persists the current in-memory list, covering pending stock edits.
  #[instrument(name = "SyncCoordinator::save_stock_changes", skip_all, fields(context = %self.inner.context))]
  pub async fn save_stock_changes(&self) -> MercadoResult<bool> {
    let inner = &self.inner;
    let kind = "save_stock_changes";
    inner.authorize(kind)?;
    let _token = inner.in_flight.lock().await;
    inner.ensure_accepts(kind)?;
    let _syncing = SyncingGuard::enter(inner);

    let (snapshot, generation) = {
      let state = inner.state.read();
      (state.products.clone(), state.edit_generation)
    };
    let success = Notice::success("Stock updated", "Stock changes were saved.");
    Ok(inner.persist(&snapshot, generation, success).await)
  }

  /// Re-reads storage, re-broadcasts to the other contexts and replaces the
  /// in-memory list. Open to every caller.
  #[instrument(name = "SyncCoordinator::sync_products", skip_all, fields(context = %self.inner.context))]
  pub async fn sync_products(&self) -> MercadoResult<bool> {
    let inner = &self.inner;
    let _token = inner.in_flight.lock().await;
    inner.ensure_accepts("sync_products")?;
    let _syncing = SyncingGuard::enter(inner);

    if !inner.store.force_sync().await {
      inner
        .notifier
        .notify(Notice::error("Sync failed", "The catalog could not be re-read from storage."));
      return Ok(false);
    }
    let products = inner.store.load().await;
    {
      let mut state = inner.state.write();
      state.products = products;
      state.saved_generation = state.edit_generation;
      state.degraded = false;
      state.unsaved = false;
    }
    inner
      .notifier
      .notify(Notice::success("Synchronized", "The catalog is synchronized across open windows."));
    Ok(true)
  }
}

impl Drop for SyncCoordinator {
  fn drop(&mut self) {
    self.teardown();
  }
}

impl Inner {
  fn seed_catalog(&self) -> Vec<Product> {
    catalog::default_catalog(self.clock.now_millis(), &mut rand::thread_rng())
  }

  async fn seed_and_persist(&self) -> (Vec<Product>, bool) {
    let seeded = self.seed_catalog();
    if self.store.save(&seeded).await {
      (seeded, false)
    } else {
      self.notifier.notify(Notice::warning(
        "Changes are local only",
        "The default catalog could not be saved to storage.",
      ));
      (seeded, true)
    }
  }

  fn authorize(&self, kind: &str) -> MercadoResult<()> {
    if self.gate.is_authorized() {
      return Ok(());
    }
    event!(Level::WARN, context = %self.context, command = kind, "Unauthorized catalog command.");
    self
      .notifier
      .notify(Notice::error("Not authorized", "Log in as an administrator to change the catalog."));
    Err(MercadoError::Unauthorized)
  }

  fn ensure_accepts(&self, operation: &str) -> MercadoResult<()> {
    let phase = self.state.read().phase;
    if phase.accepts_commands() {
      Ok(())
    } else {
      Err(MercadoError::InvalidPhase {
        operation: operation.to_string(),
        phase: phase.to_string(),
      })
    }
  }

  fn reject(&self, kind: &str, error: MercadoError) -> MercadoError {
    event!(Level::WARN, context = %self.context, command = kind, error = %error, "Catalog command rejected.");
    self.notifier.notify(Notice::error(failure_title(kind), error.to_string()));
    error
  }

  #[instrument(name = "SyncCoordinator::execute", skip_all, fields(context = %self.context, command = command.kind()))]
  async fn execute(&self, command: CatalogCommand) -> MercadoResult<MutationOutcome> {
    let kind = command.kind();
    self.authorize(kind)?;
    let _token = self.in_flight.lock().await;
    self.ensure_accepts(kind)?;
    let _syncing = SyncingGuard::enter(self);

    let now = self.clock.now_millis();
    let applied = {
      let mut state = self.state.write();
      reducer::apply(&mut state.products, command, now)
        .map(|effect| (effect, state.products.clone(), state.edit_generation))
    };
    let (effect, snapshot, generation) = match applied {
      Ok(applied) => applied,
      Err(e) => return Err(self.reject(kind, e)),
    };

    let success = success_notice(&effect, &snapshot);
    let persisted = self.persist(&snapshot, generation, success).await;
    Ok(MutationOutcome { effect, persisted })
  }

  async fn persist(&self, snapshot: &[Product], generation: u64, success: Notice) -> bool {
    if self.store.save(snapshot).await {
      {
        let mut state = self.state.write();
        state.degraded = false;
        state.unsaved = false;
        state.saved_generation = state.saved_generation.max(generation);
      }
      self.notifier.notify(success);
      true
    } else {
      {
        let mut state = self.state.write();
        state.degraded = true;
        state.unsaved = true;
      }
      let description = format!("{} It could not be written to storage.", success.description);
      self.notifier.notify(Notice::warning("Saved locally only", description));
      false
    }
  }

  async fn refresh(&self) -> bool {
    if !self.can_replace() {
      return false;
    }
    let loaded = self.store.try_load().await;

    let mut state = self.state.write();
    if state.phase != SyncPhase::Ready || self.syncing.load(Ordering::SeqCst) || state.holds_local_work() {
      return false;
    }
    let products = match loaded {
      Ok(products) => products,
      Err(e) => {
        event!(Level::WARN, context = %self.context, error = %e, "Poll could not read storage; keeping current products.");
        state.degraded = true;
        return false;
      }
    };
    // Nothing persisted yet; the in-memory default catalog stays.
    if state.degraded && products.is_empty() {
      return false;
    }
    state.degraded = false;
    if state.products == products {
      return false;
    }
    event!(Level::DEBUG, context = %self.context, products = products.len(), "Poll replaced in-memory products.");
    state.products = products;
    true
  }

  fn can_replace(&self) -> bool {
    let state = self.state.read();
    state.phase == SyncPhase::Ready && !self.syncing.load(Ordering::SeqCst) && !state.holds_local_work()
  }

  fn apply_remote(&self, update: PropagatedUpdate) {
    let PropagatedUpdate { products, timestamp, via } = update;
    if !self.state.read().phase.accepts_commands() {
      event!(Level::TRACE, context = %self.context, ?via, "Ignoring update outside the ready phase.");
      return;
    }
    // The read cache always follows the newest remote list.
    self.store.prime_cache(&products, timestamp);

    let arrivals: Vec<String> = {
      let mut state = self.state.write();
      if self.syncing.load(Ordering::SeqCst) || state.holds_local_work() {
        event!(Level::DEBUG, context = %self.context, ?via, "Deferring remote update; local work in progress.");
        return;
      }
      if state.products == products {
        return;
      }
      let arrivals = products
        .iter()
        .filter(|p| !state.products.iter().any(|known| known.id == p.id))
        .map(|p| p.name.clone())
        .collect();
      event!(Level::DEBUG, context = %self.context, ?via, products = products.len(), "Applied remote update.");
      state.products = products;
      arrivals
    };

    for name in arrivals {
      self
        .notifier
        .notify(Notice::info("New product available", format!("{} was added to the store.", name)));
    }
  }
}

async fn poll_loop(inner: Weak<Inner>, period: Duration) {
  let mut ticker = tokio::time::interval(period);
  ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
  // The first tick completes immediately; init has just loaded.
  ticker.tick().await;
  loop {
    ticker.tick().await;
    let Some(inner) = inner.upgrade() else {
      break;
    };
    inner.refresh().await;
  }
}

fn failure_title(kind: &str) -> &'static str {
  match kind {
    "add_product" => "Could not add product",
    "remove" => "Could not remove product",
    "toggle_visibility" => "Could not change visibility",
    "set_stock" => "Could not update stock",
    _ => "Could not update product",
  }
}

fn success_notice(effect: &CommandEffect, snapshot: &[Product]) -> Notice {
  let name_of = |id: &ProductId| {
    snapshot
      .iter()
      .find(|p| p.id == *id)
      .map(|p| p.name.clone())
      .unwrap_or_else(|| id.to_string())
  };
  match effect {
    CommandEffect::Added(id) => Notice::success("Product added", format!("{} was added to the catalog.", name_of(id))),
    CommandEffect::Updated(id) => Notice::success("Product updated", format!("{} was updated.", name_of(id))),
    CommandEffect::VisibilityChanged { id, is_visible: true } => {
      Notice::success("Product shown", format!("{} is visible in the store again.", name_of(id)))
    }
    CommandEffect::VisibilityChanged { id, is_visible: false } => {
      Notice::success("Product hidden", format!("{} is hidden from the store.", name_of(id)))
    }
    CommandEffect::Removed(product) => {
      Notice::success("Product removed", format!("{} was removed from the catalog.", product.name))
    }
  }
}
