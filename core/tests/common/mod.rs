// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use mercado::{
  Clock, Contact, KeyValueStorage, ManualClock, MemoryStorage, MercadoError, MercadoResult, Notice, NoticeLevel,
  Notifier, Origin, ProductDraft, SyncConfig, SyncCoordinator,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;

pub const START_MILLIS: i64 = 1_700_000_000_000;

// --- Notifier that remembers everything it was asked to show ---
#[derive(Default)]
pub struct RecordingNotifier {
  notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
  pub fn notices(&self) -> Vec<Notice> {
    self.notices.lock().clone()
  }

  pub fn titles(&self) -> Vec<String> {
    self.notices.lock().iter().map(|n| n.title.clone()).collect()
  }

  pub fn count(&self, level: NoticeLevel) -> usize {
    self.notices.lock().iter().filter(|n| n.level == level).count()
  }

  pub fn clear(&self) {
    self.notices.lock().clear();
  }
}

impl Notifier for RecordingNotifier {
  fn notify(&self, notice: Notice) {
    self.notices.lock().push(notice);
  }
}

// --- Storage that can be switched to fail every call ---
#[derive(Default)]
pub struct FlakyStorage {
  inner: MemoryStorage,
  failing: AtomicBool,
}

impl FlakyStorage {
  pub fn failing() -> Self {
    let storage = Self::default();
    storage.set_failing(true);
    storage
  }

  pub fn set_failing(&self, failing: bool) {
    self.failing.store(failing, Ordering::SeqCst);
  }

  fn check(&self, key: &str) -> MercadoResult<()> {
    if self.failing.load(Ordering::SeqCst) {
      return Err(MercadoError::Storage {
        key: key.to_string(),
        source: anyhow::anyhow!("storage unavailable"),
      });
    }
    Ok(())
  }
}

impl KeyValueStorage for FlakyStorage {
  fn get_item(&self, key: &str) -> MercadoResult<Option<String>> {
    self.check(key)?;
    self.inner.get_item(key)
  }

  fn set_item(&self, key: &str, value: &str) -> MercadoResult<()> {
    self.check(key)?;
    self.inner.set_item(key, value)
  }

  fn remove_item(&self, key: &str) -> MercadoResult<()> {
    self.check(key)?;
    self.inner.remove_item(key)
  }
}

// --- Fixtures ---
pub fn test_config() -> SyncConfig {
  SyncConfig {
    // Tests drive polling through `refresh()`.
    poll_interval: Duration::ZERO,
    ..SyncConfig::default()
  }
}

pub fn draft(name: &str, stock: u32) -> ProductDraft {
  ProductDraft {
    name: name.to_string(),
    description: format!("{} for testing", name),
    category: "Alimentos".to_string(),
    location: "Camagüey".to_string(),
    price: 250.0,
    discount: 0,
    images: vec![format!("/images/{}.jpg", name.to_lowercase().replace(' ', "-"))],
    stock,
    publish_date: None,
    seller_name: "Test Seller".to_string(),
    seller_avatar: String::new(),
    seller_member_since: "2024".to_string(),
    contact: Contact::Whatsapp {
      number: "+5350000000".to_string(),
    },
  }
}

/// One origin with a shared manual clock; each `open_tab` is a new context.
pub struct Harness {
  pub origin: Arc<Origin>,
  pub clock: Arc<ManualClock>,
  pub config: SyncConfig,
}

impl Harness {
  pub fn new() -> Self {
    Self::with_origin(Origin::in_memory())
  }

  pub fn with_origin(origin: Origin) -> Self {
    Self {
      origin: Arc::new(origin),
      clock: Arc::new(ManualClock::new(START_MILLIS)),
      config: test_config(),
    }
  }

  pub fn open_tab(&self) -> (SyncCoordinator, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::default());
    let clock: Arc<dyn Clock> = self.clock.clone();
    let coordinator = SyncCoordinator::builder()
      .origin(self.origin.clone())
      .clock(clock)
      .notifier(notifier.clone())
      .config(self.config.clone())
      .build()
      .expect("coordinator builds");
    (coordinator, notifier)
  }

  pub async fn open_ready_tab(&self) -> (SyncCoordinator, Arc<RecordingNotifier>) {
    let (coordinator, notifier) = self.open_tab();
    coordinator.init().await.expect("init succeeds");
    notifier.clear();
    (coordinator, notifier)
  }

  pub fn tick(&self) {
    self.clock.advance(Duration::from_millis(1));
  }
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
