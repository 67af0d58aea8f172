// tests/coordinator_tests.rs
mod common;

use common::*;
use mercado::{
  AdminSession, CatalogStore, Clock, CommandEffect, KeyValueStorage, LocalProductStore, MemoryStorage, MercadoError,
  NoticeLevel, Origin, OriginPropagator, ProductId, ProductPatch, StockSeverity, SyncConfig, SyncCoordinator,
  SyncPhase,
};
use serial_test::serial;
use std::sync::Arc;
use std::time::Duration;

fn persisted_document(h: &Harness) -> Option<String> {
  h.origin.storage().get_item(&h.config.storage_key).unwrap()
}

#[tokio::test]
#[serial]
async fn test_init_seeds_and_persists_default_catalog_when_empty() {
  setup_tracing();
  let h = Harness::new();
  assert!(persisted_document(&h).is_none());

  let (tab, _notices) = h.open_tab();
  assert_eq!(tab.phase(), SyncPhase::Uninitialized);
  tab.init().await.unwrap();

  assert_eq!(tab.phase(), SyncPhase::Ready);
  assert!(!tab.is_degraded());
  let products = tab.products();
  assert!(!products.is_empty());
  for p in &products {
    assert!((1..=20).contains(&p.stock), "{} has stock {}", p.id, p.stock);
    assert!(p.is_visible);
    assert!(!p.images.is_empty());
  }
  assert!(persisted_document(&h).is_some());
}

#[tokio::test]
#[serial]
async fn test_init_twice_is_rejected() {
  setup_tracing();
  let h = Harness::new();
  let (tab, _notices) = h.open_ready_tab().await;
  let err = tab.init().await.unwrap_err();
  assert!(matches!(err, MercadoError::InvalidPhase { .. }));
}

#[tokio::test]
#[serial]
async fn test_second_context_loads_existing_snapshot() {
  setup_tracing();
  let h = Harness::new();
  let (a, _) = h.open_ready_tab().await;
  let (b, _) = h.open_ready_tab().await;
  assert_eq!(a.products(), b.products());
}

#[tokio::test]
#[serial]
async fn test_add_product_appends_visible_product_with_mirrored_image() {
  setup_tracing();
  let h = Harness::new();
  let (tab, notices) = h.open_ready_tab().await;
  let before = tab.products().len();
  h.tick();

  let mut new_draft = draft("Malta Bucanero", 5);
  new_draft.images = vec!["a.jpg".to_string()];
  let outcome = tab.add_product(new_draft).await.unwrap();
  assert!(outcome.persisted);

  let CommandEffect::Added(id) = outcome.effect else {
    panic!("expected an Added effect, got {:?}", outcome.effect);
  };
  let product = tab.product(&id).unwrap();
  assert!(product.is_visible);
  assert_eq!(product.image, "a.jpg");
  assert_eq!(product.created_at, h.clock.now_millis());
  assert_eq!(tab.products().len(), before + 1);
  assert_eq!(notices.titles(), vec!["Product added".to_string()]);
  assert!(!tab.is_syncing());
  assert_eq!(tab.phase(), SyncPhase::Ready);
}

#[tokio::test]
#[serial]
async fn test_add_product_with_same_timestamp_gets_distinct_ids() {
  setup_tracing();
  let h = Harness::new();
  let (tab, _) = h.open_ready_tab().await;
  let first = tab.add_product(draft("Uno", 1)).await.unwrap();
  let second = tab.add_product(draft("Dos", 1)).await.unwrap();
  assert_ne!(first.effect.product_id(), second.effect.product_id());
}

#[tokio::test]
#[serial]
async fn test_add_product_without_images_is_rejected_and_reported() {
  setup_tracing();
  let h = Harness::new();
  let (tab, notices) = h.open_ready_tab().await;
  let before = tab.products();

  let mut bad = draft("Sin foto", 3);
  bad.images.clear();
  let err = tab.add_product(bad).await.unwrap_err();
  assert!(matches!(err, MercadoError::InvalidProduct { .. }));
  assert_eq!(tab.products(), before);
  assert_eq!(notices.count(NoticeLevel::Error), 1);
}

#[tokio::test]
#[serial]
async fn test_update_stock_is_local_until_saved() {
  setup_tracing();
  let h = Harness::new();
  let (tab, _) = h.open_ready_tab().await;
  let added = tab.add_product(draft("Arroz 1kg", 5)).await.unwrap();
  let id = added.effect.product_id().clone();
  let document_before = persisted_document(&h);

  tab.update_stock(&id, 0).unwrap();
  let product = tab.product(&id).unwrap();
  assert_eq!(product.stock, 0);
  assert!(!product.is_visible);
  assert!(tab.visible_products().iter().all(|p| p.id != id));
  assert!(tab.has_pending_stock_changes());
  assert_eq!(persisted_document(&h), document_before);

  h.tick();
  assert!(tab.save_stock_changes().await.unwrap());
  assert!(!tab.has_pending_stock_changes());
  assert_ne!(persisted_document(&h), document_before);
  assert!(persisted_document(&h).unwrap().contains("\"stock\":0"));
}

#[tokio::test]
#[serial]
async fn test_update_product_with_stock_overrides_manual_visibility() {
  setup_tracing();
  let h = Harness::new();
  let (tab, _) = h.open_ready_tab().await;
  let id = tab.add_product(draft("Galletas", 4)).await.unwrap().effect.product_id().clone();

  let toggled = tab.toggle_product_visibility(&id).await.unwrap();
  assert_eq!(toggled.effect, CommandEffect::VisibilityChanged { id: id.clone(), is_visible: false });

  let patch = ProductPatch {
    stock: Some(9),
    price: Some(300.0),
    ..Default::default()
  };
  tab.update_product(&id, patch).await.unwrap();
  let product = tab.product(&id).unwrap();
  assert_eq!(product.stock, 9);
  assert_eq!(product.price, 300.0);
  assert!(product.is_visible);
}

#[tokio::test]
#[serial]
async fn test_update_product_images_mirrors_primary() {
  setup_tracing();
  let h = Harness::new();
  let (tab, _) = h.open_ready_tab().await;
  let id = tab.add_product(draft("Ron Añejo", 2)).await.unwrap().effect.product_id().clone();

  tab
    .update_product_images(&id, vec!["b.jpg".to_string(), "c.jpg".to_string()])
    .await
    .unwrap();
  let product = tab.product(&id).unwrap();
  assert_eq!(product.image, "b.jpg");
  assert_eq!(product.images.len(), 2);

  let err = tab.update_product_images(&id, Vec::new()).await.unwrap_err();
  assert!(matches!(err, MercadoError::InvalidProduct { .. }));
  assert_eq!(tab.product(&id).unwrap().image, "b.jpg");
}

#[tokio::test]
#[serial]
async fn test_toggle_on_zero_stock_is_rejected_and_state_unchanged() {
  setup_tracing();
  let h = Harness::new();
  let (tab, notices) = h.open_ready_tab().await;
  let id = tab.add_product(draft("Agotado", 0)).await.unwrap().effect.product_id().clone();
  assert!(!tab.product(&id).unwrap().is_visible);
  let before = tab.products();
  notices.clear();

  let err = tab.toggle_product_visibility(&id).await.unwrap_err();
  assert!(matches!(err, MercadoError::OutOfStock { .. }));
  assert_eq!(tab.products(), before);
  assert!(!tab.product(&id).unwrap().is_visible);
  assert_eq!(notices.count(NoticeLevel::Error), 1);
}

#[tokio::test]
#[serial]
async fn test_unknown_id_is_reported_not_ignored() {
  setup_tracing();
  let h = Harness::new();
  let (tab, notices) = h.open_ready_tab().await;
  let before = tab.products();
  let ghost = ProductId::from("does-not-exist");

  assert!(matches!(
    tab.remove_product(&ghost).await,
    Err(MercadoError::ProductNotFound { .. })
  ));
  assert!(matches!(
    tab.update_product(&ghost, ProductPatch::default()).await,
    Err(MercadoError::ProductNotFound { .. })
  ));
  assert!(matches!(tab.update_stock(&ghost, 3), Err(MercadoError::ProductNotFound { .. })));
  assert_eq!(tab.products(), before);
  assert!(!tab.has_pending_stock_changes());
  assert_eq!(notices.count(NoticeLevel::Error), 3);
}

#[tokio::test]
#[serial]
async fn test_stock_status_classification() {
  let two = SyncCoordinator::stock_status(2);
  assert!(two.label.contains('2'));
  assert_eq!(two.severity, StockSeverity::Warning);

  let zero = SyncCoordinator::stock_status(0);
  assert_eq!(zero.label, "Out of stock");
  assert_eq!(zero.severity, StockSeverity::Critical);
}

#[tokio::test]
#[serial]
async fn test_two_contexts_converge_last_write_wins() {
  setup_tracing();
  let h = Harness::new();
  let (a, a_notices) = h.open_ready_tab().await;
  let (b, b_notices) = h.open_ready_tab().await;
  assert_eq!(a.products(), b.products());
  let y = a.products()[0].id.clone();

  h.tick();
  let x = a.add_product(draft("Producto X", 7)).await.unwrap().effect.product_id().clone();
  assert!(b.product(&x).is_some(), "B should receive X through propagation");
  assert!(b_notices.titles().contains(&"New product available".to_string()));

  h.tick();
  b.remove_product(&y).await.unwrap();
  a.refresh().await;
  assert!(a.product(&x).is_some());
  assert!(a.product(&y).is_none());
  assert_eq!(a.products(), b.products());
  assert!(a_notices.titles().iter().all(|t| t != "New product available"));
}

#[tokio::test]
#[serial]
async fn test_contexts_converge_without_broadcast_channel() {
  setup_tracing();
  let h = Harness::with_origin(Origin::without_broadcast_channel(Arc::new(MemoryStorage::new())));
  let (a, _) = h.open_ready_tab().await;
  let (b, _) = h.open_ready_tab().await;

  h.tick();
  let x = a.add_product(draft("Solo storage", 3)).await.unwrap().effect.product_id().clone();
  assert!(b.product(&x).is_some());
}

#[tokio::test]
#[serial]
async fn test_poll_picks_up_changes_missed_by_propagation() {
  setup_tracing();
  let h = Harness::new();
  let (a, _) = h.open_ready_tab().await;

  // A writer that publishes nowhere the coordinator listens.
  let silent_origin = Arc::new(Origin::new(h.origin.storage()));
  let clock: Arc<dyn Clock> = h.clock.clone();
  let silent_store = LocalProductStore::new(
    h.origin.storage(),
    Arc::new(OriginPropagator::new(silent_origin, Default::default(), &h.config)),
    clock,
    Arc::new(h.config.clone()),
  );
  let mut products = a.products();
  products.truncate(1);

  // Inside the freshness window the primed cache still wins.
  h.tick();
  assert!(silent_store.save(&products).await);
  assert!(!a.refresh().await);

  h.clock.advance(h.config.freshness_window);
  assert!(a.refresh().await);
  assert_eq!(a.products(), products);
}

#[tokio::test]
#[serial]
async fn test_pending_stock_edits_defer_remote_replacement() {
  setup_tracing();
  let h = Harness::new();
  let (a, _) = h.open_ready_tab().await;
  let (b, _) = h.open_ready_tab().await;
  let target = b.products()[0].id.clone();

  b.update_stock(&target, 0).unwrap();
  h.tick();
  let x = a.add_product(draft("Mientras editas", 2)).await.unwrap().effect.product_id().clone();

  assert!(b.product(&x).is_none(), "pending edits must not be overwritten");
  assert_eq!(b.product(&target).unwrap().stock, 0);
  assert!(!b.refresh().await);

  h.tick();
  assert!(b.save_stock_changes().await.unwrap());
  // Last write wins: B's save does not contain X.
  assert!(a.product(&x).is_none());
}

#[tokio::test]
#[serial]
async fn test_sync_products_rebroadcasts_and_replaces() {
  setup_tracing();
  let h = Harness::new();
  let (a, a_notices) = h.open_ready_tab().await;
  let (b, _) = h.open_ready_tab().await;
  let target = b.products()[0].id.clone();
  b.update_stock(&target, 0).unwrap();

  h.tick();
  assert!(a.sync_products().await.unwrap());
  assert!(a_notices.titles().contains(&"Synchronized".to_string()));
  assert!(!a.is_syncing());

  h.tick();
  assert!(b.sync_products().await.unwrap());
  assert!(!b.has_pending_stock_changes());
  assert_eq!(a.products(), b.products());
}

#[tokio::test]
#[serial]
async fn test_unreadable_storage_starts_degraded_with_default_catalog() {
  setup_tracing();
  let storage = Arc::new(FlakyStorage::failing());
  let h = Harness::with_origin(Origin::new(storage.clone()));
  let (tab, notices) = h.open_tab();

  tab.init().await.unwrap();
  assert_eq!(tab.phase(), SyncPhase::Ready);
  assert!(tab.is_degraded());
  assert!(!tab.products().is_empty());
  assert_eq!(notices.count(NoticeLevel::Warning), 1);

  // Writes are still attempted; they report local-only while storage is down.
  let outcome = tab.add_product(draft("Local", 1)).await.unwrap();
  assert!(!outcome.persisted);
  assert!(notices.titles().contains(&"Saved locally only".to_string()));
  let kept = tab.products();
  assert!(!tab.refresh().await);
  assert_eq!(tab.products(), kept);

  storage.set_failing(false);
  h.tick();
  assert!(tab.save_stock_changes().await.unwrap());
  assert!(!tab.is_degraded());
}

#[tokio::test]
#[serial]
async fn test_unsaved_mutation_survives_poll_until_saved() {
  setup_tracing();
  let h = Harness::with_origin(Origin::new(Arc::new(MemoryStorage::with_quota(20_000))));
  let (tab, notices) = h.open_ready_tab().await;
  let before = tab.products().len();

  let mut oversized = draft("Foto grande", 3);
  oversized.images = vec![format!("data:image/png;base64,{}", "A".repeat(30_000))];
  let outcome = tab.add_product(oversized).await.unwrap();
  let new_id = match &outcome.effect {
    CommandEffect::Added(id) => id.clone(),
    other => panic!("unexpected effect {:?}", other),
  };
  assert!(!outcome.persisted);
  assert_eq!(notices.titles(), vec!["Saved locally only".to_string()]);
  assert!(tab.is_degraded());
  assert_eq!(tab.products().len(), before + 1);

  h.tick();
  assert!(!tab.refresh().await);
  assert_eq!(tab.products().len(), before + 1);
  assert!(tab.product(&new_id).is_some());

  // Dropping the oversized product brings the list back under quota.
  let outcome = tab.remove_product(&new_id).await.unwrap();
  assert!(outcome.persisted);
  assert!(!tab.is_degraded());
  assert_eq!(tab.products().len(), before);
}

#[tokio::test]
#[serial]
async fn test_transient_read_failure_keeps_current_products() {
  setup_tracing();
  let storage = Arc::new(FlakyStorage::default());
  let h = Harness::with_origin(Origin::new(storage.clone()));
  let (tab, _) = h.open_ready_tab().await;
  let before = tab.products();
  assert!(!before.is_empty());

  storage.set_failing(true);
  h.tick();
  assert!(!tab.refresh().await);
  assert_eq!(tab.products(), before);
  assert!(tab.is_degraded());

  storage.set_failing(false);
  h.tick();
  assert!(!tab.refresh().await);
  assert_eq!(tab.products(), before);
  assert!(!tab.is_degraded());
}

#[tokio::test]
#[serial]
async fn test_corrupt_snapshot_is_treated_as_missing() {
  setup_tracing();
  let h = Harness::new();
  h.origin.storage().set_item(&h.config.storage_key, "{not json").unwrap();

  let (tab, _) = h.open_tab();
  tab.init().await.unwrap();
  assert!(!tab.is_degraded());
  assert!(!tab.products().is_empty());
  let document = persisted_document(&h).unwrap();
  assert!(document.contains("\"version\":1"));
}

#[tokio::test]
#[serial]
async fn test_admin_gate_blocks_mutations_without_session() {
  setup_tracing();
  let h = Harness::new();
  let clock: Arc<dyn Clock> = h.clock.clone();
  let session = Arc::new(AdminSession::new(h.origin.storage(), clock.clone(), "oigres"));
  let notifier = Arc::new(RecordingNotifier::default());
  let tab = SyncCoordinator::builder()
    .origin(h.origin.clone())
    .clock(clock)
    .gate(session.clone())
    .notifier(notifier.clone())
    .config(h.config.clone())
    .build()
    .unwrap();
  tab.init().await.unwrap();

  let err = tab.add_product(draft("Intruso", 1)).await.unwrap_err();
  assert!(matches!(err, MercadoError::Unauthorized));
  assert!(notifier.titles().contains(&"Not authorized".to_string()));

  // Force sync is open to everyone.
  assert!(tab.sync_products().await.unwrap());

  assert!(session.login("oigres"));
  assert!(tab.add_product(draft("Admin", 1)).await.is_ok());

  h.clock.advance(Duration::from_secs(60 * 60));
  assert!(matches!(
    tab.add_product(draft("Expirado", 1)).await,
    Err(MercadoError::Unauthorized)
  ));
}

#[tokio::test]
#[serial]
async fn test_concurrent_mutations_are_applied_in_order() {
  setup_tracing();
  let h = Harness {
    config: SyncConfig {
      simulated_latency: Duration::from_millis(20),
      ..test_config()
    },
    ..Harness::new()
  };
  let (tab, _) = h.open_ready_tab().await;
  let tab = Arc::new(tab);
  let before = tab.products().len();

  let mut handles = Vec::new();
  for i in 0..5u32 {
    let tab = tab.clone();
    handles.push(tokio::spawn(async move {
      tab.add_product(draft(&format!("Lote {}", i), i + 1)).await
    }));
  }
  for handle in handles {
    assert!(handle.await.unwrap().unwrap().persisted);
  }

  let products = tab.products();
  assert_eq!(products.len(), before + 5);
  let names: Vec<_> = products[before..].iter().map(|p| p.name.clone()).collect();
  let expected: Vec<_> = (0..5).map(|i| format!("Lote {}", i)).collect();
  assert_eq!(names, expected);
  assert!(!tab.is_syncing());
}

#[tokio::test]
#[serial]
async fn test_teardown_stops_receiving_updates() {
  setup_tracing();
  let h = Harness::new();
  let (a, _) = h.open_ready_tab().await;
  let (b, _) = h.open_ready_tab().await;
  let before = b.products();

  b.teardown();
  assert_eq!(b.phase(), SyncPhase::Closed);
  h.tick();
  a.add_product(draft("Tarde", 2)).await.unwrap();
  assert_eq!(b.products(), before);
  assert!(matches!(
    b.add_product(draft("Cerrado", 1)).await,
    Err(MercadoError::InvalidPhase { .. })
  ));
  // Idempotent.
  b.teardown();
}

#[tokio::test(start_paused = true)]
#[serial]
async fn test_background_poll_replaces_stale_list() {
  setup_tracing();
  let mut h = Harness::new();
  h.config.poll_interval = Duration::from_secs(3);
  let (a, _) = h.open_ready_tab().await;

  let storage = h.origin.storage();
  let mut products = a.products();
  products.truncate(2);
  let raw = serde_json::json!({
    "products": products,
    "lastUpdated": h.clock.now_millis(),
    "version": 1,
  })
  .to_string();
  storage.set_item(&h.config.storage_key, &raw).unwrap();
  h.clock.advance(h.config.freshness_window);

  tokio::time::sleep(Duration::from_secs(4)).await;
  assert_eq!(a.products(), products);
}
