// mercado/examples/two_tabs.rs

use mercado::{CommandEffect, MercadoResult, Origin, ProductDraft, SyncConfig, SyncCoordinator};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> MercadoResult<()> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Two Tabs Example ---");

  // 1. One origin shared by two execution contexts.
  let origin = Arc::new(Origin::in_memory());
  let open_tab = || {
    SyncCoordinator::builder()
      .origin(origin.clone())
      .config(SyncConfig::default())
      .build()
  };
  let admin = open_tab()?;
  let shopper = open_tab()?;

  // 2. The first tab seeds the catalog; the second loads it.
  admin.init().await?;
  shopper.init().await?;
  info!(
    admin = admin.products().len(),
    shopper = shopper.products().len(),
    "Both tabs ready."
  );

  // 3. The admin adds a product; the shopper sees it without reloading.
  let draft: ProductDraft = serde_json::from_value(serde_json::json!({
    "name": "Picadillo de res 1lb",
    "category": "Alimentos",
    "price": 650,
    "images": ["/images/picadillo.jpg"],
    "stock": 2,
    "contactType": "whatsapp",
    "contactNumber": "+5352110009"
  }))?;
  let outcome = admin.add_product(draft).await?;
  if let CommandEffect::Added(id) = &outcome.effect {
    let seen = shopper.product(id);
    info!(found = seen.is_some(), "Shopper looked up the new product.");
    if let Some(product) = seen {
      info!(status = %SyncCoordinator::stock_status(product.stock).label, "Stock badge.");
    }
  }

  // 4. Stock edits stay local until saved.
  let first = admin.products()[0].id.clone();
  admin.update_stock(&first, 0)?;
  info!(pending = admin.has_pending_stock_changes(), "Edited stock locally.");
  admin.save_stock_changes().await?;
  info!(
    visible = shopper.visible_products().len(),
    total = shopper.products().len(),
    "Shopper after the stock save."
  );

  Ok(())
}
