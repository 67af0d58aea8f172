// storefront_app/src/main.rs

// Declare modules for the application
mod config;
mod errors;
mod services;
mod state;

use crate::config::AppConfig;
use crate::errors::{AppError, Result as AppResult}; // Use the app's Result alias
use crate::state::AppState;

use mercado::catalog::{categories, filter_by_category, search};
use mercado::order::{find_zone, Cart, CustomerInfo, OrderMessage};
use mercado::{AuthorizationGate, CommandEffect, Contact, ProductDraft, ProductPatch, SyncCoordinator};
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan; // For span events in tracing

#[tokio::main]
async fn main() -> AppResult<()> {
  // Initialize tracing subscriber for logging
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO) // Default level
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()) // Allow RUST_LOG override
    .with_span_events(FmtSpan::CLOSE) // Log when spans close, showing duration
    .init();

  tracing::info!("Starting storefront walkthrough...");

  let app_config = match AppConfig::from_env() {
    Ok(cfg) => Arc::new(cfg),
    Err(e) => {
      tracing::error!(error = %e, "Failed to load application configuration.");
      return Err(e);
    }
  };
  let app_state = AppState::new(app_config.clone())?;

  // Two windows on the same origin: a shopper and an admin.
  let storefront = app_state.open_context(None)?;
  let gate: Arc<dyn AuthorizationGate> = app_state.admin_session.clone();
  let admin = app_state.open_context(Some(gate))?;
  storefront.init().await?;
  admin.init().await?;
  tracing::info!(
    storefront = %storefront.context_id(),
    admin = %admin.context_id(),
    products = storefront.products().len(),
    "Contexts ready."
  );

  let result = walkthrough(&app_state, &storefront, &admin).await;

  storefront.teardown();
  admin.teardown();
  app_state.admin_session.logout();
  result
}

async fn walkthrough(app_state: &AppState, storefront: &SyncCoordinator, admin: &SyncCoordinator) -> AppResult<()> {
  // --- Admin login ---
  if !app_state.admin_session.login(&app_state.config.admin_password) {
    return Err(AppError::Auth("admin login was rejected".to_string()));
  }

  // --- Add a product; the storefront picks it up through propagation ---
  let draft = ProductDraft {
    name: "Queso gouda 1lb".to_string(),
    description: "Queso importado, corte fresco".to_string(),
    category: "Alimentos".to_string(),
    location: "Camagüey".to_string(),
    price: 1_100.0,
    discount: 5,
    images: vec!["/images/queso.jpg".to_string()],
    stock: 4,
    publish_date: Some(chrono::Utc::now().format("%Y-%m-%d").to_string()),
    seller_name: "Yudith Pérez".to_string(),
    seller_avatar: String::new(),
    seller_member_since: "2023".to_string(),
    contact: Contact::Whatsapp {
      number: "+5352110001".to_string(),
    },
  };
  let added = admin.add_product(draft).await?;
  let new_id = match &added.effect {
    CommandEffect::Added(id) => id.clone(),
    other => return Err(AppError::Internal(format!("unexpected effect {:?}", other))),
  };
  tracing::info!(
    product = %new_id,
    persisted = added.persisted,
    seen_by_storefront = storefront.product(&new_id).is_some(),
    "Product added."
  );

  // --- Batch stock edit, then save ---
  admin.update_stock(&new_id, 1)?;
  let sold_out = admin.products()[0].id.clone();
  admin.update_stock(&sold_out, 0)?;
  admin.save_stock_changes().await?;
  let badge = SyncCoordinator::stock_status(1);
  tracing::info!(label = %badge.label, severity = ?badge.severity, "Stock badge for the new product.");

  // --- Visibility and field edits ---
  if let Err(e) = admin.toggle_product_visibility(&sold_out).await {
    tracing::info!(error = %e, "Sold-out products cannot be shown.");
  }
  admin
    .update_product(
      &new_id,
      ProductPatch {
        price: Some(1_050.0),
        ..Default::default()
      },
    )
    .await?;

  // --- Anyone may force a sync ---
  storefront.sync_products().await?;
  tracing::info!(last_sync = storefront.sync_status().last_sync, "Storefront synchronized.");

  // --- Browsing ---
  let visible = storefront.visible_products();
  tracing::info!(categories = ?categories(&visible), "Categories on display.");
  let food = filter_by_category(&visible, Some("Alimentos"));
  let hits = search(&visible, "queso");
  tracing::info!(food = food.len(), hits = hits.len(), "Browsing results.");

  // --- Checkout ---
  let mut cart = Cart::new();
  for product in hits.iter().chain(food.iter()).take(2) {
    if let Err(e) = cart.add_item(product, 1) {
      tracing::warn!(error = %e, product = %product.id, "Could not add to cart.");
    }
  }
  let product = storefront
    .product(&new_id)
    .ok_or_else(|| AppError::NotFound(new_id.to_string()))?;
  tracing::info!(stock = product.stock, in_cart = cart.item_count(), "Cart ready.");

  let customer = CustomerInfo {
    name: "Marta Díaz".to_string(),
    phone: "+5355501234".to_string(),
    address: "Calle Cisneros 112".to_string(),
    notes: String::new(),
  };
  let handoff_config = app_state.config.handoff_config();
  let zone = find_zone("la-caridad");
  let message = OrderMessage::compose(&cart, &customer, zone, &handoff_config)?;
  let receipt = services::order_handoff::open_order_link(&message, &handoff_config).await?;
  let receipt_json = serde_json::to_string(&receipt).map_err(|e| AppError::Internal(e.to_string()))?;
  tracing::info!(handoff = %receipt.handoff_id, receipt = %receipt_json, "Order handed off.");

  // --- Clean up the demo product ---
  admin.remove_product(&new_id).await?;
  Ok(())
}
