// mercado/examples/checkout.rs

use mercado::order::{find_zone, Cart, CustomerInfo, OrderMessage};
use mercado::{HandoffConfig, MercadoError, MercadoResult, Origin, SyncCoordinator};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> MercadoResult<()> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Checkout Example ---");

  let storefront = SyncCoordinator::builder()
    .origin(Arc::new(Origin::in_memory()))
    .build()?;
  storefront.init().await?;

  // Fill a cart from what the storefront shows.
  let mut cart = Cart::new();
  for product in storefront.visible_products().iter().take(3) {
    cart.add_item(product, 1)?;
  }
  info!(items = cart.item_count(), subtotal = cart.subtotal(), "Cart filled.");

  let customer = CustomerInfo {
    name: "Marta Díaz".to_string(),
    phone: "+5355501234".to_string(),
    address: "Calle Cisneros 112".to_string(),
    notes: "Call before arriving".to_string(),
  };
  let config = HandoffConfig::default();
  let zone = find_zone("la-caridad")
    .ok_or_else(|| MercadoError::Configuration("unknown delivery zone".to_string()))?;

  let message = OrderMessage::compose(&cart, &customer, Some(zone), &config)?;
  println!("{}", message.text());
  info!(total = message.total(), link = %message.whatsapp_link(&config)?, "Order ready to hand off.");

  Ok(())
}
