// storefront_app/src/services/order_handoff.rs
use crate::errors::{AppError, Result as AppResult}; // Using AppResult
use mercado::order::OrderMessage;
use mercado::HandoffConfig;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Serialize)]
pub struct HandoffReceipt {
  pub link: String,
  pub total: f64,
  pub preview: String, // First N chars of the message
  pub handoff_id: String,
}

/// Stands in for opening the messaging deep link in a browser window.
pub async fn open_order_link(message: &OrderMessage, config: &HandoffConfig) -> AppResult<HandoffReceipt> {
  let link = message.whatsapp_link(config)?;
  info!(host = link.host_str().unwrap_or_default(), total = message.total(), "Simulating opening order link.");
  tokio::time::sleep(std::time::Duration::from_millis(20)).await; // Simulate the window opening

  if link.as_str().len() > 8_192 {
    tracing::warn!(length = link.as_str().len(), "Order link is too long to open.");
    return Err(AppError::Handoff("order message is too long for a deep link".to_string()));
  }

  let preview = message.text().chars().take(50).collect::<String>() + "...";
  let handoff_id = format!("handoff_{}", uuid::Uuid::new_v4());
  info!("Order link opened. Handoff ID: {}", handoff_id);

  Ok(HandoffReceipt {
    link: link.to_string(),
    total: message.total(),
    preview,
    handoff_id,
  })
}
