// mercado/src/config.rs

//! Tunables for the snapshot store, the sync coordinator and the order handoff.

use std::time::Duration;

/// Settings shared by the store, the propagator and the coordinator of one origin.
#[derive(Debug, Clone)]
pub struct SyncConfig {
  /// Key of the persisted catalog snapshot document.
  pub storage_key: String,
  /// Key of the stringified `lastUpdated` marker.
  pub sync_key: String,
  /// Name of the origin-scoped broadcast channel.
  pub channel_name: String,
  /// How long a populated read cache is trusted after the last sync marker.
  pub freshness_window: Duration,
  pub poll_interval: Duration,
  pub snapshot_version: u32,
  /// Artificial delay after each successful save. Zero disables it.
  pub simulated_latency: Duration,
}

impl Default for SyncConfig {
  fn default() -> Self {
    Self {
      storage_key: "tumercao_products".to_string(),
      sync_key: "tumercao_sync_timestamp".to_string(),
      channel_name: "tumercao_product_sync".to_string(),
      freshness_window: Duration::from_secs(30),
      poll_interval: Duration::from_secs(3),
      snapshot_version: 1,
      simulated_latency: Duration::ZERO,
    }
  }
}

/// Presentation settings for the order message handed to the messaging deep link.
#[derive(Debug, Clone)]
pub struct HandoffConfig {
  pub store_name: String,
  pub currency_label: String,
  pub whatsapp_number: String,
}

impl Default for HandoffConfig {
  fn default() -> Self {
    Self {
      store_name: "tuMercao".to_string(),
      currency_label: "CUP".to_string(),
      whatsapp_number: "+58850138".to_string(),
    }
  }
}
