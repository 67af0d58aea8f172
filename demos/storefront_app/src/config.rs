// storefront_app/src/config.rs

use crate::errors::{AppError, Result}; // Use AppError specific Result
use dotenvy::dotenv;
use mercado::{HandoffConfig, SyncConfig};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AppConfig {
  /// Directory backing the origin's key-value storage.
  pub data_dir: PathBuf,
  pub poll_interval: Duration,
  pub freshness_window: Duration,
  pub simulated_latency: Duration,
  pub admin_password: String,
  pub whatsapp_number: String,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| AppError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };
    let millis = |var_name: &str, default: u64| -> Result<Duration> {
      match get_env(var_name) {
        Ok(raw) => raw
          .parse::<u64>()
          .map(Duration::from_millis)
          .map_err(|e| AppError::Config(format!("Invalid {}: {}", var_name, e))),
        Err(_) => Ok(Duration::from_millis(default)),
      }
    };

    let data_dir = PathBuf::from(get_env("STOREFRONT_DATA_DIR").unwrap_or_else(|_| "./storefront-data".to_string()));
    let poll_interval = millis("POLL_INTERVAL_MS", 3_000)?;
    let freshness_window = millis("FRESHNESS_WINDOW_MS", 30_000)?;
    let simulated_latency = millis("SIMULATED_LATENCY_MS", 0)?;
    let admin_password = get_env("ADMIN_PASSWORD").unwrap_or_else(|_| "oigres".to_string());
    let whatsapp_number = get_env("WHATSAPP_NUMBER").unwrap_or_else(|_| HandoffConfig::default().whatsapp_number);

    tracing::info!(data_dir = %data_dir.display(), "Application configuration loaded successfully.");

    Ok(Self {
      data_dir,
      poll_interval,
      freshness_window,
      simulated_latency,
      admin_password,
      whatsapp_number,
    })
  }

  pub fn sync_config(&self) -> SyncConfig {
    SyncConfig {
      poll_interval: self.poll_interval,
      freshness_window: self.freshness_window,
      simulated_latency: self.simulated_latency,
      ..SyncConfig::default()
    }
  }

  pub fn handoff_config(&self) -> HandoffConfig {
    HandoffConfig {
      whatsapp_number: self.whatsapp_number.clone(),
      ..HandoffConfig::default()
    }
  }
}
