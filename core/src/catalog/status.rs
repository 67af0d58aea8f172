// mercado/src/catalog/status.rs

use crate::model::{StockSeverity, StockStatus};

/// Classifies a stock quantity for display. Depends on nothing but `stock`.
pub fn stock_status(stock: u32) -> StockStatus {
  match stock {
    0 => StockStatus {
      label: "Out of stock".to_string(),
      severity: StockSeverity::Critical,
    },
    1..=2 => StockStatus {
      label: format!("Only {} left", stock),
      severity: StockSeverity::Warning,
    },
    _ => StockStatus {
      label: "Available".to_string(),
      severity: StockSeverity::Normal,
    },
  }
}
