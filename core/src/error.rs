// mercado/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MercadoError {
  #[error("Product not found: {id}")]
  ProductNotFound { id: String },

  #[error("Product '{id}' is out of stock; its visibility cannot be toggled")]
  OutOfStock { id: String },

  #[error("Invalid product: {message}")]
  InvalidProduct { message: String },

  #[error("Cart error: {message}")]
  Cart { message: String },

  #[error("Order is incomplete: {message}")]
  IncompleteOrder { message: String },

  #[error("Caller is not an authorized admin")]
  Unauthorized,

  #[error("Operation '{operation}' is not allowed while the coordinator is {phase}")]
  InvalidPhase { operation: String, phase: String },

  #[error("Storage quota exceeded writing key '{key}' ({needed} bytes needed, quota {quota})")]
  QuotaExceeded { key: String, needed: usize, quota: usize },

  #[error("Storage failure for key '{key}'. Source: {source}")]
  Storage {
    key: String,
    #[source]
    source: AnyhowError,
  },

  #[error("Persisted catalog snapshot under '{key}' is corrupt. Source: {source}")]
  CorruptSnapshot {
    key: String,
    #[source]
    source: serde_json::Error,
  },

  #[error("Serialization failure: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("Configuration error: {0}")]
  Configuration(String),
}

impl MercadoError {
  pub(crate) fn not_found(id: impl Into<String>) -> Self {
    MercadoError::ProductNotFound { id: id.into() }
  }

  pub(crate) fn invalid(message: impl Into<String>) -> Self {
    MercadoError::InvalidProduct { message: message.into() }
  }

  pub(crate) fn storage(key: &str, source: impl Into<AnyhowError>) -> Self {
    MercadoError::Storage {
      key: key.to_string(),
      source: source.into(),
    }
  }
}

pub type MercadoResult<T, E = MercadoError> = std::result::Result<T, E>;
