// storefront_app/src/errors.rs

use mercado::MercadoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Catalog Error: {source}")]
  Catalog {
    #[from] // Allows conversion from mercado::MercadoError
    source: MercadoError,
  },

  #[error("Order Handoff Error: {0}")]
  Handoff(String),

  #[error("Internal Error: {0}")]
  Internal(String), // For miscellaneous errors
}

// Allow anyhow::Error to be converted into AppError::Internal for convenience.
impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<MercadoError>() {
      Ok(source) => AppError::Catalog { source },
      Err(err) => AppError::Internal(err.to_string()),
    }
  }
}

// Define a Result type alias for the application
pub type Result<T, E = AppError> = std::result::Result<T, E>;
