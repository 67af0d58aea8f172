// mercado/src/model/snapshot.rs

//! The envelope persisted under the primary storage key.

use crate::model::product::Product;
use serde::{Deserialize, Serialize};

/// `{ products, lastUpdated, version }`, overwritten wholesale on every save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSnapshot {
  pub products: Vec<Product>,
  pub last_updated: i64,
  pub version: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
  products: Vec<Product>,
  #[serde(default)]
  last_updated: Option<i64>,
}

// Older snapshots stored the bare product array.
#[derive(Deserialize)]
#[serde(untagged)]
enum PersistedDocument {
  Envelope(Envelope),
  Legacy(Vec<Product>),
}

/// Products and `lastUpdated` (if the document carried one) read from a persisted
/// document, already normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedSnapshot {
  pub products: Vec<Product>,
  pub last_updated: Option<i64>,
}

impl CatalogSnapshot {
  pub fn new(products: Vec<Product>, last_updated: i64, version: u32) -> Self {
    Self {
      products,
      last_updated,
      version,
    }
  }

  /// Accepts both the envelope and the legacy bare-array shape.
  pub fn decode(raw: &str) -> serde_json::Result<DecodedSnapshot> {
    let (mut products, last_updated) = match serde_json::from_str::<PersistedDocument>(raw)? {
      PersistedDocument::Envelope(env) => (env.products, env.last_updated),
      PersistedDocument::Legacy(products) => (products, None),
    };
    products.iter_mut().for_each(Product::normalize);
    Ok(DecodedSnapshot { products, last_updated })
  }
}
