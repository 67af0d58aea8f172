// mercado/src/model/mod.rs

//! Records persisted in the catalog snapshot and the values derived from them.

pub mod product;
pub mod snapshot;

pub use product::{Contact, Product, ProductDraft, ProductId, ProductPatch, StockSeverity, StockStatus};
pub use snapshot::{CatalogSnapshot, DecodedSnapshot};
