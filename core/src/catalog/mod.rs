// mercado/src/catalog/mod.rs

//! Catalog entity logic: the mutation commands, the single reducer that applies
//! them, stock-status classification, browsing queries and the seed catalog.

pub mod command;
pub mod query;
pub mod reducer;
pub mod seed;
pub mod status;

pub use command::{CatalogCommand, CommandEffect};
pub use query::{categories, filter_by_category, search, visible_products};
pub use reducer::apply;
pub use seed::default_catalog;
pub use status::stock_status;
