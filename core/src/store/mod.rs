// mercado/src/store/mod.rs

//! Durable key-value storage backends and the catalog snapshot store built on them.

pub mod product_store;
pub mod storage;

pub use product_store::{CatalogStore, LocalProductStore, SyncStatus};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
