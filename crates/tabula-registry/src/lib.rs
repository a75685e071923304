//! Tabula Registry - Persisted table collection
//!
//! This crate owns the list of saved tables: an in-memory store with
//! optional JSON write-through to a tables file.

mod storage;
mod store;

pub use storage::StoredTables;
pub use store::TableStore;
