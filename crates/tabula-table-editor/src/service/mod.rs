//! Service layer for table editing
//!
//! The registry contract consumed by edit sessions and the loader that opens
//! sessions from it.

mod table_loader;
mod registry;

pub use table_loader::TableLoader;
pub use registry::{TableDraft, TableRegistry, TableSummary};
