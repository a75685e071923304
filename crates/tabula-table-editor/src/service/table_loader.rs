//! Table loader for opening edit sessions
//!
//! Loads a table from the registry and wraps a deep copy of it in an
//! [`EditSession`], or starts a session on the new-table template.

use tabula_core::{Result, TableId};

use super::TableRegistry;
use crate::session::EditSession;

/// Stateless helper for opening sessions
pub struct TableLoader;

impl TableLoader {
    /// Open an existing table for viewing and editing
    ///
    /// # Errors
    /// Returns `NotFound` if the registry has no table with this id.
    #[tracing::instrument(skip(registry), fields(table_id = %id))]
    pub async fn open(registry: &dyn TableRegistry, id: TableId) -> Result<EditSession> {
        let table = registry.get(id).await?;
        tracing::debug!(
            columns = table.columns().len(),
            rows = table.rows().len(),
            "loaded table"
        );
        Ok(EditSession::open(&table))
    }

    /// Start a session on an unregistered table built from the template
    pub fn new_table(name: impl Into<String>, owner: impl Into<String>) -> EditSession {
        EditSession::new_table(name, owner)
    }
}
