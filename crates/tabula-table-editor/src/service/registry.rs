//! Table registry contract
//!
//! The registry owns the collection of persisted tables. Edit sessions read
//! one table from it and write the whole working copy back on save.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tabula_core::{Result, TableId};

use crate::models::Table;

/// Listing entry for a persisted table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSummary {
    pub id: TableId,
    pub name: String,
    pub owner: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub column_count: usize,
    pub row_count: usize,
}

impl TableSummary {
    /// Summarize a registered table; `None` if it has no id yet
    pub fn from_table(table: &Table) -> Option<Self> {
        Some(Self {
            id: table.id?,
            name: table.name.clone(),
            owner: table.owner.clone(),
            image: table.image.clone(),
            column_count: table.columns().len(),
            row_count: table.rows().len(),
        })
    }
}

/// A table that has not been registered yet
#[derive(Debug, Clone, PartialEq)]
pub struct TableDraft {
    table: Table,
}

impl TableDraft {
    pub fn new(mut table: Table) -> Self {
        table.id = None;
        Self { table }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Finish registration under `id`
    pub fn into_table(self, id: TableId) -> Table {
        self.table.with_id(id)
    }
}

/// Persisted table collection
#[async_trait]
pub trait TableRegistry: Send + Sync {
    /// Summaries of every table, in registration order
    async fn list(&self) -> Result<Vec<TableSummary>>;

    /// The "my tables" view
    async fn list_owned_by(&self, owner: &str) -> Result<Vec<TableSummary>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|summary| summary.owner == owner)
            .collect())
    }

    /// Fetch a table; `NotFound` if absent
    async fn get(&self, id: TableId) -> Result<Table>;

    /// Register a new table and assign its identity
    async fn create(&self, draft: TableDraft) -> Result<Table>;

    /// Overwrite the stored record for `id`; `NotFound` if unknown
    async fn replace(&self, id: TableId, table: Table) -> Result<Table>;

    /// Remove a table; `NotFound` if unknown
    async fn delete(&self, id: TableId) -> Result<()>;
}
