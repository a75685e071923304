//! Table store for the persisted table collection

use async_trait::async_trait;
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use tabula_core::{Result, TableId, TabulaError};
use tabula_table_editor::{Table, TableDraft, TableRegistry, TableSummary};

use crate::StoredTables;

/// In-memory table collection with optional JSON write-through
///
/// `create`, `replace` and `delete` build the next state on a copy, write it
/// to the storage path when one is configured, and only then publish it.
/// A failed write leaves memory untouched, so memory and disk agree and
/// readers never see an unpersisted record.
pub struct TableStore {
    /// Tables and the id counter
    state: RwLock<StoredTables>,

    /// Path to the tables file
    storage_path: Option<PathBuf>,

    /// Held from copying the state until the new state is published
    write_lock: tokio::sync::Mutex<()>,
}

impl TableStore {
    /// Create an empty, memory-only store
    pub fn new() -> Self {
        Self::from_state(StoredTables::default(), None)
    }

    /// Create an empty store backed by a tables file
    pub fn with_storage_path(path: PathBuf) -> Self {
        Self::from_state(StoredTables::default(), Some(path))
    }

    /// Create a memory-only store preloaded with `tables`
    pub fn with_tables(tables: impl IntoIterator<Item = Table>) -> Self {
        Self::from_state(StoredTables::from_tables(tables), None)
    }

    fn from_state(state: StoredTables, storage_path: Option<PathBuf>) -> Self {
        Self {
            state: RwLock::new(state),
            storage_path,
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn storage_path(&self) -> Option<&Path> {
        self.storage_path.as_deref()
    }

    pub fn len(&self) -> usize {
        self.state.read().tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().tables.is_empty()
    }

    /// Load tables from persistent storage
    #[tracing::instrument(skip(self))]
    pub async fn load_from_storage(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        tracing::debug!("loading tables from storage");
        if let Some(ref path) = self.storage_path
            && path.exists()
        {
            let stored = StoredTables::read(path).await?;
            tracing::info!(count = stored.tables.len(), "tables loaded from storage");
            *self.state.write() = stored;
        } else {
            tracing::debug!("no storage path configured or file doesn't exist");
        }
        Ok(())
    }

    /// Save tables to persistent storage
    #[tracing::instrument(skip(self))]
    pub async fn save_to_storage(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let Some(ref path) = self.storage_path else {
            tracing::debug!("no storage path configured");
            return Ok(());
        };

        let snapshot = self.state.read().clone();
        snapshot.write(path).await.map_err(|e| {
            tracing::error!(error = %e, path = ?path, "failed to write tables file");
            e
        })?;

        tracing::info!(count = snapshot.tables.len(), path = ?path, "tables saved to storage");
        Ok(())
    }

    /// Apply `change` to a copy of the state, persist the copy, then publish it
    async fn commit<R>(&self, change: impl FnOnce(&mut StoredTables) -> Result<R>) -> Result<R> {
        let _guard = self.write_lock.lock().await;

        let mut next = self.state.read().clone();
        let output = change(&mut next)?;

        if let Some(ref path) = self.storage_path {
            next.write(path).await.map_err(|e| {
                tracing::error!(error = %e, path = ?path, "failed to write tables file");
                TabulaError::Storage(format!("failed to persist tables: {}", e))
            })?;
        }

        *self.state.write() = next;
        Ok(output)
    }

    fn not_found(id: TableId) -> TabulaError {
        TabulaError::NotFound(format!("Table {} not found", id))
    }
}

impl Default for TableStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TableRegistry for TableStore {
    async fn list(&self) -> Result<Vec<TableSummary>> {
        Ok(self
            .state
            .read()
            .tables
            .iter()
            .filter_map(TableSummary::from_table)
            .collect())
    }

    #[tracing::instrument(skip(self), fields(table_id = %id))]
    async fn get(&self, id: TableId) -> Result<Table> {
        let table = self
            .state
            .read()
            .tables
            .iter()
            .find(|t| t.id == Some(id))
            .cloned();
        if table.is_none() {
            tracing::debug!("table not found");
        }
        table.ok_or_else(|| Self::not_found(id))
    }

    #[tracing::instrument(skip(self, draft), fields(table_name = %draft.table().name))]
    async fn create(&self, draft: TableDraft) -> Result<Table> {
        let table = self
            .commit(|state| {
                let id = state.allocate_id();
                let table = draft.into_table(id);
                state.tables.push(table.clone());
                Ok(table)
            })
            .await?;

        tracing::info!(table_id = ?table.id, "table created");
        Ok(table)
    }

    #[tracing::instrument(skip(self, table), fields(table_id = %id))]
    async fn replace(&self, id: TableId, table: Table) -> Result<Table> {
        let table = table.with_id(id);
        let stored = table.clone();
        self.commit(move |state| {
            let index = state.position(id).ok_or_else(|| Self::not_found(id))?;
            state.tables[index] = stored;
            Ok(())
        })
        .await?;

        tracing::info!(
            columns = table.columns().len(),
            rows = table.rows().len(),
            "table replaced"
        );
        Ok(table)
    }

    #[tracing::instrument(skip(self), fields(table_id = %id))]
    async fn delete(&self, id: TableId) -> Result<()> {
        self.commit(|state| {
            let index = state.position(id).ok_or_else(|| Self::not_found(id))?;
            state.tables.remove(index);
            Ok(())
        })
        .await?;

        tracing::info!("table deleted");
        Ok(())
    }
}
