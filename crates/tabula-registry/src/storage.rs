//! Tables file format
//!
//! The whole collection is stored as one pretty-printed JSON document:
//!
//! ```json
//! { "next_table_id": 3, "tables": [ { "id": 1, ... }, { "id": 3, ... } ] }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use tabula_core::{Result, TableId};
use tabula_table_editor::Table;

/// Contents of the tables file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredTables {
    /// Last table id handed out
    #[serde(default)]
    pub next_table_id: u64,
    #[serde(default)]
    pub tables: Vec<Table>,
}

impl StoredTables {
    /// Build a collection from seed tables, giving ids to those without one
    pub fn from_tables(tables: impl IntoIterator<Item = Table>) -> Self {
        let mut stored = Self {
            next_table_id: 0,
            tables: Vec::new(),
        };
        for table in tables {
            let table = match table.id {
                Some(_) => table,
                None => {
                    let id = stored.allocate_id();
                    table.with_id(id)
                }
            };
            stored.tables.push(table);
            stored.repair_counter();
        }
        stored
    }

    /// Hand out the next table id
    pub fn allocate_id(&mut self) -> TableId {
        self.repair_counter();
        self.next_table_id += 1;
        TableId(self.next_table_id)
    }

    pub fn position(&self, id: TableId) -> Option<usize> {
        self.tables.iter().position(|t| t.id == Some(id))
    }

    /// Keep the counter at or above every id in use so ids are never reused
    fn repair_counter(&mut self) {
        let highest = self
            .tables
            .iter()
            .filter_map(|t| t.id)
            .map(TableId::get)
            .max()
            .unwrap_or(0);
        self.next_table_id = self.next_table_id.max(highest);
    }

    /// Read a tables file
    pub async fn read(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let mut stored: StoredTables = serde_json::from_str(&content)?;
        stored.repair_counter();
        Ok(stored)
    }

    /// Write a tables file, creating the parent directory if needed
    pub async fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabula_core::ColumnType;

    fn table(name: &str) -> Table {
        Table::with_columns(name, "alice", [("A", ColumnType::Text)]).unwrap()
    }

    #[test]
    fn test_from_tables_assigns_missing_ids() {
        let stored =
            StoredTables::from_tables([table("a").with_id(TableId(5)), table("b"), table("c")]);
        let ids: Vec<_> = stored.tables.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![Some(TableId(5)), Some(TableId(6)), Some(TableId(7))]);
        assert_eq!(stored.next_table_id, 7);
    }

    #[test]
    fn test_counter_survives_missing_field() {
        let json = serde_json::json!({
            "tables": [serde_json::to_value(table("a").with_id(TableId(9))).unwrap()]
        });
        let mut stored: StoredTables = serde_json::from_value(json).unwrap();
        assert_eq!(stored.allocate_id(), TableId(10));
    }
}
