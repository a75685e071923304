use serde::{Deserialize, Serialize};
use tabula_core::{ColumnId, ColumnType, RowId, TableId};
use tabula_table_editor::{EditSession, SortOrder, ViewMode};
use uuid::Uuid;

/// Render-ready snapshot of an edit session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableView {
    pub session_id: Uuid,
    /// `None` for a table that has never been saved
    pub table_id: Option<TableId>,
    pub name: String,
    pub owner: String,
    pub editing: bool,
    pub dirty: bool,
    pub saving: bool,
    pub columns_locked: bool,
    pub columns: Vec<ColumnView>,
    /// Rows in display order (sorted if a sort is active)
    pub rows: Vec<RowView>,
}

/// Column header information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnView {
    pub id: ColumnId,
    pub name: String,
    pub column_type: ColumnType,
    pub options: Vec<String>,
    pub disabled: bool,
    pub sort: SortOrder,
}

/// One displayed row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowView {
    pub id: RowId,
    pub disabled: bool,
    /// One entry per column, in column order
    pub cells: Vec<CellView>,
}

/// One displayed cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellView {
    pub text: String,
    /// Effectively disabled: own key, row or column
    pub disabled: bool,
}

impl From<&EditSession> for TableView {
    fn from(session: &EditSession) -> Self {
        let table = session.table();
        let access = table.access();
        let sort = session.sort_state();

        let columns = table
            .columns()
            .iter()
            .map(|column| ColumnView {
                id: column.id,
                name: column.name.clone(),
                column_type: column.column_type,
                options: column.options.clone(),
                disabled: access.is_column_disabled(column.id),
                sort: sort.order_for(column.id),
            })
            .collect();

        let rows = session
            .sorted_rows()
            .into_iter()
            .map(|row| RowView {
                id: row.id,
                disabled: access.is_row_disabled(row.id),
                cells: table
                    .columns()
                    .iter()
                    .map(|column| CellView {
                        text: row.get(column.id).to_string(),
                        disabled: access.is_effectively_disabled(row.id, column.id),
                    })
                    .collect(),
            })
            .collect();

        Self {
            session_id: session.id(),
            table_id: table.id,
            name: table.name.clone(),
            owner: table.owner.clone(),
            editing: session.mode() == ViewMode::Editing,
            dirty: session.is_dirty(),
            saving: session.is_saving(),
            columns_locked: table.columns_locked(),
            columns,
            rows,
        }
    }
}
