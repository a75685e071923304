//! Table model
//!
//! The canonical representation of a table's schema and data. Every
//! operation either applies completely or returns an error with the table
//! unchanged.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tabula_core::{
    CellValue, ColumnId, ColumnType, Result, RowId, StructuralOp, TableId, TabulaError,
};

use super::{AccessOverlay, Column, Row, ValidationError};
use crate::reorder::splice_move;

/// Outcome of a cell write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellWrite {
    /// The value was stored
    Stored,
    /// The cell is effectively disabled; nothing was written
    Disabled,
}

/// A table: ordered columns, ordered rows and an access overlay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Persisted identity; `None` until the table is first registered
    pub id: Option<TableId>,
    /// Display name
    pub name: String,
    /// Owner reference
    pub owner: String,
    /// Optional thumbnail shown in table listings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    columns: Vec<Column>,
    #[serde(default)]
    rows: Vec<Row>,
    #[serde(default)]
    access: AccessOverlay,
    /// Highest column/row id handed out so far
    #[serde(default)]
    next_id: u64,
}

impl Table {
    /// Create a table with the given columns and no rows
    pub fn with_columns<I, S>(
        name: impl Into<String>,
        owner: impl Into<String>,
        columns: I,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = (S, ColumnType)>,
        S: Into<String>,
    {
        let mut table = Self {
            id: None,
            name: name.into(),
            owner: owner.into(),
            image: None,
            columns: Vec::new(),
            rows: Vec::new(),
            access: AccessOverlay::new(),
            next_id: 0,
        };

        for (column_name, column_type) in columns {
            let id = ColumnId(table.allocate_id());
            table.columns.push(Column::new(id, column_name, column_type));
        }

        if table.columns.is_empty() {
            return Err(TabulaError::Validation(
                "At least one column is required".into(),
            ));
        }

        Ok(table)
    }

    /// The new-table template: an `ID` number column, a `Name` text column
    /// and one example row.
    pub fn starter(name: impl Into<String>, owner: impl Into<String>) -> Self {
        let id_column = Column::new(ColumnId(1), "ID", ColumnType::Number);
        let name_column = Column::new(ColumnId(2), "Name", ColumnType::Text);
        let row = Row::new(RowId(3))
            .with_cell(id_column.id, 1i64)
            .with_cell(name_column.id, "Example data");

        Self {
            id: None,
            name: name.into(),
            owner: owner.into(),
            image: None,
            columns: vec![id_column, name_column],
            rows: vec![row],
            access: AccessOverlay::new(),
            next_id: 3,
        }
    }

    /// Builder: set the persisted id
    pub fn with_id(mut self, id: TableId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn access(&self) -> &AccessOverlay {
        &self.access
    }

    /// Get column names in display order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, id: ColumnId) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == id)
    }

    pub fn column_index(&self, id: ColumnId) -> Option<usize> {
        self.columns.iter().position(|c| c.id == id)
    }

    pub fn row(&self, id: RowId) -> Option<&Row> {
        self.rows.iter().find(|r| r.id == id)
    }

    pub fn row_index(&self, id: RowId) -> Option<usize> {
        self.rows.iter().position(|r| r.id == id)
    }

    /// Value of a cell; a missing entry reads as empty
    pub fn cell(&self, row: RowId, column: ColumnId) -> Result<&CellValue> {
        self.require_column(column)?;
        let row = self.row(row).ok_or(TabulaError::UnknownRow(row))?;
        Ok(row.get(column))
    }

    pub fn columns_locked(&self) -> bool {
        self.access.columns_locked
    }

    pub fn is_effectively_disabled(&self, row: RowId, column: ColumnId) -> bool {
        self.access.is_effectively_disabled(row, column)
    }

    /// Rename the table itself
    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    // ------------------------------------------------------------------
    // Structural column edits
    // ------------------------------------------------------------------

    /// Append a column; every existing row gains an empty entry for it
    pub fn add_column(
        &mut self,
        name: impl Into<String>,
        column_type: ColumnType,
    ) -> Result<ColumnId> {
        self.ensure_unlocked(StructuralOp::AddColumn)?;

        let id = ColumnId(self.allocate_id());
        self.columns.push(Column::new(id, name, column_type));
        for row in &mut self.rows {
            row.set(id, CellValue::Empty);
        }
        Ok(id)
    }

    /// Remove a column and every reference to it
    pub fn remove_column(&mut self, id: ColumnId) -> Result<()> {
        self.ensure_unlocked(StructuralOp::RemoveColumn)?;
        let index = self.require_column(id)?;
        if self.columns.len() <= 1 {
            return Err(TabulaError::LastColumn);
        }

        self.columns.remove(index);
        for row in &mut self.rows {
            row.remove(id);
        }
        self.access.purge_column(id);
        Ok(())
    }

    pub fn rename_column(&mut self, id: ColumnId, name: impl Into<String>) -> Result<()> {
        self.ensure_unlocked(StructuralOp::RenameColumn)?;
        let index = self.require_column(id)?;
        self.columns[index].name = name.into();
        Ok(())
    }

    pub fn retype_column(&mut self, id: ColumnId, column_type: ColumnType) -> Result<()> {
        self.ensure_unlocked(StructuralOp::RetypeColumn)?;
        let index = self.require_column(id)?;
        self.columns[index].column_type = column_type;
        Ok(())
    }

    /// Replace the allowed values of a list column
    pub fn set_column_options(&mut self, id: ColumnId, options: Vec<String>) -> Result<()> {
        self.ensure_unlocked(StructuralOp::SetColumnOptions)?;
        let index = self.require_column(id)?;
        self.columns[index].options = options;
        Ok(())
    }

    /// Move the column at `from` to `to`, shifting the columns in between.
    /// Row cell maps are keyed by id and are not touched.
    pub fn move_column(&mut self, from: usize, to: usize) -> Result<()> {
        self.ensure_unlocked(StructuralOp::ReorderColumn)?;
        splice_move(&mut self.columns, from, to)
    }

    // ------------------------------------------------------------------
    // Rows and cells
    // ------------------------------------------------------------------

    /// Append a row with an empty entry for every current column
    pub fn add_row(&mut self) -> RowId {
        let id = RowId(self.allocate_id());
        let mut row = Row::new(id);
        for column in &self.columns {
            row.set(column.id, CellValue::Empty);
        }
        self.rows.push(row);
        id
    }

    pub fn remove_row(&mut self, id: RowId) -> Result<()> {
        let index = self.require_row(id)?;
        self.rows.remove(index);
        self.access.purge_row(id);
        Ok(())
    }

    /// Move the row at `from` to `to` in stored order
    pub fn move_row(&mut self, from: usize, to: usize) -> Result<()> {
        splice_move(&mut self.rows, from, to)
    }

    /// Store a value without any type coercion.
    ///
    /// Writing to an effectively disabled cell is a silent no-op reported as
    /// `CellWrite::Disabled`, so batch edits never abort halfway.
    pub fn set_cell(
        &mut self,
        row: RowId,
        column: ColumnId,
        value: CellValue,
    ) -> Result<CellWrite> {
        self.set_cell_checked(row, column, value, false)
    }

    /// Like [`Table::set_cell`], optionally rejecting values that do not fit
    /// the column's type tag. Disabled cells are still a no-op, never an
    /// error.
    pub fn set_cell_checked(
        &mut self,
        row: RowId,
        column: ColumnId,
        value: CellValue,
        strict: bool,
    ) -> Result<CellWrite> {
        let column_index = self.require_column(column)?;
        let row_index = self.require_row(row)?;

        if self.access.is_effectively_disabled(row, column) {
            tracing::trace!(%row, %column, "write to disabled cell ignored");
            return Ok(CellWrite::Disabled);
        }

        if strict {
            let col = &self.columns[column_index];
            col.check_value(&value)
                .map_err(|message| TabulaError::InvalidValue {
                    column: col.name.clone(),
                    message,
                })?;
        }

        self.rows[row_index].set(column, value);
        Ok(CellWrite::Stored)
    }

    // ------------------------------------------------------------------
    // Access overlay
    // ------------------------------------------------------------------

    pub fn toggle_cell_disabled(&mut self, row: RowId, column: ColumnId) -> Result<bool> {
        self.require_column(column)?;
        self.require_row(row)?;
        Ok(self.access.toggle_cell(row, column))
    }

    pub fn toggle_row_disabled(&mut self, row: RowId) -> Result<bool> {
        self.require_row(row)?;
        Ok(self.access.toggle_row(row))
    }

    pub fn toggle_column_disabled(&mut self, column: ColumnId) -> Result<bool> {
        self.require_column(column)?;
        Ok(self.access.toggle_column(column))
    }

    pub fn set_columns_locked(&mut self, locked: bool) {
        self.access.set_columns_locked(locked);
    }

    // ------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------

    /// Check the table before it is committed
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push(ValidationError::new("name", "Table name is required"));
        }

        if self.columns.is_empty() {
            errors.push(ValidationError::new(
                "columns",
                "At least one column is required",
            ));
        }

        for (i, col) in self.columns.iter().enumerate() {
            if col.name.trim().is_empty() {
                errors.push(ValidationError::new(
                    format!("columns[{}].name", i),
                    format!("Column {} name is required", i + 1),
                ));
            }
        }

        // Check for duplicate column names
        let mut seen_names = HashSet::new();
        for col in &self.columns {
            let name = col.name.trim().to_lowercase();
            if !name.is_empty() && !seen_names.insert(name) {
                errors.push(ValidationError::new(
                    "columns",
                    format!("Duplicate column name: {}", col.name),
                ));
            }
        }

        let column_ids: HashSet<_> = self.columns.iter().map(|c| c.id).collect();
        let row_ids: HashSet<_> = self.rows.iter().map(|r| r.id).collect();
        let dangling = self
            .access
            .disabled_columns
            .iter()
            .any(|id| !column_ids.contains(id))
            || self.access.disabled_rows.iter().any(|id| !row_ids.contains(id))
            || self
                .access
                .disabled_cells
                .iter()
                .any(|key| !row_ids.contains(&key.row) || !column_ids.contains(&key.column));
        if dangling {
            errors.push(ValidationError::new(
                "access",
                "Access settings reference rows or columns that no longer exist",
            ));
        }

        errors
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn ensure_unlocked(&self, op: StructuralOp) -> Result<()> {
        if self.access.columns_locked {
            return Err(TabulaError::StructureLocked(op));
        }
        Ok(())
    }

    fn require_column(&self, id: ColumnId) -> Result<usize> {
        self.column_index(id).ok_or(TabulaError::UnknownColumn(id))
    }

    fn require_row(&self, id: RowId) -> Result<usize> {
        self.row_index(id).ok_or(TabulaError::UnknownRow(id))
    }

    /// Hand out a fresh id, never reusing one seen before even if the
    /// counter was lost in transit.
    fn allocate_id(&mut self) -> u64 {
        let highest_column = self.columns.iter().map(|c| c.id.get()).max().unwrap_or(0);
        let highest_row = self.rows.iter().map(|r| r.id.get()).max().unwrap_or(0);
        self.next_id = self.next_id.max(highest_column).max(highest_row) + 1;
        self.next_id
    }
}
