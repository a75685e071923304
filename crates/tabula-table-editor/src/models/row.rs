//! Row model

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tabula_core::{CellValue, ColumnId, RowId};

static EMPTY: CellValue = CellValue::Empty;

/// A row of a table: a sparse map from column id to cell value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub id: RowId,
    #[serde(default)]
    pub cells: BTreeMap<ColumnId, CellValue>,
}

impl Row {
    /// Create a row with no cells
    pub fn new(id: RowId) -> Self {
        Self {
            id,
            cells: BTreeMap::new(),
        }
    }

    /// Builder: set a cell
    pub fn with_cell(mut self, column: ColumnId, value: impl Into<CellValue>) -> Self {
        self.cells.insert(column, value.into());
        self
    }

    /// Value for a column; a missing entry reads as empty
    pub fn get(&self, column: ColumnId) -> &CellValue {
        self.cells.get(&column).unwrap_or(&EMPTY)
    }

    pub(crate) fn set(&mut self, column: ColumnId, value: CellValue) {
        self.cells.insert(column, value);
    }

    pub(crate) fn remove(&mut self, column: ColumnId) {
        self.cells.remove(&column);
    }
}
