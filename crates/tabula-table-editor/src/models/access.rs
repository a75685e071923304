//! Access overlay
//!
//! Tracks which cells, rows and columns are disabled for editing,
//! independently of the data itself, plus the table-wide "columns locked"
//! flag that gates structural column edits.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use tabula_core::{ColumnId, RowId};

/// Composite key of a single cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellKey {
    pub row: RowId,
    pub column: ColumnId,
}

impl CellKey {
    pub fn new(row: RowId, column: ColumnId) -> Self {
        Self { row, column }
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.row, self.column)
    }
}

/// Disabled cells, rows and columns of a table
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessOverlay {
    pub disabled_cells: BTreeSet<CellKey>,
    pub disabled_rows: BTreeSet<RowId>,
    pub disabled_columns: BTreeSet<ColumnId>,
    /// Blocks add/remove/rename/retype/reorder of columns. Independent of
    /// `disabled_columns`.
    pub columns_locked: bool,
}

impl AccessOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip a cell's membership; returns whether it is now disabled
    pub fn toggle_cell(&mut self, row: RowId, column: ColumnId) -> bool {
        toggle(&mut self.disabled_cells, CellKey::new(row, column))
    }

    /// Flip a row's membership; returns whether it is now disabled
    pub fn toggle_row(&mut self, row: RowId) -> bool {
        toggle(&mut self.disabled_rows, row)
    }

    /// Flip a column's membership; returns whether it is now disabled
    pub fn toggle_column(&mut self, column: ColumnId) -> bool {
        toggle(&mut self.disabled_columns, column)
    }

    /// Whether the cell's own key is disabled
    pub fn is_cell_disabled(&self, row: RowId, column: ColumnId) -> bool {
        self.disabled_cells.contains(&CellKey::new(row, column))
    }

    pub fn is_row_disabled(&self, row: RowId) -> bool {
        self.disabled_rows.contains(&row)
    }

    pub fn is_column_disabled(&self, column: ColumnId) -> bool {
        self.disabled_columns.contains(&column)
    }

    /// A cell is effectively disabled if its own key, its row, or its column
    /// is disabled.
    pub fn is_effectively_disabled(&self, row: RowId, column: ColumnId) -> bool {
        self.is_cell_disabled(row, column)
            || self.is_row_disabled(row)
            || self.is_column_disabled(column)
    }

    pub fn set_columns_locked(&mut self, locked: bool) {
        self.columns_locked = locked;
    }

    /// Drop every reference to a removed row
    pub fn purge_row(&mut self, row: RowId) {
        self.disabled_rows.remove(&row);
        self.disabled_cells.retain(|key| key.row != row);
    }

    /// Drop every reference to a removed column
    pub fn purge_column(&mut self, column: ColumnId) {
        self.disabled_columns.remove(&column);
        self.disabled_cells.retain(|key| key.column != column);
    }

    /// Whether anything at all is disabled or locked
    pub fn is_empty(&self) -> bool {
        self.disabled_cells.is_empty()
            && self.disabled_rows.is_empty()
            && self.disabled_columns.is_empty()
            && !self.columns_locked
    }
}

fn toggle<T: Ord>(set: &mut BTreeSet<T>, value: T) -> bool {
    if set.remove(&value) {
        false
    } else {
        set.insert(value);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROW: RowId = RowId(7);
    const COL: ColumnId = ColumnId(3);

    #[test]
    fn test_union_law_all_combinations() {
        for mask in 0u8..8 {
            let cell = mask & 0b001 != 0;
            let row = mask & 0b010 != 0;
            let column = mask & 0b100 != 0;

            let mut overlay = AccessOverlay::new();
            if cell {
                overlay.toggle_cell(ROW, COL);
            }
            if row {
                overlay.toggle_row(ROW);
            }
            if column {
                overlay.toggle_column(COL);
            }

            assert_eq!(
                overlay.is_effectively_disabled(ROW, COL),
                cell || row || column,
                "cell={cell} row={row} column={column}"
            );
        }
    }

    #[test]
    fn test_toggle_twice_restores() {
        let mut overlay = AccessOverlay::new();
        let original = overlay.clone();

        assert!(overlay.toggle_cell(ROW, COL));
        assert!(!overlay.toggle_cell(ROW, COL));
        assert!(overlay.toggle_row(ROW));
        assert!(!overlay.toggle_row(ROW));
        assert!(overlay.toggle_column(COL));
        assert!(!overlay.toggle_column(COL));

        assert_eq!(overlay, original);
    }

    #[test]
    fn test_other_cells_unaffected() {
        let mut overlay = AccessOverlay::new();
        overlay.toggle_cell(ROW, COL);
        assert!(!overlay.is_effectively_disabled(ROW, ColumnId(4)));
        assert!(!overlay.is_effectively_disabled(RowId(8), COL));
    }

    #[test]
    fn test_lock_is_independent_of_disabled_columns() {
        let mut overlay = AccessOverlay::new();
        overlay.toggle_column(COL);
        overlay.set_columns_locked(true);
        overlay.set_columns_locked(false);
        assert!(overlay.is_column_disabled(COL));
    }

    #[test]
    fn test_purge_column() {
        let mut overlay = AccessOverlay::new();
        overlay.toggle_column(COL);
        overlay.toggle_cell(ROW, COL);
        overlay.toggle_cell(RowId(8), COL);
        overlay.toggle_cell(ROW, ColumnId(4));

        overlay.purge_column(COL);

        assert!(!overlay.is_column_disabled(COL));
        assert!(overlay.disabled_cells.iter().all(|k| k.column != COL));
        assert!(overlay.is_cell_disabled(ROW, ColumnId(4)));
    }

    #[test]
    fn test_purge_row() {
        let mut overlay = AccessOverlay::new();
        overlay.toggle_row(ROW);
        overlay.toggle_cell(ROW, COL);
        overlay.toggle_cell(RowId(8), COL);

        overlay.purge_row(ROW);

        assert!(!overlay.is_row_disabled(ROW));
        assert_eq!(overlay.disabled_cells.len(), 1);
    }

    #[test]
    fn test_cell_key_display() {
        assert_eq!(CellKey::new(ROW, COL).to_string(), "7-3");
    }
}
