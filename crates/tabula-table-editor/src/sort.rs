//! Sort engine
//!
//! Produces an ordered view of a table's rows. Sorting is a derived view:
//! stored row order is never touched.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tabula_core::{CellValue, ColumnId};

use crate::models::{Row, Table};

/// Sort direction, including "not sorted"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    None,
    Ascending,
    Descending,
}

impl SortOrder {
    /// Next order when the same column's sort control is clicked again
    pub fn next(self) -> Self {
        match self {
            SortOrder::None => SortOrder::Ascending,
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::None,
        }
    }

    /// Header indicator
    pub fn symbol(self) -> &'static str {
        match self {
            SortOrder::None => "↕",
            SortOrder::Ascending => "↑",
            SortOrder::Descending => "↓",
        }
    }
}

/// Current sort: at most one column at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortState {
    pub column: Option<ColumnId>,
    pub order: SortOrder,
}

impl SortState {
    pub fn new(column: ColumnId, order: SortOrder) -> Self {
        if order == SortOrder::None {
            return Self::default();
        }
        Self {
            column: Some(column),
            order,
        }
    }

    /// Handle a click on a column's sort control.
    ///
    /// The same column cycles `none -> ascending -> descending -> none`; a
    /// different column starts over at ascending and drops the old one.
    pub fn toggle(&mut self, column: ColumnId) {
        let order = if self.column == Some(column) {
            self.order.next()
        } else {
            SortOrder::Ascending
        };
        *self = Self::new(column, order);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_active(&self) -> bool {
        self.column.is_some() && self.order != SortOrder::None
    }

    /// Order shown for a column's header
    pub fn order_for(&self, column: ColumnId) -> SortOrder {
        if self.column == Some(column) {
            self.order
        } else {
            SortOrder::None
        }
    }
}

/// Ordering used for sorting: empty values first, then numbers, then
/// timestamps, then text; each class compared in its own terms.
pub fn compare_cells(a: &CellValue, b: &CellValue) -> Ordering {
    a.sort_cmp(b)
}

/// Rows of `table` in the order described by `state`.
///
/// Pure and stable: rows with equal keys keep their stored relative order in
/// both directions. With no active sort, or a sort column that no longer
/// exists, rows come back in stored order.
pub fn sorted_view<'a>(table: &'a Table, state: &SortState) -> Vec<&'a Row> {
    let mut rows: Vec<&Row> = table.rows().iter().collect();

    let column = match state.column {
        Some(column) if state.is_active() && table.column(column).is_some() => column,
        _ => return rows,
    };

    // slice::sort_by is stable; reversing the comparator (not the output)
    // keeps ties in stored order for descending too.
    match state.order {
        SortOrder::Ascending => rows.sort_by(|a, b| compare_cells(a.get(column), b.get(column))),
        SortOrder::Descending => rows.sort_by(|a, b| compare_cells(b.get(column), a.get(column))),
        SortOrder::None => {}
    }

    rows
}
