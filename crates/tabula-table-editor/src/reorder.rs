//! Reorder engine
//!
//! Drag-and-drop permutation of columns or rows. A drag is a transient value
//! that never touches the table; the only durable effect is the single
//! splice applied on drop.

use serde::{Deserialize, Serialize};
use tabula_core::{ColumnId, Result, RowId, StructuralOp, TabulaError};

use crate::models::Table;

/// What kind of item is being dragged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DragKind {
    Column,
    Row,
}

/// The dragged item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DragItem {
    Column(ColumnId),
    Row(RowId),
}

impl DragItem {
    pub fn kind(&self) -> DragKind {
        match self {
            DragItem::Column(_) => DragKind::Column,
            DragItem::Row(_) => DragKind::Row,
        }
    }
}

/// An in-progress reorder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragState {
    pub item: DragItem,
    /// Stored-order index of the item when the drag started
    pub origin_index: usize,
}

impl DragState {
    /// Start dragging `item`, resolving its current position in `table`
    pub fn start(table: &Table, item: DragItem) -> Result<Self> {
        let origin_index = locate(table, item)?;
        Ok(Self { item, origin_index })
    }

    pub fn kind(&self) -> DragKind {
        self.item.kind()
    }
}

/// Remove the element at `from` and reinsert it at `to`, shifting the
/// elements in between. Both indices must be in bounds.
pub fn splice_move<T>(items: &mut Vec<T>, from: usize, to: usize) -> Result<()> {
    let len = items.len();
    for index in [from, to] {
        if index >= len {
            return Err(TabulaError::IndexOutOfBounds { index, len });
        }
    }
    if from != to {
        let item = items.remove(from);
        items.insert(to, item);
    }
    Ok(())
}

/// Apply a drop of `drag` at `target` (a stored-order index).
///
/// Column drops fail with `StructureLocked` while columns are locked. Row
/// drops fail with `SortActive` while a sort is applied, since the visible
/// order no longer matches stored order. The item is located by id; if it
/// moved since the drag started, its current index wins. Returns the index
/// the item was moved from.
pub fn apply_drop(
    table: &mut Table,
    drag: &DragState,
    target: usize,
    sort_active: bool,
) -> Result<usize> {
    match drag.item {
        DragItem::Column(_) if table.columns_locked() => {
            return Err(TabulaError::StructureLocked(StructuralOp::ReorderColumn));
        }
        DragItem::Row(_) if sort_active => return Err(TabulaError::SortActive),
        _ => {}
    }

    let from = locate(table, drag.item)?;
    if from != drag.origin_index {
        tracing::debug!(
            origin = drag.origin_index,
            current = from,
            "dragged item moved since drag start; using current position"
        );
    }

    match drag.item {
        DragItem::Column(_) => table.move_column(from, target)?,
        DragItem::Row(_) => table.move_row(from, target)?,
    }
    Ok(from)
}

fn locate(table: &Table, item: DragItem) -> Result<usize> {
    match item {
        DragItem::Column(id) => table
            .column_index(id)
            .ok_or(TabulaError::UnknownColumn(id)),
        DragItem::Row(id) => table.row_index(id).ok_or(TabulaError::UnknownRow(id)),
    }
}
