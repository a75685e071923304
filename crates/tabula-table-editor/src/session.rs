//! Edit sessions
//!
//! An [`EditSession`] owns a private working copy of one table, its view mode,
//! sort and drag state, and the save protocol that writes the working copy
//! back to a [`TableRegistry`].
//!
//! ## Save protocol
//!
//! Saving is split in two so the caller can release any lock it holds on the
//! session while the registry round trip is pending:
//!
//! ```rust,ignore
//! let request = session.begin_save()?;          // snapshot + in-flight flag
//! let result = request.execute(registry).await; // no session borrow held
//! session.finish_save(result)?;                 // adopt id, back to Viewing
//! ```
//!
//! While a save is in flight every mutation and a second `begin_save` fail
//! with `SaveInFlight`.

use tabula_core::{CellValue, ColumnId, ColumnType, Result, RowId, TableId, TabulaError};
use uuid::Uuid;

use crate::events::TableEditorEvent;
use crate::models::{CellWrite, Row, Table, ValidationError};
use crate::reorder::{DragItem, DragState, apply_drop};
use crate::service::{TableDraft, TableRegistry};
use crate::sort::{SortOrder, SortState, sorted_view};

/// Session view mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Read-only presentation of the working copy
    #[default]
    Viewing,
    /// All mutations reachable
    Editing,
}

/// Where a save lands in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveTarget {
    /// First save of a new table
    Create,
    /// Overwrite an existing record
    Replace(TableId),
}

/// A pending save: the working copy frozen at `begin_save`
#[derive(Debug, Clone)]
pub struct SaveRequest {
    pub snapshot: Table,
    pub target: SaveTarget,
}

impl SaveRequest {
    /// Perform the registry round trip
    pub async fn execute(self, registry: &dyn TableRegistry) -> Result<Table> {
        match self.target {
            SaveTarget::Create => registry.create(TableDraft::new(self.snapshot)).await,
            SaveTarget::Replace(id) => registry.replace(id, self.snapshot).await,
        }
    }
}

/// A working copy of one table plus its transient editing state
#[derive(Debug, Clone)]
pub struct EditSession {
    id: Uuid,
    working: Table,
    origin: Option<TableId>,
    mode: ViewMode,
    sort: SortState,
    drag: Option<DragState>,
    dirty: bool,
    save_in_flight: bool,
    strict_types: bool,
    events: Vec<TableEditorEvent>,
}

impl EditSession {
    /// Open a session on a deep copy of a stored table, in `Viewing`
    pub fn open(table: &Table) -> Self {
        Self::with_working(table.clone(), ViewMode::Viewing, false)
    }

    /// Start a session on the new-table template, in `Editing`.
    ///
    /// The table is unregistered, so the session starts dirty.
    pub fn new_table(name: impl Into<String>, owner: impl Into<String>) -> Self {
        Self::with_working(Table::starter(name, owner), ViewMode::Editing, true)
    }

    fn with_working(working: Table, mode: ViewMode, dirty: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            origin: working.id,
            working,
            mode,
            sort: SortState::default(),
            drag: None,
            dirty,
            save_in_flight: false,
            strict_types: false,
            events: Vec::new(),
        }
    }

    /// Reject cell values that do not fit their column's type
    pub fn with_strict_types(mut self, strict: bool) -> Self {
        self.strict_types = strict;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The working copy
    pub fn table(&self) -> &Table {
        &self.working
    }

    /// Registry id this session was loaded from or last saved to
    pub fn origin(&self) -> Option<TableId> {
        self.origin
    }

    pub fn is_new(&self) -> bool {
        self.origin.is_none()
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn is_editing(&self) -> bool {
        self.mode == ViewMode::Editing
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_saving(&self) -> bool {
        self.save_in_flight
    }

    pub fn sort_state(&self) -> SortState {
        self.sort
    }

    pub fn drag_state(&self) -> Option<DragState> {
        self.drag
    }

    /// Drain the events recorded since the last call
    pub fn take_events(&mut self) -> Vec<TableEditorEvent> {
        std::mem::take(&mut self.events)
    }

    // ------------------------------------------------------------------
    // Mode
    // ------------------------------------------------------------------

    pub fn enter_edit(&mut self) -> Result<()> {
        self.ensure_not_saving()?;
        if self.mode != ViewMode::Editing {
            self.mode = ViewMode::Editing;
            self.events.push(TableEditorEvent::EditStarted);
        }
        Ok(())
    }

    /// Back to read-only presentation. Unsaved changes stay in the working
    /// copy; any drag in progress is dropped.
    ///
    /// # Errors
    /// `SaveInFlight` while a save is pending.
    pub fn enter_view(&mut self) -> Result<()> {
        self.ensure_not_saving()?;
        self.switch_to_viewing();
        Ok(())
    }

    fn switch_to_viewing(&mut self) {
        self.drag = None;
        if self.mode != ViewMode::Viewing {
            self.mode = ViewMode::Viewing;
            self.events.push(TableEditorEvent::EditFinished);
        }
    }

    // ------------------------------------------------------------------
    // Table and column edits
    // ------------------------------------------------------------------

    pub fn rename_table(&mut self, name: impl Into<String>) -> Result<()> {
        self.ensure_mutable()?;
        let name = name.into();
        self.working.rename(name.clone());
        self.record(TableEditorEvent::TableRenamed { name });
        Ok(())
    }

    pub fn add_column(
        &mut self,
        name: impl Into<String>,
        column_type: ColumnType,
    ) -> Result<ColumnId> {
        self.ensure_mutable()?;
        let name = name.into();
        let column = self.working.add_column(name.clone(), column_type)?;
        self.record(TableEditorEvent::ColumnAdded { column, name });
        Ok(column)
    }

    /// Remove a column; a sort or drag on it is dropped as well
    pub fn remove_column(&mut self, column: ColumnId) -> Result<()> {
        self.ensure_mutable()?;
        self.working.remove_column(column)?;
        if self.sort.column == Some(column) {
            self.sort.clear();
        }
        if matches!(self.drag, Some(DragState { item: DragItem::Column(id), .. }) if id == column) {
            self.drag = None;
        }
        self.record(TableEditorEvent::ColumnRemoved { column });
        Ok(())
    }

    pub fn rename_column(&mut self, column: ColumnId, name: impl Into<String>) -> Result<()> {
        self.ensure_mutable()?;
        self.working.rename_column(column, name)?;
        self.record(TableEditorEvent::ColumnUpdated { column });
        Ok(())
    }

    pub fn retype_column(&mut self, column: ColumnId, column_type: ColumnType) -> Result<()> {
        self.ensure_mutable()?;
        self.working.retype_column(column, column_type)?;
        self.record(TableEditorEvent::ColumnUpdated { column });
        Ok(())
    }

    pub fn set_column_options(&mut self, column: ColumnId, options: Vec<String>) -> Result<()> {
        self.ensure_mutable()?;
        self.working.set_column_options(column, options)?;
        self.record(TableEditorEvent::ColumnUpdated { column });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Rows and cells
    // ------------------------------------------------------------------

    pub fn add_row(&mut self) -> Result<RowId> {
        self.ensure_mutable()?;
        let row = self.working.add_row();
        self.record(TableEditorEvent::RowAdded { row });
        Ok(row)
    }

    pub fn remove_row(&mut self, row: RowId) -> Result<()> {
        self.ensure_mutable()?;
        self.working.remove_row(row)?;
        if matches!(self.drag, Some(DragState { item: DragItem::Row(id), .. }) if id == row) {
            self.drag = None;
        }
        self.record(TableEditorEvent::RowRemoved { row });
        Ok(())
    }

    /// Write a cell. A disabled cell is left untouched and does not mark the
    /// session dirty.
    pub fn set_cell(
        &mut self,
        row: RowId,
        column: ColumnId,
        value: CellValue,
    ) -> Result<CellWrite> {
        self.ensure_mutable()?;
        let write = self
            .working
            .set_cell_checked(row, column, value, self.strict_types)?;
        if write == CellWrite::Stored {
            self.record(TableEditorEvent::CellUpdated { row, column });
        }
        Ok(write)
    }

    // ------------------------------------------------------------------
    // Access overlay
    // ------------------------------------------------------------------

    pub fn toggle_cell_disabled(&mut self, row: RowId, column: ColumnId) -> Result<bool> {
        self.ensure_mutable()?;
        let disabled = self.working.toggle_cell_disabled(row, column)?;
        self.record(TableEditorEvent::AccessChanged);
        Ok(disabled)
    }

    pub fn toggle_row_disabled(&mut self, row: RowId) -> Result<bool> {
        self.ensure_mutable()?;
        let disabled = self.working.toggle_row_disabled(row)?;
        self.record(TableEditorEvent::AccessChanged);
        Ok(disabled)
    }

    pub fn toggle_column_disabled(&mut self, column: ColumnId) -> Result<bool> {
        self.ensure_mutable()?;
        let disabled = self.working.toggle_column_disabled(column)?;
        self.record(TableEditorEvent::AccessChanged);
        Ok(disabled)
    }

    pub fn set_columns_locked(&mut self, locked: bool) -> Result<()> {
        self.ensure_mutable()?;
        if self.working.columns_locked() != locked {
            self.working.set_columns_locked(locked);
            self.record(TableEditorEvent::ColumnsLockChanged { locked });
        }
        Ok(())
    }

    /// Flip the columns lock, returning the new state
    pub fn toggle_columns_locked(&mut self) -> Result<bool> {
        let locked = !self.working.columns_locked();
        self.set_columns_locked(locked)?;
        Ok(locked)
    }

    // ------------------------------------------------------------------
    // Sort
    // ------------------------------------------------------------------

    /// Click a column's sort control. Available in both modes; sorting is a
    /// view and never marks the session dirty.
    pub fn toggle_sort(&mut self, column: ColumnId) -> Result<SortOrder> {
        if self.working.column(column).is_none() {
            return Err(TabulaError::UnknownColumn(column));
        }
        self.sort.toggle(column);
        Ok(self.sort.order)
    }

    /// Rows in display order
    pub fn sorted_rows(&self) -> Vec<&Row> {
        sorted_view(&self.working, &self.sort)
    }

    // ------------------------------------------------------------------
    // Drag and drop
    // ------------------------------------------------------------------

    pub fn begin_drag(&mut self, item: DragItem) -> Result<()> {
        self.ensure_mutable()?;
        self.drag = Some(DragState::start(&self.working, item)?);
        Ok(())
    }

    pub fn cancel_drag(&mut self) {
        self.drag = None;
    }

    /// Drop the dragged item at `target` in stored order. The drag ends
    /// whether or not the move is applied.
    pub fn drop_at(&mut self, target: usize) -> Result<()> {
        let drag = self.drag.take().ok_or(TabulaError::NoDrag)?;
        self.ensure_mutable()?;
        let from = apply_drop(&mut self.working, &drag, target, self.sort.is_active())?;
        if from != target {
            self.record(TableEditorEvent::Reordered {
                kind: drag.kind(),
                from,
                to: target,
            });
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Save
    // ------------------------------------------------------------------

    /// Freeze the working copy for saving.
    ///
    /// # Errors
    /// `SaveInFlight` if a save is already pending, `ReadOnly` outside
    /// `Editing`, `Validation` if the working copy fails validation.
    pub fn begin_save(&mut self) -> Result<SaveRequest> {
        self.ensure_mutable()?;

        let errors = self.working.validate();
        if !errors.is_empty() {
            return Err(TabulaError::Validation(ValidationError::summarize(&errors)));
        }

        self.drag = None;
        self.save_in_flight = true;
        let target = match self.working.id {
            Some(id) => SaveTarget::Replace(id),
            None => SaveTarget::Create,
        };
        tracing::debug!(session_id = %self.id, ?target, "save started");

        Ok(SaveRequest {
            snapshot: self.working.clone(),
            target,
        })
    }

    /// Complete a save started with [`EditSession::begin_save`].
    ///
    /// On success the registry's record becomes the working copy, the session
    /// is clean and back in `Viewing`. On failure the session stays in
    /// `Editing` with the working copy intact so the save can be retried.
    pub fn finish_save(&mut self, result: Result<Table>) -> Result<TableId> {
        self.save_in_flight = false;

        let stored = match result {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(session_id = %self.id, error = %e, "save failed");
                return Err(e);
            }
        };
        let table_id = stored.id.ok_or_else(|| {
            TabulaError::Storage("registry returned a table without an id".into())
        })?;

        let created = self.origin.is_none();
        self.working = stored;
        self.origin = Some(table_id);
        self.dirty = false;
        self.switch_to_viewing();
        self.events.push(TableEditorEvent::Saved { table_id, created });
        tracing::info!(session_id = %self.id, %table_id, created, "table saved");

        Ok(table_id)
    }

    /// Save the working copy to `registry` and return its id
    pub async fn save(&mut self, registry: &dyn TableRegistry) -> Result<TableId> {
        let request = self.begin_save()?;
        let result = request.execute(registry).await;
        self.finish_save(result)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn ensure_not_saving(&self) -> Result<()> {
        if self.save_in_flight {
            return Err(TabulaError::SaveInFlight);
        }
        Ok(())
    }

    fn ensure_mutable(&self) -> Result<()> {
        self.ensure_not_saving()?;
        if self.mode != ViewMode::Editing {
            return Err(TabulaError::ReadOnly);
        }
        Ok(())
    }

    fn record(&mut self, event: TableEditorEvent) {
        self.dirty = true;
        self.events.push(event);
    }
}
