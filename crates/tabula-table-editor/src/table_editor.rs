//! Table editing engine for Tabula
//!
//! The in-memory model of an ad-hoc table, the overlay of disabled cells,
//! rows and columns, the sort and reorder engines, and edit sessions that
//! reconcile a working copy with a [`TableRegistry`].
//!
//! ## Features
//!
//! - Ordered columns with advisory type tags and stable ids
//! - Sparse rows keyed by column id
//! - Per-cell, per-row and per-column disabling plus a table-wide column lock
//! - Stable single-column sort as a derived view
//! - Drag-and-drop reorder applied as one splice on drop
//! - Viewing/Editing sessions with a serialised save protocol
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tabula_table_editor::{DragItem, TableLoader};
//!
//! let mut session = TableLoader::open(registry.as_ref(), table_id).await?;
//! session.enter_edit()?;
//! let notes = session.add_column("Notes", ColumnType::Text)?;
//! session.begin_drag(DragItem::Column(notes))?;
//! session.drop_at(0)?;
//! session.save(registry.as_ref()).await?;
//! ```

pub mod events;
pub mod hooks;
pub mod models;
pub mod reorder;
pub mod service;
pub mod session;
pub mod sort;

// Re-exports for convenience
pub use events::{AlertLevel, AlertTimers, Notification, TableEditorEvent};
pub use hooks::{ConfirmRequest, ConfirmationGate, Confirmed, DestructiveAction, EditorHooks};
pub use models::{AccessOverlay, CellKey, CellWrite, Column, Row, Table, ValidationError};
pub use reorder::{DragItem, DragKind, DragState, apply_drop, splice_move};
pub use service::{TableDraft, TableLoader, TableRegistry, TableSummary};
pub use session::{EditSession, SaveRequest, SaveTarget, ViewMode};
pub use sort::{SortOrder, SortState, compare_cells, sorted_view};
