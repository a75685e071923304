//! Tabula Services Layer
//!
//! This crate provides the service layer that sits between a front end and
//! the table editing engine. Services orchestrate sessions, the registry and
//! notifications behind one API.
//!
//! # Architecture
//!
//! ```text
//! Front end (tabula-app)
//!     ↓
//! Service Layer (tabula-services) ← This crate
//!     ↓
//! Domain Layer (tabula-table-editor, tabula-registry)
//!     ↓
//! Infrastructure Layer (tabula-core)
//! ```
//!
//! # Services
//!
//! - [`TableEditService`] - Table listing, edit sessions, save and delete
//!
//! # Design Principles
//!
//! 1. **No UI dependencies** - Alerts and confirmations go through [`EditorHooks`]
//! 2. **Return ViewModels** - [`TableView`] is render-ready
//! 3. **Centralize logic** - Save serialisation and confirmation live here
//!
//! [`EditorHooks`]: tabula_table_editor::EditorHooks

mod error;
mod table_edit_service;
mod view_models;

pub use error::{ServiceError, ServiceResult};
pub use table_edit_service::{ServiceSettings, TableEditService, TableListFilter};
pub use view_models::{CellView, ColumnView, RowView, TableView};

// Re-export editing types used with the service
pub use tabula_core::{CellValue, ColumnId, ColumnType, RowId, TableId};
pub use tabula_table_editor::{
    AlertLevel, AlertTimers, ConfirmRequest, Confirmed, DestructiveAction, DragItem, EditSession,
    EditorHooks, Notification, TableEditorEvent, TableRegistry, TableSummary,
};
