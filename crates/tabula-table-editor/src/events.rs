//! Events emitted by edit sessions
//!
//! Sessions record one event per successful mutation. The owner of the
//! session drains them and hands each to the notification hook together with
//! the alert it maps to, if any.

use serde::{Deserialize, Serialize};
use tabula_core::{ColumnId, RowId, TableId, TabulaError};

use crate::reorder::DragKind;

/// Events emitted by an [`crate::EditSession`] or the service driving it
#[derive(Debug, Clone, PartialEq)]
pub enum TableEditorEvent {
    /// The session switched to editing
    EditStarted,
    /// The session switched back to read-only viewing
    EditFinished,
    TableRenamed {
        name: String,
    },
    ColumnAdded {
        column: ColumnId,
        name: String,
    },
    ColumnRemoved {
        column: ColumnId,
    },
    /// Rename, retype or option change
    ColumnUpdated {
        column: ColumnId,
    },
    RowAdded {
        row: RowId,
    },
    RowRemoved {
        row: RowId,
    },
    CellUpdated {
        row: RowId,
        column: ColumnId,
    },
    /// A reorder was applied on drop
    Reordered {
        kind: DragKind,
        from: usize,
        to: usize,
    },
    AccessChanged,
    ColumnsLockChanged {
        locked: bool,
    },
    /// The working copy was committed to the registry
    Saved {
        table_id: TableId,
        created: bool,
    },
    /// A table was deleted from the registry
    Deleted {
        table_id: TableId,
        name: String,
    },
    /// The working copy was abandoned without saving
    Discarded,
    /// An operation was refused
    Rejected {
        message: String,
    },
}

impl TableEditorEvent {
    pub fn rejected(error: &TabulaError) -> Self {
        TableEditorEvent::Rejected {
            message: error.to_string(),
        }
    }

    /// The alert shown for this event, if it warrants one
    pub fn notification(&self, timers: &AlertTimers) -> Option<Notification> {
        match self {
            TableEditorEvent::Saved { created, .. } => Some(Notification::new(
                AlertLevel::Success,
                "Saved",
                if *created {
                    "Table created successfully"
                } else {
                    "Table saved successfully"
                },
                timers.save_secs,
            )),
            TableEditorEvent::Deleted { name, .. } => Some(Notification::new(
                AlertLevel::Success,
                "Deleted",
                format!("Table \"{}\" was deleted", name),
                timers.save_secs,
            )),
            TableEditorEvent::Reordered { kind, .. } => Some(Notification::new(
                AlertLevel::Success,
                "Reordered",
                match kind {
                    DragKind::Column => "Column order updated",
                    DragKind::Row => "Row order updated",
                },
                timers.reorder_secs,
            )),
            TableEditorEvent::ColumnsLockChanged { locked } => Some(Notification::new(
                AlertLevel::Info,
                if *locked {
                    "Columns locked"
                } else {
                    "Columns unlocked"
                },
                if *locked {
                    "Columns can no longer be added, removed, renamed or moved"
                } else {
                    "Columns can be edited again"
                },
                timers.lock_secs,
            )),
            TableEditorEvent::Rejected { message } => Some(Notification::new(
                AlertLevel::Warning,
                "Not allowed",
                message.clone(),
                timers.warning_secs,
            )),
            _ => None,
        }
    }
}

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A user-facing alert; `timer_secs` is how long it stays up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: AlertLevel,
    pub title: String,
    pub message: String,
    pub timer_secs: u64,
}

impl Notification {
    pub fn new(
        level: AlertLevel,
        title: impl Into<String>,
        message: impl Into<String>,
        timer_secs: u64,
    ) -> Self {
        Self {
            level,
            title: title.into(),
            message: message.into(),
            timer_secs,
        }
    }

    /// Alert for a failed save or other persistence error
    pub fn error(message: impl Into<String>, timers: &AlertTimers) -> Self {
        Self::new(AlertLevel::Error, "Error", message, timers.warning_secs)
    }
}

/// Auto-dismiss timers for alerts, in seconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertTimers {
    pub save_secs: u64,
    pub warning_secs: u64,
    pub reorder_secs: u64,
    pub lock_secs: u64,
    /// Delay before a destructive confirmation can be accepted
    pub delete_cooldown_secs: u64,
}

impl Default for AlertTimers {
    fn default() -> Self {
        Self {
            save_secs: 3,
            warning_secs: 3,
            reorder_secs: 2,
            lock_secs: 2,
            delete_cooldown_secs: 5,
        }
    }
}
