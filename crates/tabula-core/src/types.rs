//! Core types for Tabula

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }
    };
}

id_type!(
    /// Persisted identity of a table, assigned by the registry
    TableId
);
id_type!(
    /// Identity of a column, unique within its table and stable across
    /// renames and reorders
    ColumnId
);
id_type!(
    /// Identity of a row, unique within its table
    RowId
);

/// Advisory type tag of a column
///
/// The tag drives input rendering; it is not enforced when a cell is written
/// unless strict typing is switched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    #[default]
    Text,
    Number,
    Timestamp,
    List,
}

impl ColumnType {
    pub const ALL: [ColumnType; 4] = [
        ColumnType::Text,
        ColumnType::Number,
        ColumnType::Timestamp,
        ColumnType::List,
    ];

    /// Wire name of the tag
    pub fn name(&self) -> &'static str {
        match self {
            ColumnType::Text => "text",
            ColumnType::Number => "number",
            ColumnType::Timestamp => "timestamp",
            ColumnType::List => "list",
        }
    }

    /// Get display name for the type picker
    pub fn display_name(&self) -> &'static str {
        match self {
            ColumnType::Text => "Text",
            ColumnType::Number => "Number",
            ColumnType::Timestamp => "Date/Time",
            ColumnType::List => "List",
        }
    }

    /// Parse a wire name, case-insensitively
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "text" => Some(ColumnType::Text),
            "number" => Some(ColumnType::Number),
            "timestamp" | "date" => Some(ColumnType::Timestamp),
            "list" => Some(ColumnType::List),
            _ => None,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A cell value as stored in a row
///
/// Values are untyped at rest: a `Number` column may hold `Text` and the
/// other way around. Interpretation happens at render time.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum CellValue {
    /// No value; rendered as an empty string
    #[default]
    Empty,
    /// Free text
    Text(String),
    /// Numeric value
    Number(f64),
    /// Point in time (UTC)
    Timestamp(DateTime<Utc>),
    /// One of a list column's options
    Choice(String),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    pub fn choice(value: impl Into<String>) -> Self {
        CellValue::Choice(value.into())
    }

    /// Empty values and empty text both count as "no value"
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) | CellValue::Choice(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Try to get as a number; text that parses as a number counts
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(v) => Some(*v),
            CellValue::Text(s) | CellValue::Choice(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Try to get as a timestamp
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            CellValue::Timestamp(ts) => Some(*ts),
            CellValue::Text(s) => DateTime::parse_from_rfc3339(s.trim())
                .ok()
                .map(|ts| ts.with_timezone(&Utc)),
            _ => None,
        }
    }

    /// Try to get as a string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) | CellValue::Choice(s) => Some(s),
            _ => None,
        }
    }

    /// Ordering used by the sort engine.
    ///
    /// Values are ranked by class first: empty, then numeric (numbers and
    /// numeric text), then timestamps (including RFC 3339 text), then
    /// everything else. Within a class numbers compare numerically,
    /// timestamps chronologically and the rest lexically on the rendered
    /// text. This is a total order.
    pub fn sort_cmp(&self, other: &CellValue) -> Ordering {
        match (self.sort_key(), other.sort_key()) {
            (SortKey::Empty, SortKey::Empty) => Ordering::Equal,
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(&b),
            (SortKey::Timestamp(a), SortKey::Timestamp(b)) => a.cmp(&b),
            (SortKey::Text, SortKey::Text) => self.to_string().cmp(&other.to_string()),
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }

    fn sort_key(&self) -> SortKey {
        if self.is_empty() {
            SortKey::Empty
        } else if let Some(n) = self.as_number() {
            SortKey::Number(n)
        } else if let Some(ts) = self.as_timestamp() {
            SortKey::Timestamp(ts)
        } else {
            SortKey::Text
        }
    }
}

/// Class of a cell value for sorting
enum SortKey {
    Empty,
    Number(f64),
    Timestamp(DateTime<Utc>),
    Text,
}

impl SortKey {
    fn rank(&self) -> u8 {
        match self {
            SortKey::Empty => 0,
            SortKey::Number(_) => 1,
            SortKey::Timestamp(_) => 2,
            SortKey::Text => 3,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(v) | CellValue::Choice(v) => f.write_str(v),
            CellValue::Number(v) => write!(f, "{}", v),
            CellValue::Timestamp(v) => write!(f, "{}", v.to_rfc3339()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<DateTime<Utc>> for CellValue {
    fn from(value: DateTime<Utc>) -> Self {
        CellValue::Timestamp(value)
    }
}

/// A structural edit: any change to the column list's composition, naming,
/// typing or order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructuralOp {
    AddColumn,
    RemoveColumn,
    RenameColumn,
    RetypeColumn,
    SetColumnOptions,
    ReorderColumn,
}

impl StructuralOp {
    pub fn description(&self) -> &'static str {
        match self {
            StructuralOp::AddColumn => "add columns",
            StructuralOp::RemoveColumn => "remove columns",
            StructuralOp::RenameColumn => "rename columns",
            StructuralOp::RetypeColumn => "change column types",
            StructuralOp::SetColumnOptions => "change list options",
            StructuralOp::ReorderColumn => "move columns",
        }
    }
}

impl fmt::Display for StructuralOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}
