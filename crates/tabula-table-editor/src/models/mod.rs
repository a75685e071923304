//! Models for table editing
//!
//! Core data structures for a table's columns, rows, cell values and the
//! overlay of disabled cells, rows and columns.

mod access;
mod column;
mod row;
mod table;
mod validation;

pub use access::{AccessOverlay, CellKey};
pub use column::Column;
pub use row::Row;
pub use table::{CellWrite, Table};
pub use validation::ValidationError;
