//! Tabula Core - shared vocabulary for the table editor
//!
//! This crate provides the fundamental types that all other Tabula crates
//! depend on:
//!
//! - `TableId`, `ColumnId`, `RowId` - stable identities
//! - `ColumnType` - advisory type tags that drive input rendering
//! - `CellValue` - the untyped-at-rest cell payload
//! - `StructuralOp` - the column edits gated by the "columns locked" flag
//! - `TabulaError` - the error taxonomy shared by every layer

mod error;
mod types;

pub use error::*;
pub use types::*;
