//! Command-line surface
//!
//! Each editing command runs one session end to end: open the table, enter
//! editing mode, apply the change, save, close.

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use comfy_table::{Attribute, Cell, ContentArrangement, Table as TextTable, presets::UTF8_FULL};
use std::path::PathBuf;
use tabula_core::{CellValue, ColumnId, ColumnType, RowId, TableId};
use tabula_services::{
    DragItem, EditSession, TableEditService, TableListFilter, TableSummary, TableView,
};
use tabula_table_editor::{CellWrite, SortOrder, Table};
use uuid::Uuid;

use crate::app_init::AppState;

#[derive(Debug, Parser)]
#[command(name = "tabula", version, about = "Edit user-defined tables from the terminal")]
pub struct Cli {
    /// Print debug logs to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Answer yes to confirmation prompts (cooldowns still apply)
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    /// Tables file to use instead of the configured one
    #[arg(long, env = "TABULA_TABLES_FILE", global = true)]
    pub tables_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List stored tables
    List {
        /// Only tables owned by the configured owner
        #[arg(long)]
        mine: bool,
        #[arg(long)]
        json: bool,
    },
    /// Print a table
    Show {
        id: u64,
        /// Sort the printed rows by this column
        #[arg(long)]
        sort: Option<String>,
        /// Sort descending
        #[arg(long, requires = "sort")]
        desc: bool,
        #[arg(long)]
        json: bool,
    },
    /// Create a table from the starter template
    New {
        /// Defaults to the configured new table name
        name: Option<String>,
    },
    /// Rename a table
    Rename { id: u64, name: String },
    /// Append a column
    AddColumn {
        id: u64,
        name: String,
        /// text, number, timestamp or list
        #[arg(long = "type", default_value = "text", value_parser = parse_column_type)]
        column_type: ColumnType,
        /// Comma separated options for a list column
        #[arg(long, value_delimiter = ',')]
        options: Vec<String>,
    },
    /// Remove a column
    RemoveColumn { id: u64, column: String },
    /// Rename a column
    RenameColumn {
        id: u64,
        column: String,
        new_name: String,
    },
    /// Change a column's type tag
    RetypeColumn {
        id: u64,
        column: String,
        #[arg(value_parser = parse_column_type)]
        column_type: ColumnType,
    },
    /// Append a row, optionally filling cells in column order
    AddRow { id: u64, values: Vec<String> },
    /// Remove a row
    RemoveRow { id: u64, row: u64 },
    /// Write one cell
    Set {
        id: u64,
        row: u64,
        column: String,
        value: String,
    },
    /// Move a column to a 1-based position
    MoveColumn { id: u64, column: String, to: usize },
    /// Move a row to a 1-based position
    MoveRow { id: u64, row: u64, to: usize },
    /// Disable or re-enable a whole row
    ToggleRow { id: u64, row: u64 },
    /// Disable or re-enable a whole column
    ToggleColumn { id: u64, column: String },
    /// Disable or re-enable one cell
    ToggleCell { id: u64, row: u64, column: String },
    /// Lock the column structure
    Lock { id: u64 },
    /// Unlock the column structure
    Unlock { id: u64 },
    /// Delete a table
    Delete { id: u64 },
}

fn parse_column_type(value: &str) -> std::result::Result<ColumnType, String> {
    ColumnType::from_name(value).ok_or_else(|| {
        let names: Vec<_> = ColumnType::ALL.iter().map(|t| t.name()).collect();
        format!("unknown column type '{}', expected one of {}", value, names.join(", "))
    })
}

pub async fn run(command: Command, state: &AppState) -> Result<()> {
    let service = state.service.as_ref();

    match command {
        Command::List { mine, json } => {
            let filter = if mine {
                TableListFilter::OwnedBy(state.settings.editor.default_owner.clone())
            } else {
                TableListFilter::All
            };
            let tables = service.list_tables(filter).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&tables)?);
            } else if tables.is_empty() {
                println!("No tables");
            } else {
                println!("{}", render_summaries(&tables));
            }
        }
        Command::Show {
            id,
            sort,
            desc,
            json,
        } => {
            let session = service.open_table(TableId(id)).await?;
            if let Some(name) = sort {
                let column = resolve_column(service, session, &name)?;
                service.edit(session, |s| s.toggle_sort(column))?;
                if desc {
                    service.edit(session, |s| s.toggle_sort(column))?;
                }
            }
            let view = service.view(session)?;
            service.close_session(session).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                println!("{} (#{}, owner {})", view.name, id, view.owner);
                println!("{}", render_view(&view));
            }
        }
        Command::New { name } => {
            let session = service.new_table();
            if let Some(name) = name {
                service.edit(session, |s| s.rename_table(name))?;
            }
            let id = service.save(session).await?;
            service.close_session(session).await?;
            println!("Created table {}", id);
        }
        Command::Rename { id, name } => {
            EditRun::open(service, id)
                .await?
                .apply(|s| s.rename_table(name))?
                .commit()
                .await?;
        }
        Command::AddColumn {
            id,
            name,
            column_type,
            options,
        } => {
            let run = EditRun::open(service, id).await?;
            let column = run.service.edit(run.session, |s| s.add_column(name, column_type))?;
            if !options.is_empty() {
                run.service
                    .edit(run.session, |s| s.set_column_options(column, options))?;
            }
            run.commit().await?;
        }
        Command::RemoveColumn { id, column } => {
            let run = EditRun::open(service, id).await?;
            let column = run.column(&column)?;
            run.apply(|s| s.remove_column(column))?.commit().await?;
        }
        Command::RenameColumn {
            id,
            column,
            new_name,
        } => {
            let run = EditRun::open(service, id).await?;
            let column = run.column(&column)?;
            run.apply(|s| s.rename_column(column, new_name))?
                .commit()
                .await?;
        }
        Command::RetypeColumn {
            id,
            column,
            column_type,
        } => {
            let run = EditRun::open(service, id).await?;
            let column = run.column(&column)?;
            run.apply(|s| s.retype_column(column, column_type))?
                .commit()
                .await?;
        }
        Command::AddRow { id, values } => {
            let run = EditRun::open(service, id).await?;
            let columns = run.service.inspect(run.session, |s| s.table().columns().to_vec())?;
            if values.len() > columns.len() {
                bail!(
                    "{} values given but the table has {} columns",
                    values.len(),
                    columns.len()
                );
            }
            let row = run.service.edit(run.session, |s| s.add_row())?;
            for (column, input) in columns.iter().zip(&values) {
                let value = column.parse_input(input);
                run.service
                    .edit(run.session, |s| s.set_cell(row, column.id, value))?;
            }
            run.commit().await?;
            println!("Added row {}", row);
        }
        Command::RemoveRow { id, row } => {
            EditRun::open(service, id)
                .await?
                .apply(|s| s.remove_row(RowId(row)))?
                .commit()
                .await?;
        }
        Command::Set {
            id,
            row,
            column,
            value,
        } => {
            let run = EditRun::open(service, id).await?;
            let column = run.column(&column)?;
            let value = run.service.inspect(run.session, |s| parse_for(s, column, &value))??;
            let write = run.service.edit(run.session, |s| s.set_cell(RowId(row), column, value))?;
            if write == CellWrite::Stored {
                run.commit().await?;
            } else {
                println!("Cell is disabled; nothing changed");
            }
        }
        Command::MoveColumn { id, column, to } => {
            let run = EditRun::open(service, id).await?;
            let column = run.column(&column)?;
            let target = position(to)?;
            run.apply(|s| {
                s.begin_drag(DragItem::Column(column))?;
                s.drop_at(target)
            })?
            .commit()
            .await?;
        }
        Command::MoveRow { id, row, to } => {
            let target = position(to)?;
            EditRun::open(service, id)
                .await?
                .apply(|s| {
                    s.begin_drag(DragItem::Row(RowId(row)))?;
                    s.drop_at(target)
                })?
                .commit()
                .await?;
        }
        Command::ToggleRow { id, row } => {
            let run = EditRun::open(service, id).await?;
            let disabled = run.service.edit(run.session, |s| s.toggle_row_disabled(RowId(row)))?;
            run.commit().await?;
            println!("Row {} {}", row, enabled_word(disabled));
        }
        Command::ToggleColumn { id, column } => {
            let run = EditRun::open(service, id).await?;
            let column_id = run.column(&column)?;
            let disabled = run
                .service
                .edit(run.session, |s| s.toggle_column_disabled(column_id))?;
            run.commit().await?;
            println!("Column {} {}", column, enabled_word(disabled));
        }
        Command::ToggleCell { id, row, column } => {
            let run = EditRun::open(service, id).await?;
            let column_id = run.column(&column)?;
            let disabled = run
                .service
                .edit(run.session, |s| s.toggle_cell_disabled(RowId(row), column_id))?;
            run.commit().await?;
            println!("Cell {}/{} {}", row, column, enabled_word(disabled));
        }
        Command::Lock { id } => {
            EditRun::open(service, id)
                .await?
                .apply(|s| s.set_columns_locked(true))?
                .commit()
                .await?;
        }
        Command::Unlock { id } => {
            EditRun::open(service, id)
                .await?
                .apply(|s| s.set_columns_locked(false))?
                .commit()
                .await?;
        }
        Command::Delete { id } => {
            service.delete_table(TableId(id)).await?;
        }
    }

    Ok(())
}

/// An editing session opened for one command
struct EditRun<'a> {
    service: &'a TableEditService,
    session: Uuid,
}

impl<'a> EditRun<'a> {
    async fn open(service: &'a TableEditService, id: u64) -> Result<EditRun<'a>> {
        let session = service.open_table(TableId(id)).await?;
        service.edit(session, |s| s.enter_edit())?;
        Ok(Self { service, session })
    }

    fn column(&self, name: &str) -> Result<ColumnId> {
        resolve_column(self.service, self.session, name)
    }

    fn apply(self, f: impl FnOnce(&mut EditSession) -> tabula_core::Result<()>) -> Result<Self> {
        self.service.edit(self.session, f)?;
        Ok(self)
    }

    /// Save and close. On error the session is left open; it ends with the
    /// process.
    async fn commit(self) -> Result<TableId> {
        let id = self.service.save(self.session).await?;
        self.service.close_session(self.session).await?;
        Ok(id)
    }
}

/// Find a column by name, falling back to its numeric id
fn resolve_column(service: &TableEditService, session: Uuid, name: &str) -> Result<ColumnId> {
    service
        .inspect(session, |s| find_column(s.table(), name))?
        .with_context(|| format!("No column named '{}'", name))
}

fn find_column(table: &Table, name: &str) -> Option<ColumnId> {
    table
        .columns()
        .iter()
        .find(|c| c.name == name)
        .or_else(|| {
            let id = name.parse::<u64>().ok()?;
            table.column(ColumnId(id))
        })
        .map(|c| c.id)
}

fn parse_for(session: &EditSession, column: ColumnId, input: &str) -> Result<CellValue> {
    session
        .table()
        .column(column)
        .map(|c| c.parse_input(input))
        .ok_or_else(|| anyhow!("Unknown column: {}", column))
}

fn position(one_based: usize) -> Result<usize> {
    one_based
        .checked_sub(1)
        .context("Positions start at 1")
}

fn enabled_word(disabled: bool) -> &'static str {
    if disabled { "disabled" } else { "enabled" }
}

pub fn render_summaries(tables: &[TableSummary]) -> TextTable {
    let mut out = TextTable::new();
    out.load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["ID", "Name", "Owner", "Columns", "Rows"]);
    for table in tables {
        out.add_row(vec![
            Cell::new(table.id),
            Cell::new(&table.name),
            Cell::new(&table.owner),
            Cell::new(table.column_count),
            Cell::new(table.row_count),
        ]);
    }
    out
}

pub fn render_view(view: &TableView) -> TextTable {
    let mut header = vec![Cell::new("#")];
    header.extend(view.columns.iter().map(|column| {
        let mut label = format!("{} ({})", column.name, column.column_type);
        if column.sort != SortOrder::None {
            label.push(' ');
            label.push_str(column.sort.symbol());
        }
        let cell = Cell::new(label);
        if column.disabled {
            cell.add_attribute(Attribute::Dim)
        } else {
            cell
        }
    }));

    let mut out = TextTable::new();
    out.load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);

    for row in &view.rows {
        let mut cells = vec![Cell::new(row.id)];
        cells.extend(row.cells.iter().map(|cell| {
            let rendered = Cell::new(&cell.text);
            if cell.disabled {
                rendered.add_attribute(Attribute::Dim)
            } else {
                rendered
            }
        }));
        out.add_row(cells);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_edit_command() {
        let cli = Cli::try_parse_from([
            "tabula", "-y", "add-column", "3", "Status", "--type", "list", "--options", "Open,Done",
        ])
        .unwrap();

        assert!(cli.yes);
        match cli.command {
            Command::AddColumn {
                id,
                name,
                column_type,
                options,
            } => {
                assert_eq!(id, 3);
                assert_eq!(name, "Status");
                assert_eq!(column_type, ColumnType::List);
                assert_eq!(options, vec!["Open", "Done"]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_unknown_column_type_is_rejected() {
        let result = Cli::try_parse_from(["tabula", "add-column", "1", "X", "--type", "blob"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_desc_requires_sort() {
        assert!(Cli::try_parse_from(["tabula", "show", "1", "--desc"]).is_err());
        assert!(Cli::try_parse_from(["tabula", "show", "1", "--sort", "Name", "--desc"]).is_ok());
    }

    #[test]
    fn test_find_column_by_name_or_id() {
        let table = Table::with_columns(
            "T",
            "alice",
            [("ID", ColumnType::Number), ("Name", ColumnType::Text)],
        )
        .unwrap();
        let name_id = table.columns()[1].id;

        assert_eq!(find_column(&table, "Name"), Some(name_id));
        assert_eq!(find_column(&table, &name_id.to_string()), Some(name_id));
        assert_eq!(find_column(&table, "Missing"), None);
    }

    #[test]
    fn test_positions_are_one_based() {
        assert_eq!(position(1).unwrap(), 0);
        assert!(position(0).is_err());
    }
}
