//! Output rendering for query results and history

use std::fmt;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Color, ContentArrangement, Table};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde::Deserialize;

use crate::engine::Value;
use crate::error::{CsvqlError, Result};
use crate::history::HistoryLog;
use crate::projection::ResultTable;

/// Output format for query results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Table => "table",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        })
    }
}

/// Render a result in the requested format
pub fn render_result(table: &ResultTable, format: OutputFormat, color: bool) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(render_table(table, color)),
        OutputFormat::Json => render_json(table),
        OutputFormat::Csv => render_csv(table),
    }
}

/// Grid of the result followed by the record count.
pub fn render_table(table: &ResultTable, color: bool) -> String {
    let mut footer = record_count(table.len());
    if table.truncated {
        footer.push_str(" (truncated at row limit)");
    }
    if table.columns.is_empty() {
        return footer;
    }

    let mut grid = Table::new();
    grid.load_preset(UTF8_FULL_CONDENSED);
    grid.set_content_arrangement(ContentArrangement::Dynamic);
    if !color {
        grid.force_no_tty();
    }

    grid.set_header(
        table
            .columns
            .iter()
            .map(|c| Cell::new(c).fg(Color::Cyan))
            .collect::<Vec<_>>(),
    );
    for row in &table.rows {
        grid.add_row(row.iter().map(|cell| Cell::new(cell_text(cell))).collect::<Vec<_>>());
    }

    format!("{}\n{}", grid, footer)
}

/// `"<n> Records"` label shown under a result grid
pub fn record_count(n: usize) -> String {
    format!("{} Records", n)
}

/// Rows as a JSON array of objects, keys in column order.
pub fn render_json(table: &ResultTable) -> Result<String> {
    Ok(serde_json::to_string_pretty(&JsonRows(table))?)
}

/// Header line plus one line per row.
pub fn render_csv(table: &ResultTable) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    if !table.columns.is_empty() {
        writer.write_record(&table.columns)?;
    }
    for row in &table.rows {
        writer.write_record(row.iter().map(csv_field))?;
    }
    writer.flush()?;

    let bytes = writer
        .into_inner()
        .map_err(|e| CsvqlError::Io(e.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|e| CsvqlError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

/// Numbered listing of the session history, oldest first.
pub fn render_history(log: &HistoryLog) -> String {
    if log.is_empty() {
        return "(no history)".to_string();
    }
    let width = log.len().to_string().len();
    log.iter()
        .enumerate()
        .map(|(i, statement)| format!("{:>width$}  {}", i + 1, statement, width = width))
        .collect::<Vec<_>>()
        .join("\n")
}

fn cell_text(cell: &Option<Value>) -> String {
    match cell {
        Some(value) => value.to_string(),
        None => String::new(),
    }
}

fn csv_field(cell: &Option<Value>) -> String {
    match cell {
        Some(Value::Null) | None => String::new(),
        Some(value) => value.to_string(),
    }
}

struct JsonRows<'a>(&'a ResultTable);

struct JsonRow<'a> {
    columns: &'a [String],
    cells: &'a [Option<Value>],
}

impl Serialize for JsonRows<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.rows.len()))?;
        for cells in &self.0.rows {
            seq.serialize_element(&JsonRow {
                columns: &self.0.columns,
                cells,
            })?;
        }
        seq.end()
    }
}

impl Serialize for JsonRow<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (column, cell) in self.columns.iter().zip(self.cells) {
            if let Some(value) = cell {
                map.serialize_entry(column, value)?;
            }
        }
        map.end()
    }
}
