//! CSV input for the command line: whole tables read into memory, columns
//! pulled out as text or numbers.

use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::path::Path;
use tracing::info;

use geomapper::infer::NumericColumn;

/// A CSV file held in memory
pub struct Table {
    headers: StringRecord,
    rows: Vec<StringRecord>,
}

impl Table {
    pub fn read(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open CSV file {}", path.display()))?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let headers = reader.headers()?.clone();
        let rows = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("Failed to parse CSV file {}", path.display()))?;

        info!("Read {} rows from {}", rows.len(), path.display());
        Ok(Self { headers, rows })
    }

    fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h.trim() == name)
            .with_context(|| format!("Column '{}' not found", name))
    }

    fn cells(&self, index: usize) -> impl Iterator<Item = &str> {
        self.rows.iter().map(move |row| row.get(index).unwrap_or("").trim())
    }

    /// Column as text; missing cells are empty
    pub fn strings(&self, name: &str) -> Result<Vec<String>> {
        let index = self.column_index(name)?;
        Ok(self.cells(index).map(str::to_string).collect())
    }

    /// Column as numbers; empty or unparsable cells are NaN
    pub fn numbers(&self, name: &str) -> Result<Vec<f64>> {
        let index = self.column_index(name)?;
        Ok(self.cells(index).map(parse_number).collect())
    }

    /// Columns whose non-empty cells are all numbers
    pub fn numeric_columns(&self) -> Vec<NumericColumn> {
        self.headers
            .iter()
            .enumerate()
            .filter(|&(index, _)| {
                let mut cells = self.cells(index).filter(|c| !c.is_empty()).peekable();
                cells.peek().is_some() && cells.all(|c| c.parse::<f64>().is_ok())
            })
            .map(|(index, name)| {
                NumericColumn::new(name.trim(), self.cells(index).map(parse_number).collect())
            })
            .collect()
    }
}

fn parse_number(cell: &str) -> f64 {
    cell.parse().unwrap_or(f64::NAN)
}
