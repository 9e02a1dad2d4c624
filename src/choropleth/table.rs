//! In-memory value table for the choropleth join.

use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;

use crate::error::{Result, VizError};

/// Column-named table of text cells.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DataTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl DataTable {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row; it must have one cell per column.
    pub fn push_row<S: Into<String>>(&mut self, row: impl IntoIterator<Item = S>) -> Result<()> {
        let row: Vec<String> = row.into_iter().map(Into::into).collect();
        if row.len() != self.columns.len() {
            return Err(VizError::LengthMismatch {
                what: "table row/columns",
                left: row.len(),
                right: self.columns.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Builder-style [`push_row`](Self::push_row).
    pub fn with_row<S: Into<String>>(mut self, row: impl IntoIterator<Item = S>) -> Result<Self> {
        self.push_row(row)?;
        Ok(self)
    }

    /// Read a headered CSV document.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::None)
            .from_reader(reader);
        let mut table = DataTable {
            columns: rdr.headers()?.iter().map(str::to_string).collect(),
            rows: Vec::new(),
        };
        for record in rdr.records() {
            table.push_row(record?.iter())?;
        }
        Ok(table)
    }

    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(std::io::BufReader::new(file))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Index of `name`, or a configuration error listing the available columns.
    pub(crate) fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| VizError::Configuration {
                column: name.to_string(),
                source_name: "value table",
                available: self.columns.clone(),
            })
    }

    /// Cells of one column, in row order.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &str>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |r| r[idx].as_str()))
    }

    pub fn rows(&self) -> impl Iterator<Item = &[String]> {
        self.rows.iter().map(Vec::as_slice)
    }
}

/// Join-key normalization: trimmed and lowercased.
pub fn normalize_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Parse a cell as a finite number; anything else is missing.
pub fn coerce_numeric(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
