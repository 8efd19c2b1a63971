//! Output format abstraction.

use coinshell_types::{Candle, CoinshellError, Table};
use std::io::Write;
use thiserror::Error;

/// Output format identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    /// Aligned, human-readable text table.
    #[default]
    Table,
    /// CSV format.
    Csv,
    /// Tab-separated values.
    Tsv,
    /// JSON array format.
    Json,
    /// Newline-delimited JSON, one object per row.
    Ndjson,
}

impl OutputFormat {
    /// Returns the format name as accepted on the command line.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Csv => "csv",
            Self::Tsv => "tsv",
            Self::Json => "json",
            Self::Ndjson => "ndjson",
        }
    }

    /// Returns all available formats.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Table, Self::Csv, Self::Tsv, Self::Json, Self::Ndjson]
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.to_lowercase();
        if name == "text" {
            return Ok(Self::Table);
        }
        Self::all()
            .iter()
            .copied()
            .find(|format| format.as_str() == name)
            .ok_or_else(|| FormatError::UnknownFormat(s.to_string()))
    }
}

/// Errors that can occur during formatting.
#[derive(Error, Debug)]
pub enum FormatError {
    /// Unknown output format.
    #[error("Unknown format: {0}, expected one of: table, csv, tsv, json, ndjson")]
    UnknownFormat(String),

    /// Sorting referenced a column the table does not have.
    #[error(transparent)]
    Table(#[from] CoinshellError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// How a table is ordered and cut before it is written.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderOptions {
    /// Column to sort by.
    pub sort_by: Option<String>,
    /// Sort from largest to smallest, or reverse the rows when unsorted.
    pub descending: bool,
    /// Maximum number of rows, applied after sorting.
    pub limit: Option<usize>,
}

impl RenderOptions {
    /// Creates options that keep the table as is.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sort_by: None,
            descending: false,
            limit: None,
        }
    }

    /// Sets the sort column and direction.
    #[must_use]
    pub fn with_sort(mut self, column: impl Into<String>, descending: bool) -> Self {
        self.sort_by = Some(column.into());
        self.descending = descending;
        self
    }

    /// Reverses the incoming row order when no sort column is set.
    #[must_use]
    pub const fn with_descending(mut self, descending: bool) -> Self {
        self.descending = descending;
        self
    }

    /// Sets the row limit.
    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Returns a sorted and truncated copy of `table`.
    ///
    /// The sort is stable; a limit larger than the table keeps every row.
    /// Without a sort column, `descending` reverses the rows.
    ///
    /// # Errors
    ///
    /// Returns an error naming the valid columns if `sort_by` is unknown.
    pub fn apply(&self, table: &Table) -> Result<Table, FormatError> {
        let mut table = table.clone();
        match &self.sort_by {
            Some(column) => table.sort_by_column(column, self.descending)?,
            None if self.descending => table.reverse(),
            None => {}
        }
        if let Some(limit) = self.limit {
            table.truncate(limit);
        }
        Ok(table)
    }
}

/// Trait for output formatters.
pub trait Formatter: Send + Sync {
    /// Writes a table to the output.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_table<W: Write + Send>(&self, table: &Table, writer: W) -> Result<(), FormatError>;

    /// Writes a price/volume series to the output.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_candles<W: Write + Send>(
        &self,
        candles: &[Candle],
        title: &str,
        writer: W,
    ) -> Result<(), FormatError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use coinshell_types::Cell;

    fn table() -> Table {
        let mut table = Table::new(["name", "price"]);
        for (name, price) in [("b", 2.0), ("a", 3.0), ("c", 1.0), ("d", 4.0)] {
            table.push_row(vec![Cell::text(name), Cell::Float(price)]);
        }
        table
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("CSV".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Table);
        assert_eq!("NDJSON".parse::<OutputFormat>().unwrap(), OutputFormat::Ndjson);
        for format in OutputFormat::all() {
            assert_eq!(format.as_str().parse::<OutputFormat>().unwrap(), *format);
        }
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_descend_is_exact_reverse() {
        let asc = RenderOptions::new().with_sort("price", false).apply(&table()).unwrap();
        let desc = RenderOptions::new().with_sort("price", true).apply(&table()).unwrap();
        let mut reversed = asc.rows().to_vec();
        reversed.reverse();
        assert_eq!(desc.rows(), reversed.as_slice());
    }

    #[test]
    fn test_descending_without_sort_reverses_rows() {
        let top = RenderOptions::new()
            .with_descending(true)
            .with_limit(2)
            .apply(&table())
            .unwrap();
        assert_eq!(top.rows()[0][0], Cell::text("d"));
        assert_eq!(top.rows()[1][0], Cell::text("c"));
    }

    #[test]
    fn test_limit_after_sort() {
        let top = RenderOptions::new()
            .with_sort("price", true)
            .with_limit(2)
            .apply(&table())
            .unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top.rows()[0][0], Cell::text("d"));
        assert_eq!(top.rows()[1][0], Cell::text("a"));

        let all = RenderOptions::new().with_limit(50).apply(&table()).unwrap();
        assert_eq!(all.len(), 4);
    }

    #[test]
    fn test_unknown_sort_column_lists_columns() {
        let err = RenderOptions::new()
            .with_sort("volume", false)
            .apply(&table())
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("volume"));
        assert!(message.contains("name, price"));
    }
}
