//! CSV output format.

use coinshell_types::{Candle, Cell, Table};
use std::io::Write;

use crate::{FormatError, Formatter};

/// CSV formatter.
#[derive(Debug, Clone)]
pub struct CsvFormatter {
    /// Field delimiter (default: comma).
    delimiter: char,
}

impl Default for CsvFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvFormatter {
    /// Creates a new CSV formatter with default settings.
    #[must_use]
    pub const fn new() -> Self {
        Self { delimiter: ',' }
    }

    /// Creates a tab-separated values (TSV) formatter.
    #[must_use]
    pub const fn tsv() -> Self {
        Self { delimiter: '\t' }
    }

    /// Quotes a field when it contains the delimiter, quotes or line breaks.
    fn escape(&self, field: &str) -> String {
        if field.contains([self.delimiter, '"', '\n', '\r']) {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }

    fn field(&self, cell: &Cell) -> String {
        match cell {
            Cell::Date(d) => d.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            other => self.escape(&other.to_string()),
        }
    }

    fn write_line<W: Write, I>(&self, writer: &mut W, fields: I) -> Result<(), FormatError>
    where
        I: IntoIterator<Item = String>,
    {
        let line = fields
            .into_iter()
            .collect::<Vec<_>>()
            .join(&self.delimiter.to_string());
        writeln!(writer, "{line}")?;
        Ok(())
    }
}

impl Formatter for CsvFormatter {
    fn write_table<W: Write + Send>(
        &self,
        table: &Table,
        mut writer: W,
    ) -> Result<(), FormatError> {
        self.write_line(&mut writer, table.columns().iter().map(|c| self.escape(c)))?;
        for row in table.rows() {
            self.write_line(&mut writer, row.iter().map(|cell| self.field(cell)))?;
        }
        Ok(())
    }

    fn write_candles<W: Write + Send>(
        &self,
        candles: &[Candle],
        _title: &str,
        mut writer: W,
    ) -> Result<(), FormatError> {
        let d = self.delimiter;

        writeln!(writer, "timestamp{d}open{d}high{d}low{d}close{d}volume")?;
        for c in candles {
            writeln!(
                writer,
                "{}{d}{}{d}{}{d}{}{d}{}{d}{}",
                c.timestamp.format("%Y-%m-%dT%H:%M:%SZ"),
                c.open,
                c.high,
                c.low,
                c.close,
                c.volume
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::io::Cursor;

    fn create_test_table() -> Table {
        let mut table = Table::new(["name", "price", "listed"]);
        let listed = Utc.with_ymd_and_hms(2024, 1, 15, 12, 30, 45).unwrap();
        table.push_row(vec![Cell::text("Bitcoin"), Cell::Float(42000.5), Cell::Date(listed)]);
        table.push_row(vec![Cell::text("Foo, \"Bar\""), Cell::Empty, Cell::Empty]);
        table
    }

    #[test]
    fn test_csv_table() {
        let formatter = CsvFormatter::new();
        let mut output = Cursor::new(Vec::new());

        formatter.write_table(&create_test_table(), &mut output).unwrap();

        let result = String::from_utf8(output.into_inner()).unwrap();
        let lines: Vec<&str> = result.lines().collect();
        assert_eq!(lines[0], "name,price,listed");
        assert_eq!(lines[1], "Bitcoin,42000.5,2024-01-15T12:30:45Z");
        assert_eq!(lines[2], "\"Foo, \"\"Bar\"\"\",,");
    }

    #[test]
    fn test_tsv_candles() {
        let formatter = CsvFormatter::tsv();
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let candles = vec![Candle::new(ts, 1.0, 2.0, 0.5, 1.5, 10.0)];
        let mut output = Cursor::new(Vec::new());

        formatter.write_candles(&candles, "", &mut output).unwrap();

        let result = String::from_utf8(output.into_inner()).unwrap();
        assert!(result.starts_with("timestamp\topen\thigh"));
        assert!(result.contains("2024-01-01T00:00:00Z\t1\t2\t0.5\t1.5\t10"));
    }
}
