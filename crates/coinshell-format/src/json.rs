//! JSON output format.

use coinshell_types::{Candle, Table};
use serde_json::{Map, Value};
use std::io::Write;

use crate::{FormatError, Formatter};

/// JSON output style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonStyle {
    /// JSON array (standard JSON).
    #[default]
    Array,
    /// Newline-delimited JSON (NDJSON/JSONL).
    Ndjson,
}

/// JSON formatter. Table rows become objects keyed by column name.
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter {
    /// Output style.
    style: JsonStyle,
}

impl JsonFormatter {
    /// Creates a new JSON formatter with default settings (array style).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            style: JsonStyle::Array,
        }
    }

    /// Creates a new NDJSON formatter.
    #[must_use]
    pub const fn ndjson() -> Self {
        Self {
            style: JsonStyle::Ndjson,
        }
    }

    fn write_values<W: Write, T: serde::Serialize>(
        &self,
        items: &[T],
        mut writer: W,
    ) -> Result<(), FormatError> {
        match self.style {
            JsonStyle::Array => {
                serde_json::to_writer(&mut writer, items)?;
                writeln!(writer)?;
            }
            JsonStyle::Ndjson => {
                for item in items {
                    serde_json::to_writer(&mut writer, item)?;
                    writeln!(writer)?;
                }
            }
        }
        Ok(())
    }
}

/// Converts table rows into JSON objects keyed by column name.
#[must_use]
pub fn table_to_json(table: &Table) -> Vec<Value> {
    table
        .rows()
        .iter()
        .map(|row| {
            let object: Map<String, Value> = table
                .columns()
                .iter()
                .cloned()
                .zip(row.iter().map(coinshell_types::Cell::to_json))
                .collect();
            Value::Object(object)
        })
        .collect()
}

impl Formatter for JsonFormatter {
    fn write_table<W: Write + Send>(&self, table: &Table, writer: W) -> Result<(), FormatError> {
        self.write_values(&table_to_json(table), writer)
    }

    fn write_candles<W: Write + Send>(
        &self,
        candles: &[Candle],
        _title: &str,
        writer: W,
    ) -> Result<(), FormatError> {
        self.write_values(candles, writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use coinshell_types::Cell;
    use std::io::Cursor;

    fn create_test_table() -> Table {
        let mut table = Table::new(["name", "rank", "price"]);
        table.push_row(vec![Cell::text("Bitcoin"), Cell::Int(1), Cell::Float(42000.5)]);
        table.push_row(vec![Cell::text("Ether"), Cell::Int(2), Cell::Empty]);
        table
    }

    #[test]
    fn test_json_array() {
        let formatter = JsonFormatter::new();
        let mut output = Cursor::new(Vec::new());

        formatter.write_table(&create_test_table(), &mut output).unwrap();

        let result = String::from_utf8(output.into_inner()).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&result).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0]["name"], "Bitcoin");
        assert_eq!(parsed[0]["rank"], 1);
        assert!(parsed[1]["price"].is_null());
    }

    #[test]
    fn test_ndjson_candles() {
        let formatter = JsonFormatter::ndjson();
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let candles = vec![
            Candle::new(ts, 1.0, 2.0, 0.5, 1.5, 10.0),
            Candle::new(ts, 1.5, 2.5, 1.0, 2.0, 12.0),
        ];
        let mut output = Cursor::new(Vec::new());

        formatter.write_candles(&candles, "", &mut output).unwrap();

        let result = String::from_utf8(output.into_inner()).unwrap();
        assert_eq!(result.lines().count(), 2);
        assert!(result.contains("\"close\":1.5"));
    }
}
