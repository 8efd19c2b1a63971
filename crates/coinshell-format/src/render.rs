//! Format selection at run time.

use coinshell_types::{Candle, Table};
use std::io::Write;

use crate::{
    CsvFormatter, FormatError, Formatter, JsonFormatter, OutputFormat, RenderOptions,
    TextFormatter,
};

/// Renders tables and series in the format chosen at start-up.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    format: OutputFormat,
    text: TextFormatter,
}

impl Renderer {
    /// Creates a renderer for `format` with default formatter settings.
    #[must_use]
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    /// Replaces the text formatter (column width, chart size).
    #[must_use]
    pub fn with_text(mut self, text: TextFormatter) -> Self {
        self.text = text;
        self
    }

    /// Sorts, limits and renders a table.
    ///
    /// # Errors
    ///
    /// Returns an error if the sort column is unknown or serialization fails.
    pub fn table(&self, table: &Table, options: &RenderOptions) -> Result<String, FormatError> {
        let table = options.apply(table)?;
        let mut out = Vec::new();
        match self.format {
            OutputFormat::Table => self.text.write_table(&table, &mut out)?,
            OutputFormat::Csv => CsvFormatter::new().write_table(&table, &mut out)?,
            OutputFormat::Tsv => CsvFormatter::tsv().write_table(&table, &mut out)?,
            OutputFormat::Json => JsonFormatter::new().write_table(&table, &mut out)?,
            OutputFormat::Ndjson => JsonFormatter::ndjson().write_table(&table, &mut out)?,
        }
        Ok(into_string(out))
    }

    /// Renders a series: a candlestick chart in table mode, raw rows otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn candles(&self, candles: &[Candle], title: &str) -> Result<String, FormatError> {
        let mut out = Vec::new();
        self.write_candles(candles, title, &mut out)?;
        Ok(into_string(out))
    }

    fn write_candles<W: Write + Send>(
        &self,
        candles: &[Candle],
        title: &str,
        out: W,
    ) -> Result<(), FormatError> {
        match self.format {
            OutputFormat::Table => self.text.write_candles(candles, title, out),
            OutputFormat::Csv => CsvFormatter::new().write_candles(candles, title, out),
            OutputFormat::Tsv => CsvFormatter::tsv().write_candles(candles, title, out),
            OutputFormat::Json => JsonFormatter::new().write_candles(candles, title, out),
            OutputFormat::Ndjson => JsonFormatter::ndjson().write_candles(candles, title, out),
        }
    }
}

fn into_string(out: Vec<u8>) -> String {
    String::from_utf8_lossy(&out).into_owned()
}
