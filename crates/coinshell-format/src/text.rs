//! Human-readable text tables.

use coinshell_types::{Candle, Cell, Table};
use std::io::Write;

use crate::chart::{ChartOptions, render_candles_with};
use crate::{FormatError, Formatter, RenderOptions};

/// Default maximum width of a text column, in characters.
pub const DEFAULT_MAX_COLUMN_WIDTH: usize = 50;

/// Formats a number for humans: `1.23 B` for large values, two decimals for
/// ordinary ones and enough digits to show tiny prices.
#[must_use]
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let abs = value.abs();
    for (threshold, suffix) in [(1e12, "T"), (1e9, "B"), (1e6, "M")] {
        if abs >= threshold {
            return format!("{:.2} {suffix}", value / threshold);
        }
    }
    if abs >= 1.0 || abs == 0.0 {
        return format!("{value:.2}");
    }
    let decimals = ((-abs.log10()).ceil() as usize + 3).min(10);
    let text = format!("{value:.decimals$}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Formats one cell for display.
#[must_use]
pub fn format_cell(cell: &Cell) -> String {
    match cell {
        Cell::Int(i) if i.unsigned_abs() >= 1_000_000 => format_number(*i as f64),
        Cell::Float(f) => format_number(*f),
        Cell::Text(s) => s.split_whitespace().collect::<Vec<_>>().join(" "),
        other => other.to_string(),
    }
}

fn truncate(text: String, max: usize) -> String {
    if max == 0 || text.chars().count() <= max {
        return text;
    }
    let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

/// Aligned text table formatter.
#[derive(Debug, Clone)]
pub struct TextFormatter {
    max_column_width: usize,
    chart: ChartOptions,
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl TextFormatter {
    /// Creates a formatter with default widths.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_column_width: DEFAULT_MAX_COLUMN_WIDTH,
            chart: ChartOptions::new(),
        }
    }

    /// Sets the maximum column width (0 disables truncation).
    #[must_use]
    pub const fn with_max_column_width(mut self, width: usize) -> Self {
        self.max_column_width = width;
        self
    }

    /// Sets the chart dimensions used for candle output.
    #[must_use]
    pub const fn with_chart(mut self, chart: ChartOptions) -> Self {
        self.chart = chart;
        self
    }

    /// Renders a table as aligned text. Numbers are right aligned.
    #[must_use]
    pub fn render(&self, table: &Table) -> String {
        let headers: Vec<String> = table
            .columns()
            .iter()
            .map(|c| truncate(c.clone(), self.max_column_width))
            .collect();
        let cells: Vec<Vec<String>> = table
            .rows()
            .iter()
            .map(|row| {
                row.iter()
                    .map(|c| truncate(format_cell(c), self.max_column_width))
                    .collect()
            })
            .collect();

        let widths: Vec<usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                cells
                    .iter()
                    .map(|row| row[i].chars().count())
                    .chain(std::iter::once(h.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut out = String::new();
        let header_line: Vec<String> = headers
            .iter()
            .zip(&widths)
            .map(|(h, w)| format!("{h:<w$}"))
            .collect();
        out.push_str(header_line.join("  ").trim_end());
        out.push('\n');
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        out.push_str(&rule.join("  "));
        out.push('\n');

        for (row, texts) in table.rows().iter().zip(&cells) {
            let line: Vec<String> = row
                .iter()
                .zip(texts)
                .zip(&widths)
                .map(|((cell, text), w)| match cell {
                    Cell::Int(_) | Cell::Float(_) => format!("{text:>w$}"),
                    _ => format!("{text:<w$}"),
                })
                .collect();
            out.push_str(line.join("  ").trim_end());
            out.push('\n');
        }
        out
    }
}

impl Formatter for TextFormatter {
    fn write_table<W: Write + Send>(
        &self,
        table: &Table,
        mut writer: W,
    ) -> Result<(), FormatError> {
        writer.write_all(self.render(table).as_bytes())?;
        Ok(())
    }

    fn write_candles<W: Write + Send>(
        &self,
        candles: &[Candle],
        title: &str,
        mut writer: W,
    ) -> Result<(), FormatError> {
        writer.write_all(render_candles_with(candles, title, &self.chart).as_bytes())?;
        Ok(())
    }
}

/// Sorts, limits and renders a table as text.
///
/// # Errors
///
/// Returns an error if the sort column does not exist.
pub fn render_table(table: &Table, options: &RenderOptions) -> Result<String, FormatError> {
    Ok(TextFormatter::new().render(&options.apply(table)?))
}
