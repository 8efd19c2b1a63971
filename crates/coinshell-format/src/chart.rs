//! Terminal candlestick charts.

use coinshell_types::Candle;

use crate::text::format_number;

const BULL_BODY: char = '█';
const BEAR_BODY: char = '░';
const WICK: char = '│';
const LABEL_WIDTH: usize = 12;

/// Chart dimensions in terminal cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartOptions {
    /// Maximum number of candle columns.
    pub width: usize,
    /// Number of price rows.
    pub height: usize,
}

impl ChartOptions {
    /// Creates options for an 80x20 chart.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            width: 80,
            height: 20,
        }
    }
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Merges adjacent candles so at most `columns` remain.
#[must_use]
pub fn downsample(candles: &[Candle], columns: usize) -> Vec<Candle> {
    if columns == 0 || candles.len() <= columns {
        return candles.to_vec();
    }
    let group = candles.len().div_ceil(columns);
    candles
        .chunks(group)
        .filter_map(|chunk| {
            let (first, rest) = chunk.split_first()?;
            Some(rest.iter().fold(*first, |acc, c| acc.merge(c)))
        })
        .collect()
}

/// Draws candles with the default chart size.
#[must_use]
pub fn render_candles(candles: &[Candle], title: &str) -> String {
    render_candles_with(candles, title, &ChartOptions::new())
}

/// Draws candles as a text chart with a price axis on the left.
///
/// Bullish bodies are solid, bearish bodies shaded, wicks drawn as thin lines.
#[must_use]
pub fn render_candles_with(candles: &[Candle], title: &str, options: &ChartOptions) -> String {
    let mut out = format!("{title}\n");
    if candles.is_empty() {
        out.push_str("No data to chart\n");
        return out;
    }

    let bars = downsample(candles, options.width.saturating_sub(LABEL_WIDTH + 1).max(1));
    let height = options.height.max(2);
    let top = bars.iter().map(|c| c.high).fold(f64::MIN, f64::max);
    let mut bottom = bars.iter().map(|c| c.low).fold(f64::MAX, f64::min);
    if top - bottom <= f64::EPSILON {
        // Flat series still needs a non-zero scale
        bottom = top - top.abs().max(1.0) * 0.01;
    }
    let step = (top - bottom) / height as f64;

    for row in 0..height {
        let hi = top - step * row as f64;
        let lo = hi - step;
        let label = if row == 0 || row == height - 1 || row % 5 == 0 {
            format_number((hi + lo) / 2.0)
        } else {
            String::new()
        };
        out.push_str(&format!("{label:>LABEL_WIDTH$} ┤"));
        for bar in &bars {
            let body_top = bar.open.max(bar.close);
            let body_bottom = bar.open.min(bar.close);
            let symbol = if body_top >= lo && body_bottom <= hi {
                if bar.is_bullish() { BULL_BODY } else { BEAR_BODY }
            } else if bar.high >= lo && bar.low <= hi {
                WICK
            } else {
                ' '
            };
            out.push(symbol);
        }
        out.push('\n');
    }

    let first = bars[0].timestamp.format("%Y-%m-%d").to_string();
    let last = bars[bars.len() - 1].timestamp.format("%Y-%m-%d").to_string();
    let gap = bars.len().saturating_sub(first.len() + last.len()).max(1);
    out.push_str(&format!(
        "{:>LABEL_WIDTH$}  {first}{}{last}\n",
        "",
        " ".repeat(gap)
    ));
    out
}
