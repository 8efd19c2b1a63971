//! Output formatting for the coinshell crypto terminal.
//!
//! Every command produces a [`Table`](coinshell_types::Table) or a candle
//! series, written in one of these formats:
//!
//! - [`TextFormatter`] - aligned text tables and terminal candlestick charts
//! - [`CsvFormatter`] - CSV or TSV
//! - [`JsonFormatter`] - JSON array or NDJSON
//!
//! [`Renderer`] picks the formatter for the [`OutputFormat`] chosen at start-up.

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/coinshell/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod chart;
mod csv;
mod formatter;
mod json;
mod render;
mod text;

pub use crate::csv::CsvFormatter;
pub use chart::{ChartOptions, downsample, render_candles, render_candles_with};
pub use formatter::{FormatError, Formatter, OutputFormat, RenderOptions};
pub use json::{JsonFormatter, JsonStyle, table_to_json};
pub use render::Renderer;
pub use text::{DEFAULT_MAX_COLUMN_WIDTH, TextFormatter, format_cell, format_number, render_table};
