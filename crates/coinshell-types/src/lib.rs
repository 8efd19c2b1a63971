//! Core types for the coinshell crypto market data terminal.
//!
//! This crate provides the data structures shared by every other coinshell crate:
//!
//! - [`CoinRef`] - A coin identifier bound to the provider that resolved it
//! - [`ProviderTag`] - Which upstream source a coin was loaded from
//! - [`Table`] and [`Cell`] - The tabular result every command produces
//! - [`Candle`] - One OHLCV bar of a price/volume series
//! - [`Interval`] - Kline interval for candle requests
//! - [`Window`] - How many days of history to request

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/coinshell/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod candle;
mod coin;
mod error;
mod interval;
mod table;
mod window;

pub use candle::Candle;
pub use coin::{CoinRef, ProviderTag, ProviderTagParseError};
pub use error::{CoinshellError, Result, WindowError};
pub use interval::{Interval, IntervalParseError};
pub use table::{Cell, Table};
pub use window::Window;
