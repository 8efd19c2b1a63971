//! Market data providers for the coinshell crypto terminal.
//!
//! Every coin-level source implements [`MarketDataProvider`]:
//!
//! - [`CoinGecko`] - CoinGecko REST API, plus its market-wide listings
//! - [`CoinPaprika`] - CoinPaprika REST API, plus its market-wide listings
//! - [`Binance`] - Binance spot REST API (trading pairs, klines, order book)
//! - [`MockProvider`] - Deterministic in-memory provider for tests
//!
//! [`GeckoWeb`] scrapes CoinGecko listing pages that have no API counterpart.

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/coinshell/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod binance;
mod catalog;
mod coingecko;
mod coinpaprika;
mod error;
mod gecko_web;
pub mod json;
mod mock;
mod provider;

pub use binance::{Binance, DEFAULT_QUOTE, DEPTH_LIMITS};
pub use catalog::{Catalog, CatalogEntry};
pub use coingecko::{CoinGecko, OHLC_DAYS, TreasuryCoin};
pub use coinpaprika::{CoinPaprika, SERIES_QUOTES, SearchCategory, TickerView};
pub use error::{ProviderError, ProviderResult};
pub use gecko_web::{DiscoverCategory, GeckoWeb, Period};
pub use mock::MockProvider;
pub use provider::{
    MarketDataProvider, ProviderRegistry, ReportKind, ReportOptions, SeriesRequest,
};
