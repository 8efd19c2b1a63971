//! Library for browsing cryptocurrency market data.
//!
//! This is a facade crate that re-exports functionality from the coinshell
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```ignore
//! use coinshell_lib::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ApiClient::with_defaults()?;
//!     let gecko = CoinGecko::new(client, Endpoints::default().coingecko);
//!
//!     let coin = gecko.resolve("btc", None).await?;
//!     let candles = gecko.fetch_series(&coin, &SeriesRequest::default()).await?;
//!     println!("{}", render_candles(&candles, &coin.to_string()));
//!
//!     Ok(())
//! }
//! ```

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/coinshell/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use coinshell_types::*;

// Re-export HTTP plumbing
#[cfg(feature = "fetch")]
pub use coinshell_fetch::{ApiClient, ClientConfig, Endpoints, FetchError, scrape, url};

// Re-export providers
#[cfg(feature = "providers")]
pub use coinshell_providers::{
    Binance, Catalog, CatalogEntry, CoinGecko, CoinPaprika, DEFAULT_QUOTE, DEPTH_LIMITS,
    DiscoverCategory, GeckoWeb, MarketDataProvider, MockProvider, OHLC_DAYS, Period,
    ProviderError, ProviderRegistry, ProviderResult, ReportKind, ReportOptions, SERIES_QUOTES,
    SearchCategory, SeriesRequest, TickerView, TreasuryCoin,
};

// Re-export formatters
#[cfg(feature = "format")]
pub use coinshell_format::{
    ChartOptions, CsvFormatter, DEFAULT_MAX_COLUMN_WIDTH, FormatError, Formatter, JsonFormatter,
    JsonStyle, OutputFormat, RenderOptions, Renderer, TextFormatter, render_candles,
    render_table,
};

/// Prelude module for convenient imports.
///
/// ```
/// use coinshell_lib::prelude::*;
/// ```
pub mod prelude {
    pub use coinshell_types::{
        Candle, Cell, CoinRef, CoinshellError, Interval, ProviderTag, Result, Table, Window,
    };

    #[cfg(feature = "fetch")]
    pub use coinshell_fetch::{ApiClient, ClientConfig, Endpoints};

    #[cfg(feature = "providers")]
    pub use coinshell_providers::{
        Binance, CoinGecko, CoinPaprika, GeckoWeb, MarketDataProvider, ProviderRegistry,
        ReportKind, ReportOptions, SeriesRequest,
    };

    #[cfg(feature = "format")]
    pub use coinshell_format::{OutputFormat, RenderOptions, Renderer, render_candles};
}
