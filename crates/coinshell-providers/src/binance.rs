//! Binance spot REST API provider.

use async_trait::async_trait;
use coinshell_fetch::{ApiClient, url};
use coinshell_types::{Candle, Cell, CoinRef, Interval, ProviderTag, Table};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::catalog::{Catalog, CatalogEntry};
use crate::json::{millis, number};
use crate::provider::{MarketDataProvider, ReportKind, ReportOptions, SeriesRequest};
use crate::{ProviderError, ProviderResult};

/// Quote asset used when none is given.
pub const DEFAULT_QUOTE: &str = "USDT";

/// Depth limits accepted by the order book endpoint.
pub const DEPTH_LIMITS: [u32; 8] = [5, 10, 20, 50, 100, 500, 1000, 5000];

/// Maximum candles per klines request.
const MAX_KLINES: u64 = 1000;

const REPORTS: &[ReportKind] = &[ReportKind::OrderBook, ReportKind::Candles];

#[derive(Deserialize)]
struct ExchangeInfo {
    symbols: Vec<SymbolInfo>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SymbolInfo {
    symbol: String,
    status: String,
    base_asset: String,
    quote_asset: String,
}

#[derive(Deserialize)]
struct Depth {
    bids: Vec<(String, String)>,
    asks: Vec<(String, String)>,
}

/// Binance spot market data API.
#[derive(Debug)]
pub struct Binance {
    client: ApiClient,
    base_url: String,
    catalog: OnceCell<Catalog>,
}

impl Binance {
    /// Creates a provider talking to `base_url`.
    #[must_use]
    pub fn new(client: ApiClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            catalog: OnceCell::new(),
        }
    }

    async fn load_catalog(&self) -> ProviderResult<Catalog> {
        let endpoint = url::join(&self.base_url, "/exchangeInfo");
        let info: ExchangeInfo = self.client.get_json(&endpoint, &[]).await?;
        let catalog = pairs_catalog(info);
        debug!(count = catalog.len(), "loaded Binance trading pairs");
        Ok(catalog)
    }

    async fn catalog(&self) -> ProviderResult<&Catalog> {
        self.catalog.get_or_try_init(|| self.load_catalog()).await
    }

    async fn klines(
        &self,
        pair: &str,
        interval: Interval,
        limit: u64,
    ) -> ProviderResult<Vec<Candle>> {
        let endpoint = url::join(&self.base_url, "/klines");
        let query = [
            ("symbol", pair.to_string()),
            ("interval", interval.as_str().to_string()),
            ("limit", limit.clamp(1, MAX_KLINES).to_string()),
        ];
        let doc: Value = self.client.get_json(&endpoint, &query).await?;
        parse_klines(&doc)
    }

    async fn order_book(&self, pair: &str, limit: usize) -> ProviderResult<Table> {
        let endpoint = url::join(&self.base_url, "/depth");
        let query = [
            ("symbol", pair.to_string()),
            ("limit", depth_limit(limit).to_string()),
        ];
        let depth: Depth = self.client.get_json(&endpoint, &query).await?;
        Ok(depth_table(&depth))
    }
}

/// Builds a catalog of trading pairs: id `BTCUSDT`, symbol `BTC`, name `BTC/USDT`.
fn pairs_catalog(info: ExchangeInfo) -> Catalog {
    Catalog::new(
        info.symbols
            .into_iter()
            .filter(|s| s.status == "TRADING")
            .map(|s| {
                let name = format!("{}/{}", s.base_asset, s.quote_asset);
                CatalogEntry::new(s.symbol, s.base_asset, name)
            })
            .collect(),
    )
}

/// Resolves a base asset and quote asset to a listed trading pair.
fn resolve_pair(catalog: &Catalog, base: &str, quote: &str) -> ProviderResult<CoinRef> {
    let pair = format!("{}{}", base.trim().to_uppercase(), quote.trim().to_uppercase());
    if let Some(entry) = catalog.entries().iter().find(|e| e.id == pair) {
        let quote = entry
            .name
            .split_once('/')
            .map_or(quote.to_uppercase(), |(_, q)| q.to_string());
        return Ok(CoinRef::new(&entry.id, &entry.symbol, &entry.name, ProviderTag::Binance)
            .with_quote(quote));
    }

    // Same base against other quotes first, then fuzzy matches
    let mut suggestions: Vec<String> = catalog
        .entries()
        .iter()
        .filter(|e| e.symbol.eq_ignore_ascii_case(base.trim()))
        .map(|e| e.name.clone())
        .take(5)
        .collect();
    if suggestions.is_empty() {
        suggestions = catalog
            .suggest(&pair, 5)
            .into_iter()
            .map(|e| e.name.clone())
            .collect();
    }
    Err(ProviderError::NotFound {
        identifier: format!("{}/{}", base.to_uppercase(), quote.to_uppercase()),
        provider: ProviderTag::Binance,
        suggestions,
    })
}

/// Parses klines rows (`[open_time, "open", "high", "low", "close", "volume", ...]`).
fn parse_klines(doc: &Value) -> ProviderResult<Vec<Candle>> {
    let rows = doc
        .as_array()
        .ok_or_else(|| ProviderError::Parse("Binance klines".into()))?;
    rows.iter()
        .map(|row| {
            let field = |i: usize| row.get(i).and_then(number);
            match (
                row.get(0).and_then(millis),
                field(1),
                field(2),
                field(3),
                field(4),
                field(5),
            ) {
                (Some(ts), Some(open), Some(high), Some(low), Some(close), Some(volume)) => {
                    Ok(Candle::new(ts, open, high, low, close, volume))
                }
                _ => Err(ProviderError::Parse("Binance kline row".into())),
            }
        })
        .collect()
}

/// Picks the smallest accepted depth limit covering `requested`.
fn depth_limit(requested: usize) -> u32 {
    let requested = u32::try_from(requested).unwrap_or(u32::MAX);
    DEPTH_LIMITS
        .iter()
        .copied()
        .find(|&l| l >= requested)
        .unwrap_or(DEPTH_LIMITS[DEPTH_LIMITS.len() - 1])
}

/// Flattens bids (best first) and asks (best first) with cumulative quantity.
fn depth_table(depth: &Depth) -> Table {
    let mut table = Table::new(["side", "price", "quantity", "cumulative"]);
    for (side, levels) in [("bid", &depth.bids), ("ask", &depth.asks)] {
        let mut cumulative = 0.0;
        for (price, quantity) in levels {
            let quantity = quantity.parse::<f64>().ok();
            cumulative += quantity.unwrap_or_default();
            table.push_row(vec![
                Cell::text(side),
                Cell::infer(price),
                quantity.into(),
                Cell::Float(cumulative),
            ]);
        }
    }
    table
}

/// Renders candles as a table, newest last.
fn candles_table(candles: &[Candle]) -> Table {
    let mut table = Table::new(["date", "open", "high", "low", "close", "volume"]);
    for c in candles {
        table.push_row(vec![
            c.timestamp.into(),
            c.open.into(),
            c.high.into(),
            c.low.into(),
            c.close.into(),
            c.volume.into(),
        ]);
    }
    table
}

#[async_trait]
impl MarketDataProvider for Binance {
    fn tag(&self) -> ProviderTag {
        ProviderTag::Binance
    }

    async fn resolve(&self, identifier: &str, quote: Option<&str>) -> ProviderResult<CoinRef> {
        let catalog = self.catalog().await?;
        resolve_pair(catalog, identifier, quote.unwrap_or(DEFAULT_QUOTE))
    }

    async fn fetch_series(
        &self,
        coin: &CoinRef,
        request: &SeriesRequest,
    ) -> ProviderResult<Vec<Candle>> {
        let pair = format!(
            "{}{}",
            coin.symbol().to_uppercase(),
            request.vs.to_uppercase()
        );
        let limit = request.interval.candles_in_days(request.window.days());
        let candles = self.klines(&pair, request.interval, limit).await?;
        if candles.is_empty() {
            return Err(ProviderError::Empty(pair));
        }
        Ok(candles)
    }

    fn reports(&self) -> &'static [ReportKind] {
        REPORTS
    }

    async fn report(
        &self,
        coin: &CoinRef,
        kind: ReportKind,
        options: &ReportOptions,
    ) -> ProviderResult<Table> {
        let pair = coin.pair().ok_or_else(|| {
            ProviderError::InvalidArgument(format!("{coin} is not a trading pair"))
        })?;
        match kind {
            ReportKind::OrderBook => self.order_book(&pair, options.limit).await,
            ReportKind::Candles => {
                let candles = self
                    .klines(&pair, options.interval, options.limit as u64)
                    .await?;
                Ok(candles_table(&candles))
            }
            other => Err(ProviderError::UnsupportedReport {
                provider: self.tag(),
                report: other.token().to_string(),
            }),
        }
    }
}
