//! CoinPaprika REST API provider.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use coinshell_fetch::{ApiClient, url};
use coinshell_types::{Candle, Cell, CoinRef, ProviderTag, Table};
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::catalog::{Catalog, CatalogEntry};
use crate::json::{array, join_field, metrics, pick, rows};
use crate::provider::{MarketDataProvider, ReportKind, ReportOptions, SeriesRequest};
use crate::{ProviderError, ProviderResult};

/// Quote currencies accepted by the historical OHLCV endpoint.
pub const SERIES_QUOTES: [&str; 2] = ["usd", "btc"];

const REPORTS: &[ReportKind] = &[
    ReportKind::Basic,
    ReportKind::PriceSupply,
    ReportKind::Markets,
    ReportKind::Exchanges,
    ReportKind::Twitter,
    ReportKind::Events,
];

#[derive(Deserialize)]
struct ListedCoin {
    id: String,
    name: String,
    symbol: String,
    #[serde(default)]
    is_active: bool,
}

#[derive(Deserialize)]
struct HistoricalBar {
    time_open: DateTime<Utc>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: Option<f64>,
}

/// What a CoinPaprika search looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchCategory {
    /// Coins and tokens.
    #[default]
    Currencies,
    /// Exchanges.
    Exchanges,
    /// Initial coin offerings.
    Icos,
    /// People.
    People,
    /// Tags.
    Tags,
}

impl SearchCategory {
    /// Returns the API category name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Currencies => "currencies",
            Self::Exchanges => "exchanges",
            Self::Icos => "icos",
            Self::People => "people",
            Self::Tags => "tags",
        }
    }

    fn columns(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Currencies => &[
                ("id", "/id"),
                ("name", "/name"),
                ("symbol", "/symbol"),
                ("rank", "/rank"),
                ("type", "/type"),
                ("active", "/is_active"),
            ],
            Self::Exchanges => &[("id", "/id"), ("name", "/name"), ("rank", "/rank")],
            Self::Icos => &[
                ("id", "/id"),
                ("name", "/name"),
                ("symbol", "/symbol"),
                ("ended", "/is_ended"),
            ],
            Self::People => &[
                ("id", "/id"),
                ("name", "/name"),
                ("teams", "/teams_count"),
            ],
            Self::Tags => &[
                ("id", "/id"),
                ("name", "/name"),
                ("coins", "/coin_counter"),
                ("icos", "/ico_counter"),
            ],
        }
    }
}

impl FromStr for SearchCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "currencies" | "coins" => Ok(Self::Currencies),
            "exchanges" => Ok(Self::Exchanges),
            "icos" => Ok(Self::Icos),
            "people" => Ok(Self::People),
            "tags" => Ok(Self::Tags),
            _ => Err(format!(
                "invalid category '{s}', expected one of: currencies, exchanges, icos, people, tags"
            )),
        }
    }
}

/// Which columns of the ticker listing to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickerView {
    /// Supply and valuation.
    Info,
    /// Price changes.
    Markets,
}

/// CoinPaprika public REST API.
#[derive(Debug)]
pub struct CoinPaprika {
    client: ApiClient,
    base_url: String,
    catalog: OnceCell<Catalog>,
}

impl CoinPaprika {
    /// Creates a provider talking to `base_url`.
    #[must_use]
    pub fn new(client: ApiClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            catalog: OnceCell::new(),
        }
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> ProviderResult<Value> {
        let endpoint = url::join(&self.base_url, path);
        Ok(self.client.get_json(&endpoint, query).await?)
    }

    async fn load_catalog(&self) -> ProviderResult<Catalog> {
        let endpoint = url::join(&self.base_url, "/coins");
        let coins: Vec<ListedCoin> = self.client.get_json(&endpoint, &[]).await?;
        debug!(count = coins.len(), "loaded CoinPaprika catalog");
        // Inactive coins sort after active ones so symbol lookups prefer live listings
        let (active, inactive): (Vec<_>, Vec<_>) = coins.into_iter().partition(|c| c.is_active);
        Ok(Catalog::new(
            active
                .into_iter()
                .chain(inactive)
                .map(|c| CatalogEntry::new(c.id, c.symbol, c.name))
                .collect(),
        ))
    }

    async fn catalog(&self) -> ProviderResult<&Catalog> {
        self.catalog.get_or_try_init(|| self.load_catalog()).await
    }

    /// Lists every coin CoinPaprika knows, in rank order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    pub async fn coins(&self) -> ProviderResult<Table> {
        let doc = self.get("/coins", &[]).await?;
        let items = array(&doc, "", "CoinPaprika coins")?;
        Ok(rows(
            items,
            &[
                ("rank", "/rank"),
                ("id", "/id"),
                ("name", "/name"),
                ("symbol", "/symbol"),
                ("type", "/type"),
            ],
        ))
    }

    /// Searches coins, exchanges, ICOs, people or tags.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn search(
        &self,
        query: &str,
        category: SearchCategory,
        limit: usize,
    ) -> ProviderResult<Table> {
        let params = [
            ("q", query.to_string()),
            ("c", category.as_str().to_string()),
            ("limit", limit.to_string()),
            ("modifier", "symbol_search".to_string()),
        ];
        let doc = self.get("/search", &params).await?;
        let items = doc
            .get(category.as_str())
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        Ok(rows(items, category.columns()))
    }

    /// Returns global market statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn global(&self) -> ProviderResult<Table> {
        let doc = self.get("/global", &[]).await?;
        let mut table = metrics(
            &doc,
            &[
                ("market_cap_usd", "/market_cap_usd"),
                ("volume_24h_usd", "/volume_24h_usd"),
                ("bitcoin_dominance_pct", "/bitcoin_dominance_percentage"),
                ("cryptocurrencies", "/cryptocurrencies_number"),
                ("market_cap_ath", "/market_cap_ath_value"),
                ("market_cap_ath_date", "/market_cap_ath_date"),
                ("volume_24h_ath", "/volume_24h_ath_value"),
                ("volume_24h_ath_date", "/volume_24h_ath_date"),
                ("market_cap_change_24h", "/market_cap_change_24h"),
                ("volume_24h_change_24h", "/volume_24h_change_24h"),
            ],
        );
        let updated = doc
            .get("last_updated")
            .and_then(Value::as_i64)
            .and_then(|secs| DateTime::from_timestamp(secs, 0));
        table.push_row(vec![Cell::text("last_updated"), updated.into()]);
        Ok(table)
    }

    /// Lists tickers of every coin, quoted in `vs`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    pub async fn tickers(&self, vs: &str, view: TickerView) -> ProviderResult<Table> {
        let quote = vs.to_uppercase();
        let doc = self.get("/tickers", &[("quotes", quote.clone())]).await?;
        let items = array(&doc, "", "CoinPaprika tickers")?;
        Ok(rows(items, &ticker_columns(&quote, view)))
    }

    /// Lists exchanges, with volumes quoted in `vs`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    pub async fn exchanges(&self, vs: &str) -> ProviderResult<Table> {
        let quote = vs.to_uppercase();
        let doc = self.get("/exchanges", &[("quotes", quote.clone())]).await?;
        let items = array(&doc, "", "CoinPaprika exchanges")?;
        let q = |field: &str| format!("/quotes/{quote}/{field}");
        Ok(rows(
            items,
            &[
                ("rank", "/adjusted_rank".to_string()),
                ("id", "/id".to_string()),
                ("name", "/name".to_string()),
                ("currencies", "/currencies".to_string()),
                ("markets", "/markets".to_string()),
                ("confidence_score", "/confidence_score".to_string()),
                ("adjusted_volume_24h", q("adjusted_volume_24h")),
                ("reported_volume_24h", q("reported_volume_24h")),
                ("reported_volume_7d", q("reported_volume_7d")),
                ("website", "/links/website".to_string()),
            ],
        ))
    }

    /// Lists the markets of one exchange.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    pub async fn exchange_markets(&self, exchange_id: &str, vs: &str) -> ProviderResult<Table> {
        let quote = vs.to_uppercase();
        let doc = self
            .get(
                &format!("/exchanges/{exchange_id}/markets"),
                &[("quotes", quote.clone())],
            )
            .await?;
        let items = array(&doc, "", "CoinPaprika exchange markets")?;
        Ok(rows(
            items,
            &[
                ("pair", "/pair".to_string()),
                ("base", "/base_currency_name".to_string()),
                ("quote", "/quote_currency_name".to_string()),
                ("category", "/category".to_string()),
                ("trust_score", "/trust_score".to_string()),
                ("volume_share_pct", "/reported_volume_24h_share".to_string()),
                ("price", format!("/quotes/{quote}/price")),
                ("volume_24h", format!("/quotes/{quote}/volume_24h")),
                ("last_updated", "/last_updated".to_string()),
                ("url", "/market_url".to_string()),
            ],
        ))
    }

    /// Lists smart contract platforms.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    pub async fn platforms(&self) -> ProviderResult<Table> {
        let doc = self.get("/contracts", &[]).await?;
        let mut table = Table::new(["platform_id"]);
        for platform in array(&doc, "", "CoinPaprika platforms")? {
            table.push_row(vec![Cell::from_json(platform)]);
        }
        Ok(table)
    }

    /// Lists contracts deployed on a platform.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    pub async fn contracts(&self, platform_id: &str) -> ProviderResult<Table> {
        let doc = self.get(&format!("/contracts/{platform_id}"), &[]).await?;
        let items = array(&doc, "", "CoinPaprika contracts")?;
        Ok(rows(
            items,
            &[
                ("id", "/id"),
                ("type", "/type"),
                ("address", "/address"),
                ("active", "/active"),
            ],
        ))
    }
}

fn ticker_columns(quote: &str, view: TickerView) -> Vec<(&'static str, String)> {
    let q = |field: &str| format!("/quotes/{quote}/{field}");
    let mut columns = vec![
        ("rank", "/rank".to_string()),
        ("name", "/name".to_string()),
        ("symbol", "/symbol".to_string()),
        ("price", q("price")),
        ("volume_24h", q("volume_24h")),
    ];
    match view {
        TickerView::Info => columns.extend([
            ("circulating_supply", "/circulating_supply".to_string()),
            ("total_supply", "/total_supply".to_string()),
            ("max_supply", "/max_supply".to_string()),
            ("market_cap", q("market_cap")),
            ("beta_value", "/beta_value".to_string()),
            ("ath_price", q("ath_price")),
        ]),
        TickerView::Markets => columns.extend([
            ("mcap_change_24h", q("market_cap_change_24h")),
            ("pct_change_1h", q("percent_change_1h")),
            ("pct_change_24h", q("percent_change_24h")),
            ("pct_change_7d", q("percent_change_7d")),
            ("pct_change_30d", q("percent_change_30d")),
            ("ath_price", q("ath_price")),
            ("pct_from_ath", q("percent_from_price_ath")),
        ]),
    }
    columns
}

fn parse_historical(doc: Value) -> ProviderResult<Vec<Candle>> {
    let bars: Vec<HistoricalBar> = serde_json::from_value(doc)
        .map_err(|e| ProviderError::Parse(format!("CoinPaprika OHLCV ({e})")))?;
    Ok(bars
        .into_iter()
        .map(|b| {
            Candle::new(
                b.time_open,
                b.open,
                b.high,
                b.low,
                b.close,
                b.volume.unwrap_or_default(),
            )
        })
        .collect())
}

fn basic_table(doc: &Value) -> Table {
    let mut table = metrics(
        doc,
        &[
            ("id", "/id"),
            ("name", "/name"),
            ("symbol", "/symbol"),
            ("rank", "/rank"),
            ("type", "/type"),
            ("proof_type", "/proof_type"),
            ("org_structure", "/org_structure"),
            ("hash_algorithm", "/hash_algorithm"),
            ("started_at", "/started_at"),
            ("development_status", "/development_status"),
            ("open_source", "/open_source"),
            ("website", "/links/website"),
            ("source_code", "/links/source_code"),
            ("description", "/description"),
        ],
    );
    table.push_row(vec![Cell::text("tags"), join_field(doc, "/tags", "name")]);
    table.push_row(vec![Cell::text("team"), join_field(doc, "/team", "name")]);
    table
}

fn price_supply_table(doc: &Value, quote: &str) -> Table {
    let q = |field: &str| format!("/quotes/{quote}/{field}");
    metrics(
        doc,
        &[
            ("rank", "/rank".to_string()),
            ("price", q("price")),
            ("volume_24h", q("volume_24h")),
            ("market_cap", q("market_cap")),
            ("pct_change_1h", q("percent_change_1h")),
            ("pct_change_24h", q("percent_change_24h")),
            ("pct_change_7d", q("percent_change_7d")),
            ("pct_change_30d", q("percent_change_30d")),
            ("pct_change_1y", q("percent_change_1y")),
            ("ath_price", q("ath_price")),
            ("ath_date", q("ath_date")),
            ("pct_from_ath", q("percent_from_price_ath")),
            ("circulating_supply", "/circulating_supply".to_string()),
            ("total_supply", "/total_supply".to_string()),
            ("max_supply", "/max_supply".to_string()),
            ("beta_value", "/beta_value".to_string()),
            ("last_updated", "/last_updated".to_string()),
        ],
    )
}

fn coin_exchanges_table(items: &[Value]) -> Table {
    let mut table = Table::new(["id", "name", "volume_share_pct", "fiats"]);
    for item in items {
        table.push_row(vec![
            pick(item, "/id"),
            pick(item, "/name"),
            pick(item, "/adjusted_volume_24h_share"),
            join_field(item, "/fiats", "symbol"),
        ]);
    }
    table
}

#[async_trait]
impl MarketDataProvider for CoinPaprika {
    fn tag(&self) -> ProviderTag {
        ProviderTag::CoinPaprika
    }

    async fn resolve(&self, identifier: &str, _quote: Option<&str>) -> ProviderResult<CoinRef> {
        let entry = self.catalog().await?.resolve(identifier, self.tag())?;
        Ok(CoinRef::new(&entry.id, &entry.symbol, &entry.name, self.tag()))
    }

    async fn fetch_series(
        &self,
        coin: &CoinRef,
        request: &SeriesRequest,
    ) -> ProviderResult<Vec<Candle>> {
        let vs = request.vs.to_lowercase();
        if !SERIES_QUOTES.contains(&vs.as_str()) {
            return Err(ProviderError::InvalidArgument(format!(
                "CoinPaprika only charts against {}, not '{}'",
                SERIES_QUOTES.join(" or "),
                request.vs
            )));
        }
        let start = request.window.start_date(Utc::now().date_naive());
        let query = [
            ("start", start.format("%Y-%m-%d").to_string()),
            ("quote", vs),
        ];
        let doc = self
            .get(&format!("/coins/{}/ohlcv/historical", coin.id()), &query)
            .await?;
        let candles = parse_historical(doc)?;
        if candles.is_empty() {
            return Err(ProviderError::Empty(coin.to_string()));
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
        let id = coin.id();
        let quote = options.vs.to_uppercase();
        match kind {
            ReportKind::Basic => Ok(basic_table(&self.get(&format!("/coins/{id}"), &[]).await?)),
            ReportKind::PriceSupply => {
                let doc = self
                    .get(&format!("/tickers/{id}"), &[("quotes", quote.clone())])
                    .await?;
                Ok(price_supply_table(&doc, &quote))
            }
            ReportKind::Markets => {
                let doc = self
                    .get(&format!("/coins/{id}/markets"), &[("quotes", quote.clone())])
                    .await?;
                let items = array(&doc, "", "CoinPaprika coin markets")?;
                Ok(rows(
                    items,
                    &[
                        ("exchange", "/exchange_name".to_string()),
                        ("pair", "/pair".to_string()),
                        ("trust_score", "/trust_score".to_string()),
                        ("price", format!("/quotes/{quote}/price")),
                        ("volume_24h", format!("/quotes/{quote}/volume_24h")),
                        ("volume_share_pct", "/adjusted_volume_24h_share".to_string()),
                        ("category", "/category".to_string()),
                        ("fee_type", "/fee_type".to_string()),
                        ("url", "/market_url".to_string()),
                    ],
                ))
            }
            ReportKind::Exchanges => {
                let doc = self.get(&format!("/coins/{id}/exchanges"), &[]).await?;
                Ok(coin_exchanges_table(array(
                    &doc,
                    "",
                    "CoinPaprika coin exchanges",
                )?))
            }
            ReportKind::Twitter => {
                let doc = self.get(&format!("/coins/{id}/twitter"), &[]).await?;
                let items = array(&doc, "", "CoinPaprika twitter timeline")?;
                Ok(rows(
                    items,
                    &[
                        ("date", "/date"),
                        ("user_name", "/user_name"),
                        ("status", "/status"),
                        ("retweets", "/retweet_count"),
                        ("likes", "/like_count"),
                        ("url", "/status_link"),
                    ],
                ))
            }
            ReportKind::Events => {
                let doc = self.get(&format!("/coins/{id}/events"), &[]).await?;
                let items = array(&doc, "", "CoinPaprika events")?;
                Ok(rows(
                    items,
                    &[
                        ("date", "/date"),
                        ("date_to", "/date_to"),
                        ("name", "/name"),
                        ("description", "/description"),
                        ("conference", "/is_conference"),
                        ("url", "/link"),
                    ],
                ))
            }
            other => Err(ProviderError::UnsupportedReport {
                provider: self.tag(),
                report: other.token().to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    #[test]
    fn test_parse_historical() {
        let doc = json!([
            {
                "time_open": "2024-01-01T00:00:00Z",
                "time_close": "2024-01-01T23:59:59Z",
                "open": 42280.2, "high": 44175.4, "low": 42214.9, "close": 44179.9,
                "volume": 21_000_000_000_i64, "market_cap": 865_000_000_000_i64
            },
            {
                "time_open": "2024-01-02T00:00:00Z",
                "time_close": "2024-01-02T23:59:59Z",
                "open": 44179.9, "high": 45879.6, "low": 44148.3, "close": 44946.9,
                "volume": null, "market_cap": 880_000_000_000_i64
            }
        ]);
        let candles = parse_historical(doc).unwrap();
        assert_eq!(candles.len(), 2);
        assert_relative_eq!(candles[0].volume, 21e9);
        assert_relative_eq!(candles[1].volume, 0.0);
        assert_eq!(candles[1].timestamp.to_rfc3339(), "2024-01-02T00:00:00+00:00");

        assert!(parse_historical(json!({"error": "id not found"})).is_err());
    }

    #[test]
    fn test_basic_table_joins_tags() {
        let doc = json!({
            "id": "btc-bitcoin",
            "name": "Bitcoin",
            "symbol": "BTC",
            "rank": 1,
            "open_source": true,
            "tags": [{"id": "segwit", "name": "Segwit"}, {"id": "mining", "name": "Mining"}],
            "team": []
        });
        let table = basic_table(&doc);
        let tags = table
            .rows()
            .iter()
            .find(|row| row[0] == Cell::text("tags"))
            .unwrap();
        assert_eq!(tags[1], Cell::text("Segwit, Mining"));
        assert_eq!(table.rows()[10][1], Cell::Bool(true));
    }

    #[test]
    fn test_price_supply_quote() {
        let doc = json!({
            "rank": 1,
            "quotes": {"BTC": {"price": 1.0, "ath_date": "2021-11-10T16:51:15Z"}}
        });
        let table = price_supply_table(&doc, "BTC");
        assert_relative_eq!(table.rows()[1][1].as_f64().unwrap(), 1.0);
        assert!(matches!(table.rows()[10][1], Cell::Date(_)));
    }

    #[test]
    fn test_ticker_views_differ() {
        let info = ticker_columns("USD", TickerView::Info);
        let markets = ticker_columns("USD", TickerView::Markets);
        assert!(info.iter().any(|(name, _)| *name == "circulating_supply"));
        assert!(markets.iter().any(|(name, _)| *name == "pct_change_7d"));
        assert_eq!(info[3].1, "/quotes/USD/price");
    }

    #[test]
    fn test_coin_exchanges_fiats() {
        let items = json!([
            {"id": "binance", "name": "Binance", "adjusted_volume_24h_share": 12.5,
             "fiats": [{"name": "Euro", "symbol": "EUR"}, {"name": "Lira", "symbol": "TRY"}]}
        ]);
        let table = coin_exchanges_table(items.as_array().unwrap());
        assert_eq!(table.rows()[0][3], Cell::text("EUR, TRY"));
    }

    #[test]
    fn test_search_category_parse() {
        assert_eq!("coins".parse::<SearchCategory>(), Ok(SearchCategory::Currencies));
        assert_eq!("Tags".parse::<SearchCategory>(), Ok(SearchCategory::Tags));
        assert!("nfts".parse::<SearchCategory>().is_err());
    }
}
