//! CoinGecko REST API provider.

use async_trait::async_trait;
use chrono::DateTime;
use coinshell_fetch::{ApiClient, url};
use coinshell_types::{Candle, Cell, CoinRef, ProviderTag, Table};
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;
use tracing::debug;

use crate::catalog::{Catalog, CatalogEntry};
use crate::json::{array, metrics, millis, number, pick, rows};
use crate::provider::{MarketDataProvider, ReportKind, ReportOptions, SeriesRequest};
use crate::{ProviderError, ProviderResult};

/// History lengths accepted by the OHLC endpoint, in days.
pub const OHLC_DAYS: [u32; 7] = [1, 7, 14, 30, 90, 180, 365];

const REPORTS: &[ReportKind] = &[
    ReportKind::Info,
    ReportKind::Market,
    ReportKind::AllTimeHigh,
    ReportKind::AllTimeLow,
    ReportKind::Score,
    ReportKind::Websites,
    ReportKind::Social,
    ReportKind::Explorers,
    ReportKind::Developers,
];

#[derive(Deserialize)]
struct ListedCoin {
    id: String,
    symbol: String,
    name: String,
}

/// Coins with a public-company treasury listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreasuryCoin {
    /// Bitcoin holdings.
    #[default]
    Bitcoin,
    /// Ether holdings.
    Ethereum,
}

impl TreasuryCoin {
    /// Returns the CoinGecko id.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Bitcoin => "bitcoin",
            Self::Ethereum => "ethereum",
        }
    }
}

impl FromStr for TreasuryCoin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bitcoin" | "btc" => Ok(Self::Bitcoin),
            "ethereum" | "eth" => Ok(Self::Ethereum),
            _ => Err(format!(
                "invalid coin '{s}', expected one of: bitcoin, ethereum"
            )),
        }
    }
}

/// CoinGecko public REST API.
#[derive(Debug)]
pub struct CoinGecko {
    client: ApiClient,
    base_url: String,
    catalog: OnceCell<Catalog>,
    // Last `/coins/{id}` document, reused across due-diligence reports
    coin_cache: Mutex<Option<(String, Arc<Value>)>>,
}

impl CoinGecko {
    /// Creates a provider talking to `base_url`.
    #[must_use]
    pub fn new(client: ApiClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            catalog: OnceCell::new(),
            coin_cache: Mutex::new(None),
        }
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> ProviderResult<Value> {
        let endpoint = url::join(&self.base_url, path);
        Ok(self.client.get_json(&endpoint, query).await?)
    }

    async fn load_catalog(&self) -> ProviderResult<Catalog> {
        let endpoint = url::join(&self.base_url, "/coins/list");
        let coins: Vec<ListedCoin> = self.client.get_json(&endpoint, &[]).await?;
        debug!(count = coins.len(), "loaded CoinGecko catalog");
        Ok(Catalog::new(
            coins
                .into_iter()
                .map(|c| CatalogEntry::new(c.id, c.symbol, c.name))
                .collect(),
        ))
    }

    async fn catalog(&self) -> ProviderResult<&Catalog> {
        self.catalog.get_or_try_init(|| self.load_catalog()).await
    }

    async fn coin_details(&self, id: &str) -> ProviderResult<Arc<Value>> {
        let cached = self.coin_cache.lock().ok().and_then(|guard| {
            guard
                .as_ref()
                .filter(|(cached_id, _)| cached_id == id)
                .map(|(_, doc)| Arc::clone(doc))
        });
        if let Some(doc) = cached {
            return Ok(doc);
        }

        let query = [
            ("localization", "false".to_string()),
            ("tickers", "false".to_string()),
            ("market_data", "true".to_string()),
            ("community_data", "true".to_string()),
            ("developer_data", "true".to_string()),
            ("sparkline", "false".to_string()),
        ];
        let doc = Arc::new(self.get(&format!("/coins/{id}"), &query).await?);
        if let Ok(mut guard) = self.coin_cache.lock() {
            *guard = Some((id.to_string(), Arc::clone(&doc)));
        }
        Ok(doc)
    }

    /// Lists every coin CoinGecko knows (`id`, `symbol`, `name`).
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be fetched.
    pub async fn coin_list(&self) -> ProviderResult<Table> {
        Ok(self.catalog().await?.to_table())
    }

    /// Lists the coins trending in CoinGecko searches.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    pub async fn trending(&self) -> ProviderResult<Table> {
        let doc = self.get("/search/trending", &[]).await?;
        let items = array(&doc, "/coins", "CoinGecko trending")?;
        let mut table = rows(
            items,
            &[
                ("name", "/item/name"),
                ("symbol", "/item/symbol"),
                ("market_cap_rank", "/item/market_cap_rank"),
                ("price_btc", "/item/price_btc"),
                ("id", "/item/id"),
            ],
        );
        table.insert_rank();
        Ok(table)
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
                ("active_cryptocurrencies", "/data/active_cryptocurrencies"),
                ("upcoming_icos", "/data/upcoming_icos"),
                ("ongoing_icos", "/data/ongoing_icos"),
                ("ended_icos", "/data/ended_icos"),
                ("markets", "/data/markets"),
                ("total_market_cap_usd", "/data/total_market_cap/usd"),
                ("total_volume_usd", "/data/total_volume/usd"),
                ("btc_dominance_pct", "/data/market_cap_percentage/btc"),
                ("eth_dominance_pct", "/data/market_cap_percentage/eth"),
                (
                    "market_cap_change_24h_pct",
                    "/data/market_cap_change_percentage_24h_usd",
                ),
            ],
        );
        let updated = doc
            .pointer("/data/updated_at")
            .and_then(Value::as_i64)
            .and_then(|secs| DateTime::from_timestamp(secs, 0));
        table.push_row(vec![Cell::text("updated_at"), updated.into()]);
        Ok(table)
    }

    /// Returns global decentralised finance statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn defi(&self) -> ProviderResult<Table> {
        let doc = self.get("/global/decentralized_finance_defi", &[]).await?;
        Ok(metrics(
            &doc,
            &[
                ("defi_market_cap", "/data/defi_market_cap"),
                ("eth_market_cap", "/data/eth_market_cap"),
                ("defi_to_eth_ratio", "/data/defi_to_eth_ratio"),
                ("trading_volume_24h", "/data/trading_volume_24h"),
                ("defi_dominance", "/data/defi_dominance"),
                ("top_coin_name", "/data/top_coin_name"),
                ("top_coin_defi_dominance", "/data/top_coin_defi_dominance"),
            ],
        ))
    }

    /// Lists stablecoins by market capitalisation.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    pub async fn stablecoins(&self, vs: &str) -> ProviderResult<Table> {
        let query = [
            ("vs_currency", vs.to_lowercase()),
            ("category", "stablecoins".to_string()),
            ("order", "market_cap_desc".to_string()),
            ("per_page", "250".to_string()),
        ];
        let doc = self.get("/coins/markets", &query).await?;
        let items = array(&doc, "", "CoinGecko stablecoins")?;
        Ok(rows(
            items,
            &[
                ("rank", "/market_cap_rank"),
                ("name", "/name"),
                ("symbol", "/symbol"),
                ("price", "/current_price"),
                ("market_cap", "/market_cap"),
                ("volume", "/total_volume"),
                ("change_24h", "/price_change_percentage_24h"),
                ("circulating_supply", "/circulating_supply"),
            ],
        ))
    }

    /// Lists exchanges ranked by trust score.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    pub async fn exchanges(&self) -> ProviderResult<Table> {
        let doc = self
            .get("/exchanges", &[("per_page", "250".to_string())])
            .await?;
        let items = array(&doc, "", "CoinGecko exchanges")?;
        Ok(rows(
            items,
            &[
                ("rank", "/trust_score_rank"),
                ("name", "/name"),
                ("country", "/country"),
                ("established", "/year_established"),
                ("trust_score", "/trust_score"),
                ("volume_24h_btc", "/trade_volume_24h_btc"),
                ("url", "/url"),
            ],
        ))
    }

    /// Lists BTC exchange rates against fiat, crypto and commodities.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    pub async fn exchange_rates(&self) -> ProviderResult<Table> {
        let doc = self.get("/exchange_rates", &[]).await?;
        let rates = doc
            .pointer("/rates")
            .and_then(Value::as_object)
            .ok_or_else(|| ProviderError::Parse("CoinGecko exchange rates".into()))?;
        let mut table = Table::new(["key", "name", "unit", "value", "type"]);
        for (key, rate) in rates {
            table.push_row(vec![
                Cell::text(key),
                pick(rate, "/name"),
                pick(rate, "/unit"),
                pick(rate, "/value"),
                pick(rate, "/type"),
            ]);
        }
        Ok(table)
    }

    /// Lists market indexes.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    pub async fn indexes(&self) -> ProviderResult<Table> {
        let doc = self
            .get("/indexes", &[("per_page", "250".to_string())])
            .await?;
        let items = array(&doc, "", "CoinGecko indexes")?;
        Ok(rows(
            items,
            &[
                ("name", "/name"),
                ("id", "/id"),
                ("market", "/market"),
                ("last", "/last"),
                ("multi_asset", "/is_multi_asset_composite"),
            ],
        ))
    }

    /// Lists derivative contracts.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    pub async fn derivatives(&self) -> ProviderResult<Table> {
        let doc = self.get("/derivatives", &[]).await?;
        let items = array(&doc, "", "CoinGecko derivatives")?;
        Ok(rows(
            items,
            &[
                ("market", "/market"),
                ("symbol", "/symbol"),
                ("price", "/price"),
                ("change_24h", "/price_percentage_change_24h"),
                ("contract_type", "/contract_type"),
                ("basis", "/basis"),
                ("spread", "/spread"),
                ("funding_rate", "/funding_rate"),
                ("volume_24h", "/volume_24h"),
            ],
        ))
    }

    /// Lists coin categories with their market capitalisation.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    pub async fn categories(&self) -> ProviderResult<Table> {
        let doc = self.get("/coins/categories", &[]).await?;
        let items = array(&doc, "", "CoinGecko categories")?;
        let mut table = rows(
            items,
            &[
                ("name", "/name"),
                ("market_cap", "/market_cap"),
                ("market_cap_change_24h", "/market_cap_change_24h"),
                ("volume_24h", "/volume_24h"),
                ("updated_at", "/updated_at"),
            ],
        );
        table.insert_rank();
        Ok(table)
    }

    async fn treasury(&self, coin: TreasuryCoin) -> ProviderResult<Value> {
        self.get(&format!("/companies/public_treasury/{}", coin.as_str()), &[])
            .await
    }

    /// Summarises public companies' holdings of a coin.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn holdings_overview(&self, coin: TreasuryCoin) -> ProviderResult<Table> {
        let doc = self.treasury(coin).await?;
        Ok(metrics(
            &doc,
            &[
                ("total_holdings", "/total_holdings"),
                ("total_value_usd", "/total_value_usd"),
                ("market_cap_dominance", "/market_cap_dominance"),
            ],
        ))
    }

    /// Lists public companies holding a coin.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    pub async fn companies(&self, coin: TreasuryCoin) -> ProviderResult<Table> {
        let doc = self.treasury(coin).await?;
        let items = array(&doc, "/companies", "CoinGecko public treasury")?;
        let mut table = rows(
            items,
            &[
                ("company", "/name"),
                ("ticker", "/symbol"),
                ("country", "/country"),
                ("total_holdings", "/total_holdings"),
                ("entry_value_usd", "/total_entry_value_usd"),
                ("current_value_usd", "/total_current_value_usd"),
                ("pct_of_supply", "/percentage_of_total_supply"),
            ],
        );
        table.insert_rank();
        Ok(table)
    }
}

/// Parses `/coins/{id}/ohlc` rows (`[ms, open, high, low, close]`).
fn parse_ohlc(doc: &Value) -> ProviderResult<Vec<Candle>> {
    array(doc, "", "CoinGecko OHLC")?
        .iter()
        .map(|row| {
            let field = |i: usize| row.get(i).and_then(number);
            match (row.get(0).and_then(millis), field(1), field(2), field(3), field(4)) {
                (Some(ts), Some(open), Some(high), Some(low), Some(close)) => {
                    Ok(Candle::new(ts, open, high, low, close, 0.0))
                }
                _ => Err(ProviderError::Parse("CoinGecko OHLC row".into())),
            }
        })
        .collect()
}

/// Projects one coin-level report out of a `/coins/{id}` document.
fn coin_report(doc: &Value, kind: ReportKind, vs: &str) -> ProviderResult<Table> {
    let vs = vs.to_lowercase();
    let per_vs = |field: &str| format!("/market_data/{field}/{vs}");
    let plain = |pointer: &str| pointer.to_string();

    let table = match kind {
        ReportKind::Info => metrics(
            doc,
            &[
                ("id", "/id"),
                ("name", "/name"),
                ("symbol", "/symbol"),
                ("asset_platform", "/asset_platform_id"),
                ("hashing_algorithm", "/hashing_algorithm"),
                ("genesis_date", "/genesis_date"),
                ("country_origin", "/country_origin"),
                ("categories", "/categories"),
                ("market_cap_rank", "/market_cap_rank"),
                ("description", "/description/en"),
            ],
        ),
        ReportKind::Market => metrics(
            doc,
            &[
                ("current_price", per_vs("current_price")),
                ("market_cap", per_vs("market_cap")),
                ("total_volume", per_vs("total_volume")),
                ("fully_diluted_valuation", per_vs("fully_diluted_valuation")),
                ("high_24h", per_vs("high_24h")),
                ("low_24h", per_vs("low_24h")),
                ("change_24h_pct", plain("/market_data/price_change_percentage_24h")),
                ("change_7d_pct", plain("/market_data/price_change_percentage_7d")),
                ("change_30d_pct", plain("/market_data/price_change_percentage_30d")),
                ("change_1y_pct", plain("/market_data/price_change_percentage_1y")),
                ("circulating_supply", plain("/market_data/circulating_supply")),
                ("total_supply", plain("/market_data/total_supply")),
                ("max_supply", plain("/market_data/max_supply")),
                ("market_cap_rank", plain("/market_cap_rank")),
                ("last_updated", plain("/market_data/last_updated")),
            ],
        ),
        ReportKind::AllTimeHigh => metrics(
            doc,
            &[
                ("current_price", per_vs("current_price")),
                ("ath", per_vs("ath")),
                ("ath_date", per_vs("ath_date")),
                ("ath_change_pct", per_vs("ath_change_percentage")),
            ],
        ),
        ReportKind::AllTimeLow => metrics(
            doc,
            &[
                ("current_price", per_vs("current_price")),
                ("atl", per_vs("atl")),
                ("atl_date", per_vs("atl_date")),
                ("atl_change_pct", per_vs("atl_change_percentage")),
            ],
        ),
        ReportKind::Score => metrics(
            doc,
            &[
                ("coingecko_score", "/coingecko_score"),
                ("developer_score", "/developer_score"),
                ("community_score", "/community_score"),
                ("liquidity_score", "/liquidity_score"),
                ("public_interest_score", "/public_interest_score"),
                ("sentiment_up_pct", "/sentiment_votes_up_percentage"),
                ("sentiment_down_pct", "/sentiment_votes_down_percentage"),
            ],
        ),
        ReportKind::Websites => metrics(
            doc,
            &[
                ("homepage", "/links/homepage"),
                ("official_forum", "/links/official_forum_url"),
                ("chat", "/links/chat_url"),
                ("announcement", "/links/announcement_url"),
                ("github", "/links/repos_url/github"),
                ("bitbucket", "/links/repos_url/bitbucket"),
            ],
        ),
        ReportKind::Social => metrics(
            doc,
            &[
                ("twitter", "/links/twitter_screen_name"),
                ("facebook", "/links/facebook_username"),
                ("subreddit", "/links/subreddit_url"),
                ("telegram", "/links/telegram_channel_identifier"),
                ("twitter_followers", "/community_data/twitter_followers"),
                ("reddit_subscribers", "/community_data/reddit_subscribers"),
                ("reddit_posts_48h", "/community_data/reddit_average_posts_48h"),
                (
                    "telegram_users",
                    "/community_data/telegram_channel_user_count",
                ),
                ("facebook_likes", "/community_data/facebook_likes"),
            ],
        ),
        ReportKind::Explorers => {
            let mut table = Table::new(["url"]);
            for site in doc
                .pointer("/links/blockchain_site")
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
                .filter_map(Value::as_str)
                .filter(|s| !s.trim().is_empty())
            {
                table.push_row(vec![Cell::text(site)]);
            }
            table
        }
        ReportKind::Developers => metrics(
            doc,
            &[
                ("forks", "/developer_data/forks"),
                ("stars", "/developer_data/stars"),
                ("subscribers", "/developer_data/subscribers"),
                ("total_issues", "/developer_data/total_issues"),
                ("closed_issues", "/developer_data/closed_issues"),
                ("pull_requests_merged", "/developer_data/pull_requests_merged"),
                (
                    "pull_request_contributors",
                    "/developer_data/pull_request_contributors",
                ),
                ("commits_4_weeks", "/developer_data/commit_count_4_weeks"),
                (
                    "code_additions_4_weeks",
                    "/developer_data/code_additions_deletions_4_weeks/additions",
                ),
                (
                    "code_deletions_4_weeks",
                    "/developer_data/code_additions_deletions_4_weeks/deletions",
                ),
            ],
        ),
        other => {
            return Err(ProviderError::UnsupportedReport {
                provider: ProviderTag::CoinGecko,
                report: other.token().to_string(),
            });
        }
    };
    Ok(table)
}

#[async_trait]
impl MarketDataProvider for CoinGecko {
    fn tag(&self) -> ProviderTag {
        ProviderTag::CoinGecko
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
        let days = request.window.snap_to(&OHLC_DAYS);
        let query = [
            ("vs_currency", request.vs.to_lowercase()),
            ("days", days.to_string()),
        ];
        let doc = self
            .get(&format!("/coins/{}/ohlc", coin.id()), &query)
            .await?;
        let candles = parse_ohlc(&doc)?;
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
        if !REPORTS.contains(&kind) {
            return Err(ProviderError::UnsupportedReport {
                provider: self.tag(),
                report: kind.token().to_string(),
            });
        }
        let doc = self.coin_details(coin.id()).await?;
        coin_report(&doc, kind, &options.vs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn bitcoin_doc() -> Value {
        json!({
            "id": "bitcoin",
            "symbol": "btc",
            "name": "Bitcoin",
            "hashing_algorithm": "SHA-256",
            "categories": ["Cryptocurrency", "Layer 1 (L1)"],
            "genesis_date": "2009-01-03",
            "market_cap_rank": 1,
            "links": {
                "homepage": ["http://www.bitcoin.org", "", ""],
                "blockchain_site": ["https://blockchair.com/bitcoin/", "", "https://btc.com/"],
                "repos_url": {"github": ["https://github.com/bitcoin/bitcoin"], "bitbucket": []}
            },
            "market_data": {
                "current_price": {"usd": 43000.5, "eur": 39000},
                "ath": {"usd": 69045},
                "ath_date": {"usd": "2021-11-10T14:24:11.849Z"},
                "ath_change_percentage": {"usd": -37.7},
                "price_change_percentage_24h": 1.5
            },
            "developer_data": {"forks": 36000, "stars": 73000}
        })
    }

    #[test]
    fn test_info_report() {
        let table = coin_report(&bitcoin_doc(), ReportKind::Info, "usd").unwrap();
        assert_eq!(table.columns(), ["Metric", "Value"]);
        assert_eq!(table.rows()[1][1], Cell::text("Bitcoin"));
        assert_eq!(
            table.rows()[7][1],
            Cell::text("Cryptocurrency, Layer 1 (L1)")
        );
        assert!(matches!(table.rows()[5][1], Cell::Date(_)));
    }

    #[test]
    fn test_market_report_honours_quote() {
        let table = coin_report(&bitcoin_doc(), ReportKind::Market, "EUR").unwrap();
        assert_relative_eq!(table.rows()[0][1].as_f64().unwrap(), 39_000.0);
        // Missing market data stays empty instead of failing
        assert!(table.rows()[1][1].is_empty());
    }

    #[test]
    fn test_ath_report() {
        let table = coin_report(&bitcoin_doc(), ReportKind::AllTimeHigh, "usd").unwrap();
        assert_relative_eq!(table.rows()[1][1].as_f64().unwrap(), 69_045.0);
        assert!(matches!(table.rows()[2][1], Cell::Date(_)));
    }

    #[test]
    fn test_explorers_skip_blanks() {
        let table = coin_report(&bitcoin_doc(), ReportKind::Explorers, "usd").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[1][0], Cell::text("https://btc.com/"));
    }

    #[test]
    fn test_unsupported_report() {
        let err = coin_report(&bitcoin_doc(), ReportKind::OrderBook, "usd").unwrap_err();
        assert!(matches!(err, ProviderError::UnsupportedReport { .. }));
    }

    #[test]
    fn test_parse_ohlc() {
        let doc = json!([
            [1_704_067_200_000_i64, 42000.0, 42500.5, 41800.0, 42300.0],
            [1_704_153_600_000_i64, 42300.0, 43000.0, 42100.0, 42900.0]
        ]);
        let candles = parse_ohlc(&doc).unwrap();
        assert_eq!(candles.len(), 2);
        assert_relative_eq!(candles[0].high, 42_500.5);
        assert_relative_eq!(candles[1].close, 42_900.0);
        assert!(candles[0].timestamp < candles[1].timestamp);

        assert!(parse_ohlc(&json!([[1, "x"]])).is_err());
        assert!(parse_ohlc(&json!({"error": "bad"})).is_err());
    }

    #[test]
    fn test_treasury_coin_parse() {
        assert_eq!("BTC".parse::<TreasuryCoin>(), Ok(TreasuryCoin::Bitcoin));
        assert_eq!("ethereum".parse::<TreasuryCoin>(), Ok(TreasuryCoin::Ethereum));
        assert!("doge".parse::<TreasuryCoin>().is_err());
    }
}
