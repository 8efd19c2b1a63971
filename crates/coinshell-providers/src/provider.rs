//! The market data provider abstraction.

use async_trait::async_trait;
use coinshell_types::{Candle, CoinRef, Interval, ProviderTag, Table, Window};
use std::collections::HashMap;
use std::sync::Arc;

use crate::ProviderResult;

/// Coin-level due-diligence report a provider can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    /// General project information.
    Info,
    /// Market statistics in the quote currency.
    Market,
    /// All-time-high statistics.
    AllTimeHigh,
    /// All-time-low statistics.
    AllTimeLow,
    /// Provider scores and sentiment.
    Score,
    /// Project websites.
    Websites,
    /// Social media accounts and audience.
    Social,
    /// Blockchain explorers.
    Explorers,
    /// Repository activity.
    Developers,
    /// Basic project metadata.
    Basic,
    /// Price and supply.
    PriceSupply,
    /// Markets the coin trades on.
    Markets,
    /// Exchanges listing the coin.
    Exchanges,
    /// Recent tweets.
    Twitter,
    /// Upcoming and past events.
    Events,
    /// Order book depth.
    OrderBook,
    /// Latest candles as a table.
    Candles,
}

impl ReportKind {
    /// Returns the menu command token for this report.
    #[must_use]
    pub const fn token(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Market => "market",
            Self::AllTimeHigh => "ath",
            Self::AllTimeLow => "atl",
            Self::Score => "score",
            Self::Websites => "web",
            Self::Social => "social",
            Self::Explorers => "bc",
            Self::Developers => "dev",
            Self::Basic => "basic",
            Self::PriceSupply => "ps",
            Self::Markets => "mkt",
            Self::Exchanges => "ex",
            Self::Twitter => "twitter",
            Self::Events => "events",
            Self::OrderBook => "book",
            Self::Candles => "candle",
        }
    }

    /// Returns the one-line help text for this report.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Info => "basic information about loaded coin",
            Self::Market => "market stats about loaded coin",
            Self::AllTimeHigh => "all time high related stats for loaded coin",
            Self::AllTimeLow => "all time low related stats for loaded coin",
            Self::Score => "different kind of scores for loaded coin",
            Self::Websites => "websites found for given coin",
            Self::Social => "social portals urls for loaded coin",
            Self::Explorers => "blockchain explorers urls for loaded coin",
            Self::Developers => "github, bitbucket coin development stats",
            Self::Basic => "basic information about loaded coin",
            Self::PriceSupply => "price and supply related metrics for loaded coin",
            Self::Markets => "all markets for loaded coin",
            Self::Exchanges => "all exchanges where loaded coin is listed",
            Self::Twitter => "tweets for loaded coin",
            Self::Events => "events related to loaded coin",
            Self::OrderBook => "show order book",
            Self::Candles => "show candles",
        }
    }

    /// Returns true if this report lists rows that carry a `url` column.
    #[must_use]
    pub const fn has_links(&self) -> bool {
        matches!(self, Self::Markets | Self::Events | Self::Twitter)
    }
}

/// Parameters of a price/volume series request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesRequest {
    /// Quote currency (e.g. `usd`, `btc`, `USDT`).
    pub vs: String,
    /// How much history to request.
    pub window: Window,
    /// Candle interval, honoured by providers that support it.
    pub interval: Interval,
}

impl Default for SeriesRequest {
    fn default() -> Self {
        Self {
            vs: "usd".to_string(),
            window: Window::default(),
            interval: Interval::Day1,
        }
    }
}

/// Options shared by every due-diligence report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    /// Quote currency for prices.
    pub vs: String,
    /// Number of rows to request from providers that page results.
    pub limit: usize,
    /// Candle interval for the candle report.
    pub interval: Interval,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            vs: "usd".to_string(),
            limit: 100,
            interval: Interval::Day1,
        }
    }
}

/// A source of coin catalogs, price series and coin-level reports.
#[async_trait]
pub trait MarketDataProvider: Send + Sync + std::fmt::Debug {
    /// Returns the tag coins resolved by this provider carry.
    fn tag(&self) -> ProviderTag;

    /// Resolves a user-typed identifier to a coin.
    ///
    /// `quote` selects the trading pair for pair-based providers and is
    /// ignored elsewhere.
    async fn resolve(&self, identifier: &str, quote: Option<&str>) -> ProviderResult<CoinRef>;

    /// Fetches the price/volume series of a resolved coin.
    async fn fetch_series(&self, coin: &CoinRef, request: &SeriesRequest)
    -> ProviderResult<Vec<Candle>>;

    /// Returns the reports this provider offers, in menu order.
    fn reports(&self) -> &'static [ReportKind];

    /// Produces one report for a resolved coin.
    async fn report(
        &self,
        coin: &CoinRef,
        kind: ReportKind,
        options: &ReportOptions,
    ) -> ProviderResult<Table>;
}

/// Providers available to a session, keyed by tag.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<ProviderTag, Arc<dyn MarketDataProvider>>,
}

impl ProviderRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a provider under its own tag, replacing any previous one.
    pub fn register(&mut self, provider: Arc<dyn MarketDataProvider>) {
        self.providers.insert(provider.tag(), provider);
    }

    /// Returns the provider for a tag.
    #[must_use]
    pub fn get(&self, tag: ProviderTag) -> Option<Arc<dyn MarketDataProvider>> {
        self.providers.get(&tag).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MockProvider;

    #[test]
    fn test_report_tokens_unique() {
        let all = [
            ReportKind::Info,
            ReportKind::Market,
            ReportKind::AllTimeHigh,
            ReportKind::AllTimeLow,
            ReportKind::Score,
            ReportKind::Websites,
            ReportKind::Social,
            ReportKind::Explorers,
            ReportKind::Developers,
            ReportKind::Basic,
            ReportKind::PriceSupply,
            ReportKind::Markets,
            ReportKind::Exchanges,
            ReportKind::Twitter,
            ReportKind::Events,
            ReportKind::OrderBook,
            ReportKind::Candles,
        ];
        let mut tokens: Vec<_> = all.iter().map(ReportKind::token).collect();
        tokens.sort_unstable();
        tokens.dedup();
        assert_eq!(tokens.len(), all.len());
    }

    #[test]
    fn test_registry_lookup() {
        let mut registry = ProviderRegistry::new();
        assert!(registry.get(ProviderTag::CoinGecko).is_none());
        registry.register(Arc::new(MockProvider::new(ProviderTag::Binance)));
        registry.register(Arc::new(MockProvider::new(ProviderTag::CoinGecko)));
        assert!(registry.get(ProviderTag::CoinPaprika).is_none());
        assert_eq!(
            registry.get(ProviderTag::Binance).map(|p| p.tag()),
            Some(ProviderTag::Binance)
        );
    }
}
