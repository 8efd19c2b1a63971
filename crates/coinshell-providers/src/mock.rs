//! In-memory provider used by tests.

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use coinshell_types::{Candle, Cell, CoinRef, ProviderTag, Table};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::catalog::{Catalog, CatalogEntry};
use crate::provider::{MarketDataProvider, ReportKind, ReportOptions, SeriesRequest};
use crate::{ProviderError, ProviderResult};

const REPORTS: &[ReportKind] = &[ReportKind::Info, ReportKind::Candles];

/// Deterministic provider backed by a fixed catalog and synthetic candles.
#[derive(Debug)]
pub struct MockProvider {
    tag: ProviderTag,
    catalog: Catalog,
    series_requests: AtomicUsize,
}

impl MockProvider {
    /// Creates a mock with a small default catalog (bitcoin, ethereum, dogecoin).
    #[must_use]
    pub fn new(tag: ProviderTag) -> Self {
        Self::with_entries(
            tag,
            vec![
                CatalogEntry::new("bitcoin", "btc", "Bitcoin"),
                CatalogEntry::new("ethereum", "eth", "Ethereum"),
                CatalogEntry::new("dogecoin", "doge", "Dogecoin"),
            ],
        )
    }

    /// Creates a mock with a custom catalog.
    #[must_use]
    pub fn with_entries(tag: ProviderTag, entries: Vec<CatalogEntry>) -> Self {
        Self {
            tag,
            catalog: Catalog::new(entries),
            series_requests: AtomicUsize::new(0),
        }
    }

    /// Returns how many series requests have been served.
    #[must_use]
    pub fn series_requests(&self) -> usize {
        self.series_requests.load(Ordering::Relaxed)
    }

    fn candles(days: u32) -> Vec<Candle> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single();
        let Some(start) = start else {
            return Vec::new();
        };
        (0..days)
            .map(|i| {
                let base = 100.0 + f64::from(i);
                // Alternate direction so charts show both candle colours
                let (open, close) = if i % 2 == 0 {
                    (base, base + 1.0)
                } else {
                    (base + 1.0, base - 0.5)
                };
                Candle::new(
                    start + Duration::days(i64::from(i)),
                    open,
                    open.max(close) + 0.5,
                    open.min(close) - 0.5,
                    close,
                    1_000.0 + f64::from(i),
                )
            })
            .collect()
    }
}

#[async_trait]
impl MarketDataProvider for MockProvider {
    fn tag(&self) -> ProviderTag {
        self.tag
    }

    async fn resolve(&self, identifier: &str, quote: Option<&str>) -> ProviderResult<CoinRef> {
        let entry = self.catalog.resolve(identifier, self.tag)?;
        let coin = CoinRef::new(&entry.id, &entry.symbol, &entry.name, self.tag);
        Ok(match self.tag {
            ProviderTag::Binance => coin.with_quote(quote.unwrap_or("USDT").to_uppercase()),
            _ => coin,
        })
    }

    async fn fetch_series(
        &self,
        coin: &CoinRef,
        request: &SeriesRequest,
    ) -> ProviderResult<Vec<Candle>> {
        self.series_requests.fetch_add(1, Ordering::Relaxed);
        if self.catalog.find(coin.id()).is_none() {
            return Err(ProviderError::Empty(coin.to_string()));
        }
        Ok(Self::candles(request.window.days()))
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
        match kind {
            ReportKind::Info => Ok(Table::key_value([
                ("id", Cell::text(coin.id())),
                ("name", Cell::text(coin.name())),
                ("symbol", Cell::text(coin.symbol())),
                ("provider", Cell::text(coin.provider().display_name())),
            ])),
            ReportKind::Candles => {
                let days = u32::try_from(options.limit).unwrap_or(u32::MAX).min(365);
                let mut table = Table::new(["date", "close"]);
                for c in Self::candles(days) {
                    table.push_row(vec![c.timestamp.into(), c.close.into()]);
                }
                Ok(table)
            }
            other => Err(ProviderError::UnsupportedReport {
                provider: self.tag,
                report: other.token().to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coinshell_types::Window;

    #[tokio::test]
    async fn test_resolve_and_series() {
        let mock = MockProvider::new(ProviderTag::CoinGecko);
        let coin = mock.resolve("BTC", None).await.unwrap();
        assert_eq!(coin.id(), "bitcoin");
        assert_eq!(coin.quote(), None);

        let request = SeriesRequest {
            window: Window::new(10).unwrap(),
            ..SeriesRequest::default()
        };
        let candles = mock.fetch_series(&coin, &request).await.unwrap();
        assert_eq!(candles.len(), 10);
        assert!(candles.iter().all(|c| c.high >= c.open.max(c.close)));
        assert_eq!(mock.series_requests(), 1);
    }

    #[tokio::test]
    async fn test_binance_mock_binds_quote() {
        let mock = MockProvider::new(ProviderTag::Binance);
        let coin = mock.resolve("eth", Some("btc")).await.unwrap();
        assert_eq!(coin.pair().as_deref(), Some("ETHBTC"));
    }

    #[tokio::test]
    async fn test_unknown_coin() {
        let mock = MockProvider::new(ProviderTag::CoinPaprika);
        let err = mock.resolve("notacoin", None).await.unwrap_err();
        assert!(matches!(err, ProviderError::NotFound { .. }));
    }
}
