//! OHLCV (candlestick) data structure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One candlestick of a price/volume series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Candle open time (start of the period).
    pub timestamp: DateTime<Utc>,
    /// Opening price.
    pub open: f64,
    /// Highest price during the period.
    pub high: f64,
    /// Lowest price during the period.
    pub low: f64,
    /// Closing price.
    pub close: f64,
    /// Traded volume, zero when the provider does not report it.
    pub volume: f64,
}

impl Candle {
    /// Creates a new candle.
    #[must_use]
    pub const fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Returns the price range (high - low).
    #[must_use]
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Returns the body size (|close - open|).
    #[must_use]
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// Returns true if this is a bullish (green) candle.
    #[must_use]
    pub fn is_bullish(&self) -> bool {
        self.close >= self.open
    }

    /// Merges a later candle into this one, widening the period.
    #[must_use]
    pub fn merge(self, later: &Self) -> Self {
        Self {
            timestamp: self.timestamp,
            open: self.open,
            high: self.high.max(later.high),
            low: self.low.min(later.low),
            close: later.close,
            volume: self.volume + later.volume,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn create_test_candle() -> Candle {
        let timestamp = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Candle::new(timestamp, 42_000.0, 43_500.0, 41_800.0, 43_100.0, 1_250.0)
    }

    #[test]
    fn test_range_and_body() {
        let candle = create_test_candle();
        assert!((candle.range() - 1_700.0).abs() < 1e-9);
        assert!((candle.body() - 1_100.0).abs() < 1e-9);
        assert!(candle.is_bullish());
    }

    #[test]
    fn test_merge() {
        let first = create_test_candle();
        let timestamp = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let second = Candle::new(timestamp, 43_100.0, 44_000.0, 41_000.0, 41_500.0, 750.0);

        let merged = first.merge(&second);
        assert_eq!(merged.timestamp, first.timestamp);
        assert!((merged.open - 42_000.0).abs() < 1e-9);
        assert!((merged.high - 44_000.0).abs() < 1e-9);
        assert!((merged.low - 41_000.0).abs() < 1e-9);
        assert!((merged.close - 41_500.0).abs() < 1e-9);
        assert!((merged.volume - 2_000.0).abs() < 1e-9);
        assert!(!merged.is_bullish());
    }
}
