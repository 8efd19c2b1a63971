//! Kline interval definitions.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Candle interval for kline requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Interval {
    /// 1-minute candles.
    #[serde(rename = "1m")]
    Minute1,
    /// 5-minute candles.
    #[serde(rename = "5m")]
    Minute5,
    /// 15-minute candles.
    #[serde(rename = "15m")]
    Minute15,
    /// 30-minute candles.
    #[serde(rename = "30m")]
    Minute30,
    /// 1-hour candles.
    #[serde(rename = "1h")]
    Hour1,
    /// 4-hour candles.
    #[serde(rename = "4h")]
    Hour4,
    /// 12-hour candles.
    #[serde(rename = "12h")]
    Hour12,
    /// Daily candles.
    #[default]
    #[serde(rename = "1d")]
    Day1,
    /// Weekly candles.
    #[serde(rename = "1w")]
    Week1,
    /// Monthly candles.
    #[serde(rename = "1M")]
    Month1,
}

impl Interval {
    /// Returns the duration in seconds (months count as 30 days).
    #[must_use]
    pub const fn seconds(&self) -> u64 {
        match self {
            Self::Minute1 => 60,
            Self::Minute5 => 300,
            Self::Minute15 => 900,
            Self::Minute30 => 1800,
            Self::Hour1 => 3600,
            Self::Hour4 => 14_400,
            Self::Hour12 => 43_200,
            Self::Day1 => 86_400,
            Self::Week1 => 604_800,
            Self::Month1 => 2_592_000,
        }
    }

    /// Returns the interval in the exchange wire format (e.g., "1h", "1M").
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Minute1 => "1m",
            Self::Minute5 => "5m",
            Self::Minute15 => "15m",
            Self::Minute30 => "30m",
            Self::Hour1 => "1h",
            Self::Hour4 => "4h",
            Self::Hour12 => "12h",
            Self::Day1 => "1d",
            Self::Week1 => "1w",
            Self::Month1 => "1M",
        }
    }

    /// Returns how many candles of this interval cover the given number of days.
    #[must_use]
    pub const fn candles_in_days(&self, days: u32) -> u64 {
        let total = days as u64 * 86_400;
        let count = total / self.seconds();
        if count == 0 { 1 } else { count }
    }

    /// Returns all available intervals.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Minute1,
            Self::Minute5,
            Self::Minute15,
            Self::Minute30,
            Self::Hour1,
            Self::Hour4,
            Self::Hour12,
            Self::Day1,
            Self::Week1,
            Self::Month1,
        ]
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Interval {
    type Err = IntervalParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // "1M" (month) and "1m" (minute) only differ by case
        if s == "1M" {
            return Ok(Self::Month1);
        }
        match s.to_lowercase().as_str() {
            "1m" | "m1" | "minute" => Ok(Self::Minute1),
            "5m" | "m5" => Ok(Self::Minute5),
            "15m" | "m15" => Ok(Self::Minute15),
            "30m" | "m30" => Ok(Self::Minute30),
            "1h" | "h1" | "hour" => Ok(Self::Hour1),
            "4h" | "h4" => Ok(Self::Hour4),
            "12h" | "h12" => Ok(Self::Hour12),
            "1d" | "d1" | "day" | "daily" => Ok(Self::Day1),
            "1w" | "w1" | "week" | "weekly" => Ok(Self::Week1),
            "month" | "monthly" => Ok(Self::Month1),
            _ => Err(IntervalParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an invalid interval string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalParseError(String);

impl std::fmt::Display for IntervalParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid interval '{}', expected one of: 1m, 5m, 15m, 30m, 1h, 4h, 12h, 1d, 1w, 1M",
            self.0
        )
    }
}

impl std::error::Error for IntervalParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_parse() {
        assert_eq!("1h".parse::<Interval>().unwrap(), Interval::Hour1);
        assert_eq!("1m".parse::<Interval>().unwrap(), Interval::Minute1);
        assert_eq!("1M".parse::<Interval>().unwrap(), Interval::Month1);
        assert_eq!("D1".parse::<Interval>().unwrap(), Interval::Day1);
        assert!("2d".parse::<Interval>().is_err());
    }

    #[test]
    fn test_candles_in_days() {
        assert_eq!(Interval::Day1.candles_in_days(30), 30);
        assert_eq!(Interval::Hour4.candles_in_days(1), 6);
        assert_eq!(Interval::Week1.candles_in_days(3), 1);
    }
}
