//! Coin references and provider tags.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Upstream source a coin can be loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ProviderTag {
    /// CoinGecko REST API.
    #[default]
    #[serde(rename = "cg")]
    CoinGecko,
    /// CoinPaprika REST API.
    #[serde(rename = "cp")]
    CoinPaprika,
    /// Binance spot REST API.
    #[serde(rename = "bin")]
    Binance,
}

impl ProviderTag {
    /// Returns the short tag used on the command line.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CoinGecko => "cg",
            Self::CoinPaprika => "cp",
            Self::Binance => "bin",
        }
    }

    /// Returns the human-readable provider name.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::CoinGecko => "CoinGecko",
            Self::CoinPaprika => "CoinPaprika",
            Self::Binance => "Binance",
        }
    }

    /// Returns all provider tags.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::CoinGecko, Self::CoinPaprika, Self::Binance]
    }
}

impl std::fmt::Display for ProviderTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProviderTag {
    type Err = ProviderTagParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cg" | "coingecko" => Ok(Self::CoinGecko),
            "cp" | "coinpaprika" => Ok(Self::CoinPaprika),
            "bin" | "binance" => Ok(Self::Binance),
            _ => Err(ProviderTagParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an unknown provider tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderTagParseError(String);

impl std::fmt::Display for ProviderTagParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid source '{}', expected one of: cg, cp, bin",
            self.0
        )
    }
}

impl std::error::Error for ProviderTagParseError {}

/// A coin resolved against one provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinRef {
    /// Provider-specific identifier (e.g., "bitcoin", "btc-bitcoin", "BTC").
    id: String,
    /// Ticker symbol (e.g., "BTC").
    symbol: String,
    /// Human-readable name (e.g., "Bitcoin").
    name: String,
    /// Provider that resolved this coin.
    provider: ProviderTag,
    /// Quote asset of the trading pair, for pair-based providers.
    quote: Option<String>,
}

impl CoinRef {
    /// Creates a new coin reference.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        symbol: impl Into<String>,
        name: impl Into<String>,
        provider: ProviderTag,
    ) -> Self {
        Self {
            id: id.into(),
            symbol: symbol.into(),
            name: name.into(),
            provider,
            quote: None,
        }
    }

    /// Binds the reference to a quote asset (e.g., `USDT` for `BTCUSDT`).
    #[must_use]
    pub fn with_quote(mut self, quote: impl Into<String>) -> Self {
        self.quote = Some(quote.into());
        self
    }

    /// Returns the provider-specific identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the ticker symbol.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Returns the human-readable name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the provider that resolved this coin.
    #[must_use]
    pub const fn provider(&self) -> ProviderTag {
        self.provider
    }

    /// Returns the quote asset, if the coin was resolved as a trading pair.
    #[must_use]
    pub fn quote(&self) -> Option<&str> {
        self.quote.as_deref()
    }

    /// Returns the trading pair symbol (e.g., `BTCUSDT`), if any.
    #[must_use]
    pub fn pair(&self) -> Option<String> {
        self.quote
            .as_ref()
            .map(|quote| format!("{}{}", self.symbol.to_uppercase(), quote.to_uppercase()))
    }
}

impl std::fmt::Display for CoinRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.quote {
            Some(quote) => write!(f, "{}/{} [{}]", self.symbol, quote, self.provider),
            None => write!(f, "{} ({}) [{}]", self.name, self.id, self.provider),
        }
    }
}
