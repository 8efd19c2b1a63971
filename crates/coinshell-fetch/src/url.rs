//! Upstream base URLs and URL construction.

use serde::Deserialize;

/// Base URL for the CoinGecko REST API.
pub const COINGECKO_API: &str = "https://api.coingecko.com/api/v3";

/// Base URL for the CoinPaprika REST API.
pub const COINPAPRIKA_API: &str = "https://api.coinpaprika.com/v1";

/// Base URL for the Binance spot REST API.
pub const BINANCE_API: &str = "https://api.binance.com/api/v3";

/// Base URL for the CoinGecko website (scraped pages).
pub const COINGECKO_WEB: &str = "https://www.coingecko.com";

/// Base URLs of every upstream source, overridable from the config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Endpoints {
    /// CoinGecko REST API.
    pub coingecko: String,
    /// CoinPaprika REST API.
    pub coinpaprika: String,
    /// Binance REST API.
    pub binance: String,
    /// CoinGecko website.
    pub coingecko_web: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            coingecko: COINGECKO_API.to_string(),
            coinpaprika: COINPAPRIKA_API.to_string(),
            binance: BINANCE_API.to_string(),
            coingecko_web: COINGECKO_WEB.to_string(),
        }
    }
}

/// Joins a base URL and a path with exactly one slash between them.
///
/// # Example
///
/// ```
/// use coinshell_fetch::url::join;
///
/// assert_eq!(
///     join("https://api.coingecko.com/api/v3/", "/coins/bitcoin/ohlc"),
///     "https://api.coingecko.com/api/v3/coins/bitcoin/ohlc"
/// );
/// ```
#[must_use]
pub fn join(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Turns a link scraped from a page into an absolute URL.
#[must_use]
pub fn absolute(base: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else {
        join(base, href)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_slashes() {
        assert_eq!(join("https://a.io", "x"), "https://a.io/x");
        assert_eq!(join("https://a.io/", "/x/y"), "https://a.io/x/y");
    }

    #[test]
    fn test_absolute_link() {
        assert_eq!(
            absolute(COINGECKO_WEB, "/en/coins/bitcoin"),
            "https://www.coingecko.com/en/coins/bitcoin"
        );
        assert_eq!(
            absolute(COINGECKO_WEB, "https://example.com/a"),
            "https://example.com/a"
        );
    }

    #[test]
    fn test_default_endpoints() {
        let endpoints = Endpoints::default();
        assert_eq!(endpoints.binance, BINANCE_API);
        assert!(endpoints.coingecko.ends_with("/api/v3"));
    }
}
