//! The coin currently loaded in the terminal.

use coinshell_lib::{Candle, CoinRef};
use tracing::info;

/// Session state shared by every menu.
///
/// Holds the most recently loaded coin, or nothing. Only `load` and `clear`
/// change it.
#[derive(Debug, Clone, Default)]
pub struct Session {
    coin: Option<CoinRef>,
    candles: Option<Vec<Candle>>,
    quote: Option<String>,
}

impl Session {
    /// Creates an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the loaded coin.
    #[must_use]
    pub const fn coin(&self) -> Option<&CoinRef> {
        self.coin.as_ref()
    }

    /// Returns the series cached when the coin was loaded.
    #[must_use]
    pub fn candles(&self) -> Option<&[Candle]> {
        self.candles.as_deref()
    }

    /// Returns the quote currency chosen at load time.
    #[must_use]
    pub fn quote(&self) -> Option<&str> {
        self.quote.as_deref()
    }

    /// Returns true when a coin is loaded.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.coin.is_some()
    }

    /// Replaces the session with a freshly loaded coin.
    pub fn load(&mut self, coin: CoinRef, quote: Option<String>, candles: Option<Vec<Candle>>) {
        info!(coin = %coin, "loaded coin");
        self.coin = Some(coin);
        self.quote = quote;
        self.candles = candles;
    }

    /// Empties the session, returning the coin that was loaded.
    pub fn clear(&mut self) -> Option<CoinRef> {
        self.candles = None;
        self.quote = None;
        let removed = self.coin.take();
        if let Some(coin) = &removed {
            info!(coin = %coin, "cleared coin");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coinshell_lib::ProviderTag;

    #[test]
    fn test_load_and_clear() {
        let mut session = Session::new();
        assert!(!session.is_loaded());
        assert!(session.clear().is_none());

        let coin = CoinRef::new("bitcoin", "btc", "Bitcoin", ProviderTag::CoinGecko);
        session.load(coin.clone(), Some("eur".into()), None);
        assert_eq!(session.coin(), Some(&coin));
        assert_eq!(session.quote(), Some("eur"));

        assert_eq!(session.clear(), Some(coin));
        assert!(!session.is_loaded());
        assert!(session.quote().is_none());
        assert!(session.candles().is_none());
    }
}
