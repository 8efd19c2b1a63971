//! Provider error types.

use coinshell_fetch::FetchError;
use coinshell_types::ProviderTag;
use thiserror::Error;

/// Result type alias for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors raised by market data providers.
///
/// None of these are fatal to the interactive session.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ProviderError {
    /// Network or HTTP failure.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The identifier matched nothing in the provider's catalog.
    #[error("Couldn't find '{identifier}' on {}{}", provider.display_name(), suggestion_hint(suggestions))]
    NotFound {
        /// The identifier the user typed.
        identifier: String,
        /// Provider that was searched.
        provider: ProviderTag,
        /// Closest catalog entries, best first.
        suggestions: Vec<String>,
    },

    /// The provider answered but returned no rows.
    #[error("No data returned for {0}")]
    Empty(String),

    /// The response did not have the expected shape.
    #[error("Unexpected response from {0}")]
    Parse(String),

    /// A request argument is not accepted by this provider.
    #[error("{0}")]
    InvalidArgument(String),

    /// The provider has no such report.
    #[error("{provider} does not offer the '{report}' report")]
    UnsupportedReport {
        /// Provider that was asked.
        provider: ProviderTag,
        /// Requested report token.
        report: String,
    },
}

fn suggestion_hint(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(". Did you mean: {}?", suggestions.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = ProviderError::NotFound {
            identifier: "bitcon".into(),
            provider: ProviderTag::CoinGecko,
            suggestions: vec!["bitcoin".into(), "bitcoin-cash".into()],
        };
        assert_eq!(
            err.to_string(),
            "Couldn't find 'bitcon' on CoinGecko. Did you mean: bitcoin, bitcoin-cash?"
        );

        let err = ProviderError::NotFound {
            identifier: "zzz".into(),
            provider: ProviderTag::Binance,
            suggestions: vec![],
        };
        assert_eq!(err.to_string(), "Couldn't find 'zzz' on Binance");
    }
}
