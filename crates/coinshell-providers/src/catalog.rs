//! Coin catalogs and identifier resolution.

use coinshell_types::{Cell, ProviderTag, Table};

use crate::ProviderError;

/// Minimum Jaro-Winkler similarity for a catalog entry to be suggested.
const MIN_SIMILARITY: f64 = 0.7;

/// One coin (or trading pair) listed by a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Provider-specific identifier.
    pub id: String,
    /// Ticker symbol.
    pub symbol: String,
    /// Display name.
    pub name: String,
}

impl CatalogEntry {
    /// Creates a new catalog entry.
    #[must_use]
    pub fn new(id: impl Into<String>, symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            symbol: symbol.into(),
            name: name.into(),
        }
    }

    fn similarity(&self, needle: &str) -> f64 {
        [&self.id, &self.symbol, &self.name]
            .into_iter()
            .map(|field| strsim::jaro_winkler(needle, &field.to_lowercase()))
            .fold(0.0, f64::max)
    }
}

/// The list of coins a provider knows about, in provider order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Creates a catalog from entries.
    #[must_use]
    pub const fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// Returns all entries.
    #[must_use]
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finds an entry by exact id, then exact symbol, then exact name.
    ///
    /// All comparisons ignore case. Within one tier the first entry in
    /// catalog order wins.
    #[must_use]
    pub fn find(&self, identifier: &str) -> Option<&CatalogEntry> {
        let needle = identifier.trim();
        self.entries
            .iter()
            .find(|e| e.id.eq_ignore_ascii_case(needle))
            .or_else(|| {
                self.entries
                    .iter()
                    .find(|e| e.symbol.eq_ignore_ascii_case(needle))
            })
            .or_else(|| {
                self.entries
                    .iter()
                    .find(|e| e.name.to_lowercase() == needle.to_lowercase())
            })
    }

    /// Returns up to `limit` entries closest to `identifier`, best first.
    #[must_use]
    pub fn suggest(&self, identifier: &str, limit: usize) -> Vec<&CatalogEntry> {
        let needle = identifier.trim().to_lowercase();
        let mut scored: Vec<(f64, &CatalogEntry)> = self
            .entries
            .iter()
            .map(|e| (e.similarity(&needle), e))
            .filter(|(score, _)| *score >= MIN_SIMILARITY)
            .collect();
        // Stable, so equal scores keep catalog order
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.into_iter().take(limit).map(|(_, e)| e).collect()
    }

    /// Looks up an identifier, building a not-found error with suggestions on a miss.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::NotFound`] if nothing matches exactly.
    pub fn resolve(
        &self,
        identifier: &str,
        provider: ProviderTag,
    ) -> Result<&CatalogEntry, ProviderError> {
        self.find(identifier).ok_or_else(|| {
            let suggestions = self
                .suggest(identifier, 5)
                .into_iter()
                .map(|e| e.id.clone())
                .collect::<Vec<_>>();
            if !suggestions.is_empty() {
                tracing::warn!(identifier, %provider, ?suggestions, "no exact catalog match");
            }
            ProviderError::NotFound {
                identifier: identifier.to_string(),
                provider,
                suggestions,
            }
        })
    }

    /// Renders the catalog as an `id` / `symbol` / `name` table.
    #[must_use]
    pub fn to_table(&self) -> Table {
        let mut table = Table::new(["id", "symbol", "name"]);
        for entry in &self.entries {
            table.push_row(vec![
                Cell::text(&entry.id),
                Cell::text(&entry.symbol),
                Cell::text(&entry.name),
            ]);
        }
        table
    }
}
