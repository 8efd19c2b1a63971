//! HTML table and card extraction for scraped listing pages.

use scraper::{ElementRef, Html, Selector};

use crate::FetchError;

/// One scraped row: whitespace-normalised cell texts and the row's first link.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScrapedRow {
    /// Cell texts in document order.
    pub cells: Vec<String>,
    /// `href` of the first anchor in the row, if any.
    pub link: Option<String>,
}

/// A table scraped from a page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScrapedTable {
    /// Header texts of the owning table, empty when it has no `thead`.
    pub headers: Vec<String>,
    /// Rows of the selected `tbody`.
    pub rows: Vec<ScrapedRow>,
}

fn selector(css: &str) -> Result<Selector, FetchError> {
    Selector::parse(css).map_err(|e| FetchError::Scrape(format!("bad selector '{css}': {e}")))
}

/// Collapses runs of whitespace in an element's text into single spaces.
fn clean_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn first_link(element: ElementRef<'_>, anchors: &Selector) -> Option<String> {
    element
        .select(anchors)
        .find_map(|a| a.value().attr("href"))
        .map(str::to_string)
}

/// Extracts the `tbody_index`-th table body of a page along with its table's header row.
///
/// Pages with several tables in one document (gainers and losers) are addressed
/// by the index of their `tbody` across the whole document.
///
/// # Errors
///
/// Returns [`FetchError::Scrape`] if the page has no `tbody` at that index.
pub fn parse_table(html: &str, tbody_index: usize) -> Result<ScrapedTable, FetchError> {
    let document = Html::parse_document(html);
    let header_cells = selector("thead th")?;
    let bodies = selector("tbody")?;
    let rows = selector("tr")?;
    let cells = selector("td, th")?;
    let anchors = selector("a[href]")?;

    let body = document.select(&bodies).nth(tbody_index).ok_or_else(|| {
        FetchError::Scrape(format!("page has no table body at index {tbody_index}"))
    })?;

    // Headers come from the table that owns the selected body
    let headers = body
        .parent()
        .and_then(ElementRef::wrap)
        .map(|table| table.select(&header_cells).map(clean_text).collect())
        .unwrap_or_default();

    let rows = body
        .select(&rows)
        .map(|row| ScrapedRow {
            cells: row.select(&cells).map(clean_text).collect(),
            link: first_link(row, &anchors),
        })
        .filter(|row| row.cells.iter().any(|c| !c.is_empty()))
        .collect();

    Ok(ScrapedTable { headers, rows })
}

/// Extracts the entries of the `card_index`-th card matching `card_css`.
///
/// Every anchor inside the card is one entry; its cells are the anchor's
/// non-empty text fragments.
///
/// # Errors
///
/// Returns [`FetchError::Scrape`] if the selector is invalid or the card is missing.
pub fn parse_cards(
    html: &str,
    card_css: &str,
    card_index: usize,
) -> Result<Vec<ScrapedRow>, FetchError> {
    let document = Html::parse_document(html);
    let cards = selector(card_css)?;
    let anchors = selector("a[href]")?;

    let card = document
        .select(&cards)
        .nth(card_index)
        .ok_or_else(|| FetchError::Scrape(format!("page has no card at index {card_index}")))?;

    Ok(card
        .select(&anchors)
        .map(|a| ScrapedRow {
            cells: fragments(a),
            link: a.value().attr("href").map(str::to_string),
        })
        .collect())
}

/// Extracts every element matching `block_css` as one row.
///
/// A block's cells are its non-empty text fragments and its link is the first
/// anchor inside it. Suits pages laid out as boxes or articles, not tables.
///
/// # Errors
///
/// Returns [`FetchError::Scrape`] if the selector is invalid.
pub fn parse_blocks(html: &str, block_css: &str) -> Result<Vec<ScrapedRow>, FetchError> {
    let document = Html::parse_document(html);
    let blocks = selector(block_css)?;
    let anchors = selector("a[href]")?;

    Ok(document
        .select(&blocks)
        .map(|block| ScrapedRow {
            cells: fragments(block),
            link: first_link(block, &anchors),
        })
        .filter(|row| !row.cells.is_empty())
        .collect())
}

fn fragments(element: ElementRef<'_>) -> Vec<String> {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const GAINERS_LOSERS: &str = r#"
        <html><body>
        <table>
          <thead><tr><th>#</th><th>Coin</th><th> Price </th><th>1h</th></tr></thead>
          <tbody>
            <tr><td>1</td><td><a href="/en/coins/alpha">Alpha
                 ALP</a></td><td>$1.20</td><td>15.2%</td></tr>
            <tr><td>2</td><td><a href="/en/coins/beta">Beta BET</a></td><td>$0.05</td><td>9.9%</td></tr>
          </tbody>
        </table>
        <table>
          <thead><tr><th>#</th><th>Coin</th><th>Price</th><th>1h</th></tr></thead>
          <tbody>
            <tr><td>1</td><td><a href="/en/coins/gamma">Gamma GAM</a></td><td>$3.00</td><td>-12.0%</td></tr>
          </tbody>
        </table>
        </body></html>
    "#;

    #[test]
    fn test_parse_first_body() {
        let table = parse_table(GAINERS_LOSERS, 0).unwrap();
        assert_eq!(table.headers, ["#", "Coin", "Price", "1h"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].cells, ["1", "Alpha ALP", "$1.20", "15.2%"]);
        assert_eq!(table.rows[0].link.as_deref(), Some("/en/coins/alpha"));
    }

    #[test]
    fn test_parse_second_body() {
        let table = parse_table(GAINERS_LOSERS, 1).unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].cells[1], "Gamma GAM");
    }

    #[test]
    fn test_missing_body_is_error() {
        let err = parse_table(GAINERS_LOSERS, 5).unwrap_err();
        assert!(matches!(err, FetchError::Scrape(_)));
        assert!(parse_table("<html></html>", 0).is_err());
    }

    #[test]
    fn test_parse_cards() {
        let html = r#"
            <div class="card"><a href="/en/coins/a"><span>Alpha</span><span>BTC0.0001</span></a></div>
            <div class="card">
              <a href="/en/coins/b"> <span>Beta</span> <span>BTC0.5</span></a>
              <a href="/en/coins/c"><span>Gamma</span><span>BTC1.5</span></a>
            </div>
        "#;
        let entries = parse_cards(html, "div.card", 1).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].cells, ["Beta", "BTC0.5"]);
        assert_eq!(entries[1].link.as_deref(), Some("/en/coins/c"));
        assert!(parse_cards(html, "div.card", 2).is_err());
    }

    #[test]
    fn test_parse_blocks() {
        let html = r#"
            <div>
              <span class="overview-box p-3">$12.5B <small>Market Cap</small></span>
              <span class="overview-box p-3">  </span>
              <span class="overview-box p-3">1.2% <small>24h Change</small></span>
            </div>
            <article><header><a href="/en/news/one">First</a> by Ann</header></article>
        "#;
        let boxes = parse_blocks(html, "span.overview-box").unwrap();
        assert_eq!(boxes.len(), 2);
        assert_eq!(boxes[0].cells, ["$12.5B", "Market Cap"]);
        assert_eq!(boxes[1].link, None);

        let headers = parse_blocks(html, "article header").unwrap();
        assert_eq!(headers[0].cells, ["First", "by Ann"]);
        assert_eq!(headers[0].link.as_deref(), Some("/en/news/one"));

        assert!(parse_blocks(html, "table").unwrap().is_empty());
    }
}
