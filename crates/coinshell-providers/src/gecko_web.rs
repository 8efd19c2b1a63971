//! Listings scraped from the CoinGecko website.

use coinshell_fetch::{ApiClient, ScrapedRow, ScrapedTable, scrape, url};
use coinshell_types::{Cell, Table};
use std::str::FromStr;
use tracing::debug;

use crate::ProviderResult;

/// Card container of the discover page.
const DISCOVER_CARD: &str = "div.col-12.col-sm-6.col-md-6.col-lg-4";

/// Market summary boxes of the NFT page.
const NFT_OVERVIEW_BOX: &str = "span.overview-box";

/// Featured collection panel of the NFT page.
const NFT_OF_THE_DAY: &str = "div.tw-px-4.tw-py-5";

/// Header of each news article.
const NEWS_HEADER: &str = "article header";

/// Articles on one news page.
const NEWS_PER_PAGE: usize = 25;

/// Look-back period of the gainers and losers page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    /// Last hour.
    #[default]
    Hour1,
    /// Last day.
    Hour24,
    /// Last week.
    Day7,
    /// Last two weeks.
    Day14,
    /// Last month.
    Day30,
    /// Last two months.
    Day60,
    /// Last year.
    Year1,
}

impl Period {
    /// Returns the period as typed on the command line.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Hour1 => "1h",
            Self::Hour24 => "24h",
            Self::Day7 => "7d",
            Self::Day14 => "14d",
            Self::Day30 => "30d",
            Self::Day60 => "60d",
            Self::Year1 => "1y",
        }
    }

    const fn query(&self) -> &'static str {
        match self {
            Self::Hour1 => "h1",
            Self::Hour24 => "h24",
            Self::Day7 => "d7",
            Self::Day14 => "d14",
            Self::Day30 => "d30",
            Self::Day60 => "d60",
            Self::Year1 => "y1",
        }
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1h" => Ok(Self::Hour1),
            "24h" => Ok(Self::Hour24),
            "7d" => Ok(Self::Day7),
            "14d" => Ok(Self::Day14),
            "30d" => Ok(Self::Day30),
            "60d" => Ok(Self::Day60),
            "1y" => Ok(Self::Year1),
            _ => Err(format!(
                "invalid period '{s}', expected one of: 1h, 24h, 7d, 14d, 30d, 60d, 1y"
            )),
        }
    }
}

/// Card lists of the discover page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoverCategory {
    /// Coins with the most community votes.
    MostVoted,
    /// Coins with the most positive sentiment.
    PositiveSentiment,
    /// Most visited coin pages.
    MostVisited,
}

impl DiscoverCategory {
    const fn card_index(self) -> usize {
        match self {
            Self::MostVoted => 1,
            Self::PositiveSentiment => 2,
            Self::MostVisited => 4,
        }
    }
}

/// Scraper for CoinGecko listing pages.
#[derive(Debug, Clone)]
pub struct GeckoWeb {
    client: ApiClient,
    base_url: String,
}

impl GeckoWeb {
    /// Creates a scraper for the site at `base_url`.
    #[must_use]
    pub fn new(client: ApiClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    async fn page(&self, path: &str) -> ProviderResult<String> {
        let page_url = url::join(&self.base_url, path);
        debug!(url = %page_url, "scraping page");
        Ok(self.client.get_text(&page_url).await?)
    }

    async fn listing(&self, path: &str, tbody_index: usize) -> ProviderResult<Table> {
        let html = self.page(path).await?;
        let scraped = scrape::parse_table(&html, tbody_index)?;
        Ok(scraped_to_table(&scraped, &self.base_url))
    }

    /// Largest gainers over a period.
    ///
    /// # Errors
    ///
    /// Returns an error if the page cannot be fetched or has no such table.
    pub async fn gainers(&self, period: Period) -> ProviderResult<Table> {
        self.listing(&format!("/en/coins/trending?time={}", period.query()), 0)
            .await
    }

    /// Largest losers over a period.
    ///
    /// # Errors
    ///
    /// Returns an error if the page cannot be fetched or has no such table.
    pub async fn losers(&self, period: Period) -> ProviderResult<Table> {
        self.listing(&format!("/en/coins/trending?time={}", period.query()), 1)
            .await
    }

    /// Recently listed coins.
    ///
    /// # Errors
    ///
    /// Returns an error if the page cannot be fetched or has no table.
    pub async fn recently_added(&self) -> ProviderResult<Table> {
        self.listing("/en/coins/recently_added", 0).await
    }

    /// Coins with the highest trading volume.
    ///
    /// # Errors
    ///
    /// Returns an error if the page cannot be fetched or has no table.
    pub async fn top_volume(&self) -> ProviderResult<Table> {
        self.listing("/en/coins/high_volume", 0).await
    }

    /// Top decentralised finance coins.
    ///
    /// # Errors
    ///
    /// Returns an error if the page cannot be fetched or has no table.
    pub async fn top_defi(&self) -> ProviderResult<Table> {
        self.listing("/en/defi", 0).await
    }

    /// Top decentralised exchanges.
    ///
    /// # Errors
    ///
    /// Returns an error if the page cannot be fetched or has no table.
    pub async fn top_dex(&self) -> ProviderResult<Table> {
        self.listing("/en/dex", 0).await
    }

    /// Top non-fungible token collections.
    ///
    /// # Errors
    ///
    /// Returns an error if the page cannot be fetched or has no table.
    pub async fn top_nft(&self) -> ProviderResult<Table> {
        self.listing("/en/nft", 0).await
    }

    /// Yield farming pools.
    ///
    /// # Errors
    ///
    /// Returns an error if the page cannot be fetched or has no table.
    pub async fn yield_farms(&self) -> ProviderResult<Table> {
        self.listing("/en/yield-farming", 0).await
    }

    /// One card list of the discover page.
    ///
    /// # Errors
    ///
    /// Returns an error if the page cannot be fetched or the card is missing.
    pub async fn discover(&self, category: DiscoverCategory) -> ProviderResult<Table> {
        let html = self.page("/en/discover").await?;
        let entries = scrape::parse_cards(&html, DISCOVER_CARD, category.card_index())?;
        Ok(cards_to_table(&entries, &self.base_url))
    }

    /// Headline figures of the NFT market.
    ///
    /// # Errors
    ///
    /// Returns an error if the page cannot be fetched.
    pub async fn nft_market(&self) -> ProviderResult<Table> {
        let html = self.page("/en/nft").await?;
        let boxes = scrape::parse_blocks(&html, NFT_OVERVIEW_BOX)?;
        Ok(boxes_to_table(&boxes))
    }

    /// The collection CoinGecko features as NFT of the day.
    ///
    /// # Errors
    ///
    /// Returns an error if the page cannot be fetched.
    pub async fn nft_of_the_day(&self) -> ProviderResult<Table> {
        let html = self.page("/en/nft").await?;
        let panels = scrape::parse_blocks(&html, NFT_OF_THE_DAY)?;
        Ok(panels
            .first()
            .map_or_else(|| Table::new(["Metric", "Value"]), |panel| {
                featured_to_table(panel, &self.base_url)
            }))
    }

    /// Latest news headlines, newest first, scraping as many pages as `count` needs.
    ///
    /// # Errors
    ///
    /// Returns an error if a page cannot be fetched.
    pub async fn news(&self, count: usize) -> ProviderResult<Table> {
        let pages = count.div_ceil(NEWS_PER_PAGE).max(1);
        let mut headers = Vec::new();
        for page in 1..=pages {
            let html = self.page(&format!("/en/news?page={page}")).await?;
            headers.extend(scrape::parse_blocks(&html, NEWS_HEADER)?);
        }
        headers.truncate(count);
        Ok(news_to_table(&headers, &self.base_url))
    }
}

/// Normalises a header into a column name (`"24h Volume"` becomes `24h_volume`).
///
/// The site's `#` column becomes `rank`, the default sort key of listings.
fn column_name(header: &str, position: usize) -> String {
    if header.trim() == "#" {
        return "rank".to_string();
    }
    let name = header
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_");
    if name.is_empty() {
        format!("col{}", position + 1)
    } else {
        name
    }
}

/// Converts a scraped table into a typed table with a trailing `url` column.
fn scraped_to_table(scraped: &ScrapedTable, base_url: &str) -> Table {
    let width = scraped
        .rows
        .iter()
        .map(|row| row.cells.len())
        .max()
        .unwrap_or(0)
        .max(scraped.headers.len());

    let mut names: Vec<String> = Vec::with_capacity(width + 1);
    for i in 0..width {
        let mut name = column_name(scraped.headers.get(i).map_or("", String::as_str), i);
        if names.contains(&name) {
            name = format!("{name}_{}", i + 1);
        }
        names.push(name);
    }
    names.push("url".to_string());

    let mut table = Table::new(names);
    for row in &scraped.rows {
        let mut cells: Vec<Cell> = row.cells.iter().map(|c| Cell::infer(c)).collect();
        cells.resize(width, Cell::Empty);
        cells.push(link_cell(row, base_url));
        table.push_row(cells);
    }

    // Leading columns the site leaves blank (e.g. star buttons)
    let blank: Vec<String> = table
        .columns()
        .iter()
        .enumerate()
        .filter(|(i, _)| table.rows().iter().all(|row| row[*i].is_empty()))
        .map(|(_, name)| name.clone())
        .collect();
    if !table.is_empty() {
        for name in blank {
            table.drop_column(&name);
        }
    }
    table
}

fn link_cell(row: &ScrapedRow, base_url: &str) -> Cell {
    row.link
        .as_deref()
        .map_or(Cell::Empty, |href| Cell::text(url::absolute(base_url, href)))
}

/// Converts `value label...` boxes into metric rows.
fn boxes_to_table(boxes: &[ScrapedRow]) -> Table {
    Table::key_value(boxes.iter().filter_map(|row| {
        let (value, label) = row.cells.split_first()?;
        Some((label.join(" "), Cell::infer(value)))
    }))
}

/// Reads `author..., description, trailer` fragments of the featured panel.
///
/// Long author blocks cut off after three fragments, the fourth being the
/// description.
fn featured_to_table(panel: &ScrapedRow, base_url: &str) -> Table {
    let cells = &panel.cells;
    let (author, description) = match cells.len() {
        0 | 1 => (&cells[..0], cells.first().cloned().unwrap_or_default()),
        n if n - 2 > 3 => (&cells[..3], cells[3].clone()),
        n => (&cells[..n - 2], cells[n - 2].clone()),
    };
    Table::key_value([
        ("author", Cell::text(author.join(" "))),
        ("description", Cell::text(description)),
        ("url", link_cell(panel, base_url)),
    ])
}

/// Splits `title, by author (posted)` headers into news rows.
fn news_to_table(headers: &[ScrapedRow], base_url: &str) -> Table {
    let mut table = Table::new(["title", "author", "posted", "url"]);
    for header in headers {
        let Some((title, byline)) = header.cells.split_first() else {
            continue;
        };
        let byline = byline.join(" ");
        let (author, posted) = byline.split_once('(').unwrap_or((byline.as_str(), ""));
        let author = author.trim();
        table.push_row(vec![
            Cell::text(title),
            Cell::text(author.strip_prefix("by ").unwrap_or(author)),
            Cell::infer(posted.trim().trim_end_matches(')')),
            link_cell(header, base_url),
        ]);
    }
    table.insert_rank();
    table
}

/// Converts discover card entries into `name`, `price_btc`, `url` rows.
fn cards_to_table(entries: &[ScrapedRow], base_url: &str) -> Table {
    let mut table = Table::new(["name", "price_btc", "url"]);
    for entry in entries {
        let Some(name) = entry.cells.first() else {
            continue;
        };
        let price = entry
            .cells
            .last()
            .filter(|_| entry.cells.len() > 1)
            .map(|p| p.trim_start_matches("BTC").replace(',', "."))
            .map_or(Cell::Empty, |p| Cell::infer(&p));
        table.push_row(vec![Cell::text(name), price, link_cell(entry, base_url)]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use coinshell_fetch::url::COINGECKO_WEB;

    #[test]
    fn test_period_parse() {
        assert_eq!("24h".parse::<Period>(), Ok(Period::Hour24));
        assert_eq!("1Y".parse::<Period>(), Ok(Period::Year1));
        assert_eq!(Period::Day7.query(), "d7");
        assert!("2h".parse::<Period>().is_err());
    }

    #[test]
    fn test_column_names() {
        assert_eq!(column_name("24h Volume", 0), "24h_volume");
        assert_eq!(column_name("Mkt Cap", 1), "mkt_cap");
        assert_eq!(column_name(" # ", 2), "rank");
        assert_eq!(column_name("", 3), "col4");
    }

    #[test]
    fn test_scraped_to_table() {
        let scraped = ScrapedTable {
            headers: vec![String::new(), "#".into(), "Coin".into(), "Price".into(), "1h".into()],
            rows: vec![
                ScrapedRow {
                    cells: vec![String::new(), "1".into(), "Alpha ALP".into(), "$1,200.50".into(), "15.2%".into()],
                    link: Some("/en/coins/alpha".into()),
                },
                ScrapedRow {
                    cells: vec![String::new(), "2".into(), "Beta BET".into(), "$0.05".into()],
                    link: None,
                },
            ],
        };
        let table = scraped_to_table(&scraped, COINGECKO_WEB);
        assert_eq!(table.columns(), ["rank", "coin", "price", "1h", "url"]);
        assert_eq!(table.rows()[1][0], Cell::Int(2));
        assert_eq!(table.rows()[0][2], Cell::Float(1200.5));
        assert_eq!(
            table.rows()[0][4],
            Cell::text("https://www.coingecko.com/en/coins/alpha")
        );
        assert!(table.rows()[1][3].is_empty());
        assert!(table.rows()[1][4].is_empty());
    }

    #[test]
    fn test_cards_to_table() {
        let entries = vec![
            ScrapedRow {
                cells: vec!["Alpha".into(), "BTC0,0001".into()],
                link: Some("/en/coins/alpha".into()),
            },
            ScrapedRow::default(),
            ScrapedRow {
                cells: vec!["Lonely".into()],
                link: None,
            },
        ];
        let table = cards_to_table(&entries, COINGECKO_WEB);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0][1], Cell::Float(0.0001));
        assert!(table.rows()[1][1].is_empty());
    }

    const NFT_PAGE: &str = r#"
        <html><body>
          <div class="tw-px-4 tw-py-5 sm:tw-p-6">
            <a href="/en/nft/bored-apes"><img src="ape.png"></a>
            <p>Yuga</p><p>Labs</p>
            <p>Apes on a blockchain</p>
            <span>View</span>
          </div>
          <span class="overview-box d-inline-block p-3 mr-2">$11,234,567,890 <br>Market Cap</span>
          <span class="overview-box d-inline-block p-3 mr-2">-2.5% <br>24h Market Cap Change</span>
        </body></html>
    "#;

    const NEWS_PAGE: &str = r#"
        <html><body>
          <article>
            <header>
              <a href="https://news.example/etf">ETF approved</a>
              <div>by Jane Doe (3 hours ago)</div>
            </header>
            <div class="post-body">Body text</div>
          </article>
          <article>
            <header><a href="/en/news/fork">Fork scheduled</a><div>CoinDesk</div></header>
          </article>
        </body></html>
    "#;

    #[test]
    fn test_nft_market_boxes() {
        let boxes = scrape::parse_blocks(NFT_PAGE, NFT_OVERVIEW_BOX).unwrap();
        let table = boxes_to_table(&boxes);
        assert_eq!(table.columns(), ["Metric", "Value"]);
        assert_eq!(table.rows()[0][0], Cell::text("Market Cap"));
        assert_eq!(table.rows()[0][1], Cell::Int(11_234_567_890));
        assert_eq!(table.rows()[1][1], Cell::Float(-2.5));
    }

    #[test]
    fn test_nft_of_the_day() {
        let panels = scrape::parse_blocks(NFT_PAGE, NFT_OF_THE_DAY).unwrap();
        let table = featured_to_table(&panels[0], COINGECKO_WEB);
        assert_eq!(table.rows()[0][1], Cell::text("Yuga Labs"));
        assert_eq!(table.rows()[1][1], Cell::text("Apes on a blockchain"));
        assert_eq!(
            table.rows()[2][1],
            Cell::text("https://www.coingecko.com/en/nft/bored-apes")
        );
    }

    #[test]
    fn test_news_headers() {
        let headers = scrape::parse_blocks(NEWS_PAGE, NEWS_HEADER).unwrap();
        let table = news_to_table(&headers, COINGECKO_WEB);
        assert_eq!(table.columns(), ["rank", "title", "author", "posted", "url"]);
        assert_eq!(table.rows()[0][1], Cell::text("ETF approved"));
        assert_eq!(table.rows()[0][2], Cell::text("Jane Doe"));
        assert_eq!(table.rows()[0][3], Cell::text("3 hours ago"));
        assert_eq!(table.rows()[0][4], Cell::text("https://news.example/etf"));
        assert_eq!(table.rows()[1][0], Cell::Int(2));
        assert_eq!(table.rows()[1][2], Cell::text("CoinDesk"));
        assert!(table.rows()[1][3].is_empty());
    }
}
