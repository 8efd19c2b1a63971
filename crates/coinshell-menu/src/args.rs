//! Flags of the menu commands.
//!
//! Every command line is parsed with clap, using the command token as the
//! program name so usage errors read like `load --source`.

use clap::{Args, Parser};
use coinshell_lib::{
    Interval, Period, ProviderTag, RenderOptions, SearchCategory, Table,
    TreasuryCoin,
};

/// Default sort column of listings.
const RANK: &str = "rank";

/// Inserts `-c` before a bare coin name, so `load btc` means `load -c btc`.
#[must_use]
pub(crate) fn insert_coin_flag(mut argv: Vec<String>) -> Vec<String> {
    if argv.get(1).is_some_and(|first| !first.starts_with('-')) {
        argv.insert(1, "-c".to_string());
    }
    argv
}

/// Flags shared by every listing command.
#[derive(Debug, Clone, Default, Args)]
pub(crate) struct ListingArgs {
    /// Number of rows to show
    #[arg(short, long)]
    pub(crate) top: Option<usize>,

    /// Column to sort by
    #[arg(short, long)]
    pub(crate) sort: Option<String>,

    /// Sort from largest to smallest
    #[arg(long)]
    pub(crate) descend: bool,

    /// Keep the url column
    #[arg(short, long)]
    pub(crate) links: bool,
}

impl ListingArgs {
    /// Builds render options for `table`, falling back to `default_top` rows.
    ///
    /// Tables with a `rank` column sort by it unless `-s` names another one.
    #[must_use]
    pub(crate) fn render_options(&self, table: &Table, default_top: usize) -> RenderOptions {
        let options = RenderOptions::new().with_limit(self.top.unwrap_or(default_top));
        let sort = self
            .sort
            .clone()
            .or_else(|| table.column_index(RANK).map(|_| RANK.to_string()));
        match sort {
            Some(column) => options.with_sort(column, self.descend),
            None => options.with_descending(self.descend),
        }
    }

    /// Drops the `url` column unless links were requested.
    pub(crate) fn strip_links(&self, table: &mut Table) {
        if !self.links {
            table.drop_column("url");
        }
    }
}

/// `load` flags.
#[derive(Debug, Clone, Parser)]
#[command(about = "Load a coin to analyse. Sources: cg (CoinGecko), cp (CoinPaprika), bin (Binance)")]
pub(crate) struct LoadArgs {
    /// Coin to load (id, symbol or name)
    #[arg(short, long)]
    pub(crate) coin: String,

    /// Source of data
    #[arg(long, default_value = "cg")]
    pub(crate) source: ProviderTag,

    /// Quote currency (Binance: quote asset of the trading pair)
    #[arg(long)]
    pub(crate) vs: Option<String>,

    /// Days of history to cache (Binance)
    #[arg(short, long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(1..))]
    pub(crate) days: u32,

    /// Candle interval to cache (Binance)
    #[arg(short, long, default_value = "1d")]
    pub(crate) interval: Interval,
}

/// `chart` flags.
#[derive(Debug, Clone, Parser)]
#[command(about = "Candlestick chart of the loaded coin")]
pub(crate) struct ChartArgs {
    /// Quote currency
    #[arg(long)]
    pub(crate) vs: Option<String>,

    /// Days of history
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub(crate) days: Option<u32>,

    /// Candle interval (Binance)
    #[arg(short, long)]
    pub(crate) interval: Option<Interval>,
}

/// Flags of commands that only list rows.
#[derive(Debug, Clone, Parser)]
pub(crate) struct ListingCmd {
    #[command(flatten)]
    pub(crate) listing: ListingArgs,
}

/// Flags of listings priced in a quote currency.
#[derive(Debug, Clone, Parser)]
pub(crate) struct QuotedListingCmd {
    /// Quote currency
    #[arg(long)]
    pub(crate) vs: Option<String>,

    #[command(flatten)]
    pub(crate) listing: ListingArgs,
}

/// Flags of the gainers and losers listings.
#[derive(Debug, Clone, Parser)]
pub(crate) struct MoversCmd {
    /// Look-back period: 1h, 24h, 7d, 14d, 30d, 60d, 1y
    #[arg(short, long, default_value = "1h")]
    pub(crate) period: Period,

    #[command(flatten)]
    pub(crate) listing: ListingArgs,
}

/// `cp_search` flags.
#[derive(Debug, Clone, Parser)]
#[command(about = "Search CoinPaprika")]
pub(crate) struct SearchCmd {
    /// Phrase to search for
    #[arg(short, long, num_args = 1.., required = true)]
    pub(crate) query: Vec<String>,

    /// What to search: currencies, exchanges, icos, people, tags
    #[arg(short, long, default_value = "currencies")]
    pub(crate) category: SearchCategory,

    #[command(flatten)]
    pub(crate) listing: ListingArgs,
}

/// Flags of the public treasury commands.
#[derive(Debug, Clone, Parser)]
pub(crate) struct TreasuryCmd {
    /// Coin held: bitcoin or ethereum
    #[arg(short, long, default_value = "bitcoin")]
    pub(crate) coin: TreasuryCoin,

    #[command(flatten)]
    pub(crate) listing: ListingArgs,
}

/// `cp_exmarkets` flags.
#[derive(Debug, Clone, Parser)]
#[command(about = "Markets of one exchange on CoinPaprika")]
pub(crate) struct ExchangeMarketsCmd {
    /// Exchange id
    #[arg(short, long, default_value = "binance")]
    pub(crate) exchange: String,

    /// Quote currency
    #[arg(long)]
    pub(crate) vs: Option<String>,

    #[command(flatten)]
    pub(crate) listing: ListingArgs,
}

/// `cp_contracts` flags.
#[derive(Debug, Clone, Parser)]
#[command(about = "Smart contracts deployed on a platform")]
pub(crate) struct ContractsCmd {
    /// Platform id
    #[arg(short, long, default_value = "eth-ethereum")]
    pub(crate) platform: String,

    #[command(flatten)]
    pub(crate) listing: ListingArgs,
}

/// Flags of the due-diligence reports.
#[derive(Debug, Clone, Parser)]
pub(crate) struct ReportCmd {
    /// Quote currency
    #[arg(long)]
    pub(crate) vs: Option<String>,

    /// Candle interval (Binance)
    #[arg(short, long, default_value = "1d")]
    pub(crate) interval: Interval,

    #[command(flatten)]
    pub(crate) listing: ListingArgs,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(line: &str) -> Vec<String> {
        line.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn test_insert_coin_flag() {
        assert_eq!(insert_coin_flag(argv("load btc --source cp")), argv("load -c btc --source cp"));
        assert_eq!(insert_coin_flag(argv("load -c btc")), argv("load -c btc"));
        assert_eq!(insert_coin_flag(argv("load")), argv("load"));
    }

    #[test]
    fn test_load_args() {
        let args = LoadArgs::try_parse_from(insert_coin_flag(argv("load eth --source bin --vs btc -d 7")))
            .unwrap();
        assert_eq!(args.coin, "eth");
        assert_eq!(args.source, ProviderTag::Binance);
        assert_eq!(args.vs.as_deref(), Some("btc"));
        assert_eq!(args.days, 7);
        assert_eq!(args.interval, Interval::Day1);

        assert!(LoadArgs::try_parse_from(argv("load -c btc --source xyz")).is_err());
        assert!(LoadArgs::try_parse_from(argv("load -c btc -d 0")).is_err());
        assert!(LoadArgs::try_parse_from(argv("load")).is_err());
    }

    #[test]
    fn test_listing_render_options() {
        let cmd = ListingCmd::try_parse_from(argv("cg_coins -t 5 -s price --descend")).unwrap();
        let ranked = Table::new(["rank", "name", "price"]);
        let options = cmd.listing.render_options(&ranked, 20);
        assert_eq!(options.limit, Some(5));
        assert_eq!(options.sort_by.as_deref(), Some("price"));
        assert!(options.descending);

        let cmd = ListingCmd::try_parse_from(argv("cg_coins")).unwrap();
        let options = cmd.listing.render_options(&ranked, 20);
        assert_eq!(options.limit, Some(20));
        assert_eq!(options.sort_by.as_deref(), Some("rank"));
        assert!(!options.descending);

        let cmd = ListingCmd::try_parse_from(argv("cg_coins --descend")).unwrap();
        let options = cmd.listing.render_options(&Table::new(["name"]), 20);
        assert!(options.sort_by.is_none());
        assert!(options.descending);
    }

    #[test]
    fn test_movers_period() {
        let cmd = MoversCmd::try_parse_from(argv("cg_gainers -p 7d -l")).unwrap();
        assert_eq!(cmd.period, Period::Day7);
        assert!(cmd.listing.links);
        assert!(MoversCmd::try_parse_from(argv("cg_gainers -p 2h")).is_err());
    }

    #[test]
    fn test_search_joins_words() {
        let cmd = SearchCmd::try_parse_from(argv("cp_search -q bit coin -c exchanges")).unwrap();
        assert_eq!(cmd.query.join(" "), "bit coin");
        assert_eq!(cmd.category, SearchCategory::Exchanges);
    }
}
