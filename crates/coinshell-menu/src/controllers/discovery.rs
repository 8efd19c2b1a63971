//! `disc` menu: trending, new and top-ranked coins.

use anyhow::Result;
use clap::Parser;
use coinshell_lib::{DiscoverCategory, ProviderResult, Table};
use futures::FutureExt;
use futures::future::BoxFuture;
use std::future::Future;

use crate::action::Action;
use crate::args::{ListingArgs, ListingCmd, MoversCmd, SearchCmd};
use crate::context::Context;
use crate::dispatcher::{Command, Handler, Menu};

const COINGECKO: &str = "CoinGecko";
const COINPAPRIKA: &str = "CoinPaprika";

/// Builds the `disc` menu.
#[must_use]
pub fn menu() -> Menu {
    Menu::new("disc", "Discovery")
        .command(gecko("cg_coins", "coins available on CoinGecko", cg_coins))
        .command(gecko("cg_trending", "trending coins on CoinGecko", cg_trending))
        .command(gecko("cg_most_voted", "most voted coins on CoinGecko", cg_most_voted))
        .command(gecko("cg_most_visited", "most visited coins on CoinGecko", cg_most_visited))
        .command(gecko("cg_top_volume", "coins with highest volume on CoinGecko", cg_top_volume))
        .command(gecko("cg_recently", "recently added on CoinGecko", cg_recently))
        .command(gecko("cg_sentiment", "coins with most positive sentiment", cg_sentiment))
        .command(gecko(
            "cg_gainers",
            "top gainers, coins which price gained the most in given period",
            cg_gainers,
        ))
        .command(gecko(
            "cg_losers",
            "top losers, coins which price dropped the most in given period",
            cg_losers,
        ))
        .command(gecko("cg_yfarms", "top yield farms", cg_yfarms))
        .command(gecko("cg_top_defi", "top defi protocols", cg_top_defi))
        .command(gecko("cg_top_dex", "top decentralized exchanges", cg_top_dex))
        .command(gecko("cg_top_nft", "top non fungible tokens", cg_top_nft))
        .command(paprika("cp_coins", "coins available on CoinPaprika", cp_coins))
        .command(paprika("cp_search", "search CoinPaprika", cp_search))
}

fn gecko(token: &'static str, help: &'static str, handler: Handler) -> Command {
    Command::new(token, help, handler).in_section(COINGECKO)
}

fn paprika(token: &'static str, help: &'static str, handler: Handler) -> Command {
    Command::new(token, help, handler).in_section(COINPAPRIKA)
}

/// Fetches a listing behind a spinner and prints it with the listing flags.
pub(crate) async fn show_listing<F>(
    ctx: &mut Context,
    listing: &ListingArgs,
    message: &str,
    fetch: F,
) -> Result<Action>
where
    F: Future<Output = ProviderResult<Table>>,
{
    let mut table = ctx.busy(message, fetch).await?;
    listing.strip_links(&mut table);
    let options = listing.render_options(&table, ctx.options.top);
    ctx.show_table(&table, &options)?;
    Ok(Action::Continue)
}

fn cg_coins(ctx: &mut Context, argv: Vec<String>) -> BoxFuture<'_, Result<Action>> {
    async move {
        let args = ListingCmd::try_parse_from(argv)?;
        let gecko = ctx.services.gecko.clone();
        show_listing(ctx, &args.listing, "Fetching CoinGecko coins", gecko.coin_list()).await
    }
    .boxed()
}

fn cg_trending(ctx: &mut Context, argv: Vec<String>) -> BoxFuture<'_, Result<Action>> {
    async move {
        let args = ListingCmd::try_parse_from(argv)?;
        let gecko = ctx.services.gecko.clone();
        show_listing(ctx, &args.listing, "Fetching trending coins", gecko.trending()).await
    }
    .boxed()
}

fn discover(
    ctx: &mut Context,
    argv: Vec<String>,
    category: DiscoverCategory,
) -> BoxFuture<'_, Result<Action>> {
    async move {
        let args = ListingCmd::try_parse_from(argv)?;
        let web = ctx.services.web.clone();
        show_listing(ctx, &args.listing, "Scraping CoinGecko", web.discover(category)).await
    }
    .boxed()
}

fn cg_most_voted(ctx: &mut Context, argv: Vec<String>) -> BoxFuture<'_, Result<Action>> {
    discover(ctx, argv, DiscoverCategory::MostVoted)
}

fn cg_most_visited(ctx: &mut Context, argv: Vec<String>) -> BoxFuture<'_, Result<Action>> {
    discover(ctx, argv, DiscoverCategory::MostVisited)
}

fn cg_sentiment(ctx: &mut Context, argv: Vec<String>) -> BoxFuture<'_, Result<Action>> {
    discover(ctx, argv, DiscoverCategory::PositiveSentiment)
}

fn cg_gainers(ctx: &mut Context, argv: Vec<String>) -> BoxFuture<'_, Result<Action>> {
    async move {
        let args = MoversCmd::try_parse_from(argv)?;
        let web = ctx.services.web.clone();
        let message = format!("Scraping gainers ({})", args.period.as_str());
        show_listing(ctx, &args.listing, &message, web.gainers(args.period)).await
    }
    .boxed()
}

fn cg_losers(ctx: &mut Context, argv: Vec<String>) -> BoxFuture<'_, Result<Action>> {
    async move {
        let args = MoversCmd::try_parse_from(argv)?;
        let web = ctx.services.web.clone();
        let message = format!("Scraping losers ({})", args.period.as_str());
        show_listing(ctx, &args.listing, &message, web.losers(args.period)).await
    }
    .boxed()
}

fn cg_recently(ctx: &mut Context, argv: Vec<String>) -> BoxFuture<'_, Result<Action>> {
    async move {
        let args = ListingCmd::try_parse_from(argv)?;
        let web = ctx.services.web.clone();
        show_listing(ctx, &args.listing, "Scraping recently added coins", web.recently_added()).await
    }
    .boxed()
}

fn cg_top_volume(ctx: &mut Context, argv: Vec<String>) -> BoxFuture<'_, Result<Action>> {
    async move {
        let args = ListingCmd::try_parse_from(argv)?;
        let web = ctx.services.web.clone();
        show_listing(ctx, &args.listing, "Scraping top volume coins", web.top_volume()).await
    }
    .boxed()
}

fn cg_yfarms(ctx: &mut Context, argv: Vec<String>) -> BoxFuture<'_, Result<Action>> {
    async move {
        let args = ListingCmd::try_parse_from(argv)?;
        let web = ctx.services.web.clone();
        show_listing(ctx, &args.listing, "Scraping yield farms", web.yield_farms()).await
    }
    .boxed()
}

fn cg_top_defi(ctx: &mut Context, argv: Vec<String>) -> BoxFuture<'_, Result<Action>> {
    async move {
        let args = ListingCmd::try_parse_from(argv)?;
        let web = ctx.services.web.clone();
        show_listing(ctx, &args.listing, "Scraping top DeFi coins", web.top_defi()).await
    }
    .boxed()
}

fn cg_top_dex(ctx: &mut Context, argv: Vec<String>) -> BoxFuture<'_, Result<Action>> {
    async move {
        let args = ListingCmd::try_parse_from(argv)?;
        let web = ctx.services.web.clone();
        show_listing(ctx, &args.listing, "Scraping top DEXes", web.top_dex()).await
    }
    .boxed()
}

fn cg_top_nft(ctx: &mut Context, argv: Vec<String>) -> BoxFuture<'_, Result<Action>> {
    async move {
        let args = ListingCmd::try_parse_from(argv)?;
        let web = ctx.services.web.clone();
        show_listing(ctx, &args.listing, "Scraping top NFTs", web.top_nft()).await
    }
    .boxed()
}

fn cp_coins(ctx: &mut Context, argv: Vec<String>) -> BoxFuture<'_, Result<Action>> {
    async move {
        let args = ListingCmd::try_parse_from(argv)?;
        let paprika = ctx.services.paprika.clone();
        show_listing(ctx, &args.listing, "Fetching CoinPaprika coins", paprika.coins()).await
    }
    .boxed()
}

fn cp_search(ctx: &mut Context, argv: Vec<String>) -> BoxFuture<'_, Result<Action>> {
    async move {
        let args = SearchCmd::try_parse_from(argv)?;
        let paprika = ctx.services.paprika.clone();
        let query = args.query.join(" ");
        let limit = args.listing.top.unwrap_or(ctx.options.top);
        show_listing(
            ctx,
            &args.listing,
            &format!("Searching CoinPaprika for '{query}'"),
            paprika.search(&query, args.category, limit),
        )
        .await
    }
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{context, output};
    use coinshell_lib::Cell;

    #[test]
    fn test_menu_tokens() {
        let tokens = menu().tokens();
        for token in [
            "cg_coins",
            "cg_trending",
            "cg_most_voted",
            "cg_most_visited",
            "cg_sentiment",
            "cg_recently",
            "cg_gainers",
            "cg_losers",
            "cg_top_volume",
            "cg_top_defi",
            "cg_top_dex",
            "cg_top_nft",
            "cg_yfarms",
            "cp_coins",
            "cp_search",
        ] {
            assert!(tokens.contains(&token), "missing {token}");
        }
    }

    #[tokio::test]
    async fn test_listing_sorts_and_limits() {
        let (mut ctx, out) = context(Vec::<String>::new());
        let mut table = Table::new(["name", "price", "url"]);
        for (name, price) in [("a", 3.0), ("b", 1.0), ("c", 2.0)] {
            table.push_row(vec![name.into(), price.into(), "https://x".into()]);
        }
        let listing = ListingArgs {
            top: Some(2),
            sort: Some("price".into()),
            descend: true,
            links: false,
        };
        let fetched = table.clone();
        show_listing(&mut ctx, &listing, "test", async { Ok(fetched) })
            .await
            .unwrap();

        let text = output(&out);
        let a = text.find("a ").unwrap();
        let c = text.find("c ").unwrap();
        assert!(a < c);
        assert!(!text.contains("b "));
        assert!(!text.contains("url"));
    }

    async fn listed_names(table: Table, flags: &str) -> Vec<String> {
        let (mut ctx, out) = context(Vec::<String>::new());
        let cmd = ListingCmd::try_parse_from(format!("cg_top_defi {flags}").split_whitespace())
            .unwrap();
        show_listing(&mut ctx, &cmd.listing, "test", async { Ok(table) })
            .await
            .unwrap();
        output(&out)
            .lines()
            .filter_map(|line| line.split_whitespace().find(|w| w.starts_with("coin")))
            .map(str::to_string)
            .collect()
    }

    #[tokio::test]
    async fn test_listing_defaults_to_rank_order() {
        let mut table = Table::new(["rank", "name"]);
        for (rank, name) in [(2, "coin_b"), (3, "coin_c"), (1, "coin_a")] {
            table.push_row(vec![Cell::Int(rank), name.into()]);
        }

        let ascending = listed_names(table.clone(), "").await;
        assert_eq!(ascending, ["coin_a", "coin_b", "coin_c"]);

        let mut descending = listed_names(table, "--descend").await;
        descending.reverse();
        assert_eq!(descending, ascending);
    }

    #[tokio::test]
    async fn test_descend_reverses_unranked_listing() {
        let mut table = Table::new(["name", "price"]);
        for (name, price) in [("coin_x", 5.0), ("coin_y", 9.0), ("coin_z", 1.0)] {
            table.push_row(vec![name.into(), price.into()]);
        }
        assert_eq!(
            listed_names(table.clone(), "").await,
            ["coin_x", "coin_y", "coin_z"]
        );
        assert_eq!(
            listed_names(table, "--descend -t 2").await,
            ["coin_z", "coin_y"]
        );
    }

    #[tokio::test]
    async fn test_usage_error_is_printed() {
        let (mut ctx, out) = context(Vec::<String>::new());
        assert_eq!(menu().dispatch(&mut ctx, "cg_gainers -p 2h").await, Action::Continue);
        assert!(output(&out).contains("invalid period"));
    }
}
