//! `ov` menu: market-wide statistics and listings.

use anyhow::Result;
use clap::Parser;
use coinshell_lib::TickerView;
use futures::FutureExt;
use futures::future::BoxFuture;

use crate::action::Action;
use crate::args::{ContractsCmd, ExchangeMarketsCmd, ListingCmd, QuotedListingCmd, TreasuryCmd};
use crate::context::Context;
use crate::controllers::discovery::show_listing;
use crate::dispatcher::{Command, Handler, Menu};

const COINGECKO: &str = "CoinGecko";
const COINPAPRIKA: &str = "CoinPaprika";

/// Builds the `ov` menu.
#[must_use]
pub fn menu() -> Menu {
    Menu::new("ov", "Overview")
        .command(gecko("cg_global", "global crypto market info", cg_global))
        .command(gecko("cg_defi", "global DeFi market info", cg_defi))
        .command(gecko("cg_stables", "stablecoins", cg_stables))
        .command(gecko("cg_exchanges", "top crypto exchanges", cg_exchanges))
        .command(gecko("cg_exrates", "coin exchange rates", cg_exrates))
        .command(gecko("cg_indexes", "crypto indexes", cg_indexes))
        .command(gecko("cg_derivatives", "crypto derivatives", cg_derivatives))
        .command(gecko("cg_categories", "crypto categories", cg_categories))
        .command(gecko("cg_nft", "non fungible token market status", cg_nft))
        .command(gecko("cg_nft_today", "non fungible token of the day", cg_nft_today))
        .command(gecko("cg_news", "last news available on CoinGecko", cg_news))
        .command(gecko("cg_hold", "ethereum, bitcoin holdings overview statistics", cg_hold))
        .command(gecko(
            "cg_companies",
            "ethereum, bitcoin holdings by public companies",
            cg_companies,
        ))
        .command(paprika("cp_global", "global crypto market info", cp_global))
        .command(paprika("cp_info", "basic info about all coins available on CoinPaprika", cp_info))
        .command(paprika(
            "cp_markets",
            "market related info about all coins available on CoinPaprika",
            cp_markets,
        ))
        .command(paprika("cp_exchanges", "list all exchanges", cp_exchanges))
        .command(paprika("cp_exmarkets", "all available markets on given exchange", cp_exmarkets))
        .command(paprika(
            "cp_platforms",
            "list blockchain platforms eg. ethereum, solana, kusama, terra",
            cp_platforms,
        ))
        .command(paprika("cp_contracts", "all smart contracts for given platform", cp_contracts))
}

fn gecko(token: &'static str, help: &'static str, handler: Handler) -> Command {
    Command::new(token, help, handler).in_section(COINGECKO)
}

fn paprika(token: &'static str, help: &'static str, handler: Handler) -> Command {
    Command::new(token, help, handler).in_section(COINPAPRIKA)
}

fn cg_global(ctx: &mut Context, argv: Vec<String>) -> BoxFuture<'_, Result<Action>> {
    async move {
        let args = ListingCmd::try_parse_from(argv)?;
        let gecko = ctx.services.gecko.clone();
        show_listing(ctx, &args.listing, "Fetching global market info", gecko.global()).await
    }
    .boxed()
}

fn cg_defi(ctx: &mut Context, argv: Vec<String>) -> BoxFuture<'_, Result<Action>> {
    async move {
        let args = ListingCmd::try_parse_from(argv)?;
        let gecko = ctx.services.gecko.clone();
        show_listing(ctx, &args.listing, "Fetching DeFi market info", gecko.defi()).await
    }
    .boxed()
}

fn cg_stables(ctx: &mut Context, argv: Vec<String>) -> BoxFuture<'_, Result<Action>> {
    async move {
        let args = QuotedListingCmd::try_parse_from(argv)?;
        let gecko = ctx.services.gecko.clone();
        let vs = ctx.vs_or_default(args.vs.as_deref());
        show_listing(ctx, &args.listing, "Fetching stablecoins", gecko.stablecoins(&vs)).await
    }
    .boxed()
}

fn cg_exchanges(ctx: &mut Context, argv: Vec<String>) -> BoxFuture<'_, Result<Action>> {
    async move {
        let args = ListingCmd::try_parse_from(argv)?;
        let gecko = ctx.services.gecko.clone();
        show_listing(ctx, &args.listing, "Fetching exchanges", gecko.exchanges()).await
    }
    .boxed()
}

fn cg_exrates(ctx: &mut Context, argv: Vec<String>) -> BoxFuture<'_, Result<Action>> {
    async move {
        let args = ListingCmd::try_parse_from(argv)?;
        let gecko = ctx.services.gecko.clone();
        show_listing(ctx, &args.listing, "Fetching exchange rates", gecko.exchange_rates()).await
    }
    .boxed()
}

fn cg_indexes(ctx: &mut Context, argv: Vec<String>) -> BoxFuture<'_, Result<Action>> {
    async move {
        let args = ListingCmd::try_parse_from(argv)?;
        let gecko = ctx.services.gecko.clone();
        show_listing(ctx, &args.listing, "Fetching indexes", gecko.indexes()).await
    }
    .boxed()
}

fn cg_derivatives(ctx: &mut Context, argv: Vec<String>) -> BoxFuture<'_, Result<Action>> {
    async move {
        let args = ListingCmd::try_parse_from(argv)?;
        let gecko = ctx.services.gecko.clone();
        show_listing(ctx, &args.listing, "Fetching derivatives", gecko.derivatives()).await
    }
    .boxed()
}

fn cg_categories(ctx: &mut Context, argv: Vec<String>) -> BoxFuture<'_, Result<Action>> {
    async move {
        let args = ListingCmd::try_parse_from(argv)?;
        let gecko = ctx.services.gecko.clone();
        show_listing(ctx, &args.listing, "Fetching categories", gecko.categories()).await
    }
    .boxed()
}

fn cg_nft(ctx: &mut Context, argv: Vec<String>) -> BoxFuture<'_, Result<Action>> {
    async move {
        let args = ListingCmd::try_parse_from(argv)?;
        let web = ctx.services.web.clone();
        show_listing(ctx, &args.listing, "Scraping NFT market", web.nft_market()).await
    }
    .boxed()
}

fn cg_nft_today(ctx: &mut Context, argv: Vec<String>) -> BoxFuture<'_, Result<Action>> {
    async move {
        let args = ListingCmd::try_parse_from(argv)?;
        let web = ctx.services.web.clone();
        show_listing(ctx, &args.listing, "Scraping NFT of the day", web.nft_of_the_day()).await
    }
    .boxed()
}

fn cg_news(ctx: &mut Context, argv: Vec<String>) -> BoxFuture<'_, Result<Action>> {
    async move {
        let args = ListingCmd::try_parse_from(argv)?;
        let count = args.listing.top.unwrap_or(ctx.options.top);
        let web = ctx.services.web.clone();
        show_listing(ctx, &args.listing, "Scraping news", web.news(count)).await
    }
    .boxed()
}

fn cg_hold(ctx: &mut Context, argv: Vec<String>) -> BoxFuture<'_, Result<Action>> {
    async move {
        let args = TreasuryCmd::try_parse_from(argv)?;
        let gecko = ctx.services.gecko.clone();
        let message = format!("Fetching public {} holdings", args.coin.as_str());
        show_listing(ctx, &args.listing, &message, gecko.holdings_overview(args.coin)).await
    }
    .boxed()
}

fn cg_companies(ctx: &mut Context, argv: Vec<String>) -> BoxFuture<'_, Result<Action>> {
    async move {
        let args = TreasuryCmd::try_parse_from(argv)?;
        let gecko = ctx.services.gecko.clone();
        let message = format!("Fetching companies holding {}", args.coin.as_str());
        show_listing(ctx, &args.listing, &message, gecko.companies(args.coin)).await
    }
    .boxed()
}

fn cp_global(ctx: &mut Context, argv: Vec<String>) -> BoxFuture<'_, Result<Action>> {
    async move {
        let args = ListingCmd::try_parse_from(argv)?;
        let paprika = ctx.services.paprika.clone();
        show_listing(ctx, &args.listing, "Fetching global market info", paprika.global()).await
    }
    .boxed()
}

fn tickers(
    ctx: &mut Context,
    argv: Vec<String>,
    view: TickerView,
) -> BoxFuture<'_, Result<Action>> {
    async move {
        let args = QuotedListingCmd::try_parse_from(argv)?;
        let paprika = ctx.services.paprika.clone();
        let vs = ctx.vs_or_default(args.vs.as_deref());
        show_listing(ctx, &args.listing, "Fetching tickers", paprika.tickers(&vs, view)).await
    }
    .boxed()
}

fn cp_info(ctx: &mut Context, argv: Vec<String>) -> BoxFuture<'_, Result<Action>> {
    tickers(ctx, argv, TickerView::Info)
}

fn cp_markets(ctx: &mut Context, argv: Vec<String>) -> BoxFuture<'_, Result<Action>> {
    tickers(ctx, argv, TickerView::Markets)
}

fn cp_exchanges(ctx: &mut Context, argv: Vec<String>) -> BoxFuture<'_, Result<Action>> {
    async move {
        let args = QuotedListingCmd::try_parse_from(argv)?;
        let paprika = ctx.services.paprika.clone();
        let vs = ctx.vs_or_default(args.vs.as_deref());
        show_listing(ctx, &args.listing, "Fetching exchanges", paprika.exchanges(&vs)).await
    }
    .boxed()
}

fn cp_exmarkets(ctx: &mut Context, argv: Vec<String>) -> BoxFuture<'_, Result<Action>> {
    async move {
        let args = ExchangeMarketsCmd::try_parse_from(argv)?;
        let paprika = ctx.services.paprika.clone();
        let vs = ctx.vs_or_default(args.vs.as_deref());
        let message = format!("Fetching markets of {}", args.exchange);
        show_listing(
            ctx,
            &args.listing,
            &message,
            paprika.exchange_markets(&args.exchange, &vs),
        )
        .await
    }
    .boxed()
}

fn cp_platforms(ctx: &mut Context, argv: Vec<String>) -> BoxFuture<'_, Result<Action>> {
    async move {
        let args = ListingCmd::try_parse_from(argv)?;
        let paprika = ctx.services.paprika.clone();
        show_listing(ctx, &args.listing, "Fetching platforms", paprika.platforms()).await
    }
    .boxed()
}

fn cp_contracts(ctx: &mut Context, argv: Vec<String>) -> BoxFuture<'_, Result<Action>> {
    async move {
        let args = ContractsCmd::try_parse_from(argv)?;
        let paprika = ctx.services.paprika.clone();
        let message = format!("Fetching contracts on {}", args.platform);
        show_listing(ctx, &args.listing, &message, paprika.contracts(&args.platform)).await
    }
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{context, output};

    #[test]
    fn test_menu_sections() {
        let (ctx, _out) = context(Vec::<String>::new());
        let help = menu().help(&ctx);
        let gecko = help.find("CoinGecko:").unwrap();
        let paprika = help.find("CoinPaprika:").unwrap();
        assert!(gecko < help.find("cg_hold").unwrap());
        assert!(paprika < help.find("cp_contracts").unwrap());
        assert!(gecko < paprika);
    }

    #[test]
    fn test_scraped_commands_listed() {
        let tokens = menu().tokens();
        for token in ["cg_nft", "cg_nft_today", "cg_news"] {
            assert!(tokens.contains(&token), "missing {token}");
        }
    }

    #[tokio::test]
    async fn test_news_rejects_bad_count() {
        let (mut ctx, out) = context(Vec::<String>::new());
        assert_eq!(menu().dispatch(&mut ctx, "cg_news -t many").await, Action::Continue);
        assert!(output(&out).contains("invalid value 'many'"));
    }

    #[tokio::test]
    async fn test_invalid_treasury_coin() {
        let (mut ctx, out) = context(Vec::<String>::new());
        menu().dispatch(&mut ctx, "cg_hold -c doge").await;
        assert!(output(&out).contains("invalid coin 'doge'"));
    }

    #[tokio::test]
    async fn test_help_flag_prints_usage() {
        let (mut ctx, out) = context(Vec::<String>::new());
        assert_eq!(menu().dispatch(&mut ctx, "cp_exmarkets -h").await, Action::Continue);
        let text = output(&out);
        assert!(text.contains("--exchange"));
        assert!(text.contains("Usage: cp_exmarkets"));
    }
}
