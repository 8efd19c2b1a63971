//! Top-level `crypto` menu: load a coin, chart it, open the sub-menus.

use anyhow::{Context as _, Result};
use clap::Parser;
use coinshell_lib::{Interval, ProviderTag, SeriesRequest, Window};
use futures::FutureExt;
use futures::future::BoxFuture;

use crate::action::Action;
use crate::args::{ChartArgs, LoadArgs, insert_coin_flag};
use crate::context::Context;
use crate::controllers::{discovery, due_diligence, overview};
use crate::dispatcher::{Command, Menu};

/// Printed by commands that need a loaded coin.
pub const NO_COIN: &str = "No coin selected. Use 'load' to load the coin you want to look at.";

/// Builds the `crypto` menu.
#[must_use]
pub fn menu() -> Menu {
    Menu::new("crypto", "Cryptocurrency")
        .with_status(|ctx| {
            let coin = ctx
                .session
                .coin()
                .map_or_else(|| "None".to_string(), ToString::to_string);
            Some(format!("Loaded coin: {coin}"))
        })
        .command(Command::new("load", "load a coin: load -c COIN [--source cg|cp|bin]", load))
        .command(Command::new("clear", "remove the loaded coin", clear))
        .command(Command::new("chart", "candlestick chart of the loaded coin", chart))
        .command(Command::new("disc", "discover trending and new coins", disc).submenu())
        .command(Command::new("ov", "market-wide overview", ov).submenu())
        .command(Command::new("dd", "due diligence on the loaded coin", dd).submenu())
}

fn load(ctx: &mut Context, argv: Vec<String>) -> BoxFuture<'_, Result<Action>> {
    async move {
        let args = LoadArgs::try_parse_from(insert_coin_flag(argv))?;
        let provider = ctx.services.provider(args.source)?;
        let window = Window::new(args.days)?;

        let coin = ctx
            .busy(
                &format!("Resolving {} on {}", args.coin, args.source.display_name()),
                provider.resolve(&args.coin, args.vs.as_deref()),
            )
            .await?;

        // Binance coins keep their daily candles for `chart`
        let candles = if args.source == ProviderTag::Binance {
            let request = SeriesRequest {
                vs: coin.quote().unwrap_or_default().to_string(),
                window,
                interval: args.interval,
            };
            let candles = ctx
                .busy(&format!("Fetching {coin} candles"), provider.fetch_series(&coin, &request))
                .await
                .with_context(|| format!("Couldn't load candles for {coin}"))?;
            Some(candles)
        } else {
            None
        };

        let quote = coin.quote().map(str::to_string).or(args.vs);
        ctx.println(&format!("Loaded coin {coin}\n"));
        ctx.session.load(coin, quote, candles);
        Ok(Action::Continue)
    }
    .boxed()
}

fn clear(ctx: &mut Context, _argv: Vec<String>) -> BoxFuture<'_, Result<Action>> {
    async move {
        match ctx.session.clear() {
            Some(coin) => ctx.println(&format!(
                "Current coin {coin} was removed. You can load new coin with load -c <coin>\n"
            )),
            None => ctx.println(&format!("{NO_COIN}\n")),
        }
        Ok(Action::Continue)
    }
    .boxed()
}

fn chart(ctx: &mut Context, argv: Vec<String>) -> BoxFuture<'_, Result<Action>> {
    async move {
        let Some(coin) = ctx.session.coin().cloned() else {
            ctx.println(&format!("{NO_COIN}\n"));
            return Ok(Action::Continue);
        };
        let args = ChartArgs::try_parse_from(argv)?;

        let cached = ctx
            .session
            .candles()
            .filter(|_| args.days.is_none() && args.interval.is_none() && args.vs.is_none())
            .map(<[_]>::to_vec);

        let vs = match coin.quote() {
            Some(quote) => args.vs.clone().unwrap_or_else(|| quote.to_string()),
            None => ctx.vs_or_default(args.vs.as_deref().or(ctx.session.quote())),
        };
        let window = Window::new(args.days.unwrap_or_else(|| Window::default().days()))?;

        let candles = match cached {
            Some(candles) => candles,
            None => {
                let provider = ctx.services.provider(coin.provider())?;
                let request = SeriesRequest {
                    vs: vs.clone(),
                    window,
                    interval: args.interval.unwrap_or(Interval::Day1),
                };
                ctx.busy(&format!("Fetching {coin} prices"), provider.fetch_series(&coin, &request))
                    .await?
            }
        };

        let title = format!(
            "{} / {} ({} candles)",
            coin.symbol().to_uppercase(),
            vs.to_uppercase(),
            candles.len()
        );
        ctx.show_candles(&candles, &title)?;
        Ok(Action::Continue)
    }
    .boxed()
}

fn disc(ctx: &mut Context, _argv: Vec<String>) -> BoxFuture<'_, Result<Action>> {
    async move { discovery::menu().enter(ctx).await }.boxed()
}

fn ov(ctx: &mut Context, _argv: Vec<String>) -> BoxFuture<'_, Result<Action>> {
    async move { overview::menu().enter(ctx).await }.boxed()
}

fn dd(ctx: &mut Context, _argv: Vec<String>) -> BoxFuture<'_, Result<Action>> {
    async move {
        let Some(coin) = ctx.session.coin() else {
            ctx.println(&format!("{NO_COIN}\n"));
            return Ok(Action::Continue);
        };
        let provider = ctx.services.provider(coin.provider())?;
        due_diligence::menu(provider.tag(), provider.reports())
            .enter(ctx)
            .await
    }
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{context, context_with, context_with_prompts, output};
    use coinshell_lib::{MockProvider, ProviderRegistry};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_load_then_clear_empties_session() {
        for tag in ["cg", "cp", "bin"] {
            let (mut ctx, _out) = context(Vec::<String>::new());
            let menu = menu();
            assert_eq!(menu.dispatch(&mut ctx, &format!("load btc --source {tag}")).await, Action::Continue);
            assert!(ctx.session.is_loaded(), "{tag} did not load");
            menu.dispatch(&mut ctx, "clear").await;
            assert!(!ctx.session.is_loaded());
        }
    }

    #[tokio::test]
    async fn test_failed_load_keeps_session() {
        let (mut ctx, out) = context(Vec::<String>::new());
        let menu = menu();
        menu.dispatch(&mut ctx, "load bitcoin").await;
        let before = ctx.session.coin().cloned();

        assert_eq!(menu.dispatch(&mut ctx, "load bitcoinn").await, Action::Continue);
        assert_eq!(ctx.session.coin().cloned(), before);
        let text = output(&out);
        assert!(text.contains("Couldn't find 'bitcoinn'"));
        assert!(text.contains("bitcoin"));
    }

    #[tokio::test]
    async fn test_usage_error_keeps_session() {
        let (mut ctx, out) = context(Vec::<String>::new());
        let menu = menu();
        assert_eq!(menu.dispatch(&mut ctx, "load btc --source xyz").await, Action::Continue);
        assert!(!ctx.session.is_loaded());
        assert!(output(&out).contains("--source"));
    }

    #[tokio::test]
    async fn test_chart_keeps_provider() {
        let mock = Arc::new(MockProvider::new(ProviderTag::CoinGecko));
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::clone(&mock) as Arc<dyn coinshell_lib::MarketDataProvider>);
        let (mut ctx, out) = context_with(Vec::<String>::new(), registry);
        let menu = menu();

        menu.dispatch(&mut ctx, "load bitcoin --source cg").await;
        menu.dispatch(&mut ctx, "chart -d 30").await;
        assert_eq!(mock.series_requests(), 1);

        let coin = ctx.session.coin().unwrap();
        assert_eq!(coin.id(), "bitcoin");
        assert_eq!(coin.provider(), ProviderTag::CoinGecko);
        assert!(output(&out).contains("BTC / USD (30 candles)"));

        // Unrelated commands still see the same coin
        menu.dispatch(&mut ctx, "help").await;
        assert_eq!(ctx.session.coin().unwrap().provider(), ProviderTag::CoinGecko);
    }

    #[tokio::test]
    async fn test_binance_load_caches_candles() {
        let (mut ctx, out) = context(Vec::<String>::new());
        let menu = menu();
        menu.dispatch(&mut ctx, "load eth --source bin --vs btc -d 14").await;

        let coin = ctx.session.coin().unwrap();
        assert_eq!(coin.pair().as_deref(), Some("ETHBTC"));
        assert_eq!(ctx.session.candles().map(<[_]>::len), Some(14));

        menu.dispatch(&mut ctx, "chart").await;
        assert!(output(&out).contains("ETH / BTC (14 candles)"));
    }

    #[tokio::test]
    async fn test_commands_without_coin() {
        let (mut ctx, out) = context(Vec::<String>::new());
        let menu = menu();
        for line in ["chart", "dd", "clear"] {
            assert_eq!(menu.dispatch(&mut ctx, line).await, Action::Continue);
        }
        assert_eq!(output(&out).matches(NO_COIN).count(), 3);
    }

    #[tokio::test]
    async fn test_q_in_submenu_returns_to_parent() {
        let (mut ctx, out) = context(["ov", "q", "load btc", "quit"]);
        assert_eq!(menu().run(&mut ctx).await.unwrap(), Action::Quit);
        assert!(ctx.session.is_loaded());
        assert!(output(&out).contains("Loaded coin"));
    }

    #[tokio::test]
    async fn test_quit_in_submenu_exits() {
        let (mut ctx, _out) = context(["disc", "quit", "load btc"]);
        assert_eq!(menu().run(&mut ctx).await.unwrap(), Action::Quit);
        assert!(!ctx.session.is_loaded());
    }

    #[tokio::test]
    async fn test_dd_prompt_path() {
        let (mut ctx, _out, prompts) = context_with_prompts(["load btc", "dd", "info", "q", "quit"]);
        assert_eq!(menu().run(&mut ctx).await.unwrap(), Action::Quit);
        let prompts = prompts.lock().unwrap();
        assert_eq!(prompts[0], "(crypto)> ");
        assert_eq!(prompts[2], "(crypto)>(dd)> ");
        assert_eq!(prompts[4], "(crypto)> ");
    }
}
