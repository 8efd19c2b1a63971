//! `dd` menu: reports on the loaded coin from the provider that resolved it.

use anyhow::{Context as _, Result};
use clap::Parser;
use coinshell_lib::{ProviderTag, ReportKind, ReportOptions};
use futures::FutureExt;
use futures::future::BoxFuture;

use crate::action::Action;
use crate::args::ReportCmd;
use crate::context::Context;
use crate::controllers::crypto::NO_COIN;
use crate::dispatcher::{Command, Menu};

/// Builds the `dd` menu for the reports of one provider.
#[must_use]
pub fn menu(tag: ProviderTag, reports: &[ReportKind]) -> Menu {
    reports
        .iter()
        .fold(Menu::new("dd", "Due Diligence"), |menu, kind| {
            let command = Command::new(kind.token(), kind.description(), report);
            menu.command(command.in_section(tag.display_name()))
        })
        .with_status(|ctx| ctx.session.coin().map(|coin| format!("Loaded coin: {coin}")))
}

fn report(ctx: &mut Context, argv: Vec<String>) -> BoxFuture<'_, Result<Action>> {
    async move {
        let coin = ctx.session.coin().cloned().context(NO_COIN)?;
        let provider = ctx.services.provider(coin.provider())?;
        let token = argv.first().cloned().unwrap_or_default();
        let kind = provider
            .reports()
            .iter()
            .copied()
            .find(|kind| kind.token() == token)
            .with_context(|| {
                format!("'{token}' is not available on {}", provider.tag().display_name())
            })?;
        let args = ReportCmd::try_parse_from(argv)?;

        let vs = match coin.quote() {
            Some(quote) => args.vs.clone().unwrap_or_else(|| quote.to_string()),
            None => ctx.vs_or_default(args.vs.as_deref().or(ctx.session.quote())),
        };
        let options = ReportOptions {
            vs,
            limit: args.listing.top.unwrap_or(ReportOptions::default().limit),
            interval: args.interval,
        };

        let mut table = ctx
            .busy(
                &format!("Fetching {} for {coin}", kind.description()),
                provider.report(&coin, kind, &options),
            )
            .await?;
        args.listing.strip_links(&mut table);
        // Reports keep every row unless -t is given
        let render = args.listing.render_options(&table, usize::MAX);
        ctx.show_table(&table, &render)?;
        Ok(Action::Continue)
    }
    .boxed()
}
