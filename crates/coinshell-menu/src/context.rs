//! State and services handed to every command handler.

use anyhow::{Context as _, Result};
use coinshell_lib::{
    ApiClient, Binance, Candle, CoinGecko, CoinPaprika, Endpoints, GeckoWeb,
    MarketDataProvider, ProviderRegistry, ProviderTag, RenderOptions, Renderer, Table,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;

use crate::console::Console;
use crate::session::Session;

/// Upstream sources used by the menus.
#[derive(Debug, Clone)]
pub struct Services {
    /// Coin-level providers by tag, used by `load`, `chart` and `dd`.
    pub registry: ProviderRegistry,
    /// CoinGecko market-wide listings.
    pub gecko: Arc<CoinGecko>,
    /// CoinPaprika market-wide listings.
    pub paprika: Arc<CoinPaprika>,
    /// Listings scraped from the CoinGecko website.
    pub web: Arc<GeckoWeb>,
}

impl Services {
    /// Builds every provider on one shared HTTP client.
    #[must_use]
    pub fn new(client: &ApiClient, endpoints: &Endpoints) -> Self {
        let gecko = Arc::new(CoinGecko::new(client.clone(), endpoints.coingecko.clone()));
        let paprika = Arc::new(CoinPaprika::new(client.clone(), endpoints.coinpaprika.clone()));
        let binance = Arc::new(Binance::new(client.clone(), endpoints.binance.clone()));
        let web = Arc::new(GeckoWeb::new(client.clone(), endpoints.coingecko_web.clone()));

        let mut registry = ProviderRegistry::new();
        registry.register(Arc::clone(&gecko) as Arc<dyn MarketDataProvider>);
        registry.register(Arc::clone(&paprika) as Arc<dyn MarketDataProvider>);
        registry.register(binance);

        Self {
            registry,
            gecko,
            paprika,
            web,
        }
    }

    /// Replaces the coin-level providers.
    #[must_use]
    pub fn with_registry(mut self, registry: ProviderRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Returns the provider for a tag.
    ///
    /// # Errors
    ///
    /// Returns an error if no provider is registered under `tag`.
    pub fn provider(&self, tag: ProviderTag) -> Result<Arc<dyn MarketDataProvider>> {
        self.registry
            .get(tag)
            .with_context(|| format!("{} is not available", tag.display_name()))
    }
}

/// User preferences that shape command output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuOptions {
    /// Quote currency used when a command gets no `--vs`.
    pub default_vs: String,
    /// Rows shown when a listing gets no `--top`.
    pub top: usize,
    /// Hide spinners.
    pub quiet: bool,
}

impl Default for MenuOptions {
    fn default() -> Self {
        Self {
            default_vs: "usd".to_string(),
            top: 15,
            quiet: false,
        }
    }
}

/// Everything a handler can read or change.
pub struct Context {
    /// The loaded coin.
    pub session: Session,
    /// Upstream sources.
    pub services: Services,
    /// Output preferences.
    pub options: MenuOptions,
    renderer: Renderer,
    console: Box<dyn Console>,
    path: Vec<&'static str>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("session", &self.session)
            .field("options", &self.options)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl Context {
    /// Creates a context with an empty session.
    #[must_use]
    pub fn new(services: Services, console: Box<dyn Console>) -> Self {
        Self {
            session: Session::new(),
            services,
            options: MenuOptions::default(),
            renderer: Renderer::default(),
            console,
            path: Vec::new(),
        }
    }

    /// Sets the output preferences.
    #[must_use]
    pub fn with_options(mut self, options: MenuOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the table and chart renderer.
    #[must_use]
    pub fn with_renderer(mut self, renderer: Renderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Returns the quote currency to use when none was given.
    #[must_use]
    pub fn vs_or_default(&self, vs: Option<&str>) -> String {
        vs.unwrap_or(&self.options.default_vs).to_lowercase()
    }

    pub(crate) fn enter(&mut self, menu: &'static str) {
        self.path.push(menu);
    }

    pub(crate) fn leave(&mut self) {
        self.path.pop();
    }

    /// Prompt showing the menu path, e.g. `(crypto)>(dd)> `.
    pub(crate) fn prompt(&self) -> String {
        let path: String = self.path.iter().map(|name| format!("({name})>")).collect();
        format!("{path} ")
    }

    pub(crate) fn read_line(&mut self, commands: &[&str]) -> Result<Option<String>> {
        let prompt = self.prompt();
        self.console.read_line(&prompt, commands)
    }

    pub(crate) fn println(&mut self, text: &str) {
        self.console.println(text);
    }

    pub(crate) fn clear_screen(&mut self) {
        self.console.clear();
    }

    /// Awaits `future` behind a spinner on stderr.
    pub(crate) async fn busy<F: Future>(&self, message: &str, future: F) -> F::Output {
        let spinner = self.spinner(message);
        let output = future.await;
        spinner.finish_and_clear();
        output
    }

    fn spinner(&self, message: &str) -> ProgressBar {
        if self.options.quiet || !std::io::stderr().is_terminal() {
            return ProgressBar::hidden();
        }
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    }

    /// Sorts, limits and prints a table followed by a blank line.
    pub(crate) fn show_table(&mut self, table: &Table, options: &RenderOptions) -> Result<()> {
        if table.is_empty() {
            self.println("No data found\n");
            return Ok(());
        }
        let rendered = self.renderer.table(table, options)?;
        self.console.write(&rendered);
        self.println("");
        Ok(())
    }

    /// Prints a price/volume series.
    pub(crate) fn show_candles(&mut self, candles: &[Candle], title: &str) -> Result<()> {
        let rendered = self.renderer.candles(candles, title)?;
        self.console.write(&rendered);
        self.println("");
        Ok(())
    }
}
