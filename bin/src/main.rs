//! coinshell CLI - Interactive terminal for cryptocurrency market data.

use anyhow::{Context as _, Result};
use clap::Parser;
use coinshell_lib::{ApiClient, OutputFormat, Renderer, TextFormatter};
use coinshell_menu::{Console, Context, InquireConsole, LineConsole, MenuOptions, Services};
use std::fs::File;
use std::io::{BufReader, IsTerminal};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

mod config;

#[derive(Parser)]
#[command(name = "coinshell")]
#[command(about = "Interactive terminal for cryptocurrency market data", long_about = None)]
#[command(version)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (hide spinners)
    #[arg(short, long)]
    quiet: bool,

    /// Config file. Defaults to the platform config dir, e.g. ~/.config/coinshell/config.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format: table, csv, tsv, json or ndjson
    #[arg(long)]
    format: Option<OutputFormat>,

    /// Read menu commands from a file instead of the prompt
    #[arg(long)]
    script: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let format = match cli.format {
        Some(format) => format,
        None => settings.display.output_format()?,
    };

    let client = ApiClient::new(settings.client.client_config())
        .context("Failed to build HTTP client")?;
    let services = Services::new(&client, &settings.endpoints);

    let text = TextFormatter::new()
        .with_max_column_width(settings.display.max_column_width)
        .with_chart(settings.display.chart());
    let options = MenuOptions {
        default_vs: settings.display.default_vs.to_lowercase(),
        top: settings.display.top,
        quiet: cli.quiet,
    };

    let console = open_console(cli.script)?;
    info!(%format, "starting coinshell");

    let mut ctx = Context::new(services, console)
        .with_options(options)
        .with_renderer(Renderer::new(format).with_text(text));
    coinshell_menu::run(&mut ctx).await
}

/// Picks the prompt: a script file, piped stdin, or the interactive terminal.
fn open_console(script: Option<PathBuf>) -> Result<Box<dyn Console>> {
    if let Some(path) = script {
        let file = File::open(&path)
            .with_context(|| format!("Failed to open script {}", path.display()))?;
        return Ok(Box::new(LineConsole::new(BufReader::new(file))));
    }
    if std::io::stdin().is_terminal() {
        Ok(Box::new(InquireConsole::new()))
    } else {
        Ok(Box::new(LineConsole::new(BufReader::new(std::io::stdin()))))
    }
}

/// Initialize logging on stderr, `RUST_LOG` taking precedence over `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
