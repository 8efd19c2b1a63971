//! Offline contexts for handler tests.

use coinshell_lib::{ApiClient, Endpoints, MockProvider, ProviderRegistry, ProviderTag};
use std::sync::{Arc, Mutex};

use crate::console::ScriptedConsole;
use crate::context::{Context, MenuOptions, Services};

/// Registry with a mock provider under every tag.
pub(crate) fn mock_registry() -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    for tag in ProviderTag::all() {
        registry.register(Arc::new(MockProvider::new(*tag)));
    }
    registry
}

/// Context answering prompts with `lines`, returning a handle to its output.
pub(crate) fn context<I, S>(lines: I) -> (Context, Arc<Mutex<String>>)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    context_with(lines, mock_registry())
}

pub(crate) fn context_with<I, S>(
    lines: I,
    registry: ProviderRegistry,
) -> (Context, Arc<Mutex<String>>)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let console = ScriptedConsole::new(lines);
    let out = console.output();
    (build(console, registry), out)
}

/// Like [`context`], also returning the prompts shown.
pub(crate) fn context_with_prompts<I, S>(
    lines: I,
) -> (Context, Arc<Mutex<String>>, Arc<Mutex<Vec<String>>>)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let console = ScriptedConsole::new(lines);
    let out = console.output();
    let prompts = console.prompts();
    (build(console, mock_registry()), out, prompts)
}

fn build(console: ScriptedConsole, registry: ProviderRegistry) -> Context {
    let client = ApiClient::with_defaults().unwrap();
    let services = Services::new(&client, &Endpoints::default()).with_registry(registry);
    let options = MenuOptions {
        quiet: true,
        ..MenuOptions::default()
    };
    Context::new(services, Box::new(console)).with_options(options)
}

pub(crate) fn output(out: &Arc<Mutex<String>>) -> String {
    out.lock().unwrap().clone()
}
