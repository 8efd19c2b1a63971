//! The menu loop shared by every menu.

use anyhow::Result;
use futures::future::BoxFuture;
use tracing::debug;

use crate::action::Action;
use crate::context::Context;

/// Message printed for tokens no menu entry matches.
pub const UNKNOWN_COMMAND: &str = "The command selected doesn't exist";

/// Handler of one command.
///
/// Receives the whole command line split on whitespace, with the command
/// token first, ready for `clap::Parser::try_parse_from`.
pub type Handler = for<'a> fn(&'a mut Context, Vec<String>) -> BoxFuture<'a, Result<Action>>;

/// Builds the extra help lines shown above a menu's commands.
pub type StatusLine = fn(&Context) -> Option<String>;

const BUILTINS: &[(&str, &str)] = &[
    ("cls", "clear screen"),
    ("?/help", "show this menu again"),
    ("q", "quit this menu, and shows back to main menu"),
    ("quit", "quit to abandon program"),
];

const BUILTIN_TOKENS: &[&str] = &["?", "help", "cls", "q", "quit"];

/// One entry of a menu's command table.
#[derive(Debug, Clone, Copy)]
pub struct Command {
    token: &'static str,
    help: &'static str,
    section: &'static str,
    submenu: bool,
    handler: Handler,
}

impl Command {
    /// Creates a command.
    #[must_use]
    pub const fn new(token: &'static str, help: &'static str, handler: Handler) -> Self {
        Self {
            token,
            help,
            section: "",
            submenu: false,
            handler,
        }
    }

    /// Groups the command under a help heading.
    #[must_use]
    pub const fn in_section(mut self, section: &'static str) -> Self {
        self.section = section;
        self
    }

    /// Marks the command as opening a sub-menu.
    #[must_use]
    pub const fn submenu(mut self) -> Self {
        self.submenu = true;
        self
    }

    /// Returns the command token.
    #[must_use]
    pub const fn token(&self) -> &'static str {
        self.token
    }
}

/// A named menu with an ordered command table.
#[derive(Debug, Clone)]
pub struct Menu {
    name: &'static str,
    title: &'static str,
    commands: Vec<Command>,
    status: Option<StatusLine>,
}

impl Menu {
    /// Creates a menu. `name` appears in the prompt, `title` heads the help.
    #[must_use]
    pub const fn new(name: &'static str, title: &'static str) -> Self {
        Self {
            name,
            title,
            commands: Vec::new(),
            status: None,
        }
    }

    /// Appends a command.
    #[must_use]
    pub fn command(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }

    /// Sets the status line shown between the built-ins and the commands.
    #[must_use]
    pub const fn with_status(mut self, status: StatusLine) -> Self {
        self.status = Some(status);
        self
    }

    /// Returns the menu name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns every token the menu accepts, built-ins first.
    #[must_use]
    pub fn tokens(&self) -> Vec<&'static str> {
        BUILTIN_TOKENS
            .iter()
            .copied()
            .chain(self.commands.iter().map(Command::token))
            .collect()
    }

    fn find(&self, token: &str) -> Option<&Command> {
        self.commands.iter().find(|c| c.token == token)
    }

    /// Renders the help text.
    #[must_use]
    pub fn help(&self, ctx: &Context) -> String {
        let mut out = format!("\n{}:\n", self.title);
        for (token, help) in BUILTINS {
            out.push_str(&format!("   {token:<15} {help}\n"));
        }
        out.push('\n');
        if let Some(status) = self.status.and_then(|status| status(ctx)) {
            out.push_str(&status);
            out.push_str("\n\n");
        }

        let mut section = "";
        for command in &self.commands {
            if command.section != section {
                section = command.section;
                if !section.is_empty() {
                    out.push_str(&format!("{section}:\n"));
                }
            }
            let marker = if command.submenu { ">  " } else { "   " };
            out.push_str(&format!("{marker}{:<15} {}\n", command.token, command.help));
        }
        out
    }

    /// Runs the menu until the user leaves it.
    ///
    /// Returns [`Action::Back`] for `q` and [`Action::Quit`] for `quit` or
    /// end of input.
    ///
    /// # Errors
    ///
    /// Returns an error only if the console cannot be read.
    pub async fn run(&self, ctx: &mut Context) -> Result<Action> {
        ctx.enter(self.name);
        let help = self.help(ctx);
        ctx.println(&help);

        let tokens = self.tokens();
        let outcome = loop {
            let line = match ctx.read_line(&tokens) {
                Ok(Some(line)) => line,
                Ok(None) => break Ok(Action::Quit),
                Err(e) => break Err(e),
            };
            match self.dispatch(ctx, &line).await {
                Action::Continue => {}
                other => break Ok(other),
            }
        };
        ctx.leave();
        outcome
    }

    /// Runs the menu as a sub-menu of the calling one.
    ///
    /// # Errors
    ///
    /// Returns an error only if the console cannot be read.
    pub async fn enter(&self, ctx: &mut Context) -> Result<Action> {
        Ok(self.run(ctx).await?.from_child())
    }

    /// Handles one input line.
    pub async fn dispatch(&self, ctx: &mut Context, line: &str) -> Action {
        let argv: Vec<String> = line.split_whitespace().map(String::from).collect();
        let Some(token) = argv.first().cloned() else {
            ctx.println("");
            return Action::Continue;
        };

        match token.as_str() {
            "?" | "help" => {
                let help = self.help(ctx);
                ctx.println(&help);
                Action::Continue
            }
            "cls" => {
                ctx.clear_screen();
                Action::Continue
            }
            "q" => Action::Back,
            "quit" => Action::Quit,
            other => match self.find(other) {
                Some(command) => {
                    debug!(menu = self.name, command = command.token, "dispatching");
                    match (command.handler)(ctx, argv).await {
                        Ok(action) => action,
                        Err(e) => {
                            report_error(ctx, &e);
                            Action::Continue
                        }
                    }
                }
                None => {
                    ctx.println(&format!("{UNKNOWN_COMMAND}\n"));
                    Action::Continue
                }
            },
        }
    }
}

/// Prints a handler error and keeps the menu running.
fn report_error(ctx: &mut Context, error: &anyhow::Error) {
    if let Some(usage) = error.downcast_ref::<clap::Error>() {
        ctx.println(&usage.render().to_string());
        return;
    }
    debug!(error = ?error, "command failed");
    ctx.println(&format!("{error:#}\n"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{context, output};
    use futures::FutureExt;

    fn fails(_ctx: &mut Context, _argv: Vec<String>) -> BoxFuture<'_, Result<Action>> {
        async { Err(anyhow::anyhow!("upstream unavailable")) }.boxed()
    }

    fn echo(ctx: &mut Context, argv: Vec<String>) -> BoxFuture<'_, Result<Action>> {
        async move {
            ctx.println(&argv.join("|"));
            Ok(Action::Continue)
        }
        .boxed()
    }

    fn menu() -> Menu {
        Menu::new("test", "Test")
            .command(Command::new("echo", "echo arguments", echo).in_section("Tools"))
            .command(Command::new("fail", "always fails", fails))
    }

    #[tokio::test]
    async fn test_unknown_command_continues() {
        let (mut ctx, out) = context(Vec::<String>::new());
        let action = menu().dispatch(&mut ctx, "nosuch --flag").await;
        assert_eq!(action, Action::Continue);
        assert!(output(&out).contains(UNKNOWN_COMMAND));
    }

    #[tokio::test]
    async fn test_empty_line_prints_blank() {
        let (mut ctx, out) = context(Vec::<String>::new());
        assert_eq!(menu().dispatch(&mut ctx, "   ").await, Action::Continue);
        assert_eq!(output(&out), "\n");
    }

    #[tokio::test]
    async fn test_handler_gets_argv() {
        let (mut ctx, out) = context(Vec::<String>::new());
        menu().dispatch(&mut ctx, "echo  a   b").await;
        assert!(output(&out).contains("echo|a|b"));
    }

    #[tokio::test]
    async fn test_handler_error_is_reported() {
        let (mut ctx, out) = context(Vec::<String>::new());
        assert_eq!(menu().dispatch(&mut ctx, "fail").await, Action::Continue);
        assert!(output(&out).contains("upstream unavailable"));
    }

    #[tokio::test]
    async fn test_builtins() {
        let (mut ctx, out) = context(Vec::<String>::new());
        let menu = menu();
        assert_eq!(menu.dispatch(&mut ctx, "q").await, Action::Back);
        assert_eq!(menu.dispatch(&mut ctx, "quit").await, Action::Quit);
        assert_eq!(menu.dispatch(&mut ctx, "cls").await, Action::Continue);
        assert_eq!(menu.dispatch(&mut ctx, "?").await, Action::Continue);
        let text = output(&out);
        assert!(text.contains("Tools:"));
        assert!(text.contains("   echo            echo arguments"));
    }

    #[tokio::test]
    async fn test_end_of_input_quits() {
        let (mut ctx, _out) = context(["echo hi"]);
        assert_eq!(menu().run(&mut ctx).await.unwrap(), Action::Quit);
    }

    #[tokio::test]
    async fn test_back_from_child_continues_parent() {
        let (mut ctx, _out) = context(["q"]);
        assert_eq!(menu().enter(&mut ctx).await.unwrap(), Action::Continue);

        let (mut ctx, _out) = context(["quit"]);
        assert_eq!(menu().enter(&mut ctx).await.unwrap(), Action::Quit);
    }

    #[test]
    fn test_tokens_include_builtins() {
        let tokens = menu().tokens();
        assert_eq!(tokens[..5], ["?", "help", "cls", "q", "quit"]);
        assert!(tokens.contains(&"echo"));
    }
}
