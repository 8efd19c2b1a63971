//! Where menu input comes from and output goes to.

use anyhow::{Context as _, Result};
use inquire::autocompletion::{Autocomplete, Replacement};
use inquire::ui::RenderConfig;
use inquire::{CustomUserError, InquireError, Text};
use std::collections::VecDeque;
use std::io::{BufRead, Write};
use std::sync::{Arc, Mutex};

/// Line-oriented terminal used by the menus.
pub trait Console: Send + Sync {
    /// Reads one command line.
    ///
    /// `commands` are the tokens of the current menu, for completion.
    /// Returns `None` at end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be read.
    fn read_line(&mut self, prompt: &str, commands: &[&str]) -> Result<Option<String>>;

    /// Writes text as is.
    fn write(&mut self, text: &str);

    /// Clears the screen.
    fn clear(&mut self);

    /// Writes text followed by a newline.
    fn println(&mut self, text: &str) {
        self.write(text);
        self.write("\n");
    }
}

/// Completes the first word of the line with the menu's command tokens.
#[derive(Debug, Clone, Default)]
struct CommandCompleter {
    commands: Vec<String>,
}

impl CommandCompleter {
    fn matches(&self, input: &str) -> Vec<String> {
        if input.contains(char::is_whitespace) {
            return Vec::new();
        }
        self.commands
            .iter()
            .filter(|c| c.starts_with(input))
            .cloned()
            .collect()
    }
}

impl Autocomplete for CommandCompleter {
    fn get_suggestions(&mut self, input: &str) -> Result<Vec<String>, CustomUserError> {
        Ok(self.matches(input))
    }

    fn get_completion(
        &mut self,
        input: &str,
        highlighted_suggestion: Option<String>,
    ) -> Result<Replacement, CustomUserError> {
        Ok(highlighted_suggestion.or_else(|| match self.matches(input).as_slice() {
            [only] => Some(only.clone()),
            _ => None,
        }))
    }
}

/// Interactive prompt with tab completion.
#[derive(Debug, Default)]
pub struct InquireConsole;

impl InquireConsole {
    /// Creates an interactive console on the terminal.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Console for InquireConsole {
    fn read_line(&mut self, prompt: &str, commands: &[&str]) -> Result<Option<String>> {
        let completer = CommandCompleter {
            commands: commands.iter().map(ToString::to_string).collect(),
        };
        let answer = Text::new(prompt)
            .with_render_config(RenderConfig::empty())
            .with_autocomplete(completer)
            .prompt();
        match answer {
            Ok(line) => Ok(Some(line)),
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
            Err(e) => Err(e).context("failed to read command"),
        }
    }

    fn write(&mut self, text: &str) {
        let mut stdout = std::io::stdout().lock();
        let _ = stdout.write_all(text.as_bytes());
        let _ = stdout.flush();
    }

    fn clear(&mut self) {
        self.write("\x1B[2J\x1B[1;1H");
    }
}

/// Reads commands from a script or piped stdin and echoes them after the prompt.
#[derive(Debug)]
pub struct LineConsole<R> {
    reader: R,
}

impl<R: BufRead + Send + Sync> LineConsole<R> {
    /// Creates a console reading lines from `reader`.
    pub const fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead + Send + Sync> Console for LineConsole<R> {
    fn read_line(&mut self, prompt: &str, _commands: &[&str]) -> Result<Option<String>> {
        let mut line = String::new();
        let read = self
            .reader
            .read_line(&mut line)
            .context("failed to read command")?;
        if read == 0 {
            return Ok(None);
        }
        let line = line.trim_end_matches(['\r', '\n']).to_string();
        self.write(&format!("{prompt}{line}\n"));
        Ok(Some(line))
    }

    fn write(&mut self, text: &str) {
        let mut stdout = std::io::stdout().lock();
        let _ = stdout.write_all(text.as_bytes());
        let _ = stdout.flush();
    }

    fn clear(&mut self) {}
}

/// Console fed from a fixed list of lines that records everything written.
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    input: VecDeque<String>,
    output: Arc<Mutex<String>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedConsole {
    /// Creates a console that answers prompts with `lines`, then reports end of input.
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            input: lines.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Returns a handle to the recorded output.
    #[must_use]
    pub fn output(&self) -> Arc<Mutex<String>> {
        Arc::clone(&self.output)
    }

    /// Returns a handle to the prompts shown so far.
    #[must_use]
    pub fn prompts(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.prompts)
    }
}

impl Console for ScriptedConsole {
    fn read_line(&mut self, prompt: &str, _commands: &[&str]) -> Result<Option<String>> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        Ok(self.input.pop_front())
    }

    fn write(&mut self, text: &str) {
        if let Ok(mut output) = self.output.lock() {
            output.push_str(text);
        }
    }

    fn clear(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_completer_matches_first_word() {
        let completer = CommandCompleter {
            commands: vec!["load".into(), "clear".into(), "cls".into()],
        };
        assert_eq!(completer.matches("cl"), ["clear", "cls"]);
        assert_eq!(completer.matches("lo"), ["load"]);
        assert!(completer.matches("load bt").is_empty());
    }

    #[test]
    fn test_line_console_reads_until_eof() {
        let mut console = LineConsole::new(Cursor::new("load btc\r\n\nquit"));
        assert_eq!(console.read_line("> ", &[]).unwrap().as_deref(), Some("load btc"));
        assert_eq!(console.read_line("> ", &[]).unwrap().as_deref(), Some(""));
        assert_eq!(console.read_line("> ", &[]).unwrap().as_deref(), Some("quit"));
        assert!(console.read_line("> ", &[]).unwrap().is_none());
    }

    #[test]
    fn test_scripted_console_records() {
        let mut console = ScriptedConsole::new(["help"]);
        let output = console.output();
        assert_eq!(console.read_line("(crypto)> ", &[]).unwrap().as_deref(), Some("help"));
        assert!(console.read_line("(crypto)> ", &[]).unwrap().is_none());
        console.println("hello");
        assert_eq!(*output.lock().unwrap(), "hello\n");
        assert_eq!(console.prompts().lock().unwrap().len(), 2);
    }
}
