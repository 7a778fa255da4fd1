use crate::alias::AliasTable;
use crate::builtin;
use crate::command::{CommandKind, ExitCode, Flow, ParsedCommand};
use crate::config::Config;
use crate::error::{DispatchError, ParseError};
use crate::external::ExternalCommand;
use crate::io_adapters::Stdout;
use crate::parser;
use anyhow::Context;
use log::{debug, trace};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::fmt::Display;
use std::fs::File;
use std::io::{self, BufRead, IsTerminal, Write};

/// One shell session: the alias table plus the streams commands write to.
///
/// The session owns every piece of mutable state the shell has. Dropping it
/// releases the alias table.
///
/// Example
/// ```
/// use mysh::{Flow, Interpreter};
/// let mut sh = Interpreter::default();
/// sh.execute_line("alias ll ls -l\n").unwrap();
/// assert_eq!(sh.aliases().lookup("ll"), Some("ls -l"));
/// assert_eq!(sh.execute_line("exit\n").unwrap(), Flow::Exit);
/// ```
pub struct Interpreter {
    aliases: AliasTable,
    config: Config,
    stdout: Box<dyn Stdout>,
    stderr: Box<dyn Write>,
}

impl Interpreter {
    /// Create a session writing to the process stdout and stderr.
    pub fn new(config: Config) -> Self {
        Self::with_output(config, Box::new(io::stdout()), Box::new(io::stderr()))
    }

    /// Create a session with custom output streams.
    pub fn with_output(config: Config, stdout: Box<dyn Stdout>, stderr: Box<dyn Write>) -> Self {
        Self {
            aliases: AliasTable::new(),
            config,
            stdout,
            stderr,
        }
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// Run one raw line, as read from the terminal or a batch file.
    ///
    /// Errors in the line itself are reported on stderr and the session goes
    /// on; only failing to write the shell's own output is returned as `Err`.
    pub fn execute_line(&mut self, raw: &str) -> anyhow::Result<Flow> {
        if self.config.too_long(raw) {
            self.report("Command too long!")?;
            return Ok(Flow::Continue);
        }
        match parser::parse_line(raw) {
            Ok(command) => self.execute(&command),
            Err(ParseError::Empty) => Ok(Flow::Continue),
            Err(e) => {
                self.report(e)?;
                Ok(Flow::Continue)
            }
        }
    }

    /// Dispatch a parsed command to a builtin or a child process.
    ///
    /// Invalid or empty commands are ignored.
    pub fn execute(&mut self, command: &ParsedCommand) -> anyhow::Result<Flow> {
        let Some(name) = command.name().filter(|_| command.valid) else {
            return Ok(Flow::Continue);
        };

        let kind = CommandKind::of(name);
        trace!("dispatching {kind:?}: {:?}", command.tokens);
        if kind != CommandKind::External && command.redirect_target().is_some() {
            debug!("{name}: redirection ignored for builtins");
        }

        let result = match kind {
            CommandKind::Exit => return Ok(Flow::Exit),
            CommandKind::Alias => builtin::alias(&mut self.aliases, command.args(), &mut self.stdout),
            CommandKind::Unalias => builtin::unalias(&mut self.aliases, command.args()),
            CommandKind::External => self.spawn(command).map(|_| ()),
        };

        match result {
            Ok(()) => {}
            Err(DispatchError::Io(e)) => return Err(e).context("failed to write shell output"),
            Err(e) => self.report(e)?,
        }
        Ok(Flow::Continue)
    }

    /// Run an external command and wait for it.
    ///
    /// The redirect target is created before the program is looked up, so it
    /// exists (empty) even when the program does not.
    fn spawn(&mut self, command: &ParsedCommand) -> Result<ExitCode, DispatchError> {
        let redirect = match command.redirect_target() {
            Some(path) => Some(File::create(path).map_err(|e| {
                debug!("open {path}: {e}");
                DispatchError::Redirect(path.to_string())
            })?),
            None => None,
        };

        let argv = self.expand_alias(command);
        let search_paths = std::env::var_os("PATH").unwrap_or_default();
        ExternalCommand::resolve(argv, &search_paths)?.execute(redirect, &mut *self.stdout)
    }

    /// Replace the command name with its alias body, if it has one.
    ///
    /// Expansion is a single level: the first word of the body is run as a
    /// program even if it names another alias.
    fn expand_alias(&self, command: &ParsedCommand) -> Vec<String> {
        let Some(body) = command.name().and_then(|name| self.aliases.lookup(name)) else {
            return command.tokens.clone();
        };
        let mut argv = parser::parse(body).tokens;
        argv.extend_from_slice(command.args());
        trace!("alias expanded to {argv:?}");
        argv
    }

    fn report(&mut self, message: impl Display) -> anyhow::Result<()> {
        writeln!(self.stderr, "{message}").context("failed to write to stderr")?;
        self.stderr.flush()?;
        Ok(())
    }

    /// Interactive mode: prompt for lines until end-of-input or `exit`.
    ///
    /// A terminal gets a line editor with history; any other stdin is read
    /// line by line with the prompt written to stdout before each read.
    pub fn repl(&mut self) -> anyhow::Result<()> {
        let stdin = io::stdin();
        if stdin.is_terminal() {
            self.read_terminal()
        } else {
            self.run_prompted(stdin.lock())
        }
    }

    fn read_terminal(&mut self) -> anyhow::Result<()> {
        let mut rl = DefaultEditor::new()?;

        loop {
            match rl.readline(&self.config.prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        rl.add_history_entry(line.as_str())?;
                    }
                    if self.execute_line(&format!("{line}\n"))? == Flow::Exit {
                        break;
                    }
                }
                // Ctrl-C drops the current line only
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => break,
                Err(err) => return Err(err).context("failed to read command"),
            }
        }

        Ok(())
    }

    /// Run every line of `input`, writing the prompt to stdout before each one.
    pub fn run_prompted(&mut self, mut input: impl BufRead) -> anyhow::Result<()> {
        let mut buf = Vec::new();
        loop {
            write!(self.stdout, "{}", self.config.prompt)?;
            self.stdout.flush()?;

            buf.clear();
            let read = input
                .read_until(b'\n', &mut buf)
                .context("failed to read command")?;
            if read == 0 {
                break;
            }

            let raw = String::from_utf8_lossy(&buf);
            if self.execute_line(&raw)? == Flow::Exit {
                break;
            }
        }
        Ok(())
    }

    /// Run every line of `input`, echoing each one to stdout before it runs.
    pub fn run_batch(&mut self, mut input: impl BufRead) -> anyhow::Result<()> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let read = input
                .read_until(b'\n', &mut buf)
                .context("failed to read batch file")?;
            if read == 0 {
                break;
            }

            self.stdout.write_all(&buf)?;
            self.stdout.flush()?;

            let raw = String::from_utf8_lossy(&buf);
            if self.execute_line(&raw)? == Flow::Exit {
                break;
            }
        }
        Ok(())
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Drop for Interpreter {
    fn drop(&mut self) {
        let _ = self.stdout.flush();
        debug!("session closed with {} alias(es)", self.aliases.len());
    }
}
