/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line tools.
pub type ExitCode = i32;

/// Where the standard output of a command should go.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Redirect {
    /// No `>` on the line; output goes wherever the shell's stdout goes.
    #[default]
    None,
    /// `> path`: the child's stdout is bound to `path` (created or truncated).
    ToFile(String),
    /// The line carried a `>` that failed validation. Never executed.
    Malformed,
}

/// Result of parsing one raw command line.
///
/// `tokens` never contain the `>` marker or the redirect target; when
/// `redirect` is [`Redirect::ToFile`] the target lives only there.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedCommand {
    pub tokens: Vec<String>,
    pub valid: bool,
    pub redirect: Redirect,
}

impl ParsedCommand {
    /// A command that must not be executed because its redirection is broken.
    pub fn malformed() -> Self {
        Self {
            tokens: Vec::new(),
            valid: false,
            redirect: Redirect::Malformed,
        }
    }

    /// Name of the program or builtin, if any.
    pub fn name(&self) -> Option<&str> {
        self.tokens.first().map(String::as_str)
    }

    /// Everything after the command name.
    pub fn args(&self) -> &[String] {
        self.tokens.get(1..).unwrap_or(&[])
    }

    pub fn redirect_target(&self) -> Option<&str> {
        match &self.redirect {
            Redirect::ToFile(path) => Some(path.as_str()),
            _ => None,
        }
    }
}

/// What the first token of a command selects.
///
/// Picked once per parsed command so dispatch is an exhaustive `match`
/// instead of a chain of string comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Exit,
    Alias,
    Unalias,
    External,
}

impl CommandKind {
    pub fn of(name: &str) -> Self {
        match name {
            "exit" => CommandKind::Exit,
            "alias" => CommandKind::Alias,
            "unalias" => CommandKind::Unalias,
            _ => CommandKind::External,
        }
    }
}

/// Whether the session should keep reading lines after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}
