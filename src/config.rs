use argh::FromArgs;
use std::path::PathBuf;

/// Prompt printed before every line in interactive mode.
pub const DEFAULT_PROMPT: &str = "mysh> ";

/// Size of the line buffer; a line must be strictly shorter than
/// `MAX_CMD_LINE - 1` bytes (newline included) to be executed.
pub const MAX_CMD_LINE: usize = 512;

#[derive(FromArgs, Debug)]
/// A minimal shell. Reads commands interactively, or from BATCH_FILE when given.
pub struct Args {
    #[argh(positional)]
    /// script to run instead of reading from the terminal
    pub batch_file: Vec<String>,

    #[argh(option, default = "DEFAULT_PROMPT.to_string()")]
    /// prompt shown in interactive mode
    pub prompt: String,

    #[argh(option, default = "MAX_CMD_LINE")]
    /// line buffer size in bytes; longer lines are rejected
    pub max_line: usize,

    #[argh(switch, short = 'v')]
    /// log what the shell is doing to stderr
    pub verbose: bool,
}

/// How the shell was asked to read its input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Interactive,
    Batch(PathBuf),
}

impl Args {
    /// `None` when more than one batch file was given.
    pub fn mode(&self) -> Option<Mode> {
        match self.batch_file.as_slice() {
            [] => Some(Mode::Interactive),
            [path] => Some(Mode::Batch(PathBuf::from(path))),
            _ => None,
        }
    }

    pub fn config(&self) -> Config {
        Config {
            prompt: self.prompt.clone(),
            max_line: self.max_line,
        }
    }
}

/// Settings of one shell session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub prompt: String,
    pub max_line: usize,
}

impl Config {
    /// Whether `raw` (as read, trailing newline included) fills the line buffer.
    pub fn too_long(&self, raw: &str) -> bool {
        raw.len() >= self.max_line.saturating_sub(1)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            max_line: MAX_CMD_LINE,
        }
    }
}
