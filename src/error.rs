//! Error types for the parser, alias table and dispatcher.
//!
//! The `Display` text of every variant is exactly what the shell prints on
//! its error stream, minus the trailing newline.

use std::io;
use thiserror::Error;

/// Errors that can occur while turning a raw line into a [`crate::ParsedCommand`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// `>` as the first or last character, more than one `>`, or a target
    /// that is not exactly one trailing token.
    #[error("Redirection misformatted.")]
    Misformatted,
    /// Nothing but whitespace. Never reported to the user.
    #[error("empty command")]
    Empty,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AliasError {
    /// `alias`, `unalias` and `exit` can not be shadowed.
    #[error("alias: Too dangerous to alias that.")]
    Reserved(String),
    #[error("alias: {0} not found")]
    NotFound(String),
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("unalias: Incorrect number of arguments.")]
    UnaliasArgs,
    #[error("Fork failed")]
    Fork(#[source] io::Error),
    #[error("Cannot write to file {0}.")]
    Redirect(String),
    #[error("{0}: Command not found.")]
    NotFound(String),
    #[error(transparent)]
    Alias(#[from] AliasError),
    /// Writing to the shell's own output failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}
