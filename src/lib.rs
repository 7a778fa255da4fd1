//! A minimal line-oriented shell.
//!
//! Each line is split on whitespace, may carry a single `>` output
//! redirection, and is either handled by one of the builtins (`alias`,
//! `unalias`, `exit`) or run as an external program in a child process. The
//! shell waits for every child before reading the next line.
//!
//! The main entry point is [`Interpreter`], which owns the alias table of a
//! session and runs lines from a terminal ([`Interpreter::repl`]) or from a
//! script ([`Interpreter::run_batch`]). The [`parser`] module can be used on
//! its own to split a line into a [`ParsedCommand`].

pub mod alias;
mod builtin;
pub mod command;
pub mod config;
pub mod error;
mod external;
mod interpreter;
pub mod io_adapters;
pub mod parser;

pub use alias::AliasTable;
pub use command::{Flow, ParsedCommand, Redirect};
pub use config::Config;
/// Just a convenient re-export of the interactive command runner.
///
/// See [`Interpreter`] for the high-level API and examples.
pub use interpreter::Interpreter;
