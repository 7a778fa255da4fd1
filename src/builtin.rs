//! Commands handled inside the shell process: `alias` and `unalias`.
//!
//! `exit` has no body; the dispatcher turns it into [`crate::Flow::Exit`].

use crate::alias::AliasTable;
use crate::error::{AliasError, DispatchError};
use log::debug;
use std::io::Write;

/// `alias [NAME [COMMAND...]]`
///
/// - no arguments: print every alias as `name command`, oldest first;
/// - `NAME`: print that alias, or nothing when it does not exist;
/// - `NAME COMMAND...`: define `NAME`, joining the command words with single spaces.
pub(crate) fn alias(
    table: &mut AliasTable,
    args: &[String],
    stdout: &mut dyn Write,
) -> Result<(), DispatchError> {
    match args {
        [] => {
            for (name, command) in table.list() {
                writeln!(stdout, "{name} {command}")?;
            }
        }
        [name] => {
            if let Some(command) = table.lookup(name) {
                writeln!(stdout, "{name} {command}")?;
            }
        }
        [name, words @ ..] => table.add(name.as_str(), words.join(" "))?,
    }
    stdout.flush()?;
    Ok(())
}

/// `unalias NAME`
///
/// Removing an alias that does not exist is not an error.
pub(crate) fn unalias(table: &mut AliasTable, args: &[String]) -> Result<(), DispatchError> {
    let [name] = args else {
        return Err(DispatchError::UnaliasArgs);
    };
    match table.remove(name) {
        Ok(_) | Err(AliasError::NotFound(_)) => Ok(()),
        Err(e) => {
            debug!("unalias {name}: {e}");
            Err(e.into())
        }
    }
}
