//! Splitting of a raw command line into tokens and an optional output redirect.
//!
//! Only two pieces of syntax are understood: whitespace separates tokens and a
//! single `>` introduces the file that receives standard output. The `>` may
//! stand alone (`ls > out`) or be glued to its neighbours (`ls >out`,
//! `ls> out`, `ls>out`).

use crate::command::{ParsedCommand, Redirect};
use crate::error::ParseError;

/// The output redirection marker.
pub const REDIRECT_MARKER: char = '>';

/// Where the marker sits inside the token that contains it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MarkerPosition {
    /// The token is exactly `>`.
    Standalone,
    /// `>file`
    Prefix,
    /// `cmd>`
    Suffix,
    /// `cmd>file`, with the byte offset of the marker.
    Infix(usize),
}

impl MarkerPosition {
    fn of(token: &str) -> Option<Self> {
        let at = token.find(REDIRECT_MARKER)?;
        Some(if token.len() == 1 {
            MarkerPosition::Standalone
        } else if at == 0 {
            MarkerPosition::Prefix
        } else if at == token.len() - 1 {
            MarkerPosition::Suffix
        } else {
            MarkerPosition::Infix(at)
        })
    }
}

/// Parse a raw line, reporting why it can not be executed.
///
/// Tabs count as spaces and everything from the first newline on is ignored.
pub fn parse_line(line: &str) -> Result<ParsedCommand, ParseError> {
    let content = normalize(line);
    let has_marker = check_marker(&content)?;

    let mut tokens: Vec<String> = content
        .split(' ')
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect();

    let redirect = if has_marker {
        Redirect::ToFile(detach_target(&mut tokens)?)
    } else {
        Redirect::None
    };

    if tokens.is_empty() {
        // `> x` with nothing to run is a broken redirect, not a blank line.
        return Err(match redirect {
            Redirect::None => ParseError::Empty,
            _ => ParseError::Misformatted,
        });
    }

    Ok(ParsedCommand {
        tokens,
        valid: true,
        redirect,
    })
}

/// Parse a raw line into a [`ParsedCommand`] whose `valid` flag says whether
/// it may be executed.
pub fn parse(line: &str) -> ParsedCommand {
    match parse_line(line) {
        Ok(command) => command,
        Err(ParseError::Misformatted) => ParsedCommand::malformed(),
        Err(ParseError::Empty) => ParsedCommand::default(),
    }
}

fn normalize(line: &str) -> String {
    let content = match line.find('\n') {
        Some(end) => &line[..end],
        None => line,
    };
    content.replace('\t', " ")
}

/// Whole-line checks done before tokenizing: the marker may appear at most
/// once and neither as the first nor as the last character.
fn check_marker(content: &str) -> Result<bool, ParseError> {
    let Some(first) = content.find(REDIRECT_MARKER) else {
        return Ok(false);
    };
    let last = content.rfind(REDIRECT_MARKER).unwrap_or(first);
    if first == 0 || first != last || first + 1 == content.len() {
        return Err(ParseError::Misformatted);
    }
    Ok(true)
}

/// Remove the marker and the redirect target from `tokens`, returning the target.
///
/// The target must end up as exactly one token at the end of the line.
fn detach_target(tokens: &mut Vec<String>) -> Result<String, ParseError> {
    let (index, position) = tokens
        .iter()
        .enumerate()
        .find_map(|(i, token)| MarkerPosition::of(token).map(|pos| (i, pos)))
        .ok_or(ParseError::Misformatted)?;
    let last = tokens.len() - 1;

    match position {
        MarkerPosition::Standalone | MarkerPosition::Suffix => {
            if index + 1 != last {
                return Err(ParseError::Misformatted);
            }
            let target = tokens.pop().ok_or(ParseError::Misformatted)?;
            if position == MarkerPosition::Standalone {
                tokens.pop();
            } else {
                tokens[index].pop();
            }
            Ok(target)
        }
        MarkerPosition::Prefix => {
            if index != last {
                return Err(ParseError::Misformatted);
            }
            let token = tokens.pop().ok_or(ParseError::Misformatted)?;
            Ok(token[1..].to_string())
        }
        MarkerPosition::Infix(at) => {
            if index != last {
                return Err(ParseError::Misformatted);
            }
            let target = tokens[index].split_off(at + 1);
            tokens[index].truncate(at);
            Ok(target)
        }
    }
}
