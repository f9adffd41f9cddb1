//! Command shell: argument lists, tokenizer, number parsing and the
//! command registry
//!
//! The command handlers themselves live in [`commands`] as methods on
//! [`Monitor`](crate::Monitor), since they need the board collaborators.

mod commands;
mod number;
mod registry;
mod tokenize;

pub use number::parse_int;
pub use registry::{find_command, Command, CommandKind, COMMANDS, NAME_LEN};
pub use tokenize::{tokenize, COMMENT};

use crate::error::ShellError;

/// Maximum number of words kept from one line
pub const MAX_ARGS: usize = 16;

/// Capacity of the interactive and script line buffers, including the NUL
pub const LINE_CAPACITY: usize = 128;

/// Tokenized argument list, borrowing from the line buffer
#[derive(Debug, Clone, Default)]
pub struct Args<'a> {
    argv: heapless::Vec<&'a str, MAX_ARGS>,
}

impl<'a> Args<'a> {
    /// Create an empty list
    pub fn new() -> Self {
        Self {
            argv: heapless::Vec::new(),
        }
    }

    /// Append a word, dropping it if the list is full
    pub fn push(&mut self, word: &'a str) {
        let _ = self.argv.push(word);
    }

    /// Number of words, including the command name
    pub fn len(&self) -> usize {
        self.argv.len()
    }

    /// Return `true` if the line held no words
    pub fn is_empty(&self) -> bool {
        self.argv.is_empty()
    }

    /// Word at `index`
    pub fn get(&self, index: usize) -> Option<&'a str> {
        self.argv.get(index).copied()
    }

    /// The command name (first word), or `""` for an empty list
    pub fn name(&self) -> &'a str {
        self.get(0).unwrap_or("")
    }

    /// All words
    pub fn as_slice(&self) -> &[&'a str] {
        &self.argv
    }

    /// Words after the command name
    pub fn rest(&self) -> &[&'a str] {
        self.argv.get(1..).unwrap_or(&[])
    }

    /// Parse the word at `index` as a number in `radix` (`0` auto-detects)
    ///
    /// A missing word is a usage error, a malformed one an invalid number.
    pub fn number(&self, index: usize, radix: u32) -> Result<u32, ShellError<'a>> {
        let word = self.get(index).ok_or(ShellError::Usage)?;
        parse_int(word, radix).ok_or(ShellError::InvalidNumber(word))
    }
}
