//! Script sources and line splitting
//!
//! Scripts are NUL-terminated text with `\n` or `\r` line endings. They are
//! either a byte slice bound into the image (the boot script) or a
//! location in the monitored address space (`src addr`).

use crate::error::ShellError;
use crate::hal::{Board, Memory};
use crate::monitor::Monitor;
use crate::shell::LINE_CAPACITY;

/// Where a script's text comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script<'s> {
    /// Text in a slice; the end of the slice acts as a NUL
    Bytes(&'s [u8]),
    /// Text in the monitored address space, read one byte at a time
    Memory(u32),
}

impl Script<'_> {
    /// Byte at `index`, or `0` past the end of a slice
    pub fn byte_at<M: Memory + ?Sized>(&self, memory: &mut M, index: u32) -> u8 {
        match *self {
            Self::Bytes(text) => text.get(index as usize).copied().unwrap_or(0),
            Self::Memory(base) => memory.read8(base.wrapping_add(index)),
        }
    }
}

/// Outcome of feeding a byte to a [`LineSplitter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEvent {
    /// A complete line is available from [`LineSplitter::line_mut`]
    Line,
    /// A line overflowed the buffer; its start is available from
    /// [`LineSplitter::truncated`]
    TooLong,
}

/// Splits a byte stream into bounded, NUL-terminated lines
pub struct LineSplitter {
    buf: [u8; LINE_CAPACITY],
    pos: usize,
    last: usize,
}

impl Default for LineSplitter {
    fn default() -> Self {
        Self::new()
    }
}

impl LineSplitter {
    /// Create an empty splitter
    pub const fn new() -> Self {
        Self {
            buf: [0; LINE_CAPACITY],
            pos: 0,
            last: 0,
        }
    }

    /// Feed one non-NUL byte
    pub fn push(&mut self, c: u8) -> Option<LineEvent> {
        match c {
            b'\n' | b'\r' => Some(self.end_line()),
            c => {
                // Excess characters are dropped until the line ends
                if self.pos < LINE_CAPACITY {
                    self.buf[self.pos] = c;
                    self.pos += 1;
                }
                None
            }
        }
    }

    /// Signal the end of the script, flushing an unterminated last line
    pub fn finish(&mut self) -> Option<LineEvent> {
        (self.pos > 0).then(|| self.end_line())
    }

    fn end_line(&mut self) -> LineEvent {
        let event = if self.pos < LINE_CAPACITY {
            self.buf[self.pos] = 0;
            self.last = self.pos + 1;
            LineEvent::Line
        } else {
            self.buf[LINE_CAPACITY - 1] = 0;
            self.last = LINE_CAPACITY - 1;
            LineEvent::TooLong
        };
        self.pos = 0;
        event
    }

    /// The last complete line, including its NUL terminator
    pub fn line_mut(&mut self) -> &mut [u8] {
        &mut self.buf[..self.last]
    }

    /// The retained start of the last overlong line, without terminator
    pub fn truncated(&self) -> &[u8] {
        &self.buf[..self.last]
    }
}

impl<B: Board> Monitor<'_, B> {
    /// Run every line of `script` through the dispatcher
    ///
    /// Overlong lines are reported and skipped. Nesting beyond the
    /// configured depth fails without running anything.
    pub fn source(&mut self, script: Script<'_>) -> Result<(), ShellError<'static>> {
        if self.depth >= self.config.max_script_depth {
            log::warn!("script nesting limit {} reached", self.config.max_script_depth);
            return Err(ShellError::ScriptTooDeep);
        }
        self.depth += 1;
        log::debug!("sourcing {:?} at depth {}", script, self.depth);

        let mut splitter = LineSplitter::new();
        let mut index = 0u32;
        loop {
            let c = script.byte_at(&mut self.memory, index);
            let event = if c == 0 {
                splitter.finish()
            } else {
                splitter.push(c)
            };

            match event {
                Some(LineEvent::Line) => self.execute_line(splitter.line_mut()),
                Some(LineEvent::TooLong) => {
                    self.console.puts("Line too long: ");
                    self.console.put_bytes(splitter.truncated());
                    self.console.putc(b'\n');
                }
                None => {}
            }

            if c == 0 {
                break;
            }
            index = index.wrapping_add(1);
        }

        self.depth -= 1;
        Ok(())
    }
}
