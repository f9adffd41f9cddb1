//! Console output and the interactive line editor

use core::fmt;

use crate::hal::Transport;

/// Prompt printed before every interactive line
pub const PROMPT: &str = "> ";

const BACKSPACE: u8 = 0x08;
const DELETE: u8 = 0x7f;
/// ^U: discard the whole line
const KILL_LINE: u8 = 0x15;
/// ^L: clear the screen and redraw
const FORM_FEED: u8 = 0x0c;

/// Visual erase of the character left of the cursor
const RUBOUT: &str = "\x08 \x08";
const CLEAR_SCREEN: &str = "\x1b[H\x1b[J";

/// Text console on top of a [`Transport`]
///
/// Output converts `\n` into `\r\n`. Formatted output goes through the
/// inherent `write_fmt`, so `write!(console, ...)` works without a result
/// to discard.
pub struct Console<T> {
    transport: T,
}

impl<T: Transport> Console<T> {
    /// Wrap a transport
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Access the underlying transport
    pub fn transport(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Give back the underlying transport
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Print one byte, expanding LF to CRLF
    pub fn putc(&mut self, c: u8) {
        if c == b'\n' {
            self.transport.send(b'\r');
        }
        self.transport.send(c);
    }

    /// Print a string
    pub fn puts(&mut self, s: &str) {
        self.put_bytes(s.as_bytes());
    }

    /// Print raw bytes
    pub fn put_bytes(&mut self, bytes: &[u8]) {
        for &c in bytes {
            self.putc(c);
        }
    }

    /// Print a string followed by a newline
    pub fn println(&mut self, s: &str) {
        self.puts(s);
        self.putc(b'\n');
    }

    /// Print formatted output
    pub fn write_fmt(&mut self, args: fmt::Arguments<'_>) {
        let _ = fmt::Write::write_fmt(&mut Writer(self), args);
    }

    /// Read one line with basic editing into `line`
    ///
    /// The result is NUL-terminated and its length (without the NUL) is
    /// returned. At most `line.len() - 1` characters are accepted; further
    /// printable input is dropped silently.
    pub fn read_line(&mut self, line: &mut [u8]) -> usize {
        debug_assert!(!line.is_empty());
        let limit = line.len().saturating_sub(1);
        let mut cursor = 0;

        self.redraw(&line[..cursor]);
        loop {
            let c = self.transport.receive();
            match c {
                BACKSPACE | DELETE => {
                    if cursor > 0 {
                        cursor -= 1;
                        self.puts(RUBOUT);
                    }
                }
                KILL_LINE => {
                    while cursor > 0 {
                        cursor -= 1;
                        self.puts(RUBOUT);
                    }
                }
                FORM_FEED => {
                    self.puts(CLEAR_SCREEN);
                    self.redraw(&line[..cursor]);
                }
                b'\n' | b'\r' => {
                    if let Some(end) = line.get_mut(cursor) {
                        *end = 0;
                    }
                    self.putc(b'\n');
                    return cursor;
                }
                c if c < 0x20 => {}
                c => {
                    if cursor < limit {
                        line[cursor] = c;
                        cursor += 1;
                        self.putc(c);
                    }
                }
            }
        }
    }

    fn redraw(&mut self, pending: &[u8]) {
        self.puts(PROMPT);
        self.put_bytes(pending);
    }
}

struct Writer<'c, T>(&'c mut Console<T>);

impl<T: Transport> fmt::Write for Writer<'_, T> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.puts(s);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Transport fed from a fixed input, recording everything sent
    pub(crate) struct FakeTransport {
        input: heapless::Deque<u8, 512>,
        pub(crate) output: heapless::Vec<u8, 4096>,
    }

    impl FakeTransport {
        pub(crate) fn new(input: &[u8]) -> Self {
            let mut queue = heapless::Deque::new();
            for &b in input {
                queue.push_back(b).unwrap();
            }
            Self {
                input: queue,
                output: heapless::Vec::new(),
            }
        }

        pub(crate) fn output_str(&self) -> &str {
            core::str::from_utf8(&self.output).unwrap()
        }
    }

    impl Transport for FakeTransport {
        fn send(&mut self, byte: u8) {
            self.output.push(byte).unwrap();
        }

        fn receive(&mut self) -> u8 {
            self.input.pop_front().expect("test input exhausted")
        }

        fn can_receive(&mut self) -> bool {
            !self.input.is_empty()
        }
    }

    fn edit(input: &[u8]) -> (heapless::String<64>, heapless::String<512>) {
        let mut console = Console::new(FakeTransport::new(input));
        let mut line = [0xAAu8; 16];
        let len = console.read_line(&mut line);
        assert_eq!(line[len], 0);
        let mut text = heapless::String::new();
        text.push_str(core::str::from_utf8(&line[..len]).unwrap())
            .unwrap();
        let mut echo = heapless::String::new();
        echo.push_str(console.transport().output_str()).unwrap();
        (text, echo)
    }

    #[test]
    fn test_putc_expands_newline() {
        let mut console = Console::new(FakeTransport::new(b""));
        console.println("ok");
        write!(console, "{:02x}", 0x5a);
        assert_eq!(console.transport().output_str(), "ok\r\n5a");
    }

    #[test]
    fn test_plain_line() {
        let (text, echo) = edit(b"rb 1000\r");
        assert_eq!(text.as_str(), "rb 1000");
        assert_eq!(echo.as_str(), "> rb 1000\r\n");
    }

    #[test]
    fn test_line_feed_terminates() {
        let (text, _) = edit(b"help\n");
        assert_eq!(text.as_str(), "help");
    }

    #[test]
    fn test_backspace_and_delete() {
        let (text, echo) = edit(b"ab\x08c\x7f\x7f\x7fd\r");
        assert_eq!(text.as_str(), "d");
        // The last DEL arrives on an empty line and is ignored
        assert_eq!(echo.matches(RUBOUT).count(), 3);
    }

    #[test]
    fn test_kill_line() {
        let (text, echo) = edit(b"abc\x15xy\r");
        assert_eq!(text.as_str(), "xy");
        assert_eq!(echo.matches(RUBOUT).count(), 3);
    }

    #[test]
    fn test_clear_screen_keeps_buffer() {
        let (text, echo) = edit(b"ab\x0cc\r");
        assert_eq!(text.as_str(), "abc");
        assert_eq!(echo.as_str(), "> ab\x1b[H\x1b[J> abc\r\n");
    }

    #[test]
    fn test_control_bytes_ignored() {
        let (text, echo) = edit(b"a\x01\x1b\x02b\r");
        assert_eq!(text.as_str(), "ab");
        assert_eq!(echo.as_str(), "> ab\r\n");
    }

    #[test]
    fn test_high_bytes_kept() {
        let mut console = Console::new(FakeTransport::new(b"a\xe9\xffb\r"));
        let mut line = [0u8; 16];
        let len = console.read_line(&mut line);
        assert_eq!(&line[..=len], b"a\xe9\xffb\0");
        assert_eq!(&console.transport().output[..], &b"> a\xe9\xffb\r\n"[..]);
    }

    #[test]
    fn test_full_buffer_drops_input() {
        let (text, _) = edit(b"0123456789abcdefghij\r");
        // 16 byte buffer keeps 15 characters plus the NUL
        assert_eq!(text.as_str(), "0123456789abcde");
    }
}
