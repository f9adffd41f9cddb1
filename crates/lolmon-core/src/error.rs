//! Error types for lolmon-core
//!
//! Every error ends up as one printed diagnostic line on the console; the
//! `Display` implementations are the operator-visible text.

use core::fmt;

/// Flash programming failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashError {
    /// Destination is not aligned to a 4 KiB page
    Unaligned {
        /// Requested destination offset
        dest: u32,
    },
    /// `[dest, dest + count)` leaves the flash address space
    OutOfRange {
        /// Requested destination offset
        dest: u32,
        /// Requested byte count
        count: u32,
    },
    /// The write-in-progress bit did not clear within the configured poll limit
    Timeout {
        /// Flash offset of the operation being waited on
        addr: u32,
    },
    /// Read-back after programming did not match (only returned when the
    /// verify policy is `Abort`)
    VerifyFailed {
        /// Flash offset of the mismatching byte
        addr: u32,
        /// Value that was programmed
        expected: u8,
        /// Value read back
        actual: u8,
    },
}

impl fmt::Display for FlashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unaligned { dest } => {
                write!(f, "flash destination {:08x} is not 4 KiB aligned", dest)
            }
            Self::OutOfRange { dest, count } => {
                write!(f, "flash range {:08x}+{:x} out of bounds", dest, count)
            }
            Self::Timeout { addr } => write!(f, "flash busy timeout at {:08x}", addr),
            Self::VerifyFailed {
                addr,
                expected,
                actual,
            } => write!(
                f,
                "Verify error at {:08x}: expected {:02x}, got {:02x}",
                addr, expected, actual
            ),
        }
    }
}

/// Failure of a single shell command
///
/// Borrowed variants point into the tokenized line that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellError<'a> {
    /// Wrong number or shape of arguments
    Usage,
    /// Malformed numeric literal
    InvalidNumber(&'a str),
    /// No registry entry matches the name
    UnknownCommand(&'a str),
    /// `src`/`boot` nested deeper than the configured limit
    ScriptTooDeep,
    /// The flash engine gave up
    Flash(FlashError),
}

impl From<FlashError> for ShellError<'_> {
    fn from(err: FlashError) -> Self {
        Self::Flash(err)
    }
}

impl fmt::Display for ShellError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Usage => write!(f, "Usage error"),
            Self::InvalidNumber(token) => write!(f, "Invalid number {}", token),
            Self::UnknownCommand(name) => write!(f, "Unknown command {}", name),
            Self::ScriptTooDeep => write!(f, "Script nesting too deep"),
            Self::Flash(err) => write!(f, "{}", err),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FlashError {}

#[cfg(feature = "std")]
impl std::error::Error for ShellError<'_> {}

/// Result of a shell command
pub type CommandResult<'a> = core::result::Result<(), ShellError<'a>>;
