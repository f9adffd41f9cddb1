//! The immutable command table

/// Fixed width of a command name field
pub const NAME_LEN: usize = 4;

/// Which handler a registry entry dispatches to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// `help [command]`
    Help,
    /// `echo [words]`
    Echo,
    /// `rb`/`rh`/`rw`
    Read,
    /// `wb`/`wh`/`ww`
    Write,
    /// `cb`/`ch`/`cw`
    Copy,
    /// `fl src dest count`
    Flash,
    /// `imb`
    Barrier,
    /// `call addr [args]`
    Call,
    /// `src addr`
    Source,
    /// `rst`
    Reset,
    /// `boot`
    Boot,
}

/// One registry entry
#[derive(Debug, Clone, Copy)]
pub struct Command {
    name: [u8; NAME_LEN],
    /// Argument synopsis shown by `help`
    pub usage: &'static str,
    /// One-line description shown by `help`
    pub description: &'static str,
    /// Handler selector
    pub kind: CommandKind,
}

/// Pack a name into a NUL-padded fixed-width field
///
/// Returns `None` for names longer than [`NAME_LEN`].
const fn pack(name: &str) -> Option<[u8; NAME_LEN]> {
    let bytes = name.as_bytes();
    if bytes.len() > NAME_LEN {
        return None;
    }
    let mut field = [0u8; NAME_LEN];
    let mut i = 0;
    while i < bytes.len() {
        field[i] = bytes[i];
        i += 1;
    }
    Some(field)
}

impl Command {
    const fn new(
        name: &str,
        usage: &'static str,
        description: &'static str,
        kind: CommandKind,
    ) -> Self {
        let name = match pack(name) {
            Some(field) => field,
            None => panic!("command name longer than NAME_LEN"),
        };
        Self {
            name,
            usage,
            description,
            kind,
        }
    }

    /// The command name without padding
    pub fn name(&self) -> &str {
        let len = self
            .name
            .iter()
            .position(|&c| c == 0)
            .unwrap_or(NAME_LEN);
        core::str::from_utf8(&self.name[..len]).unwrap_or_default()
    }
}

/// All commands, in `help` order
pub static COMMANDS: &[Command] = &[
    Command::new("help", "[command]", "Show help output for one or all commands", CommandKind::Help),
    Command::new("echo", "[words]", "Echo a few words", CommandKind::Echo),
    Command::new("rb", "address [count]", "Read one or more bytes", CommandKind::Read),
    Command::new("rh", "address [count]", "Read one or more half-words (16-bit)", CommandKind::Read),
    Command::new("rw", "address [count]", "Read one or more words (32-bit)", CommandKind::Read),
    Command::new("wb", "address values", "Write one or more bytes", CommandKind::Write),
    Command::new("wh", "address values", "Write one or more half-words (16-bit)", CommandKind::Write),
    Command::new("ww", "address values", "Write one or more words (32-bit)", CommandKind::Write),
    Command::new("cb", "source destination count", "Copy one or more bytes", CommandKind::Copy),
    Command::new("ch", "source destination count", "Copy one or more half-words (16-bit)", CommandKind::Copy),
    Command::new("cw", "source destination count", "Copy one or more words (32-bit)", CommandKind::Copy),
    Command::new("fl", "source destination count", "Write to SPI flash (destination 4 KiB aligned)", CommandKind::Flash),
    Command::new("imb", "", "Instruction memory barrier", CommandKind::Barrier),
    Command::new("call", "address [up to 3 args]", "Call a function by address", CommandKind::Call),
    Command::new("src", "address", "Source/run script at address", CommandKind::Source),
    Command::new("rst", "", "Perform a system reset", CommandKind::Reset),
    Command::new("boot", "", "Continue with the usual boot flow", CommandKind::Boot),
];

/// Look up a command by exact name
///
/// Names longer than [`NAME_LEN`] never match. Shorter names are padded
/// with NUL and compared over the whole field, so `rw` and `rww` are
/// distinct.
pub fn find_command(name: &str) -> Option<&'static Command> {
    let key = pack(name)?;
    COMMANDS.iter().find(|cmd| cmd.name == key)
}
