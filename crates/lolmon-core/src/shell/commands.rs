//! Command handlers
//!
//! Each handler validates its own arguments. Nothing is changed before
//! validation passes, except for `wb`/`wh`/`ww`, which write values as
//! they are parsed and stop at the first malformed one.

use super::{find_command, Args, CommandKind, COMMANDS};
use crate::error::{CommandResult, ShellError};
use crate::flash::{self, VerifyPolicy};
use crate::hal::{Board, Cpu, Watchdog};
use crate::memory::{self, Width};
use crate::monitor::Monitor;
use crate::script::Script;

impl<B: Board> Monitor<'_, B> {
    /// Look up `args[0]` and run its handler
    pub fn dispatch<'a>(&mut self, args: &Args<'a>) -> CommandResult<'a> {
        let name = args.name();
        let command = find_command(name).ok_or(ShellError::UnknownCommand(name))?;
        log::trace!("dispatch {:?}", args.as_slice());

        match command.kind {
            CommandKind::Help => self.cmd_help(args),
            CommandKind::Echo => self.cmd_echo(args),
            CommandKind::Read => self.cmd_read(args),
            CommandKind::Write => self.cmd_write(args),
            CommandKind::Copy => self.cmd_copy(args),
            CommandKind::Flash => self.cmd_flash(args),
            CommandKind::Barrier => self.cmd_barrier(args),
            CommandKind::Call => self.cmd_call(args),
            CommandKind::Source => self.cmd_source(args),
            CommandKind::Reset => self.cmd_reset(args),
            CommandKind::Boot => self.cmd_boot(args),
        }
    }

    fn cmd_help<'a>(&mut self, args: &Args<'a>) -> CommandResult<'a> {
        if args.len() < 2 {
            for command in COMMANDS {
                writeln!(self.console, "{} - {}", command.name(), command.description);
            }
            return Ok(());
        }

        for &name in args.rest() {
            let command = find_command(name).ok_or(ShellError::UnknownCommand(name))?;
            writeln!(self.console, "{} - {}", name, command.description);
            writeln!(self.console, "Usage: {} {}", name, command.usage);
        }
        Ok(())
    }

    fn cmd_echo<'a>(&mut self, args: &Args<'a>) -> CommandResult<'a> {
        for word in args.rest() {
            self.console.puts(word);
            self.console.putc(b' ');
        }
        self.console.putc(b'\n');
        Ok(())
    }

    fn cmd_read<'a>(&mut self, args: &Args<'a>) -> CommandResult<'a> {
        let width = Width::from_command(args.name()).ok_or(ShellError::Usage)?;
        let count = match args.len() {
            2 => 1,
            3 => args.number(2, 0)?,
            _ => return Err(ShellError::Usage),
        };
        let addr = args.number(1, 16)?;

        memory::dump(&mut self.memory, &mut self.console, width, addr, count);
        Ok(())
    }

    fn cmd_write<'a>(&mut self, args: &Args<'a>) -> CommandResult<'a> {
        let width = Width::from_command(args.name()).ok_or(ShellError::Usage)?;
        if args.len() < 3 {
            return Err(ShellError::Usage);
        }
        let mut addr = args.number(1, 16)?;

        for index in 2..args.len() {
            let value = args.number(index, 0)?;
            width.write(&mut self.memory, addr, value);
            addr = addr.wrapping_add(width.bytes());
        }
        Ok(())
    }

    fn cmd_copy<'a>(&mut self, args: &Args<'a>) -> CommandResult<'a> {
        let width = Width::from_command(args.name()).ok_or(ShellError::Usage)?;
        if args.len() != 4 {
            return Err(ShellError::Usage);
        }
        let src = args.number(1, 16)?;
        let dest = args.number(2, 16)?;
        let count = args.number(3, 0)?;

        memory::copy(&mut self.memory, width, src, dest, count);
        Ok(())
    }

    fn cmd_flash<'a>(&mut self, args: &Args<'a>) -> CommandResult<'a> {
        if args.len() != 4 {
            return Err(ShellError::Usage);
        }
        let src = args.number(1, 16)?;
        let dest = args.number(2, 16)?;
        let count = args.number(3, 0)?;

        if let Err(err) = flash::check_range(dest, count) {
            log::debug!("fl rejected: {}", err);
            return Err(ShellError::Usage);
        }

        let options = self.config.flash_options();
        // With Abort the failure comes back as the command error instead
        let report = options.verify == VerifyPolicy::Continue;
        let console = &mut self.console;
        let stats = flash::program(
            &mut self.memory,
            &mut self.flash,
            src,
            dest,
            count,
            &options,
            |err| {
                if report {
                    writeln!(console, "{}", err);
                }
            },
        )?;

        writeln!(
            self.console,
            "Flashed {} bytes: {} erases, {} byte programs, {} mismatches",
            count,
            stats.erases,
            stats.programs,
            stats.mismatches
        );
        Ok(())
    }

    fn cmd_barrier<'a>(&mut self, args: &Args<'a>) -> CommandResult<'a> {
        if args.len() != 1 {
            return Err(ShellError::Usage);
        }
        self.cpu.instruction_barrier();
        Ok(())
    }

    fn cmd_call<'a>(&mut self, args: &Args<'a>) -> CommandResult<'a> {
        if !(2..=5).contains(&args.len()) {
            return Err(ShellError::Usage);
        }
        let addr = args.number(1, 16)?;
        let mut params = [0u32; 3];
        for (i, param) in params.iter_mut().enumerate() {
            if args.get(2 + i).is_some() {
                *param = args.number(2 + i, 0)?;
            }
        }

        self.cpu.instruction_barrier();
        let ret = self.cpu.call(addr, params);
        log::debug!("call {:#010x}{:x?} returned {:#x}", addr, params, ret);
        Ok(())
    }

    fn cmd_source<'a>(&mut self, args: &Args<'a>) -> CommandResult<'a> {
        if args.len() != 2 {
            return Err(ShellError::Usage);
        }
        let addr = args.number(1, 16)?;
        self.source(Script::Memory(addr))?;
        Ok(())
    }

    fn cmd_reset<'a>(&mut self, args: &Args<'a>) -> CommandResult<'a> {
        if args.len() != 1 {
            return Err(ShellError::Usage);
        }
        log::info!("watchdog reset requested");
        self.watchdog.reset();
        Ok(())
    }

    fn cmd_boot<'a>(&mut self, args: &Args<'a>) -> CommandResult<'a> {
        if args.len() != 1 {
            return Err(ShellError::Usage);
        }
        let script = Script::Bytes(self.boot_script);
        self.source(script)?;
        Ok(())
    }
}
