//! Monitor lifecycle: startup, the interactive loop and exception re-entry

use crate::config::MonitorConfig;
use crate::console::Console;
use crate::hal::{Board, FlashController, Peripherals, Timer, Transport, Watchdog};
use crate::script::Script;
use crate::shell::{tokenize, LINE_CAPACITY};

/// Greeting printed at startup
pub const BANNER: &str = "Welcome to lolmon";

const AUTOBOOT_NOTICE: &str = "Press any key to avoid running the default boot script";

const EXCEPTION_NAMES: [&str; 8] = [
    "Reset",
    "Undefined",
    "SWI",
    "Prefetch abort",
    "Data abort",
    "reserved",
    "IRQ",
    "FIQ",
];

/// Symbolic name of an exception vector offset
///
/// Vectors are the byte offsets of the ARM vector table (`0x00`, `0x04`,
/// ... `0x1c`); only bits 2..5 are significant.
pub fn exception_name(vector: u32) -> &'static str {
    EXCEPTION_NAMES[((vector >> 2) & 7) as usize]
}

/// The debug monitor
///
/// Owns every collaborator of its [`Board`]. `'s` is the lifetime of the
/// linked-in boot script.
pub struct Monitor<'s, B: Board> {
    pub(crate) console: Console<B::Transport>,
    pub(crate) timer: B::Timer,
    pub(crate) watchdog: B::Watchdog,
    pub(crate) memory: B::Memory,
    pub(crate) flash: B::Flash,
    pub(crate) cpu: B::Cpu,
    pub(crate) config: MonitorConfig,
    pub(crate) boot_script: &'s [u8],
    pub(crate) depth: usize,
}

impl<'s, B: Board> Monitor<'s, B> {
    /// Assemble a monitor from a board's peripherals
    pub fn new(peripherals: Peripherals<B>, config: MonitorConfig, boot_script: &'s [u8]) -> Self {
        Self {
            console: Console::new(peripherals.transport),
            timer: peripherals.timer,
            watchdog: peripherals.watchdog,
            memory: peripherals.memory,
            flash: peripherals.flash,
            cpu: peripherals.cpu,
            config,
            boot_script,
            depth: 0,
        }
    }

    /// Take the monitor apart again
    pub fn into_peripherals(self) -> Peripherals<B> {
        Peripherals {
            transport: self.console.into_inner(),
            timer: self.timer,
            watchdog: self.watchdog,
            memory: self.memory,
            flash: self.flash,
            cpu: self.cpu,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// The console
    pub fn console(&mut self) -> &mut Console<B::Transport> {
        &mut self.console
    }

    /// The raw address space
    pub fn memory(&mut self) -> &mut B::Memory {
        &mut self.memory
    }

    /// The flash controller
    pub fn flash(&mut self) -> &mut B::Flash {
        &mut self.flash
    }

    /// The CPU primitives
    pub fn cpu(&mut self) -> &mut B::Cpu {
        &mut self.cpu
    }

    /// The watchdog
    pub fn watchdog(&mut self) -> &mut B::Watchdog {
        &mut self.watchdog
    }

    /// The countdown timer
    pub fn timer(&mut self) -> &mut B::Timer {
        &mut self.timer
    }

    /// Boot, then serve the shell forever
    pub fn start(mut self) -> ! {
        self.boot();
        self.run()
    }

    /// Startup sequence
    ///
    /// Disables the watchdog, brings up the transport and the flash
    /// controller, greets the operator and runs the boot script unless a
    /// key arrives within the configured key-wait. The key itself is left
    /// in the transport and becomes the first input of the shell. With
    /// autoboot off the boot script is only run on request (`boot`).
    pub fn boot(&mut self) {
        self.watchdog.disable();
        self.console.transport().init();
        self.flash.init();

        self.console.println(BANNER);
        if !self.config.autoboot {
            log::info!("autoboot disabled");
            return;
        }
        self.console.println(AUTOBOOT_NOTICE);

        if self.wait_for_key(self.config.key_wait_us) {
            log::info!("autoboot interrupted");
            return;
        }

        let script = Script::Bytes(self.boot_script);
        if let Err(err) = self.source(script) {
            writeln!(self.console, "{}", err);
        }
    }

    /// Wait up to `us` microseconds for input
    ///
    /// Returns `true` as soon as a byte is available, `false` once the
    /// timer elapses first.
    pub fn wait_for_key(&mut self, us: u32) -> bool {
        self.timer.start(us);
        loop {
            if self.console.transport().can_receive() {
                return true;
            }
            if self.timer.elapsed() {
                return false;
            }
        }
    }

    /// Serve the interactive shell forever
    pub fn run(&mut self) -> ! {
        loop {
            self.step();
        }
    }

    /// Read and execute one interactive line
    pub fn step(&mut self) {
        let mut line = [0u8; LINE_CAPACITY];
        self.console.read_line(&mut line);
        self.execute_line(&mut line);
    }

    /// Tokenize and dispatch one NUL-terminated line, printing any error
    ///
    /// The line buffer is modified in place.
    pub fn execute_line(&mut self, line: &mut [u8]) {
        let args = tokenize(line);
        if args.is_empty() {
            return;
        }
        if let Err(err) = self.dispatch(&args) {
            log::debug!("{} failed: {:?}", args.name(), err);
            writeln!(self.console, "{}", err);
        }
    }

    /// Print the report for an exception taken at `vector`
    pub fn report_exception(&mut self, vector: u32) {
        log::error!("exception {:#04x} ({})", vector, exception_name(vector));
        writeln!(self.console, "\nException {:02x}, {}", vector, exception_name(vector));
    }

    /// Report an exception and fall back into the shell
    ///
    /// Script nesting is abandoned; the stack it lived on is gone.
    pub fn handle_exception(&mut self, vector: u32) -> ! {
        self.depth = 0;
        self.report_exception(vector);
        self.run()
    }
}
