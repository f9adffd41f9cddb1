//! `log` backend writing to UART0

use lolmon_core::console::Console;
use log::{LevelFilter, Log, Metadata, Record};

struct UartLogger;

static LOGGER: UartLogger = UartLogger;

impl Log for UartLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        // SAFETY: single core, no interrupts; log output interleaves with
        // the console on the same UART
        let mut console = Console::new(unsafe { lolmon_wpcm450::Uart::new() });
        writeln!(console, "[{}] {}", record.level(), record.args());
    }

    fn flush(&self) {}
}

/// Install the UART logger
pub fn init() {
    // armv5te has no atomic compare-and-swap, so the racy setters are the
    // only ones available; nothing else runs yet
    unsafe {
        let _ = log::set_logger_racy(&LOGGER);
        log::set_max_level_racy(LevelFilter::Info);
    }
}
