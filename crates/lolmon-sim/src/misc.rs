//! Timer, watchdog and CPU stand-ins

use lolmon_core::hal::{Cpu, Timer, Watchdog};

/// Timer that elapses after a fixed number of polls
///
/// Simulated time does not pass on its own; each call to
/// [`Timer::elapsed`] counts as one tick.
#[derive(Debug, Clone)]
pub struct SimTimer {
    ticks_per_start: u32,
    remaining: u32,
    /// Durations passed to every [`Timer::start`], in order
    pub starts: Vec<u32>,
}

impl Default for SimTimer {
    fn default() -> Self {
        Self::with_ticks(16)
    }
}

impl SimTimer {
    /// Create a timer that elapses on the `ticks`-th poll after starting
    pub fn with_ticks(ticks: u32) -> Self {
        Self {
            ticks_per_start: ticks,
            remaining: 0,
            starts: Vec::new(),
        }
    }
}

impl Timer for SimTimer {
    fn start(&mut self, us: u32) {
        self.starts.push(us);
        self.remaining = self.ticks_per_start;
    }

    fn elapsed(&mut self) -> bool {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining == 0
    }
}

/// Watchdog that records what was asked of it
#[derive(Debug, Clone, Default)]
pub struct SimWatchdog {
    /// `disable` was called
    pub disabled: bool,
    /// Number of requested resets
    pub resets: u32,
}

impl Watchdog for SimWatchdog {
    fn disable(&mut self) {
        self.disabled = true;
    }

    fn reset(&mut self) {
        log::info!("simulated watchdog reset");
        self.resets += 1;
    }
}

/// CPU that records barriers and calls instead of executing anything
#[derive(Debug, Clone, Default)]
pub struct SimCpu {
    /// Instruction barriers issued
    pub barriers: u32,
    /// Calls issued, with their arguments
    pub calls: Vec<(u32, [u32; 3])>,
    /// Value every call returns
    pub return_value: u32,
}

impl Cpu for SimCpu {
    fn instruction_barrier(&mut self) {
        self.barriers += 1;
    }

    fn call(&mut self, addr: u32, args: [u32; 3]) -> u32 {
        log::info!("simulated call to {:#010x} with {:x?}", addr, args);
        self.calls.push((addr, args));
        self.return_value
    }
}
