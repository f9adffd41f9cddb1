//! Timer 0 and the watchdog

use lolmon_core::hal;

use crate::mmio::Mmio;
use crate::regs::{
    Tcsr, Wtcr, TCSR0, TICR0, TIMER_BASE, TIMER_PRESCALE, TIMER_US_PER_COUNT, WTCR,
};

/// Timer 0 as a one-shot countdown
pub struct Timer0 {
    regs: Mmio,
}

impl Timer0 {
    /// Handle for the on-chip timer 0
    ///
    /// # Safety
    ///
    /// Only one handle may drive timer 0 at a time.
    pub unsafe fn new() -> Self {
        Self::at(Mmio::new(TIMER_BASE))
    }

    /// Handle for a timer register block
    pub fn at(regs: Mmio) -> Self {
        Self { regs }
    }

    fn active(&self) -> bool {
        Tcsr::from_bits_truncate(self.regs.read32(TCSR0)).contains(Tcsr::CACT)
    }
}

impl hal::Timer for Timer0 {
    fn start(&mut self, us: u32) {
        self.regs.write32(TCSR0, Tcsr::CRST.bits());
        self.regs.write32(TICR0, us / TIMER_US_PER_COUNT);

        let tcsr = Tcsr::CEN | Tcsr::from_bits_truncate(TIMER_PRESCALE - 1);
        self.regs.write32(TCSR0, tcsr.bits());

        while !self.active() {}
    }

    fn elapsed(&mut self) -> bool {
        !self.active()
    }
}

/// The system watchdog, which shares its register block with the timers
pub struct Watchdog {
    regs: Mmio,
}

impl Watchdog {
    /// Handle for the on-chip watchdog
    ///
    /// # Safety
    ///
    /// Only one handle may drive the watchdog at a time.
    pub unsafe fn new() -> Self {
        Self::at(Mmio::new(TIMER_BASE))
    }

    /// Handle for a timer register block
    pub fn at(regs: Mmio) -> Self {
        Self { regs }
    }
}

impl hal::Watchdog for Watchdog {
    fn disable(&mut self) {
        self.regs.write32(WTCR, 0);
    }

    fn reset(&mut self) {
        self.regs.write32(WTCR, (Wtcr::WTE | Wtcr::WTRE).bits());
    }
}
