//! The WPCM450 board

use lolmon_core::hal::{Board, Peripherals};

use crate::cpu::Arm926;
use crate::fiu::Fiu;
use crate::memory::PhysMemory;
use crate::timer::{Timer0, Watchdog};
use crate::uart::Uart;

/// Nuvoton WPCM450
pub struct Wpcm450;

impl Board for Wpcm450 {
    type Transport = Uart;
    type Timer = Timer0;
    type Watchdog = Watchdog;
    type Memory = PhysMemory;
    type Flash = Fiu;
    type Cpu = Arm926;
}

/// Handles for every on-chip peripheral the monitor uses
///
/// # Safety
///
/// Must only be called on a WPCM450, and only once unless the previous
/// handles are gone (as after an exception unwound the monitor's stack).
pub unsafe fn peripherals() -> Peripherals<Wpcm450> {
    Peripherals {
        transport: Uart::new(),
        timer: Timer0::new(),
        watchdog: Watchdog::new(),
        memory: PhysMemory::new(),
        flash: Fiu::new(),
        cpu: Arm926::new(),
    }
}
