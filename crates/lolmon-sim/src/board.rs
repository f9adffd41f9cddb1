//! The simulated board

use std::marker::PhantomData;

use lolmon_core::hal::{Board, Peripherals, Transport};

use crate::flash::SimFlash;
use crate::memory::SimMemory;
use crate::misc::{SimCpu, SimTimer, SimWatchdog};
use crate::transport::ScriptedTransport;

/// Board made of simulated collaborators
///
/// The console transport is a type parameter so a host can plug in a real
/// terminal while keeping the simulated memory and flash.
pub struct SimBoard<T = ScriptedTransport>(PhantomData<T>);

impl<T: Transport> Board for SimBoard<T> {
    type Transport = T;
    type Timer = SimTimer;
    type Watchdog = SimWatchdog;
    type Memory = SimMemory;
    type Flash = SimFlash;
    type Cpu = SimCpu;
}

/// Fresh simulated peripherals around `transport`
pub fn peripherals<T: Transport>(transport: T) -> Peripherals<SimBoard<T>> {
    Peripherals {
        transport,
        timer: SimTimer::default(),
        watchdog: SimWatchdog::default(),
        memory: SimMemory::new(),
        flash: SimFlash::new(),
        cpu: SimCpu::default(),
    }
}

/// Fresh simulated peripherals with console input taken from `input`
pub fn scripted(input: &[u8]) -> Peripherals<SimBoard> {
    peripherals(ScriptedTransport::new(input))
}
