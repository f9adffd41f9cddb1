//! lolmon-wpcm450 - Nuvoton WPCM450 drivers for the lolmon monitor
//!
//! Polling drivers for the parts of the WPCM450 baseboard management
//! controller the monitor needs:
//!
//! - UART0 as the console transport
//! - timer 0 as the boot key-wait countdown, and the watchdog
//! - the FIU (flash interface unit) as the SPI-NOR flash controller
//! - ARM926EJ-S cache maintenance and the `call` trampoline
//!
//! Everything is plain memory-mapped I/O at fixed physical addresses; see
//! [`regs`] for the register map.

#![no_std]

mod board;
mod cpu;
mod fiu;
mod memory;
mod mmio;
pub mod regs;
mod timer;
mod uart;

pub use board::{peripherals, Wpcm450};
pub use cpu::Arm926;
pub use fiu::Fiu;
pub use memory::PhysMemory;
pub use mmio::Mmio;
pub use timer::{Timer0, Watchdog};
pub use uart::Uart;
