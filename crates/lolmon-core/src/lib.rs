//! lolmon-core - Debug monitor core
//!
//! A small interactive monitor for bringing up a system-on-chip without an
//! operating system. It reads commands over a character transport, lets the
//! operator peek, poke and copy raw memory at byte, half-word and word
//! width, and reprograms an SPI-NOR flash while erasing as little as
//! possible. Boot scripts and memory-resident scripts are replayed through
//! the same command dispatcher.
//!
//! The crate is `no_std` and allocation free. All hardware is reached
//! through the traits in [`hal`], which makes the monitor testable against
//! a simulated board.
//!
//! # Example
//!
//! ```ignore
//! use lolmon_core::{Monitor, MonitorConfig, Peripherals};
//!
//! static BOOT_SCRIPT: &[u8] = include_bytes!("bootscript.txt");
//!
//! fn main() -> ! {
//!     let peripherals: Peripherals<MyBoard> = board::take();
//!     Monitor::new(peripherals, MonitorConfig::default(), BOOT_SCRIPT).start()
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

#[cfg(any(feature = "std", test))]
extern crate std;

pub mod config;
pub mod console;
pub mod error;
pub mod flash;
pub mod hal;
pub mod memory;
mod monitor;
pub mod script;
pub mod shell;

pub use config::MonitorConfig;
pub use error::{FlashError, ShellError};
pub use hal::{Board, Peripherals};
pub use monitor::{exception_name, Monitor, BANNER};
