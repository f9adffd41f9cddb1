//! lolmon-sim - Simulated board for the lolmon monitor
//!
//! Every collaborator the monitor needs, implemented in memory:
//!
//! - [`SimMemory`]: a sparse little-endian address space
//! - [`SimFlash`]: a 16 MiB SPI-NOR device behind a windowed controller,
//!   with an operation log and fault injection
//! - [`ScriptedTransport`]: console input from a buffer, output captured
//! - [`SimTimer`], [`SimWatchdog`], [`SimCpu`]: recording stand-ins
//!
//! [`SimBoard`] ties them together so a whole
//! [`Monitor`](lolmon_core::Monitor) can run on a host.

mod board;
mod error;
mod flash;
mod memory;
mod misc;
mod transport;

pub use board::{peripherals, scripted, SimBoard};
pub use error::{Result, SimError};
pub use flash::{FlashOp, SimFlash};
pub use memory::SimMemory;
pub use misc::{SimCpu, SimTimer, SimWatchdog};
pub use transport::ScriptedTransport;
