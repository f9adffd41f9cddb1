//! SPI-NOR opcodes and status bits used by the monitor

/// Write Enable - required before any program/erase operation
pub const WREN: u8 = 0x06;
/// Read Status Register 1
pub const RDSR: u8 = 0x05;
/// 4 KiB sector erase with 3-byte address
pub const SE_20: u8 = 0x20;

/// Status register 1: write in progress
pub const SR1_WIP: u8 = 1 << 0;
/// Status register 1: write enable latch
pub const SR1_WEL: u8 = 1 << 1;
