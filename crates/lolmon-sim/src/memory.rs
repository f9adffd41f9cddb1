//! Sparse simulated address space

use std::collections::BTreeMap;

use lolmon_core::hal::Memory;

use crate::error::{Result, SimError};

/// A 4 GiB little-endian address space backed by a sparse map
///
/// Bytes that were never written read as the fill value (`0` by default).
/// Every access is counted so tests can check access widths.
#[derive(Debug, Clone, Default)]
pub struct SimMemory {
    bytes: BTreeMap<u32, u8>,
    fill: u8,
    /// Number of accesses per width: `[8-bit, 16-bit, 32-bit]`
    pub reads: [u32; 3],
    /// Number of accesses per width: `[8-bit, 16-bit, 32-bit]`
    pub writes: [u32; 3],
}

impl SimMemory {
    /// Create an empty address space
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an address space whose unwritten bytes read as `fill`
    pub fn with_fill(fill: u8) -> Self {
        Self {
            fill,
            ..Self::default()
        }
    }

    /// Copy `data` to `addr` without counting accesses
    pub fn load(&mut self, addr: u32, data: &[u8]) -> Result<()> {
        let len = data.len();
        let wraps = u32::try_from(len.saturating_sub(1))
            .ok()
            .and_then(|last| addr.checked_add(last))
            .is_none();
        if wraps {
            return Err(SimError::AddressWrap { addr, len });
        }
        for (i, &b) in data.iter().enumerate() {
            self.bytes.insert(addr + i as u32, b);
        }
        log::debug!("loaded {:#x} bytes at {:#010x}", len, addr);
        Ok(())
    }

    /// Copy `len` bytes starting at `addr` without counting accesses
    pub fn peek(&self, addr: u32, len: usize) -> Vec<u8> {
        (0..len)
            .map(|i| self.byte(addr.wrapping_add(i as u32)))
            .collect()
    }

    fn byte(&self, addr: u32) -> u8 {
        self.bytes.get(&addr).copied().unwrap_or(self.fill)
    }

    fn read_le<const N: usize>(&self, addr: u32) -> [u8; N] {
        let mut buf = [0u8; N];
        for (i, b) in buf.iter_mut().enumerate() {
            *b = self.byte(addr.wrapping_add(i as u32));
        }
        buf
    }

    fn write_le(&mut self, addr: u32, bytes: &[u8]) {
        for (i, &b) in bytes.iter().enumerate() {
            self.bytes.insert(addr.wrapping_add(i as u32), b);
        }
    }
}

impl Memory for SimMemory {
    fn read8(&mut self, addr: u32) -> u8 {
        self.reads[0] += 1;
        self.byte(addr)
    }

    fn read16(&mut self, addr: u32) -> u16 {
        self.reads[1] += 1;
        u16::from_le_bytes(self.read_le(addr))
    }

    fn read32(&mut self, addr: u32) -> u32 {
        self.reads[2] += 1;
        u32::from_le_bytes(self.read_le(addr))
    }

    fn write8(&mut self, addr: u32, value: u8) {
        self.writes[0] += 1;
        self.write_le(addr, &[value]);
    }

    fn write16(&mut self, addr: u32, value: u16) {
        self.writes[1] += 1;
        self.write_le(addr, &value.to_le_bytes());
    }

    fn write32(&mut self, addr: u32, value: u32) {
        self.writes[2] += 1;
        self.write_le(addr, &value.to_le_bytes());
    }
}
