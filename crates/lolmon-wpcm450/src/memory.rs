//! Physical address space

use lolmon_core::hal::Memory;

use crate::mmio::Mmio;

/// The whole physical address space, accessed with volatile loads and
/// stores of exactly the requested width
pub struct PhysMemory {
    space: Mmio,
}

impl PhysMemory {
    /// Handle for the physical address space
    ///
    /// # Safety
    ///
    /// Raw pokes can hit anything, including the monitor itself. The
    /// caller accepts that for every address later passed in.
    pub unsafe fn new() -> Self {
        Self {
            space: Mmio::new(0),
        }
    }
}

impl Memory for PhysMemory {
    fn read8(&mut self, addr: u32) -> u8 {
        self.space.read8(addr as usize)
    }

    fn read16(&mut self, addr: u32) -> u16 {
        self.space.read16(addr as usize)
    }

    fn read32(&mut self, addr: u32) -> u32 {
        self.space.read32(addr as usize)
    }

    fn write8(&mut self, addr: u32, value: u8) {
        self.space.write8(addr as usize, value)
    }

    fn write16(&mut self, addr: u32, value: u16) {
        self.space.write16(addr as usize, value)
    }

    fn write32(&mut self, addr: u32, value: u32) {
        self.space.write32(addr as usize, value)
    }
}
