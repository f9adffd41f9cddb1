//! Volatile register access

use core::ptr;

/// A block of memory-mapped registers
///
/// Offsets are relative to the block's base. Accesses are volatile and have
/// exactly the requested width.
#[derive(Debug, Clone, Copy)]
pub struct Mmio {
    base: usize,
}

impl Mmio {
    /// Create a handle for the register block at `base`
    ///
    /// # Safety
    ///
    /// `base` must be the address of a register block (or of memory) that
    /// stays valid for every offset later accessed through this handle.
    pub const unsafe fn new(base: usize) -> Self {
        Self { base }
    }

    /// Base address of the block
    pub fn base(&self) -> usize {
        self.base
    }

    /// Read an 8-bit register
    #[inline]
    pub fn read8(&self, offset: usize) -> u8 {
        // SAFETY: validity of the block is the contract of `new`
        unsafe { ptr::read_volatile((self.base + offset) as *const u8) }
    }

    /// Read a 16-bit register
    #[inline]
    pub fn read16(&self, offset: usize) -> u16 {
        debug_assert!(offset & 1 == 0, "unaligned 16-bit read");
        // SAFETY: validity of the block is the contract of `new`
        unsafe { ptr::read_volatile((self.base + offset) as *const u16) }
    }

    /// Read a 32-bit register
    #[inline]
    pub fn read32(&self, offset: usize) -> u32 {
        debug_assert!(offset & 3 == 0, "unaligned 32-bit read");
        // SAFETY: validity of the block is the contract of `new`
        unsafe { ptr::read_volatile((self.base + offset) as *const u32) }
    }

    /// Write an 8-bit register
    #[inline]
    pub fn write8(&self, offset: usize, value: u8) {
        // SAFETY: validity of the block is the contract of `new`
        unsafe { ptr::write_volatile((self.base + offset) as *mut u8, value) }
    }

    /// Write a 16-bit register
    #[inline]
    pub fn write16(&self, offset: usize, value: u16) {
        debug_assert!(offset & 1 == 0, "unaligned 16-bit write");
        // SAFETY: validity of the block is the contract of `new`
        unsafe { ptr::write_volatile((self.base + offset) as *mut u16, value) }
    }

    /// Write a 32-bit register
    #[inline]
    pub fn write32(&self, offset: usize, value: u32) {
        debug_assert!(offset & 3 == 0, "unaligned 32-bit write");
        // SAFETY: validity of the block is the contract of `new`
        unsafe { ptr::write_volatile((self.base + offset) as *mut u32, value) }
    }

    /// Read-modify-write a 32-bit register
    #[inline]
    pub fn modify32(&self, offset: usize, f: impl FnOnce(u32) -> u32) {
        let value = self.read32(offset);
        self.write32(offset, f(value));
    }
}
