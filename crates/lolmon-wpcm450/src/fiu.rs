//! FIU flash controller
//!
//! Reads and byte programs go through the flash-mapped image at
//! [`FLASH_BASE`]; only accesses inside flash window 1 reach the device.
//! Everything else is a user-mode access (UMA) transaction: load the
//! opcode and address registers, set `EXEC_DONE` in `UMA_CTS` and poll
//! until the hardware clears it again.

use lolmon_core::flash::opcodes;
use lolmon_core::hal::{FlashController, Window};

use crate::mmio::Mmio;
use crate::regs::{
    UmaCts, FIU_BASE, FIU_FWIN1_HIGH, FIU_FWIN1_LOW, FIU_UMA_AB0, FIU_UMA_AB1, FIU_UMA_AB2,
    FIU_UMA_CODE, FIU_UMA_CTS, FIU_UMA_DB0, FLASH_BASE, FWIN_SHIFT,
};

/// Flash interface unit driving the SPI-NOR on chip select 0
pub struct Fiu {
    regs: Mmio,
    image: Mmio,
}

impl Fiu {
    /// Handle for the on-chip FIU
    ///
    /// # Safety
    ///
    /// Only one handle may drive the FIU at a time.
    pub unsafe fn new() -> Self {
        Self::at(Mmio::new(FIU_BASE), Mmio::new(FLASH_BASE))
    }

    /// Handle for an FIU register block and its flash-mapped image
    pub fn at(regs: Mmio, image: Mmio) -> Self {
        Self { regs, image }
    }

    fn uma_wait(&self) {
        while UmaCts::from_bits_truncate(self.regs.read8(FIU_UMA_CTS)).contains(UmaCts::EXEC_DONE) {}
    }

    fn uma_set_address(&self, addr: u32) {
        let [ab0, ab1, ab2, _] = addr.to_le_bytes();
        self.regs.write8(FIU_UMA_AB0, ab0);
        self.regs.write8(FIU_UMA_AB1, ab1);
        self.regs.write8(FIU_UMA_AB2, ab2);
    }

    fn uma_exec(&self, opcode: u8, cts: UmaCts) {
        self.regs.write8(FIU_UMA_CODE, opcode);
        let cts = cts | UmaCts::EXEC_DONE | UmaCts::chip_select(0);
        self.regs.write8(FIU_UMA_CTS, cts.bits());
        self.uma_wait();
    }
}

impl FlashController for Fiu {
    fn init(&mut self) {
        // A transaction left running by an earlier boot stage must finish
        // before the UMA registers are reused
        self.uma_wait();
        let window = self.window();
        log::debug!("FIU window {:#x}..{:#x}", window.low, window.high);
    }

    fn window(&mut self) -> Window {
        let low = self.regs.read16(FIU_FWIN1_LOW) as u32;
        let high = self.regs.read16(FIU_FWIN1_HIGH) as u32;
        Window::new(low << FWIN_SHIFT, high << FWIN_SHIFT)
    }

    fn set_window(&mut self, window: Window) {
        self.regs
            .write16(FIU_FWIN1_LOW, (window.low >> FWIN_SHIFT) as u16);
        self.regs
            .write16(FIU_FWIN1_HIGH, (window.high >> FWIN_SHIFT) as u16);
    }

    fn read(&mut self, offset: u32) -> u8 {
        self.image.read8(offset as usize)
    }

    fn program(&mut self, offset: u32, value: u8) {
        self.image.write8(offset as usize, value);
    }

    fn write_enable(&mut self) {
        self.uma_exec(opcodes::WREN, UmaCts::empty());
    }

    fn erase_sector(&mut self, offset: u32) {
        self.uma_set_address(offset);
        self.uma_exec(opcodes::SE_20, UmaCts::A_SIZE);
    }

    fn read_status(&mut self) -> u8 {
        self.uma_exec(opcodes::RDSR, UmaCts::data_size(1));
        self.regs.read8(FIU_UMA_DB0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mmio::tests::FakeRegs;

    #[test]
    fn test_window_in_4k_units() {
        let mut regs = FakeRegs::new();
        let mut image = FakeRegs::new();
        let mut fiu = Fiu::at(regs.mmio(), image.mmio());

        fiu.set_window(Window::new(0x0010_0000, 0x0010_3000));
        assert_eq!(regs.0[FIU_FWIN1_LOW..FIU_FWIN1_LOW + 2], [0x00, 0x01]);
        assert_eq!(regs.0[FIU_FWIN1_HIGH..FIU_FWIN1_HIGH + 2], [0x03, 0x01]);
        assert_eq!(fiu.window(), Window::new(0x0010_0000, 0x0010_3000));
    }

    #[test]
    fn test_mapped_image_access() {
        let mut regs = FakeRegs::new();
        let mut image = FakeRegs::new();
        let mut fiu = Fiu::at(regs.mmio(), image.mmio());

        fiu.program(0x21, 0x5a);
        assert_eq!(image.0[0x21], 0x5a);
        assert_eq!(fiu.read(0x21), 0x5a);
    }

    #[test]
    fn test_address_bytes() {
        let mut regs = FakeRegs::new();
        let mut image = FakeRegs::new();
        let fiu = Fiu::at(regs.mmio(), image.mmio());

        fiu.uma_set_address(0x00ab_cdef);
        assert_eq!(regs.0[FIU_UMA_AB0..=FIU_UMA_AB2], [0xef, 0xcd, 0xab]);
    }
}
