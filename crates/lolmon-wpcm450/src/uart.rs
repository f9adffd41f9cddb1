//! UART0 console

use lolmon_core::hal::Transport;

use crate::mmio::Mmio;
use crate::regs::{
    Lsr, LCR_8N1, LCR_DLAB, MFSEL1, MFSEL1_BSPSEL, UART0_BASE, UART_DIVISOR, UART_DLM, UART_LCR,
    UART_LSR, UART_RBR_THR_DLL,
};

/// Polled UART0 at 115 200 baud, 8N1
pub struct Uart {
    regs: Mmio,
    mfsel1: Mmio,
}

impl Uart {
    /// Handle for the on-chip UART0
    ///
    /// # Safety
    ///
    /// Only one handle may drive UART0 at a time.
    pub unsafe fn new() -> Self {
        Self::at(Mmio::new(UART0_BASE), Mmio::new(MFSEL1))
    }

    /// Handle for a UART register block and its pin-mux register
    pub fn at(regs: Mmio, mfsel1: Mmio) -> Self {
        Self { regs, mfsel1 }
    }

    fn status(&self) -> Lsr {
        Lsr::from_bits_truncate(self.regs.read32(UART_LSR))
    }
}

impl Transport for Uart {
    fn init(&mut self) {
        self.mfsel1.modify32(0, |v| v | MFSEL1_BSPSEL);

        self.regs.write32(UART_LCR, LCR_DLAB);
        self.regs.write32(UART_RBR_THR_DLL, UART_DIVISOR);
        self.regs.write32(UART_DLM, 0);
        self.regs.write32(UART_LCR, LCR_8N1);
    }

    fn send(&mut self, byte: u8) {
        while !self.status().contains(Lsr::THRE) {}
        self.regs.write32(UART_RBR_THR_DLL, byte as u32);
    }

    fn receive(&mut self) -> u8 {
        while !self.can_receive() {}
        self.regs.read32(UART_RBR_THR_DLL) as u8
    }

    fn can_receive(&mut self) -> bool {
        self.status().contains(Lsr::RDR)
    }
}
