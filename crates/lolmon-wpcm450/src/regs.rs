//! WPCM450 register map
//!
//! Only the registers the monitor drives are listed.

use bitflags::bitflags;

// ============================================================================
// Global control
// ============================================================================

/// Multiple function pin select register 1
pub const MFSEL1: usize = 0xb000_000c;
/// MFSEL1.BSPSEL: route UART0 to the BSP pins
pub const MFSEL1_BSPSEL: u32 = 1 << 9;

// ============================================================================
// UART0 (16550-style, 32-bit register stride)
// ============================================================================

/// UART0 base address
pub const UART0_BASE: usize = 0xb800_0000;
/// Receive buffer / transmit holding / divisor latch low
pub const UART_RBR_THR_DLL: usize = 0x00;
/// Divisor latch high (with DLAB set)
pub const UART_DLM: usize = 0x04;
/// Line control
pub const UART_LCR: usize = 0x0c;
/// Line status
pub const UART_LSR: usize = 0x14;

/// LCR: divisor latch access
pub const LCR_DLAB: u32 = 0x80;
/// LCR: 8 data bits, no parity, 1 stop bit
pub const LCR_8N1: u32 = 0x03;

/// Divisor for 115 200 baud from the 24 MHz clock
///
/// The ideal divisor is 13 (24 MHz / 16 / 13 = 115 384 Hz); the hardware
/// adds 2 to whatever is programmed.
pub const UART_DIVISOR: u32 = 13 - 2;

bitflags! {
    /// UART line status
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Lsr: u32 {
        /// Receive data ready
        const RDR  = 1 << 0;
        /// Transmit holding register empty
        const THRE = 1 << 5;
    }
}

// ============================================================================
// Timers and watchdog
// ============================================================================

/// Timer block base address
pub const TIMER_BASE: usize = 0xb800_1000;
/// Timer 0 control and status
pub const TCSR0: usize = 0x00;
/// Timer 0 initial count
pub const TICR0: usize = 0x08;
/// Timer 0 data (current count)
pub const TDR0: usize = 0x10;
/// Watchdog timer control
pub const WTCR: usize = 0x1c;

/// Prescaler giving a 100 kHz count from the 24 MHz clock
pub const TIMER_PRESCALE: u32 = 240;
/// Microseconds per timer count at [`TIMER_PRESCALE`]
pub const TIMER_US_PER_COUNT: u32 = 10;

bitflags! {
    /// Timer control and status
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Tcsr: u32 {
        /// Prescaler field (value minus one)
        const PRESCALE = 0xff;
        /// Timer is counting
        const CACT = 1 << 25;
        /// Reset the counter
        const CRST = 1 << 26;
        /// Enable counting
        const CEN  = 1 << 30;
    }
}

bitflags! {
    /// Watchdog timer control
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Wtcr: u32 {
        /// Reset the system when the watchdog fires
        const WTRE = 1 << 1;
        /// Watchdog enable
        const WTE  = 1 << 7;
    }
}

// ============================================================================
// FIU (flash interface unit)
// ============================================================================

/// FIU register block base address
pub const FIU_BASE: usize = 0xc800_0000;
/// Base of the flash-mapped image
pub const FLASH_BASE: usize = 0xc000_0000;

/// Flash window 1 low bound, in 4 KiB units (16 bits)
pub const FIU_FWIN1_LOW: usize = 0x04;
/// Flash window 1 high bound, in 4 KiB units (16 bits)
pub const FIU_FWIN1_HIGH: usize = 0x06;
/// UMA opcode
pub const FIU_UMA_CODE: usize = 0x16;
/// UMA address byte 0 (least significant)
pub const FIU_UMA_AB0: usize = 0x17;
/// UMA address byte 1
pub const FIU_UMA_AB1: usize = 0x18;
/// UMA address byte 2 (most significant)
pub const FIU_UMA_AB2: usize = 0x19;
/// UMA data byte 0
pub const FIU_UMA_DB0: usize = 0x1a;
/// UMA control and status
pub const FIU_UMA_CTS: usize = 0x1e;

/// Granule of the FWIN registers
pub const FWIN_SHIFT: u32 = 12;

bitflags! {
    /// UMA control and status
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct UmaCts: u8 {
        /// Data size field: number of data bytes (0-4)
        const D_SIZE    = 0x07;
        /// Send the three address bytes
        const A_SIZE    = 1 << 3;
        /// Data phase writes instead of reads
        const WR        = 1 << 4;
        /// Chip select field
        const CS        = 0x03 << 5;
        /// Set to start a transaction; cleared by hardware when done
        const EXEC_DONE = 1 << 7;
    }
}

impl UmaCts {
    /// Transaction with `n` data bytes
    pub fn data_size(n: u8) -> Self {
        Self::from_bits_truncate(n) & Self::D_SIZE
    }

    /// Transaction on chip select `cs`
    pub fn chip_select(cs: u8) -> Self {
        Self::from_bits_truncate(cs << 5) & Self::CS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uma_cts_fields() {
        let cts = UmaCts::EXEC_DONE | UmaCts::data_size(1) | UmaCts::chip_select(0);
        assert_eq!(cts.bits(), 0x81);
        let cts = UmaCts::EXEC_DONE | UmaCts::A_SIZE | UmaCts::chip_select(1);
        assert_eq!(cts.bits(), 0xa8);
    }

    #[test]
    fn test_watchdog_reset_value() {
        assert_eq!((Wtcr::WTE | Wtcr::WTRE).bits(), 0x82);
    }
}
