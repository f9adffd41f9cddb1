//! Collaborator interfaces consumed by the monitor
//!
//! The monitor never touches hardware registers directly. Everything it
//! needs from the board (console transport, countdown timer, watchdog, raw
//! address space, flash controller and a couple of CPU primitives) is
//! reached through the traits in this module, so the same core runs on the
//! real SoC and against the simulated board used by the tests.
//!
//! All operations are blocking and poll-driven; nothing here is expected to
//! be interrupt-safe or reentrant.

/// Byte-oriented character transport (usually a UART)
pub trait Transport {
    /// Set up clocking and pin multiplexing. Called once during startup.
    fn init(&mut self) {}

    /// Send one byte, blocking until the transmitter accepts it
    fn send(&mut self, byte: u8);

    /// Receive one byte, blocking until one is available
    fn receive(&mut self) -> u8;

    /// Return `true` if [`Transport::receive`] would not block
    fn can_receive(&mut self) -> bool;
}

/// One-shot countdown timer
pub trait Timer {
    /// Arm the timer to elapse after `us` microseconds
    fn start(&mut self, us: u32);

    /// Return `true` once the armed duration has passed
    fn elapsed(&mut self) -> bool;
}

/// System watchdog
pub trait Watchdog {
    /// Stop the watchdog so the monitor can idle at the prompt
    fn disable(&mut self);

    /// Trigger a system reset through the watchdog
    fn reset(&mut self);
}

/// Raw address space access with explicit access widths
///
/// Implementations must perform exactly one access of the given width per
/// call; device registers are frequently sensitive to access size.
pub trait Memory {
    /// Read a byte
    fn read8(&mut self, addr: u32) -> u8;
    /// Read a 16-bit half-word
    fn read16(&mut self, addr: u32) -> u16;
    /// Read a 32-bit word
    fn read32(&mut self, addr: u32) -> u32;

    /// Write a byte
    fn write8(&mut self, addr: u32, value: u8);
    /// Write a 16-bit half-word
    fn write16(&mut self, addr: u32, value: u16);
    /// Write a 32-bit word
    fn write32(&mut self, addr: u32, value: u32);
}

/// Active flash address window of the controller
///
/// Both bounds are byte offsets into the flash device. `low` is inclusive,
/// `high` is exclusive. Accesses through the flash-mapped image outside the
/// window are not routed to the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Window {
    /// First byte covered by the window
    pub low: u32,
    /// First byte past the window
    pub high: u32,
}

impl Window {
    /// Create a window covering `[low, high)`
    pub const fn new(low: u32, high: u32) -> Self {
        Self { low, high }
    }

    /// Return `true` if `offset` lies inside the window
    pub fn contains(&self, offset: u32) -> bool {
        offset >= self.low && offset < self.high
    }
}

/// SPI-NOR flash controller
///
/// Data reads and byte programs go through the controller's flash-mapped
/// image. The remaining methods each issue one SPI transaction through the
/// controller's user-mode access (UMA) engine and return once the
/// controller reports the transaction done. None of them wait for the
/// flash device itself; callers poll [`FlashController::read_status`] for
/// the write-in-progress bit.
pub trait FlashController {
    /// Bring the controller into a usable state. Called once during startup.
    fn init(&mut self) {}

    /// Return the currently active address window
    fn window(&mut self) -> Window;

    /// Replace the active address window
    fn set_window(&mut self, window: Window);

    /// Read one byte at `offset` through the flash-mapped image
    fn read(&mut self, offset: u32) -> u8;

    /// Store one byte at `offset` through the flash-mapped image
    ///
    /// The device must have been write-enabled first. Programming can only
    /// clear bits.
    fn program(&mut self, offset: u32, value: u8);

    /// Issue WREN
    fn write_enable(&mut self);

    /// Issue a 4 KiB sector erase for the sector containing `offset`
    fn erase_sector(&mut self, offset: u32);

    /// Issue RDSR and return status register 1
    fn read_status(&mut self) -> u8;
}

/// CPU primitives needed by `imb` and `call`
pub trait Cpu {
    /// Make prior data writes visible to instruction fetch
    fn instruction_barrier(&mut self);

    /// Call the function at `addr` with three word arguments
    ///
    /// Whatever lives at `addr` runs with full privileges; the monitor
    /// trusts the operator here the same way it does for raw writes.
    fn call(&mut self, addr: u32, args: [u32; 3]) -> u32;
}

/// A board: one concrete type for each collaborator
pub trait Board {
    /// Console transport
    type Transport: Transport;
    /// Countdown timer used for the boot key-wait
    type Timer: Timer;
    /// Watchdog
    type Watchdog: Watchdog;
    /// Raw address space
    type Memory: Memory;
    /// SPI-NOR flash controller
    type Flash: FlashController;
    /// CPU primitives
    type Cpu: Cpu;
}

/// Owned set of collaborators for a [`Board`]
pub struct Peripherals<B: Board> {
    /// Console transport
    pub transport: B::Transport,
    /// Countdown timer
    pub timer: B::Timer,
    /// Watchdog
    pub watchdog: B::Watchdog,
    /// Raw address space
    pub memory: B::Memory,
    /// Flash controller
    pub flash: B::Flash,
    /// CPU primitives
    pub cpu: B::Cpu,
}

/// [`Transport`] adapter for any `embedded-io` serial device
///
/// Errors reported by the underlying device are treated as "no data yet"
/// on the receive side and dropped on the transmit side; the console has
/// no way to report them anyway.
pub struct IoTransport<T> {
    inner: T,
}

impl<T> IoTransport<T> {
    /// Wrap an `embedded-io` device
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Give back the wrapped device
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T> Transport for IoTransport<T>
where
    T: embedded_io::Read + embedded_io::Write + embedded_io::ReadReady,
{
    fn send(&mut self, byte: u8) {
        if self.inner.write_all(&[byte]).is_err() {
            log::trace!("transport dropped byte {:#04x}", byte);
        }
    }

    fn receive(&mut self) -> u8 {
        if self.inner.flush().is_err() {
            log::trace!("transport flush failed");
        }
        let mut buf = [0u8; 1];
        loop {
            if let Ok(1) = self.inner.read(&mut buf) {
                return buf[0];
            }
        }
    }

    fn can_receive(&mut self) -> bool {
        self.inner.read_ready().unwrap_or(false)
    }
}
