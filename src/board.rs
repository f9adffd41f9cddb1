//! The host board: the simulated SoC with a real console and clock
//!
//! Memory, flash, CPU and watchdog come from `lolmon-sim`. The console is
//! the process's stdin/stdout, and the boot key-wait runs on wall-clock
//! time so an operator actually gets the chance to interrupt autoboot.

use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use lolmon_core::hal::{Board, IoTransport, Timer};
use lolmon_sim::{SimCpu, SimFlash, SimMemory, SimWatchdog};

/// Board type of the host runner
pub struct HostBoard;

impl Board for HostBoard {
    type Transport = IoTransport<HostPort<io::Stdout>>;
    type Timer = WallTimer;
    type Watchdog = SimWatchdog;
    type Memory = SimMemory;
    type Flash = SimFlash;
    type Cpu = SimCpu;
}

/// Serial port over a byte stream pair
///
/// Input is pumped by a reader thread so the monitor can poll for pending
/// bytes without blocking. Once input is exhausted every read returns a
/// newline and [`HostPort::eof`] is raised, which lets a partial last line
/// execute and the runner notice the end of the session.
pub struct HostPort<W> {
    rx: Receiver<u8>,
    peeked: Option<u8>,
    eof: Arc<AtomicBool>,
    output: W,
}

impl<W: Write> HostPort<W> {
    /// Start pumping `input` on a background thread
    pub fn spawn<R>(input: R, output: W) -> io::Result<Self>
    where
        R: Read + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("console-input".into())
            .spawn(move || {
                for byte in input.bytes() {
                    match byte {
                        Ok(b) => {
                            if tx.send(b).is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            log::warn!("console input failed: {}", e);
                            break;
                        }
                    }
                }
                log::debug!("console input closed");
            })?;

        Ok(Self {
            rx,
            peeked: None,
            eof: Arc::new(AtomicBool::new(false)),
            output,
        })
    }

    /// Flag raised once input is exhausted
    pub fn eof(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.eof)
    }
}

impl<W> embedded_io::ErrorType for HostPort<W> {
    type Error = io::Error;
}

impl<W> embedded_io::Read for HostPort<W> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, io::Error> {
        let Some(slot) = buf.first_mut() else {
            return Ok(0);
        };
        let byte = match self.peeked.take() {
            Some(b) => Some(b),
            None => self.rx.recv().ok(),
        };
        *slot = byte.unwrap_or_else(|| {
            self.eof.store(true, Ordering::Release);
            b'\n'
        });
        Ok(1)
    }
}

impl<W> embedded_io::ReadReady for HostPort<W> {
    fn read_ready(&mut self) -> Result<bool, io::Error> {
        if self.peeked.is_none() {
            self.peeked = self.rx.try_recv().ok();
        }
        Ok(self.peeked.is_some())
    }
}

impl<W: Write> embedded_io::Write for HostPort<W> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, io::Error> {
        self.output.write(buf)
    }

    fn flush(&mut self) -> Result<(), io::Error> {
        self.output.flush()
    }
}

/// Countdown timer on the host's monotonic clock
#[derive(Debug, Default)]
pub struct WallTimer {
    deadline: Option<Instant>,
}

impl Timer for WallTimer {
    fn start(&mut self, us: u32) {
        self.deadline = Some(Instant::now() + Duration::from_micros(us.into()));
    }

    fn elapsed(&mut self) -> bool {
        match self.deadline {
            Some(deadline) if Instant::now() < deadline => {
                // Only the boot key-wait polls this; no need to spin hot
                thread::sleep(Duration::from_millis(1));
                false
            }
            _ => true,
        }
    }
}
