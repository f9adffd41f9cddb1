//! Simulated SPI-NOR flash behind a windowed controller

use std::collections::BTreeSet;
use std::path::Path;

use lolmon_core::flash::opcodes::{SR1_WEL, SR1_WIP};
use lolmon_core::flash::{FLASH_SIZE, PAGE_SIZE};
use lolmon_core::hal::{FlashController, Window};

use crate::error::{Result, SimError};

/// One controller operation, as recorded by [`SimFlash`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashOp {
    /// Window changed
    SetWindow(Window),
    /// WREN
    WriteEnable,
    /// Sector erase at the given offset
    Erase(u32),
    /// Byte program through the mapped image
    Program(u32, u8),
}

/// A 16 MiB SPI-NOR device with a 4 KiB erase granule
///
/// Behaves like the real part where the monitor can tell the difference:
///
/// - programming only clears bits and needs a preceding WREN
/// - erase sets a whole 4 KiB sector to `0xFF` and needs a preceding WREN
/// - both leave the device busy for a configurable number of status polls
/// - mapped reads and programs outside the controller window do not reach
///   the device
///
/// Status polls and mapped reads are counted; everything else is logged in
/// [`SimFlash::ops`].
#[derive(Debug, Clone)]
pub struct SimFlash {
    data: Vec<u8>,
    window: Window,
    write_enabled: bool,
    busy_polls: u32,
    busy: u32,
    hang: bool,
    stuck: BTreeSet<u32>,
    initialized: bool,
    ops: Vec<FlashOp>,
    /// Mapped reads performed
    pub reads: u64,
    /// Status register reads performed
    pub status_reads: u64,
    /// Mapped accesses that fell outside the window
    pub window_misses: u64,
}

impl Default for SimFlash {
    fn default() -> Self {
        Self::new()
    }
}

impl SimFlash {
    /// Create an erased device with a window covering all of it
    pub fn new() -> Self {
        Self {
            data: vec![0xFF; FLASH_SIZE as usize],
            window: Window::new(0, FLASH_SIZE),
            write_enabled: false,
            busy_polls: 0,
            busy: 0,
            hang: false,
            stuck: BTreeSet::new(),
            initialized: false,
            ops: Vec::new(),
            reads: 0,
            status_reads: 0,
            window_misses: 0,
        }
    }

    /// Create a device pre-filled with `image` starting at offset 0
    pub fn with_data(image: &[u8]) -> Result<Self> {
        let mut flash = Self::new();
        flash.load(0, image)?;
        Ok(flash)
    }

    /// Create a device from an image file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let image = std::fs::read(path).map_err(|source| SimError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::with_data(&image)
    }

    /// Write the whole device to an image file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, &self.data).map_err(|source| SimError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Overwrite device contents directly, bypassing the controller
    pub fn load(&mut self, offset: u32, image: &[u8]) -> Result<()> {
        let start = offset as usize;
        let end = start
            .checked_add(image.len())
            .filter(|&end| end <= self.data.len())
            .ok_or(SimError::ImageTooLarge {
                offset,
                len: image.len(),
                size: FLASH_SIZE,
            })?;
        self.data[start..end].copy_from_slice(image);
        Ok(())
    }

    /// Stay busy for `polls` status reads after every erase and program
    pub fn with_busy_polls(mut self, polls: u32) -> Self {
        self.busy_polls = polls;
        self
    }

    /// Never clear the write-in-progress bit once an operation started
    pub fn with_hang(mut self) -> Self {
        self.hang = true;
        self
    }

    /// Start with a different controller window
    pub fn with_window(mut self, window: Window) -> Self {
        self.window = window;
        self
    }

    /// Make programs at `offset` have no effect
    pub fn stick(&mut self, offset: u32) {
        self.stuck.insert(offset);
    }

    /// Raw device contents
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Operations issued since creation or the last [`SimFlash::clear_ops`]
    pub fn ops(&self) -> &[FlashOp] {
        &self.ops
    }

    /// Forget recorded operations and counters
    pub fn clear_ops(&mut self) {
        self.ops.clear();
        self.reads = 0;
        self.status_reads = 0;
        self.window_misses = 0;
    }

    /// Number of sector erases recorded
    pub fn erase_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, FlashOp::Erase(_)))
            .count()
    }

    /// Number of byte programs recorded
    pub fn program_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, FlashOp::Program(..)))
            .count()
    }

    /// Return `true` once [`FlashController::init`] ran
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn start_operation(&mut self) {
        self.write_enabled = false;
        self.busy = self.busy_polls;
    }

    fn mapped(&mut self, offset: u32) -> Option<usize> {
        if self.window.contains(offset) && (offset as usize) < self.data.len() {
            Some(offset as usize)
        } else {
            self.window_misses += 1;
            log::trace!("mapped access {:#x} outside window {:?}", offset, self.window);
            None
        }
    }
}

impl FlashController for SimFlash {
    fn init(&mut self) {
        self.initialized = true;
    }

    fn window(&mut self) -> Window {
        self.window
    }

    fn set_window(&mut self, window: Window) {
        self.ops.push(FlashOp::SetWindow(window));
        self.window = window;
    }

    fn read(&mut self, offset: u32) -> u8 {
        self.reads += 1;
        match self.mapped(offset) {
            Some(i) => self.data[i],
            None => 0xFF,
        }
    }

    fn program(&mut self, offset: u32, value: u8) {
        self.ops.push(FlashOp::Program(offset, value));
        let Some(i) = self.mapped(offset) else {
            return;
        };
        if !self.write_enabled {
            log::warn!("program at {:#x} without WREN ignored", offset);
            return;
        }
        if !self.stuck.contains(&offset) {
            self.data[i] &= value;
        }
        self.start_operation();
    }

    fn write_enable(&mut self) {
        self.ops.push(FlashOp::WriteEnable);
        self.write_enabled = true;
    }

    fn erase_sector(&mut self, offset: u32) {
        self.ops.push(FlashOp::Erase(offset));
        if !self.write_enabled {
            log::warn!("erase at {:#x} without WREN ignored", offset);
            return;
        }
        let start = (offset & !(PAGE_SIZE - 1)) as usize;
        if let Some(sector) = self.data.get_mut(start..start + PAGE_SIZE as usize) {
            sector.fill(0xFF);
        }
        self.start_operation();
    }

    fn read_status(&mut self) -> u8 {
        self.status_reads += 1;
        let mut status = 0;
        if self.write_enabled {
            status |= SR1_WEL;
        }
        if self.busy > 0 {
            if !self.hang {
                self.busy -= 1;
            }
            status |= SR1_WIP;
        }
        status
    }
}
