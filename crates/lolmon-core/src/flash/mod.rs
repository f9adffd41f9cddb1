//! SPI-NOR flash programming
//!
//! The engine rewrites a range of flash so that it matches a range of
//! memory, touching as little of the device as possible:
//!
//! - Programming can only clear bits. A 4 KiB page is erased only if some
//!   byte needs a bit set that is currently clear.
//! - Bytes that already hold the wanted value are never programmed.
//! - Every programmed byte is read back and compared.

mod engine;
pub mod opcodes;

pub use engine::{needs_erase, program, wait_ready, FlashStats};

use crate::error::FlashError;

/// Erase granule and alignment requirement of a flash write
pub const PAGE_SIZE: u32 = 4096;

/// Size of the flash address space
pub const FLASH_SIZE: u32 = 16 * 1024 * 1024;

/// What to do when a programmed byte does not read back correctly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum VerifyPolicy {
    /// Report the mismatch and carry on with the remaining bytes and pages
    #[default]
    Continue,
    /// Report the mismatch and stop
    Abort,
}

/// Engine settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlashOptions {
    /// Verify mismatch handling
    pub verify: VerifyPolicy,
    /// Maximum status polls per operation; `None` waits forever
    pub poll_limit: Option<u32>,
}

/// Check that `[dest, dest + count)` is a valid flash write target
///
/// `dest` must be page aligned and the range must end within
/// [`FLASH_SIZE`].
pub fn check_range(dest: u32, count: u32) -> Result<(), FlashError> {
    if dest % PAGE_SIZE != 0 {
        return Err(FlashError::Unaligned { dest });
    }
    match dest.checked_add(count) {
        Some(end) if end <= FLASH_SIZE => Ok(()),
        _ => Err(FlashError::OutOfRange { dest, count }),
    }
}

/// Round `addr` up to the next page boundary
pub(crate) fn page_align_up(addr: u32) -> u32 {
    addr.div_ceil(PAGE_SIZE) * PAGE_SIZE
}
