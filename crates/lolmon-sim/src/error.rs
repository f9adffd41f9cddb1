//! Error types for the simulated board

use std::path::PathBuf;

use thiserror::Error;

/// Simulation setup errors
#[derive(Debug, Error)]
pub enum SimError {
    /// Data does not fit into the flash device
    #[error("image of {len:#x} bytes at offset {offset:#x} exceeds flash size {size:#x}")]
    ImageTooLarge { offset: u32, len: usize, size: u32 },

    /// Data would wrap around the 32-bit address space
    #[error("{len:#x} bytes at {addr:#010x} wrap the address space")]
    AddressWrap { addr: u32, len: usize },

    /// Reading or writing an image file failed
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for simulation setup
pub type Result<T> = std::result::Result<T, SimError>;
