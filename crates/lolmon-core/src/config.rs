//! Monitor configuration

use crate::flash::{FlashOptions, VerifyPolicy};

/// Default boot key-wait: one second
pub const DEFAULT_KEY_WAIT_US: u32 = 1_000_000;

/// Default limit on nested `src`/`boot` scripts
pub const DEFAULT_MAX_SCRIPT_DEPTH: usize = 8;

/// Runtime settings of a [`Monitor`](crate::Monitor)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct MonitorConfig {
    /// Run the boot script at startup unless a key interrupts it
    pub autoboot: bool,
    /// How long to wait for a key before running the boot script
    pub key_wait_us: u32,
    /// Flash verify mismatch handling
    pub verify: VerifyPolicy,
    /// Maximum nesting of scripts, counting the boot script
    pub max_script_depth: usize,
    /// Maximum flash status polls per operation; unbounded if unset
    pub poll_limit: Option<u32>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            autoboot: true,
            key_wait_us: DEFAULT_KEY_WAIT_US,
            verify: VerifyPolicy::Continue,
            max_script_depth: DEFAULT_MAX_SCRIPT_DEPTH,
            poll_limit: None,
        }
    }
}

impl MonitorConfig {
    /// Flash engine settings derived from this configuration
    pub fn flash_options(&self) -> FlashOptions {
        FlashOptions {
            verify: self.verify,
            poll_limit: self.poll_limit,
        }
    }
}
