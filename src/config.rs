//! Board file parsing
//!
//! A board file describes the simulated board the monitor runs on:
//!
//! ```toml
//! boot_script = "boot.txt"
//!
//! [monitor]
//! key_wait_us = 500000
//! verify = "abort"
//! poll_limit = 100000
//!
//! [flash]
//! image = "bmc.img"
//! save = "bmc-out.img"
//!
//! [[load]]
//! addr = "0x8000"
//! file = "payload.bin"
//! ```
//!
//! Relative paths are resolved against the directory of the board file.
//! Command-line options override the file.

use std::path::{Path, PathBuf};

use lolmon_core::MonitorConfig;
use serde::Deserialize;

use crate::cli::{Cli, LoadArg};

/// Errors while assembling the board
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid board file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    Sim(#[from] lolmon_sim::SimError),
}

/// Read a whole file, naming it in the error
pub fn read_file(path: &Path) -> Result<Vec<u8>, ConfigError> {
    std::fs::read(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Flash image locations
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlashFiles {
    /// Initial contents
    pub image: Option<PathBuf>,
    /// Where to write the contents back at exit
    pub save: Option<PathBuf>,
}

/// One memory preload
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoadEntry {
    #[serde(deserialize_with = "deserialize_hex_u32")]
    pub addr: u32,
    pub file: PathBuf,
}

impl From<LoadArg> for LoadEntry {
    fn from(arg: LoadArg) -> Self {
        Self {
            addr: arg.addr,
            file: arg.file,
        }
    }
}

/// Everything needed to bring up the simulated board
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoardConfig {
    pub boot_script: Option<PathBuf>,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub flash: FlashFiles,
    #[serde(default)]
    pub load: Vec<LoadEntry>,
}

/// Deserialize a u32 that can be hex (0x...) or decimal
fn deserialize_hex_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum HexOrInt {
        Int(u32),
        Str(String),
    }

    match HexOrInt::deserialize(deserializer)? {
        HexOrInt::Int(n) => Ok(n),
        HexOrInt::Str(s) => parse_number(&s).map_err(serde::de::Error::custom),
    }
}

/// Parse a number that can be hex (0x...) or decimal
fn parse_number(s: &str) -> Result<u32, String> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("invalid hex: {}", e))
    } else {
        s.parse().map_err(|e| format!("invalid number: {}", e))
    }
}

impl BoardConfig {
    /// Parse board file contents; paths are left as written
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Load a board file, resolving its paths against its directory
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if let Some(dir) = path.parent() {
            config.resolve_paths(dir);
        }
        log::debug!("loaded board file {}", path.display());
        Ok(config)
    }

    fn resolve_paths(&mut self, dir: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = dir.join(&*p);
            }
        };
        let optional = [
            &mut self.boot_script,
            &mut self.flash.image,
            &mut self.flash.save,
        ];
        for path in optional.into_iter().flatten() {
            resolve(path);
        }
        for entry in &mut self.load {
            resolve(&mut entry.file);
        }
    }

    /// Apply command-line overrides
    ///
    /// Single-valued options replace the file's values; `--load` entries
    /// are placed after the file's, so they win where they overlap.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(path) = &cli.boot_script {
            self.boot_script = Some(path.clone());
        }
        if let Some(path) = &cli.flash_image {
            self.flash.image = Some(path.clone());
        }
        if let Some(path) = &cli.save_flash {
            self.flash.save = Some(path.clone());
        }
        self.load
            .extend(cli.loads.iter().cloned().map(LoadEntry::from));
        if cli.no_autoboot {
            self.monitor.autoboot = false;
        }
    }
}
