//! CLI argument parsing

use clap::Parser;
use std::path::PathBuf;

/// Parse a string as a hex or decimal u32
fn parse_hex_u32(s: &str) -> Result<u32, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u32>().map_err(|e| format!("Invalid number: {}", e))
    }
}

/// A file to place in simulated memory before boot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadArg {
    pub addr: u32,
    pub file: PathBuf,
}

/// Parse `ADDR=FILE`
fn parse_load(s: &str) -> Result<LoadArg, String> {
    let (addr, file) = s
        .split_once('=')
        .ok_or_else(|| format!("Expected ADDR=FILE, got '{}'", s))?;
    if file.is_empty() {
        return Err(format!("Missing file name in '{}'", s));
    }
    Ok(LoadArg {
        addr: parse_hex_u32(addr.trim())?,
        file: PathBuf::from(file),
    })
}

#[derive(Parser, Debug)]
#[command(name = "lolmon")]
#[command(
    author,
    version,
    about = "Run the lolmon debug monitor on a simulated board over stdin/stdout",
    long_about = None
)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Board file (TOML) with [monitor], [flash] and [[load]] tables
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Script to run at boot unless a key is pressed
    #[arg(short, long)]
    pub boot_script: Option<PathBuf>,

    /// Initial flash contents (at most 16 MiB, the rest reads as erased)
    #[arg(long)]
    pub flash_image: Option<PathBuf>,

    /// Write the flash contents here when the session ends
    #[arg(long)]
    pub save_flash: Option<PathBuf>,

    /// Preload FILE into memory at ADDR (hex with 0x, or decimal); repeatable
    #[arg(long = "load", value_name = "ADDR=FILE", value_parser = parse_load)]
    pub loads: Vec<LoadArg>,

    /// Do not run the boot script at startup (`boot` still runs it)
    #[arg(long)]
    pub no_autoboot: bool,
}
