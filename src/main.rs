//! lolmon - a bare-metal debug monitor
//!
//! This binary runs the monitor core on the host against a simulated
//! board. The shell talks over stdin/stdout; memory, flash, CPU and
//! watchdog are the in-memory models from `lolmon-sim`, optionally seeded
//! from files and with the flash contents written back at the end of the
//! session.
//!
//! The session ends when stdin is exhausted or a command resets the board
//! through the watchdog (`rst`).

mod board;
mod cli;
mod config;

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::atomic::Ordering;

use clap::Parser;
use cli::Cli;
use config::{read_file, BoardConfig, ConfigError};
use lolmon_core::hal::{IoTransport, Peripherals};
use lolmon_core::Monitor;
use lolmon_sim::{SimCpu, SimFlash, SimMemory, SimWatchdog};

use board::{HostBoard, HostPort, WallTimer};

fn main() -> ExitCode {
    // Initialize logger; stdout belongs to the monitor console
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => BoardConfig::load(path)?,
        None => BoardConfig::default(),
    };
    config.apply_cli(cli);

    // Still linked in with autoboot off, for the `boot` command
    let boot_script = match &config.boot_script {
        Some(path) => read_file(path)?,
        None => Vec::new(),
    };

    let port = HostPort::spawn(io::stdin(), io::stdout())?;
    let eof = port.eof();
    let peripherals = Peripherals::<HostBoard> {
        transport: IoTransport::new(port),
        timer: WallTimer::default(),
        watchdog: SimWatchdog::default(),
        memory: preload_memory(&config)?,
        flash: open_flash(&config)?,
        cpu: SimCpu::default(),
    };

    let mut monitor = Monitor::new(peripherals, config.monitor, &boot_script);
    monitor.boot();
    while !eof.load(Ordering::Acquire) && monitor.watchdog().resets == 0 {
        monitor.step();
    }
    io::stdout().flush()?;

    let peripherals = monitor.into_peripherals();
    if peripherals.watchdog.resets > 0 {
        log::info!("board reset requested, ending session");
    }
    if let Some(path) = &config.flash.save {
        peripherals.flash.save(path)?;
        log::info!("saved flash to {}", path.display());
    }
    Ok(())
}

fn preload_memory(config: &BoardConfig) -> Result<SimMemory, ConfigError> {
    let mut memory = SimMemory::new();
    for entry in &config.load {
        let data = read_file(&entry.file)?;
        memory.load(entry.addr, &data)?;
        log::info!(
            "loaded {} ({} bytes) at {:#010x}",
            entry.file.display(),
            data.len(),
            entry.addr
        );
    }
    Ok(memory)
}

fn open_flash(config: &BoardConfig) -> Result<SimFlash, ConfigError> {
    match &config.flash.image {
        Some(path) => {
            let flash = SimFlash::from_file(path)?;
            log::info!("flash image {}", path.display());
            Ok(flash)
        }
        None => Ok(SimFlash::new()),
    }
}
