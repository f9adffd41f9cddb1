//! End-to-end scenarios: the whole monitor on the simulated board

use lolmon_core::flash::VerifyPolicy;
use lolmon_core::hal::{FlashController, Peripherals, Window};
use lolmon_core::{Monitor, MonitorConfig};
use lolmon_sim::{scripted, FlashOp, SimBoard, SimFlash};

fn monitor_with(
    peripherals: Peripherals<SimBoard>,
    config: MonitorConfig,
    boot_script: &'static [u8],
) -> Monitor<'static, SimBoard> {
    Monitor::new(peripherals, config, boot_script)
}

fn monitor() -> Monitor<'static, SimBoard> {
    monitor_with(scripted(b""), MonitorConfig::default(), b"")
}

/// Type `line` at the prompt and return what the command printed
fn run(monitor: &mut Monitor<'_, SimBoard>, line: &str) -> String {
    let transport = monitor.console().transport();
    transport.take_output();
    transport.feed(line.as_bytes());
    transport.feed(b"\r");

    monitor.step();

    let out = monitor.console().transport().take_output();
    let echo = format!("> {}\r\n", line);
    match out.strip_prefix(&echo) {
        Some(rest) => rest.to_string(),
        None => panic!("unexpected echo in {:?}", out),
    }
}

#[test]
fn write_then_read_round_trip() {
    let mut monitor = monitor();
    assert_eq!(run(&mut monitor, "wb 1000 0x11 0x22 0x33"), "");
    let out = run(&mut monitor, "rb 1000 3");
    assert_eq!(out, "00001000: 11 22 33\r\n");
    assert!(out.contains("1000: 11 22 33"));
}

#[test]
fn accessor_widths_reach_memory() {
    let mut monitor = monitor();
    run(&mut monitor, "ww 100 0x11223344");
    run(&mut monitor, "rh 100 2");
    let memory = monitor.memory();
    assert_eq!(memory.writes, [0, 0, 1]);
    assert_eq!(memory.reads, [0, 2, 0]);
}

#[test]
fn long_dump_wraps_rows() {
    let mut monitor = monitor();
    let out = run(&mut monitor, "rw 0 9");
    let rows: Vec<_> = out.split("\r\n").collect();
    assert_eq!(rows.len(), 3);
    assert!(rows[0].starts_with("00000000: 00000000"));
    assert_eq!(rows[1], "00000020: 00000000");
}

#[test]
fn unaligned_flash_destination_touches_nothing() {
    let mut monitor = monitor();
    assert_eq!(run(&mut monitor, "fl 1000 1001 10"), "Usage error\r\n");

    let flash = monitor.flash();
    assert!(flash.ops().is_empty());
    assert_eq!(flash.reads, 0);
    assert_eq!(flash.status_reads, 0);
}

#[test]
fn flash_range_past_end_is_rejected() {
    let mut monitor = monitor();
    assert_eq!(run(&mut monitor, "fl 0 fff000 4097"), "Usage error\r\n");
    assert!(monitor.flash().ops().is_empty());
}

#[test]
fn flash_twice_is_idempotent() {
    let mut peripherals = scripted(b"");
    peripherals.flash = SimFlash::with_data(&[0u8; 0x3000]).unwrap();
    let pattern: Vec<u8> = (0..0x1000u32).map(|i| i as u8).collect();
    peripherals.memory.load(0x8000, &pattern).unwrap();
    let mut monitor = monitor_with(peripherals, MonitorConfig::default(), b"");

    let out = run(&mut monitor, "fl 8000 1000 4096");
    assert_eq!(
        out,
        "Flashed 4096 bytes: 1 erases, 4080 byte programs, 0 mismatches\r\n"
    );
    assert_eq!(monitor.flash().erase_count(), 1);
    assert_eq!(&monitor.flash().data()[0x1000..0x2000], &pattern[..]);
    // Neighbouring pages are untouched
    assert_eq!(monitor.flash().data()[0xfff], 0);
    assert_eq!(monitor.flash().data()[0x2000], 0);

    monitor.flash().clear_ops();
    let out = run(&mut monitor, "fl 8000 1000 4096");
    assert_eq!(
        out,
        "Flashed 4096 bytes: 0 erases, 0 byte programs, 0 mismatches\r\n"
    );
    assert_eq!(monitor.flash().erase_count(), 0);
    assert_eq!(monitor.flash().program_count(), 0);
}

#[test]
fn clearing_bits_needs_no_erase() {
    let mut monitor = monitor();
    run(&mut monitor, "wb 8000 0x0f 0xf0 0xff 0x00");
    let out = run(&mut monitor, "fl 8000 2000 4");

    assert_eq!(
        out,
        "Flashed 4 bytes: 0 erases, 3 byte programs, 0 mismatches\r\n"
    );
    assert_eq!(&monitor.flash().data()[0x2000..0x2004], &[0x0f, 0xf0, 0xff, 0x00]);
}

#[test]
fn flash_restores_window() {
    let original = Window::new(0, 0x1000);
    let mut peripherals = scripted(b"");
    peripherals.flash = SimFlash::new().with_window(original);
    let mut monitor = monitor_with(peripherals, MonitorConfig::default(), b"");

    run(&mut monitor, "wb 8000 1 2 3");
    run(&mut monitor, "fl 8000 4000 0x1800");

    let flash = monitor.flash();
    assert_eq!(flash.window(), original);
    let ops = flash.ops();
    assert_eq!(ops.first(), Some(&FlashOp::SetWindow(Window::new(0x4000, 0x6000))));
    assert_eq!(ops.last(), Some(&FlashOp::SetWindow(original)));
    assert_eq!(flash.window_misses, 0);
    assert_eq!(&flash.data()[0x4000..0x4003], &[1, 2, 3]);
}

#[test]
fn verify_mismatch_continues_by_default() {
    let mut peripherals = scripted(b"");
    peripherals.flash.stick(0x1001);
    let mut monitor = monitor_with(peripherals, MonitorConfig::default(), b"");

    run(&mut monitor, "wb 8000 1 2 3");
    let out = run(&mut monitor, "fl 8000 1000 3");
    assert_eq!(
        out,
        "Verify error at 00001001: expected 02, got ff\r\n\
         Flashed 3 bytes: 0 erases, 3 byte programs, 1 mismatches\r\n"
    );
    assert_eq!(monitor.flash().data()[0x1002], 3);
}

#[test]
fn verify_mismatch_can_abort() {
    let mut peripherals = scripted(b"");
    peripherals.flash.stick(0x1001);
    let config = MonitorConfig {
        verify: VerifyPolicy::Abort,
        ..MonitorConfig::default()
    };
    let mut monitor = monitor_with(peripherals, config, b"");

    run(&mut monitor, "wb 8000 1 2 3");
    let out = run(&mut monitor, "fl 8000 1000 3");
    assert_eq!(out, "Verify error at 00001001: expected 02, got ff\r\n");
    assert_eq!(monitor.flash().data()[0x1002], 0xff);
    assert_eq!(monitor.flash().window(), Window::new(0, 16 * 1024 * 1024));
}

#[test]
fn poll_limit_turns_hang_into_timeout() {
    let mut peripherals = scripted(b"");
    peripherals.flash = SimFlash::new().with_busy_polls(1).with_hang();
    let config = MonitorConfig {
        poll_limit: Some(50),
        ..MonitorConfig::default()
    };
    let mut monitor = monitor_with(peripherals, config, b"");

    run(&mut monitor, "wb 8000 0");
    let out = run(&mut monitor, "fl 8000 1000 1");
    assert_eq!(out, "flash busy timeout at 00001000\r\n");
    assert_eq!(monitor.flash().status_reads, 50);
    assert_eq!(monitor.flash().window(), Window::new(0, 16 * 1024 * 1024));
}

#[test]
fn long_script_line_is_reported_and_skipped() {
    let mut script = Vec::new();
    script.extend_from_slice(b"echo before\n");
    script.extend(std::iter::repeat(b'x').take(200));
    script.extend_from_slice(b"\necho after\n\0");

    let mut peripherals = scripted(b"");
    peripherals.memory.load(0x2000, &script).unwrap();
    let mut monitor = monitor_with(peripherals, MonitorConfig::default(), b"");

    let out = run(&mut monitor, "src 2000");
    let lines: Vec<_> = out.split("\r\n").collect();
    assert_eq!(lines[0], "before ");
    assert_eq!(lines[1], format!("Line too long: {}", "x".repeat(127)));
    assert_eq!(lines[2], "after ");
}

#[test]
fn script_comments_and_nesting() {
    let mut peripherals = scripted(b"");
    peripherals
        .memory
        .load(0x3000, b"# inner script\necho inner # trailing\n\0")
        .unwrap();
    peripherals
        .memory
        .load(0x2000, b"echo outer\nsrc 3000\necho done\0")
        .unwrap();
    let mut monitor = monitor_with(peripherals, MonitorConfig::default(), b"");

    assert_eq!(
        run(&mut monitor, "src 2000"),
        "outer \r\ninner \r\ndone \r\n"
    );
}

#[test]
fn recursive_script_hits_depth_limit() {
    let mut peripherals = scripted(b"");
    peripherals
        .memory
        .load(0x2000, b"echo level\nsrc 2000\n\0")
        .unwrap();
    let config = MonitorConfig {
        max_script_depth: 3,
        ..MonitorConfig::default()
    };
    let mut monitor = monitor_with(peripherals, config, b"");

    assert_eq!(
        run(&mut monitor, "src 2000"),
        "level \r\nlevel \r\nlevel \r\nScript nesting too deep\r\n"
    );
    // Still usable afterwards
    assert_eq!(run(&mut monitor, "echo ok"), "ok \r\n");
}

#[test]
fn boot_command_works_with_autoboot_off() {
    let config = MonitorConfig {
        autoboot: false,
        ..MonitorConfig::default()
    };
    let mut monitor = monitor_with(scripted(b""), config, b"wb 100 0x42\necho autoboot");
    monitor.boot();

    assert_eq!(
        monitor.console().transport().take_output(),
        "Welcome to lolmon\r\n"
    );
    assert_eq!(monitor.memory().peek(0x100, 1), vec![0x00]);
    assert!(monitor.timer().starts.is_empty());

    assert_eq!(run(&mut monitor, "boot"), "autoboot \r\n");
    assert_eq!(monitor.memory().peek(0x100, 1), vec![0x42]);
}

#[test]
fn boot_script_runs_without_key() {
    let mut monitor = monitor_with(
        scripted(b""),
        MonitorConfig::default(),
        b"wb 100 0x42\necho autoboot",
    );
    monitor.boot();

    let out = monitor.console().transport().take_output();
    assert_eq!(
        out,
        "Welcome to lolmon\r\n\
         Press any key to avoid running the default boot script\r\n\
         autoboot \r\n"
    );
    assert_eq!(monitor.memory().peek(0x100, 1), vec![0x42]);
    assert!(monitor.watchdog().disabled);
    assert!(monitor.flash().is_initialized());
    assert!(monitor.console().transport().is_initialized());
    assert_eq!(monitor.timer().starts, vec![1_000_000]);
}

#[test]
fn key_press_skips_boot_script() {
    let mut monitor = monitor_with(scripted(b"x"), MonitorConfig::default(), b"echo autoboot\n");
    monitor.boot();
    let out = monitor.console().transport().take_output();
    assert!(!out.contains("autoboot "));

    // The key is the start of the first interactive line
    monitor.console().transport().feed(b"\r");
    monitor.step();
    assert_eq!(
        monitor.console().transport().take_output(),
        "> x\r\nUnknown command x\r\n"
    );

    // `boot` runs the script on demand
    assert_eq!(run(&mut monitor, "boot"), "autoboot \r\n");
}

#[test]
fn exception_report_returns_to_shell() {
    let mut monitor = monitor();
    monitor.report_exception(0x10);
    assert_eq!(
        monitor.console().transport().take_output(),
        "\r\nException 10, Data abort\r\n"
    );
    assert_eq!(run(&mut monitor, "echo alive"), "alive \r\n");
}

#[test]
fn call_reset_and_barrier() {
    let mut monitor = monitor();
    assert_eq!(run(&mut monitor, "call 8000 1 2 3"), "");
    assert_eq!(run(&mut monitor, "imb"), "");
    assert_eq!(run(&mut monitor, "rst"), "");

    assert_eq!(monitor.cpu().calls, vec![(0x8000, [1, 2, 3])]);
    assert_eq!(monitor.cpu().barriers, 2);
    assert_eq!(monitor.watchdog().resets, 1);
}

#[test]
fn line_editing_over_the_console() {
    let mut monitor = monitor();
    monitor.console().transport().feed(b"ecoo\x08\x08ho hi\r");
    monitor.step();
    let out = monitor.console().transport().take_output();
    assert!(out.ends_with("\r\nhi \r\n"), "{:?}", out);
}

#[test]
fn peripherals_can_be_recovered() {
    let mut monitor = monitor();
    run(&mut monitor, "wb 10 7");
    let peripherals = monitor.into_peripherals();
    assert_eq!(peripherals.memory.peek(0x10, 1), vec![7]);
}
