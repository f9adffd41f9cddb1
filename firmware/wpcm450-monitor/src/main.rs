//! lolmon firmware for the Nuvoton WPCM450
//!
//! Sets up a stack, zeroes `.bss` and hands over to the monitor. Every
//! exception vector switches back to supervisor mode on a fresh stack and
//! re-enters the monitor's shell with the vector offset, so a bad `rw` or
//! `call` leaves the operator at a prompt instead of a dead board.

#![no_std]
#![no_main]

mod logger;

use core::arch::global_asm;
use core::panic::PanicInfo;

use lolmon_core::console::Console;
use lolmon_core::hal::Watchdog as _;
use lolmon_core::{Monitor, MonitorConfig};

static BOOT_SCRIPT: &[u8] = include_bytes!("../bootscript.txt");

global_asm!(
    r#"
    .section .vectors, "ax"
    .arm
    .global _start
_start:
    b       reset
    b       undefined_entry
    b       swi_entry
    b       prefetch_abort_entry
    b       data_abort_entry
    b       .
    b       irq_entry
    b       fiq_entry

reset:
    msr     cpsr_c, #0xd3
    ldr     sp, =_stack_top
    ldr     r0, =__bss_start
    ldr     r1, =__bss_end
    mov     r2, #0
1:
    cmp     r0, r1
    strlo   r2, [r0], #4
    blo     1b
    bl      monitor_main
    b       .

    .macro exception_entry name, vector
\name:
    msr     cpsr_c, #0xd3
    ldr     sp, =_stack_top
    mov     r0, #\vector
    bl      monitor_exception
    b       .
    .endm

    exception_entry undefined_entry, 0x04
    exception_entry swi_entry, 0x08
    exception_entry prefetch_abort_entry, 0x0c
    exception_entry data_abort_entry, 0x10
    exception_entry irq_entry, 0x18
    exception_entry fiq_entry, 0x1c
"#
);

fn monitor() -> Monitor<'static, lolmon_wpcm450::Wpcm450> {
    // SAFETY: this is a WPCM450 and no other handles are live: either we
    // just came out of reset, or an exception threw the old stack away
    let peripherals = unsafe { lolmon_wpcm450::peripherals() };
    Monitor::new(peripherals, MonitorConfig::default(), BOOT_SCRIPT)
}

#[no_mangle]
extern "C" fn monitor_main() -> ! {
    logger::init();
    monitor().start()
}

#[no_mangle]
extern "C" fn monitor_exception(vector: u32) -> ! {
    monitor().handle_exception(vector)
}

#[panic_handler]
fn panic(info: &PanicInfo<'_>) -> ! {
    // SAFETY: the monitor is not coming back, nothing else drives these
    let mut console = Console::new(unsafe { lolmon_wpcm450::Uart::new() });
    writeln!(console, "\npanic: {}", info);

    let mut watchdog = unsafe { lolmon_wpcm450::Watchdog::new() };
    watchdog.reset();
    loop {}
}
