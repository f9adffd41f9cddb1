//! Erase-minimizing, verify-on-write byte programmer

use core::ops::{Deref, DerefMut};

use super::opcodes::SR1_WIP;
use super::{check_range, page_align_up, FlashOptions, VerifyPolicy, PAGE_SIZE};
use crate::error::FlashError;
use crate::hal::{FlashController, Memory, Window};

/// Counters from one engine run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlashStats {
    /// Pages examined
    pub pages: u32,
    /// Sector erases issued
    pub erases: u32,
    /// Byte programs issued
    pub programs: u32,
    /// Bytes that did not read back as programmed
    pub mismatches: u32,
}

/// Return `true` if turning `have` into `want` needs an erase
///
/// Programming clears bits only, so an erase is required exactly when
/// `want` has a bit set that `have` has clear.
#[inline]
pub fn needs_erase(have: u8, want: u8) -> bool {
    have & want != want
}

/// Poll the status register until the write-in-progress bit clears
///
/// With `limit == None` this waits forever; the hardware is trusted to
/// finish eventually.
pub fn wait_ready<F: FlashController + ?Sized>(
    flash: &mut F,
    addr: u32,
    limit: Option<u32>,
) -> Result<(), FlashError> {
    let mut polls = 0u32;
    while flash.read_status() & SR1_WIP != 0 {
        polls = polls.saturating_add(1);
        if limit.is_some_and(|max| polls >= max) {
            return Err(FlashError::Timeout { addr });
        }
    }
    Ok(())
}

/// Redirects the controller window for as long as it lives
///
/// The saved window is restored on drop, so every exit from the engine
/// (including `?` on a timeout) puts the controller back.
struct WindowGuard<'f, F: FlashController + ?Sized> {
    flash: &'f mut F,
    saved: Window,
}

impl<'f, F: FlashController + ?Sized> WindowGuard<'f, F> {
    fn new(flash: &'f mut F, window: Window) -> Self {
        let saved = flash.window();
        flash.set_window(window);
        log::trace!(
            "flash window {:#x}..{:#x} (was {:#x}..{:#x})",
            window.low,
            window.high,
            saved.low,
            saved.high
        );
        Self { flash, saved }
    }
}

impl<F: FlashController + ?Sized> Deref for WindowGuard<'_, F> {
    type Target = F;

    fn deref(&self) -> &F {
        self.flash
    }
}

impl<F: FlashController + ?Sized> DerefMut for WindowGuard<'_, F> {
    fn deref_mut(&mut self) -> &mut F {
        self.flash
    }
}

impl<F: FlashController + ?Sized> Drop for WindowGuard<'_, F> {
    fn drop(&mut self) {
        self.flash.set_window(self.saved);
    }
}

/// Make flash `[dest, dest + count)` equal to memory `[src, src + count)`
///
/// The destination is validated with [`check_range`](super::check_range)
/// before anything is touched. Pages are processed in order; each
/// page is erased only if needed and only differing bytes are programmed.
/// Every verify mismatch is passed to `on_mismatch`; with
/// [`VerifyPolicy::Abort`] the first one also ends the run.
///
/// Bytes of the last page beyond `dest + count` are not part of the
/// comparison. If that page needs an erase they end up erased.
pub fn program<M, F, R>(
    memory: &mut M,
    flash: &mut F,
    src: u32,
    dest: u32,
    count: u32,
    options: &FlashOptions,
    mut on_mismatch: R,
) -> Result<FlashStats, FlashError>
where
    M: Memory + ?Sized,
    F: FlashController + ?Sized,
    R: FnMut(FlashError),
{
    check_range(dest, count)?;
    let mut stats = FlashStats::default();
    if count == 0 {
        return Ok(stats);
    }

    // In range after check_range, so no overflow
    let end = dest + count;
    let mut flash = WindowGuard::new(flash, Window::new(dest, page_align_up(end)));

    let mut page = dest;
    while page < end {
        let len = (end - page).min(PAGE_SIZE);
        let data = src.wrapping_add(page - dest);

        let erase = (0..len).any(|i| {
            let want = memory.read8(data.wrapping_add(i));
            needs_erase(flash.read(page + i), want)
        });

        if erase {
            log::debug!("erasing flash page {:#08x}", page);
            flash.write_enable();
            flash.erase_sector(page);
            wait_ready(&mut *flash, page, options.poll_limit)?;
            stats.erases += 1;
        }

        for i in 0..len {
            let addr = page + i;
            let want = memory.read8(data.wrapping_add(i));
            if flash.read(addr) == want {
                continue;
            }

            flash.write_enable();
            flash.program(addr, want);
            wait_ready(&mut *flash, addr, options.poll_limit)?;
            stats.programs += 1;

            let actual = flash.read(addr);
            if actual != want {
                stats.mismatches += 1;
                log::warn!(
                    "flash verify mismatch at {:#08x}: wrote {:#04x}, read {:#04x}",
                    addr,
                    want,
                    actual
                );
                let err = FlashError::VerifyFailed {
                    addr,
                    expected: want,
                    actual,
                };
                on_mismatch(err);
                if options.verify == VerifyPolicy::Abort {
                    return Err(err);
                }
            }
        }

        stats.pages += 1;
        page += PAGE_SIZE;
    }

    log::debug!(
        "flashed {:#x} bytes at {:#08x}: {} pages, {} erases, {} programs, {} mismatches",
        count,
        dest,
        stats.pages,
        stats.erases,
        stats.programs,
        stats.mismatches
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flash::opcodes;

    use std::vec;
    use std::vec::Vec;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Op {
        SetWindow(Window),
        WriteEnable,
        Erase(u32),
        Program(u32, u8),
    }

    /// Small flash model: program ANDs, erase fills a page with 0xFF
    struct MockFlash {
        data: Vec<u8>,
        window: Window,
        wel: bool,
        busy_polls: u32,
        pending_busy: u32,
        stuck_zero: Option<(u32, u8)>,
        ops: Vec<Op>,
    }

    impl MockFlash {
        fn new(size: usize) -> Self {
            Self {
                data: vec![0xFF; size],
                window: Window::new(0, 0x1000),
                wel: false,
                busy_polls: 0,
                pending_busy: 0,
                stuck_zero: None,
                ops: Vec::new(),
            }
        }

        fn erases(&self) -> usize {
            self.ops.iter().filter(|op| matches!(op, Op::Erase(_))).count()
        }

        fn programs(&self) -> usize {
            self.ops
                .iter()
                .filter(|op| matches!(op, Op::Program(..)))
                .count()
        }
    }

    impl FlashController for MockFlash {
        fn window(&mut self) -> Window {
            self.window
        }

        fn set_window(&mut self, window: Window) {
            self.ops.push(Op::SetWindow(window));
            self.window = window;
        }

        fn read(&mut self, offset: u32) -> u8 {
            assert!(self.window.contains(offset), "read outside window");
            self.data[offset as usize]
        }

        fn program(&mut self, offset: u32, value: u8) {
            assert!(self.wel, "program without WREN");
            self.ops.push(Op::Program(offset, value));
            let mut value = value;
            if let Some((addr, mask)) = self.stuck_zero {
                if addr == offset {
                    value &= !mask;
                }
            }
            self.data[offset as usize] &= value;
            self.wel = false;
            self.pending_busy = self.busy_polls;
        }

        fn write_enable(&mut self) {
            self.ops.push(Op::WriteEnable);
            self.wel = true;
        }

        fn erase_sector(&mut self, offset: u32) {
            assert!(self.wel, "erase without WREN");
            self.ops.push(Op::Erase(offset));
            let start = (offset & !(PAGE_SIZE - 1)) as usize;
            self.data[start..start + PAGE_SIZE as usize].fill(0xFF);
            self.wel = false;
            self.pending_busy = self.busy_polls;
        }

        fn read_status(&mut self) -> u8 {
            if self.pending_busy > 0 {
                self.pending_busy -= 1;
                opcodes::SR1_WIP
            } else {
                0
            }
        }
    }

    /// Source RAM at address 0x8000_0000
    struct Source(Vec<u8>);

    impl Memory for Source {
        fn read8(&mut self, addr: u32) -> u8 {
            self.0[(addr - 0x8000_0000) as usize]
        }
        fn read16(&mut self, _addr: u32) -> u16 {
            unreachable!()
        }
        fn read32(&mut self, _addr: u32) -> u32 {
            unreachable!()
        }
        fn write8(&mut self, _addr: u32, _value: u8) {
            unreachable!()
        }
        fn write16(&mut self, _addr: u32, _value: u16) {
            unreachable!()
        }
        fn write32(&mut self, _addr: u32, _value: u32) {
            unreachable!()
        }
    }

    const SRC: u32 = 0x8000_0000;

    fn run(
        memory: &mut Source,
        flash: &mut MockFlash,
        dest: u32,
        options: &FlashOptions,
    ) -> (Result<FlashStats, FlashError>, Vec<FlashError>) {
        let mut reported = Vec::new();
        let count = memory.0.len() as u32;
        let result = program(memory, flash, SRC, dest, count, options, |e| reported.push(e));
        (result, reported)
    }

    #[test]
    fn test_needs_erase() {
        assert!(!needs_erase(0xFF, 0x00));
        assert!(!needs_erase(0xF0, 0x30));
        assert!(needs_erase(0x00, 0x01));
        assert!(needs_erase(0x0F, 0xF0));
        assert!(!needs_erase(0x5A, 0x5A));
    }

    #[test]
    fn test_erased_flash_needs_no_erase() {
        let mut flash = MockFlash::new(0x4000);
        let mut memory = Source(vec![0x12, 0x34, 0xFF, 0x00]);
        let (result, reported) = run(&mut memory, &mut flash, 0x1000, &FlashOptions::default());

        let stats = result.unwrap();
        assert_eq!(stats.erases, 0);
        // 0xFF already matches and is skipped
        assert_eq!(stats.programs, 3);
        assert!(reported.is_empty());
        assert_eq!(&flash.data[0x1000..0x1004], &[0x12, 0x34, 0xFF, 0x00]);
    }

    #[test]
    fn test_idempotent_second_run() {
        let mut flash = MockFlash::new(0x4000);
        flash.data[0x1000..0x2000].fill(0x00);
        let mut memory = Source((0..0x1000u32).map(|i| i as u8).collect());

        let (first, _) = run(&mut memory, &mut flash, 0x1000, &FlashOptions::default());
        assert_eq!(first.unwrap().erases, 1);
        assert_eq!(flash.erases(), 1);

        flash.ops.clear();
        let (second, _) = run(&mut memory, &mut flash, 0x1000, &FlashOptions::default());
        let second = second.unwrap();
        assert_eq!(second.erases, 0);
        assert_eq!(second.programs, 0);
        assert_eq!(flash.erases(), 0);
        assert_eq!(flash.programs(), 0);
    }

    #[test]
    fn test_clearing_bits_only_programs() {
        let mut flash = MockFlash::new(0x4000);
        flash.data[0..4].copy_from_slice(&[0xFF, 0xF0, 0x0F, 0x33]);
        let mut memory = Source(vec![0x7F, 0x30, 0x0F, 0x11]);

        let (result, _) = run(&mut memory, &mut flash, 0, &FlashOptions::default());
        let stats = result.unwrap();
        assert_eq!(stats.erases, 0);
        assert_eq!(stats.programs, 3);
        assert_eq!(&flash.data[0..4], &[0x7F, 0x30, 0x0F, 0x11]);
    }

    #[test]
    fn test_erase_only_pages_that_need_it() {
        let mut flash = MockFlash::new(0x4000);
        // Page 1 holds a cleared bit that page data wants set
        flash.data[0x1800] = 0x00;
        let mut memory = Source(vec![0xA5; 0x3000]);

        let (result, _) = run(&mut memory, &mut flash, 0, &FlashOptions::default());
        let stats = result.unwrap();
        assert_eq!(stats.pages, 3);
        assert_eq!(stats.erases, 1);
        assert!(flash.ops.contains(&Op::Erase(0x1000)));
        assert!(flash.data[..0x3000].iter().all(|&b| b == 0xA5));
    }

    #[test]
    fn test_window_bracketing_and_restore() {
        let mut flash = MockFlash::new(0x4000);
        flash.window = Window::new(0, 0x1000);
        let mut memory = Source(vec![0x00; 0x1001]);

        let (result, _) = run(&mut memory, &mut flash, 0x1000, &FlashOptions::default());
        result.unwrap();
        assert_eq!(flash.ops.first(), Some(&Op::SetWindow(Window::new(0x1000, 0x3000))));
        assert_eq!(flash.ops.last(), Some(&Op::SetWindow(Window::new(0, 0x1000))));
        assert_eq!(flash.window, Window::new(0, 0x1000));
    }

    #[test]
    fn test_every_write_is_enabled_and_polled() {
        let mut flash = MockFlash::new(0x2000);
        flash.busy_polls = 3;
        flash.data[0] = 0x00;
        let mut memory = Source(vec![0x11, 0x22]);

        let (result, _) = run(&mut memory, &mut flash, 0, &FlashOptions::default());
        result.unwrap();
        let expected = [
            Op::WriteEnable,
            Op::Erase(0),
            Op::WriteEnable,
            Op::Program(0, 0x11),
            Op::WriteEnable,
            Op::Program(1, 0x22),
        ];
        assert_eq!(&flash.ops[1..flash.ops.len() - 1], &expected);
    }

    #[test]
    fn test_mismatch_continues_by_default() {
        let mut flash = MockFlash::new(0x3000);
        flash.stuck_zero = Some((0x0001, 0x80));
        let mut memory = Source(vec![0xAA; 0x1004]);
        memory.0[1] = 0xF0;

        let (result, reported) = run(&mut memory, &mut flash, 0, &FlashOptions::default());
        let stats = result.unwrap();
        assert_eq!(stats.mismatches, 1);
        assert_eq!(stats.pages, 2);
        assert_eq!(
            reported,
            vec![FlashError::VerifyFailed {
                addr: 1,
                expected: 0xF0,
                actual: 0x70
            }]
        );
        // Later bytes and the next page were still written
        assert_eq!(flash.data[2], 0xAA);
        assert_eq!(flash.data[0x1003], 0xAA);
    }

    #[test]
    fn test_mismatch_abort_policy() {
        let mut flash = MockFlash::new(0x3000);
        flash.window = Window::new(0x2000, 0x3000);
        flash.stuck_zero = Some((0x0001, 0x01));
        let mut memory = Source(vec![0x55; 0x10]);
        let options = FlashOptions {
            verify: VerifyPolicy::Abort,
            poll_limit: None,
        };

        let (result, reported) = run(&mut memory, &mut flash, 0, &options);
        assert!(matches!(result, Err(FlashError::VerifyFailed { addr: 1, .. })));
        assert_eq!(reported.len(), 1);
        assert_eq!(flash.data[2], 0xFF);
        assert_eq!(flash.window, Window::new(0x2000, 0x3000));
    }

    #[test]
    fn test_poll_limit_times_out_and_restores_window() {
        let mut flash = MockFlash::new(0x2000);
        flash.busy_polls = 100;
        let mut memory = Source(vec![0x00; 4]);
        let options = FlashOptions {
            verify: VerifyPolicy::Continue,
            poll_limit: Some(10),
        };

        let (result, _) = run(&mut memory, &mut flash, 0, &options);
        assert_eq!(result, Err(FlashError::Timeout { addr: 0 }));
        assert_eq!(flash.window, Window::new(0, 0x1000));
    }

    #[test]
    fn test_zero_count_touches_nothing() {
        let mut flash = MockFlash::new(0x1000);
        let mut memory = Source(Vec::new());
        let (result, _) = run(&mut memory, &mut flash, 0, &FlashOptions::default());
        assert_eq!(result, Ok(FlashStats::default()));
        assert!(flash.ops.is_empty());
    }

    #[test]
    fn test_bad_destination_touches_nothing() {
        let mut flash = MockFlash::new(0x1000);
        let mut memory = Source(vec![0; 0x10]);

        let options = FlashOptions::default();
        let result = program(&mut memory, &mut flash, SRC, 0xffff_f000, 0x2000, &options, |_| {});
        assert_eq!(
            result,
            Err(FlashError::OutOfRange {
                dest: 0xffff_f000,
                count: 0x2000
            })
        );

        let (result, _) = run(&mut memory, &mut flash, 0x10, &FlashOptions::default());
        assert_eq!(result, Err(FlashError::Unaligned { dest: 0x10 }));
        assert!(flash.ops.is_empty());
    }
}
