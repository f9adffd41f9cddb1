//! ARM926EJ-S primitives

use lolmon_core::hal::Cpu;

/// The ARM926EJ-S core
///
/// The core has separate instruction and data caches, so code written
/// through the data side has to be cleaned out and the instruction cache
/// invalidated before it can be executed.
pub struct Arm926 {
    _private: (),
}

impl Arm926 {
    /// Handle for the executing core
    ///
    /// # Safety
    ///
    /// `call` jumps to arbitrary addresses; the caller vouches that the
    /// operator is allowed to do that.
    pub unsafe fn new() -> Self {
        Self { _private: () }
    }
}

#[cfg(target_arch = "arm")]
fn sync_caches() {
    // SAFETY: CP15 cache maintenance only; no memory is changed
    unsafe {
        core::arch::asm!(
            // Test, clean and invalidate the whole D-cache
            "1:",
            "mrc p15, 0, APSR_nzcv, c7, c14, 3",
            "bne 1b",
            "mov {zero}, #0",
            // Drain the write buffer
            "mcr p15, 0, {zero}, c7, c10, 4",
            // Invalidate the I-cache
            "mcr p15, 0, {zero}, c7, c5, 0",
            zero = out(reg) _,
            options(nostack),
        );
    }
}

#[cfg(not(target_arch = "arm"))]
fn sync_caches() {
    core::sync::atomic::compiler_fence(core::sync::atomic::Ordering::SeqCst);
}

impl Cpu for Arm926 {
    fn instruction_barrier(&mut self) {
        sync_caches();
    }

    fn call(&mut self, addr: u32, args: [u32; 3]) -> u32 {
        log::debug!("calling {:#010x}", addr);
        // SAFETY: the operator asked for exactly this jump
        let f: extern "C" fn(u32, u32, u32) -> u32 =
            unsafe { core::mem::transmute(addr as usize) };
        f(args[0], args[1], args[2])
    }
}
