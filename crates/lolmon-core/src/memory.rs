//! Width-generic raw memory access

use crate::console::Console;
use crate::hal::{Memory, Transport};

/// Access width of a memory command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    /// 8-bit
    Byte,
    /// 16-bit
    Half,
    /// 32-bit
    Word,
}

impl Width {
    /// Derive the width from the second character of a command name
    /// (`rb`, `wh`, `cw`, ...)
    pub fn from_command(name: &str) -> Option<Self> {
        match name.as_bytes().get(1)? {
            b'b' => Some(Self::Byte),
            b'h' => Some(Self::Half),
            b'w' => Some(Self::Word),
            _ => None,
        }
    }

    /// Size of one element in bytes
    pub const fn bytes(self) -> u32 {
        match self {
            Self::Byte => 1,
            Self::Half => 2,
            Self::Word => 4,
        }
    }

    /// Elements per row of a dump
    pub const fn per_row(self) -> u32 {
        match self {
            Self::Byte | Self::Half => 16,
            Self::Word => 8,
        }
    }

    /// Read one element, zero-extended
    pub fn read<M: Memory + ?Sized>(self, memory: &mut M, addr: u32) -> u32 {
        match self {
            Self::Byte => memory.read8(addr) as u32,
            Self::Half => memory.read16(addr) as u32,
            Self::Word => memory.read32(addr),
        }
    }

    /// Write one element, truncating `value` to the width
    pub fn write<M: Memory + ?Sized>(self, memory: &mut M, addr: u32, value: u32) {
        match self {
            Self::Byte => memory.write8(addr, value as u8),
            Self::Half => memory.write16(addr, value as u16),
            Self::Word => memory.write32(addr, value),
        }
    }
}

/// Print `count` elements starting at `addr`
///
/// Each row starts with the 8-digit address of its first element; elements
/// are zero-padded to the width.
pub fn dump<M, T>(memory: &mut M, console: &mut Console<T>, width: Width, addr: u32, count: u32)
where
    M: Memory + ?Sized,
    T: Transport,
{
    let digits = width.bytes() as usize * 2;
    let mut addr = addr;
    let mut column = 0;

    for i in 0..count {
        if column == 0 {
            if i != 0 {
                console.putc(b'\n');
            }
            write!(console, "{:08x}: ", addr);
        } else {
            console.putc(b' ');
        }

        let value = width.read(memory, addr);
        write!(console, "{:0digits$x}", value, digits = digits);

        addr = addr.wrapping_add(width.bytes());
        column += 1;
        if column == width.per_row() {
            column = 0;
        }
    }
    console.putc(b'\n');
}

/// Copy `count` elements from `src` to `dest`, lowest address first
///
/// Overlapping ranges are not special-cased.
pub fn copy<M: Memory + ?Sized>(memory: &mut M, width: Width, src: u32, dest: u32, count: u32) {
    let step = width.bytes();
    let (mut src, mut dest) = (src, dest);
    for _ in 0..count {
        let value = width.read(memory, src);
        width.write(memory, dest, value);
        src = src.wrapping_add(step);
        dest = dest.wrapping_add(step);
    }
}
