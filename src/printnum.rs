//! Printing integers that live in tracee memory, as `[v]` or `[v1, v2]`.

use std::convert::TryInto;
use std::fmt;

use crate::printer::{Hex, Printer};

/// Rendering of a fetched integer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NumFmt {
    /// `%d`
    Signed,

    /// `%u`
    Unsigned,

    /// `%#x`
    Hex,

    /// `%#o`
    Octal,
}

/// An integer of `bits` width rendered with a [`NumFmt`].
#[derive(Clone, Copy, Debug)]
pub struct Num {
    raw: u64,
    bits: u32,
    fmt: NumFmt,
}

impl Num {
    pub fn new(raw: u64, bits: u32, fmt: NumFmt) -> Self {
        Self { raw, bits, fmt }
    }
}

impl fmt::Display for Num {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shift = 64 - self.bits;
        let unsigned = (self.raw << shift) >> shift;

        match self.fmt {
            NumFmt::Signed => write!(f, "{}", ((self.raw << shift) as i64) >> shift),
            NumFmt::Unsigned => write!(f, "{}", unsigned),
            NumFmt::Hex => write!(f, "{}", Hex(unsigned)),
            NumFmt::Octal if unsigned == 0 => f.write_str("0"),
            NumFmt::Octal => write!(f, "0{:o}", unsigned),
        }
    }
}

impl<'a> Printer<'a> {
    fn printnum<const N: usize>(&mut self, addr: u64, fmt: NumFmt, count: usize) -> bool {
        let mut buf = vec![0; N * count];
        if !self.umoven_or_printaddr(addr, &mut buf) {
            return false;
        }

        self.tprints("[");
        for (i, chunk) in buf.chunks_exact(N).enumerate() {
            if i > 0 {
                self.tprints(", ");
            }
            let raw = match N {
                2 => u64::from(u16::from_ne_bytes(chunk.try_into().unwrap_or_default())),
                4 => u64::from(u32::from_ne_bytes(chunk.try_into().unwrap_or_default())),
                _ => u64::from_ne_bytes(chunk.try_into().unwrap_or_default()),
            };
            tprintf!(self, "{}", Num::new(raw, 8 * N as u32, fmt));
        }
        self.tprints("]");

        true
    }

    pub fn printnum_short(&mut self, addr: u64, fmt: NumFmt) -> bool {
        self.printnum::<2>(addr, fmt, 1)
    }

    pub fn printnum_int(&mut self, addr: u64, fmt: NumFmt) -> bool {
        self.printnum::<4>(addr, fmt, 1)
    }

    pub fn printnum_int64(&mut self, addr: u64, fmt: NumFmt) -> bool {
        self.printnum::<8>(addr, fmt, 1)
    }

    pub fn printpair_int(&mut self, addr: u64, fmt: NumFmt) -> bool {
        self.printnum::<4>(addr, fmt, 2)
    }

    pub fn printpair_int64(&mut self, addr: u64, fmt: NumFmt) -> bool {
        self.printnum::<8>(addr, fmt, 2)
    }

    /// A tracee `long`, whose width depends on the personality of the call.
    pub fn printnum_long_int(&mut self, addr: u64, fmt: NumFmt) -> bool {
        if self.personality().word_size() > 4 {
            self.printnum_int64(addr, fmt)
        } else {
            self.printnum_int(addr, fmt)
        }
    }

    pub fn printnum_slong(&mut self, addr: u64) -> bool {
        self.printnum_long_int(addr, NumFmt::Signed)
    }

    pub fn printnum_ulong(&mut self, addr: u64) -> bool {
        self.printnum_long_int(addr, NumFmt::Unsigned)
    }

    pub fn printnum_ptr(&mut self, addr: u64) -> bool {
        self.printnum_long_int(addr, NumFmt::Hex)
    }
}
