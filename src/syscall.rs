//! Decoder registry and the result protocol shared by all decoders.

use crate::printer::{Hex, Printer};
use crate::{io, ioctl, kexec, stat, time};

/// What a decoder did at one syscall-stop.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Rval {
    /// Nothing was printed for the argument; the caller falls back to a raw rendering.
    NotDecoded,

    /// Decoding is complete.
    Decoded,

    /// Decoding continues at the exiting stop.
    NeedsExit,
}

/// Decoder for one syscall, run at the entering stop and, if it asks, at the exiting one.
pub type SysFunc = fn(&mut Printer<'_>) -> Rval;

/// Print the first `nargs` arguments in hex.
pub fn printargs(p: &mut Printer<'_>, nargs: usize) -> Rval {
    if p.entering() {
        let pers = p.personality();
        for n in 0..nargs.min(p.tcp().args().len()) {
            let arg = pers.widen_to_ulong(p.tcp().arg(n));
            if n > 0 {
                p.tprints(", ");
            }
            tprintf!(p, "{}", Hex(arg));
        }
    }

    Rval::Decoded
}

const DECODERS: &[(&str, SysFunc)] = &[
    ("ioctl", ioctl::sys_ioctl),
    ("readv", io::sys_readv),
    ("writev", io::sys_writev),
    ("gettimeofday", time::sys_gettimeofday),
    ("settimeofday", time::sys_settimeofday),
    ("utimes", time::sys_utimes),
    ("futimesat", time::sys_futimesat),
    ("getitimer", time::sys_getitimer),
    ("setitimer", time::sys_setitimer),
    ("getrusage", time::sys_getrusage),
    ("stat", stat::sys_stat),
    ("lstat", stat::sys_lstat),
    ("fstat", stat::sys_fstat),
    ("newfstatat", stat::sys_newfstatat),
    ("kexec_load", kexec::sys_kexec_load),
    ("kexec_file_load", kexec::sys_kexec_file_load),
];

/// The decoder for the syscall called `name`, if there is one.
pub fn decoder(name: &str) -> Option<SysFunc> {
    DECODERS.iter().find(|(n, _)| *n == name).map(|&(_, f)| f)
}

/// Names of all syscalls with a dedicated decoder.
pub fn decoded_syscalls() -> impl Iterator<Item = &'static str> {
    DECODERS.iter().map(|&(name, _)| name)
}
