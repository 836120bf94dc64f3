//! Ioctl request codes and the `ioctl(2)` decoder.

use crate::personality::Personality;
use crate::printer::{Hex, Printer};
use crate::syscall::Rval;
use crate::{block, dm, v4l2};

pub const IOC_NONE: u32 = 0;
pub const IOC_WRITE: u32 = 1;
pub const IOC_READ: u32 = 2;

const IOC_NRBITS: u32 = 8;
const IOC_TYPEBITS: u32 = 8;
const IOC_SIZEBITS: u32 = 14;

const IOC_NRSHIFT: u32 = 0;
const IOC_TYPESHIFT: u32 = IOC_NRSHIFT + IOC_NRBITS;
const IOC_SIZESHIFT: u32 = IOC_TYPESHIFT + IOC_TYPEBITS;
const IOC_DIRSHIFT: u32 = IOC_SIZESHIFT + IOC_SIZEBITS;

pub const fn ioc(dir: u32, ty: u32, nr: u32, size: usize) -> u32 {
    (dir << IOC_DIRSHIFT) | ((size as u32) << IOC_SIZESHIFT) | (ty << IOC_TYPESHIFT) | (nr << IOC_NRSHIFT)
}

pub const fn io(ty: u32, nr: u32) -> u32 {
    ioc(IOC_NONE, ty, nr, 0)
}

pub const fn ior(ty: u32, nr: u32, size: usize) -> u32 {
    ioc(IOC_READ, ty, nr, size)
}

pub const fn iow(ty: u32, nr: u32, size: usize) -> u32 {
    ioc(IOC_WRITE, ty, nr, size)
}

pub const fn iowr(ty: u32, nr: u32, size: usize) -> u32 {
    ioc(IOC_READ | IOC_WRITE, ty, nr, size)
}

pub const fn ioc_dir(code: u32) -> u32 {
    code >> IOC_DIRSHIFT
}

pub const fn ioc_type(code: u32) -> u32 {
    (code >> IOC_TYPESHIFT) & ((1 << IOC_TYPEBITS) - 1)
}

pub const fn ioc_nr(code: u32) -> u32 {
    (code >> IOC_NRSHIFT) & ((1 << IOC_NRBITS) - 1)
}

pub const fn ioc_size(code: u32) -> u32 {
    (code >> IOC_SIZESHIFT) & ((1 << IOC_SIZEBITS) - 1)
}

/// Symbolic name of an ioctl request as issued under `pers`.
pub fn ioctl_name(code: u32, pers: Personality) -> Option<&'static str> {
    match ioc_type(code) {
        block::IOCTL_TYPE => block::BlkCmd::from_code(code, pers).map(|cmd| cmd.name()),
        dm::IOCTL_TYPE => dm::DmCmd::from_code(code).map(|cmd| cmd.name()),
        v4l2::IOCTL_TYPE => v4l2::V4l2Cmd::from_code(code, pers).map(|cmd| cmd.name()),
        _ => None,
    }
}

/// Print an ioctl request as its name, or as `_IOC(dir, type, nr, size)`.
pub fn print_code(p: &mut Printer<'_>, code: u32) {
    if let Some(name) = ioctl_name(code, p.personality()) {
        p.tprints(name);
        return;
    }

    p.tprints("_IOC(");
    match ioc_dir(code) {
        IOC_NONE => p.tprints("_IOC_NONE"),
        IOC_READ => p.tprints("_IOC_READ"),
        IOC_WRITE => p.tprints("_IOC_WRITE"),
        _ => p.tprints("_IOC_READ|_IOC_WRITE"),
    }
    tprintf!(
        p,
        ", {}, {}, {})",
        Hex(u64::from(ioc_type(code))),
        Hex(u64::from(ioc_nr(code))),
        Hex(u64::from(ioc_size(code)))
    );
}

/// Run the decoder for the ioctl family `code` belongs to.
pub fn decode(p: &mut Printer<'_>, code: u32, arg: u64) -> Rval {
    match ioc_type(code) {
        block::IOCTL_TYPE => block::decode(p, code, arg),
        dm::IOCTL_TYPE => dm::decode(p, code, arg),
        v4l2::IOCTL_TYPE => v4l2::decode(p, code, arg),
        _ => Rval::NotDecoded,
    }
}

/// `ioctl(fd, request, arg)`
pub fn sys_ioctl(p: &mut Printer<'_>) -> Rval {
    let code = p.tcp().arg_uint(1);
    let arg = p.tcp().arg_ulong(2);

    if p.entering() {
        p.printfd(p.tcp().arg_int(0));
        p.tprints(", ");
        print_code(p, code);
    }

    let rval = if p.tcp().raw() { Rval::NotDecoded } else { decode(p, code, arg) };

    match rval {
        Rval::NotDecoded => {
            tprintf!(p, ", {}", Hex(arg));
            Rval::Decoded
        },
        rval => rval,
    }
}
