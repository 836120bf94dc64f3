//! `kexec_load(2)` and `kexec_file_load(2)`.

use crate::layout::{Fetch, Reader};
use crate::printer::{Fetcher, Printer};
use crate::syscall::Rval;

/// Most segments the kernel accepts, longer arrays are printed as an address.
pub const KEXEC_SEGMENT_MAX: u64 = 16;

const KEXEC_ARCH_MASK: u64 = 0xffff_0000;

const KEXEC_ARCH_DEFAULT: u64 = 0;
const KEXEC_ARCH_386: u64 = 3 << 16;
const KEXEC_ARCH_68K: u64 = 4 << 16;
const KEXEC_ARCH_MIPS: u64 = 8 << 16;
const KEXEC_ARCH_MIPS_LE: u64 = 10 << 16;
const KEXEC_ARCH_PPC: u64 = 20 << 16;
const KEXEC_ARCH_PPC64: u64 = 21 << 16;
const KEXEC_ARCH_S390: u64 = 22 << 16;
const KEXEC_ARCH_ARM: u64 = 40 << 16;
const KEXEC_ARCH_SH: u64 = 42 << 16;
const KEXEC_ARCH_IA_64: u64 = 50 << 16;
const KEXEC_ARCH_X86_64: u64 = 62 << 16;
const KEXEC_ARCH_AARCH64: u64 = 183 << 16;

xlat! {
    sorted KEXEC_ARCH_VALUES = [
        KEXEC_ARCH_DEFAULT,
        KEXEC_ARCH_386,
        KEXEC_ARCH_68K,
        KEXEC_ARCH_MIPS,
        KEXEC_ARCH_MIPS_LE,
        KEXEC_ARCH_PPC,
        KEXEC_ARCH_PPC64,
        KEXEC_ARCH_S390,
        KEXEC_ARCH_ARM,
        KEXEC_ARCH_SH,
        KEXEC_ARCH_IA_64,
        KEXEC_ARCH_X86_64,
        KEXEC_ARCH_AARCH64,
    ]
}

const KEXEC_ON_CRASH: u64 = 1;
const KEXEC_PRESERVE_CONTEXT: u64 = 2;

xlat! { KEXEC_LOAD_FLAGS = [KEXEC_ON_CRASH, KEXEC_PRESERVE_CONTEXT] }

const KEXEC_FILE_UNLOAD: u64 = 1;
const KEXEC_FILE_ON_CRASH: u64 = 2;
const KEXEC_FILE_NO_INITRAMFS: u64 = 4;

xlat! { KEXEC_FILE_LOAD_FLAGS = [KEXEC_FILE_UNLOAD, KEXEC_FILE_ON_CRASH, KEXEC_FILE_NO_INITRAMFS] }

/// `struct kexec_segment`
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct KexecSegment {
    pub buf: u64,
    pub bufsz: u64,
    pub mem: u64,
    pub memsz: u64,
}

impl Fetch for KexecSegment {
    fn read(r: &mut Reader<'_>) -> Self {
        Self { buf: r.ptr(), bufsz: r.ulong(), mem: r.ptr(), memsz: r.ulong() }
    }
}

fn print_segment(p: &mut Printer<'_>, seg: &KexecSegment) {
    p.tprints("{buf=");
    p.printaddr(seg.buf);
    tprintf!(p, ", bufsz={}, mem=", seg.bufsz);
    p.printaddr(seg.mem);
    tprintf!(p, ", memsz={}}}", seg.memsz);
}

fn print_segments(p: &mut Printer<'_>, addr: u64, len: u64) {
    if len > KEXEC_SEGMENT_MAX {
        p.printaddr(addr);
        return;
    }

    let pers = p.personality();
    p.print_array(addr, len, KexecSegment::size(pers), Fetcher::OrPrintAddr, |p, elem| {
        print_segment(p, &KexecSegment::parse(elem, pers));
        true
    });
}

pub fn sys_kexec_load(p: &mut Printer<'_>) -> Rval {
    let entry = p.tcp().arg_ulong(0);
    let nr_segments = p.tcp().arg_ulong(1);
    let segments = p.tcp().arg_ulong(2);
    let flags = p.tcp().arg_ulong(3);

    p.printaddr(entry);
    tprintf!(p, ", {}, ", nr_segments);
    print_segments(p, segments, nr_segments);
    p.tprints(", ");

    p.printxval(&KEXEC_ARCH_VALUES, flags & KEXEC_ARCH_MASK, "KEXEC_ARCH_???");
    let rest = flags & !KEXEC_ARCH_MASK;
    if rest != 0 {
        p.tprints("|");
        p.printflags(&KEXEC_LOAD_FLAGS, rest, "KEXEC_???");
    }

    Rval::Decoded
}

pub fn sys_kexec_file_load(p: &mut Printer<'_>) -> Rval {
    let kernel_fd = p.tcp().arg_int(0);
    let initrd_fd = p.tcp().arg_int(1);
    let cmdline_len = p.tcp().arg_ulong(2);
    let cmdline = p.tcp().arg_ulong(3);
    let flags = p.tcp().arg_ulong(4);

    p.printfd(kernel_fd);
    p.tprints(", ");
    p.printfd(initrd_fd);
    p.tprints(", ");
    tprintf!(p, "{}, ", cmdline_len);
    p.printstr(cmdline, cmdline_len);
    p.tprints(", ");
    p.printflags(&KEXEC_FILE_LOAD_FLAGS, flags, "KEXEC_FILE_???");

    Rval::Decoded
}
