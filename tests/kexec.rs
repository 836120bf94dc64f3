#[macro_use]
mod support;

use anyhow::Result;
use ntest::timeout;
use pretty_assertions::assert_eq;
use sysdecode::Personality;

use support::{Buf, Session};

const KEXEC_ARCH_X86_64: u64 = 62 << 16;
const KEXEC_ON_CRASH: u64 = 1;

fn segment(pers: Personality, buf: u64, bufsz: u64, mem: u64, memsz: u64) -> Buf {
    Buf::new().word(pers, buf).word(pers, bufsz).word(pers, mem).word(pers, memsz)
}

#[test]
#[timeout(1000)]
fn test_kexec_load() -> Result<()> {
    let s = Session::new();
    let image = s.mem.tail_alloc(&[0; 16]);
    let segs = s.mem.tail_alloc(&segment(s.pers, image, 4096, 0x100_0000, 8192).0);

    let out = s
        .syscall("kexec_load", args![0x10_0000, 1, segs, KEXEC_ARCH_X86_64 | KEXEC_ON_CRASH])
        .run(0);
    assert_eq!(
        out,
        format!(
            "0x100000, 1, [{{buf={:#x}, bufsz=4096, mem=0x1000000, memsz=8192}}], \
             KEXEC_ARCH_X86_64|KEXEC_ON_CRASH",
            image
        )
    );

    Ok(())
}

#[test]
#[timeout(1000)]
fn test_kexec_load_flags() -> Result<()> {
    let s = Session::new();

    let out = s.syscall("kexec_load", args![0, 0, 0, 0]).run(0);
    assert_eq!(out, "NULL, 0, NULL, KEXEC_ARCH_DEFAULT");

    let out = s.syscall("kexec_load", args![0, 0, 0, (7 << 16) | 0x10]).run(0);
    assert_eq!(out, "NULL, 0, NULL, 0x70000 /* KEXEC_ARCH_??? */|0x10 /* KEXEC_??? */");

    Ok(())
}

#[test]
#[timeout(1000)]
fn test_kexec_load_too_many_segments() -> Result<()> {
    let s = Session::new();
    let segs = s.mem.tail_alloc(&[0; 32 * 17]);

    let out = s.syscall("kexec_load", args![0, 17, segs, 0]).run(0);
    assert_eq!(out, format!("NULL, 17, {:#x}, KEXEC_ARCH_DEFAULT", segs));

    Ok(())
}

#[test]
#[timeout(1000)]
fn test_kexec_load_compat() -> Result<()> {
    let s = Session::with_personality(Personality::Compat32);
    let segs = segment(s.pers, 0, 0, 0x1000, 1).bytes(&segment(s.pers, 0, 0, 0x2000, 2).0);
    let segs = s.mem.tail_alloc(&segs.0);

    let out = s.syscall("kexec_load", args![0x1000, 2, segs, 3 << 16]).run(0);
    assert_eq!(
        out,
        "0x1000, 2, [{buf=NULL, bufsz=0, mem=0x1000, memsz=1}, {buf=NULL, bufsz=0, mem=0x2000, memsz=2}], \
         KEXEC_ARCH_386"
    );

    Ok(())
}

#[test]
#[timeout(1000)]
fn test_kexec_file_load() -> Result<()> {
    let s = Session::new();
    let cmdline = s.mem.tail_alloc(b"console=x\0");

    let out = s.syscall("kexec_file_load", args![3, -1i64, 10, cmdline, 4]).run(0);
    assert_eq!(out, "3, -1, 10, \"console=x\\0\", KEXEC_FILE_NO_INITRAMFS");

    let out = s.syscall("kexec_file_load", args![3, 4, 0, 0, 0]).run(0);
    assert_eq!(out, "3, 4, 0, NULL, 0");

    Ok(())
}
