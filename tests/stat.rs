#[macro_use]
mod support;

use anyhow::Result;
use ntest::timeout;
use pretty_assertions::assert_eq;
use sysdecode::stat::{sprint_symbolic_mode, sprinttime};
use sysdecode::{Errno, Personality, Qualifiers};

use support::{Buf, Session};

/// An `x86_64` kernel `struct stat`, 144 bytes.
fn stat64(mode: u32, size: i64, rdev: u64, atime_nsec: u64) -> Buf {
    Buf::new()
        .u64(0x801)
        .u64(12)
        .u64(1)
        .u32(mode)
        .u32(1000)
        .u32(100)
        .u32(0)
        .u64(rdev)
        .i64(size)
        .i64(4096)
        .i64(8)
        .u64(0)
        .u64(atime_nsec)
        .u64(0)
        .u64(0)
        .u64(0)
        .u64(0)
        .zeros(24)
}

#[test]
#[timeout(1000)]
fn test_symbolic_mode() -> Result<()> {
    assert_eq!(sprint_symbolic_mode(0o100755), "S_IFREG|0755");
    assert_eq!(sprint_symbolic_mode(0o104755), "S_IFREG|S_ISUID|0755");
    assert_eq!(sprint_symbolic_mode(0o041777), "S_IFDIR|S_ISVTX|0777");
    assert_eq!(sprint_symbolic_mode(0o040000), "S_IFDIR|000");
    assert_eq!(sprint_symbolic_mode(0o644), "0644");
    assert_eq!(sprint_symbolic_mode(0o170644), "0170644");

    Ok(())
}

#[test]
#[timeout(1000)]
fn test_sprinttime() -> Result<()> {
    assert_eq!(sprinttime(0), "0");

    let t = sprinttime(1_000_000_000);
    assert_eq!(t.len(), "2001-09-09T01:46:40+0000".len());
    assert!(t.starts_with("2001-09-"));
    assert_eq!(&t[10..11], "T");

    Ok(())
}

#[test]
#[timeout(1000)]
fn test_stat_abbrev() -> Result<()> {
    let s = Session::new();
    let path = s.mem.tail_alloc(b"/etc/passwd\0");
    let buf = s.mem.tail_alloc(&stat64(0o100644, 4096, 0, 0).0);

    let mut call = s.syscall("stat", args![path, buf]);
    call.enter();
    assert_eq!(call.output(), "\"/etc/passwd\", ");
    call.exit(0);
    assert_eq!(call.output(), "\"/etc/passwd\", {st_mode=S_IFREG|0644, st_size=4096, ...}");

    Ok(())
}

#[test]
#[timeout(1000)]
fn test_lstat_verbose() -> Result<()> {
    let s = Session::new();
    let path = s.mem.tail_alloc(b"/tmp/x\0");
    let buf = s.mem.tail_alloc(&stat64(0o100600, 3, 0, 5).0);

    let out = s.syscall("lstat", args![path, buf]).qualifiers(Qualifiers::VERBOSE).run(0);
    assert_eq!(
        out,
        "\"/tmp/x\", {st_dev=makedev(8, 1), st_ino=12, st_mode=S_IFREG|0600, st_nlink=1, \
         st_uid=1000, st_gid=100, st_blksize=4096, st_blocks=8, st_size=3, \
         st_atime=0.000000005, st_mtime=0, st_ctime=0}"
    );

    Ok(())
}

#[test]
#[timeout(1000)]
fn test_fstat_device() -> Result<()> {
    let s = Session::new();
    let buf = s.mem.tail_alloc(&stat64(0o020620, 0, 0x8803, 0).0);

    let out = s.syscall("fstat", args![1, buf]).run(0);
    assert_eq!(out, "1, {st_mode=S_IFCHR|0620, st_rdev=makedev(136, 3), ...}");

    Ok(())
}

#[test]
#[timeout(1000)]
fn test_stat_failed() -> Result<()> {
    let s = Session::new();
    let path = s.mem.tail_alloc(b"/nope\0");
    let buf = s.mem.tail_alloc(&[0; 144]);

    let out = s.syscall("stat", args![path, buf]).run_err(Errno::ENOENT);
    assert_eq!(out, format!("\"/nope\", {:#x}", buf));

    Ok(())
}

#[test]
#[timeout(1000)]
fn test_newfstatat() -> Result<()> {
    let s = Session::new();
    let path = s.mem.tail_alloc(b"link\0");
    let buf = s.mem.tail_alloc(&stat64(0o120777, 4, 0, 0).0);

    let out = s
        .syscall("newfstatat", args![libc::AT_FDCWD, path, buf, 0x100])
        .run(0);
    assert_eq!(
        out,
        "AT_FDCWD, \"link\", {st_mode=S_IFLNK|0777, st_size=4, ...}, AT_SYMLINK_NOFOLLOW"
    );

    let out = s.syscall("newfstatat", args![3, path, buf, 0]).run(0);
    assert!(out.ends_with("}, 0"));

    Ok(())
}

#[test]
#[timeout(1000)]
fn test_stat_compat() -> Result<()> {
    let s = Session::with_personality(Personality::Compat32);
    let path = s.mem.tail_alloc(b"/\0");
    let st = Buf::new()
        .u32(0x803)
        .u32(2)
        .u16(0o040755)
        .u16(20)
        .u16(0)
        .u16(0)
        .u32(0)
        .u32(4096)
        .u32(4096)
        .u32(8)
        .zeros(6 * 4)
        .zeros(8);
    assert_eq!(st.len(), 64);
    let buf = s.mem.tail_alloc(&st.0);

    let out = s.syscall("stat", args![path, buf]).qualifiers(Qualifiers::VERBOSE).run(0);
    assert_eq!(
        out,
        "\"/\", {st_dev=makedev(8, 3), st_ino=2, st_mode=S_IFDIR|0755, st_nlink=20, st_uid=0, \
         st_gid=0, st_blksize=4096, st_blocks=8, st_size=4096, st_atime=0, st_mtime=0, st_ctime=0}"
    );

    Ok(())
}
