#[macro_use]
mod support;

use anyhow::Result;
use ntest::timeout;
use pretty_assertions::assert_eq;
use sysdecode::block::BlkCmd;
use sysdecode::ioctl::{ioc, ioctl_name, iowr, IOC_READ};
use sysdecode::{Errno, Personality, Qualifiers, Rval};

use support::{Buf, Session};

#[test]
#[timeout(1000)]
fn test_block_codes_follow_personality() -> Result<()> {
    assert_eq!(BlkCmd::GetSize64.code(Personality::Native), 0x8008_1272);
    assert_eq!(BlkCmd::GetSize64.code(Personality::Compat32), 0x8004_1272);
    assert_eq!(BlkCmd::TraceSetup.code(Personality::Native), 0xc048_1273);
    assert_eq!(BlkCmd::RrPart.code(Personality::Native), 0x125f);

    assert_eq!(ioctl_name(0x8004_1272, Personality::Compat32), Some("BLKGETSIZE64"));
    assert_eq!(ioctl_name(0x8004_1272, Personality::Native), None);

    for cmd in BlkCmd::ALL.iter() {
        assert_eq!(BlkCmd::from_code(cmd.code(Personality::Native), Personality::Native), Some(*cmd));
    }

    Ok(())
}

#[test]
#[timeout(1000)]
fn test_ioctl_without_argument() -> Result<()> {
    let s = Session::new();

    let out = s.syscall("ioctl", args![3, 0x125f, 0]).run(0);
    assert_eq!(out, "3, BLKRRPART");

    Ok(())
}

#[test]
#[timeout(1000)]
fn test_ioctl_value_argument() -> Result<()> {
    let s = Session::new();

    let out = s.syscall("ioctl", args![3, 0x1262, 4096]).run(0);
    assert_eq!(out, "3, BLKRASET, 4096");

    Ok(())
}

#[test]
#[timeout(1000)]
fn test_ioctl_result_printed_at_exit() -> Result<()> {
    let s = Session::new();
    let size = s.mem.tail_alloc(&(1u64 << 20).to_ne_bytes());

    let mut call = s.syscall("ioctl", args![3, 0x8008_1272, size]);
    assert_eq!(call.enter(), Rval::NeedsExit);
    assert_eq!(call.output(), "3, BLKGETSIZE64");
    assert_eq!(call.exit(0), Rval::Decoded);
    assert_eq!(call.output(), "3, BLKGETSIZE64, [1048576]");

    Ok(())
}

#[test]
#[timeout(1000)]
fn test_ioctl_getsize_is_a_long() -> Result<()> {
    let s = Session::new();
    let size = s.mem.tail_alloc(&4096u64.to_ne_bytes());

    let mut call = s.syscall("ioctl", args![3, 0x1260, size]);
    assert_eq!(call.enter(), Rval::NeedsExit);
    assert_eq!(call.output(), "3, BLKGETSIZE");
    assert_eq!(call.exit(0), Rval::Decoded);
    assert_eq!(call.output(), "3, BLKGETSIZE, [4096]");

    let s = Session::with_personality(Personality::Compat32);
    let size = s.mem.tail_alloc(&4096u32.to_ne_bytes());

    let out = s.syscall("ioctl", args![3, 0x1260, size]).run(0);
    assert_eq!(out, "3, BLKGETSIZE, [4096]");

    Ok(())
}

#[test]
#[timeout(1000)]
fn test_ioctl_value_argument_is_kernel_long() -> Result<()> {
    let s = Session::with_personality(Personality::X32);

    let out = s.syscall("ioctl", args![3, 0x1262, 0x1_0000_1000_u64]).run(0);
    assert_eq!(out, "3, BLKRASET, 4294971392");

    let s = Session::with_personality(Personality::Compat32);

    let out = s.syscall("ioctl", args![3, 0x1264, 0x1_0000_1000_u64]).run(0);
    assert_eq!(out, "3, BLKFRASET, 4096");

    Ok(())
}

#[test]
#[timeout(1000)]
fn test_ioctl_result_after_failure() -> Result<()> {
    let s = Session::new();
    let size = s.mem.tail_alloc(&(1u64 << 20).to_ne_bytes());

    let out = s.syscall("ioctl", args![3, 0x8008_1272, size]).run_err(Errno::ENOTTY);
    assert_eq!(out, format!("3, BLKGETSIZE64, {:#x}", size));

    Ok(())
}

#[test]
#[timeout(1000)]
fn test_ioctl_signed_int_set() -> Result<()> {
    let s = Session::new();
    let ro = s.mem.tail_alloc(&1i32.to_ne_bytes());
    let code = BlkCmd::RoSet.code(Personality::Native);

    let mut call = s.syscall("ioctl", args![3, code, ro]);
    assert_eq!(call.enter(), Rval::Decoded);
    assert_eq!(call.output(), "3, BLKROSET, [1]");

    Ok(())
}

#[test]
#[timeout(1000)]
fn test_ioctl_discard_range() -> Result<()> {
    let s = Session::new();
    let range = s.mem.tail_alloc(&Buf::new().u64(0).u64(4096).0);

    let out = s.syscall("ioctl", args![3, 0x1277, range]).run(0);
    assert_eq!(out, "3, BLKDISCARD, [0, 4096]");

    Ok(())
}

#[test]
#[timeout(1000)]
fn test_ioctl_blkpg() -> Result<()> {
    let s = Session::new();
    let part = Buf::new().i64(1024).i64(2048).i32(1).cstr("sda1", 64).cstr("vol", 64).align(8);
    let data = s.mem.tail_alloc(&part.0);
    let arg = Buf::new().i32(1).i32(0).i32(part.len() as i32).zeros(4).u64(data);
    let arg = s.mem.tail_alloc(&arg.0);

    let out = s.syscall("ioctl", args![3, 0x1269, arg]).run(0);
    assert_eq!(
        out,
        "3, BLKPG, {op=BLKPG_ADD_PARTITION, flags=0, datalen=152, \
         data={start=1024, length=2048, pno=1, devname=\"sda1\", volname=\"vol\"}}"
    );

    Ok(())
}

#[test]
#[timeout(1000)]
fn test_ioctl_blkpg_unreadable_partition() -> Result<()> {
    let s = Session::new();
    let data = s.mem.unmapped();
    let arg = Buf::new().i32(2).i32(0).i32(0).zeros(4).u64(data);
    let arg = s.mem.tail_alloc(&arg.0);

    let out = s.syscall("ioctl", args![3, 0x1269, arg]).run(0);
    assert_eq!(
        out,
        format!("3, BLKPG, {{op=BLKPG_DEL_PARTITION, flags=0, datalen=0, data={:#x}}}", data)
    );

    Ok(())
}

#[test]
#[timeout(1000)]
fn test_ioctl_trace_setup() -> Result<()> {
    let s = Session::new();
    let buts = Buf::new()
        .zeros(32)
        .u16(3)
        .align(4)
        .u32(4096)
        .u32(8)
        .align(8)
        .u64(0)
        .u64(100)
        .u32(42)
        .align(8);
    assert_eq!(buts.len(), 72);
    let arg = s.mem.tail_alloc(&buts.0);

    let mut call = s.syscall("ioctl", args![3, 0xc048_1273, arg]);
    assert_eq!(call.enter(), Rval::NeedsExit);
    assert_eq!(
        call.output(),
        "3, BLKTRACESETUP, {act_mask=3, buf_size=4096, buf_nr=8, start_lba=0, end_lba=100, pid=42"
    );

    s.mem.write(arg, b"sda\0");
    assert_eq!(call.exit(0), Rval::Decoded);
    assert!(call.output().ends_with(", pid=42, name=\"sda\"}"));

    Ok(())
}

#[test]
#[timeout(1000)]
fn test_ioctl_trace_setup_failed() -> Result<()> {
    let s = Session::new();
    let arg = s.mem.tail_alloc(&[0; 72]);

    let out = s.syscall("ioctl", args![3, 0xc048_1273, arg]).run_err(Errno::EBUSY);
    assert!(out.ends_with(", pid=0}"));

    Ok(())
}

#[test]
#[timeout(1000)]
fn test_ioctl_unknown_request() -> Result<()> {
    let s = Session::new();

    let code = ioc(IOC_READ, 0x99, 1, 4);
    let out = s.syscall("ioctl", args![3, code, 0xdead_beef_u64]).run(0);
    assert_eq!(out, "3, _IOC(_IOC_READ, 0x99, 0x1, 0x4), 0xdeadbeef");

    let out = s.syscall("ioctl", args![3, 0x12c8, 0x10]).run(0);
    assert_eq!(out, "3, _IOC(_IOC_NONE, 0x12, 0xc8, 0), 0x10");

    let code = iowr(0x42, 7, 16);
    let out = s.syscall("ioctl", args![3, code, 0]).run(0);
    assert_eq!(out, "3, _IOC(_IOC_READ|_IOC_WRITE, 0x42, 0x7, 0x10), 0");

    Ok(())
}

#[test]
#[timeout(1000)]
fn test_ioctl_raw() -> Result<()> {
    let s = Session::new();

    let out = s.syscall("ioctl", args![3, 0x1262, 4096]).qualifiers(Qualifiers::RAW).run(0);
    assert_eq!(out, "0x3, 0x1262, 0x1000, 0, 0, 0");

    Ok(())
}

#[test]
#[timeout(1000)]
fn test_ioctl_compat_argument_truncated() -> Result<()> {
    let s = Session::with_personality(Personality::Compat32);

    let out = s.syscall("ioctl", args![3, 0x1_0000_1262_u64, 0x1_0000_0010_u64]).run(0);
    assert_eq!(out, "3, BLKRASET, 16");

    Ok(())
}
