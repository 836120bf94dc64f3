#[macro_use]
mod support;

use anyhow::Result;
use ntest::timeout;
use pretty_assertions::assert_eq;
use sysdecode::syscall::{decoded_syscalls, decoder};
use sysdecode::{Errno, Personality, Phase, PrivData, Qualifiers, Rval};

use support::Session;

#[test]
#[timeout(1000)]
fn test_registry() -> Result<()> {
    let names: Vec<_> = decoded_syscalls().collect();

    for name in &["ioctl", "readv", "writev", "gettimeofday", "getrusage", "newfstatat", "kexec_load"] {
        assert!(names.contains(name), "{} has no decoder", name);
        assert!(decoder(name).is_some());
    }
    assert!(decoder("close").is_none());

    Ok(())
}

#[test]
#[timeout(1000)]
fn test_undecoded_syscall_prints_hex_args() -> Result<()> {
    let s = Session::new();

    let mut call = s.syscall("close", args![3]);
    assert_eq!(call.enter(), Rval::Decoded);
    assert_eq!(call.output(), "0x3, 0, 0, 0, 0, 0");

    // Nothing more at the exiting stop.
    call.exit(0);
    assert_eq!(call.output(), "0x3, 0, 0, 0, 0, 0");

    Ok(())
}

#[test]
#[timeout(1000)]
fn test_hex_args_truncated_for_compat() -> Result<()> {
    let s = Session::with_personality(Personality::Compat32);

    let out = s.syscall("close", args![u64::MAX, 0x1_0000_0001_u64]).run(0);
    assert_eq!(out, "0xffffffff, 0x1, 0, 0, 0, 0");

    Ok(())
}

#[test]
#[timeout(1000)]
fn test_raw_skips_decoder() -> Result<()> {
    let s = Session::new();

    let out = s
        .syscall("kexec_load", args![0x1000, 0, 0, 0])
        .qualifiers(Qualifiers::VERBOSE | Qualifiers::RAW)
        .run(0);
    assert_eq!(out, "0x1000, 0, 0, 0, 0, 0");

    Ok(())
}

#[test]
#[timeout(1000)]
fn test_tcb_lifecycle() -> Result<()> {
    let s = Session::new();
    let mut tcb = s.tcb();

    tcb.enter(16, [3, 0x1262, 4096, 0, 0, 0]);
    assert_eq!(tcb.phase(), Phase::Entering);
    assert_eq!(tcb.scno(), 16);
    assert_eq!(tcb.arg_int(0), 3);
    tcb.set_auxstr("{count=2}");
    tcb.set_priv_data(PrivData::NextCtrl);

    tcb.exit(-1, Errno::EINVAL);
    assert_eq!(tcb.phase(), Phase::Exiting);
    assert!(tcb.syserror());
    assert_eq!(tcb.error(), Some(Errno::EINVAL));
    assert_eq!(tcb.take_auxstr().as_deref(), Some("{count=2}"));
    assert_eq!(tcb.priv_data(), Some(&PrivData::NextCtrl));

    // A new call starts clean.
    tcb.enter(0, [0; 6]);
    assert!(!tcb.syserror());
    assert!(tcb.auxstr().is_none());
    assert!(tcb.priv_data().is_none());

    Ok(())
}

#[test]
#[timeout(1000)]
fn test_tcb_arg_widths() -> Result<()> {
    let s = Session::with_personality(Personality::Compat32);
    let mut tcb = s.tcb();

    tcb.enter(0, [u64::MAX, 0xdead_beef_0000_0010, 0, 0, 0, 0]);
    assert_eq!(tcb.arg_int(0), -1);
    assert_eq!(tcb.arg_uint(0), u32::MAX);
    assert_eq!(tcb.arg_ulong(1), 0x10);
    assert_eq!(tcb.arg(1), 0xdead_beef_0000_0010);

    Ok(())
}

#[test]
#[timeout(1000)]
fn test_exit_stop_always_completes() -> Result<()> {
    let s = Session::new();

    for name in decoded_syscalls() {
        let mut call = s.syscall(name, args![3, 0x1260, 0, 0]);
        call.enter();
        assert_ne!(call.exit(0), Rval::NeedsExit, "{}", name);
    }

    Ok(())
}
