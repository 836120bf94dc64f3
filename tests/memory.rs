#[macro_use]
mod support;

use anyhow::Result;
use ntest::timeout;
use pretty_assertions::assert_eq;
use sysdecode::{Errno, Error, Memory, Personality, Pid, VmReadv};

use support::FakeTracee;

fn pid() -> Pid {
    Pid::from_raw(1)
}

#[test]
#[timeout(1000)]
fn test_umoven_bulk_read() -> Result<()> {
    let fake = FakeTracee::new(Personality::Native);
    let addr = fake.tail_alloc(b"hello, world");
    let memory = Memory::new(fake.clone());

    let mut buf = [0; 12];
    memory.umoven(pid(), Personality::Native, addr, &mut buf)?;

    assert_eq!(&buf, b"hello, world");
    assert_eq!(fake.vm_reads(), 1);
    assert_eq!(fake.peeks(), 0);

    Ok(())
}

#[test]
#[timeout(1000)]
fn test_umoven_enosys_downgrades_for_good() -> Result<()> {
    let fake = FakeTracee::new(Personality::Native);
    let addr = fake.tail_alloc(b"0123456789abcdef0123");
    fake.fail_vm_readv(Errno::ENOSYS);
    let memory = Memory::new(fake.clone());

    // Unaligned start, exercising the partial first word.
    let mut buf = [0; 17];
    memory.umoven(pid(), Personality::Native, addr + 3, &mut buf)?;
    assert_eq!(&buf, b"3456789abcdef0123");
    assert!(!memory.vm_readv().usable());
    assert_eq!(fake.vm_reads(), 1);

    let mut buf = [0; 4];
    memory.umoven(pid(), Personality::Native, addr, &mut buf)?;
    assert_eq!(&buf, b"0123");
    assert_eq!(fake.vm_reads(), 1);
    assert!(fake.peeks() > 0);

    Ok(())
}

#[test]
#[timeout(1000)]
fn test_umoven_eperm_falls_back_per_call() -> Result<()> {
    let fake = FakeTracee::new(Personality::Native);
    let addr = fake.tail_alloc(b"abcdefgh");
    fake.fail_vm_readv(Errno::EPERM);
    let memory = Memory::new(fake.clone());

    let mut buf = [0; 8];
    memory.umoven(pid(), Personality::Native, addr, &mut buf)?;
    memory.umoven(pid(), Personality::Native, addr, &mut buf)?;

    assert_eq!(&buf, b"abcdefgh");
    assert!(memory.vm_readv().usable());
    assert_eq!(fake.vm_reads(), 2);

    Ok(())
}

#[test]
#[timeout(1000)]
fn test_umoven_unsupported_never_tries_bulk() -> Result<()> {
    let fake = FakeTracee::new(Personality::Native);
    let addr = fake.tail_alloc(b"abcdefgh");
    let memory = Memory::with_capability(fake.clone(), VmReadv::unsupported());

    let mut buf = [0; 8];
    memory.umoven(pid(), Personality::Native, addr, &mut buf)?;

    assert_eq!(&buf, b"abcdefgh");
    assert_eq!(fake.vm_reads(), 0);

    Ok(())
}

#[test]
#[timeout(1000)]
fn test_umoven_short_read_is_an_error() -> Result<()> {
    let fake = FakeTracee::new(Personality::Native);
    let addr = fake.tail_alloc(b"abc");
    let memory = Memory::new(fake);

    let mut buf = [0; 8];
    let err = memory.umoven(pid(), Personality::Native, addr, &mut buf).unwrap_err();

    assert!(matches!(err, Error::ShortRead { read: 3, requested: 8, .. }));
    assert!(err.inaccessible());

    Ok(())
}

#[test]
#[timeout(1000)]
fn test_umoven_unmapped() -> Result<()> {
    let fake = FakeTracee::new(Personality::Native);
    let addr = fake.unmapped();

    for vm_readv in vec![VmReadv::new(), VmReadv::unsupported()] {
        let memory = Memory::with_capability(fake.clone(), vm_readv);
        let mut buf = [0; 8];
        let err = memory.umoven(pid(), Personality::Native, addr, &mut buf).unwrap_err();

        assert!(err.inaccessible());
        assert!(!err.tracee_died());
    }

    Ok(())
}

#[test]
#[timeout(1000)]
fn test_umoven_truncates_compat_addresses() -> Result<()> {
    let fake = FakeTracee::new(Personality::Compat32);
    let addr = fake.tail_alloc(b"abcd");
    let memory = Memory::new(fake);

    let mut buf = [0; 4];
    memory.umoven(pid(), Personality::Compat32, addr | 0xffff_ffff_0000_0000, &mut buf)?;

    assert_eq!(&buf, b"abcd");

    Ok(())
}

#[test]
#[timeout(1000)]
fn test_umovestr() -> Result<()> {
    for &errno in &[None, Some(Errno::ENOSYS)] {
        let fake = FakeTracee::new(Personality::Native);
        let addr = fake.tail_alloc(b"path\0");
        if let Some(errno) = errno {
            fake.fail_vm_readv(errno);
        }
        let memory = Memory::new(fake.clone());

        // NUL found just before the guard page.
        let mut buf = [0xff; 64];
        assert!(memory.umovestr(pid(), Personality::Native, addr, &mut buf)?);
        assert_eq!(&buf[..5], b"path\0");

        // Buffer filled before the NUL.
        let mut buf = [0xff; 3];
        assert!(!memory.umovestr(pid(), Personality::Native, addr, &mut buf)?);
        assert_eq!(&buf, b"pat");
    }

    Ok(())
}

#[test]
#[timeout(1000)]
fn test_umovestr_runs_into_guard_page() -> Result<()> {
    let fake = FakeTracee::new(Personality::Native);
    let addr = fake.tail_alloc(b"unterminated");
    let memory = Memory::new(fake);

    let mut buf = [0; 64];
    let err = memory.umovestr(pid(), Personality::Native, addr, &mut buf).unwrap_err();

    assert!(err.inaccessible());

    Ok(())
}

#[test]
#[timeout(5000)]
fn test_ptrace_reads_stopped_child() -> Result<()> {
    use nix::sys::ptrace;
    use nix::sys::signal::{self, Signal};
    use nix::sys::wait::{waitpid, WaitStatus};
    use nix::unistd::{fork, ForkResult};

    let secret = *b"tracee memory\0";
    let addr = secret.as_ptr() as u64;

    // Safety: the child only calls async-signal-safe functions before exiting.
    match unsafe { fork() }? {
        ForkResult::Child => {
            let _ = ptrace::traceme();
            let _ = signal::raise(Signal::SIGSTOP);
            unsafe { libc::_exit(0) }
        },
        ForkResult::Parent { child } => {
            let status = waitpid(child, None)?;
            assert_eq!(status, WaitStatus::Stopped(child, Signal::SIGSTOP));

            let memory = Memory::default();

            let mut buf = [0; 14];
            memory.umoven(child, Personality::Native, addr, &mut buf)?;
            assert_eq!(&buf, &secret);

            let mut buf = [0; 32];
            assert!(memory.umovestr(child, Personality::Native, addr, &mut buf)?);
            assert_eq!(&buf[..14], &secret);

            signal::kill(child, Signal::SIGKILL)?;
            waitpid(child, None)?;
        },
    }

    Ok(())
}
