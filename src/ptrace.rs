//! Kernel primitives for reading tracee memory.

use std::io::IoSliceMut;

use nix::sys::ptrace;
use nix::sys::uio::{self, RemoteIoVec};
use nix::unistd::Pid;

/// Low-level tracee memory reads. Errors are raw `errno` values, classified by
/// [`Memory`](crate::memory::Memory).
pub trait Backend {
    /// Read one machine word at `addr`, as `PTRACE_PEEKDATA` does.
    fn peek_word(&self, pid: Pid, addr: u64) -> nix::Result<u64>;

    /// Read up to `local.len()` bytes at `remote` in one call, as `process_vm_readv(2)` does.
    ///
    /// Returns the number of bytes read, which may be short if the range crosses into an
    /// unmapped page.
    fn read_vm(&self, pid: Pid, local: &mut [u8], remote: u64) -> nix::Result<usize>;
}

/// Reads memory of a tracee in ptrace-stop.
#[derive(Clone, Copy, Debug, Default)]
pub struct Ptrace;

impl Backend for Ptrace {
    fn peek_word(&self, pid: Pid, addr: u64) -> nix::Result<u64> {
        let word = ptrace::read(pid, addr as ptrace::AddressType)?;
        Ok(word as u64)
    }

    fn read_vm(&self, pid: Pid, local: &mut [u8], remote: u64) -> nix::Result<usize> {
        let remote_iov = [RemoteIoVec { base: remote as usize, len: local.len() }];
        let mut local_iov = [IoSliceMut::new(local)];

        uio::process_vm_readv(pid, &mut local_iov, &remote_iov)
    }
}
