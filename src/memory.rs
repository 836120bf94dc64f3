//! Copying data out of a tracee's address space.
//!
//! Two strategies are used: one bulk `process_vm_readv(2)` per request when the kernel
//! provides it, else `PTRACE_PEEKDATA` one word at a time.

use std::mem;
use std::sync::OnceLock;

use nix::errno::Errno;
use nix::unistd::{self, Pid, SysconfVar};
use tracing::{debug, trace, warn};

use crate::error::{Error, Result, ResultExt};
use crate::personality::Personality;
use crate::ptrace::{Backend, Ptrace};

/// Size of the word `PTRACE_PEEKDATA` reads.
const WORD: usize = mem::size_of::<libc::c_long>();

const FALLBACK_PAGE_SIZE: usize = 4096;

/// Whether bulk reads are available.
///
/// Starts out available. The first `ENOSYS` marks it unavailable for the rest of the
/// session; there is no way back.
#[derive(Debug, Default)]
pub struct VmReadv {
    unsupported: OnceLock<()>,
}

impl VmReadv {
    pub fn new() -> Self {
        Self::default()
    }

    /// A descriptor for a host known to lack `process_vm_readv(2)`.
    pub fn unsupported() -> Self {
        let vm = Self::default();
        vm.downgrade();
        vm
    }

    pub fn usable(&self) -> bool {
        self.unsupported.get().is_none()
    }

    fn downgrade(&self) {
        if self.unsupported.set(()).is_ok() {
            debug!("process_vm_readv is not supported, using PTRACE_PEEKDATA");
        }
    }
}

pub struct Memory {
    backend: Box<dyn Backend>,
    vm_readv: VmReadv,
    page_size: usize,
}

impl Default for Memory {
    fn default() -> Self {
        Self::new(Ptrace)
    }
}

impl Memory {
    pub fn new(backend: impl Backend + 'static) -> Self {
        Self::with_capability(backend, VmReadv::new())
    }

    pub fn with_capability(backend: impl Backend + 'static, vm_readv: VmReadv) -> Self {
        let page_size = match unistd::sysconf(SysconfVar::PAGE_SIZE) {
            Ok(Some(size)) if size > 0 => size as usize,
            _ => FALLBACK_PAGE_SIZE,
        };

        Self {
            backend: Box::new(backend),
            vm_readv,
            page_size,
        }
    }

    pub fn vm_readv(&self) -> &VmReadv {
        &self.vm_readv
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Fill `buf` with the tracee bytes at `addr`.
    ///
    /// Any read of fewer than `buf.len()` bytes is an error.
    pub fn umoven(&self, pid: Pid, pers: Personality, addr: u64, buf: &mut [u8]) -> Result<()> {
        let addr = pers.truncate_addr(addr);
        let len = buf.len();

        trace!(pid = pid.as_raw(), addr, len, "umoven");

        if self.vm_readv.usable() {
            match self.backend.read_vm(pid, buf, addr) {
                Ok(read) if read == len => return Ok(()),
                Ok(read) => {
                    warn!("umoven: short read ({} < {}) @{:#x}", read, len, addr);
                    return Err(Error::ShortRead { addr, read, requested: len });
                },
                Err(Errno::ENOSYS) => self.vm_readv.downgrade(),
                Err(Errno::EPERM) => {
                    debug!(pid = pid.as_raw(), "process_vm_readv not permitted, trying PTRACE_PEEKDATA");
                },
                Err(Errno::ESRCH) => return Err(Error::TraceeDied { pid, source: Errno::ESRCH }),
                Err(errno @ (Errno::EFAULT | Errno::EIO)) => {
                    return Err(Error::Inaccessible { pid, addr, source: errno });
                },
                Err(errno) => {
                    warn!(%errno, "process_vm_readv");
                    return Err(Error::OS(errno));
                },
            }
        }

        self.peek(pid, addr, buf, false, "umoven").map(|_| ())
    }

    /// Like [`Memory::umoven`], but stop at the first NUL byte.
    ///
    /// Returns `true` if a NUL was copied into `buf`, `false` if `buf` was filled without
    /// one. Bytes after the NUL are unspecified.
    pub fn umovestr(&self, pid: Pid, pers: Personality, addr: u64, buf: &mut [u8]) -> Result<bool> {
        let mut addr = pers.truncate_addr(addr);
        let start = addr;
        let len = buf.len();
        let mut nread = 0;

        trace!(pid = pid.as_raw(), addr, len, "umovestr");

        if self.vm_readv.usable() {
            let page_mask = self.page_size as u64 - 1;

            while nread < len {
                // Never cross a page: a fault on the next page must not hide a NUL on this one.
                let mut chunk = (len - nread).min(self.page_size);
                let end_in_page = (addr.wrapping_add(chunk as u64) & page_mask) as usize;
                if chunk > end_in_page {
                    chunk -= end_in_page;
                }

                let local = &mut buf[nread..nread + chunk];

                match self.backend.read_vm(pid, local, addr) {
                    Ok(read) if read > 0 => {
                        if local[..read].contains(&0) {
                            return Ok(true);
                        }
                        addr = addr.wrapping_add(read as u64);
                        nread += read;
                        continue;
                    },
                    Ok(_) => {
                        return Err(self.str_short_read(pid, start, nread, len, Errno::EFAULT));
                    },
                    Err(Errno::ENOSYS) => {
                        self.vm_readv.downgrade();
                        break;
                    },
                    Err(Errno::ESRCH) => return Err(Error::TraceeDied { pid, source: Errno::ESRCH }),
                    Err(Errno::EPERM) if nread == 0 => {
                        debug!(pid = pid.as_raw(), "process_vm_readv not permitted, trying PTRACE_PEEKDATA");
                        break;
                    },
                    Err(errno @ (Errno::EPERM | Errno::EFAULT | Errno::EIO)) => {
                        return Err(self.str_short_read(pid, start, nread, len, errno));
                    },
                    Err(errno) => {
                        warn!(%errno, "process_vm_readv");
                        return Err(Error::OS(errno));
                    },
                }
            }

            if nread == len {
                return Ok(false);
            }
        }

        self.peek(pid, addr, &mut buf[nread..], true, "umovestr")
    }

    fn str_short_read(&self, pid: Pid, addr: u64, nread: usize, len: usize, source: Errno) -> Error {
        if nread > 0 {
            warn!(%source, "umovestr: short read ({} < {}) @{:#x}", nread, len, addr);
        }
        Error::Inaccessible { pid, addr: addr.wrapping_add(nread as u64), source }
    }

    /// Word-at-a-time copy. With `find_nul`, returns `true` as soon as a copied word holds a
    /// NUL byte.
    fn peek(&self, pid: Pid, addr: u64, buf: &mut [u8], find_nul: bool, what: &str) -> Result<bool> {
        let start = addr;
        let len = buf.len();
        let mut addr = addr;
        let mut nread = 0;

        let residue = (addr % WORD as u64) as usize;
        if residue != 0 && len > 0 {
            addr -= residue as u64;
            let bytes = self.peek_word(pid, addr, what)?.to_ne_bytes();

            let m = (WORD - residue).min(len);
            buf[..m].copy_from_slice(&bytes[residue..residue + m]);
            if find_nul && bytes[residue..residue + m].contains(&0) {
                return Ok(true);
            }

            addr = addr.wrapping_add(WORD as u64);
            nread = m;
        }

        while nread < len {
            let word = match self.peek_word(pid, addr, what) {
                Err(err @ Error::Inaccessible { .. }) => {
                    if nread > 0 {
                        warn!("{}: short read ({} < {}) @{:#x}", what, nread, len, start);
                    }
                    return Err(err);
                },
                res => res?,
            };
            let bytes = word.to_ne_bytes();

            let m = WORD.min(len - nread);
            buf[nread..nread + m].copy_from_slice(&bytes[..m]);
            if find_nul {
                let nul = if m == WORD { has_zero_byte(word) } else { bytes[..m].contains(&0) };
                if nul {
                    return Ok(true);
                }
            }

            addr = addr.wrapping_add(WORD as u64);
            nread += m;
        }

        Ok(false)
    }

    fn peek_word(&self, pid: Pid, addr: u64, what: &str) -> Result<u64> {
        match self.backend.peek_word(pid, addr) {
            Err(errno @ Errno::EINVAL) => Err(Error::TraceeDied { pid, source: errno }),
            Err(errno @ Errno::EPERM) => Err(Error::Inaccessible { pid, addr, source: errno }),
            res => res.inaccessible_if_efault(pid, addr).map_err(|err| {
                if let Error::OS(errno) = &err {
                    warn!(%errno, "{}: PTRACE_PEEKDATA pid:{} @{:#x}", what, pid, addr);
                }
                err
            }),
        }
    }
}

/// True if any byte of `word` is zero.
pub fn has_zero_byte(word: u64) -> bool {
    const LOW: u64 = u64::from_ne_bytes([0x01; 8]);
    const HIGH: u64 = u64::from_ne_bytes([0x80; 8]);

    word.wrapping_sub(LOW) & !word & HIGH != 0
}
