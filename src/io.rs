//! `struct iovec` arrays and the vectored I/O syscalls.

use tracing::error;

use crate::layout::{Fetch, Reader};
use crate::netlink::decode_netlink;
use crate::printer::{Fetcher, Printer};
use crate::syscall::Rval;

/// Most iovecs [`Printer::dumpiov_upto`] is willing to fetch.
const DUMPIOV_MAX: u64 = 1024 * 1024;

/// `struct iovec`
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Iovec {
    pub base: u64,
    pub len: u64,
}

impl Fetch for Iovec {
    fn read(r: &mut Reader<'_>) -> Self {
        Self { base: r.ptr(), len: r.ulong() }
    }
}

/// How the buffer an iovec points to is shown.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IovDecode {
    /// Address only.
    Addr,

    /// Quoted string contents.
    Str,

    /// Netlink messages.
    Netlink,
}

impl<'a> Printer<'a> {
    /// Print the `len` iovecs at `addr`. At most `data_size` bytes of buffer contents are
    /// shown in total, `u64::MAX` meaning no limit.
    pub fn tprint_iov_upto(&mut self, len: u64, addr: u64, mode: IovDecode, data_size: u64) {
        let pers = self.personality();
        let mut remaining = data_size;

        self.print_array(addr, len, Iovec::size(pers), Fetcher::IgnoreSyserror, |p, elem| {
            let iov = Iovec::parse(elem, pers);

            p.tprints("{iov_base=");
            match mode {
                IovDecode::Str | IovDecode::Netlink => {
                    let shown = iov.len.min(remaining);
                    if remaining != u64::MAX {
                        remaining -= shown;
                    }
                    if mode == IovDecode::Str {
                        p.printstr(iov.base, shown);
                    } else {
                        decode_netlink(p, iov.base, shown);
                    }
                },
                IovDecode::Addr => p.printaddr(iov.base),
            }
            tprintf!(p, ", iov_len={}}}", iov.len);

            true
        });
    }

    pub fn tprint_iov(&mut self, len: u64, addr: u64, mode: IovDecode) {
        self.tprint_iov_upto(len, addr, mode, u64::MAX);
    }

    /// Hex dump the buffers of the `len` iovecs at `addr`, `data_size` bytes in total.
    pub fn dumpiov_upto(&mut self, len: u64, addr: u64, data_size: u64) {
        if len > DUMPIOV_MAX {
            error!(pid = self.tcp().pid().as_raw(), len, "Out of memory");
            return;
        }

        let pers = self.personality();
        let size = Iovec::size(pers);
        let mut buf = vec![0; size * len as usize];
        if !self.umoven(addr, &mut buf) {
            return;
        }

        let mut remaining = data_size;
        for (i, elem) in buf.chunks(size).enumerate() {
            let iov = Iovec::parse(elem, pers);
            let n = iov.len.min(remaining);
            if n == 0 {
                break;
            }
            remaining -= n;

            tprintf!(self, " * {} bytes in buffer {}\n", n, i);
            self.dumpstr(iov.base, n as usize);
        }
    }
}

pub fn sys_readv(p: &mut Printer<'_>) -> Rval {
    if p.entering() {
        let fd = p.tcp().arg_int(0);
        p.printfd(fd);
        p.tprints(", ");
        return Rval::NeedsExit;
    }

    let (iov, iovcnt) = (p.tcp().arg_ulong(1), p.tcp().arg_ulong(2));
    let mode = if p.syserror() { IovDecode::Addr } else { IovDecode::Str };
    let read = p.tcp().rval() as u64;
    p.tprint_iov_upto(iovcnt, iov, mode, read);
    tprintf!(p, ", {}", iovcnt);

    Rval::Decoded
}

pub fn sys_writev(p: &mut Printer<'_>) -> Rval {
    let fd = p.tcp().arg_int(0);
    let (iov, iovcnt) = (p.tcp().arg_ulong(1), p.tcp().arg_ulong(2));
    p.printfd(fd);
    p.tprints(", ");
    p.tprint_iov(iovcnt, iov, IovDecode::Str);
    tprintf!(p, ", {}", iovcnt);

    Rval::Decoded
}
