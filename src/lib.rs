//! Decoding of traced Linux syscalls into human-readable text.
//!
//! A [`Tracer`] owns the session: how tracee memory is read ([`Memory`]) and how values are
//! rendered ([`Config`]). Each syscall-stop is described by a [`Tcb`], and decoded through a
//! [`Printer`] into a [`Sink`].

#[macro_use]
pub mod xlat;
#[macro_use]
pub mod printer;

pub mod block;
pub mod config;
pub mod dm;
pub mod error;
pub mod io;
pub mod ioctl;
pub mod kexec;
pub mod layout;
pub mod memory;
pub mod netlink;
pub mod personality;
pub mod printnum;
pub mod ptrace;
pub mod quote;
pub mod stat;
pub mod syscall;
pub mod tcb;
pub mod time;
pub mod tracer;
pub mod v4l2;

pub use nix::errno::Errno;
pub use nix::unistd::Pid;

pub use config::{Config, Xflag};
pub use error::{Error, Result};
pub use io::{IovDecode, Iovec};
pub use layout::{Fetch, Reader};
pub use memory::{Memory, VmReadv};
pub use personality::Personality;
pub use printer::{major, minor, Fetcher, Hex, Printer, Sink, PATH_MAX};
pub use printnum::NumFmt;
pub use ptrace::{Backend, Ptrace};
pub use quote::QuoteStyle;
pub use syscall::{Rval, SysFunc};
pub use tcb::{Phase, PrivData, Qualifiers, Tcb, MAX_ARGS};
pub use tracer::Tracer;
pub use xlat::{Xlat, XlatEntry};
