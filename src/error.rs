use nix::errno::Errno;
use nix::unistd::Pid;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Tracee died while reading its memory, pid = {pid}")]
    TraceeDied {
        pid: Pid,
        source: nix::Error,
    },

    #[error("Memory of tracee = {pid} is inaccessible at {addr:#x}")]
    Inaccessible {
        pid: Pid,
        addr: u64,
        source: nix::Error,
    },

    #[error("Short read ({read} < {requested}) @{addr:#x}")]
    ShortRead {
        addr: u64,
        read: usize,
        requested: usize,
    },

    #[error("OS error")]
    OS(#[from] nix::Error),
}

impl Error {
    pub fn tracee_died(&self) -> bool {
        matches!(self, Error::TraceeDied { .. })
    }

    /// True if the failure only means the requested bytes could not be read.
    pub fn inaccessible(&self) -> bool {
        matches!(self, Error::Inaccessible { .. } | Error::ShortRead { .. })
    }
}

pub(crate) trait ResultExt<T> {
    fn died_if_esrch(self, pid: Pid) -> Result<T>;

    fn inaccessible_if_efault(self, pid: Pid, addr: u64) -> Result<T>;
}

impl<T> ResultExt<T> for nix::Result<T> {
    fn died_if_esrch(self, pid: Pid) -> Result<T> {
        match self {
            Err(Errno::ESRCH) => Err(Error::TraceeDied { pid, source: Errno::ESRCH }),
            Err(errno) => Err(Error::OS(errno)),
            Ok(t) => Ok(t),
        }
    }

    fn inaccessible_if_efault(self, pid: Pid, addr: u64) -> Result<T> {
        match self {
            Err(errno @ (Errno::EFAULT | Errno::EIO)) => Err(Error::Inaccessible { pid, addr, source: errno }),
            res => res.died_if_esrch(pid),
        }
    }
}
