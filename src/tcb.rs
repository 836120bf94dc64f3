//! Per-call context handed to decoders by the syscall event loop.

use nix::errno::Errno;
use nix::unistd::Pid;

use crate::dm::DmIoctl;
use crate::personality::Personality;

pub const MAX_ARGS: usize = 6;

/// Which of the two syscall-stops a decoder is being run for.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Phase {
    Entering,
    Exiting,
}

bitflags::bitflags! {
    /// Per-call decoding qualifiers.
    pub struct Qualifiers: u32 {
        /// Dereference structure arguments.
        const VERBOSE = 0x1;

        /// Shorten long structures and arrays.
        const ABBREV = 0x2;

        /// Print raw argument values only.
        const RAW = 0x4;
    }
}

impl Default for Qualifiers {
    fn default() -> Self {
        Qualifiers::VERBOSE | Qualifiers::ABBREV
    }
}

/// State a decoder keeps between the entering and exiting stop of one call.
///
/// Dropping the value releases it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PrivData {
    /// Device-mapper ioctl header as seen on entry.
    Dm(Box<DmIoctl>),

    /// `VIDIOC_QUERYCTRL` was asked for the control following the given id.
    NextCtrl,
}

/// Traced control block: one observed syscall invocation.
#[derive(Clone, Debug)]
pub struct Tcb {
    pid: Pid,
    scno: u64,
    phase: Phase,
    personality: Personality,
    args: [u64; MAX_ARGS],
    error: Option<Errno>,
    rval: i64,
    qual: Qualifiers,
    auxstr: Option<String>,
    priv_data: Option<PrivData>,
}

impl Tcb {
    pub fn new(pid: Pid, personality: Personality) -> Self {
        Self {
            pid,
            scno: 0,
            phase: Phase::Entering,
            personality,
            args: [0; MAX_ARGS],
            error: None,
            rval: 0,
            qual: Qualifiers::default(),
            auxstr: None,
            priv_data: None,
        }
    }

    /// Start a new call, dropping any state left over from the previous one.
    pub fn enter(&mut self, scno: u64, args: [u64; MAX_ARGS]) {
        self.scno = scno;
        self.args = args;
        self.phase = Phase::Entering;
        self.error = None;
        self.rval = 0;
        self.auxstr = None;
        self.priv_data = None;
    }

    /// Record the outcome of the call and move to its exiting stop.
    pub fn exit(&mut self, rval: i64, error: impl Into<Option<Errno>>) {
        self.phase = Phase::Exiting;
        self.rval = rval;
        self.error = error.into();
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn scno(&self) -> u64 {
        self.scno
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn entering(&self) -> bool {
        self.phase == Phase::Entering
    }

    pub fn exiting(&self) -> bool {
        self.phase == Phase::Exiting
    }

    pub fn personality(&self) -> Personality {
        self.personality
    }

    pub fn set_personality(&mut self, personality: Personality) {
        self.personality = personality;
    }

    pub fn args(&self) -> &[u64; MAX_ARGS] {
        &self.args
    }

    /// Raw argument word `n`.
    pub fn arg(&self, n: usize) -> u64 {
        self.args[n]
    }

    /// Argument `n` as a tracee `unsigned long` or pointer.
    pub fn arg_ulong(&self, n: usize) -> u64 {
        self.personality.widen_to_ulong(self.args[n])
    }

    /// Argument `n` as a `kernel_ulong_t`.
    pub fn arg_kulong(&self, n: usize) -> u64 {
        self.personality.widen_to_kulong(self.args[n])
    }

    /// Argument `n` as a C `int`.
    pub fn arg_int(&self, n: usize) -> i32 {
        self.args[n] as i32
    }

    /// Argument `n` as a C `unsigned int`.
    pub fn arg_uint(&self, n: usize) -> u32 {
        self.args[n] as u32
    }

    pub fn error(&self) -> Option<Errno> {
        self.error
    }

    /// True if the call has returned an error. Only meaningful when exiting.
    pub fn syserror(&self) -> bool {
        self.error.is_some()
    }

    pub fn rval(&self) -> i64 {
        self.rval
    }

    pub fn qualifiers(&self) -> Qualifiers {
        self.qual
    }

    pub fn set_qualifiers(&mut self, qual: Qualifiers) {
        self.qual = qual;
    }

    pub fn verbose(&self) -> bool {
        self.qual.contains(Qualifiers::VERBOSE)
    }

    pub fn abbrev(&self) -> bool {
        self.qual.contains(Qualifiers::ABBREV)
    }

    pub fn raw(&self) -> bool {
        self.qual.contains(Qualifiers::RAW)
    }

    pub fn auxstr(&self) -> Option<&str> {
        self.auxstr.as_deref()
    }

    pub fn set_auxstr(&mut self, auxstr: impl Into<String>) {
        self.auxstr = Some(auxstr.into());
    }

    pub fn take_auxstr(&mut self) -> Option<String> {
        self.auxstr.take()
    }

    pub fn priv_data(&self) -> Option<&PrivData> {
        self.priv_data.as_ref()
    }

    pub fn set_priv_data(&mut self, data: PrivData) {
        self.priv_data = Some(data);
    }

    pub fn take_priv_data(&mut self) -> Option<PrivData> {
        self.priv_data.take()
    }

    pub fn clear_priv_data(&mut self) {
        self.priv_data = None;
    }
}
