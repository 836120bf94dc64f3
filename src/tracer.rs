//! Session state shared by every decoded call.

use tracing::trace;

use crate::config::Config;
use crate::memory::Memory;
use crate::printer::{Printer, Sink};
use crate::syscall::{self, Rval};
use crate::tcb::{Tcb, MAX_ARGS};

/// Decodes syscalls of tracees, one stop at a time.
pub struct Tracer {
    /// Tracee memory access, including whether bulk reads still work.
    memory: Memory,

    /// Options applied to every decoded call.
    config: Config,
}

impl Default for Tracer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tracer {
    /// A tracer reading memory of real tracees with ptrace.
    pub fn new() -> Self {
        Self::with_memory(Memory::default())
    }

    pub fn with_memory(memory: Memory) -> Self {
        let config = Config::default();

        Self { memory, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// A printer writing the decoding of `tcb` to `out`.
    pub fn printer<'a>(&'a self, tcb: &'a mut Tcb, out: &'a mut dyn Sink) -> Printer<'a> {
        Printer::new(tcb, &self.memory, &self.config, out)
    }

    /// Decode the arguments of the syscall `name` at the current stop of `tcb`.
    ///
    /// Calls without a dedicated decoder, and all calls in raw mode, have their arguments
    /// printed in hex.
    pub fn decode(&self, name: &str, tcb: &mut Tcb, out: &mut dyn Sink) -> Rval {
        trace!(pid = tcb.pid().as_raw(), name, phase = ?tcb.phase(), "decode");

        let mut p = self.printer(tcb, out);
        let rval = match syscall::decoder(name) {
            Some(decode) if !p.tcp().raw() => decode(&mut p),
            _ => syscall::printargs(&mut p, MAX_ARGS),
        };

        // There is no later stop to finish the decoding at.
        match rval {
            Rval::NeedsExit if p.exiting() => Rval::Decoded,
            rval => rval,
        }
    }
}
