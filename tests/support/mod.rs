use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use sysdecode::{Backend, Errno, Memory, Personality, Pid, Printer, Qualifiers, Rval, Tcb, Tracer, MAX_ARGS};

#[allow(unused)]
pub const PAGE_SIZE: u64 = 4096;

/// Where the first mapping of a [`FakeTracee`] goes.
const BASE: u64 = 0x7f00_0000_0000;

/// Same address as the 32-bit tracee sees it.
#[allow(unused)]
const BASE32: u64 = 0x4000_0000;

#[allow(unused)]
macro_rules! args {
    ($($arg: expr),* $(,)?) => {
        &[$($arg as u64),*]
    };
}

#[derive(Default)]
struct State {
    pages: BTreeMap<u64, Vec<u8>>,
    next: u64,
    vm_errno: Option<Errno>,
    vm_reads: usize,
    peeks: usize,
}

/// In-process stand-in for a tracee's address space.
///
/// Memory is mapped in whole pages. Each allocation is followed by an unmapped guard page,
/// so that data placed at the end of an allocation borders inaccessible memory.
#[derive(Clone, Default)]
pub struct FakeTracee {
    state: Rc<RefCell<State>>,
}

#[allow(unused)]
impl FakeTracee {
    pub fn new(pers: Personality) -> Self {
        let fake = Self::default();
        fake.state.borrow_mut().next = match pers.word_size() {
            8 => BASE,
            _ => BASE32,
        };
        fake
    }

    /// Make every `process_vm_readv` call fail with `errno`.
    pub fn fail_vm_readv(&self, errno: Errno) {
        self.state.borrow_mut().vm_errno = Some(errno);
    }

    pub fn vm_reads(&self) -> usize {
        self.state.borrow().vm_reads
    }

    pub fn peeks(&self) -> usize {
        self.state.borrow().peeks
    }

    /// Copy `data` into the tracee so that it ends right before a guard page.
    pub fn tail_alloc(&self, data: &[u8]) -> u64 {
        let mut state = self.state.borrow_mut();

        let pages = (data.len() as u64 + PAGE_SIZE - 1) / PAGE_SIZE;
        let pages = pages.max(1);
        let start = state.next;
        for i in 0..pages {
            state.pages.insert(start / PAGE_SIZE + i, vec![0; PAGE_SIZE as usize]);
        }
        state.next = start + (pages + 1) * PAGE_SIZE;

        let end = start + pages * PAGE_SIZE;
        let addr = end - data.len() as u64;
        drop(state);
        self.write(addr, data);

        addr
    }

    /// An address nothing is mapped at.
    pub fn unmapped(&self) -> u64 {
        let mut state = self.state.borrow_mut();
        let addr = state.next;
        state.next += PAGE_SIZE;
        addr
    }

    /// Overwrite mapped tracee memory.
    pub fn write(&self, addr: u64, data: &[u8]) {
        let mut state = self.state.borrow_mut();
        for (i, &b) in data.iter().enumerate() {
            let a = addr + i as u64;
            let page = state.pages.get_mut(&(a / PAGE_SIZE)).expect("write to unmapped page");
            page[(a % PAGE_SIZE) as usize] = b;
        }
    }

    fn byte(&self, addr: u64) -> Option<u8> {
        let state = self.state.borrow();
        let page = state.pages.get(&(addr / PAGE_SIZE))?;
        Some(page[(addr % PAGE_SIZE) as usize])
    }
}

impl Backend for FakeTracee {
    fn peek_word(&self, _pid: Pid, addr: u64) -> nix::Result<u64> {
        self.state.borrow_mut().peeks += 1;

        let mut word = [0; 8];
        for (i, b) in word.iter_mut().enumerate() {
            *b = self.byte(addr + i as u64).ok_or(Errno::EIO)?;
        }

        Ok(u64::from_ne_bytes(word))
    }

    fn read_vm(&self, _pid: Pid, local: &mut [u8], remote: u64) -> nix::Result<usize> {
        let vm_errno = {
            let mut state = self.state.borrow_mut();
            state.vm_reads += 1;
            state.vm_errno
        };
        if let Some(errno) = vm_errno {
            return Err(errno);
        }

        let mut read = 0;
        for b in local.iter_mut() {
            match self.byte(remote + read as u64) {
                Some(v) => *b = v,
                None => break,
            }
            read += 1;
        }

        if read == 0 && !local.is_empty() {
            return Err(Errno::EFAULT);
        }

        Ok(read)
    }
}

/// A tracer reading a [`FakeTracee`], decoding calls of one personality.
pub struct Session {
    pub mem: FakeTracee,
    pub tracer: Tracer,
    pub pers: Personality,
}

#[allow(unused)]
impl Session {
    pub fn new() -> Self {
        Self::with_personality(Personality::Native)
    }

    pub fn with_personality(pers: Personality) -> Self {
        let mem = FakeTracee::new(pers);
        let tracer = Tracer::with_memory(Memory::new(mem.clone()));

        Self { mem, tracer, pers }
    }

    pub fn tcb(&self) -> Tcb {
        Tcb::new(Pid::from_raw(1), self.pers)
    }

    pub fn syscall(&self, name: &str, args: &[u64]) -> Call<'_> {
        let mut all = [0; MAX_ARGS];
        all[..args.len()].copy_from_slice(args);

        let mut tcb = self.tcb();
        tcb.enter(0, all);

        Call { session: self, name: name.into(), tcb, out: String::new() }
    }

    /// Run `f` against a printer for an entering stop, returning what it printed.
    pub fn print<F>(&self, f: F) -> String
    where
        F: FnOnce(&mut Printer<'_>),
    {
        let mut tcb = self.tcb();
        self.print_with(&mut tcb, f)
    }

    pub fn print_with<F>(&self, tcb: &mut Tcb, f: F) -> String
    where
        F: FnOnce(&mut Printer<'_>),
    {
        let mut out = String::new();
        let mut p = self.tracer.printer(tcb, &mut out);
        f(&mut p);
        out
    }
}

/// One syscall invocation, driven through its stops.
pub struct Call<'a> {
    session: &'a Session,
    name: String,
    pub tcb: Tcb,
    out: String,
}

#[allow(unused)]
impl<'a> Call<'a> {
    pub fn qualifiers(mut self, qual: Qualifiers) -> Self {
        self.tcb.set_qualifiers(qual);
        self
    }

    pub fn enter(&mut self) -> Rval {
        self.session.tracer.decode(&self.name, &mut self.tcb, &mut self.out)
    }

    pub fn exit(&mut self, rval: i64) -> Rval {
        self.tcb.exit(rval, None);
        self.session.tracer.decode(&self.name, &mut self.tcb, &mut self.out)
    }

    pub fn fail(&mut self, errno: Errno) -> Rval {
        self.tcb.exit(-1, errno);
        self.session.tracer.decode(&self.name, &mut self.tcb, &mut self.out)
    }

    pub fn output(&self) -> &str {
        &self.out
    }

    pub fn auxstr(&self) -> Option<&str> {
        self.tcb.auxstr()
    }

    /// Decode a call returning `rval`, exiting only if the decoder asks to.
    pub fn run(mut self, rval: i64) -> String {
        if self.enter() == Rval::NeedsExit {
            self.exit(rval);
        }
        self.out
    }

    /// Decode a call failing with `errno`.
    pub fn run_err(mut self, errno: Errno) -> String {
        if self.enter() == Rval::NeedsExit {
            self.fail(errno);
        }
        self.out
    }
}

/// Builder for the byte image of a C structure, in native byte order.
#[allow(unused)]
#[derive(Clone, Debug, Default)]
pub struct Buf(pub Vec<u8>);

#[allow(unused)]
impl Buf {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn u8(mut self, v: u8) -> Self {
        self.0.push(v);
        self
    }

    pub fn u16(mut self, v: u16) -> Self {
        self.0.extend_from_slice(&v.to_ne_bytes());
        self
    }

    pub fn u32(mut self, v: u32) -> Self {
        self.0.extend_from_slice(&v.to_ne_bytes());
        self
    }

    pub fn i32(self, v: i32) -> Self {
        self.u32(v as u32)
    }

    pub fn u64(mut self, v: u64) -> Self {
        self.0.extend_from_slice(&v.to_ne_bytes());
        self
    }

    pub fn i64(self, v: i64) -> Self {
        self.u64(v as u64)
    }

    /// A tracee word of `pers`.
    pub fn word(self, pers: Personality, v: u64) -> Self {
        match pers.word_size() {
            8 => self.u64(v),
            _ => self.u32(v as u32),
        }
    }

    pub fn bytes(mut self, v: &[u8]) -> Self {
        self.0.extend_from_slice(v);
        self
    }

    /// A `char[N]` holding `s`, NUL padded.
    pub fn cstr(mut self, s: &str, n: usize) -> Self {
        let mut field = vec![0; n];
        field[..s.len()].copy_from_slice(s.as_bytes());
        self.0.extend_from_slice(&field);
        self
    }

    pub fn zeros(mut self, n: usize) -> Self {
        self.0.resize(self.0.len() + n, 0);
        self
    }

    /// Pad with zeros to a multiple of `align`.
    pub fn align(mut self, align: usize) -> Self {
        while self.0.len() % align != 0 {
            self.0.push(0);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Undo C-style quoting: strip the surrounding quotes and decode escapes.
#[allow(unused)]
pub fn unescape(quoted: &str) -> Vec<u8> {
    let inner = quoted.strip_prefix('"').and_then(|q| q.strip_suffix('"')).expect("quoted string");
    let bytes = inner.as_bytes();
    let mut out = Vec::new();

    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'\\' {
            out.push(bytes[i]);
            i += 1;
            continue;
        }

        i += 1;
        match bytes[i] {
            b'x' => {
                let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).expect("hex escape");
                out.push(u8::from_str_radix(hex, 16).expect("hex digits"));
                i += 3;
            },
            b'0'..=b'7' => {
                let digits = bytes[i..].iter().take(3).take_while(|b| (b'0'..=b'7').contains(b)).count();
                let oct = std::str::from_utf8(&bytes[i..i + digits]).expect("octal escape");
                out.push(u8::from_str_radix(oct, 8).expect("octal digits"));
                i += digits;
            },
            c => {
                out.push(match c {
                    b'f' => 0x0c,
                    b'n' => b'\n',
                    b'r' => b'\r',
                    b't' => b'\t',
                    b'v' => 0x0b,
                    c => c,
                });
                i += 1;
            },
        }
    }

    out
}
