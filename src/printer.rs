//! Rendering decoded values, fetched on demand from tracee memory.

use std::fmt;

use tracing::{error, trace};

use crate::config::Config;
use crate::layout::Fetch;
use crate::memory::Memory;
use crate::personality::Personality;
use crate::quote::{self, QuoteStyle};
use crate::tcb::Tcb;
use crate::xlat::Xlat;

/// Longest path printed by [`Printer::printpath`].
pub const PATH_MAX: usize = libc::PATH_MAX as usize;

/// Destination of decoded text. Fragments arrive in output order.
pub trait Sink {
    fn emit(&mut self, s: &str);
}

impl Sink for String {
    fn emit(&mut self, s: &str) {
        self.push_str(s);
    }
}

impl Sink for Vec<u8> {
    fn emit(&mut self, s: &str) {
        self.extend_from_slice(s.as_bytes());
    }
}

/// `printf`-style output to a [`Printer`].
macro_rules! tprintf {
    ($p: expr, $($arg: tt)*) => {
        $p.tprintf(format_args!($($arg)*))
    };
}

/// Formats like C's `%#x`: `0` for zero, else `0x` and lowercase hex digits.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Hex(pub u64);

impl fmt::Display for Hex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            f.write_str("0")
        } else {
            write!(f, "{:#x}", self.0)
        }
    }
}

/// How [`Printer::print_array`] fetches each element.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Fetcher {
    /// [`Printer::umoven_or_printaddr`].
    OrPrintAddr,

    /// [`Printer::umoven_or_printaddr_ignore_syserror`].
    IgnoreSyserror,
}

/// Decoding context of one syscall-stop: the call, the tracee's memory, session options
/// and the output sink.
pub struct Printer<'a> {
    tcp: &'a mut Tcb,
    memory: &'a Memory,
    config: &'a Config,
    out: &'a mut dyn Sink,
}

impl<'a> Printer<'a> {
    pub fn new(tcp: &'a mut Tcb, memory: &'a Memory, config: &'a Config, out: &'a mut dyn Sink) -> Self {
        Self { tcp, memory, config, out }
    }

    pub fn tcp(&self) -> &Tcb {
        self.tcp
    }

    pub fn tcp_mut(&mut self) -> &mut Tcb {
        self.tcp
    }

    pub fn config(&self) -> &Config {
        self.config
    }

    pub fn personality(&self) -> Personality {
        self.tcp.personality()
    }

    pub fn max_strlen(&self) -> u32 {
        self.config.max_strlen()
    }

    pub fn entering(&self) -> bool {
        self.tcp.entering()
    }

    pub fn exiting(&self) -> bool {
        self.tcp.exiting()
    }

    pub fn verbose(&self) -> bool {
        self.tcp.verbose()
    }

    pub fn abbrev(&self) -> bool {
        self.tcp.abbrev()
    }

    pub fn syserror(&self) -> bool {
        self.tcp.syserror()
    }

    pub fn tprints(&mut self, s: &str) {
        self.out.emit(s);
    }

    pub fn tprintf(&mut self, args: fmt::Arguments<'_>) {
        match args.as_str() {
            Some(s) => self.out.emit(s),
            None => self.out.emit(&args.to_string()),
        }
    }

    /// `NULL` or the address in hex.
    pub fn printaddr(&mut self, addr: u64) {
        if addr == 0 {
            self.tprints("NULL");
        } else {
            tprintf!(self, "{:#x}", addr);
        }
    }

    pub fn printfd(&mut self, fd: i32) {
        tprintf!(self, "{}", fd);
    }

    pub fn print_dirfd(&mut self, fd: i32) {
        if fd == libc::AT_FDCWD {
            self.tprints("AT_FDCWD");
        } else {
            self.printfd(fd);
        }
    }

    /// Copy `buf.len()` tracee bytes at `addr`, printing nothing.
    pub fn umoven(&self, addr: u64, buf: &mut [u8]) -> bool {
        let pid = self.tcp.pid();
        match self.memory.umoven(pid, self.personality(), addr, buf) {
            Ok(()) => true,
            Err(err) => {
                trace!(pid = pid.as_raw(), addr, %err, "fetch failed");
                false
            },
        }
    }

    pub fn umove<T: Fetch>(&self, addr: u64) -> Option<T> {
        let pers = self.personality();
        let mut buf = vec![0; T::size(pers)];
        if self.umoven(addr, &mut buf) {
            Some(T::parse(&buf, pers))
        } else {
            None
        }
    }

    /// Fetch `buf.len()` bytes at `addr`, or print the address instead.
    ///
    /// Nothing is fetched for a NULL address, in non-verbose mode, or when exiting a call
    /// which failed.
    pub fn umoven_or_printaddr(&mut self, addr: u64, buf: &mut [u8]) -> bool {
        if self.exiting() && self.syserror() {
            self.printaddr(addr);
            return false;
        }
        self.umoven_or_printaddr_ignore_syserror(addr, buf)
    }

    /// Like [`Printer::umoven_or_printaddr`], but fetch even after a failed call.
    pub fn umoven_or_printaddr_ignore_syserror(&mut self, addr: u64, buf: &mut [u8]) -> bool {
        if addr == 0 || !self.verbose() || !self.umoven(addr, buf) {
            self.printaddr(addr);
            return false;
        }
        true
    }

    pub fn umove_or_printaddr<T: Fetch>(&mut self, addr: u64) -> Option<T> {
        self.fetch_record(addr, Fetcher::OrPrintAddr)
    }

    pub fn umove_or_printaddr_ignore_syserror<T: Fetch>(&mut self, addr: u64) -> Option<T> {
        self.fetch_record(addr, Fetcher::IgnoreSyserror)
    }

    fn fetch_record<T: Fetch>(&mut self, addr: u64, fetcher: Fetcher) -> Option<T> {
        let pers = self.personality();
        let mut buf = vec![0; T::size(pers)];
        if self.fetch(fetcher, addr, &mut buf) {
            Some(T::parse(&buf, pers))
        } else {
            None
        }
    }

    fn fetch(&mut self, fetcher: Fetcher, addr: u64, buf: &mut [u8]) -> bool {
        match fetcher {
            Fetcher::OrPrintAddr => self.umoven_or_printaddr(addr, buf),
            Fetcher::IgnoreSyserror => self.umoven_or_printaddr_ignore_syserror(addr, buf),
        }
    }

    /// Fetch up to `buf.len()` bytes of a NUL-terminated string. `Some(true)` if the NUL
    /// was found.
    pub fn umovestr(&self, addr: u64, buf: &mut [u8]) -> Option<bool> {
        let pid = self.tcp.pid();
        match self.memory.umovestr(pid, self.personality(), addr, buf) {
            Ok(nul) => Some(nul),
            Err(err) => {
                trace!(pid = pid.as_raw(), addr, %err, "string fetch failed");
                None
            },
        }
    }

    /// Print `nmemb` elements of `elem_size` bytes starting at `start` as `[a, b, ...]`.
    ///
    /// Prints `NULL` for a NULL array, `[]` for an empty one and just the address if the
    /// array does not fit in the address space. Element fetch failures are left to the
    /// fetcher to print. In abbreviated mode at most `max_strlen` elements are shown.
    /// `render` stops the iteration by returning `false`.
    ///
    /// Returns `true` if no element fetch failed.
    pub fn print_array<F>(
        &mut self,
        start: u64,
        nmemb: u64,
        elem_size: usize,
        fetcher: Fetcher,
        mut render: F,
    ) -> bool
    where
        F: FnMut(&mut Self, &[u8]) -> bool,
    {
        if start == 0 {
            self.tprints("NULL");
            return false;
        }

        if nmemb == 0 {
            self.tprints("[]");
            return false;
        }

        let max_addr = self.personality().max_addr();
        let end = (elem_size as u64)
            .checked_mul(nmemb)
            .filter(|&size| size > 0)
            .and_then(|size| start.checked_add(size))
            .filter(|&end| end - 1 <= max_addr);

        let end = match end {
            Some(end) => end,
            None => {
                self.printaddr(start);
                return false;
            },
        };

        let max_strlen = u64::from(self.max_strlen());
        let abbrev_end = if self.abbrev() && max_strlen < nmemb {
            start + elem_size as u64 * max_strlen
        } else {
            end
        };

        let mut buf = vec![0; elem_size];
        let mut cur = start;

        while cur < end {
            if cur != start {
                self.tprints(", ");
            }

            if !self.fetch(fetcher, cur, &mut buf) {
                break;
            }

            if cur == start {
                self.tprints("[");
            }

            if cur >= abbrev_end {
                self.tprints("...");
                cur = end;
                break;
            }

            if !render(self, &buf) {
                cur = end;
                break;
            }

            cur += elem_size as u64;
        }

        if cur != start {
            self.tprints("]");
        }

        cur >= end
    }

    /// Quote and print `size` bytes of an in-tracer buffer.
    ///
    /// With [`QuoteStyle::ZERO_TERMINATED`] at most `size - 1` bytes are shown and the last
    /// one is the lookahead. Returns `true` if a NUL-terminated string was shown entirely.
    pub fn print_quoted_string(&mut self, bytes: &[u8], size: usize, style: QuoteStyle) -> bool {
        let mut size = size.min(bytes.len());
        if size > 0 && style.contains(QuoteStyle::ZERO_TERMINATED) {
            size -= 1;
        }

        let mut out = String::new();
        let reserved = size
            .checked_mul(4)
            .and_then(|n| n.checked_add(3))
            .map(|n| out.try_reserve(n));

        if !matches!(reserved, Some(Ok(()))) {
            error!(size, "Out of memory");
            self.tprints("???");
            return false;
        }

        let complete = quote::quote_into(&mut out, bytes, size, style, self.config.xflag());
        self.tprints(&out);
        complete
    }

    /// Print the string at `addr`. `None` for `len` means NUL-terminated of unknown length.
    ///
    /// At most `max_strlen` bytes are shown; `...` follows if there was more.
    pub fn printstr_ex(&mut self, addr: u64, len: Option<u64>, style: QuoteStyle) {
        if addr == 0 {
            self.tprints("NULL");
            return;
        }

        let max = self.max_strlen() as usize;
        let mut style = style;
        let mut size = max + 1;

        let fetched = match len {
            None => {
                style |= QuoteStyle::ZERO_TERMINATED;
                let mut buf = vec![0; size + 1];
                match self.umovestr(addr, &mut buf[..size]) {
                    Some(_) => Some(buf),
                    None => None,
                }
            },
            Some(len) => {
                if (size as u64) > len {
                    size = len as usize;
                }
                let mut buf = vec![0; size + 1];
                let ok = if style.contains(QuoteStyle::ZERO_TERMINATED) {
                    self.umovestr(addr, &mut buf[..size]).is_some()
                } else {
                    self.umoven(addr, &mut buf[..size])
                };
                if ok {
                    Some(buf)
                } else {
                    None
                }
            },
        };

        let mut buf = match fetched {
            Some(buf) => buf,
            None => {
                self.printaddr(addr);
                return;
            },
        };

        if size > max {
            size = max;
        } else {
            buf[size] = 0xff;
        }

        let (text, complete) = quote::string_quote(&buf, size, style, self.config.xflag());
        let ellipsis = !complete
            && len != Some(0)
            && (style.contains(QuoteStyle::ZERO_TERMINATED) || len.map_or(true, |len| len > max as u64));

        self.tprints(&text);
        if ellipsis {
            self.tprints("...");
        }
    }

    pub fn printstr(&mut self, addr: u64, len: u64) {
        self.printstr_ex(addr, Some(len), QuoteStyle::empty());
    }

    /// Print a NUL-terminated path of at most `n` bytes, `...` if it is longer.
    pub fn printpathn(&mut self, addr: u64, n: usize) {
        if addr == 0 {
            self.tprints("NULL");
            return;
        }

        let n = n.min(PATH_MAX);
        let mut path = vec![0; n + 1];

        match self.umovestr(addr, &mut path) {
            None => self.printaddr(addr),
            Some(nul_seen) => {
                path[n] = 0;
                self.print_quoted_string(&path, n + 1, QuoteStyle::ZERO_TERMINATED);
                if !nul_seen {
                    self.tprints("...");
                }
            },
        }
    }

    pub fn printpath(&mut self, addr: u64) {
        self.printpathn(addr, PATH_MAX);
    }

    /// Hex dump of `len` bytes at `addr`, sixteen per line.
    pub fn dumpstr(&mut self, addr: u64, len: usize) {
        let mut data = Vec::new();
        if data.try_reserve(len + 16).is_err() {
            error!(len, "Out of memory");
            return;
        }
        data.resize(len, 0);

        if !self.umoven(addr, &mut data) {
            return;
        }

        while data.len() % 16 != 0 {
            data.push(b' ');
        }

        for (line, chunk) in data.chunks(16).enumerate() {
            let offset = line * 16;
            let mut text = String::with_capacity(70);

            for (i, &c) in chunk.iter().enumerate() {
                if offset + i < len {
                    text.push(HEX_DIGITS[usize::from(c >> 4)] as char);
                    text.push(HEX_DIGITS[usize::from(c & 0xf)] as char);
                } else {
                    text.push_str("  ");
                }
                text.push(' ');
                if i % 8 == 7 {
                    text.push(' ');
                }
            }

            for &c in chunk {
                text.push(if (b' '..0x7f).contains(&c) { c as char } else { '.' });
            }

            tprintf!(self, " | {:05x}  {} |\n", offset, text);
        }
    }

    /// Print the name of `val` in `xlat`, or `val` in hex with `dflt` as a comment.
    pub fn printxval(&mut self, xlat: &Xlat, val: u64, dflt: &str) -> bool {
        self.printxvals(val, dflt, &[xlat])
    }

    /// Like [`Printer::printxval`], searching each table in order.
    pub fn printxvals(&mut self, val: u64, dflt: &str, xlats: &[&Xlat]) -> bool {
        if let Some(name) = crate::xlat::lookup_in(xlats, val) {
            self.tprints(name);
            return true;
        }

        tprintf!(self, "{}", Hex(val));
        if !dflt.is_empty() {
            tprintf!(self, " /* {} */", dflt);
        }
        false
    }

    /// Print `flags` as `NAME|NAME|0x..`. Returns the number of printed components.
    ///
    /// Unknown nonzero flags get `dflt` as a comment; zero prints as `0` when `dflt` is
    /// nonempty, unless the table names the zero value.
    pub fn printflags(&mut self, xlat: &Xlat, flags: u64, dflt: &str) -> usize {
        let entries = xlat.entries();
        if flags == 0 {
            if let Some(first) = entries.first().filter(|e| e.val == 0) {
                self.tprints(first.name);
                return 1;
            }
        }

        let mut rest = flags;
        let mut n = 0;

        for e in entries {
            if e.val != 0 && rest & e.val == e.val {
                if n > 0 {
                    self.tprints("|");
                }
                self.tprints(e.name);
                rest &= !e.val;
                n += 1;
            }
        }

        if n > 0 {
            if rest != 0 {
                tprintf!(self, "|{:#x}", rest);
                n += 1;
            }
        } else if rest != 0 {
            tprintf!(self, "{:#x}", rest);
            if !dflt.is_empty() {
                tprintf!(self, " /* {} */", dflt);
            }
        } else if !dflt.is_empty() {
            self.tprints("0");
        }

        n
    }
}

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Major number of a `dev_t`, as glibc's `major(3)`.
pub fn major(dev: u64) -> u32 {
    (((dev >> 8) & 0xfff) | ((dev >> 32) & 0xffff_f000)) as u32
}

/// Minor number of a `dev_t`, as glibc's `minor(3)`.
pub fn minor(dev: u64) -> u32 {
    ((dev & 0xff) | ((dev >> 12) & 0xffff_ff00)) as u32
}

impl<'a> Printer<'a> {
    /// `makedev(major, minor)`
    pub fn print_dev_t(&mut self, dev: u64) {
        tprintf!(self, "makedev({}, {})", major(dev), minor(dev));
    }
}
