//! `struct timeval` and friends, and the syscalls taking them.

use crate::layout::{Fetch, Reader};
use crate::printer::{Fetcher, Printer};
use crate::syscall::Rval;

/// `struct timeval`, whose members are `__kernel_long_t`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Timeval {
    pub tv_sec: i64,
    pub tv_usec: i64,
}

impl Fetch for Timeval {
    fn read(r: &mut Reader<'_>) -> Self {
        Self { tv_sec: r.klong(), tv_usec: r.klong() }
    }
}

impl Timeval {
    pub fn render(&self) -> String {
        format!("{{tv_sec={}, tv_usec={}}}", self.tv_sec, self.tv_usec)
    }
}

/// `struct itimerval`
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Itimerval {
    pub it_interval: Timeval,
    pub it_value: Timeval,
}

impl Fetch for Itimerval {
    fn read(r: &mut Reader<'_>) -> Self {
        Self { it_interval: r.record(), it_value: r.record() }
    }
}

/// `struct timezone`
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Timezone {
    pub tz_minuteswest: i32,
    pub tz_dsttime: i32,
}

impl Fetch for Timezone {
    fn read(r: &mut Reader<'_>) -> Self {
        Self { tz_minuteswest: r.i32(), tz_dsttime: r.i32() }
    }
}

/// `struct rusage`, as the kernel lays it out.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Rusage {
    pub ru_utime: Timeval,
    pub ru_stime: Timeval,
    pub counters: [u64; RUSAGE_COUNTERS.len()],
}

const RUSAGE_COUNTERS: [&str; 14] = [
    "ru_maxrss",
    "ru_ixrss",
    "ru_idrss",
    "ru_isrss",
    "ru_minflt",
    "ru_majflt",
    "ru_nswap",
    "ru_inblock",
    "ru_oublock",
    "ru_msgsnd",
    "ru_msgrcv",
    "ru_nsignals",
    "ru_nvcsw",
    "ru_nivcsw",
];

impl Fetch for Rusage {
    fn read(r: &mut Reader<'_>) -> Self {
        let ru_utime = r.record();
        let ru_stime = r.record();
        let mut counters = [0; RUSAGE_COUNTERS.len()];
        for c in counters.iter_mut() {
            *c = r.kulong();
        }
        Self { ru_utime, ru_stime, counters }
    }
}

const ITIMER_REAL: u64 = 0;
const ITIMER_VIRTUAL: u64 = 1;
const ITIMER_PROF: u64 = 2;

xlat! { sorted ITIMER_WHICH = [ITIMER_REAL, ITIMER_VIRTUAL, ITIMER_PROF] }

const RUSAGE_SELF: u64 = 0;
const RUSAGE_THREAD: u64 = 1;
const RUSAGE_CHILDREN: u64 = -1i32 as u32 as u64;
const RUSAGE_BOTH: u64 = -2i32 as u32 as u64;

xlat! { USAGE_WHO = [RUSAGE_SELF, RUSAGE_CHILDREN, RUSAGE_BOTH, RUSAGE_THREAD] }

impl<'a> Printer<'a> {
    pub fn print_timeval(&mut self, addr: u64) {
        if let Some(tv) = self.umove_or_printaddr::<Timeval>(addr) {
            self.tprints(&tv.render());
        }
    }

    /// `[{...}, {...}]`, as passed to `utimes(2)`.
    pub fn print_timeval_pair(&mut self, addr: u64) {
        let size = Timeval::size(self.personality());
        let pers = self.personality();
        self.print_array(addr, 2, size, Fetcher::OrPrintAddr, |p, elem| {
            p.tprints(&Timeval::parse(elem, pers).render());
            true
        });
    }

    /// The timeval at `addr` as a string, or its address if it cannot be shown.
    pub fn sprint_timeval(&self, addr: u64) -> String {
        if addr == 0 {
            return "NULL".into();
        }

        if !self.verbose() || (self.exiting() && self.syserror()) {
            return format!("{:#x}", addr);
        }

        match self.umove::<Timeval>(addr) {
            Some(tv) => tv.render(),
            None => format!("{:#x}", addr),
        }
    }

    pub fn print_itimerval(&mut self, addr: u64) {
        if let Some(itv) = self.umove_or_printaddr::<Itimerval>(addr) {
            tprintf!(
                self,
                "{{it_interval={}, it_value={}}}",
                itv.it_interval.render(),
                itv.it_value.render()
            );
        }
    }

    pub fn print_timezone(&mut self, addr: u64) {
        if let Some(tz) = self.umove_or_printaddr::<Timezone>(addr) {
            tprintf!(self, "{{tz_minuteswest={}, tz_dsttime={}}}", tz.tz_minuteswest, tz.tz_dsttime);
        }
    }

    pub fn printrusage(&mut self, addr: u64) {
        let ru = match self.umove_or_printaddr::<Rusage>(addr) {
            Some(ru) => ru,
            None => return,
        };

        tprintf!(self, "{{ru_utime={}, ru_stime={}", ru.ru_utime.render(), ru.ru_stime.render());
        if self.abbrev() {
            self.tprints(", ...");
        } else {
            for (name, value) in RUSAGE_COUNTERS.iter().zip(ru.counters.iter()) {
                tprintf!(self, ", {}={}", name, value);
            }
        }
        self.tprints("}");
    }
}

pub fn sys_gettimeofday(p: &mut Printer<'_>) -> Rval {
    if p.exiting() {
        let (tv, tz) = (p.tcp().arg_ulong(0), p.tcp().arg_ulong(1));
        p.print_timeval(tv);
        p.tprints(", ");
        p.print_timezone(tz);
        return Rval::Decoded;
    }

    Rval::NeedsExit
}

pub fn sys_settimeofday(p: &mut Printer<'_>) -> Rval {
    let (tv, tz) = (p.tcp().arg_ulong(0), p.tcp().arg_ulong(1));
    p.print_timeval(tv);
    p.tprints(", ");
    p.print_timezone(tz);

    Rval::Decoded
}

pub fn sys_utimes(p: &mut Printer<'_>) -> Rval {
    let (path, times) = (p.tcp().arg_ulong(0), p.tcp().arg_ulong(1));
    p.printpath(path);
    p.tprints(", ");
    p.print_timeval_pair(times);

    Rval::Decoded
}

pub fn sys_futimesat(p: &mut Printer<'_>) -> Rval {
    let dirfd = p.tcp().arg_int(0);
    let (path, times) = (p.tcp().arg_ulong(1), p.tcp().arg_ulong(2));
    p.print_dirfd(dirfd);
    p.tprints(", ");
    p.printpath(path);
    p.tprints(", ");
    p.print_timeval_pair(times);

    Rval::Decoded
}

fn print_which(p: &mut Printer<'_>) {
    let which = u64::from(p.tcp().arg_uint(0));
    p.printxval(&ITIMER_WHICH, which, "ITIMER_???");
    p.tprints(", ");
}

pub fn sys_getitimer(p: &mut Printer<'_>) -> Rval {
    if p.entering() {
        print_which(p);
        return Rval::NeedsExit;
    }

    let curr = p.tcp().arg_ulong(1);
    p.print_itimerval(curr);

    Rval::Decoded
}

pub fn sys_setitimer(p: &mut Printer<'_>) -> Rval {
    if p.entering() {
        print_which(p);
        let new = p.tcp().arg_ulong(1);
        p.print_itimerval(new);
        p.tprints(", ");
        return Rval::NeedsExit;
    }

    let old = p.tcp().arg_ulong(2);
    p.print_itimerval(old);

    Rval::Decoded
}

pub fn sys_getrusage(p: &mut Printer<'_>) -> Rval {
    if p.entering() {
        let who = u64::from(p.tcp().arg_uint(0));
        p.printxval(&USAGE_WHO, who, "RUSAGE_???");
        p.tprints(", ");
        return Rval::NeedsExit;
    }

    let usage = p.tcp().arg_ulong(1);
    p.printrusage(usage);

    Rval::Decoded
}
