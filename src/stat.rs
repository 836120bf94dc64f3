//! `struct stat` and the `stat(2)` family.

use std::ffi::CStr;
use std::mem::MaybeUninit;

use crate::layout::{Fetch, Reader};
use crate::personality::Personality;
use crate::printer::Printer;
use crate::syscall::Rval;

/// `struct stat`, widened out of whichever kernel layout the tracee used.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct StructStat {
    pub dev: u64,
    pub ino: u64,
    pub rdev: u64,
    pub size: u64,
    pub blocks: u64,
    pub blksize: u64,
    pub mode: u32,
    pub nlink: u64,
    pub uid: u64,
    pub gid: u64,
    pub atime: i64,
    pub atime_nsec: u64,
    pub mtime: i64,
    pub mtime_nsec: u64,
    pub ctime: i64,
    pub ctime_nsec: u64,
}

/// The kernel's `struct stat` for the tracee's personality.
///
/// `x86_64` and `x32` share a layout of `__kernel_long_t` members, `i386` has its own with
/// 16-bit mode, link count and ids.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct KernelStat(pub StructStat);

impl Fetch for KernelStat {
    fn read(r: &mut Reader<'_>) -> Self {
        let st = match r.personality() {
            Personality::Native | Personality::X32 => {
                let dev = r.kulong();
                let ino = r.kulong();
                let nlink = r.kulong();
                let mode = r.u32();
                let uid = r.u32();
                let gid = r.u32();
                let _pad0 = r.u32();
                let rdev = r.kulong();
                let size = r.klong();
                let blksize = r.klong();
                let blocks = r.klong();
                let times = read_times(r, Reader::kulong);
                r.skip(3 * 8, 8);

                StructStat {
                    dev,
                    ino,
                    rdev,
                    size: size as u64,
                    blocks: blocks as u64,
                    blksize: blksize as u64,
                    mode,
                    nlink,
                    uid: u64::from(uid),
                    gid: u64::from(gid),
                    ..times
                }
            },
            Personality::Compat32 => {
                let dev = r.ulong();
                let ino = r.ulong();
                let mode = r.u16();
                let nlink = r.u16();
                let uid = r.u16();
                let gid = r.u16();
                let rdev = r.ulong();
                let size = r.ulong();
                let blksize = r.ulong();
                let blocks = r.ulong();
                let times = read_times(r, Reader::ulong);
                // __unused4, __unused5
                r.skip(8, 4);

                StructStat {
                    dev,
                    ino,
                    rdev,
                    size,
                    blocks,
                    blksize,
                    mode: u32::from(mode),
                    nlink: u64::from(nlink),
                    uid: u64::from(uid),
                    gid: u64::from(gid),
                    ..times
                }
            },
        };

        KernelStat(st)
    }
}

/// `st_atime` through `st_ctime_nsec`, each read by `word`.
fn read_times<'a>(r: &mut Reader<'a>, word: impl Fn(&mut Reader<'a>) -> u64) -> StructStat {
    StructStat {
        atime: word(r) as i64,
        atime_nsec: word(r),
        mtime: word(r) as i64,
        mtime_nsec: word(r),
        ctime: word(r) as i64,
        ctime_nsec: word(r),
        ..StructStat::default()
    }
}

const S_IFMT: u32 = 0o170000;
const S_IFSOCK: u32 = 0o140000;
const S_IFLNK: u32 = 0o120000;
const S_IFREG: u32 = 0o100000;
const S_IFBLK: u32 = 0o060000;
const S_IFDIR: u32 = 0o040000;
const S_IFCHR: u32 = 0o020000;
const S_IFIFO: u32 = 0o010000;
const S_ISUID: u32 = 0o4000;
const S_ISGID: u32 = 0o2000;
const S_ISVTX: u32 = 0o1000;

xlat! { MODETYPES = [S_IFREG, S_IFSOCK, S_IFIFO, S_IFLNK, S_IFDIR, S_IFBLK, S_IFCHR] }

const AT_SYMLINK_NOFOLLOW: u64 = 0x100;
const AT_REMOVEDIR: u64 = 0x200;
const AT_SYMLINK_FOLLOW: u64 = 0x400;
const AT_NO_AUTOMOUNT: u64 = 0x800;
const AT_EMPTY_PATH: u64 = 0x1000;

xlat! {
    AT_FLAGS = [
        AT_SYMLINK_NOFOLLOW,
        AT_REMOVEDIR,
        AT_SYMLINK_FOLLOW,
        AT_NO_AUTOMOUNT,
        AT_EMPTY_PATH,
    ]
}

/// C's `%#03o`.
fn octal(v: u32) -> String {
    if v == 0 {
        "000".into()
    } else {
        format!("{:0>3}", format!("0{:o}", v))
    }
}

/// `S_IFREG|S_ISUID|0755`
pub fn sprint_symbolic_mode(mode: u32) -> String {
    let ifmt = match mode & S_IFMT {
        0 => None,
        fmt => match MODETYPES.lookup(u64::from(fmt)) {
            Some(name) => Some(name),
            None => return octal(mode),
        },
    };

    let mut out = String::new();
    if let Some(ifmt) = ifmt {
        out.push_str(ifmt);
        out.push('|');
    }
    for &(bit, name) in &[(S_ISUID, "S_ISUID|"), (S_ISGID, "S_ISGID|"), (S_ISVTX, "S_ISVTX|")] {
        if mode & bit != 0 {
            out.push_str(name);
        }
    }
    out.push_str(&octal(mode & !(S_IFMT | S_ISUID | S_ISGID | S_ISVTX)));
    out
}

/// A timestamp as local `%FT%T%z`, or `0` for the epoch itself.
pub fn sprinttime(t: i64) -> String {
    if t == 0 {
        return "0".into();
    }

    let time = t as libc::time_t;
    let mut tm = MaybeUninit::<libc::tm>::zeroed();
    let mut buf = [0 as libc::c_char; 64];

    // Safety: `localtime_r` fills `tm` when it returns non-NULL, `strftime` writes at most
    // `buf.len()` bytes including the terminating NUL.
    let n = unsafe {
        if libc::localtime_r(&time, tm.as_mut_ptr()).is_null() {
            0
        } else {
            libc::strftime(buf.as_mut_ptr(), buf.len(), b"%FT%T%z\0".as_ptr().cast(), tm.as_ptr())
        }
    };

    if n == 0 {
        return format!("{}", t as u64);
    }

    // Safety: `strftime` succeeded, so `buf` is NUL-terminated.
    unsafe { CStr::from_ptr(buf.as_ptr()) }.to_string_lossy().into_owned()
}

impl<'a> Printer<'a> {
    pub fn print_struct_stat(&mut self, st: &StructStat) {
        self.tprints("{");
        if !self.abbrev() {
            self.tprints("st_dev=");
            self.print_dev_t(st.dev);
            tprintf!(self, ", st_ino={}, st_mode={}", st.ino, sprint_symbolic_mode(st.mode));
            tprintf!(self, ", st_nlink={}, st_uid={}, st_gid={}", st.nlink, st.uid, st.gid);
            tprintf!(self, ", st_blksize={}, st_blocks={}", st.blksize, st.blocks);
        } else {
            tprintf!(self, "st_mode={}", sprint_symbolic_mode(st.mode));
        }

        match st.mode & S_IFMT {
            S_IFCHR | S_IFBLK => {
                self.tprints(", st_rdev=");
                self.print_dev_t(st.rdev);
            },
            _ => tprintf!(self, ", st_size={}", st.size),
        }

        if !self.abbrev() {
            for &(name, t, nsec) in &[
                ("atime", st.atime, st.atime_nsec),
                ("mtime", st.mtime, st.mtime_nsec),
                ("ctime", st.ctime, st.ctime_nsec),
            ] {
                tprintf!(self, ", st_{}={}", name, sprinttime(t));
                if nsec != 0 {
                    tprintf!(self, ".{:09}", nsec);
                }
            }
        } else {
            self.tprints(", ...");
        }
        self.tprints("}");
    }

    /// The kernel `struct stat` at `addr`, or its address.
    pub fn print_stat(&mut self, addr: u64) {
        if let Some(KernelStat(st)) = self.umove_or_printaddr::<KernelStat>(addr) {
            self.print_struct_stat(&st);
        }
    }
}

fn stat_path(p: &mut Printer<'_>) -> Rval {
    if p.entering() {
        let path = p.tcp().arg_ulong(0);
        p.printpath(path);
        p.tprints(", ");
        return Rval::NeedsExit;
    }

    let buf = p.tcp().arg_ulong(1);
    p.print_stat(buf);

    Rval::Decoded
}

pub fn sys_stat(p: &mut Printer<'_>) -> Rval {
    stat_path(p)
}

pub fn sys_lstat(p: &mut Printer<'_>) -> Rval {
    stat_path(p)
}

pub fn sys_fstat(p: &mut Printer<'_>) -> Rval {
    if p.entering() {
        let fd = p.tcp().arg_int(0);
        p.printfd(fd);
        p.tprints(", ");
        return Rval::NeedsExit;
    }

    let buf = p.tcp().arg_ulong(1);
    p.print_stat(buf);

    Rval::Decoded
}

pub fn sys_newfstatat(p: &mut Printer<'_>) -> Rval {
    if p.entering() {
        let dirfd = p.tcp().arg_int(0);
        let path = p.tcp().arg_ulong(1);
        p.print_dirfd(dirfd);
        p.tprints(", ");
        p.printpath(path);
        p.tprints(", ");
        return Rval::NeedsExit;
    }

    let (buf, flags) = (p.tcp().arg_ulong(2), p.tcp().arg_uint(3));
    p.print_stat(buf);
    p.tprints(", ");
    p.printflags(&AT_FLAGS, u64::from(flags), "AT_???");

    Rval::Decoded
}
