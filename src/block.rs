//! Block device ioctls (`linux/fs.h`, type `0x12`).

use crate::ioctl::{io, ior, iow, iowr};
use crate::layout::{Fetch, Reader};
use crate::personality::Personality;
use crate::printnum::NumFmt;
use crate::printer::Printer;
use crate::quote::QuoteStyle;
use crate::syscall::Rval;

pub const IOCTL_TYPE: u32 = 0x12;

const BLKPG_ADD_PARTITION: u32 = 1;
const BLKPG_DEL_PARTITION: u32 = 2;
const BLKPG_RESIZE_PARTITION: u32 = 3;

xlat! { BLKPG_OPS = [BLKPG_ADD_PARTITION, BLKPG_DEL_PARTITION, BLKPG_RESIZE_PARTITION] }

const BLKTRACE_BDEV_SIZE: usize = 32;
const BLKPG_DEVNAMELTH: usize = 64;
const BLKPG_VOLNAMELTH: usize = 64;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BlkCmd {
    RoSet,
    RoGet,
    RrPart,
    GetSize,
    FlsBuf,
    RaSet,
    RaGet,
    FraSet,
    FraGet,
    SectGet,
    SszGet,
    Pg,
    BszGet,
    BszSet,
    GetSize64,
    TraceSetup,
    TraceStart,
    TraceStop,
    TraceTeardown,
    Discard,
    IoMin,
    IoOpt,
    AlignOff,
    PbszGet,
    DiscardZeroes,
    SecDiscard,
    Rotational,
    ZeroOut,
    GetZoneSz,
    GetNrZones,
}

impl BlkCmd {
    pub const ALL: [BlkCmd; 30] = [
        BlkCmd::RoSet,
        BlkCmd::RoGet,
        BlkCmd::RrPart,
        BlkCmd::GetSize,
        BlkCmd::FlsBuf,
        BlkCmd::RaSet,
        BlkCmd::RaGet,
        BlkCmd::FraSet,
        BlkCmd::FraGet,
        BlkCmd::SectGet,
        BlkCmd::SszGet,
        BlkCmd::Pg,
        BlkCmd::BszGet,
        BlkCmd::BszSet,
        BlkCmd::GetSize64,
        BlkCmd::TraceSetup,
        BlkCmd::TraceStart,
        BlkCmd::TraceStop,
        BlkCmd::TraceTeardown,
        BlkCmd::Discard,
        BlkCmd::IoMin,
        BlkCmd::IoOpt,
        BlkCmd::AlignOff,
        BlkCmd::PbszGet,
        BlkCmd::DiscardZeroes,
        BlkCmd::SecDiscard,
        BlkCmd::Rotational,
        BlkCmd::ZeroOut,
        BlkCmd::GetZoneSz,
        BlkCmd::GetNrZones,
    ];

    /// Request code under `pers`; some commands encode the tracee's `size_t`.
    pub fn code(self, pers: Personality) -> u32 {
        use BlkCmd::*;

        let size_t = pers.word_size();
        let t = IOCTL_TYPE;

        match self {
            RoSet => io(t, 93),
            RoGet => io(t, 94),
            RrPart => io(t, 95),
            GetSize => io(t, 96),
            FlsBuf => io(t, 97),
            RaSet => io(t, 98),
            RaGet => io(t, 99),
            FraSet => io(t, 100),
            FraGet => io(t, 101),
            SectGet => io(t, 103),
            SszGet => io(t, 104),
            Pg => io(t, 105),
            BszGet => ior(t, 112, size_t),
            BszSet => iow(t, 113, size_t),
            GetSize64 => ior(t, 114, size_t),
            TraceSetup => iowr(t, 115, BlkUserTraceSetup::size(pers)),
            TraceStart => io(t, 116),
            TraceStop => io(t, 117),
            TraceTeardown => io(t, 118),
            Discard => io(t, 119),
            IoMin => io(t, 120),
            IoOpt => io(t, 121),
            AlignOff => io(t, 122),
            PbszGet => io(t, 123),
            DiscardZeroes => io(t, 124),
            SecDiscard => io(t, 125),
            Rotational => io(t, 126),
            ZeroOut => io(t, 127),
            GetZoneSz => ior(t, 132, 4),
            GetNrZones => ior(t, 133, 4),
        }
    }

    pub fn name(self) -> &'static str {
        use BlkCmd::*;

        match self {
            RoSet => "BLKROSET",
            RoGet => "BLKROGET",
            RrPart => "BLKRRPART",
            GetSize => "BLKGETSIZE",
            FlsBuf => "BLKFLSBUF",
            RaSet => "BLKRASET",
            RaGet => "BLKRAGET",
            FraSet => "BLKFRASET",
            FraGet => "BLKFRAGET",
            SectGet => "BLKSECTGET",
            SszGet => "BLKSSZGET",
            Pg => "BLKPG",
            BszGet => "BLKBSZGET",
            BszSet => "BLKBSZSET",
            GetSize64 => "BLKGETSIZE64",
            TraceSetup => "BLKTRACESETUP",
            TraceStart => "BLKTRACESTART",
            TraceStop => "BLKTRACESTOP",
            TraceTeardown => "BLKTRACETEARDOWN",
            Discard => "BLKDISCARD",
            IoMin => "BLKIOMIN",
            IoOpt => "BLKIOOPT",
            AlignOff => "BLKALIGNOFF",
            PbszGet => "BLKPBSZGET",
            DiscardZeroes => "BLKDISCARDZEROES",
            SecDiscard => "BLKSECDISCARD",
            Rotational => "BLKROTATIONAL",
            ZeroOut => "BLKZEROOUT",
            GetZoneSz => "BLKGETZONESZ",
            GetNrZones => "BLKGETNRZONES",
        }
    }

    pub fn from_code(code: u32, pers: Personality) -> Option<Self> {
        Self::ALL.iter().copied().find(|cmd| cmd.code(pers) == code)
    }
}

/// `struct blk_user_trace_setup`
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BlkUserTraceSetup {
    pub name: [u8; BLKTRACE_BDEV_SIZE],
    pub act_mask: u16,
    pub buf_size: u32,
    pub buf_nr: u32,
    pub start_lba: u64,
    pub end_lba: u64,
    pub pid: u32,
}

impl Fetch for BlkUserTraceSetup {
    fn read(r: &mut Reader<'_>) -> Self {
        Self {
            name: r.bytes(),
            act_mask: r.u16(),
            buf_size: r.u32(),
            buf_nr: r.u32(),
            start_lba: r.u64(),
            end_lba: r.u64(),
            pid: r.u32(),
        }
    }
}

/// `struct blkpg_ioctl_arg`
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BlkpgIoctlArg {
    pub op: i32,
    pub flags: i32,
    pub datalen: i32,
    pub data: u64,
}

impl Fetch for BlkpgIoctlArg {
    fn read(r: &mut Reader<'_>) -> Self {
        Self {
            op: r.i32(),
            flags: r.i32(),
            datalen: r.i32(),
            data: r.ptr(),
        }
    }
}

/// `struct blkpg_partition`
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BlkpgPartition {
    pub start: i64,
    pub length: i64,
    pub pno: i32,
    pub devname: [u8; BLKPG_DEVNAMELTH],
    pub volname: [u8; BLKPG_VOLNAMELTH],
}

impl Fetch for BlkpgPartition {
    fn read(r: &mut Reader<'_>) -> Self {
        Self {
            start: r.i64(),
            length: r.i64(),
            pno: r.i32(),
            devname: r.bytes(),
            volname: r.bytes(),
        }
    }
}

fn print_blkpg_req(p: &mut Printer<'_>, blkpg: &BlkpgIoctlArg) {
    p.tprints("{op=");
    p.printxval(&BLKPG_OPS, u64::from(blkpg.op as u32), "BLKPG_???");
    tprintf!(p, ", flags={}, datalen={}", blkpg.flags, blkpg.datalen);

    p.tprints(", data=");
    if let Some(part) = p.umove_or_printaddr::<BlkpgPartition>(blkpg.data) {
        tprintf!(p, "{{start={}, length={}, pno={}", part.start, part.length, part.pno);
        p.tprints(", devname=");
        p.print_quoted_string(&part.devname, BLKPG_DEVNAMELTH, QuoteStyle::ZERO_TERMINATED);
        p.tprints(", volname=");
        p.print_quoted_string(&part.volname, BLKPG_VOLNAMELTH, QuoteStyle::ZERO_TERMINATED);
        p.tprints("}");
    }
    p.tprints("}");
}

pub fn decode(p: &mut Printer<'_>, code: u32, arg: u64) -> Rval {
    use BlkCmd::*;

    let cmd = match BlkCmd::from_code(code, p.personality()) {
        Some(cmd) => cmd,
        None => return Rval::NotDecoded,
    };

    match cmd {
        // The argument is a value, not a pointer.
        RaSet | FraSet => {
            let ra = p.tcp().arg_kulong(2);
            tprintf!(p, ", {}", ra);
        },

        SectGet | Rotational => {
            if p.entering() {
                return Rval::NeedsExit;
            }
            p.tprints(", ");
            p.printnum_short(arg, NumFmt::Unsigned);
        },

        RoGet | BszGet | SszGet | AlignOff | RoSet | BszSet => {
            if p.entering() && matches!(cmd, RoGet | BszGet | SszGet | AlignOff) {
                return Rval::NeedsExit;
            }
            p.tprints(", ");
            p.printnum_int(arg, NumFmt::Signed);
        },

        PbszGet | IoMin | IoOpt | DiscardZeroes | GetZoneSz | GetNrZones => {
            if p.entering() {
                return Rval::NeedsExit;
            }
            p.tprints(", ");
            p.printnum_int(arg, NumFmt::Unsigned);
        },

        RaGet | FraGet => {
            if p.entering() {
                return Rval::NeedsExit;
            }
            p.tprints(", ");
            p.printnum_slong(arg);
        },

        GetSize => {
            if p.entering() {
                return Rval::NeedsExit;
            }
            p.tprints(", ");
            p.printnum_ulong(arg);
        },

        GetSize64 => {
            if p.entering() {
                return Rval::NeedsExit;
            }
            p.tprints(", ");
            p.printnum_int64(arg, NumFmt::Unsigned);
        },

        Discard | SecDiscard | ZeroOut => {
            p.tprints(", ");
            p.printpair_int64(arg, NumFmt::Unsigned);
        },

        Pg => {
            p.tprints(", ");
            if let Some(blkpg) = p.umove_or_printaddr::<BlkpgIoctlArg>(arg) {
                print_blkpg_req(p, &blkpg);
            }
        },

        TraceSetup => {
            if p.entering() {
                p.tprints(", ");
                let buts = match p.umove_or_printaddr::<BlkUserTraceSetup>(arg) {
                    Some(buts) => buts,
                    None => return Rval::Decoded,
                };
                tprintf!(
                    p,
                    "{{act_mask={}, buf_size={}, buf_nr={}, start_lba={}, end_lba={}, pid={}",
                    buts.act_mask,
                    buts.buf_size,
                    buts.buf_nr,
                    buts.start_lba,
                    buts.end_lba,
                    buts.pid
                );
                return Rval::NeedsExit;
            }

            if !p.syserror() {
                if let Some(buts) = p.umove::<BlkUserTraceSetup>(arg) {
                    p.tprints(", name=");
                    p.print_quoted_string(&buts.name, BLKTRACE_BDEV_SIZE, QuoteStyle::ZERO_TERMINATED);
                }
            }
            p.tprints("}");
        },

        RrPart | FlsBuf | TraceStart | TraceStop | TraceTeardown => {},
    }

    Rval::Decoded
}
