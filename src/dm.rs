//! Device-mapper ioctls (`linux/dm-ioctl.h`, type `0xfd`).
//!
//! Every command passes a `struct dm_ioctl` header followed by a data area of
//! `data_size - data_start` bytes. Records in the data area are chained by offsets taken
//! from the (possibly corrupt) tracee, so each one is checked with [`record_end`] before
//! it is fetched.

use crate::ioctl::iowr;
use crate::layout::{Fetch, Reader};
use crate::personality::Personality;
use crate::printer::{Fetcher, Printer};
use crate::quote::QuoteStyle;
use crate::syscall::Rval;
use crate::tcb::PrivData;

pub const IOCTL_TYPE: u32 = 0xfd;

pub const DM_VERSION_MAJOR: u32 = 4;

const DM_NAME_LEN: usize = 128;
const DM_UUID_LEN: usize = 129;
const DM_MAX_TYPE_NAME: usize = 16;

/// `sizeof(struct dm_ioctl)`
const DM_IOCTL_SIZE: usize = 312;

/// `offsetof(struct dm_ioctl, data)`, the part of the header that is fetched.
const DM_IOCTL_DATA_OFFSET: u32 = 305;

/// `offsetof(struct dm_ioctl, data_size)`
const DM_IOCTL_DATA_SIZE_OFFSET: u32 = 12;

/// `offsetof(struct dm_target_deps, dev)`
const TARGET_DEPS_DEV_OFFSET: u32 = 8;

/// `offsetof(struct dm_name_list, name)`
const NAME_LIST_NAME_OFFSET: u32 = 12;

/// `offsetof(struct dm_target_versions, name)`
const TARGET_VERSIONS_NAME_OFFSET: u32 = 16;

/// `offsetof(struct dm_target_msg, message)`
const TARGET_MSG_MESSAGE_OFFSET: u32 = 8;

const DM_READONLY_FLAG: u32 = 1 << 0;
const DM_SUSPEND_FLAG: u32 = 1 << 1;
const DM_EXISTS_FLAG: u32 = 1 << 2;
const DM_PERSISTENT_DEV_FLAG: u32 = 1 << 3;
const DM_STATUS_TABLE_FLAG: u32 = 1 << 4;
const DM_ACTIVE_PRESENT_FLAG: u32 = 1 << 5;
const DM_INACTIVE_PRESENT_FLAG: u32 = 1 << 6;
const DM_BUFFER_FULL_FLAG: u32 = 1 << 8;
const DM_SKIP_BDGET_FLAG: u32 = 1 << 9;
const DM_SKIP_LOCKFS_FLAG: u32 = 1 << 10;
const DM_NOFLUSH_FLAG: u32 = 1 << 11;
const DM_QUERY_INACTIVE_TABLE_FLAG: u32 = 1 << 12;
const DM_UEVENT_GENERATED_FLAG: u32 = 1 << 13;
const DM_UUID_FLAG: u32 = 1 << 14;
const DM_SECURE_DATA_FLAG: u32 = 1 << 15;
const DM_DATA_OUT_FLAG: u32 = 1 << 16;
const DM_DEFERRED_REMOVE: u32 = 1 << 17;
const DM_INTERNAL_SUSPEND_FLAG: u32 = 1 << 18;

xlat! {
    DM_FLAGS = [
        DM_READONLY_FLAG,
        DM_SUSPEND_FLAG,
        DM_EXISTS_FLAG,
        DM_PERSISTENT_DEV_FLAG,
        DM_STATUS_TABLE_FLAG,
        DM_ACTIVE_PRESENT_FLAG,
        DM_INACTIVE_PRESENT_FLAG,
        DM_BUFFER_FULL_FLAG,
        DM_SKIP_BDGET_FLAG,
        DM_SKIP_LOCKFS_FLAG,
        DM_NOFLUSH_FLAG,
        DM_QUERY_INACTIVE_TABLE_FLAG,
        DM_UEVENT_GENERATED_FLAG,
        DM_UUID_FLAG,
        DM_SECURE_DATA_FLAG,
        DM_DATA_OUT_FLAG,
        DM_DEFERRED_REMOVE,
        DM_INTERNAL_SUSPEND_FLAG,
    ]
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DmCmd {
    Version,
    RemoveAll,
    ListDevices,
    DevCreate,
    DevRemove,
    DevRename,
    DevSuspend,
    DevStatus,
    DevWait,
    TableLoad,
    TableClear,
    TableDeps,
    TableStatus,
    ListVersions,
    TargetMsg,
    DevSetGeometry,
}

impl DmCmd {
    pub const ALL: [DmCmd; 16] = [
        DmCmd::Version,
        DmCmd::RemoveAll,
        DmCmd::ListDevices,
        DmCmd::DevCreate,
        DmCmd::DevRemove,
        DmCmd::DevRename,
        DmCmd::DevSuspend,
        DmCmd::DevStatus,
        DmCmd::DevWait,
        DmCmd::TableLoad,
        DmCmd::TableClear,
        DmCmd::TableDeps,
        DmCmd::TableStatus,
        DmCmd::ListVersions,
        DmCmd::TargetMsg,
        DmCmd::DevSetGeometry,
    ];

    /// The command number is its position in [`DmCmd::ALL`].
    pub fn code(self) -> u32 {
        iowr(IOCTL_TYPE, self as u32, DM_IOCTL_SIZE)
    }

    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.iter().copied().find(|cmd| cmd.code() == code)
    }

    pub fn name(self) -> &'static str {
        use DmCmd::*;

        match self {
            Version => "DM_VERSION",
            RemoveAll => "DM_REMOVE_ALL",
            ListDevices => "DM_LIST_DEVICES",
            DevCreate => "DM_DEV_CREATE",
            DevRemove => "DM_DEV_REMOVE",
            DevRename => "DM_DEV_RENAME",
            DevSuspend => "DM_DEV_SUSPEND",
            DevStatus => "DM_DEV_STATUS",
            DevWait => "DM_DEV_WAIT",
            TableLoad => "DM_TABLE_LOAD",
            TableClear => "DM_TABLE_CLEAR",
            TableDeps => "DM_TABLE_DEPS",
            TableStatus => "DM_TABLE_STATUS",
            ListVersions => "DM_LIST_VERSIONS",
            TargetMsg => "DM_TARGET_MSG",
            DevSetGeometry => "DM_DEV_SET_GEOMETRY",
        }
    }

    fn has_params(self) -> bool {
        use DmCmd::*;

        !matches!(self, Version | RemoveAll | DevCreate | DevRemove | DevSuspend | DevStatus | TableClear)
    }
}

/// `struct dm_ioctl`, up to its `data` member.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DmIoctl {
    pub version: [u32; 3],
    pub data_size: u32,
    pub data_start: u32,
    pub target_count: u32,
    pub open_count: u32,
    pub flags: u32,
    pub event_nr: u32,
    pub dev: u64,
    pub name: [u8; DM_NAME_LEN],
    pub uuid: [u8; DM_UUID_LEN],
}

impl DmIoctl {
    /// True if the fields the kernel may rewrite are unchanged.
    fn same_header(&self, other: &DmIoctl) -> bool {
        self.version == other.version
            && self.data_size == other.data_size
            && self.data_start == other.data_start
            && self.flags == other.flags
    }
}

impl Fetch for DmIoctl {
    fn read(r: &mut Reader<'_>) -> Self {
        let version = r.u32s();
        let data_size = r.u32();
        let data_start = r.u32();
        let target_count = r.u32();
        let open_count = r.u32();
        let flags = r.u32();
        let event_nr = r.u32();
        r.skip(4, 4);
        let dev = r.u64();
        let name = r.bytes();
        let uuid = r.bytes();

        Self { version, data_size, data_start, target_count, open_count, flags, event_nr, dev, name, uuid }
    }

    fn size(_pers: Personality) -> usize {
        DM_IOCTL_DATA_OFFSET as usize
    }
}

/// `struct dm_target_spec`
#[derive(Clone, Debug, Eq, PartialEq)]
struct DmTargetSpec {
    sector_start: u64,
    length: u64,
    status: i32,
    next: u32,
    target_type: [u8; DM_MAX_TYPE_NAME],
}

impl Fetch for DmTargetSpec {
    fn read(r: &mut Reader<'_>) -> Self {
        Self {
            sector_start: r.u64(),
            length: r.u64(),
            status: r.i32(),
            next: r.u32(),
            target_type: r.bytes(),
        }
    }
}

/// `struct dm_target_deps`, without its trailing `dev` array.
struct DmTargetDeps {
    count: u32,
}

impl Fetch for DmTargetDeps {
    fn read(r: &mut Reader<'_>) -> Self {
        let count = r.u32();
        r.skip(4, 4);
        Self { count }
    }
}

/// `struct dm_name_list`, without its trailing `name`.
struct DmNameList {
    dev: u64,
    next: u32,
}

impl Fetch for DmNameList {
    fn read(r: &mut Reader<'_>) -> Self {
        Self { dev: r.u64(), next: r.u32() }
    }
}

/// `struct dm_target_versions`, without its trailing `name`.
struct DmTargetVersions {
    next: u32,
    version: [u32; 3],
}

impl Fetch for DmTargetVersions {
    fn read(r: &mut Reader<'_>) -> Self {
        Self { next: r.u32(), version: r.u32s() }
    }
}

/// `struct dm_target_msg`, without its trailing `message`.
struct DmTargetMsg {
    sector: u64,
}

impl Fetch for DmTargetMsg {
    fn read(r: &mut Reader<'_>) -> Self {
        Self { sector: r.u64() }
    }
}

/// End offset of a record whose fixed part of `fixed_len` bytes starts at `offset`, or
/// `None` if that part does not lie within the first `data_size` bytes of the buffer.
pub fn record_end(offset: u32, fixed_len: u32, data_size: u32) -> Option<u32> {
    let end = offset.wrapping_add(fixed_len);
    if end <= offset || end > data_size {
        None
    } else {
        Some(end)
    }
}

/// The device-mapper structures have the same layout under every personality.
fn fetch<T: Fetch>(p: &mut Printer<'_>, addr: u64) -> Option<T> {
    let mut buf = vec![0; T::size(Personality::Native)];
    if p.umoven_or_printaddr(addr, &mut buf) {
        Some(T::parse(&buf, Personality::Native))
    } else {
        None
    }
}

fn decode_device(p: &mut Printer<'_>, cmd: DmCmd, ioc: &DmIoctl) {
    if matches!(cmd, DmCmd::RemoveAll | DmCmd::ListDevices | DmCmd::ListVersions) {
        return;
    }

    if ioc.dev != 0 {
        p.tprints(", dev=");
        p.print_dev_t(ioc.dev);
    }

    if ioc.name[0] != 0 {
        p.tprints(", name=");
        p.print_quoted_string(&ioc.name, DM_NAME_LEN, QuoteStyle::ZERO_TERMINATED);
    }

    if ioc.uuid[0] != 0 {
        p.tprints(", uuid=");
        p.print_quoted_string(&ioc.uuid, DM_UUID_LEN, QuoteStyle::ZERO_TERMINATED);
    }
}

fn decode_values(p: &mut Printer<'_>, cmd: DmCmd, ioc: &DmIoctl) {
    use DmCmd::*;

    if p.entering() {
        match cmd {
            TableLoad => tprintf!(p, ", target_count={}", ioc.target_count),
            DevSuspend if ioc.flags & DM_SUSPEND_FLAG != 0 => {},
            DevSuspend | DevRename | DevRemove | DevWait => tprintf!(p, ", event_nr={}", ioc.event_nr),
            _ => {},
        }
    } else if !p.syserror() {
        if let DevCreate | DevRename | DevSuspend | DevStatus | DevWait | TableLoad | TableClear
        | TableDeps | TableStatus | TargetMsg = cmd
        {
            tprintf!(
                p,
                ", target_count={}, open_count={}, event_nr={}",
                ioc.target_count,
                ioc.open_count,
                ioc.event_nr
            );
        }
    }
}

fn decode_target_spec(p: &mut Printer<'_>, addr: u64, ioc: &DmIoctl) {
    const TARGET_SPEC_SIZE: u32 = 40;

    if p.abbrev() {
        if ioc.target_count != 0 {
            p.tprints(", ...");
        }
        return;
    }

    let mut offset = ioc.data_start;

    for i in 0..ioc.target_count {
        let offset_end = match record_end(offset, TARGET_SPEC_SIZE, ioc.data_size) {
            Some(end) => end,
            None => return misplaced(p, ", /* misplaced struct dm_target_spec */ ..."),
        };

        p.tprints(", ");

        if i >= p.max_strlen() {
            p.tprints("...");
            return;
        }

        let spec = match fetch::<DmTargetSpec>(p, addr + u64::from(offset)) {
            Some(spec) => spec,
            None => return,
        };

        tprintf!(p, "{{sector_start={}, length={}", spec.sector_start, spec.length);
        if p.exiting() {
            tprintf!(p, ", status={}", spec.status);
        }

        p.tprints(", target_type=");
        p.print_quoted_string(&spec.target_type, DM_MAX_TYPE_NAME, QuoteStyle::ZERO_TERMINATED);

        p.tprints(", string=");
        p.printstr_ex(
            addr + u64::from(offset_end),
            Some(u64::from(ioc.data_size - offset_end)),
            QuoteStyle::ZERO_TERMINATED,
        );
        p.tprints("}");

        offset = if p.entering() {
            offset.wrapping_add(spec.next)
        } else {
            ioc.data_start.wrapping_add(spec.next)
        };

        if offset <= offset_end {
            return misplaced(p, ", /* misplaced struct dm_target_spec */ ...");
        }
    }
}

fn decode_target_deps(p: &mut Printer<'_>, addr: u64, ioc: &DmIoctl) {
    if p.abbrev() {
        p.tprints(", ...");
        return;
    }

    p.tprints(", ");

    let offset = ioc.data_start;
    let offset_end = match record_end(offset, TARGET_DEPS_DEV_OFFSET, ioc.data_size) {
        Some(end) => end,
        None => return misplaced(p, "/* misplaced struct dm_target_deps */ ..."),
    };

    let deps = match fetch::<DmTargetDeps>(p, addr + u64::from(offset)) {
        Some(deps) => deps,
        None => return,
    };

    let space = (ioc.data_size - offset_end) / 8;
    if deps.count > space {
        return misplaced(p, "/* misplaced struct dm_target_deps */ ...");
    }

    tprintf!(p, "{{count={}, deps=", deps.count);
    p.print_array(
        addr + u64::from(offset_end),
        u64::from(deps.count),
        8,
        Fetcher::OrPrintAddr,
        |p, elem| {
            let dev = Reader::new(elem, Personality::Native).u64();
            p.print_dev_t(dev);
            true
        },
    );
    p.tprints("}");
}

fn decode_name_list(p: &mut Printer<'_>, addr: u64, ioc: &DmIoctl) {
    if p.abbrev() {
        p.tprints(", ...");
        return;
    }

    let mut offset = ioc.data_start;

    for count in 0.. {
        let offset_end = match record_end(offset, NAME_LIST_NAME_OFFSET, ioc.data_size) {
            Some(end) => end,
            None => return misplaced(p, ", /* misplaced struct dm_name_list */ ..."),
        };

        p.tprints(", ");

        if count >= p.max_strlen() {
            p.tprints("...");
            return;
        }

        let entry = match fetch::<DmNameList>(p, addr + u64::from(offset)) {
            Some(entry) => entry,
            None => return,
        };

        if count == 0 && entry.dev == 0 {
            p.tprints("/* no devices present */");
            return;
        }

        p.tprints("{dev=");
        p.print_dev_t(entry.dev);
        p.tprints(", name=");
        p.printstr_ex(
            addr + u64::from(offset_end),
            Some(u64::from(ioc.data_size - offset_end)),
            QuoteStyle::ZERO_TERMINATED,
        );
        p.tprints("}");

        if entry.next == 0 {
            return;
        }

        offset = offset.wrapping_add(entry.next);
        if offset <= offset_end {
            return misplaced(p, ", /* misplaced struct dm_name_list */ ...");
        }
    }
}

fn decode_target_versions(p: &mut Printer<'_>, addr: u64, ioc: &DmIoctl) {
    if p.abbrev() {
        p.tprints(", ...");
        return;
    }

    let mut offset = ioc.data_start;

    for count in 0.. {
        let offset_end = match record_end(offset, TARGET_VERSIONS_NAME_OFFSET, ioc.data_size) {
            Some(end) => end,
            None => return misplaced(p, ", /* misplaced struct dm_target_versions */ ..."),
        };

        p.tprints(", ");

        if count >= p.max_strlen() {
            p.tprints("...");
            return;
        }

        let vers = match fetch::<DmTargetVersions>(p, addr + u64::from(offset)) {
            Some(vers) => vers,
            None => return,
        };

        p.tprints("{name=");
        p.printstr_ex(
            addr + u64::from(offset_end),
            Some(u64::from(ioc.data_size - offset_end)),
            QuoteStyle::ZERO_TERMINATED,
        );
        tprintf!(p, ", version={}.{}.{}}}", vers.version[0], vers.version[1], vers.version[2]);

        if vers.next == 0 {
            return;
        }

        offset = offset.wrapping_add(vers.next);
        if offset <= offset_end {
            return misplaced(p, ", /* misplaced struct dm_target_versions */ ...");
        }
    }
}

fn decode_target_msg(p: &mut Printer<'_>, addr: u64, ioc: &DmIoctl) {
    if p.abbrev() {
        p.tprints(", ...");
        return;
    }

    let offset = ioc.data_start;
    let offset_end = match record_end(offset, TARGET_MSG_MESSAGE_OFFSET, ioc.data_size) {
        Some(end) => end,
        None => return misplaced(p, ", /* misplaced struct dm_target_msg */"),
    };

    p.tprints(", ");

    let msg = match fetch::<DmTargetMsg>(p, addr + u64::from(offset)) {
        Some(msg) => msg,
        None => return,
    };

    tprintf!(p, "{{sector={}, message=", msg.sector);
    p.printstr_ex(
        addr + u64::from(offset_end),
        Some(u64::from(ioc.data_size - offset_end)),
        QuoteStyle::ZERO_TERMINATED,
    );
    p.tprints("}");
}

fn decode_string(p: &mut Printer<'_>, addr: u64, ioc: &DmIoctl) {
    if p.abbrev() {
        p.tprints(", ...");
        return;
    }

    let offset = ioc.data_start;
    if offset < ioc.data_size {
        p.tprints(", string=");
        p.printstr_ex(
            addr + u64::from(offset),
            Some(u64::from(ioc.data_size - offset)),
            QuoteStyle::ZERO_TERMINATED,
        );
    } else {
        p.tprints(", /* misplaced string */");
    }
}

fn misplaced(p: &mut Printer<'_>, marker: &str) {
    p.tprints(marker);
}

/// Returns `false` if the header could not be fetched or is too short to decode.
fn decode_known(p: &mut Printer<'_>, cmd: DmCmd, arg: u64) -> bool {
    use DmCmd::*;

    let ioc = match p.umove::<DmIoctl>(arg) {
        Some(ioc) if ioc.data_size >= DM_IOCTL_DATA_SIZE_OFFSET => ioc,
        _ => return false,
    };

    let mut changed = false;

    if p.entering() {
        p.tcp_mut().set_priv_data(PrivData::Dm(Box::new(ioc.clone())));
    } else {
        // The kernel only rewrites the other fields on success, when they are printed anyway.
        changed = match p.tcp_mut().take_priv_data() {
            Some(PrivData::Dm(entering_ioc)) => !entering_ioc.same_header(&ioc),
            _ => true,
        };
    }

    if p.exiting() && p.syserror() && !changed {
        return true;
    }

    let prefix = if p.entering() { ", " } else { " => " };
    tprintf!(p, "{}{{version={}.{}.{}", prefix, ioc.version[0], ioc.version[1], ioc.version[2]);

    if ioc.version[0] != DM_VERSION_MAJOR {
        p.tprints(", /* Unsupported device mapper ABI version */ ...}");
        return true;
    }

    tprintf!(p, ", data_size={}", ioc.data_size);

    if cmd.has_params() {
        tprintf!(p, ", data_start={}", ioc.data_start);
    }

    if ioc.data_size < DM_IOCTL_DATA_OFFSET {
        p.tprints(", /* Incorrect data_size */ ...}");
        return true;
    }

    decode_device(p, cmd, &ioc);
    decode_values(p, cmd, &ioc);

    p.tprints(", flags=");
    p.printflags(&DM_FLAGS, u64::from(ioc.flags), "DM_???");

    let exiting_ok = p.exiting() && !p.syserror();

    match cmd {
        DevWait | TableStatus if exiting_ok => decode_target_spec(p, arg, &ioc),
        TableLoad if p.entering() => decode_target_spec(p, arg, &ioc),
        TableDeps if exiting_ok => decode_target_deps(p, arg, &ioc),
        ListDevices if exiting_ok => decode_name_list(p, arg, &ioc),
        ListVersions if exiting_ok => decode_target_versions(p, arg, &ioc),
        TargetMsg if p.entering() => decode_target_msg(p, arg, &ioc),
        TargetMsg if exiting_ok && ioc.flags & DM_DATA_OUT_FLAG != 0 => decode_string(p, arg, &ioc),
        DevRename | DevSetGeometry if p.entering() => decode_string(p, arg, &ioc),
        _ => {},
    }

    p.tprints("}");
    true
}

pub fn decode(p: &mut Printer<'_>, code: u32, arg: u64) -> Rval {
    let cmd = match DmCmd::from_code(code) {
        Some(cmd) => cmd,
        None => return Rval::NotDecoded,
    };

    let decoded = decode_known(p, cmd, arg);

    if p.entering() {
        Rval::NeedsExit
    } else if decoded {
        Rval::Decoded
    } else {
        Rval::NotDecoded
    }
}
