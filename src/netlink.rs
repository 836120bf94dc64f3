//! Netlink message framing (`linux/netlink.h`).

use crate::layout::{Fetch, Reader};
use crate::printer::Printer;

/// `sizeof(struct nlmsghdr)`
pub const NLMSG_HDRLEN: u64 = 16;

const NLMSG_ALIGNTO: u32 = 4;

const NLMSG_NOOP: u32 = 1;
const NLMSG_ERROR: u32 = 2;
const NLMSG_DONE: u32 = 3;
const NLMSG_OVERRUN: u32 = 4;

xlat! { sorted NETLINK_TYPES = [NLMSG_NOOP, NLMSG_ERROR, NLMSG_DONE, NLMSG_OVERRUN] }

const NLM_F_REQUEST: u32 = 0x1;
const NLM_F_MULTI: u32 = 0x2;
const NLM_F_ACK: u32 = 0x4;
const NLM_F_ECHO: u32 = 0x8;
const NLM_F_DUMP_INTR: u32 = 0x10;
const NLM_F_DUMP_FILTERED: u32 = 0x20;

xlat! {
    NETLINK_FLAGS = [
        NLM_F_REQUEST,
        NLM_F_MULTI,
        NLM_F_ACK,
        NLM_F_ECHO,
        NLM_F_DUMP_INTR,
        NLM_F_DUMP_FILTERED,
    ]
}

/// Round a message length up to the netlink alignment, in `__u32` arithmetic.
pub fn nlmsg_align(len: u32) -> u32 {
    len.wrapping_add(NLMSG_ALIGNTO - 1) & !(NLMSG_ALIGNTO - 1)
}

/// `struct nlmsghdr`
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NlMsgHdr {
    pub len: u32,
    pub ty: u16,
    pub flags: u16,
    pub seq: u32,
    pub pid: u32,
}

impl Fetch for NlMsgHdr {
    fn read(r: &mut Reader<'_>) -> Self {
        Self {
            len: r.u32(),
            ty: r.u16(),
            flags: r.u16(),
            seq: r.u32(),
            pid: r.u32(),
        }
    }
}

/// A buffer too short for a header is printed as an opaque string.
fn fetch_nlmsghdr(p: &mut Printer<'_>, addr: u64, len: u64) -> Option<NlMsgHdr> {
    if len < NLMSG_HDRLEN {
        p.printstr(addr, len);
        return None;
    }

    p.umove_or_printaddr::<NlMsgHdr>(addr)
}

fn print_nlmsghdr(p: &mut Printer<'_>, hdr: &NlMsgHdr) {
    tprintf!(p, "{{len={}, type=", hdr.len);
    p.printxval(&NETLINK_TYPES, u64::from(hdr.ty), "NLMSG_???");
    p.tprints(", flags=");
    p.printflags(&NETLINK_FLAGS, u64::from(hdr.flags), "NLM_F_???");
    tprintf!(p, ", seq={}, pid={}}}", hdr.seq, hdr.pid);
}

fn decode_nlmsghdr_with_payload(p: &mut Printer<'_>, hdr: &NlMsgHdr, addr: u64, len: u64) {
    p.tprints("{");
    print_nlmsghdr(p, hdr);

    // The header is printed whole; the payload is bounded by the buffer.
    let msg_len = u64::from(hdr.len).min(len);
    if msg_len > NLMSG_HDRLEN {
        p.tprints(", ");
        p.printstr(addr + NLMSG_HDRLEN, msg_len - NLMSG_HDRLEN);
    }

    p.tprints("}");
}

/// Print the chain of netlink messages in the `len` bytes at `addr`.
///
/// More than one message is printed as an array, capped at `max_strlen` messages in
/// abbreviated mode.
pub fn decode_netlink(p: &mut Printer<'_>, mut addr: u64, mut len: u64) {
    let mut in_array = false;
    let mut elt = 0;

    while let Some(hdr) = fetch_nlmsghdr(p, addr, len) {
        if p.abbrev() && elt == p.max_strlen() {
            p.tprints("...");
            break;
        }

        let msg_len = u64::from(nlmsg_align(hdr.len));
        let mut next_addr = 0;
        let mut next_len = 0;

        if u64::from(hdr.len) >= NLMSG_HDRLEN {
            next_len = len.saturating_sub(msg_len);
            if next_len != 0 {
                let max_addr = p.personality().max_addr();
                if let Some(next) = addr.checked_add(msg_len).filter(|&n| n > addr && n <= max_addr) {
                    next_addr = next;
                }
            }
        }

        if !in_array && next_addr != 0 {
            p.tprints("[");
            in_array = true;
        }

        decode_nlmsghdr_with_payload(p, &hdr, addr, len);

        if next_addr == 0 {
            break;
        }

        p.tprints(", ");
        addr = next_addr;
        len = next_len;
        elt += 1;
    }

    if in_array {
        p.tprints("]");
    }
}
