#[macro_use]
mod support;

use anyhow::Result;
use ntest::timeout;
use pretty_assertions::assert_eq;
use sysdecode::netlink::decode_netlink;
use sysdecode::{Errno, IovDecode, Personality, Qualifiers};

use support::{Buf, Session};

/// Place `bufs` in the tracee and return the address of an iovec array pointing at them.
fn iovecs(s: &Session, bufs: &[&[u8]]) -> u64 {
    let iov = bufs.iter().fold(Buf::new(), |iov, buf| {
        let base = s.mem.tail_alloc(buf);
        iov.word(s.pers, base).word(s.pers, buf.len() as u64)
    });
    s.mem.tail_alloc(&iov.0)
}

fn nlmsg(len: u32, ty: u16, flags: u16, seq: u32, payload: &[u8]) -> Buf {
    Buf::new().u32(len).u16(ty).u16(flags).u32(seq).u32(0).bytes(payload)
}

#[test]
#[timeout(1000)]
fn test_writev() -> Result<()> {
    let s = Session::new();
    let iov = iovecs(&s, &[b"abc", b"de"]);

    let out = s.syscall("writev", args![1, iov, 2]).run(5);
    assert_eq!(out, "1, [{iov_base=\"abc\", iov_len=3}, {iov_base=\"de\", iov_len=2}], 2");

    Ok(())
}

#[test]
#[timeout(1000)]
fn test_writev_compat() -> Result<()> {
    let s = Session::with_personality(Personality::Compat32);
    let iov = iovecs(&s, &[b"xyz"]);

    let out = s.syscall("writev", args![1, iov | 0xffff_ffff_0000_0000, 1]).run(3);
    assert_eq!(out, "1, [{iov_base=\"xyz\", iov_len=3}], 1");

    Ok(())
}

#[test]
#[timeout(1000)]
fn test_readv_bounded_by_result() -> Result<()> {
    let s = Session::new();
    let iov = iovecs(&s, &[b"abc", b"de"]);

    let mut call = s.syscall("readv", args![0, iov, 2]);
    call.enter();
    assert_eq!(call.output(), "0, ");
    call.exit(4);
    assert_eq!(call.output(), "0, [{iov_base=\"abc\", iov_len=3}, {iov_base=\"d\", iov_len=2}], 2");

    Ok(())
}

#[test]
#[timeout(1000)]
fn test_readv_failed() -> Result<()> {
    let s = Session::new();
    let base = s.mem.tail_alloc(b"abc");
    let iov = s.mem.tail_alloc(&Buf::new().u64(base).u64(3).0);

    let out = s.syscall("readv", args![0, iov, 1]).run_err(Errno::EAGAIN);
    assert_eq!(out, format!("0, [{{iov_base={:#x}, iov_len=3}}], 1", base));

    Ok(())
}

#[test]
#[timeout(1000)]
fn test_iov_unreadable_array() -> Result<()> {
    let s = Session::new();
    let unmapped = s.mem.unmapped();

    let out = s.syscall("writev", args![1, unmapped, 2]).run(0);
    assert_eq!(out, format!("1, {:#x}, 2", unmapped));

    let out = s.syscall("writev", args![1, 0, 0]).run(0);
    assert_eq!(out, "1, NULL, 0");

    Ok(())
}

#[test]
#[timeout(1000)]
fn test_iov_addresses_only() -> Result<()> {
    let s = Session::new();
    let iov = s.mem.tail_alloc(&Buf::new().u64(0).u64(0).u64(0x1000).u64(8).0);

    let out = s.print(|p| p.tprint_iov(2, iov, IovDecode::Addr));
    assert_eq!(out, "[{iov_base=NULL, iov_len=0}, {iov_base=0x1000, iov_len=8}]");

    Ok(())
}

#[test]
#[timeout(1000)]
fn test_dumpiov() -> Result<()> {
    let s = Session::new();
    let iov = iovecs(&s, &[b"abc", b"de"]);

    let expected = format!(
        " * 3 bytes in buffer 0\n | 00000  61 62 63 {}abc{} |\n \
         * 1 bytes in buffer 1\n | 00000  64 {}d{} |\n",
        " ".repeat(41),
        " ".repeat(13),
        " ".repeat(47),
        " ".repeat(15),
    );
    assert_eq!(s.print(|p| p.dumpiov_upto(2, iov, 4)), expected);

    Ok(())
}

#[test]
#[timeout(1000)]
fn test_netlink_single_message() -> Result<()> {
    let s = Session::new();
    let addr = s.mem.tail_alloc(&nlmsg(20, 3, 0x5, 1, b"abcd").0);

    let out = s.print(|p| decode_netlink(p, addr, 20));
    assert_eq!(out, "{{len=20, type=NLMSG_DONE, flags=NLM_F_REQUEST|NLM_F_ACK, seq=1, pid=0}, \"abcd\"}");

    Ok(())
}

#[test]
#[timeout(1000)]
fn test_netlink_message_chain() -> Result<()> {
    let s = Session::new();
    let msgs = nlmsg(16, 1, 0, 1, b"").bytes(&nlmsg(16, 0x10, 0x40, 2, b"").0);
    let addr = s.mem.tail_alloc(&msgs.0);

    let out = s.print(|p| decode_netlink(p, addr, 32));
    assert_eq!(
        out,
        "[{{len=16, type=NLMSG_NOOP, flags=0, seq=1, pid=0}}, \
         {{len=16, type=0x10 /* NLMSG_??? */, flags=0x40 /* NLM_F_??? */, seq=2, pid=0}}]"
    );

    Ok(())
}

#[test]
#[timeout(1000)]
fn test_netlink_abbreviated_chain() -> Result<()> {
    let mut s = Session::new();
    s.tracer.config_mut().set_max_strlen(2);
    let msgs = (0..3).fold(Buf::new(), |b, seq| b.bytes(&nlmsg(16, 1, 0, seq, b"").0));
    let addr = s.mem.tail_alloc(&msgs.0);

    let out = s.print(|p| decode_netlink(p, addr, 48));
    assert_eq!(
        out,
        "[{{len=16, type=NLMSG_NOOP, flags=0, seq=0, pid=0}}, \
         {{len=16, type=NLMSG_NOOP, flags=0, seq=1, pid=0}}, ...]"
    );

    Ok(())
}

#[test]
#[timeout(1000)]
fn test_netlink_length_wrapping_to_zero_ends_chain() -> Result<()> {
    let s = Session::new();
    let msgs = nlmsg(0xffff_fffd, 3, 0, 7, b"").bytes(&nlmsg(16, 3, 0, 8, b"").0);
    let addr = s.mem.tail_alloc(&msgs.0);

    let mut tcb = s.tcb();
    tcb.set_qualifiers(Qualifiers::VERBOSE);
    let out = s.print_with(&mut tcb, |p| decode_netlink(p, addr, 32));
    assert_eq!(out.matches("seq=7").count(), 1);
    assert!(!out.contains("seq=8"));
    assert!(out.starts_with("{{len=4294967293, type=NLMSG_DONE, flags=0, seq=7, pid=0}, "));

    Ok(())
}

#[test]
#[timeout(1000)]
fn test_netlink_short_buffer() -> Result<()> {
    let s = Session::new();
    let addr = s.mem.tail_alloc(b"short!!!");

    assert_eq!(s.print(|p| decode_netlink(p, addr, 8)), "\"short!!!\"");

    Ok(())
}

#[test]
#[timeout(1000)]
fn test_netlink_payload_bounded_by_buffer() -> Result<()> {
    let s = Session::new();
    let addr = s.mem.tail_alloc(&nlmsg(100, 2, 0, 0, b"ab").0);

    let out = s.print(|p| decode_netlink(p, addr, 18));
    assert_eq!(out, "{{len=100, type=NLMSG_ERROR, flags=0, seq=0, pid=0}, \"ab\"}");

    Ok(())
}

#[test]
#[timeout(1000)]
fn test_netlink_through_iovec() -> Result<()> {
    let s = Session::new();
    let msg = nlmsg(16, 3, 0, 9, b"");
    let iov = iovecs(&s, &[&msg.0]);

    let out = s.print(|p| p.tprint_iov(1, iov, IovDecode::Netlink));
    assert_eq!(out, "[{iov_base={{len=16, type=NLMSG_DONE, flags=0, seq=9, pid=0}}, iov_len=16}]");

    Ok(())
}
