//! C-style quoting of byte strings.

use crate::config::Xflag;

bitflags::bitflags! {
    pub struct QuoteStyle: u32 {
        /// Stop at the first NUL byte.
        const ZERO_TERMINATED = 0x01;

        /// Do not surround the output with double quotes.
        const OMIT_QUOTES = 0x02;

        /// Do not show a NUL in the last position.
        const OMIT_TRAILING_0 = 0x08;
    }
}

const HEX: &[u8; 16] = b"0123456789abcdef";

/// Quote the first `size` bytes of `input`.
///
/// With [`QuoteStyle::ZERO_TERMINATED`], quoting stops at a NUL, and `input[size]`, if
/// present, is looked at to tell a string that exactly fits from a truncated one.
///
/// Returns the quoted text and whether the whole NUL-terminated string was shown. Without
/// `ZERO_TERMINATED` the flag is always `false`.
pub fn string_quote(input: &[u8], size: usize, style: QuoteStyle, xflag: Xflag) -> (String, bool) {
    let mut out = String::with_capacity(size.min(input.len()) * 4 + 2);
    let complete = quote_into(&mut out, input, size, style, xflag);
    (out, complete)
}

/// [`string_quote`] appending to `out`.
pub fn quote_into(out: &mut String, input: &[u8], size: usize, style: QuoteStyle, xflag: Xflag) -> bool {
    let zero_terminated = style.contains(QuoteStyle::ZERO_TERMINATED);
    let quotes = !style.contains(QuoteStyle::OMIT_QUOTES);
    let size = size.min(input.len());
    let bytes = &input[..size];

    let is_eol = |c: u8| zero_terminated && c == 0;

    let use_hex = match xflag {
        Xflag::All => true,
        Xflag::NonPrintable => bytes
            .iter()
            .take_while(|&&c| !is_eol(c))
            .any(|&c| c > 0x7e || (c < b' ' && !(9..=13).contains(&c))),
        Xflag::None => false,
    };

    if quotes {
        out.push('"');
    }

    let mut ended = false;

    for (i, &c) in bytes.iter().enumerate() {
        if is_eol(c) {
            ended = true;
            break;
        }

        if use_hex {
            out.push_str("\\x");
            out.push(HEX[usize::from(c >> 4)] as char);
            out.push(HEX[usize::from(c & 0xf)] as char);
            continue;
        }

        if i == size - 1 && style.contains(QuoteStyle::OMIT_TRAILING_0) && c == 0 {
            ended = true;
            break;
        }

        match c {
            b'"' | b'\\' => {
                out.push('\\');
                out.push(c as char);
            },
            0x0c => out.push_str("\\f"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            0x0b => out.push_str("\\v"),
            b' '..=0x7e => out.push(c as char),
            _ => {
                out.push('\\');
                let next_is_digit = bytes.get(i + 1).map_or(false, u8::is_ascii_digit);
                if next_is_digit {
                    out.push(octal_digit(c >> 6));
                    out.push(octal_digit(c >> 3));
                } else if c >> 3 != 0 {
                    if c >> 6 != 0 {
                        out.push(octal_digit(c >> 6));
                    }
                    out.push(octal_digit(c >> 3));
                }
                out.push(octal_digit(c));
            },
        }
    }

    if quotes {
        out.push('"');
    }

    if !ended && zero_terminated && input.get(size) == Some(&0) {
        ended = true;
    }

    ended
}

fn octal_digit(v: u8) -> char {
    (b'0' + (v & 0x7)) as char
}
