//! Per-personality C structure layouts.
//!
//! A structure is described once, as the ordered sequence of its members, by implementing
//! [`Fetch::read`]. The same description yields the structure's size and alignment for every
//! [`Personality`] and decodes it out of a byte buffer fetched from the tracee.

use std::convert::TryInto;

use crate::personality::Personality;

/// A C structure which can be copied out of tracee memory.
pub trait Fetch: Sized {
    fn read(r: &mut Reader<'_>) -> Self;

    /// `sizeof` the structure, including tail padding.
    fn size(pers: Personality) -> usize {
        let mut r = Reader::measure(pers);
        Self::read(&mut r);
        r.size()
    }

    fn align(pers: Personality) -> usize {
        let mut r = Reader::measure(pers);
        Self::read(&mut r);
        r.align()
    }

    fn parse(bytes: &[u8], pers: Personality) -> Self {
        let mut r = Reader::new(bytes, pers);
        Self::read(&mut r)
    }
}

/// Cursor laying out members in declaration order and loading them from a byte image.
///
/// Members past the end of the image read as zero, which is how sizes are measured.
#[derive(Clone, Debug)]
pub struct Reader<'a> {
    bytes: &'a [u8],
    pers: Personality,
    base: usize,
    pos: usize,
    align: usize,
    packed: bool,
}

impl<'a> Reader<'a> {
    pub fn new(bytes: &'a [u8], pers: Personality) -> Self {
        Self { bytes, pers, base: 0, pos: 0, align: 1, packed: false }
    }

    pub fn measure(pers: Personality) -> Reader<'static> {
        Reader::new(&[], pers)
    }

    /// Lay out members as `__attribute__((packed))`.
    pub fn packed(mut self) -> Self {
        self.packed = true;
        self
    }

    pub fn set_packed(&mut self) {
        self.packed = true;
    }

    pub fn personality(&self) -> Personality {
        self.pers
    }

    /// Offset of the next unaligned member.
    pub fn offset(&self) -> usize {
        self.pos
    }

    pub fn align(&self) -> usize {
        self.align
    }

    pub fn size(&self) -> usize {
        if self.packed {
            self.pos
        } else {
            round_up(self.pos, self.align)
        }
    }

    /// Reserve a member, returning its offset.
    pub fn field(&mut self, size: usize, align: usize) -> usize {
        if !self.packed {
            self.pos = round_up(self.pos, align);
            self.align = self.align.max(align);
        }
        let off = self.pos;
        self.pos += size;
        off
    }

    fn load<const N: usize>(&self, off: usize) -> [u8; N] {
        let start = self.base + off;
        match self.bytes.get(start..start + N) {
            Some(b) => b.try_into().unwrap_or([0; N]),
            None => [0; N],
        }
    }

    fn load_word(&self, off: usize, size: usize) -> u64 {
        match size {
            8 => u64::from_ne_bytes(self.load(off)),
            _ => u64::from(u32::from_ne_bytes(self.load(off))),
        }
    }

    pub fn u8(&mut self) -> u8 {
        let off = self.field(1, 1);
        self.load::<1>(off)[0]
    }

    pub fn u16(&mut self) -> u16 {
        let off = self.field(2, 2);
        u16::from_ne_bytes(self.load(off))
    }

    pub fn u32(&mut self) -> u32 {
        let off = self.field(4, 4);
        u32::from_ne_bytes(self.load(off))
    }

    pub fn i32(&mut self) -> i32 {
        self.u32() as i32
    }

    pub fn u64(&mut self) -> u64 {
        let off = self.field(8, self.pers.u64_align());
        u64::from_ne_bytes(self.load(off))
    }

    pub fn i64(&mut self) -> i64 {
        self.u64() as i64
    }

    /// `unsigned long`, `size_t` and pointers.
    pub fn ulong(&mut self) -> u64 {
        let size = self.pers.word_size();
        let off = self.field(size, size);
        self.load_word(off, size)
    }

    pub fn long(&mut self) -> i64 {
        let v = self.ulong();
        self.pers.widen_to_long(v)
    }

    pub fn ptr(&mut self) -> u64 {
        self.ulong()
    }

    /// `__kernel_long_t`, as used by `time_t` and friends.
    pub fn klong(&mut self) -> i64 {
        let size = self.pers.kernel_long_size();
        let off = self.field(size, size.min(self.pers.u64_align()));
        let v = self.load_word(off, size);
        match size {
            8 => v as i64,
            _ => i64::from(v as u32 as i32),
        }
    }

    pub fn kulong(&mut self) -> u64 {
        let size = self.pers.kernel_long_size();
        let off = self.field(size, size.min(self.pers.u64_align()));
        self.load_word(off, size)
    }

    /// A `char` or `__u8` array.
    pub fn bytes<const N: usize>(&mut self) -> [u8; N] {
        let off = self.field(N, 1);
        self.load(off)
    }

    pub fn u32s<const N: usize>(&mut self) -> [u32; N] {
        let mut out = [0; N];
        for v in out.iter_mut() {
            *v = self.u32();
        }
        out
    }

    /// Skip reserved or padding members.
    pub fn skip(&mut self, size: usize, align: usize) {
        self.field(size, align);
    }

    /// A nested structure.
    pub fn record<T: Fetch>(&mut self) -> T {
        let size = T::size(self.pers);
        let align = T::align(self.pers);
        let off = self.field(size, align);
        let mut sub = self.sub(off);
        T::read(&mut sub)
    }

    /// A union of the given size and alignment. The returned reader starts at the union's
    /// offset, the caller picks the member to read from it.
    pub fn union(&mut self, size: usize, align: usize) -> Reader<'a> {
        let off = self.field(size, align);
        self.sub(off)
    }

    fn sub(&self, off: usize) -> Reader<'a> {
        Reader {
            bytes: self.bytes,
            pers: self.pers,
            base: self.base + off,
            pos: 0,
            align: 1,
            packed: false,
        }
    }
}

fn round_up(v: usize, align: usize) -> usize {
    match align {
        0 | 1 => v,
        _ => (v + align - 1) / align * align,
    }
}
