//! ABI variants a traced call may be made under.

/// Word-width and calling-convention variant active for one traced call.
///
/// A single tracee tree may mix personalities, e.g. a 64-bit parent executing an `i386`
/// child, so every call carries its own.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Personality {
    /// The tracer's own 64-bit ABI.
    Native,

    /// 32-bit compat ABI (`i386` on `x86_64`).
    Compat32,

    /// ILP32 ABI with 64-bit registers (`x32`).
    X32,
}

impl Default for Personality {
    fn default() -> Self {
        Personality::Native
    }
}

impl Personality {
    pub const ALL: [Personality; 3] = [Personality::Native, Personality::Compat32, Personality::X32];

    /// Size in bytes of a tracee pointer, `long` and `size_t`.
    pub fn word_size(self) -> usize {
        match self {
            Personality::Native => 8,
            Personality::Compat32 | Personality::X32 => 4,
        }
    }

    /// Size in bytes of the kernel's `__kernel_long_t`.
    pub fn kernel_long_size(self) -> usize {
        match self {
            Personality::Native | Personality::X32 => 8,
            Personality::Compat32 => 4,
        }
    }

    /// Alignment of 64-bit integer members inside structures.
    pub fn u64_align(self) -> usize {
        match self {
            Personality::Native | Personality::X32 => 8,
            Personality::Compat32 => 4,
        }
    }

    /// Largest representable tracee address.
    pub fn max_addr(self) -> u64 {
        match self.word_size() {
            8 => u64::MAX,
            _ => u64::from(u32::MAX),
        }
    }

    /// Truncate a raw register value to the width of a tracee address.
    pub fn truncate_addr(self, addr: u64) -> u64 {
        addr & self.max_addr()
    }

    /// Reinterpret a raw argument word as a tracee `unsigned long`.
    pub fn widen_to_ulong(self, word: u64) -> u64 {
        self.truncate_addr(word)
    }

    /// Reinterpret a raw argument word as a `kernel_ulong_t`, which stays 64 bits wide on x32.
    pub fn widen_to_kulong(self, word: u64) -> u64 {
        match self.kernel_long_size() {
            8 => word,
            _ => u64::from(word as u32),
        }
    }

    /// Reinterpret a raw argument word as a tracee `long`.
    pub fn widen_to_long(self, word: u64) -> i64 {
        match self.word_size() {
            8 => word as i64,
            _ => i64::from(word as u32 as i32),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Personality::Native => "64 bit",
            Personality::Compat32 => "32 bit",
            Personality::X32 => "x32",
        }
    }
}
