//! Session-wide decoding options.

/// Default cap on string bytes and array elements shown.
pub const DEFAULT_MAX_STRLEN: u32 = 32;

/// When quoted strings are rendered with `\xHH` escapes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Xflag {
    /// Escape only what cannot be shown as printable ASCII.
    None,

    /// Escape every byte of a string if any byte is non-printable.
    NonPrintable,

    /// Escape every byte of every string.
    All,
}

impl Default for Xflag {
    fn default() -> Self {
        Xflag::None
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    max_strlen: u32,
    xflag: Xflag,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            max_strlen: DEFAULT_MAX_STRLEN,
            xflag: Xflag::default(),
        }
    }

    pub fn max_strlen(&self) -> u32 {
        self.max_strlen
    }

    pub fn set_max_strlen(&mut self, max_strlen: u32) {
        self.max_strlen = max_strlen;
    }

    pub fn xflag(&self) -> Xflag {
        self.xflag
    }

    pub fn set_xflag(&mut self, xflag: Xflag) {
        self.xflag = xflag;
    }
}
