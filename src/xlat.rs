//! Value to name translation tables.

/// One `(value, name)` pair of a translation table.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct XlatEntry {
    pub val: u64,
    pub name: &'static str,
}

/// How a table is searched.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum XlatKind {
    /// Scanned front to back; the first match wins.
    Linear,

    /// Sorted by value and free of duplicates; binary searched.
    Sorted,
}

#[derive(Clone, Copy, Debug)]
pub struct Xlat {
    entries: &'static [XlatEntry],
    kind: XlatKind,
}

impl Xlat {
    pub const fn new(entries: &'static [XlatEntry]) -> Self {
        Self { entries, kind: XlatKind::Linear }
    }

    pub const fn sorted(entries: &'static [XlatEntry]) -> Self {
        Self { entries, kind: XlatKind::Sorted }
    }

    pub fn entries(&self) -> &'static [XlatEntry] {
        self.entries
    }

    pub fn kind(&self) -> XlatKind {
        self.kind
    }

    pub fn lookup(&self, val: u64) -> Option<&'static str> {
        match self.kind {
            XlatKind::Linear => self.entries.iter().find(|e| e.val == val).map(|e| e.name),
            XlatKind::Sorted => self
                .entries
                .binary_search_by(|e| e.val.cmp(&val))
                .ok()
                .map(|i| self.entries[i].name),
        }
    }

    /// True if a sorted table really is strictly increasing.
    pub fn is_well_formed(&self) -> bool {
        match self.kind {
            XlatKind::Linear => true,
            XlatKind::Sorted => self.entries.windows(2).all(|w| w[0].val < w[1].val),
        }
    }
}

/// First name found for `val` in an ordered list of tables.
pub fn lookup_in(tables: &[&Xlat], val: u64) -> Option<&'static str> {
    tables.iter().find_map(|x| x.lookup(val))
}

/// Render `flags` as `prefix` followed by `NAME|NAME|0x..`, or `None` if `flags` is zero.
pub fn sprintflags(prefix: &str, xlat: &Xlat, flags: u64) -> Option<String> {
    if flags == 0 {
        return None;
    }

    let mut out = String::from(prefix);
    let mut rest = flags;
    let mut found = false;

    for e in xlat.entries() {
        if e.val != 0 && rest & e.val == e.val {
            if found {
                out.push('|');
            }
            out.push_str(e.name);
            found = true;
            rest &= !e.val;
            if rest == 0 {
                break;
            }
        }
    }

    if rest != 0 {
        if found {
            out.push('|');
        }
        out.push_str(&format!("{:#x}", rest));
    }

    Some(out)
}

/// Build a translation table from constants in scope, naming each entry after its constant.
macro_rules! xlat {
    ($vis: vis sorted $table: ident = [$($name: ident),* $(,)?]) => {
        $vis static $table: $crate::xlat::Xlat = $crate::xlat::Xlat::sorted(&[
            $($crate::xlat::XlatEntry { val: $name as u64, name: stringify!($name) }),*
        ]);
    };
    ($vis: vis $table: ident = [$($name: ident),* $(,)?]) => {
        $vis static $table: $crate::xlat::Xlat = $crate::xlat::Xlat::new(&[
            $($crate::xlat::XlatEntry { val: $name as u64, name: stringify!($name) }),*
        ]);
    };
}
