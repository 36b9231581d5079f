use crate::error::{Error, Result};

/// Raw `st_mode` bits of a staged file
///
/// The value is kept exactly as captured from the filesystem; trees print it
/// in octal (`100644`, `100755`, ...).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryMode(u32);

impl EntryMode {
    pub const REGULAR: EntryMode = EntryMode(0o100644);
    pub const EXECUTABLE: EntryMode = EntryMode(0o100755);

    pub fn new(bits: u32) -> Self {
        EntryMode(bits)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }

    pub fn from_octal_str(value: &str) -> Result<Self> {
        if value.is_empty() || !value.bytes().all(|b| (b'0'..=b'7').contains(&b)) {
            return Err(Error::Corrupt(format!("invalid octal mode {value:?}")));
        }

        u32::from_str_radix(value, 8)
            .map(EntryMode)
            .map_err(|_| Error::Corrupt(format!("invalid octal mode {value:?}")))
    }
}

impl From<u32> for EntryMode {
    fn from(bits: u32) -> Self {
        EntryMode(bits)
    }
}

impl From<EntryMode> for u32 {
    fn from(mode: EntryMode) -> Self {
        mode.0
    }
}

impl std::fmt::Display for EntryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:o}", self.0)
    }
}
