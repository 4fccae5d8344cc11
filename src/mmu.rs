//! # Page Protection
//!
//! When MMUe is set, every protected access looks up a one-byte entry for the
//! page it touches. The entry for global page `i` lives at `(MMUp + i, MMUb)`.
//!
//! ```text
//! bit 0  exec
//! bit 1  write
//! bit 2  read
//! 3..7   reserved
//! ```

/// Kind of protected access, each gated by its own permission bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    /// Instruction fetch (exec bit).
    Execute,
    /// Data store (write bit).
    Write,
    /// Data load (read bit).
    Read,
}

impl std::fmt::Display for Access {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            Access::Execute => "execute",
            Access::Write => "write",
            Access::Read => "read",
        };
        f.write_str(name)
    }
}

/// One page-table entry byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PageEntry(pub u8);

impl PageEntry {
    pub const EXEC: u8 = 0b001;
    pub const WRITE: u8 = 0b010;
    pub const READ: u8 = 0b100;

    /// Entry granting all three permissions.
    pub const ALL: PageEntry = PageEntry(Self::EXEC | Self::WRITE | Self::READ);

    /// Builds an entry from individual permissions.
    ///
    /// # Examples
    ///
    /// ```
    /// use bank16::mmu::{Access, PageEntry};
    ///
    /// let entry = PageEntry::new(true, false, true);
    /// assert_eq!(entry.0, 0b101);
    /// assert!(entry.allows(Access::Execute));
    /// assert!(!entry.allows(Access::Write));
    /// ```
    pub fn new(exec: bool, write: bool, read: bool) -> Self {
        let mut byte = 0;
        if exec {
            byte |= Self::EXEC;
        }
        if write {
            byte |= Self::WRITE;
        }
        if read {
            byte |= Self::READ;
        }
        PageEntry(byte)
    }

    pub fn exec(self) -> bool {
        self.0 & Self::EXEC != 0
    }

    pub fn write(self) -> bool {
        self.0 & Self::WRITE != 0
    }

    pub fn read(self) -> bool {
        self.0 & Self::READ != 0
    }

    /// True when the entry carries the permission bit for `access`.
    pub fn allows(self, access: Access) -> bool {
        match access {
            Access::Execute => self.exec(),
            Access::Write => self.write(),
            Access::Read => self.read(),
        }
    }
}
