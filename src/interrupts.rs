//! # Interrupt Table and Exception Codes
//!
//! The interrupt table is an array of 3-byte entries at `(INTp, INTb)`, one per
//! interrupt kind. Entry `k` starts at `INTp + 3 * k`.
//!
//! ```text
//! bits  0..15  target offset (first byte is the low byte)
//! bits 16..19  target bank
//! bit  20      clear INTl on entry
//! bit  21      clear MMUe on entry
//! bits 22..23  reserved
//! ```
//!
//! An entry whose target is `0:0000` means "no handler installed". Dispatch
//! logic lives on [`crate::CPU::trigger_interrupt`].

use crate::memory::Address;

/// Interrupt kind used for CPU exceptions (page faults, missing handlers).
pub const INTR_EXCEPT: u8 = 0;

/// Size of one interrupt-table entry in bytes.
pub const ENTRY_SIZE: u16 = 3;

/// Value of the EXC register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Exception {
    /// No exception recorded.
    None,
    /// An interrupt fired with no usable handler; raised on reset paths too.
    NoInterruptHandler,
    /// A protected access lacked its page permission.
    PageAccessViolation,
    /// Any other value written to EXC by software.
    Other(u32),
}

impl Exception {
    pub const NONE: u32 = 0;
    pub const NOINTH: u32 = 1;
    pub const PAGEAV: u32 = 2;

    /// Interprets an EXC register value.
    pub fn from_code(code: u32) -> Self {
        match code {
            Self::NONE => Exception::None,
            Self::NOINTH => Exception::NoInterruptHandler,
            Self::PAGEAV => Exception::PageAccessViolation,
            other => Exception::Other(other),
        }
    }

    /// Returns the EXC register value.
    pub fn code(self) -> u32 {
        match self {
            Exception::None => Self::NONE,
            Exception::NoInterruptHandler => Self::NOINTH,
            Exception::PageAccessViolation => Self::PAGEAV,
            Exception::Other(code) => code,
        }
    }
}

/// Decoded interrupt-table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct InterruptEntry {
    /// Handler address.
    pub target: Address,
    /// Clear INTl when entering the handler.
    pub clear_int: bool,
    /// Clear MMUe when entering the handler.
    pub clear_mmu: bool,
}

impl InterruptEntry {
    const CLEAR_INT: u8 = 0b0001_0000;
    const CLEAR_MMU: u8 = 0b0010_0000;

    /// Decodes the three entry bytes `[lo, mid, hi]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use bank16::{Address, InterruptEntry};
    ///
    /// let entry = InterruptEntry::decode([0x00, 0x18, 0x32]);
    /// assert_eq!(entry.target, Address::new(2, 0x1800));
    /// assert!(entry.clear_int);
    /// assert!(entry.clear_mmu);
    /// ```
    pub fn decode(bytes: [u8; 3]) -> Self {
        let [lo, mid, hi] = bytes;
        Self {
            target: Address::new(hi & 0x0F, u16::from_le_bytes([lo, mid])),
            clear_int: hi & Self::CLEAR_INT != 0,
            clear_mmu: hi & Self::CLEAR_MMU != 0,
        }
    }

    /// Encodes the entry into its three table bytes.
    pub fn encode(self) -> [u8; 3] {
        let [lo, mid] = self.target.offset.to_le_bytes();
        let mut hi = self.target.bank & 0x0F;
        if self.clear_int {
            hi |= Self::CLEAR_INT;
        }
        if self.clear_mmu {
            hi |= Self::CLEAR_MMU;
        }
        [lo, mid, hi]
    }

    /// True when the entry marks an uninstalled handler (target `0:0000`).
    pub fn is_sentinel(self) -> bool {
        self.target == Address::new(0, 0)
    }
}

/// Offset of the entry for `kind` relative to INTp.
pub fn entry_offset(kind: u8) -> u16 {
    ENTRY_SIZE.wrapping_mul(kind as u16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_matches_decode() {
        let entry = InterruptEntry {
            target: Address::new(0xA, 0xBEEF),
            clear_int: true,
            clear_mmu: false,
        };
        assert_eq!(entry.encode(), [0xEF, 0xBE, 0x1A]);
        assert_eq!(InterruptEntry::decode(entry.encode()), entry);
    }

    #[test]
    fn test_reserved_bits_ignored() {
        let entry = InterruptEntry::decode([0x34, 0x12, 0b1100_0001]);
        assert_eq!(entry.target, Address::new(1, 0x1234));
        assert!(!entry.clear_int);
        assert!(!entry.clear_mmu);
    }

    #[test]
    fn test_sentinel_ignores_flags() {
        assert!(InterruptEntry::decode([0, 0, 0b0011_0000]).is_sentinel());
        assert!(!InterruptEntry::decode([1, 0, 0]).is_sentinel());
        assert!(!InterruptEntry::decode([0, 0, 1]).is_sentinel());
    }

    #[test]
    fn test_exception_codes() {
        assert_eq!(Exception::from_code(1), Exception::NoInterruptHandler);
        assert_eq!(Exception::from_code(2), Exception::PageAccessViolation);
        assert_eq!(Exception::from_code(9).code(), 9);
        assert_eq!(entry_offset(5), 15);
    }
}
