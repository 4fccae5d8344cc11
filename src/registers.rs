//! # Register File
//!
//! The CPU keeps one slot per encodable register byte (256 slots). Only 22 of
//! them carry names; the rest are ordinary storage that instructions may read
//! and write without faulting.
//!
//! Slots are 20 bits wide so that a full linear address (`bank << 16 | offset`)
//! fits, even though most instructions only produce 8- or 16-bit values.

/// Number of addressable register slots (one per possible register byte).
pub const REGISTER_SLOTS: usize = 256;

/// Register slots hold at most 20 significant bits.
pub const REGISTER_MASK: u32 = 0x000F_FFFF;

/// Named register slots and their encodings.
///
/// The discriminant is the byte an instruction uses to select the register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Register {
    /// Program counter (offset within `Pcb`).
    Pc = 0x00,
    /// Stack pointer.
    Sp = 0x01,
    /// Base pointer (not used by any implemented opcode).
    Bp = 0x02,
    /// Exception code, see [`crate::Exception`].
    Exc = 0x03,
    /// Page-table bank.
    MmuB = 0x04,
    /// Page-table pointer.
    MmuP = 0x05,
    /// MMU enable.
    MmuE = 0x06,
    /// Interrupt-table bank.
    IntB = 0x07,
    /// Interrupt-table pointer.
    IntP = 0x08,
    /// Interrupt enable.
    IntL = 0x09,
    /// Flags.
    Fl = 0x0A,
    /// Program-counter bank.
    Pcb = 0x0B,
    /// PC saved on interrupt entry.
    RtiP = 0x0C,
    /// PC bank saved on interrupt entry.
    RtiB = 0x0D,
    R0 = 0x10,
    R1 = 0x11,
    R2 = 0x12,
    R3 = 0x13,
    R4 = 0x14,
    R5 = 0x15,
    R6 = 0x16,
    R7 = 0x17,
}

/// Assembler names for every named register, in lookup order.
///
/// The assembler scans this table in order when matching register prefixes,
/// so the order is part of the text format.
pub const REGISTER_NAMES: [(&str, Register); 22] = [
    ("pcp", Register::Pc),
    ("sp", Register::Sp),
    ("bp", Register::Bp),
    ("exc", Register::Exc),
    ("mmub", Register::MmuB),
    ("mmup", Register::MmuP),
    ("mmue", Register::MmuE),
    ("intb", Register::IntB),
    ("intp", Register::IntP),
    ("inte", Register::IntL),
    ("fl", Register::Fl),
    ("pcb", Register::Pcb),
    ("rtip", Register::RtiP),
    ("rtib", Register::RtiB),
    ("r0", Register::R0),
    ("r1", Register::R1),
    ("r2", Register::R2),
    ("r3", Register::R3),
    ("r4", Register::R4),
    ("r5", Register::R5),
    ("r6", Register::R6),
    ("r7", Register::R7),
];

impl Register {
    /// Returns the register selected by an encoded register byte, if it is named.
    ///
    /// # Examples
    ///
    /// ```
    /// use bank16::Register;
    ///
    /// assert_eq!(Register::from_index(0x10), Some(Register::R0));
    /// assert_eq!(Register::from_index(0x0E), None);
    /// ```
    pub fn from_index(index: u8) -> Option<Self> {
        REGISTER_NAMES
            .iter()
            .find(|(_, reg)| *reg as u8 == index)
            .map(|(_, reg)| *reg)
    }

    /// Returns the encoded register byte.
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Returns the assembler name of this register.
    pub fn name(self) -> &'static str {
        REGISTER_NAMES
            .iter()
            .find(|(_, reg)| *reg == self)
            .map(|(name, _)| *name)
            .unwrap_or("?")
    }

    /// Returns the general-purpose register `R<n>` for `n` in 0..8.
    pub fn general(n: u8) -> Option<Self> {
        if n < 8 {
            Self::from_index(Register::R0 as u8 + n)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Register {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Returns the assembler name for an encoded register byte, if it has one.
pub fn register_name(index: u8) -> Option<&'static str> {
    Register::from_index(index).map(Register::name)
}

/// Fixed-size register file indexed by register byte.
#[derive(Clone, PartialEq, Eq)]
pub struct RegisterFile {
    slots: [u32; REGISTER_SLOTS],
}

impl RegisterFile {
    /// Creates a register file with every slot cleared.
    pub fn new() -> Self {
        Self {
            slots: [0; REGISTER_SLOTS],
        }
    }

    /// Reads a slot by register byte.
    pub fn get(&self, index: u8) -> u32 {
        self.slots[index as usize]
    }

    /// Writes a slot by register byte, keeping the low 20 bits.
    pub fn set(&mut self, index: u8, value: u32) {
        self.slots[index as usize] = value & REGISTER_MASK;
    }

    /// Reads a named register.
    pub fn reg(&self, reg: Register) -> u32 {
        self.get(reg as u8)
    }

    /// Writes a named register.
    pub fn set_reg(&mut self, reg: Register, value: u32) {
        self.set(reg as u8, value);
    }
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RegisterFile {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (name, reg) in REGISTER_NAMES.iter() {
            map.entry(name, &self.reg(*reg));
        }
        map.finish()
    }
}
