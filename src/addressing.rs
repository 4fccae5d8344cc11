//! # Addressing Modes
//!
//! A memory operand is one header byte followed by an inline source. The header
//! selects how the source value becomes an effective `(offset, bank)` address:
//!
//! ```text
//!  7   6 5 4   3 2 1 0
//! [T] [ MODE ] [ FIELD ]
//! ```
//!
//! - `FIELD` (bits 0-3): bank for absolute mode, sign for pc/sp-relative
//!   (bit 0: 0 = `+`, 1 = `-`), register index for indexed mode
//! - `MODE` (bits 4-6): one of [`AddressingMode`]
//! - `T` (bit 7): [`SourceType`] of the inline source
//!
//! The packing is explicit shift/mask code; nothing depends on struct layout.

/// Effective-address calculation selected by the header's mode bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressingMode {
    /// `offset = src`, bank from the header field.
    Absolute,

    /// `offset = PC ± src`, bank = PCb.
    PcRelative,

    /// `offset = SP ± src`, bank 0.
    SpRelative,

    /// `offset = MMUp + src`, bank = MMUb.
    PageTableRelative,

    /// `offset = INTp + src`, bank = INTb.
    InterruptTableRelative,

    /// `offset = src + R[16 + field]`, bank 0.
    Indexed,

    /// Mode bits 6 and 7 have no defined formula; they resolve to address 0:0.
    Undefined(u8),
}

impl AddressingMode {
    /// Decodes the 3 mode bits.
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0b111 {
            0b000 => Self::Absolute,
            0b001 => Self::PcRelative,
            0b010 => Self::SpRelative,
            0b011 => Self::PageTableRelative,
            0b100 => Self::InterruptTableRelative,
            0b101 => Self::Indexed,
            other => Self::Undefined(other),
        }
    }

    /// Returns the 3 mode bits.
    pub fn bits(self) -> u8 {
        match self {
            Self::Absolute => 0b000,
            Self::PcRelative => 0b001,
            Self::SpRelative => 0b010,
            Self::PageTableRelative => 0b011,
            Self::InterruptTableRelative => 0b100,
            Self::Indexed => 0b101,
            Self::Undefined(bits) => bits & 0b111,
        }
    }
}

/// Shape of the source that follows a memory-operand header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceType {
    /// One register byte; the register's value is the source.
    Register,
    /// A 16-bit little-endian immediate.
    Immediate,
}

impl SourceType {
    /// Number of operand bytes the source occupies.
    pub fn size_bytes(self) -> u8 {
        match self {
            Self::Register => 1,
            Self::Immediate => 2,
        }
    }
}

/// Decoded memory-operand header byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AddressHeader {
    /// Bank, sign or index register selector (4 bits).
    pub field: u8,
    /// Addressing mode.
    pub mode: AddressingMode,
    /// Type of the inline source.
    pub source: SourceType,
}

impl AddressHeader {
    const FIELD_MASK: u8 = 0x0F;
    const MODE_SHIFT: u8 = 4;
    const SOURCE_BIT: u8 = 0x80;

    /// Creates a header; `field` is truncated to 4 bits.
    pub fn new(mode: AddressingMode, source: SourceType, field: u8) -> Self {
        Self {
            field: field & Self::FIELD_MASK,
            mode,
            source,
        }
    }

    /// Decodes a header byte.
    ///
    /// # Examples
    ///
    /// ```
    /// use bank16::{AddressHeader, AddressingMode, SourceType};
    ///
    /// let header = AddressHeader::decode(0b1001_0001);
    /// assert_eq!(header.mode, AddressingMode::PcRelative);
    /// assert_eq!(header.source, SourceType::Immediate);
    /// assert!(header.negative());
    /// ```
    pub fn decode(byte: u8) -> Self {
        let source = if byte & Self::SOURCE_BIT != 0 {
            SourceType::Immediate
        } else {
            SourceType::Register
        };

        Self {
            field: byte & Self::FIELD_MASK,
            mode: AddressingMode::from_bits(byte >> Self::MODE_SHIFT),
            source,
        }
    }

    /// Encodes the header into its byte form.
    pub fn encode(self) -> u8 {
        let source = match self.source {
            SourceType::Register => 0,
            SourceType::Immediate => Self::SOURCE_BIT,
        };
        source | (self.mode.bits() << Self::MODE_SHIFT) | (self.field & Self::FIELD_MASK)
    }

    /// True when a pc/sp-relative offset is subtracted rather than added.
    pub fn negative(self) -> bool {
        self.field & 0x01 != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_header_layout() {
        let header = AddressHeader::new(AddressingMode::Absolute, SourceType::Immediate, 3);
        assert_eq!(header.encode(), 0b1000_0011);
    }

    #[test]
    fn test_indexed_register_header_layout() {
        let header = AddressHeader::new(AddressingMode::Indexed, SourceType::Register, 7);
        assert_eq!(header.encode(), 0b0101_0111);
    }

    #[test]
    fn test_every_byte_decodes_and_reencodes() {
        for byte in 0..=255u8 {
            assert_eq!(AddressHeader::decode(byte).encode(), byte);
        }
    }

    #[test]
    fn test_undefined_modes() {
        assert_eq!(AddressingMode::from_bits(6), AddressingMode::Undefined(6));
        assert_eq!(AddressingMode::from_bits(7).bits(), 7);
    }

    #[test]
    fn test_source_sizes() {
        assert_eq!(SourceType::Register.size_bytes(), 1);
        assert_eq!(SourceType::Immediate.size_bytes(), 2);
    }
}
