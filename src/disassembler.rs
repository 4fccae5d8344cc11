//! # Disassembler
//!
//! Converts machine code back into `(mnemonic, operands)` form using the same
//! `OPCODE_TABLE` the executor decodes with. The operand types defined here are
//! shared with the assembler, so decoding an encoded instruction yields the
//! operands it was encoded from.

pub mod decoder;
pub mod formatter;

use crate::addressing::{AddressHeader, AddressingMode, SourceType};
use crate::memory::Address;
use crate::opcodes::OperandKind;

pub use decoder::decode_instruction;
pub use formatter::format_instruction;

/// Source value that follows a memory-operand header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemorySource {
    /// A register byte; the register's low 16 bits are used at run time.
    Register(u8),
    /// A 16-bit immediate.
    Immediate(u16),
}

impl MemorySource {
    pub fn source_type(self) -> SourceType {
        match self {
            MemorySource::Register(_) => SourceType::Register,
            MemorySource::Immediate(_) => SourceType::Immediate,
        }
    }
}

/// A memory operand: addressing mode, header field and inline source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemoryOperand {
    pub mode: AddressingMode,
    /// Bank (absolute), sign (relative) or index register (indexed); 4 bits.
    pub field: u8,
    pub source: MemorySource,
}

impl MemoryOperand {
    /// `[bank: src]`
    pub fn absolute(bank: u8, source: MemorySource) -> Self {
        Self::new(AddressingMode::Absolute, bank, source)
    }

    /// `[pc + src]` or `[pc - src]`
    pub fn pc_relative(negative: bool, source: MemorySource) -> Self {
        Self::new(AddressingMode::PcRelative, negative as u8, source)
    }

    /// `[sp + src]` or `[sp - src]`
    pub fn sp_relative(negative: bool, source: MemorySource) -> Self {
        Self::new(AddressingMode::SpRelative, negative as u8, source)
    }

    /// `[pt + src]`
    pub fn page_table(source: MemorySource) -> Self {
        Self::new(AddressingMode::PageTableRelative, 0, source)
    }

    /// `[it + src]`
    pub fn interrupt_table(source: MemorySource) -> Self {
        Self::new(AddressingMode::InterruptTableRelative, 0, source)
    }

    /// `[r<index> + src]`
    pub fn indexed(index: u8, source: MemorySource) -> Self {
        Self::new(AddressingMode::Indexed, index, source)
    }

    fn new(mode: AddressingMode, field: u8, source: MemorySource) -> Self {
        Self {
            mode,
            field: field & 0x0F,
            source,
        }
    }

    /// Returns the header byte describing this operand.
    pub fn header(&self) -> AddressHeader {
        AddressHeader::new(self.mode, self.source.source_type(), self.field)
    }

    /// Number of encoded bytes (header plus source).
    pub fn size_bytes(&self) -> u8 {
        1 + self.source.source_type().size_bytes()
    }
}

/// One decoded or parsed instruction operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operand {
    Register(u8),
    Imm8(u8),
    Imm16(u16),
    Memory(MemoryOperand),
}

impl Operand {
    /// The operand shape this value fills.
    pub fn kind(&self) -> OperandKind {
        match self {
            Operand::Register(_) => OperandKind::Register,
            Operand::Imm8(_) => OperandKind::Imm8,
            Operand::Imm16(_) => OperandKind::Imm16,
            Operand::Memory(_) => OperandKind::Address,
        }
    }

    /// Number of encoded bytes.
    pub fn size_bytes(&self) -> u8 {
        match self {
            Operand::Register(_) | Operand::Imm8(_) => 1,
            Operand::Imm16(_) => 2,
            Operand::Memory(mem) => mem.size_bytes(),
        }
    }
}

/// A single disassembled instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    /// Address of the opcode byte
    pub address: Address,

    /// The opcode byte value
    pub opcode: u8,

    /// Instruction mnemonic, or `.byte` for an undecodable byte
    pub mnemonic: &'static str,

    /// Decoded operands in encoding order
    pub operands: Vec<Operand>,

    /// Total size in bytes (opcode + operands)
    pub size_bytes: u8,

    /// Whether the executor runs this opcode
    pub implemented: bool,
}

impl Instruction {
    /// Pseudo-instruction covering one byte that does not decode.
    pub fn raw_byte(address: Address, byte: u8) -> Self {
        Self {
            address,
            opcode: byte,
            mnemonic: ".byte",
            operands: Vec::new(),
            size_bytes: 1,
            implemented: false,
        }
    }

    pub fn is_raw_byte(&self) -> bool {
        self.mnemonic == ".byte"
    }
}

/// Options controlling disassembly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisassemblyOptions {
    /// Offset of the first byte (affects reported addresses and pc-relative targets)
    pub start_address: u16,

    /// Bank the bytes were taken from
    pub bank: u8,
}

impl DisassemblyOptions {
    pub fn with_start_address(mut self, start_address: u16) -> Self {
        self.start_address = start_address;
        self
    }

    pub fn with_bank(mut self, bank: u8) -> Self {
        self.bank = bank & 0x0F;
        self
    }

    fn origin(&self) -> Address {
        Address::new(self.bank, self.start_address)
    }
}

impl Default for DisassemblyOptions {
    fn default() -> Self {
        Self {
            start_address: crate::cpu::RESET_PC,
            bank: 0,
        }
    }
}

/// Disassemble a byte slice into a vector of instructions.
///
/// Bytes that do not start a complete, defined instruction become `.byte`
/// pseudo-instructions and decoding resumes at the next byte.
///
/// # Examples
///
/// ```
/// use bank16::{disassemble, DisassemblyOptions};
/// use bank16::disassembler::format_instruction;
///
/// let listing = disassemble(&[0x02, 0x10, 0x05, 0x0B], DisassemblyOptions::default());
/// let text: Vec<String> = listing.iter().map(format_instruction).collect();
/// assert_eq!(text, ["imm.b r0, b 5", ".byte 0x0B"]);
/// ```
pub fn disassemble(bytes: &[u8], options: DisassemblyOptions) -> Vec<Instruction> {
    let mut instructions = Vec::new();
    let mut pos = 0;
    let mut address = options.origin();

    while pos < bytes.len() {
        let instr = decode_instruction(&bytes[pos..], address)
            .unwrap_or_else(|| Instruction::raw_byte(address, bytes[pos]));
        pos += instr.size_bytes as usize;
        address = address.wrapping_add(instr.size_bytes as u16);
        instructions.push(instr);
    }

    instructions
}
