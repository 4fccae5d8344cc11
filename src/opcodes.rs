//! # Opcode Metadata Table
//!
//! This module contains the 256-entry opcode table that is the single source of
//! truth shared by the executor, the assembler and the disassembler.
//!
//! Each defined opcode has a mnemonic, a fixed operand shape and an
//! implementation status. Reserved opcodes (stack, compare, bit-test and
//! control-transfer families) are present with their operand shapes so that
//! the assembler can already encode them, but the executor does not run them.
//! Bytes that name no instruction carry the `"???"` mnemonic.

/// Shape of one instruction operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandKind {
    /// One register byte.
    Register,
    /// One immediate byte.
    Imm8,
    /// Two immediate bytes, little-endian.
    Imm16,
    /// A memory operand: header byte plus a 1- or 2-byte source.
    Address,
}

/// Metadata for a single opcode.
///
/// # Examples
///
/// ```
/// use bank16::{OperandKind, OPCODE_TABLE};
///
/// let lod_b = &OPCODE_TABLE[0x04];
/// assert_eq!(lod_b.mnemonic, "lod.b");
/// assert_eq!(lod_b.operands, &[OperandKind::Register, OperandKind::Address]);
/// assert!(lod_b.implemented);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeMetadata {
    /// Instruction mnemonic (`"???"` for bytes that name no instruction).
    pub mnemonic: &'static str,

    /// Operand shapes in encoding order.
    pub operands: &'static [OperandKind],

    /// Whether the executor runs this instruction.
    pub implemented: bool,
}

impl OpcodeMetadata {
    /// True when this byte names an instruction (implemented or reserved).
    pub fn is_defined(&self) -> bool {
        self.mnemonic != ILLEGAL.mnemonic
    }
}

pub const NOP: u8 = 0x00;
pub const MOV: u8 = 0x01;
pub const IMM_B: u8 = 0x02;
pub const IMM_W: u8 = 0x03;
pub const LOD_B: u8 = 0x04;
pub const LOD_W: u8 = 0x05;
pub const STO_B: u8 = 0x06;
pub const STO_W: u8 = 0x07;
pub const ADDI_B: u8 = 0x08;
pub const ADDI_W: u8 = 0x09;
pub const ADD: u8 = 0x0A;
pub const SUBI_B: u8 = 0x0C;
pub const SUBI_W: u8 = 0x0D;
pub const SUB: u8 = 0x0E;
pub const CLR: u8 = 0x10;
pub const SL4: u8 = 0x11;
pub const SR4: u8 = 0x12;
pub const SEZ: u8 = 0x13;
pub const CLZ: u8 = 0x14;
pub const INZ: u8 = 0x15;
pub const NOT: u8 = 0x20;
pub const AND: u8 = 0x21;
pub const ANDI_B: u8 = 0x22;
pub const ANDI_W: u8 = 0x23;
pub const ORR: u8 = 0x24;
pub const SHL: u8 = 0x27;
pub const SHLI_B: u8 = 0x28;
pub const SHR: u8 = 0x29;
pub const SHRI_B: u8 = 0x2A;
pub const XOR: u8 = 0x2B;
pub const SXT: u8 = 0x2D;
pub const BTSI_B: u8 = 0x30;
pub const BTS: u8 = 0x31;
pub const BTTI_B: u8 = 0x32;
pub const BTT: u8 = 0x33;
pub const TST: u8 = 0x40;
pub const TSTM_B: u8 = 0x41;
pub const TSTM_W: u8 = 0x42;
pub const CEQ: u8 = 0x43;
pub const CLT: u8 = 0x45;
pub const CGT: u8 = 0x47;
pub const PSH_B: u8 = 0x50;
pub const PSHI_B: u8 = 0x51;
pub const PSH_W: u8 = 0x52;
pub const PSHI_W: u8 = 0x53;
pub const PLL_B: u8 = 0x54;
pub const PLL_W: u8 = 0x55;
pub const JMP: u8 = 0x60;
pub const JMZ: u8 = 0x61;
pub const JNZ: u8 = 0x62;
pub const CAL: u8 = 0x63;
pub const RET: u8 = 0x64;
pub const INT: u8 = 0x65;
pub const RTI: u8 = 0x66;
pub const JMF: u8 = 0x67;

use OperandKind::{Address as A, Imm16 as W, Imm8 as B, Register as R};

const NONE: &[OperandKind] = &[];
const REG: &[OperandKind] = &[R];
const REG_REG: &[OperandKind] = &[R, R];
const REG_B: &[OperandKind] = &[R, B];
const REG_W: &[OperandKind] = &[R, W];
const REG_ADDR: &[OperandKind] = &[R, A];
const ADDR_REG: &[OperandKind] = &[A, R];
const ADDR: &[OperandKind] = &[A];
const ADDR_B: &[OperandKind] = &[A, B];
const IMM_8: &[OperandKind] = &[B];
const IMM_16: &[OperandKind] = &[W];

const ILLEGAL: OpcodeMetadata = OpcodeMetadata {
    mnemonic: "???",
    operands: NONE,
    implemented: false,
};

const fn op(mnemonic: &'static str, operands: &'static [OperandKind]) -> OpcodeMetadata {
    OpcodeMetadata {
        mnemonic,
        operands,
        implemented: true,
    }
}

const fn reserved(mnemonic: &'static str, operands: &'static [OperandKind]) -> OpcodeMetadata {
    OpcodeMetadata {
        mnemonic,
        operands,
        implemented: false,
    }
}

const fn build_table() -> [OpcodeMetadata; 256] {
    let mut table = [ILLEGAL; 256];

    table[NOP as usize] = op("nop", NONE);
    table[MOV as usize] = op("mov", REG_REG);
    table[IMM_B as usize] = op("imm.b", REG_B);
    table[IMM_W as usize] = op("imm.w", REG_W);
    table[LOD_B as usize] = op("lod.b", REG_ADDR);
    table[LOD_W as usize] = op("lod.w", REG_ADDR);
    table[STO_B as usize] = op("sto.b", ADDR_REG);
    table[STO_W as usize] = op("sto.w", ADDR_REG);
    table[ADDI_B as usize] = op("addi.b", REG_B);
    table[ADDI_W as usize] = op("addi.w", REG_W);
    table[ADD as usize] = op("add", REG_REG);
    table[SUBI_B as usize] = op("subi.b", REG_B);
    table[SUBI_W as usize] = op("subi.w", REG_W);
    table[SUB as usize] = op("sub", REG_REG);
    table[CLR as usize] = op("clr", REG);
    table[SL4 as usize] = op("sl4", REG);
    table[SR4 as usize] = op("sr4", REG);
    table[SEZ as usize] = op("sez", NONE);
    table[CLZ as usize] = op("clz", NONE);
    table[INZ as usize] = op("inz", NONE);
    table[NOT as usize] = op("not", REG);
    table[AND as usize] = op("and", REG_REG);
    table[ANDI_B as usize] = op("andi.b", REG_B);
    table[ANDI_W as usize] = op("andi.w", REG_W);
    table[ORR as usize] = op("orr", REG_REG);
    table[SHL as usize] = op("shl", REG_REG);
    table[SHLI_B as usize] = op("shli.b", REG_B);
    table[SHR as usize] = op("shr", REG_REG);
    table[SHRI_B as usize] = op("shri.b", REG_B);
    table[XOR as usize] = op("xor", REG_REG);

    table[SXT as usize] = reserved("sxt", REG_REG);
    table[BTSI_B as usize] = reserved("btsi.b", REG_B);
    table[BTS as usize] = reserved("bts", REG_REG);
    table[BTTI_B as usize] = reserved("btti.b", REG_B);
    table[BTT as usize] = reserved("btt", REG_REG);
    table[TST as usize] = reserved("tst", REG);
    table[TSTM_B as usize] = reserved("tstm.b", ADDR);
    table[TSTM_W as usize] = reserved("tstm.w", ADDR);
    table[CEQ as usize] = reserved("ceq", REG_REG);
    table[CLT as usize] = reserved("clt", REG_REG);
    table[CGT as usize] = reserved("cgt", REG_REG);
    table[PSH_B as usize] = reserved("psh.b", REG);
    table[PSHI_B as usize] = reserved("pshi.b", IMM_8);
    table[PSH_W as usize] = reserved("psh.w", REG);
    table[PSHI_W as usize] = reserved("pshi.w", IMM_16);
    table[PLL_B as usize] = reserved("pll.b", REG);
    table[PLL_W as usize] = reserved("pll.w", REG);
    table[JMP as usize] = reserved("jmp", ADDR);
    table[JMZ as usize] = reserved("jmz", ADDR);
    table[JNZ as usize] = reserved("jnz", ADDR);
    table[CAL as usize] = reserved("cal", ADDR);
    table[RET as usize] = reserved("ret", NONE);
    table[INT as usize] = reserved("int", IMM_8);
    table[RTI as usize] = reserved("rti", NONE);
    table[JMF as usize] = reserved("jmf", ADDR_B);

    table
}

/// Complete 256-entry opcode table indexed by opcode byte.
pub const OPCODE_TABLE: [OpcodeMetadata; 256] = build_table();

/// Looks up the opcode byte for a mnemonic (exact, case-sensitive match).
///
/// # Examples
///
/// ```
/// use bank16::opcodes::find_opcode;
///
/// assert_eq!(find_opcode("add"), Some(0x0A));
/// assert_eq!(find_opcode("ADD"), None);
/// assert_eq!(find_opcode("???"), None);
/// ```
pub fn find_opcode(mnemonic: &str) -> Option<u8> {
    OPCODE_TABLE
        .iter()
        .position(|m| m.is_defined() && m.mnemonic == mnemonic)
        .map(|index| index as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mnemonics_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for meta in OPCODE_TABLE.iter().filter(|m| m.is_defined()) {
            assert!(seen.insert(meta.mnemonic), "duplicate {}", meta.mnemonic);
        }
        assert_eq!(seen.len(), 55);
    }

    #[test]
    fn test_implemented_count() {
        let implemented = OPCODE_TABLE.iter().filter(|m| m.implemented).count();
        assert_eq!(implemented, 30);
    }

    #[test]
    fn test_gaps_are_illegal() {
        for byte in [0x0B, 0x0F, 0x16, 0x25, 0x26, 0x2C, 0x44, 0x68, 0xFF] {
            assert!(!OPCODE_TABLE[byte].is_defined(), "0x{:02X}", byte);
        }
    }

    #[test]
    fn test_find_opcode_round_trips() {
        for (byte, meta) in OPCODE_TABLE.iter().enumerate() {
            if meta.is_defined() {
                assert_eq!(find_opcode(meta.mnemonic), Some(byte as u8));
            }
        }
    }
}
