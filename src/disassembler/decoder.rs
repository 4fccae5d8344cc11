//! Instruction decoder for the disassembler

use crate::addressing::{AddressHeader, SourceType};
use crate::disassembler::{Instruction, MemoryOperand, MemorySource, Operand};
use crate::memory::Address;
use crate::opcodes::{OperandKind, OPCODE_TABLE};

/// Decode a single instruction from a byte slice
///
/// # Arguments
///
/// * `bytes` - The byte slice starting at the instruction to decode
/// * `address` - The address of the opcode byte
///
/// # Returns
///
/// `Some(Instruction)` for a complete, defined instruction (implemented or
/// reserved); `None` for bytes absent from the opcode table or input that ends
/// mid-instruction
pub fn decode_instruction(bytes: &[u8], address: Address) -> Option<Instruction> {
    let (&opcode, mut rest) = bytes.split_first()?;
    let metadata = &OPCODE_TABLE[opcode as usize];
    if !metadata.is_defined() {
        return None;
    }

    let mut operands = Vec::with_capacity(metadata.operands.len());
    for kind in metadata.operands {
        let (operand, remaining) = decode_operand(*kind, rest)?;
        operands.push(operand);
        rest = remaining;
    }

    Some(Instruction {
        address,
        opcode,
        mnemonic: metadata.mnemonic,
        size_bytes: (bytes.len() - rest.len()) as u8,
        operands,
        implemented: metadata.implemented,
    })
}

fn decode_operand(kind: OperandKind, bytes: &[u8]) -> Option<(Operand, &[u8])> {
    match kind {
        OperandKind::Register => {
            let (&reg, rest) = bytes.split_first()?;
            Some((Operand::Register(reg), rest))
        }
        OperandKind::Imm8 => {
            let (&value, rest) = bytes.split_first()?;
            Some((Operand::Imm8(value), rest))
        }
        OperandKind::Imm16 => {
            let (value, rest) = decode_word(bytes)?;
            Some((Operand::Imm16(value), rest))
        }
        OperandKind::Address => {
            let (&header, rest) = bytes.split_first()?;
            let header = AddressHeader::decode(header);
            let (source, rest) = match header.source {
                SourceType::Register => {
                    let (&reg, rest) = rest.split_first()?;
                    (MemorySource::Register(reg), rest)
                }
                SourceType::Immediate => {
                    let (value, rest) = decode_word(rest)?;
                    (MemorySource::Immediate(value), rest)
                }
            };
            let operand = MemoryOperand {
                mode: header.mode,
                field: header.field,
                source,
            };
            Some((Operand::Memory(operand), rest))
        }
    }
}

fn decode_word(bytes: &[u8]) -> Option<(u16, &[u8])> {
    match bytes {
        [low, high, rest @ ..] => Some((u16::from_le_bytes([*low, *high]), rest)),
        _ => None,
    }
}
