//! Instruction encoder
//!
//! Emits the opcode byte followed by each operand in table order. Memory
//! operands are the header byte followed by the source (one register byte or
//! a little-endian word).

use crate::assembler::{AssemblerError, ErrorType};
use crate::disassembler::{MemorySource, Operand};
use crate::opcodes::{find_opcode, OPCODE_TABLE};

/// Encode a mnemonic and operands into a new byte vector.
///
/// # Examples
///
/// ```
/// use bank16::assembler::encoder::encode;
/// use bank16::disassembler::{MemoryOperand, MemorySource};
/// use bank16::Operand;
///
/// let target = MemoryOperand::pc_relative(true, MemorySource::Immediate(6));
/// let bytes = encode("lod.w", &[Operand::Register(0x10), Operand::Memory(target)]).unwrap();
/// assert_eq!(bytes, vec![0x05, 0x10, 0x91, 0x06, 0x00]);
/// ```
pub fn encode(mnemonic: &str, operands: &[Operand]) -> Result<Vec<u8>, AssemblerError> {
    let opcode = find_opcode(mnemonic).ok_or_else(|| {
        AssemblerError::new(
            ErrorType::UnknownMnemonic,
            0,
            format!("unknown mnemonic '{}'", mnemonic),
        )
    })?;

    let mut out = Vec::new();
    encode_instruction(opcode, operands, &mut out)?;
    Ok(out)
}

/// Append an instruction to `out` after checking the operands against the opcode's shape.
///
/// Nothing is written when the check fails.
pub fn encode_instruction(
    opcode: u8,
    operands: &[Operand],
    out: &mut Vec<u8>,
) -> Result<(), AssemblerError> {
    let metadata = &OPCODE_TABLE[opcode as usize];
    if !metadata.is_defined() {
        return Err(AssemblerError::new(
            ErrorType::UnknownMnemonic,
            0,
            format!("0x{:02X} is not an opcode", opcode),
        ));
    }

    let shape_matches = operands.len() == metadata.operands.len()
        && operands
            .iter()
            .zip(metadata.operands)
            .all(|(operand, kind)| operand.kind() == *kind);
    if !shape_matches {
        return Err(AssemblerError::new(
            ErrorType::OperandMismatch,
            0,
            format!(
                "'{}' expects operands {:?}",
                metadata.mnemonic, metadata.operands
            ),
        ));
    }

    out.push(opcode);
    for operand in operands {
        encode_operand(operand, out);
    }
    Ok(())
}

/// Append one operand's bytes.
pub fn encode_operand(operand: &Operand, out: &mut Vec<u8>) {
    match operand {
        Operand::Register(index) => out.push(*index),
        Operand::Imm8(value) => out.push(*value),
        Operand::Imm16(value) => out.extend_from_slice(&value.to_le_bytes()),
        Operand::Memory(mem) => {
            out.push(mem.header().encode());
            match mem.source {
                MemorySource::Register(index) => out.push(index),
                MemorySource::Immediate(value) => out.extend_from_slice(&value.to_le_bytes()),
            }
        }
    }
}
