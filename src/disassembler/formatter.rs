//! Formatting functions for disassembled instructions
//!
//! The output uses the assembler's own syntax, so every instruction the
//! assembler can produce formats to a line it accepts again.

use crate::addressing::AddressingMode;
use crate::disassembler::{Instruction, MemoryOperand, MemorySource, Operand};
use crate::registers::register_name;

/// Format a single instruction as assembly text
///
/// # Examples
///
/// ```
/// use bank16::disassembler::{decode_instruction, format_instruction};
/// use bank16::Address;
///
/// let instr = decode_instruction(&[0x06, 0xC0, 0x10, 0x00, 0x17], Address::new(0, 0x1000)).unwrap();
/// assert_eq!(format_instruction(&instr), "sto.b [it + 16], r7");
/// ```
pub fn format_instruction(instr: &Instruction) -> String {
    if instr.is_raw_byte() {
        return format!(".byte 0x{:02X}", instr.opcode);
    }

    if instr.operands.is_empty() {
        return instr.mnemonic.to_string();
    }

    let operands: Vec<String> = instr.operands.iter().map(format_operand).collect();
    format!("{} {}", instr.mnemonic, operands.join(", "))
}

/// Format one operand
pub fn format_operand(operand: &Operand) -> String {
    match operand {
        Operand::Register(index) => format_register(*index),
        Operand::Imm8(value) => format!("b {}", value),
        Operand::Imm16(value) => format!("w {}", value),
        Operand::Memory(mem) => format_memory(mem),
    }
}

fn format_register(index: u8) -> String {
    match register_name(index) {
        Some(name) => name.to_string(),
        // Unnamed slots have no assembler spelling
        None => format!("reg0x{:02X}", index),
    }
}

fn format_source(source: MemorySource) -> String {
    match source {
        MemorySource::Register(index) => format_register(index),
        MemorySource::Immediate(value) => value.to_string(),
    }
}

fn format_memory(mem: &MemoryOperand) -> String {
    let source = format_source(mem.source);
    let sign = if mem.field & 1 != 0 { '-' } else { '+' };

    match mem.mode {
        AddressingMode::Absolute if mem.field == 0 => format!("[{}]", source),
        AddressingMode::Absolute => format!("[{}: {}]", mem.field, source),
        AddressingMode::PcRelative => format!("[pc {} {}]", sign, source),
        AddressingMode::SpRelative => format!("[sp {} {}]", sign, source),
        AddressingMode::PageTableRelative => format!("[pt + {}]", source),
        AddressingMode::InterruptTableRelative => format!("[it + {}]", source),
        AddressingMode::Indexed => format!("[r{} + {}]", mem.field, source),
        AddressingMode::Undefined(bits) => format!("[mode{} {}: {}]", bits, mem.field, source),
    }
}
