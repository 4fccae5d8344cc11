//! # ALU Instructions
//!
//! 16-bit wrapping arithmetic and bitwise logic. Register operands contribute
//! their low 16 bits and results are truncated to 16 bits, except `not`, which
//! complements the whole 20-bit slot. No flags change.

use super::{register_imm16, register_imm8, register_register, register_unary};
use crate::registers::REGISTER_MASK;
use crate::{Fault, MemoryBus, CPU};

pub(crate) fn execute_add<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), Fault> {
    register_register(cpu, u16::wrapping_add)
}

pub(crate) fn execute_addi_b<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), Fault> {
    register_imm8(cpu, u16::wrapping_add)
}

pub(crate) fn execute_addi_w<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), Fault> {
    register_imm16(cpu, u16::wrapping_add)
}

pub(crate) fn execute_sub<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), Fault> {
    register_register(cpu, u16::wrapping_sub)
}

pub(crate) fn execute_subi_b<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), Fault> {
    register_imm8(cpu, u16::wrapping_sub)
}

pub(crate) fn execute_subi_w<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), Fault> {
    register_imm16(cpu, u16::wrapping_sub)
}

pub(crate) fn execute_and<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), Fault> {
    register_register(cpu, |d, s| d & s)
}

pub(crate) fn execute_andi_b<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), Fault> {
    register_imm8(cpu, |d, v| d & v)
}

pub(crate) fn execute_andi_w<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), Fault> {
    register_imm16(cpu, |d, v| d & v)
}

pub(crate) fn execute_orr<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), Fault> {
    register_register(cpu, |d, s| d | s)
}

pub(crate) fn execute_xor<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), Fault> {
    register_register(cpu, |d, s| d ^ s)
}

/// Executes NOT: bitwise complement of the full 20-bit slot.
pub(crate) fn execute_not<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), Fault> {
    register_unary(cpu, |d| !d & REGISTER_MASK)
}
