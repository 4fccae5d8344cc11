//! # Shift Instructions
//!
//! Logical shifts on the low 16 bits of a register. Shifting by 16 or more
//! yields 0. The nibble shifts work on the whole 20-bit slot so bank-sized
//! values can be built in a register.

use super::{register_imm8, register_register, register_unary};
use crate::registers::REGISTER_MASK;
use crate::{Fault, MemoryBus, CPU};

fn shift_left(value: u16, amount: u16) -> u16 {
    value.checked_shl(amount as u32).unwrap_or(0)
}

fn shift_right(value: u16, amount: u16) -> u16 {
    value.checked_shr(amount as u32).unwrap_or(0)
}

pub(crate) fn execute_shl<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), Fault> {
    register_register(cpu, shift_left)
}

pub(crate) fn execute_shli_b<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), Fault> {
    register_imm8(cpu, shift_left)
}

pub(crate) fn execute_shr<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), Fault> {
    register_register(cpu, shift_right)
}

pub(crate) fn execute_shri_b<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), Fault> {
    register_imm8(cpu, shift_right)
}

/// Executes SL4: shift left by one nibble.
pub(crate) fn execute_sl4<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), Fault> {
    register_unary(cpu, |d| (d << 4) & REGISTER_MASK)
}

/// Executes SR4: shift right by one nibble.
pub(crate) fn execute_sr4<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), Fault> {
    register_unary(cpu, |d| d >> 4)
}
