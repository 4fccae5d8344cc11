//! # Instruction Implementations
//!
//! Each implemented opcode is a standalone function taking the CPU. Instructions
//! fetch all of their operand bytes first and only then change state, so a
//! fault surfaced through `?` leaves registers and memory as they were (apart
//! from the fault dispatch itself).
//!
//! ## Categories
//!
//! - **transfer**: register moves and immediates (mov, imm.b, imm.w, clr)
//! - **load_store**: protected memory access (lod.b, lod.w, sto.b, sto.w)
//! - **alu**: 16-bit arithmetic and logic (add, sub, and, orr, xor and immediates), 20-bit not
//! - **shifts**: 16-bit shifts (shl, shr and immediates), 20-bit nibble shifts (sl4, sr4)
//! - **flags**: zero-flag manipulation (sez, clz, inz)

pub mod alu;
pub mod flags;
pub mod load_store;
pub mod shifts;
pub mod transfer;

use crate::{Fault, MemoryBus, CPU};

/// `op reg, reg`: `d = f(d, s)` on the low 16 bits of both registers.
pub(crate) fn register_register<M: MemoryBus>(
    cpu: &mut CPU<M>,
    f: impl FnOnce(u16, u16) -> u16,
) -> Result<(), Fault> {
    let dest = cpu.fetch_byte()?;
    let src = cpu.fetch_byte()?;
    let result = f(cpu.regs.get(dest) as u16, cpu.regs.get(src) as u16);
    cpu.write_destination(dest, result as u32);
    Ok(())
}

/// `op reg, u8`: `d = f(d, v)`.
pub(crate) fn register_imm8<M: MemoryBus>(
    cpu: &mut CPU<M>,
    f: impl FnOnce(u16, u16) -> u16,
) -> Result<(), Fault> {
    let dest = cpu.fetch_byte()?;
    let value = cpu.fetch_byte()?;
    let result = f(cpu.regs.get(dest) as u16, value as u16);
    cpu.write_destination(dest, result as u32);
    Ok(())
}

/// `op reg, u16`: `d = f(d, v)`.
pub(crate) fn register_imm16<M: MemoryBus>(
    cpu: &mut CPU<M>,
    f: impl FnOnce(u16, u16) -> u16,
) -> Result<(), Fault> {
    let dest = cpu.fetch_byte()?;
    let value = cpu.fetch_word()?;
    let result = f(cpu.regs.get(dest) as u16, value);
    cpu.write_destination(dest, result as u32);
    Ok(())
}

/// `op reg`: `d = f(d)` on the full 20-bit slot; the result is masked on write.
pub(crate) fn register_unary<M: MemoryBus>(
    cpu: &mut CPU<M>,
    f: impl FnOnce(u32) -> u32,
) -> Result<(), Fault> {
    let dest = cpu.fetch_byte()?;
    let result = f(cpu.regs.get(dest));
    cpu.write_destination(dest, result);
    Ok(())
}
