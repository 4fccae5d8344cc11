//! # Load/Store Instructions
//!
//! - LOD.B / LOD.W: protected read into a register
//! - STO.B / STO.W: protected write of a register's low byte or low word
//!
//! Words are little-endian. The second byte of a word lives at the next offset
//! in the same bank.

use crate::{Fault, MemoryBus, CPU};

/// Executes LOD.B: `d = mem[a]`.
///
/// A locked destination skips the memory read entirely.
pub(crate) fn execute_lod_b<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), Fault> {
    let dest = cpu.fetch_byte()?;
    let address = cpu.fetch_address()?;
    if cpu.is_register_locked(dest) {
        cpu.write_destination(dest, 0);
        return Ok(());
    }

    let value = cpu.read_protected(address)?;
    cpu.write_destination(dest, value as u32);
    Ok(())
}

/// Executes LOD.W: `d = mem[a] | mem[a + 1] << 8`.
pub(crate) fn execute_lod_w<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), Fault> {
    let dest = cpu.fetch_byte()?;
    let address = cpu.fetch_address()?;
    if cpu.is_register_locked(dest) {
        cpu.write_destination(dest, 0);
        return Ok(());
    }

    let low = cpu.read_protected(address)?;
    let high = cpu.read_protected(address.wrapping_add(1))?;
    cpu.write_destination(dest, u16::from_le_bytes([low, high]) as u32);
    Ok(())
}

/// Executes STO.B: `mem[a] = s & 0xFF`.
pub(crate) fn execute_sto_b<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), Fault> {
    let address = cpu.fetch_address()?;
    let src = cpu.fetch_byte()?;
    let value = cpu.regs.get(src) as u8;
    cpu.write_protected(address, value)
}

/// Executes STO.W: low byte at `a`, high byte at `a + 1`.
///
/// If the second byte faults, the first byte has already been written.
pub(crate) fn execute_sto_w<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), Fault> {
    let address = cpu.fetch_address()?;
    let src = cpu.fetch_byte()?;
    let [low, high] = (cpu.regs.get(src) as u16).to_le_bytes();
    cpu.write_protected(address, low)?;
    cpu.write_protected(address.wrapping_add(1), high)
}
