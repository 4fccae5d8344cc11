//! # Transfer Instructions
//!
//! - MOV: copy one register slot to another (all 20 bits)
//! - IMM.B / IMM.W: load an immediate
//! - CLR: zero a register

use super::register_unary;
use crate::{Fault, MemoryBus, CPU};

/// Executes MOV: `d = s`.
///
/// Unlike the ALU operations this copies the full slot, so bank-sized values
/// in the upper 4 bits survive.
pub(crate) fn execute_mov<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), Fault> {
    let dest = cpu.fetch_byte()?;
    let src = cpu.fetch_byte()?;
    let value = cpu.regs.get(src);
    cpu.write_destination(dest, value);
    Ok(())
}

/// Executes IMM.B: `d = v` for an 8-bit immediate.
pub(crate) fn execute_imm_b<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), Fault> {
    let dest = cpu.fetch_byte()?;
    let value = cpu.fetch_byte()?;
    cpu.write_destination(dest, value as u32);
    Ok(())
}

/// Executes IMM.W: `d = v` for a 16-bit immediate.
pub(crate) fn execute_imm_w<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), Fault> {
    let dest = cpu.fetch_byte()?;
    let value = cpu.fetch_word()?;
    cpu.write_destination(dest, value as u32);
    Ok(())
}

/// Executes CLR: `d = 0`.
pub(crate) fn execute_clr<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), Fault> {
    register_unary(cpu, |_| 0)
}

#[cfg(test)]
mod tests {
    use crate::{Address, FlatMemory, Register, CPU};

    fn run(program: &[u8]) -> CPU<FlatMemory> {
        let mut cpu = CPU::new(FlatMemory::new());
        cpu.load(Address::new(0, 0x1000), program);
        cpu.step().unwrap();
        cpu
    }

    #[test]
    fn test_mov_copies_full_slot() {
        let mut cpu = CPU::new(FlatMemory::new());
        cpu.set_reg(Register::R1, 0xF_1234);
        cpu.load(Address::new(0, 0x1000), &[0x01, 0x10, 0x11]);
        cpu.step().unwrap();
        assert_eq!(cpu.reg(Register::R0), 0xF_1234);
    }

    #[test]
    fn test_imm_w_is_little_endian() {
        let cpu = run(&[0x03, 0x12, 0x34, 0x12]);
        assert_eq!(cpu.reg(Register::R2), 0x1234);
        assert_eq!(cpu.pc(), 0x1004);
    }

    #[test]
    fn test_clr() {
        let mut cpu = CPU::new(FlatMemory::new());
        cpu.set_reg(Register::R7, 99);
        cpu.load(Address::new(0, 0x1000), &[0x10, 0x17]);
        cpu.step().unwrap();
        assert_eq!(cpu.reg(Register::R7), 0);
    }
}
