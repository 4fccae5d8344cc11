//! Fuzz target for CPU step execution.
//!
//! Builds an arbitrary register file, page table, interrupt table and
//! instruction stream, then executes a few steps. Nothing may panic and the
//! register invariants must hold afterwards.

#![no_main]

use arbitrary::Arbitrary;
use bank16::registers::REGISTER_MASK;
use bank16::{Address, FlatMemory, Register, CPU};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    /// Values for registers 0x00-0x17
    registers: [u32; 24],
    /// Bytes at PCb:PC
    instruction_bytes: [u8; 16],
    /// Page table contents (at MMUb:MMUp)
    page_table: [u8; 32],
    /// Interrupt table contents (at INTb:INTp)
    interrupt_table: [u8; 12],
    steps: u8,
}

fuzz_target!(|input: FuzzInput| {
    let mut cpu = CPU::new(FlatMemory::new());
    for (index, &value) in input.registers.iter().enumerate() {
        cpu.registers_mut().set(index as u8, value);
    }

    let mmu = Address::new(cpu.reg(Register::MmuB) as u8, cpu.reg(Register::MmuP) as u16);
    cpu.load(mmu, &input.page_table);
    let int = Address::new(cpu.reg(Register::IntB) as u8, cpu.reg(Register::IntP) as u16);
    cpu.load(int, &input.interrupt_table);
    let pc = cpu.pc_address();
    cpu.load(pc, &input.instruction_bytes);

    for _ in 0..input.steps % 8 {
        let _ = cpu.step();
    }

    for index in 0..=255u8 {
        assert!(cpu.registers().get(index) <= REGISTER_MASK);
    }
    assert!(cpu.pc_bank() < 16);
});
