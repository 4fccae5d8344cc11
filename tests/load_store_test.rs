//! Tests for lod/sto and every addressing mode they accept.

use bank16::{assemble_line, Address, FlatMemory, MemoryBus, Register, CPU};

fn setup_cpu(setup: &[(Register, u32)], line: &str) -> CPU<FlatMemory> {
    let mut cpu = CPU::new(FlatMemory::new());
    for &(reg, value) in setup {
        cpu.set_reg(reg, value);
    }
    cpu.load(Address::new(0, 0x1000), &assemble_line(line).unwrap());
    cpu
}

fn load_byte(setup: &[(Register, u32)], line: &str, at: Address, value: u8) -> u32 {
    let mut cpu = setup_cpu(setup, line);
    cpu.memory_mut().write(at.offset, at.bank, value);
    cpu.step().unwrap();
    cpu.reg(Register::R2)
}

// ========== Loads ==========

#[test]
fn test_lod_b_absolute() {
    let mut cpu = setup_cpu(&[], "lod.b r2, [42]");
    cpu.memory_mut().write(42, 0, 0x5A);
    cpu.step().unwrap();

    assert_eq!(cpu.reg(Register::R2), 0x5A);
    assert_eq!(cpu.pc(), 0x1005);
}

#[test]
fn test_lod_b_replaces_whole_register() {
    let value = load_byte(&[(Register::R2, 0xF_FFFF)], "lod.b r2, [42]", Address::new(0, 42), 1);
    assert_eq!(value, 1);
}

#[test]
fn test_lod_w_little_endian() {
    let mut cpu = setup_cpu(&[], "lod.w r2, [5: 256]");
    cpu.memory_mut().write(0x0100, 5, 0x34);
    cpu.memory_mut().write(0x0101, 5, 0x12);
    cpu.step().unwrap();
    assert_eq!(cpu.reg(Register::R2), 0x1234);
}

#[test]
fn test_lod_w_wraps_within_bank() {
    let mut cpu = setup_cpu(&[], "lod.w r2, [1: 65535]");
    cpu.memory_mut().write(0xFFFF, 1, 0xCD);
    cpu.memory_mut().write(0x0000, 1, 0xAB);
    cpu.memory_mut().write(0x0000, 2, 0xEE);
    cpu.step().unwrap();
    assert_eq!(cpu.reg(Register::R2), 0xABCD);
}

// ========== Stores ==========

#[test]
fn test_sto_b_writes_low_byte() {
    let mut cpu = setup_cpu(&[(Register::R0, 0x1234)], "sto.b [3: 16], r0");
    cpu.step().unwrap();
    assert_eq!(cpu.memory().read(16, 3), 0x34);
    assert_eq!(cpu.memory().read(17, 3), 0x00);
    assert_eq!(cpu.pc(), 0x1005);
}

#[test]
fn test_sto_w_writes_low_word() {
    let mut cpu = setup_cpu(&[(Register::R1, 0xA_BEEF)], "sto.w [8192], r1");
    cpu.step().unwrap();
    assert_eq!(cpu.memory().read(0x2000, 0), 0xEF);
    assert_eq!(cpu.memory().read(0x2001, 0), 0xBE);
    assert_eq!(cpu.memory().read(0x2002, 0), 0x00);
}

#[test]
fn test_store_can_overwrite_following_code() {
    // The address resolves before the source byte is fetched, so pc + 1 is the next opcode
    let mut cpu = setup_cpu(&[(Register::R0, 0x13)], "sto.b [pc + 1], r0");
    cpu.step().unwrap();
    assert_eq!(cpu.memory().read(0x1005, 0), 0x13);
    cpu.step().unwrap();
    assert!(cpu.flag_zero());
}

// ========== Addressing Modes ==========

#[test]
fn test_absolute_register_source() {
    let value = load_byte(
        &[(Register::R4, 0x0200)],
        "lod.b r2, [7: r4]",
        Address::new(7, 0x0200),
        0x77,
    );
    assert_eq!(value, 0x77);
}

#[test]
fn test_register_source_uses_low_16_bits() {
    let value = load_byte(
        &[(Register::R4, 0xF_0010)],
        "lod.b r2, [r4]",
        Address::new(0, 0x0010),
        0x42,
    );
    assert_eq!(value, 0x42);
}

#[test]
fn test_pc_relative_uses_pc_after_operand() {
    // Instruction is 5 bytes, so PC is 0x1005 when the offset is applied
    let value = load_byte(&[], "lod.b r2, [pc + 10]", Address::new(0, 0x100F), 0xA1);
    assert_eq!(value, 0xA1);
}

#[test]
fn test_pc_relative_negative() {
    let mut cpu = setup_cpu(&[], "lod.b r2, [pc - 5]");
    cpu.step().unwrap();
    // Reads back its own opcode byte
    assert_eq!(cpu.reg(Register::R2), 0x04);
}

#[test]
fn test_pc_relative_uses_pc_bank() {
    let mut cpu = CPU::new(FlatMemory::new());
    cpu.set_reg(Register::Pcb, 2);
    cpu.load(Address::new(2, 0x1000), &assemble_line("lod.b r2, [pc + 1]").unwrap());
    cpu.memory_mut().write(0x1006, 2, 0x62);
    cpu.memory_mut().write(0x1006, 0, 0x60);
    cpu.step().unwrap();
    assert_eq!(cpu.reg(Register::R2), 0x62);
}

#[test]
fn test_sp_relative() {
    let setup = [(Register::Sp, 0x0800)];
    assert_eq!(
        load_byte(&setup, "lod.b r2, [sp + 4]", Address::new(0, 0x0804), 0x11),
        0x11
    );
    assert_eq!(
        load_byte(&setup, "lod.b r2, [sp - 1]", Address::new(0, 0x07FF), 0x22),
        0x22
    );
}

#[test]
fn test_sp_relative_wraps_in_bank_0() {
    let value = load_byte(
        &[(Register::Sp, 0), (Register::Pcb, 0)],
        "lod.b r2, [sp - 1]",
        Address::new(0, 0xFFFF),
        0x33,
    );
    assert_eq!(value, 0x33);
}

#[test]
fn test_page_table_relative() {
    let setup = [(Register::MmuB, 4), (Register::MmuP, 0x0100)];
    let value = load_byte(&setup, "lod.b r2, [pt + 3]", Address::new(4, 0x0103), 0x44);
    assert_eq!(value, 0x44);
}

#[test]
fn test_interrupt_table_relative() {
    let setup = [(Register::IntB, 5), (Register::IntP, 0x0200)];
    let value = load_byte(&setup, "lod.b r2, [it + 2]", Address::new(5, 0x0202), 0x55);
    assert_eq!(value, 0x55);
}

#[test]
fn test_indexed() {
    let setup = [(Register::R3, 0x0100)];
    let value = load_byte(&setup, "lod.b r2, [r3 + 5]", Address::new(0, 0x0105), 0x66);
    assert_eq!(value, 0x66);
}

#[test]
fn test_indexed_register_source() {
    let setup = [(Register::R3, 0x0100), (Register::R4, 0x0020)];
    let value = load_byte(&setup, "lod.b r2, [r3 + r4]", Address::new(0, 0x0120), 0x67);
    assert_eq!(value, 0x67);
}

#[test]
fn test_indexed_wraps() {
    let setup = [(Register::R0, 0xFFFF)];
    let value = load_byte(&setup, "lod.b r2, [r0 + 2]", Address::new(0, 0x0001), 0x68);
    assert_eq!(value, 0x68);
}

#[test]
fn test_undefined_mode_resolves_to_zero() {
    let mut cpu = CPU::new(FlatMemory::new());
    // lod.b r2 with mode bits 110 and an immediate source
    cpu.load(Address::new(0, 0x1000), &[0x04, 0x12, 0xE0, 0x34, 0x12]);
    cpu.memory_mut().write(0x0000, 0, 0x99);
    cpu.memory_mut().write(0x1234, 0, 0x11);
    cpu.step().unwrap();
    assert_eq!(cpu.reg(Register::R2), 0x99);
    assert_eq!(cpu.pc(), 0x1005);
}
