//! Tests for page-table protection and page-fault dispatch.

use bank16::{
    assemble, Address, Exception, FlatMemory, InterruptEntry, MemoryBus, PageEntry, Register, CPU,
};

const PAGE_TABLE: u16 = 0x0100;
const INTERRUPT_TABLE: u16 = 0x0200;
const HANDLER: u16 = 0x6000;

/// CPU with the program at 0:1000, a permissive page table, an EXCEPT handler
/// at 0:6000 and both the MMU and interrupts enabled.
fn protected_cpu(source: &str) -> CPU<FlatMemory> {
    let output = assemble(source, Address::new(0, 0x1000)).unwrap();
    let mut cpu = CPU::new(FlatMemory::new());
    cpu.load(output.origin, &output.bytes);

    cpu.load(Address::new(0, PAGE_TABLE), &[PageEntry::ALL.0; 256]);
    let handler = InterruptEntry {
        target: Address::new(0, HANDLER),
        clear_int: false,
        clear_mmu: false,
    };
    cpu.load(Address::new(0, INTERRUPT_TABLE), &handler.encode());

    cpu.set_reg(Register::MmuP, PAGE_TABLE as u32);
    cpu.set_reg(Register::IntP, INTERRUPT_TABLE as u32);
    cpu.set_reg(Register::MmuE, 1);
    cpu.set_reg(Register::IntL, 1);
    cpu
}

fn set_page(cpu: &mut CPU<FlatMemory>, index: u8, entry: PageEntry) {
    cpu.memory_mut().write(PAGE_TABLE + index as u16, 0, entry.0);
}

// ========== Permitted Access ==========

#[test]
fn test_permitted_accesses_run_normally() {
    let mut cpu = protected_cpu("imm.b r0, b 7\nsto.b [20480], r0\nlod.b r2, [20480]\n");
    cpu.run(3).unwrap();

    assert_eq!(cpu.reg(Register::R2), 7);
    assert_eq!(cpu.exception(), Exception::None);
    assert_eq!(cpu.pc(), 0x100D);
}

#[test]
fn test_disabled_mmu_ignores_table() {
    let mut cpu = protected_cpu("lod.b r2, [42]\n");
    cpu.load(Address::new(0, PAGE_TABLE), &[0; 256]);
    cpu.set_reg(Register::MmuE, 0);
    cpu.memory_mut().write(42, 0, 0x2A);

    cpu.step().unwrap();

    assert_eq!(cpu.reg(Register::R2), 0x2A);
    assert_eq!(cpu.exception(), Exception::None);
}

#[test]
fn test_page_entry_lookup() {
    let mut cpu = protected_cpu("nop\n");
    set_page(&mut cpu, 48, PageEntry(PageEntry::READ));
    assert_eq!(cpu.page_entry_at(Address::new(3, 0x0010)), PageEntry(PageEntry::READ));
    assert_eq!(cpu.page_entry(47), PageEntry::ALL);
}

// ========== Violations ==========

#[test]
fn test_read_violation() {
    let mut cpu = protected_cpu("lod.b r2, [20480]\n");
    set_page(&mut cpu, 5, PageEntry(PageEntry::EXEC | PageEntry::WRITE));
    cpu.set_reg(Register::R2, 0x77);

    cpu.step().unwrap();

    assert_eq!(cpu.exception(), Exception::PageAccessViolation);
    assert_eq!(cpu.reg(Register::R0), 0x5000);
    assert_eq!(cpu.reg(Register::R1), 0);
    assert_eq!(cpu.reg(Register::R2), 0x77);
    assert_eq!(cpu.reg(Register::RtiP), 0x1005);
    assert_eq!(cpu.reg(Register::RtiB), 0);
    assert_eq!(cpu.pc_address(), Address::new(0, HANDLER));
    assert!(cpu.mmu_enabled());
    assert!(cpu.interrupts_enabled());
}

#[test]
fn test_write_violation_reports_bank() {
    let mut cpu = protected_cpu("sto.b [3: 16], r3\n");
    set_page(&mut cpu, 48, PageEntry(PageEntry::READ | PageEntry::EXEC));
    cpu.set_reg(Register::R3, 0xAA);

    cpu.step().unwrap();

    assert_eq!(cpu.exception(), Exception::PageAccessViolation);
    assert_eq!(cpu.reg(Register::R0), 16);
    assert_eq!(cpu.reg(Register::R1), 3);
    assert_eq!(cpu.memory().read(16, 3), 0);
    assert_eq!(cpu.pc(), HANDLER);
}

#[test]
fn test_exec_violation_on_fetch() {
    let mut cpu = protected_cpu("nop\n");
    set_page(&mut cpu, 1, PageEntry(PageEntry::READ | PageEntry::WRITE));

    assert_eq!(cpu.step(), Ok(()));

    assert_eq!(cpu.exception(), Exception::PageAccessViolation);
    assert_eq!(cpu.reg(Register::R0), 0x1000);
    assert_eq!(cpu.reg(Register::R1), 0);
    assert_eq!(cpu.reg(Register::RtiP), 0x1001);
    assert_eq!(cpu.pc(), HANDLER);
}

#[test]
fn test_exec_violation_inside_operand() {
    // imm.w straddles into page 2, which is not executable
    let mut cpu = protected_cpu("");
    cpu.load(Address::new(0, 0x1FFE), &[0x03, 0x10, 0x34, 0x12]);
    cpu.set_reg(Register::Pc, 0x1FFE);
    set_page(&mut cpu, 2, PageEntry(PageEntry::READ));

    cpu.step().unwrap();

    assert_eq!(cpu.exception(), Exception::PageAccessViolation);
    assert_eq!(cpu.reg(Register::R0), 0x2000);
    assert_eq!(cpu.pc(), HANDLER);
}

#[test]
fn test_word_load_faults_on_second_byte() {
    let mut cpu = protected_cpu("lod.w r2, [4095]\n");
    set_page(&mut cpu, 1, PageEntry(PageEntry::EXEC));
    cpu.set_reg(Register::R2, 0x55);

    cpu.step().unwrap();

    assert_eq!(cpu.reg(Register::R0), 0x1000);
    assert_eq!(cpu.reg(Register::R2), 0x55);
    assert_eq!(cpu.exception(), Exception::PageAccessViolation);
}

#[test]
fn test_word_store_keeps_first_byte_on_fault() {
    let mut cpu = protected_cpu("sto.w [4095], r3\n");
    set_page(&mut cpu, 1, PageEntry(PageEntry::EXEC | PageEntry::READ));
    cpu.set_reg(Register::R3, 0xBEEF);

    cpu.step().unwrap();

    assert_eq!(cpu.memory().read(0x0FFF, 0), 0xEF);
    assert_eq!(cpu.memory().read(0x1000, 0), 0x07);
    assert_eq!(cpu.reg(Register::R0), 0x1000);
}

#[test]
fn test_handler_entry_can_disable_mmu() {
    let mut cpu = protected_cpu("lod.b r2, [20480]\n");
    set_page(&mut cpu, 5, PageEntry(0));
    let handler = InterruptEntry {
        target: Address::new(0, HANDLER),
        clear_int: true,
        clear_mmu: true,
    };
    cpu.load(Address::new(0, INTERRUPT_TABLE), &handler.encode());

    cpu.step().unwrap();

    assert!(!cpu.mmu_enabled());
    assert!(!cpu.interrupts_enabled());
    assert_eq!(cpu.exception(), Exception::PageAccessViolation);
    assert_eq!(cpu.pc(), HANDLER);
}

// ========== Program-enabled MMU ==========

#[test]
fn test_program_enables_mmu_then_faults() {
    let mut cpu = protected_cpu("imm.b mmue, b 1\nlod.b r2, [42]\n");
    cpu.set_reg(Register::MmuE, 0);
    cpu.load(Address::new(0, PAGE_TABLE), &[0; 256]);
    set_page(&mut cpu, 1, PageEntry(PageEntry::EXEC));
    set_page(&mut cpu, 6, PageEntry(PageEntry::EXEC));

    cpu.step().unwrap();
    assert!(cpu.mmu_enabled());

    cpu.step().unwrap();
    assert_eq!(cpu.exception(), Exception::PageAccessViolation);
    assert_eq!(cpu.reg(Register::R0), 42);
    assert_eq!(cpu.reg(Register::R1), 0);
    assert_eq!(cpu.reg(Register::RtiP), 0x1008);
    assert_eq!(cpu.pc(), HANDLER);
}

#[test]
fn test_fault_without_interrupts_resets() {
    let mut cpu = protected_cpu("imm.b mmue, b 1\nlod.b r2, [42]\n");
    cpu.set_reg(Register::MmuE, 0);
    cpu.set_reg(Register::IntL, 0);
    cpu.load(Address::new(0, PAGE_TABLE), &[0; 256]);
    set_page(&mut cpu, 1, PageEntry(PageEntry::EXEC));

    cpu.run(2).unwrap();

    // No interrupt handling: the machine resets and records NOINTH
    assert_eq!(cpu.exception(), Exception::NoInterruptHandler);
    assert_eq!(cpu.reg(Register::R0), 42);
    assert_eq!(cpu.reg(Register::R1), 0);
    assert!(!cpu.mmu_enabled());
    assert_eq!(cpu.pc_address(), Address::new(0, 0x1000));
}
