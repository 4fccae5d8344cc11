//! # CPU State and Execution
//!
//! This module contains the CPU struct representing the processor state and
//! the fetch-decode-execute loop.
//!
//! ## CPU State
//!
//! The CPU maintains:
//! - **Register file**: 256 slots, see [`crate::registers`]
//! - **Memory bus**: any [`MemoryBus`] implementation, owned by the CPU
//! - **Step counter**: number of instruction attempts since construction
//!
//! ## Execution Model
//!
//! - `step()`: attempt one instruction
//! - `run()`: step until a budget is exhausted or a decode error occurs
//!
//! Every operand byte is fetched before an instruction changes any state. If a
//! fetch, load or store faults, the fault is dispatched through the interrupt
//! table immediately and the instruction is abandoned; it is never resumed.

use tracing::{debug, trace, warn};

use crate::addressing::{AddressHeader, AddressingMode, SourceType};
use crate::interrupts::{entry_offset, Exception, InterruptEntry, INTR_EXCEPT};
use crate::memory::page;
use crate::{
    instructions, Access, Address, CpuConfig, ExecutionError, Fault, MemoryBus, PageEntry,
    Register, RegisterFile, OPCODE_TABLE,
};

/// FL bit set by `sez`, cleared by `clz`, toggled by `inz`.
pub const FLAG_ZERO: u32 = 0b001;
/// Reserved FL bit.
pub const FLAG_OVERFLOW: u32 = 0b010;
/// Reserved FL bit.
pub const FLAG_UNDERFLOW: u32 = 0b100;

/// Offset of the first instruction after reset (page 1 of bank 0).
pub const RESET_PC: u16 = page(1);

/// CPU state and execution context.
///
/// The CPU owns the register file and the memory bus. It is generic over the
/// memory implementation via the `MemoryBus` trait.
///
/// # Examples
///
/// ```
/// use bank16::{FlatMemory, Register, CPU};
///
/// let cpu = CPU::new(FlatMemory::new());
///
/// assert_eq!(cpu.pc(), 0x1000);
/// assert_eq!(cpu.pc_bank(), 0);
/// assert!(!cpu.mmu_enabled());
/// assert!(!cpu.interrupts_enabled());
/// assert_eq!(cpu.reg(Register::R0), 0);
/// ```
pub struct CPU<M: MemoryBus> {
    /// Register slots
    pub(crate) regs: RegisterFile,

    /// Instruction attempts since construction
    pub(crate) steps: u64,

    pub(crate) config: CpuConfig,

    /// Memory bus implementation
    pub(crate) memory: M,
}

impl<M: MemoryBus> CPU<M> {
    /// Creates a new CPU with the given memory bus and default configuration.
    ///
    /// All registers start at zero, then `reset()` runs: PC = 0x1000 in bank 0,
    /// MMU and interrupts disabled.
    pub fn new(memory: M) -> Self {
        Self::with_config(memory, CpuConfig::default())
    }

    /// Creates a new CPU with an explicit configuration.
    pub fn with_config(memory: M, config: CpuConfig) -> Self {
        let mut cpu = Self {
            regs: RegisterFile::new(),
            steps: 0,
            config,
            memory,
        };
        cpu.reset();
        cpu
    }

    /// Restores the control registers to their power-on values.
    ///
    /// PCb = 0, PC = 0x1000, EXC = 0, MMUe = 0, INTl = 0, FL = 0. General
    /// registers and the page/interrupt table pointers keep their values.
    pub fn reset(&mut self) {
        self.regs.set_reg(Register::Pcb, 0);
        self.regs.set_reg(Register::Pc, RESET_PC as u32);
        self.regs.set_reg(Register::Exc, Exception::NONE);
        self.regs.set_reg(Register::MmuE, 0);
        self.regs.set_reg(Register::IntL, 0);
        self.regs.set_reg(Register::Fl, 0);
    }

    /// Executes one instruction attempt.
    ///
    /// 1. Fetch the opcode byte (exec-protected); a fetch fault ends the step
    /// 2. Decode it through `OPCODE_TABLE` and run the instruction
    /// 3. Poll the memory bus for a peripheral interrupt request
    ///
    /// # Returns
    ///
    /// - `Ok(())` when the instruction ran, was dropped by a register lock, or was
    ///   abandoned because of a simulated fault
    /// - `Err(ExecutionError)` when the opcode is reserved or illegal; PC has moved
    ///   past the opcode byte only
    ///
    /// # Examples
    ///
    /// ```
    /// use bank16::{Address, ExecutionError, FlatMemory, CPU};
    ///
    /// let mut cpu = CPU::new(FlatMemory::new());
    /// cpu.load(Address::new(0, 0x1000), &[0x60, 0x80, 0x00, 0x20]); // jmp [8192]
    ///
    /// assert_eq!(cpu.step(), Err(ExecutionError::UnimplementedOpcode(0x60)));
    /// assert_eq!(cpu.pc(), 0x1001);
    /// ```
    pub fn step(&mut self) -> Result<(), ExecutionError> {
        self.steps += 1;

        let result = match self.fetch_byte() {
            Ok(opcode) => self.execute(opcode),
            Err(fault) => {
                debug!(%fault, "opcode fetch faulted");
                Ok(())
            }
        };

        if let Some(kind) = self.memory.take_interrupt() {
            debug!(kind, "peripheral interrupt request");
            self.trigger_interrupt(kind);
        }

        result
    }

    /// Steps until `max_steps` attempts have been made or an instruction fails to decode.
    ///
    /// Returns the number of steps taken.
    pub fn run(&mut self, max_steps: u64) -> Result<u64, ExecutionError> {
        let start = self.steps;
        while self.steps - start < max_steps {
            self.step()?;
        }
        Ok(self.steps - start)
    }

    fn execute(&mut self, opcode: u8) -> Result<(), ExecutionError> {
        use crate::opcodes::*;
        use instructions::{alu, flags, load_store, shifts, transfer};

        let metadata = &OPCODE_TABLE[opcode as usize];
        trace!(
            pc = self.pc().wrapping_sub(1),
            bank = self.pc_bank(),
            opcode,
            mnemonic = metadata.mnemonic,
            "execute"
        );

        let outcome = match opcode {
            NOP => Ok(()),
            MOV => transfer::execute_mov(self),
            IMM_B => transfer::execute_imm_b(self),
            IMM_W => transfer::execute_imm_w(self),
            CLR => transfer::execute_clr(self),
            LOD_B => load_store::execute_lod_b(self),
            LOD_W => load_store::execute_lod_w(self),
            STO_B => load_store::execute_sto_b(self),
            STO_W => load_store::execute_sto_w(self),
            ADDI_B => alu::execute_addi_b(self),
            ADDI_W => alu::execute_addi_w(self),
            ADD => alu::execute_add(self),
            SUBI_B => alu::execute_subi_b(self),
            SUBI_W => alu::execute_subi_w(self),
            SUB => alu::execute_sub(self),
            NOT => alu::execute_not(self),
            AND => alu::execute_and(self),
            ANDI_B => alu::execute_andi_b(self),
            ANDI_W => alu::execute_andi_w(self),
            ORR => alu::execute_orr(self),
            XOR => alu::execute_xor(self),
            SL4 => shifts::execute_sl4(self),
            SR4 => shifts::execute_sr4(self),
            SHL => shifts::execute_shl(self),
            SHLI_B => shifts::execute_shli_b(self),
            SHR => shifts::execute_shr(self),
            SHRI_B => shifts::execute_shri_b(self),
            SEZ => flags::execute_sez(self),
            CLZ => flags::execute_clz(self),
            INZ => flags::execute_inz(self),
            _ if metadata.is_defined() => {
                warn!(opcode, mnemonic = metadata.mnemonic, "reserved opcode executed");
                return Err(ExecutionError::UnimplementedOpcode(opcode));
            }
            _ => {
                warn!(opcode, "illegal opcode executed");
                return Err(ExecutionError::IllegalOpcode(opcode));
            }
        };

        if let Err(fault) = outcome {
            debug!(%fault, mnemonic = metadata.mnemonic, "instruction abandoned");
        }
        Ok(())
    }

    // ========== Instruction Stream ==========

    /// Fetches the byte at PCb:PC and advances PC, checking the exec permission.
    ///
    /// PC advances (wrapping at 16 bits) even when the fetch faults.
    pub fn fetch_byte(&mut self) -> Result<u8, Fault> {
        let address = self.pc_address();
        self.regs
            .set_reg(Register::Pc, address.offset.wrapping_add(1) as u32);
        self.check_access(address, Access::Execute)?;
        Ok(self.memory.read(address.offset, address.bank))
    }

    /// Fetches a little-endian 16-bit word from the instruction stream.
    pub fn fetch_word(&mut self) -> Result<u16, Fault> {
        let low = self.fetch_byte()?;
        let high = self.fetch_byte()?;
        Ok(u16::from_le_bytes([low, high]))
    }

    /// Fetches a memory operand (header and source) and resolves it.
    pub fn fetch_address(&mut self) -> Result<Address, Fault> {
        let header = AddressHeader::decode(self.fetch_byte()?);
        let source = match header.source {
            SourceType::Register => {
                let index = self.fetch_byte()?;
                self.regs.get(index) as u16
            }
            SourceType::Immediate => self.fetch_word()?,
        };
        Ok(self.effective_address(header, source))
    }

    /// Computes the effective address for a decoded header and source value.
    ///
    /// Relative modes use the current register values, so for pc-relative
    /// operands PC is the address just past the memory operand.
    pub fn effective_address(&self, header: AddressHeader, source: u16) -> Address {
        let offset_by = |base: u32| {
            let base = base as u16;
            if header.negative() {
                base.wrapping_sub(source)
            } else {
                base.wrapping_add(source)
            }
        };

        match header.mode {
            AddressingMode::Absolute => Address::new(header.field, source),
            AddressingMode::PcRelative => Address::new(
                self.regs.reg(Register::Pcb) as u8,
                offset_by(self.regs.reg(Register::Pc)),
            ),
            // Stack and indexed operands are always in bank 0.
            AddressingMode::SpRelative => Address::new(0, offset_by(self.regs.reg(Register::Sp))),
            AddressingMode::PageTableRelative => Address::new(
                self.regs.reg(Register::MmuB) as u8,
                (self.regs.reg(Register::MmuP) as u16).wrapping_add(source),
            ),
            AddressingMode::InterruptTableRelative => Address::new(
                self.regs.reg(Register::IntB) as u8,
                (self.regs.reg(Register::IntP) as u16).wrapping_add(source),
            ),
            AddressingMode::Indexed => {
                let index = self.regs.get(Register::R0 as u8 + header.field) as u16;
                Address::new(0, source.wrapping_add(index))
            }
            AddressingMode::Undefined(_) => Address::new(0, 0),
        }
    }

    // ========== Protected Memory Access ==========

    /// Reads a byte, checking the read permission when the MMU is enabled.
    pub fn read_protected(&mut self, address: Address) -> Result<u8, Fault> {
        self.check_access(address, Access::Read)?;
        Ok(self.memory.read(address.offset, address.bank))
    }

    /// Writes a byte, checking the write permission when the MMU is enabled.
    pub fn write_protected(&mut self, address: Address, value: u8) -> Result<(), Fault> {
        self.check_access(address, Access::Write)?;
        self.memory.write(address.offset, address.bank, value);
        Ok(())
    }

    fn check_access(&mut self, address: Address, access: Access) -> Result<(), Fault> {
        if !self.mmu_enabled() || self.page_entry_at(address).allows(access) {
            return Ok(());
        }

        debug!(%address, %access, "page access violation");
        self.page_fault(address);
        Err(Fault::PageAccessViolation { address, access })
    }

    /// Reads the page-table entry for global page `index` (unprotected).
    pub fn page_entry(&self, index: u8) -> PageEntry {
        let offset = (self.regs.reg(Register::MmuP) as u16).wrapping_add(index as u16);
        let bank = self.regs.reg(Register::MmuB) as u8;
        PageEntry(self.memory.read(offset, bank))
    }

    /// Reads the page-table entry covering `address`.
    pub fn page_entry_at(&self, address: Address) -> PageEntry {
        self.page_entry(address.page_index())
    }

    // ========== Interrupts ==========

    /// Dispatches interrupt `kind` through the interrupt table.
    ///
    /// - Interrupts disabled: the machine resets and EXC becomes NOINTH
    /// - Otherwise PC/PCb are saved to RTIp/RTIb, the entry's clear flags are
    ///   applied and control jumps to the entry's target
    /// - An uninstalled entry (target `0:0000`) sets EXC to NOINTH and
    ///   re-dispatches as EXCEPT, at most `interrupt_chain_limit` times before
    ///   falling back to a reset
    pub fn trigger_interrupt(&mut self, kind: u8) {
        let mut kind = kind;
        let mut chained = 0;

        loop {
            if !self.interrupts_enabled() {
                warn!(kind, "interrupt raised with interrupts disabled, resetting");
                self.reset_with_exception();
                return;
            }

            self.regs
                .set_reg(Register::RtiB, self.regs.reg(Register::Pcb));
            self.regs.set_reg(Register::RtiP, self.regs.reg(Register::Pc));

            let entry = self.interrupt_entry(kind);
            if entry.clear_mmu {
                self.regs.set_reg(Register::MmuE, 0);
            }
            if entry.clear_int {
                self.regs.set_reg(Register::IntL, 0);
            }

            if !entry.is_sentinel() {
                debug!(kind, target = %entry.target, "interrupt dispatched");
                self.regs
                    .set_reg(Register::Pcb, entry.target.bank as u32);
                self.regs
                    .set_reg(Register::Pc, entry.target.offset as u32);
                return;
            }

            self.set_exception(Exception::NoInterruptHandler);
            if chained >= self.config.interrupt_chain_limit {
                warn!(kind, "no handler for exception, resetting");
                self.reset_with_exception();
                return;
            }
            chained += 1;
            kind = INTR_EXCEPT;
        }
    }

    fn reset_with_exception(&mut self) {
        self.reset();
        self.set_exception(Exception::NoInterruptHandler);
    }

    /// Reads the interrupt-table entry for `kind` (unprotected).
    pub fn interrupt_entry(&self, kind: u8) -> InterruptEntry {
        let base = (self.regs.reg(Register::IntP) as u16).wrapping_add(entry_offset(kind));
        let bank = self.regs.reg(Register::IntB) as u8;
        let mut bytes = [0u8; 3];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = self.memory.read(base.wrapping_add(i as u16), bank);
        }
        InterruptEntry::decode(bytes)
    }

    /// Raises a page-access violation for `address`: EXC = PAGEAV, R0 = offset,
    /// R1 = bank, then dispatches EXCEPT.
    pub fn page_fault(&mut self, address: Address) {
        self.set_exception(Exception::PageAccessViolation);
        self.regs.set_reg(Register::R0, address.offset as u32);
        self.regs.set_reg(Register::R1, address.bank as u32);
        self.trigger_interrupt(INTR_EXCEPT);
    }

    // ========== Register Writes From Instructions ==========

    /// True when instructions may not write the register selected by `index`.
    ///
    /// INTl is always locked. MMUb, MMUp and MMUe are locked while MMUe is set.
    /// INTb, INTp and INTl are locked while INTl is set.
    pub fn is_register_locked(&self, index: u8) -> bool {
        match Register::from_index(index) {
            Some(Register::IntL) => true,
            Some(Register::MmuB | Register::MmuP | Register::MmuE) => self.mmu_enabled(),
            Some(Register::IntB | Register::IntP) => self.interrupts_enabled(),
            _ => false,
        }
    }

    /// Writes an instruction's destination register, dropping the write if locked.
    pub(crate) fn write_destination(&mut self, index: u8, value: u32) {
        if self.is_register_locked(index) {
            debug!(register = index, value, "write to locked register dropped");
            return;
        }
        self.regs.set(index, value);
    }

    // ========== Register Getters / Setters ==========

    /// Returns a named register's value.
    pub fn reg(&self, reg: Register) -> u32 {
        self.regs.reg(reg)
    }

    /// Sets a named register directly, bypassing the register lock.
    pub fn set_reg(&mut self, reg: Register, value: u32) {
        self.regs.set_reg(reg, value);
    }

    /// Returns the register file.
    pub fn registers(&self) -> &RegisterFile {
        &self.regs
    }

    /// Returns the register file for host-side modification (no lock checks).
    pub fn registers_mut(&mut self) -> &mut RegisterFile {
        &mut self.regs
    }

    /// Returns the program counter offset.
    pub fn pc(&self) -> u16 {
        self.regs.reg(Register::Pc) as u16
    }

    /// Returns the program counter bank.
    pub fn pc_bank(&self) -> u8 {
        (self.regs.reg(Register::Pcb) & 0x0F) as u8
    }

    /// Returns the address of the next instruction byte.
    pub fn pc_address(&self) -> Address {
        Address::new(self.pc_bank(), self.pc())
    }

    /// Returns the stack pointer.
    pub fn sp(&self) -> u16 {
        self.regs.reg(Register::Sp) as u16
    }

    /// Returns the EXC register interpreted as an exception code.
    pub fn exception(&self) -> Exception {
        Exception::from_code(self.regs.reg(Register::Exc))
    }

    pub(crate) fn set_exception(&mut self, exception: Exception) {
        self.regs.set_reg(Register::Exc, exception.code());
    }

    /// Returns true if the FL zero bit is set.
    pub fn flag_zero(&self) -> bool {
        self.regs.reg(Register::Fl) & FLAG_ZERO != 0
    }

    /// Returns true while MMUe is non-zero.
    pub fn mmu_enabled(&self) -> bool {
        self.regs.reg(Register::MmuE) != 0
    }

    /// Returns true while INTl is non-zero.
    pub fn interrupts_enabled(&self) -> bool {
        self.regs.reg(Register::IntL) != 0
    }

    /// Returns the number of step attempts since construction.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn config(&self) -> &CpuConfig {
        &self.config
    }

    // ========== Memory Access ==========

    /// Returns a reference to the memory bus.
    pub fn memory(&self) -> &M {
        &self.memory
    }

    /// Returns a mutable reference to the memory bus.
    pub fn memory_mut(&mut self) -> &mut M {
        &mut self.memory
    }

    /// Writes `bytes` through the bus starting at `address` (unprotected).
    pub fn load(&mut self, address: Address, bytes: &[u8]) {
        let mut at = address;
        for &byte in bytes {
            self.memory.write(at.offset, at.bank, byte);
            at = at.wrapping_add(1);
        }
    }
}
