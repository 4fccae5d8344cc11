//! # Banked 8/16-bit CPU Simulator and Assembler
//!
//! An instruction-set simulator for a small 8/16-bit processor with 16 banks of
//! paged memory, an optional MMU with per-page permissions, and an interrupt
//! table, together with the assembler and disassembler that share its
//! instruction encoding.
//!
//! ## Quick Start
//!
//! ```rust
//! use bank16::{assemble_line, Address, FlatMemory, Register, CPU};
//!
//! let mut program = Vec::new();
//! for line in ["imm.b r0, b 5", "imm.b r1, b 3", "add r0, r1"] {
//!     program.extend(assemble_line(line).unwrap());
//! }
//!
//! // Execution starts at page 1 of bank 0 after reset
//! let mut cpu = CPU::new(FlatMemory::new());
//! cpu.load(Address::new(0, 0x1000), &program);
//!
//! for _ in 0..3 {
//!     cpu.step().unwrap();
//! }
//! assert_eq!(cpu.reg(Register::R0), 8);
//! ```
//!
//! ## Architecture
//!
//! - **Register file**: 256 indexed 20-bit slots, 22 of them named
//! - **Memory bus**: the `MemoryBus` trait keyed by `(offset, bank)`; `MappedMemory`
//!   routes pages to RAM and peripheral `Device`s
//! - **MMU**: page permissions checked on every fetch, load and store while enabled
//! - **Interrupts**: faults and peripheral requests dispatch through a memory-resident table
//! - **Assembler / disassembler**: text to bytes and back, driven by `OPCODE_TABLE`
//!
//! ## Modules
//!
//! - `cpu` - CPU state and the fetch-decode-execute loop
//! - `registers` - register file and register names
//! - `memory` - MemoryBus trait, `Address`, flat memory
//! - `mmu` - page-table entries and access kinds
//! - `interrupts` - interrupt-table entries and exception codes
//! - `addressing` - memory-operand header encoding
//! - `opcodes` - opcode metadata table
//! - `assembler` / `disassembler` - text encoding and decoding
//! - `devices` - memory-mapped device support

pub mod addressing;
pub mod assembler;
pub mod config;
pub mod cpu;
pub mod devices;
pub mod disassembler;
pub mod interrupts;
pub mod memory;
pub mod mmu;
pub mod opcodes;
pub mod registers;

// Internal instruction implementations (not part of public API)
mod instructions;

#[cfg(feature = "wasm")]
pub mod wasm;

use thiserror::Error;

// Re-export public API
pub use addressing::{AddressHeader, AddressingMode, SourceType};
pub use assembler::{
    assemble, assemble_line, assemble_line_into, AssemblerError, AssemblerOutput, ErrorType,
};
pub use config::CpuConfig;
pub use cpu::CPU;
pub use devices::{Device, DeviceError, MappedMemory, RamDevice, TimerDevice, WritePort};
pub use disassembler::{
    disassemble, DisassemblyOptions, Instruction, MemoryOperand, MemorySource, Operand,
};
pub use interrupts::{Exception, InterruptEntry, INTR_EXCEPT};
pub use memory::{Address, FlatMemory, MemoryBus};
pub use mmu::{Access, PageEntry};
pub use opcodes::{OpcodeMetadata, OperandKind, OPCODE_TABLE};
pub use registers::{Register, RegisterFile};

/// Errors that `CPU::step` reports to the host.
///
/// Simulated faults (page violations, missing handlers) are not errors: they are
/// handled inside the machine and only show up as register state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    /// The opcode is reserved in the encoding table but has no behavior yet.
    ///
    /// Only the opcode byte was consumed, so the following bytes will be decoded
    /// as a new instruction if stepping continues.
    #[error("opcode 0x{0:02X} is reserved and not implemented")]
    UnimplementedOpcode(u8),

    /// The byte does not name any instruction.
    #[error("byte 0x{0:02X} is not a valid opcode")]
    IllegalOpcode(u8),
}

/// A simulated fault that aborted the current instruction.
///
/// By the time a `Fault` is returned the fault has already been dispatched
/// (registers updated, interrupt handler entered or machine reset). Callers must
/// stop the instruction and must not use any value produced alongside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Fault {
    /// A protected access hit a page without the required permission.
    #[error("{access} access to {address} denied by page table")]
    PageAccessViolation { address: Address, access: Access },
}
