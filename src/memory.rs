//! # Memory Bus Abstraction
//!
//! This module provides the `MemoryBus` trait that decouples the CPU from specific
//! memory implementations, and the `Address` type every access is expressed in.
//!
//! The address space is split into 16 banks of 65536 bytes. Each bank is consumed
//! in 4096-byte pages, which are the granularity of MMU permission checks.
//!
//! ## Design Principles
//!
//! - No bus errors: reads and writes always succeed at this layer
//! - Unmapped reads return 0, unmapped writes are ignored
//! - Protection lives in the CPU, not in the bus (see [`crate::mmu`])

/// Size of one page in bytes.
pub const PAGE_SIZE: u32 = 4096;

/// Number of addressable banks.
pub const BANK_COUNT: u8 = 16;

/// Size of one bank in bytes.
pub const BANK_SIZE: u32 = 0x1_0000;

/// Returns the base offset of page `id` within a bank.
///
/// # Examples
///
/// ```
/// use bank16::memory::page;
///
/// assert_eq!(page(1), 0x1000);
/// ```
pub const fn page(id: u16) -> u16 {
    id.wrapping_mul(PAGE_SIZE as u16)
}

/// A byte location in the simulated address space: a 4-bit bank and a 16-bit offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Address {
    /// Offset within the bank.
    pub offset: u16,
    /// Bank selector (0-15).
    pub bank: u8,
}

impl Address {
    /// Creates an address; the bank is truncated to 4 bits.
    pub const fn new(bank: u8, offset: u16) -> Self {
        Self {
            offset,
            bank: bank & 0x0F,
        }
    }

    /// Returns the 20-bit linear address `bank << 16 | offset`.
    pub const fn linear(self) -> u32 {
        ((self.bank as u32) << 16) | self.offset as u32
    }

    /// Returns the global page index (`linear / 4096`) used to look up page-table entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use bank16::Address;
    ///
    /// assert_eq!(Address::new(0, 0x1000).page_index(), 1);
    /// assert_eq!(Address::new(1, 0x0000).page_index(), 16);
    /// assert_eq!(Address::new(15, 0xFFFF).page_index(), 255);
    /// ```
    pub const fn page_index(self) -> u8 {
        (self.linear() / PAGE_SIZE) as u8
    }

    /// Returns the address `delta` bytes further on, wrapping within the bank.
    pub const fn wrapping_add(self, delta: u16) -> Self {
        Self {
            offset: self.offset.wrapping_add(delta),
            bank: self.bank,
        }
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:X}:{:04X}", self.bank, self.offset)
    }
}

/// Memory bus trait for CPU to read/write bytes.
///
/// Implementations provide the memory backend for the CPU. The CPU accesses RAM,
/// page tables, interrupt tables and memory-mapped peripherals through this
/// abstraction.
///
/// # Examples
///
/// ```
/// use bank16::{FlatMemory, MemoryBus};
///
/// let mut mem = FlatMemory::new();
/// mem.write(0x1234, 3, 0x42);
/// assert_eq!(mem.read(0x1234, 3), 0x42);
/// assert_eq!(mem.read(0x1234, 0), 0x00);
/// ```
pub trait MemoryBus {
    /// Reads a byte at `offset` in `bank`.
    ///
    /// Must never panic. Unmapped locations read as 0.
    fn read(&self, offset: u16, bank: u8) -> u8;

    /// Writes a byte at `offset` in `bank`.
    ///
    /// Must never panic. Writes to unmapped or read-only locations are ignored.
    fn write(&mut self, offset: u16, bank: u8, value: u8);

    /// Returns and clears the interrupt kind a peripheral is requesting, if any.
    ///
    /// The CPU polls this after every step and dispatches the request through the
    /// interrupt table. The default implementation has no interrupt sources.
    fn take_interrupt(&mut self) -> Option<u8> {
        None
    }
}

/// Flat memory backing all 16 banks with RAM (1 MiB).
///
/// Useful for tests and for hosts that do not need memory-mapped peripherals.
pub struct FlatMemory {
    data: Vec<u8>,
}

impl FlatMemory {
    /// Creates a new FlatMemory instance with all bytes initialized to zero.
    pub fn new() -> Self {
        Self {
            data: vec![0; (BANK_COUNT as u32 * BANK_SIZE) as usize],
        }
    }

    /// Copies `bytes` into memory starting at `address`, wrapping within the bank.
    pub fn load(&mut self, address: Address, bytes: &[u8]) {
        let mut at = address;
        for &byte in bytes {
            self.write(at.offset, at.bank, byte);
            at = at.wrapping_add(1);
        }
    }

    fn index(offset: u16, bank: u8) -> usize {
        Address::new(bank, offset).linear() as usize
    }
}

impl Default for FlatMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBus for FlatMemory {
    fn read(&self, offset: u16, bank: u8) -> u8 {
        self.data[Self::index(offset, bank)]
    }

    fn write(&mut self, offset: u16, bank: u8, value: u8) {
        self.data[Self::index(offset, bank)] = value;
    }
}
