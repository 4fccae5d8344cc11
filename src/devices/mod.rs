//! Memory-mapped device support.
//!
//! Devices are attached to the bus at a base address inside one bank. The CPU
//! only ever sees the `MemoryBus` view; `MappedMemory` routes each access to the
//! device covering it.
//!
//! # Architecture
//!
//! - **Device trait**: offset-based interface for memory-mapped hardware
//! - **MappedMemory**: routes `(offset, bank)` accesses to registered devices
//! - **Device implementations**: RAM, write-only register pages, the timer chip
//!
//! # Example
//!
//! ```rust
//! use bank16::devices::{TimerDevice, WritePort};
//! use bank16::{MappedMemory, MemoryBus, CPU};
//!
//! // RAM in pages 0-1, audio registers at 0x2000, timer at 0x3000
//! let memory = MappedMemory::standard(
//!     Box::new(WritePort::new(4096)),
//!     Box::new(TimerDevice::new()),
//! )
//! .unwrap();
//!
//! let cpu = CPU::new(memory);
//! assert_eq!(cpu.memory().read(0x4000, 0), 0);
//! ```

use thiserror::Error;
use tracing::trace;

use crate::memory::{page, Address, BANK_SIZE};
use crate::MemoryBus;

pub mod port;
pub mod ram;
pub mod timer;

pub use port::WritePort;
pub use ram::RamDevice;
pub use timer::TimerDevice;

/// Abstract interface for memory-mapped hardware devices.
///
/// The memory mapper calls these methods with offsets relative to the device's
/// base address (0 to size-1).
///
/// # Design
///
/// - **Offset-based**: Device receives offset, not absolute address
/// - **No panics**: All operations must succeed
/// - **Write-only registers** read back as 0
///
/// # Examples
///
/// ```rust
/// use bank16::Device;
///
/// struct SimpleRam {
///     data: Vec<u8>,
/// }
///
/// impl Device for SimpleRam {
///     fn read(&self, offset: u16) -> u8 {
///         self.data.get(offset as usize).copied().unwrap_or(0)
///     }
///
///     fn write(&mut self, offset: u16, value: u8) {
///         if let Some(byte) = self.data.get_mut(offset as usize) {
///             *byte = value;
///         }
///     }
///
///     fn size(&self) -> u32 {
///         self.data.len() as u32
///     }
/// }
/// ```
pub trait Device {
    /// Read byte from device at offset relative to device base address.
    fn read(&self, offset: u16) -> u8;

    /// Write byte to device at offset relative to device base address.
    fn write(&mut self, offset: u16, value: u8);

    /// Size of the device's address range in bytes (at most one bank).
    fn size(&self) -> u32;

    /// Advance device time by `micros` microseconds of host time.
    fn tick(&mut self, _micros: u64) {}

    /// Returns and clears a pending interrupt request (interrupt kind).
    fn take_interrupt(&mut self) -> Option<u8> {
        None
    }
}

/// Internal mapping of a device to a base address.
struct DeviceMapping {
    base: Address,
    device: Box<dyn Device>,
}

impl DeviceMapping {
    fn end(&self) -> u32 {
        self.base.offset as u32 + self.device.size()
    }

    fn offset_of(&self, address: Address) -> Option<u16> {
        if address.bank != self.base.bank {
            return None;
        }
        let at = address.offset as u32;
        (at >= self.base.offset as u32 && at < self.end()).then(|| address.offset - self.base.offset)
    }
}

/// Error returned when device registration fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    /// Address range overlaps with an existing device.
    #[error("device at {new_base} ({new_size} bytes) overlaps device at {existing_base} ({existing_size} bytes)")]
    Overlap {
        new_base: Address,
        new_size: u32,
        existing_base: Address,
        existing_size: u32,
    },

    /// The device would extend past the end of its bank.
    #[error("device at {base} ({size} bytes) extends past the end of its bank")]
    CrossesBank { base: Address, size: u32 },
}

/// Memory mapper that routes read/write operations to registered devices.
///
/// Unmapped addresses read as 0 and ignore writes.
///
/// # Examples
///
/// ```rust
/// use bank16::{Address, MappedMemory, MemoryBus, RamDevice};
///
/// let mut memory = MappedMemory::new();
/// memory.add_device(Address::new(1, 0x8000), Box::new(RamDevice::new(0x100))).unwrap();
///
/// memory.write(0x8010, 1, 0x42);
/// assert_eq!(memory.read(0x8010, 1), 0x42);
///
/// // Same offset in another bank is unmapped
/// assert_eq!(memory.read(0x8010, 0), 0x00);
/// ```
#[derive(Default)]
pub struct MappedMemory {
    devices: Vec<DeviceMapping>,
}

impl MappedMemory {
    /// Base address of the audio register page in the standard map.
    pub const AUDIO_BASE: Address = Address::new(0, page(2));

    /// Base address of the timer register page in the standard map.
    pub const TIMER_BASE: Address = Address::new(0, page(3));

    /// Create a new empty memory mapper.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the reference memory map in bank 0.
    ///
    /// - `0x0000-0x1FFF`: RAM (pages 0 and 1)
    /// - `0x2000-0x2FFF`: `audio`
    /// - `0x3000-0x3FFF`: `timer`
    ///
    /// Fails only if a device is larger than its page.
    pub fn standard(audio: Box<dyn Device>, timer: Box<dyn Device>) -> Result<Self, DeviceError> {
        let mut memory = Self::new();
        memory.add_device(Address::new(0, 0), Box::new(RamDevice::new(2 * page(1) as u32)))?;
        memory.add_device(Self::TIMER_BASE, timer)?;
        memory.add_device(Self::AUDIO_BASE, audio)?;
        Ok(memory)
    }

    /// Register a device at the specified base address.
    ///
    /// The device occupies `base.offset .. base.offset + size` in `base.bank`.
    ///
    /// # Returns
    ///
    /// * `Err(DeviceError::CrossesBank)` - the range runs past offset 0xFFFF
    /// * `Err(DeviceError::Overlap)` - the range overlaps an existing device
    pub fn add_device(&mut self, base: Address, device: Box<dyn Device>) -> Result<(), DeviceError> {
        let size = device.size();
        let new_end = base.offset as u32 + size;
        if new_end > BANK_SIZE {
            return Err(DeviceError::CrossesBank { base, size });
        }

        for mapping in &self.devices {
            let overlaps = mapping.base.bank == base.bank
                && (base.offset as u32) < mapping.end()
                && new_end > mapping.base.offset as u32;
            if overlaps {
                return Err(DeviceError::Overlap {
                    new_base: base,
                    new_size: size,
                    existing_base: mapping.base,
                    existing_size: mapping.device.size(),
                });
            }
        }

        trace!(%base, size, "device mapped");
        self.devices.push(DeviceMapping { base, device });
        Ok(())
    }

    /// Number of registered devices.
    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    /// Advance every device's clock by `micros` microseconds.
    pub fn tick(&mut self, micros: u64) {
        for mapping in &mut self.devices {
            mapping.device.tick(micros);
        }
    }

    fn find_device(&self, address: Address) -> Option<(&dyn Device, u16)> {
        self.devices.iter().find_map(|mapping| {
            mapping
                .offset_of(address)
                .map(|offset| (mapping.device.as_ref(), offset))
        })
    }

    fn find_device_mut(&mut self, address: Address) -> Option<(&mut (dyn Device + 'static), u16)> {
        self.devices.iter_mut().find_map(|mapping| {
            let offset = mapping.offset_of(address)?;
            Some((mapping.device.as_mut(), offset))
        })
    }
}

impl MemoryBus for MappedMemory {
    fn read(&self, offset: u16, bank: u8) -> u8 {
        match self.find_device(Address::new(bank, offset)) {
            Some((device, offset)) => device.read(offset),
            None => 0,
        }
    }

    fn write(&mut self, offset: u16, bank: u8, value: u8) {
        if let Some((device, offset)) = self.find_device_mut(Address::new(bank, offset)) {
            device.write(offset, value);
        }
    }

    fn take_interrupt(&mut self) -> Option<u8> {
        self.devices
            .iter_mut()
            .find_map(|mapping| mapping.device.take_interrupt())
    }
}
