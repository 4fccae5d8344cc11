//! RAM device implementation.

use super::Device;

/// Readable and writable storage.
///
/// # Examples
///
/// ```rust
/// use bank16::{Device, RamDevice};
///
/// let mut ram = RamDevice::new(8192);
/// ram.write(0x1000, 0xAA);
/// assert_eq!(ram.read(0x1000), 0xAA);
/// assert_eq!(ram.size(), 8192);
/// ```
pub struct RamDevice {
    data: Vec<u8>,
}

impl RamDevice {
    /// Create a zero-filled RAM device; `size` is capped at one bank.
    pub fn new(size: u32) -> Self {
        Self {
            data: vec![0; size.min(crate::memory::BANK_SIZE) as usize],
        }
    }

    /// Copy `bytes` into RAM starting at `offset`; bytes past the end are dropped.
    pub fn load_bytes(&mut self, offset: u16, bytes: &[u8]) {
        let start = (offset as usize).min(self.data.len());
        let end = (start + bytes.len()).min(self.data.len());
        self.data[start..end].copy_from_slice(&bytes[..end - start]);
    }
}

impl Device for RamDevice {
    fn read(&self, offset: u16) -> u8 {
        self.data.get(offset as usize).copied().unwrap_or(0)
    }

    fn write(&mut self, offset: u16, value: u8) {
        if let Some(byte) = self.data.get_mut(offset as usize) {
            *byte = value;
        }
    }

    fn size(&self) -> u32 {
        self.data.len() as u32
    }
}
