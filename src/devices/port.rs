//! Write-only register page.
//!
//! Peripherals such as the audio chip are driven purely by stores: the CPU
//! never reads their state back. `WritePort` latches the last value written to
//! each register and forwards every write to an optional callback so a host
//! can drive the real peripheral.

use super::Device;

/// Write-only peripheral registers; reads return 0.
///
/// # Examples
///
/// ```rust
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use bank16::devices::WritePort;
/// use bank16::Device;
///
/// let log = Rc::new(RefCell::new(Vec::new()));
/// let sink = Rc::clone(&log);
///
/// let mut port = WritePort::new(4096);
/// port.set_write_callback(move |offset, value| sink.borrow_mut().push((offset, value)));
///
/// port.write(0x00A, 0x40);
/// assert_eq!(port.read(0x00A), 0);
/// assert_eq!(port.last_written(0x00A), Some(0x40));
/// assert_eq!(*log.borrow(), vec![(0x00A, 0x40)]);
/// ```
pub struct WritePort {
    latched: Vec<u8>,
    on_write: Option<Box<dyn FnMut(u16, u8)>>,
}

impl WritePort {
    /// Create a port covering `size` register bytes (capped at one bank).
    pub fn new(size: u32) -> Self {
        Self {
            latched: vec![0; size.min(crate::memory::BANK_SIZE) as usize],
            on_write: None,
        }
    }

    /// Set the function invoked with `(offset, value)` on every write.
    pub fn set_write_callback<F>(&mut self, callback: F)
    where
        F: FnMut(u16, u8) + 'static,
    {
        self.on_write = Some(Box::new(callback));
    }

    /// Last value written to `offset`, or `None` outside the port.
    pub fn last_written(&self, offset: u16) -> Option<u8> {
        self.latched.get(offset as usize).copied()
    }
}

impl Device for WritePort {
    fn read(&self, _offset: u16) -> u8 {
        0
    }

    fn write(&mut self, offset: u16, value: u8) {
        if let Some(slot) = self.latched.get_mut(offset as usize) {
            *slot = value;
        }
        if let Some(callback) = self.on_write.as_mut() {
            callback(offset, value);
        }
    }

    fn size(&self) -> u32 {
        self.latched.len() as u32
    }
}
