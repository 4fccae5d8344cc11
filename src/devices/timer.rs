//! Timer chip.
//!
//! Eight looping countdown channels, each with a length register and an
//! interrupt register. When a channel's period elapses it restarts and, if its
//! interrupt register is non-zero, requests that interrupt kind.
//!
//! ```text
//! 0x00-0x07  precision channels 0-3 (length, interrupt); 1 unit = 1/255 ms
//! 0x08-0x0F  normal channels 4-7   (length, interrupt); 1 unit = 100/255 ms
//! 0x10-0x17  wait registers: a write holds the CPU until that channel expires
//! ```
//!
//! Writing either register of a channel restarts it; a length of 0 turns it off.
//! Time only moves when the host calls [`Device::tick`]. The chip cannot stall
//! the CPU itself, so a wait write is recorded and the host asks
//! [`TimerDevice::hold_remaining`] how long to keep the CPU paused.

use tracing::trace;

use super::Device;

/// Number of channels.
pub const CHANNELS: usize = 8;

const PRECISION_CHANNELS: usize = 4;
const WAIT_BASE: u16 = 0x10;
const REGISTER_COUNT: u32 = 0x18;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Channel {
    length: u8,
    interrupt: u8,
    elapsed_us: u64,
}

/// Eight-channel timer chip.
///
/// # Examples
///
/// ```rust
/// use bank16::devices::TimerDevice;
/// use bank16::Device;
///
/// let mut timer = TimerDevice::new();
/// timer.write(0x08, 255); // channel 4: 100 ms
/// timer.write(0x09, 3);   // raise interrupt 3
///
/// timer.tick(99_000);
/// assert_eq!(timer.take_interrupt(), None);
/// timer.tick(1_000);
/// assert_eq!(timer.take_interrupt(), Some(3));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TimerDevice {
    channels: [Channel; CHANNELS],
    pending: Option<u8>,
    hold: Option<usize>,
}

impl TimerDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Period of `channel` in microseconds (0 when off).
    pub fn period_us(&self, channel: usize) -> u64 {
        let Some(ch) = self.channels.get(channel) else {
            return 0;
        };
        let unit_us = if channel < PRECISION_CHANNELS { 1_000 } else { 100_000 };
        ch.length as u64 * unit_us / 255
    }

    /// Microseconds the host should keep the CPU paused for a pending wait.
    ///
    /// Returns `None` when no wait register was written or the awaited channel
    /// is off or has already expired.
    pub fn hold_remaining(&self) -> Option<u64> {
        let channel = self.hold?;
        let period = self.period_us(channel);
        let elapsed = self.channels[channel].elapsed_us;
        (period > elapsed).then(|| period - elapsed)
    }

    fn restart(&mut self, channel: usize) {
        self.channels[channel].elapsed_us = 0;
    }
}

impl Device for TimerDevice {
    fn read(&self, _offset: u16) -> u8 {
        0
    }

    fn write(&mut self, offset: u16, value: u8) {
        match offset {
            0x00..=0x0F => {
                let channel = (offset / 2) as usize;
                if offset % 2 == 0 {
                    self.channels[channel].length = value;
                } else {
                    self.channels[channel].interrupt = value;
                }
                self.restart(channel);
                trace!(channel, period_us = self.period_us(channel), "timer channel restarted");
            }
            0x10..=0x17 => {
                let channel = (offset - WAIT_BASE) as usize;
                self.hold = Some(channel);
            }
            _ => {}
        }
    }

    fn size(&self) -> u32 {
        REGISTER_COUNT
    }

    fn tick(&mut self, micros: u64) {
        for channel in &mut self.channels {
            channel.elapsed_us = channel.elapsed_us.saturating_add(micros);
        }

        for index in 0..CHANNELS {
            let period = self.period_us(index);
            if period == 0 || self.channels[index].elapsed_us < period {
                continue;
            }

            // An expired channel waits until the queued request has been taken.
            let interrupt = self.channels[index].interrupt;
            if interrupt != 0 && self.pending.is_some() {
                continue;
            }

            self.restart(index);
            if self.hold == Some(index) {
                self.hold = None;
            }
            // One request per tick; later channels fire on a following tick.
            if interrupt != 0 {
                self.pending = Some(interrupt);
                break;
            }
        }
    }

    fn take_interrupt(&mut self) -> Option<u8> {
        self.pending.take()
    }
}
