//! Runtime configuration for the CPU core.

/// Tunables for [`crate::CPU`].
///
/// # Examples
///
/// ```
/// use bank16::{CpuConfig, FlatMemory, CPU};
///
/// let config = CpuConfig::default().with_interrupt_chain_limit(4);
/// let cpu = CPU::with_config(FlatMemory::new(), config);
/// assert_eq!(cpu.config().interrupt_chain_limit, 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuConfig {
    /// How many times one interrupt may be re-dispatched to the EXCEPT entry
    /// after hitting an uninstalled handler before the machine is reset.
    pub interrupt_chain_limit: u8,
}

impl CpuConfig {
    pub fn with_interrupt_chain_limit(mut self, limit: u8) -> Self {
        self.interrupt_chain_limit = limit;
        self
    }
}

impl Default for CpuConfig {
    fn default() -> Self {
        Self {
            interrupt_chain_limit: 2,
        }
    }
}
