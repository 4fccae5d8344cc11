//! # Flag Instructions
//!
//! SEZ, CLZ and INZ write FL directly. FL is never locked.

use crate::cpu::FLAG_ZERO;
use crate::{Fault, MemoryBus, Register, CPU};

fn update_flags<M: MemoryBus>(cpu: &mut CPU<M>, f: impl FnOnce(u32) -> u32) -> Result<(), Fault> {
    let flags = cpu.regs.reg(Register::Fl);
    cpu.regs.set_reg(Register::Fl, f(flags));
    Ok(())
}

pub(crate) fn execute_sez<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), Fault> {
    update_flags(cpu, |fl| fl | FLAG_ZERO)
}

pub(crate) fn execute_clz<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), Fault> {
    update_flags(cpu, |fl| fl & !FLAG_ZERO)
}

pub(crate) fn execute_inz<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<(), Fault> {
    update_flags(cpu, |fl| fl ^ FLAG_ZERO)
}
